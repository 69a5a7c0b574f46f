//! Push channel plumbing: the transport seam the session controller opens channels
//! through, and the HTTP Server-Sent Events implementation of it.

use reqwest::{header::ACCEPT, Client};
use shared::domain::{ChannelToken, Subject};
use tokio::{runtime::Handle, sync::mpsc, task::JoinHandle};
use tokio_stream::StreamExt;
use tracing::{debug, info, warn};
use url::Url;

use crate::{error::TransportError, sse::sse_data_events};

pub const STREAM_PATH: &str = "api/stream";
pub const SUBJECT_QUERY_PARAM: &str = "ticker";

/// Transport-level callbacks of one channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelEvent {
    Opened,
    Message(String),
    Failed(String),
}

/// A channel callback tagged with the token of the channel that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelSignal {
    pub token: ChannelToken,
    pub event: ChannelEvent,
}

impl ChannelSignal {
    pub fn new(token: ChannelToken, event: ChannelEvent) -> Self {
        Self { token, event }
    }
}

pub type SignalSender = mpsc::UnboundedSender<ChannelSignal>;

/// Ownership of one open push channel.
pub trait ChannelHandle: Send {
    fn token(&self) -> ChannelToken;

    /// Stops further delivery from this channel. Safe to call repeatedly.
    fn close(&mut self);
}

pub trait PushTransport: Send + Sync {
    /// Opens a channel for `subject`. Never fails synchronously: connection problems are
    /// reported as [`ChannelEvent::Failed`] through `signals`.
    fn open(
        &self,
        subject: &Subject,
        token: ChannelToken,
        signals: SignalSender,
    ) -> Box<dyn ChannelHandle>;
}

pub fn parse_server_url(raw: &str) -> Result<Url, TransportError> {
    let trimmed = raw.trim();
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(TransportError::UnsupportedScheme(trimmed.to_string()));
    }
    let mut url = Url::parse(trimmed)?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// `{server_url}/api/stream?ticker=<subject>`
pub fn stream_url(server_url: &Url, subject: &Subject) -> Result<Url, TransportError> {
    let mut url = server_url.join(STREAM_PATH)?;
    url.query_pairs_mut()
        .clear()
        .append_pair(SUBJECT_QUERY_PARAM, subject.as_str());
    Ok(url)
}

pub struct SseTransport {
    http: Client,
    server_url: Url,
    runtime: Handle,
}

impl SseTransport {
    /// Builds a transport bound to the ambient tokio runtime.
    pub fn new(server_url: &str) -> anyhow::Result<Self> {
        let runtime = Handle::try_current()?;
        Ok(Self::with_client(
            Client::new(),
            parse_server_url(server_url)?,
            runtime,
        ))
    }

    pub fn with_client(http: Client, server_url: Url, runtime: Handle) -> Self {
        Self {
            http,
            server_url,
            runtime,
        }
    }

    pub fn server_url(&self) -> &Url {
        &self.server_url
    }
}

impl PushTransport for SseTransport {
    fn open(
        &self,
        subject: &Subject,
        token: ChannelToken,
        signals: SignalSender,
    ) -> Box<dyn ChannelHandle> {
        let task = match stream_url(&self.server_url, subject) {
            Ok(url) => Some(
                self.runtime
                    .spawn(pump_events(self.http.clone(), url, token, signals)),
            ),
            Err(err) => {
                let _ = signals.send(ChannelSignal::new(
                    token,
                    ChannelEvent::Failed(err.to_string()),
                ));
                None
            }
        };
        Box::new(SseChannel { token, task })
    }
}

struct SseChannel {
    token: ChannelToken,
    task: Option<JoinHandle<()>>,
}

impl ChannelHandle for SseChannel {
    fn token(&self) -> ChannelToken {
        self.token
    }

    fn close(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            debug!(token = %self.token, "sse: channel closed");
        }
    }
}

impl Drop for SseChannel {
    fn drop(&mut self) {
        self.close();
    }
}

async fn pump_events(http: Client, url: Url, token: ChannelToken, signals: SignalSender) {
    let send = |event: ChannelEvent| signals.send(ChannelSignal::new(token, event)).is_ok();
    let fail = |err: TransportError| {
        warn!(token = %token, error = %err, "sse: channel failed");
        send(ChannelEvent::Failed(err.to_string()));
    };

    info!(token = %token, url = %url, "sse: opening channel");
    let response = match http
        .get(url)
        .header(ACCEPT, "text/event-stream")
        .send()
        .await
    {
        Ok(response) => response,
        Err(err) => return fail(TransportError::Connect(err)),
    };
    if !response.status().is_success() {
        return fail(TransportError::Status(response.status()));
    }
    if !send(ChannelEvent::Opened) {
        return;
    }

    let events = sse_data_events(response.bytes_stream());
    tokio::pin!(events);
    while let Some(item) = events.next().await {
        match item {
            Ok(data) => {
                if !send(ChannelEvent::Message(data)) {
                    debug!(token = %token, "sse: receiver gone, stopping pump");
                    return;
                }
            }
            Err(err) => return fail(TransportError::Read(err)),
        }
    }
    fail(TransportError::Closed);
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
