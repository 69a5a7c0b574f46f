//! Session controller: owns the push channel of the current analysis run and folds its
//! callbacks into the published [`ViewState`].
//!
//! Transport callbacks arrive as [`ChannelSignal`]s on a single queue and are applied one
//! at a time by [`SessionController::dispatch`]. Every signal carries the token of the
//! channel that produced it; anything not matching the currently owned channel is stale
//! and dropped, which covers callbacks already queued when a channel was closed.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use shared::{
    domain::{ChannelToken, Subject},
    protocol::EventEnvelope,
};
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use crate::{
    reducer::{reduce, Effect, Reduction, Terminal},
    transport::{ChannelEvent, ChannelHandle, ChannelSignal, PushTransport, SignalSender},
    view::{ViewState, STATUS_CONNECTED, STATUS_CONNECTION_LOST, STATUS_PARSE_ERROR},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Connecting,
    Active,
    Completed,
    Failed,
}

impl Phase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    pub fn is_live(self) -> bool {
        matches!(self, Self::Connecting | Self::Active)
    }
}

impl From<Terminal> for Phase {
    fn from(value: Terminal) -> Self {
        match value {
            Terminal::Completed => Self::Completed,
            Terminal::Failed => Self::Failed,
        }
    }
}

/// One analysis run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub subject: Subject,
    pub token: ChannelToken,
    pub phase: Phase,
    pub status_message: String,
    pub started_at: DateTime<Utc>,
}

pub struct SessionController {
    transport: Arc<dyn PushTransport>,
    session: Option<Session>,
    channel: Option<Box<dyn ChannelHandle>>,
    last_token: ChannelToken,
    view: watch::Sender<Arc<ViewState>>,
    signals_tx: SignalSender,
    signals_rx: mpsc::UnboundedReceiver<ChannelSignal>,
    torn_down: bool,
}

impl SessionController {
    pub fn new(transport: Arc<dyn PushTransport>) -> Self {
        let (view, _) = watch::channel(Arc::new(ViewState::default()));
        let (signals_tx, signals_rx) = mpsc::unbounded_channel();
        Self {
            transport,
            session: None,
            channel: None,
            last_token: ChannelToken(0),
            view,
            signals_tx,
            signals_rx,
            torn_down: false,
        }
    }

    /// Receiver of every published view snapshot.
    pub fn subscribe(&self) -> watch::Receiver<Arc<ViewState>> {
        self.view.subscribe()
    }

    pub fn view(&self) -> Arc<ViewState> {
        self.view.borrow().clone()
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn phase(&self) -> Phase {
        self.session
            .as_ref()
            .map_or(Phase::Idle, |session| session.phase)
    }

    pub fn live_channel(&self) -> Option<ChannelToken> {
        self.channel.as_ref().map(|channel| channel.token())
    }

    /// Begins a new analysis of `subject`, cancelling any run still in flight.
    pub fn start(&mut self, subject: Subject) {
        if self.torn_down {
            warn!(subject = %subject, "session: start ignored after teardown");
            return;
        }

        if let Some(previous) = &self.session {
            if previous.phase.is_live() {
                info!(
                    subject = %previous.subject,
                    token = %previous.token,
                    "session: cancelling in-flight analysis for restart"
                );
            }
        }
        self.release_channel();

        let token = self.last_token.next();
        self.last_token = token;
        self.session = Some(Session {
            subject: subject.clone(),
            token,
            phase: Phase::Connecting,
            status_message: String::new(),
            started_at: Utc::now(),
        });
        self.publish(ViewState::connecting());

        info!(subject = %subject, token = %token, "session: starting analysis");
        let channel = self.transport.open(&subject, token, self.signals_tx.clone());
        self.channel = Some(channel);
    }

    /// Applies one transport callback.
    pub fn dispatch(&mut self, signal: ChannelSignal) {
        if self.live_channel() != Some(signal.token) {
            debug!(token = %signal.token, "session: dropping stale channel signal");
            return;
        }

        match signal.event {
            ChannelEvent::Opened => self.on_open(),
            ChannelEvent::Message(raw) => self.on_message(&raw),
            ChannelEvent::Failed(reason) => self.on_transport_error(&reason),
        }
    }

    /// Waits for the next queued transport callback.
    pub async fn next_signal(&mut self) -> Option<ChannelSignal> {
        self.signals_rx.recv().await
    }

    /// Applies every callback already queued, returning how many were taken.
    pub fn drain_pending(&mut self) -> usize {
        let mut taken = 0;
        while let Ok(signal) = self.signals_rx.try_recv() {
            self.dispatch(signal);
            taken += 1;
        }
        taken
    }

    /// Drives the current session until it completes or fails.
    pub async fn run_until_finished(&mut self) -> Phase {
        while self.phase().is_live() {
            let Some(signal) = self.next_signal().await else {
                break;
            };
            self.dispatch(signal);
        }
        self.phase()
    }

    /// Releases whatever channel is held. Runs once; later calls are no-ops.
    pub fn shutdown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        self.release_channel();
        if let Some(session) = self.session.as_mut() {
            if session.phase.is_live() {
                session.phase = Phase::Failed;
            }
        }
        debug!("session: controller torn down");
    }

    fn on_open(&mut self) {
        if !self.phase().is_live() {
            return;
        }
        info!(token = ?self.live_channel(), "session: channel open");
        self.update_view(|view| {
            view.status = STATUS_CONNECTED.to_string();
            view.is_connecting = false;
        });
    }

    fn on_message(&mut self, raw: &str) {
        if self.phase().is_terminal() {
            debug!("session: ignoring message after finalization");
            return;
        }

        let envelope = match EventEnvelope::parse(raw) {
            Ok(envelope) => envelope,
            Err(err) => {
                warn!(error = %err, "session: failed to parse stream message");
                self.update_view(|view| {
                    view.status = STATUS_PARSE_ERROR.to_string();
                    view.is_connecting = false;
                });
                self.finish(Terminal::Failed);
                return;
            }
        };

        if let EventEnvelope::Unknown { kind } = &envelope {
            debug!(kind = %kind, "session: ignoring unknown event kind");
        } else if let Some(session) = self.session.as_mut() {
            if session.phase == Phase::Connecting {
                session.phase = Phase::Active;
            }
        }

        let current = self.view();
        let Reduction { state, effect } = reduce(&current, &envelope);
        debug!(kind = envelope.kind(), "session: reduced event");
        if let EventEnvelope::Error(payload) = &envelope {
            warn!(message = %payload.message, "session: analysis reported an error");
        }
        self.publish(state);

        if let Effect::Release(terminal) = effect {
            self.finish(terminal);
        }
    }

    fn on_transport_error(&mut self, reason: &str) {
        match self.phase() {
            Phase::Completed => {
                debug!(reason, "session: transport closed after completion");
                self.release_channel();
            }
            Phase::Failed | Phase::Idle => {}
            Phase::Connecting | Phase::Active => {
                warn!(reason, "session: connection lost");
                self.update_view(|view| {
                    view.status = STATUS_CONNECTION_LOST.to_string();
                    view.is_connecting = false;
                });
                self.finish(Terminal::Failed);
            }
        }
    }

    fn finish(&mut self, terminal: Terminal) {
        self.release_channel();
        if let Some(session) = self.session.as_mut() {
            session.phase = terminal.into();
            info!(
                subject = %session.subject,
                token = %session.token,
                phase = ?session.phase,
                elapsed_ms = (Utc::now() - session.started_at).num_milliseconds(),
                "session: finished"
            );
        }
    }

    fn release_channel(&mut self) {
        if let Some(mut channel) = self.channel.take() {
            channel.close();
        }
    }

    fn update_view(&mut self, apply: impl FnOnce(&mut ViewState)) {
        let mut next = ViewState::clone(&self.view());
        apply(&mut next);
        self.publish(next);
    }

    fn publish(&mut self, state: ViewState) {
        if let Some(session) = self.session.as_mut() {
            session.status_message = state.status.clone();
        }
        self.view.send_replace(Arc::new(state));
    }
}

impl Drop for SessionController {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
