//! Server-Sent Events framing for the analysis stream.
//!
//! Buffers chunked response bodies, splits them into lines and yields the payload of
//! each dispatched event. Consecutive `data:` lines of one event are joined with `\n`;
//! a blank line dispatches the event. Comments (`:`) and other fields (`event:`, `id:`,
//! `retry:`) are skipped. Whatever is still pending when the body ends is flushed.

use std::pin::Pin;

use bytes::{Bytes, BytesMut};
use futures::Stream;
use tokio_stream::StreamExt;
use tracing::warn;

struct Framer<S> {
    stream: Pin<Box<S>>,
    buffer: BytesMut,
    pending: Option<String>,
    finished: bool,
}

/// Turns a byte stream into a stream of event payloads. A read error is yielded once and
/// ends the stream.
pub fn sse_data_events<S, E>(byte_stream: S) -> impl Stream<Item = Result<String, E>>
where
    S: Stream<Item = Result<Bytes, E>>,
{
    let framer = Framer {
        stream: Box::pin(byte_stream),
        buffer: BytesMut::with_capacity(8192),
        pending: None,
        finished: false,
    };

    futures::stream::unfold(framer, |mut framer| async move {
        if framer.finished {
            return None;
        }

        loop {
            if let Some(newline_pos) = framer.buffer.iter().position(|&b| b == b'\n') {
                let mut line_bytes = framer.buffer.split_to(newline_pos + 1);
                line_bytes.truncate(line_bytes.len() - 1);
                if line_bytes.last() == Some(&b'\r') {
                    line_bytes.truncate(line_bytes.len() - 1);
                }

                let Ok(line) = std::str::from_utf8(&line_bytes) else {
                    warn!("skipping non utf-8 sse line");
                    continue;
                };

                if line.is_empty() {
                    if let Some(data) = framer.pending.take() {
                        return Some((Ok(data), framer));
                    }
                    continue;
                }

                if let Some(data) = extract_sse_data(line) {
                    match framer.pending.as_mut() {
                        Some(pending) => {
                            pending.push('\n');
                            pending.push_str(data);
                        }
                        None => framer.pending = Some(data.to_string()),
                    }
                }
                continue;
            }

            match framer.stream.next().await {
                Some(Ok(chunk)) => framer.buffer.extend_from_slice(&chunk),
                Some(Err(err)) => {
                    framer.finished = true;
                    return Some((Err(err), framer));
                }
                None => {
                    framer.finished = true;
                    if !framer.buffer.is_empty() {
                        if let Ok(line) = std::str::from_utf8(&framer.buffer) {
                            if let Some(data) = extract_sse_data(line.trim_end_matches('\r')) {
                                let data = data.to_string();
                                match framer.pending.as_mut() {
                                    Some(pending) => {
                                        pending.push('\n');
                                        pending.push_str(&data);
                                    }
                                    None => framer.pending = Some(data),
                                }
                            }
                        }
                        framer.buffer.clear();
                    }
                    return framer.pending.take().map(|data| (Ok(data), framer));
                }
            }
        }
    })
}

/// Returns the value of a `data` field line, or `None` for comments and other fields.
fn extract_sse_data(line: &str) -> Option<&str> {
    if line.starts_with(':') {
        return None;
    }
    let value = line.strip_prefix("data")?;
    if value.is_empty() {
        return Some("");
    }
    let value = value.strip_prefix(':')?;
    Some(value.strip_prefix(' ').unwrap_or(value))
}

#[cfg(test)]
#[path = "tests/sse_tests.rs"]
mod tests;
