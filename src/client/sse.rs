//! # SSE decoder
//!
//! Turns a chunked `text/event-stream` body into events, following the
//! EventSource processing model:
//! - line buffering across chunk boundaries (LF, CRLF)
//! - `:` comment lines
//! - `event`, `data`, `id` and `retry` fields
//! - dispatch on blank lines, only when data was received

use std::fmt::Display;
use std::time::Duration;

use bytes::BytesMut;
use futures_util::{Stream, StreamExt};

/// Event type used when a frame carries no `event` field.
pub const DEFAULT_EVENT_TYPE: &str = "message";

/// One dispatched event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseFrame {
    /// Event type (`message` unless the server named it).
    pub event: String,
    /// Data lines joined with LF.
    pub data: String,
    /// Last event id seen on the stream so far.
    pub last_event_id: String,
}

/// Output of the decoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SseItem {
    /// A complete event.
    Frame(SseFrame),
    /// The server changed the reconnection time.
    Retry(Duration),
}

/// Line-level decoder state.
#[derive(Debug, Default)]
pub struct SseDecoder {
    event: String,
    data: String,
    last_event_id: String,
}

impl SseDecoder {
    /// Creates an empty decoder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the last event id seen.
    #[must_use]
    pub fn last_event_id(&self) -> &str {
        &self.last_event_id
    }

    /// Processes one line (without its terminator).
    pub fn feed_line(&mut self, line: &str) -> Option<SseItem> {
        if line.is_empty() {
            return self.dispatch().map(SseItem::Frame);
        }
        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };

        match field {
            "event" => self.event = value.to_string(),
            "data" => {
                self.data.push_str(value);
                self.data.push('\n');
            }
            "id" if !value.contains('\0') => self.last_event_id = value.to_string(),
            "retry" if !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit()) => {
                if let Ok(ms) = value.parse::<u64>() {
                    return Some(SseItem::Retry(Duration::from_millis(ms)));
                }
            }
            _ => {}
        }
        None
    }

    fn dispatch(&mut self) -> Option<SseFrame> {
        let event = std::mem::take(&mut self.event);
        if self.data.is_empty() {
            return None;
        }
        let mut data = std::mem::take(&mut self.data);
        if data.ends_with('\n') {
            data.pop();
        }

        Some(SseFrame {
            event: if event.is_empty() {
                DEFAULT_EVENT_TYPE.to_string()
            } else {
                event
            },
            data,
            last_event_id: self.last_event_id.clone(),
        })
    }
}

/// Decodes a byte stream into SSE items.
///
/// The stream ends when the body ends or fails; an event that was not
/// terminated by a blank line is discarded.
pub fn decode<S, B, E>(byte_stream: S) -> impl Stream<Item = SseItem> + Send
where
    S: Stream<Item = Result<B, E>> + Send + Unpin + 'static,
    B: AsRef<[u8]> + Send,
    E: Display + Send,
{
    futures_util::stream::unfold(
        (byte_stream, BytesMut::with_capacity(8192), SseDecoder::new()),
        |(mut stream, mut buffer, mut decoder)| async move {
            loop {
                if let Some(newline_pos) = buffer.iter().position(|&b| b == b'\n') {
                    let mut line = buffer.split_to(newline_pos + 1);
                    line.truncate(newline_pos);
                    if line.last() == Some(&b'\r') {
                        line.truncate(newline_pos.saturating_sub(1));
                    }

                    let text = String::from_utf8_lossy(&line);
                    if let Some(item) = decoder.feed_line(&text) {
                        return Some((item, (stream, buffer, decoder)));
                    }
                    continue;
                }

                match stream.next().await {
                    Some(Ok(chunk)) => buffer.extend_from_slice(chunk.as_ref()),
                    Some(Err(e)) => {
                        tracing::debug!(error = %e, "event stream read error");
                        return None;
                    }
                    None => return None,
                }
            }
        },
    )
}
