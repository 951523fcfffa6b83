//! Incremental parser for the space's `text/event-stream` responses.
//!
//! Lines accumulate into a pending event; a blank line dispatches it. The
//! end of input also dispatches, since the space does not always terminate
//! its last event with a blank line.

use hotscore_models::PredictionValue;
use thiserror::Error;
use tracing::{debug, warn};

/// Event name carrying the job's output.
pub const COMPLETE_EVENT: &str = "complete";
/// Event name the space uses to report a failed job.
pub const ERROR_EVENT: &str = "error";

const DEFAULT_EVENT: &str = "message";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EventStreamError {
    #[error("stream ended without a complete event")]
    NoCompleteEvent,

    #[error("complete event data is not a JSON array: {0}")]
    MalformedData(String),

    #[error("complete event carried an empty data array")]
    EmptyData,

    #[error("unsupported prediction value: {0}")]
    UnsupportedValue(String),
}

/// One dispatched event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerEvent {
    pub event: String,
    pub data: String,
    pub id: Option<String>,
}

/// Line-oriented event stream state machine.
#[derive(Debug, Default)]
pub struct EventStreamParser {
    buffer: Vec<u8>,
    event: Option<String>,
    data: Vec<String>,
    id: Option<String>,
}

impl EventStreamParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed raw bytes. Chunk boundaries may fall anywhere, including inside
    /// a line or a UTF-8 sequence.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<ServerEvent> {
        self.buffer.extend_from_slice(chunk);

        let mut events = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let raw: Vec<u8> = self.buffer.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&raw[..raw.len() - 1]);
            if let Some(event) = self.process_line(trim_cr(&line)) {
                events.push(event);
            }
        }
        events
    }

    /// Flush the unterminated tail and any pending event.
    pub fn finish(mut self) -> Option<ServerEvent> {
        let rest = std::mem::take(&mut self.buffer);
        if !rest.is_empty() {
            let line = String::from_utf8_lossy(&rest);
            if let Some(event) = self.process_line(trim_cr(&line)) {
                return Some(event);
            }
        }
        self.dispatch()
    }

    fn process_line(&mut self, line: &str) -> Option<ServerEvent> {
        if line.is_empty() {
            return self.dispatch();
        }
        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };

        match field {
            "event" => self.event = Some(value.to_string()),
            "data" => self.data.push(value.to_string()),
            "id" => self.id = Some(value.to_string()),
            // retry and unknown fields
            _ => {}
        }
        None
    }

    fn dispatch(&mut self) -> Option<ServerEvent> {
        let event = self.event.take();
        let data = std::mem::take(&mut self.data);
        let id = self.id.take();

        if event.is_none() && data.is_empty() {
            return None;
        }

        Some(ServerEvent {
            event: event.unwrap_or_else(|| DEFAULT_EVENT.to_string()),
            data: data.join("\n"),
            id,
        })
    }
}

fn trim_cr(line: &str) -> &str {
    line.strip_suffix('\r').unwrap_or(line)
}

/// Extract the score from a `complete` event: first element of its data array.
pub fn prediction_from_event(event: &ServerEvent) -> Result<PredictionValue, EventStreamError> {
    let values: Vec<serde_json::Value> = serde_json::from_str(&event.data)
        .map_err(|e| EventStreamError::MalformedData(e.to_string()))?;

    let first = values.first().ok_or(EventStreamError::EmptyData)?;

    PredictionValue::from_json(first)
        .ok_or_else(|| EventStreamError::UnsupportedValue(first.to_string()))
}

/// Decide what a dispatched event means for the job. `None` means keep reading.
fn job_outcome(event: ServerEvent) -> Option<Result<PredictionValue, EventStreamError>> {
    match event.event.as_str() {
        COMPLETE_EVENT => Some(prediction_from_event(&event)),
        ERROR_EVENT => {
            warn!(data = %event.data, "Space reported an error event");
            None
        }
        other => {
            debug!(event = other, "Skipping event");
            None
        }
    }
}

/// Reads a job's event stream until the job settles.
#[derive(Debug, Default)]
pub struct PredictionReader {
    parser: EventStreamParser,
}

impl PredictionReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk. Returns the outcome once a `complete` event arrives.
    pub fn push(&mut self, chunk: &[u8]) -> Option<Result<PredictionValue, EventStreamError>> {
        self.parser.feed(chunk).into_iter().find_map(job_outcome)
    }

    /// End of stream: settle on the trailing event or report that none completed.
    pub fn finish(self) -> Result<PredictionValue, EventStreamError> {
        self.parser
            .finish()
            .and_then(job_outcome)
            .unwrap_or(Err(EventStreamError::NoCompleteEvent))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_body(body: &str) -> Result<PredictionValue, EventStreamError> {
        let mut reader = PredictionReader::new();
        match reader.push(body.as_bytes()) {
            Some(outcome) => outcome,
            None => reader.finish(),
        }
    }

    #[test]
    fn test_complete_event_without_trailing_blank_line() {
        let body = "event: complete\ndata: [7.8]\n";
        assert_eq!(read_body(body).unwrap(), PredictionValue::Number(7.8));
    }

    #[test]
    fn test_gradio_stream_with_heartbeats() {
        let body = "event: heartbeat\ndata: null\n\n\
                    event: generating\ndata: [1.0]\n\n\
                    event: complete\ndata: [\"6.4\"]\n\n";
        assert_eq!(
            read_body(body).unwrap(),
            PredictionValue::Text("6.4".to_string())
        );
    }

    #[test]
    fn test_missing_complete_event() {
        let body = "event: heartbeat\ndata: null\n\nevent: error\ndata: null\n\n";
        assert_eq!(read_body(body), Err(EventStreamError::NoCompleteEvent));
        assert_eq!(read_body(""), Err(EventStreamError::NoCompleteEvent));
    }

    #[test]
    fn test_bad_complete_payloads() {
        assert!(matches!(
            read_body("event: complete\ndata: not json\n\n"),
            Err(EventStreamError::MalformedData(_))
        ));
        assert_eq!(
            read_body("event: complete\ndata: []\n\n"),
            Err(EventStreamError::EmptyData)
        );
        assert!(matches!(
            read_body("event: complete\ndata: [null]\n\n"),
            Err(EventStreamError::UnsupportedValue(_))
        ));
    }

    #[test]
    fn test_reader_settles_across_chunks() {
        let mut reader = PredictionReader::new();
        assert!(reader.push(b"event: error\ndata: null\n\nevent: comp").is_none());
        assert!(reader.push(b"lete\ndata: [8").is_none());
        assert_eq!(reader.push(b".5]\n\n"), Some(Ok(PredictionValue::Number(8.5))));
    }

    #[test]
    fn test_chunk_boundaries_and_crlf() {
        let mut parser = EventStreamParser::new();
        assert!(parser.feed(b"event: comp").is_empty());
        assert!(parser.feed(b"lete\r\ndata: [3").is_empty());
        let events = parser.feed(b"]\r\n\r\n");

        assert_eq!(
            events,
            vec![ServerEvent {
                event: "complete".to_string(),
                data: "[3]".to_string(),
                id: None,
            }]
        );
        assert!(parser.finish().is_none());
    }

    #[test]
    fn test_multiline_data_comments_and_id() {
        let mut parser = EventStreamParser::new();
        let events = parser.feed(b": keep-alive\nid: 9\ndata: [\ndata: 2]\n\n");

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event, "message");
        assert_eq!(events[0].data, "[\n2]");
        assert_eq!(events[0].id.as_deref(), Some("9"));
    }

    #[test]
    fn test_finish_flushes_unterminated_line() {
        let mut parser = EventStreamParser::new();
        assert!(parser.feed(b"event: complete\ndata: [5]").is_empty());
        let event = parser.finish().unwrap();
        assert_eq!(prediction_from_event(&event).unwrap(), PredictionValue::Number(5.0));
    }
}
