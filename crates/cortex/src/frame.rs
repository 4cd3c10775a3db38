//! Line classification for the `event:` / `data:` stream encoding
use serde_json::Value;

pub const EVENT_MARKER: &str = "event:";
pub const DATA_MARKER: &str = "data:";
/// Data payload that ends the stream
pub const DONE_TOKEN: &str = "[DONE]";

/// A data line, decoded and paired with the event name that was current when it arrived
#[derive(Debug, Clone, PartialEq)]
pub struct DataFrame {
    pub event: Option<String>,
    pub value: Value,
}

/// The shape of a decoded payload, borrowed from its [`DataFrame`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Payload<'a> {
    /// `{"object": "message.delta", "delta": {"content": [...]}}`
    MessageDelta(&'a [Value]),
    /// `{"role": "assistant", "content": ...}`, the consolidated message that closes a turn
    FinalMessage(&'a Value),
    /// A batch of observability trace objects
    Trace(&'a [Value]),
    Other(&'a Value),
}

impl DataFrame {
    pub fn event(&self) -> Option<&str> {
        self.event.as_deref()
    }

    pub fn payload(&self) -> Payload<'_> {
        let value = &self.value;
        if let Some(batch) = value.as_array() {
            return Payload::Trace(batch);
        }

        let is_assistant = value.get("role").and_then(Value::as_str) == Some("assistant");
        if is_assistant {
            if let Some(content) = value.get("content") {
                return Payload::FinalMessage(content);
            }
        }

        if value.get("object").and_then(Value::as_str) == Some("message.delta") {
            if let Some(content) = value
                .get("delta")
                .and_then(|delta| delta.get("content"))
                .and_then(Value::as_array)
            {
                return Payload::MessageDelta(content);
            }
        }

        Payload::Other(value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    Event(String),
    Data(DataFrame),
    /// A data line whose payload was not valid JSON
    Malformed {
        event: Option<String>,
        raw: String,
    },
    Done,
}

/// Tracks the current event name across lines and stops at the terminator
#[derive(Debug, Clone, Default)]
pub struct FrameReader {
    current_event: Option<String>,
    finished: bool,
}

impl FrameReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_event(&self) -> Option<&str> {
        self.current_event.as_deref()
    }

    /// True once the terminator has been read; every later line is ignored
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Classify one line. Returns None for lines that carry nothing (blank lines,
    /// comments, anything after the terminator).
    pub fn read_line(&mut self, line: &str) -> Option<Frame> {
        if self.finished {
            return None;
        }

        let line = line.trim();
        if let Some(name) = line.strip_prefix(EVENT_MARKER) {
            let name = name.trim().to_string();
            self.current_event = Some(name.clone());
            return Some(Frame::Event(name));
        }

        let data = line.strip_prefix(DATA_MARKER)?.trim();
        if data == DONE_TOKEN {
            self.finished = true;
            return Some(Frame::Done);
        }

        let event = self.current_event.clone();
        match serde_json::from_str::<Value>(data) {
            Ok(value) => Some(Frame::Data(DataFrame { event, value })),
            Err(err) => {
                tracing::debug!("Skipping malformed data line: {}", err);
                Some(Frame::Malformed {
                    event,
                    raw: data.to_string(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn data(reader: &mut FrameReader, line: &str) -> DataFrame {
        match reader.read_line(line) {
            Some(Frame::Data(frame)) => frame,
            other => panic!("expected data frame, got {:?}", other),
        }
    }

    #[test]
    fn test_event_name_persists_until_replaced() {
        let mut reader = FrameReader::new();
        assert_eq!(
            reader.read_line("event: response.text.delta"),
            Some(Frame::Event("response.text.delta".to_string()))
        );

        let first = data(&mut reader, r#"data: {"text": "A"}"#);
        let second = data(&mut reader, r#"data: {"text": "B"}"#);
        assert_eq!(first.event(), Some("response.text.delta"));
        assert_eq!(second.event(), Some("response.text.delta"));

        reader.read_line("event: response.status");
        let third = data(&mut reader, r#"data: {"message": "Planning"}"#);
        assert_eq!(third.event(), Some("response.status"));
    }

    #[test]
    fn test_markers_without_space() {
        let mut reader = FrameReader::new();
        reader.read_line("event:response.status");
        let frame = data(&mut reader, r#"data:{"message":"ok"}"#);

        assert_eq!(reader.current_event(), Some("response.status"));
        assert_eq!(frame.value, json!({"message": "ok"}));
    }

    #[test]
    fn test_terminator_stops_reading() {
        let mut reader = FrameReader::new();
        assert_eq!(reader.read_line("data: [DONE]"), Some(Frame::Done));
        assert!(reader.is_finished());
        assert_eq!(reader.read_line(r#"data: {"text": "late"}"#), None);
        assert_eq!(reader.read_line("event: response.text.delta"), None);
    }

    #[test]
    fn test_unrelated_lines_ignored() {
        let mut reader = FrameReader::new();
        assert_eq!(reader.read_line(""), None);
        assert_eq!(reader.read_line(": keep-alive"), None);
        assert_eq!(reader.read_line("id: 42"), None);
        assert_eq!(reader.current_event(), None);
    }

    #[test]
    fn test_malformed_payload() {
        let mut reader = FrameReader::new();
        reader.read_line("event: response.text.delta");
        assert_eq!(
            reader.read_line("data: {not json"),
            Some(Frame::Malformed {
                event: Some("response.text.delta".to_string()),
                raw: "{not json".to_string(),
            })
        );
        assert!(!reader.is_finished());
    }

    #[test]
    fn test_payload_shapes() {
        let mut reader = FrameReader::new();

        let delta = data(
            &mut reader,
            r#"data: {"object": "message.delta", "delta": {"content": [{"type": "text", "text": "hi"}]}}"#,
        );
        assert!(matches!(delta.payload(), Payload::MessageDelta(items) if items.len() == 1));

        let last = data(&mut reader, r#"data: {"role": "assistant", "content": []}"#);
        assert!(matches!(last.payload(), Payload::FinalMessage(_)));

        let trace = data(&mut reader, r#"data: ["{\"attributes\": []}"]"#);
        assert!(matches!(trace.payload(), Payload::Trace(batch) if batch.len() == 1));

        let other = data(&mut reader, r#"data: {"object": "message.delta", "delta": {}}"#);
        assert!(matches!(other.payload(), Payload::Other(_)));

        let user = data(&mut reader, r#"data: {"role": "user", "content": []}"#);
        assert!(matches!(user.payload(), Payload::Other(_)));
    }
}
