use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;

use crate::frame::{DataFrame, Frame, FrameReader, Payload};
use crate::models::message::Message;
use crate::models::response::{Response, StreamError};
use crate::models::tool::{ToolResult, ToolUse};

/// Event names of the live stream
pub mod events {
    pub const TEXT_DELTA: &str = "response.text.delta";
    pub const TEXT: &str = "response.text";
    pub const THINKING: &str = "response.thinking";
    pub const THINKING_DELTA: &str = "response.thinking.delta";
    pub const STATUS: &str = "response.status";
    pub const TOOL_USE: &str = "response.tool_use";
    pub const TOOL_RESULT: &str = "response.tool_result";
    pub const ERROR: &str = "error";
}

lazy_static! {
    static ref THINKING_SPAN: Regex = Regex::new(r"(?s)<thinking>(.*?)</thinking>").unwrap();
}

/// The trimmed text between the first `<thinking>` / `</thinking>` pair, if non-empty
pub fn extract_thinking(text: &str) -> Option<String> {
    let span = THINKING_SPAN.captures(text)?.get(1)?.as_str().trim();
    if span.is_empty() {
        None
    } else {
        Some(span.to_string())
    }
}

// Events whose payloads are fully handled by their own rule
fn handles_own_content(event: Option<&str>) -> bool {
    matches!(
        event,
        Some(events::TEXT_DELTA)
            | Some(events::TEXT)
            | Some(events::THINKING)
            | Some(events::THINKING_DELTA)
            | Some(events::STATUS)
    )
}

/// Folds data frames into ordered buffers and flushes them into a [`Response`]
#[derive(Debug, Clone, Default)]
pub struct DeltaAccumulator {
    text: String,
    tool_uses: Vec<ToolUse>,
    tool_results: Vec<ToolResult>,
    thinking: Vec<String>,
    status_messages: Vec<String>,
    errors: Vec<StreamError>,
    request_id: Option<String>,
    completed: bool,
}

impl DeltaAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the consolidated final message has been seen
    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn fold(&mut self, frame: &DataFrame) {
        let event = frame.event();
        let value = &frame.value;

        match event {
            Some(events::THINKING) | Some(events::THINKING_DELTA) => {
                if let Some(span) = str_field(value, "text").and_then(extract_thinking) {
                    self.thinking.push(span);
                }
            }
            Some(events::STATUS) => {
                if let Some(message) = str_field(value, "message") {
                    self.status_messages.push(message.to_string());
                }
            }
            Some(events::TEXT_DELTA) => {
                if let Some(text) = str_field(value, "text") {
                    self.text.push_str(text);
                }
            }
            Some(events::TOOL_RESULT) => {
                if value.get("tool_use_id").is_some() && value.get("content").is_some() {
                    self.tool_results.push(ToolResult::from_value(value));
                }
            }
            Some(events::TOOL_USE) => {
                if value.get("tool_use_id").is_some() && value.get("name").is_some() {
                    self.tool_uses.push(ToolUse::from_event(value));
                }
            }
            Some(events::ERROR) => self.record_error(value),
            _ => {}
        }

        match frame.payload() {
            Payload::MessageDelta(content) if !handles_own_content(event) => {
                self.fold_delta_content(content)
            }
            Payload::FinalMessage(_) => self.completed = true,
            _ => {}
        }
    }

    fn fold_delta_content(&mut self, content: &[Value]) {
        for entry in content {
            match entry.get("type").and_then(Value::as_str) {
                Some("text") => {
                    if let Some(text) = str_field(entry, "text") {
                        self.text.push_str(text);
                    }
                }
                Some("tool_use") => {
                    let body = entry.get("tool_use").unwrap_or(&Value::Null);
                    self.tool_uses.push(ToolUse::from_value(body));
                }
                Some(tag @ ("tool_results" | "tool_result")) => {
                    let body = entry.get(tag).unwrap_or(&Value::Null);
                    self.tool_results.push(ToolResult::from_value(body));
                }
                other => tracing::trace!("Ignoring delta entry of type {:?}", other),
            }
        }
    }

    fn record_error(&mut self, value: &Value) {
        let error = StreamError {
            message: str_field(value, "message")
                .unwrap_or("Unknown error")
                .to_string(),
            code: value.get("code").map(|code| match code {
                Value::String(code) => code.clone(),
                other => other.to_string(),
            }),
            request_id: str_field(value, "request_id").map(String::from),
        };
        tracing::warn!("Agent reported an error: {}", error.message);
        if self.request_id.is_none() {
            self.request_id = error.request_id.clone().filter(|id| !id.is_empty());
        }
        self.errors.push(error);
    }

    /// Flush the buffers into a response without consuming them
    pub fn snapshot(&self) -> Response {
        self.clone().finish()
    }

    /// Flush: one message per thinking span, then one message holding
    /// text, tool uses and tool results in that order
    pub fn finish(self) -> Response {
        let mut response = Response {
            status_messages: self.status_messages,
            errors: self.errors,
            request_id: self.request_id,
            ..Response::default()
        };

        for span in self.thinking {
            response
                .messages
                .push(Message::assistant().with_thinking(span));
        }

        if !self.text.is_empty() || !self.tool_uses.is_empty() || !self.tool_results.is_empty() {
            let mut message = Message::assistant();
            if !self.text.is_empty() {
                message = message.with_text(self.text);
            }
            for tool_use in self.tool_uses {
                message = message.with_tool_use(tool_use);
            }
            for tool_result in self.tool_results {
                message = message.with_tool_result(tool_result);
            }
            response.messages.push(message);
        }

        response
    }
}

fn str_field<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value.get(key).and_then(Value::as_str)
}

/// Incremental parser for the event stream. Chunks may split lines anywhere;
/// feeding the same bytes in any chunking yields the same response.
#[derive(Debug, Clone, Default)]
pub struct StreamParser {
    reader: FrameReader,
    accumulator: DeltaAccumulator,
    pending: String,
}

impl StreamParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed raw text; complete lines are processed, a trailing partial line is held back
    pub fn push(&mut self, chunk: &str) {
        self.pending.push_str(chunk);
        while let Some(newline) = self.pending.find('\n') {
            let line: String = self.pending.drain(..=newline).collect();
            self.push_line(&line);
        }
    }

    /// Feed one complete line
    pub fn push_line(&mut self, line: &str) {
        match self.reader.read_line(line) {
            Some(Frame::Data(frame)) => self.accumulator.fold(&frame),
            Some(Frame::Event(name)) => tracing::trace!("Event: {}", name),
            Some(Frame::Malformed { .. }) | Some(Frame::Done) | None => {}
        }
    }

    pub fn is_finished(&self) -> bool {
        self.reader.is_finished()
    }

    /// The response as it stands, without the held-back partial line
    pub fn snapshot(&self) -> Response {
        self.accumulator.snapshot()
    }

    pub fn finish(mut self) -> Response {
        if !self.pending.is_empty() {
            let line = std::mem::take(&mut self.pending);
            self.push_line(&line);
        }
        self.accumulator.finish()
    }
}

/// Parse a complete event-stream line sequence
pub fn parse_lines<I, S>(lines: I) -> Response
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut parser = StreamParser::new();
    for line in lines {
        parser.push_line(line.as_ref());
        if parser.is_finished() {
            break;
        }
    }
    parser.finish()
}
