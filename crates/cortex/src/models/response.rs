use super::message::Message;
use super::tool::{ToolResult, ToolUse};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
/// An `error` event reported by the agent mid-stream
pub struct StreamError {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
/// A complete parsed agent turn
pub struct Response {
    pub messages: Vec<Message>,
    pub suggestions: Vec<String>,
    /// Progress updates from the status side channel, never part of a message
    pub status_messages: Vec<String>,
    pub errors: Vec<StreamError>,
    pub request_id: Option<String>,
}

impl Response {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the request id unless one was already seen; empty ids are ignored
    pub fn set_request_id<S: Into<String>>(&mut self, request_id: S) {
        let request_id = request_id.into();
        if self.request_id.is_none() && !request_id.is_empty() {
            self.request_id = Some(request_id);
        }
    }

    /// Append a tool result to the most recent message, starting an assistant
    /// message if there is none yet
    pub fn append_tool_result(&mut self, tool_result: ToolResult) {
        match self.messages.last_mut() {
            Some(message) => message.content.push(tool_result.into()),
            None => self
                .messages
                .push(Message::assistant().with_tool_result(tool_result)),
        }
    }

    pub fn tool_uses(&self) -> impl Iterator<Item = &ToolUse> {
        self.messages.iter().flat_map(|message| message.tool_uses())
    }

    /// Every tool result across every message, in document order
    pub fn tool_results(&self) -> impl Iterator<Item = &ToolResult> {
        self.messages.iter().flat_map(|message| message.tool_results())
    }
}
