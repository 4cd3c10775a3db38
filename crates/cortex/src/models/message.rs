use super::role::Role;
use super::tool::{ToolResult, ToolUse};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextContent {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThinkingContent {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
/// Content passed inside a message. The variant decides which single field is populated
pub enum MessageContent {
    Text(TextContent),
    ToolUse(ToolUse),
    ToolResult(ToolResult),
    Thinking(ThinkingContent),
}

impl MessageContent {
    pub fn text<S: Into<String>>(text: S) -> Self {
        MessageContent::Text(TextContent { text: text.into() })
    }

    pub fn thinking<S: Into<String>>(text: S) -> Self {
        MessageContent::Thinking(ThinkingContent { text: text.into() })
    }

    pub fn tool_use(tool_use: ToolUse) -> Self {
        MessageContent::ToolUse(tool_use)
    }

    pub fn tool_result(tool_result: ToolResult) -> Self {
        MessageContent::ToolResult(tool_result)
    }

    /// Convert one item of a wire `content` list.
    ///
    /// Items are tagged by `type` and carry their body under a key of the same name,
    /// except text and thinking which may carry `text` inline. Unknown tags yield None.
    pub fn from_wire(item: &Value) -> Option<Self> {
        let tag = item.get("type").and_then(Value::as_str)?;
        match tag {
            "text" => Some(MessageContent::text(inline_text(item, "text"))),
            "thinking" => Some(MessageContent::thinking(inline_text(item, "thinking"))),
            "tool_use" => Some(MessageContent::ToolUse(ToolUse::from_value(
                item.get("tool_use").unwrap_or(&Value::Null),
            ))),
            "tool_results" | "tool_result" => Some(MessageContent::ToolResult(
                ToolResult::from_value(item.get(tag).unwrap_or(&Value::Null)),
            )),
            _ => None,
        }
    }

    /// Get the text content if this is a Text variant
    pub fn as_text(&self) -> Option<&str> {
        match self {
            MessageContent::Text(text) => Some(&text.text),
            _ => None,
        }
    }

    /// Get the thinking text if this is a Thinking variant
    pub fn as_thinking(&self) -> Option<&str> {
        match self {
            MessageContent::Thinking(thinking) => Some(&thinking.text),
            _ => None,
        }
    }

    pub fn as_tool_use(&self) -> Option<&ToolUse> {
        if let MessageContent::ToolUse(ref tool_use) = self {
            Some(tool_use)
        } else {
            None
        }
    }

    pub fn as_tool_result(&self) -> Option<&ToolResult> {
        if let MessageContent::ToolResult(ref tool_result) = self {
            Some(tool_result)
        } else {
            None
        }
    }
}

impl From<ToolResult> for MessageContent {
    fn from(tool_result: ToolResult) -> Self {
        MessageContent::ToolResult(tool_result)
    }
}

// `{"type": "text", "text": "..."}` or `{"type": "thinking", "thinking": {"text": "..."}}`
fn inline_text(item: &Value, tag: &str) -> String {
    item.get("text")
        .and_then(Value::as_str)
        .or_else(|| item.get(tag).and_then(|body| body.get("text")).and_then(Value::as_str))
        .unwrap_or_default()
        .to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// One message of a parsed agent turn
pub struct Message {
    pub role: Role,
    pub content: Vec<MessageContent>,
}

impl Message {
    pub fn new(role: Role) -> Self {
        Message {
            role,
            content: Vec::new(),
        }
    }

    /// Create a new, empty user message
    pub fn user() -> Self {
        Message::new(Role::User)
    }

    /// Create a new, empty assistant message
    pub fn assistant() -> Self {
        Message::new(Role::Assistant)
    }

    /// Add any MessageContent to the message
    pub fn with_content(mut self, content: MessageContent) -> Self {
        self.content.push(content);
        self
    }

    /// Add text content to the message
    pub fn with_text<S: Into<String>>(self, text: S) -> Self {
        self.with_content(MessageContent::text(text))
    }

    /// Add a thinking span to the message
    pub fn with_thinking<S: Into<String>>(self, text: S) -> Self {
        self.with_content(MessageContent::thinking(text))
    }

    pub fn with_tool_use(self, tool_use: ToolUse) -> Self {
        self.with_content(MessageContent::tool_use(tool_use))
    }

    pub fn with_tool_result(self, tool_result: ToolResult) -> Self {
        self.with_content(MessageContent::tool_result(tool_result))
    }

    /// Concatenation of every Text item, in order
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(MessageContent::as_text)
            .collect()
    }

    pub fn tool_uses(&self) -> impl Iterator<Item = &ToolUse> {
        self.content.iter().filter_map(MessageContent::as_tool_use)
    }

    pub fn tool_results(&self) -> impl Iterator<Item = &ToolResult> {
        self.content.iter().filter_map(MessageContent::as_tool_result)
    }

    pub fn thinking(&self) -> impl Iterator<Item = &str> {
        self.content.iter().filter_map(MessageContent::as_thinking)
    }

    pub fn is_assistant(&self) -> bool {
        self.role == Role::Assistant
    }
}
