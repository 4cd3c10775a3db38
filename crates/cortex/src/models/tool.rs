use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Key under which tool result items nest their structured payload
pub const STRUCTURED_KEY: &str = "json";

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
/// A tool invocation made by the agent
pub struct ToolUse {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub tool_type: String,
    #[serde(default)]
    pub arguments: Map<String, Value>,
}

impl ToolUse {
    pub fn new<S: Into<String>, N: Into<String>, T: Into<String>>(
        id: S,
        name: N,
        tool_type: T,
        arguments: Map<String, Value>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            tool_type: tool_type.into(),
            arguments,
        }
    }

    /// Read a `tool_use` object, defaulting every missing field
    pub fn from_value(value: &Value) -> Self {
        Self {
            id: str_field(value, "id"),
            name: str_field(value, "name"),
            tool_type: str_field(value, "type"),
            arguments: object_field(value, "arguments"),
        }
    }

    /// Read a `response.tool_use` event payload, which names its fields differently
    pub fn from_event(value: &Value) -> Self {
        Self {
            id: str_field(value, "tool_use_id"),
            name: str_field(value, "name"),
            tool_type: str_field(value, "type"),
            arguments: object_field(value, "input"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
/// The payload a tool returned. Items are kept untyped; see [`ToolResult::structured`]
pub struct ToolResult {
    pub tool_use_id: String,
    #[serde(default)]
    pub content: Vec<Value>,
}

impl ToolResult {
    pub fn new<S: Into<String>>(tool_use_id: S, content: Vec<Value>) -> Self {
        Self {
            tool_use_id: tool_use_id.into(),
            content,
        }
    }

    /// Read a `tool_results` object, defaulting every missing field
    pub fn from_value(value: &Value) -> Self {
        let content = value
            .get("content")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        Self {
            tool_use_id: str_field(value, "tool_use_id"),
            content,
        }
    }

    /// The structured payloads nested under each item's `json` wrapper, in item order.
    /// Items without a wrapper, or whose wrapper is not an object, are skipped.
    pub fn structured(&self) -> impl Iterator<Item = &Map<String, Value>> {
        self.content
            .iter()
            .filter_map(|item| item.get(STRUCTURED_KEY))
            .filter_map(Value::as_object)
    }
}

fn str_field(value: &Value, key: &str) -> String {
    value
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn object_field(value: &Value, key: &str) -> Map<String, Value> {
    value
        .get(key)
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tool_use_from_value() {
        let tool_use = ToolUse::from_value(&json!({
            "id": "tu_1",
            "name": "analyst",
            "type": "cortex_analyst_text_to_sql",
            "arguments": {"query": "revenue by month"}
        }));

        assert_eq!(tool_use.id, "tu_1");
        assert_eq!(tool_use.name, "analyst");
        assert_eq!(tool_use.tool_type, "cortex_analyst_text_to_sql");
        assert_eq!(tool_use.arguments["query"], "revenue by month");
    }

    #[test]
    fn test_tool_use_defaults_missing_fields() {
        let tool_use = ToolUse::from_value(&json!({"name": 7, "arguments": "nope"}));
        assert_eq!(tool_use, ToolUse::default());
    }

    #[test]
    fn test_tool_use_from_event() {
        let tool_use = ToolUse::from_event(&json!({
            "tool_use_id": "tu_9",
            "name": "search",
            "type": "cortex_search",
            "input": {"query": "refund policy"}
        }));

        assert_eq!(tool_use.id, "tu_9");
        assert_eq!(tool_use.arguments["query"], "refund policy");
    }

    #[test]
    fn test_structured_skips_unwrapped_items() {
        let result = ToolResult::from_value(&json!({
            "tool_use_id": "tu_1",
            "content": [
                {"text": "plain"},
                {"json": "not an object"},
                {"json": {"sql": "SELECT 1"}}
            ]
        }));

        let structured: Vec<_> = result.structured().collect();
        assert_eq!(result.content.len(), 3);
        assert_eq!(structured.len(), 1);
        assert_eq!(structured[0]["sql"], "SELECT 1");
    }
}
