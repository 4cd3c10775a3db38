//! The consolidated, non-streaming response document:
//! `{"request_id": ..., "message": {"role": ..., "content": [...]}, "suggestions": [...]}`
use serde_json::Value;

use crate::errors::{ParseError, ParseResult};
use crate::models::message::{Message, MessageContent};
use crate::models::response::Response;
use crate::models::role::Role;

/// Parse a document given either as a JSON object or as a string holding one
pub fn parse_document(input: &Value) -> ParseResult<Response> {
    match input {
        Value::String(raw) => parse_document_str(raw),
        Value::Object(_) => Ok(read_document(input)),
        other => Err(ParseError::InvalidDocument(format!(
            "expected a JSON object or string, got {}",
            kind(other)
        ))),
    }
}

pub fn parse_document_str(raw: &str) -> ParseResult<Response> {
    let value: Value = serde_json::from_str(raw)
        .map_err(|e| ParseError::InvalidDocument(format!("not valid JSON: {}", e)))?;
    if !value.is_object() {
        return Err(ParseError::InvalidDocument(format!(
            "expected a JSON object, got {}",
            kind(&value)
        )));
    }
    Ok(read_document(&value))
}

fn read_document(document: &Value) -> Response {
    let mut response = Response::new();

    if let Some(request_id) = document.get("request_id").and_then(Value::as_str) {
        response.set_request_id(request_id);
    }

    if let Some(message) = document.get("message") {
        response.messages.push(read_message(message));
    }

    if let Some(suggestions) = document.get("suggestions").and_then(Value::as_array) {
        for suggestion in suggestions {
            match suggestion.as_str() {
                Some(text) => response.suggestions.push(text.to_string()),
                None => tracing::debug!("Skipping non-text suggestion: {}", suggestion),
            }
        }
    }

    response
}

fn read_message(message: &Value) -> Message {
    let role = match message.get("role").and_then(Value::as_str) {
        None => Role::Assistant,
        Some(tag) => Role::from_tag(tag).unwrap_or_else(|| {
            tracing::warn!("Unknown role: {}", tag);
            Role::Assistant
        }),
    };

    let mut parsed = Message::new(role);
    let items = message
        .get("content")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();
    for item in items {
        match MessageContent::from_wire(item) {
            Some(content) => parsed.content.push(content),
            None => tracing::debug!("Dropping unrecognised content item: {}", item),
        }
    }
    parsed
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::views;
    use serde_json::json;

    fn sample_document() -> Value {
        json!({
            "request_id": "req-42",
            "message": {
                "role": "assistant",
                "content": [
                    {"type": "thinking", "thinking": {"text": "Look up revenue"}},
                    {"type": "tool_use", "tool_use": {"id": "tu_1", "name": "analyst", "type": "cortex_analyst_text_to_sql", "arguments": {}}},
                    {"type": "tool_results", "tool_results": {"tool_use_id": "tu_1", "content": [
                        {"json": {"sql": "SELECT SUM(amount) FROM orders", "verified_query_used": true}}
                    ]}},
                    {"type": "text", "text": "Revenue was $1.2M."},
                    {"type": "annotation", "annotation": {}}
                ]
            },
            "suggestions": ["Break it down by region", 7]
        })
    }

    #[test]
    fn test_parse_document_object() -> anyhow::Result<()> {
        let response = parse_document(&sample_document())?;

        assert_eq!(response.request_id.as_deref(), Some("req-42"));
        assert_eq!(response.messages.len(), 1);
        assert_eq!(response.messages[0].content.len(), 4);
        assert_eq!(response.suggestions, ["Break it down by region"]);

        let summary = views::summarize(&response);
        assert_eq!(summary.text, "Revenue was $1.2M.");
        assert_eq!(summary.sql_queries, ["SELECT SUM(amount) FROM orders"]);
        assert_eq!(summary.tool_uses, 1);
        assert!(summary.verified_query_used);
        assert_eq!(summary.thinking, ["Look up revenue"]);
        Ok(())
    }

    #[test]
    fn test_parse_document_string_matches_object() -> anyhow::Result<()> {
        let document = sample_document();
        let from_string = parse_document(&Value::String(document.to_string()))?;
        assert_eq!(from_string, parse_document(&document)?);
        Ok(())
    }

    #[test]
    fn test_missing_sections_default() -> anyhow::Result<()> {
        let response = parse_document_str("{}")?;
        assert_eq!(response, Response::default());

        let response = parse_document(&json!({"message": {"content": "oops"}}))?;
        assert_eq!(response.messages.len(), 1);
        assert!(response.messages[0].is_assistant());
        assert!(response.messages[0].content.is_empty());
        Ok(())
    }

    #[test]
    fn test_user_role_kept() -> anyhow::Result<()> {
        let response = parse_document(&json!({
            "message": {"role": "user", "content": [{"type": "text", "text": "question"}]}
        }))?;
        assert_eq!(response.messages[0].role, Role::User);
        assert_eq!(views::final_text(&response), "");
        Ok(())
    }

    #[test]
    fn test_invalid_top_level_input() {
        for input in [json!(null), json!(3), json!([1, 2]), json!(true)] {
            assert!(matches!(
                parse_document(&input),
                Err(ParseError::InvalidDocument(_))
            ));
        }
        assert!(matches!(
            parse_document_str("not json"),
            Err(ParseError::InvalidDocument(_))
        ));
        assert!(matches!(
            parse_document(&json!("[1, 2]")),
            Err(ParseError::InvalidDocument(_))
        ));
    }
}
