//! Rebuilds a [`Response`] from observability trace samples.
//!
//! A trace data line holds a JSON array whose elements are themselves JSON-encoded
//! span objects. Each span carries a flat `attributes` list of `{key, value}` pairs;
//! the keys below are the only ones that map onto the conversation model.
use serde_json::{json, Value};

use crate::frame::{Frame, FrameReader, Payload};
use crate::models::message::Message;
use crate::models::response::Response;
use crate::models::tool::ToolResult;
use crate::views;

pub const AGENT_RESPONSE_KEY: &str = "ai.observability.agent.response";
pub const SQL_QUERY_KEY: &str = "ai.observability.agent.tool.cortex_analyst.sql_query";
pub const SEARCH_RESULTS_KEY: &str = "ai.observability.agent.tool.cortex_search.results";
pub const REQUEST_ID_KEY: &str = "ai.observability.agent.request_id";

/// Tool use id given to queries recovered from a trace
pub const ANALYST_TOOL_ID: &str = "cortex_analyst";
/// Tool use id given to search results recovered from a trace
pub const SEARCH_TOOL_ID: &str = "cortex_search";
/// Provenance label attached to recovered search results
pub const SEARCH_RESULT_TITLE: &str = "Support Cases";
/// Search result text longer than this many characters is cut and marked with `...`
pub const SEARCH_SNIPPET_LIMIT: usize = 1000;

#[derive(Debug, Clone, Default)]
pub struct TraceExtractor {
    reader: FrameReader,
    response: Response,
}

impl TraceExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one line of a sample. Only data lines holding a trace batch are used.
    pub fn push_line(&mut self, line: &str) {
        let Some(Frame::Data(frame)) = self.reader.read_line(line) else {
            return;
        };
        if let Payload::Trace(batch) = frame.payload() {
            for encoded in batch {
                match decode_span(encoded) {
                    Some(span) => self.extract(&span),
                    None => tracing::debug!("Skipping undecodable trace object"),
                }
            }
        }
    }

    /// Apply every recognised attribute of one span
    pub fn extract(&mut self, span: &Value) {
        let Some(attributes) = span.get("attributes").and_then(Value::as_array) else {
            return;
        };

        for attribute in attributes {
            let key = attribute.get("key").and_then(Value::as_str).unwrap_or_default();
            let value = attribute.get("value").unwrap_or(&Value::Null);
            match key {
                AGENT_RESPONSE_KEY => self.add_agent_response(string_value(value)),
                SQL_QUERY_KEY => self.add_sql_query(string_value(value)),
                SEARCH_RESULTS_KEY => self.add_search_results(value),
                REQUEST_ID_KEY => self.response.set_request_id(string_value(value)),
                _ => {}
            }
        }
    }

    fn add_agent_response(&mut self, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        let seen = self
            .response
            .messages
            .iter()
            .any(|message| message.text() == text);
        if !seen {
            self.response
                .messages
                .push(Message::assistant().with_text(text));
        }
    }

    fn add_sql_query(&mut self, sql: &str) {
        let sql = sql.trim();
        if sql.is_empty() || views::sql_queries(&self.response).iter().any(|q| q == sql) {
            return;
        }
        self.response.append_tool_result(ToolResult::new(
            ANALYST_TOOL_ID,
            vec![json!({"json": {"sql": sql}})],
        ));
    }

    fn add_search_results(&mut self, value: &Value) {
        let Some(values) = value
            .get("arrayValue")
            .and_then(|array| array.get("values"))
            .and_then(Value::as_array)
        else {
            return;
        };

        for (index, entry) in values.iter().enumerate() {
            let text = string_value(entry);
            if text.is_empty() {
                continue;
            }
            let record = json!({
                "text": truncate_snippet(text),
                "doc_title": SEARCH_RESULT_TITLE,
                "doc_id": format!("search_result_{}", index + 1),
            });
            self.response.append_tool_result(ToolResult::new(
                SEARCH_TOOL_ID,
                vec![json!({"json": {"searchResults": [record]}})],
            ));
        }
    }

    pub fn finish(self) -> Response {
        self.response
    }
}

// Elements are normally JSON strings holding a span; a bare object is taken as-is
fn decode_span(encoded: &Value) -> Option<Value> {
    match encoded {
        Value::String(raw) => serde_json::from_str(raw).ok(),
        Value::Object(_) => Some(encoded.clone()),
        _ => None,
    }
}

fn string_value(value: &Value) -> &str {
    value
        .get("stringValue")
        .and_then(Value::as_str)
        .unwrap_or_default()
}

fn truncate_snippet(text: &str) -> String {
    match text.char_indices().nth(SEARCH_SNIPPET_LIMIT) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

/// Parse the lines of one trace sample
pub fn parse_trace_lines<I, S>(lines: I) -> Response
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut extractor = TraceExtractor::new();
    for line in lines {
        extractor.push_line(line.as_ref());
    }
    extractor.finish()
}
