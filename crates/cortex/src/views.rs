//! Read-only views computed from a parsed [`Response`].
//!
//! Every view is total: absent or oddly shaped data yields an empty value, never an error.
use serde::Serialize;
use serde_json::{Map, Value};

use crate::models::response::Response;
use crate::models::tool::ToolResult;

/// Chart keys looked up in an item's structured payload, highest priority first
pub const CHART_KEYS: [&str; 5] = ["chart", "visualization", "vega_lite", "vegaLite", "vegalite"];
/// Chart keys looked up in the structured payload's nested `results` object
pub const NESTED_CHART_KEYS: [&str; 2] = ["chart", "visualization"];
/// Chart keys looked up at the top level of an item
pub const ITEM_CHART_KEYS: [&str; 2] = ["chart", "visualization"];

/// Keys copied into the verification mapping
pub const VERIFICATION_KEYS: [&str; 5] = [
    "verification",
    "validated",
    "query_verified",
    "verified_query_used",
    "query_validation",
];
/// Keys that mark a verified query when truthy. `query_validation` is reported but never counts.
pub const VERIFIED_QUERY_KEYS: [&str; 4] = [
    "verified_query_used",
    "query_verified",
    "validated",
    "verification",
];

/// Text of the last assistant message, or "" if there is none
pub fn final_text(response: &Response) -> String {
    response
        .messages
        .iter()
        .rev()
        .find(|message| message.is_assistant())
        .map(|message| message.text())
        .unwrap_or_default()
}

/// Every `sql` string in every tool result, in document order
pub fn sql_queries(response: &Response) -> Vec<String> {
    response
        .tool_results()
        .flat_map(|result| result.structured())
        .filter_map(|data| data.get("sql").and_then(Value::as_str))
        .filter(|sql| !sql.is_empty())
        .map(String::from)
        .collect()
}

/// Every `searchResults` record in every tool result, in document order
pub fn search_results(response: &Response) -> Vec<Value> {
    response
        .tool_results()
        .flat_map(|result| result.structured())
        .filter_map(|data| data.get("searchResults").and_then(Value::as_array))
        .flatten()
        .cloned()
        .collect()
}

/// `"{title}: {text} [Source: {id}]"`, without the suffix when the id is missing.
/// None unless the record has both a title and a text. A null field counts as missing.
pub fn citation(result: &Value) -> Option<String> {
    let title = present(result, "doc_title")?;
    let text = present(result, "text")?;
    let mut citation = format!("{}: {}", plain(title), plain(text));
    if let Some(id) = present(result, "doc_id") {
        citation.push_str(&format!(" [Source: {}]", plain(id)));
    }
    Some(citation)
}

pub fn citations(response: &Response) -> Vec<String> {
    search_results(response).iter().filter_map(citation).collect()
}

/// The chart of one tool result: the first item that carries any chart key decides
pub fn chart_spec(result: &ToolResult) -> Option<&Value> {
    result.content.iter().find_map(item_chart)
}

fn item_chart(item: &Value) -> Option<&Value> {
    let item = item.as_object()?;

    if let Some(data) = item.get("json").and_then(Value::as_object) {
        if let Some(chart) = first_key(data, &CHART_KEYS) {
            return Some(chart);
        }
        if let Some(results) = data.get("results").and_then(Value::as_object) {
            if let Some(chart) = first_key(results, &NESTED_CHART_KEYS) {
                return Some(chart);
            }
        }
    }

    first_key(item, &ITEM_CHART_KEYS)
}

fn first_key<'a>(object: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|key| object.get(*key))
}

/// At most one chart per tool result, in document order. Empty specs are dropped.
pub fn chart_specs(response: &Response) -> Vec<Value> {
    response
        .tool_results()
        .filter_map(chart_spec)
        .filter(|chart| is_truthy(chart))
        .cloned()
        .collect()
}

/// Display title for a chart: its `title` string or `title.text`, else `Chart {n}`
pub fn chart_title(spec: &Value, index: usize) -> String {
    let title = match spec.get("title") {
        Some(Value::String(title)) => Some(title.as_str()),
        Some(Value::Object(title)) => title.get("text").and_then(Value::as_str),
        _ => None,
    };
    match title {
        Some(title) if !title.is_empty() => title.to_string(),
        _ => format!("Chart {}", index + 1),
    }
}

fn tool_verification(result: &ToolResult) -> Map<String, Value> {
    let mut info = Map::new();
    for data in result.structured() {
        for key in VERIFICATION_KEYS {
            if let Some(value) = data.get(key) {
                info.insert(key.to_string(), value.clone());
            }
        }
    }
    info
}

/// Verification keys merged across tool results; later results win on collision
pub fn verification_info(response: &Response) -> Map<String, Value> {
    let mut info = Map::new();
    for result in response.tool_results() {
        info.extend(tool_verification(result));
    }
    info
}

pub fn is_verified_query(result: &ToolResult) -> bool {
    let info = tool_verification(result);
    VERIFIED_QUERY_KEYS
        .iter()
        .any(|key| info.get(*key).is_some_and(is_truthy))
}

pub fn verified_query_used(response: &Response) -> bool {
    response.tool_results().any(is_verified_query)
}

/// Trimmed, non-empty thinking spans in document order
pub fn thinking_texts(response: &Response) -> Vec<String> {
    response
        .messages
        .iter()
        .flat_map(|message| message.thinking())
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(String::from)
        .collect()
}

pub fn tool_use_count(response: &Response) -> usize {
    response.tool_uses().count()
}

/// Snapshot of every view, in the shape the renderer consumes
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub text: String,
    pub sql_queries: Vec<String>,
    pub citations: Vec<String>,
    pub suggestions: Vec<String>,
    pub tool_uses: usize,
    pub search_results_count: usize,
    pub verification_info: Map<String, Value>,
    pub verified_query_used: bool,
    #[serde(rename = "planning_updates")]
    pub thinking: Vec<String>,
    pub chart_specs: Vec<Value>,
}

pub fn summarize(response: &Response) -> Summary {
    Summary {
        text: final_text(response),
        sql_queries: sql_queries(response),
        citations: citations(response),
        suggestions: response.suggestions.clone(),
        tool_uses: tool_use_count(response),
        search_results_count: search_results(response).len(),
        verification_info: verification_info(response),
        verified_query_used: verified_query_used(response),
        thinking: thinking_texts(response),
        chart_specs: chart_specs(response),
    }
}

// Loose truthiness for flags that arrive as bools, numbers or strings
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(fields) => !fields.is_empty(),
    }
}

fn present<'a>(record: &'a Value, key: &str) -> Option<&'a Value> {
    record.get(key).filter(|value| !value.is_null())
}

fn plain(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
