use anyhow::Result;
use console::style;
use cortex::views::{self, Summary};
use std::fmt::Write;

use crate::configuration::{OutputFormat, OutputSettings};

/// Cut text to `limit` characters, marking the cut with `...`
pub fn preview(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

pub fn render(summaries: &[Summary], settings: &OutputSettings) -> Result<String> {
    match settings.format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(summaries)?),
        OutputFormat::Text => Ok(render_text(summaries, settings)?),
    }
}

fn render_text(summaries: &[Summary], settings: &OutputSettings) -> Result<String, std::fmt::Error> {
    let mut out = String::new();
    writeln!(out, "Parsed {} sample responses:", summaries.len())?;

    for (index, summary) in summaries.iter().enumerate() {
        writeln!(out)?;
        writeln!(
            out,
            "{}",
            style(format!("--- Sample Response {} ---", index + 1)).bold()
        )?;
        writeln!(out, "Text: {}", preview(&summary.text, settings.preview_chars))?;
        writeln!(out, "SQL Queries: {}", summary.sql_queries.len())?;
        writeln!(out, "Citations: {}", summary.citations.len())?;
        writeln!(out, "Tool Uses: {}", summary.tool_uses)?;
        writeln!(out, "Search Results: {}", summary.search_results_count)?;
        writeln!(out, "Chart Specs: {}", summary.chart_specs.len())?;

        for (chart_index, spec) in summary.chart_specs.iter().enumerate() {
            writeln!(out, "  Chart: {}", views::chart_title(spec, chart_index))?;
        }
        if summary.verified_query_used {
            writeln!(out, "{}", style("Verified query used").green())?;
        }
        if let Some(sql) = summary.sql_queries.first() {
            writeln!(out, "SQL Query:")?;
            writeln!(out, "{}", preview(sql, settings.sql_preview_chars))?;
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cortex::{parse_lines, summarize};

    fn settings(format: OutputFormat) -> OutputSettings {
        OutputSettings {
            format,
            preview_chars: 10,
            sql_preview_chars: 8,
        }
    }

    fn summary() -> Summary {
        summarize(&parse_lines([
            "event: response.text.delta",
            r#"data: {"text": "Revenue peaked in March."}"#,
            "event: response.tool_result",
            r#"data: {"tool_use_id": "tu_1", "content": [{"json": {"sql": "SELECT month FROM orders", "chart": {"title": "Revenue"}}}]}"#,
        ]))
    }

    #[test]
    fn test_preview() {
        assert_eq!(preview("short", 10), "short");
        assert_eq!(preview("exactly10!", 10), "exactly10!");
        assert_eq!(preview("ünïcödé text", 5), "ünïcö...");
    }

    #[test]
    fn test_render_text() -> Result<()> {
        let out = render(&[summary()], &settings(OutputFormat::Text))?;

        assert!(out.starts_with("Parsed 1 sample responses:"));
        assert!(out.contains("Text: Revenue pe..."));
        assert!(out.contains("SQL Queries: 1"));
        assert!(out.contains("Chart Specs: 1"));
        assert!(out.contains("  Chart: Revenue"));
        assert!(out.contains("SELECT m..."));
        Ok(())
    }

    #[test]
    fn test_render_json() -> Result<()> {
        let out = render(&[summary()], &settings(OutputFormat::Json))?;
        let value: serde_json::Value = serde_json::from_str(&out)?;

        assert_eq!(value[0]["text"], "Revenue peaked in March.");
        assert_eq!(value[0]["sql_queries"][0], "SELECT month FROM orders");
        assert!(value[0]["planning_updates"].as_array().unwrap().is_empty());
        Ok(())
    }
}
