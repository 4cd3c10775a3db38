//! Loader for recorded sample files.
//!
//! A sample file holds several captured responses, each introduced by a marker line
//! (`Sample response 1:` and so on). A sample is parsed as a trace recording when any
//! of its data lines decodes to a non-empty trace batch, and as an event stream otherwise.
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::accumulator::parse_lines;
use crate::errors::{ParseError, ParseResult};
use crate::frame::{Frame, FrameReader, Payload};
use crate::models::response::Response;
use crate::trace::parse_trace_lines;

pub const SAMPLE_MARKER: &str = "Sample response";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleEncoding {
    Stream,
    Trace,
}

#[derive(Debug, Clone)]
pub struct SampleLoader {
    marker: String,
}

impl Default for SampleLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl SampleLoader {
    pub fn new() -> Self {
        Self {
            marker: SAMPLE_MARKER.to_string(),
        }
    }

    pub fn with_marker<S: Into<String>>(mut self, marker: S) -> Self {
        self.marker = marker.into();
        self
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }

    /// Read and parse every sample in a file
    pub fn load(&self, path: impl AsRef<Path>) -> ParseResult<Vec<Response>> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => ParseError::SampleSourceMissing {
                path: path.to_path_buf(),
            },
            _ => ParseError::Io(e),
        })?;
        Ok(self.parse_str(&contents))
    }

    pub fn parse_str(&self, contents: &str) -> Vec<Response> {
        self.split(contents)
            .into_iter()
            .map(|lines| match detect_encoding(&lines) {
                SampleEncoding::Trace => parse_trace_lines(lines),
                SampleEncoding::Stream => parse_lines(lines),
            })
            .collect()
    }

    /// Trimmed, non-blank lines of each sample. Lines before the first marker are
    /// ignored, and a marker with nothing after it yields no sample.
    pub fn split<'a>(&self, contents: &'a str) -> Vec<Vec<&'a str>> {
        let mut samples = Vec::new();
        let mut current: Option<Vec<&str>> = None;

        for line in contents.lines().map(str::trim) {
            if line.starts_with(self.marker.as_str()) {
                if let Some(lines) = current.take().filter(|lines| !lines.is_empty()) {
                    samples.push(lines);
                }
                current = Some(Vec::new());
                continue;
            }
            if let Some(lines) = current.as_mut() {
                if !line.is_empty() {
                    lines.push(line);
                }
            }
        }

        if let Some(lines) = current.filter(|lines| !lines.is_empty()) {
            samples.push(lines);
        }
        samples
    }
}

/// Lines that merely look like a batch but do not decode are not trace evidence
pub fn detect_encoding(lines: &[&str]) -> SampleEncoding {
    let mut reader = FrameReader::new();
    let is_trace = lines.iter().any(|line| match reader.read_line(line) {
        Some(Frame::Data(frame)) => {
            matches!(frame.payload(), Payload::Trace(batch) if !batch.is_empty())
        }
        _ => false,
    });
    if is_trace {
        SampleEncoding::Trace
    } else {
        SampleEncoding::Stream
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::views;
    use std::fs;

    const SAMPLES: &str = r#"
Captured from staging

Sample response 1:
event: response.text.delta
data: {"text": "Hello"}

data: {"text": " there"}
data: [DONE]

Sample response 2:

Sample response 3:
data: ["{\"attributes\": [{\"key\": \"ai.observability.agent.response\", \"value\": {\"stringValue\": \"From trace\"}}]}"]
"#;

    #[test]
    fn test_split_samples() {
        let samples = SampleLoader::new().split(SAMPLES);
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].len(), 4);
        assert_eq!(samples[0][0], "event: response.text.delta");
        assert_eq!(samples[1].len(), 1);
    }

    #[test]
    fn test_detect_encoding() {
        assert_eq!(
            detect_encoding(&["event: response.text.delta", r#"data: {"text": "x"}"#]),
            SampleEncoding::Stream
        );
        assert_eq!(detect_encoding(&[r#"data: ["{}"]"#]), SampleEncoding::Trace);
        assert_eq!(detect_encoding(&["data: [DONE]"]), SampleEncoding::Stream);
        assert_eq!(detect_encoding(&["data: [garbage"]), SampleEncoding::Stream);
        assert_eq!(detect_encoding(&["data: []"]), SampleEncoding::Stream);
        assert_eq!(detect_encoding(&[]), SampleEncoding::Stream);
    }

    #[test]
    fn test_broken_batch_line_keeps_stream_text() {
        let contents = r#"Sample response 1:
event: response.text.delta
data: {"text": "Hello"}
data: [garbage
data: [DONE]
Sample response 2:
data: ["{\"attributes\": [{\"key\": \"ai.observability.agent.response\", \"value\": {\"stringValue\": \"Traced\"}}]}"]
"#;
        let responses = SampleLoader::new().parse_str(contents);
        assert_eq!(responses.len(), 2);
        assert_eq!(views::final_text(&responses[0]), "Hello");
        assert_eq!(views::final_text(&responses[1]), "Traced");
    }

    #[test]
    fn test_parse_str_mixed_encodings() {
        let responses = SampleLoader::new().parse_str(SAMPLES);
        assert_eq!(responses.len(), 2);
        assert_eq!(views::final_text(&responses[0]), "Hello there");
        assert_eq!(views::final_text(&responses[1]), "From trace");
    }

    #[test]
    fn test_custom_marker() {
        let contents = "=== run\ndata: {\"role\": \"assistant\", \"content\": []}\n";
        let loader = SampleLoader::new().with_marker("=== run");
        assert_eq!(loader.marker(), "=== run");
        assert_eq!(loader.split(contents).len(), 1);
        assert!(SampleLoader::new().split(contents).is_empty());
    }

    #[test]
    fn test_load_from_file() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("sample_responses");
        fs::write(&path, SAMPLES)?;

        let responses = SampleLoader::new().load(&path)?;
        assert_eq!(responses.len(), 2);
        Ok(())
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("does_not_exist");

        match SampleLoader::new().load(&path) {
            Err(ParseError::SampleSourceMissing { path: missing }) => assert_eq!(missing, path),
            other => panic!("expected SampleSourceMissing, got {:?}", other),
        }
    }
}
