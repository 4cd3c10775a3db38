//! Parsing of agent turns into one conversation model.
//!
//! A turn arrives as an `event:` / `data:` stream ([`accumulator`]), as one JSON
//! document ([`document`]) or as an offline trace recording ([`trace`]). All three
//! produce a [`Response`], from which [`views`] computes the final text, queries,
//! citations, verification status and chart specifications.
//!
//! ```
//! let response = cortex::parse_lines([
//!     "event: response.text.delta",
//!     r#"data: {"text": "Hello"}"#,
//!     "data: [DONE]",
//! ]);
//! assert_eq!(cortex::views::final_text(&response), "Hello");
//! ```
pub mod accumulator;
pub mod document;
pub mod errors;
pub mod frame;
pub mod models;
pub mod samples;
pub mod trace;
pub mod views;

pub use accumulator::{parse_lines, DeltaAccumulator, StreamParser};
pub use document::{parse_document, parse_document_str};
pub use errors::{ParseError, ParseResult};
pub use models::message::{Message, MessageContent};
pub use models::response::Response;
pub use models::role::Role;
pub use models::tool::{ToolResult, ToolUse};
pub use samples::SampleLoader;
pub use trace::{parse_trace_lines, TraceExtractor};
pub use views::{summarize, Summary};
