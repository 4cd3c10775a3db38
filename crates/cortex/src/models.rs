//! These models represent one agent turn after it has been parsed
//!
//! There are three different wire encodings of the same turn that we need to read:
//! - the live event stream, `event:` / `data:` lines carrying deltas
//! - the consolidated JSON document returned by non-streaming calls
//! - observability trace samples, attribute lists recorded offline
//!
//! Every encoding is folded into the same [`response::Response`], so the derived
//! views never need to know which one was captured.
pub mod message;
pub mod response;
pub mod role;
pub mod tool;
