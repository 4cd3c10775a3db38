use std::path::PathBuf;
use thiserror::Error;

#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    #[error("Sample source not found: {}", .path.display())]
    SampleSourceMissing { path: PathBuf },

    #[error("Failed to read input: {0}")]
    Io(#[from] std::io::Error),
}

pub type ParseResult<T> = Result<T, ParseError>;
