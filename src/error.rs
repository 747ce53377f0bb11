//! Error types for blockpaste operations.
//!
//! Conversion itself never fails: malformed markup is normalized, not
//! rejected. These errors cover registry construction and the CLI.

use thiserror::Error;

/// Errors that can occur while building a registry or reading input.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid selector: {0}")]
    InvalidSelector(String),

    #[error("Block type already registered: {0}")]
    DuplicateBlockType(String),

    #[error("Unknown block type: {0}")]
    UnknownBlockType(String),

    #[error("Invalid paste mode: {0} (expected auto, inline or blocks)")]
    InvalidMode(String),
}

pub type Result<T> = std::result::Result<T, Error>;
