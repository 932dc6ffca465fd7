//! Error handling for FinanceTrack
//!
//! Domain error kinds live in [`FinanceError`]; everything is propagated
//! through `anyhow` so callers can attach context on the way up.

use thiserror::Error;

/// Core error kinds raised by the ledger, importers and assistant
#[derive(Error, Debug)]
pub enum FinanceError {
    #[error("database error: {0}")]
    DbError(String),

    #[error("parse error: {0}")]
    ParseError(String),

    #[error("validation error: {0}")]
    ValidationError(String),

    #[error("assistant error: {0}")]
    AssistantError(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("io error")]
    Io(#[from] std::io::Error),
}

/// Result type alias used across the crate
pub type Result<T> = anyhow::Result<T>;

/// Shorthand for raising a validation failure as an `anyhow::Error`
pub fn invalid(msg: impl Into<String>) -> anyhow::Error {
    FinanceError::ValidationError(msg.into()).into()
}
