//! Base error model.

use thiserror::Error;

/// Result type used by the shared building blocks.
pub type DomainResult<T> = Result<T, DomainError>;

/// Deterministic failures shared across crates (parsing, validation).
///
/// Authorization outcomes are not errors at this layer; they live in
/// `lumina-auth` as decisions.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. malformed input).
    #[error("validation failed: {0}")]
    Validation(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }
}
