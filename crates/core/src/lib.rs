//! `lumina-core`: shared identifiers and the base error model.
//!
//! Kept free of HTTP, storage and auth policy so every other crate can depend on it.

pub mod error;
pub mod id;

pub use error::{DomainError, DomainResult};
pub use id::{SessionId, UserId};
