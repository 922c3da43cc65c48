//! Cross-cutting error types for geoqa.
//!
//! Domain-specific errors (`SchemaError`, `StoreError`, `EngineError`) are
//! defined in their respective crates. This module only covers failures that
//! can arise while building core values.

use thiserror::Error;

/// Errors that can be raised while constructing core values.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A value failed validation (unknown mode, malformed identifier, ...).
    #[error("Validation error: {0}")]
    Validation(String),
}
