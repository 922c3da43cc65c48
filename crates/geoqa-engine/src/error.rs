//! Engine error types for geoqa-engine.

use geoqa_schema::SchemaError;
use geoqa_store::StoreError;
use thiserror::Error;

/// Fatal errors that abort a QA run.
///
/// Per-check and per-record failures never surface here; they are recorded
/// in the report instead.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A required input is blank or invalid.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The schema document could not be loaded.
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    /// The target could not be reached or introspected.
    #[error("Store access error: {0}")]
    StoreAccess(#[from] StoreError),

    /// Status write-back failed as a whole (edit session could not be
    /// opened or committed, or the batch failed inside it and was rolled
    /// back).
    #[error("Status update failed: {0}")]
    StatusUpdate(#[source] StoreError),
}

/// Errors writing run-log files. These are logged, never fatal.
#[derive(Debug, Error)]
pub enum RunLogError {
    #[error("Cannot write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Coarse classification of [`EngineError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Schema,
    StoreAccess,
    StatusUpdate,
}

impl ErrorKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Configuration => "configuration",
            Self::Schema => "schema",
            Self::StoreAccess => "store_access",
            Self::StatusUpdate => "status_update",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl EngineError {
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Configuration(_) => ErrorKind::Configuration,
            Self::Schema(_) => ErrorKind::Schema,
            Self::StoreAccess(_) => ErrorKind::StoreAccess,
            Self::StatusUpdate(_) => ErrorKind::StatusUpdate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_follow_variants() {
        assert_eq!(
            EngineError::Configuration("target is blank".into()).kind(),
            ErrorKind::Configuration
        );
        assert_eq!(
            EngineError::from(StoreError::TargetNotFound("Points".into())).kind(),
            ErrorKind::StoreAccess
        );
        assert_eq!(
            EngineError::StatusUpdate(StoreError::EditLock("busy".into())).kind(),
            ErrorKind::StatusUpdate
        );
        assert_eq!(ErrorKind::StoreAccess.to_string(), "store_access");
    }
}
