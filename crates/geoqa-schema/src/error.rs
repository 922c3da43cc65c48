//! Schema loading error types.

use thiserror::Error;

/// Errors from loading a schema document.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// The schema document could not be read.
    #[error("Cannot read schema document '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The schema document is not valid JSON.
    #[error("Schema document is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// The document is JSON but not shaped like a schema document.
    #[error("Schema document failed validation: {errors:?}")]
    Invalid {
        /// Individual error messages from the validator.
        errors: Vec<String>,
    },

    /// The document declares no candidate datasets.
    #[error("No datasets found in schema document")]
    NoDatasets,

    /// The requested dataset does not exist.
    #[error("Dataset '{name}' not found. Available: {available}")]
    DatasetNotFound { name: String, available: String },
}
