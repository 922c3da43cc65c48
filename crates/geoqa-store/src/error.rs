//! Row-store error types for geoqa-store.

use thiserror::Error;

/// Errors from row-store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The target identifier cannot be interpreted.
    #[error("Invalid target '{0}'")]
    InvalidTarget(String),

    /// The target table does not exist or is not accessible.
    #[error("Target does not exist or is not accessible: {0}")]
    TargetNotFound(String),

    /// Field definitions could not be read.
    #[error("Field introspection failed: {0}")]
    FieldIntrospection(String),

    /// A requested field does not exist on the table.
    #[error("Field '{field}' does not exist on '{table}'")]
    UnknownField { table: String, field: String },

    /// A read or write statement failed.
    #[error("Query failed: {0}")]
    Query(String),

    /// The store only accepts this mutation inside an edit session.
    ///
    /// Adapters translate their backend's own signal into this variant so
    /// callers can branch on it without inspecting messages.
    #[error("Mutation requires an edit session: {0}")]
    RequiresTransaction(String),

    /// The workspace edit lock could not be acquired.
    #[error("Could not acquire edit lock: {0}")]
    EditLock(String),

    /// Commit or rollback was requested without an open edit session.
    #[error("No edit session is open")]
    NoEditSession,

    /// An edit session was requested on a workspace this store does not own.
    #[error("Workspace mismatch: store owns '{expected}', got '{actual}'")]
    WorkspaceMismatch { expected: String, actual: String },

    /// The target has no enclosing workspace to open an edit session on.
    #[error("Cannot derive a workspace from target '{0}'")]
    NoWorkspace(String),

    /// Underlying libSQL error.
    #[error("libSQL error: {0}")]
    LibSql(#[from] libsql::Error),
}

impl StoreError {
    /// Whether this is the versioned-storage "needs an edit session" signal.
    #[must_use]
    pub const fn requires_transaction(&self) -> bool {
        matches!(self, Self::RequiresTransaction(_))
    }
}
