//! # geoqa-store
//!
//! Row-store capability interface for geoqa.
//!
//! The engine never talks to a database directly. It sees a table through
//! [`RowStore`]: field introspection, row reads, per-row status writes, and
//! workspace edit sessions. Two adapters ship here:
//!
//! - [`LibsqlRowStore`]: a local libSQL (`SQLite`) database file. In versioned
//!   mode writes outside an edit session are refused with
//!   [`StoreError::RequiresTransaction`], the same signal versioned
//!   enterprise geodatabases raise.
//! - [`MemoryRowStore`]: an in-process table with fault injection, used by
//!   engine tests.

pub mod error;
mod libsql_store;
mod memory;
pub mod target;

use std::collections::BTreeSet;

use geoqa_core::field::ActualField;
use geoqa_core::record::{RecordId, RecordRow};

pub use error::StoreError;
pub use libsql_store::LibsqlRowStore;
pub use memory::{MemoryRowStore, MemoryStats};
pub use target::TargetPath;

/// Outcome of writing one record's status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchOutcome {
    pub id: RecordId,
    /// `None` when the write landed.
    pub error: Option<String>,
}

impl PatchOutcome {
    #[must_use]
    pub const fn ok(id: RecordId) -> Self {
        Self { id, error: None }
    }

    #[must_use]
    pub fn failed(id: RecordId, error: impl Into<String>) -> Self {
        Self {
            id,
            error: Some(error.into()),
        }
    }

    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Tabular capability a QA run needs from its target.
///
/// Field names passed in are the store's own spellings (as returned by
/// [`RowStore::list_fields`]).
#[allow(async_fn_in_trait)]
pub trait RowStore {
    /// Field definitions of `table`, in store order.
    async fn list_fields(&self, table: &str) -> Result<Vec<ActualField>, StoreError>;

    /// Rows of `table` with `fields` projected in the given order, ordered by
    /// record id. `ids`, when given, restricts the rows returned.
    async fn read_records(
        &self,
        table: &str,
        fields: &[String],
        ids: Option<&BTreeSet<RecordId>>,
    ) -> Result<Vec<RecordRow>, StoreError>;

    /// Write `field` for each `(id, value)` pair.
    ///
    /// Per-row failures are reported in the returned outcomes, one per patch
    /// in input order. A batch-level `Err` means the store refused the whole
    /// write; `StoreError::RequiresTransaction` is returned before any row is
    /// touched.
    async fn update_field(
        &self,
        table: &str,
        field: &str,
        patches: &[(RecordId, String)],
    ) -> Result<Vec<PatchOutcome>, StoreError>;

    /// Open an edit session on `workspace`.
    async fn begin_edit(&self, workspace: &str) -> Result<(), StoreError>;

    /// Commit the open edit session.
    async fn commit_edit(&self, workspace: &str) -> Result<(), StoreError>;

    /// Discard every write made since [`RowStore::begin_edit`].
    async fn rollback_edit(&self, workspace: &str) -> Result<(), StoreError>;
}

/// Double-quote an identifier for SQL.
pub(crate) fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Compare workspace paths ignoring separator style, case, and trailing
/// separators.
pub(crate) fn same_workspace(a: &str, b: &str) -> bool {
    let norm = |s: &str| {
        s.trim()
            .trim_end_matches(['/', '\\'])
            .replace('\\', "/")
            .to_lowercase()
    };
    norm(a) == norm(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quotes_embedded_quotes() {
        assert_eq!(quote_ident("QAStatus"), "\"QAStatus\"");
        assert_eq!(quote_ident("a\"b"), "\"a\"\"b\"");
    }

    #[test]
    fn workspace_comparison_ignores_separator_style() {
        assert!(same_workspace(r"C:\data\qa.db", "c:/data/qa.db/"));
        assert!(!same_workspace("/data/a.db", "/data/b.db"));
    }
}
