//! Integrity Checkers.
//!
//! Each checker reads only the in-scope records and returns a
//! [`CheckOutput`]: the report section plus the per-record findings the
//! status synthesizer consumes. Checkers are independent; a store failure in
//! one is settled into a failed section by [`settle`] and never stops the
//! others.

pub mod duplicates;
pub mod identifier;
pub mod mandatory;

use std::collections::BTreeSet;

use geoqa_config::EngineConfig;
use geoqa_core::finding::Finding;
use geoqa_core::record::{FieldValue, RecordId, RecordRow};
use geoqa_core::report::CheckSection;
use geoqa_store::{RowStore, StoreError};

/// What a checker reads from.
pub struct CheckContext<'a, S> {
    pub store: &'a S,
    pub table: &'a str,
    /// In-scope record ids. Records outside are never read.
    pub scope: &'a BTreeSet<RecordId>,
    pub config: &'a EngineConfig,
}

impl<S: RowStore> CheckContext<'_, S> {
    /// In-scope rows with `fields` projected in order.
    pub(crate) async fn read(&self, fields: &[String]) -> Result<Vec<RecordRow>, StoreError> {
        if self.scope.is_empty() {
            return Ok(Vec::new());
        }
        self.store
            .read_records(self.table, fields, Some(self.scope))
            .await
    }
}

/// A checker's report section and its per-record findings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckOutput<T> {
    pub section: CheckSection<T>,
    pub findings: Vec<Finding>,
}

impl<T> CheckOutput<T> {
    #[must_use]
    pub const fn ran(summary: T, findings: Vec<Finding>) -> Self {
        Self {
            section: CheckSection::Ran(summary),
            findings,
        }
    }

    #[must_use]
    pub fn skipped(reason: impl Into<String>) -> Self {
        Self {
            section: CheckSection::skipped(reason),
            findings: Vec::new(),
        }
    }

    #[must_use]
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            section: CheckSection::failed(error),
            findings: Vec::new(),
        }
    }
}

/// Turn a checker's result into its output, degrading errors into a failed
/// section.
pub fn settle<T>(check: &str, result: Result<CheckOutput<T>, StoreError>) -> CheckOutput<T> {
    match result {
        Ok(output) => {
            tracing::debug!(check, findings = output.findings.len(), "check finished");
            output
        }
        Err(e) => {
            tracing::warn!(check, error = %e, "check failed; continuing without it");
            CheckOutput::failed(e.to_string())
        }
    }
}

/// Raw text of a value, `None` for null.
pub(crate) fn raw_text(value: &FieldValue) -> Option<String> {
    (!value.is_null()).then(|| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use geoqa_core::report::IdentifierSummary;

    #[test]
    fn settle_keeps_output_and_degrades_errors() {
        let ok: CheckOutput<IdentifierSummary> =
            settle("identifier", Ok(CheckOutput::ran(IdentifierSummary::default(), vec![])));
        assert!(ok.section.ran().is_some());

        let failed: CheckOutput<IdentifierSummary> =
            settle("identifier", Err(StoreError::Query("disk I/O error".into())));
        assert!(failed.section.is_failed());
        assert!(failed.findings.is_empty());
    }
}
