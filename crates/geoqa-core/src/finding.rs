//! Findings and the per-record status string.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::enums::{CheckKind, Severity};
use crate::record::RecordId;

/// Status text of a record with no findings.
pub const PASSED: &str = "Passed";

/// Prefix of a warning-only status.
pub const WARNING_PREFIX: &str = "Warning: ";

/// Separator between joined finding messages.
pub const MESSAGE_SEPARATOR: &str = "; ";

/// One result of a check.
///
/// A finding without `record_id` is dataset-global: it applies to every
/// in-scope record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Finding {
    pub check: CheckKind,
    pub severity: Severity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_id: Option<RecordId>,
    pub message: String,
}

impl Finding {
    #[must_use]
    pub fn global_error(check: CheckKind, message: impl Into<String>) -> Self {
        Self {
            check,
            severity: Severity::Error,
            record_id: None,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn record_error(check: CheckKind, record_id: RecordId, message: impl Into<String>) -> Self {
        Self {
            check,
            severity: Severity::Error,
            record_id: Some(record_id),
            message: message.into(),
        }
    }

    #[must_use]
    pub fn record_warning(
        check: CheckKind,
        record_id: RecordId,
        message: impl Into<String>,
    ) -> Self {
        Self {
            check,
            severity: Severity::Warning,
            record_id: Some(record_id),
            message: message.into(),
        }
    }

    #[must_use]
    pub const fn is_global(&self) -> bool {
        self.record_id.is_none()
    }
}

/// The single synthesized status of a record: `Passed`, `Warning: ...`, or
/// the joined error messages.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct RecordStatus(String);

impl RecordStatus {
    #[must_use]
    pub fn passed() -> Self {
        Self(PASSED.to_string())
    }

    /// Build a warning status from already-joined warning messages.
    #[must_use]
    pub fn warning(joined: &str) -> Self {
        Self(format!("{WARNING_PREFIX}{joined}"))
    }

    /// Build an error status from already-joined error messages.
    #[must_use]
    pub fn errors(joined: impl Into<String>) -> Self {
        Self(joined.into())
    }

    /// Wrap a status read back from the store.
    #[must_use]
    pub fn from_stored(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive `passed`, ignoring surrounding whitespace.
    #[must_use]
    pub fn is_passed(&self) -> bool {
        is_passed_text(&self.0)
    }

    /// Status text starts with `Warning` (case-insensitive).
    #[must_use]
    pub fn is_warning(&self) -> bool {
        self.0
            .trim()
            .get(..7)
            .is_some_and(|head| head.eq_ignore_ascii_case("warning"))
    }

    /// Not passed and not a warning.
    #[must_use]
    pub fn is_blocking(&self) -> bool {
        !self.is_passed() && !self.is_warning()
    }
}

impl fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<RecordStatus> for String {
    fn from(status: RecordStatus) -> Self {
        status.0
    }
}

/// Whether stored status text means the record passed QA.
#[must_use]
pub fn is_passed_text(raw: &str) -> bool {
    raw.trim().eq_ignore_ascii_case(PASSED)
}
