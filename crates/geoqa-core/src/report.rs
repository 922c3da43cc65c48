//! Report sections and the run result returned to the orchestrator.
//!
//! A [`QaReport`] is composed once per run and never mutated afterwards. Each
//! integrity check contributes a [`CheckSection`], which records either the
//! check's output, the reason it was skipped, or the error it raised.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::RunStatus;
use crate::finding::Finding;
use crate::record::RecordId;
use crate::request::QaRequest;
use crate::scope::ScopeSummary;

// ---------------------------------------------------------------------------
// Check sections
// ---------------------------------------------------------------------------

/// Outcome of one integrity check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum CheckSection<T> {
    /// The check raised; the run continued without it.
    Failed { error: String },
    /// The check did not run (disabled, or its field is absent).
    Skipped { skipped: bool, reason: String },
    Ran(T),
}

impl<T> CheckSection<T> {
    #[must_use]
    pub fn skipped(reason: impl Into<String>) -> Self {
        Self::Skipped {
            skipped: true,
            reason: reason.into(),
        }
    }

    #[must_use]
    pub fn failed(error: impl Into<String>) -> Self {
        Self::Failed {
            error: error.into(),
        }
    }

    #[must_use]
    pub const fn ran(&self) -> Option<&T> {
        match self {
            Self::Ran(value) => Some(value),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

// ---------------------------------------------------------------------------
// Field comparison
// ---------------------------------------------------------------------------

/// Whether an expected field exists on the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum FieldPresence {
    Ok,
    Missing,
}

/// Comparison of one expected field against the target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FieldDetail {
    pub field: String,
    pub status: FieldPresence,
    pub expected_type: String,
    pub actual_type: Option<String>,
    /// `None` when type checking is off or the field is missing.
    pub type_match: Option<bool>,
    pub expected_length: Option<u32>,
    pub actual_length: Option<u32>,
    /// `None` unless length checking is on and both sides declare a length.
    pub length_match: Option<bool>,
    pub required: bool,
    pub nullable: bool,
}

// ---------------------------------------------------------------------------
// Identifier uniqueness
// ---------------------------------------------------------------------------

/// A duplicated value and how many scoped records hold it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateExample {
    pub value: String,
    pub count: u64,
}

/// Uniqueness and format summary of the identifier field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct IdentifierSummary {
    pub field: String,
    pub total_records: u64,
    pub null_count: u64,
    pub empty_count: u64,
    pub nonempty_count: u64,
    pub unique_nonempty_count: u64,
    /// Number of distinct values held by more than one record.
    pub duplicate_count: u64,
    pub duplicate_examples: Vec<DuplicateExample>,
    pub format_checked: bool,
    pub invalid_format_count: u64,
    pub invalid_examples: Vec<String>,
}

// ---------------------------------------------------------------------------
// Mandatory fields
// ---------------------------------------------------------------------------

/// Null/empty occurrences of one mandatory field across scoped records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MandatoryNullCount {
    pub field: String,
    pub total: u64,
    pub null_count: u64,
    pub non_null: u64,
}

/// A scoped record failing one or more mandatory fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NullFailureRow {
    pub record_id: RecordId,
    pub identifier: Option<String>,
    pub failing_fields: Vec<String>,
}

/// Records failing mandatory fields, capped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NullFailureSummary {
    pub total_failed_features: u64,
    /// First few failing records, independent of the cap.
    pub sample_failed_features: Vec<NullFailureRow>,
    pub truncated: bool,
    /// Every collected row up to the cap. Written to the run log, not the report.
    #[serde(skip)]
    pub rows: Vec<NullFailureRow>,
}

// ---------------------------------------------------------------------------
// Secondary duplicates
// ---------------------------------------------------------------------------

/// Records sharing one normalized value of the secondary field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateGroup {
    pub value: String,
    pub count: u64,
    pub record_ids: Vec<RecordId>,
    pub identifiers: Vec<Option<String>>,
}

/// Duplicate groups of the secondary business field. Warning-only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SecondaryDuplicateSummary {
    pub field: String,
    pub total_records: u64,
    pub null_value_count: u64,
    pub empty_value_count: u64,
    pub duplicate_count: u64,
    pub duplicate_groups: Vec<DuplicateGroup>,
    pub samples: Vec<DuplicateGroup>,
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// Status counts for one value of the grouping attribute.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GroupBucket {
    pub group: String,
    pub scope: u64,
    pub passed: u64,
    pub issue: u64,
    pub warning_issue: u64,
    pub blocking_issue: u64,
}

/// Overall and per-group status counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct IssueSummary {
    /// Grouping attribute as configured (or resolved on the store).
    pub group_field: String,
    pub scope: u64,
    pub passed: u64,
    pub issue: u64,
    pub warning_issue: u64,
    pub blocking_issue: u64,
    /// Sorted by descending `issue`, then ascending `group`.
    pub groups: Vec<GroupBucket>,
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// Snapshot of every finding, status, and aggregate of one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct QaReport {
    pub dataset_name: Option<String>,
    pub expected_field_count: u64,
    pub actual_field_count: u64,
    pub scope: ScopeSummary,
    /// Blocking missing fields.
    pub missing_fields: Vec<String>,
    /// Missing fields designated non-blocking.
    pub missing_warnings: Vec<String>,
    pub extra_fields: Vec<String>,
    pub details: Vec<FieldDetail>,
    pub nguid_summary: CheckSection<IdentifierSummary>,
    pub mandatory_missing: Vec<String>,
    pub mandatory_nulls: CheckSection<Vec<MandatoryNullCount>>,
    pub mandatory_null_failures: CheckSection<NullFailureSummary>,
    pub address_duplicates: CheckSection<SecondaryDuplicateSummary>,
    pub issues_by_agency: IssueSummary,
    /// Dataset-global findings applied to every scoped record.
    pub global_findings: Vec<Finding>,
}

// ---------------------------------------------------------------------------
// Status update
// ---------------------------------------------------------------------------

/// Counters of a status write-back.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdateSummary {
    pub total: u64,
    pub successes: u64,
    pub failures: u64,
    /// Records whose stored status already matched and were not rewritten.
    pub unchanged: u64,
    /// Up to the configured number of `record <id>: <error>` samples.
    pub errors: Vec<String>,
    pub used_edit_session: bool,
    pub edit_workspace: Option<String>,
}

/// Outcome of the write-back step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum StatusUpdate {
    Skipped { skipped: bool, reason: String },
    Applied(StatusUpdateSummary),
}

impl StatusUpdate {
    #[must_use]
    pub fn skipped(reason: impl Into<String>) -> Self {
        Self::Skipped {
            skipped: true,
            reason: reason.into(),
        }
    }

    #[must_use]
    pub const fn applied(&self) -> Option<&StatusUpdateSummary> {
        match self {
            Self::Applied(summary) => Some(summary),
            Self::Skipped { .. } => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Digest and result
// ---------------------------------------------------------------------------

/// Flat counters for the nightly notification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmailSummary {
    pub status: String,
    pub qa_passed: bool,
    pub missing_fields_count: u64,
    pub missing_warnings_count: u64,
    pub nguid_duplicate_count: u64,
    pub nguid_invalid_count: u64,
    pub mandatory_missing_count: u64,
    pub mandatory_fields_with_nulls: Vec<String>,
    pub failed_null_feature_count: u64,
    pub address_duplicate_count: u64,
    pub address_duplicates_warning_only: bool,
    pub scope_feature_count: u64,
    pub passed_feature_count: u64,
    pub issue_feature_count: u64,
    pub warning_issue_feature_count: u64,
    pub blocking_issue_feature_count: u64,
}

/// Everything the orchestrator receives from one invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct QaRunResult {
    /// UTC run timestamp, `%Y%m%d_%H%M%S`.
    pub timestamp: String,
    pub success: bool,
    pub qa_passed: bool,
    pub status: RunStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub inputs: QaRequest,
    pub report: Option<QaReport>,
    pub status_update: Option<StatusUpdate>,
    pub email_summary: EmailSummary,
    pub email_summary_text: String,
    /// JSON run log written for this run, when logging to disk is configured.
    pub log_path: Option<String>,
}
