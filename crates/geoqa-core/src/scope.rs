//! Scope decisions: which records are (re)checked in a run.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::record::RecordId;

/// Why a record entered scope. Both may hold at once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScopeReasons {
    pub not_passed: bool,
    pub recently_created: bool,
}

/// Per-record scope decision. Computed fresh every run, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScopeDecision {
    pub record_id: RecordId,
    pub in_scope: bool,
    pub reasons: ScopeReasons,
}

/// Scope counters as they appear in the report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScopeSummary {
    pub lookback_hours: u32,
    pub total_rows: u64,
    pub rows_in_scope: u64,
    pub rows_not_passed: u64,
    pub rows_newly_created: u64,
    /// Store spelling of the status field, when it exists.
    pub status_field: Option<String>,
    /// Store spelling of the creation-timestamp field, when one exists.
    pub created_date_field: Option<String>,
    /// Most frequent raw status values (`(blank)` for null/empty), by
    /// descending count.
    pub status_counts: Vec<StatusCount>,
}

/// Occurrences of one raw status value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusCount {
    pub value: String,
    pub count: u64,
}
