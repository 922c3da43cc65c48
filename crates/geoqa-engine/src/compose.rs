//! Report Composer: run-level verdict, digest, and result assembly.

use chrono::{DateTime, Utc};
use geoqa_core::enums::RunStatus;
use geoqa_core::report::{EmailSummary, QaReport, QaRunResult, StatusUpdate};
use geoqa_core::request::QaRequest;

/// Overall verdict over a composed report.
///
/// Passing requires no blocking missing fields, no missing mandatory fields,
/// no nulls in any mandatory field, no identifier duplicates, and (when the
/// format was checked) no malformed identifiers. Checks that were skipped or
/// failed count as passing. Secondary duplicates never matter.
#[must_use]
pub fn qa_passed(report: &QaReport) -> bool {
    let no_missing = report.missing_fields.is_empty();
    let no_mandatory_missing = report.mandatory_missing.is_empty();
    let no_mandatory_nulls = report
        .mandatory_nulls
        .ran()
        .is_none_or(|counts| counts.iter().all(|c| c.null_count == 0));
    let identifiers_ok = report.nguid_summary.ran().is_none_or(|s| {
        s.duplicate_count == 0 && (!s.format_checked || s.invalid_format_count == 0)
    });
    no_missing && no_mandatory_missing && no_mandatory_nulls && identifiers_ok
}

/// Structured digest counters.
#[must_use]
pub fn email_summary(status: RunStatus, qa_passed: bool, report: Option<&QaReport>) -> EmailSummary {
    let mut summary = EmailSummary {
        status: status.as_str().to_string(),
        qa_passed,
        address_duplicates_warning_only: true,
        ..EmailSummary::default()
    };
    let Some(report) = report else {
        return summary;
    };

    summary.missing_fields_count = report.missing_fields.len() as u64;
    summary.missing_warnings_count = report.missing_warnings.len() as u64;
    if let Some(ids) = report.nguid_summary.ran() {
        summary.nguid_duplicate_count = ids.duplicate_count;
        summary.nguid_invalid_count = ids.invalid_format_count;
    }
    summary.mandatory_missing_count = report.mandatory_missing.len() as u64;
    if let Some(counts) = report.mandatory_nulls.ran() {
        summary.mandatory_fields_with_nulls = counts
            .iter()
            .filter(|c| c.null_count > 0)
            .map(|c| c.field.clone())
            .collect();
    }
    if let Some(failures) = report.mandatory_null_failures.ran() {
        summary.failed_null_feature_count = failures.total_failed_features;
    }
    if let Some(dupes) = report.address_duplicates.ran() {
        summary.address_duplicate_count = dupes.duplicate_count;
    }

    let issues = &report.issues_by_agency;
    summary.scope_feature_count = issues.scope;
    summary.passed_feature_count = issues.passed;
    summary.issue_feature_count = issues.issue;
    summary.warning_issue_feature_count = issues.warning_issue;
    summary.blocking_issue_feature_count = issues.blocking_issue;
    summary
}

/// Human-readable digest: eight lines, plus the error on failed runs.
#[must_use]
pub fn email_text(summary: &EmailSummary, identifier_label: &str, error: Option<&str>) -> String {
    let mut lines = vec![
        format!("QA Status: {}", summary.status),
        format!("QA Passed: {}", summary.qa_passed),
        format!(
            "Scope: {} | Passed: {} | With issues: {}",
            summary.scope_feature_count, summary.passed_feature_count, summary.issue_feature_count
        ),
        format!(
            "Missing fields: {} (warnings: {})",
            summary.missing_fields_count, summary.missing_warnings_count
        ),
        format!(
            "{identifier_label} duplicates: {} | {identifier_label} invalid format: {}",
            summary.nguid_duplicate_count, summary.nguid_invalid_count
        ),
        format!("Mandatory missing fields: {}", summary.mandatory_missing_count),
        format!(
            "Mandatory-null failed features: {}",
            summary.failed_null_feature_count
        ),
        format!(
            "Address duplicates (warning): {}",
            summary.address_duplicate_count
        ),
    ];
    if let Some(error) = error {
        lines.push(format!("Error: {error}"));
    }
    lines.join("\n")
}

/// UTC run timestamp as it appears in results and run-log file names.
#[must_use]
pub fn run_timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y%m%d_%H%M%S").to_string()
}

/// Result of a completed run.
#[must_use]
pub fn completed_result(
    request: &QaRequest,
    at: DateTime<Utc>,
    report: QaReport,
    status_update: StatusUpdate,
    identifier_label: &str,
) -> QaRunResult {
    let passed = qa_passed(&report);
    let status = RunStatus::from_passed(passed);
    let email_summary = email_summary(status, passed, Some(&report));
    let email_summary_text = email_text(&email_summary, identifier_label, None);
    QaRunResult {
        timestamp: run_timestamp(at),
        success: passed,
        qa_passed: passed,
        status,
        error: None,
        inputs: request.clone(),
        report: Some(report),
        status_update: Some(status_update),
        email_summary,
        email_summary_text,
        log_path: None,
    }
}

/// Result of a run aborted by a fatal error.
#[must_use]
pub fn error_result(
    request: &QaRequest,
    at: DateTime<Utc>,
    error: &str,
    identifier_label: &str,
) -> QaRunResult {
    let email_summary = email_summary(RunStatus::Error, false, None);
    let email_summary_text = email_text(&email_summary, identifier_label, Some(error));
    QaRunResult {
        timestamp: run_timestamp(at),
        success: false,
        qa_passed: false,
        status: RunStatus::Error,
        error: Some(error.to_string()),
        inputs: request.clone(),
        report: None,
        status_update: None,
        email_summary,
        email_summary_text,
        log_path: None,
    }
}
