//! Mandatory-Field Null Checker and Null-Failure Collector.
//!
//! A mandatory value is "null" when it is null or the empty string. Nothing
//! else counts: `" "` and `"0"` are values.

use geoqa_core::enums::CheckKind;
use geoqa_core::finding::Finding;
use geoqa_core::report::{MandatoryNullCount, NullFailureRow, NullFailureSummary};
use geoqa_store::{RowStore, StoreError};

use super::{CheckContext, CheckOutput, raw_text};

/// Per-field totals over in-scope records.
///
/// `fields` are the mandatory fields present on the target, in store casing.
/// Each null value also yields a `"<field> is empty"` error for its record,
/// so statuses do not depend on the failure collector being enabled.
///
/// # Errors
///
/// Returns `StoreError` if the fields cannot be read.
pub async fn count_nulls<S: RowStore>(
    ctx: &CheckContext<'_, S>,
    fields: &[String],
) -> Result<CheckOutput<Vec<MandatoryNullCount>>, StoreError> {
    let mut counts: Vec<MandatoryNullCount> = fields
        .iter()
        .map(|f| MandatoryNullCount {
            field: f.clone(),
            total: 0,
            null_count: 0,
            non_null: 0,
        })
        .collect();
    if fields.is_empty() {
        return Ok(CheckOutput::ran(counts, Vec::new()));
    }

    let mut findings = Vec::new();
    for row in ctx.read(fields).await? {
        for (idx, count) in counts.iter_mut().enumerate() {
            count.total += 1;
            if row.value(idx).is_null_or_empty() {
                count.null_count += 1;
                findings.push(Finding::record_error(
                    CheckKind::MandatoryNull,
                    row.id,
                    format!("{} is empty", count.field),
                ));
            } else {
                count.non_null += 1;
            }
        }
    }
    Ok(CheckOutput::ran(counts, findings))
}

/// One row per in-scope record failing any mandatory field.
///
/// Every failure is counted and yields one `"<field> is empty"` error per
/// failing field, but only the first `cap` rows are kept for the run log
/// (`truncated` is set once the kept rows reach `cap`). The first `sample_limit` rows are
/// kept as samples.
///
/// # Errors
///
/// Returns `StoreError` if the fields cannot be read.
pub async fn collect_failures<S: RowStore>(
    ctx: &CheckContext<'_, S>,
    fields: &[String],
    identifier_field: Option<&str>,
    cap: usize,
) -> Result<CheckOutput<NullFailureSummary>, StoreError> {
    if fields.is_empty() {
        return Ok(CheckOutput::ran(NullFailureSummary::default(), Vec::new()));
    }

    let mut columns = fields.to_vec();
    let identifier_idx = identifier_field.map(|id_field| {
        columns
            .iter()
            .position(|c| c.eq_ignore_ascii_case(id_field))
            .unwrap_or_else(|| {
                columns.push(id_field.to_string());
                columns.len() - 1
            })
    });

    let mut summary = NullFailureSummary::default();
    let mut findings = Vec::new();

    for row in ctx.read(&columns).await? {
        let failing: Vec<String> = fields
            .iter()
            .enumerate()
            .filter(|(idx, _)| row.value(*idx).is_null_or_empty())
            .map(|(_, f)| f.clone())
            .collect();
        if failing.is_empty() {
            continue;
        }

        findings.extend(failing.iter().map(|f| {
            Finding::record_error(CheckKind::MandatoryNull, row.id, format!("{f} is empty"))
        }));

        summary.total_failed_features += 1;
        let item = NullFailureRow {
            record_id: row.id,
            identifier: identifier_idx.and_then(|i| raw_text(row.value(i))),
            failing_fields: failing,
        };
        if summary.sample_failed_features.len() < ctx.config.sample_limit {
            summary.sample_failed_features.push(item.clone());
        }
        if summary.rows.len() < cap {
            summary.rows.push(item);
        }
    }
    summary.truncated = summary.total_failed_features > 0 && summary.rows.len() >= cap;

    Ok(CheckOutput::ran(summary, findings))
}
