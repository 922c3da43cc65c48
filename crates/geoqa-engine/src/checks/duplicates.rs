//! Duplicate-Value Checker for a secondary business field.
//!
//! Duplicates here are warnings: they never block a record or the run.

use std::collections::BTreeMap;

use geoqa_core::enums::CheckKind;
use geoqa_core::finding::Finding;
use geoqa_core::record::{FieldValue, RecordId};
use geoqa_core::report::{DuplicateGroup, SecondaryDuplicateSummary};
use geoqa_store::{RowStore, StoreError};

use super::{CheckContext, CheckOutput, raw_text};

/// Status message for records sharing a secondary value.
pub const SECONDARY_DUPLICATE_MESSAGE: &str = "Duplicate address";

/// Trim and upper-case. Null stays `None`.
#[must_use]
pub fn normalize_text(value: &FieldValue) -> Option<String> {
    value.trimmed_text().map(|s| s.to_uppercase())
}

/// Group in-scope records by normalized `field` value.
///
/// Null and empty values are counted but never grouped. Groups are ordered
/// by size (largest first), then value.
///
/// # Errors
///
/// Returns `StoreError` if the field cannot be read.
pub async fn check<S: RowStore>(
    ctx: &CheckContext<'_, S>,
    field: &str,
    identifier_field: Option<&str>,
) -> Result<CheckOutput<SecondaryDuplicateSummary>, StoreError> {
    let mut columns = vec![field.to_string()];
    if let Some(id_field) = identifier_field.filter(|f| !f.eq_ignore_ascii_case(field)) {
        columns.push(id_field.to_string());
    }
    let identifier_idx = identifier_field.map(|f| usize::from(!f.eq_ignore_ascii_case(field)));

    let mut summary = SecondaryDuplicateSummary {
        field: field.to_string(),
        ..SecondaryDuplicateSummary::default()
    };
    let mut members: BTreeMap<String, Vec<(RecordId, Option<String>)>> = BTreeMap::new();

    for row in ctx.read(&columns).await? {
        summary.total_records += 1;
        match normalize_text(row.value(0)) {
            None => summary.null_value_count += 1,
            Some(v) if v.is_empty() => summary.empty_value_count += 1,
            Some(v) => {
                let identifier = identifier_idx.and_then(|i| raw_text(row.value(i)));
                members.entry(v).or_default().push((row.id, identifier));
            }
        }
    }

    let mut groups: Vec<DuplicateGroup> = members
        .into_iter()
        .filter(|(_, items)| items.len() > 1)
        .map(|(value, items)| DuplicateGroup {
            value,
            count: items.len() as u64,
            record_ids: items.iter().map(|(id, _)| *id).collect(),
            identifiers: items.into_iter().map(|(_, ident)| ident).collect(),
        })
        .collect();
    groups.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.value.cmp(&b.value)));

    let findings = groups
        .iter()
        .flat_map(|g| g.record_ids.iter())
        .map(|id| {
            Finding::record_warning(CheckKind::SecondaryDuplicate, *id, SECONDARY_DUPLICATE_MESSAGE)
        })
        .collect();

    summary.duplicate_count = groups.len() as u64;
    summary.samples = groups.iter().take(ctx.config.sample_limit).cloned().collect();
    summary.duplicate_groups = groups;

    Ok(CheckOutput::ran(summary, findings))
}
