//! Aggregator: roll statuses up by a grouping attribute.

use std::collections::{BTreeMap, BTreeSet};

use geoqa_core::finding::RecordStatus;
use geoqa_core::record::RecordId;
use geoqa_core::report::{GroupBucket, IssueSummary};
use geoqa_store::{RowStore, StoreError};

/// Bucket for records without a group value.
pub const BLANK_GROUP: &str = "(blank)";

/// Read the trimmed group value of each record in `ids`.
///
/// # Errors
///
/// Returns `StoreError` if the field cannot be read.
pub async fn read_groups<S: RowStore>(
    store: &S,
    table: &str,
    field: &str,
    ids: &BTreeSet<RecordId>,
) -> Result<BTreeMap<RecordId, String>, StoreError> {
    if ids.is_empty() {
        return Ok(BTreeMap::new());
    }
    let rows = store
        .read_records(table, &[field.to_string()], Some(ids))
        .await?;
    Ok(rows
        .into_iter()
        .filter_map(|row| {
            let value = row.value(0).trimmed_text()?;
            (!value.is_empty()).then_some((row.id, value))
        })
        .collect())
}

/// Count statuses overall and per group.
///
/// Records missing from `groups` land in [`BLANK_GROUP`]. Groups are ordered
/// by issue count (highest first), then name.
#[must_use]
pub fn aggregate(
    statuses: &BTreeMap<RecordId, RecordStatus>,
    groups: &BTreeMap<RecordId, String>,
    group_field: &str,
) -> IssueSummary {
    let mut summary = IssueSummary {
        group_field: group_field.to_string(),
        ..IssueSummary::default()
    };
    let mut buckets: BTreeMap<&str, GroupBucket> = BTreeMap::new();

    for (id, status) in statuses {
        let key = groups.get(id).map_or(BLANK_GROUP, String::as_str);
        let bucket = buckets.entry(key).or_insert_with(|| GroupBucket {
            group: key.to_string(),
            ..GroupBucket::default()
        });

        summary.scope += 1;
        bucket.scope += 1;
        if status.is_passed() {
            summary.passed += 1;
            bucket.passed += 1;
            continue;
        }
        summary.issue += 1;
        bucket.issue += 1;
        if status.is_warning() {
            summary.warning_issue += 1;
            bucket.warning_issue += 1;
        } else {
            summary.blocking_issue += 1;
            bucket.blocking_issue += 1;
        }
    }

    let mut groups: Vec<GroupBucket> = buckets.into_values().collect();
    groups.sort_by(|a, b| b.issue.cmp(&a.issue).then_with(|| a.group.cmp(&b.group)));
    summary.groups = groups;
    summary
}
