//! Uniqueness/Format Checker for the primary identifier field.

use std::collections::{BTreeSet, HashMap};
use std::sync::LazyLock;

use geoqa_core::enums::CheckKind;
use geoqa_core::finding::Finding;
use geoqa_core::record::{FieldValue, RecordId};
use geoqa_core::report::{DuplicateExample, IdentifierSummary};
use geoqa_store::{RowStore, StoreError};
use regex::Regex;

use super::{CheckContext, CheckOutput};

/// 8-4-4-4-12 hex groups, optionally wrapped in braces or parentheses.
static IDENTIFIER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[{(]?[0-9A-F]{8}(-[0-9A-F]{4}){3}-[0-9A-F]{12}[)}]?$")
        .expect("identifier pattern compiles")
});

#[derive(Debug, Clone, Copy)]
pub struct IdentifierOptions {
    /// Upper-case values before comparing.
    pub normalize: bool,
    pub check_format: bool,
}

/// Whether `value` has the canonical identifier shape.
#[must_use]
pub fn is_canonical(value: &str) -> bool {
    IDENTIFIER_PATTERN.is_match(value)
}

/// Trim and optionally upper-case. Null stays `None`.
#[must_use]
pub fn normalize_identifier(value: &FieldValue, fold_case: bool) -> Option<String> {
    let text = value.trimmed_text()?;
    Some(if fold_case { text.to_uppercase() } else { text })
}

/// Count null, empty, duplicate, and malformed identifiers among in-scope
/// records.
///
/// Emits an `"<field> is empty"` error for records without an identifier and
/// a `"Duplicate <field>"` error for every record sharing its identifier.
///
/// # Errors
///
/// Returns `StoreError` if the identifier column cannot be read.
pub async fn check<S: RowStore>(
    ctx: &CheckContext<'_, S>,
    field: &str,
    options: IdentifierOptions,
) -> Result<CheckOutput<IdentifierSummary>, StoreError> {
    let rows = ctx.read(&[field.to_string()]).await?;
    let values: Vec<(RecordId, Option<String>)> = rows
        .iter()
        .map(|row| (row.id, normalize_identifier(row.value(0), options.normalize)))
        .collect();

    let mut summary = IdentifierSummary {
        field: field.to_string(),
        total_records: values.len() as u64,
        format_checked: options.check_format,
        ..IdentifierSummary::default()
    };

    let mut counts: HashMap<&str, u64> = HashMap::new();
    for (_, value) in &values {
        match value.as_deref() {
            None => summary.null_count += 1,
            Some("") => summary.empty_count += 1,
            Some(v) => {
                summary.nonempty_count += 1;
                *counts.entry(v).or_default() += 1;
            }
        }
    }
    summary.unique_nonempty_count = counts.len() as u64;

    let mut dupes: Vec<DuplicateExample> = counts
        .iter()
        .filter(|(_, count)| **count > 1)
        .map(|(value, count)| DuplicateExample {
            value: (*value).to_string(),
            count: *count,
        })
        .collect();
    dupes.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.value.cmp(&b.value)));
    summary.duplicate_count = dupes.len() as u64;
    let duplicated: BTreeSet<&str> = counts
        .iter()
        .filter(|(_, count)| **count > 1)
        .map(|(value, _)| *value)
        .collect();

    if options.check_format {
        let invalid: Vec<&str> = values
            .iter()
            .filter_map(|(_, v)| v.as_deref())
            .filter(|v| !v.is_empty() && !is_canonical(v))
            .collect();
        summary.invalid_format_count = invalid.len() as u64;
        summary.invalid_examples = invalid
            .into_iter()
            .take(ctx.config.invalid_example_cap)
            .map(String::from)
            .collect();
    }

    let mut findings = Vec::new();
    for (id, value) in &values {
        match value.as_deref() {
            None | Some("") => findings.push(Finding::record_error(
                CheckKind::IdentifierEmpty,
                *id,
                format!("{field} is empty"),
            )),
            Some(v) if duplicated.contains(v) => findings.push(Finding::record_error(
                CheckKind::IdentifierDuplicate,
                *id,
                format!("Duplicate {field}"),
            )),
            Some(_) => {}
        }
    }

    dupes.truncate(ctx.config.duplicate_example_cap);
    summary.duplicate_examples = dupes;

    Ok(CheckOutput::ran(summary, findings))
}
