//! Scope Resolver: which records must be (re)checked this run.
//!
//! A record is in scope when its stored status is anything but `Passed`, or
//! when it was created inside the lookback window. When the target has
//! neither a status field nor a creation field every record is in scope.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::{DateTime, TimeDelta, Utc};
use geoqa_core::field::{ActualField, resolve_field_name};
use geoqa_core::finding::is_passed_text;
use geoqa_core::record::{FieldValue, RecordId};
use geoqa_core::scope::{ScopeDecision, ScopeReasons, ScopeSummary, StatusCount};
use geoqa_store::{RowStore, StoreError};

/// Status-count key for null and empty statuses.
pub const BLANK_STATUS: &str = "(blank)";

/// Closed interval `[start, end]` a creation timestamp must fall in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookbackWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl LookbackWindow {
    #[must_use]
    pub fn ending_at(now: DateTime<Utc>, hours: u32) -> Self {
        Self {
            start: now - TimeDelta::hours(i64::from(hours)),
            end: now,
        }
    }

    #[must_use]
    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        self.start <= ts && ts <= self.end
    }
}

/// Inputs the resolver needs besides the store.
#[derive(Debug, Clone, Copy)]
pub struct ScopeSettings<'a> {
    /// Status field in store casing, if the target has one.
    pub status_field: Option<&'a str>,
    /// Creation-timestamp field in store casing, if the target has one.
    pub created_field: Option<&'a str>,
    pub lookback_hours: u32,
    /// Entries kept in the status frequency table.
    pub frequency_cap: usize,
    /// `false` puts every record in scope (reasons are still computed).
    pub enabled: bool,
}

/// Output of [`resolve_scope`].
#[derive(Debug, Clone, Default)]
pub struct ResolvedScope {
    pub decisions: Vec<ScopeDecision>,
    pub ids: BTreeSet<RecordId>,
    /// Stored status text of each in-scope record (`None` for null, or when
    /// the target has no status field).
    pub stored_status: BTreeMap<RecordId, Option<String>>,
    pub summary: ScopeSummary,
}

/// First of `candidates` the target has, in store casing.
#[must_use]
pub fn resolve_created_field(actual: &[ActualField], candidates: &[String]) -> Option<String> {
    candidates
        .iter()
        .find_map(|c| resolve_field_name(actual, c))
        .map(String::from)
}

/// Decide one record.
///
/// `status` / `created` are `None` when the target lacks that field, and
/// `Some(&FieldValue::Null)` when the field exists but the value is null.
#[must_use]
pub fn decide(
    id: RecordId,
    status: Option<&FieldValue>,
    created: Option<&FieldValue>,
    window: &LookbackWindow,
) -> ScopeDecision {
    let not_passed = status.is_some_and(|value| {
        value
            .trimmed_text()
            .is_none_or(|text| !is_passed_text(&text))
    });
    let recently_created = created
        .and_then(FieldValue::as_timestamp)
        .is_some_and(|ts| window.contains(ts));
    let unscoped = status.is_none() && created.is_none();

    ScopeDecision {
        record_id: id,
        in_scope: not_passed || recently_created || unscoped,
        reasons: ScopeReasons {
            not_passed,
            recently_created,
        },
    }
}

/// Read every record's status and creation time and decide its scope.
///
/// # Errors
///
/// Returns `StoreError` if the records cannot be read. Scope failures are
/// fatal to the run.
pub async fn resolve_scope<S: RowStore>(
    store: &S,
    table: &str,
    settings: &ScopeSettings<'_>,
    now: DateTime<Utc>,
) -> Result<ResolvedScope, StoreError> {
    let mut fields = Vec::new();
    let status_idx = settings.status_field.map(|f| {
        fields.push(f.to_string());
        fields.len() - 1
    });
    let created_idx = settings.created_field.map(|f| {
        fields.push(f.to_string());
        fields.len() - 1
    });

    let rows = store.read_records(table, &fields, None).await?;
    let window = LookbackWindow::ending_at(now, settings.lookback_hours);

    let mut resolved = ResolvedScope::default();
    let mut counts: HashMap<String, u64> = HashMap::new();

    for row in &rows {
        let status = status_idx.map(|i| row.value(i));
        let created = created_idx.map(|i| row.value(i));

        let mut decision = decide(row.id, status, created, &window);
        if !settings.enabled {
            decision.in_scope = true;
        }

        resolved.summary.total_rows += 1;
        if decision.reasons.not_passed {
            resolved.summary.rows_not_passed += 1;
        }
        if decision.reasons.recently_created {
            resolved.summary.rows_newly_created += 1;
        }

        if status.is_some() {
            let key = status
                .and_then(FieldValue::trimmed_text)
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| BLANK_STATUS.to_string());
            *counts.entry(key).or_default() += 1;
        }

        if decision.in_scope {
            resolved.ids.insert(row.id);
            resolved
                .stored_status
                .insert(row.id, status.filter(|v| !v.is_null()).map(ToString::to_string));
        }
        resolved.decisions.push(decision);
    }

    let mut status_counts: Vec<StatusCount> = counts
        .into_iter()
        .map(|(value, count)| StatusCount { value, count })
        .collect();
    status_counts.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.value.cmp(&b.value)));
    status_counts.truncate(settings.frequency_cap);

    resolved.summary.lookback_hours = settings.lookback_hours;
    resolved.summary.rows_in_scope = resolved.ids.len() as u64;
    resolved.summary.status_field = settings.status_field.map(String::from);
    resolved.summary.created_date_field = settings.created_field.map(String::from);
    resolved.summary.status_counts = status_counts;

    tracing::info!(
        table,
        total_rows = resolved.summary.total_rows,
        rows_in_scope = resolved.summary.rows_in_scope,
        rows_not_passed = resolved.summary.rows_not_passed,
        rows_newly_created = resolved.summary.rows_newly_created,
        "scope resolved"
    );

    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use geoqa_store::MemoryRowStore;
    use pretty_assertions::assert_eq;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap()
    }

    fn window() -> LookbackWindow {
        LookbackWindow::ending_at(now(), 24)
    }

    #[test]
    fn passed_and_old_is_out_of_scope() {
        let created = FieldValue::from(now() - TimeDelta::hours(48));
        let d = decide(1, Some(&FieldValue::text("Passed")), Some(&created), &window());
        assert!(!d.in_scope);
        assert_eq!(d.reasons, ScopeReasons::default());
    }

    #[test]
    fn failed_and_new_has_both_reasons() {
        let created = FieldValue::from(now() - TimeDelta::hours(1));
        let d = decide(2, Some(&FieldValue::text("Failed: X")), Some(&created), &window());
        assert!(d.in_scope);
        assert!(d.reasons.not_passed);
        assert!(d.reasons.recently_created);
    }

    #[test]
    fn passed_comparison_ignores_case_and_whitespace() {
        let d = decide(3, Some(&FieldValue::text("  passed ")), None, &window());
        assert!(!d.in_scope);
        let blank = decide(4, Some(&FieldValue::Null), None, &window());
        assert!(blank.in_scope);
        assert!(blank.reasons.not_passed);
    }

    #[test]
    fn window_is_closed_at_both_ends() {
        let w = window();
        assert!(w.contains(now()));
        assert!(w.contains(now() - TimeDelta::hours(24)));
        assert!(!w.contains(now() - TimeDelta::hours(24) - TimeDelta::seconds(1)));
        assert!(!w.contains(now() + TimeDelta::seconds(1)));
    }

    #[test]
    fn no_fields_means_everything_is_in_scope() {
        let d = decide(5, None, None, &window());
        assert!(d.in_scope);
        assert_eq!(d.reasons, ScopeReasons::default());
    }

    #[test]
    fn unparseable_created_value_is_not_recent() {
        let d = decide(
            6,
            Some(&FieldValue::text("Passed")),
            Some(&FieldValue::text("not a date")),
            &window(),
        );
        assert!(!d.in_scope);
    }

    fn store() -> MemoryRowStore {
        let fields = vec![
            geoqa_core::field::ActualField::new("QAStatus", "String", Some(255)),
            geoqa_core::field::ActualField::new("created_date", "Date", None),
        ];
        MemoryRowStore::new("/data/qa.gdb", "Points", fields)
            .with_row(1, [("QAStatus", FieldValue::text("Passed"))])
            .with_row(2, [("QAStatus", FieldValue::text("NGUID is empty"))])
            .with_row(
                3,
                [
                    ("QAStatus", FieldValue::text("Passed")),
                    ("created_date", FieldValue::from(now() - TimeDelta::hours(2))),
                ],
            )
            .with_row(4, [("QAStatus", FieldValue::Null)])
            .with_row(5, [("QAStatus", FieldValue::text("NGUID is empty"))])
    }

    fn settings(enabled: bool) -> ScopeSettings<'static> {
        ScopeSettings {
            status_field: Some("QAStatus"),
            created_field: Some("created_date"),
            lookback_hours: 24,
            frequency_cap: 50,
            enabled,
        }
    }

    #[tokio::test]
    async fn resolves_counters_and_frequency_table() {
        let resolved = resolve_scope(&store(), "Points", &settings(true), now())
            .await
            .unwrap();

        assert_eq!(resolved.ids, BTreeSet::from([2, 3, 4, 5]));
        assert_eq!(resolved.summary.total_rows, 5);
        assert_eq!(resolved.summary.rows_in_scope, 4);
        assert_eq!(resolved.summary.rows_not_passed, 3);
        assert_eq!(resolved.summary.rows_newly_created, 1);
        assert_eq!(
            resolved.summary.status_counts,
            vec![
                StatusCount { value: "NGUID is empty".into(), count: 2 },
                StatusCount { value: "Passed".into(), count: 2 },
                StatusCount { value: BLANK_STATUS.into(), count: 1 },
            ]
        );
        assert_eq!(resolved.stored_status[&3].as_deref(), Some("Passed"));
        assert_eq!(resolved.stored_status[&4], None);
    }

    #[tokio::test]
    async fn disabled_scope_takes_every_record() {
        let resolved = resolve_scope(&store(), "Points", &settings(false), now())
            .await
            .unwrap();
        assert_eq!(resolved.summary.rows_in_scope, 5);
        assert_eq!(resolved.summary.rows_not_passed, 3);
    }

    #[tokio::test]
    async fn frequency_table_is_capped() {
        let mut s = settings(true);
        s.frequency_cap = 1;
        let resolved = resolve_scope(&store(), "Points", &s, now()).await.unwrap();
        assert_eq!(resolved.summary.status_counts.len(), 1);
    }

    #[test]
    fn created_field_follows_candidate_order() {
        let actual = vec![
            geoqa_core::field::ActualField::new("CreateDate", "Date", None),
            geoqa_core::field::ActualField::new("Created_Date", "Date", None),
        ];
        let candidates = vec!["created_date".to_string(), "createdate".to_string()];
        assert_eq!(
            resolve_created_field(&actual, &candidates).as_deref(),
            Some("Created_Date")
        );
        assert_eq!(resolve_created_field(&actual[..1], &candidates[..1]), None);
    }
}
