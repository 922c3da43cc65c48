//! Update Applier: write synthesized statuses back to the store.
//!
//! Rows are patched independently; a per-row failure is counted and sampled
//! and the batch goes on. When the store refuses the batch with
//! `StoreError::RequiresTransaction`, the batch is re-run once inside an edit
//! session on the target's workspace: committed on success, rolled back and
//! re-raised otherwise.

use std::collections::BTreeMap;

use geoqa_core::finding::RecordStatus;
use geoqa_core::record::RecordId;
use geoqa_core::report::StatusUpdateSummary;
use geoqa_store::{PatchOutcome, RowStore, StoreError, TargetPath};

/// Where and how statuses are written.
#[derive(Debug, Clone, Copy)]
pub struct ApplyTarget<'a> {
    pub target: &'a TargetPath,
    /// Status field in store casing.
    pub status_field: &'a str,
    pub error_sample_cap: usize,
    /// Leave records whose stored status already matches untouched.
    pub skip_unchanged: bool,
}

/// Write `statuses` to the store.
///
/// `stored` holds the current status of each record, used for
/// `skip_unchanged`.
///
/// # Errors
///
/// Returns `StoreError` when the batch fails as a whole: a non-transactional
/// refusal, an edit session that cannot be opened or committed, or a failure
/// inside the edit session (after rolling it back).
pub async fn apply_statuses<S: RowStore>(
    store: &S,
    target: ApplyTarget<'_>,
    statuses: &BTreeMap<RecordId, RecordStatus>,
    stored: &BTreeMap<RecordId, Option<String>>,
) -> Result<StatusUpdateSummary, StoreError> {
    let mut summary = StatusUpdateSummary {
        total: statuses.len() as u64,
        ..StatusUpdateSummary::default()
    };

    let patches: Vec<(RecordId, String)> = statuses
        .iter()
        .filter(|(id, status)| {
            let unchanged = target.skip_unchanged
                && stored
                    .get(id)
                    .and_then(Option::as_deref)
                    .is_some_and(|current| current == status.as_str());
            if unchanged {
                summary.unchanged += 1;
            }
            !unchanged
        })
        .map(|(id, status)| (*id, status.as_str().to_string()))
        .collect();

    if patches.is_empty() {
        tracing::info!(unchanged = summary.unchanged, "no status changes to write");
        return Ok(summary);
    }

    let table = target.target.table.as_str();
    let outcomes = match store.update_field(table, target.status_field, &patches).await {
        Ok(outcomes) => outcomes,
        Err(e) if e.requires_transaction() => {
            let workspace = target.target.require_workspace()?;
            tracing::info!(workspace, reason = %e, "retrying status update inside an edit session");
            let outcomes = in_edit_session(store, workspace, table, target.status_field, &patches).await?;
            summary.used_edit_session = true;
            summary.edit_workspace = Some(workspace.to_string());
            outcomes
        }
        Err(e) => return Err(e),
    };

    tally(&mut summary, &outcomes, target.error_sample_cap);
    tracing::info!(
        total = summary.total,
        successes = summary.successes,
        failures = summary.failures,
        unchanged = summary.unchanged,
        used_edit_session = summary.used_edit_session,
        "status update applied"
    );
    Ok(summary)
}

async fn in_edit_session<S: RowStore>(
    store: &S,
    workspace: &str,
    table: &str,
    field: &str,
    patches: &[(RecordId, String)],
) -> Result<Vec<PatchOutcome>, StoreError> {
    store.begin_edit(workspace).await?;

    let result = match store.update_field(table, field, patches).await {
        Ok(outcomes) => store.commit_edit(workspace).await.map(|()| outcomes),
        Err(e) => Err(e),
    };

    if let Err(e) = &result {
        tracing::warn!(workspace, error = %e, "edit session failed; rolling back");
        if let Err(rollback) = store.rollback_edit(workspace).await {
            tracing::warn!(workspace, error = %rollback, "rollback failed");
        }
    }
    result
}

fn tally(summary: &mut StatusUpdateSummary, outcomes: &[PatchOutcome], sample_cap: usize) {
    for outcome in outcomes {
        match &outcome.error {
            None => summary.successes += 1,
            Some(error) => {
                summary.failures += 1;
                if summary.errors.len() < sample_cap {
                    summary.errors.push(format!("OID {}: {error}", outcome.id));
                }
            }
        }
    }
}
