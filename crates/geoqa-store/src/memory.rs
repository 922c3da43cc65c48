//! In-process row store with fault injection.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError};

use geoqa_core::field::ActualField;
use geoqa_core::record::{FieldValue, RecordId, RecordRow};

use crate::error::StoreError;
use crate::{PatchOutcome, RowStore, same_workspace};

type Rows = BTreeMap<RecordId, HashMap<String, FieldValue>>;

/// Call counters, for asserting how a run used the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemoryStats {
    /// Rows written (successful or not) across all `update_field` calls.
    pub row_writes: usize,
    pub update_calls: usize,
    pub edit_sessions: usize,
    pub commits: usize,
    pub rollbacks: usize,
}

#[derive(Debug, Default)]
struct MemoryState {
    rows: Rows,
    snapshot: Option<Rows>,
    editing: bool,
    stats: MemoryStats,
}

/// A single table held in memory.
///
/// Field names are matched case-insensitively. Faults are configured with
/// the builder methods:
///
/// - [`versioned`](Self::versioned): writes outside an edit session fail with
///   `StoreError::RequiresTransaction`
/// - [`fail_ids`](Self::fail_ids): writes to these records fail per row
/// - [`fail_batch_after`](Self::fail_batch_after): the batch aborts after
///   this many rows were written
/// - [`hold_edit_lock`](Self::hold_edit_lock): `begin_edit` cannot lock
/// - [`fail_reads_of`](Self::fail_reads_of): reads projecting this field fail
#[derive(Debug)]
pub struct MemoryRowStore {
    workspace: String,
    table: String,
    fields: Vec<ActualField>,
    versioned: bool,
    failing_ids: BTreeSet<RecordId>,
    fail_batch_after: Option<usize>,
    edit_lock_held: bool,
    failing_reads: BTreeSet<String>,
    state: Mutex<MemoryState>,
}

impl MemoryRowStore {
    #[must_use]
    pub fn new(
        workspace: impl Into<String>,
        table: impl Into<String>,
        fields: Vec<ActualField>,
    ) -> Self {
        Self {
            workspace: workspace.into(),
            table: table.into(),
            fields,
            versioned: false,
            failing_ids: BTreeSet::new(),
            fail_batch_after: None,
            edit_lock_held: false,
            failing_reads: BTreeSet::new(),
            state: Mutex::new(MemoryState::default()),
        }
    }

    /// Add a row. Unlisted fields read as null.
    #[must_use]
    pub fn with_row<V: Into<FieldValue>>(
        self,
        id: RecordId,
        values: impl IntoIterator<Item = (&'static str, V)>,
    ) -> Self {
        let row = values
            .into_iter()
            .map(|(name, value)| (name.to_lowercase(), value.into()))
            .collect();
        self.lock().rows.insert(id, row);
        self
    }

    #[must_use]
    pub const fn versioned(mut self) -> Self {
        self.versioned = true;
        self
    }

    #[must_use]
    pub fn fail_ids(mut self, ids: impl IntoIterator<Item = RecordId>) -> Self {
        self.failing_ids.extend(ids);
        self
    }

    #[must_use]
    pub const fn fail_batch_after(mut self, rows: usize) -> Self {
        self.fail_batch_after = Some(rows);
        self
    }

    #[must_use]
    pub const fn hold_edit_lock(mut self) -> Self {
        self.edit_lock_held = true;
        self
    }

    #[must_use]
    pub fn fail_reads_of(mut self, field: &str) -> Self {
        self.failing_reads.insert(field.to_lowercase());
        self
    }

    /// Current value of `field` on record `id`.
    #[must_use]
    pub fn value(&self, id: RecordId, field: &str) -> Option<FieldValue> {
        self.lock()
            .rows
            .get(&id)
            .map(|row| row.get(&field.to_lowercase()).cloned().unwrap_or(FieldValue::Null))
    }

    /// Overwrite one value, outside any edit session.
    pub fn set_value(&self, id: RecordId, field: &str, value: impl Into<FieldValue>) {
        if let Some(row) = self.lock().rows.get_mut(&id) {
            row.insert(field.to_lowercase(), value.into());
        }
    }

    #[must_use]
    pub fn stats(&self) -> MemoryStats {
        self.lock().stats
    }

    #[must_use]
    pub fn is_editing(&self) -> bool {
        self.lock().editing
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_table(&self, table: &str) -> Result<(), StoreError> {
        if table.eq_ignore_ascii_case(&self.table) {
            Ok(())
        } else {
            Err(StoreError::TargetNotFound(table.to_string()))
        }
    }

    fn check_field(&self, table: &str, field: &str) -> Result<(), StoreError> {
        if self.fields.iter().any(|f| f.name.eq_ignore_ascii_case(field)) {
            Ok(())
        } else {
            Err(StoreError::UnknownField {
                table: table.to_string(),
                field: field.to_string(),
            })
        }
    }

    fn check_workspace(&self, workspace: &str) -> Result<(), StoreError> {
        if same_workspace(&self.workspace, workspace) {
            Ok(())
        } else {
            Err(StoreError::WorkspaceMismatch {
                expected: self.workspace.clone(),
                actual: workspace.to_string(),
            })
        }
    }
}

impl RowStore for MemoryRowStore {
    async fn list_fields(&self, table: &str) -> Result<Vec<ActualField>, StoreError> {
        self.check_table(table)?;
        Ok(self.fields.clone())
    }

    async fn read_records(
        &self,
        table: &str,
        fields: &[String],
        ids: Option<&BTreeSet<RecordId>>,
    ) -> Result<Vec<RecordRow>, StoreError> {
        self.check_table(table)?;
        for field in fields {
            self.check_field(table, field)?;
            if self.failing_reads.contains(&field.to_lowercase()) {
                return Err(StoreError::Query(format!("cannot read {table}.{field}")));
            }
        }

        let keys: Vec<String> = fields.iter().map(|f| f.to_lowercase()).collect();
        let state = self.lock();
        Ok(state
            .rows
            .iter()
            .filter(|(id, _)| ids.is_none_or(|wanted| wanted.contains(*id)))
            .map(|(id, row)| {
                let values = keys
                    .iter()
                    .map(|k| row.get(k).cloned().unwrap_or(FieldValue::Null))
                    .collect();
                RecordRow::new(*id, values)
            })
            .collect())
    }

    async fn update_field(
        &self,
        table: &str,
        field: &str,
        patches: &[(RecordId, String)],
    ) -> Result<Vec<PatchOutcome>, StoreError> {
        self.check_table(table)?;
        self.check_field(table, field)?;

        let mut state = self.lock();
        state.stats.update_calls += 1;
        if self.versioned && !state.editing {
            return Err(StoreError::RequiresTransaction(format!(
                "'{table}' is versioned and cannot be updated outside an edit session"
            )));
        }

        let key = field.to_lowercase();
        let mut outcomes = Vec::with_capacity(patches.len());
        for (written, (id, value)) in patches.iter().enumerate() {
            if self.fail_batch_after.is_some_and(|limit| written >= limit) {
                return Err(StoreError::Query(format!(
                    "write aborted after {written} rows"
                )));
            }
            state.stats.row_writes += 1;
            if self.failing_ids.contains(id) {
                outcomes.push(PatchOutcome::failed(*id, "row is locked"));
                continue;
            }
            match state.rows.get_mut(id) {
                Some(row) => {
                    row.insert(key.clone(), FieldValue::text(value.as_str()));
                    outcomes.push(PatchOutcome::ok(*id));
                }
                None => outcomes.push(PatchOutcome::failed(*id, "record not found")),
            }
        }
        Ok(outcomes)
    }

    async fn begin_edit(&self, workspace: &str) -> Result<(), StoreError> {
        self.check_workspace(workspace)?;
        if self.edit_lock_held {
            return Err(StoreError::EditLock(format!(
                "{workspace} is locked by another editor"
            )));
        }
        let mut state = self.lock();
        if state.editing {
            return Err(StoreError::EditLock(format!(
                "an edit session is already open on {workspace}"
            )));
        }
        state.snapshot = Some(state.rows.clone());
        state.editing = true;
        state.stats.edit_sessions += 1;
        Ok(())
    }

    async fn commit_edit(&self, workspace: &str) -> Result<(), StoreError> {
        self.check_workspace(workspace)?;
        let mut state = self.lock();
        if !state.editing {
            return Err(StoreError::NoEditSession);
        }
        state.snapshot = None;
        state.editing = false;
        state.stats.commits += 1;
        Ok(())
    }

    async fn rollback_edit(&self, workspace: &str) -> Result<(), StoreError> {
        self.check_workspace(workspace)?;
        let mut state = self.lock();
        if !state.editing {
            return Err(StoreError::NoEditSession);
        }
        if let Some(snapshot) = state.snapshot.take() {
            state.rows = snapshot;
        }
        state.editing = false;
        state.stats.rollbacks += 1;
        Ok(())
    }
}
