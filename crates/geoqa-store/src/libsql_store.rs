//! libSQL adapter: one table in a local database file.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};

use geoqa_core::field::ActualField;
use geoqa_core::record::{FieldValue, RecordId, RecordRow};
use libsql::Builder;

use crate::error::StoreError;
use crate::{PatchOutcome, RowStore, quote_ident, same_workspace};

/// Row store over a local libSQL database.
///
/// Record ids are `SQLite` rowids. Declared column types such as
/// `String(254)` are reported as type `String` with length 254, so tables
/// can be declared with geodatabase-style types.
///
/// A versioned store refuses [`RowStore::update_field`] outside an edit
/// session. Edit sessions map onto `BEGIN IMMEDIATE` / `COMMIT` / `ROLLBACK`.
pub struct LibsqlRowStore {
    #[allow(dead_code)]
    db: libsql::Database,
    conn: libsql::Connection,
    workspace: String,
    versioned: bool,
    editing: AtomicBool,
}

impl LibsqlRowStore {
    /// Open the database file at `path`. `path` is also the workspace name
    /// edit sessions must be opened on.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::LibSql` if the database cannot be opened.
    pub async fn open_local(path: &str, versioned: bool) -> Result<Self, StoreError> {
        let db = Builder::new_local(path).build().await?;
        let conn = db.connect()?;
        Ok(Self {
            db,
            conn,
            workspace: path.to_string(),
            versioned,
            editing: AtomicBool::new(false),
        })
    }

    /// Access the underlying libSQL connection for direct queries.
    #[must_use]
    pub const fn conn(&self) -> &libsql::Connection {
        &self.conn
    }

    #[must_use]
    pub fn workspace(&self) -> &str {
        &self.workspace
    }

    #[must_use]
    pub const fn is_versioned(&self) -> bool {
        self.versioned
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

/// Split a declared column type like `String(254)` into base type and length.
fn parse_declared_type(declared: &str) -> (&str, Option<u32>) {
    let declared = declared.trim();
    let Some((base, rest)) = declared.split_once('(') else {
        return (declared, None);
    };
    let length = rest
        .trim_end_matches(')')
        .trim()
        .parse::<u32>()
        .ok();
    (base.trim(), length)
}

fn to_field_value(value: libsql::Value) -> FieldValue {
    match value {
        libsql::Value::Null => FieldValue::Null,
        libsql::Value::Integer(i) => FieldValue::Integer(i),
        libsql::Value::Real(r) => FieldValue::Real(r),
        libsql::Value::Text(s) => FieldValue::Text(s),
        libsql::Value::Blob(bytes) => FieldValue::Text(String::from_utf8_lossy(&bytes).into_owned()),
    }
}

impl RowStore for LibsqlRowStore {
    async fn list_fields(&self, table: &str) -> Result<Vec<ActualField>, StoreError> {
        let mut rows = self
            .conn
            .query(&format!("PRAGMA table_info({})", quote_ident(table)), ())
            .await
            .map_err(|e| StoreError::FieldIntrospection(format!("{table}: {e}")))?;

        let mut fields = Vec::new();
        while let Some(row) = rows.next().await? {
            let name = row.get::<String>(1)?;
            let declared = row.get::<Option<String>>(2)?.unwrap_or_default();
            let (base, length) = parse_declared_type(&declared);
            fields.push(ActualField::new(name, base, length));
        }

        if fields.is_empty() {
            return Err(StoreError::TargetNotFound(table.to_string()));
        }
        Ok(fields)
    }

    async fn read_records(
        &self,
        table: &str,
        fields: &[String],
        ids: Option<&BTreeSet<RecordId>>,
    ) -> Result<Vec<RecordRow>, StoreError> {
        let mut columns = vec!["rowid".to_string()];
        columns.extend(fields.iter().map(|f| quote_ident(f)));
        let sql = format!(
            "SELECT {} FROM {} ORDER BY rowid",
            columns.join(", "),
            quote_ident(table)
        );

        let mut rows = self
            .conn
            .query(&sql, ())
            .await
            .map_err(|e| StoreError::Query(format!("read {table}: {e}")))?;

        let width = i32::try_from(fields.len())
            .map_err(|_| StoreError::Query(format!("too many fields requested from {table}")))?;

        let mut records = Vec::new();
        while let Some(row) = rows.next().await? {
            let id = row.get::<i64>(0)?;
            if ids.is_some_and(|wanted| !wanted.contains(&id)) {
                continue;
            }
            let mut values = Vec::with_capacity(fields.len());
            for col in 1..=width {
                values.push(to_field_value(row.get_value(col)?));
            }
            records.push(RecordRow::new(id, values));
        }
        Ok(records)
    }

    async fn update_field(
        &self,
        table: &str,
        field: &str,
        patches: &[(RecordId, String)],
    ) -> Result<Vec<PatchOutcome>, StoreError> {
        if self.versioned && !self.editing.load(Ordering::SeqCst) {
            return Err(StoreError::RequiresTransaction(format!(
                "'{table}' is versioned and cannot be updated outside an edit session"
            )));
        }

        let sql = format!(
            "UPDATE {} SET {} = ?1 WHERE rowid = ?2",
            quote_ident(table),
            quote_ident(field)
        );

        let mut outcomes = Vec::with_capacity(patches.len());
        for (id, value) in patches {
            let outcome = match self
                .conn
                .execute(&sql, libsql::params![value.as_str(), *id])
                .await
            {
                Ok(0) => PatchOutcome::failed(*id, "record not found"),
                Ok(_) => PatchOutcome::ok(*id),
                Err(e) => PatchOutcome::failed(*id, e.to_string()),
            };
            outcomes.push(outcome);
        }
        Ok(outcomes)
    }

    async fn begin_edit(&self, workspace: &str) -> Result<(), StoreError> {
        self.check_workspace(workspace)?;
        if self.editing.load(Ordering::SeqCst) {
            return Err(StoreError::EditLock(format!(
                "an edit session is already open on {workspace}"
            )));
        }
        self.conn
            .execute("BEGIN IMMEDIATE", ())
            .await
            .map_err(|e| StoreError::EditLock(e.to_string()))?;
        self.editing.store(true, Ordering::SeqCst);
        tracing::debug!(workspace, "edit session started");
        Ok(())
    }

    async fn commit_edit(&self, workspace: &str) -> Result<(), StoreError> {
        self.check_workspace(workspace)?;
        if !self.editing.load(Ordering::SeqCst) {
            return Err(StoreError::NoEditSession);
        }
        self.conn.execute("COMMIT", ()).await?;
        self.editing.store(false, Ordering::SeqCst);
        tracing::debug!(workspace, "edit session committed");
        Ok(())
    }

    async fn rollback_edit(&self, workspace: &str) -> Result<(), StoreError> {
        self.check_workspace(workspace)?;
        if !self.editing.load(Ordering::SeqCst) {
            return Err(StoreError::NoEditSession);
        }
        self.editing.store(false, Ordering::SeqCst);
        self.conn.execute("ROLLBACK", ()).await?;
        tracing::debug!(workspace, "edit session rolled back");
        Ok(())
    }
}
