//! libSQL adapter against a real database file.

use std::collections::BTreeSet;

use geoqa_core::field::FieldType;
use geoqa_core::record::FieldValue;
use geoqa_store::{LibsqlRowStore, RowStore, StoreError};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

async fn seeded(dir: &TempDir, versioned: bool) -> (LibsqlRowStore, String) {
    let path = dir.path().join("county.db").display().to_string();
    let store = LibsqlRowStore::open_local(&path, versioned).await.unwrap();
    store
        .conn()
        .execute_batch(
            "CREATE TABLE AddressPoints (
                OBJECTID INTEGER PRIMARY KEY,
                NGUID String(254),
                Agency String(100),
                QAStatus String(255),
                created_date Date
             );
             INSERT INTO AddressPoints VALUES (1, '{A}', 'north', NULL, '2026-10-01 08:00:00');
             INSERT INTO AddressPoints VALUES (2, '', 'south', 'Passed', NULL);
             INSERT INTO AddressPoints VALUES (3, NULL, NULL, 'NGUID is empty', NULL);",
        )
        .await
        .unwrap();
    (store, path)
}

#[tokio::test]
async fn lists_fields_with_declared_lengths() {
    let dir = TempDir::new().unwrap();
    let (store, _) = seeded(&dir, false).await;

    let fields = store.list_fields("AddressPoints").await.unwrap();
    let names: Vec<&str> = fields.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["OBJECTID", "NGUID", "Agency", "QAStatus", "created_date"]);
    assert_eq!(fields[1].field_type, FieldType::String);
    assert_eq!(fields[1].length, Some(254));
    assert_eq!(fields[4].field_type, FieldType::Date);
}

#[tokio::test]
async fn missing_table_is_target_not_found() {
    let dir = TempDir::new().unwrap();
    let (store, _) = seeded(&dir, false).await;
    assert!(matches!(
        store.list_fields("Roads").await,
        Err(StoreError::TargetNotFound(_))
    ));
}

#[tokio::test]
async fn reads_rows_by_rowid() {
    let dir = TempDir::new().unwrap();
    let (store, _) = seeded(&dir, false).await;

    let rows = store
        .read_records("AddressPoints", &["NGUID".into(), "QAStatus".into()], None)
        .await
        .unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].id, 1);
    assert_eq!(rows[0].values, vec![FieldValue::text("{A}"), FieldValue::Null]);
    assert_eq!(rows[1].values[0], FieldValue::text(""));

    let ids = BTreeSet::from([3]);
    let only = store
        .read_records("AddressPoints", &["Agency".into()], Some(&ids))
        .await
        .unwrap();
    assert_eq!(only.len(), 1);
    assert!(only[0].value(0).is_null());
}

#[tokio::test]
async fn plain_store_updates_directly() {
    let dir = TempDir::new().unwrap();
    let (store, _) = seeded(&dir, false).await;

    let outcomes = store
        .update_field(
            "AddressPoints",
            "QAStatus",
            &[(1, "Passed".into()), (42, "Passed".into())],
        )
        .await
        .unwrap();
    assert!(outcomes[0].is_ok());
    assert_eq!(outcomes[1].error.as_deref(), Some("record not found"));

    let rows = store
        .read_records("AddressPoints", &["QAStatus".into()], None)
        .await
        .unwrap();
    assert_eq!(rows[0].values[0], FieldValue::text("Passed"));
}

#[tokio::test]
async fn versioned_store_writes_only_inside_edit_session() {
    let dir = TempDir::new().unwrap();
    let (store, path) = seeded(&dir, true).await;

    let err = store
        .update_field("AddressPoints", "QAStatus", &[(1, "Passed".into())])
        .await
        .unwrap_err();
    assert!(err.requires_transaction());

    store.begin_edit(&path).await.unwrap();
    store
        .update_field("AddressPoints", "QAStatus", &[(1, "Passed".into())])
        .await
        .unwrap();
    store.rollback_edit(&path).await.unwrap();

    let rows = store
        .read_records("AddressPoints", &["QAStatus".into()], None)
        .await
        .unwrap();
    assert!(rows[0].values[0].is_null());

    store.begin_edit(&path).await.unwrap();
    store
        .update_field("AddressPoints", "QAStatus", &[(1, "Passed".into())])
        .await
        .unwrap();
    store.commit_edit(&path).await.unwrap();

    let rows = store
        .read_records("AddressPoints", &["QAStatus".into()], None)
        .await
        .unwrap();
    assert_eq!(rows[0].values[0], FieldValue::text("Passed"));
}

#[tokio::test]
async fn edit_session_on_foreign_workspace_is_refused() {
    let dir = TempDir::new().unwrap();
    let (store, _) = seeded(&dir, true).await;
    assert!(matches!(
        store.begin_edit("/elsewhere/other.db").await,
        Err(StoreError::WorkspaceMismatch { .. })
    ));
}
