//! QA runs against a libSQL database file, run logs, and the result's JSON
//! contract.

mod common;

use std::collections::BTreeSet;

use geoqa_config::{EngineConfig, GeoQaConfig, StoreConfig};
use geoqa_core::enums::RunStatus;
use geoqa_core::record::FieldValue;
use geoqa_core::report::QaRunResult;
use geoqa_engine::{ErrorKind, QaEngine};
use geoqa_store::{LibsqlRowStore, RowStore};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

use common::{ID_1, ID_5, address_points, now, request, schema_file};

async fn county_db(dir: &TempDir, versioned: bool) -> (LibsqlRowStore, String) {
    let path = dir.path().join("county.db").display().to_string();
    let store = LibsqlRowStore::open_local(&path, versioned).await.unwrap();
    store
        .conn()
        .execute_batch(&format!(
            "CREATE TABLE AddressPoints (
                OBJECTID INTEGER PRIMARY KEY,
                NGUID String(254),
                Agency String(100),
                QAStatus String(255),
                Add_Number Integer,
                FullAddress String(254),
                created_date Date
             );
             INSERT INTO AddressPoints VALUES (1, '{ID_1}', 'north', NULL, 10, '1 MAIN ST', '2026-01-01 00:00:00');
             INSERT INTO AddressPoints VALUES (2, '{ID_5}', 'north', 'Passed', NULL, '9 ELM ST', '2026-01-01 00:00:00');
             INSERT INTO AddressPoints VALUES (3, '', 'south', 'Failed', 4, '1 main st ', '2026-10-18 11:30:00');"
        ))
        .await
        .unwrap();
    (store, path)
}

async fn statuses(store: &LibsqlRowStore) -> Vec<(i64, FieldValue)> {
    store
        .read_records("AddressPoints", &["QAStatus".to_string()], None)
        .await
        .unwrap()
        .into_iter()
        .map(|row| (row.id, row.values[0].clone()))
        .collect()
}

#[tokio::test]
async fn versioned_database_is_updated_through_an_edit_session() {
    let db_dir = TempDir::new().unwrap();
    let (store, path) = county_db(&db_dir, true).await;
    let (_schema_dir, schema) = schema_file();
    let mut req = request(&schema);
    req.target = format!("{path}/AddressPoints");

    let engine = QaEngine::new(store, EngineConfig::default());
    let result = engine.try_run_at(&req, now()).await.unwrap();

    let report = result.report.as_ref().unwrap();
    assert_eq!(report.scope.rows_in_scope, 2);
    assert_eq!(report.scope.status_field.as_deref(), Some("QAStatus"));
    let update = result.status_update.as_ref().unwrap().applied().unwrap();
    assert!(update.used_edit_session);
    assert_eq!(update.edit_workspace.as_deref(), Some(path.as_str()));
    assert_eq!(update.successes, 2);

    assert_eq!(
        statuses(engine.store()).await,
        vec![
            (1, FieldValue::from("Warning: Duplicate address")),
            (2, FieldValue::from("Passed")),
            (3, FieldValue::from("NGUID is empty")),
        ]
    );
    assert!(!result.qa_passed);

    // Both records stay in scope and are left untouched.
    let again = engine.try_run_at(&req, now()).await.unwrap();
    let update = again.status_update.as_ref().unwrap().applied().unwrap();
    assert_eq!(update.successes, 0);
    assert_eq!(update.unchanged, 2);
}

#[tokio::test]
async fn unversioned_database_is_updated_directly() {
    let db_dir = TempDir::new().unwrap();
    let (store, path) = county_db(&db_dir, false).await;
    let (_schema_dir, schema) = schema_file();
    let mut req = request(&schema);
    req.target = format!("{path}/AddressPoints");

    let engine = QaEngine::new(store, EngineConfig::default());
    let result = engine.try_run_at(&req, now()).await.unwrap();

    let update = result.status_update.as_ref().unwrap().applied().unwrap();
    assert!(!update.used_edit_session);
    assert_eq!(update.edit_workspace, None);

    let in_scope: BTreeSet<i64> = [3].into();
    let rows = engine
        .store()
        .read_records("AddressPoints", &["QAStatus".to_string()], Some(&in_scope))
        .await
        .unwrap();
    assert_eq!(rows[0].values[0], FieldValue::from("NGUID is empty"));
}

#[tokio::test]
async fn engine_opens_the_configured_store() {
    let db_dir = TempDir::new().unwrap();
    let (_, path) = county_db(&db_dir, false).await;
    let (_schema_dir, schema) = schema_file();

    let missing = QaEngine::open(&GeoQaConfig::default()).await.err().unwrap();
    assert_eq!(missing.kind(), ErrorKind::Configuration);

    let config = GeoQaConfig {
        engine: EngineConfig::default(),
        store: StoreConfig {
            path: path.clone(),
            versioned: false,
        },
    };
    let engine = QaEngine::open(&config).await.unwrap();
    let mut req = request(&schema);
    req.target = format!("{path}/AddressPoints");
    req.apply_updates = false;

    let result = engine.try_run_at(&req, now()).await.unwrap();
    assert_eq!(result.report.unwrap().scope.total_rows, 3);
}

#[tokio::test]
async fn run_logs_are_written_next_to_the_result() {
    let log_dir = TempDir::new().unwrap();
    let (_schema_dir, schema) = schema_file();
    let config = EngineConfig {
        log_dir: log_dir.path().display().to_string(),
        ..EngineConfig::default()
    };
    let engine = QaEngine::new(address_points(), config);

    let result = engine.run(&request(&schema)).await;

    let json_path = std::path::PathBuf::from(result.log_path.as_deref().unwrap());
    assert!(json_path.starts_with(log_dir.path()));
    let logged: QaRunResult =
        serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
    assert_eq!(logged.status, result.status);
    assert_eq!(logged.log_path, result.log_path);

    let ts = &result.timestamp;
    let nulls =
        std::fs::read_to_string(log_dir.path().join(format!("mandatory_null_failures_{ts}.csv")))
            .unwrap();
    let lines: Vec<&str> = nulls.lines().collect();
    assert_eq!(lines[0], "RecordId,Identifier,FailingFields");
    assert!(lines.contains(&format!("5,{ID_5},Add_Number").as_str()), "{nulls}");

    let dupes =
        std::fs::read_to_string(log_dir.path().join(format!("address_duplicates_{ts}.csv")))
            .unwrap();
    let lines: Vec<&str> = dupes.lines().collect();
    assert_eq!(lines[0], "Value,RecordId,Identifier");
    assert_eq!(lines[1], format!("1 MAIN ST,1,{ID_1}"));
    assert_eq!(lines.len(), 3);
}

#[tokio::test]
async fn csv_logs_are_capped_with_a_marker_row() {
    let log_dir = TempDir::new().unwrap();
    let (_schema_dir, schema) = schema_file();
    let config = EngineConfig {
        log_dir: log_dir.path().display().to_string(),
        ..EngineConfig::default()
    };
    let engine = QaEngine::new(address_points(), config);
    let mut req = request(&schema);
    req.mandatory_fields = vec!["Add_Number".into(), "created_date".into()];
    req.max_failure_rows = Some(1);
    engine.store().set_value(1, "created_date", FieldValue::Null);

    let result = engine.run(&req).await;

    let failures = result
        .report
        .as_ref()
        .unwrap()
        .mandatory_null_failures
        .ran()
        .unwrap();
    assert_eq!(failures.total_failed_features, 2);
    assert!(failures.truncated);

    let ts = &result.timestamp;
    let nulls =
        std::fs::read_to_string(log_dir.path().join(format!("mandatory_null_failures_{ts}.csv")))
            .unwrap();
    let first_row = format!("1,{ID_1},created_date");
    let lines: Vec<&str> = nulls.lines().collect();
    assert_eq!(
        lines,
        vec![
            "RecordId,Identifier,FailingFields",
            first_row.as_str(),
            "TRUNCATED,,Reached max rows 1",
        ]
    );

    let dupes =
        std::fs::read_to_string(log_dir.path().join(format!("address_duplicates_{ts}.csv")))
            .unwrap();
    let lines: Vec<&str> = dupes.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[2], "TRUNCATED,,Reached max rows 1");
}

#[tokio::test]
async fn result_matches_its_json_schema() {
    let (_schema_dir, schema) = schema_file();
    let engine = QaEngine::new(address_points(), EngineConfig::default());

    let completed = engine.try_run_at(&request(&schema), now()).await.unwrap();
    let mut bad = request(&schema);
    bad.target = String::new();
    let failed = engine.run(&bad).await;
    assert_eq!(failed.status, RunStatus::Error);

    let contract = serde_json::to_value(schemars::schema_for!(QaRunResult)).unwrap();
    let validator = jsonschema::validator_for(&contract).unwrap();
    for result in [&completed, &failed] {
        let instance = serde_json::to_value(result).unwrap();
        let errors: Vec<String> = validator
            .iter_errors(&instance)
            .map(|e| e.to_string())
            .collect();
        assert!(errors.is_empty(), "{errors:?}");
    }

    let json = serde_json::to_value(&completed).unwrap();
    assert_eq!(json["status"], "qa_failed");
    assert_eq!(json["report"]["nguidSummary"]["duplicateCount"], 1);
    assert!(json["report"]["mandatoryNullFailures"].get("rows").is_none());
}
