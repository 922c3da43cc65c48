//! `QaEngine`: one QA run from request to result.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use chrono::{DateTime, Utc};
use geoqa_config::{EngineConfig, GeoQaConfig};
use geoqa_core::enums::CheckKind;
use geoqa_core::field::{ActualField, resolve_field_name};
use geoqa_core::finding::Finding;
use geoqa_core::record::RecordId;
use geoqa_core::report::{QaReport, QaRunResult, StatusUpdate};
use geoqa_core::request::QaRequest;
use geoqa_schema::{
    CompareOptions, LoadOptions, SchemaError, compare_fields, load_expected_fields,
    resolve_mandatory,
};
use geoqa_store::{LibsqlRowStore, RowStore, TargetPath};

use crate::aggregate::{aggregate, read_groups};
use crate::apply::{ApplyTarget, apply_statuses};
use crate::checks::identifier::IdentifierOptions;
use crate::checks::{CheckContext, CheckOutput, duplicates, identifier, mandatory, settle};
use crate::compose::{completed_result, error_result};
use crate::error::EngineError;
use crate::run_log::RunLogWriter;
use crate::scope::{ScopeSettings, resolve_created_field, resolve_scope};
use crate::synth::synthesize;

const DISABLED: &str = "disabled";

/// Runs QA requests against one row store.
pub struct QaEngine<S> {
    store: S,
    config: EngineConfig,
}

impl QaEngine<LibsqlRowStore> {
    /// Open the configured libSQL store.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Configuration` when no store path is configured
    /// or the engine settings are invalid, and `EngineError::StoreAccess` when
    /// the database cannot be opened.
    pub async fn open(config: &GeoQaConfig) -> Result<Self, EngineError> {
        if !config.store.is_configured() {
            return Err(EngineError::Configuration("store.path is not set".into()));
        }
        config
            .engine
            .validate()
            .map_err(|e| EngineError::Configuration(e.to_string()))?;
        let store = LibsqlRowStore::open_local(&config.store.path, config.store.versioned).await?;
        tracing::debug!(path = %config.store.path, versioned = config.store.versioned, "store opened");
        Ok(Self::new(store, config.engine.clone()))
    }
}

impl<S: RowStore> QaEngine<S> {
    pub const fn new(store: S, config: EngineConfig) -> Self {
        Self { store, config }
    }

    pub const fn store(&self) -> &S {
        &self.store
    }

    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Run `request` and always return a result.
    ///
    /// Fatal errors become a result with status `error`. Run logs are
    /// written when a log directory is configured; failing to write them is
    /// logged and does not change the result's outcome.
    pub async fn run(&self, request: &QaRequest) -> QaRunResult {
        let now = Utc::now();
        let mut result = match self.try_run_at(request, now).await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!(
                    qa_target = %request.target,
                    kind = e.kind().as_str(),
                    error = %e,
                    "QA run failed"
                );
                error_result(request, now, &e.to_string(), &self.config.identifier_field)
            }
        };

        if self.config.writes_run_logs() {
            let cap = request
                .max_failure_rows
                .unwrap_or(self.config.null_failure_cap);
            let writer = RunLogWriter::new(&self.config.log_dir, cap);
            if let Err(e) = writer.write(&mut result, now) {
                tracing::warn!(dir = %writer.dir().display(), error = %e, "failed to write run logs");
            }
        }
        result
    }

    /// Run `request` as of now, surfacing fatal errors.
    ///
    /// # Errors
    ///
    /// See [`QaEngine::try_run_at`].
    pub async fn try_run(&self, request: &QaRequest) -> Result<QaRunResult, EngineError> {
        self.try_run_at(request, Utc::now()).await
    }

    /// Run `request` with the lookback window ending at `now`.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Configuration` for blank or invalid inputs,
    /// `EngineError::Schema` when the schema document cannot be loaded,
    /// `EngineError::StoreAccess` when the target cannot be introspected or
    /// scoped, and `EngineError::StatusUpdate` when the write-back fails as a
    /// whole.
    pub async fn try_run_at(
        &self,
        request: &QaRequest,
        now: DateTime<Utc>,
    ) -> Result<QaRunResult, EngineError> {
        let config = &self.config;
        config
            .validate()
            .map_err(|e| EngineError::Configuration(e.to_string()))?;
        let target = self.validate_request(request)?;
        tracing::info!(qa_target = %target.raw, table = %target.table, "starting QA run");

        let expected = load_expected_fields(
            Path::new(request.schema_path.trim()),
            LoadOptions {
                dataset_name: request.dataset_name.as_deref(),
                mode: request.mode,
                dataset_type: Some(&config.dataset_type),
            },
        )
        .map_err(|e| match e {
            SchemaError::DatasetNotFound { .. } => EngineError::Configuration(e.to_string()),
            other => EngineError::Schema(other),
        })?;

        let actual = self.store.list_fields(&target.table).await?;
        let comparison = compare_fields(
            &expected,
            &actual,
            CompareOptions {
                check_types: request.checks.check_types,
                check_lengths: request.checks.check_lengths,
            },
            |name| config.is_non_blocking(name),
        );
        let mandatory_fields = resolve_mandatory(&request.mandatory_fields, &actual);

        let mut global_findings = Vec::new();
        if !comparison.missing_fields.is_empty() {
            global_findings.push(Finding::global_error(
                CheckKind::MissingField,
                format!("Missing fields: {}", comparison.missing_fields.join(", ")),
            ));
        }
        if !mandatory_fields.missing.is_empty() {
            global_findings.push(Finding::global_error(
                CheckKind::MandatoryMissing,
                format!(
                    "Mandatory fields missing: {}",
                    mandatory_fields.missing.join(", ")
                ),
            ));
        }

        let status_field = resolve_field_name(&actual, request.status_field.trim());
        let created_field = resolve_created_field(&actual, &config.created_date_candidates);
        let identifier_field = resolve_field_name(&actual, &config.identifier_field);

        let scope = resolve_scope(
            &self.store,
            &target.table,
            &ScopeSettings {
                status_field,
                created_field: created_field.as_deref(),
                lookback_hours: config.lookback_hours,
                frequency_cap: config.status_frequency_cap,
                enabled: config.scope_enabled,
            },
            now,
        )
        .await?;

        let ctx = CheckContext {
            store: &self.store,
            table: &target.table,
            scope: &scope.ids,
            config,
        };

        let ids = if !request.checks.identifier {
            CheckOutput::skipped(DISABLED)
        } else if let Some(field) = identifier_field {
            let options = IdentifierOptions {
                normalize: request.checks.normalize_identifier,
                check_format: request.checks.identifier_format,
            };
            settle("identifier", identifier::check(&ctx, field, options).await)
        } else {
            CheckOutput::skipped(not_found(&config.identifier_field))
        };

        let nulls = if !request.checks.mandatory_nulls {
            CheckOutput::skipped(DISABLED)
        } else if request.mandatory_fields.is_empty() {
            CheckOutput::skipped("no mandatory fields provided")
        } else {
            settle(
                "mandatory_nulls",
                mandatory::count_nulls(&ctx, &mandatory_fields.present).await,
            )
        };

        let failures = if !request.checks.null_failures {
            CheckOutput::skipped(DISABLED)
        } else if request.mandatory_fields.is_empty() {
            CheckOutput::skipped("no mandatory fields provided")
        } else {
            let cap = request.max_failure_rows.unwrap_or(config.null_failure_cap);
            settle(
                "null_failures",
                mandatory::collect_failures(&ctx, &mandatory_fields.present, identifier_field, cap)
                    .await,
            )
        };

        let secondary_wanted = request
            .secondary_duplicate_field
            .as_deref()
            .map(str::trim)
            .filter(|f| !f.is_empty());
        let dupes = if !request.checks.secondary_duplicates {
            CheckOutput::skipped(DISABLED)
        } else if let Some(wanted) = secondary_wanted {
            match resolve_field_name(&actual, wanted) {
                Some(field) => settle(
                    "secondary_duplicates",
                    duplicates::check(&ctx, field, identifier_field).await,
                ),
                None => CheckOutput::skipped(not_found(wanted)),
            }
        } else {
            CheckOutput::skipped("field not provided")
        };

        let statuses = synthesize(
            &scope.ids,
            &global_findings,
            nulls
                .findings
                .iter()
                .chain(&failures.findings)
                .chain(&ids.findings)
                .chain(&dupes.findings),
        );

        let failed_checks: Vec<&str> = [
            ("identifier", ids.section.is_failed()),
            ("mandatory_nulls", nulls.section.is_failed()),
            ("null_failures", failures.section.is_failed()),
            ("secondary_duplicates", dupes.section.is_failed()),
        ]
        .into_iter()
        .filter_map(|(name, failed)| failed.then_some(name))
        .collect();

        let status_update = if !request.apply_updates {
            StatusUpdate::skipped("updates disabled")
        } else if let Some(field) = status_field {
            if statuses.is_empty() {
                StatusUpdate::skipped("no records in scope")
            } else if failed_checks.is_empty() {
                let summary = apply_statuses(
                    &self.store,
                    ApplyTarget {
                        target: &target,
                        status_field: field,
                        error_sample_cap: config.error_sample_cap,
                        skip_unchanged: config.skip_unchanged,
                    },
                    &statuses,
                    &scope.stored_status,
                )
                .await
                .map_err(EngineError::StatusUpdate)?;
                StatusUpdate::Applied(summary)
            } else {
                StatusUpdate::skipped(format!("checks failed: {}", failed_checks.join(", ")))
            }
        } else {
            StatusUpdate::skipped(format!(
                "status field '{}' not found",
                request.status_field.trim()
            ))
        };

        let groups = self.group_values(&actual, &target.table, &scope.ids).await;
        let issues = aggregate(&statuses, &groups, &config.group_field);

        let report = QaReport {
            dataset_name: Some(expected.dataset_name.clone()),
            expected_field_count: expected.len() as u64,
            actual_field_count: actual.len() as u64,
            scope: scope.summary,
            missing_fields: comparison.missing_fields,
            missing_warnings: comparison.missing_warnings,
            extra_fields: comparison.extra_fields,
            details: comparison.details,
            nguid_summary: ids.section,
            mandatory_missing: mandatory_fields.missing,
            mandatory_nulls: nulls.section,
            mandatory_null_failures: failures.section,
            address_duplicates: dupes.section,
            issues_by_agency: issues,
            global_findings,
        };

        let result = completed_result(
            request,
            now,
            report,
            status_update,
            &config.identifier_field,
        );
        tracing::info!(
            qa_target = %target.raw,
            status = result.status.as_str(),
            qa_passed = result.qa_passed,
            "QA run complete"
        );
        Ok(result)
    }

    fn validate_request(&self, request: &QaRequest) -> Result<TargetPath, EngineError> {
        for (name, value) in [
            ("target", &request.target),
            ("schema path", &request.schema_path),
            ("status field", &request.status_field),
        ] {
            if value.trim().is_empty() {
                return Err(EngineError::Configuration(format!("{name} is blank")));
            }
        }
        TargetPath::parse(request.target.trim(), &self.config.workspace_markers)
            .map_err(|e| EngineError::Configuration(e.to_string()))
    }

    async fn group_values(
        &self,
        actual: &[ActualField],
        table: &str,
        ids: &BTreeSet<RecordId>,
    ) -> BTreeMap<RecordId, String> {
        let Some(field) = resolve_field_name(actual, &self.config.group_field) else {
            return BTreeMap::new();
        };
        match read_groups(&self.store, table, field, ids).await {
            Ok(groups) => groups,
            Err(e) => {
                tracing::warn!(field, error = %e, "failed to read group values");
                BTreeMap::new()
            }
        }
    }
}

fn not_found(field: &str) -> String {
    format!("field '{field}' not found")
}
