//! Run-log writer: the full result as JSON plus CSV extracts.
//!
//! Files for a run share one timestamp:
//! `qa_run_<ts>.json`, `mandatory_null_failures_<ts>.csv`,
//! `address_duplicates_<ts>.csv`. A CSV is only written when it has rows.

use std::fs::File;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use geoqa_core::report::{NullFailureSummary, QaRunResult, SecondaryDuplicateSummary};

use crate::compose::run_timestamp;
use crate::error::RunLogError;

/// Marker written as the last CSV row when the row cap was reached.
pub const TRUNCATED_MARKER: &str = "TRUNCATED";

/// Paths written for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunLogFiles {
    pub result: PathBuf,
    pub null_failures: Option<PathBuf>,
    pub duplicates: Option<PathBuf>,
}

/// Writes run logs into a directory.
pub struct RunLogWriter {
    dir: PathBuf,
    row_cap: usize,
}

impl RunLogWriter {
    /// `row_cap` bounds the data rows of each CSV.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>, row_cap: usize) -> Self {
        Self {
            dir: dir.into(),
            row_cap,
        }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write every log file for `result` and record the JSON path in
    /// `result.log_path`.
    ///
    /// # Errors
    ///
    /// Returns `RunLogError` if the directory or a file cannot be written.
    pub fn write(
        &self,
        result: &mut QaRunResult,
        at: DateTime<Utc>,
    ) -> Result<RunLogFiles, RunLogError> {
        std::fs::create_dir_all(&self.dir).map_err(|source| RunLogError::Io {
            path: self.dir.display().to_string(),
            source,
        })?;
        let ts = run_timestamp(at);

        let mut files = RunLogFiles {
            result: self.dir.join(format!("qa_run_{ts}.json")),
            null_failures: None,
            duplicates: None,
        };

        if let Some(report) = &result.report {
            if let Some(failures) = report.mandatory_null_failures.ran() {
                let path = self.dir.join(format!("mandatory_null_failures_{ts}.csv"));
                if self.write_null_failures(&path, failures)? {
                    files.null_failures = Some(path);
                }
            }
            if let Some(dupes) = report.address_duplicates.ran() {
                let path = self.dir.join(format!("address_duplicates_{ts}.csv"));
                if self.write_duplicates(&path, dupes)? {
                    files.duplicates = Some(path);
                }
            }
        }

        result.log_path = Some(files.result.display().to_string());
        let file = create(&files.result)?;
        serde_json::to_writer_pretty(file, &*result)?;

        tracing::debug!(path = %files.result.display(), "run log written");
        Ok(files)
    }

    fn write_null_failures(
        &self,
        path: &Path,
        failures: &NullFailureSummary,
    ) -> Result<bool, RunLogError> {
        if failures.rows.is_empty() {
            return Ok(false);
        }
        let mut writer = csv::Writer::from_writer(create(path)?);
        writer.write_record(["RecordId", "Identifier", "FailingFields"])?;
        for row in failures.rows.iter().take(self.row_cap) {
            writer.write_record([
                row.record_id.to_string(),
                row.identifier.clone().unwrap_or_default(),
                row.failing_fields.join("; "),
            ])?;
        }
        if failures.truncated || failures.rows.len() > self.row_cap {
            self.write_marker(&mut writer)?;
        }
        writer.flush().map_err(|source| RunLogError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Ok(true)
    }

    fn write_duplicates(
        &self,
        path: &Path,
        dupes: &SecondaryDuplicateSummary,
    ) -> Result<bool, RunLogError> {
        if dupes.duplicate_groups.is_empty() {
            return Ok(false);
        }
        let mut writer = csv::Writer::from_writer(create(path)?);
        writer.write_record(["Value", "RecordId", "Identifier"])?;
        let mut written = 0;
        'groups: for group in &dupes.duplicate_groups {
            for (idx, id) in group.record_ids.iter().enumerate() {
                let identifier = group
                    .identifiers
                    .get(idx)
                    .cloned()
                    .flatten()
                    .unwrap_or_default();
                writer.write_record([group.value.clone(), id.to_string(), identifier])?;
                written += 1;
                if written >= self.row_cap {
                    self.write_marker(&mut writer)?;
                    break 'groups;
                }
            }
        }
        writer.flush().map_err(|source| RunLogError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Ok(true)
    }
}

impl RunLogWriter {
    fn write_marker(&self, writer: &mut csv::Writer<File>) -> Result<(), RunLogError> {
        writer.write_record([
            TRUNCATED_MARKER.to_string(),
            String::new(),
            format!("Reached max rows {}", self.row_cap),
        ])?;
        Ok(())
    }
}

fn create(path: &Path) -> Result<File, RunLogError> {
    File::create(path).map_err(|source| RunLogError::Io {
        path: path.display().to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use geoqa_core::request::QaRequest;
    use tempfile::TempDir;

    #[test]
    fn error_run_writes_only_the_json_log() {
        let dir = TempDir::new().unwrap();
        let at = Utc.with_ymd_and_hms(2026, 3, 2, 4, 5, 6).unwrap();
        let mut result =
            crate::compose::error_result(&QaRequest::new("", "s.json"), at, "target is blank", "NGUID");

        let files = RunLogWriter::new(dir.path().join("logs"), 10)
            .write(&mut result, at)
            .unwrap();

        assert!(files.result.ends_with("qa_run_20260302_040506.json"));
        assert!(files.null_failures.is_none());
        assert!(files.duplicates.is_none());
        assert_eq!(
            result.log_path.as_deref(),
            Some(files.result.display().to_string().as_str())
        );

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&files.result).unwrap()).unwrap();
        assert_eq!(written["status"], "error");
        assert_eq!(written["error"], "target is blank");
        assert_eq!(written["logPath"], files.result.display().to_string());
    }
}
