//! Status Synthesizer: one status string per in-scope record.
//!
//! Precedence is fixed: any error finding makes the status the joined
//! errors; otherwise any warning makes it `"Warning: "` plus the joined
//! warnings; otherwise `"Passed"`. Messages are joined with `"; "`,
//! de-duplicated, first occurrence first.

use std::collections::{BTreeMap, BTreeSet};

use geoqa_core::enums::Severity;
use geoqa_core::finding::{Finding, MESSAGE_SEPARATOR, RecordStatus};
use geoqa_core::record::RecordId;

#[derive(Debug, Default)]
struct Collected<'a> {
    errors: Vec<&'a str>,
    warnings: Vec<&'a str>,
}

impl<'a> Collected<'a> {
    fn push(&mut self, finding: &'a Finding) {
        match finding.severity {
            Severity::Error => self.errors.push(&finding.message),
            Severity::Warning => self.warnings.push(&finding.message),
        }
    }
}

/// Join messages, dropping repeats.
#[must_use]
pub fn join_unique(messages: &[&str]) -> String {
    let mut seen = BTreeSet::new();
    messages
        .iter()
        .filter(|m| seen.insert(**m))
        .copied()
        .collect::<Vec<_>>()
        .join(MESSAGE_SEPARATOR)
}

/// Status for one record's collected messages.
#[must_use]
pub fn status_for(errors: &[&str], warnings: &[&str]) -> RecordStatus {
    if !errors.is_empty() {
        RecordStatus::errors(join_unique(errors))
    } else if !warnings.is_empty() {
        RecordStatus::warning(&join_unique(warnings))
    } else {
        RecordStatus::passed()
    }
}

/// Synthesize statuses for every record in `scope`.
///
/// `global` findings apply to every record; `per_record` findings apply to
/// their own record and are ignored when it is out of scope. Message order
/// follows the order findings are supplied in, globals first.
#[must_use]
pub fn synthesize<'a>(
    scope: &BTreeSet<RecordId>,
    global: &'a [Finding],
    per_record: impl IntoIterator<Item = &'a Finding>,
) -> BTreeMap<RecordId, RecordStatus> {
    let mut collected: BTreeMap<RecordId, Collected<'a>> = scope
        .iter()
        .map(|id| {
            let mut c = Collected::default();
            for finding in global {
                c.push(finding);
            }
            (*id, c)
        })
        .collect();

    for finding in per_record {
        if let Some(entry) = finding.record_id.and_then(|id| collected.get_mut(&id)) {
            entry.push(finding);
        }
    }

    collected
        .into_iter()
        .map(|(id, c)| (id, status_for(&c.errors, &c.warnings)))
        .collect()
}
