// sentinela-core/src/domain/report.rs
//
// Severity scale and the result shapes every check and renderer consumes.

use chrono::{DateTime, Utc};
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value as Json};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

/// Upper bound on the row-position sample attached to a single finding.
/// The full count survives under `details["total_rows"]`.
pub const ROW_SAMPLE_CAP: usize = 50;

/// Ordered severity scale. Declaration order is the total order:
/// `Info < Minor < Major < Blocker`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Info,
    Minor,
    Major,
    Blocker,
}

impl Severity {
    pub const ALL: [Severity; 4] = [
        Severity::Info,
        Severity::Minor,
        Severity::Major,
        Severity::Blocker,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "INFO",
            Severity::Minor => "MINOR",
            Severity::Major => "MAJOR",
            Severity::Blocker => "BLOCKER",
        }
    }

    /// Case-sensitive exact match against the four canonical names.
    pub fn from_name(name: &str) -> Option<Severity> {
        match name {
            "INFO" => Some(Severity::Info),
            "MINOR" => Some(Severity::Minor),
            "MAJOR" => Some(Severity::Major),
            "BLOCKER" => Some(Severity::Blocker),
            _ => None,
        }
    }

    /// Resolves a manifest-supplied severity string, falling back to
    /// `default` on unrecognized input. The second element tells the
    /// caller whether the fallback fired, so the owning check can surface
    /// it as an INFO finding instead of swallowing it.
    pub fn resolve_or(name: &str, default: Severity) -> (Severity, bool) {
        match Severity::from_name(name) {
            Some(sev) => (sev, false),
            None => (default, true),
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One reported issue or informational note. Built once by a check and
/// immutable afterwards (builder-style constructors, no setters).
#[derive(Debug, Clone, Serialize)]
pub struct Finding {
    pub severity: Severity,
    pub category: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_indices: Option<Vec<usize>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<Json>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual: Option<Json>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Map<String, Json>>,
}

impl Finding {
    pub fn new(severity: Severity, category: impl Into<String>, message: impl Into<String>) -> Self {
        Finding {
            severity,
            category: category.into(),
            message: message.into(),
            row_indices: None,
            column: None,
            expected: None,
            actual: None,
            details: None,
        }
    }

    /// Attaches a bounded sample of affected row positions. Samples longer
    /// than [`ROW_SAMPLE_CAP`] are truncated, preserving the total count in
    /// the details payload.
    pub fn with_rows(mut self, mut rows: Vec<usize>) -> Self {
        if rows.len() > ROW_SAMPLE_CAP {
            let total = rows.len();
            rows.truncate(ROW_SAMPLE_CAP);
            self = self.with_detail("total_rows", Json::from(total));
        }
        self.row_indices = Some(rows);
        self
    }

    pub fn with_column(mut self, column: impl Into<String>) -> Self {
        self.column = Some(column.into());
        self
    }

    pub fn with_expected(mut self, expected: impl Into<Json>) -> Self {
        self.expected = Some(expected.into());
        self
    }

    pub fn with_actual(mut self, actual: impl Into<Json>) -> Self {
        self.actual = Some(actual.into());
        self
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Json>) -> Self {
        self.details
            .get_or_insert_with(Map::new)
            .insert(key.into(), value.into());
        self
    }
}

/// Outcome of one check invocation. Buckets are private: findings enter
/// through [`CheckResult::record`], which applies the single engine-level
/// routing rule (BLOCKER/MAJOR -> errors, MINOR -> warnings, INFO -> info),
/// and `passed` is always derived from the errors bucket.
#[derive(Debug, Clone)]
pub struct CheckResult {
    category: String,
    errors: Vec<Finding>,
    warnings: Vec<Finding>,
    info: Vec<Finding>,
    duration: Duration,
}

impl CheckResult {
    pub fn new(category: impl Into<String>) -> Self {
        CheckResult {
            category: category.into(),
            errors: Vec::new(),
            warnings: Vec::new(),
            info: Vec::new(),
            duration: Duration::ZERO,
        }
    }

    pub fn record(&mut self, finding: Finding) {
        match finding.severity {
            Severity::Blocker | Severity::Major => self.errors.push(finding),
            Severity::Minor => self.warnings.push(finding),
            Severity::Info => self.info.push(finding),
        }
    }

    /// True iff the errors bucket is empty. Derived, never stored.
    pub fn passed(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn errors(&self) -> &[Finding] {
        &self.errors
    }

    pub fn warnings(&self) -> &[Finding] {
        &self.warnings
    }

    pub fn info(&self) -> &[Finding] {
        &self.info
    }

    pub fn total_issues(&self) -> usize {
        self.errors.len() + self.warnings.len() + self.info.len()
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub(crate) fn set_duration(&mut self, duration: Duration) {
        self.duration = duration;
    }

    fn iter_findings(&self) -> impl Iterator<Item = &Finding> {
        self.errors
            .iter()
            .chain(self.warnings.iter())
            .chain(self.info.iter())
    }
}

impl Serialize for CheckResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("CheckResult", 6)?;
        s.serialize_field("category", &self.category)?;
        s.serialize_field("passed", &self.passed())?;
        s.serialize_field("errors", &self.errors)?;
        s.serialize_field("warnings", &self.warnings)?;
        s.serialize_field("info", &self.info)?;
        s.serialize_field("duration_seconds", &self.duration.as_secs_f64())?;
        s.end()
    }
}

/// Run-wide report. Result order mirrors check registration order; all
/// aggregates are computed on demand from `results`.
#[derive(Debug, Clone)]
pub struct ValidationReport {
    pub timestamp: DateTime<Utc>,
    pub manifest_path: String,
    pub data_file: String,
    pub row_count: usize,
    pub column_count: usize,
    pub results: Vec<CheckResult>,
    pub duration: Duration,
}

impl ValidationReport {
    /// Logical AND over every contained result.
    pub fn passed(&self) -> bool {
        self.results.iter().all(CheckResult::passed)
    }

    pub fn total_checks(&self) -> usize {
        self.results.len()
    }

    pub fn passed_checks(&self) -> usize {
        self.results.iter().filter(|r| r.passed()).count()
    }

    pub fn failed_checks(&self) -> usize {
        self.total_checks() - self.passed_checks()
    }

    pub fn pass_rate(&self) -> f64 {
        if self.results.is_empty() {
            0.0
        } else {
            self.passed_checks() as f64 / self.total_checks() as f64
        }
    }

    /// Finding counts per severity, across all buckets of all results.
    /// Every severity appears as a key, even at zero.
    pub fn count_by_severity(&self) -> BTreeMap<Severity, usize> {
        let mut counts: BTreeMap<Severity, usize> =
            Severity::ALL.iter().map(|s| (*s, 0)).collect();
        for result in &self.results {
            for finding in result.iter_findings() {
                *counts.entry(finding.severity).or_default() += 1;
            }
        }
        counts
    }

    pub fn has_blockers(&self) -> bool {
        self.count_by_severity()[&Severity::Blocker] > 0
    }

    pub fn total_warnings(&self) -> usize {
        self.results.iter().map(|r| r.warnings().len()).sum()
    }
}
