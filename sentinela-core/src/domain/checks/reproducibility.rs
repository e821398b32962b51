// sentinela-core/src/domain/checks/reproducibility.rs

use serde_json::Value as Json;
use sha2::{Digest, Sha256};

use crate::domain::checks::Check;
use crate::domain::dataset::Dataset;
use crate::domain::manifest::ManifestConfig;
use crate::domain::report::{CheckResult, Finding, Severity};

/// Row-count drift above which a mismatch is major rather than minor.
const ROW_DRIFT_ESCALATION: usize = 10;

/// Content fingerprinting: an order-insensitive SHA-256 digest of the
/// dataset, compared against the manifest's expected values when present,
/// always reported for the next run to pin.
pub struct ReproducibilityCheck;

impl Check for ReproducibilityCheck {
    fn name(&self) -> &'static str {
        "reproducibility"
    }

    fn description(&self) -> &'static str {
        "Fingerprints the dataset and compares it to pinned expectations"
    }

    fn execute(&self, dataset: &Dataset, config: &ManifestConfig) -> CheckResult {
        let mut result = CheckResult::new(self.name());

        let hash = dataset_hash(dataset);

        if let Some(expected) = &config.reproducibility.expected_hash {
            if !expected.eq_ignore_ascii_case(&hash) {
                result.record(
                    Finding::new(
                        Severity::Blocker,
                        self.name(),
                        "Dataset content hash does not match the pinned hash".to_string(),
                    )
                    .with_expected(expected.as_str())
                    .with_actual(hash.as_str()),
                );
            }
        }

        if let Some(expected) = config.reproducibility.expected_rows {
            let actual = dataset.row_count();
            if actual != expected {
                let drift = actual.abs_diff(expected);
                let severity = if drift > ROW_DRIFT_ESCALATION {
                    Severity::Major
                } else {
                    Severity::Minor
                };
                result.record(
                    Finding::new(
                        severity,
                        self.name(),
                        format!("Row count is {} (pinned: {})", actual, expected),
                    )
                    .with_expected(expected.to_string())
                    .with_actual(actual.to_string())
                    .with_detail("drift", drift),
                );
            }
        }

        // Always surfaced, so a clean run's hash can be pinned next time.
        result.record(
            Finding::new(
                Severity::Info,
                self.name(),
                format!("Dataset content hash: {}", &hash[..16]),
            )
            .with_detail("sha256", hash.as_str())
            .with_detail("rows", dataset.row_count())
            .with_detail("column_digests", Json::from(column_digests(dataset))),
        );

        result
    }
}

/// SHA-256 over all rows sorted lexicographically by their full display
/// form, so the digest is stable under row reordering.
pub fn dataset_hash(dataset: &Dataset) -> String {
    let mut lines: Vec<String> = dataset
        .rows()
        .iter()
        .map(|row| {
            row.iter()
                .map(|v| v.to_display())
                .collect::<Vec<_>>()
                .join("\u{1f}")
        })
        .collect();
    lines.sort_unstable();

    let mut hasher = Sha256::new();
    hasher.update(dataset.column_names().join("\u{1f}").as_bytes());
    for line in &lines {
        hasher.update(b"\n");
        hasher.update(line.as_bytes());
    }
    format!("{:x}", hasher.finalize())
}

/// Short per-column digests, enough to localize which column drifted
/// between two runs with differing dataset hashes.
fn column_digests(dataset: &Dataset) -> Vec<Json> {
    dataset
        .column_names()
        .iter()
        .map(|name| {
            let mut values: Vec<String> = dataset
                .column(name)
                .map(|cells| cells.map(|v| v.to_display()).collect())
                .unwrap_or_default();
            values.sort_unstable();
            let null_count = values.iter().filter(|v| v.is_empty()).count();

            let mut hasher = Sha256::new();
            for value in &values {
                hasher.update(value.as_bytes());
                hasher.update(b"\n");
            }
            let digest = format!("{:x}", hasher.finalize());
            serde_json::json!({
                "column": name,
                "digest": &digest[..12],
                "null_count": null_count,
            })
        })
        .collect()
}
