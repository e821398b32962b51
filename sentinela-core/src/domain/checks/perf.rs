// sentinela-core/src/domain/checks/perf.rs

use std::time::Instant;

use crate::domain::checks::Check;
use crate::domain::dataset::Dataset;
use crate::domain::manifest::ManifestConfig;
use crate::domain::report::{CheckResult, Finding, Severity};

/// Scale guardrails: estimated in-memory footprint and row count against
/// the manifest thresholds, plus a scan micro-benchmark for the record.
pub struct PerfCheck;

impl Check for PerfCheck {
    fn name(&self) -> &'static str {
        "perf"
    }

    fn description(&self) -> &'static str {
        "Validates dataset scale against memory and row thresholds"
    }

    fn execute(&self, dataset: &Dataset, config: &ManifestConfig) -> CheckResult {
        let mut result = CheckResult::new(self.name());
        let thresholds = &config.performance;

        let bytes = dataset.approx_bytes();
        let mb = bytes as f64 / (1024.0 * 1024.0);
        if mb > thresholds.memory_error_mb {
            result.record(
                Finding::new(
                    Severity::Blocker,
                    self.name(),
                    format!(
                        "Estimated footprint {:.1} MB exceeds the hard limit ({} MB)",
                        mb, thresholds.memory_error_mb
                    ),
                )
                .with_detail("approx_bytes", bytes),
            );
        } else if mb > thresholds.memory_warn_mb {
            result.record(
                Finding::new(
                    Severity::Minor,
                    self.name(),
                    format!(
                        "Estimated footprint {:.1} MB exceeds the warning limit ({} MB)",
                        mb, thresholds.memory_warn_mb
                    ),
                )
                .with_detail("approx_bytes", bytes),
            );
        } else {
            result.record(
                Finding::new(
                    Severity::Info,
                    self.name(),
                    format!("Estimated footprint: {:.1} MB", mb),
                )
                .with_detail("approx_bytes", bytes),
            );
        }

        if dataset.row_count() > thresholds.row_threshold {
            result.record(
                Finding::new(
                    Severity::Minor,
                    self.name(),
                    format!(
                        "{} rows exceed the configured threshold of {}",
                        dataset.row_count(),
                        thresholds.row_threshold
                    ),
                )
                .with_detail("row_threshold", thresholds.row_threshold),
            );
        }

        result.record(self.scan_benchmark(dataset));

        result
    }
}

impl PerfCheck {
    /// Full-table scan timing. Informational only; it gives a baseline for
    /// "this dataset got slow to validate" conversations.
    fn scan_benchmark(&self, dataset: &Dataset) -> Finding {
        let start = Instant::now();
        let mut non_null = 0usize;
        for row in dataset.rows() {
            non_null += row.iter().filter(|v| !v.is_null()).count();
        }
        let elapsed = start.elapsed();

        let cells = dataset.row_count() * dataset.column_count();
        let cells_per_sec = if elapsed.as_secs_f64() > 0.0 {
            cells as f64 / elapsed.as_secs_f64()
        } else {
            f64::INFINITY
        };
        Finding::new(
            Severity::Info,
            self.name(),
            format!("Full scan of {} cell(s) in {:?}", cells, elapsed),
        )
        .with_detail("non_null_cells", non_null)
        .with_detail("cells_per_second", cells_per_sec)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::dataset::Value;

    fn rows_of(n: usize) -> Dataset {
        Dataset::new(
            vec!["CNES".into()],
            (0..n).map(|i| vec![Value::Int(i as i64)]).collect(),
        )
    }

    #[test]
    fn test_small_dataset_is_informational_only() {
        let result = PerfCheck.execute(&rows_of(10), &ManifestConfig::default());
        assert!(result.passed());
        assert!(result.warnings().is_empty());
        assert!(result.info().iter().any(|f| f.message.contains("footprint")));
        assert!(result.info().iter().any(|f| f.message.contains("Full scan")));
    }

    #[test]
    fn test_row_threshold_breach_is_minor() {
        let mut config = ManifestConfig::default();
        config.performance.row_threshold = 5;

        let result = PerfCheck.execute(&rows_of(10), &config);
        assert!(result.passed());
        let finding = result
            .warnings()
            .iter()
            .find(|f| f.message.contains("threshold"))
            .unwrap();
        assert_eq!(finding.severity, Severity::Minor);
    }

    #[test]
    fn test_memory_limits_drive_severity() {
        let ds = rows_of(100);
        let mb = ds.approx_bytes() as f64 / (1024.0 * 1024.0);

        let mut config = ManifestConfig::default();
        config.performance.memory_warn_mb = mb / 2.0;
        let result = PerfCheck.execute(&ds, &config);
        assert!(result.passed());
        assert!(
            result
                .warnings()
                .iter()
                .any(|f| f.message.contains("warning limit"))
        );

        config.performance.memory_error_mb = mb / 2.0;
        let result = PerfCheck.execute(&ds, &config);
        assert!(!result.passed());
        assert!(result.errors()[0].message.contains("hard limit"));
    }
}
