// sentinela-core/src/infrastructure/report/json.rs

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::json;
use tracing::info;

use crate::domain::report::ValidationReport;
use crate::infrastructure::error::InfrastructureError;
use crate::infrastructure::fs::atomic_write;
use crate::infrastructure::report::timestamp_slug;

/// Writes the full machine-readable report as
/// `validation_report_<timestamp>.json` under `output_dir`.
pub fn write_json_report(
    report: &ValidationReport,
    output_dir: &Path,
) -> Result<PathBuf, InfrastructureError> {
    fs::create_dir_all(output_dir)?;
    let path = output_dir.join(format!("validation_report_{}.json", timestamp_slug(report)));

    let severities: serde_json::Map<String, serde_json::Value> = report
        .count_by_severity()
        .into_iter()
        .map(|(sev, count)| (sev.as_str().to_string(), json!(count)))
        .collect();

    let document = json!({
        "metadata": {
            "timestamp": report.timestamp.to_rfc3339(),
            "manifest": &report.manifest_path,
            "data_file": &report.data_file,
            "row_count": report.row_count,
            "column_count": report.column_count,
            "duration_seconds": report.duration.as_secs_f64(),
        },
        "summary": {
            "passed": report.passed(),
            "total_checks": report.total_checks(),
            "passed_checks": report.passed_checks(),
            "failed_checks": report.failed_checks(),
            "pass_rate": report.pass_rate(),
            "findings_by_severity": severities,
        },
        "results": &report.results,
    });

    let rendered = serde_json::to_string_pretty(&document)
        .map_err(|e| InfrastructureError::Io(e.into()))?;
    atomic_write(&path, rendered)?;
    info!(path = ?path, "JSON report written");
    Ok(path)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::report::{CheckResult, Finding, Severity};
    use chrono::Utc;
    use std::time::Duration;
    use tempfile::tempdir;

    fn sample_report() -> ValidationReport {
        let mut failed = CheckResult::new("constraints");
        failed.record(Finding::new(Severity::Major, "constraints", "bad CNES"));
        ValidationReport {
            timestamp: Utc::now(),
            manifest_path: "manifest.yaml".into(),
            data_file: "data.csv".into(),
            row_count: 10,
            column_count: 7,
            results: vec![CheckResult::new("schema"), failed],
            duration: Duration::from_millis(42),
        }
    }

    #[test]
    fn test_json_report_structure() {
        let dir = tempdir().unwrap();
        let path = write_json_report(&sample_report(), dir.path()).unwrap();
        assert!(
            path.file_name()
                .unwrap()
                .to_str()
                .unwrap()
                .starts_with("validation_report_")
        );

        let parsed: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(parsed["summary"]["passed"], false);
        assert_eq!(parsed["summary"]["total_checks"], 2);
        assert_eq!(parsed["summary"]["failed_checks"], 1);
        assert_eq!(parsed["summary"]["findings_by_severity"]["MAJOR"], 1);
        assert_eq!(parsed["metadata"]["row_count"], 10);
        assert_eq!(parsed["results"][1]["errors"][0]["message"], "bad CNES");
    }

    #[test]
    fn test_output_directory_created() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let path = write_json_report(&sample_report(), &nested).unwrap();
        assert!(path.exists());
    }
}
