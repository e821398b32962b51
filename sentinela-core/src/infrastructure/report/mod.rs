// sentinela-core/src/infrastructure/report/mod.rs

pub mod json;
pub mod markdown;

use crate::domain::report::ValidationReport;

/// Timestamp slug shared by every file of one run, so JSON and Markdown
/// outputs of the same run sort together.
fn timestamp_slug(report: &ValidationReport) -> String {
    report.timestamp.format("%Y%m%d_%H%M%S").to_string()
}
