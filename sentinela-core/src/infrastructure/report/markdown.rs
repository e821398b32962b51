// sentinela-core/src/infrastructure/report/markdown.rs
//
// Human-readable rendering: one Markdown file per check plus an overall
// summary, all stamped with the run's timestamp slug.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::domain::report::{CheckResult, Finding, Severity, ValidationReport};
use crate::infrastructure::error::InfrastructureError;
use crate::infrastructure::fs::atomic_write;
use crate::infrastructure::report::timestamp_slug;

/// Writes `check_<category>_<timestamp>.md` for every result and a
/// `validation_summary_<timestamp>.md`, returning all paths (summary last).
pub fn write_markdown_reports(
    report: &ValidationReport,
    output_dir: &Path,
) -> Result<Vec<PathBuf>, InfrastructureError> {
    fs::create_dir_all(output_dir)?;
    let slug = timestamp_slug(report);

    let mut written = Vec::with_capacity(report.results.len() + 1);
    for result in &report.results {
        let path = output_dir.join(format!("check_{}_{}.md", result.category(), slug));
        atomic_write(&path, render_check(result, report))?;
        written.push(path);
    }

    let summary_path = output_dir.join(format!("validation_summary_{}.md", slug));
    atomic_write(&summary_path, render_summary(report))?;
    written.push(summary_path);

    info!(files = written.len(), "Markdown reports written");
    Ok(written)
}

fn badge(severity: Severity) -> &'static str {
    match severity {
        Severity::Blocker => "🟥 BLOCKER",
        Severity::Major => "🟧 MAJOR",
        Severity::Minor => "🟨 MINOR",
        Severity::Info => "🟦 INFO",
    }
}

fn render_check(result: &CheckResult, report: &ValidationReport) -> String {
    let status = if result.passed() {
        "✅ PASSED"
    } else {
        "❌ FAILED"
    };

    let mut out = String::new();
    let _ = writeln!(out, "# Check: {}\n", result.category());
    let _ = writeln!(out, "**Status:** {status}");
    let _ = writeln!(out, "**Run at:** {}", report.timestamp.to_rfc3339());
    let _ = writeln!(out, "**Data file:** `{}`", report.data_file);
    let _ = writeln!(
        out,
        "**Duration:** {:.3}s\n\n---\n",
        result.duration().as_secs_f64()
    );

    for (title, findings) in [
        ("## ❌ Errors", result.errors()),
        ("## ⚠️ Warnings", result.warnings()),
        ("## ℹ️ Info", result.info()),
    ] {
        if findings.is_empty() {
            continue;
        }
        let _ = writeln!(out, "{title}\n");
        for (i, finding) in findings.iter().enumerate() {
            render_finding(&mut out, i + 1, finding);
        }
    }

    if result.total_issues() == 0 {
        out.push_str("No findings.\n");
    }
    out
}

fn render_finding(out: &mut String, index: usize, finding: &Finding) {
    let _ = writeln!(out, "### {index}. {} — {}\n", badge(finding.severity), finding.message);
    if let Some(column) = &finding.column {
        let _ = writeln!(out, "- **Column:** `{column}`");
    }
    if let Some(expected) = &finding.expected {
        let _ = writeln!(out, "- **Expected:** {expected}");
    }
    if let Some(actual) = &finding.actual {
        let _ = writeln!(out, "- **Actual:** {actual}");
    }
    if let Some(rows) = &finding.row_indices {
        let _ = writeln!(out, "- **Rows (sample):** {rows:?}");
    }
    if let Some(details) = &finding.details {
        let rendered = serde_json::to_string_pretty(details).unwrap_or_default();
        let _ = writeln!(out, "\n```json\n{rendered}\n```");
    }
    out.push('\n');
}

fn render_summary(report: &ValidationReport) -> String {
    let status = if report.passed() {
        "✅ PASSED"
    } else {
        "❌ FAILED"
    };

    let mut out = String::new();
    let _ = writeln!(out, "# Validation Summary\n");
    let _ = writeln!(out, "**Status:** {status}");
    let _ = writeln!(out, "**Run at:** {}", report.timestamp.to_rfc3339());
    let _ = writeln!(out, "**Data file:** `{}`", report.data_file);
    let _ = writeln!(
        out,
        "**Dataset:** {} rows × {} columns",
        report.row_count, report.column_count
    );
    let _ = writeln!(out, "**Duration:** {:.3}s\n", report.duration.as_secs_f64());

    let _ = writeln!(
        out,
        "**Checks:** {} passed / {} total ({:.0}%)\n",
        report.passed_checks(),
        report.total_checks(),
        report.pass_rate() * 100.0
    );

    let _ = writeln!(out, "## Findings by severity\n");
    let _ = writeln!(out, "| Severity | Count |");
    let _ = writeln!(out, "|----------|-------|");
    // Highest severity first.
    for (severity, count) in report.count_by_severity().into_iter().rev() {
        let _ = writeln!(out, "| {} | {} |", badge(severity), count);
    }

    let _ = writeln!(out, "\n## Checks\n");
    let _ = writeln!(out, "| Check | Status | Errors | Warnings | Info |");
    let _ = writeln!(out, "|-------|--------|--------|----------|------|");
    for result in &report.results {
        let _ = writeln!(
            out,
            "| {} | {} | {} | {} | {} |",
            result.category(),
            if result.passed() { "✅" } else { "❌" },
            result.errors().len(),
            result.warnings().len(),
            result.info().len()
        );
    }
    out
}
