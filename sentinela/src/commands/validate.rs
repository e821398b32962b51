// sentinela/src/commands/validate.rs
//
// USE CASE: Validate a dataset against the manifest and write reports.
//
// Exit codes: 0 = all checks passed, 1 = validation failed (or warnings
// with --fail-on-warning), 2 = configuration / loading error.

use std::path::{Path, PathBuf};

use sentinela_core::domain::report::ValidationReport;
use sentinela_core::{ManifestConfig, Runner, SentinelaError};
use sentinela_core::infrastructure::loader::load_dataset;
use sentinela_core::infrastructure::manifest::load_manifest;
use sentinela_core::infrastructure::report::json::write_json_report;
use sentinela_core::infrastructure::report::markdown::write_markdown_reports;

use crate::cli::ReportFormat;

pub struct ValidateArgs {
    pub input: Option<PathBuf>,
    pub manifest: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub skip: Vec<String>,
    pub format: ReportFormat,
    pub fail_on_warning: bool,
}

pub fn execute(args: ValidateArgs) -> anyhow::Result<()> {
    // A. Configuration. An explicitly named manifest must load (fatal
    // otherwise); with no --manifest, ./manifest.yaml is picked up when
    // present and the built-in defaults apply when it is not.
    let (config, manifest_label) = match resolve_manifest(args.manifest.as_deref()) {
        Ok(resolved) => resolved,
        Err(e) => {
            eprintln!("❌ Manifest error: {}", e);
            std::process::exit(2);
        }
    };

    // B. Dataset
    let data_path = match &args.input {
        Some(path) => path.clone(),
        None if !config.input_file.is_empty() => PathBuf::from(&config.input_file),
        None => {
            eprintln!("❌ No data file: pass one as argument or set input.file_path");
            std::process::exit(2);
        }
    };
    println!("📄 Loading dataset '{}'...", data_path.display());
    let dataset = match load_dataset(&data_path) {
        Ok(dataset) => dataset,
        Err(e) => {
            eprintln!("❌ Could not load dataset: {}", e);
            std::process::exit(2);
        }
    };
    println!(
        "   {} rows × {} columns",
        dataset.row_count(),
        dataset.column_count()
    );

    // C. Run
    let output_dir = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.reports_dir));
    let runner = Runner::new(config).skip_checks(args.skip.iter().cloned());
    let mut report = runner.run(&dataset);
    report.manifest_path = manifest_label;
    report.data_file = data_path.display().to_string();

    print_summary(&report);
    write_reports(&report, &output_dir, args.format)?;

    // D. Exit code for CI/CD
    if !report.passed() {
        eprintln!("\n❌ FAILURE. {} check(s) failed.", report.failed_checks());
        std::process::exit(1);
    }
    if args.fail_on_warning && report.total_warnings() > 0 {
        eprintln!(
            "\n⚠️  {} warning(s) with --fail-on-warning set.",
            report.total_warnings()
        );
        std::process::exit(1);
    }
    println!(
        "\n✨ SUCCESS! {} checks passed in {:.2?}",
        report.total_checks(),
        report.duration
    );
    Ok(())
}

const DEFAULT_MANIFEST: &str = "manifest.yaml";

fn resolve_manifest(
    manifest: Option<&Path>,
) -> Result<(ManifestConfig, String), SentinelaError> {
    match manifest {
        Some(path) => {
            println!("⚙️  Loading manifest '{}'...", path.display());
            Ok((load_manifest(path)?, path.display().to_string()))
        }
        None => {
            let fallback = Path::new(DEFAULT_MANIFEST);
            if fallback.exists() {
                println!("⚙️  Loading manifest '{}'...", fallback.display());
                Ok((load_manifest(fallback)?, DEFAULT_MANIFEST.to_string()))
            } else {
                println!("⚙️  No manifest found, using built-in defaults");
                Ok((ManifestConfig::default(), String::new()))
            }
        }
    }
}

fn print_summary(report: &ValidationReport) {
    println!();
    for result in &report.results {
        let status = if result.passed() { "✅" } else { "❌" };
        println!(
            "{} {:<16} {} error(s), {} warning(s)",
            status,
            result.category(),
            result.errors().len(),
            result.warnings().len()
        );
    }
}

fn write_reports(
    report: &ValidationReport,
    output_dir: &Path,
    format: ReportFormat,
) -> anyhow::Result<()> {
    if matches!(format, ReportFormat::Json | ReportFormat::Both) {
        let path = write_json_report(report, output_dir)?;
        println!("\n📊 JSON report: {}", path.display());
    }
    if matches!(format, ReportFormat::Markdown | ReportFormat::Both) {
        let paths = write_markdown_reports(report, output_dir)?;
        println!("📝 Markdown reports: {} file(s)", paths.len());
    }
    Ok(())
}
