// sentinela/src/cli.rs
//
// Single source of truth for all CLI definitions (Clap structs).

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sentinela")]
#[command(about = "Manifest-driven data-quality validation for geocoded facility datasets", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 🔍 Validates a dataset against the manifest
    Validate {
        /// Data file to validate (default: the manifest's input.file_path)
        input: Option<PathBuf>,

        /// Manifest file (default: ./manifest.yaml when present, else
        /// the built-in defaults)
        #[arg(long, short)]
        manifest: Option<PathBuf>,

        /// Report directory (default: the manifest's output.reports_dir)
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Check names to skip (repeatable)
        #[arg(long)]
        skip: Vec<String>,

        /// Report format(s) to write
        #[arg(long, value_enum, default_value_t = ReportFormat::Both)]
        format: ReportFormat,

        /// Exit non-zero when warnings are present, even if all checks pass
        #[arg(long, default_value = "false")]
        fail_on_warning: bool,
    },

    /// 📝 Writes a starter manifest.yaml
    Init {
        /// Target directory
        #[arg(long, default_value = ".")]
        dir: PathBuf,

        /// Overwrite an existing manifest
        #[arg(long, default_value = "false")]
        force: bool,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    Json,
    Markdown,
    Both,
}
