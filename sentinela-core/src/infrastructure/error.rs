// sentinela-core/src/infrastructure/error.rs

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum InfrastructureError {
    // --- FILESYSTEM (IO) ---
    #[error("File System Error: {0}")]
    #[diagnostic(
        code(sentinela::infra::io),
        help("Check file permissions or path validity.")
    )]
    Io(#[from] std::io::Error),

    // --- MANIFEST / YAML ---
    #[error("YAML Parsing Error: {0}")]
    #[diagnostic(
        code(sentinela::infra::yaml),
        help("Check your YAML syntax (indentation, types).")
    )]
    YamlError(#[from] serde_yaml::Error),

    #[error("Manifest not found at '{0}'")]
    #[diagnostic(
        code(sentinela::infra::manifest_missing),
        help("Pass --manifest or create manifest.yaml (see `sentinela init`).")
    )]
    ConfigNotFound(String),

    // --- DATASET LOADING ---
    #[error("CSV Parsing Error: {0}")]
    #[diagnostic(
        code(sentinela::infra::csv),
        help("Check the file's delimiter, quoting and encoding.")
    )]
    CsvError(#[from] csv::Error),

    #[error("Unsupported data format '{0}'")]
    #[diagnostic(
        code(sentinela::infra::format),
        help("Only .csv files are supported.")
    )]
    UnsupportedFormat(String),
}
