// sentinela-core/src/domain/error.rs

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum DomainError {
    #[error("Manifest Error: {0}")]
    #[diagnostic(
        code(sentinela::domain::manifest),
        help("Check the manifest sections against the documented schema.")
    )]
    ManifestError(String),

    #[error("Invalid pattern for column '{column}': {source}")]
    #[diagnostic(
        code(sentinela::domain::pattern),
        help("Constraint patterns must be valid regular expressions.")
    )]
    InvalidPattern {
        column: String,
        #[source]
        source: regex::Error,
    },
}
