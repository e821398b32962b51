// sentinela-core/src/error.rs

use crate::domain::error::DomainError;
use crate::infrastructure::error::InfrastructureError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SentinelaError {
    // --- DOMAIN ERRORS (model rules, manifest semantics) ---
    #[error(transparent)]
    Domain(#[from] DomainError),

    // --- INFRASTRUCTURE ERRORS (IO, parsing) ---
    #[error(transparent)]
    Infrastructure(#[from] InfrastructureError),

    // --- GENERIC / APPLICATION ERRORS ---
    #[error("Internal Error: {0}")]
    InternalError(String),
}

// Manual implementation to avoid duplicate enum variants but keep ergonomics
impl From<std::io::Error> for SentinelaError {
    fn from(err: std::io::Error) -> Self {
        SentinelaError::Infrastructure(InfrastructureError::Io(err))
    }
}
