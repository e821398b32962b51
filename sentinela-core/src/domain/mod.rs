pub mod checks;
pub mod dataset;
pub mod error;
pub mod manifest;
pub mod mappings;
pub mod report;

// Convenient re-exports to simplify imports elsewhere
pub use error::DomainError;
