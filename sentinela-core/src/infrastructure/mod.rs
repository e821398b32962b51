// sentinela-core/src/infrastructure/mod.rs

pub mod error;
pub mod fs;
pub mod loader;
pub mod manifest;
pub mod report;
