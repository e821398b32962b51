// sentinela-core/src/lib.rs

// 1. Mandatory documentation for production code
#![allow(missing_docs)] // Doc coverage is still a work in progress

// 2. Memory safety
#![deny(unsafe_code)]
// 3. Robustness
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
// 4. Performance
#![warn(clippy::perf)]

// --- HEXAGONAL MODULES ---

// 1. Domain (business core)
// Severity/result model, dataset snapshot, manifest model, checks.
// Depends on nothing else (no infra, no app).
pub mod domain;

// 2. Infrastructure (Adapters)
// Technical I/O (manifest YAML, CSV loading, report rendering).
// Depends on the Domain.
pub mod infrastructure;

// 3. Application (Use Cases)
// Orchestration (Runner, run_validation).
// Depends on the Domain and the Infra.
pub mod application;

// --- GLOBAL ERROR HANDLING ---
pub mod error;

// --- RE-EXPORTS (FACADE) ---
// Lets callers import the main pieces directly:
// use sentinela_core::{SentinelaError, Runner, ValidationReport};
pub use application::runner::{Runner, run_validation};
pub use domain::dataset::{Dataset, Value};
pub use domain::manifest::ManifestConfig;
pub use domain::report::{CheckResult, Finding, Severity, ValidationReport};
pub use error::SentinelaError;
