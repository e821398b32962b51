// sentinela-core/src/application/mod.rs

pub mod runner;

pub use runner::{Runner, run_validation};
