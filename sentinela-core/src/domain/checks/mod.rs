// sentinela-core/src/domain/checks/mod.rs

pub mod coherence;
pub mod constraints;
pub mod geospatial;
pub mod parsing;
pub mod perf;
pub mod reproducibility;
pub mod schema;
pub mod uniqueness;
pub mod vocab;

// Re-exports
pub use coherence::CoherenceCheck;
pub use constraints::ConstraintsCheck;
pub use geospatial::GeospatialCheck;
pub use parsing::ParsingCheck;
pub use perf::PerfCheck;
pub use reproducibility::ReproducibilityCheck;
pub use schema::SchemaCheck;
pub use uniqueness::UniquenessCheck;
pub use vocab::VocabCheck;

use std::time::Instant;

use crate::domain::dataset::Dataset;
use crate::domain::manifest::ManifestConfig;
use crate::domain::report::CheckResult;

/// One independently pluggable validation rule. Implementations read the
/// dataset and any configuration slice relevant to their domain, and always
/// return a result: expected rule violations become findings, never errors
/// or panics. Only genuine programming faults are allowed to unwind (the
/// runner isolates those).
pub trait Check: Send + Sync {
    /// Stable identifier, used as the category key throughout the report
    /// and for selective skipping.
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    fn execute(&self, dataset: &Dataset, config: &ManifestConfig) -> CheckResult;

    /// `execute` plus a wall-clock duration stamp. Findings and pass/fail
    /// are untouched.
    fn timed_execute(&self, dataset: &Dataset, config: &ManifestConfig) -> CheckResult {
        let start = Instant::now();
        let mut result = self.execute(dataset, config);
        result.set_duration(start.elapsed());
        result
    }
}

/// The full suite, in registration order. Report order mirrors this order.
pub fn default_checks() -> Vec<Box<dyn Check>> {
    vec![
        Box::new(SchemaCheck),
        Box::new(ParsingCheck),
        Box::new(ConstraintsCheck),
        Box::new(VocabCheck),
        Box::new(CoherenceCheck),
        Box::new(GeospatialCheck),
        Box::new(UniquenessCheck),
        Box::new(ReproducibilityCheck),
        Box::new(PerfCheck),
    ]
}
