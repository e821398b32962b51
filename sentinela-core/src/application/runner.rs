// sentinela-core/src/application/runner.rs
//
// Orchestrates a validation run: executes every registered check against
// the dataset, isolating each one so a single panicking check degrades to
// a failed result instead of taking the whole run down.

use std::collections::HashSet;
use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;

use chrono::Utc;
use tracing::{debug, error, info, warn};

use crate::domain::checks::{Check, default_checks};
use crate::domain::dataset::Dataset;
use crate::domain::manifest::ManifestConfig;
use crate::domain::report::{CheckResult, Finding, Severity, ValidationReport};

pub struct Runner {
    config: ManifestConfig,
    checks: Vec<Box<dyn Check>>,
    skip: HashSet<String>,
}

impl Runner {
    /// Runner over the full default suite.
    pub fn new(config: ManifestConfig) -> Self {
        Runner {
            config,
            checks: default_checks(),
            skip: HashSet::new(),
        }
    }

    /// Runner over an explicit check list, mostly for tests and embedders.
    pub fn with_checks(config: ManifestConfig, checks: Vec<Box<dyn Check>>) -> Self {
        Runner {
            config,
            checks,
            skip: HashSet::new(),
        }
    }

    /// Checks named here are omitted from the run entirely: no result,
    /// no placeholder. The report simply has fewer entries.
    pub fn skip_checks<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.skip.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn config(&self) -> &ManifestConfig {
        &self.config
    }

    /// Runs every non-skipped check in registration order. Infallible by
    /// construction: check failures are findings, check panics become
    /// synthetic failed results.
    pub fn run(&self, dataset: &Dataset) -> ValidationReport {
        let start = Instant::now();
        info!(
            rows = dataset.row_count(),
            columns = dataset.column_count(),
            checks = self.checks.len(),
            "validation run started"
        );

        let mut results = Vec::with_capacity(self.checks.len());
        for check in &self.checks {
            if self.skip.contains(check.name()) {
                debug!(check = check.name(), "check skipped");
                continue;
            }
            let result = self.run_isolated(check.as_ref(), dataset);
            if result.passed() {
                debug!(
                    check = check.name(),
                    issues = result.total_issues(),
                    "check passed"
                );
            } else {
                warn!(
                    check = check.name(),
                    errors = result.errors().len(),
                    "check failed"
                );
            }
            results.push(result);
        }

        let report = ValidationReport {
            timestamp: Utc::now(),
            manifest_path: String::new(),
            data_file: self.config.input_file.clone(),
            row_count: dataset.row_count(),
            column_count: dataset.column_count(),
            results,
            duration: start.elapsed(),
        };
        info!(
            passed = report.passed(),
            checks = report.total_checks(),
            failed = report.failed_checks(),
            duration_ms = report.duration.as_millis() as u64,
            "validation run finished"
        );
        report
    }

    fn run_isolated(&self, check: &dyn Check, dataset: &Dataset) -> CheckResult {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            check.timed_execute(dataset, &self.config)
        }));
        match outcome {
            Ok(result) => result,
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                error!(check = check.name(), panic = %message, "check panicked");
                let mut result = CheckResult::new(check.name());
                result.record(
                    Finding::new(
                        Severity::Blocker,
                        check.name(),
                        format!("Check '{}' aborted with an internal error", check.name()),
                    )
                    .with_detail("panic", message),
                );
                result
            }
        }
    }
}

/// One-call entry point: default suite, no skips.
pub fn run_validation(dataset: &Dataset, config: ManifestConfig) -> ValidationReport {
    Runner::new(config).run(dataset)
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
