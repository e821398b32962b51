// sentinela-core/src/domain/checks/coherence.rs

use serde_json::Value as Json;

use crate::domain::checks::Check;
use crate::domain::dataset::Dataset;
use crate::domain::manifest::{CrossFieldConfig, ManifestConfig};
use crate::domain::report::{CheckResult, Finding, Severity};

/// Cross-field coherence rules from the manifest: mapping-table agreement
/// (e.g. FU abbreviation vs state name) and item-count agreement between
/// paired comma-separated columns.
pub struct CoherenceCheck;

impl Check for CoherenceCheck {
    fn name(&self) -> &'static str {
        "coherence"
    }

    fn description(&self) -> &'static str {
        "Validates cross-field consistency rules"
    }

    fn execute(&self, dataset: &Dataset, config: &ManifestConfig) -> CheckResult {
        let mut result = CheckResult::new(self.name());

        for (rule_name, rule) in &config.cross_field {
            if !dataset.has_column(&rule.field_a) || !dataset.has_column(&rule.field_b) {
                continue;
            }

            let (severity, fell_back) = Severity::resolve_or(&rule.severity, Severity::Major);
            if fell_back {
                result.record(Finding::new(
                    Severity::Info,
                    self.name(),
                    format!(
                        "Unrecognized severity '{}' for rule '{}', using {}",
                        rule.severity, rule_name, severity
                    ),
                ));
            }

            match rule.rule.as_deref() {
                Some("mapping") => {
                    self.check_mapping(dataset, config, rule_name, rule, severity, &mut result);
                }
                Some("count_match") => {
                    self.check_count_match(dataset, rule_name, rule, severity, &mut result);
                }
                other => {
                    result.record(Finding::new(
                        Severity::Info,
                        self.name(),
                        format!(
                            "Rule '{}' has unknown kind {:?}, skipped",
                            rule_name, other
                        ),
                    ));
                }
            }
        }

        result
    }
}

impl CoherenceCheck {
    fn check_mapping(
        &self,
        dataset: &Dataset,
        config: &ManifestConfig,
        rule_name: &str,
        rule: &CrossFieldConfig,
        severity: Severity,
        result: &mut CheckResult,
    ) {
        let Some(table_name) = rule.mapping.as_deref() else {
            result.record(Finding::new(
                Severity::Major,
                self.name(),
                format!("Rule '{}' uses kind 'mapping' but names no table", rule_name),
            ));
            return;
        };
        let Some(table) = config.mapping(table_name) else {
            result.record(Finding::new(
                Severity::Major,
                self.name(),
                format!("Mapping table '{}' not found for rule '{}'", table_name, rule_name),
            ));
            return;
        };

        let mut mismatched = Vec::new();
        let mut samples: Vec<Json> = Vec::new();
        for idx in 0..dataset.row_count() {
            let Some(a) = dataset.get(idx, &rule.field_a) else {
                continue;
            };
            let Some(b) = dataset.get(idx, &rule.field_b) else {
                continue;
            };
            if a.is_null() || b.is_null() {
                continue;
            }
            let key = a.to_display();
            let value = b.to_display();
            // Keys the table never mentions are out of scope here; the
            // vocab check owns membership of field_a itself.
            let Some(allowed) = table.get(key.trim()) else {
                continue;
            };
            if !allowed.iter().any(|v| v == value.trim()) {
                if samples.len() < 5 {
                    let mut sample = serde_json::Map::new();
                    sample.insert(rule.field_a.clone(), Json::from(key.clone()));
                    sample.insert(rule.field_b.clone(), Json::from(value.clone()));
                    samples.push(Json::Object(sample));
                }
                mismatched.push(idx);
            }
        }

        if !mismatched.is_empty() {
            result.record(
                Finding::new(
                    severity,
                    self.name(),
                    format!(
                        "Rule '{}': {} row(s) where {} does not match {}",
                        rule_name,
                        mismatched.len(),
                        rule.field_b,
                        rule.field_a
                    ),
                )
                .with_rows(mismatched)
                .with_detail("rule", rule_name)
                .with_detail("mapping", table_name)
                .with_detail("sample_mismatches", Json::from(samples)),
            );
        }
    }

    fn check_count_match(
        &self,
        dataset: &Dataset,
        rule_name: &str,
        rule: &CrossFieldConfig,
        severity: Severity,
        result: &mut CheckResult,
    ) {
        let mut mismatched = Vec::new();
        for idx in 0..dataset.row_count() {
            let Some(a) = dataset.get(idx, &rule.field_a) else {
                continue;
            };
            let Some(b) = dataset.get(idx, &rule.field_b) else {
                continue;
            };
            if a.is_null() || b.is_null() {
                continue;
            }
            let count_a = item_count(&a.to_display());
            let count_b = item_count(&b.to_display());
            if (count_a - count_b).abs() > rule.tolerance {
                mismatched.push(idx);
            }
        }

        if !mismatched.is_empty() {
            result.record(
                Finding::new(
                    severity,
                    self.name(),
                    format!(
                        "Rule '{}': item counts of {} and {} disagree in {} row(s)",
                        rule_name,
                        rule.field_a,
                        rule.field_b,
                        mismatched.len()
                    ),
                )
                .with_rows(mismatched)
                .with_detail("rule", rule_name)
                .with_detail("tolerance", rule.tolerance),
            );
        }
    }
}

/// Number of non-empty comma-separated items in a cell.
fn item_count(value: &str) -> i64 {
    value
        .split(',')
        .filter(|item| !item.trim().is_empty())
        .count() as i64
}
