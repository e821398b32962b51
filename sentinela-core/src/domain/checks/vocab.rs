// sentinela-core/src/domain/checks/vocab.rs

use std::collections::BTreeMap;

use serde_json::Value as Json;

use crate::domain::checks::Check;
use crate::domain::dataset::Dataset;
use crate::domain::manifest::ManifestConfig;
use crate::domain::report::{CheckResult, Finding, Severity};

/// Controlled-vocabulary membership: every value of a governed column
/// must be one of the values the manifest declares for it.
pub struct VocabCheck;

impl Check for VocabCheck {
    fn name(&self) -> &'static str {
        "vocab"
    }

    fn description(&self) -> &'static str {
        "Validates columns against their controlled vocabularies"
    }

    fn execute(&self, dataset: &Dataset, config: &ManifestConfig) -> CheckResult {
        let mut result = CheckResult::new(self.name());

        for (column, vocab) in &config.controlled_vocab {
            let Some(cells) = dataset.column(column) else {
                continue;
            };
            if vocab.values.is_empty() {
                continue;
            }

            let (severity, fell_back) = Severity::resolve_or(&vocab.severity, Severity::Major);
            if fell_back {
                result.record(
                    Finding::new(
                        Severity::Info,
                        self.name(),
                        format!(
                            "Unrecognized severity '{}' for '{}', using {}",
                            vocab.severity, column, severity
                        ),
                    )
                    .with_column(column),
                );
            }

            let allowed: Vec<String> = if vocab.case_sensitive {
                vocab.values.clone()
            } else {
                vocab.values.iter().map(|v| v.to_lowercase()).collect()
            };

            let mut invalid_rows = Vec::new();
            // Invalid value -> occurrence count, for the frequency ranking.
            let mut frequency: BTreeMap<String, usize> = BTreeMap::new();
            for (idx, cell) in cells.enumerate() {
                if cell.is_null() {
                    if !vocab.allow_null {
                        invalid_rows.push(idx);
                        *frequency.entry("<null>".into()).or_insert(0) += 1;
                    }
                    continue;
                }
                let value = cell.to_display();
                let probe = if vocab.case_sensitive {
                    value.clone()
                } else {
                    value.to_lowercase()
                };
                if !allowed.contains(&probe) {
                    invalid_rows.push(idx);
                    *frequency.entry(value).or_insert(0) += 1;
                }
            }

            if invalid_rows.is_empty() {
                continue;
            }

            // Most frequent offenders first.
            let mut ranked: Vec<(&String, &usize)> = frequency.iter().collect();
            ranked.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
            let top: Vec<Json> = ranked
                .iter()
                .take(10)
                .map(|(value, count)| {
                    serde_json::json!({ "value": value, "count": count })
                })
                .collect();

            result.record(
                Finding::new(
                    severity,
                    self.name(),
                    format!(
                        "'{}' has {} value(s) outside its vocabulary",
                        column,
                        invalid_rows.len()
                    ),
                )
                .with_column(column)
                .with_rows(invalid_rows)
                .with_expected(format!("{} allowed values", vocab.values.len()))
                .with_detail("allowed_sample", Json::from(sample(&vocab.values)))
                .with_detail("invalid_values", Json::from(top)),
            );
        }

        result
    }
}

fn sample(values: &[String]) -> Vec<String> {
    values.iter().take(10).cloned().collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::dataset::Value;
    use crate::domain::manifest::VocabConfig;

    fn region_config(case_sensitive: bool, allow_null: bool) -> ManifestConfig {
        let mut config = ManifestConfig::default();
        config.controlled_vocab.insert(
            "Region".into(),
            VocabConfig {
                values: vec![
                    "North".into(),
                    "Northeast".into(),
                    "Midwest".into(),
                    "Southeast".into(),
                    "South".into(),
                ],
                case_sensitive,
                allow_null,
                severity: "MAJOR".into(),
            },
        );
        config
    }

    fn region_dataset(values: &[Option<&str>]) -> Dataset {
        Dataset::new(
            vec!["Region".into()],
            values
                .iter()
                .map(|v| {
                    vec![match v {
                        Some(s) => Value::Str(s.to_string()),
                        None => Value::Null,
                    }]
                })
                .collect(),
        )
    }

    #[test]
    fn test_out_of_vocabulary_values_ranked_by_frequency() {
        let ds = region_dataset(&[
            Some("North"),
            Some("Norte"),
            Some("Norte"),
            Some("Sul"),
        ]);
        let result = VocabCheck.execute(&ds, &region_config(true, false));

        assert!(!result.passed());
        let finding = &result.errors()[0];
        assert_eq!(finding.row_indices.as_ref().unwrap(), &vec![1, 2, 3]);
        let ranked = finding.details.as_ref().unwrap()["invalid_values"]
            .as_array()
            .unwrap();
        assert_eq!(ranked[0]["value"], "Norte");
        assert_eq!(ranked[0]["count"], 2);
    }

    #[test]
    fn test_case_insensitive_membership() {
        let ds = region_dataset(&[Some("north"), Some("SOUTHEAST")]);
        let result = VocabCheck.execute(&ds, &region_config(false, false));
        assert!(result.passed());
        assert_eq!(result.total_issues(), 0);
    }

    #[test]
    fn test_null_handling_follows_allow_null() {
        let ds = region_dataset(&[Some("North"), None]);

        let strict = VocabCheck.execute(&ds, &region_config(true, false));
        assert!(!strict.passed());
        assert_eq!(strict.errors()[0].row_indices.as_ref().unwrap(), &vec![1]);

        let lenient = VocabCheck.execute(&ds, &region_config(true, true));
        assert!(lenient.passed());
    }

    #[test]
    fn test_unconfigured_columns_are_ignored() {
        let ds = region_dataset(&[Some("Anything")]);
        let result = VocabCheck.execute(&ds, &ManifestConfig::default());
        assert!(result.passed());
        assert_eq!(result.total_issues(), 0);
    }
}
