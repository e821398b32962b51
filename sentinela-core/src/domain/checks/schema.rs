// sentinela-core/src/domain/checks/schema.rs

use std::collections::BTreeSet;

use serde_json::Value as Json;

use crate::domain::checks::Check;
use crate::domain::dataset::Dataset;
use crate::domain::manifest::{ColumnPresence, ManifestConfig};
use crate::domain::report::{CheckResult, Finding, Severity};

/// Validates the dataset's column structure against the expected-column
/// declarations: presence (canonical name or alias), undocumented columns,
/// declared vs inferred types.
pub struct SchemaCheck;

impl Check for SchemaCheck {
    fn name(&self) -> &'static str {
        "schema"
    }

    fn description(&self) -> &'static str {
        "Validates presence and types of expected columns"
    }

    fn execute(&self, dataset: &Dataset, config: &ManifestConfig) -> CheckResult {
        let mut result = CheckResult::new(self.name());

        for column in &config.columns {
            match column.resolve_in(dataset) {
                ColumnPresence::Canonical => {}
                ColumnPresence::Alias(alias) => {
                    result.record(
                        Finding::new(
                            Severity::Info,
                            self.name(),
                            format!("Column '{}' found via alias '{}'", column.name, alias),
                        )
                        .with_column(&column.name)
                        .with_detail("alias_used", alias),
                    );
                }
                ColumnPresence::Missing if column.required => {
                    result.record(
                        Finding::new(
                            Severity::Blocker,
                            self.name(),
                            format!("Required column '{}' not found", column.name),
                        )
                        .with_column(&column.name)
                        .with_expected(column.name.as_str())
                        .with_detail("aliases_checked", Json::from(column.aliases.clone())),
                    );
                }
                ColumnPresence::Missing => {
                    result.record(
                        Finding::new(
                            Severity::Info,
                            self.name(),
                            format!("Optional column '{}' not found", column.name),
                        )
                        .with_column(&column.name),
                    );
                }
            }
        }

        // Columns the manifest never mentions, neither canonically nor as an alias.
        let documented: BTreeSet<&str> = config
            .columns
            .iter()
            .flat_map(|c| std::iter::once(c.name.as_str()).chain(c.aliases.iter().map(String::as_str)))
            .collect();
        let unexpected: Vec<&str> = dataset
            .column_names()
            .iter()
            .map(String::as_str)
            .filter(|name| !documented.contains(name))
            .collect();
        if !unexpected.is_empty() {
            let mut sorted = unexpected.clone();
            sorted.sort_unstable();
            result.record(
                Finding::new(
                    Severity::Info,
                    self.name(),
                    format!("Undocumented columns found: {:?}", sorted),
                )
                .with_detail(
                    "unexpected_columns",
                    Json::from(sorted.iter().map(|s| s.to_string()).collect::<Vec<_>>()),
                ),
            );
        }

        self.check_column_types(dataset, config, &mut result);

        result
    }
}

impl SchemaCheck {
    fn check_column_types(
        &self,
        dataset: &Dataset,
        config: &ManifestConfig,
        result: &mut CheckResult,
    ) {
        for column in &config.columns {
            let Some(actual) = dataset.inferred_type(&column.name) else {
                continue;
            };
            if actual == "empty" || Self::type_accepts(&column.column_type, actual) {
                continue;
            }
            result.record(
                Finding::new(
                    Severity::Minor,
                    self.name(),
                    format!(
                        "Type of '{}' is '{}', expected '{}'",
                        column.name, actual, column.column_type
                    ),
                )
                .with_column(&column.name)
                .with_expected(column.column_type.as_str())
                .with_actual(actual),
            );
        }
    }

    fn type_accepts(declared: &str, inferred: &str) -> bool {
        match declared {
            // Int columns widen to float without complaint.
            "float" => matches!(inferred, "float" | "int"),
            other => other == inferred,
        }
    }
}
