// sentinela-core/src/domain/checks/parsing.rs

use serde_json::Value as Json;

use crate::domain::checks::Check;
use crate::domain::dataset::{Dataset, Value};
use crate::domain::manifest::ManifestConfig;
use crate::domain::report::{CheckResult, Finding, Severity};

const SPECIAL_CHARS: [(char, &str); 4] = [
    ('\u{a0}', "NBSP"),
    ('\u{200b}', "Zero-width space"),
    ('\u{2013}', "En-dash"),
    ('\u{2014}', "Em-dash"),
];

/// Data-hygiene validation: stray whitespace, problematic Unicode
/// characters, and non-numeric values in the coordinate columns.
pub struct ParsingCheck;

impl Check for ParsingCheck {
    fn name(&self) -> &'static str {
        "parsing"
    }

    fn description(&self) -> &'static str {
        "Validates data normalization (whitespace, unicode, decimals)"
    }

    fn execute(&self, dataset: &Dataset, config: &ManifestConfig) -> CheckResult {
        let mut result = CheckResult::new(self.name());

        let whitespace_columns = self.columns_with_stray_whitespace(dataset);
        if !whitespace_columns.is_empty() {
            result.record(
                Finding::new(
                    Severity::Minor,
                    self.name(),
                    format!(
                        "Values with extra whitespace in {} column(s)",
                        whitespace_columns.len()
                    ),
                )
                .with_detail("columns", Json::from(whitespace_columns)),
            );
        }

        let unicode_issues = self.columns_with_special_chars(dataset);
        if !unicode_issues.is_empty() {
            result.record(
                Finding::new(
                    Severity::Info,
                    self.name(),
                    format!("Special Unicode characters in {} column(s)", unicode_issues.len()),
                )
                .with_detail("columns", Json::from(unicode_issues)),
            );
        }

        for coord in [&config.geospatial.lat_field, &config.geospatial.lon_field] {
            let bad_rows = self.non_numeric_rows(dataset, coord);
            if !bad_rows.is_empty() {
                result.record(
                    Finding::new(
                        Severity::Major,
                        self.name(),
                        format!("Non-numeric values in {} ({} rows)", coord, bad_rows.len()),
                    )
                    .with_column(coord)
                    .with_rows(bad_rows),
                );
            }
        }

        result
    }
}

impl ParsingCheck {
    fn columns_with_stray_whitespace(&self, dataset: &Dataset) -> Vec<String> {
        dataset
            .column_names()
            .iter()
            .filter(|name| {
                dataset
                    .column(name)
                    .is_some_and(|mut cells| {
                        cells.any(|v| v.as_str().is_some_and(|s| s != s.trim()))
                    })
            })
            .cloned()
            .collect()
    }

    fn columns_with_special_chars(&self, dataset: &Dataset) -> Vec<Json> {
        let mut issues = Vec::new();
        for name in dataset.column_names() {
            let Some(cells) = dataset.column(name) else {
                continue;
            };
            let mut found: Vec<&str> = Vec::new();
            for cell in cells {
                let Some(s) = cell.as_str() else { continue };
                for (ch, label) in SPECIAL_CHARS {
                    if !found.contains(&label) && s.contains(ch) {
                        found.push(label);
                    }
                }
            }
            if !found.is_empty() {
                issues.push(serde_json::json!({
                    "column": name,
                    "special_chars": found,
                }));
            }
        }
        issues
    }

    /// Rows whose cell is neither null nor readable as a number
    /// (decimal comma accepted).
    fn non_numeric_rows(&self, dataset: &Dataset, column: &str) -> Vec<usize> {
        let Some(cells) = dataset.column(column) else {
            return Vec::new();
        };
        cells
            .enumerate()
            .filter(|(_, cell)| !matches!(cell, Value::Null) && cell.as_f64().is_none())
            .map(|(idx, _)| idx)
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_stray_whitespace_is_a_warning() {
        let ds = Dataset::new(
            vec!["Municipio".into()],
            vec![
                vec![Value::Str("Recife ".into())],
                vec![Value::Str("Natal".into())],
            ],
        );
        let result = ParsingCheck.execute(&ds, &ManifestConfig::default());
        assert!(result.passed());
        assert_eq!(result.warnings().len(), 1);
        assert_eq!(
            result.warnings()[0].details.as_ref().unwrap()["columns"],
            serde_json::json!(["Municipio"])
        );
    }

    #[test]
    fn test_special_unicode_is_informational() {
        let ds = Dataset::new(
            vec!["Municipio".into()],
            vec![vec![Value::Str("S\u{a0}Paulo".into())]],
        );
        let result = ParsingCheck.execute(&ds, &ManifestConfig::default());
        assert!(result.passed());
        let note = &result.info()[0];
        assert!(note.message.contains("Unicode"));
    }

    #[test]
    fn test_non_numeric_coordinates_fail() {
        let ds = Dataset::new(
            vec!["Lat".into(), "Lon".into()],
            vec![
                vec![Value::Str("-23,55".into()), Value::Float(-46.63)],
                vec![Value::Str("unknown".into()), Value::Null],
            ],
        );
        let result = ParsingCheck.execute(&ds, &ManifestConfig::default());
        assert!(!result.passed());
        assert_eq!(result.errors().len(), 1);
        assert_eq!(result.errors()[0].column.as_deref(), Some("Lat"));
        assert_eq!(result.errors()[0].row_indices.as_ref().unwrap(), &vec![1]);
    }

    #[test]
    fn test_clean_dataset_passes_quietly() {
        let ds = Dataset::new(
            vec!["Lat".into(), "Lon".into()],
            vec![vec![Value::Float(-23.55), Value::Float(-46.63)]],
        );
        let result = ParsingCheck.execute(&ds, &ManifestConfig::default());
        assert!(result.passed());
        assert_eq!(result.total_issues(), 0);
    }
}
