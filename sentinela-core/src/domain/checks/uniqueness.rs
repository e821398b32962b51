// sentinela-core/src/domain/checks/uniqueness.rs

use std::collections::BTreeMap;

use serde_json::Value as Json;

use crate::domain::checks::Check;
use crate::domain::dataset::Dataset;
use crate::domain::manifest::ManifestConfig;
use crate::domain::report::{CheckResult, Finding, Severity};

/// Duplicate share above which a primary-key violation is a blocker.
const DUP_SHARE_BLOCKER: f64 = 0.05;
/// Duplicate share above which it is major; below, minor.
const DUP_SHARE_MAJOR: f64 = 0.01;

/// Primary-key and composite-key uniqueness. Values are compared after
/// whitespace normalization so "2269311 " and "2269311" collide.
pub struct UniquenessCheck;

impl Check for UniquenessCheck {
    fn name(&self) -> &'static str {
        "uniqueness"
    }

    fn description(&self) -> &'static str {
        "Validates primary-key and composite-key uniqueness"
    }

    fn execute(&self, dataset: &Dataset, config: &ManifestConfig) -> CheckResult {
        let mut result = CheckResult::new(self.name());

        for column in &config.uniqueness.primary_key.columns {
            self.check_key_column(dataset, column, &mut result);
        }
        for columns in &config.uniqueness.composite {
            self.check_composite(dataset, columns, &mut result);
        }

        result
    }
}

impl UniquenessCheck {
    fn check_key_column(&self, dataset: &Dataset, column: &str, result: &mut CheckResult) {
        let Some(cells) = dataset.column(column) else {
            return;
        };

        let mut groups: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        let mut null_count = 0usize;
        for (idx, cell) in cells.enumerate() {
            if cell.is_null() {
                null_count += 1;
                continue;
            }
            let key: String = cell.to_display().split_whitespace().collect::<Vec<_>>().join(" ");
            groups.entry(key).or_default().push(idx);
        }

        if groups.is_empty() {
            result.record(
                Finding::new(
                    Severity::Info,
                    self.name(),
                    format!("Key column '{}' has no non-null values", column),
                )
                .with_column(column),
            );
            return;
        }
        if null_count > 0 {
            result.record(
                Finding::new(
                    Severity::Major,
                    self.name(),
                    format!("Key column '{}' has {} null value(s)", column, null_count),
                )
                .with_column(column)
                .with_detail("null_count", null_count),
            );
        }

        groups.retain(|_, rows| rows.len() > 1);
        if groups.is_empty() {
            result.record(
                Finding::new(
                    Severity::Info,
                    self.name(),
                    format!("Key column '{}' is unique", column),
                )
                .with_column(column),
            );
            return;
        }

        let duplicated_rows: usize = groups.values().map(Vec::len).sum();
        let share = duplicated_rows as f64 / dataset.row_count() as f64;
        let severity = if share > DUP_SHARE_BLOCKER {
            Severity::Blocker
        } else if share > DUP_SHARE_MAJOR {
            Severity::Major
        } else {
            Severity::Minor
        };

        // Largest groups first.
        let mut ranked: Vec<(&String, &Vec<usize>)> = groups.iter().collect();
        ranked.sort_by(|a, b| b.1.len().cmp(&a.1.len()).then_with(|| a.0.cmp(b.0)));
        let top: Vec<Json> = ranked
            .iter()
            .take(10)
            .map(|(value, rows)| {
                serde_json::json!({
                    "value": value,
                    "count": rows.len(),
                    "rows": rows,
                })
            })
            .collect();

        let rows: Vec<usize> = groups.values().flatten().copied().collect();
        result.record(
            Finding::new(
                severity,
                self.name(),
                format!(
                    "Key column '{}' has {} duplicated value(s) over {} row(s) ({:.1}%)",
                    column,
                    groups.len(),
                    duplicated_rows,
                    share * 100.0
                ),
            )
            .with_column(column)
            .with_rows(rows)
            .with_detail("duplicate_share", share)
            .with_detail("top_duplicates", Json::from(top)),
        );
    }

    fn check_composite(&self, dataset: &Dataset, columns: &[String], result: &mut CheckResult) {
        if columns.iter().any(|c| !dataset.has_column(c)) {
            return;
        }

        let mut groups: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        for idx in 0..dataset.row_count() {
            let key: Vec<String> = columns
                .iter()
                .filter_map(|c| dataset.get(idx, c))
                .map(|v| v.to_display().trim().to_string())
                .collect();
            groups.entry(key.join("\u{1f}")).or_default().push(idx);
        }
        groups.retain(|_, rows| rows.len() > 1);
        if groups.is_empty() {
            return;
        }

        let rows: Vec<usize> = groups.values().flatten().copied().collect();
        result.record(
            Finding::new(
                Severity::Major,
                self.name(),
                format!(
                    "Composite key {:?} has {} duplicated combination(s)",
                    columns,
                    groups.len()
                ),
            )
            .with_rows(rows)
            .with_detail("columns", Json::from(columns.to_vec())),
        );
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::dataset::Value;

    fn key_dataset(values: &[&str]) -> Dataset {
        Dataset::new(
            vec!["CNES".into()],
            values
                .iter()
                .map(|v| {
                    vec![if v.is_empty() {
                        Value::Null
                    } else {
                        Value::Str(v.to_string())
                    }]
                })
                .collect(),
        )
    }

    #[test]
    fn test_unique_key_confirmed_with_info() {
        let ds = key_dataset(&["1000001", "1000002", "1000003"]);
        let result = UniquenessCheck.execute(&ds, &ManifestConfig::default());
        assert!(result.passed());
        assert!(result.info().iter().any(|f| f.message.contains("is unique")));
    }

    #[test]
    fn test_whitespace_variants_collide() {
        let ds = key_dataset(&["2269311", " 2269311 ", "1000002"]);
        let result = UniquenessCheck.execute(&ds, &ManifestConfig::default());
        // 2 of 3 rows duplicated: above the blocker share.
        assert!(!result.passed());
        let finding = &result.errors()[0];
        assert_eq!(finding.severity, Severity::Blocker);
        assert_eq!(finding.row_indices.as_ref().unwrap(), &vec![0, 1]);
    }

    #[test]
    fn test_low_duplicate_share_stays_minor() {
        // 2 duplicated rows of 250: 0.8%, below the major threshold.
        let mut values: Vec<String> = (0..249).map(|i| format!("{:07}", 1000000 + i)).collect();
        values.push("1000000".into());
        let refs: Vec<&str> = values.iter().map(String::as_str).collect();
        let ds = key_dataset(&refs);

        let result = UniquenessCheck.execute(&ds, &ManifestConfig::default());
        assert!(result.passed());
        let finding = result
            .warnings()
            .iter()
            .find(|f| f.message.contains("duplicated"))
            .unwrap();
        assert_eq!(finding.severity, Severity::Minor);
    }

    #[test]
    fn test_null_keys_reported_separately() {
        let ds = key_dataset(&["1000001", "", "1000002"]);
        let result = UniquenessCheck.execute(&ds, &ManifestConfig::default());
        assert!(!result.passed());
        assert!(result.errors()[0].message.contains("null"));
    }

    #[test]
    fn test_top_duplicates_ranked_by_group_size() {
        let ds = key_dataset(&["A", "A", "A", "B", "B", "C"]);
        let result = UniquenessCheck.execute(&ds, &ManifestConfig::default());
        let finding = &result.errors()[0];
        let top = finding.details.as_ref().unwrap()["top_duplicates"]
            .as_array()
            .unwrap();
        assert_eq!(top[0]["value"], "A");
        assert_eq!(top[0]["count"], 3);
        assert_eq!(top[1]["value"], "B");
    }

    #[test]
    fn test_composite_key_duplicates_flagged() {
        let mut config = ManifestConfig::default();
        config.uniqueness.primary_key.columns.clear();
        config
            .uniqueness
            .composite
            .push(vec!["Municipio".into(), "Bairro".into()]);

        let ds = Dataset::new(
            vec!["Municipio".into(), "Bairro".into()],
            vec![
                vec![Value::Str("Recife".into()), Value::Str("Boa Vista".into())],
                vec![Value::Str("Recife".into()), Value::Str("Boa Vista".into())],
                vec![Value::Str("Recife".into()), Value::Str("Derby".into())],
            ],
        );
        let result = UniquenessCheck.execute(&ds, &config);
        assert!(!result.passed());
        assert_eq!(result.errors()[0].row_indices.as_ref().unwrap(), &vec![0, 1]);
    }
}
