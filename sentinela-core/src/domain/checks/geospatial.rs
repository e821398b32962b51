// sentinela-core/src/domain/checks/geospatial.rs

use std::collections::BTreeMap;

use serde_json::Value as Json;

use crate::domain::checks::Check;
use crate::domain::dataset::Dataset;
use crate::domain::manifest::ManifestConfig;
use crate::domain::report::{CheckResult, Finding, Severity};

/// Share of missing coordinates above which the finding escalates.
const NULL_SHARE_ESCALATION: f64 = 0.05;
/// Out-of-bounds row count above which the finding escalates.
const BOUNDS_ESCALATION: usize = 10;
/// Tukey fence multiplier for the statistical outlier scan.
const IQR_FENCE: f64 = 3.0;

/// Coordinate plausibility: bounding box, missing and suspicious values,
/// duplicate locations, statistical outliers.
pub struct GeospatialCheck;

impl Check for GeospatialCheck {
    fn name(&self) -> &'static str {
        "geospatial"
    }

    fn description(&self) -> &'static str {
        "Validates coordinate plausibility and distribution"
    }

    fn execute(&self, dataset: &Dataset, config: &ManifestConfig) -> CheckResult {
        let mut result = CheckResult::new(self.name());

        let geo = &config.geospatial;
        if !dataset.has_column(&geo.lat_field) || !dataset.has_column(&geo.lon_field) {
            result.record(Finding::new(
                Severity::Info,
                self.name(),
                format!(
                    "Coordinate columns '{}'/'{}' not found, geospatial checks skipped",
                    geo.lat_field, geo.lon_field
                ),
            ));
            return result;
        }

        // One parse pass; every sub-check reads from this.
        let coords: Vec<(Option<f64>, Option<f64>)> = (0..dataset.row_count())
            .map(|idx| {
                let lat = dataset.get(idx, &geo.lat_field).and_then(|v| v.as_f64());
                let lon = dataset.get(idx, &geo.lon_field).and_then(|v| v.as_f64());
                (lat, lon)
            })
            .collect();

        self.check_missing(&coords, &mut result);
        self.check_bounds(config, &coords, &mut result);
        self.check_suspicious(&coords, &mut result);
        if geo.duplicate_coords.check {
            self.check_duplicates(dataset, config, &coords, &mut result);
        }
        self.check_outliers(&coords, &mut result);

        result
    }
}

impl GeospatialCheck {
    fn check_missing(&self, coords: &[(Option<f64>, Option<f64>)], result: &mut CheckResult) {
        let missing: Vec<usize> = coords
            .iter()
            .enumerate()
            .filter(|(_, (lat, lon))| lat.is_none() || lon.is_none())
            .map(|(idx, _)| idx)
            .collect();
        if missing.is_empty() {
            return;
        }
        let share = missing.len() as f64 / coords.len() as f64;
        let severity = if share > NULL_SHARE_ESCALATION {
            Severity::Major
        } else {
            Severity::Minor
        };
        result.record(
            Finding::new(
                severity,
                self.name(),
                format!(
                    "{} row(s) without usable coordinates ({:.1}%)",
                    missing.len(),
                    share * 100.0
                ),
            )
            .with_rows(missing)
            .with_detail("null_share", share),
        );
    }

    fn check_bounds(
        &self,
        config: &ManifestConfig,
        coords: &[(Option<f64>, Option<f64>)],
        result: &mut CheckResult,
    ) {
        let bounds = &config.geospatial.plausible_bounds;
        let outside: Vec<usize> = coords
            .iter()
            .enumerate()
            .filter_map(|(idx, (lat, lon))| match (lat, lon) {
                (Some(lat), Some(lon)) => {
                    let ok = (bounds.lat_min..=bounds.lat_max).contains(lat)
                        && (bounds.lon_min..=bounds.lon_max).contains(lon);
                    (!ok).then_some(idx)
                }
                _ => None,
            })
            .collect();
        if outside.is_empty() {
            return;
        }
        let severity = if outside.len() > BOUNDS_ESCALATION {
            Severity::Major
        } else {
            Severity::Minor
        };
        result.record(
            Finding::new(
                severity,
                self.name(),
                format!("{} coordinate(s) outside the plausible bounds", outside.len()),
            )
            .with_rows(outside)
            .with_expected(format!(
                "lat in [{}, {}], lon in [{}, {}]",
                bounds.lat_min, bounds.lat_max, bounds.lon_min, bounds.lon_max
            )),
        );
    }

    /// (0, 0) placeholders and coordinates with no decimal part are almost
    /// always geocoding failures rather than real facility locations.
    fn check_suspicious(&self, coords: &[(Option<f64>, Option<f64>)], result: &mut CheckResult) {
        let suspicious: Vec<usize> = coords
            .iter()
            .enumerate()
            .filter_map(|(idx, (lat, lon))| match (lat, lon) {
                (Some(lat), Some(lon)) => {
                    let zero = *lat == 0.0 && *lon == 0.0;
                    let integral = lat.fract() == 0.0 && lon.fract() == 0.0;
                    (zero || integral).then_some(idx)
                }
                _ => None,
            })
            .collect();
        if suspicious.is_empty() {
            return;
        }
        result.record(
            Finding::new(
                Severity::Minor,
                self.name(),
                format!(
                    "{} suspicious coordinate(s) (zero or integer-valued)",
                    suspicious.len()
                ),
            )
            .with_rows(suspicious),
        );
    }

    fn check_duplicates(
        &self,
        dataset: &Dataset,
        config: &ManifestConfig,
        coords: &[(Option<f64>, Option<f64>)],
        result: &mut CheckResult,
    ) {
        let id_column = &config.geospatial.duplicate_coords.id_column;
        let mut groups: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        for (idx, (lat, lon)) in coords.iter().enumerate() {
            if let (Some(lat), Some(lon)) = (lat, lon) {
                groups
                    .entry(format!("{lat:.6},{lon:.6}"))
                    .or_default()
                    .push(idx);
            }
        }
        groups.retain(|_, rows| rows.len() > 1);
        if groups.is_empty() {
            return;
        }

        let sample: Vec<Json> = groups
            .iter()
            .take(10)
            .map(|(location, rows)| {
                let ids: Vec<String> = rows
                    .iter()
                    .filter_map(|&idx| dataset.get(idx, id_column))
                    .map(|v| v.to_display())
                    .collect();
                serde_json::json!({
                    "location": location,
                    "rows": rows,
                    "ids": ids,
                })
            })
            .collect();

        result.record(
            Finding::new(
                Severity::Info,
                self.name(),
                format!("{} location(s) shared by multiple records", groups.len()),
            )
            .with_detail("id_column", id_column.as_str())
            .with_detail("sample_groups", Json::from(sample)),
        );
    }

    fn check_outliers(&self, coords: &[(Option<f64>, Option<f64>)], result: &mut CheckResult) {
        let lats: Vec<f64> = coords.iter().filter_map(|(lat, _)| *lat).collect();
        let lons: Vec<f64> = coords.iter().filter_map(|(_, lon)| *lon).collect();
        let (Some(lat_fence), Some(lon_fence)) = (tukey_fences(&lats), tukey_fences(&lons)) else {
            return;
        };

        let outliers: Vec<usize> = coords
            .iter()
            .enumerate()
            .filter_map(|(idx, (lat, lon))| match (lat, lon) {
                (Some(lat), Some(lon)) => {
                    let out = *lat < lat_fence.0
                        || *lat > lat_fence.1
                        || *lon < lon_fence.0
                        || *lon > lon_fence.1;
                    out.then_some(idx)
                }
                _ => None,
            })
            .collect();
        if outliers.is_empty() {
            return;
        }
        result.record(
            Finding::new(
                Severity::Minor,
                self.name(),
                format!(
                    "{} coordinate(s) far from the bulk of the data (IQR fence)",
                    outliers.len()
                ),
            )
            .with_rows(outliers)
            .with_detail("lat_fence", Json::from(vec![lat_fence.0, lat_fence.1]))
            .with_detail("lon_fence", Json::from(vec![lon_fence.0, lon_fence.1])),
        );
    }
}

/// (lower, upper) Tukey fences at `IQR_FENCE` times the interquartile
/// range. None when there are too few values to be meaningful.
fn tukey_fences(values: &[f64]) -> Option<(f64, f64)> {
    if values.len() < 4 {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let q1 = quantile(&sorted, 0.25);
    let q3 = quantile(&sorted, 0.75);
    let iqr = q3 - q1;
    Some((q1 - IQR_FENCE * iqr, q3 + IQR_FENCE * iqr))
}

/// Linear-interpolation quantile over a sorted slice.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    if lower == upper {
        sorted[lower]
    } else {
        let weight = pos - lower as f64;
        sorted[lower] * (1.0 - weight) + sorted[upper] * weight
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::dataset::Value;

    fn coord_dataset(rows: &[(Option<f64>, Option<f64>)]) -> Dataset {
        Dataset::new(
            vec!["CNES".into(), "Lat".into(), "Lon".into()],
            rows.iter()
                .enumerate()
                .map(|(i, (lat, lon))| {
                    vec![
                        Value::Str(format!("226931{i}")),
                        lat.map_or(Value::Null, Value::Float),
                        lon.map_or(Value::Null, Value::Float),
                    ]
                })
                .collect(),
        )
    }

    #[test]
    fn test_out_of_bounds_coordinates_flagged() {
        let ds = coord_dataset(&[
            (Some(-23.55), Some(-46.63)), // São Paulo
            (Some(48.85), Some(2.35)),    // Paris
        ]);
        let result = GeospatialCheck.execute(&ds, &ManifestConfig::default());
        assert!(result.passed()); // one row: MINOR, lands in warnings
        let finding = result
            .warnings()
            .iter()
            .find(|f| f.message.contains("bounds"))
            .unwrap();
        assert_eq!(finding.row_indices.as_ref().unwrap(), &vec![1]);
    }

    #[test]
    fn test_many_out_of_bounds_escalates_to_major() {
        let rows: Vec<(Option<f64>, Option<f64>)> =
            (0..12).map(|i| (Some(40.0 + i as f64), Some(2.0))).collect();
        let ds = coord_dataset(&rows);
        let result = GeospatialCheck.execute(&ds, &ManifestConfig::default());
        assert!(!result.passed());
        assert!(result.errors().iter().any(|f| f.message.contains("bounds")));
    }

    #[test]
    fn test_missing_coordinate_share_drives_severity() {
        // 1 of 30 missing: 3.3%, stays MINOR.
        let mut rows: Vec<(Option<f64>, Option<f64>)> =
            (0..29).map(|i| (Some(-23.0 - i as f64 * 0.01), Some(-46.0))).collect();
        rows.push((None, Some(-46.0)));
        let result = GeospatialCheck.execute(&coord_dataset(&rows), &ManifestConfig::default());
        let finding = result
            .warnings()
            .iter()
            .find(|f| f.message.contains("usable coordinates"))
            .unwrap();
        assert_eq!(finding.severity, Severity::Minor);

        // 3 of 10 missing: escalates.
        let mut rows: Vec<(Option<f64>, Option<f64>)> =
            (0..7).map(|i| (Some(-23.0 - i as f64 * 0.01), Some(-46.0))).collect();
        rows.extend([(None, None), (None, None), (None, None)]);
        let result = GeospatialCheck.execute(&coord_dataset(&rows), &ManifestConfig::default());
        assert!(
            result
                .errors()
                .iter()
                .any(|f| f.message.contains("usable coordinates"))
        );
    }

    #[test]
    fn test_zero_and_integer_coordinates_are_suspicious() {
        let ds = coord_dataset(&[
            (Some(0.0), Some(0.0)),
            (Some(-23.0), Some(-46.0)),
            (Some(-23.55), Some(-46.63)),
        ]);
        let result = GeospatialCheck.execute(&ds, &ManifestConfig::default());
        let finding = result
            .warnings()
            .iter()
            .find(|f| f.message.contains("suspicious"))
            .unwrap();
        assert_eq!(finding.row_indices.as_ref().unwrap(), &vec![0, 1]);
    }

    #[test]
    fn test_shared_locations_reported_with_ids() {
        let ds = coord_dataset(&[
            (Some(-23.55), Some(-46.63)),
            (Some(-23.55), Some(-46.63)),
            (Some(-22.91), Some(-43.17)),
        ]);
        let result = GeospatialCheck.execute(&ds, &ManifestConfig::default());
        let finding = result
            .info()
            .iter()
            .find(|f| f.message.contains("shared"))
            .unwrap();
        let groups = finding.details.as_ref().unwrap()["sample_groups"]
            .as_array()
            .unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(
            groups[0]["ids"],
            serde_json::json!(["2269310", "2269311"])
        );
    }

    #[test]
    fn test_missing_coordinate_columns_skip_quietly() {
        let ds = Dataset::new(vec!["CNES".into()], vec![vec![Value::Str("2269311".into())]]);
        let result = GeospatialCheck.execute(&ds, &ManifestConfig::default());
        assert!(result.passed());
        assert!(result.info()[0].message.contains("skipped"));
    }
}
