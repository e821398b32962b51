// sentinela-core/src/domain/manifest.rs
//
// Manifest model: the raw YAML document shape (`ManifestDocument`) and the
// resolved, default-filled view every check queries (`ManifestConfig`).
// Resolution merges manifest-provided entries on top of built-in defaults,
// per subsection and per key, so checks never null-check beyond "is this
// column configured at all".

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::dataset::Dataset;
use crate::domain::error::DomainError;

fn default_true() -> bool {
    true
}

fn default_string_type() -> String {
    "string".into()
}

fn default_major() -> String {
    "MAJOR".into()
}

fn default_info() -> String {
    "INFO".into()
}

/// One expected column: canonical name, accepted aliases, declared type.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ColumnConfig {
    pub name: String,

    #[serde(default = "default_true")]
    pub required: bool,

    #[serde(rename = "type", default = "default_string_type")]
    pub column_type: String,

    #[serde(default)]
    pub aliases: Vec<String>,
}

impl ColumnConfig {
    pub fn new(name: &str) -> Self {
        ColumnConfig {
            name: name.into(),
            required: true,
            column_type: "string".into(),
            aliases: Vec::new(),
        }
    }

    /// A column is present if its canonical name or any declared alias is
    /// in the dataset; aliases resolve first-match in declaration order.
    pub fn resolve_in<'a>(&'a self, dataset: &Dataset) -> ColumnPresence<'a> {
        if dataset.has_column(&self.name) {
            return ColumnPresence::Canonical;
        }
        for alias in &self.aliases {
            if dataset.has_column(alias) {
                return ColumnPresence::Alias(alias);
            }
        }
        ColumnPresence::Missing
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnPresence<'a> {
    Canonical,
    Alias(&'a str),
    Missing,
}

/// Per-column format constraint.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ConstraintConfig {
    #[serde(default)]
    pub pattern: Option<String>,

    #[serde(default)]
    pub min_length: Option<usize>,

    #[serde(default)]
    pub max_length: Option<usize>,

    /// Characters removed from a value before pattern matching.
    #[serde(default)]
    pub strip_chars: Option<String>,

    #[serde(default)]
    pub allow_empty: bool,

    /// Values exempted from the pattern (e.g. "Not informed").
    #[serde(default)]
    pub allow_special_values: Vec<String>,

    #[serde(default = "default_major")]
    pub severity: String,
}

impl Default for ConstraintConfig {
    fn default() -> Self {
        ConstraintConfig {
            pattern: None,
            min_length: None,
            max_length: None,
            strip_chars: None,
            allow_empty: false,
            allow_special_values: Vec::new(),
            severity: default_major(),
        }
    }
}

/// Controlled vocabulary for one column.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct VocabConfig {
    #[serde(default)]
    pub values: Vec<String>,

    #[serde(default = "default_true")]
    pub case_sensitive: bool,

    #[serde(default)]
    pub allow_null: bool,

    #[serde(default = "default_major")]
    pub severity: String,
}

/// Plausible coordinate bounds. Defaults are the Brazil bounding box.
#[derive(Debug, Serialize, Deserialize, Clone, Copy)]
pub struct Bounds {
    pub lat_min: f64,
    pub lat_max: f64,
    pub lon_min: f64,
    pub lon_max: f64,
}

impl Default for Bounds {
    fn default() -> Self {
        Bounds {
            lat_min: -33.75,
            lat_max: 5.27,
            lon_min: -73.99,
            lon_max: -32.39,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DuplicateCoords {
    #[serde(default = "default_true")]
    pub check: bool,

    #[serde(default = "GeoConfig::default_id_column")]
    pub id_column: String,
}

impl Default for DuplicateCoords {
    fn default() -> Self {
        DuplicateCoords {
            check: true,
            id_column: GeoConfig::default_id_column(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GeoConfig {
    #[serde(default = "GeoConfig::default_lat_field")]
    pub lat_field: String,

    #[serde(default = "GeoConfig::default_lon_field")]
    pub lon_field: String,

    #[serde(default)]
    pub plausible_bounds: Bounds,

    #[serde(default)]
    pub duplicate_coords: DuplicateCoords,
}

impl GeoConfig {
    fn default_lat_field() -> String {
        "Lat".into()
    }
    fn default_lon_field() -> String {
        "Lon".into()
    }
    fn default_id_column() -> String {
        "CNES".into()
    }
}

impl Default for GeoConfig {
    fn default() -> Self {
        GeoConfig {
            lat_field: Self::default_lat_field(),
            lon_field: Self::default_lon_field(),
            plausible_bounds: Bounds::default(),
            duplicate_coords: DuplicateCoords::default(),
        }
    }
}

/// Cross-field coherence rule. `rule` selects the predicate:
/// - "mapping": `mapping` names a table of field_a value -> allowed
///   field_b values;
/// - "count_match": comma-separated item counts of both fields must agree
///   within `tolerance`.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CrossFieldConfig {
    #[serde(default)]
    pub description: String,

    pub field_a: String,
    pub field_b: String,

    #[serde(default)]
    pub rule: Option<String>,

    #[serde(default)]
    pub mapping: Option<String>,

    #[serde(default)]
    pub tolerance: i64,

    #[serde(default = "default_major")]
    pub severity: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct PrimaryKey {
    #[serde(default)]
    pub columns: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct UniquenessConfig {
    #[serde(default)]
    pub primary_key: PrimaryKey,

    /// Column sets that must be jointly unique.
    #[serde(default)]
    pub composite: Vec<Vec<String>>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MissingnessConfig {
    #[serde(default = "MissingnessConfig::default_max_null_rate")]
    pub max_null_rate: f64,

    #[serde(default = "default_info")]
    pub severity: String,
}

impl MissingnessConfig {
    fn default_max_null_rate() -> f64 {
        1.0
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PerfThresholds {
    #[serde(default = "PerfThresholds::default_memory_warn_mb")]
    pub memory_warn_mb: f64,

    #[serde(default = "PerfThresholds::default_memory_error_mb")]
    pub memory_error_mb: f64,

    #[serde(default = "PerfThresholds::default_row_threshold")]
    pub row_threshold: usize,
}

impl PerfThresholds {
    fn default_memory_warn_mb() -> f64 {
        500.0
    }
    fn default_memory_error_mb() -> f64 {
        2000.0
    }
    fn default_row_threshold() -> usize {
        1_000_000
    }
}

impl Default for PerfThresholds {
    fn default() -> Self {
        PerfThresholds {
            memory_warn_mb: Self::default_memory_warn_mb(),
            memory_error_mb: Self::default_memory_error_mb(),
            row_threshold: Self::default_row_threshold(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct ReproducibilityConfig {
    #[serde(default)]
    pub expected_hash: Option<String>,

    #[serde(default)]
    pub expected_rows: Option<usize>,
}

/// field_a value -> accepted field_b values, keyed by mapping name.
pub type MappingTable = BTreeMap<String, Vec<String>>;

// --- RAW DOCUMENT (what serde sees in the YAML file) ---

#[derive(Debug, Deserialize, Default)]
pub struct InputSection {
    #[serde(default)]
    pub file_path: String,
}

#[derive(Debug, Deserialize, Default)]
pub struct OutputSection {
    #[serde(default)]
    pub reports_dir: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct ColumnsSection {
    #[serde(default)]
    pub expected: Vec<ColumnConfig>,
}

#[derive(Debug, Deserialize, Default)]
pub struct MissingnessSection {
    #[serde(default)]
    pub per_field: BTreeMap<String, MissingnessConfig>,
}

/// Exactly the manifest file structure. Every section is optional; an
/// absent section keeps the built-in defaults at resolution time.
#[derive(Debug, Deserialize, Default)]
pub struct ManifestDocument {
    #[serde(default)]
    pub input: InputSection,

    #[serde(default)]
    pub output: OutputSection,

    #[serde(default)]
    pub columns: ColumnsSection,

    #[serde(default)]
    pub constraints: BTreeMap<String, ConstraintConfig>,

    #[serde(default)]
    pub controlled_vocab: BTreeMap<String, VocabConfig>,

    #[serde(default)]
    pub geospatial: Option<GeoConfig>,

    #[serde(default)]
    pub cross_field: BTreeMap<String, CrossFieldConfig>,

    #[serde(default)]
    pub uniqueness: Option<UniquenessConfig>,

    #[serde(default)]
    pub missingness: Option<MissingnessSection>,

    #[serde(default)]
    pub performance: Option<PerfThresholds>,

    #[serde(default)]
    pub reproducibility: Option<ReproducibilityConfig>,
}

// --- RESOLVED CONFIGURATION ---

/// The merged, read-only view of manifest input and built-in defaults.
/// Constructed once per run; checks only ever borrow it.
#[derive(Debug, Clone)]
pub struct ManifestConfig {
    pub input_file: String,
    pub reports_dir: String,
    pub columns: Vec<ColumnConfig>,
    pub constraints: BTreeMap<String, ConstraintConfig>,
    pub controlled_vocab: BTreeMap<String, VocabConfig>,
    pub geospatial: GeoConfig,
    pub cross_field: BTreeMap<String, CrossFieldConfig>,
    pub uniqueness: UniquenessConfig,
    pub missingness: BTreeMap<String, MissingnessConfig>,
    pub performance: PerfThresholds,
    pub reproducibility: ReproducibilityConfig,

    /// Loaded mapping tables (e.g. "fu_to_state"), normalized as
    /// field_a value -> accepted field_b values.
    pub mappings: BTreeMap<String, MappingTable>,
}

impl Default for ManifestConfig {
    fn default() -> Self {
        let columns = ["Region", "Federal_Un", "FU", "Municipio", "CNES", "Lat", "Lon"]
            .into_iter()
            .map(ColumnConfig::new)
            .collect();

        let mut constraints = BTreeMap::new();
        constraints.insert(
            "CNES".to_string(),
            ConstraintConfig {
                pattern: Some(r"^\d{6,8}$".into()),
                strip_chars: Some("\t \n".into()),
                allow_special_values: vec!["Not informed".into(), "Not informed1-4".into()],
                ..ConstraintConfig::default()
            },
        );
        constraints.insert(
            "Telefone".to_string(),
            ConstraintConfig {
                pattern: Some(r"^[\d\s\-\(\)\/\+]+$".into()),
                allow_empty: true,
                allow_special_values: vec!["Sem contato".into()],
                severity: "MINOR".into(),
                ..ConstraintConfig::default()
            },
        );

        let mut cross_field = BTreeMap::new();
        cross_field.insert(
            "fu_state".to_string(),
            CrossFieldConfig {
                description: "FU abbreviation must match the federal unit name".into(),
                field_a: "FU".into(),
                field_b: "Federal_Un".into(),
                rule: Some("mapping".into()),
                mapping: Some("fu_to_state".into()),
                tolerance: 0,
                severity: default_major(),
            },
        );
        cross_field.insert(
            "region_fu".to_string(),
            CrossFieldConfig {
                description: "Region must match the FU's macro-region".into(),
                field_a: "FU".into(),
                field_b: "Region".into(),
                rule: Some("mapping".into()),
                mapping: Some("fu_to_region".into()),
                tolerance: 0,
                severity: default_major(),
            },
        );
        cross_field.insert(
            "atendimento_count".to_string(),
            CrossFieldConfig {
                description: "Item counts of the paired service columns must agree".into(),
                field_a: "Atendiment".into(),
                field_b: "Atendime_1".into(),
                rule: Some("count_match".into()),
                mapping: None,
                tolerance: 0,
                severity: "MINOR".into(),
            },
        );

        ManifestConfig {
            input_file: String::new(),
            reports_dir: "reports".into(),
            columns,
            constraints,
            controlled_vocab: BTreeMap::new(),
            geospatial: GeoConfig::default(),
            cross_field,
            uniqueness: UniquenessConfig {
                primary_key: PrimaryKey {
                    columns: vec!["CNES".into()],
                },
                composite: Vec::new(),
            },
            missingness: BTreeMap::new(),
            performance: PerfThresholds::default(),
            reproducibility: ReproducibilityConfig::default(),
            mappings: BTreeMap::new(),
        }
    }
}

impl ManifestConfig {
    /// Merges a parsed manifest document on top of the built-in defaults.
    /// Map subsections merge per key; the column list merges by canonical
    /// name (overrides keep their default position, new columns append in
    /// declaration order, which alias resolution relies on).
    pub fn resolve(doc: ManifestDocument) -> Self {
        let mut config = ManifestConfig::default();

        if !doc.input.file_path.is_empty() {
            config.input_file = doc.input.file_path;
        }
        if let Some(dir) = doc.output.reports_dir {
            config.reports_dir = dir;
        }

        for column in doc.columns.expected {
            match config.columns.iter_mut().find(|c| c.name == column.name) {
                Some(existing) => *existing = column,
                None => config.columns.push(column),
            }
        }

        config.constraints.extend(doc.constraints);
        config.controlled_vocab.extend(doc.controlled_vocab);
        config.cross_field.extend(doc.cross_field);

        if let Some(geo) = doc.geospatial {
            config.geospatial = geo;
        }
        if let Some(uniqueness) = doc.uniqueness {
            if !uniqueness.primary_key.columns.is_empty() {
                config.uniqueness.primary_key = uniqueness.primary_key;
            }
            config.uniqueness.composite.extend(uniqueness.composite);
        }
        if let Some(missingness) = doc.missingness {
            config.missingness.extend(missingness.per_field);
        }
        if let Some(perf) = doc.performance {
            config.performance = perf;
        }
        if let Some(repro) = doc.reproducibility {
            config.reproducibility = repro;
        }

        config
    }

    /// Mapping table by name: manifest-loaded tables first, then the
    /// built-in Brazilian federal-unit tables.
    pub fn mapping(&self, name: &str) -> Option<&MappingTable> {
        self.mappings
            .get(name)
            .or_else(|| crate::domain::mappings::builtin(name))
    }

    /// Fail-fast validation of a resolved configuration, run once at load
    /// time before any check executes. A structurally unusable manifest
    /// (uncompilable pattern, out-of-range threshold) is a fatal
    /// configuration error, not a finding.
    pub fn validate(&self) -> Result<(), DomainError> {
        for (column, constraint) in &self.constraints {
            if let Some(pattern) = &constraint.pattern {
                Regex::new(pattern).map_err(|source| DomainError::InvalidPattern {
                    column: column.clone(),
                    source,
                })?;
            }
        }
        for (column, missingness) in &self.missingness {
            if !(0.0..=1.0).contains(&missingness.max_null_rate) {
                return Err(DomainError::ManifestError(format!(
                    "missingness.per_field.{}.max_null_rate must be within [0, 1], got {}",
                    column, missingness.max_null_rate
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::dataset::{Dataset, Value};

    fn dataset_with_columns(names: &[&str]) -> Dataset {
        Dataset::new(
            names.iter().map(|n| n.to_string()).collect(),
            vec![names.iter().map(|_| Value::Null).collect()],
        )
    }

    #[test]
    fn test_defaults_cover_the_facility_dataset() {
        let config = ManifestConfig::default();
        let names: Vec<&str> = config.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["Region", "Federal_Un", "FU", "Municipio", "CNES", "Lat", "Lon"]
        );
        assert_eq!(
            config.constraints["CNES"].pattern.as_deref(),
            Some(r"^\d{6,8}$")
        );
        assert_eq!(config.uniqueness.primary_key.columns, vec!["CNES"]);
        assert_eq!(config.geospatial.lat_field, "Lat");

        // Mapping rules name a table; the count rule deliberately has none.
        assert_eq!(
            config.cross_field["fu_state"].mapping.as_deref(),
            Some("fu_to_state")
        );
        assert_eq!(
            config.cross_field["atendimento_count"].rule.as_deref(),
            Some("count_match")
        );
        assert!(config.cross_field["atendimento_count"].mapping.is_none());
    }

    #[test]
    fn test_resolve_merges_on_top_of_defaults() {
        let yaml = r#"
input:
  file_path: facilities.csv
columns:
  expected:
    - name: CNES
      type: string
      aliases: [cnes_code]
    - name: Telefone
      required: false
constraints:
  Municipio:
    pattern: "^\\S.*$"
    severity: MINOR
"#;
        let doc: ManifestDocument = serde_yaml::from_str(yaml).unwrap();
        let config = ManifestConfig::resolve(doc);

        assert_eq!(config.input_file, "facilities.csv");
        // Overridden column keeps its default position, gains the alias.
        let cnes = config.columns.iter().find(|c| c.name == "CNES").unwrap();
        assert_eq!(cnes.aliases, vec!["cnes_code"]);
        // New column appended after the defaults.
        assert_eq!(config.columns.last().unwrap().name, "Telefone");
        // Default constraints survive alongside the new one.
        assert!(config.constraints.contains_key("CNES"));
        assert_eq!(config.constraints["Municipio"].severity, "MINOR");
        // Untouched sections keep defaults.
        assert_eq!(config.uniqueness.primary_key.columns, vec!["CNES"]);
    }

    #[test]
    fn test_empty_document_is_all_defaults() {
        let doc: ManifestDocument = serde_yaml::from_str("{}").unwrap();
        let config = ManifestConfig::resolve(doc);
        assert_eq!(config.columns.len(), 7);
        assert_eq!(config.reports_dir, "reports");
    }

    #[test]
    fn test_alias_resolution_first_match_in_declaration_order() {
        let mut column = ColumnConfig::new("Federal_Un");
        column.aliases = vec!["federal_unit".into(), "state_name".into()];

        let ds = dataset_with_columns(&["federal_unit", "state_name"]);
        assert_eq!(column.resolve_in(&ds), ColumnPresence::Alias("federal_unit"));

        let ds = dataset_with_columns(&["state_name"]);
        assert_eq!(column.resolve_in(&ds), ColumnPresence::Alias("state_name"));

        let ds = dataset_with_columns(&["Federal_Un", "federal_unit"]);
        assert_eq!(column.resolve_in(&ds), ColumnPresence::Canonical);

        let ds = dataset_with_columns(&["Municipio"]);
        assert_eq!(column.resolve_in(&ds), ColumnPresence::Missing);
    }

    #[test]
    fn test_validate_rejects_bad_pattern_and_threshold() {
        let mut config = ManifestConfig::default();
        assert!(config.validate().is_ok());

        config.constraints.insert(
            "Municipio".into(),
            ConstraintConfig {
                pattern: Some("(unclosed".into()),
                ..ConstraintConfig::default()
            },
        );
        assert!(matches!(
            config.validate(),
            Err(DomainError::InvalidPattern { .. })
        ));

        let mut config = ManifestConfig::default();
        config.missingness.insert(
            "Lat".into(),
            MissingnessConfig {
                max_null_rate: 1.5,
                severity: "INFO".into(),
            },
        );
        assert!(matches!(
            config.validate(),
            Err(DomainError::ManifestError(_))
        ));
    }

    #[test]
    fn test_builtin_mappings_reachable_when_not_loaded() {
        let config = ManifestConfig::default();
        let table = config.mapping("fu_to_state").unwrap();
        assert!(table["SP"].contains(&"São Paulo".to_string()));
        assert!(config.mapping("nonexistent").is_none());
    }
}
