// sentinela-core/src/infrastructure/manifest.rs
//
// YAML manifest loading. A missing or unparsable manifest is fatal: the
// run never starts with a configuration we cannot trust. Mapping tables
// living next to the manifest (mappings/*.yaml) are loaded alongside and
// override the built-in ones by name.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, info, instrument};

use crate::domain::manifest::{ManifestConfig, ManifestDocument, MappingTable};
use crate::error::SentinelaError;
use crate::infrastructure::error::InfrastructureError;

/// Mapping file values are either a single accepted value or a list.
#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl From<OneOrMany> for Vec<String> {
    fn from(v: OneOrMany) -> Self {
        match v {
            OneOrMany::One(s) => vec![s],
            OneOrMany::Many(list) => list,
        }
    }
}

#[instrument]
pub fn load_manifest(path: &Path) -> Result<ManifestConfig, SentinelaError> {
    if !path.exists() {
        return Err(InfrastructureError::ConfigNotFound(path.display().to_string()).into());
    }
    info!(path = ?path, "Loading manifest");

    let content = fs::read_to_string(path).map_err(InfrastructureError::Io)?;
    let doc: ManifestDocument =
        serde_yaml::from_str(&content).map_err(InfrastructureError::YamlError)?;
    let mut config = ManifestConfig::resolve(doc);

    if let Some(parent) = path.parent() {
        load_sibling_mappings(&mut config, &parent.join("mappings"))?;
    }

    config.validate()?;
    Ok(config)
}

/// Loads `mappings/*.yaml` next to the manifest. `fu_to_state.yaml` is
/// taken as-is (FU -> accepted state names); `fu_to_region.yaml` is
/// authored region -> FU list and inverted here, so both tables read
/// field_a value -> accepted field_b values like every other mapping.
fn load_sibling_mappings(
    config: &mut ManifestConfig,
    dir: &Path,
) -> Result<(), InfrastructureError> {
    if !dir.is_dir() {
        return Ok(());
    }

    let state_path = dir.join("fu_to_state.yaml");
    if state_path.exists() {
        let table = load_mapping_file(&state_path)?;
        debug!(entries = table.len(), "fu_to_state mapping loaded");
        config.mappings.insert("fu_to_state".into(), table);
    }

    let region_path = dir.join("fu_to_region.yaml");
    if region_path.exists() {
        let by_region = load_mapping_file(&region_path)?;
        let mut inverted = MappingTable::new();
        for (region, fus) in by_region {
            for fu in fus {
                inverted.entry(fu).or_default().push(region.clone());
            }
        }
        debug!(entries = inverted.len(), "fu_to_region mapping loaded");
        config.mappings.insert("fu_to_region".into(), inverted);
    }

    Ok(())
}

fn load_mapping_file(path: &Path) -> Result<MappingTable, InfrastructureError> {
    let content = fs::read_to_string(path).map_err(InfrastructureError::Io)?;
    let raw: BTreeMap<String, OneOrMany> =
        serde_yaml::from_str(&content).map_err(InfrastructureError::YamlError)?;
    Ok(raw.into_iter().map(|(k, v)| (k, v.into())).collect())
}

/// Starter manifest written by `sentinela init`. Mirrors the built-in
/// defaults so a fresh project validates out of the box.
pub fn starter_manifest() -> &'static str {
    r#"# Sentinela validation manifest.
# Every section is optional: anything omitted keeps the built-in defaults
# for the Brazilian health-facility dataset.

input:
  file_path: data/facilities.csv

output:
  reports_dir: reports

columns:
  expected:
    - name: Region
    - name: Federal_Un
      aliases: [federal_unit]
    - name: FU
    - name: Municipio
    - name: CNES
    - name: Lat
      type: float
    - name: Lon
      type: float

constraints:
  CNES:
    pattern: "^\\d{6,8}$"
    strip_chars: "\t \n"
    allow_special_values: ["Not informed"]
    severity: MAJOR

controlled_vocab:
  Region:
    values: [North, Northeast, Midwest, Southeast, South]
    severity: MAJOR

geospatial:
  lat_field: Lat
  lon_field: Lon
  plausible_bounds:
    lat_min: -33.75
    lat_max: 5.27
    lon_min: -73.99
    lon_max: -32.39
  duplicate_coords:
    check: true
    id_column: CNES

uniqueness:
  primary_key:
    columns: [CNES]

missingness:
  per_field:
    Lat:
      max_null_rate: 0.05
      severity: MAJOR

# reproducibility:
#   expected_hash: <pin a hash reported by a previous clean run>
#   expected_rows: 0
"#
}
