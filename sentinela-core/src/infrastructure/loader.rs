// sentinela-core/src/infrastructure/loader.rs
//
// Dataset loading. CSV is the only supported source; cells are typed by
// inference (int, then float, then bool, falling back to string) and
// empty cells become Null.

use std::path::Path;

use tracing::{info, instrument};

use crate::domain::dataset::{Dataset, Value};
use crate::infrastructure::error::InfrastructureError;

#[instrument]
pub fn load_dataset(path: &Path) -> Result<Dataset, InfrastructureError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    if extension != "csv" {
        return Err(InfrastructureError::UnsupportedFormat(
            path.display().to_string(),
        ));
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;

    let columns: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(infer_cell).collect());
    }

    info!(rows = rows.len(), columns = columns.len(), "Dataset loaded");
    Ok(Dataset::new(columns, rows))
}

/// Narrowest type that round-trips the raw text. Deliberately does NOT
/// accept the decimal comma here: "1,5" stays a string so the parsing
/// check can see the raw form.
fn infer_cell(raw: &str) -> Value {
    if raw.is_empty() {
        return Value::Null;
    }
    if let Ok(i) = raw.parse::<i64>() {
        return Value::Int(i);
    }
    if let Ok(f) = raw.parse::<f64>() {
        return Value::Float(f);
    }
    match raw {
        "true" | "false" => Value::Bool(raw == "true"),
        _ => Value::Str(raw.to_string()),
    }
}
