// sentinela-core/src/domain/dataset.rs
//
// The immutable-for-the-run tabular snapshot every check reads. Checks
// receive `&Dataset`, so mutation during a run is ruled out by the borrow
// checker rather than by convention.

use serde::Serialize;

/// One heterogeneous cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric view. Strings are parsed, accepting a decimal comma
    /// ("-23,5" -> -23.5) since the source exports use it.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            Value::Str(s) => s.trim().replace(',', ".").parse().ok(),
            _ => None,
        }
    }

    /// Canonical text rendering used for messages, normalization and
    /// hashing. `Null` renders empty.
    pub fn to_display(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Str(s) => s.clone(),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => f.to_string(),
            Value::Bool(b) => b.to_string(),
        }
    }
}

/// Rows × named columns. Built once by a loader, read-only afterwards.
#[derive(Debug, Clone)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Dataset {
    /// Rows narrower than the header are padded with `Null`; wider rows
    /// are truncated. Loaders already produce rectangular data, this just
    /// keeps lookups total.
    pub fn new(columns: Vec<String>, mut rows: Vec<Vec<Value>>) -> Self {
        let width = columns.len();
        for row in &mut rows {
            row.resize(width, Value::Null);
        }
        Dataset { columns, rows }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn column_names(&self) -> &[String] {
        &self.columns
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Iterates a column's cells in row order.
    pub fn column(&self, name: &str) -> Option<impl Iterator<Item = &Value>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(move |row| &row[idx]))
    }

    pub fn get(&self, row: usize, column: &str) -> Option<&Value> {
        let idx = self.column_index(column)?;
        self.rows.get(row).map(|r| &r[idx])
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    /// Best-effort type inference over a column's non-null cells:
    /// "int", "float" (ints mixed with floats count), "bool", "string",
    /// "mixed", or "empty".
    pub fn inferred_type(&self, name: &str) -> Option<&'static str> {
        let cells = self.column(name)?;
        let (mut ints, mut floats, mut bools, mut strs, mut total) = (0, 0, 0, 0, 0);
        for cell in cells {
            match cell {
                Value::Null => continue,
                Value::Int(_) => ints += 1,
                Value::Float(_) => floats += 1,
                Value::Bool(_) => bools += 1,
                Value::Str(_) => strs += 1,
            }
            total += 1;
        }
        Some(match (ints, floats, bools, strs) {
            _ if total == 0 => "empty",
            (i, 0, 0, 0) if i == total => "int",
            (_, f, 0, 0) if f > 0 => "float",
            (0, 0, b, 0) if b == total => "bool",
            (0, 0, 0, s) if s == total => "string",
            _ => "mixed",
        })
    }

    /// Rough in-memory footprint in bytes, for the perf check.
    pub fn approx_bytes(&self) -> usize {
        let header: usize = self.columns.iter().map(|c| c.len()).sum();
        let cells: usize = self
            .rows
            .iter()
            .flat_map(|row| row.iter())
            .map(|v| match v {
                Value::Str(s) => std::mem::size_of::<Value>() + s.len(),
                _ => std::mem::size_of::<Value>(),
            })
            .sum();
        header + cells
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample() -> Dataset {
        Dataset::new(
            vec!["CNES".into(), "Lat".into(), "Municipio".into()],
            vec![
                vec![
                    Value::Str("2269311".into()),
                    Value::Float(-23.55),
                    Value::Str("São Paulo".into()),
                ],
                vec![Value::Str("2269312".into()), Value::Null, Value::Null],
            ],
        )
    }

    #[test]
    fn test_column_lookup_and_counts() {
        let ds = sample();
        assert_eq!(ds.row_count(), 2);
        assert_eq!(ds.column_count(), 3);
        assert!(ds.has_column("Lat"));
        assert!(!ds.has_column("lat"));

        let lats: Vec<&Value> = ds.column("Lat").unwrap().collect();
        assert_eq!(lats.len(), 2);
        assert!(lats[1].is_null());
    }

    #[test]
    fn test_ragged_rows_are_padded() {
        let ds = Dataset::new(
            vec!["a".into(), "b".into()],
            vec![vec![Value::Int(1)], vec![Value::Int(2), Value::Int(3), Value::Int(4)]],
        );
        assert_eq!(ds.get(0, "b"), Some(&Value::Null));
        assert_eq!(ds.get(1, "b"), Some(&Value::Int(3)));
    }

    #[test]
    fn test_value_numeric_views() {
        assert_eq!(Value::Int(4).as_f64(), Some(4.0));
        assert_eq!(Value::Str("-23,5".into()).as_f64(), Some(-23.5));
        assert_eq!(Value::Str(" 10.25 ".into()).as_f64(), Some(10.25));
        assert_eq!(Value::Str("abc".into()).as_f64(), None);
        assert_eq!(Value::Null.as_f64(), None);
    }

    #[test]
    fn test_inferred_types() {
        let ds = Dataset::new(
            vec!["i".into(), "f".into(), "s".into(), "e".into(), "m".into()],
            vec![
                vec![
                    Value::Int(1),
                    Value::Float(1.5),
                    Value::Str("x".into()),
                    Value::Null,
                    Value::Int(1),
                ],
                vec![
                    Value::Int(2),
                    Value::Int(2),
                    Value::Str("y".into()),
                    Value::Null,
                    Value::Str("two".into()),
                ],
            ],
        );
        assert_eq!(ds.inferred_type("i"), Some("int"));
        assert_eq!(ds.inferred_type("f"), Some("float"));
        assert_eq!(ds.inferred_type("s"), Some("string"));
        assert_eq!(ds.inferred_type("e"), Some("empty"));
        assert_eq!(ds.inferred_type("m"), Some("mixed"));
        assert_eq!(ds.inferred_type("missing"), None);
    }
}
