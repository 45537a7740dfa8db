use std::collections::HashSet;
use std::fmt;
use std::hash::{Hash, Hasher};

use super::error::DataError;

// ---------------------------------------------------------------------------
// CellValue – a single cell of a table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value mirroring common Pandas dtypes.
/// Used as a set member and cache key downstream, so it must be `Ord` + `Hash`.
#[derive(Debug, Clone)]
pub enum CellValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

// -- Manual Eq/Ord so we can put CellValue in BTreeSet --

// Equality follows `Ord`: floats compare by `total_cmp`, so a NaN equals
// itself and `0.0` differs from `-0.0`, matching the bit-pattern hash.
impl PartialEq for CellValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == std::cmp::Ordering::Equal
    }
}

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use CellValue::*;
        fn discriminant(v: &CellValue) -> u8 {
            match v {
                Null => 0,
                Bool(_) => 1,
                Integer(_) => 2,
                Float(_) => 3,
                Text(_) => 4,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Null, Null) => std::cmp::Ordering::Equal,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (Text(a), Text(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl Hash for CellValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            CellValue::Text(s) => s.hash(state),
            CellValue::Integer(i) => i.hash(state),
            CellValue::Float(f) => f.to_bits().hash(state),
            CellValue::Bool(b) => b.hash(state),
            CellValue::Null => {}
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v:.4}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Null => write!(f, "<null>"),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<i64> for CellValue {
    fn from(i: i64) -> Self {
        CellValue::Integer(i)
    }
}

impl From<f64> for CellValue {
    fn from(v: f64) -> Self {
        CellValue::Float(v)
    }
}

impl CellValue {
    /// Infer a typed value from a raw text field.
    ///
    /// Empty → `Null`, then integer, float, `true`/`false`, falling back to text.
    pub fn infer(s: &str) -> Self {
        if s.is_empty() {
            return CellValue::Null;
        }
        if let Ok(i) = s.parse::<i64>() {
            return CellValue::Integer(i);
        }
        if let Ok(f) = s.parse::<f64>() {
            return CellValue::Float(f);
        }
        if s == "true" || s == "false" {
            return CellValue::Bool(s == "true");
        }
        CellValue::Text(s.to_string())
    }

    /// Render the value as a field for delimited export.
    ///
    /// Floats use the shortest round-trip form and always keep a decimal
    /// point, so [`CellValue::infer`] reads them back as floats.
    pub fn to_field(&self) -> String {
        match self {
            CellValue::Text(s) => s.clone(),
            CellValue::Integer(i) => i.to_string(),
            CellValue::Float(v) => format!("{v:?}"),
            CellValue::Bool(b) => b.to_string(),
            CellValue::Null => String::new(),
        }
    }

    /// Try to interpret the value as an `f64` for range filtering.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }
}

// ---------------------------------------------------------------------------
// Table – the loaded record table
// ---------------------------------------------------------------------------

/// An ordered, column-named table of cells.
///
/// Row position is the index: a filtered table is re-indexed from zero
/// simply by being a fresh `Vec` of the surviving rows.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    /// Column names in file order.
    pub columns: Vec<String>,
    /// Rows; each has exactly `columns.len()` cells.
    pub rows: Vec<Vec<CellValue>>,
}

impl Table {
    /// Build a table, padding short rows with `Null` and truncating long ones.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, CellValue::Null);
                row
            })
            .collect();
        Table { columns, rows }
    }

    /// Same columns, no rows.
    pub fn empty_like(&self) -> Self {
        Table {
            columns: self.columns.clone(),
            rows: Vec::new(),
        }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of `column`, or [`DataError::MissingColumn`].
    pub fn column_index(&self, column: &str) -> Result<usize, DataError> {
        self.columns
            .iter()
            .position(|c| c == column)
            .ok_or_else(|| DataError::MissingColumn(column.to_string()))
    }

    /// Iterate over the cells of one column in row order.
    pub fn column_values(
        &self,
        column: &str,
    ) -> Result<impl Iterator<Item = &CellValue> + '_, DataError> {
        let idx = self.column_index(column)?;
        Ok(self.rows.iter().map(move |row| &row[idx]))
    }

    /// Distinct values of `column` in order of first appearance.
    pub fn observed_values(&self, column: &str) -> Result<Vec<CellValue>, DataError> {
        let mut seen = HashSet::new();
        Ok(self
            .column_values(column)?
            .filter(|v| seen.insert(*v))
            .cloned()
            .collect())
    }

    /// Min and max of the numeric cells of `column`; `None` if there are none.
    pub fn numeric_bounds(&self, column: &str) -> Result<Option<(f64, f64)>, DataError> {
        Ok(self
            .column_values(column)?
            .filter_map(CellValue::as_f64)
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            }))
    }

    /// The first `n` rows, for previews.
    pub fn head(&self, n: usize) -> Table {
        Table {
            columns: self.columns.clone(),
            rows: self.rows.iter().take(n).cloned().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table::new(
            vec!["age".into(), "job".into()],
            vec![
                vec![CellValue::Integer(30), "admin".into()],
                vec![CellValue::Null, "technician".into()],
                vec![CellValue::Integer(58), "admin".into()],
                vec![CellValue::Integer(41)],
            ],
        )
    }

    #[test]
    fn infer_types() {
        assert_eq!(CellValue::infer(""), CellValue::Null);
        assert_eq!(CellValue::infer("42"), CellValue::Integer(42));
        assert_eq!(CellValue::infer("1.5"), CellValue::Float(1.5));
        assert_eq!(CellValue::infer("true"), CellValue::Bool(true));
        assert_eq!(CellValue::infer("yes"), CellValue::Text("yes".into()));
    }

    #[test]
    fn float_fields_read_back_as_floats() {
        for v in [3.0, 0.1, -2.5e-7, 1e20] {
            let field = CellValue::Float(v).to_field();
            assert_eq!(CellValue::infer(&field), CellValue::Float(v), "{field}");
        }
    }

    #[test]
    fn short_rows_are_padded() {
        let t = sample();
        assert_eq!(t.rows[3], vec![CellValue::Integer(41), CellValue::Null]);
    }

    #[test]
    fn observed_values_keep_first_appearance_order() {
        let t = sample();
        assert_eq!(
            t.observed_values("job").unwrap(),
            vec![CellValue::from("admin"), "technician".into(), CellValue::Null]
        );
    }

    #[test]
    fn nan_cells_are_one_value() {
        let nan = CellValue::infer("nan");
        assert!(matches!(nan, CellValue::Float(v) if v.is_nan()));
        assert_eq!(nan, CellValue::infer("NaN"));
        assert_ne!(CellValue::Float(0.0), CellValue::Float(-0.0));

        let t = Table::new(
            vec!["y".into()],
            vec![vec![nan.clone()], vec!["no".into()], vec![CellValue::infer("NaN")]],
        );
        assert_eq!(t.observed_values("y").unwrap(), vec![nan, CellValue::from("no")]);
    }

    #[test]
    fn numeric_bounds_skip_nulls() {
        assert_eq!(sample().numeric_bounds("age").unwrap(), Some((30.0, 58.0)));
        assert_eq!(sample().empty_like().numeric_bounds("age").unwrap(), None);
    }

    #[test]
    fn missing_column_is_reported() {
        let err = sample().column_index("salary").unwrap_err();
        assert!(matches!(err, DataError::MissingColumn(c) if c == "salary"));
    }
}
