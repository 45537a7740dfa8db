use std::collections::BTreeSet;
use std::hash::{Hash, Hasher};

use super::error::DataError;
use super::model::{CellValue, Table};

/// Label the presentation layer shows for "no restriction".
pub const ALL_SENTINEL: &str = "all";

// ---------------------------------------------------------------------------
// Predicates
// ---------------------------------------------------------------------------

/// Which values of a categorical column are let through.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Selection {
    /// The "all" sentinel: no restriction.
    #[default]
    All,
    /// Only these values. An empty set lets nothing through.
    Only(BTreeSet<CellValue>),
}

impl Selection {
    pub fn only<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<CellValue>,
    {
        Selection::Only(values.into_iter().map(Into::into).collect())
    }

    /// Build from multiselect state: the sentinel wins over any explicit values.
    pub fn from_choices(all: bool, chosen: &BTreeSet<CellValue>) -> Self {
        if all {
            Selection::All
        } else {
            Selection::Only(chosen.clone())
        }
    }

    pub fn allows(&self, value: &CellValue) -> bool {
        match self {
            Selection::All => true,
            Selection::Only(values) => values.contains(value),
        }
    }
}

/// Inclusive numeric range over one column.
#[derive(Debug, Clone)]
pub struct RangeFilter {
    pub column: String,
    pub low: f64,
    pub high: f64,
}

// Bounds compare by bit pattern so the filter can key a cache.
impl PartialEq for RangeFilter {
    fn eq(&self, other: &Self) -> bool {
        self.column == other.column
            && self.low.to_bits() == other.low.to_bits()
            && self.high.to_bits() == other.high.to_bits()
    }
}

impl Eq for RangeFilter {}

impl Hash for RangeFilter {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.column.hash(state);
        self.low.to_bits().hash(state);
        self.high.to_bits().hash(state);
    }
}

impl RangeFilter {
    pub fn new(column: impl Into<String>, low: f64, high: f64) -> Self {
        RangeFilter {
            column: column.into(),
            low,
            high,
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.low && value <= self.high
    }
}

/// One submitted filter form: an optional range plus categorical selections.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FilterSet {
    pub range: Option<RangeFilter>,
    pub categorical: Vec<(String, Selection)>,
}

impl FilterSet {
    pub fn with_range(mut self, range: RangeFilter) -> Self {
        self.range = Some(range);
        self
    }

    pub fn with_selection(mut self, column: impl Into<String>, selection: Selection) -> Self {
        self.categorical.push((column.into(), selection));
        self
    }

    /// Check every predicate against the raw table it will be applied to.
    ///
    /// * every referenced column exists
    /// * explicit selection values were observed in the raw column
    /// * the range column holds only numbers or nulls
    pub fn validate(&self, raw: &Table) -> Result<(), DataError> {
        if let Some(range) = &self.range {
            for (row, value) in raw.column_values(&range.column)?.enumerate() {
                if !value.is_null() && value.as_f64().is_none() {
                    return Err(DataError::NonNumeric {
                        column: range.column.clone(),
                        row,
                        value: value.to_field(),
                    });
                }
            }
        }

        for (column, selection) in &self.categorical {
            let observed: BTreeSet<CellValue> = raw.observed_values(column)?.into_iter().collect();
            if let Selection::Only(values) = selection {
                if let Some(unknown) = values.iter().find(|v| !observed.contains(*v)) {
                    return Err(DataError::UnobservedValue {
                        column: column.clone(),
                        value: unknown.to_field(),
                    });
                }
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Filters
// ---------------------------------------------------------------------------

/// Keep rows whose `column` value is allowed by `selection`, in original order.
///
/// With [`Selection::All`] the table comes back unchanged.
pub fn categorical_filter(
    table: &Table,
    column: &str,
    selection: &Selection,
) -> Result<Table, DataError> {
    let idx = table.column_index(column)?;
    if let Selection::All = selection {
        return Ok(table.clone());
    }
    Ok(Table {
        columns: table.columns.clone(),
        rows: table
            .rows
            .iter()
            .filter(|row| selection.allows(&row[idx]))
            .cloned()
            .collect(),
    })
}

/// Keep rows whose numeric value lies within the inclusive range.
///
/// Bounds covering the observed min/max leave the table untouched; otherwise
/// null cells are dropped and text cells are rejected.
pub fn range_filter(table: &Table, range: &RangeFilter) -> Result<Table, DataError> {
    let idx = table.column_index(&range.column)?;
    if let Some((min, max)) = table.numeric_bounds(&range.column)? {
        if range.low <= min && range.high >= max {
            return Ok(table.clone());
        }
    }

    let mut rows = Vec::new();
    for (row_no, row) in table.rows.iter().enumerate() {
        let cell = &row[idx];
        match cell.as_f64() {
            Some(v) if range.contains(v) => rows.push(row.clone()),
            Some(_) => {}
            None if cell.is_null() => {}
            None => {
                return Err(DataError::NonNumeric {
                    column: range.column.clone(),
                    row: row_no,
                    value: cell.to_field(),
                })
            }
        }
    }
    Ok(Table {
        columns: table.columns.clone(),
        rows,
    })
}

/// Run a whole filter set: validate, range first, then each selection in turn.
///
/// The result is the conjunction of all predicates and does not depend on
/// the order of `filters.categorical`.
pub fn apply_filters(raw: &Table, filters: &FilterSet) -> Result<Table, DataError> {
    filters.validate(raw)?;

    let ranged = match &filters.range {
        Some(range) => range_filter(raw, range)?,
        None => raw.clone(),
    };

    let filtered = filters
        .categorical
        .iter()
        .try_fold(ranged, |table, (column, selection)| {
            categorical_filter(&table, column, selection)
        })?;

    log::debug!(
        "filtered {} → {} rows ({} categorical predicates)",
        raw.len(),
        filtered.len(),
        filters.categorical.len()
    );
    Ok(filtered)
}
