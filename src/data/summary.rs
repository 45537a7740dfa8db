use std::collections::HashMap;

use super::error::DataError;
use super::model::{CellValue, Table};

// ---------------------------------------------------------------------------
// Proportion summary of a target column
// ---------------------------------------------------------------------------

/// Percentage share of each distinct value in one column.
///
/// Entries are ordered by descending count; ties keep first-appearance order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProportionSummary {
    pub entries: Vec<(CellValue, f64)>,
}

impl ProportionSummary {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Share of `value`, if it occurs.
    pub fn share_of(&self, value: &CellValue) -> Option<f64> {
        self.entries
            .iter()
            .find(|(v, _)| v == value)
            .map(|(_, pct)| *pct)
    }

    pub fn total(&self) -> f64 {
        self.entries.iter().map(|(_, pct)| pct).sum()
    }
}

/// Count every value of `column` over all rows and normalise to 0–100.
///
/// A zero-row table gives an empty summary. Nulls form their own category.
pub fn proportions(table: &Table, column: &str) -> Result<ProportionSummary, DataError> {
    // Counts in first-appearance order, with each value's slot.
    let mut entries: Vec<(CellValue, usize)> = Vec::new();
    let mut slots: HashMap<&CellValue, usize> = HashMap::new();

    for value in table.column_values(column)? {
        match slots.get(value) {
            Some(&slot) => entries[slot].1 += 1,
            None => {
                slots.insert(value, entries.len());
                entries.push((value.clone(), 1));
            }
        }
    }

    let total = table.len() as f64;
    // Stable sort keeps ties in first-appearance order.
    entries.sort_by(|a, b| b.1.cmp(&a.1));

    Ok(ProportionSummary {
        entries: entries
            .into_iter()
            .map(|(v, n)| (v, n as f64 / total * 100.0))
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcomes(values: &[&str]) -> Table {
        Table::new(
            vec!["y".into()],
            values.iter().map(|v| vec![CellValue::from(*v)]).collect(),
        )
    }

    #[test]
    fn yes_no_split() {
        let summary = proportions(&outcomes(&["yes", "no", "no", "no"]), "y").unwrap();
        assert_eq!(
            summary.entries,
            vec![(CellValue::from("no"), 75.0), (CellValue::from("yes"), 25.0)]
        );
    }

    #[test]
    fn empty_table_gives_empty_summary() {
        let summary = proportions(&outcomes(&[]), "y").unwrap();
        assert!(summary.is_empty());
    }

    #[test]
    fn shares_sum_to_hundred() {
        let t = outcomes(&["a", "b", "c", "a", "b", "a", "c"]);
        let summary = proportions(&t, "y").unwrap();
        assert!((summary.total() - 100.0).abs() < 1e-6);
        assert_eq!(summary.entries[0].0, CellValue::from("a"));
    }

    #[test]
    fn ties_keep_first_appearance() {
        let summary = proportions(&outcomes(&["b", "a", "a", "b"]), "y").unwrap();
        let order: Vec<_> = summary.entries.iter().map(|(v, _)| v.to_string()).collect();
        assert_eq!(order, ["b", "a"]);
    }

    #[test]
    fn nulls_are_counted() {
        let mut t = outcomes(&["yes", "no"]);
        t.rows.push(vec![CellValue::Null]);
        t.rows.push(vec![CellValue::Null]);
        let summary = proportions(&t, "y").unwrap();
        assert_eq!(summary.share_of(&CellValue::Null), Some(50.0));
    }

    #[test]
    fn nan_outcomes_form_one_category() {
        let t = Table::new(
            vec!["y".into()],
            ["nan", "no", "NaN", "nan"]
                .iter()
                .map(|v| vec![CellValue::infer(v)])
                .collect(),
        );
        let summary = proportions(&t, "y").unwrap();
        assert_eq!(summary.entries.len(), 2);
        assert!(matches!(summary.entries[0].0, CellValue::Float(v) if v.is_nan()));
        assert_eq!(summary.entries[0].1, 75.0);
        assert_eq!(summary.share_of(&CellValue::from("no")), Some(25.0));
    }

    #[test]
    fn missing_target_column() {
        assert!(matches!(
            proportions(&outcomes(&["yes"]), "outcome"),
            Err(DataError::MissingColumn(_))
        ));
    }
}
