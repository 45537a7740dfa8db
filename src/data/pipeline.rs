use std::sync::Arc;

use super::error::DataError;
use super::filter::{apply_filters, FilterSet};
use super::model::Table;
use super::summary::{proportions, ProportionSummary};

/// Everything the presentation layer needs after a filter submission.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub filtered: Arc<Table>,
    pub raw_summary: ProportionSummary,
    pub filtered_summary: ProportionSummary,
}

/// Proportions of `target` over the raw and the filtered table.
pub fn summarize(
    raw: &Table,
    filtered: Arc<Table>,
    target: &str,
) -> Result<PipelineOutput, DataError> {
    Ok(PipelineOutput {
        raw_summary: proportions(raw, target)?,
        filtered_summary: proportions(&filtered, target)?,
        filtered,
    })
}

/// Filter `raw` and summarise `target` before and after, in one call.
pub fn run(raw: &Table, filters: &FilterSet, target: &str) -> Result<PipelineOutput, DataError> {
    let filtered = apply_filters(raw, filters)?;
    summarize(raw, Arc::new(filtered), target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{RangeFilter, Selection};
    use crate::data::model::CellValue;

    fn raw() -> Table {
        let rows: [(i64, &str, &str); 6] = [
            (30, "admin", "no"),
            (45, "admin", "yes"),
            (52, "services", "no"),
            (27, "admin", "no"),
            (60, "retired", "yes"),
            (33, "services", "no"),
        ];
        Table::new(
            vec!["age".into(), "job".into(), "y".into()],
            rows.iter()
                .map(|&(age, job, y)| vec![CellValue::Integer(age), job.into(), y.into()])
                .collect(),
        )
    }

    #[test]
    fn raw_and_filtered_summaries() {
        let set = FilterSet::default()
            .with_range(RangeFilter::new("age", 25.0, 50.0))
            .with_selection("job", Selection::only(["admin"]));
        let out = run(&raw(), &set, "y").unwrap();

        assert_eq!(out.filtered.len(), 3);
        assert_eq!(out.raw_summary.share_of(&"no".into()), Some(4.0 / 6.0 * 100.0));
        assert_eq!(out.filtered_summary.share_of(&"yes".into()), Some(1.0 / 3.0 * 100.0));
    }

    #[test]
    fn empty_result_is_not_an_error() {
        let set = FilterSet::default().with_selection("job", Selection::Only(Default::default()));
        let out = run(&raw(), &set, "y").unwrap();
        assert!(out.filtered.is_empty());
        assert!(out.filtered_summary.is_empty());
        assert!(!out.raw_summary.is_empty());
    }

    #[test]
    fn missing_target_fails_whole_run() {
        let err = run(&raw(), &FilterSet::default(), "outcome").unwrap_err();
        assert!(matches!(err, DataError::MissingColumn(c) if c == "outcome"));
    }
}
