use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::color::ColorMap;
use crate::config::DashboardConfig;
use crate::data::cache::{content_key, Memo, MemoStats, PipelineKey};
use crate::data::export::{to_delimited_bytes, to_spreadsheet_bytes};
use crate::data::filter::{FilterSet, RangeFilter, Selection};
use crate::data::loader::load_bytes;
use crate::data::model::{CellValue, Table};
use crate::data::pipeline::{run, summarize, PipelineOutput};

// ---------------------------------------------------------------------------
// Filter form
// ---------------------------------------------------------------------------

/// Chart style for the proportion plots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChartKind {
    #[default]
    Bars,
    Pie,
}

/// Widget state of one categorical multiselect.
#[derive(Debug, Clone)]
pub struct CategoryChoice {
    pub column: String,
    pub label: String,
    /// Values observed in the raw table, in first-appearance order.
    pub options: Vec<CellValue>,
    /// The "all" sentinel is ticked.
    pub all: bool,
    pub chosen: BTreeSet<CellValue>,
}

impl CategoryChoice {
    pub fn selection(&self) -> Selection {
        Selection::from_choices(self.all, &self.chosen)
    }
}

/// Widget state of the whole sidebar form. Edits take effect on submit.
#[derive(Debug, Clone)]
pub struct FilterForm {
    pub range_column: String,
    pub range_label: String,
    /// Observed min/max of the range column; `None` if it has no numbers.
    pub range_bounds: Option<(f64, f64)>,
    pub range: (f64, f64),
    pub categories: Vec<CategoryChoice>,
}

impl FilterForm {
    /// Fresh form for a newly loaded table: full range, "all" everywhere.
    ///
    /// Columns missing from the table get no options; submitting the form
    /// then fails with a missing-column error.
    pub fn for_table(config: &DashboardConfig, raw: &Table) -> Self {
        let range_bounds = raw.numeric_bounds(&config.range_column).ok().flatten();
        let categories = config
            .categories
            .iter()
            .map(|c| CategoryChoice {
                column: c.column.clone(),
                label: c.label.clone(),
                options: raw.observed_values(&c.column).unwrap_or_default(),
                all: true,
                chosen: BTreeSet::new(),
            })
            .collect();

        FilterForm {
            range_column: config.range_column.clone(),
            range_label: config.range_label.clone(),
            range_bounds,
            range: range_bounds.unwrap_or((0.0, 0.0)),
            categories,
        }
    }

    /// Store slider positions as whole numbers inside the observed bounds.
    ///
    /// A bound at or past the observed extreme stays on it, so the full
    /// range still covers every row. `high` never ends below `low`.
    pub fn set_range(&mut self, low: f64, high: f64) {
        let Some((min, max)) = self.range_bounds else {
            return;
        };
        let snap = |v: f64| {
            if v <= min {
                min
            } else if v >= max {
                max
            } else {
                v.round().clamp(min, max)
            }
        };
        let low = snap(low);
        self.range = (low, snap(high).max(low));
    }

    /// The predicate set this form describes.
    pub fn filter_set(&self) -> FilterSet {
        let (low, high) = self.range;
        FilterSet {
            range: Some(RangeFilter::new(self.range_column.clone(), low, high)),
            categorical: self
                .categories
                .iter()
                .map(|c| (c.column.clone(), c.selection()))
                .collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// One opened file and everything derived from it.
pub struct Session {
    pub file_name: String,
    pub source_key: u64,
    pub raw: Arc<Table>,
    pub form: FilterForm,
    /// Result of the last successful submission (or of the unfiltered table).
    pub output: Option<PipelineOutput>,
    /// Whether the user has applied the form at least once.
    pub submitted: bool,
    /// Colours for the target column's categories.
    pub color_map: ColorMap,
}

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: DashboardConfig,

    /// Loaded dataset (None until user opens a file).
    pub session: Option<Session>,

    pub chart_kind: ChartKind,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    loads: Memo<u64, Table>,
    runs: Memo<PipelineKey, PipelineOutput>,
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        let capacity = config.cache_capacity;
        Self {
            config,
            session: None,
            chart_kind: ChartKind::default(),
            status_message: None,
            loads: Memo::new(capacity),
            runs: Memo::new(capacity),
        }
    }

    /// Read and open a file from disk.
    pub fn open_path(&mut self, path: &Path) -> Result<()> {
        let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();
        self.open_bytes(&name, &bytes)
    }

    /// Parse an upload (memoized by content) and start a new session.
    ///
    /// On failure the previous session stays untouched.
    pub fn open_bytes(&mut self, name: &str, bytes: &[u8]) -> Result<()> {
        let source_key = content_key(bytes);
        let options = self.config.load_options();
        let raw = self
            .loads
            .get_or_try_insert(source_key, || load_bytes(name, bytes, &options))?;

        log::info!(
            "Loaded '{name}': {} rows, columns {:?}",
            raw.len(),
            raw.columns
        );

        let form = FilterForm::for_table(&self.config, &raw);
        let color_map = ColorMap::new(
            &raw.observed_values(&self.config.target_column)
                .unwrap_or_default(),
        );
        let output = summarize(&raw, Arc::clone(&raw), &self.config.target_column);

        self.status_message = match &output {
            Ok(_) => None,
            Err(e) => Some(format!("Error: {e}")),
        };
        self.session = Some(Session {
            file_name: name.to_string(),
            source_key,
            raw,
            form,
            output: output.ok(),
            submitted: false,
            color_map,
        });
        Ok(())
    }

    /// Apply the sidebar form to the raw table.
    ///
    /// Memoized per upload and form; the target column is fixed by the config.
    pub fn submit(&mut self) -> Result<()> {
        let target = self.config.target_column.clone();
        let session = self.session.as_mut().context("no dataset loaded")?;

        let filters = session.form.filter_set();
        let key = PipelineKey {
            source: session.source_key,
            filters: filters.clone(),
        };
        let raw = Arc::clone(&session.raw);
        let output = self
            .runs
            .get_or_try_insert(key, || run(&raw, &filters, &target))?;

        log::info!(
            "Applied filters to '{}': {} of {} rows kept",
            session.file_name,
            output.filtered.len(),
            raw.len()
        );
        session.output = Some(PipelineOutput::clone(&output));
        session.submitted = true;
        self.status_message = None;
        Ok(())
    }

    /// The table downloads operate on: the filtered one after a submit.
    pub fn current_table(&self) -> Option<Arc<Table>> {
        let session = self.session.as_ref()?;
        match (&session.output, session.submitted) {
            (Some(out), true) => Some(Arc::clone(&out.filtered)),
            _ => Some(Arc::clone(&session.raw)),
        }
    }

    pub fn export_delimited(&self) -> Result<Vec<u8>> {
        let table = self.current_table().context("no dataset loaded")?;
        Ok(to_delimited_bytes(&table, self.config.delimiter_byte())?)
    }

    pub fn export_spreadsheet(&self) -> Result<Vec<u8>> {
        let table = self.current_table().context("no dataset loaded")?;
        Ok(to_spreadsheet_bytes(&table)?)
    }

    /// Record a failure for the status bar.
    pub fn report(&mut self, context: &str, err: &anyhow::Error) {
        log::error!("{context}: {err:#}");
        self.status_message = Some(format!("Error: {err:#}"));
    }

    pub fn cache_stats(&self) -> (MemoStats, MemoStats) {
        (self.loads.stats(), self.runs.stats())
    }
}
