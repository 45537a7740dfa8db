use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::data::loader::LoadOptions;

/// Environment variable naming a JSON config file.
pub const CONFIG_ENV: &str = "TELE_LENS_CONFIG";

// ---------------------------------------------------------------------------
// Dashboard configuration
// ---------------------------------------------------------------------------

/// One categorical multiselect in the filter form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryFilter {
    pub column: String,
    pub label: String,
}

impl CategoryFilter {
    fn new(column: &str, label: &str) -> Self {
        CategoryFilter {
            column: column.to_string(),
            label: label.to_string(),
        }
    }
}

/// Which columns the dashboard filters and charts, plus parser and cache
/// settings. Missing keys fall back to the bank-marketing defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub title: String,
    /// Field separator for both loading and delimited export.
    pub delimiter: char,
    pub range_column: String,
    pub range_label: String,
    pub categories: Vec<CategoryFilter>,
    /// Outcome column whose proportions are charted.
    pub target_column: String,
    pub preview_rows: usize,
    pub cache_capacity: usize,
    /// Image shown at the top of the sidebar.
    pub branding_image: Option<PathBuf>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        DashboardConfig {
            title: "Telemarketing Analysis".to_string(),
            delimiter: ';',
            range_column: "age".to_string(),
            range_label: "Age".to_string(),
            categories: vec![
                CategoryFilter::new("job", "Job"),
                CategoryFilter::new("marital", "Marital status"),
                CategoryFilter::new("default", "Default"),
                CategoryFilter::new("housing", "Housing loan"),
                CategoryFilter::new("loan", "Personal loan"),
                CategoryFilter::new("contact", "Contact"),
                CategoryFilter::new("month", "Month"),
                CategoryFilter::new("day_of_week", "Day of week"),
            ],
            target_column: "y".to_string(),
            preview_rows: 5,
            cache_capacity: 16,
            branding_image: None,
        }
    }
}

impl DashboardConfig {
    /// Parse a JSON config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: DashboardConfig = serde_json::from_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Config from `TELE_LENS_CONFIG` if set, defaults otherwise.
    pub fn from_env() -> Result<Self> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::from_file(Path::new(&path)),
            None => Ok(Self::default()),
        }
    }

    fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            self.delimiter.is_ascii(),
            "delimiter must be a single ASCII character, got '{}'",
            self.delimiter
        );
        anyhow::ensure!(!self.target_column.is_empty(), "target_column must be set");
        Ok(())
    }

    pub fn delimiter_byte(&self) -> u8 {
        // Non-ASCII delimiters are rejected by `validate`.
        if self.delimiter.is_ascii() {
            self.delimiter as u8
        } else {
            b';'
        }
    }

    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            delimiter: self.delimiter_byte(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_bank_dataset() {
        let config = DashboardConfig::default();
        assert_eq!(config.range_column, "age");
        assert_eq!(config.target_column, "y");
        let cols: Vec<_> = config.categories.iter().map(|c| c.column.as_str()).collect();
        assert_eq!(
            cols,
            ["job", "marital", "default", "housing", "loan", "contact", "month", "day_of_week"]
        );
        assert_eq!(config.load_options().delimiter, b';');
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dashboard.json");
        std::fs::write(
            &path,
            r#"{ "delimiter": ",", "target_column": "subscribed",
                 "categories": [ { "column": "job", "label": "Job" } ] }"#,
        )
        .unwrap();

        let config = DashboardConfig::from_file(&path).unwrap();
        assert_eq!(config.delimiter_byte(), b',');
        assert_eq!(config.target_column, "subscribed");
        assert_eq!(config.categories.len(), 1);
        assert_eq!(config.range_column, "age");
        assert_eq!(config.preview_rows, 5);
    }

    #[test]
    fn non_ascii_delimiter_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dashboard.json");
        std::fs::write(&path, r#"{ "delimiter": "§" }"#).unwrap();
        assert!(DashboardConfig::from_file(&path).is_err());
    }
}
