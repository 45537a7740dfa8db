use thiserror::Error;

/// Contract violations and encoder failures raised by the pipeline.
///
/// An empty result is never an error.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("column '{0}' is not present in the table")]
    MissingColumn(String),

    #[error("value '{value}' was never observed in column '{column}'")]
    UnobservedValue { column: String, value: String },

    #[error("column '{column}' holds non-numeric value '{value}' at row {row}")]
    NonNumeric {
        column: String,
        row: usize,
        value: String,
    },

    #[error("spreadsheet export failed: {0}")]
    Export(#[from] rust_xlsxwriter::XlsxError),

    #[error("delimited export failed: {0}")]
    Delimited(#[from] csv::Error),
}
