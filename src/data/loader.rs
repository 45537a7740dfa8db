use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use arrow::array::{
    Array, AsArray, BooleanArray, Float32Array, Float64Array, Int32Array, Int64Array,
    StringArray,
};
use arrow::datatypes::DataType;
use bytes::Bytes;
use calamine::{Data, Reader};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use super::model::{CellValue, Table};

/// Parser settings that come from the dashboard configuration.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Field separator for delimited text.
    pub delimiter: u8,
}

impl Default for LoadOptions {
    fn default() -> Self {
        LoadOptions { delimiter: b';' }
    }
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Read `path` and parse it with [`load_bytes`].
pub fn load_file(path: &Path, options: &LoadOptions) -> Result<Table> {
    let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    load_bytes(name, &bytes, options)
}

/// Parse an uploaded file.
///
/// `.parquet` / `.pq` files are read as Parquet. Everything else is tried as
/// delimited text first and as a spreadsheet (xlsx, xls, ods) second; when
/// both fail the error names both causes and no table is returned.
pub fn load_bytes(name: &str, bytes: &[u8], options: &LoadOptions) -> Result<Table> {
    let ext = Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    if matches!(ext.as_str(), "parquet" | "pq") {
        return load_parquet(bytes).with_context(|| format!("parsing '{name}' as Parquet"));
    }

    match load_delimited(bytes, options.delimiter) {
        Ok(table) => Ok(table),
        Err(text_err) => {
            log::warn!("'{name}' is not delimited text ({text_err:#}); trying spreadsheet");
            load_spreadsheet(bytes).map_err(|sheet_err| {
                anyhow!(
                    "could not parse '{name}': not delimited text ({text_err:#}), \
                     not a spreadsheet ({sheet_err:#})"
                )
            })
        }
    }
}

// ---------------------------------------------------------------------------
// Delimited text loader
// ---------------------------------------------------------------------------

/// Header row with column names, one record per line, every record as wide
/// as the header. Field types are inferred with [`CellValue::infer`].
fn load_delimited(bytes: &[u8], delimiter: u8) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .from_reader(bytes);

    let columns: Vec<String> = reader
        .headers()
        .context("reading header row")?
        .iter()
        .map(|h| h.to_string())
        .collect();
    if columns.is_empty() {
        bail!("no header row");
    }

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("record {row_no}"))?;
        rows.push(record.iter().map(CellValue::infer).collect());
    }

    Ok(Table::new(columns, rows))
}

// ---------------------------------------------------------------------------
// Spreadsheet loader
// ---------------------------------------------------------------------------

/// First sheet only; its first row is the header.
fn load_spreadsheet(bytes: &[u8]) -> Result<Table> {
    let mut workbook = calamine::open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .context("opening workbook")?;
    let range = workbook
        .worksheet_range_at(0)
        .context("workbook has no sheets")?
        .context("reading first sheet")?;

    let mut sheet_rows = range.rows();
    let columns: Vec<String> = sheet_rows
        .next()
        .context("first sheet is empty")?
        .iter()
        .map(|c| c.to_string())
        .collect();

    let rows = sheet_rows
        .map(|row| row.iter().map(spreadsheet_cell).collect())
        .collect();

    Ok(Table::new(columns, rows))
}

/// Spreadsheets store every number as a float; whole numbers come back as
/// integers the way a delimited load would see them.
fn spreadsheet_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Null,
        Data::String(s) if s.is_empty() => CellValue::Null,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Int(i) => CellValue::Integer(*i),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => {
            CellValue::Integer(*f as i64)
        }
        Data::Float(f) => CellValue::Float(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        other => CellValue::Text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Every top-level column becomes a table column, in schema order.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
fn load_parquet(bytes: &[u8]) -> Result<Table> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(Bytes::copy_from_slice(bytes))
        .context("reading parquet metadata")?;
    let columns: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut rows = Vec::new();
    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        for row in 0..batch.num_rows() {
            rows.push(
                batch
                    .columns()
                    .iter()
                    .map(|col| extract_cell(col, row))
                    .collect(),
            );
        }
    }

    Ok(Table::new(columns, rows))
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_cell(col: &Arc<dyn Array>, row: usize) -> CellValue {
    if col.is_null(row) {
        return CellValue::Null;
    }
    let any = col.as_any();
    let cell = match col.data_type() {
        DataType::Utf8 => any
            .downcast_ref::<StringArray>()
            .map(|s| CellValue::Text(s.value(row).to_string())),
        DataType::LargeUtf8 => Some(CellValue::Text(col.as_string::<i64>().value(row).to_string())),
        DataType::Int32 => any
            .downcast_ref::<Int32Array>()
            .map(|a| CellValue::Integer(a.value(row) as i64)),
        DataType::Int64 => any
            .downcast_ref::<Int64Array>()
            .map(|a| CellValue::Integer(a.value(row))),
        DataType::Float32 => any
            .downcast_ref::<Float32Array>()
            .map(|a| CellValue::Float(a.value(row) as f64)),
        DataType::Float64 => any
            .downcast_ref::<Float64Array>()
            .map(|a| CellValue::Float(a.value(row))),
        DataType::Boolean => any
            .downcast_ref::<BooleanArray>()
            .map(|a| CellValue::Bool(a.value(row))),
        _ => None,
    };
    cell.unwrap_or_else(|| CellValue::Text(format!("{:?}", col.data_type())))
}

#[cfg(test)]
mod tests {
    use super::*;

    use arrow::datatypes::{Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;

    const BANK_CSV: &str = "\
age;job;marital;y
30;admin;married;no
45;blue-collar;single;yes
;technician;;no
";

    #[test]
    fn semicolon_text_with_inferred_types() {
        let t = load_bytes("bank.csv", BANK_CSV.as_bytes(), &LoadOptions::default()).unwrap();
        assert_eq!(t.columns, ["age", "job", "marital", "y"]);
        assert_eq!(t.len(), 3);
        assert_eq!(t.rows[0][0], CellValue::Integer(30));
        assert_eq!(t.rows[1][1], CellValue::from("blue-collar"));
        assert_eq!(t.rows[2][0], CellValue::Null);
        assert_eq!(t.rows[2][2], CellValue::Null);
    }

    #[test]
    fn extension_does_not_bypass_text_attempt() {
        let t = load_bytes("bank.xlsx", BANK_CSV.as_bytes(), &LoadOptions::default()).unwrap();
        assert_eq!(t.len(), 3);
    }

    #[test]
    fn custom_delimiter() {
        let text = BANK_CSV.replace(';', ",");
        let options = LoadOptions { delimiter: b',' };
        let t = load_bytes("bank.csv", text.as_bytes(), &options).unwrap();
        assert_eq!(t.columns.len(), 4);
    }

    #[test]
    fn garbage_fails_with_both_causes() {
        let junk = [0xffu8, 0xfe, 0x00, 0x13, 0x88, 0x0a, 0xc3, 0x28];
        let err = load_bytes("upload.bin", &junk, &LoadOptions::default()).unwrap_err();
        let msg = format!("{err:#}");
        assert!(msg.contains("not delimited text"), "{msg}");
        assert!(msg.contains("not a spreadsheet"), "{msg}");
    }

    #[test]
    fn empty_upload_is_rejected() {
        assert!(load_bytes("empty.csv", b"", &LoadOptions::default()).is_err());
    }

    #[test]
    fn ragged_rows_are_rejected_as_text() {
        let text = "a;b\n1;2;3\n";
        assert!(load_bytes("bad.csv", text.as_bytes(), &LoadOptions::default()).is_err());
    }

    #[test]
    fn parquet_by_extension() {
        let schema = Arc::new(Schema::new(vec![
            Field::new("age", DataType::Int64, true),
            Field::new("job", DataType::Utf8, false),
            Field::new("duration", DataType::Float64, false),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(Int64Array::from(vec![Some(30), None])),
                Arc::new(StringArray::from(vec!["admin", "services"])),
                Arc::new(Float64Array::from(vec![12.5, 300.0])),
            ],
        )
        .unwrap();

        let mut buf = Vec::new();
        let mut writer = ArrowWriter::try_new(&mut buf, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let t = load_bytes("bank.parquet", &buf, &LoadOptions::default()).unwrap();
        assert_eq!(t.columns, ["age", "job", "duration"]);
        assert_eq!(
            t.rows[1],
            vec![CellValue::Null, "services".into(), CellValue::Float(300.0)]
        );
    }

    #[test]
    fn load_file_reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bank-additional.csv");
        std::fs::write(&path, BANK_CSV).unwrap();

        let t = load_file(&path, &LoadOptions::default()).unwrap();
        assert_eq!(t.len(), 3);
        assert!(load_file(&dir.path().join("missing.csv"), &LoadOptions::default()).is_err());
    }
}
