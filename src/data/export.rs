use rust_xlsxwriter::{DocProperties, ExcelDateTime, Workbook};

use super::error::DataError;
use super::model::{CellValue, Table};

/// Sheet name used for spreadsheet exports.
pub const SHEET_NAME: &str = "Sheet1";

// ---------------------------------------------------------------------------
// Delimited text
// ---------------------------------------------------------------------------

/// Encode `table` as UTF-8 delimited text with a header row and no index.
///
/// Fields carry no type tag, so a re-load infers types again: a text cell
/// that reads as a number or boolean (`"007"`, `"true"`) comes back as
/// `Integer(7)` or `Bool(true)`. Tables loaded from delimited text always
/// round-trip, since their cells were inferred the same way.
pub fn to_delimited_bytes(table: &Table, delimiter: u8) -> Result<Vec<u8>, DataError> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(Vec::new());

    writer.write_record(&table.columns)?;
    for row in &table.rows {
        writer.write_record(row.iter().map(CellValue::to_field))?;
    }

    writer
        .into_inner()
        .map_err(|e| DataError::Delimited(e.into_error().into()))
}

// ---------------------------------------------------------------------------
// Spreadsheet
// ---------------------------------------------------------------------------

/// Encode `table` as an `.xlsx` workbook: one sheet, header row, no index.
///
/// The document creation time is pinned so repeated calls are byte-identical.
pub fn to_spreadsheet_bytes(table: &Table) -> Result<Vec<u8>, DataError> {
    let mut workbook = Workbook::new();
    let created = ExcelDateTime::from_ymd(2000, 1, 1)?;
    workbook.set_properties(&DocProperties::new().set_creation_datetime(&created));

    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;

    for (col, name) in table.columns.iter().enumerate() {
        sheet.write_string(0, col as u16, name.as_str())?;
    }

    for (r, row) in table.rows.iter().enumerate() {
        let r = r as u32 + 1;
        for (col, cell) in row.iter().enumerate() {
            let col = col as u16;
            match cell {
                CellValue::Text(s) => {
                    sheet.write_string(r, col, s.as_str())?;
                }
                CellValue::Integer(i) => {
                    sheet.write_number(r, col, *i as f64)?;
                }
                CellValue::Float(v) => {
                    sheet.write_number(r, col, *v)?;
                }
                CellValue::Bool(b) => {
                    sheet.write_boolean(r, col, *b)?;
                }
                CellValue::Null => {}
            }
        }
    }

    Ok(workbook.save_to_buffer()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::{load_bytes, LoadOptions};

    fn table() -> Table {
        Table::new(
            vec!["age".into(), "job".into(), "balance".into(), "y".into()],
            vec![
                vec![CellValue::Integer(30), "admin".into(), CellValue::Float(1.5), "no".into()],
                vec![CellValue::Integer(45), "blue-collar".into(), CellValue::Null, "yes".into()],
                vec![CellValue::Integer(52), "retired".into(), CellValue::Float(-20.0), "no".into()],
            ],
        )
    }

    #[test]
    fn delimited_round_trip() {
        let t = table();
        let bytes = to_delimited_bytes(&t, b';').unwrap();
        let text = String::from_utf8(bytes.clone()).unwrap();
        assert!(text.starts_with("age;job;balance;y\n30;admin;1.5;no\n"));

        let back = load_bytes("filtered_data.csv", &bytes, &LoadOptions::default()).unwrap();
        assert_eq!(back, t);
    }

    #[test]
    fn numeric_looking_text_is_reinferred() {
        let t = Table::new(
            vec!["code".into(), "flag".into()],
            vec![vec!["007".into(), "true".into()]],
        );
        let bytes = to_delimited_bytes(&t, b';').unwrap();
        assert_eq!(bytes, b"code;flag\n007;true\n");

        let back = load_bytes("codes.csv", &bytes, &LoadOptions::default()).unwrap();
        assert_eq!(back.rows[0], vec![CellValue::Integer(7), CellValue::Bool(true)]);

        let again = to_delimited_bytes(&back, b';').unwrap();
        assert_eq!(load_bytes("codes.csv", &again, &LoadOptions::default()).unwrap(), back);
    }

    #[test]
    fn empty_table_exports_header_only() {
        let t = table().empty_like();
        let bytes = to_delimited_bytes(&t, b';').unwrap();
        assert_eq!(bytes, b"age;job;balance;y\n");

        let back = load_bytes("empty.csv", &bytes, &LoadOptions::default()).unwrap();
        assert_eq!(back, t);
    }

    #[test]
    fn exports_are_deterministic() {
        let t = table();
        assert_eq!(to_delimited_bytes(&t, b';').unwrap(), to_delimited_bytes(&t, b';').unwrap());
        assert_eq!(to_spreadsheet_bytes(&t).unwrap(), to_spreadsheet_bytes(&t).unwrap());
    }

    #[test]
    fn spreadsheet_reloads_through_fallback() {
        let t = table();
        let bytes = to_spreadsheet_bytes(&t).unwrap();
        assert_eq!(&bytes[..2], b"PK");

        let back = load_bytes("filtered_data.xlsx", &bytes, &LoadOptions::default()).unwrap();
        assert_eq!(back.columns, t.columns);
        assert_eq!(back.len(), 3);
        assert_eq!(back.rows[1][1], CellValue::from("blue-collar"));
        assert_eq!(back.rows[1][2], CellValue::Null);
        assert_eq!(back.rows[2][2].as_f64(), Some(-20.0));
    }
}
