//! CSV Export Module
//! Serializes the pivot record set back to CSV for download.

use polars::prelude::*;
use std::path::Path;
use thiserror::Error;

/// Default name offered in the save dialog.
pub const EXPORT_FILE_NAME: &str = "pivot_records_data.csv";

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Failed to serialize CSV: {0}")]
    CsvError(#[from] PolarsError),
    #[error("Failed to write file: {0}")]
    IoError(#[from] std::io::Error),
}

/// Serialize the frame as UTF-8 CSV with a header row, one line per record.
pub fn to_csv_bytes(df: &DataFrame) -> Result<Vec<u8>, ExportError> {
    let mut df = df.clone();
    let mut buffer = Vec::new();
    CsvWriter::new(&mut buffer)
        .include_header(true)
        .finish(&mut df)?;
    Ok(buffer)
}

/// Write the export to disk at the location the save dialog produced.
pub fn write_csv(df: &DataFrame, path: &Path) -> Result<(), ExportError> {
    let bytes = to_csv_bytes(df)?;
    std::fs::write(path, bytes)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::{
        cell_text, DataLoader, HUB_COL, ORDER_NUMBER_COL, PICKED_DATE_COL, PICKED_ON_COL,
        STATUS_COL,
    };

    fn str_col(name: &str, values: &[Option<&str>]) -> Column {
        let values: Vec<Option<String>> = values.iter().map(|v| v.map(str::to_string)).collect();
        Column::new(name.into(), values)
    }

    fn records() -> DataFrame {
        DataFrame::new(vec![
            str_col(ORDER_NUMBER_COL, &[Some("O-1"), Some("O-2")]),
            str_col(HUB_COL, &[Some("North"), Some("South")]),
            str_col(STATUS_COL, &[Some("Picked"), Some("Assigned")]),
            str_col(
                PICKED_ON_COL,
                &[Some("2024-01-01 10:30:00"), Some("2024-01-02 09:00:00")],
            ),
            str_col(PICKED_DATE_COL, &[Some("2024-01-01"), Some("2024-01-02")]),
        ])
        .unwrap()
    }

    #[test]
    fn export_has_header_and_one_line_per_record() {
        let bytes = to_csv_bytes(&records()).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains(ORDER_NUMBER_COL));
        assert!(lines[1].starts_with("O-1"));
    }

    #[test]
    fn export_round_trips_through_the_loader() {
        let original = records();
        let bytes = to_csv_bytes(&original).unwrap();
        let reloaded = DataLoader::load_bytes(&bytes).unwrap();

        assert_eq!(reloaded.height(), original.height());
        for name in [ORDER_NUMBER_COL, HUB_COL, STATUS_COL, PICKED_ON_COL, PICKED_DATE_COL] {
            let before = original.column(name).unwrap();
            let after = reloaded.column(name).unwrap();
            for i in 0..original.height() {
                assert_eq!(
                    cell_text(&before.get(i).unwrap()),
                    cell_text(&after.get(i).unwrap()),
                    "column {name} row {i} changed across the round trip"
                );
            }
        }
    }
}
