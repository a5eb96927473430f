//! CSV Data Loader Module
//! Handles delivery-order CSV loading, date normalization and caching using Polars.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use polars::prelude::*;
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Column holding the order identifier used as the count measure.
pub const ORDER_NUMBER_COL: &str = "Order Number";
/// Column holding the delivery facility name.
pub const HUB_COL: &str = "Delivery Hub";
/// Column holding the delivery lifecycle status.
pub const STATUS_COL: &str = "Status";
/// Timestamp column the picked date is derived from.
pub const PICKED_ON_COL: &str = "Picked on";
/// Derived calendar-date column, added by the loader.
pub const PICKED_DATE_COL: &str = "Picked Date";

/// Lifecycle timestamp columns coerced to normalized timestamps when present.
pub const DATE_COLUMNS: [&str; 12] = [
    "Picked on",
    "First attempted on",
    "Last attempted on",
    "First Out-For-Delivery on",
    "Latest Out-For-Delivery on",
    "Returned Datetime on",
    "Delivered on",
    "First Delivery Unable-To",
    "Last Delivery Unable-To",
    "RTO on",
    "Date Placed",
    "Expected delivery",
];

/// Normalized timestamp rendering after coercion.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
/// Rendering of the derived picked-date column.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

// Accepted input formats, tried in order: ISO first, then day-first,
// then month-first. First match wins.
const DATETIME_FORMATS: [&str; 7] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%d-%m-%Y %H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%m/%d/%Y %H:%M:%S",
];
const DATE_ONLY_FORMATS: [&str; 4] = ["%Y-%m-%d", "%d-%m-%Y", "%d/%m/%Y", "%m/%d/%Y"];

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to load CSV: {0}")]
    CsvError(#[from] PolarsError),
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("No data loaded")]
    NoData,
}

/// Parse a raw cell into a timestamp, tolerating the formats delivery
/// exports actually contain. Returns `None` for anything unparsable.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(ts);
        }
    }
    for fmt in DATE_ONLY_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d.and_time(NaiveTime::MIN));
        }
    }
    None
}

/// Render an `AnyValue` as plain text, or `None` for null cells.
pub fn cell_text(value: &AnyValue) -> Option<String> {
    if value.is_null() {
        None
    } else {
        Some(value.to_string().trim_matches('"').to_string())
    }
}

/// Handles CSV file loading with Polars, keyed by a fingerprint of the raw
/// bytes so identical uploads are parsed once.
pub struct DataLoader {
    df: Option<DataFrame>,
    file_path: Option<PathBuf>,
    cache: HashMap<u64, DataFrame>,
}

impl Default for DataLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl DataLoader {
    pub fn new() -> Self {
        Self {
            df: None,
            file_path: None,
            cache: HashMap::new(),
        }
    }

    /// Load a CSV file, consulting the content-addressed cache first.
    pub fn load_csv(&mut self, file_path: &Path) -> Result<&DataFrame, LoaderError> {
        let bytes = std::fs::read(file_path)?;
        let df = self.load_cached(&bytes)?;

        self.file_path = Some(file_path.to_path_buf());
        self.df = Some(df);
        self.df.as_ref().ok_or(LoaderError::NoData)
    }

    /// Return the parsed table for these bytes, parsing only on cache miss.
    fn load_cached(&mut self, bytes: &[u8]) -> Result<DataFrame, LoaderError> {
        let key = fingerprint(bytes);
        if let Some(df) = self.cache.get(&key) {
            return Ok(df.clone());
        }
        let df = Self::load_bytes(bytes)?;
        self.cache.insert(key, df.clone());
        Ok(df)
    }

    /// Parse raw CSV bytes into an order table: schema inferred, lifecycle
    /// timestamp columns normalized cell by cell, picked date derived.
    /// Pure function of the input content.
    pub fn load_bytes(bytes: &[u8]) -> Result<DataFrame, LoaderError> {
        let mut df = CsvReadOptions::default()
            .with_infer_schema_length(Some(10000))
            .with_ignore_errors(true)
            .into_reader_with_file_handle(Cursor::new(bytes))
            .finish()?;

        Self::coerce_date_columns(&mut df)?;
        Self::derive_picked_date(&mut df)?;
        Ok(df)
    }

    /// Reinterpret every known date column as timestamps. Cells that fail to
    /// parse become null; the row itself survives.
    fn coerce_date_columns(df: &mut DataFrame) -> Result<(), LoaderError> {
        let names: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();

        for date_col in DATE_COLUMNS {
            if !names.iter().any(|n| n == date_col) {
                continue;
            }
            let column = df.column(date_col)?;
            let mut normalized: Vec<Option<String>> = Vec::with_capacity(column.len());
            for i in 0..column.len() {
                let parsed = column
                    .get(i)
                    .ok()
                    .and_then(|v| cell_text(&v))
                    .and_then(|text| parse_timestamp(&text));
                normalized.push(parsed.map(|ts| ts.format(TIMESTAMP_FORMAT).to_string()));
            }
            df.with_column(Column::new(date_col.into(), normalized))?;
        }
        Ok(())
    }

    /// Add the derived picked-date column (date portion of `Picked on`).
    /// Skipped when `Picked on` is absent; the aggregation stage reports the
    /// missing schema in that case.
    fn derive_picked_date(df: &mut DataFrame) -> Result<(), LoaderError> {
        let has_picked_on = df
            .get_column_names()
            .iter()
            .any(|n| n.as_str() == PICKED_ON_COL);
        if !has_picked_on {
            return Ok(());
        }

        let column = df.column(PICKED_ON_COL)?;
        let mut dates: Vec<Option<String>> = Vec::with_capacity(column.len());
        for i in 0..column.len() {
            let date = column
                .get(i)
                .ok()
                .and_then(|v| cell_text(&v))
                .and_then(|text| parse_timestamp(&text))
                .map(|ts| ts.date().format(DATE_FORMAT).to_string());
            dates.push(date);
        }
        df.with_column(Column::new(PICKED_DATE_COL.into(), dates))?;
        Ok(())
    }

    /// Get list of column names from loaded DataFrame.
    pub fn get_columns(&self) -> Vec<String> {
        self.df
            .as_ref()
            .map(|df| {
                df.get_column_names()
                    .iter()
                    .map(|s| s.to_string())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Get the number of rows in the DataFrame.
    pub fn get_row_count(&self) -> usize {
        self.df.as_ref().map(|df| df.height()).unwrap_or(0)
    }

    /// Get a reference to the loaded DataFrame.
    pub fn get_dataframe(&self) -> Option<&DataFrame> {
        self.df.as_ref()
    }

    /// Get file path.
    #[allow(dead_code)]
    pub fn get_file_path(&self) -> Option<&PathBuf> {
        self.file_path.as_ref()
    }
}

fn fingerprint(bytes: &[u8]) -> u64 {
    let mut hasher = DefaultHasher::new();
    bytes.hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_CSV: &[u8] = b"Order Number,Delivery Hub,Status,Picked on\n\
ORD-1,North,Picked,2024-01-01 10:30:00\n\
ORD-2,South,Assigned,not-a-date\n\
ORD-3,North,At-Hub,\n";

    #[test]
    fn load_bytes_parses_rows_and_columns() {
        let df = DataLoader::load_bytes(SAMPLE_CSV).unwrap();
        assert_eq!(df.height(), 3);
        let names: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert!(names.iter().any(|n| n == ORDER_NUMBER_COL));
        assert!(names.iter().any(|n| n == PICKED_DATE_COL));
    }

    #[test]
    fn unparsable_date_cell_becomes_null() {
        let df = DataLoader::load_bytes(SAMPLE_CSV).unwrap();
        let picked = df.column(PICKED_ON_COL).unwrap();
        assert_eq!(
            cell_text(&picked.get(0).unwrap()),
            Some("2024-01-01 10:30:00".to_string())
        );
        assert!(picked.get(1).unwrap().is_null());
        assert!(picked.get(2).unwrap().is_null());
    }

    #[test]
    fn picked_date_derived_from_timestamp() {
        let df = DataLoader::load_bytes(SAMPLE_CSV).unwrap();
        let dates = df.column(PICKED_DATE_COL).unwrap();
        assert_eq!(
            cell_text(&dates.get(0).unwrap()),
            Some("2024-01-01".to_string())
        );
        assert!(dates.get(1).unwrap().is_null());
    }

    #[test]
    fn picked_date_skipped_when_source_column_absent() {
        let df = DataLoader::load_bytes(b"Order Number,Status\nORD-1,Picked\n").unwrap();
        assert!(df.column(PICKED_DATE_COL).is_err());
    }

    #[test]
    fn parse_timestamp_accepts_common_formats() {
        assert!(parse_timestamp("2024-01-05 08:00:00").is_some());
        assert!(parse_timestamp("2024-01-05T08:00:00").is_some());
        assert!(parse_timestamp("05/01/2024 08:00").is_some());
        assert!(parse_timestamp("2024-01-05").is_some());
        assert!(parse_timestamp("").is_none());
        assert!(parse_timestamp("soon").is_none());
    }

    #[test]
    fn identical_bytes_hit_the_cache() {
        let mut loader = DataLoader::new();
        loader.load_cached(SAMPLE_CSV).unwrap();
        loader.load_cached(SAMPLE_CSV).unwrap();
        assert_eq!(loader.cache.len(), 1);

        loader
            .load_cached(b"Order Number,Status\nORD-9,Picked\n")
            .unwrap();
        assert_eq!(loader.cache.len(), 2);
    }

    #[test]
    fn empty_input_is_an_ingestion_error() {
        assert!(DataLoader::load_bytes(b"").is_err());
    }
}
