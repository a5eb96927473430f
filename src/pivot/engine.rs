//! Pivot Engine Module
//! Cross-tabulates eligible order records into a dense date × status count
//! matrix over the fixed status vocabulary.

use crate::data::loader::{cell_text, ORDER_NUMBER_COL, PICKED_DATE_COL, STATUS_COL};
use crate::data::parse_picked_date;
use chrono::NaiveDate;
use polars::prelude::*;
use std::collections::BTreeMap;
use thiserror::Error;

/// The closed set of recognized delivery statuses, in display order.
/// Rows carrying any other status never reach the pivot.
pub const STATUS_VOCABULARY: [&str; 8] = [
    "Assigned",
    "At-Hub",
    "Moving-To-Hub",
    "Out-For-Delivery",
    "Picked",
    "Returned",
    "Returned-To-Hub",
    "Unable-To-Deliver",
];

/// Header of the row-wise sum column.
pub const TOTAL_LABEL: &str = "Total";
/// Label of the synthetic column-wise sum row shown under the per-date rows.
pub const GRAND_TOTAL_LABEL: &str = "Grand Total";

#[derive(Error, Debug)]
pub enum PivotError {
    #[error(
        "missing required column '{0}' — the input needs 'Order Number', 'Status' and 'Picked on'"
    )]
    MissingColumn(&'static str),
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
}

/// The dense pivot: one row per distinct picked date, one column per
/// vocabulary status, zero-filled where a combination never occurs.
///
/// The grand-total fields summarize the per-date rows for display; they are
/// never part of the per-date matrix itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PivotTable {
    /// Distinct picked dates of the aggregated records, ascending.
    pub dates: Vec<NaiveDate>,
    /// Count matrix, `dates.len()` rows × `STATUS_VOCABULARY.len()` columns.
    pub counts: Vec<Vec<u32>>,
    /// Row-wise sums over the vocabulary columns.
    pub totals: Vec<u32>,
    /// Column-wise sums per status, for the Grand Total row.
    pub grand_counts: Vec<u32>,
    /// Sum of all per-date totals, for the Grand Total row's Total cell.
    pub grand_total: u32,
}

impl PivotTable {
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Largest per-date cell count, used to scale the display emphasis.
    pub fn max_cell(&self) -> u32 {
        self.counts
            .iter()
            .flat_map(|row| row.iter().copied())
            .max()
            .unwrap_or(0)
    }
}

fn status_index(status: &str) -> Option<usize> {
    STATUS_VOCABULARY.iter().position(|s| *s == status)
}

fn require_column(df: &DataFrame, name: &'static str) -> Result<(), PivotError> {
    if df.get_column_names().iter().any(|n| n.as_str() == name) {
        Ok(())
    } else {
        Err(PivotError::MissingColumn(name))
    }
}

/// Restrict the filtered rows to the set that feeds the pivot: status inside
/// the vocabulary and a non-null picked date. This is the row set the
/// secondary table shows and the CSV export serializes.
pub fn eligible_records(df: &DataFrame) -> Result<DataFrame, PivotError> {
    require_column(df, STATUS_COL)?;
    require_column(df, ORDER_NUMBER_COL)?;
    require_column(df, PICKED_DATE_COL)?;

    let status_col = df.column(STATUS_COL)?;
    let date_col = df.column(PICKED_DATE_COL)?;

    let mut mask = Vec::with_capacity(df.height());
    for i in 0..df.height() {
        let in_vocabulary = status_col
            .get(i)
            .ok()
            .and_then(|v| cell_text(&v))
            .map(|status| status_index(&status).is_some())
            .unwrap_or(false);
        let has_date = date_col
            .get(i)
            .ok()
            .map(|v| !v.is_null())
            .unwrap_or(false);
        mask.push(in_vocabulary && has_date);
    }

    let mask = BooleanChunked::from_slice("mask".into(), &mask);
    Ok(df.filter(&mask)?)
}

/// Group the eligible records by picked date, count per status, and
/// materialize the dense matrix over the fixed vocabulary.
pub fn build_pivot(records: &DataFrame) -> Result<PivotTable, PivotError> {
    require_column(records, STATUS_COL)?;
    require_column(records, ORDER_NUMBER_COL)?;
    require_column(records, PICKED_DATE_COL)?;

    let status_col = records.column(STATUS_COL)?;
    let date_col = records.column(PICKED_DATE_COL)?;

    let mut buckets: BTreeMap<NaiveDate, Vec<u32>> = BTreeMap::new();
    for i in 0..records.height() {
        let Some(date) = date_col
            .get(i)
            .ok()
            .and_then(|v| cell_text(&v))
            .and_then(|text| parse_picked_date(&text))
        else {
            continue;
        };
        let Some(idx) = status_col
            .get(i)
            .ok()
            .and_then(|v| cell_text(&v))
            .and_then(|status| status_index(&status))
        else {
            continue;
        };

        buckets
            .entry(date)
            .or_insert_with(|| vec![0; STATUS_VOCABULARY.len()])[idx] += 1;
    }

    let mut dates = Vec::with_capacity(buckets.len());
    let mut counts = Vec::with_capacity(buckets.len());
    let mut totals = Vec::with_capacity(buckets.len());
    let mut grand_counts = vec![0u32; STATUS_VOCABULARY.len()];
    let mut grand_total = 0u32;

    for (date, row) in buckets {
        let total: u32 = row.iter().sum();
        for (col, count) in row.iter().enumerate() {
            grand_counts[col] += count;
        }
        grand_total += total;
        dates.push(date);
        counts.push(row);
        totals.push(total);
    }

    Ok(PivotTable {
        dates,
        counts,
        totals,
        grand_counts,
        grand_total,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::HUB_COL;

    fn str_col(name: &str, values: &[Option<&str>]) -> Column {
        let values: Vec<Option<String>> = values.iter().map(|v| v.map(str::to_string)).collect();
        Column::new(name.into(), values)
    }

    /// The worked example: two Picked rows on different dates plus one row
    /// whose status is outside the vocabulary.
    fn example_records() -> DataFrame {
        DataFrame::new(vec![
            str_col(ORDER_NUMBER_COL, &[Some("O-1"), Some("O-2"), Some("O-3")]),
            str_col(HUB_COL, &[Some("North"), Some("North"), Some("South")]),
            str_col(STATUS_COL, &[Some("Picked"), Some("Delivered"), Some("Picked")]),
            str_col(
                PICKED_DATE_COL,
                &[Some("2024-01-01"), Some("2024-01-01"), Some("2024-01-02")],
            ),
        ])
        .unwrap()
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn out_of_vocabulary_statuses_are_excluded_before_pivoting() {
        let eligible = eligible_records(&example_records()).unwrap();
        assert_eq!(eligible.height(), 2);
    }

    #[test]
    fn rows_without_picked_date_are_not_eligible() {
        let df = DataFrame::new(vec![
            str_col(ORDER_NUMBER_COL, &[Some("O-1"), Some("O-2")]),
            str_col(STATUS_COL, &[Some("Picked"), Some("Picked")]),
            str_col(PICKED_DATE_COL, &[Some("2024-01-01"), None]),
        ])
        .unwrap();
        let eligible = eligible_records(&df).unwrap();
        assert_eq!(eligible.height(), 1);
    }

    #[test]
    fn missing_required_column_is_a_schema_error() {
        let df = DataFrame::new(vec![
            str_col(ORDER_NUMBER_COL, &[Some("O-1")]),
            str_col(STATUS_COL, &[Some("Picked")]),
        ])
        .unwrap();
        match eligible_records(&df) {
            Err(PivotError::MissingColumn(name)) => assert_eq!(name, PICKED_DATE_COL),
            other => panic!("expected schema error, got {:?}", other.map(|df| df.height())),
        }
    }

    #[test]
    fn pivot_matches_the_worked_example() {
        let eligible = eligible_records(&example_records()).unwrap();
        let pivot = build_pivot(&eligible).unwrap();

        assert_eq!(pivot.dates, vec![date("2024-01-01"), date("2024-01-02")]);

        let picked = STATUS_VOCABULARY.iter().position(|s| *s == "Picked").unwrap();
        for (row, total) in pivot.counts.iter().zip(&pivot.totals) {
            assert_eq!(row.len(), STATUS_VOCABULARY.len());
            assert_eq!(row[picked], 1);
            assert_eq!(*total, 1);
            // Every other vocabulary column is zero-filled.
            let rest: u32 = row
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != picked)
                .map(|(_, c)| *c)
                .sum();
            assert_eq!(rest, 0);
        }
    }

    #[test]
    fn row_totals_and_grand_totals_are_column_sums() {
        let df = DataFrame::new(vec![
            str_col(
                ORDER_NUMBER_COL,
                &[Some("O-1"), Some("O-2"), Some("O-3"), Some("O-4"), Some("O-5")],
            ),
            str_col(
                STATUS_COL,
                &[
                    Some("Picked"),
                    Some("Assigned"),
                    Some("Picked"),
                    Some("At-Hub"),
                    Some("Picked"),
                ],
            ),
            str_col(
                PICKED_DATE_COL,
                &[
                    Some("2024-03-01"),
                    Some("2024-03-01"),
                    Some("2024-03-02"),
                    Some("2024-03-02"),
                    Some("2024-03-02"),
                ],
            ),
        ])
        .unwrap();

        let pivot = build_pivot(&eligible_records(&df).unwrap()).unwrap();
        assert_eq!(pivot.totals, vec![2, 3]);
        assert_eq!(pivot.grand_total, 5);
        for row in &pivot.counts {
            assert_eq!(row.len(), STATUS_VOCABULARY.len());
        }

        let summed: u32 = pivot.grand_counts.iter().sum();
        assert_eq!(summed, pivot.grand_total);
        assert_eq!(
            pivot.grand_total,
            pivot.totals.iter().sum::<u32>()
        );
    }

    #[test]
    fn aggregation_is_idempotent_over_the_filtered_rows() {
        let eligible = eligible_records(&example_records()).unwrap();
        let first = build_pivot(&eligible).unwrap();
        let second = build_pivot(&eligible).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn empty_record_set_yields_an_empty_pivot() {
        let df = DataFrame::new(vec![
            str_col(ORDER_NUMBER_COL, &[]),
            str_col(STATUS_COL, &[]),
            str_col(PICKED_DATE_COL, &[]),
        ])
        .unwrap();
        let pivot = build_pivot(&df).unwrap();
        assert!(pivot.is_empty());
        assert_eq!(pivot.grand_total, 0);
        assert_eq!(pivot.max_cell(), 0);
    }
}
