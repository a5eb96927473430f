//! Filter Stage Module
//! Restricts the order table by hub selection and picked-date range.

use crate::data::loader::{cell_text, DATE_FORMAT, HUB_COL, PICKED_DATE_COL};
use chrono::NaiveDate;
use polars::prelude::*;
use std::collections::BTreeSet;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FilterError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
}

/// Parse a picked-date cell rendered by the loader.
pub fn parse_picked_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text, DATE_FORMAT).ok()
}

/// Applies the hub and date-range predicates to the loaded table.
pub struct FilterStage;

impl FilterStage {
    /// Distinct non-null hub values across the table, sorted ascending.
    pub fn unique_hubs(df: &DataFrame) -> Vec<String> {
        df.column(HUB_COL)
            .ok()
            .and_then(|col| col.unique().ok())
            .map(|unique| {
                let series = unique.as_materialized_series();
                let mut hubs: Vec<String> = (0..series.len())
                    .filter_map(|i| {
                        let val = series.get(i).ok()?;
                        cell_text(&val)
                    })
                    .collect();
                hubs.sort();
                hubs
            })
            .unwrap_or_default()
    }

    /// Distinct non-null picked dates, sorted ascending. The UI takes the
    /// selectable range bounds from the first and last entry.
    pub fn unique_picked_dates(df: &DataFrame) -> Vec<NaiveDate> {
        let Ok(column) = df.column(PICKED_DATE_COL) else {
            return Vec::new();
        };

        let mut dates: BTreeSet<NaiveDate> = BTreeSet::new();
        for i in 0..column.len() {
            if let Some(date) = column
                .get(i)
                .ok()
                .and_then(|v| cell_text(&v))
                .and_then(|text| parse_picked_date(&text))
            {
                dates.insert(date);
            }
        }
        dates.into_iter().collect()
    }

    /// Keep rows matching both predicates, preserving input order.
    ///
    /// An empty hub selection applies no hub restriction. When a date range
    /// is given it is inclusive on both ends and rows without a picked date
    /// are dropped.
    pub fn apply(
        df: &DataFrame,
        hubs: &[String],
        range: Option<(NaiveDate, NaiveDate)>,
    ) -> Result<DataFrame, FilterError> {
        let mut mask = vec![true; df.height()];

        if !hubs.is_empty() {
            let hub_col = df.column(HUB_COL)?;
            for (i, keep) in mask.iter_mut().enumerate() {
                let member = hub_col
                    .get(i)
                    .ok()
                    .and_then(|v| cell_text(&v))
                    .map(|hub| hubs.iter().any(|h| *h == hub))
                    .unwrap_or(false);
                *keep = *keep && member;
            }
        }

        if let Some((start, end)) = range {
            let date_col = df.column(PICKED_DATE_COL)?;
            for (i, keep) in mask.iter_mut().enumerate() {
                let in_range = date_col
                    .get(i)
                    .ok()
                    .and_then(|v| cell_text(&v))
                    .and_then(|text| parse_picked_date(&text))
                    .map(|date| date >= start && date <= end)
                    .unwrap_or(false);
                *keep = *keep && in_range;
            }
        }

        let mask = BooleanChunked::from_slice("mask".into(), &mask);
        Ok(df.filter(&mask)?)
    }
}
