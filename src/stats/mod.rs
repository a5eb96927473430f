//! Stats module - summary metrics

mod calculator;

pub use calculator::{StatsCalculator, SummaryStats};
