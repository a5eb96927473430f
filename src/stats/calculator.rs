//! Statistics Calculator Module
//! Summary metrics over the per-date pivot rows.

use crate::pivot::PivotTable;

/// Headline numbers shown above the pivot table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SummaryStats {
    /// Grand total of the Total column.
    pub total_orders: u64,
    /// Number of distinct picked dates represented.
    pub unique_dates: usize,
    /// Mean of the per-date totals, rounded to one decimal place.
    pub avg_orders_per_day: f64,
}

/// Computes the summary metrics. Only the per-date rows feed these numbers;
/// the Grand Total display row never does.
pub struct StatsCalculator;

impl StatsCalculator {
    pub fn summarize(pivot: &PivotTable) -> SummaryStats {
        let total_orders: u64 = pivot.totals.iter().map(|t| u64::from(*t)).sum();
        let unique_dates = pivot.dates.len();
        let avg_orders_per_day = if unique_dates == 0 {
            0.0
        } else {
            round1(total_orders as f64 / unique_dates as f64)
        };

        SummaryStats {
            total_orders,
            unique_dates,
            avg_orders_per_day,
        }
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    /// Three dates with totals 4, 1 and 2: mean 7/3 rounds to 2.3.
    fn sample_pivot() -> PivotTable {
        let mut counts = vec![vec![0u32; crate::pivot::STATUS_VOCABULARY.len()]; 3];
        counts[0][0] = 3;
        counts[0][4] = 1;
        counts[1][4] = 1;
        counts[2][1] = 2;

        PivotTable {
            dates: vec![date("2024-02-01"), date("2024-02-02"), date("2024-02-04")],
            counts,
            totals: vec![4, 1, 2],
            grand_counts: {
                let mut g = vec![0u32; crate::pivot::STATUS_VOCABULARY.len()];
                g[0] = 3;
                g[1] = 2;
                g[4] = 2;
                g
            },
            grand_total: 7,
        }
    }

    #[test]
    fn summary_counts_orders_and_dates() {
        let stats = StatsCalculator::summarize(&sample_pivot());
        assert_eq!(stats.total_orders, 7);
        assert_eq!(stats.unique_dates, 3);
    }

    #[test]
    fn mean_orders_per_day_rounds_to_one_decimal() {
        let stats = StatsCalculator::summarize(&sample_pivot());
        assert!((stats.avg_orders_per_day - 2.3).abs() < 1e-9);
    }

    #[test]
    fn empty_pivot_has_zero_mean() {
        let pivot = PivotTable {
            dates: Vec::new(),
            counts: Vec::new(),
            totals: Vec::new(),
            grand_counts: vec![0; crate::pivot::STATUS_VOCABULARY.len()],
            grand_total: 0,
        };
        let stats = StatsCalculator::summarize(&pivot);
        assert_eq!(stats.total_orders, 0);
        assert_eq!(stats.unique_dates, 0);
        assert_eq!(stats.avg_orders_per_day, 0.0);
    }
}
