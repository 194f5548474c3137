//! Daily transaction and fraud counts for the chart on the transactions page.

use std::collections::BTreeMap;

use serde::Serialize;
use time::{Date, macros::format_description};

use crate::feed::normalize::FeedRow;

/// Per-day counts in ascending date order.
///
/// The three vectors always have the same length. Days without a transaction
/// ID are left out.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DailySeries {
    /// Dates formatted as `YYYY-MM-DD`.
    pub labels: Vec<String>,
    /// The number of transactions on each day.
    pub totals: Vec<u64>,
    /// The number of fraud transactions on each day.
    pub frauds: Vec<u64>,
}

#[derive(Default)]
struct DayCounts {
    total: u64,
    fraud: u64,
}

/// Count transactions and fraud per calendar day.
///
/// Only rows with a transaction ID count towards the daily total.
pub fn daily_counts(rows: &[FeedRow]) -> DailySeries {
    let mut days: BTreeMap<Date, DayCounts> = BTreeMap::new();

    for row in rows {
        let counts = days.entry(row.transaction_timestamp.date()).or_default();

        if !row.transaction_id.is_empty() {
            counts.total += 1;
        }

        if row.fraud_label {
            counts.fraud += 1;
        }
    }

    let mut series = DailySeries::default();

    for (date, counts) in days {
        if counts.total == 0 {
            continue;
        }

        series.labels.push(format_label(date));
        series.totals.push(counts.total);
        series.frauds.push(counts.fraud);
    }

    series
}

fn format_label(date: Date) -> String {
    date.format(format_description!("[year]-[month]-[day]"))
        .unwrap_or_else(|_| date.to_string())
}

#[cfg(test)]
mod tests {
    use time::{PrimitiveDateTime, macros::datetime};

    use crate::feed::normalize::FeedRow;

    use super::{DailySeries, daily_counts};

    fn row(id: &str, timestamp: PrimitiveDateTime, fraud: bool) -> FeedRow {
        FeedRow {
            transaction_id: id.to_owned(),
            customer_id: "C1".to_owned(),
            transaction_timestamp: timestamp,
            transaction_amount: None,
            fraud_label: fraud,
            passthrough: vec![],
        }
    }

    #[test]
    fn counts_per_day_in_ascending_order() {
        let rows = vec![
            row("T3", datetime!(2024-01-02 09:00), true),
            row("T2", datetime!(2024-01-01 18:00), false),
            row("T1", datetime!(2024-01-01 10:00), true),
        ];

        let got = daily_counts(&rows);

        assert_eq!(
            got,
            DailySeries {
                labels: vec!["2024-01-01".to_owned(), "2024-01-02".to_owned()],
                totals: vec![2, 1],
                frauds: vec![1, 1],
            }
        );
    }

    #[test]
    fn skips_days_without_rows() {
        let rows = vec![
            row("T1", datetime!(2024-01-01 10:00), false),
            row("T2", datetime!(2024-01-05 10:00), false),
        ];

        let got = daily_counts(&rows);

        assert_eq!(got.labels, vec!["2024-01-01", "2024-01-05"]);
    }

    #[test]
    fn rows_without_id_only_count_as_fraud() {
        let rows = vec![
            row("", datetime!(2024-01-01 10:00), true),
            row("T2", datetime!(2024-01-01 11:00), false),
        ];

        let got = daily_counts(&rows);

        assert_eq!(got.totals, vec![1]);
        assert_eq!(got.frauds, vec![1]);
    }

    #[test]
    fn skips_days_with_only_rows_without_id() {
        let rows = vec![
            row("", datetime!(2024-01-01 10:00), true),
            row("", datetime!(2024-01-01 12:00), true),
            row("T2", datetime!(2024-01-02 10:00), false),
        ];

        let got = daily_counts(&rows);

        assert_eq!(
            got,
            DailySeries {
                labels: vec!["2024-01-02".to_owned()],
                totals: vec![1],
                frauds: vec![0],
            }
        );
    }

    #[test]
    fn empty_input_gives_empty_series() {
        assert_eq!(daily_counts(&[]), DailySeries::default());
    }
}
