//! Narrowing the feed down to the rows the user asked for.

use time::{Date, Duration, PrimitiveDateTime, Time, macros::format_description};

use crate::feed::normalize::FeedRow;

/// The filters applied to the transaction feed.
///
/// Every filter is optional, and filters combine with a logical AND.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedFilter {
    /// Keep rows on or after the start of this day.
    pub from: Option<Date>,
    /// Keep rows on or before the end of this day.
    pub to: Option<Date>,
    /// Keep only rows labelled as fraud.
    pub fraud_only: bool,
    /// Lowercase text to look for in the transaction or customer ID.
    pub search: Option<String>,
}

/// Parse a date from a date input, e.g. `2024-01-31`.
pub fn parse_filter_date(raw: &str) -> Option<Date> {
    Date::parse(raw.trim(), format_description!("[year]-[month]-[day]")).ok()
}

impl FeedFilter {
    fn lower_bound(&self) -> Option<PrimitiveDateTime> {
        self.from.map(|date| PrimitiveDateTime::new(date, Time::MIDNIGHT))
    }

    /// The exclusive upper bound: midnight at the start of the day after `to`.
    fn upper_bound(&self) -> Option<PrimitiveDateTime> {
        self.to.map(|date| {
            date.checked_add(Duration::days(1))
                .map(|next_day| PrimitiveDateTime::new(next_day, Time::MIDNIGHT))
                .unwrap_or(PrimitiveDateTime::MAX)
        })
    }

    /// Whether `row` passes every filter.
    pub fn matches(&self, row: &FeedRow) -> bool {
        if let Some(lower_bound) = self.lower_bound()
            && row.transaction_timestamp < lower_bound
        {
            return false;
        }

        if let Some(upper_bound) = self.upper_bound()
            && row.transaction_timestamp >= upper_bound
        {
            return false;
        }

        if self.fraud_only && !row.fraud_label {
            return false;
        }

        match &self.search {
            Some(search) => {
                row.transaction_id.to_lowercase().contains(search.as_str())
                    || row.customer_id.to_lowercase().contains(search.as_str())
            }
            None => true,
        }
    }

    /// Keep the rows that pass every filter, preserving their order.
    pub fn apply(&self, rows: Vec<FeedRow>) -> Vec<FeedRow> {
        rows.into_iter().filter(|row| self.matches(row)).collect()
    }
}

/// Order rows from newest to oldest.
///
/// Rows with the same timestamp keep their original relative order.
pub fn sort_newest_first(rows: &mut [FeedRow]) {
    rows.sort_by(|a, b| b.transaction_timestamp.cmp(&a.transaction_timestamp));
}
