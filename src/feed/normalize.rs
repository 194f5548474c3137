//! Converts raw feed cells into typed values.

use time::{
    Date, OffsetDateTime, PrimitiveDateTime, Time, format_description::BorrowedFormatItem,
    macros::format_description,
};

use crate::feed::loader::{RawFeed, RawFeedRow};

/// A feed row with a valid timestamp and typed values.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedRow {
    pub transaction_id: String,
    pub customer_id: String,
    /// Whole seconds, UTC.
    pub transaction_timestamp: PrimitiveDateTime,
    /// The amount in major currency units, `None` when the feed value is not a number.
    pub transaction_amount: Option<f64>,
    pub fraud_label: bool,
    pub passthrough: Vec<String>,
}

/// The feed after normalization, rows that have no usable timestamp removed.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NormalizedFeed {
    pub passthrough_columns: Vec<String>,
    pub rows: Vec<FeedRow>,
}

// Day-first date shapes are tried before year-first ones.
const DATE_FORMATS: [&[BorrowedFormatItem<'static>]; 5] = [
    format_description!("[day padding:none]/[month padding:none]/[year]"),
    format_description!("[day padding:none]-[month padding:none]-[year]"),
    format_description!("[day padding:none].[month padding:none].[year]"),
    format_description!("[year]-[month padding:none]-[day padding:none]"),
    format_description!("[year]/[month padding:none]/[day padding:none]"),
];

const TIME_FORMAT: &[BorrowedFormatItem<'static>] = format_description!(
    "[hour padding:none]:[minute][optional [:[second][optional [.[subsecond]]]]]"
);

/// Parse a day-first date with an optional time of day.
///
/// For example `3/2/2024` is the 3rd of February 2024, and `03-02-2024 14:05:09`
/// is 2:05:09 PM on the same day. Year-first ISO dates such as `2024-02-03` or
/// `2024-02-03T14:05` are unambiguous and also accepted. Fractions of a
/// second are discarded.
pub fn parse_day_first_timestamp(raw: &str) -> Option<PrimitiveDateTime> {
    let raw = raw.trim();

    let (date_text, time_text) = match raw.split_once([' ', 'T']) {
        Some((date_text, time_text)) => (date_text, Some(time_text.trim())),
        None => (raw, None),
    };

    let date = DATE_FORMATS
        .iter()
        .find_map(|format| Date::parse(date_text, format).ok())?;

    let time = match time_text {
        Some(time_text) => Time::parse(time_text, TIME_FORMAT).ok()?,
        None => Time::MIDNIGHT,
    };

    floor_to_seconds(PrimitiveDateTime::new(date, time))
}

/// Parse seconds since the Unix epoch, either an integer or a decimal number.
pub fn parse_unix_time(raw: &str) -> Option<PrimitiveDateTime> {
    let raw = raw.trim();

    let seconds = match raw.parse::<i64>() {
        Ok(seconds) => seconds,
        Err(_) => {
            let seconds = raw.parse::<f64>().ok().filter(|seconds| seconds.is_finite())?;
            let seconds = seconds.floor();

            if seconds < i64::MIN as f64 || seconds > i64::MAX as f64 {
                return None;
            }

            seconds as i64
        }
    };

    let date_time = OffsetDateTime::from_unix_timestamp(seconds).ok()?;

    Some(PrimitiveDateTime::new(date_time.date(), date_time.time()))
}

fn floor_to_seconds(date_time: PrimitiveDateTime) -> Option<PrimitiveDateTime> {
    date_time.replace_nanosecond(0).ok()
}

/// Convert an amount in minor units (e.g. cents) to major units.
///
/// Values that are not numbers give `None`.
pub fn normalize_amount(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|amount| amount.is_finite())
        .map(|amount| amount / 100.0)
}

/// Only the text `true`, ignoring case and surrounding whitespace, counts as fraud.
pub fn normalize_fraud_label(raw: &str) -> bool {
    raw.trim().to_lowercase() == "true"
}

/// Resolve the timestamp of a row, falling back to the `unix_time` column.
fn resolve_timestamp(row: &RawFeedRow) -> Option<PrimitiveDateTime> {
    parse_day_first_timestamp(&row.transaction_timestamp).or_else(|| {
        row.unix_time
            .as_deref()
            .and_then(parse_unix_time)
            .and_then(floor_to_seconds)
    })
}

/// Type every row of `feed`, dropping rows whose timestamp cannot be resolved.
pub fn normalize_feed(feed: RawFeed) -> NormalizedFeed {
    let row_count = feed.rows.len();

    let rows: Vec<FeedRow> = feed
        .rows
        .into_iter()
        .filter_map(|row| {
            let transaction_timestamp = resolve_timestamp(&row)?;

            Some(FeedRow {
                transaction_amount: normalize_amount(&row.transaction_amount),
                fraud_label: normalize_fraud_label(&row.fraud_label),
                transaction_id: row.transaction_id,
                customer_id: row.customer_id,
                transaction_timestamp,
                passthrough: row.passthrough,
            })
        })
        .collect();

    let dropped = row_count - rows.len();
    if dropped > 0 {
        tracing::debug!("Dropped {dropped} of {row_count} feed rows with no usable timestamp");
    }

    NormalizedFeed {
        passthrough_columns: feed.passthrough_columns,
        rows,
    }
}

#[cfg(test)]
mod timestamp_tests {
    use time::macros::datetime;

    use super::{parse_day_first_timestamp, parse_unix_time};

    #[test]
    fn parses_day_before_month() {
        assert_eq!(
            parse_day_first_timestamp("03/02/2024 14:05"),
            Some(datetime!(2024-02-03 14:05:00))
        );
        assert_eq!(
            parse_day_first_timestamp("3-2-2024"),
            Some(datetime!(2024-02-03 00:00:00))
        );
        assert_eq!(
            parse_day_first_timestamp("13.12.2023 7:08:09"),
            Some(datetime!(2023-12-13 07:08:09))
        );
    }

    #[test]
    fn parses_year_first() {
        assert_eq!(
            parse_day_first_timestamp("2024-02-03T14:05:09"),
            Some(datetime!(2024-02-03 14:05:09))
        );
        assert_eq!(
            parse_day_first_timestamp("2024-02-03 14:05"),
            Some(datetime!(2024-02-03 14:05:00))
        );
    }

    #[test]
    fn floors_fractional_seconds() {
        assert_eq!(
            parse_day_first_timestamp("03/02/2024 14:05:09.987"),
            Some(datetime!(2024-02-03 14:05:09))
        );
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse_day_first_timestamp(""), None);
        assert_eq!(parse_day_first_timestamp("not a date"), None);
        assert_eq!(parse_day_first_timestamp("32/01/2024"), None);
        assert_eq!(parse_day_first_timestamp("01/13/2024"), None);
        assert_eq!(parse_day_first_timestamp("01/02/2024 25:00"), None);
    }

    #[test]
    fn parses_unix_seconds() {
        assert_eq!(
            parse_unix_time("1704067200"),
            Some(datetime!(2024-01-01 00:00:00))
        );
        assert_eq!(
            parse_unix_time(" 1704067200.75 "),
            Some(datetime!(2024-01-01 00:00:00))
        );
        assert_eq!(parse_unix_time("abc"), None);
        assert_eq!(parse_unix_time(""), None);
        assert_eq!(parse_unix_time("NaN"), None);
    }
}
