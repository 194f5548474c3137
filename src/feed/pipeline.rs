//! The transaction list pipeline: normalize, filter, sort, paginate and aggregate.

use serde::Deserialize;

use crate::{
    feed::{
        aggregation::{DailySeries, daily_counts},
        filter::{FeedFilter, parse_filter_date, sort_newest_first},
        loader::RawFeed,
        normalize::{FeedRow, normalize_feed},
    },
    pagination::paginate,
};

/// The query parameters of the transactions page, exactly as sent by the client.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TransactionListParams {
    pub from: Option<String>,
    pub to: Option<String>,
    pub fraud: Option<String>,
    pub search: Option<String>,
    pub page: Option<String>,
}

/// Everything needed to render one page of the transaction list.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionListContext {
    /// The rows on the current page, newest first.
    pub transactions: Vec<FeedRow>,
    pub page: usize,
    pub total_pages: usize,
    pub has_prev: bool,
    pub has_next: bool,
    /// The number of rows that passed the filters, across all pages.
    pub total_rows: usize,
    /// Daily counts over every row that passed the filters.
    pub chart: DailySeries,
    /// The `from` parameter echoed back, or an empty string.
    pub from_date: String,
    /// The `to` parameter echoed back, or an empty string.
    pub to_date: String,
    pub fraud_only: bool,
    /// The lowercased search text, or an empty string.
    pub search: String,
    pub passthrough_columns: Vec<String>,
}

impl TransactionListContext {
    /// The chart labels as a JSON array.
    pub fn chart_labels_json(&self) -> String {
        serde_json::to_string(&self.chart.labels).unwrap_or_else(|_| "[]".to_owned())
    }

    /// The daily transaction counts as a JSON array.
    pub fn total_tx_json(&self) -> String {
        serde_json::to_string(&self.chart.totals).unwrap_or_else(|_| "[]".to_owned())
    }

    /// The daily fraud counts as a JSON array.
    pub fn fraud_tx_json(&self) -> String {
        serde_json::to_string(&self.chart.frauds).unwrap_or_else(|_| "[]".to_owned())
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|value| !value.is_empty())
}

fn parse_date_param(name: &str, value: Option<&str>) -> Option<time::Date> {
    let value = value?;
    let date = parse_filter_date(value);

    if date.is_none() {
        tracing::warn!("Ignoring the {name} filter, \"{value}\" is not a YYYY-MM-DD date");
    }

    date
}

impl TransactionListParams {
    /// Build the feed filter described by these parameters.
    ///
    /// Dates that cannot be parsed are ignored.
    pub fn to_filter(&self) -> FeedFilter {
        FeedFilter {
            from: parse_date_param("from", non_empty(&self.from)),
            to: parse_date_param("to", non_empty(&self.to)),
            fraud_only: self.fraud.as_deref() == Some("1"),
            search: non_empty(&self.search).map(str::to_lowercase),
        }
    }

    /// The requested page, or page one if the parameter is missing or not a whole number.
    pub fn requested_page(&self) -> i64 {
        self.page
            .as_deref()
            .and_then(|page| page.trim().parse().ok())
            .unwrap_or(1)
    }
}

/// Run the feed through the pipeline and select the requested page.
pub fn build_transaction_list(
    feed: RawFeed,
    params: &TransactionListParams,
    page_size: usize,
) -> TransactionListContext {
    let filter = params.to_filter();
    let normalized = normalize_feed(feed);

    let mut rows = filter.apply(normalized.rows);
    sort_newest_first(&mut rows);

    let chart = daily_counts(&rows);
    let total_rows = rows.len();
    let window = paginate(total_rows, params.requested_page(), page_size);

    let transactions: Vec<FeedRow> = rows.drain(window.start..window.end).collect();

    TransactionListContext {
        transactions,
        page: window.page,
        total_pages: window.total_pages,
        has_prev: window.has_prev(),
        has_next: window.has_next(),
        total_rows,
        chart,
        from_date: params.from.clone().unwrap_or_default(),
        to_date: params.to.clone().unwrap_or_default(),
        fraud_only: filter.fraud_only,
        search: filter.search.unwrap_or_default(),
        passthrough_columns: normalized.passthrough_columns,
    }
}
