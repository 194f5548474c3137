//! The transaction feed: a CSV snapshot loaded and processed in memory on
//! every request to the transactions page.

mod aggregation;
mod filter;
mod loader;
mod normalize;
mod pipeline;
mod source;

pub use aggregation::DailySeries;
pub use loader::{RawFeed, RawFeedRow};
pub use normalize::FeedRow;
pub use pipeline::{TransactionListContext, TransactionListParams, build_transaction_list};
pub use source::{CsvFeedSource, FeedSource};

#[cfg(test)]
pub use source::InMemoryFeedSource;
