//! Where the transaction feed comes from.

use std::{fmt::Debug, path::PathBuf};

use crate::{
    Error,
    feed::loader::{RawFeed, load_feed},
};

/// Provides a fresh snapshot of the transaction feed.
///
/// The transactions page calls [FeedSource::load] on every request, so an
/// implementation decides how current the data is.
pub trait FeedSource: Debug + Send + Sync {
    /// Read the whole feed.
    ///
    /// # Errors
    ///
    /// Returns [Error::FeedRead] if the feed cannot be reached, or
    /// [Error::InvalidFeed] if it does not have the expected shape.
    fn load(&self) -> Result<RawFeed, Error>;
}

/// A feed read from a CSV file on disk.
#[derive(Debug, Clone)]
pub struct CsvFeedSource {
    path: PathBuf,
}

impl CsvFeedSource {
    /// Create a feed source that reads the CSV file at `path`.
    ///
    /// The file is not opened until the feed is loaded.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl FeedSource for CsvFeedSource {
    fn load(&self) -> Result<RawFeed, Error> {
        load_feed(&self.path)
    }
}

/// A feed held in memory as CSV text.
#[cfg(test)]
#[derive(Debug, Clone)]
pub struct InMemoryFeedSource {
    csv: String,
}

#[cfg(test)]
impl InMemoryFeedSource {
    pub fn new(csv: impl Into<String>) -> Self {
        Self { csv: csv.into() }
    }
}

#[cfg(test)]
impl FeedSource for InMemoryFeedSource {
    fn load(&self) -> Result<RawFeed, Error> {
        crate::feed::loader::read_feed(self.csv.as_bytes())
    }
}
