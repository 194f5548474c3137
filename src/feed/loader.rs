//! Reads the transaction feed CSV into an in-memory table of raw text cells.

use std::{fs::File, io::Read, path::Path};

use csv::{ReaderBuilder, StringRecord, Trim};

use crate::Error;

const TRANSACTION_ID: &str = "transaction_id";
const CUSTOMER_ID: &str = "customer_id";
const TRANSACTION_AMOUNT: &str = "transaction_amount";
const TRANSACTION_TIMESTAMP: &str = "transaction_timestamp";
const FRAUD_LABEL: &str = "fraud_label";
const UNIX_TIME: &str = "unix_time";

const REQUIRED_COLUMNS: [&str; 5] = [
    TRANSACTION_ID,
    CUSTOMER_ID,
    TRANSACTION_AMOUNT,
    TRANSACTION_TIMESTAMP,
    FRAUD_LABEL,
];

/// A row of the feed before any parsing, every cell as trimmed text.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawFeedRow {
    pub transaction_id: String,
    pub customer_id: String,
    pub transaction_amount: String,
    pub transaction_timestamp: String,
    pub fraud_label: String,
    /// `None` when the feed has no `unix_time` column.
    pub unix_time: Option<String>,
    /// The values of the columns in [RawFeed::passthrough_columns], in the same order.
    pub passthrough: Vec<String>,
}

/// The transaction feed as read from the CSV file.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawFeed {
    /// Header names of the columns the pipeline does not interpret, in file order.
    pub passthrough_columns: Vec<String>,
    pub rows: Vec<RawFeedRow>,
}

struct ColumnIndices {
    transaction_id: usize,
    customer_id: usize,
    transaction_amount: usize,
    transaction_timestamp: usize,
    fraud_label: usize,
    unix_time: Option<usize>,
    passthrough: Vec<usize>,
}

impl ColumnIndices {
    fn from_headers(headers: &StringRecord) -> Result<Self, Error> {
        let find = |name: &str| headers.iter().position(|header| header == name);

        let missing: Vec<&str> = REQUIRED_COLUMNS
            .into_iter()
            .filter(|name| find(name).is_none())
            .collect();

        if !missing.is_empty() {
            return Err(Error::InvalidFeed(format!(
                "missing required columns: {}",
                missing.join(", ")
            )));
        }

        let is_known = |header: &str| REQUIRED_COLUMNS.contains(&header) || header == UNIX_TIME;
        let passthrough = headers
            .iter()
            .enumerate()
            .filter(|(_, header)| !is_known(header))
            .map(|(index, _)| index)
            .collect();

        Ok(Self {
            transaction_id: find(TRANSACTION_ID).unwrap_or_default(),
            customer_id: find(CUSTOMER_ID).unwrap_or_default(),
            transaction_amount: find(TRANSACTION_AMOUNT).unwrap_or_default(),
            transaction_timestamp: find(TRANSACTION_TIMESTAMP).unwrap_or_default(),
            fraud_label: find(FRAUD_LABEL).unwrap_or_default(),
            unix_time: find(UNIX_TIME),
            passthrough,
        })
    }

    fn extract(&self, record: &StringRecord) -> RawFeedRow {
        // Short records are padded with empty cells.
        let cell = |index: usize| record.get(index).unwrap_or_default().to_owned();

        RawFeedRow {
            transaction_id: cell(self.transaction_id),
            customer_id: cell(self.customer_id),
            transaction_amount: cell(self.transaction_amount),
            transaction_timestamp: cell(self.transaction_timestamp),
            fraud_label: cell(self.fraud_label),
            unix_time: self.unix_time.map(cell),
            passthrough: self.passthrough.iter().map(|&index| cell(index)).collect(),
        }
    }
}

/// Parse a transaction feed from `reader`.
///
/// The first record must be the header row and contain the columns
/// `transaction_id`, `customer_id`, `transaction_amount`,
/// `transaction_timestamp` and `fraud_label`. A `unix_time` column is used
/// when present. Any other columns are carried through untouched.
///
/// # Errors
///
/// Returns [Error::InvalidFeed] if the data is not valid CSV or a required
/// column is missing.
pub fn read_feed<R: Read>(reader: R) -> Result<RawFeed, Error> {
    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|error| Error::InvalidFeed(error.to_string()))?
        .clone();
    let columns = ColumnIndices::from_headers(&headers)?;

    let passthrough_columns = columns
        .passthrough
        .iter()
        .map(|&index| headers[index].to_owned())
        .collect();

    let rows = reader
        .records()
        .map(|record| {
            record
                .map(|record| columns.extract(&record))
                .map_err(|error| Error::InvalidFeed(error.to_string()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(RawFeed {
        passthrough_columns,
        rows,
    })
}

/// Read the transaction feed from the CSV file at `path`.
///
/// # Errors
///
/// Returns [Error::FeedRead] if the file cannot be opened, otherwise the
/// errors of [read_feed].
pub fn load_feed(path: &Path) -> Result<RawFeed, Error> {
    let file = File::open(path)
        .map_err(|error| Error::FeedRead(format!("{}: {error}", path.display())))?;

    read_feed(file)
}

#[cfg(test)]
mod tests {
    use std::{io::Write, path::Path};

    use crate::Error;

    use super::{RawFeedRow, load_feed, read_feed};

    #[test]
    fn reads_required_columns() {
        let csv = "transaction_id,customer_id,transaction_amount,transaction_timestamp,fraud_label\n\
            T1, C1 ,250,01/02/2024 10:00,True\n";

        let feed = read_feed(csv.as_bytes()).unwrap();

        assert!(feed.passthrough_columns.is_empty());
        assert_eq!(
            feed.rows,
            vec![RawFeedRow {
                transaction_id: "T1".to_owned(),
                customer_id: "C1".to_owned(),
                transaction_amount: "250".to_owned(),
                transaction_timestamp: "01/02/2024 10:00".to_owned(),
                fraud_label: "True".to_owned(),
                unix_time: None,
                passthrough: vec![],
            }]
        );
    }

    #[test]
    fn keeps_extra_columns_in_file_order() {
        let csv = "merchant_category,transaction_id,customer_id,transaction_amount,\
            transaction_timestamp,fraud_label,unix_time,payment_status\n\
            Travel,T1,C1,100,01/02/2024,false,1706781600,Declined\n";

        let feed = read_feed(csv.as_bytes()).unwrap();

        assert_eq!(
            feed.passthrough_columns,
            vec!["merchant_category".to_owned(), "payment_status".to_owned()]
        );
        assert_eq!(
            feed.rows[0].passthrough,
            vec!["Travel".to_owned(), "Declined".to_owned()]
        );
        assert_eq!(feed.rows[0].unix_time.as_deref(), Some("1706781600"));
    }

    #[test]
    fn pads_short_records() {
        let csv = "transaction_id,customer_id,transaction_amount,transaction_timestamp,fraud_label\n\
            T1,C1\n";

        let feed = read_feed(csv.as_bytes()).unwrap();

        assert_eq!(feed.rows[0].transaction_id, "T1");
        assert_eq!(feed.rows[0].transaction_amount, "");
        assert_eq!(feed.rows[0].fraud_label, "");
    }

    #[test]
    fn missing_column_is_invalid_feed() {
        let csv = "transaction_id,customer_id,transaction_amount\nT1,C1,100\n";

        let result = read_feed(csv.as_bytes());

        assert!(
            matches!(result, Err(Error::InvalidFeed(ref reason)) if reason.contains("transaction_timestamp") && reason.contains("fraud_label")),
            "got {result:?}"
        );
    }

    #[test]
    fn missing_file_is_feed_read_error() {
        let result = load_feed(Path::new("/definitely/not/here/feed.csv"));

        assert!(matches!(result, Err(Error::FeedRead(_))), "got {result:?}");
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "transaction_id,customer_id,transaction_amount,transaction_timestamp,fraud_label"
        )
        .unwrap();
        writeln!(file, "T1,C1,100,01/02/2024,false").unwrap();
        writeln!(file, "T2,C2,200,02/02/2024,true").unwrap();

        let feed = load_feed(file.path()).unwrap();

        assert_eq!(feed.rows.len(), 2);
        assert_eq!(feed.rows[1].transaction_id, "T2");
    }
}
