//! The fraud record store: transactions that have been scored and labelled,
//! kept in SQLite for the aggregate statistics on the dashboard.

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};

use crate::Error;

/// The maximum number of characters in a transaction ID.
pub const MAX_TRANSACTION_ID_LENGTH: usize = 50;

/// A transaction from the fraud record store.
///
/// To create a new `FraudRecord`, use [FraudRecord::build].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FraudRecord {
    /// The unique ID of the transaction.
    pub transaction_id: String,
    pub customer_id: String,
    /// The kind of customer, e.g. "Business" or "Individual".
    pub customer_type: String,
    /// How long the customer has had their account when the transaction was made.
    pub account_age_days: i64,
    pub transaction_amount: f64,
    pub merchant_category: String,
    /// Whether the payment went through, e.g. "Completed" or "Declined".
    pub payment_status: String,
    /// Whether the transaction was confirmed as fraud.
    pub fraud_label: bool,
    /// The estimated probability of fraud, between 0 and 1.
    pub fraud_score: f64,
}

impl FraudRecord {
    /// Create a new fraud record.
    ///
    /// Shortcut for [FraudRecordBuilder] for discoverability.
    pub fn build(transaction_id: &str, customer_id: &str, amount: f64) -> FraudRecordBuilder {
        FraudRecordBuilder {
            transaction_id: transaction_id.to_owned(),
            customer_id: customer_id.to_owned(),
            customer_type: String::new(),
            account_age_days: 0,
            transaction_amount: amount,
            merchant_category: String::new(),
            payment_status: String::new(),
            fraud_label: false,
            fraud_score: 0.0,
        }
    }
}

/// A builder for creating [FraudRecord] instances.
///
/// Fields not set on the builder default to empty text, zero or `false`.
#[derive(Debug, PartialEq, Clone)]
pub struct FraudRecordBuilder {
    pub transaction_id: String,
    pub customer_id: String,
    pub customer_type: String,
    pub account_age_days: i64,
    pub transaction_amount: f64,
    pub merchant_category: String,
    pub payment_status: String,
    pub fraud_label: bool,
    pub fraud_score: f64,
}

impl FraudRecordBuilder {
    pub fn customer_type(mut self, customer_type: &str) -> Self {
        self.customer_type = customer_type.to_owned();
        self
    }

    pub fn account_age_days(mut self, account_age_days: i64) -> Self {
        self.account_age_days = account_age_days;
        self
    }

    pub fn merchant_category(mut self, merchant_category: &str) -> Self {
        self.merchant_category = merchant_category.to_owned();
        self
    }

    pub fn payment_status(mut self, payment_status: &str) -> Self {
        self.payment_status = payment_status.to_owned();
        self
    }

    pub fn fraud_label(mut self, fraud_label: bool) -> Self {
        self.fraud_label = fraud_label;
        self
    }

    pub fn fraud_score(mut self, fraud_score: f64) -> Self {
        self.fraud_score = fraud_score;
        self
    }
}

/// Add a record to the store.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidTransactionId] if the transaction ID is empty or longer than
///   [MAX_TRANSACTION_ID_LENGTH] characters,
/// - or [Error::DuplicateTransactionId] if a record with the same transaction ID already exists,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_record(
    builder: FraudRecordBuilder,
    connection: &Connection,
) -> Result<FraudRecord, Error> {
    let id_length = builder.transaction_id.chars().count();
    if id_length == 0 || id_length > MAX_TRANSACTION_ID_LENGTH {
        return Err(Error::InvalidTransactionId(builder.transaction_id));
    }

    let record = connection
        .prepare(
            "INSERT INTO fraud_transaction (transaction_id, customer_id, customer_type,
                account_age_days, transaction_amount, merchant_category, payment_status,
                fraud_label, fraud_score)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
             RETURNING transaction_id, customer_id, customer_type, account_age_days,
                transaction_amount, merchant_category, payment_status, fraud_label, fraud_score",
        )?
        .query_row(
            (
                builder.transaction_id,
                builder.customer_id,
                builder.customer_type,
                builder.account_age_days,
                builder.transaction_amount,
                builder.merchant_category,
                builder.payment_status,
                builder.fraud_label,
                builder.fraud_score,
            ),
            map_record_row,
        )?;

    Ok(record)
}

/// Retrieve a record by its transaction ID.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if no record has the transaction ID,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_record(transaction_id: &str, connection: &Connection) -> Result<FraudRecord, Error> {
    let record = connection
        .prepare(
            "SELECT transaction_id, customer_id, customer_type, account_age_days,
                transaction_amount, merchant_category, payment_status, fraud_label, fraud_score
             FROM fraud_transaction WHERE transaction_id = :transaction_id",
        )?
        .query_one(&[(":transaction_id", &transaction_id)], map_record_row)?;

    Ok(record)
}

/// Create the fraud record table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_record_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS fraud_transaction (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                transaction_id TEXT NOT NULL UNIQUE,
                customer_id TEXT NOT NULL,
                customer_type TEXT NOT NULL,
                account_age_days INTEGER NOT NULL,
                transaction_amount REAL NOT NULL,
                merchant_category TEXT NOT NULL,
                payment_status TEXT NOT NULL,
                fraud_label INTEGER NOT NULL DEFAULT 0,
                fraud_score REAL NOT NULL DEFAULT 0.0
                )",
        (),
    )?;

    // Used by the fraud count on the dashboard.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_fraud_transaction_fraud_label
            ON fraud_transaction(fraud_label);",
        (),
    )?;

    Ok(())
}

fn map_record_row(row: &Row) -> Result<FraudRecord, rusqlite::Error> {
    Ok(FraudRecord {
        transaction_id: row.get(0)?,
        customer_id: row.get(1)?,
        customer_type: row.get(2)?,
        account_age_days: row.get(3)?,
        transaction_amount: row.get(4)?,
        merchant_category: row.get(5)?,
        payment_status: row.get(6)?,
        fraud_label: row.get(7)?,
        fraud_score: row.get(8)?,
    })
}
