//! Aggregate statistics over the fraud record store.

use rusqlite::Connection;

use crate::Error;

/// Totals over every record in the fraud record store.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DashboardSummary {
    /// The number of records.
    pub total_transactions: i64,
    /// The number of records labelled as fraud.
    pub fraud_transactions: i64,
    /// The sum of all transaction amounts, rounded to cents. Zero when there are no records.
    pub total_volume: f64,
}

/// Count the records in the store and sum their amounts.
///
/// # Errors
/// Returns an [Error::SqlError] if the query fails.
pub fn get_dashboard_summary(connection: &Connection) -> Result<DashboardSummary, Error> {
    connection
        .query_row(
            "SELECT COUNT(*),
                COALESCE(SUM(fraud_label), 0),
                COALESCE(SUM(transaction_amount), 0.0)
             FROM fraud_transaction",
            [],
            |row| {
                let total_volume: f64 = row.get(2)?;

                Ok(DashboardSummary {
                    total_transactions: row.get(0)?,
                    fraud_transactions: row.get(1)?,
                    total_volume: (total_volume * 100.0).round() / 100.0,
                })
            },
        )
        .map_err(|error| error.into())
}
