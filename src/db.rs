//! Creates the application's database tables.

use rusqlite::Connection;

use crate::{Error, auth::create_user_table, record_store::create_record_table};

/// Create the tables for users and fraud records if they do not exist yet.
///
/// # Errors
/// Returns an [Error::SqlError] if a table cannot be created.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    let transaction = connection.unchecked_transaction()?;

    create_user_table(&transaction)?;
    create_record_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}
