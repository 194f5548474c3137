//! Code for creating the user table and fetching users from the database.

use std::fmt::Display;

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};

use crate::{Error, auth::PasswordHash};

/// The maximum number of characters in a username.
pub const MAX_USERNAME_LENGTH: usize = 150;

/// A newtype wrapper for integer user IDs.
///
/// This helps disambiguate user IDs from other types of IDs, leading to better compile time
/// errors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct UserID(i64);

impl UserID {
    /// Create a new user ID.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Cast the user ID to a 64 bit integer.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for UserID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A registered user of the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// The user's ID in the application database.
    pub id: UserID,
    /// The name the user logs in with.
    pub username: String,
    /// The contact email address, empty if not given.
    pub email: String,
    /// The user's password hash.
    pub password_hash: PasswordHash,
}

/// Check that `username` is between 1 and 150 characters of letters, digits and `@.+-_`.
///
/// # Errors
///
/// Returns [Error::InvalidUsername] describing the problem.
pub fn validate_username(username: &str) -> Result<(), Error> {
    if username.is_empty() {
        return Err(Error::InvalidUsername("This field is required.".to_owned()));
    }

    if username.chars().count() > MAX_USERNAME_LENGTH {
        return Err(Error::InvalidUsername(format!(
            "Ensure this value has at most {MAX_USERNAME_LENGTH} characters."
        )));
    }

    if !username
        .chars()
        .all(|c| c.is_alphanumeric() || "@.+-_".contains(c))
    {
        return Err(Error::InvalidUsername(
            "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters."
                .to_owned(),
        ));
    }

    Ok(())
}

/// Check that `email` is empty or looks like an email address.
///
/// # Errors
///
/// Returns [Error::InvalidEmail] if `email` is not empty and not of the form `local@domain.tld`.
pub fn validate_email(email: &str) -> Result<(), Error> {
    if email.is_empty() {
        return Ok(());
    }

    let is_valid = match email.rsplit_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !email.chars().any(char::is_whitespace)
                && domain.split('.').count() >= 2
                && domain.split('.').all(|label| !label.is_empty())
        }
        None => false,
    };

    if is_valid {
        Ok(())
    } else {
        Err(Error::InvalidEmail(email.to_owned()))
    }
}

/// Create the user table.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_user_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS user (
                id INTEGER PRIMARY KEY,
                username TEXT NOT NULL UNIQUE,
                email TEXT NOT NULL DEFAULT '',
                password TEXT NOT NULL
                )",
        (),
    )?;

    Ok(())
}

/// Create and insert a new user into the database.
///
/// The caller should validate `username` and `email` first.
///
/// # Errors
///
/// Returns a:
/// - [Error::DuplicateUsername] if another user already has `username`,
/// - or [Error::SqlError] if some other SQL related error occurred.
pub fn create_user(
    username: &str,
    email: &str,
    password_hash: PasswordHash,
    connection: &Connection,
) -> Result<User, Error> {
    connection.execute(
        "INSERT INTO user (username, email, password) VALUES (?1, ?2, ?3)",
        (username, email, password_hash.as_ref()),
    )?;

    let id = UserID::new(connection.last_insert_rowid());

    Ok(User {
        id,
        username: username.to_owned(),
        email: email.to_owned(),
        password_hash,
    })
}

fn map_user_row(row: &Row) -> Result<User, rusqlite::Error> {
    let raw_password_hash: String = row.get(3)?;

    Ok(User {
        id: UserID::new(row.get(0)?),
        username: row.get(1)?,
        email: row.get(2)?,
        password_hash: PasswordHash::new_unchecked(&raw_password_hash),
    })
}

/// Get the user from the database with an ID equal to `user_id`.
///
/// # Errors
///
/// This function will return an error if:
/// - `user_id` does not belong to a registered user ([Error::NotFound]).
/// - there was an error trying to access the store.
pub fn get_user_by_id(user_id: UserID, connection: &Connection) -> Result<User, Error> {
    connection
        .prepare("SELECT id, username, email, password FROM user WHERE id = :id")?
        .query_row(&[(":id", &user_id.as_i64())], map_user_row)
        .map_err(|error| error.into())
}

/// Get the user with the username `username`.
///
/// Usernames are matched exactly, including case.
///
/// # Errors
///
/// Returns [Error::NotFound] if no user has the username, or [Error::SqlError]
/// for other SQL errors.
pub fn get_user_by_username(username: &str, connection: &Connection) -> Result<User, Error> {
    connection
        .prepare("SELECT id, username, email, password FROM user WHERE username = :username")?
        .query_row(&[(":username", &username)], map_user_row)
        .map_err(|error| error.into())
}

/// Get every user whose email address matches `email`, ignoring case.
///
/// # Errors
///
/// Returns [Error::SqlError] if an SQL related error occurred.
pub fn get_users_by_email(email: &str, connection: &Connection) -> Result<Vec<User>, Error> {
    if email.is_empty() {
        return Ok(Vec::new());
    }

    connection
        .prepare(
            "SELECT id, username, email, password FROM user
             WHERE email != '' AND lower(email) = lower(:email)
             ORDER BY id",
        )?
        .query_map(&[(":email", &email)], map_user_row)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|error| error.into())
}

/// Set the email address of the user with `user_id`.
///
/// # Errors
///
/// Returns [Error::NotFound] if the user does not exist, or [Error::SqlError]
/// for other SQL errors.
pub fn update_email(user_id: UserID, email: &str, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE user SET email = ?1 WHERE id = ?2",
        (email, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// Replace the password hash of the user with `user_id`.
///
/// # Errors
///
/// Returns [Error::NotFound] if the user does not exist, or [Error::SqlError]
/// for other SQL errors.
pub fn update_password(
    user_id: UserID,
    password_hash: &PasswordHash,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE user SET password = ?1 WHERE id = ?2",
        (password_hash.as_ref(), user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}
