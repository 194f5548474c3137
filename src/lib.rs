//! MUMU is a fraud-monitoring dashboard.
//!
//! This library provides a web server that directly serves HTML pages:
//! aggregate statistics from the fraud record store, and a filterable,
//! paginated view of the transaction feed, a CSV snapshot that is re-read
//! on every request.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::response::{IntoResponse, Response};
use axum_server::Handle;
use tokio::signal;

mod account;
mod alert;
mod app_state;
mod auth;
mod dashboard;
mod db;
mod endpoints;
mod feed;
mod html;
mod internal_server_error;
mod logging;
mod navigation;
mod not_found;
mod pagination;
mod record_store;
mod routing;
mod static_pages;
mod transactions;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use auth::{
    AuthBackend, PasswordHash, ResetLink, SqliteAuthBackend, User, UserID, ValidatedPassword,
    create_user,
};
pub use db::initialize as initialize_db;
pub use feed::{CsvFeedSource, FeedSource, RawFeed, RawFeedRow};
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use pagination::PaginationConfig;
pub use record_store::{FraudRecord, FraudRecordBuilder, create_record, get_record};
pub use routing::build_router;

use crate::{internal_server_error::InternalServerError, not_found::get_404_not_found_response};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The username and password combination did not match a registered user.
    #[error("invalid username or password")]
    InvalidCredentials,

    /// The session cookie is missing from the cookie jar in the request.
    #[error("no session cookie in the cookie jar")]
    CookieMissing,

    /// The session cookie could not be serialized or deserialized.
    ///
    /// Callers should pass in the original error as a string.
    #[error("invalid session cookie: {0}")]
    InvalidSessionCookie(String),

    /// The user provided a password that is too easy to guess.
    #[error("password is too weak: {0}")]
    TooWeak(String),

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    /// When communicating with the application client this error should be
    /// replaced with a general error type indicating an internal server error.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// The username is empty, too long or contains characters that are not allowed.
    #[error("invalid username: {0}")]
    InvalidUsername(String),

    /// The email address is not in a recognisable format.
    #[error("\"{0}\" is not a valid email address")]
    InvalidEmail(String),

    /// The username already belongs to another account.
    #[error("a user with that username already exists")]
    DuplicateUsername,

    /// The transaction ID already exists in the fraud record store.
    ///
    /// Transaction IDs uniquely identify records, so importing the same
    /// transaction twice is rejected.
    #[error("the transaction ID already exists in the database")]
    DuplicateTransactionId,

    /// The transaction ID is empty or longer than 50 characters.
    #[error("\"{0}\" is not a valid transaction ID")]
    InvalidTransactionId(String),

    /// The password reset token is malformed, expired or was issued for a
    /// different password.
    #[error("the password reset link is invalid or has expired")]
    InvalidResetToken,

    /// The transaction feed file could not be read.
    #[error("could not read the transaction feed: {0}")]
    FeedRead(String),

    /// The transaction feed file is not a CSV file with the expected columns.
    #[error("could not parse the transaction feed: {0}")]
    InvalidFeed(String),

    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            // Code 2067 occurs when a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.ends_with("user.username") =>
            {
                Error::DuplicateUsername
            }
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067
                    && desc.ends_with("fraud_transaction.transaction_id") =>
            {
                Error::DuplicateTransactionId
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => get_404_not_found_response(),
            Error::FeedRead(ref reason) | Error::InvalidFeed(ref reason) => {
                tracing::error!("The transaction feed could not be loaded: {reason}");
                InternalServerError {
                    description: "Transaction feed unavailable",
                    fix: "The transaction feed could not be loaded. Check that the feed file \
                        exists and is a valid CSV file, then try again.",
                }
                .into_response()
            }
            Error::DatabaseLockError => InternalServerError::default().into_response(),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                InternalServerError::default().into_response()
            }
        }
    }
}
