//! Implements a struct that holds the state of the web server.

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use rusqlite::Connection;
use sha2::{Digest, Sha512};
use time::Duration;

use crate::{
    Error,
    auth::{DEFAULT_COOKIE_DURATION, ResetTokenKey},
    db::initialize,
    feed::FeedSource,
    pagination::PaginationConfig,
};

/// The state of the web server.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,

    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,

    /// The key for signing password reset links.
    pub reset_token_key: ResetTokenKey,

    /// The config that controls how to display pages of data.
    pub pagination_config: PaginationConfig,

    /// The database connection
    pub db_connection: Arc<Mutex<Connection>>,

    /// Where the transactions page reads the transaction feed from.
    pub feed_source: Arc<dyn FeedSource>,
}

impl AppState {
    /// Create a new [AppState] with a SQLite database connection and a transaction feed.
    ///
    /// This function will initialize the database by adding the tables for the domain models.
    /// The cookie and password reset keys are both derived from `secret`.
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized.
    pub fn new(
        db_connection: Connection,
        secret: &str,
        feed_source: impl FeedSource + 'static,
        pagination_config: PaginationConfig,
    ) -> Result<Self, Error> {
        initialize(&db_connection)?;

        Ok(Self {
            cookie_key: create_cookie_key(secret),
            cookie_duration: DEFAULT_COOKIE_DURATION,
            reset_token_key: ResetTokenKey::from_secret(secret),
            pagination_config,
            db_connection: Arc::new(Mutex::new(db_connection)),
            feed_source: Arc::new(feed_source),
        })
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}

/// Create a signing key for cookies from a `secret`s string.
pub fn create_cookie_key(secret: &str) -> Key {
    let hash = Sha512::digest(secret);

    Key::from(&hash)
}
