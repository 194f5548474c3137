//! The session token stored in the encrypted session cookie.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{Error, auth::UserID};

/// Identifies a logged in user and when their session ends.
///
/// The expiry is stored as a Unix timestamp so that it survives the round
/// trip through the cookie exactly.
#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct SessionToken {
    pub user_id: UserID,

    #[serde(with = "time::serde::timestamp")]
    pub expires_at: OffsetDateTime,
}

impl SessionToken {
    /// Whether the session has ended at time `now`.
    pub fn is_expired(&self, now: OffsetDateTime) -> bool {
        self.expires_at <= now
    }

    /// Serialize the token as JSON for the cookie value.
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidSessionCookie] if serialization fails.
    pub fn to_cookie_value(&self) -> Result<String, Error> {
        serde_json::to_string(self).map_err(|error| Error::InvalidSessionCookie(error.to_string()))
    }

    /// Parse a token from a cookie value.
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidSessionCookie] if `value` is not a serialized token.
    pub fn from_cookie_value(value: &str) -> Result<Self, Error> {
        serde_json::from_str(value).map_err(|error| Error::InvalidSessionCookie(error.to_string()))
    }
}
