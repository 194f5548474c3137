//! Password strength checks and bcrypt hashing.

use std::fmt::Display;

use bcrypt::{BcryptError, hash, verify};
use serde::{Deserialize, Serialize};
use zxcvbn::{Score, feedback::Feedback, zxcvbn};

use crate::Error;

/// The minimum number of characters in a password.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// The bcrypt cost for passwords set through the web pages. Tests use the
/// lowest cost so they do not spend seconds hashing.
pub(crate) const HASH_COST: u32 = if cfg!(test) { 4 } else { bcrypt::DEFAULT_COST };

/// A password that has passed the strength checks but has not been hashed yet.
///
/// Use [PasswordHash::new] to hash it.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedPassword(String);

impl ValidatedPassword {
    /// Check that `raw_password` is strong enough to use.
    ///
    /// `user_inputs` should hold the account's other details, such as the
    /// username and email address, so that passwords built from them are
    /// rejected.
    ///
    /// # Errors
    ///
    /// Returns [Error::TooWeak] with a suggestion for a stronger password if
    /// the password is too short, only digits or easy to guess.
    pub fn new(raw_password: &str, user_inputs: &[&str]) -> Result<Self, Error> {
        if raw_password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(Error::TooWeak(format!(
                "This password is too short. It must contain at least {MIN_PASSWORD_LENGTH} characters."
            )));
        }

        if raw_password.chars().all(|c| c.is_ascii_digit()) {
            return Err(Error::TooWeak(
                "This password is entirely numeric.".to_owned(),
            ));
        }

        let user_inputs: Vec<&str> = user_inputs
            .iter()
            .copied()
            .filter(|input| !input.is_empty())
            .collect();
        let analysis = zxcvbn(raw_password, &user_inputs);

        match analysis.score() {
            Score::Three | Score::Four => Ok(Self(raw_password.to_owned())),
            _ => Err(Error::TooWeak(
                analysis
                    .feedback()
                    .unwrap_or(&Feedback::default())
                    .to_string(),
            )),
        }
    }

    /// Wrap `raw_password` without checking its strength.
    ///
    /// Only for seeding test data.
    pub fn new_unchecked(raw_password: &str) -> Self {
        Self(raw_password.to_owned())
    }
}

impl Display for ValidatedPassword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "********")
    }
}

/// A salted bcrypt hash of a password.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// The bcrypt cost used for new passwords outside of tests.
    pub const DEFAULT_COST: u32 = bcrypt::DEFAULT_COST;

    /// Hash `password` with `cost` rounds.
    ///
    /// # Errors
    ///
    /// Returns [Error::HashingError] if bcrypt fails, e.g. for an out of range cost.
    pub fn new(password: ValidatedPassword, cost: u32) -> Result<Self, Error> {
        hash(&password.0, cost)
            .map(Self)
            .map_err(|error| Error::HashingError(error.to_string()))
    }

    /// Wrap a hash that was read back from the database.
    pub fn new_unchecked(raw_password_hash: &str) -> Self {
        Self(raw_password_hash.to_owned())
    }

    /// Check that `raw_password` matches the stored hash.
    pub fn verify(&self, raw_password: &str) -> Result<bool, BcryptError> {
        verify(raw_password, &self.0)
    }
}

impl AsRef<str> for PasswordHash {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for PasswordHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
