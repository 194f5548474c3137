//! The authentication operations the web pages rely on, behind a trait so
//! the page handlers do not depend on how users are stored.

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use rusqlite::Connection;
use time::{Duration, OffsetDateTime};

use crate::{
    AppState, Error,
    auth::{
        User, UserID,
        cookie::set_auth_cookie,
        reset_token::{ResetTokenKey, check_reset_token, make_reset_token},
        user::{get_user_by_id, get_user_by_username, get_users_by_email},
    },
    endpoints::format_reset_confirm_endpoint,
};

/// A password reset link for one account.
#[derive(Debug, Clone, PartialEq)]
pub struct ResetLink {
    pub user_id: UserID,
    pub username: String,
    pub email: String,
    /// The path of the page where the user picks a new password.
    pub url: String,
}

/// Authentication and session operations.
pub trait AuthBackend {
    /// Find the user with `username` and check their password.
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidCredentials] if there is no such user or the
    /// password does not match.
    fn authenticate(&self, username: &str, password: &str) -> Result<User, Error>;

    /// Add a session for `user_id` to `jar` that lasts `duration`.
    fn create_session(
        &self,
        jar: PrivateCookieJar,
        user_id: UserID,
        duration: Duration,
    ) -> Result<PrivateCookieJar, Error>;

    /// Create a password reset link for each account registered with `email`.
    ///
    /// An unknown email address gives no links rather than an error, so that
    /// callers cannot reveal which addresses have accounts.
    fn issue_reset_tokens(&self, email: &str) -> Result<Vec<ResetLink>, Error>;

    /// Get the user a password reset link was issued for.
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidResetToken] if the user does not exist or the
    /// token is not valid for them.
    fn verify_reset_token(&self, user_id: UserID, token: &str) -> Result<User, Error>;
}

/// Authentication backed by the SQLite user table and encrypted cookies.
#[derive(Debug, Clone)]
pub struct SqliteAuthBackend {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which a session lasts when the user is not remembered.
    pub cookie_duration: Duration,
    /// The key for signing password reset links.
    pub reset_token_key: ResetTokenKey,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for SqliteAuthBackend {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            reset_token_key: state.reset_token_key.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<SqliteAuthBackend> for Key {
    fn from_ref(state: &SqliteAuthBackend) -> Self {
        state.cookie_key.clone()
    }
}

impl AuthBackend for SqliteAuthBackend {
    fn authenticate(&self, username: &str, password: &str) -> Result<User, Error> {
        let user = {
            let connection = self
                .db_connection
                .lock()
                .map_err(|_| Error::DatabaseLockError)?;

            match get_user_by_username(username, &connection) {
                Ok(user) => user,
                Err(Error::NotFound) => return Err(Error::InvalidCredentials),
                Err(error) => return Err(error),
            }
        };

        let is_password_valid = user
            .password_hash
            .verify(password)
            .map_err(|error| Error::HashingError(error.to_string()))?;

        if is_password_valid {
            Ok(user)
        } else {
            Err(Error::InvalidCredentials)
        }
    }

    fn create_session(
        &self,
        jar: PrivateCookieJar,
        user_id: UserID,
        duration: Duration,
    ) -> Result<PrivateCookieJar, Error> {
        set_auth_cookie(jar, user_id, duration)
    }

    fn issue_reset_tokens(&self, email: &str) -> Result<Vec<ResetLink>, Error> {
        let users = {
            let connection = self
                .db_connection
                .lock()
                .map_err(|_| Error::DatabaseLockError)?;

            get_users_by_email(email, &connection)?
        };

        let now = OffsetDateTime::now_utc();

        Ok(users
            .into_iter()
            .map(|user| {
                let token = make_reset_token(&self.reset_token_key, &user, now);

                ResetLink {
                    url: format_reset_confirm_endpoint(user.id.as_i64(), &token),
                    user_id: user.id,
                    username: user.username,
                    email: user.email,
                }
            })
            .collect())
    }

    fn verify_reset_token(&self, user_id: UserID, token: &str) -> Result<User, Error> {
        let user = {
            let connection = self
                .db_connection
                .lock()
                .map_err(|_| Error::DatabaseLockError)?;

            match get_user_by_id(user_id, &connection) {
                Ok(user) => user,
                Err(Error::NotFound) => return Err(Error::InvalidResetToken),
                Err(error) => return Err(error),
            }
        };

        check_reset_token(
            &self.reset_token_key,
            &user,
            token,
            OffsetDateTime::now_utc(),
        )?;

        Ok(user)
    }
}


#[cfg(test)]
mod tests {
    use axum_extra::extract::PrivateCookieJar;
    use time::Duration;

    use crate::{
        Error,
        auth::{
            PasswordHash, UserID, ValidatedPassword, cookie::get_user_id_from_auth_cookie,
            user::update_password,
        },
    };

    use super::{
        AuthBackend,
        test_backend::{add_test_user, get_test_backend},
    };

    #[test]
    fn authenticate_succeeds_with_correct_password() {
        let backend = get_test_backend();
        let user = add_test_user(&backend, "alice", "", "hunter2");

        assert_eq!(backend.authenticate("alice", "hunter2"), Ok(user));
    }

    #[test]
    fn authenticate_fails_with_wrong_password_or_username() {
        let backend = get_test_backend();
        add_test_user(&backend, "alice", "", "hunter2");

        assert_eq!(
            backend.authenticate("alice", "hunter3"),
            Err(Error::InvalidCredentials)
        );
        assert_eq!(
            backend.authenticate("bob", "hunter2"),
            Err(Error::InvalidCredentials)
        );
    }

    #[test]
    fn create_session_sets_cookie() {
        let backend = get_test_backend();
        let jar = PrivateCookieJar::new(backend.cookie_key.clone());

        let jar = backend
            .create_session(jar, UserID::new(3), Duration::minutes(5))
            .unwrap();

        assert_eq!(get_user_id_from_auth_cookie(&jar), Ok(UserID::new(3)));
    }

    #[test]
    fn issues_one_link_per_matching_account() {
        let backend = get_test_backend();
        let alice = add_test_user(&backend, "alice", "ops@example.com", "a");
        let bob = add_test_user(&backend, "bob", "OPS@example.com", "b");
        add_test_user(&backend, "carol", "carol@example.com", "c");

        let links = backend.issue_reset_tokens("ops@example.com").unwrap();

        assert_eq!(links.len(), 2);
        assert_eq!(links[0].user_id, alice.id);
        assert_eq!(links[1].user_id, bob.id);
        assert!(
            links[0]
                .url
                .starts_with(&format!("/reset/{}/", alice.id.as_i64()))
        );
    }

    #[test]
    fn unknown_email_gives_no_links() {
        let backend = get_test_backend();
        add_test_user(&backend, "alice", "ops@example.com", "a");

        assert_eq!(backend.issue_reset_tokens("nobody@example.com"), Ok(vec![]));
    }

    #[test]
    fn verifies_issued_token_until_password_changes() {
        let backend = get_test_backend();
        let alice = add_test_user(&backend, "alice", "ops@example.com", "a");
        let link = backend
            .issue_reset_tokens("ops@example.com")
            .unwrap()
            .remove(0);
        let token = link.url.rsplit('/').next().unwrap();

        assert_eq!(backend.verify_reset_token(alice.id, token), Ok(alice.clone()));

        let new_hash = PasswordHash::new(ValidatedPassword::new_unchecked("b"), 4).unwrap();
        update_password(alice.id, &new_hash, &backend.db_connection.lock().unwrap()).unwrap();

        assert_eq!(
            backend.verify_reset_token(alice.id, token),
            Err(Error::InvalidResetToken)
        );
    }

    #[test]
    fn unknown_user_has_invalid_token() {
        let backend = get_test_backend();

        assert_eq!(
            backend.verify_reset_token(UserID::new(99), "1-abc"),
            Err(Error::InvalidResetToken)
        );
    }
}
