//! Stateless password reset tokens.
//!
//! A token is `<expiry>-<signature>`, where the expiry is a Unix timestamp and
//! the signature is a SHA-512/256 digest over a server secret, the user's ID,
//! their current password hash and the expiry. Changing the password changes
//! the hash, which invalidates every outstanding token for that user.

use std::{fmt::Debug, sync::Arc};

use sha2::{Digest, Sha512, Sha512_256};
use time::{Duration, OffsetDateTime};

use crate::{Error, auth::User};

/// How long a password reset link stays valid.
pub const RESET_TOKEN_DURATION: Duration = Duration::days(3);

/// The secret used to sign password reset tokens.
#[derive(Clone)]
pub struct ResetTokenKey(Arc<[u8]>);

impl ResetTokenKey {
    /// Derive a key from the application secret.
    ///
    /// The derivation differs from the cookie key so that the two never coincide.
    pub fn from_secret(secret: &str) -> Self {
        let digest = Sha512::digest(format!("mumu.password-reset:{secret}"));

        Self(digest.to_vec().into())
    }
}

impl Debug for ResetTokenKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ResetTokenKey(..)")
    }
}

fn sign(key: &ResetTokenKey, user: &User, expires_at: i64) -> String {
    let mut hasher = Sha512_256::new();
    hasher.update(&key.0);
    hasher.update(user.id.as_i64().to_be_bytes());
    hasher.update(user.password_hash.as_ref().as_bytes());
    hasher.update(expires_at.to_be_bytes());

    format!("{:x}", hasher.finalize())
}

/// Compares every byte, wherever the inputs first differ.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Create a reset token for `user` that is valid until `now` plus [RESET_TOKEN_DURATION].
pub fn make_reset_token(key: &ResetTokenKey, user: &User, now: OffsetDateTime) -> String {
    let expires_at = (now + RESET_TOKEN_DURATION).unix_timestamp();

    format!("{expires_at}-{}", sign(key, user, expires_at))
}

/// Check that `token` was issued for `user` and has not expired at `now`.
///
/// # Errors
///
/// Returns [Error::InvalidResetToken] if the token is malformed, expired, or
/// was signed for another user or an old password.
pub fn check_reset_token(
    key: &ResetTokenKey,
    user: &User,
    token: &str,
    now: OffsetDateTime,
) -> Result<(), Error> {
    let (expires_at, signature) = token.split_once('-').ok_or(Error::InvalidResetToken)?;
    let expires_at: i64 = expires_at.parse().map_err(|_| Error::InvalidResetToken)?;

    if now.unix_timestamp() > expires_at {
        return Err(Error::InvalidResetToken);
    }

    let expected = sign(key, user, expires_at);

    if constant_time_eq(expected.as_bytes(), signature.as_bytes()) {
        Ok(())
    } else {
        Err(Error::InvalidResetToken)
    }
}

#[cfg(test)]
mod tests {
    use time::{Duration, OffsetDateTime};

    use crate::{
        Error,
        auth::{PasswordHash, User, UserID},
    };

    use super::{RESET_TOKEN_DURATION, ResetTokenKey, check_reset_token, make_reset_token};

    fn test_user(id: i64, password_hash: &str) -> User {
        User {
            id: UserID::new(id),
            username: "alice".to_owned(),
            email: "alice@example.com".to_owned(),
            password_hash: PasswordHash::new_unchecked(password_hash),
        }
    }

    #[test]
    fn accepts_fresh_token() {
        let key = ResetTokenKey::from_secret("secret");
        let user = test_user(1, "hash");
        let now = OffsetDateTime::now_utc();

        let token = make_reset_token(&key, &user, now);

        assert_eq!(check_reset_token(&key, &user, &token, now), Ok(()));
        assert_eq!(
            check_reset_token(&key, &user, &token, now + Duration::days(2)),
            Ok(())
        );
    }

    #[test]
    fn rejects_expired_token() {
        let key = ResetTokenKey::from_secret("secret");
        let user = test_user(1, "hash");
        let now = OffsetDateTime::now_utc();

        let token = make_reset_token(&key, &user, now);

        assert_eq!(
            check_reset_token(
                &key,
                &user,
                &token,
                now + RESET_TOKEN_DURATION + Duration::seconds(1)
            ),
            Err(Error::InvalidResetToken)
        );
    }

    #[test]
    fn rejects_token_after_password_change() {
        let key = ResetTokenKey::from_secret("secret");
        let now = OffsetDateTime::now_utc();
        let token = make_reset_token(&key, &test_user(1, "old hash"), now);

        let result = check_reset_token(&key, &test_user(1, "new hash"), &token, now);

        assert_eq!(result, Err(Error::InvalidResetToken));
    }

    #[test]
    fn rejects_token_for_other_user_or_key() {
        let key = ResetTokenKey::from_secret("secret");
        let now = OffsetDateTime::now_utc();
        let token = make_reset_token(&key, &test_user(1, "hash"), now);

        assert_eq!(
            check_reset_token(&key, &test_user(2, "hash"), &token, now),
            Err(Error::InvalidResetToken)
        );
        assert_eq!(
            check_reset_token(
                &ResetTokenKey::from_secret("other"),
                &test_user(1, "hash"),
                &token,
                now
            ),
            Err(Error::InvalidResetToken)
        );
    }

    #[test]
    fn rejects_tampered_expiry() {
        let key = ResetTokenKey::from_secret("secret");
        let user = test_user(1, "hash");
        let now = OffsetDateTime::now_utc();
        let token = make_reset_token(&key, &user, now);
        let (_, signature) = token.split_once('-').unwrap();
        let tampered = format!("{}-{signature}", (now + Duration::days(300)).unix_timestamp());

        assert_eq!(
            check_reset_token(&key, &user, &tampered, now),
            Err(Error::InvalidResetToken)
        );
    }

    #[test]
    fn rejects_malformed_token() {
        let key = ResetTokenKey::from_secret("secret");
        let user = test_user(1, "hash");
        let now = OffsetDateTime::now_utc();

        for token in ["", "abc", "-", "notanumber-abc", "1-"] {
            assert_eq!(
                check_reset_token(&key, &user, token, now),
                Err(Error::InvalidResetToken),
                "token {token:?} should be rejected"
            );
        }
    }
}
