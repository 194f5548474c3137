//! Reading and writing the encrypted session cookie.

use axum_extra::extract::{
    PrivateCookieJar,
    cookie::{Cookie, SameSite},
};
use time::{Duration, OffsetDateTime};

use crate::{
    Error,
    auth::{UserID, token::SessionToken},
};

pub(crate) const COOKIE_SESSION: &str = "session";
/// How long a session lasts without activity.
pub const DEFAULT_COOKIE_DURATION: Duration = Duration::minutes(30);
/// How long a session lasts when the user asks to be remembered.
pub const REMEMBER_ME_COOKIE_DURATION: Duration = Duration::days(7);

fn session_cookie(value: String, expiry: OffsetDateTime) -> Cookie<'static> {
    Cookie::build((COOKIE_SESSION, value))
        .path("/")
        .expires(expiry)
        .http_only(true)
        .same_site(SameSite::Strict)
        .secure(true)
        .build()
}

/// Add a session cookie for `user_id` that expires `duration` from now.
///
/// # Errors
///
/// Returns [Error::InvalidSessionCookie] if the token cannot be serialized.
pub fn set_auth_cookie(
    jar: PrivateCookieJar,
    user_id: UserID,
    duration: Duration,
) -> Result<PrivateCookieJar, Error> {
    let expires_at = OffsetDateTime::now_utc() + duration;
    let value = SessionToken {
        user_id,
        expires_at,
    }
    .to_cookie_value()?;

    Ok(jar.add(session_cookie(value, expires_at)))
}

/// Replace the session cookie with an expired one, which deletes it on the client.
pub fn invalidate_auth_cookie(jar: PrivateCookieJar) -> PrivateCookieJar {
    jar.add(
        Cookie::build((COOKIE_SESSION, "deleted"))
            .path("/")
            .expires(OffsetDateTime::UNIX_EPOCH)
            .max_age(Duration::ZERO)
            .http_only(true)
            .same_site(SameSite::Strict)
            .secure(true),
    )
}

/// Read the session token from `jar`.
///
/// # Errors
///
/// Returns [Error::CookieMissing] if there is no session cookie, or
/// [Error::InvalidSessionCookie] if it does not hold a session token.
pub(crate) fn get_session_from_cookies(jar: &PrivateCookieJar) -> Result<SessionToken, Error> {
    let cookie = jar.get(COOKIE_SESSION).ok_or(Error::CookieMissing)?;

    SessionToken::from_cookie_value(cookie.value_trimmed())
}

/// Get the ID of the logged in user, if the session has not expired.
///
/// # Errors
///
/// Returns [Error::InvalidCredentials] if the session has expired, otherwise
/// the errors of [get_session_from_cookies].
pub(crate) fn get_user_id_from_auth_cookie(jar: &PrivateCookieJar) -> Result<UserID, Error> {
    let token = get_session_from_cookies(jar)?;

    if token.is_expired(OffsetDateTime::now_utc()) {
        return Err(Error::InvalidCredentials);
    }

    Ok(token.user_id)
}

/// Push the session expiry out to `duration` from now, unless it already
/// expires later than that.
///
/// # Errors
///
/// The cookie jar is not modified if an error is returned. Returns the
/// errors of [get_session_from_cookies].
pub(crate) fn extend_auth_cookie_duration_if_needed(
    jar: PrivateCookieJar,
    duration: Duration,
) -> Result<PrivateCookieJar, Error> {
    let token = get_session_from_cookies(&jar)?;
    let new_expiry = OffsetDateTime::now_utc() + duration;

    if token.expires_at >= new_expiry {
        return Ok(jar);
    }

    let value = SessionToken {
        user_id: token.user_id,
        expires_at: new_expiry,
    }
    .to_cookie_value()?;

    Ok(jar.add(session_cookie(value, new_expiry)))
}
