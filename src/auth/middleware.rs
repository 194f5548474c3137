//! Authentication middleware that validates the session cookie, extends
//! sessions and redirects anonymous users to the log-in page.

use axum::{
    extract::{FromRef, FromRequestParts, Request, State},
    http::{StatusCode, header::SET_COOKIE},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use axum_htmx::{HX_REQUEST, HxRedirect};
use time::Duration;

use crate::{
    AppState,
    auth::{
        cookie::{extend_auth_cookie_duration_if_needed, get_user_id_from_auth_cookie},
        redirect::build_log_in_redirect_url,
    },
};

/// The state needed for the auth middleware
#[derive(Clone)]
pub struct AuthState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// How far each request pushes out the session expiry.
    pub cookie_duration: Duration,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<AuthState> for Key {
    fn from_ref(state: &AuthState) -> Self {
        state.cookie_key.clone()
    }
}

fn is_hx_request(request: &Request) -> bool {
    request
        .headers()
        .get(HX_REQUEST)
        .and_then(|header| header.to_str().ok())
        .is_some_and(|header| header.eq_ignore_ascii_case("true"))
}

/// Middleware function that checks for a valid session cookie.
///
/// The user ID is placed into the request extensions and the request is
/// executed normally if the session is valid. Otherwise the client is sent to
/// the log-in page: a 303 redirect for normal requests, and an `HX-Redirect`
/// header for HTMX requests so that the whole page is replaced.
///
/// **Note**: Route handlers can use the function argument `Extension(user_id): Extension<UserID>` to receive the user ID.
pub async fn auth_guard(State(state): State<AuthState>, request: Request, next: Next) -> Response {
    let log_in_redirect = |request: &Request| {
        let redirect_url = build_log_in_redirect_url(request);

        if is_hx_request(request) {
            (HxRedirect(redirect_url), StatusCode::OK).into_response()
        } else {
            Redirect::to(&redirect_url).into_response()
        }
    };

    let (mut parts, body) = request.into_parts();
    let jar = match PrivateCookieJar::from_request_parts(&mut parts, &state).await {
        Ok(jar) => jar,
        Err(error) => {
            tracing::error!("Error getting cookie jar: {error:?}. Redirecting to log in page.");
            return log_in_redirect(&Request::from_parts(parts, body));
        }
    };
    let user_id = match get_user_id_from_auth_cookie(&jar) {
        Ok(user_id) => user_id,
        Err(error) => {
            tracing::debug!("Rejected session: {error}");
            return log_in_redirect(&Request::from_parts(parts, body));
        }
    };

    parts.extensions.insert(user_id);
    let response = next.run(Request::from_parts(parts, body)).await;

    let (mut parts, body) = response.into_parts();
    let jar = match extend_auth_cookie_duration_if_needed(jar.clone(), state.cookie_duration) {
        Ok(updated_jar) => updated_jar,
        Err(error) => {
            tracing::error!("Error extending cookie duration: {error}. Rolling back cookie jar.");
            jar
        }
    };

    // A session cookie set by the handler itself takes precedence.
    if !parts.headers.contains_key(SET_COOKIE) {
        for (key, value) in jar.into_response().headers().iter() {
            if key == SET_COOKIE {
                parts.headers.append(key, value.to_owned());
            }
        }
    }

    Response::from_parts(parts, body)
}
