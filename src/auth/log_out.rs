//! Log-out route handler that invalidates the session cookie and redirects users.

use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::PrivateCookieJar;

use crate::{auth::cookie::invalidate_auth_cookie, endpoints};

/// Invalidate the session cookie and redirect the client to the home page.
pub async fn post_log_out(jar: PrivateCookieJar) -> Response {
    let jar = invalidate_auth_cookie(jar);

    (jar, Redirect::to(endpoints::HOME_VIEW)).into_response()
}

#[cfg(test)]
mod log_out_tests {
    use axum::{
        body::Body,
        http::{Response, StatusCode, header::SET_COOKIE},
    };
    use axum_extra::extract::{PrivateCookieJar, cookie::Cookie};
    use time::{Duration, OffsetDateTime};

    use crate::{
        app_state::create_cookie_key,
        auth::{
            UserID,
            cookie::{COOKIE_SESSION, DEFAULT_COOKIE_DURATION, set_auth_cookie},
        },
        endpoints,
    };

    use super::post_log_out;

    #[tokio::test]
    async fn log_out_invalidates_session_cookie_and_redirects() {
        let jar = PrivateCookieJar::new(create_cookie_key("42"));
        let cookie_jar = set_auth_cookie(jar, UserID::new(123), DEFAULT_COOKIE_DURATION).unwrap();

        let response = post_log_out(cookie_jar).await;

        assert_redirect(&response, endpoints::HOME_VIEW);
        assert_cookie_expired(&response);
    }

    #[tokio::test]
    async fn log_out_without_session_still_redirects() {
        let jar = PrivateCookieJar::new(create_cookie_key("42"));

        let response = post_log_out(jar).await;

        assert_redirect(&response, endpoints::HOME_VIEW);
        assert_cookie_expired(&response);
    }

    #[track_caller]
    fn assert_redirect(response: &Response<Body>, want_location: &str) {
        let redirect_location = response.headers().get("location").unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(redirect_location, want_location);
    }

    #[track_caller]
    fn assert_cookie_expired(response: &Response<Body>) {
        let session_cookie = response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .map(|header| Cookie::parse(header.to_str().unwrap().to_owned()).unwrap())
            .find(|cookie| cookie.name() == COOKIE_SESSION)
            .expect("no session cookie was set");

        assert_eq!(
            session_cookie.expires_datetime(),
            Some(OffsetDateTime::UNIX_EPOCH),
        );
        assert_eq!(session_cookie.max_age(), Some(Duration::ZERO));
    }
}
