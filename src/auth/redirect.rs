//! Where to send a user after they log in.

use axum::{extract::Request, http::Uri};
use axum_htmx::{HX_CURRENT_URL, HX_REQUEST};

use crate::endpoints;

/// Only local paths are allowed, and never the log-in or log-out routes
/// since they would loop or end the session straight away.
fn is_safe_redirect_url(redirect_url: &str) -> bool {
    if !redirect_url.starts_with('/') || redirect_url.starts_with("//") {
        return false;
    }

    let path = redirect_url
        .split_once('?')
        .map(|(path, _)| path)
        .unwrap_or(redirect_url);

    path != endpoints::LOG_IN_VIEW && path != endpoints::LOG_OUT
}

/// Reduce `raw_url` to a local path and query, or `None` if it points
/// somewhere a user should not be sent after logging in.
pub fn normalize_redirect_url(raw_url: &str) -> Option<String> {
    let uri = raw_url.parse::<Uri>().ok()?;
    if uri.scheme().is_some() || uri.authority().is_some() {
        return None;
    }
    let path_and_query = uri.path_and_query()?.as_str();

    is_safe_redirect_url(path_and_query).then(|| path_and_query.to_owned())
}

/// The page the browser is showing, from the `HX-Current-URL` header of an HTMX request.
fn current_url_of_hx_request(request: &Request) -> Option<String> {
    let headers = request.headers();

    let is_hx_request = headers
        .get(HX_REQUEST)
        .and_then(|header| header.to_str().ok())
        .is_some_and(|header| header.eq_ignore_ascii_case("true"));
    if !is_hx_request {
        return None;
    }

    let current_url = headers
        .get(HX_CURRENT_URL)
        .and_then(|header| header.to_str().ok())?;
    let path_and_query = current_url.parse::<Uri>().ok()?.path_and_query()?.as_str().to_owned();

    is_safe_redirect_url(&path_and_query).then_some(path_and_query)
}

/// The log-in page URL with `redirect_target` as the `redirect_url` query parameter.
pub fn log_in_url_with_redirect(redirect_target: &str) -> String {
    match serde_urlencoded::to_string([("redirect_url", redirect_target)]) {
        Ok(param) => format!("{}?{}", endpoints::LOG_IN_VIEW, param),
        Err(error) => {
            tracing::error!("Could not encode redirect URL {redirect_target}: {error}");
            endpoints::LOG_IN_VIEW.to_owned()
        }
    }
}

/// The log-in page URL that returns the user to the page they asked for in `request`.
///
/// HTMX requests return the user to the page the browser was showing rather
/// than the partial that was requested.
pub fn build_log_in_redirect_url(request: &Request) -> String {
    let redirect_target = current_url_of_hx_request(request).or_else(|| {
        request
            .uri()
            .path_and_query()
            .and_then(|path_and_query| normalize_redirect_url(path_and_query.as_str()))
    });

    match redirect_target {
        Some(redirect_target) => log_in_url_with_redirect(&redirect_target),
        None => {
            tracing::warn!(
                "Invalid redirect URL from request {}. Falling back to the landing page.",
                request.uri()
            );
            log_in_url_with_redirect(endpoints::MUMU_VIEW)
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::{body::Body, extract::Request};

    use super::{build_log_in_redirect_url, normalize_redirect_url};

    #[test]
    fn keeps_local_paths_with_query() {
        assert_eq!(
            normalize_redirect_url("/transactions?page=2&fraud=1"),
            Some("/transactions?page=2&fraud=1".to_owned())
        );
    }

    #[test]
    fn rejects_external_and_looping_urls() {
        assert_eq!(normalize_redirect_url("https://evil.example/phish"), None);
        assert_eq!(normalize_redirect_url("//evil.example"), None);
        assert_eq!(normalize_redirect_url("dashboard"), None);
        assert_eq!(normalize_redirect_url("/login?redirect_url=%2Flogin"), None);
        assert_eq!(normalize_redirect_url("/logout"), None);
    }

    #[test]
    fn uses_request_uri() {
        let request = Request::builder()
            .uri("/transactions?page=2")
            .body(Body::empty())
            .unwrap();

        assert_eq!(
            build_log_in_redirect_url(&request),
            "/login?redirect_url=%2Ftransactions%3Fpage%3D2"
        );
    }

    #[test]
    fn uses_current_url_for_htmx_requests() {
        let request = Request::builder()
            .uri("/transactions?page=3")
            .header("HX-Request", "true")
            .header("HX-Current-URL", "http://localhost:8000/transactions?fraud=1")
            .body(Body::empty())
            .unwrap();

        assert_eq!(
            build_log_in_redirect_url(&request),
            "/login?redirect_url=%2Ftransactions%3Ffraud%3D1"
        );
    }
}
