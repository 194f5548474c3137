//! Middleware for logging requests and responses.

use axum::{
    body::{Body, to_bytes},
    extract::Request,
    http::{Method, StatusCode, header::CONTENT_TYPE},
    middleware::Next,
    response::{IntoResponse, Response},
};

/// The number of bytes of a request or response body that is logged at the `info` level.
pub const LOG_BODY_LENGTH_LIMIT: usize = 64;

/// Log the request and response for each request.
///
/// Both the request and response are logged at the `info` level.
/// If a body is longer than [LOG_BODY_LENGTH_LIMIT] bytes, it is
/// truncated and the full body is logged at the `debug` level.
/// Form fields with "password" in their name are never logged.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let body_bytes = match to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(error) => {
            tracing::error!("Could not read request body: {error}");
            return StatusCode::BAD_REQUEST.into_response();
        }
    };
    let body_text = String::from_utf8_lossy(&body_bytes);

    let is_form_post = parts.method == Method::POST
        && parts
            .headers
            .get(CONTENT_TYPE)
            .and_then(|header| header.to_str().ok())
            .is_some_and(|content_type| {
                content_type.starts_with("application/x-www-form-urlencoded")
            });

    if is_form_post {
        log_body("Received request", &parts, &redact_passwords(&body_text));
    } else {
        log_body("Received request", &parts, &body_text);
    }

    let request = Request::from_parts(parts, Body::from(body_bytes));
    let response = next.run(request).await;

    let (parts, body) = response.into_parts();
    let body_bytes = match to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(error) => {
            tracing::error!("Could not read response body: {error}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };
    log_body("Sending response", &parts, &String::from_utf8_lossy(&body_bytes));

    Response::from_parts(parts, Body::from(body_bytes))
}

/// Replace the value of every form field whose name contains "password".
fn redact_passwords(form_text: &str) -> String {
    form_text
        .split('&')
        .map(|pair| match pair.split_once('=') {
            Some((name, _)) if name.contains("password") => format!("{name}=********"),
            _ => pair.to_owned(),
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// The longest prefix of `text` that fits in `limit` bytes without splitting a character.
fn truncate(text: &str, limit: usize) -> &str {
    if text.len() <= limit {
        return text;
    }

    let mut end = limit;
    while !text.is_char_boundary(end) {
        end -= 1;
    }

    &text[..end]
}

fn log_body(message: &str, headers: &impl std::fmt::Debug, body: &str) {
    if body.len() > LOG_BODY_LENGTH_LIMIT {
        tracing::info!(
            "{message}: {headers:#?}\nbody: {:}...",
            truncate(body, LOG_BODY_LENGTH_LIMIT)
        );
        tracing::debug!("Full body: {body:?}");
    } else {
        tracing::info!("{message}: {headers:#?}\nbody: {body:?}");
    }
}

#[cfg(test)]
mod tests {
    use axum::{Router, http::StatusCode, middleware, routing::post};
    use axum_test::TestServer;

    use super::{logging_middleware, redact_passwords, truncate};

    #[test]
    fn redacts_every_password_field() {
        let form = "username=alice&password=hunter2&old_password=a&new_password=b&confirm_password=c";

        assert_eq!(
            redact_passwords(form),
            "username=alice&password=********&old_password=********\
            &new_password=********&confirm_password=********"
        );
    }

    #[test]
    fn leaves_other_fields_alone() {
        assert_eq!(
            redact_passwords("email=a%40b.com&remember_me=on"),
            "email=a%40b.com&remember_me=on"
        );
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("héllo", 2), "h");
        assert_eq!(truncate("hello", 10), "hello");
    }

    #[tokio::test]
    async fn passes_body_through() {
        let app = Router::new()
            .route("/echo", post(|body: String| async move { body }))
            .layer(middleware::from_fn(logging_middleware));
        let server = TestServer::try_new(app).unwrap();

        let response = server.post("/echo").text("some body").await;

        response.assert_status(StatusCode::OK);
        response.assert_text("some body");
    }
}
