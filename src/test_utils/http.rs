use axum::{body::Body, response::Response};

#[track_caller]
pub(crate) fn assert_hx_redirect(response: &Response<Body>, endpoint: &str) {
    let hx_redirect = response
        .headers()
        .get("hx-redirect")
        .expect("Headers missing hx-redirect")
        .to_str()
        .expect("Could not convert to str");

    assert_eq!(hx_redirect, endpoint);
}
