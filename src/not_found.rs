use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use crate::html::error_view;

/// The fallback handler for routes that do not exist.
pub async fn get_404_not_found() -> Response {
    get_404_not_found_response()
}

pub fn get_404_not_found_response() -> Response {
    let page = error_view(
        "Not Found",
        "404",
        "Page not found.",
        "Sorry, we can't find that page. Check the address or head back to the homepage.",
    );

    (StatusCode::NOT_FOUND, Html(page.into_string())).into_response()
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use crate::test_utils::{assert_valid_html, parse_html_document};

    use super::get_404_not_found;

    #[tokio::test]
    async fn renders_404_page() {
        let response = get_404_not_found().await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let document = parse_html_document(response).await;
        assert_valid_html(&document);
        let title = scraper::Selector::parse("title").unwrap();
        let title = document.select(&title).next().unwrap().text().collect::<String>();
        assert_eq!(title, "Not Found - MUMU");
    }
}
