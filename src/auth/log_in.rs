//! The log-in page and the handler for log-in requests.

use axum::{
    Form,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::PrivateCookieJar;
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    auth::{
        backend::{AuthBackend, SqliteAuthBackend},
        cookie::{REMEMBER_ME_COOKIE_DURATION, invalidate_auth_cookie},
        redirect::normalize_redirect_url,
    },
    endpoints,
    html::{FormInput, LINK_STYLE, auth_card, base, password_input, submit_button},
};

pub const INVALID_CREDENTIALS_ERROR_MSG: &str =
    "Please enter a correct username and password. Note that both fields may be case-sensitive.";

fn log_in_form(username: &str, error_message: Option<&str>, redirect_url: Option<&str>) -> Markup {
    html! {
        form
            hx-post=(endpoints::LOG_IN_VIEW)
            hx-indicator="#indicator"
            hx-disabled-elt="#username, #password, #submit-button"
            class="space-y-4 md:space-y-6"
        {
            @if let Some(redirect_url) = redirect_url {
                input type="hidden" name="redirect_url" value=(redirect_url);
            }

            (FormInput {
                label: "Username",
                name: "username",
                input_type: "text",
                value: username,
                required: true,
                error_message: None,
            }.into_html())

            (password_input("Password", "password", error_message))

            div class="flex items-center gap-x-3"
            {
                input
                    type="checkbox"
                    name="remember_me"
                    id="remember_me"
                    tabindex="0"
                    class="rounded-xs";

                label
                    for="remember_me"
                    class="block text-sm font-medium text-gray-900 dark:text-white"
                {
                    "Keep me logged in for one week"
                }
            }

            (submit_button("Log in"))

            p class="text-sm font-light text-gray-500 dark:text-gray-400"
            {
                "Forgot your password? "
                a href=(endpoints::PASSWORD_RESET_VIEW) tabindex="0" class=(LINK_STYLE)
                {
                  "Reset it here"
                }
            }

            p class="text-sm font-light text-gray-500 dark:text-gray-400" {
                "Don't have an account? "
                a href=(endpoints::SIGN_UP_VIEW) tabindex="0" class=(LINK_STYLE)
                {
                  "Sign up here"
                }
            }
        }
    }
}

fn parse_redirect_url(raw_url: Option<&str>, source: &str) -> Option<String> {
    let raw_url = raw_url.filter(|url| !url.is_empty())?;

    match normalize_redirect_url(raw_url) {
        Some(redirect_url) => Some(redirect_url),
        None => {
            tracing::warn!("Invalid redirect URL from {source}: {raw_url}");
            None
        }
    }
}

#[derive(Deserialize)]
pub struct RedirectQuery {
    pub redirect_url: Option<String>,
}

/// Display the log-in page.
pub async fn get_log_in_page(Query(query): Query<RedirectQuery>) -> Response {
    let redirect_url = parse_redirect_url(query.redirect_url.as_deref(), "log-in query");
    let log_in_form = log_in_form("", None, redirect_url.as_deref());
    let content = auth_card("Log in to your account", &log_in_form);
    base("Log In", &[], &content).into_response()
}

/// The raw data entered by the user in the log-in form.
#[derive(Clone, Serialize, Deserialize)]
pub struct LogInData {
    pub username: String,
    pub password: String,

    /// Whether to extend the initial auth cookie duration.
    ///
    /// This value comes from a checkbox, so it either has a string value or is not set
    /// (see the [MDN docs](https://developer.mozilla.org/en-US/docs/Web/HTML/Element/input/checkbox#value_2)).
    /// The `Some` variant should be interpreted as `true` irregardless of the
    /// string value, and the `None` variant should be interpreted as `false`.
    pub remember_me: Option<String>,

    /// Optional URL to redirect to after logging in.
    pub redirect_url: Option<String>,
}

/// Handler for log-in requests via the POST method.
///
/// On a successful log-in request, the auth cookie set and the client is
/// redirected to `redirect_url`, or the landing page if there is none.
/// Otherwise, the form is returned with an error message explaining the problem.
pub async fn post_log_in(
    State(backend): State<SqliteAuthBackend>,
    jar: PrivateCookieJar,
    Form(user_data): Form<LogInData>,
) -> Response {
    let redirect_url = parse_redirect_url(user_data.redirect_url.as_deref(), "log-in form");
    let redirect_url = redirect_url.as_deref();

    let user = match backend.authenticate(&user_data.username, &user_data.password) {
        Ok(user) => user,
        Err(Error::InvalidCredentials) => {
            return log_in_form(
                &user_data.username,
                Some(INVALID_CREDENTIALS_ERROR_MSG),
                redirect_url,
            )
            .into_response();
        }
        Err(error) => {
            tracing::error!("Unhandled error while verifying credentials: {error}");
            return log_in_form(
                &user_data.username,
                Some("An internal error occurred. Please try again later."),
                redirect_url,
            )
            .into_response();
        }
    };

    let cookie_duration = if user_data.remember_me.is_some() {
        REMEMBER_ME_COOKIE_DURATION
    } else {
        backend.cookie_duration
    };

    let redirect_url = redirect_url.unwrap_or(endpoints::MUMU_VIEW);

    backend
        .create_session(jar.clone(), user.id, cookie_duration)
        .map(|updated_jar| {
            tracing::info!("User {} logged in", user.username);
            (
                StatusCode::SEE_OTHER,
                HxRedirect(redirect_url.to_owned()),
                updated_jar,
            )
        })
        .map_err(|err| {
            tracing::error!("Error setting auth cookie: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                HxRedirect(endpoints::INTERNAL_ERROR_VIEW.to_owned()),
                invalidate_auth_cookie(jar),
            )
        })
        .into_response()
}

#[cfg(test)]
mod log_in_page_tests {
    use std::{collections::HashMap, iter::zip};

    use axum::{
        Form,
        extract::{Query, State},
        http::{StatusCode, header::CONTENT_TYPE},
    };
    use axum_extra::extract::PrivateCookieJar;

    use crate::{
        auth::backend::test_backend::get_test_backend,
        endpoints,
        test_utils::{
            assert_has_field_error, assert_valid_html, parse_html_document, parse_html_fragment,
        },
    };

    use super::{LogInData, RedirectQuery, get_log_in_page, post_log_in};

    #[tokio::test]
    async fn log_in_page_displays_form() {
        let response = get_log_in_page(Query(RedirectQuery { redirect_url: None })).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert!(
            response
                .headers()
                .get(CONTENT_TYPE)
                .unwrap()
                .to_str()
                .unwrap()
                .starts_with("text/html")
        );

        let document = parse_html_document(response).await;
        assert_valid_html(&document);

        let form_selector = scraper::Selector::parse("form").unwrap();
        let forms = document.select(&form_selector).collect::<Vec<_>>();
        assert_eq!(forms.len(), 1, "want 1 form, got {}", forms.len());
        let form = forms.first().unwrap();
        let hx_post = form.value().attr("hx-post");
        assert_eq!(
            hx_post,
            Some(endpoints::LOG_IN_VIEW),
            "want form with attribute hx-post=\"{}\", got {:?}",
            endpoints::LOG_IN_VIEW,
            hx_post
        );

        let mut expected_form_elements: HashMap<&str, Vec<&str>> = HashMap::new();
        expected_form_elements.insert("input", vec!["text", "password", "checkbox"]);
        expected_form_elements.insert("button", vec!["submit"]);

        for (tag, element_types) in expected_form_elements {
            for element_type in element_types {
                let selector_string = format!("{tag}[type={element_type}]");
                let input_selector = scraper::Selector::parse(&selector_string).unwrap();
                let inputs = form.select(&input_selector).collect::<Vec<_>>();
                assert_eq!(
                    inputs.len(),
                    1,
                    "want 1 {element_type} {tag}, got {}",
                    inputs.len()
                );
            }
        }

        let link_selector = scraper::Selector::parse("a[href]").unwrap();
        let links = form.select(&link_selector).collect::<Vec<_>>();
        assert_eq!(links.len(), 2, "want 2 links, got {}", links.len());
        let want_endpoints = [endpoints::PASSWORD_RESET_VIEW, endpoints::SIGN_UP_VIEW];

        for (link, endpoint) in zip(links, want_endpoints) {
            assert_eq!(link.value().attr("href"), Some(endpoint));
        }
    }

    #[tokio::test]
    async fn log_in_page_displays_error_message() {
        let backend = get_test_backend();
        let jar = PrivateCookieJar::new(backend.cookie_key.clone());
        let form = LogInData {
            username: "alice".to_owned(),
            password: "wrongpassword".to_owned(),
            remember_me: None,
            redirect_url: None,
        };
        let response = post_log_in(State(backend), jar, Form(form)).await;

        assert_eq!(response.status(), StatusCode::OK);

        let document = parse_html_fragment(response).await;
        assert_valid_html(&document);

        assert_has_field_error(&document, "password");

        let username_selector = scraper::Selector::parse("input#username").unwrap();
        let username = document.select(&username_selector).next().unwrap();
        assert_eq!(username.value().attr("value"), Some("alice"));
    }

    #[tokio::test]
    async fn log_in_page_preserves_redirect_url() {
        let redirect_url = "/transactions?fraud=1&page=2".to_owned();
        let response = get_log_in_page(Query(RedirectQuery {
            redirect_url: Some(redirect_url.clone()),
        }))
        .await;

        let document = parse_html_document(response).await;
        assert_valid_html(&document);

        let input_selector = scraper::Selector::parse("input[name=redirect_url]").unwrap();
        let inputs = document.select(&input_selector).collect::<Vec<_>>();
        assert_eq!(inputs.len(), 1);
        assert_eq!(
            inputs[0].value().attr("value"),
            Some(redirect_url.as_str()),
            "expected redirect_url value to be preserved"
        );
    }

    #[tokio::test]
    async fn log_in_page_drops_external_redirect_url() {
        let response = get_log_in_page(Query(RedirectQuery {
            redirect_url: Some("https://example.com/phish".to_owned()),
        }))
        .await;

        let document = parse_html_document(response).await;
        let input_selector = scraper::Selector::parse("input[name=redirect_url]").unwrap();
        assert_eq!(document.select(&input_selector).count(), 0);
    }
}
