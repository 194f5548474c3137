//! The password reset flow for users who forgot their password.
//!
//! 1. The user asks for a reset link with their email address.
//! 2. A link is "emailed" for each account with that address. Emails are
//!    written to the server log.
//! 3. The link opens a page where the user picks a new password, as long as
//!    the token in the link is valid.

use axum::{
    Form,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    auth::{
        PasswordHash, UserID, ValidatedPassword,
        backend::{AuthBackend, ResetLink, SqliteAuthBackend},
        password::HASH_COST,
        user::update_password,
    },
    endpoints::{self, format_reset_confirm_endpoint},
    html::{FORM_CONTAINER_STYLE, FormInput, auth_card, base, link, password_input, submit_button},
    internal_server_error::get_internal_server_error_redirect,
    navigation::NavBar,
};

pub const PASSWORD_MISMATCH_ERROR_MSG: &str = "The two password fields didn't match.";

fn reset_request_form() -> Markup {
    html! {
        form
            hx-post=(endpoints::PASSWORD_RESET_VIEW)
            hx-indicator="#indicator"
            hx-disabled-elt="#submit-button"
            class="w-full space-y-4 md:space-y-6"
        {
            p class="text-sm text-gray-500 dark:text-gray-400"
            {
                "Enter the email address of your account and we'll email instructions for setting a new password."
            }

            (FormInput {
                label: "Email",
                name: "email",
                input_type: "email",
                value: "",
                required: true,
                error_message: None,
            }.into_html())

            (submit_button("Send reset link"))
        }
    }
}

/// Display the page for requesting a password reset link.
pub async fn get_password_reset_page() -> Response {
    let content = auth_card("Forgot your password?", &reset_request_form());
    base("Password Reset", &[], &content).into_response()
}

/// Display the password reset request form inside the app chrome, as linked from the account page.
pub async fn get_password_reset_logged_in_page() -> Response {
    let content = html! {
        (NavBar::new(endpoints::PASSWORD_RESET_LOGGED_IN_VIEW).into_html())

        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="text-xl font-bold my-4" { "Reset password" }

            (reset_request_form())
        }
    };

    base("Password Reset", &[], &content).into_response()
}

#[derive(Serialize, Deserialize)]
pub struct PasswordResetRequestForm {
    pub email: String,
}

fn send_reset_email(reset_link: &ResetLink) {
    tracing::info!(
        to = %reset_link.email,
        subject = "Password reset on MUMU",
        "You're receiving this email because you requested a password reset for your user \
        account at MUMU. Please go to the following page and choose a new password: {} \
        Your username, in case you've forgotten: {}",
        reset_link.url,
        reset_link.username,
    );
}

/// Email a reset link to every account with the submitted email address.
///
/// The client is always sent to the "check your email" page, so the response
/// does not reveal whether an address has an account.
pub async fn post_password_reset(
    State(backend): State<SqliteAuthBackend>,
    Form(form): Form<PasswordResetRequestForm>,
) -> Response {
    match backend.issue_reset_tokens(form.email.trim()) {
        Ok(reset_links) => reset_links.iter().for_each(send_reset_email),
        Err(error) => {
            tracing::error!("Could not issue password reset tokens: {error}");
            return get_internal_server_error_redirect();
        }
    }

    (
        HxRedirect(endpoints::PASSWORD_RESET_DONE_VIEW.to_owned()),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}

/// Display the page shown after a reset link has been requested.
pub async fn get_password_reset_done_page() -> Response {
    let message = html! {
        p { "We've emailed you instructions for setting your password, if an account exists with the email you entered. You should receive them shortly." }
        p { "If you don't receive an email, please make sure you've entered the address you registered with, and check your spam folder." }
    };
    let content = auth_card("Password reset sent", &message);

    base("Password Reset Sent", &[], &content).into_response()
}

fn invalid_link_message() -> Markup {
    html! {
        p
        {
            "The password reset link was invalid, possibly because it has already been used. "
            "Please request a new password reset."
        }

        p { (link(endpoints::PASSWORD_RESET_VIEW, "Request a new link")) }
    }
}

fn invalid_link_page() -> Response {
    let content = auth_card("Password reset unsuccessful", &invalid_link_message());

    base("Password Reset", &[], &content).into_response()
}

#[derive(Debug, Default)]
struct NewPasswordErrors<'a> {
    new_password: Option<&'a str>,
    confirm_password: Option<&'a str>,
}

fn new_password_form(user_id: UserID, token: &str, errors: NewPasswordErrors<'_>) -> Markup {
    html! {
        form
            hx-post=(format_reset_confirm_endpoint(user_id.as_i64(), token))
            hx-indicator="#indicator"
            hx-disabled-elt="#submit-button"
            class="space-y-4 md:space-y-6"
        {
            (password_input("New password", "new_password", errors.new_password))
            (password_input("Confirm new password", "confirm_password", errors.confirm_password))

            (submit_button("Change my password"))
        }
    }
}

/// Display the form for choosing a new password, or an error page if the
/// reset link is not valid.
pub async fn get_password_reset_confirm_page(
    State(backend): State<SqliteAuthBackend>,
    Path((user_id, token)): Path<(i64, String)>,
) -> Response {
    let user_id = UserID::new(user_id);

    match backend.verify_reset_token(user_id, &token) {
        Ok(_) => {
            let form = new_password_form(user_id, &token, NewPasswordErrors::default());
            let content = auth_card("Enter new password", &form);

            base("Password Reset", &[], &content).into_response()
        }
        Err(Error::InvalidResetToken) => invalid_link_page(),
        Err(error) => error.into_response(),
    }
}

#[derive(Serialize, Deserialize)]
pub struct NewPasswordForm {
    pub new_password: String,
    pub confirm_password: String,
}

/// Set the new password for the user a reset link was issued for.
pub async fn post_password_reset_confirm(
    State(backend): State<SqliteAuthBackend>,
    Path((user_id, token)): Path<(i64, String)>,
    Form(form): Form<NewPasswordForm>,
) -> Response {
    let user_id = UserID::new(user_id);

    let user = match backend.verify_reset_token(user_id, &token) {
        Ok(user) => user,
        Err(Error::InvalidResetToken) => return invalid_link_message().into_response(),
        Err(error) => {
            tracing::error!("Could not verify password reset token: {error}");
            return get_internal_server_error_redirect();
        }
    };

    if form.new_password != form.confirm_password {
        let errors = NewPasswordErrors {
            confirm_password: Some(PASSWORD_MISMATCH_ERROR_MSG),
            ..Default::default()
        };
        return new_password_form(user_id, &token, errors).into_response();
    }

    let user_inputs = [user.username.as_str(), user.email.as_str()];
    let password_hash = match ValidatedPassword::new(&form.new_password, &user_inputs)
        .and_then(|password| PasswordHash::new(password, HASH_COST))
    {
        Ok(password_hash) => password_hash,
        Err(Error::TooWeak(message)) => {
            let errors = NewPasswordErrors {
                new_password: Some(&message),
                ..Default::default()
            };
            return new_password_form(user_id, &token, errors).into_response();
        }
        Err(error) => {
            tracing::error!("Could not hash password: {error}");
            return get_internal_server_error_redirect();
        }
    };

    let result = match backend.db_connection.lock() {
        Ok(connection) => update_password(user_id, &password_hash, &connection),
        Err(_) => Err(Error::DatabaseLockError),
    };

    match result {
        Ok(()) => {
            tracing::info!("User {} reset their password", user.username);
            (
                HxRedirect(endpoints::PASSWORD_RESET_COMPLETE_VIEW.to_owned()),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        }
        Err(error) => {
            tracing::error!("Could not update password: {error}");
            get_internal_server_error_redirect()
        }
    }
}

/// Display the page shown after the password has been reset.
pub async fn get_password_reset_complete_page() -> Response {
    let message = html! {
        p { "Your password has been set. You may go ahead and log in now." }
        p { (link(endpoints::LOG_IN_VIEW, "Log in")) }
    };
    let content = auth_card("Password reset complete", &message);

    base("Password Reset Complete", &[], &content).into_response()
}

#[cfg(test)]
mod password_reset_tests {
    use axum::{
        Form,
        extract::{Path, State},
        http::StatusCode,
    };

    use crate::{
        auth::{
            backend::{
                AuthBackend, SqliteAuthBackend,
                test_backend::{add_test_user, get_test_backend},
            },
            user::get_user_by_id,
        },
        endpoints,
        test_utils::{
            assert_form_input, assert_hx_endpoint, assert_hx_redirect, assert_valid_html,
            must_get_form, parse_html_document, parse_html_fragment,
        },
    };

    use super::{
        NewPasswordForm, PASSWORD_MISMATCH_ERROR_MSG, PasswordResetRequestForm,
        get_password_reset_confirm_page, get_password_reset_logged_in_page,
        get_password_reset_page, post_password_reset, post_password_reset_confirm,
    };

    const NEW_PASSWORD: &str = "harbour pigeon collects maps";

    fn token_for(backend: &SqliteAuthBackend, email: &str) -> (i64, String) {
        let link = backend.issue_reset_tokens(email).unwrap().remove(0);
        let token = link.url.rsplit('/').next().unwrap().to_owned();

        (link.user_id.as_i64(), token)
    }

    #[tokio::test]
    async fn request_pages_display_email_form() {
        for response in [
            get_password_reset_page().await,
            get_password_reset_logged_in_page().await,
        ] {
            assert_eq!(response.status(), StatusCode::OK);
            let document = parse_html_document(response).await;
            assert_valid_html(&document);
            let form = must_get_form(&document);
            assert_hx_endpoint(&form, endpoints::PASSWORD_RESET_VIEW, "hx-post");
            assert_form_input(&form, "email", "email");
        }
    }

    #[tokio::test]
    async fn request_always_redirects_to_done_page() {
        let backend = get_test_backend();
        add_test_user(&backend, "alice", "alice@example.com", "a");

        for email in ["alice@example.com", "nobody@example.com"] {
            let response = post_password_reset(
                State(backend.clone()),
                Form(PasswordResetRequestForm {
                    email: email.to_owned(),
                }),
            )
            .await;

            assert_eq!(response.status(), StatusCode::SEE_OTHER);
            assert_hx_redirect(&response, endpoints::PASSWORD_RESET_DONE_VIEW);
        }
    }

    #[tokio::test]
    async fn confirm_page_shows_form_for_valid_token() {
        let backend = get_test_backend();
        add_test_user(&backend, "alice", "alice@example.com", "a");
        let (user_id, token) = token_for(&backend, "alice@example.com");

        let response =
            get_password_reset_confirm_page(State(backend), Path((user_id, token.clone()))).await;

        assert_eq!(response.status(), StatusCode::OK);
        let document = parse_html_document(response).await;
        assert_valid_html(&document);
        let form = must_get_form(&document);
        assert_hx_endpoint(&form, &format!("/reset/{user_id}/{token}"), "hx-post");
        assert_form_input(&form, "new_password", "password");
    }

    #[tokio::test]
    async fn confirm_page_rejects_tampered_token() {
        let backend = get_test_backend();
        add_test_user(&backend, "alice", "alice@example.com", "a");
        let (user_id, token) = token_for(&backend, "alice@example.com");
        let tampered = format!("{token}0");

        let response =
            get_password_reset_confirm_page(State(backend), Path((user_id, tampered))).await;

        let document = parse_html_document(response).await;
        assert!(
            document
                .root_element()
                .text()
                .collect::<String>()
                .contains("Password reset unsuccessful")
        );
        assert_eq!(
            document
                .select(&scraper::Selector::parse("form").unwrap())
                .count(),
            0
        );
    }

    #[tokio::test]
    async fn reset_sets_password_and_invalidates_link() {
        let backend = get_test_backend();
        let user = add_test_user(&backend, "alice", "alice@example.com", "a");
        let (user_id, token) = token_for(&backend, "alice@example.com");

        let response = post_password_reset_confirm(
            State(backend.clone()),
            Path((user_id, token.clone())),
            Form(NewPasswordForm {
                new_password: NEW_PASSWORD.to_owned(),
                confirm_password: NEW_PASSWORD.to_owned(),
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::PASSWORD_RESET_COMPLETE_VIEW);
        let updated = get_user_by_id(user.id, &backend.db_connection.lock().unwrap()).unwrap();
        assert!(updated.password_hash.verify(NEW_PASSWORD).unwrap());

        let reused = post_password_reset_confirm(
            State(backend.clone()),
            Path((user_id, token)),
            Form(NewPasswordForm {
                new_password: NEW_PASSWORD.to_owned(),
                confirm_password: NEW_PASSWORD.to_owned(),
            }),
        )
        .await;
        let html = parse_html_fragment(reused).await;
        assert_eq!(html.select(&scraper::Selector::parse("form").unwrap()).count(), 0);
    }

    #[tokio::test]
    async fn reset_rejects_mismatched_passwords() {
        let backend = get_test_backend();
        add_test_user(&backend, "alice", "alice@example.com", "a");
        let (user_id, token) = token_for(&backend, "alice@example.com");

        let response = post_password_reset_confirm(
            State(backend),
            Path((user_id, token)),
            Form(NewPasswordForm {
                new_password: NEW_PASSWORD.to_owned(),
                confirm_password: "something else".to_owned(),
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_fragment(response).await;
        let error = html
            .select(&scraper::Selector::parse("input#confirm_password + p").unwrap())
            .next()
            .expect("no error for confirm password");
        assert_eq!(error.text().collect::<String>(), PASSWORD_MISMATCH_ERROR_MSG);
    }
}
