//! The sign-up page for creating a new account.

use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    auth::{
        PasswordHash, ValidatedPassword,
        backend::SqliteAuthBackend,
        password::HASH_COST,
        user::{create_user, validate_email, validate_username},
    },
    endpoints,
    html::{FormInput, LINK_STYLE, auth_card, base, password_input, submit_button},
    internal_server_error::get_internal_server_error_redirect,
};

pub const PASSWORD_MISMATCH_ERROR_MSG: &str = "The two password fields didn't match.";
pub const DUPLICATE_USERNAME_ERROR_MSG: &str = "A user with that username already exists.";
pub const INVALID_EMAIL_ERROR_MSG: &str = "Enter a valid email address.";

/// The error messages to show next to each field of the sign-up form.
#[derive(Debug, Default)]
struct SignUpErrors<'a> {
    username: Option<&'a str>,
    email: Option<&'a str>,
    password: Option<&'a str>,
    confirm_password: Option<&'a str>,
}

fn sign_up_form(username: &str, email: &str, errors: SignUpErrors<'_>) -> Markup {
    html! {
        form
            hx-post=(endpoints::SIGN_UP_VIEW)
            hx-indicator="#indicator"
            hx-disabled-elt="#submit-button"
            class="space-y-4 md:space-y-6"
        {
            (FormInput {
                label: "Username",
                name: "username",
                input_type: "text",
                value: username,
                required: true,
                error_message: errors.username,
            }.into_html())

            (FormInput {
                label: "Email (optional)",
                name: "email",
                input_type: "email",
                value: email,
                required: false,
                error_message: errors.email,
            }.into_html())

            (password_input("Password", "password", errors.password))
            (password_input("Confirm Password", "confirm_password", errors.confirm_password))

            (submit_button("Sign up"))

            p class="text-sm font-light text-gray-500 dark:text-gray-400"
            {
                "Already have an account? "
                a href=(endpoints::LOG_IN_VIEW) tabindex="0" class=(LINK_STYLE)
                {
                  "Log in here"
                }
            }
        }
    }
}

/// Display the sign-up page.
pub async fn get_sign_up_page() -> Response {
    let sign_up_form = sign_up_form("", "", SignUpErrors::default());
    let content = auth_card("Create an account", &sign_up_form);
    base("Sign Up", &[], &content).into_response()
}

#[derive(Serialize, Deserialize)]
pub struct SignUpForm {
    pub username: String,
    #[serde(default)]
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

/// Create a new account and send the user to the log-in page.
///
/// Invalid input is reported next to the offending field of the returned form.
pub async fn post_sign_up(
    State(backend): State<SqliteAuthBackend>,
    Form(user_data): Form<SignUpForm>,
) -> Response {
    let username = user_data.username.trim();
    let email = user_data.email.trim();

    if let Err(Error::InvalidUsername(message)) = validate_username(username) {
        let errors = SignUpErrors {
            username: Some(&message),
            ..Default::default()
        };
        return sign_up_form(username, email, errors).into_response();
    }

    if validate_email(email).is_err() {
        let errors = SignUpErrors {
            email: Some(INVALID_EMAIL_ERROR_MSG),
            ..Default::default()
        };
        return sign_up_form(username, email, errors).into_response();
    }

    if user_data.password != user_data.confirm_password {
        let errors = SignUpErrors {
            confirm_password: Some(PASSWORD_MISMATCH_ERROR_MSG),
            ..Default::default()
        };
        return sign_up_form(username, email, errors).into_response();
    }

    let validated_password = match ValidatedPassword::new(&user_data.password, &[username, email])
    {
        Ok(password) => password,
        Err(Error::TooWeak(message)) => {
            let errors = SignUpErrors {
                password: Some(&message),
                ..Default::default()
            };
            return sign_up_form(username, email, errors).into_response();
        }
        Err(error) => {
            tracing::error!("Unexpected error while validating a password: {error}");
            return get_internal_server_error_redirect();
        }
    };

    let password_hash = match PasswordHash::new(validated_password, HASH_COST) {
        Ok(password_hash) => password_hash,
        Err(error) => {
            tracing::error!("Could not hash password: {error}");
            return get_internal_server_error_redirect();
        }
    };

    let result = match backend.db_connection.lock() {
        Ok(connection) => create_user(username, email, password_hash, &connection),
        Err(_) => Err(Error::DatabaseLockError),
    };

    match result {
        Ok(user) => {
            tracing::info!("Created account for user {}", user.username);
            (
                HxRedirect(endpoints::LOG_IN_VIEW.to_owned()),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        }
        Err(Error::DuplicateUsername) => {
            let errors = SignUpErrors {
                username: Some(DUPLICATE_USERNAME_ERROR_MSG),
                ..Default::default()
            };
            sign_up_form(username, email, errors).into_response()
        }
        Err(error) => {
            tracing::error!("Could not create user: {error}");
            get_internal_server_error_redirect()
        }
    }
}
