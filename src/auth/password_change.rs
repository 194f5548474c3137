//! The page where a logged in user changes their password.

use axum::{
    Extension, Form,
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
        PasswordHash, UserID, ValidatedPassword,
        backend::SqliteAuthBackend,
        password::HASH_COST,
        user::{get_user_by_id, update_password},
    },
    endpoints,
    html::{FORM_CONTAINER_STYLE, base, password_input, submit_button},
    internal_server_error::get_internal_server_error_redirect,
    navigation::NavBar,
};

pub const INCORRECT_OLD_PASSWORD_ERROR_MSG: &str =
    "Your old password was entered incorrectly. Please enter it again.";
pub const PASSWORD_MISMATCH_ERROR_MSG: &str = "The two password fields didn't match.";

/// The account page URL that shows the password change notice.
pub fn password_updated_url() -> String {
    format!("{}?notice=password_updated", endpoints::ACCOUNT_VIEW)
}

#[derive(Debug, Default)]
struct PasswordChangeErrors<'a> {
    old_password: Option<&'a str>,
    new_password: Option<&'a str>,
    confirm_password: Option<&'a str>,
}

fn password_change_form(errors: PasswordChangeErrors<'_>) -> Markup {
    html! {
        form
            hx-post=(endpoints::PASSWORD_CHANGE_VIEW)
            hx-indicator="#indicator"
            hx-disabled-elt="#submit-button"
            class="w-full space-y-4 md:space-y-6"
        {
            (password_input("Old password", "old_password", errors.old_password))
            (password_input("New password", "new_password", errors.new_password))
            (password_input("Confirm new password", "confirm_password", errors.confirm_password))

            (submit_button("Change my password"))
        }
    }
}

/// Display the password change page.
pub async fn get_password_change_page() -> Response {
    let content = html! {
        (NavBar::new(endpoints::PASSWORD_CHANGE_VIEW).into_html())

        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="text-xl font-bold my-4" { "Change password" }

            (password_change_form(PasswordChangeErrors::default()))
        }
    };

    base("Change Password", &[], &content).into_response()
}

#[derive(Serialize, Deserialize)]
pub struct PasswordChangeForm {
    pub old_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

/// Replace the logged in user's password after checking their old one.
///
/// On success the client is sent to the account page, which shows a notice.
pub async fn post_password_change(
    State(backend): State<SqliteAuthBackend>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<PasswordChangeForm>,
) -> Response {
    let user = match backend.db_connection.lock() {
        Ok(connection) => get_user_by_id(user_id, &connection),
        Err(_) => Err(Error::DatabaseLockError),
    };
    let user = match user {
        Ok(user) => user,
        Err(error) => {
            tracing::error!("Could not get user {user_id} for password change: {error}");
            return get_internal_server_error_redirect();
        }
    };

    match user.password_hash.verify(&form.old_password) {
        Ok(true) => {}
        Ok(false) => {
            let errors = PasswordChangeErrors {
                old_password: Some(INCORRECT_OLD_PASSWORD_ERROR_MSG),
                ..Default::default()
            };
            return password_change_form(errors).into_response();
        }
        Err(error) => {
            tracing::error!("Could not verify password: {error}");
            return get_internal_server_error_redirect();
        }
    }

    if form.new_password != form.confirm_password {
        let errors = PasswordChangeErrors {
            confirm_password: Some(PASSWORD_MISMATCH_ERROR_MSG),
            ..Default::default()
        };
        return password_change_form(errors).into_response();
    }

    let user_inputs = [user.username.as_str(), user.email.as_str()];
    let password_hash = match ValidatedPassword::new(&form.new_password, &user_inputs)
        .and_then(|password| PasswordHash::new(password, HASH_COST))
    {
        Ok(password_hash) => password_hash,
        Err(Error::TooWeak(message)) => {
            let errors = PasswordChangeErrors {
                new_password: Some(&message),
                ..Default::default()
            };
            return password_change_form(errors).into_response();
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
            tracing::info!("User {} changed their password", user.username);
            (HxRedirect(password_updated_url()), StatusCode::SEE_OTHER).into_response()
        }
        Err(error) => {
            tracing::error!("Could not update password: {error}");
            get_internal_server_error_redirect()
        }
    }
}
