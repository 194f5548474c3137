//! The account settings page, where a logged in user sees their details and
//! updates their email address.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Form,
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    alert::Alert,
    auth::{User, UserID, get_user_by_id, update_email, validate_email},
    endpoints,
    html::{FORM_CONTAINER_STYLE, FormInput, LINK_STYLE, base, submit_button},
    internal_server_error::get_internal_server_error_redirect,
    navigation::NavBar,
};

pub const ACCOUNT_UPDATED_MSG: &str = "Account updated successfully.";
pub const PASSWORD_UPDATED_MSG: &str = "Password updated successfully.";
pub const ACCOUNT_UPDATE_FAILED_MSG: &str = "Your account could not be updated. Try again later.";
pub const INVALID_EMAIL_ERROR_MSG: &str = "Enter a valid email address.";

/// The state needed for the account page.
#[derive(Debug, Clone)]
pub struct AccountState {
    /// The database connection for reading and updating users.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for AccountState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct AccountQuery {
    /// Set to "password_updated" after a password change.
    pub notice: Option<String>,
}

/// The alert, details and email form. HTMX swaps this whole panel after an update.
fn account_panel(
    username: &str,
    email: &str,
    alert: Option<Alert<'_>>,
    email_error: Option<&str>,
) -> Markup {
    html! {
        div id="account-panel" class="w-full"
        {
            @if let Some(alert) = alert {
                (alert.into_html())
            }

            dl class="mb-6"
            {
                dt class="text-sm text-gray-500 dark:text-gray-400" { "Username" }
                dd class="text-lg font-semibold" { (username) }
            }

            form
                hx-post=(endpoints::ACCOUNT_VIEW)
                hx-target="#account-panel"
                hx-swap="outerHTML"
                hx-indicator="#indicator"
                hx-disabled-elt="#submit-button"
                class="space-y-4 md:space-y-6"
            {
                (FormInput {
                    label: "Email",
                    name: "email",
                    input_type: "email",
                    value: email,
                    required: false,
                    error_message: email_error,
                }.into_html())

                (submit_button("Save"))
            }
        }
    }
}

fn get_user(user_id: UserID, db_connection: &Mutex<Connection>) -> Result<User, Error> {
    let connection = db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    get_user_by_id(user_id, &connection)
}

/// Display the logged in user's account details.
pub async fn get_account_page(
    State(state): State<AccountState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<AccountQuery>,
) -> Result<Response, Error> {
    let user = get_user(user_id, &state.db_connection)
        .inspect_err(|error| tracing::error!("could not get user {user_id}: {error}"))?;

    let alert = match query.notice.as_deref() {
        Some("password_updated") => Some(Alert::success(PASSWORD_UPDATED_MSG)),
        _ => None,
    };

    let content = html! {
        (NavBar::new(endpoints::ACCOUNT_VIEW).into_html())

        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="text-xl font-bold my-4" { "Account" }

            (account_panel(&user.username, &user.email, alert, None))

            ul class="w-full mt-6 space-y-2"
            {
                li { a href=(endpoints::PASSWORD_CHANGE_VIEW) class=(LINK_STYLE) { "Change password" } }
                li { a href=(endpoints::PASSWORD_RESET_LOGGED_IN_VIEW) class=(LINK_STYLE) { "Reset password by email" } }
            }
        }
    };

    Ok(base("Account", &[], &content).into_response())
}

#[derive(Serialize, Deserialize)]
pub struct AccountForm {
    #[serde(default)]
    pub email: String,
}

/// Update the logged in user's email address.
///
/// Responds with the account panel, showing either a success notice or the
/// reason the email address was rejected.
pub async fn post_account(
    State(state): State<AccountState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<AccountForm>,
) -> Response {
    let user = match get_user(user_id, &state.db_connection) {
        Ok(user) => user,
        Err(error) => {
            tracing::error!("could not get user {user_id}: {error}");
            return get_internal_server_error_redirect();
        }
    };

    let email = form.email.trim();

    if validate_email(email).is_err() {
        return account_panel(&user.username, email, None, Some(INVALID_EMAIL_ERROR_MSG))
            .into_response();
    }

    let result = match state.db_connection.lock() {
        Ok(connection) => update_email(user_id, email, &connection),
        Err(_) => Err(Error::DatabaseLockError),
    };

    match result {
        Ok(()) => account_panel(
            &user.username,
            email,
            Some(Alert::success(ACCOUNT_UPDATED_MSG)),
            None,
        )
        .into_response(),
        Err(error) => {
            tracing::error!("could not update email for user {user_id}: {error}");
            account_panel(
                &user.username,
                &user.email,
                Some(Alert::error(ACCOUNT_UPDATE_FAILED_MSG)),
                None,
            )
            .into_response()
        }
    }
}
