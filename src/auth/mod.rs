//! User accounts, sessions and the pages for logging in and managing passwords.

mod backend;
mod cookie;
mod log_in;
mod log_out;
mod middleware;
mod password;
mod password_change;
mod password_reset;
mod redirect;
mod reset_token;
mod sign_up;
mod token;
mod user;

pub use backend::{AuthBackend, ResetLink, SqliteAuthBackend};
pub use cookie::DEFAULT_COOKIE_DURATION;
pub use log_in::{get_log_in_page, post_log_in};
pub use log_out::post_log_out;
pub use middleware::auth_guard;
pub use password::{PasswordHash, ValidatedPassword};
pub use password_change::{get_password_change_page, post_password_change};
pub use password_reset::{
    get_password_reset_complete_page, get_password_reset_confirm_page,
    get_password_reset_done_page, get_password_reset_logged_in_page, get_password_reset_page,
    post_password_reset, post_password_reset_confirm,
};
pub use reset_token::ResetTokenKey;
pub use sign_up::{get_sign_up_page, post_sign_up};
pub use user::{
    User, UserID, create_user, create_user_table, get_user_by_id, update_email, validate_email,
};

#[cfg(test)]
pub(crate) use cookie::COOKIE_SESSION;
