//! The URIs of the pages the server responds to.
//!
//! For the password reset link, which takes parameters, use [format_reset_confirm_endpoint].

/// The public landing page.
pub const HOME_VIEW: &str = "/";
/// The public product page, also where users land after logging in.
pub const MUMU_VIEW: &str = "/mumu";
/// The page with aggregate statistics over the fraud record store.
pub const DASHBOARD_VIEW: &str = "/dashboard";
/// The filterable, paginated view of the transaction feed.
pub const TRANSACTIONS_VIEW: &str = "/transactions";
/// The fraud overview page.
pub const FRAUD_VIEW: &str = "/fraud";
/// The orders page.
pub const ORDERS_VIEW: &str = "/orders";
/// The chargebacks page.
pub const CHARGEBACKS_VIEW: &str = "/chargebacks";
/// The fraud models page.
pub const MODELS_VIEW: &str = "/models";
/// The page for viewing and updating the user's account details.
pub const ACCOUNT_VIEW: &str = "/account";
/// The route for logging in a user.
pub const LOG_IN_VIEW: &str = "/login";
/// The route for creating a new account.
pub const SIGN_UP_VIEW: &str = "/signup";
/// The route for the client to log out the current user.
pub const LOG_OUT: &str = "/logout";
/// The page for changing the password of the logged in user.
pub const PASSWORD_CHANGE_VIEW: &str = "/password-change";
/// The page for requesting a password reset email.
pub const PASSWORD_RESET_VIEW: &str = "/password-reset";
/// The password reset request page for a logged in user.
pub const PASSWORD_RESET_LOGGED_IN_VIEW: &str = "/password-reset/logged-in";
/// The page shown after a password reset email has been requested.
pub const PASSWORD_RESET_DONE_VIEW: &str = "/password-reset/done";
/// The page linked to from a password reset email.
pub const PASSWORD_RESET_CONFIRM_VIEW: &str = "/reset/{user_id}/{token}";
/// The page shown after the password has been reset.
pub const PASSWORD_RESET_COMPLETE_VIEW: &str = "/reset/done";
/// The page to display when an internal server error occurs.
pub const INTERNAL_ERROR_VIEW: &str = "/error";

/// Fill in the user ID and token of the password reset link.
pub fn format_reset_confirm_endpoint(user_id: i64, token: &str) -> String {
    PASSWORD_RESET_CONFIRM_VIEW
        .replace("{user_id}", &user_id.to_string())
        .replace("{token}", token)
}

// These tests are here so that we know when we call `Uri::from_shared` it will not panic.
#[cfg(test)]
mod endpoints_tests {
    use axum::http::Uri;

    use crate::endpoints;

    use super::format_reset_confirm_endpoint;

    fn assert_endpoint_is_valid_uri(uri: &str) {
        assert!(uri.parse::<Uri>().is_ok(), "{uri} is not a valid URI");
    }

    #[test]
    fn endpoints_are_valid_uris() {
        assert_endpoint_is_valid_uri(endpoints::HOME_VIEW);
        assert_endpoint_is_valid_uri(endpoints::MUMU_VIEW);
        assert_endpoint_is_valid_uri(endpoints::DASHBOARD_VIEW);
        assert_endpoint_is_valid_uri(endpoints::TRANSACTIONS_VIEW);
        assert_endpoint_is_valid_uri(endpoints::FRAUD_VIEW);
        assert_endpoint_is_valid_uri(endpoints::ORDERS_VIEW);
        assert_endpoint_is_valid_uri(endpoints::CHARGEBACKS_VIEW);
        assert_endpoint_is_valid_uri(endpoints::MODELS_VIEW);
        assert_endpoint_is_valid_uri(endpoints::ACCOUNT_VIEW);
        assert_endpoint_is_valid_uri(endpoints::LOG_IN_VIEW);
        assert_endpoint_is_valid_uri(endpoints::SIGN_UP_VIEW);
        assert_endpoint_is_valid_uri(endpoints::LOG_OUT);
        assert_endpoint_is_valid_uri(endpoints::PASSWORD_CHANGE_VIEW);
        assert_endpoint_is_valid_uri(endpoints::PASSWORD_RESET_VIEW);
        assert_endpoint_is_valid_uri(endpoints::PASSWORD_RESET_LOGGED_IN_VIEW);
        assert_endpoint_is_valid_uri(endpoints::PASSWORD_RESET_DONE_VIEW);
        assert_endpoint_is_valid_uri(endpoints::PASSWORD_RESET_COMPLETE_VIEW);
        assert_endpoint_is_valid_uri(endpoints::INTERNAL_ERROR_VIEW);
    }

    #[test]
    fn formats_reset_link() {
        let formatted_path = format_reset_confirm_endpoint(42, "1700000000-abc123");

        assert_eq!(formatted_path, "/reset/42/1700000000-abc123");
        assert!(formatted_path.parse::<Uri>().is_ok());
    }
}
