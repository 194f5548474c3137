//! Application router configuration with protected and unprotected route definitions.

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::{
    AppState,
    account::{get_account_page, post_account},
    auth::{
        auth_guard, get_log_in_page, get_password_change_page, get_password_reset_complete_page,
        get_password_reset_confirm_page, get_password_reset_done_page,
        get_password_reset_logged_in_page, get_password_reset_page, get_sign_up_page,
        post_log_in, post_log_out, post_password_change, post_password_reset,
        post_password_reset_confirm, post_sign_up,
    },
    dashboard::get_dashboard_page,
    endpoints,
    internal_server_error::get_internal_server_error_page,
    not_found::get_404_not_found,
    static_pages::{
        get_chargebacks_page, get_fraud_page, get_home_page, get_models_page, get_mumu_page,
        get_orders_page,
    },
    transactions::get_transactions_page,
};

/// Return a router with all the app's routes.
///
/// Anonymous requests to a protected route are sent to the log-in page.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new()
        .route(endpoints::HOME_VIEW, get(get_home_page))
        .route(endpoints::MUMU_VIEW, get(get_mumu_page))
        .route(
            endpoints::LOG_IN_VIEW,
            get(get_log_in_page).post(post_log_in),
        )
        .route(
            endpoints::SIGN_UP_VIEW,
            get(get_sign_up_page).post(post_sign_up),
        )
        .route(endpoints::LOG_OUT, post(post_log_out))
        .route(
            endpoints::PASSWORD_RESET_VIEW,
            get(get_password_reset_page).post(post_password_reset),
        )
        .route(
            endpoints::PASSWORD_RESET_DONE_VIEW,
            get(get_password_reset_done_page),
        )
        .route(
            endpoints::PASSWORD_RESET_CONFIRM_VIEW,
            get(get_password_reset_confirm_page).post(post_password_reset_confirm),
        )
        .route(
            endpoints::PASSWORD_RESET_COMPLETE_VIEW,
            get(get_password_reset_complete_page),
        )
        .route(
            endpoints::PASSWORD_RESET_LOGGED_IN_VIEW,
            get(get_password_reset_logged_in_page),
        )
        .route(
            endpoints::INTERNAL_ERROR_VIEW,
            get(get_internal_server_error_page),
        );

    let protected_routes = Router::new()
        .route(endpoints::DASHBOARD_VIEW, get(get_dashboard_page))
        .route(endpoints::TRANSACTIONS_VIEW, get(get_transactions_page))
        .route(endpoints::FRAUD_VIEW, get(get_fraud_page))
        .route(endpoints::ORDERS_VIEW, get(get_orders_page))
        .route(endpoints::CHARGEBACKS_VIEW, get(get_chargebacks_page))
        .route(endpoints::MODELS_VIEW, get(get_models_page))
        .route(
            endpoints::ACCOUNT_VIEW,
            get(get_account_page).post(post_account),
        )
        .route(
            endpoints::PASSWORD_CHANGE_VIEW,
            get(get_password_change_page).post(post_password_change),
        )
        .layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    protected_routes
        .merge(unprotected_routes)
        .fallback(get_404_not_found)
        .with_state(state)
}
