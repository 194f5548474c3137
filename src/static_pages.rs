//! Pages without any data: the public home and product pages, and the
//! placeholder pages for areas of the dashboard that have no data source yet.

use axum::response::{IntoResponse, Response};
use maud::{Markup, html};

use crate::{
    endpoints,
    html::{BUTTON_SECONDARY_STYLE, PAGE_CONTAINER_STYLE, base, link},
    navigation::NavBar,
};

const BUTTON_CALL_TO_ACTION_STYLE: &str = "inline-flex justify-center items-center py-3 px-5 \
    text-base font-medium text-center text-white rounded-lg bg-blue-700 hover:bg-blue-800 \
    focus:ring-4 focus:ring-blue-300 dark:focus:ring-blue-900";

fn hero(title: &str, tagline: &str, actions: Markup) -> Markup {
    html! {
        section class="bg-white dark:bg-gray-900"
        {
            div class="py-8 px-4 mx-auto max-w-screen-xl text-center lg:py-16"
            {
                h1
                    class="mb-4 text-4xl font-extrabold tracking-tight leading-none
                        text-gray-900 md:text-5xl lg:text-6xl dark:text-white"
                {
                    (title)
                }

                p
                    class="mb-8 text-lg font-normal text-gray-500 lg:text-xl
                        sm:px-16 lg:px-48 dark:text-gray-400"
                {
                    (tagline)
                }

                div class="flex flex-col space-y-4 sm:flex-row sm:justify-center sm:space-y-0 sm:space-x-4"
                {
                    (actions)
                }
            }
        }
    }
}

/// Display the public home page.
pub async fn get_home_page() -> Response {
    let content = hero(
        "MUMU",
        "Spot fraudulent transactions before they turn into chargebacks.",
        html! {
            a href=(endpoints::LOG_IN_VIEW) class=(BUTTON_CALL_TO_ACTION_STYLE) { "Log in" }
            a href=(endpoints::SIGN_UP_VIEW) class=(BUTTON_SECONDARY_STYLE) { "Sign up" }
        },
    );

    base("Home", &[], &content).into_response()
}

/// Display the product page, where users land after logging in.
pub async fn get_mumu_page() -> Response {
    let content = hero(
        "Welcome to MUMU",
        "Review the latest transactions, filter down to suspected fraud and keep an eye on \
        the overall fraud rate.",
        html! {
            a href=(endpoints::DASHBOARD_VIEW) class=(BUTTON_CALL_TO_ACTION_STYLE) { "Open the dashboard" }
            a href=(endpoints::TRANSACTIONS_VIEW) class=(BUTTON_SECONDARY_STYLE) { "Browse transactions" }
        },
    );

    base("MUMU", &[], &content).into_response()
}

fn placeholder_page(endpoint: &str, title: &str, description: &str) -> Response {
    let content = html! {
        (NavBar::new(endpoint).into_html())

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-screen-xl"
            {
                h1 class="text-2xl font-bold mb-4" { (title) }

                p class="mb-4" { (description) }

                p { "In the meantime, " (link(endpoints::TRANSACTIONS_VIEW, "browse the transaction feed")) "." }
            }
        }
    };

    base(title, &[], &content).into_response()
}

pub async fn get_fraud_page() -> Response {
    placeholder_page(
        endpoints::FRAUD_VIEW,
        "Fraud",
        "Fraud case management will appear here.",
    )
}

pub async fn get_orders_page() -> Response {
    placeholder_page(
        endpoints::ORDERS_VIEW,
        "Orders",
        "Order history will appear here.",
    )
}

pub async fn get_chargebacks_page() -> Response {
    placeholder_page(
        endpoints::CHARGEBACKS_VIEW,
        "Chargebacks",
        "Chargeback disputes will appear here.",
    )
}

pub async fn get_models_page() -> Response {
    placeholder_page(
        endpoints::MODELS_VIEW,
        "Models",
        "Fraud scoring models and their performance will appear here.",
    )
}
