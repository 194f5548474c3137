//! Route handler for the transactions page.

use std::sync::Arc;

use axum::{
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use axum_htmx::{HxHistoryRestoreRequest, HxRequest};
use maud::html;

use crate::{
    AppState, Error, endpoints,
    feed::{FeedSource, TransactionListParams, build_transaction_list},
    html::{HeadElement, PAGE_CONTAINER_STYLE, base},
    navigation::NavBar,
    pagination::PaginationConfig,
    transactions::{
        chart::{ECHARTS_SCRIPT_URL, chart_script, chart_view, daily_transactions_chart},
        view::{filter_form, transactions_table},
    },
};

/// The state needed for the transactions page.
#[derive(Debug, Clone)]
pub struct TransactionsState {
    /// Where to read the transaction feed from.
    pub feed_source: Arc<dyn FeedSource>,
    /// Configuration for pagination controls.
    pub pagination_config: PaginationConfig,
}

impl FromRef<AppState> for TransactionsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            feed_source: state.feed_source.clone(),
            pagination_config: state.pagination_config.clone(),
        }
    }
}

/// Render the filtered, paginated transaction feed.
///
/// The feed is read again on every request. HTMX requests, which come from
/// the page links, only get the table so that the chart is not redrawn.
/// History restores after a cache miss get the full page.
pub async fn get_transactions_page(
    State(state): State<TransactionsState>,
    HxRequest(is_htmx_request): HxRequest,
    HxHistoryRestoreRequest(is_history_restore): HxHistoryRestoreRequest,
    Query(params): Query<TransactionListParams>,
) -> Result<Response, Error> {
    let feed_source = state.feed_source.clone();
    let feed = tokio::task::spawn_blocking(move || feed_source.load())
        .await
        .map_err(|error| Error::FeedRead(format!("the feed loading task failed: {error}")))?
        .inspect_err(|error| tracing::error!("could not load the transaction feed: {error}"))?;

    let context = build_transaction_list(feed, &params, state.pagination_config.page_size);
    let max_pages = state.pagination_config.max_pages;

    if is_htmx_request && !is_history_restore {
        return Ok(transactions_table(&context, max_pages).into_response());
    }

    let chart = daily_transactions_chart(&context);
    let head_elements = [
        HeadElement::ScriptLink(ECHARTS_SCRIPT_URL.to_owned()),
        chart_script(&chart),
    ];

    let content = html! {
        (NavBar::new(endpoints::TRANSACTIONS_VIEW).into_html())

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-screen-xl"
            {
                h1 class="text-2xl font-bold mb-6" { "Transactions" }

                (filter_form(&context))
                (chart_view(&context))
                (transactions_table(&context, max_pages))
            }
        }
    };

    Ok(base("Transactions", &head_elements, &content).into_response())
}
