//! Route handler for the dashboard page.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::html;
use rusqlite::Connection;

use crate::{
    AppState, Error,
    dashboard::{cards::summary_cards, summary::get_dashboard_summary},
    endpoints,
    html::{PAGE_CONTAINER_STYLE, base},
    navigation::NavBar,
};

/// The state needed for the dashboard page.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// The database connection for reading the fraud record store.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Display a page with aggregate statistics over the fraud record store.
pub async fn get_dashboard_page(State(state): State<DashboardState>) -> Result<Response, Error> {
    let summary = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        get_dashboard_summary(&connection)
            .inspect_err(|error| tracing::error!("could not get dashboard summary: {error}"))?
    };

    let content = html! {
        (NavBar::new(endpoints::DASHBOARD_VIEW).into_html())

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-screen-xl"
            {
                h1 class="text-2xl font-bold mb-6" { "Dashboard" }

                (summary_cards(&summary))
            }
        }
    };

    Ok(base("Dashboard", &[], &content).into_response())
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{extract::State, http::StatusCode};
    use rusqlite::Connection;
    use scraper::Selector;

    use crate::{
        db::initialize,
        record_store::{FraudRecord, create_record},
        test_utils::{assert_valid_html, parse_html_document},
    };

    use super::{DashboardState, get_dashboard_page};

    fn get_test_state() -> DashboardState {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();

        DashboardState {
            db_connection: Arc::new(Mutex::new(conn)),
        }
    }

    fn card_values(html: &scraper::Html) -> Vec<String> {
        html.select(&Selector::parse("section p").unwrap())
            .map(|p| p.text().collect::<String>().trim().to_owned())
            .collect()
    }

    #[tokio::test]
    async fn dashboard_shows_zeroes_for_empty_store() {
        let state = get_test_state();

        let response = get_dashboard_page(State(state)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        assert_eq!(card_values(&html), ["0", "0", "$0.00"]);
    }

    #[tokio::test]
    async fn dashboard_shows_record_totals() {
        let state = get_test_state();
        {
            let conn = state.db_connection.lock().unwrap();
            create_record(FraudRecord::build("TX-1", "C-1", 12.5), &conn).unwrap();
            create_record(
                FraudRecord::build("TX-2", "C-2", 7.25).fraud_label(true),
                &conn,
            )
            .unwrap();
        }

        let response = get_dashboard_page(State(state)).await.unwrap();

        let html = parse_html_document(response).await;
        assert_eq!(card_values(&html), ["2", "1", "$19.75"]);
    }
}
