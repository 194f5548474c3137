use maud::{Markup, html};

use crate::{dashboard::summary::DashboardSummary, endpoints, html::format_currency};

fn card(title: &str, value: &str, link: Option<(&str, &str)>) -> Markup {
    html! {
        div
            class="flex flex-col justify-between p-6 bg-white border border-gray-200
                rounded-lg shadow dark:bg-gray-800 dark:border-gray-700"
        {
            h2 class="mb-2 text-sm font-medium text-gray-500 dark:text-gray-400 uppercase"
            {
                (title)
            }

            p class="text-3xl font-bold tracking-tight text-gray-900 dark:text-white"
            {
                (value)
            }

            @if let Some((url, text)) = link {
                a
                    href=(url)
                    class="mt-4 text-sm font-medium text-blue-600 hover:underline dark:text-blue-500"
                {
                    (text)
                }
            }
        }
    }
}

/// The total, fraud and volume cards.
pub(super) fn summary_cards(summary: &DashboardSummary) -> Markup {
    let fraud_only_url = format!("{}?fraud=1", endpoints::TRANSACTIONS_VIEW);

    html! {
        section class="grid w-full gap-4 md:grid-cols-3"
        {
            (card(
                "Total transactions",
                &summary.total_transactions.to_string(),
                Some((endpoints::TRANSACTIONS_VIEW, "View transactions")),
            ))
            (card(
                "Fraudulent transactions",
                &summary.fraud_transactions.to_string(),
                Some((&fraud_only_url, "View fraud")),
            ))
            (card("Total volume", &format_currency(summary.total_volume), None))
        }
    }
}
