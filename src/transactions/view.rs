//! The filter form, table and page links of the transactions page.

use maud::{Markup, html};
use serde::Serialize;
use time::{PrimitiveDateTime, format_description::BorrowedFormatItem, macros::format_description};
use unicode_segmentation::UnicodeSegmentation;

use crate::{
    endpoints,
    feed::{FeedRow, TransactionListContext},
    html::{
        BUTTON_PRIMARY_STYLE, BUTTON_SECONDARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE,
        FRAUD_BADGE_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, format_currency,
    },
    pagination::{PaginationIndicator, create_pagination_indicators},
};

/// The ID of the element that HTMX swaps when changing pages.
pub(super) const TABLE_ID: &str = "transactions-table";

/// The max number of graphemes to display in a passthrough cell before
/// truncating it.
const MAX_CELL_GRAPHEMES: usize = 32;

const TIMESTAMP_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

/// The query string of a link to another page with the same filters.
#[derive(Serialize)]
struct PageQuery<'a> {
    #[serde(skip_serializing_if = "str::is_empty")]
    from: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    to: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    fraud: Option<&'a str>,
    #[serde(skip_serializing_if = "str::is_empty")]
    search: &'a str,
    page: usize,
}

pub(super) fn page_url(context: &TransactionListContext, page: usize) -> String {
    let query = PageQuery {
        from: &context.from_date,
        to: &context.to_date,
        fraud: context.fraud_only.then_some("1"),
        search: &context.search,
        page,
    };

    match serde_urlencoded::to_string(&query) {
        Ok(query) => format!("{}?{query}", endpoints::TRANSACTIONS_VIEW),
        Err(error) => {
            tracing::error!("could not encode the page query: {error}");
            format!("{}?page={page}", endpoints::TRANSACTIONS_VIEW)
        }
    }
}

fn format_timestamp(timestamp: PrimitiveDateTime) -> String {
    timestamp
        .format(TIMESTAMP_FORMAT)
        .unwrap_or_else(|_| timestamp.to_string())
}

fn truncate_cell(text: &str) -> (String, Option<&str>) {
    if text.graphemes(true).count() <= MAX_CELL_GRAPHEMES {
        return (text.to_owned(), None);
    }

    let truncated: String = text.graphemes(true).take(MAX_CELL_GRAPHEMES - 3).collect();

    (truncated + "...", Some(text))
}

/// The form that sets the date, fraud and search filters.
///
/// The fields are filled in with the filters of the current page.
pub(super) fn filter_form(context: &TransactionListContext) -> Markup {
    html! {
        form
            method="get"
            action=(endpoints::TRANSACTIONS_VIEW)
            class="w-full grid grid-cols-1 md:grid-cols-5 gap-4 items-end mb-6"
        {
            div
            {
                label for="from" class=(FORM_LABEL_STYLE) { "From" }
                input
                    type="date"
                    name="from"
                    id="from"
                    value=(context.from_date)
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="to" class=(FORM_LABEL_STYLE) { "To" }
                input
                    type="date"
                    name="to"
                    id="to"
                    value=(context.to_date)
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div class="md:col-span-2"
            {
                label for="search" class=(FORM_LABEL_STYLE) { "Search" }
                input
                    type="search"
                    name="search"
                    id="search"
                    placeholder="Transaction or customer ID"
                    value=(context.search)
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div class="flex items-center gap-4"
            {
                label class="inline-flex items-center gap-2 text-sm font-medium"
                {
                    input
                        type="checkbox"
                        name="fraud"
                        value="1"
                        checked[context.fraud_only]
                        class="w-4 h-4 rounded";
                    "Fraud only"
                }

                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Filter" }
            }
        }
    }
}

fn transaction_row(row: &FeedRow) -> Markup {
    html! {
        tr class=(TABLE_ROW_STYLE)
        {
            td class=(TABLE_CELL_STYLE) { (row.transaction_id) }
            td class=(TABLE_CELL_STYLE) { (row.customer_id) }
            td class=(TABLE_CELL_STYLE)
            {
                time datetime=(format_timestamp(row.transaction_timestamp))
                {
                    (format_timestamp(row.transaction_timestamp))
                }
            }
            td class={(TABLE_CELL_STYLE) " text-right"}
            {
                @match row.transaction_amount {
                    Some(amount) => (format_currency(amount)),
                    None => "-",
                }
            }
            td class=(TABLE_CELL_STYLE)
            {
                @if row.fraud_label {
                    span class=(FRAUD_BADGE_STYLE) { "Fraud" }
                }
            }
            @for value in &row.passthrough {
                @let (text, full_text) = truncate_cell(value);
                td class=(TABLE_CELL_STYLE) title=[full_text] { (text) }
            }
        }
    }
}

fn pagination_view(context: &TransactionListContext, max_pages: usize) -> Markup {
    let indicators = create_pagination_indicators(context.page, context.total_pages, max_pages);

    html! {
        nav aria-label="Transaction pages" class="pagination flex justify-center mt-4"
        {
            ul class="inline-flex -space-x-px text-sm"
            {
                @for indicator in indicators {
                    li { (indicator_view(context, indicator)) }
                }
            }
        }
    }
}

fn indicator_view(context: &TransactionListContext, indicator: PaginationIndicator) -> Markup {
    let page_link = |page: usize, text: String, rel: Option<&str>| {
        let url = page_url(context, page);

        html! {
            a
                href=(url)
                hx-get=(url)
                hx-target={"#" (TABLE_ID)}
                hx-swap="outerHTML"
                hx-push-url="true"
                rel=[rel]
                class="block px-3 py-2 border border-gray-300 hover:bg-gray-100 \
                    dark:border-gray-700 dark:hover:bg-gray-700"
            {
                (text)
            }
        }
    };

    match indicator {
        PaginationIndicator::Page(page) => page_link(page, page.to_string(), None),
        PaginationIndicator::CurrPage(page) => html! {
            span
                aria-current="page"
                class="block px-3 py-2 border border-blue-300 bg-blue-50 text-blue-600 \
                    dark:border-gray-700 dark:bg-gray-700 dark:text-white"
            {
                (page)
            }
        },
        PaginationIndicator::Ellipsis => html! {
            span class="block px-3 py-2 border border-gray-300 dark:border-gray-700" { "..." }
        },
        PaginationIndicator::BackButton(page) => page_link(page, "Previous".to_owned(), Some("prev")),
        PaginationIndicator::NextButton(page) => page_link(page, "Next".to_owned(), Some("next")),
    }
}

/// The table of transactions on the current page followed by links to the other pages.
///
/// This is the part of the page that is replaced when HTMX requests another page.
pub(super) fn transactions_table(context: &TransactionListContext, max_pages: usize) -> Markup {
    let column_count = 5 + context.passthrough_columns.len();

    html! {
        section id=(TABLE_ID) class="w-full"
        {
            p class="mb-2 text-sm text-gray-600 dark:text-gray-400"
            {
                "Page " (context.page) " of " (context.total_pages)
                " (" (context.total_rows) " transactions)"
            }

            div class="relative overflow-x-auto shadow-md rounded"
            {
                table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
                {
                    thead class=(TABLE_HEADER_STYLE)
                    {
                        tr
                        {
                            th scope="col" class=(TABLE_CELL_STYLE) { "Transaction ID" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Customer ID" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Timestamp" }
                            th scope="col" class={(TABLE_CELL_STYLE) " text-right"} { "Amount" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Label" }
                            @for column in &context.passthrough_columns {
                                th scope="col" class=(TABLE_CELL_STYLE) { (column) }
                            }
                        }
                    }

                    tbody
                    {
                        @for row in &context.transactions {
                            (transaction_row(row))
                        }

                        @if context.transactions.is_empty() {
                            tr class=(TABLE_ROW_STYLE)
                            {
                                td colspan=(column_count) class={(TABLE_CELL_STYLE) " text-center"}
                                {
                                    "No transactions match the filters."
                                }
                            }
                        }
                    }
                }
            }

            @if context.total_pages > 1 {
                (pagination_view(context, max_pages))
            }

            @if context.has_prev || context.has_next {
                div class="flex justify-between mt-4"
                {
                    @if context.has_prev {
                        a href=(page_url(context, context.page - 1)) class=(BUTTON_SECONDARY_STYLE)
                        {
                            "Newer"
                        }
                    } @else {
                        span {}
                    }

                    @if context.has_next {
                        a href=(page_url(context, context.page + 1)) class=(BUTTON_SECONDARY_STYLE)
                        {
                            "Older"
                        }
                    }
                }
            }
        }
    }
}
