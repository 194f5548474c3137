//! The daily transactions chart shown above the transaction table.
//!
//! The chart is an ECharts line chart. Its options are built on the server
//! and passed to the page in an initialization script, and the raw series are
//! also written to `data-*` attributes on the chart container.

use charming::{
    Chart,
    component::{Axis, Grid, Legend, Title},
    element::{AxisType, Tooltip, Trigger},
    series::Line,
};
use maud::{Markup, PreEscaped, html};

use crate::{feed::TransactionListContext, html::HeadElement};

/// The HTML element ID of the chart container.
pub(super) const CHART_ID: &str = "daily-transactions-chart";

/// The URL of the ECharts library.
pub(super) const ECHARTS_SCRIPT_URL: &str =
    "https://cdn.jsdelivr.net/npm/echarts@6.0.0/dist/echarts.min.js";

fn to_chart_values(counts: &[u64]) -> Vec<i64> {
    counts
        .iter()
        .map(|&count| i64::try_from(count).unwrap_or(i64::MAX))
        .collect()
}

/// Build a chart of the number of transactions and fraud transactions per day.
pub(super) fn daily_transactions_chart(context: &TransactionListContext) -> Chart {
    let series = &context.chart;

    Chart::new()
        .title(
            Title::new()
                .text("Transactions per day")
                .subtext("All transactions matching the filters"),
        )
        .tooltip(Tooltip::new().trigger(Trigger::Axis))
        .legend(Legend::new().left("center").top("1%"))
        .grid(
            Grid::new()
                .left("3%")
                .right("4%")
                .bottom("3%")
                .contain_label(true),
        )
        .x_axis(
            Axis::new()
                .type_(AxisType::Category)
                .data(series.labels.clone()),
        )
        .y_axis(Axis::new().type_(AxisType::Value))
        .series(
            Line::new()
                .name("Transactions")
                .data(to_chart_values(&series.totals)),
        )
        .series(
            Line::new()
                .name("Fraud")
                .data(to_chart_values(&series.frauds)),
        )
}

/// Renders the chart container.
///
/// The container carries the chart labels and both series as JSON arrays.
pub(super) fn chart_view(context: &TransactionListContext) -> Markup {
    html! {
        section id="charts" class="w-full mx-auto mb-6"
        {
            div
                id=(CHART_ID)
                class="min-h-[380px] rounded dark:bg-gray-100"
                data-chart-labels=(context.chart_labels_json())
                data-total-tx=(context.total_tx_json())
                data-fraud-tx=(context.fraud_tx_json())
            {}
        }
    }
}

/// Generates the JavaScript that initializes the chart once the page has loaded.
pub(super) fn chart_script(chart: &Chart) -> HeadElement {
    let script = format!(
        r#"document.addEventListener('DOMContentLoaded', function() {{
    const chartDom = document.getElementById("{CHART_ID}");
    const chart = echarts.init(chartDom);
    const option = {chart};
    chart.setOption(option);

    window.addEventListener('resize', chart.resize);

    const darkModeMediaQuery = window.matchMedia('(prefers-color-scheme: dark)');
    const updateTheme = () => {{
        chart.setTheme(darkModeMediaQuery.matches ? 'dark' : 'default');
    }};
    darkModeMediaQuery.addEventListener('change', updateTheme);
    updateTheme();
}});"#
    );

    HeadElement::ScriptSource(PreEscaped(script))
}

#[cfg(test)]
mod tests {
    use crate::{
        feed::{DailySeries, TransactionListContext},
        html::HeadElement,
    };

    use super::{CHART_ID, ECHARTS_SCRIPT_URL, chart_script, daily_transactions_chart};

    fn context_with_series() -> TransactionListContext {
        TransactionListContext {
            transactions: Vec::new(),
            page: 1,
            total_pages: 1,
            has_prev: false,
            has_next: false,
            total_rows: 5,
            chart: DailySeries {
                labels: vec!["2024-02-01".to_owned(), "2024-02-02".to_owned()],
                totals: vec![3, 2],
                frauds: vec![1, 0],
            },
            from_date: String::new(),
            to_date: String::new(),
            fraud_only: false,
            search: String::new(),
            passthrough_columns: Vec::new(),
        }
    }

    #[test]
    fn chart_options_contain_labels_and_series() {
        let options = daily_transactions_chart(&context_with_series()).to_string();

        assert!(options.contains("2024-02-01"), "labels missing: {options}");
        assert!(options.contains("\"Transactions\""), "series missing: {options}");
        assert!(options.contains("\"Fraud\""), "series missing: {options}");
    }

    #[test]
    fn script_initializes_chart_container() {
        let chart = daily_transactions_chart(&context_with_series());

        let HeadElement::ScriptSource(script) = chart_script(&chart) else {
            panic!("want a script source");
        };

        assert!(script.0.contains(CHART_ID));
        assert!(script.0.contains("echarts.init"));
    }

    #[test]
    fn theme_switching_uses_an_echarts_version_with_set_theme() {
        let chart = daily_transactions_chart(&context_with_series());

        let HeadElement::ScriptSource(script) = chart_script(&chart) else {
            panic!("want a script source");
        };

        assert!(script.0.contains("chart.setTheme("));
        assert!(
            ECHARTS_SCRIPT_URL.contains("/echarts@6."),
            "setTheme needs ECharts 6, got {ECHARTS_SCRIPT_URL}"
        );
    }
}
