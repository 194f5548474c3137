//! Success and error banners shown at the top of a page.

use maud::{Markup, html};

/// Alert message types for styling
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AlertType {
    Success,
    Error,
}

pub struct Alert<'a> {
    pub alert_type: AlertType,
    pub message: &'a str,
}

impl<'a> Alert<'a> {
    pub fn success(message: &'a str) -> Self {
        Self {
            alert_type: AlertType::Success,
            message,
        }
    }

    pub fn error(message: &'a str) -> Self {
        Self {
            alert_type: AlertType::Error,
            message,
        }
    }

    pub fn into_html(self) -> Markup {
        let style = match self.alert_type {
            AlertType::Success => {
                "p-4 mb-4 text-sm text-green-800 rounded-lg bg-green-50 \
                dark:bg-gray-800 dark:text-green-400"
            }
            AlertType::Error => {
                "p-4 mb-4 text-sm text-red-800 rounded-lg bg-red-50 \
                dark:bg-gray-800 dark:text-red-400"
            }
        };

        html! {
            div class=(style) role="alert" { (self.message) }
        }
    }
}
