//! The transactions page: the transaction feed filtered, charted and split into pages.

mod chart;
mod page;
mod view;

pub use page::get_transactions_page;
