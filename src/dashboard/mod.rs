//! Dashboard module
//!
//! Provides an overview page with aggregate statistics over the fraud record store.

mod cards;
mod handlers;
mod summary;

pub use handlers::get_dashboard_page;
