//! A personal expense tracker.
//!
//! `store::ExpenseStore` owns the collection of expenses and persists it to a `store::BlobStore`
//! after every change. `filter` narrows the collection down for display, `aggregate` and `chart`
//! derive summary numbers and chart datasets from it, and `export` renders it as CSV. `form`
//! validates raw input and tracks whether an edit is in progress.

pub mod aggregate;
pub mod args;
pub mod chart;
pub mod commands;
mod config;
mod error;
pub mod export;
pub mod filter;
pub mod form;
mod fs;
pub mod model;
pub mod store;
#[cfg(test)]
mod test;
mod utils;

pub use config::Config;
pub use error::{Error, ErrorType, Result};
