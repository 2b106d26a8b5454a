//! Command handlers for the expenses CLI.
//!
//! This module contains implementations for all CLI subcommands. Each handler opens the store
//! from the `Config`, does its work and returns an `Out` describing the result.

mod add;
mod chart;
mod delete;
mod export;
mod init;
mod list;
mod summary;
mod update;

use crate::args::{Selector, Target};
use crate::error::{Error, ErrorType};
use crate::store::{ExpenseStore, Persistence};
use crate::Result;
use anyhow::anyhow;
use serde::Serialize;
use std::fmt::Debug;
use tracing::{debug, info};

pub use add::add;
pub use chart::chart;
pub use delete::delete;
pub use export::export;
pub use init::init;
pub use list::list;
pub use summary::summary;
pub use update::update;

/// The output type for a command. This allows the command to return a consistent message and,
/// optionally, structured data.
#[derive(Debug, Clone, Serialize)]
pub struct Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// A message that can be printed to the user regarding the outcome of the command execution.
    message: String,

    /// Any structured data that needs to be output from the call.
    structure: Option<T>,
}

impl<T, S> From<S> for Out<T>
where
    T: Debug + Clone + Serialize,
    S: Into<String>,
{
    fn from(value: S) -> Self {
        Out::new_message(value)
    }
}

impl<T> Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// Create a new `Out` object that has `Some(structure)`.
    pub fn new<S>(message: S, structure: T) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: Some(structure),
        }
    }

    /// Create a new `Out` object that has `None` for `structure`.
    pub fn new_message<S>(message: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: None,
        }
    }

    /// Get the `message`.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the structured data stored in `structure`.
    pub fn structure(&self) -> Option<&T> {
        self.structure.as_ref()
    }

    /// Print the message to `info!` and the structured data (if it exists) as JSON to `debug!`.
    pub fn print(&self) {
        info!("{}", self.message);
        if let Some(structure) = self.structure() {
            if let Ok(json) = serde_json::to_string_pretty(structure) {
                debug!("Command output:\n\n{json}\n\n");
            }
        }
    }
}

/// Finds the position of the expense that `selector` refers to.
pub(crate) fn select(store: &ExpenseStore, selector: &Selector) -> Result<usize> {
    match selector.target() {
        Target::Id(needle) => store.resolve(needle),
        Target::Position(index) if index < store.len() => Ok(index),
        Target::Position(index) => Err(Error::new(
            ErrorType::OutOfBounds,
            anyhow!(
                "No expense at position {index}, there {}",
                match store.len() {
                    1 => "is 1 expense".to_string(),
                    n => format!("are {n} expenses"),
                }
            ),
        )),
    }
}

/// Appended to a message when a change could only be kept in memory.
pub(crate) fn persistence_note(persistence: &Persistence) -> String {
    match persistence {
        Persistence::Saved => String::new(),
        Persistence::NotSaved { reason } => format!(" (not saved: {reason})"),
    }
}
