//! Entry-form handling: presence checks on raw input and the "currently editing" state.
//!
//! The store does not validate what it is given and does not know whether an edit is in
//! progress. Both concerns belong to whoever drives the store, which is what `ExpenseForm` and
//! `Editor` are for.

use crate::error::{Error, ErrorType};
use crate::model::{short_id, Amount, Expense};
use crate::store::{ExpenseStore, Persistence};
use crate::Result;
use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::debug;
use uuid::Uuid;

/// Raw values as typed into an entry form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseForm {
    pub amount: String,
    pub category: String,
    pub date: String,
    pub notes: String,
}

impl ExpenseForm {
    pub fn new(
        amount: impl Into<String>,
        category: impl Into<String>,
        date: impl Into<String>,
        notes: impl Into<String>,
    ) -> Self {
        Self {
            amount: amount.into(),
            category: category.into(),
            date: date.into(),
            notes: notes.into(),
        }
    }

    /// A form pre-filled with the values of `expense`.
    pub fn from_expense(expense: &Expense) -> Self {
        Self::new(
            expense.amount().to_string(),
            expense.category(),
            expense.date(),
            expense.notes(),
        )
    }

    /// Trims the input and checks that amount, category and date are present and that the amount
    /// is a number.
    ///
    /// # Errors
    /// - `ErrorType::Validation` when a required value is missing or the amount is not a number.
    pub fn validate(&self) -> Result<Expense> {
        let amount = self.amount.trim();
        let category = self.category.trim();
        let date = self.date.trim();
        if amount.is_empty() || category.is_empty() || date.is_empty() {
            return Err(Error::new(
                ErrorType::Validation,
                anyhow!("Please fill amount, category and date."),
            ));
        }
        let amount = Amount::from_str(amount).map_err(|e| {
            Error::new(
                ErrorType::Validation,
                anyhow!("The amount '{amount}' is not a number: {e}"),
            )
        })?;
        Ok(Expense::new(amount, category, date, self.notes.trim()))
    }
}

/// What `Editor::save` did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "action")]
pub enum Saved {
    Added { id: Uuid, persistence: Persistence },
    Updated { id: Uuid, persistence: Persistence },
}

impl Saved {
    pub fn id(&self) -> Uuid {
        match self {
            Saved::Added { id, .. } | Saved::Updated { id, .. } => *id,
        }
    }

    /// The first eight hex digits of `id()`, as shown in listings.
    pub fn short_id(&self) -> String {
        short_id(self.id())
    }

    pub fn persistence(&self) -> &Persistence {
        match self {
            Saved::Added { persistence, .. } | Saved::Updated { persistence, .. } => persistence,
        }
    }
}

/// Tracks whether the entry form is creating a new expense or editing an existing one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Editor {
    editing: Option<Uuid>,
}

impl Editor {
    pub fn new() -> Self {
        Self::default()
    }

    /// The expense being edited, if any.
    pub fn editing(&self) -> Option<Uuid> {
        self.editing
    }

    /// Switches to editing the expense with `id`, returning a form filled with its values.
    ///
    /// # Errors
    /// - `ErrorType::NotFound` if `store` has no expense with `id`. The editor is unchanged.
    pub fn start_edit(&mut self, store: &ExpenseStore, id: Uuid) -> Result<ExpenseForm> {
        let expense = store
            .position(id)
            .and_then(|ix| store.get(ix))
            .ok_or_else(|| Error::new(ErrorType::NotFound, anyhow!("Expense not found: {id}")))?;
        debug!("Editing expense {id}");
        self.editing = Some(id);
        Ok(ExpenseForm::from_expense(expense))
    }

    /// Abandons any edit in progress.
    pub fn cancel(&mut self) {
        self.editing = None;
    }

    /// Validates `form` and either updates the expense being edited or appends a new one. The
    /// editor returns to creating new expenses afterwards.
    ///
    /// # Errors
    /// - `ErrorType::Validation` if the form is incomplete. Nothing is changed and an edit in
    ///   progress stays in progress.
    /// - `ErrorType::NotFound` if the edited expense was deleted in the meantime.
    pub fn save(&mut self, store: &mut ExpenseStore, form: &ExpenseForm) -> Result<Saved> {
        let expense = form.validate()?;
        let saved = match self.editing {
            Some(id) => {
                let persistence = store.update(id, expense)?;
                Saved::Updated { id, persistence }
            }
            None => {
                let persistence = store.add(expense);
                // The store hands out a new id when the one given is already taken.
                let id = store.expenses().last().map(|e| e.id()).unwrap_or_default();
                Saved::Added { id, persistence }
            }
        };
        self.editing = None;
        Ok(saved)
    }
}
