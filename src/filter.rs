//! Narrowing the collection down to the expenses a user wants to see.
//!
//! A `Filter` is applied in three stages (category, then month, then free-text query). Each stage
//! keeps the relative order of what it is given and nothing is ever modified.

use crate::model::Expense;
use std::collections::BTreeSet;
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// The value used by selectors to mean "no restriction".
pub const ALL: &str = "all";

/// Restricts expenses to a single category, compared exactly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(String),
}

impl FromStr for CategoryFilter {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || s == ALL {
            Ok(CategoryFilter::All)
        } else {
            Ok(CategoryFilter::Only(s.to_string()))
        }
    }
}

impl Display for CategoryFilter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CategoryFilter::All => f.write_str(ALL),
            CategoryFilter::Only(category) => f.write_str(category),
        }
    }
}

/// Restricts expenses to a calendar month (1 = January), in any year.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum MonthFilter {
    #[default]
    All,
    Month(u32),
}

impl MonthFilter {
    /// The values offered by a month selector: `all`, `01` through `12`.
    pub fn options() -> Vec<String> {
        std::iter::once(ALL.to_string())
            .chain((1..=12).map(|m| format!("{m:02}")))
            .collect()
    }
}

/// An error for a month selector value that is neither `all` nor 1 through 12.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthFilterError(String);

impl Display for MonthFilterError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Invalid month '{}', expected 'all' or a month number from 1 to 12",
            self.0
        )
    }
}

impl std::error::Error for MonthFilterError {}

impl FromStr for MonthFilter {
    type Err = MonthFilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case(ALL) {
            return Ok(MonthFilter::All);
        }
        match s.parse::<u32>() {
            Ok(m) if (1..=12).contains(&m) => Ok(MonthFilter::Month(m)),
            _ => Err(MonthFilterError(s.to_string())),
        }
    }
}

impl Display for MonthFilter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            MonthFilter::All => f.write_str(ALL),
            MonthFilter::Month(m) => write!(f, "{m:02}"),
        }
    }
}

/// The category selector, month selector and search text that decide which expenses are shown.
///
/// `Filter::default()` lets everything through.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    pub category: CategoryFilter,
    pub month: MonthFilter,
    pub query: String,
}

impl Filter {
    pub fn new(category: CategoryFilter, month: MonthFilter, query: impl Into<String>) -> Self {
        Self {
            category,
            month,
            query: query.into(),
        }
    }

    pub fn is_identity(&self) -> bool {
        self.category == CategoryFilter::All
            && self.month == MonthFilter::All
            && self.query.is_empty()
    }

    /// Returns the expenses that pass every stage, in their original order.
    pub fn apply<'a>(&self, expenses: &'a [Expense]) -> Vec<&'a Expense> {
        self.apply_indexed(expenses)
            .into_iter()
            .map(|(_, e)| e)
            .collect()
    }

    /// Like `apply`, but each expense comes with its position in `expenses`.
    pub fn apply_indexed<'a>(&self, expenses: &'a [Expense]) -> Vec<(usize, &'a Expense)> {
        let mut list: Vec<(usize, &Expense)> = expenses.iter().enumerate().collect();

        if let CategoryFilter::Only(category) = &self.category {
            list.retain(|(_, e)| e.category() == category);
        }

        if let MonthFilter::Month(month) = self.month {
            // Expenses whose date does not parse never match a month.
            list.retain(|(_, e)| e.month() == Some(month));
        }

        let query = self.query.to_lowercase();
        if !query.is_empty() {
            list.retain(|(_, e)| {
                e.notes().to_lowercase().contains(&query)
                    || e.category().to_lowercase().contains(&query)
            });
        }

        list
    }
}

/// The distinct categories present in `expenses`, sorted, for a category selector.
pub fn categories(expenses: &[Expense]) -> Vec<String> {
    expenses
        .iter()
        .map(|e| e.category().to_string())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
