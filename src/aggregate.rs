//! Summary numbers and chart datasets derived from the expense collection.
//!
//! These are always computed over the full collection, regardless of which filter is active for
//! the listing.

use crate::model::{Amount, Expense};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// The summed amount of one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub category: String,
    pub total: Amount,
}

/// The headline numbers shown alongside the expense list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub total: Amount,
    pub current_month_total: Amount,
    pub entry_count: usize,
    /// `None` when there are no expenses.
    pub top_category: Option<String>,
}

impl Summary {
    /// Computes every summary value, treating `today` as the current date.
    pub fn compute(expenses: &[Expense], today: NaiveDate) -> Self {
        Self {
            total: total_all(expenses),
            current_month_total: total_current_month(expenses, today),
            entry_count: entry_count(expenses),
            top_category: top_category(expenses),
        }
    }
}

/// The sum of every amount.
pub fn total_all(expenses: &[Expense]) -> Amount {
    expenses.iter().map(Expense::amount).sum()
}

/// The sum of amounts dated in the same month and year as `today`.
pub fn total_current_month(expenses: &[Expense], today: NaiveDate) -> Amount {
    expenses
        .iter()
        .filter(|e| {
            e.parsed_date()
                .is_some_and(|d| d.year() == today.year() && d.month() == today.month())
        })
        .map(Expense::amount)
        .sum()
}

pub fn entry_count(expenses: &[Expense]) -> usize {
    expenses.len()
}

/// Sums amounts by category. Categories appear in the order they are first seen.
pub fn category_totals(expenses: &[Expense]) -> Vec<CategoryTotal> {
    let mut totals: Vec<CategoryTotal> = Vec::new();
    for e in expenses {
        match totals.iter_mut().find(|t| t.category == e.category()) {
            Some(t) => t.total += e.amount(),
            None => totals.push(CategoryTotal {
                category: e.category().to_string(),
                total: e.amount(),
            }),
        }
    }
    totals
}

/// The category with the highest total. On a tie the category seen first wins.
pub fn top_category(expenses: &[Expense]) -> Option<String> {
    let mut best: Option<CategoryTotal> = None;
    for t in category_totals(expenses) {
        if best.as_ref().map_or(true, |b| t.total > b.total) {
            best = Some(t);
        }
    }
    best.map(|t| t.category)
}

/// Sums amounts by month for `year`, indexed 0 = January through 11 = December. Expenses whose
/// date does not parse are skipped.
pub fn monthly_totals(expenses: &[Expense], year: i32) -> [Amount; 12] {
    let mut months = [Amount::ZERO; 12];
    for e in expenses {
        if let Some(d) = e.parsed_date() {
            if d.year() == year {
                months[d.month0() as usize] += e.amount();
            }
        }
    }
    months
}
