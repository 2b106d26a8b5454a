//! Chart-ready datasets: parallel label, value and color lists that a renderer can draw without
//! knowing anything about expenses.

use crate::aggregate::{category_totals, monthly_totals};
use crate::model::{Amount, Expense};
use serde::{Deserialize, Serialize};

pub const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

const PALETTE: [&str; 12] = [
    "#4A60FF", "#FF7A59", "#FFD66E", "#3DDC97", "#7C4DFF", "#FF6FB5", "#66C2FF", "#FFB86B",
    "#7BE495", "#9EA8FF", "#FF8A8A", "#B9F18A",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    /// Spending share per category.
    Pie,
    /// Spending per month of one year.
    Bar,
}

serde_plain::derive_display_from_serialize!(ChartKind);
serde_plain::derive_fromstr_from_deserialize!(ChartKind);

/// `labels`, `values` and `colors` always have the same length.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
    pub kind: ChartKind,
    pub title: String,
    pub labels: Vec<String>,
    pub values: Vec<Amount>,
    pub colors: Vec<String>,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// The largest value, or zero for an empty dataset.
    pub fn max(&self) -> Amount {
        self.values.iter().copied().max().unwrap_or_default()
    }
}

/// `n` colors, cycling through a fixed palette.
pub fn palette(n: usize) -> Vec<String> {
    PALETTE.iter().cycle().take(n).map(|c| c.to_string()).collect()
}

/// The category distribution over all expenses, in first-appearance order.
pub fn pie(expenses: &[Expense]) -> Dataset {
    let (labels, values): (Vec<String>, Vec<Amount>) = category_totals(expenses)
        .into_iter()
        .map(|t| (t.category, t.total))
        .unzip();
    Dataset {
        kind: ChartKind::Pie,
        title: "Spending by Category".to_string(),
        colors: palette(labels.len()),
        labels,
        values,
    }
}

/// Monthly totals for `year`, January through December.
pub fn bar(expenses: &[Expense], year: i32) -> Dataset {
    Dataset {
        kind: ChartKind::Bar,
        title: format!("Monthly Spend {year}"),
        labels: MONTH_LABELS.iter().map(|m| m.to_string()).collect(),
        values: monthly_totals(expenses, year).to_vec(),
        colors: palette(12),
    }
}
