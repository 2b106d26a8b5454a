//! CSV export of the expense collection.

use crate::error::{ErrorType, IntoResult, Res};
use crate::model::Expense;
use crate::Result;
use anyhow::Context;
use chrono::NaiveDate;

pub const HEADERS: [&str; 4] = ["Amount", "Category", "Date", "Notes"];

/// Renders `expenses` as CSV with a header row. Every cell is quoted and quotes inside a cell are
/// doubled.
pub fn to_csv(expenses: &[Expense]) -> Result<String> {
    write_csv(expenses).pub_result(ErrorType::Export)
}

fn write_csv(expenses: &[Expense]) -> Res<String> {
    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    writer
        .write_record(HEADERS)
        .context("Unable to write the CSV header")?;
    for e in expenses {
        writer
            .write_record([
                e.amount().to_string().as_str(),
                e.category(),
                e.date(),
                e.notes(),
            ])
            .with_context(|| format!("Unable to write expense {} as CSV", e.id()))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Unable to finish writing CSV: {e}"))?;
    String::from_utf8(bytes).context("CSV output was not valid UTF-8")
}

/// The name of an export file made on `date`, e.g. `expenses_2024-03-05.csv`.
pub fn file_name(date: NaiveDate) -> String {
    format!("expenses_{}.csv", date.format("%Y-%m-%d"))
}
