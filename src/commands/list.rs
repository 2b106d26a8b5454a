use crate::args::{ListArgs, ListFormat};
use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::filter::Filter;
use crate::model::Expense;
use crate::{Config, Result};
use anyhow::Context;

const HEADERS: [&str; 6] = ["#", "ID", "Amount", "Category", "Date", "Notes"];

/// Lists the expenses that pass the category, month and query filters in `args`, in the order
/// they were added. The first column is the position to use with `--at`.
pub async fn list(config: Config, args: ListArgs) -> Result<Out<Vec<Expense>>> {
    let store = config.open_store()?;
    let filter = Filter::new(args.category().clone(), args.month(), args.query());
    let rows = filter.apply_indexed(store.expenses());
    let structure: Vec<Expense> = rows.iter().map(|(_, e)| (*e).clone()).collect();

    let message = match args.format() {
        ListFormat::Json => serde_json::to_string_pretty(&structure)
            .context("Unable to serialize expenses")
            .pub_result(ErrorType::Storage)?,
        ListFormat::Table if rows.is_empty() => {
            if store.is_empty() {
                "No expenses recorded yet".to_string()
            } else {
                format!("No expenses match, {} hidden by the filter", store.len())
            }
        }
        ListFormat::Table => format!(
            "{}\nShowing {} of {} expense{}",
            render_table(&rows, config.currency_symbol()),
            rows.len(),
            store.len(),
            if store.len() == 1 { "" } else { "s" }
        ),
    };
    Ok(Out::new(message, structure))
}

fn render_table(rows: &[(usize, &Expense)], symbol: &str) -> String {
    let cells: Vec<[String; 6]> = rows
        .iter()
        .map(|(ix, e)| {
            [
                ix.to_string(),
                e.short_id(),
                e.amount().display_with(symbol),
                e.category().to_string(),
                e.date().to_string(),
                e.notes().to_string(),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(|h| h.chars().count());
    for row in &cells {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let headers = HEADERS.map(String::from);
    let mut lines = vec![render_row(&headers, &widths)];
    lines.push(
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("  "),
    );
    lines.extend(cells.iter().map(|row| render_row(row, &widths)));
    lines.join("\n")
}

/// The position and amount columns are right-aligned.
fn render_row(row: &[String; 6], widths: &[usize; 6]) -> String {
    row.iter()
        .zip(widths.iter().copied())
        .enumerate()
        .map(|(col, (cell, w))| match col {
            0 | 2 => format!("{cell:>w$}"),
            _ => format!("{cell:<w$}"),
        })
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{CategoryFilter, MonthFilter};
    use crate::test::TestEnv;

    #[tokio::test]
    async fn test_list_all() {
        let env = TestEnv::new().await;
        env.add("100", "Food", "2024-03-05", "").await;
        env.add("1250.5", "Rent", "2024-04-01", "April").await;

        let out = list(env.config(), ListArgs::default()).await.unwrap();
        assert_eq!(out.structure().unwrap().len(), 2);
        let lines: Vec<&str> = out.message().lines().collect();
        assert!(lines[0].starts_with("#  ID"));
        assert!(lines[2].contains("₹100.00"));
        assert!(lines[3].contains("₹1,250.50"));
        assert!(lines[3].ends_with("April"));
        assert_eq!(lines[4], "Showing 2 of 2 expenses");
    }

    #[tokio::test]
    async fn test_list_month_keeps_positions() {
        let env = TestEnv::new().await;
        env.add("100", "Food", "2024-03-05", "").await;
        env.add("50", "Food", "2024-04-01", "").await;

        let args = ListArgs::new(CategoryFilter::All, MonthFilter::Month(4), "");
        let out = list(env.config(), args).await.unwrap();
        let shown = out.structure().unwrap();
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].date(), "2024-04-01");
        let row = out.message().lines().nth(2).unwrap();
        assert!(row.starts_with("1  "));
    }

    #[tokio::test]
    async fn test_list_query() {
        let env = TestEnv::new().await;
        env.add("30", "Food", "2024-03-05", "Grocery run").await;
        env.add("40", "Fuel", "2024-03-06", "Gas").await;

        let args = ListArgs::new(CategoryFilter::All, MonthFilter::All, "gro");
        let out = list(env.config(), args).await.unwrap();
        let shown = out.structure().unwrap();
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].notes(), "Grocery run");
    }

    #[tokio::test]
    async fn test_list_empty() {
        let env = TestEnv::new().await;
        let out = list(env.config(), ListArgs::default()).await.unwrap();
        assert_eq!(out.message(), "No expenses recorded yet");

        env.add("30", "Food", "2024-03-05", "").await;
        let args = ListArgs::new(CategoryFilter::Only("Rent".to_string()), MonthFilter::All, "");
        let out = list(env.config(), args).await.unwrap();
        assert!(out.message().starts_with("No expenses match"));
    }

    #[tokio::test]
    async fn test_list_json() {
        let env = TestEnv::new().await;
        env.add("12.5", "Food", "2024-03-05", "").await;
        let args = ListArgs::default().with_format(ListFormat::Json);
        let out = list(env.config(), args).await.unwrap();
        let parsed: Vec<Expense> = serde_json::from_str(out.message()).unwrap();
        assert_eq!(&parsed, out.structure().unwrap());
    }
}
