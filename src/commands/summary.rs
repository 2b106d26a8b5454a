use crate::aggregate::{category_totals, CategoryTotal, Summary};
use crate::commands::Out;
use crate::{Config, Result};
use chrono::NaiveDate;
use serde::Serialize;

/// The summary numbers plus the per-category breakdown they were derived from.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryReport {
    #[serde(flatten)]
    pub summary: Summary,
    pub categories: Vec<CategoryTotal>,
}

/// Summarizes every recorded expense. Filters never apply here.
pub async fn summary(config: Config) -> Result<Out<SummaryReport>> {
    summary_on(config, chrono::Local::now().date_naive()).await
}

pub(super) async fn summary_on(config: Config, today: NaiveDate) -> Result<Out<SummaryReport>> {
    let store = config.open_store()?;
    let expenses = store.expenses();
    let report = SummaryReport {
        summary: Summary::compute(expenses, today),
        categories: category_totals(expenses),
    };

    let symbol = config.currency_symbol();
    let s = &report.summary;
    let mut message = format!(
        "Total spent: {}\nThis month ({}): {}\nEntries: {}\nTop category: {}",
        s.total.display_with(symbol),
        today.format("%B %Y"),
        s.current_month_total.display_with(symbol),
        s.entry_count,
        s.top_category.as_deref().unwrap_or("-"),
    );
    for c in &report.categories {
        message.push_str(&format!(
            "\n  {}: {}",
            c.category,
            c.total.display_with(symbol)
        ));
    }
    Ok(Out::new(message, report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Amount;
    use crate::test::TestEnv;
    use std::str::FromStr;

    #[tokio::test]
    async fn test_summary() {
        let env = TestEnv::new().await;
        env.add("10", "A", "2024-03-05", "").await;
        env.add("20", "B", "2024-02-10", "").await;
        env.add("5", "A", "2023-03-07", "").await;

        let today = NaiveDate::from_ymd_opt(2024, 3, 20).unwrap();
        let out = summary_on(env.config(), today).await.unwrap();
        let report = out.structure().unwrap();
        assert_eq!(report.summary.total, Amount::from_str("35").unwrap());
        assert_eq!(report.summary.current_month_total, Amount::from_str("10").unwrap());
        assert_eq!(report.summary.entry_count, 3);
        assert_eq!(report.summary.top_category.as_deref(), Some("B"));
        assert_eq!(report.categories.len(), 2);
        assert!(out.message().contains("Total spent: ₹35.00"));
        assert!(out.message().contains("This month (March 2024): ₹10.00"));
    }

    #[tokio::test]
    async fn test_summary_empty() {
        let env = TestEnv::new().await;
        let out = summary(env.config()).await.unwrap();
        let report = out.structure().unwrap();
        assert!(report.summary.total.is_zero());
        assert_eq!(report.summary.top_category, None);
        assert!(out.message().contains("Top category: -"));
    }
}
