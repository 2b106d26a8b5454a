use crate::args::ChartArgs;
use crate::chart::{bar, pie, ChartKind, Dataset};
use crate::commands::Out;
use crate::model::Amount;
use crate::{Config, Result};
use chrono::Datelike;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

const BAR_WIDTH: usize = 40;

/// Builds the dataset for the requested chart and draws it as horizontal text bars.
pub async fn chart(config: Config, args: ChartArgs) -> Result<Out<Dataset>> {
    let store = config.open_store()?;
    let dataset = match args.kind() {
        ChartKind::Pie => pie(store.expenses()),
        ChartKind::Bar => {
            let year = args
                .year()
                .unwrap_or_else(|| chrono::Local::now().date_naive().year());
            bar(store.expenses(), year)
        }
    };
    let message = render(&dataset, config.currency_symbol());
    Ok(Out::new(message, dataset))
}

fn render(dataset: &Dataset, symbol: &str) -> String {
    if dataset.is_empty() {
        return format!("{}\n(no data)", dataset.title);
    }
    let label_width = dataset
        .labels
        .iter()
        .map(|l| l.chars().count())
        .max()
        .unwrap_or_default();
    let total: Amount = dataset.values.iter().sum();
    let max = dataset.max();

    let mut lines = vec![dataset.title.clone()];
    for (label, value) in dataset.labels.iter().zip(&dataset.values) {
        let cells = "█".repeat(scaled(*value, max, BAR_WIDTH));
        let mut line = format!("{label:<label_width$}  {cells} {}", value.display_with(symbol));
        if dataset.kind == ChartKind::Pie {
            line.push_str(&format!(" ({}%)", percent(*value, total)));
        }
        lines.push(line);
    }
    lines.join("\n")
}

/// The number of cells out of `width` that `value` fills relative to `max`.
fn scaled(value: Amount, max: Amount, width: usize) -> usize {
    if max.value() <= Decimal::ZERO || value.value() <= Decimal::ZERO {
        return 0;
    }
    value
        .value()
        .checked_div(max.value())
        .and_then(|ratio| ratio.checked_mul(Decimal::from(width)))
        .and_then(|cells| cells.round().to_usize())
        .unwrap_or_default()
        .min(width)
}

fn percent(value: Amount, total: Amount) -> Decimal {
    value
        .value()
        .checked_div(total.value())
        .and_then(|share| share.checked_mul(Decimal::ONE_HUNDRED))
        .map(|p| p.round_dp(1).normalize())
        .unwrap_or_default()
}
