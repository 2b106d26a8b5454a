//! Delete command handler.

use crate::args::DeleteArgs;
use crate::commands::{persistence_note, select, Out};
use crate::model::Expense;
use crate::{Config, Result};

/// Deletes the expense picked by `args` and returns it. Expenses after it move up one position.
///
/// # Errors
/// - `ErrorType::NotFound` or `ErrorType::OutOfBounds` if no expense matches the selector.
pub async fn delete(config: Config, args: DeleteArgs) -> Result<Out<Expense>> {
    let mut store = config.open_store()?;
    let index = select(&store, args.selector())?;
    let (deleted, persistence) = store.delete_at(index)?;
    let message = format!(
        "Deleted expense {} ({} {} on {}){}",
        deleted.short_id(),
        deleted.amount().display_with(config.currency_symbol()),
        deleted.category(),
        deleted.date(),
        persistence_note(&persistence)
    );
    Ok(Out::new(message, deleted))
}
