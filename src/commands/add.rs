use crate::args::AddArgs;
use crate::commands::{persistence_note, Out};
use crate::form::{Editor, ExpenseForm, Saved};
use crate::{Config, Result};

/// Validates the values in `args` and appends them as a new expense.
///
/// # Errors
/// - `ErrorType::Validation` if amount, category or date is missing or the amount is not a
///   number. Nothing is stored in that case.
pub async fn add(config: Config, args: AddArgs) -> Result<Out<Saved>> {
    let mut store = config.open_store()?;
    let form = ExpenseForm::new(args.amount(), args.category(), args.date(), args.notes());
    let saved = Editor::new().save(&mut store, &form)?;
    let message = format!(
        "Added expense {}{}",
        saved.short_id(),
        persistence_note(saved.persistence())
    );
    Ok(Out::new(message, saved))
}
