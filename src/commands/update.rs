use crate::args::UpdateArgs;
use crate::commands::{persistence_note, select, Out};
use crate::form::{Editor, Saved};
use crate::{Config, Result};

/// Changes the expense picked by `args`. Values that are not given keep their current value and
/// the expense keeps its id and position.
///
/// # Errors
/// - `ErrorType::NotFound` or `ErrorType::OutOfBounds` if no expense matches the selector.
/// - `ErrorType::Validation` if the result would be missing a required value or the amount is
///   not a number. Nothing is changed in that case.
pub async fn update(config: Config, args: UpdateArgs) -> Result<Out<Saved>> {
    let mut store = config.open_store()?;
    let index = select(&store, args.selector())?;
    let id = store.get(index).map(|e| e.id()).unwrap_or_default();

    let mut editor = Editor::new();
    let mut form = editor.start_edit(&store, id)?;
    if let Some(amount) = args.amount() {
        form.amount = amount.to_string();
    }
    if let Some(category) = args.category() {
        form.category = category.to_string();
    }
    if let Some(date) = args.date() {
        form.date = date.to_string();
    }
    if let Some(notes) = args.notes() {
        form.notes = notes.to_string();
    }

    let saved = editor.save(&mut store, &form)?;
    let message = format!(
        "Updated expense {}{}",
        saved.short_id(),
        persistence_note(saved.persistence())
    );
    Ok(Out::new(message, saved))
}
