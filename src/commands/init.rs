use crate::commands::Out;
use crate::{Config, Result};
use std::path::Path;

/// Creates the expenses directory, its subdirectories and an initial `config.json` with default
/// settings.
///
/// # Arguments
/// - `expenses_home` - The directory that will be the root of data directory, e.g.
///   `$HOME/expenses`
///
/// # Errors
/// - Returns an error if any file operations fail or an existing `config.json` is invalid.
pub async fn init(expenses_home: &Path) -> Result<Out<()>> {
    let config = Config::create(expenses_home).await?;
    Ok(format!(
        "Successfully created the expenses directory at {}",
        config.root().display()
    )
    .into())
}
