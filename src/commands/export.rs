use crate::args::ExportArgs;
use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::export::{file_name, to_csv};
use crate::{utils, Config, Result};
use chrono::NaiveDate;
use std::path::PathBuf;

/// Writes every expense to a CSV file and returns the path of that file.
///
/// Unless `args` names an output path, the file goes to the exports directory and is named after
/// today's date, replacing an export made earlier the same day.
pub async fn export(config: Config, args: ExportArgs) -> Result<Out<PathBuf>> {
    export_on(config, args, chrono::Local::now().date_naive()).await
}

pub(super) async fn export_on(
    config: Config,
    args: ExportArgs,
    today: NaiveDate,
) -> Result<Out<PathBuf>> {
    let store = config.open_store()?;
    let csv = to_csv(store.expenses())?;
    let path = match args.output() {
        Some(p) => p.to_path_buf(),
        None => config.exports_dir().join(file_name(today)),
    };
    utils::write(&path, csv)
        .await
        .pub_result(ErrorType::Export)?;

    let count = store.len();
    let message = format!(
        "Exported {} expense{} to {}",
        count,
        if count == 1 { "" } else { "s" },
        path.display()
    );
    Ok(Out::new(message, path))
}
