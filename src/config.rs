//! Configuration file handling.
//!
//! The configuration file is stored at `$EXPENSES_HOME/config.json`. Next to it, `data/` holds
//! the persisted expenses and `exports/` receives CSV exports.

use crate::error::{ErrorType, IntoResult, Res};
use crate::store::{is_valid_key, ExpenseStore, FileBlobStore, DEFAULT_KEY};
use crate::{utils, Result};
use anyhow::{bail, ensure, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

const APP_NAME: &str = "expenses";
const CONFIG_VERSION: u8 = 1;
const CONFIG_JSON: &str = "config.json";
const DATA: &str = "data";
const EXPORTS: &str = "exports";
const DEFAULT_CURRENCY_SYMBOL: &str = "₹";

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$EXPENSES_HOME` and from there it loads `$EXPENSES_HOME/config.json`. It provides
/// paths to the other items that are expected in a certain location within the home directory.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    data: PathBuf,
    exports: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
}

impl Config {
    /// Creates the home directory, its subdirectories and an initial `config.json`.
    ///
    /// If `dir` already holds a valid configuration it is kept as-is, so running this twice is
    /// harmless.
    ///
    /// # Errors
    /// - Returns an error if any file operations fail or an existing config file is invalid.
    pub async fn create(dir: impl Into<PathBuf>) -> Result<Self> {
        create(dir.into()).await.pub_result(ErrorType::Config)
    }

    /// This will
    /// - validate that the home directory and the config file exist
    /// - load the config file
    /// - validate that the data and exports directories exist
    /// - return the loaded configuration object
    pub async fn load(home: impl Into<PathBuf>) -> Result<Self> {
        load(home.into()).await.pub_result(ErrorType::Config)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn data_dir(&self) -> &Path {
        &self.data
    }

    pub fn exports_dir(&self) -> &Path {
        &self.exports
    }

    pub fn currency_symbol(&self) -> &str {
        &self.config_file.currency_symbol
    }

    pub fn storage_key(&self) -> &str {
        &self.config_file.storage_key
    }

    /// Loads the expense collection from the data directory.
    pub fn open_store(&self) -> Result<ExpenseStore> {
        let blob_store = FileBlobStore::new(&self.data).pub_result(ErrorType::Storage)?;
        Ok(ExpenseStore::load(blob_store, self.storage_key()))
    }
}

async fn create(maybe_relative: PathBuf) -> Res<Config> {
    utils::make_dir(&maybe_relative)
        .await
        .context("Unable to create the expenses home directory")?;
    let root = utils::canonicalize(&maybe_relative).await?;
    utils::make_dir(&root.join(DATA)).await?;
    utils::make_dir(&root.join(EXPORTS)).await?;

    let config_path = root.join(CONFIG_JSON);
    if config_path.is_file() {
        debug!("Keeping existing config at {}", config_path.display());
    } else {
        ConfigFile::default().save(&config_path).await?;
    }
    load(root).await
}

async fn load(maybe_relative: PathBuf) -> Res<Config> {
    let root = utils::canonicalize(&maybe_relative)
        .await
        .context("The expenses home directory is missing, run 'expenses init' first")?;

    let config_path = root.join(CONFIG_JSON);
    if !config_path.is_file() {
        bail!("The config file is missing '{}'", config_path.display())
    }
    let config_file = ConfigFile::load(&config_path).await?;

    let config = Config {
        root: root.clone(),
        data: root.join(DATA),
        exports: root.join(EXPORTS),
        config_path,
        config_file,
    };
    if !config.data.is_dir() {
        bail!("The data directory is missing '{}'", config.data.display())
    }
    if !config.exports.is_dir() {
        bail!(
            "The exports directory is missing '{}'",
            config.exports.display()
        )
    }
    Ok(config)
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "expenses",
///   "config_version": 1,
///   "currency_symbol": "₹",
///   "storage_key": "expenses"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "expenses"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// Prefixed to amounts when they are displayed
    #[serde(default = "default_currency_symbol")]
    currency_symbol: String,

    /// The key, and file name under `data/`, that expenses are stored under
    #[serde(default = "default_storage_key")]
    storage_key: String,
}

fn default_currency_symbol() -> String {
    DEFAULT_CURRENCY_SYMBOL.to_string()
}

fn default_storage_key() -> String {
    DEFAULT_KEY.to_string()
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            currency_symbol: default_currency_symbol(),
            storage_key: default_storage_key(),
        }
    }
}

impl ConfigFile {
    /// Loads a ConfigFile from the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, or holds invalid values
    async fn load(path: impl AsRef<Path>) -> Res<Self> {
        let path = path.as_ref();
        let content = utils::read(path).await?;

        let config: ConfigFile = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file at {}", path.display()))?;

        ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );
        ensure!(
            is_valid_key(&config.storage_key),
            "Invalid storage_key in config file: '{}'",
            config.storage_key
        );

        Ok(config)
    }

    /// Saves the ConfigFile to the specified path.
    async fn save(&self, path: impl AsRef<Path>) -> Res<()> {
        let p = path.as_ref();
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(p, data)
            .await
            .context("Unable to write config file")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_config_create() {
        let dir = TempDir::new().unwrap();
        let home_dir = dir.path().join("expenses_home");

        let config = Config::create(&home_dir).await.unwrap();

        assert!(config.config_path().is_file());
        assert!(config.data_dir().is_dir());
        assert!(config.exports_dir().is_dir());
        assert_eq!(config.currency_symbol(), "₹");
        assert_eq!(config.storage_key(), "expenses");
    }

    #[tokio::test]
    async fn test_config_create_keeps_existing() {
        let dir = TempDir::new().unwrap();
        let home_dir = dir.path().to_owned();
        let config = Config::create(&home_dir).await.unwrap();
        let custom = ConfigFile {
            currency_symbol: "$".to_string(),
            ..ConfigFile::default()
        };
        custom.save(config.config_path()).await.unwrap();

        let again = Config::create(&home_dir).await.unwrap();
        assert_eq!(again.currency_symbol(), "$");
    }

    #[tokio::test]
    async fn test_config_load_missing_home() {
        let dir = TempDir::new().unwrap();
        let err = Config::load(dir.path().join("nope")).await.unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Config);
    }

    #[tokio::test]
    async fn test_config_load_missing_data_dir() {
        let dir = TempDir::new().unwrap();
        let config = Config::create(dir.path()).await.unwrap();
        tokio::fs::remove_dir(config.data_dir()).await.unwrap();
        let err = Config::load(dir.path()).await.unwrap_err();
        assert!(err.to_string().contains("data directory is missing"));
    }

    #[test]
    fn test_config_file_default() {
        let config = ConfigFile::default();
        assert_eq!(config.app_name, "expenses");
        assert_eq!(config.config_version, 1);
        assert_eq!(config.storage_key, "expenses");
    }

    #[tokio::test]
    async fn test_config_file_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");

        let original = ConfigFile {
            currency_symbol: "€".to_string(),
            storage_key: "household".to_string(),
            ..ConfigFile::default()
        };
        original.save(&config_path).await.unwrap();
        let loaded = ConfigFile::load(&config_path).await.unwrap();

        assert_eq!(original, loaded);
    }

    #[tokio::test]
    async fn test_config_file_load_with_minimal_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");
        let json = r#"{ "app_name": "expenses", "config_version": 1 }"#;
        utils::write(&config_path, json).await.unwrap();

        let config = ConfigFile::load(&config_path).await.unwrap();

        assert_eq!(config.currency_symbol, "₹");
        assert_eq!(config.storage_key, "expenses");
    }

    #[tokio::test]
    async fn test_config_file_load_invalid_app_name() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");
        let json = r#"{ "app_name": "wrong_app", "config_version": 1 }"#;
        utils::write(&config_path, json).await.unwrap();

        let result = ConfigFile::load(&config_path).await;
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid app_name"));
    }

    #[tokio::test]
    async fn test_config_file_load_invalid_storage_key() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");
        let json = r#"{ "app_name": "expenses", "config_version": 1, "storage_key": "../x" }"#;
        utils::write(&config_path, json).await.unwrap();

        assert!(ConfigFile::load(&config_path).await.is_err());
    }

    #[tokio::test]
    async fn test_open_store_round_trip() {
        use crate::form::ExpenseForm;
        let dir = TempDir::new().unwrap();
        let config = Config::create(dir.path()).await.unwrap();
        let mut store = config.open_store().unwrap();
        let expense = ExpenseForm::new("9.99", "Books", "2024-05-01", "")
            .validate()
            .unwrap();
        assert!(store.add(expense).is_saved());
        assert!(config.data_dir().join("expenses.json").is_file());

        let reloaded = config.open_store().unwrap();
        assert_eq!(reloaded.all(), store.all());
    }
}
