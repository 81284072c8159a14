//! Configuration file handling for BiblioPay.
//!
//! The configuration file is stored at `$BIBLIOPAY_HOME/config.json` and contains the branch list,
//! the timezone used to decide what "today" means, the insight service settings and, optionally,
//! where exported reports are written.

use crate::store::FileStorage;
use crate::{utils, Result};
use anyhow::{anyhow, bail, Context};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const APP_NAME: &str = "bibliopay";
const CONFIG_VERSION: u8 = 1;
const CONFIG_JSON: &str = "config.json";
const DATA: &str = "data";
const EXPORTS: &str = "exports";
const DEFAULT_TIMEZONE: &str = "America/Mexico_City";
const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MODEL: &str = "gemini-3-flash-preview";
const DEFAULT_API_KEY_ENV: &str = "API_KEY";

/// The branches of the library network, used when a fresh `config.json` is written.
pub const BRANCHES: [&str; 5] = [
    "Biblioteca Central",
    "Facultad de Ingeniería",
    "Facultad de Medicina",
    "Campus Norte",
    "Ciencias Sociales",
];

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$BIBLIOPAY_HOME` and from there it loads `$BIBLIOPAY_HOME/config.json`. It
/// provides paths to the other items that are expected in a certain location within the home
/// directory.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    data: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
    timezone: Tz,
}

impl Config {
    /// Creates the home directory, its data subdirectory and an initial `config.json` with
    /// default settings.
    ///
    /// # Errors
    /// - Returns an error if `config.json` already exists or if any file operation fails.
    pub async fn create(dir: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = dir.into();
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the bibliopay home directory")?;
        let root = utils::canonicalize(&maybe_relative).await?;

        let config_path = root.join(CONFIG_JSON);
        if config_path.exists() {
            bail!(
                "The home directory is already initialized, '{}' exists",
                config_path.display()
            )
        }

        let data = root.join(DATA);
        utils::make_dir(&data).await?;

        let config_file = ConfigFile::default();
        config_file.save(&config_path).await?;
        let timezone = config_file.timezone()?;

        Ok(Self {
            root,
            data,
            config_path,
            config_file,
            timezone,
        })
    }

    /// This will
    /// - validate that the home directory and the config file exist
    /// - load and validate the config file
    /// - validate that the data directory exists
    pub async fn load(home: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = home.into();
        if !maybe_relative.is_dir() {
            bail!(
                "The bibliopay home '{}' is missing, run 'bibliopay init' first",
                maybe_relative.display()
            )
        }
        let root = utils::canonicalize(&maybe_relative).await?;

        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!("The config file is missing '{}'", config_path.display())
        }
        let config_file = ConfigFile::load(&config_path).await?;
        let timezone = config_file.timezone()?;

        let data = root.join(DATA);
        if !data.is_dir() {
            bail!("The data directory is missing '{}'", data.display())
        }

        Ok(Self {
            root,
            data,
            config_path,
            config_file,
            timezone,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// The directory holding the persisted session and transactions.
    pub fn data_dir(&self) -> &Path {
        &self.data
    }

    /// The known branches, in display order.
    pub fn branches(&self) -> &[String] {
        &self.config_file.branches
    }

    pub fn is_known_branch(&self, branch: &str) -> bool {
        self.config_file.branches.iter().any(|b| b == branch)
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    pub fn insight(&self) -> &InsightSettings {
        &self.config_file.insight
    }

    /// Where reports are written when no directory is given on the command line. A relative
    /// `exports_dir` is resolved against the home directory.
    pub fn exports_dir(&self) -> PathBuf {
        match &self.config_file.exports_dir {
            Some(p) if p.is_absolute() => p.clone(),
            Some(p) => self.root.join(p),
            None => self.root.join(EXPORTS),
        }
    }

    /// A `Storage` over the data directory.
    pub fn storage(&self) -> FileStorage {
        FileStorage::new(&self.data)
    }
}

/// Where and how insights are requested.
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct InsightSettings {
    /// Base URL of the generative language API.
    #[serde(default = "default_endpoint")]
    endpoint: String,

    #[serde(default = "default_model")]
    model: String,

    /// Name of the environment variable that holds the API key. The key itself is never written
    /// to the config file.
    #[serde(default = "default_api_key_env")]
    api_key_env: String,
}

impl Default for InsightSettings {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            model: default_model(),
            api_key_env: default_api_key_env(),
        }
    }
}

impl InsightSettings {
    pub fn new(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        api_key_env: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            model: model.into(),
            api_key_env: api_key_env.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn api_key_env(&self) -> &str {
        &self.api_key_env
    }

    /// Reads the API key from the configured environment variable. Empty counts as missing.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
    }
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_api_key_env() -> String {
    DEFAULT_API_KEY_ENV.to_string()
}

fn default_timezone() -> String {
    DEFAULT_TIMEZONE.to_string()
}

fn default_branches() -> Vec<String> {
    BRANCHES.iter().map(|b| b.to_string()).collect()
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "bibliopay",
///   "config_version": 1,
///   "branches": ["Biblioteca Central", "Campus Norte"],
///   "timezone": "America/Mexico_City",
///   "insight": {
///     "endpoint": "https://generativelanguage.googleapis.com/v1beta",
///     "model": "gemini-3-flash-preview",
///     "api_key_env": "API_KEY"
///   },
///   "exports_dir": "reports"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "bibliopay"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    #[serde(default = "default_branches")]
    branches: Vec<String>,

    /// IANA timezone name
    #[serde(default = "default_timezone")]
    timezone: String,

    #[serde(default)]
    insight: InsightSettings,

    /// Where exports go (optional, relative to the home directory or absolute)
    /// Defaults to $BIBLIOPAY_HOME/exports if not specified
    #[serde(default, skip_serializing_if = "Option::is_none")]
    exports_dir: Option<PathBuf>,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            branches: default_branches(),
            timezone: default_timezone(),
            insight: InsightSettings::default(),
            exports_dir: None,
        }
    }
}

impl ConfigFile {
    /// Loads a ConfigFile asynchronously from the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, or if `app_name` is wrong.
    async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = utils::read(path)
            .await
            .context("Failed to read the config file")?;

        let config: ConfigFile = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file at {}", path.display()))?;

        anyhow::ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );

        Ok(config)
    }

    /// Saves the ConfigFile to the specified path.
    async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let p = path.as_ref();
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(p, data)
            .await
            .context("Unable to write config file")
    }

    fn timezone(&self) -> Result<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|e| anyhow!("Invalid timezone '{}' in config file: {e}", self.timezone))
    }
}
