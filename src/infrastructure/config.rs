// src/infrastructure/config.rs
use crate::application::SyncPolicy;
use crate::constants::{
    CONFIG_DIR_NAME, CONFIG_FILE_NAME, DEFAULT_STORAGE_PREFIX, DEFAULT_TIMEOUT_SECS, ENV_API_KEY,
    ENV_SESSION_TOKEN, ENV_STORAGE_TOKEN,
};
use crate::infrastructure::graphql::Credentials;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;
use url::Url;

/// TOML configuration of the client
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub sync: SyncPolicy,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum AuthMode {
    #[default]
    ApiKey,
    UserPool,
    None,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct BackendConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default)]
    pub auth: AuthMode,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct StorageConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Empty means objects are fetched from `base_url`
    #[serde(default)]
    pub public_url: String,
    #[serde(default = "default_prefix")]
    pub prefix: String,
}

// Default value functions
fn default_endpoint() -> String { "http://localhost:20002/graphql".to_string() }
fn default_timeout_secs() -> u64 { DEFAULT_TIMEOUT_SECS }
fn default_base_url() -> String { "http://localhost:20005".to_string() }
fn default_prefix() -> String { DEFAULT_STORAGE_PREFIX.to_string() }

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            auth: AuthMode::default(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            public_url: String::new(),
            prefix: default_prefix(),
        }
    }
}

impl BackendConfig {
    pub fn endpoint_url(&self) -> Result<Url> {
        Url::parse(&self.endpoint)
            .with_context(|| format!("Invalid backend endpoint: {}", self.endpoint))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Credentials for the configured auth mode, read from the environment
    pub fn credentials(&self) -> Result<Credentials> {
        self.credentials_from(|name| std::env::var(name).ok())
    }

    pub(crate) fn credentials_from(&self, lookup: impl Fn(&str) -> Option<String>) -> Result<Credentials> {
        let read = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        match self.auth {
            AuthMode::ApiKey => match read(ENV_API_KEY) {
                Some(key) => Ok(Credentials::ApiKey(key)),
                None => bail!("{ENV_API_KEY} must be set for api_key auth"),
            },
            AuthMode::UserPool => match read(ENV_SESSION_TOKEN) {
                Some(token) => Ok(Credentials::SessionToken(token)),
                None => bail!("{ENV_SESSION_TOKEN} must be set for user_pool auth; sign in first"),
            },
            AuthMode::None => Ok(Credentials::Anonymous),
        }
    }
}

impl StorageConfig {
    pub fn base_url(&self) -> Result<Url> {
        Url::parse(&self.base_url)
            .with_context(|| format!("Invalid storage base URL: {}", self.base_url))
    }

    pub fn public_url(&self) -> Result<Option<Url>> {
        if self.public_url.trim().is_empty() {
            return Ok(None);
        }
        let url = Url::parse(&self.public_url)
            .with_context(|| format!("Invalid storage public URL: {}", self.public_url))?;
        Ok(Some(url))
    }

    /// Credentials of the storage service, independent of the backend's
    pub fn credentials(&self) -> Credentials {
        self.credentials_from(|name| std::env::var(name).ok())
    }

    pub(crate) fn credentials_from(&self, lookup: impl Fn(&str) -> Option<String>) -> Credentials {
        match lookup(ENV_STORAGE_TOKEN).filter(|v| !v.trim().is_empty()) {
            Some(token) => Credentials::SessionToken(token),
            None => Credentials::Anonymous,
        }
    }
}

impl Config {
    /// Load configuration from TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file {}", path.as_ref().display()))?;

        let config: Config = toml::from_str(&content)
            .context("Failed to parse TOML config")?;

        Ok(config)
    }

    /// Load configuration, falling back to defaults when the file is absent
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            debug!(?path, "No config file, using defaults");
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Save configuration to TOML file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let toml_string = toml::to_string_pretty(self)
            .context("Failed to serialize config to TOML")?;

        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }
        std::fs::write(path.as_ref(), toml_string)
            .context("Failed to write config file")?;

        Ok(())
    }

    /// Create default configuration file at path
    pub fn create_default(path: impl AsRef<Path>) -> Result<Self> {
        let config = Self::default();
        config.save(path)?;
        Ok(config)
    }

    /// `<platform config dir>/notesync/config.toml`
    pub fn default_path() -> Result<PathBuf> {
        let dir = dirs::config_dir().context("Could not find config directory")?;
        Ok(dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }
}
