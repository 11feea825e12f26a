//! Settings file support.
//!
//! Settings are plain key-value pairs stored as TOML: credentials for the
//! fine-tuning API plus a few defaults for the CLI.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Dataset file used when no path is configured.
pub const DEFAULT_DATASET_PATH: &str = "output.jsonl";

/// Settings structure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// API key for the fine-tuning provider
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Organization id sent with every request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,

    /// API root override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,

    /// Default base model for new jobs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Default dataset file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dataset: Option<String>,

    /// Log level
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
}

/// Errors that can occur during settings loading and saving.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// Settings file not found.
    #[error("Settings file not found: {0}")]
    NotFound(String),

    /// Failed to read or write a settings file.
    #[error("Failed to access settings file: {0}")]
    Io(String),

    /// Failed to parse a settings file.
    #[error("Failed to parse settings file: {0}")]
    Parse(String),
}

/// Result type for settings operations.
pub type SettingsResult<T> = std::result::Result<T, SettingsError>;

/// Environment variables consulted when a credential is not in any settings file.
const API_KEY_ENV: &str = "OPENAI_API_KEY";
const ORGANIZATION_ENV: [&str; 2] = ["OPENAI_ORG_ID", "ORG_ID"];
const API_BASE_ENV: &str = "TUNER_API_BASE";

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        if !path.exists() {
            return Err(SettingsError::NotFound(path.display().to_string()));
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| SettingsError::Io(format!("{}: {}", path.display(), e)))?;

        toml::from_str(&content).map_err(|e| SettingsError::Parse(format!("{}: {}", path.display(), e)))
    }

    /// Save settings to a TOML file readable only by its owner.
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| SettingsError::Parse(format!("Failed to serialize: {}", e)))?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| SettingsError::Io(format!("Failed to create directory: {}", e)))?;
        }

        std::fs::write(path, content)
            .map_err(|e| SettingsError::Io(format!("Failed to write file: {}", e)))?;

        // Set file permissions to 0600 (rw-------)
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
                .map_err(|e| SettingsError::Io(format!("Failed to set permissions: {}", e)))?;
        }

        Ok(())
    }

    /// Get default global settings file path.
    #[allow(clippy::disallowed_methods)] // HOME lookup for path discovery
    pub fn default_global_path() -> PathBuf {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(".tuner")
            .join("settings.toml")
    }

    /// Get default local settings file path.
    pub fn default_local_path() -> PathBuf {
        PathBuf::from(".tunerrc")
    }

    /// Load the global file, then the local file on top of it.
    ///
    /// Missing files are skipped; unparsable ones are logged and skipped.
    pub fn load_layered(global_path: &Path, local_path: &Path) -> Self {
        let mut settings = Self::default();

        for path in [global_path, local_path] {
            match Self::load_from_file(path) {
                Ok(loaded) => settings.merge(&loaded),
                Err(SettingsError::NotFound(_)) => {}
                Err(e) => warn!(error = %e, "Ignoring unreadable settings file"),
            }
        }

        settings
    }

    /// Discover and load settings files, then fill credentials from the environment.
    ///
    /// Precedence:
    /// 1. Local settings file (./.tunerrc)
    /// 2. Global settings file (~/.tuner/settings.toml)
    /// 3. Environment variables
    #[allow(clippy::disallowed_methods)] // env::var is needed for credential discovery
    pub fn discover() -> Self {
        let settings = Self::load_layered(&Self::default_global_path(), &Self::default_local_path());
        settings.with_env_fallback(|name| std::env::var(name).ok())
    }

    /// Fill unset credentials from `lookup`, which maps an environment variable name to its value.
    #[must_use]
    pub fn with_env_fallback<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if self.api_key.is_none() {
            self.api_key = non_empty(lookup(API_KEY_ENV));
        }
        if self.organization.is_none() {
            self.organization = ORGANIZATION_ENV.iter().find_map(|name| non_empty(lookup(name)));
        }
        if self.api_base.is_none() {
            self.api_base = non_empty(lookup(API_BASE_ENV));
        }
        if self.api_key.is_some() {
            debug!("API key resolved");
        }
        self
    }

    /// Merge another settings value into this one.
    ///
    /// Values from `other` override values in `self` if they are Some.
    pub fn merge(&mut self, other: &Self) {
        if let Some(api_key) = non_empty(other.api_key.clone()) {
            self.api_key = Some(api_key);
        }
        if let Some(organization) = non_empty(other.organization.clone()) {
            self.organization = Some(organization);
        }
        if let Some(api_base) = non_empty(other.api_base.clone()) {
            self.api_base = Some(api_base);
        }
        if let Some(model) = non_empty(other.model.clone()) {
            self.model = Some(model);
        }
        if let Some(dataset) = non_empty(other.dataset.clone()) {
            self.dataset = Some(dataset);
        }
        if let Some(log_level) = non_empty(other.log_level.clone()) {
            self.log_level = Some(log_level);
        }
    }

    /// Dataset file to read and append to.
    pub fn dataset_path(&self) -> PathBuf {
        PathBuf::from(self.dataset.as_deref().unwrap_or(DEFAULT_DATASET_PATH))
    }

    /// API key safe to print: only its first three and last four characters are kept.
    pub fn masked_api_key(&self) -> Option<String> {
        self.api_key.as_deref().map(mask_secret)
    }
}

fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len().max(4));
    }
    let head: String = chars[..3].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}

/// A settings file that updates are written to.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    /// The per-user store (`~/.tuner/settings.toml`).
    pub fn global() -> Self {
        Self { path: Settings::default_global_path() }
    }

    /// The per-directory store (`./.tunerrc`).
    pub fn local() -> Self {
        Self { path: Settings::default_local_path() }
    }

    /// A store at a custom path, mainly for tests.
    #[must_use]
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current contents, or empty settings if the file does not exist yet.
    pub fn load(&self) -> SettingsResult<Settings> {
        match Settings::load_from_file(&self.path) {
            Ok(settings) => Ok(settings),
            Err(SettingsError::NotFound(_)) => Ok(Settings::default()),
            Err(e) => Err(e),
        }
    }

    /// Merge `update` into the stored settings and persist the result.
    pub fn update(&self, update: &Settings) -> SettingsResult<Settings> {
        let mut settings = self.load()?;
        settings.merge(update);
        settings.save_to_file(&self.path)?;
        debug!(path = %self.path.display(), "Saved settings");
        Ok(settings)
    }
}
