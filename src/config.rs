//! User configuration (`config.toml`)
//!
//! Lives at `<config_home>/financetrack/config.toml` unless
//! `FINANCETRACK_CONFIG` points elsewhere. A missing file means defaults.

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const CONFIG_ENV: &str = "FINANCETRACK_CONFIG";
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory holding `data.db`; `~/.financetrack` when unset
    pub data_dir: Option<PathBuf>,
    pub currency: String,
    pub assistant: AssistantConfig,
    pub import: ImportConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            currency: "BRL".to_string(),
            assistant: AssistantConfig::default(),
            import: ImportConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_secs: u64,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            temperature: 0.7,
            max_tokens: 500,
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    pub classify_with_assistant: bool,
    /// Account name used when `import` gets no `--account`
    pub default_account: Option<String>,
}

pub fn config_path() -> Result<PathBuf> {
    if let Some(path) = std::env::var_os(CONFIG_ENV) {
        return Ok(PathBuf::from(path));
    }
    let base = dir_spec::config_home().ok_or_else(|| anyhow!("Could not determine config directory"))?;
    Ok(base.join("financetrack").join("config.toml"))
}

impl AppConfig {
    /// Load from the default location
    pub fn load() -> Result<Self> {
        Self::load_from(&config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No config at {:?}, using defaults", path);
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
        toml::from_str(&text).with_context(|| format!("Invalid config file {:?}", path))
    }

    pub fn save(&self) -> Result<PathBuf> {
        let path = config_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| format!("Failed to create {:?}", parent))?;
        }
        let text = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, text).with_context(|| format!("Failed to write {:?}", path))
    }

    /// Configured key, then the `OPENAI_API_KEY` environment variable
    pub fn api_key(&self) -> Option<String> {
        self.assistant
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| std::env::var(API_KEY_ENV).ok().filter(|k| !k.trim().is_empty()))
    }

    /// Database path when `data_dir` is set; `None` means the default location
    pub fn db_path(&self) -> Option<PathBuf> {
        self.data_dir.as_ref().map(|dir| dir.join("data.db"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = AppConfig::load_from(&dir.path().join("none.toml")).unwrap();
        assert_eq!(config.currency, "BRL");
        assert_eq!(config.assistant.model, "gpt-4o-mini");
        assert_eq!(config.assistant.max_tokens, 500);
        assert!(config.db_path().is_none());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "data_dir = \"/tmp/ft\"\n[assistant]\nmodel = \"local\"\n[import]\ndefault_account = \"Nubank\"\n",
        )
        .unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.assistant.model, "local");
        assert_eq!(config.assistant.base_url, "https://api.openai.com/v1");
        assert_eq!(config.import.default_account.as_deref(), Some("Nubank"));
        assert_eq!(config.db_path(), Some(PathBuf::from("/tmp/ft/data.db")));
    }

    #[test]
    fn test_save_round_trip_and_key_precedence() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut config = AppConfig::default();
        config.assistant.api_key = Some("sk-test".to_string());
        config.save_to(&path).unwrap();

        let loaded = AppConfig::load_from(&path).unwrap();
        assert_eq!(loaded.api_key().as_deref(), Some("sk-test"));
    }

    #[test]
    fn test_invalid_file_errors() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "currency = [").unwrap();
        assert!(AppConfig::load_from(&path).is_err());
    }
}
