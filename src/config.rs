//! Configuration management for Dosewise
//!
//! TOML file at ~/.dosewise/config.toml. A missing file means defaults;
//! nothing is written unless `dosewise config --init` asks for it.

use crate::generation::{
    GenerationParams, RetryPolicy, DEFAULT_GENERATION_URL, DEFAULT_MAX_RETRIES, DEFAULT_MODEL,
};
use crate::knowledge::DEFAULT_RXNAV_URL;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable that overrides `generation.api_key`
pub const API_KEY_ENV: &str = "DOSEWISE_API_KEY";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub knowledge: KnowledgeConfig,
    #[serde(default)]
    pub registry: RegistryConfig,
}

/// Generative text service settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub max_output_tokens: u32,
}

/// Drug knowledge service settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KnowledgeConfig {
    pub enabled: bool,
    pub base_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegistryConfig {
    pub path: Option<PathBuf>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        let params = GenerationParams::default();
        Self {
            base_url: DEFAULT_GENERATION_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            timeout_secs: 15,
            temperature: params.temperature,
            top_p: params.top_p,
            top_k: params.top_k,
            max_output_tokens: params.max_output_tokens,
        }
    }
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: DEFAULT_RXNAV_URL.to_string(),
            timeout_secs: 10,
        }
    }
}

impl GenerationConfig {
    pub fn params(&self) -> GenerationParams {
        GenerationParams {
            temperature: self.temperature,
            top_p: self.top_p,
            top_k: self.top_k,
            max_output_tokens: self.max_output_tokens,
        }
    }

    pub fn attempt_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Configured deadline with the fixed single retry on timeout
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::with_config(self.attempt_timeout(), DEFAULT_MAX_RETRIES)
    }
}

impl KnowledgeConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Config {
    /// Load from the default location, falling back to defaults if absent
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        Self::load_from(&config_path)
    }

    /// Load from an explicit path, falling back to defaults if absent
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            let config: Config = toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config file {}", path.display()))?;
            tracing::info!(path = %path.display(), "configuration loaded");
            config
        } else {
            tracing::debug!(path = %path.display(), "no configuration file, using defaults");
            Config::default()
        };

        config.apply_env();
        Ok(config)
    }

    /// Save configuration to file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let toml_string = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(path, toml_string).context("Failed to write config file")?;

        Ok(())
    }

    /// Write a default configuration unless one already exists
    ///
    /// Returns `false` when the file was left untouched.
    pub fn init_at(path: &Path) -> Result<bool> {
        if path.exists() {
            return Ok(false);
        }

        Config::default().save_to(path)?;
        tracing::info!(path = %path.display(), "default configuration written");
        Ok(true)
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Could not determine home directory")?;

        Ok(home.join(".dosewise").join("config.toml"))
    }

    fn apply_env(&mut self) {
        if let Ok(key) = std::env::var(API_KEY_ENV) {
            if !key.trim().is_empty() {
                self.generation.api_key = Some(key);
            }
        }
    }

    /// Copy with the API key masked, for display
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        if let Some(key) = config.generation.api_key.as_mut() {
            *key = redact(key);
        }
        config
    }
}

/// Keep only the last four characters of keys long enough to spare them
fn redact(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return "****".to_string();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("****{}", tail)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.generation.timeout_secs, 15);
        assert_eq!(config.generation.top_k, 32);
        assert!(config.knowledge.enabled);
        assert!(config.registry.path.is_none());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
            [generation]
            timeout_secs = 30

            [registry]
            path = "/srv/medicines.toml"
            "#,
        )
        .unwrap();

        assert_eq!(config.generation.timeout_secs, 30);
        assert_eq!(config.generation.model, DEFAULT_MODEL);
        assert!(config.knowledge.enabled);
        assert_eq!(config.registry.path, Some(PathBuf::from("/srv/medicines.toml")));
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nope.toml");

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.knowledge, KnowledgeConfig::default());
        assert!(!path.exists());
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.knowledge.enabled = false;
        config.generation.timeout_secs = 20;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert!(!loaded.knowledge.enabled);
        assert_eq!(loaded.generation.timeout_secs, 20);
    }

    #[test]
    fn test_retry_count_is_not_configurable() {
        let config: Config = toml::from_str(
            r#"
            [generation]
            timeout_secs = 5
            max_retries = 7
            "#,
        )
        .unwrap();

        let policy = config.generation.retry_policy();
        assert_eq!(policy.max_attempts(), 2);
        assert_eq!(policy.attempt_timeout(), Duration::from_secs(5));
        assert!(!toml::to_string(&config).unwrap().contains("max_retries"));
    }

    #[test]
    fn test_init_writes_defaults_once() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".dosewise").join("config.toml");

        assert!(Config::init_at(&path).unwrap());
        let loaded: Config = toml::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(loaded, Config::default());

        fs::write(&path, "[knowledge]\nenabled = false\n").unwrap();
        assert!(!Config::init_at(&path).unwrap());
        assert!(!Config::load_from(&path).unwrap().knowledge.enabled);
    }

    #[test]
    fn test_redacted_masks_key() {
        let mut config = Config::default();
        config.generation.api_key = Some("AIzaSyExampleKey1234".to_string());

        let redacted = config.redacted();
        assert_eq!(redacted.generation.api_key.as_deref(), Some("****1234"));

        config.generation.api_key = Some("short".to_string());
        assert_eq!(config.redacted().generation.api_key.as_deref(), Some("****"));
    }
}
