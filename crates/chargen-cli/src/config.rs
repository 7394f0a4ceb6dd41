//! Configuration management for the chargen CLI
//!
//! Stores the data file location, the generation server and default
//! generation settings in ~/.config/chargen/config.toml

use anyhow::{Context, Result};
use chargen::adapters::{
    DEFAULT_BASE_URL, DEFAULT_GENERATE_TIMEOUT, DEFAULT_LIST_TIMEOUT, DEFAULT_TEMPERATURE,
};
use chargen::{CharacterGenerator, GenerationStrategy, LmStudioClient, DEFAULT_SYSTEM_PROMPT};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const CONFIG_DIR: &str = "chargen";
const CONFIG_FILE: &str = "config.toml";
const DATA_FILE: &str = "characters.json";
const SYSTEM_PROMPT_FILE: &str = "system_prompt.txt";

pub const ENV_DATA_FILE: &str = "CHARGEN_DATA_FILE";
pub const ENV_BASE_URL: &str = "CHARGEN_BASE_URL";
pub const ENV_MODEL: &str = "CHARGEN_MODEL";

/// CLI Configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_file: Option<PathBuf>,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_prompt_file: Option<PathBuf>,
    #[serde(default)]
    pub strategy: GenerationStrategy,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_list_timeout_secs")]
    pub list_timeout_secs: u64,
    #[serde(default = "default_generate_timeout_secs")]
    pub generate_timeout_secs: u64,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_temperature() -> f32 {
    DEFAULT_TEMPERATURE
}

fn default_list_timeout_secs() -> u64 {
    DEFAULT_LIST_TIMEOUT.as_secs()
}

fn default_generate_timeout_secs() -> u64 {
    DEFAULT_GENERATE_TIMEOUT.as_secs()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_file: None,
            base_url: default_base_url(),
            default_model: None,
            system_prompt_file: None,
            strategy: GenerationStrategy::default(),
            temperature: default_temperature(),
            list_timeout_secs: default_list_timeout_secs(),
            generate_timeout_secs: default_generate_timeout_secs(),
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?
            .join(CONFIG_DIR);
        Ok(config_dir)
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE))
    }

    /// Load config from file (or defaults), then apply environment overrides
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::config_path()?)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load config from a specific file, or defaults if it does not exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {:?}", path))?;

        let config: Config =
            toml::from_str(&content).with_context(|| "Failed to parse config file")?;

        Ok(config)
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        let dir = Self::config_dir()?;
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create config directory {:?}", dir))?;

        let path = Self::config_path()?;
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(&path, content)
            .with_context(|| format!("Failed to write config to {:?}", path))?;

        Ok(())
    }

    /// Apply `CHARGEN_*` overrides from `lookup`
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(path) = get(ENV_DATA_FILE) {
            self.data_file = Some(PathBuf::from(path));
        }
        if let Some(url) = get(ENV_BASE_URL) {
            self.base_url = url;
        }
        if let Some(model) = get(ENV_MODEL) {
            self.default_model = Some(model);
        }
    }

    /// Character data file
    pub fn data_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.data_file {
            return Ok(path.clone());
        }
        let data_dir = dirs::data_dir()
            .context("Could not determine data directory")?
            .join(CONFIG_DIR);
        Ok(data_dir.join(DATA_FILE))
    }

    /// System prompt for remote generation
    ///
    /// A configured file must exist. Otherwise `system_prompt.txt` in the
    /// working directory is used when present, then the built-in prompt.
    pub fn system_prompt(&self) -> Result<String> {
        if let Some(path) = &self.system_prompt_file {
            return fs::read_to_string(path)
                .with_context(|| format!("Failed to read system prompt from {:?}", path));
        }

        let local = Path::new(SYSTEM_PROMPT_FILE);
        if local.exists() {
            return fs::read_to_string(local)
                .with_context(|| format!("Failed to read system prompt from {:?}", local));
        }

        Ok(DEFAULT_SYSTEM_PROMPT.to_string())
    }

    pub fn client(&self) -> LmStudioClient {
        LmStudioClient::new(&self.base_url)
            .with_timeouts(
                Duration::from_secs(self.list_timeout_secs),
                Duration::from_secs(self.generate_timeout_secs),
            )
            .with_temperature(self.temperature)
    }

    pub fn generator(&self) -> CharacterGenerator {
        CharacterGenerator::new(self.strategy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.strategy, GenerationStrategy::Weighted);
        assert_eq!(config.list_timeout_secs, 5);
        assert_eq!(config.generate_timeout_secs, 60);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "strategy = \"uniform\"\ndefault_model = \"qwen\"\ndata_file = \"/tmp/chars.json\"\n",
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.strategy, GenerationStrategy::Uniform);
        assert_eq!(config.default_model.as_deref(), Some("qwen"));
        assert_eq!(config.data_path().unwrap(), PathBuf::from("/tmp/chars.json"));
        assert!((config.temperature - 0.8).abs() < f32::EPSILON);
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "strategy = \"chaotic\"\n").unwrap();

        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            (ENV_BASE_URL, "http://gpu-box:1234/v1"),
            (ENV_MODEL, "llama-3"),
            (ENV_DATA_FILE, "   "),
        ]);

        let mut config = Config::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.base_url, "http://gpu-box:1234/v1");
        assert_eq!(config.default_model.as_deref(), Some("llama-3"));
        assert_eq!(config.data_file, None);
    }

    #[test]
    fn test_round_trip_through_toml() {
        let mut config = Config::default();
        config.default_model = Some("llama-3".into());
        config.strategy = GenerationStrategy::Uniform;

        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed.default_model, config.default_model);
        assert_eq!(parsed.strategy, config.strategy);
        assert_eq!(parsed.base_url, config.base_url);
    }

    #[test]
    fn test_configured_system_prompt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prompt.txt");
        fs::write(&path, "Write pirates.").unwrap();

        let config = Config {
            system_prompt_file: Some(path),
            ..Config::default()
        };
        assert_eq!(config.system_prompt().unwrap(), "Write pirates.");

        let missing = Config {
            system_prompt_file: Some(dir.path().join("absent.txt")),
            ..Config::default()
        };
        assert!(missing.system_prompt().is_err());
    }
}
