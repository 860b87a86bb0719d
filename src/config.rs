//! Configuration management
//!
//! Configuration is read from `~/.stock-agent/config.json` (missing file means
//! defaults) and then overridden by environment variables:
//! - `DEEPSEEK_API_KEY` - API key for the completion endpoint
//! - `LLM_BASE_URL` - OpenAI-compatible base URL
//! - `LLM_MODEL` - Model identifier
//! - `HOST` / `PORT` - HTTP listen address

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use crate::Result;
use crate::error::Error;
use crate::inventory::InventoryRecord;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Completion endpoint settings
    #[serde(default)]
    pub llm: LlmConfig,

    /// HTTP listen address
    #[serde(default)]
    pub server: ServerConfig,

    /// Instruction preamble wrapped around every user question
    #[serde(default = "default_persona")]
    pub persona: String,

    /// Inventory backend and seed records
    #[serde(default)]
    pub inventory: InventoryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

/// Which store backs the inventory tool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InventoryBackend {
    Sqlite,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryConfig {
    #[serde(default = "default_backend")]
    pub backend: InventoryBackend,

    #[serde(default = "default_seed")]
    pub seed: Vec<InventoryRecord>,
}

fn default_persona() -> String {
    "You are a smart assistant who speaks Arabic in the Algerian dialect. \
     Use the tools when needed (for example, to check product stock)."
        .to_string()
}

fn default_base_url() -> String {
    "https://api.deepseek.com/v1".to_string()
}

fn default_model() -> String {
    "deepseek-chat".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_backend() -> InventoryBackend {
    InventoryBackend::Sqlite
}

fn default_seed() -> Vec<InventoryRecord> {
    vec![
        InventoryRecord::new("iPhone 15", 12),
        InventoryRecord::new("MacBook Pro 16", 5),
        InventoryRecord::new("AirPods Pro", 25),
        InventoryRecord::new("Galaxy S24", 8),
    ]
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_base_url(),
            model: default_model(),
            temperature: default_temperature(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            seed: default_seed(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            llm: LlmConfig::default(),
            server: ServerConfig::default(),
            persona: default_persona(),
            inventory: InventoryConfig::default(),
        }
    }
}

impl Config {
    /// Apply environment overrides through the given lookup.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("DEEPSEEK_API_KEY") {
            self.llm.api_key = key;
        }
        if let Some(url) = lookup("LLM_BASE_URL") {
            self.llm.base_url = url;
        }
        if let Some(model) = lookup("LLM_MODEL") {
            self.llm.model = model;
        }
        if let Some(host) = lookup("HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("PORT") {
            self.server.port = port
                .parse()
                .map_err(|_| Error::Config(format!("Invalid value for PORT: {port}")))?;
        }
        Ok(())
    }

    /// Check the settings needed to talk to the completion endpoint.
    pub fn validate(&self) -> Result<()> {
        if self.llm.api_key.trim().is_empty() {
            return Err(Error::Config(
                "No API key set. Set DEEPSEEK_API_KEY or run 'stock-agent onboard'.".to_string(),
            ));
        }
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(Error::Config(format!(
                "temperature must be between 0.0 and 2.0, got {}",
                self.llm.temperature
            )));
        }
        if self.llm.timeout_secs == 0 {
            return Err(Error::Config("timeout_secs must be at least 1".to_string()));
        }
        Ok(())
    }

    /// `host:port` for the HTTP listener
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

/// Get the config directory path
pub fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".stock-agent")
}

/// Get the config file path
pub fn config_path() -> PathBuf {
    config_dir().join("config.json")
}

/// Load configuration from `path` plus the process environment
pub fn load_from(path: &Path) -> Result<Config> {
    let mut config = read_file(path)?;
    config.apply_overrides(|key| std::env::var(key).ok())?;
    Ok(config)
}

fn read_file(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }

    let content = std::fs::read_to_string(path)?;
    let config: Config = serde_json::from_str(&content)
        .map_err(|e| Error::Config(format!("Failed to parse {:?}: {}", path, e)))?;
    Ok(config)
}

/// Save configuration to file
pub fn save(config: &Config, path: &Path) -> Result<()> {
    // Create parent directory
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let content = serde_json::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Interactive setup: ask for the API key, model and port, then save
pub fn onboard(path: &Path) -> Result<()> {
    use crate::ui;
    use inquire::{Confirm, CustomType, Text};

    ui::print_header("Setup Wizard");
    println!("  Let's get the stock assistant configured.\n");

    let mut config = read_file(path)?;

    let key = Text::new("Enter your DeepSeek (or OpenAI-compatible) API key:")
        .prompt()
        .map_err(|e| Error::Config(format!("Prompt failed: {}", e)))?;
    config.llm.api_key = key;

    let model = Text::new("Model:")
        .with_default(&config.llm.model)
        .prompt()
        .map_err(|e| Error::Config(format!("Prompt failed: {}", e)))?;
    config.llm.model = model;

    let custom_url = Confirm::new(&format!("Use {} as the API base URL?", config.llm.base_url))
        .with_default(true)
        .prompt()
        .map_err(|e| Error::Config(format!("Prompt failed: {}", e)))?;
    if !custom_url {
        config.llm.base_url = Text::new("Base URL:")
            .prompt()
            .map_err(|e| Error::Config(format!("Prompt failed: {}", e)))?;
    }

    config.server.port = CustomType::<u16>::new("HTTP port:")
        .with_default(config.server.port)
        .prompt()
        .map_err(|e| Error::Config(format!("Prompt failed: {}", e)))?;

    config.validate()?;

    ui::print_thinking("Saving configuration");
    save(&config, path)?;

    println!();
    ui::print_success(&format!("Saved to {:?}", path));
    ui::print_step("Run 'stock-agent serve' to start the chat server.");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.llm.model, "deepseek-chat");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.inventory.backend, InventoryBackend::Sqlite);
        assert_eq!(config.inventory.seed.len(), 4);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: Config = serde_json::from_str(r#"{"llm": {"api_key": "k"}}"#).unwrap();
        assert_eq!(config.llm.api_key, "k");
        assert_eq!(config.llm.base_url, "https://api.deepseek.com/v1");
        assert_eq!(config.server.host, "0.0.0.0");
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config
            .apply_overrides(env(&[("DEEPSEEK_API_KEY", "secret"), ("PORT", "8080")]))
            .unwrap();
        assert_eq!(config.llm.api_key, "secret");
        assert_eq!(config.listen_addr(), "0.0.0.0:8080");
    }

    #[test]
    fn test_invalid_port_override() {
        let mut config = Config::default();
        let result = config.apply_overrides(env(&[("PORT", "not-a-port")]));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_validate_requires_api_key() {
        let mut config = Config::default();
        assert!(config.validate().is_err());

        config.llm.api_key = "key".to_string();
        assert!(config.validate().is_ok());

        config.llm.temperature = 3.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = Config::default();
        config.llm.api_key = "key".to_string();
        config.llm.timeout_secs = 0;
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let mut config = Config::default();
        config.llm.model = "other-model".to_string();
        config.inventory.backend = InventoryBackend::Memory;
        save(&config, &path).unwrap();

        let loaded = read_file(&path).unwrap();
        assert_eq!(loaded.llm.model, "other-model");
        assert_eq!(loaded.inventory.backend, InventoryBackend::Memory);
    }

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = read_file(&dir.path().join("absent.json")).unwrap();
        assert_eq!(loaded.llm.model, default_model());
    }

    #[test]
    fn test_malformed_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(read_file(&path), Err(Error::Config(_))));
    }
}
