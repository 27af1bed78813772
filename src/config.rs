use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub enrichment: EnrichmentConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// Path to the JSON state file holding lists, saved searches, notes,
    /// and cached enrichment results.
    #[serde(default = "default_storage_path")]
    pub path: PathBuf,
}

fn default_storage_path() -> PathBuf {
    PathBuf::from("./precision_state.json")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

fn default_bind() -> String {
    "127.0.0.1:7420".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct EnrichmentConfig {
    /// Bound on the website fetch, in seconds. The upstream completion call
    /// is not bounded; a slow model response is still a live result.
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
    /// Extracted text is truncated to this many characters before being sent
    /// upstream.
    #[serde(default = "default_max_content_chars")]
    pub max_content_chars: usize,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    /// Base URL of the chat-completion API. Overridable for testing.
    #[serde(default = "default_api_base")]
    pub api_base: String,
}

fn default_fetch_timeout_secs() -> u64 {
    15
}
fn default_max_content_chars() -> usize {
    4000
}
fn default_model() -> String {
    "gpt-4o-mini".to_string()
}
fn default_temperature() -> f64 {
    0.3
}
fn default_api_base() -> String {
    "https://api.openai.com/v1".to_string()
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            fetch_timeout_secs: default_fetch_timeout_secs(),
            max_content_chars: default_max_content_chars(),
            model: default_model(),
            temperature: default_temperature(),
            api_base: default_api_base(),
        }
    }
}

impl EnrichmentConfig {
    /// The bearer credential for the completion API, if configured.
    ///
    /// Absence is not an error — it selects the mock-data fallback.
    pub fn api_key(&self) -> Option<String> {
        std::env::var("OPENAI_API_KEY").ok().filter(|k| !k.is_empty())
    }
}

impl Config {
    /// All-defaults configuration, used when no config file exists and by
    /// tests that do not care about storage location.
    pub fn minimal() -> Self {
        Self {
            storage: StorageConfig::default(),
            server: ServerConfig::default(),
            enrichment: EnrichmentConfig::default(),
        }
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    if config.enrichment.fetch_timeout_secs == 0 {
        anyhow::bail!("enrichment.fetch_timeout_secs must be > 0");
    }

    if config.enrichment.max_content_chars == 0 {
        anyhow::bail!("enrichment.max_content_chars must be > 0");
    }

    if !(0.0..=2.0).contains(&config.enrichment.temperature) {
        anyhow::bail!("enrichment.temperature must be in [0.0, 2.0]");
    }

    Ok(config)
}

/// Loads the config file when present, otherwise falls back to defaults.
///
/// A missing file is not an error — every setting has a sensible default —
/// but a file that exists and fails to parse or validate is.
pub fn load_or_default(path: &Path) -> Result<Config> {
    if path.exists() {
        load_config(path)
    } else {
        Ok(Config::minimal())
    }
}

/// A starter config file written by `precision init`.
pub const EXAMPLE_CONFIG: &str = r#"[storage]
path = "./precision_state.json"

[server]
bind = "127.0.0.1:7420"

[enrichment]
fetch_timeout_secs = 15
max_content_chars = 4000
model = "gpt-4o-mini"
temperature = 0.3
"#;
