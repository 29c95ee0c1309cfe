use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

const CONFIG_FILE: &str = ".pr-review.toml";
const DEFAULT_MODEL: &str = "google:gemini-2.5-pro";
const DEFAULT_API_KEY: &str = "dummy";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("OPENAI_BASE_URL environment variable must be set (example: export OPENAI_BASE_URL=https://api.openai.com/v1)")]
    MissingBaseUrl,
}

/// Top-level configuration loaded from .pr-review.toml.
///
/// All fields are optional; the tool works with zero config as long as
/// OPENAI_BASE_URL is exported.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub openai: OpenAiConfig,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub prompt: PromptConfig,

    #[serde(default)]
    pub github: GitHubConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpenAiConfig {
    /// Model identifier sent with every completion request
    #[serde(default = "default_model")]
    pub model: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Directory holding cached reviews and the transient comment body
    #[serde(default = "default_cache_dir")]
    pub dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PromptConfig {
    /// YAML file with a top-level `prompt` key used as the system message
    #[serde(default = "default_prompt_file")]
    pub file: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitHubConfig {
    /// GitHub CLI executable
    #[serde(default = "default_gh_cli")]
    pub cli: String,
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from(".cache")
}

fn default_prompt_file() -> PathBuf {
    PathBuf::from("gemini_prompt.yaml")
}

fn default_gh_cli() -> String {
    "gh".to_string()
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: default_cache_dir(),
        }
    }
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            file: default_prompt_file(),
        }
    }
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            cli: default_gh_cli(),
        }
    }
}

/// Endpoint and key for the OpenAI-compatible completion service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenAiCredentials {
    pub base_url: String,
    pub api_key: String,
}

impl Config {
    /// Load configuration from .pr-review.toml in the current directory.
    /// Returns default config if the file doesn't exist.
    pub fn load() -> Result<Config, ConfigError> {
        let path = Path::new(CONFIG_FILE);
        if path.exists() {
            Self::load_from(path)
        } else {
            Ok(Config::default())
        }
    }

    /// Load from a specific path (useful for testing).
    pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Resolve the completion endpoint from OPENAI_BASE_URL / OPENAI_API_KEY,
    /// reading variables through `lookup` (normally `std::env::var`).
    pub fn openai_credentials<F>(&self, lookup: F) -> Result<OpenAiCredentials, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        resolve_credentials(lookup)
    }
}

/// OPENAI_BASE_URL is required; OPENAI_API_KEY falls back to a placeholder
/// for proxies that ignore it.
fn resolve_credentials<F>(lookup: F) -> Result<OpenAiCredentials, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let base_url = lookup("OPENAI_BASE_URL")
        .filter(|value| !value.trim().is_empty())
        .ok_or(ConfigError::MissingBaseUrl)?;
    let api_key = lookup("OPENAI_API_KEY").unwrap_or_else(|| DEFAULT_API_KEY.to_string());

    Ok(OpenAiCredentials { base_url, api_key })
}
