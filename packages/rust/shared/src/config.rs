//! Application configuration for bandsite.
//!
//! User config lives at `~/.bandsite/bandsite.toml`.
//! CLI flags override environment, which overrides the config file, which
//! overrides defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{BandsiteError, Result};
use crate::types::DEFAULT_MAX_CHARS;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "bandsite.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".bandsite";

/// Environment variable that overrides the configured model.
pub const MODEL_ENV_VAR: &str = "OPENAI_MODEL";

// ---------------------------------------------------------------------------
// Config structs (matching bandsite.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Remote text-generation endpoint.
    #[serde(default)]
    pub llm: LlmConfig,

    /// Chunking and extraction tuning.
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Extraction fragment cache.
    #[serde(default)]
    pub cache: CacheConfig,
}

/// `[llm]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Name of the env var holding the API key (never store the key itself).
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Base URL of an OpenAI-compatible API.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model used for both extraction and page writing.
    #[serde(default = "default_model")]
    pub model: String,

    /// Per-request timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_api_key_env(),
            base_url: default_base_url(),
            model: default_model(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".into()
}
fn default_base_url() -> String {
    "https://api.openai.com/v1".into()
}
fn default_model() -> String {
    "gpt-4o-mini".into()
}
fn default_timeout_secs() -> u64 {
    120
}

/// `[pipeline]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Character budget per extraction chunk (all variants).
    #[serde(default = "default_max_chars")]
    pub max_chars: usize,

    /// How many extraction calls may be in flight at once.
    #[serde(default = "default_concurrency")]
    pub extraction_concurrency: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_chars: default_max_chars(),
            extraction_concurrency: default_concurrency(),
        }
    }
}

fn default_max_chars() -> usize {
    DEFAULT_MAX_CHARS
}
fn default_concurrency() -> usize {
    1
}

/// `[cache]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Reuse extraction fragments for identical prompts across runs.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Cache directory; defaults to `~/.bandsite/cache`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<String>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dir: None,
        }
    }
}

fn default_true() -> bool {
    true
}

impl AppConfig {
    /// Model to use: explicit override, then `OPENAI_MODEL`, then config.
    pub fn resolve_model(&self, cli_override: Option<&str>) -> String {
        if let Some(model) = cli_override.filter(|m| !m.is_empty()) {
            return model.to_string();
        }
        match std::env::var(MODEL_ENV_VAR) {
            Ok(model) if !model.is_empty() => model,
            _ => self.llm.model.clone(),
        }
    }

    /// Resolved cache directory, expanding a leading `~/`.
    pub fn cache_dir(&self) -> Result<PathBuf> {
        match self.cache.dir.as_deref() {
            Some(dir) => expand_home(dir),
            None => Ok(config_dir()?.join("cache")),
        }
    }

    /// Check values that serde cannot validate on its own.
    pub fn validate(&self) -> Result<()> {
        Url::parse(&self.llm.base_url).map_err(|e| {
            BandsiteError::config(format!("invalid llm.base_url {:?}: {e}", self.llm.base_url))
        })?;
        if self.pipeline.max_chars == 0 {
            return Err(BandsiteError::config("pipeline.max_chars must be positive"));
        }
        if self.pipeline.extraction_concurrency == 0 {
            return Err(BandsiteError::config(
                "pipeline.extraction_concurrency must be at least 1",
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.bandsite/`).
pub fn config_dir() -> Result<PathBuf> {
    let home =
        dirs::home_dir().ok_or_else(|| BandsiteError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.bandsite/bandsite.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

fn expand_home(path: &str) -> Result<PathBuf> {
    match path.strip_prefix("~/") {
        Some(rest) => {
            let home = dirs::home_dir()
                .ok_or_else(|| BandsiteError::config("could not determine home directory"))?;
            Ok(home.join(rest))
        }
        None => Ok(PathBuf::from(path)),
    }
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| BandsiteError::io(path, e))?;

    let config: AppConfig = toml::from_str(&content).map_err(|e| {
        BandsiteError::config(format!("failed to parse {}: {e}", path.display()))
    })?;
    config.validate()?;
    Ok(config)
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| BandsiteError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| BandsiteError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| BandsiteError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Read the API key from the env var named in the config.
pub fn resolve_api_key(config: &AppConfig) -> Result<String> {
    let var_name = &config.llm.api_key_env;
    match std::env::var(var_name) {
        Ok(val) if !val.is_empty() => Ok(val),
        _ => Err(BandsiteError::config(format!(
            "API key not found. Set the {var_name} environment variable."
        ))),
    }
}
