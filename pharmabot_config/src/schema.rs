use pharmabot_core::HistoryPolicy;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

use crate::ConfigError;

const CONFIG_DIR_NAME: &str = "pharmabot";
const CONFIG_FILE_NAME: &str = "config.json";

#[derive(Debug, Default, Deserialize, Serialize, Clone, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub agent: AgentDefaults,
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub history: HistoryPolicy,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct AgentDefaults {
    #[serde(default = "AgentDefaults::default_model")]
    pub model: String,
    #[serde(default = "AgentDefaults::default_temperature")]
    pub temperature: f32,
    #[serde(default = "AgentDefaults::default_max_tokens")]
    pub max_tokens: u32,
    /// Session used when `--session` is not given
    #[serde(default = "AgentDefaults::default_session_id")]
    pub session_id: String,
}

impl Default for AgentDefaults {
    fn default() -> Self {
        Self {
            model: Self::default_model(),
            temperature: Self::default_temperature(),
            max_tokens: Self::default_max_tokens(),
            session_id: Self::default_session_id(),
        }
    }
}

impl AgentDefaults {
    fn default_model() -> String {
        "gemini-2.5-flash".to_string()
    }

    const fn default_temperature() -> f32 {
        0.2
    }

    const fn default_max_tokens() -> u32 {
        8192
    }

    fn default_session_id() -> String {
        "cli:default".to_string()
    }
}

#[derive(Debug, Default, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    #[default]
    Gemini,
    OpenaiCompatible,
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gemini => f.write_str("gemini"),
            Self::OpenaiCompatible => f.write_str("openai_compatible"),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    #[serde(default)]
    pub kind: ProviderKind,
    /// Override for the provider's default endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Environment variable holding the API key
    #[serde(default = "ProviderConfig::default_api_key_env")]
    pub api_key_env: String,
    /// Fallback key when the environment variable is unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default = "ProviderConfig::default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            kind: ProviderKind::default(),
            base_url: None,
            api_key_env: Self::default_api_key_env(),
            api_key: None,
            timeout_secs: Self::default_timeout_secs(),
        }
    }
}

impl ProviderConfig {
    fn default_api_key_env() -> String {
        "GEMINI_API_KEY".to_string()
    }

    const fn default_timeout_secs() -> u64 {
        60
    }

    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Resolve the API key, preferring the environment over the file.
    ///
    /// `lookup` reads an environment variable; blank values count as unset.
    pub fn resolve_api_key<F>(&self, lookup: F) -> Result<ApiKey, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let from_env = lookup(&self.api_key_env).filter(|v| !v.trim().is_empty());
        if from_env.is_some() {
            debug!("API key taken from ${}", self.api_key_env);
        }

        from_env
            .or_else(|| self.api_key.clone().filter(|v| !v.trim().is_empty()))
            .map(|v| ApiKey(v.trim().to_string()))
            .ok_or_else(|| ConfigError::MissingApiKey {
                env_var: self.api_key_env.clone(),
            })
    }

    pub fn api_key(&self) -> Result<ApiKey, ConfigError> {
        self.resolve_api_key(|name| std::env::var(name).ok())
    }
}

/// Provider credential. `Debug` and `Display` never reveal it.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// First and last four characters, or `***` for short keys.
    #[must_use]
    pub fn masked(&self) -> String {
        let chars: Vec<char> = self.0.chars().collect();
        if chars.len() > 8 {
            let head: String = chars[..4].iter().collect();
            let tail: String = chars[chars.len() - 4..].iter().collect();
            format!("{head}...{tail}")
        } else {
            "***".to_string()
        }
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(<redacted>)")
    }
}

impl fmt::Display for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.masked())
    }
}

impl Config {
    pub fn config_dir() -> Result<PathBuf, ConfigError> {
        Ok(dirs::home_dir()
            .ok_or(ConfigError::NoHomeDir)?
            .join(CONFIG_DIR_NAME))
    }

    pub fn config_path() -> Result<PathBuf, ConfigError> {
        Ok(Self::config_dir()?.join(CONFIG_FILE_NAME))
    }

    /// Load `~/pharmabot/config.json`, or defaults when the file is absent.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_path()?;
        if path.exists() {
            Self::load_from(&path)
        } else {
            info!(
                "No config file at {}, using defaults",
                path.display()
            );
            Ok(Self::default())
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Write the default template to `~/pharmabot/config.json`.
    pub fn create_config() -> Result<PathBuf, ConfigError> {
        let path = Self::config_path()?;
        Self::write_template(&path)?;
        Ok(path)
    }

    /// Write the default template to `path`, refusing to overwrite.
    pub fn write_template(path: &Path) -> Result<(), ConfigError> {
        if path.exists() {
            return Err(ConfigError::AlreadyExists(path.to_path_buf()));
        }

        let io_err = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir).map_err(io_err)?;
        }

        let template = serde_json::to_string_pretty(&Self::default())?;
        std::fs::write(path, template).map_err(io_err)?;
        Ok(())
    }
}
