use std::path::PathBuf;
use thiserror::Error;

/// Startup configuration failures. All of them are fatal.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot find home directory")]
    NoHomeDir,

    #[error(
        "API key not found: set the {env_var} environment variable or provider.api_key in the config file"
    )]
    MissingApiKey { env_var: String },

    #[error("Failed to read config at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config at {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Config file already exists at: {}. Please edit it directly.", .0.display())]
    AlreadyExists(PathBuf),

    #[error("Failed to render config template: {0}")]
    Serialize(#[from] serde_json::Error),
}
