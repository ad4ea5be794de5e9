//! Static strategy pattern for CLI commands.
//!
//! Each command is a separate strategy type with its own input, dispatched
//! statically from `main`.

use pharmabot_config::{Config, ProviderKind};
use pharmabot_core::{CompletionProvider, HistoryStore};
use pharmabot_providers::{GeminiProvider, GenerationSettings, OpenAiCompatibleProvider};
use std::sync::Arc;
use tracing::info;

mod chat;
mod info;
mod init;
mod version;

pub use chat::{ChatInput, ChatStrategy};
pub use info::InfoStrategy;
pub use init::InitStrategy;
pub use version::VersionStrategy;

/// Core trait defining the contract for all command strategies.
///
/// # Example
/// ```rust,ignore
/// struct MyStrategy;
///
/// impl CommandStrategy for MyStrategy {
///     type Input = MyInput;
///
///     async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
///         // Command logic here
///         Ok(())
///     }
/// }
/// ```
pub trait CommandStrategy: Send + Sync + 'static {
    /// The input type this strategy accepts.
    type Input;

    /// Execute the command with the given input.
    ///
    /// # Errors
    /// Returns an error if command execution fails.
    async fn execute(&self, input: Self::Input) -> anyhow::Result<()>;
}

/// Components shared by commands that talk to the model.
pub struct CommonComponents {
    pub config: Config,
    pub provider: Box<dyn CompletionProvider>,
    pub store: Arc<HistoryStore>,
}

/// Load config, resolve the credential and build the provider and store.
///
/// Fails before any interaction when the API key is missing.
pub fn init_common_components(model: Option<String>) -> anyhow::Result<CommonComponents> {
    let config = Config::load()?;
    let provider = build_provider(&config, model)?;
    let store = Arc::new(HistoryStore::with_policy(config.history));

    Ok(CommonComponents {
        config,
        provider,
        store,
    })
}

fn generation_settings(config: &Config, model: Option<String>) -> GenerationSettings {
    GenerationSettings {
        model: model.unwrap_or_else(|| config.agent.model.clone()),
        temperature: config.agent.temperature,
        max_tokens: config.agent.max_tokens,
        timeout: config.provider.timeout(),
    }
}

fn build_provider(
    config: &Config,
    model: Option<String>,
) -> anyhow::Result<Box<dyn CompletionProvider>> {
    let api_key = config.provider.api_key()?;
    let settings = generation_settings(config, model);
    let base_url = config.provider.base_url.clone();

    info!(
        "Using provider {} with model {}",
        config.provider.kind, settings.model
    );

    let provider: Box<dyn CompletionProvider> = match config.provider.kind {
        ProviderKind::Gemini => {
            let provider = GeminiProvider::new(api_key.expose().to_string(), settings)?;
            Box::new(match base_url {
                Some(url) => provider.with_base_url(url),
                None => provider,
            })
        }
        ProviderKind::OpenaiCompatible => {
            let provider = OpenAiCompatibleProvider::new(api_key.expose().to_string(), settings)?;
            Box::new(match base_url {
                Some(url) => provider.with_base_url(url),
                None => provider,
            })
        }
    };

    Ok(provider)
}
