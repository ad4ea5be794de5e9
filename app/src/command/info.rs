use pharmabot_config::Config;

/// Strategy for displaying the effective configuration.
///
/// The API key is only ever shown masked.
#[derive(Debug, Clone, Copy)]
pub struct InfoStrategy;

impl super::CommandStrategy for InfoStrategy {
    type Input = ();

    async fn execute(&self, _input: Self::Input) -> anyhow::Result<()> {
        let path = Config::config_path()?;
        let config = Config::load()?;

        println!("=== pharmabot Configuration ===\n");

        println!("Config File:");
        if path.exists() {
            println!("  Path: {}", path.display());
        } else {
            println!("  Path: {} (not found, using defaults)", path.display());
        }
        println!();

        println!("Provider:");
        println!("  Kind: {}", config.provider.kind);
        println!(
            "  Base URL: {}",
            config.provider.base_url.as_deref().unwrap_or("(default)")
        );
        println!("  Timeout: {}s", config.provider.timeout_secs);
        match config.provider.api_key() {
            Ok(key) => println!("  API Key: {key}"),
            Err(_) => println!("  API Key: (not set, export {})", config.provider.api_key_env),
        }
        println!();

        println!("Agent Defaults:");
        println!("  Model: {}", config.agent.model);
        println!("  Max Tokens: {}", config.agent.max_tokens);
        println!("  Temperature: {}", config.agent.temperature);
        println!("  Session: {}", config.agent.session_id);
        println!();

        println!("History:");
        println!("  Max Turns: {}", format_limit(config.history.max_turns));
        println!("  Max Chars: {}", format_limit(config.history.max_chars));

        Ok(())
    }
}

fn format_limit(limit: Option<usize>) -> String {
    limit.map_or_else(|| "unbounded".to_string(), |n| n.to_string())
}
