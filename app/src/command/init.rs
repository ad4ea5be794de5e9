use pharmabot_config::Config;

/// Strategy for initializing the configuration.
///
/// Creates the default configuration file at `~/pharmabot/config.json`.
#[derive(Debug, Clone, Copy)]
pub struct InitStrategy;

impl super::CommandStrategy for InitStrategy {
    type Input = ();

    async fn execute(&self, _input: Self::Input) -> anyhow::Result<()> {
        let path = Config::create_config()?;

        println!("Created config file at: {}", path.display());
        println!();
        println!("Next steps:");
        println!("   1. Export GEMINI_API_KEY (or set provider.api_key in the file)");
        println!("   2. Run 'pharmabot' to start a conversation");
        println!();
        println!("Configuration options:");
        println!("   - agent.model: model to use (gemini-2.5-flash, gemini-2.5-pro, ...)");
        println!("   - agent.session_id: default session for 'pharmabot chat'");
        println!("   - provider.kind: gemini or openai_compatible");
        println!("   - history.max_turns / history.max_chars: bound the kept history");
        println!();
        Ok(())
    }
}
