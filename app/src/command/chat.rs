//! Multi-turn conversation command.
//!
//! Without `--message` this runs the interactive loop on stdin/stdout; with
//! it, one turn is sent and the reply printed.

use pharmabot_conversation::{ConversationConfig, ConversationManager};
use tracing::info;

use super::init_common_components;

/// Input parameters for the Chat command strategy.
#[derive(Debug, Clone, Default)]
pub struct ChatInput {
    /// Session to use instead of the configured default
    pub session_id: Option<String>,
    /// Optional single message to send (non-interactive mode)
    pub message: Option<String>,
    /// Optional model override
    pub model: Option<String>,
}

/// Strategy for executing the Chat command.
#[derive(Debug, Clone, Copy)]
pub struct ChatStrategy;

impl super::CommandStrategy for ChatStrategy {
    type Input = ChatInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let common = init_common_components(input.model)?;

        let session_id = input
            .session_id
            .unwrap_or_else(|| common.config.agent.session_id.clone());
        info!("Starting conversation session: {session_id}");

        let manager = ConversationManager::new(
            common.provider,
            common.store,
            ConversationConfig::default().with_session_id(session_id),
        );

        if let Some(msg) = input.message {
            let result = manager.process_turn(&msg).await?;
            println!("{}", result.response);
        } else {
            let stdin = std::io::stdin();
            let stdout = std::io::stdout();
            manager.run_interactive(stdin.lock(), stdout.lock()).await?;
        }

        Ok(())
    }
}
