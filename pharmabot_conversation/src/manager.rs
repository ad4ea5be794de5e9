//! Conversation manager for multi-turn dialogue.
//!
//! The `ConversationManager` is the main entry point for handling
//! conversations with context across turns.

use pharmabot_core::{
    CompletionProvider, HistoryStore, PHARMACIST_PERSONA, PromptAssembler, ProviderError,
    Transcript, Usage,
};
use std::io::{BufRead, Write};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

const BANNER: &str = "Assistente Farmacêutico Iniciado. Digite 'sair' ou 'exit' para encerrar.";
const PROMPT: &str = "Você: ";
const ASSISTANT_PREFIX: &str = "Assistente: ";
const FAREWELL: &str = "Encerrando o Assistente Farmacêutico. Até logo!";

/// Configuration for conversation management.
#[derive(Debug, Clone)]
pub struct ConversationConfig {
    /// Session identifier (persists across turns)
    pub session_id: String,
    /// System instruction sent with every prompt
    pub persona: &'static str,
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            session_id: "cli:default".to_string(),
            persona: PHARMACIST_PERSONA,
        }
    }
}

impl ConversationConfig {
    #[must_use]
    pub fn with_session_id(mut self, id: impl Into<String>) -> Self {
        self.session_id = id.into();
        self
    }
}

/// Errors that can occur during conversation management.
#[derive(Debug, Error)]
pub enum ConversationError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result of processing a conversation turn.
#[derive(Debug, Clone)]
pub struct TurnResult {
    /// Assistant's response
    pub response: String,
    /// Token usage information
    pub usage: Option<Usage>,
    /// 1-based exchange number within the session
    pub turn_number: usize,
}

/// Multi-turn conversation manager.
///
/// Holds a shared [`HistoryStore`]; several managers over the same store
/// with different session ids never see each other's turns.
pub struct ConversationManager<P>
where
    P: CompletionProvider,
{
    provider: P,
    store: Arc<HistoryStore>,
    config: ConversationConfig,
}

impl<P> ConversationManager<P>
where
    P: CompletionProvider,
{
    pub fn new(provider: P, store: Arc<HistoryStore>, config: ConversationConfig) -> Self {
        info!(
            "Creating conversation manager for session: {} (provider={}, model={})",
            config.session_id,
            provider.name(),
            provider.model()
        );
        Self {
            provider,
            store,
            config,
        }
    }

    #[must_use]
    pub fn session_id(&self) -> &str {
        &self.config.session_id
    }

    /// Process a single conversation turn.
    ///
    /// The session stays locked from prompt assembly until both turns are
    /// recorded, so concurrent turns on one session cannot interleave. On
    /// provider failure nothing is appended.
    pub async fn process_turn(&self, user_input: &str) -> Result<TurnResult, ConversationError> {
        let session = self.store.get_or_create(&self.config.session_id);
        let mut transcript = session.lock().await;
        let turn_number = transcript.exchange_count() + 1;

        info!(
            "Processing turn {turn_number} for session: {}",
            self.config.session_id
        );

        let request = PromptAssembler::build(self.config.persona, &transcript, user_input);
        debug!(
            "Prompt assembled: {} history turns + persona + user",
            request.history().len()
        );

        let completion = match self.provider.complete(&request).await {
            Ok(completion) => completion,
            Err(e) => {
                warn!(
                    "Completion failed for session {}: {e}",
                    self.config.session_id
                );
                return Err(e.into());
            }
        };

        transcript.append(request.user_turn().clone());
        transcript.append(completion.turn.clone());

        if let Some(usage) = completion.usage {
            debug!(
                "Tokens: {} prompt + {} completion = {} total",
                usage.prompt_tokens, usage.completion_tokens, usage.total_tokens
            );
        }
        debug!("Turn {turn_number} completed successfully");

        Ok(TurnResult {
            response: completion.text().to_string(),
            usage: completion.usage,
            turn_number,
        })
    }

    /// Run the read-eval-print loop until an exit token or end of input.
    pub async fn run_interactive<R, W>(
        &self,
        mut input: R,
        mut output: W,
    ) -> Result<(), ConversationError>
    where
        R: BufRead,
        W: Write,
    {
        writeln!(output, "{BANNER}")?;

        loop {
            write!(output, "{PROMPT}")?;
            output.flush()?;

            let mut line = String::new();
            if input.read_line(&mut line)? == 0 {
                writeln!(output)?;
                writeln!(output, "{FAREWELL}")?;
                info!("Input closed, ending session");
                break;
            }

            if crate::is_exit_command(&line) {
                writeln!(output, "{FAREWELL}")?;
                break;
            }

            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            match self.process_turn(line).await {
                Ok(result) => writeln!(output, "{ASSISTANT_PREFIX}{}", result.response)?,
                Err(e) => writeln!(output, "Erro ao chamar o LLM: {e}")?,
            }
        }

        let stats = self.transcript().await.stats();
        info!(
            "Conversation ended: {} turns ({} chars, ~{} tokens)",
            stats.total_turns, stats.total_characters, stats.estimated_tokens
        );
        Ok(())
    }

    /// Snapshot of this manager's session history.
    pub async fn transcript(&self) -> Transcript {
        self.store.snapshot(&self.config.session_id).await
    }
}
