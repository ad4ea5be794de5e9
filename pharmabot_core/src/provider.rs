use async_trait::async_trait;

use crate::{ProviderError, PromptRequest, Turn};

/// Token accounting reported by a provider, when available.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Successful completion: the assistant turn plus optional usage.
#[derive(Debug, Clone)]
pub struct Completion {
    pub turn: Turn,
    pub usage: Option<Usage>,
}

impl Completion {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            turn: Turn::assistant(text),
            usage: None,
        }
    }

    #[must_use]
    pub const fn with_usage(mut self, usage: Usage) -> Self {
        self.usage = Some(usage);
        self
    }

    #[must_use]
    pub fn text(&self) -> &str {
        self.turn.text()
    }
}

/// Hosted model endpoint that turns a prompt into an assistant turn.
///
/// Implementations own transport, authentication and response parsing.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(&self, request: &PromptRequest) -> Result<Completion, ProviderError>;

    /// Short provider name for logs.
    fn name(&self) -> &str;

    fn model(&self) -> &str;
}

#[async_trait]
impl<T: CompletionProvider + ?Sized> CompletionProvider for std::sync::Arc<T> {
    async fn complete(&self, request: &PromptRequest) -> Result<Completion, ProviderError> {
        (**self).complete(request).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }

    fn model(&self) -> &str {
        (**self).model()
    }
}

#[async_trait]
impl<T: CompletionProvider + ?Sized> CompletionProvider for Box<T> {
    async fn complete(&self, request: &PromptRequest) -> Result<Completion, ProviderError> {
        (**self).complete(request).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }

    fn model(&self) -> &str {
        (**self).model()
    }
}
