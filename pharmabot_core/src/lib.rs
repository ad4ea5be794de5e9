#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

use serde::{Deserialize, Serialize};

pub mod error;
pub mod history;
pub mod persona;
pub mod prompt;
pub mod provider;
pub mod transcript;

pub use error::ProviderError;
pub use history::{HistoryPolicy, HistoryStore, SessionHandle};
pub use persona::PHARMACIST_PERSONA;
pub use prompt::{PromptAssembler, PromptRequest};
pub use provider::{Completion, CompletionProvider, Usage};
pub use transcript::{Transcript, TranscriptStats};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// One utterance in a conversation, tagged with its speaker.
///
/// Fields are private so a turn cannot change after it is created.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Turn {
    role: Role,
    text: String,
}

impl Turn {
    #[must_use]
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
        }
    }

    #[must_use]
    pub fn system(text: impl Into<String>) -> Self {
        Self::new(Role::System, text)
    }

    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, text)
    }

    #[must_use]
    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(Role::Assistant, text)
    }

    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Length of the text in characters, not bytes.
    #[must_use]
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}
