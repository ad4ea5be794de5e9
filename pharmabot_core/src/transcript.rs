//! Ordered turn history of one session.

use chrono::{DateTime, Utc};

use crate::history::HistoryPolicy;
use crate::{Role, Turn};

/// Chronological, append-only list of turns.
///
/// A transcript created with a bounded [`HistoryPolicy`] evicts its oldest
/// turns on append; the default policy keeps everything.
#[derive(Debug, Clone)]
pub struct Transcript {
    turns: Vec<Turn>,
    policy: HistoryPolicy,
    exchanges: usize,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Transcript {
    /// Create an empty, unbounded transcript.
    #[must_use]
    pub fn new() -> Self {
        Self::with_policy(HistoryPolicy::default())
    }

    #[must_use]
    pub fn with_policy(policy: HistoryPolicy) -> Self {
        let now = Utc::now();
        Self {
            turns: Vec::new(),
            policy,
            exchanges: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Append a turn, then apply the retention policy.
    pub fn append(&mut self, turn: Turn) {
        if turn.role() == Role::Assistant {
            self.exchanges += 1;
        }
        self.turns.push(turn);
        let evicted = self.policy.enforce(&mut self.turns);
        if evicted > 0 {
            tracing::debug!("Evicted {evicted} oldest turns from transcript");
        }
        self.updated_at = Utc::now();
    }

    #[must_use]
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Get the last N turns.
    #[must_use]
    pub fn last_n(&self, n: usize) -> &[Turn] {
        let start = self.turns.len().saturating_sub(n);
        &self.turns[start..]
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    #[must_use]
    pub const fn policy(&self) -> &HistoryPolicy {
        &self.policy
    }

    /// Completed user/assistant exchanges since the session started,
    /// including exchanges the policy has since evicted.
    #[must_use]
    pub const fn exchange_count(&self) -> usize {
        self.exchanges
    }

    #[must_use]
    pub fn stats(&self) -> TranscriptStats {
        let total_chars: usize = self.turns.iter().map(Turn::char_count).sum();
        let user_turns = self.turns.iter().filter(|t| t.role() == Role::User).count();
        let assistant_turns = self
            .turns
            .iter()
            .filter(|t| t.role() == Role::Assistant)
            .count();

        TranscriptStats {
            total_turns: self.turns.len(),
            user_turns,
            assistant_turns,
            total_characters: total_chars,
            estimated_tokens: total_chars / 4, // Rough estimate: 4 chars per token
        }
    }
}

impl Default for Transcript {
    fn default() -> Self {
        Self::new()
    }
}

/// Statistics about a transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptStats {
    pub total_turns: usize,
    pub user_turns: usize,
    pub assistant_turns: usize,
    pub total_characters: usize,
    pub estimated_tokens: usize,
}
