use serde::{Deserialize, Serialize};

use crate::{Role, Turn};

/// Retention bounds for a transcript.
///
/// Both bounds default to `None`, which keeps every turn for the life of the
/// session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryPolicy {
    /// Maximum number of turns retained
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_turns: Option<usize>,
    /// Maximum total characters retained (approximate token budget)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_chars: Option<usize>,
}

impl HistoryPolicy {
    #[must_use]
    pub const fn with_max_turns(mut self, max: usize) -> Self {
        self.max_turns = Some(max);
        self
    }

    #[must_use]
    pub const fn with_max_chars(mut self, max: usize) -> Self {
        self.max_chars = Some(max);
        self
    }

    #[must_use]
    pub const fn is_unbounded(&self) -> bool {
        self.max_turns.is_none() && self.max_chars.is_none()
    }

    /// Evict the oldest turns until `turns` fits, returning how many were
    /// removed.
    ///
    /// The newest exchange (a user turn answered by the assistant turn that
    /// closes the list) is never split, and eviction never stops on an
    /// assistant turn so the retained history still opens with a question.
    /// `max_chars` counts Unicode scalar values, not bytes.
    pub fn enforce(&self, turns: &mut Vec<Turn>) -> usize {
        if self.is_unbounded() || turns.len() <= 1 {
            return 0;
        }

        let last = turns.len() - 1;
        let closes_exchange =
            turns[last].role() == Role::Assistant && turns[last - 1].role() == Role::User;
        let floor = if closes_exchange { last - 1 } else { last };

        let mut cut = self
            .max_turns
            .map_or(0, |max| turns.len().saturating_sub(max.max(1)))
            .min(floor);

        if let Some(max_chars) = self.max_chars {
            let mut total: usize = turns[cut..].iter().map(Turn::char_count).sum();
            while cut < floor && total > max_chars {
                total -= turns[cut].char_count();
                cut += 1;
            }
        }

        if cut > 0 {
            while cut < floor && turns[cut].role() == Role::Assistant {
                cut += 1;
            }
        }

        turns.drain(..cut);
        cut
    }
}
