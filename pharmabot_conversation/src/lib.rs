#![warn(
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

//! Interactive session loop.
//!
//! Each turn reads one line, assembles a prompt from the session's history,
//! asks the provider for a reply and records the exchange. A failed
//! completion is reported and leaves the history untouched.

mod exit;
mod manager;

pub use exit::{EXIT_TOKENS, is_exit_command};
pub use manager::{ConversationConfig, ConversationError, ConversationManager, TurnResult};
