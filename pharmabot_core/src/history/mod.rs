//! Session-scoped conversation history.
//!
//! The [`HistoryStore`] maps session identifiers to transcripts. It is an
//! explicitly constructed object: build one at startup, share it behind an
//! `Arc`, and drop it at shutdown.

mod policy;
mod store;

pub use policy::HistoryPolicy;
pub use store::{HistoryStore, SessionHandle};
