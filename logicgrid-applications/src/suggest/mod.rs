//! Prompt-to-action suggestions behind a per-account usage quota
//!
//! The model that turns a prompt and a protocol snapshot into edit actions is
//! an opaque collaborator ([`ActionSuggester`]). This module owns only the
//! action vocabulary and the quota around the call.

pub mod actions;
pub mod client;
pub mod service;

pub use actions::*;
pub use client::GeminiSuggester;
pub use service::{ActionSuggester, SuggestionService};
