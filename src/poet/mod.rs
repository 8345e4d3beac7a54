//! Poem composition: prompt building plus the remote composition service.
//!
//! * [`compose`] / [`PromptContext`] — deterministic caption → prompt template.
//! * [`PoemService`] — async trait implemented by composition backends.
//! * [`ApiPoet`] — OpenAI-compatible chat-completions client.
//! * [`PoemError`] — error variants for composition operations.

pub mod composer;
pub mod prompt;

pub use composer::{ApiPoet, PoemError, PoemService};
pub use prompt::{compose, PromptContext, MANDATORY_PHRASE, PERSONA};
