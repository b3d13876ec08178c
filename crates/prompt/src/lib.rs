//! # Prompt
//!
//! Chat message types and the prompts used for participant portraits.
//!
//! ## Parts
//!
//! - [`ChatMessage`] / [`MessageRole`]: one element of an OpenAI-style `messages` array
//! - [`PromptRegistry`]: command-keyed system prompt templates (user file + built-ins)
//! - [`render_system_prompt`] / [`build_portrait_prompt`]: the system and user prompts of one
//!   portrait request
//!
//! ## External interactions
//!
//! - **AI models**: output is sent to LLM APIs through `llm-client`.
//! - **Filesystem**: `PORTRAYAL_PROMPTS_FILE` (JSON list of `{command, content}`).

mod entry;
mod portrait;

pub use entry::{
    PromptEntry, PromptRegistry, BUILTIN_PROMPTS_JSON, ENV_LOAD_BUILTIN_PROMPTS,
    ENV_PROMPTS_FILE,
};
pub use portrait::{build_portrait_prompt, render_system_prompt};

/// Role of a message, one-to-one with OpenAI Chat Completions API `role` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageRole {
    /// System instruction (API `role: "system"`).
    System,
    /// User message (API `role: "user"`).
    User,
    /// Assistant message (API `role: "assistant"`).
    Assistant,
}

/// A single chat message, one-to-one with one element of OpenAI `messages` array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}
