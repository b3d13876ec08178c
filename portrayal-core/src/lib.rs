//! # portrayal-core
//!
//! Core types and traits for crawling a chat group's history: [`RawMessage`], [`QueryResult`],
//! [`ContextEntry`], [`UserProfile`], the [`PageFetcher`] and [`ProfileLookup`] collaborator
//! traits, error types, and tracing initialization. Transport-agnostic; used by `onebot`,
//! `history-crawler`, `portrait` and the CLI.

pub mod error;
pub mod fetcher;
pub mod logger;
pub mod types;

pub use error::{FetchError, PortrayalError, ProfileError, Result};
pub use fetcher::{PageFetcher, ProfileLookup};
pub use logger::init_tracing;
pub use types::{
    truncate_excerpt, ContextEntry, Gender, GroupId, QueryResult, RawMessage, UserId,
    UserProfile, CONTEXT_EXCERPT_MAX_CHARS, ELLIPSIS, NON_TEXT_PLACEHOLDER,
};
