//! # portrayal-cli
//!
//! Command-line front end: argument parsing and the subcommand handlers that wire the OneBot
//! adapter, the history crawler, prompt entries and the LLM client together.

pub mod app;
pub mod cli;

pub use app::{
    crawl_with_timeout, format_query_result, handle_portrait, handle_prompts, handle_query,
};
pub use cli::{Cli, Commands, DEFAULT_TIMEOUT_SECS};
