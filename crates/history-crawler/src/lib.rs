//! # History Crawler
//!
//! Discovers every message a target participant wrote in a chat group through a backward,
//! page-based history API that has no author filter.
//!
//! - [`HistoryCrawler`]: the crawl loop and `get_user_texts`
//! - [`ScanCursorStore`]: per-group cursors, one lock per group
//! - [`UserTextCache`]: per `group:user` texts with TTL
//! - [`CollectStrategy`]: context-window extraction or cross-user caching, picked at construction
//! - [`MessageConfig`] / [`EnvMessageConfig`]: tunables from env
//!
//! ## Logging
//!
//! Each round is logged at `debug` (cursor, page length, new messages, minimum key); every
//! early stop (fetch failure, missing key, stalled cursor, buffer limit) at `warn`; the end of
//! each query at `info` with scanned and entry counts.
//!
//! ## External Interactions
//!
//! - **portrayal-core**: `PageFetcher`, `RawMessage`, `QueryResult`

mod cache;
mod config;
mod crawler;
mod cursor;
mod extract;
mod strategy;

pub use cache::UserTextCache;
pub use config::{CrawlerSettings, EnvMessageConfig, MessageConfig};
pub use crawler::HistoryCrawler;
pub use cursor::{ScanCursorStore, ScanLease, CURSOR_NEWEST};
pub use extract::{extract_entries, sort_chronologically};
pub use strategy::{CollectStrategy, ParseStrategyError};
