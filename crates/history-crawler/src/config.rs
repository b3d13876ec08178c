//! Message crawling configuration: trait and env-based implementation.

use anyhow::Result;
use std::env;
use std::time::Duration;

use crate::strategy::CollectStrategy;

/// Tunables consumed by the crawler and by callers choosing a round count.
pub trait MessageConfig: Send + Sync {
    /// Cap on returned entries.
    fn max_msg_count(&self) -> usize;
    /// Preceding lines attached to each entry.
    fn context_window_size(&self) -> usize;
    fn cache_ttl_secs(&self) -> u64;
    fn default_query_rounds(&self) -> usize;
    fn max_query_rounds(&self) -> usize;
    fn page_size(&self) -> usize;
    fn round_delay_ms(&self) -> u64;
    fn collect_strategy(&self) -> CollectStrategy;

    /// Round count for a caller-supplied argument (e.g. the last word of a command).
    ///
    /// Missing, non-numeric, zero, or above [`MessageConfig::max_query_rounds`] falls back to
    /// [`MessageConfig::default_query_rounds`].
    fn query_rounds(&self, raw: Option<&str>) -> usize {
        raw.and_then(|s| s.trim().parse::<usize>().ok())
            .filter(|&n| n > 0 && n <= self.max_query_rounds())
            .unwrap_or_else(|| self.default_query_rounds())
    }
}

/// Message config loaded from environment variables.
#[derive(Debug, Clone)]
pub struct EnvMessageConfig {
    pub max_msg_count: usize,
    pub context_window_size: usize,
    pub cache_ttl_min: u64,
    pub default_query_rounds: usize,
    pub max_query_rounds: usize,
    pub page_size: usize,
    pub round_delay_ms: u64,
    pub collect_strategy: CollectStrategy,
}

impl Default for EnvMessageConfig {
    fn default() -> Self {
        Self {
            max_msg_count: 500,
            context_window_size: 2,
            cache_ttl_min: 30,
            default_query_rounds: 20,
            max_query_rounds: 200,
            page_size: 100,
            round_delay_ms: 200,
            collect_strategy: CollectStrategy::ContextWindow,
        }
    }
}

impl MessageConfig for EnvMessageConfig {
    fn max_msg_count(&self) -> usize {
        self.max_msg_count
    }
    fn context_window_size(&self) -> usize {
        self.context_window_size
    }
    fn cache_ttl_secs(&self) -> u64 {
        self.cache_ttl_min * 60
    }
    fn default_query_rounds(&self) -> usize {
        self.default_query_rounds
    }
    fn max_query_rounds(&self) -> usize {
        self.max_query_rounds
    }
    fn page_size(&self) -> usize {
        self.page_size
    }
    fn round_delay_ms(&self) -> u64 {
        self.round_delay_ms
    }
    fn collect_strategy(&self) -> CollectStrategy {
        self.collect_strategy
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

impl EnvMessageConfig {
    /// Load from environment variables.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        let collect_strategy = match env::var("MESSAGE_COLLECT_STRATEGY") {
            Ok(s) if !s.trim().is_empty() => s.parse::<CollectStrategy>()?,
            _ => defaults.collect_strategy,
        };
        let config = Self {
            max_msg_count: env_parse("MESSAGE_MAX_MSG_COUNT", defaults.max_msg_count),
            context_window_size: env_parse("MESSAGE_CONTEXT_WINDOW", defaults.context_window_size),
            cache_ttl_min: env_parse("MESSAGE_CACHE_TTL_MIN", defaults.cache_ttl_min),
            default_query_rounds: env_parse(
                "MESSAGE_DEFAULT_QUERY_ROUNDS",
                defaults.default_query_rounds,
            ),
            max_query_rounds: env_parse("MESSAGE_MAX_QUERY_ROUNDS", defaults.max_query_rounds),
            page_size: env_parse("MESSAGE_PAGE_SIZE", defaults.page_size),
            round_delay_ms: env_parse("MESSAGE_ROUND_DELAY_MS", defaults.round_delay_ms),
            collect_strategy,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            anyhow::bail!("MESSAGE_PAGE_SIZE must be positive");
        }
        if self.max_query_rounds == 0 {
            anyhow::bail!("MESSAGE_MAX_QUERY_ROUNDS must be positive");
        }
        if self.default_query_rounds == 0 || self.default_query_rounds > self.max_query_rounds {
            anyhow::bail!(
                "MESSAGE_DEFAULT_QUERY_ROUNDS must be in 1..={} (got {})",
                self.max_query_rounds,
                self.default_query_rounds
            );
        }
        Ok(())
    }
}

/// Resolved settings held by a [`crate::HistoryCrawler`].
#[derive(Debug, Clone)]
pub struct CrawlerSettings {
    pub page_size: usize,
    pub max_msg_count: usize,
    pub context_window_size: usize,
    pub cache_ttl: Duration,
    /// Pause before every round after the first.
    pub round_delay: Duration,
    pub strategy: CollectStrategy,
}

impl Default for CrawlerSettings {
    fn default() -> Self {
        Self::from_config(&EnvMessageConfig::default())
    }
}

impl CrawlerSettings {
    pub fn from_config(config: &dyn MessageConfig) -> Self {
        Self {
            page_size: config.page_size(),
            max_msg_count: config.max_msg_count(),
            context_window_size: config.context_window_size(),
            cache_ttl: Duration::from_secs(config.cache_ttl_secs()),
            round_delay: Duration::from_millis(config.round_delay_ms()),
            strategy: config.collect_strategy(),
        }
    }

    pub fn with_strategy(mut self, strategy: CollectStrategy) -> Self {
        self.strategy = strategy;
        self
    }
}
