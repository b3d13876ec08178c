//! Collection policy applied on top of the shared crawl loop.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// How a crawl turns the scanned buffer into entries. Chosen once, at crawler construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CollectStrategy {
    /// Sort the buffer and attach up to `context_window_size` preceding lines to each target
    /// message. No cross-call cache.
    #[default]
    ContextWindow,
    /// Cache every author's texts per `group:user` with a TTL, and answer from that cache when
    /// it already holds enough texts for the target. Entries are bare texts.
    UserCache,
}

impl CollectStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            CollectStrategy::ContextWindow => "context",
            CollectStrategy::UserCache => "user_cache",
        }
    }
}

impl fmt::Display for CollectStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
#[error("Unknown collect strategy: {0} (expected \"context\" or \"user_cache\")")]
pub struct ParseStrategyError(pub String);

impl FromStr for CollectStrategy {
    type Err = ParseStrategyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "context" | "context_window" | "context-window" => Ok(CollectStrategy::ContextWindow),
            "user_cache" | "user-cache" | "cache" => Ok(CollectStrategy::UserCache),
            other => Err(ParseStrategyError(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_strategy_names() {
        assert_eq!("context".parse(), Ok(CollectStrategy::ContextWindow));
        assert_eq!("Context-Window".parse(), Ok(CollectStrategy::ContextWindow));
        assert_eq!("user_cache".parse(), Ok(CollectStrategy::UserCache));
        assert!("lru".parse::<CollectStrategy>().is_err());
    }

    #[test]
    fn test_default_is_context_window() {
        assert_eq!(CollectStrategy::default(), CollectStrategy::ContextWindow);
        assert_eq!(CollectStrategy::default().to_string(), "context");
    }
}
