//! OneBot connection config. Loaded from ONEBOT_API_URL and ONEBOT_TIMEOUT_SECS.

use anyhow::Result;
use std::env;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:3000";

/// HTTP endpoint of the OneBot implementation (NapCat, Lagrange, go-cqhttp, ...).
#[derive(Debug, Clone)]
pub struct OneBotConfig {
    pub api_url: String,
    pub timeout_secs: u64,
}

impl Default for OneBotConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            timeout_secs: 30,
        }
    }
}

impl OneBotConfig {
    pub fn from_env() -> Result<Self> {
        let api_url = env::var("ONEBOT_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let timeout_secs = env::var("ONEBOT_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(30);
        Ok(Self {
            api_url,
            timeout_secs,
        })
    }

    pub fn with_api_url(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            ..Self::default()
        }
    }

    /// Fails when ONEBOT_API_URL is not a valid URL or the timeout is zero.
    pub fn validate(&self) -> Result<()> {
        if reqwest::Url::parse(&self.api_url).is_err() {
            anyhow::bail!("ONEBOT_API_URL is not a valid URL: {}", self.api_url);
        }
        if self.timeout_secs == 0 {
            anyhow::bail!("ONEBOT_TIMEOUT_SECS must be positive");
        }
        Ok(())
    }
}
