//! OneBot v11 HTTP action client: `POST {api_url}/{action}` with a JSON body, answered by an
//! envelope `{status, retcode, data, message|wording}`.

use std::time::Duration;

use portrayal_core::FetchError;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::OneBotConfig;

#[derive(Debug, Deserialize)]
struct ActionResponse<T> {
    #[serde(default)]
    status: String,
    #[serde(default)]
    retcode: i64,
    data: Option<T>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    wording: Option<String>,
}

/// Shared HTTP client for OneBot actions.
#[derive(Debug, Clone)]
pub struct OneBotClient {
    http: Client,
    api_url: String,
}

impl OneBotClient {
    pub fn new(config: &OneBotConfig) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            api_url: config.api_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Calls one action and returns its `data` payload.
    pub async fn call_action<P, T>(&self, action: &str, params: &P) -> Result<T, FetchError>
    where
        P: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}/{}", self.api_url, action);
        debug!(action = %action, url = %url, "OneBot action request");

        let response = self
            .http
            .post(&url)
            .json(params)
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Status(format!("{}: {}", status, body)));
        }

        let envelope: ActionResponse<T> = response
            .json()
            .await
            .map_err(|e| FetchError::Decode(e.to_string()))?;

        if envelope.retcode != 0 || envelope.status == "failed" {
            let message = envelope
                .wording
                .or(envelope.message)
                .unwrap_or_else(|| envelope.status.clone());
            return Err(FetchError::Remote {
                retcode: envelope.retcode,
                message,
            });
        }

        info!(action = %action, retcode = envelope.retcode, "OneBot action returned");
        envelope
            .data
            .ok_or_else(|| FetchError::Decode(format!("{} returned no data", action)))
    }
}

/// OneBot ids are numeric; send them as numbers when they parse, strings otherwise.
pub(crate) fn id_param(raw: &str) -> serde_json::Value {
    raw.parse::<i64>()
        .map(serde_json::Value::from)
        .unwrap_or_else(|_| serde_json::Value::from(raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_param_prefers_numbers() {
        assert_eq!(id_param("123456"), serde_json::json!(123456));
        assert_eq!(id_param("abc"), serde_json::json!("abc"));
    }

    #[test]
    fn test_new_trims_trailing_slash() {
        let config = OneBotConfig::with_api_url("http://localhost:3000/");
        let client = OneBotClient::new(&config).unwrap();
        assert_eq!(client.api_url(), "http://localhost:3000");
    }
}
