//! # Portrait
//!
//! Turns a participant's collected texts into an LLM-written portrait.
//!
//! The system prompt comes from a command's template with `{nickname}` and `{gender}` filled
//! from the [`UserProfile`]; the user prompt numbers every text. The completion is attempted
//! `retry_times + 1` times with a fixed backoff between failed attempts.
//!
//! ## External interactions
//!
//! - **llm-client**: [`LlmClient`] performs the completion.

use std::sync::Arc;
use std::time::Duration;

use llm_client::LlmClient;
use portrayal_core::{PortrayalError, Result, UserProfile};
use prompt::{build_portrait_prompt, render_system_prompt, ChatMessage};
use tracing::{error, info, instrument, warn};

/// Pause between failed attempts.
pub const RETRY_BACKOFF: Duration = Duration::from_secs(1);

pub struct PortraitService {
    llm: Arc<dyn LlmClient>,
    retry_times: usize,
    backoff: Duration,
}

impl PortraitService {
    pub fn new(llm: Arc<dyn LlmClient>, retry_times: usize) -> Self {
        Self {
            llm,
            retry_times,
            backoff: RETRY_BACKOFF,
        }
    }

    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn retry_times(&self) -> usize {
        self.retry_times
    }

    /// System + user messages for one portrait request.
    pub fn build_messages(
        texts: &[String],
        profile: &UserProfile,
        template: &str,
    ) -> Vec<ChatMessage> {
        vec![
            ChatMessage::system(render_system_prompt(
                template,
                &profile.nickname,
                profile.pronoun(),
            )),
            ChatMessage::user(build_portrait_prompt(texts, &profile.nickname)),
        ]
    }

    /// Generates the portrait text. An empty completion is an error and is not retried.
    #[instrument(skip(self, texts, template), fields(user = %profile.user_id, texts = texts.len()))]
    pub async fn generate_portrait(
        &self,
        texts: &[String],
        profile: &UserProfile,
        template: &str,
    ) -> Result<String> {
        let messages = Self::build_messages(texts, profile, template);
        let response = self.call_with_retry(messages, profile).await?;
        if response.trim().is_empty() {
            return Err(PortrayalError::Llm("empty completion".to_string()));
        }
        info!(chars = response.chars().count(), "Portrait generated");
        Ok(response)
    }

    async fn call_with_retry(
        &self,
        messages: Vec<ChatMessage>,
        profile: &UserProfile,
    ) -> Result<String> {
        let mut last_error: Option<anyhow::Error> = None;

        for attempt in 0..=self.retry_times {
            if attempt > 0 {
                warn!(
                    attempt,
                    retry_times = self.retry_times,
                    nickname = %profile.nickname,
                    "Retrying LLM call"
                );
            }
            match self.llm.get_llm_response_with_messages(messages.clone()).await {
                Ok(response) => return Ok(response),
                Err(e) => {
                    error!(attempt = attempt + 1, error = %e, "LLM call failed");
                    last_error = Some(e);
                    if attempt < self.retry_times {
                        tokio::time::sleep(self.backoff).await;
                    }
                }
            }
        }

        Err(PortrayalError::Llm(format!(
            "LLM call still failing after {} retries: {}",
            self.retry_times,
            last_error.map(|e| e.to_string()).unwrap_or_default()
        )))
    }
}
