//! Subcommand handlers: wire OneBot, the crawler, prompts and the LLM together.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use history_crawler::{
    CollectStrategy, CrawlerSettings, EnvMessageConfig, HistoryCrawler, MessageConfig,
};
use llm_client::{EnvLlmConfig, LlmConfig, OpenAILlmClient};
use onebot::{OneBotClient, OneBotConfig, OneBotPageFetcher, OneBotProfileLookup};
use portrait::PortraitService;
use portrayal_core::{GroupId, PortrayalError, ProfileLookup, QueryResult, UserId};
use prompt::PromptRegistry;
use tracing::info;

fn onebot_client() -> Result<OneBotClient> {
    let config = OneBotConfig::from_env()?;
    config.validate()?;
    OneBotClient::new(&config)
}

fn message_config() -> Result<EnvMessageConfig> {
    EnvMessageConfig::from_env().context("Invalid MESSAGE_* configuration")
}

/// Runs one crawl that stops paging after `timeout`; what was scanned by then is kept.
pub async fn crawl_with_timeout(
    crawler: &HistoryCrawler,
    group: &GroupId,
    user: &UserId,
    rounds: usize,
    timeout: Duration,
) -> QueryResult {
    let deadline = tokio::time::Instant::now() + timeout;
    crawler
        .get_user_texts_until(group, user, rounds, deadline)
        .await
}

/// Human-readable listing of a query result.
pub fn format_query_result(result: &QueryResult) -> String {
    let mut out = format!(
        "Scanned {} messages, {} entries{}",
        result.scanned_message_count,
        result.count(),
        if result.served_from_cache { " (from cache)" } else { "" }
    );
    for (i, entry) in result.entries.iter().enumerate() {
        out.push_str(&format!("\n\n#{}\n{}", i + 1, entry));
    }
    out
}

pub async fn handle_query(
    group: String,
    user: String,
    rounds: Option<String>,
    strategy: Option<CollectStrategy>,
    timeout_secs: u64,
) -> Result<()> {
    let config = message_config()?;
    let rounds = config.query_rounds(rounds.as_deref());
    let mut settings = CrawlerSettings::from_config(&config);
    if let Some(strategy) = strategy {
        settings = settings.with_strategy(strategy);
    }

    let fetcher = Arc::new(OneBotPageFetcher::new(onebot_client()?));
    let crawler = HistoryCrawler::new(fetcher, settings);
    let (group, user) = (GroupId::from(group), UserId::from(user));

    info!(group = %group, user = %user, rounds, strategy = %crawler.strategy(), "Starting query");
    let result = crawl_with_timeout(
        &crawler,
        &group,
        &user,
        rounds,
        Duration::from_secs(timeout_secs),
    )
    .await;

    println!("{}", format_query_result(&result));
    Ok(())
}

pub async fn handle_portrait(
    group: String,
    user: String,
    command: String,
    rounds: Option<String>,
    timeout_secs: u64,
) -> Result<()> {
    let registry = PromptRegistry::from_env()?;
    let template = registry.match_prompt_by_cmd(&command).with_context(|| {
        format!(
            "Unknown prompt command '{}'; available: {}",
            command,
            registry.commands().join(", ")
        )
    })?;
    let llm_config = EnvLlmConfig::from_env()?;
    let config = message_config()?;
    let rounds = config.query_rounds(rounds.as_deref());

    let client = onebot_client()?;
    let (group, user) = (GroupId::from(group), UserId::from(user));
    let profile = OneBotProfileLookup::new(client.clone())
        .get_profile(&group, &user)
        .await
        .map_err(PortrayalError::from)?;

    println!(
        "Scanning {} rounds of history for {}...",
        rounds, profile.nickname
    );
    let crawler = HistoryCrawler::new(
        Arc::new(OneBotPageFetcher::new(client)),
        CrawlerSettings::from_config(&config),
    );
    let result = crawl_with_timeout(
        &crawler,
        &group,
        &user,
        rounds,
        Duration::from_secs(timeout_secs),
    )
    .await;
    if result.is_empty() {
        anyhow::bail!(
            "No messages from {} in the last {} scanned messages",
            profile.nickname,
            result.scanned_message_count
        );
    }

    println!(
        "Found {} messages from {}, analysing with '{}'...",
        result.count(),
        profile.nickname,
        command
    );
    let llm = Arc::new(OpenAILlmClient::from_config(&llm_config));
    let service = PortraitService::new(llm, llm_config.retry_times());
    let portrait = service
        .generate_portrait(&result.entries, &profile, template)
        .await?;

    println!("\n{}", portrait);
    Ok(())
}

pub fn handle_prompts(command: Option<String>) -> Result<()> {
    let registry = PromptRegistry::from_env()?;
    let view = registry.view_entry(command.as_deref());
    if view.is_empty() {
        println!("No prompt entries.");
    } else {
        println!("{}", view);
    }
    Ok(())
}
