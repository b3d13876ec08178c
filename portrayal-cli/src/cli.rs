//! CLI parser.

use clap::{Parser, Subcommand};
use history_crawler::CollectStrategy;

/// Upper bound on one crawl when `--timeout-secs` is not given.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

#[derive(Parser, Debug)]
#[command(name = "portrayal")]
#[command(
    about = "Crawl a group's chat history for one member and portray them",
    long_about = None
)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Collect a member's texts from group history and print them.
    Query {
        #[arg(short, long)]
        group: String,
        #[arg(short, long)]
        user: String,
        /// Pages to scan; invalid or out-of-range values use MESSAGE_DEFAULT_QUERY_ROUNDS.
        #[arg(short, long)]
        rounds: Option<String>,
        /// Overrides MESSAGE_COLLECT_STRATEGY (context | user_cache).
        #[arg(short, long)]
        strategy: Option<CollectStrategy>,
        #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
        timeout_secs: u64,
    },
    /// Collect a member's texts and ask the LLM for a portrait using a prompt command.
    Portrait {
        #[arg(short, long)]
        group: String,
        #[arg(short, long)]
        user: String,
        /// Prompt command, e.g. `portrait`; see `prompts`.
        #[arg(short, long, default_value = "portrait")]
        command: String,
        #[arg(short, long)]
        rounds: Option<String>,
        #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
        timeout_secs: u64,
    },
    /// Show prompt entries as Markdown (all, or one command).
    Prompts {
        #[arg(short, long)]
        command: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_parses_strategy_and_keeps_raw_rounds() {
        let cli = Cli::try_parse_from([
            "portrayal", "query", "--group", "123456", "--user", "10001", "--rounds", "abc",
            "--strategy", "user-cache",
        ])
        .unwrap();
        match cli.command {
            Commands::Query {
                group,
                user,
                rounds,
                strategy,
                timeout_secs,
            } => {
                assert_eq!(group, "123456");
                assert_eq!(user, "10001");
                assert_eq!(rounds.as_deref(), Some("abc"));
                assert_eq!(strategy, Some(CollectStrategy::UserCache));
                assert_eq!(timeout_secs, DEFAULT_TIMEOUT_SECS);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_query_rejects_unknown_strategy() {
        let result = Cli::try_parse_from([
            "portrayal", "query", "-g", "1", "-u", "2", "--strategy", "everything",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_portrait_defaults_to_portrait_command() {
        let cli = Cli::try_parse_from(["portrayal", "portrait", "-g", "1", "-u", "2"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Portrait { ref command, .. } if command == "portrait"
        ));
    }

    #[test]
    fn test_prompts_command_is_optional() {
        let cli = Cli::try_parse_from(["portrayal", "prompts"]).unwrap();
        assert!(matches!(cli.command, Commands::Prompts { command: None }));
    }
}
