//! portrayal CLI: query a member's group history, portray them, list prompt entries.
//! Config from env (`.env` is loaded first) and CLI args.

use anyhow::Result;
use clap::Parser;
use portrayal_cli::{handle_portrait, handle_prompts, handle_query, Cli, Commands};
use portrayal_core::init_tracing;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let log_file = std::env::var("LOG_FILE").ok();
    init_tracing(log_file.as_deref())?;

    match cli.command {
        Commands::Query {
            group,
            user,
            rounds,
            strategy,
            timeout_secs,
        } => handle_query(group, user, rounds, strategy, timeout_secs).await,
        Commands::Portrait {
            group,
            user,
            command,
            rounds,
            timeout_secs,
        } => handle_portrait(group, user, command, rounds, timeout_secs).await,
        Commands::Prompts { command } => handle_prompts(command),
    }
}
