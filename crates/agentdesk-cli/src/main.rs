use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use agentdesk::{ApiClient, Settings};

mod commands;
mod render;

use commands::agents::AgentsCommand;
use commands::tools::ToolsCommand;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// TOML settings file, layered under AGENTDESK_* environment variables
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Base URL of the agent API, overriding every other source
    #[arg(long, global = true)]
    api_base: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List, inspect and create agents
    Agents {
        #[command(subcommand)]
        command: AgentsCommand,
    },

    /// List, register and execute tools
    Tools {
        #[command(subcommand)]
        command: ToolsCommand,
    },

    /// Execute an agent and stream its steps
    Run {
        /// Id of the agent to execute
        agent_id: String,

        /// What to ask the agent; prompted for when omitted
        query: Option<String>,
    },

    /// Print the version
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    if let Command::Version = cli.command {
        return commands::version::execute();
    }

    let api = api_client(&cli)?;
    match cli.command {
        Command::Agents { command } => commands::agents::execute(api, command).await,
        Command::Tools { command } => commands::tools::execute(api, command).await,
        Command::Run { agent_id, query } => commands::run::execute(api, &agent_id, query).await,
        Command::Version => Ok(()),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn api_client(cli: &Cli) -> Result<ApiClient> {
    let mut settings = match &cli.config {
        Some(path) => Settings::from_file(path)
            .with_context(|| format!("failed to load settings from {}", path.display()))?,
        None => Settings::new().context("failed to load settings")?,
    };
    if let Some(base) = &cli.api_base {
        settings = settings.with_base_url(base.clone());
    }
    tracing::debug!(base_url = %settings.api.base_url, "using API");
    ApiClient::new(&settings.api).context("failed to build HTTP client")
}
