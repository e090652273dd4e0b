use anyhow::{bail, Result};
use clap::Subcommand;
use cliclack::spinner;
use console::style;

use agentdesk::{sample_agents, AgentDraft, AgentRegistry, AgentSource, ApiClient, ToolRegistry};

use crate::render;

#[derive(Subcommand)]
pub enum AgentsCommand {
    /// List every agent on the server
    List,

    /// Show a single agent as stored on the server
    Show { id: String },

    /// Create a new agent
    Create {
        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        description: Option<String>,

        /// Tool to attach, repeatable; prompted for when omitted
        #[arg(long)]
        tool: Vec<String>,
    },
}

pub async fn execute(api: ApiClient, command: AgentsCommand) -> Result<()> {
    match command {
        AgentsCommand::List => list(api).await,
        AgentsCommand::Show { id } => show(api, &id).await,
        AgentsCommand::Create {
            name,
            description,
            tool,
        } => create(api, name, description, tool).await,
    }
}

async fn list(api: ApiClient) -> Result<()> {
    let mut registry = AgentRegistry::new(api);
    let source = registry.fetch_agents(sample_agents()).await;
    if source == AgentSource::Fallback {
        if let Some(notice) = registry.error() {
            cliclack::log::warning(notice)?;
        }
    }

    if registry.agents().is_empty() {
        println!("{}", style("No agents yet. Create one with `agentdesk agents create`.").dim());
        return Ok(());
    }
    for agent in registry.agents() {
        println!("{}", render::agent_line(agent));
    }
    Ok(())
}

async fn show(api: ApiClient, id: &str) -> Result<()> {
    let registry = AgentRegistry::new(api);
    let agent = registry.fetch_agent(id).await?;
    println!("{}", render::agent_details(&agent));
    Ok(())
}

async fn create(
    api: ApiClient,
    name: Option<String>,
    description: Option<String>,
    tools: Vec<String>,
) -> Result<()> {
    cliclack::intro(style(" create-agent ").on_cyan().black())?;

    let name = match name {
        Some(name) => name,
        None => cliclack::input("Agent name").placeholder("Research Assistant").interact()?,
    };
    let description = match description {
        Some(description) => description,
        None => cliclack::input("What does it do?").interact()?,
    };

    let mut draft = AgentDraft::new(name, description);
    let selected = if tools.is_empty() {
        pick_tools(api.clone()).await?
    } else {
        tools
    };
    for tool in selected {
        draft.add_tool(tool);
    }

    let mut registry = AgentRegistry::new(api);
    let spin = spinner();
    spin.start("saving agent");
    let created = registry.create_agent(draft).await;
    spin.stop("");

    match created {
        Ok(agent) => {
            cliclack::outro(format!("Created {} ({})", agent.name, agent.id))?;
            Ok(())
        }
        Err(e) => {
            let message = registry.error().unwrap_or("Failed to create agent");
            bail!("{}: {}", message, e)
        }
    }
}

async fn pick_tools(api: ApiClient) -> Result<Vec<String>> {
    let mut tools = ToolRegistry::new(api);
    if tools.fetch_tools().await.is_err() || tools.tools().is_empty() {
        let _ = cliclack::log::info("No tools available, creating the agent without tools");
        return Ok(Vec::new());
    }

    let items: Vec<(String, String, String)> = tools
        .tools()
        .iter()
        .map(|t| (t.id.clone(), t.name.clone(), t.description.clone()))
        .collect();
    let picked = cliclack::multiselect("Which tools should it use?")
        .items(&items)
        .required(false)
        .interact()?;
    Ok(picked)
}
