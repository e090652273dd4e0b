use anyhow::{anyhow, Context, Result};
use clap::Subcommand;
use cliclack::spinner;
use console::style;
use serde_json::{Map, Value};
use std::path::PathBuf;

use agentdesk::{ApiClient, ClientResult, ToolRegistry};

use crate::render;

#[derive(Subcommand)]
pub enum ToolsCommand {
    /// List every tool on the server
    List,

    /// Register a tool implemented by an async Python function
    Register {
        #[arg(long)]
        name: String,

        #[arg(long)]
        description: String,

        /// File holding the function source
        #[arg(long)]
        code: PathBuf,
    },

    /// Register a prompt-only tool that forwards its input to a language model
    RegisterPrompt {
        #[arg(long)]
        name: String,

        /// Instruction the model follows
        #[arg(long)]
        description: String,
    },

    /// Register the built-in chatbot_fn tool
    QuickAddChatbot,

    /// Run a tool on the server
    Execute {
        tool: String,

        /// Parameter as key=value, repeatable. Values are read as JSON when
        /// they parse, plain strings otherwise.
        #[arg(long = "param", value_parser = parse_param)]
        params: Vec<(String, Value)>,
    },
}

pub async fn execute(api: ApiClient, command: ToolsCommand) -> Result<()> {
    let mut registry = ToolRegistry::new(api);
    match command {
        ToolsCommand::List => list(&mut registry).await,
        ToolsCommand::Register {
            name,
            description,
            code,
        } => {
            let code = std::fs::read_to_string(&code)
                .with_context(|| format!("failed to read {}", code.display()))?;
            let spin = spinner();
            spin.start("registering tool");
            let outcome = registry.register_code_tool(&name, &description, &code).await;
            spin.stop("");
            report(&registry, outcome, &format!("Registered {}", name.trim()))
        }
        ToolsCommand::RegisterPrompt { name, description } => {
            let spin = spinner();
            spin.start("registering prompt tool");
            let outcome = registry.register_prompt_tool(&name, &description).await;
            spin.stop("");
            report(&registry, outcome, &format!("Registered {}", name.trim()))
        }
        ToolsCommand::QuickAddChatbot => {
            let outcome = registry.register_chatbot_tool().await;
            report(&registry, outcome, "Registered chatbot_fn")
        }
        ToolsCommand::Execute { tool, params } => {
            let parameters: Map<String, Value> = params.into_iter().collect();
            let output = registry.execute_tool(&tool, &parameters).await?;
            println!("{}", output);
            Ok(())
        }
    }
}

async fn list(registry: &mut ToolRegistry) -> Result<()> {
    if registry.fetch_tools().await.is_err() {
        return Err(anyhow!(registry
            .error()
            .unwrap_or("Failed to load tools")
            .to_string()));
    }
    if registry.tools().is_empty() {
        println!("{}", style("No tools registered.").dim());
    }
    for tool in registry.tools() {
        println!("{}", render::tool_line(tool));
    }
    Ok(())
}

fn report(registry: &ToolRegistry, outcome: ClientResult<()>, success: &str) -> Result<()> {
    if let Err(e) = outcome {
        return Err(anyhow!(registry.error().map(str::to_string).unwrap_or_else(|| e.to_string())));
    }
    println!("{}", style(success).green());
    if let Some(warning) = registry.error() {
        // the write succeeded but the follow-up listing did not
        cliclack::log::warning(warning)?;
    }
    Ok(())
}

fn parse_param(raw: &str) -> Result<(String, Value), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{}'", raw))?;
    if key.is_empty() {
        return Err(format!("missing parameter name in '{}'", raw));
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((key.to_string(), value))
}
