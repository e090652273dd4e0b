use anyhow::Result;
use bat::WrappingMode;
use chrono::{DateTime, Utc};
use console::style;

use agentdesk::{Agent, ExecutionStep, Tool};

pub fn agent_line(agent: &Agent) -> String {
    let tools = if agent.tools.is_empty() {
        "no tools".to_string()
    } else {
        agent.tools.join(", ")
    };
    format!(
        "{} {} {}\n    {}",
        style(&agent.name).bold(),
        style(format!("({})", agent.id)).dim(),
        style(format!("[{}]", tools)).cyan(),
        agent.description
    )
}

pub fn agent_details(agent: &Agent) -> String {
    let mut lines = vec![
        format!("{} {}", style(&agent.name).bold(), style(&agent.id).dim()),
        agent.description.clone(),
    ];
    if !agent.tools.is_empty() {
        lines.push(format!("tools: {}", agent.tools.join(", ")));
    }
    if let Some(created) = agent.created_at {
        lines.push(format!("created: {}", when(created)));
    }
    if let Some(updated) = agent.updated_at {
        lines.push(format!("updated: {}", when(updated)));
    }
    lines.join("\n")
}

pub fn tool_line(tool: &Tool) -> String {
    let params = if tool.parameters.is_empty() {
        String::new()
    } else {
        format!("({})", tool.parameters.join(", "))
    };
    let mut line = format!(
        "{} {}{}",
        style(&tool.name).bold(),
        style(&tool.id).dim(),
        params
    );
    if !tool.description.is_empty() {
        line.push_str(&format!("\n    {}", tool.description));
    }
    line
}

pub fn step_line(step: &ExecutionStep) -> String {
    format!(
        "{} {} {}",
        style(format!("#{}", step.id + 1)).cyan(),
        style(step.timestamp.format("%H:%M:%S")).dim(),
        step.content
    )
}

fn when(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

/// Print the final answer of a run as markdown.
pub fn print_markdown(content: &str) -> Result<()> {
    bat::PrettyPrinter::new()
        .input(bat::Input::from_bytes(content.as_bytes()).name("Result"))
        .language("Markdown")
        .grid(true)
        .header(true)
        .wrapping_mode(WrappingMode::Character)
        .print()?;
    Ok(())
}
