use anyhow::{bail, Result};
use console::style;

use agentdesk::execution::{ExecutionUpdate, StreamTransport};
use agentdesk::{ApiClient, ExecutionController};

use crate::render;

pub async fn execute(api: ApiClient, agent_id: &str, query: Option<String>) -> Result<()> {
    let query = match query {
        Some(query) => query,
        None => cliclack::input("What should the agent do?")
            .placeholder("")
            .multiline()
            .interact()?,
    };
    if query.trim().is_empty() {
        bail!("query must not be empty");
    }

    let mut controller = ExecutionController::new(api.stream_transport());
    println!(
        "{} {}",
        style("Running agent").bold(),
        style(agent_id).cyan()
    );
    controller.execute_agent(agent_id, &query);
    stream_to_terminal(&mut controller).await;
    finish(&controller)
}

/// Print updates until the run ends or the user interrupts it.
async fn stream_to_terminal<T: StreamTransport>(controller: &mut ExecutionController<T>) {
    loop {
        tokio::select! {
            update = controller.next_update() => {
                match update {
                    Some(ExecutionUpdate::Step(step)) => println!("{}", render::step_line(&step)),
                    Some(ExecutionUpdate::Result(_)) => {
                        println!("{}", style("result received, waiting for completion").dim())
                    }
                    Some(_) => {}
                    None => break,
                }
            }
            _ = tokio::signal::ctrl_c() => {
                controller.stop_execution();
                println!("{}", style("Interrupted: stopped listening to the run").yellow());
                break;
            }
        }
    }
}

fn finish<T: StreamTransport>(controller: &ExecutionController<T>) -> Result<()> {
    if let Some(result) = controller.execution_result() {
        println!();
        render::print_markdown(result)?;
    }
    if let Some(error) = controller.error() {
        bail!("execution failed: {}", error);
    }
    Ok(())
}
