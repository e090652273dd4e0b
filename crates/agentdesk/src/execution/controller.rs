use chrono::{DateTime, Utc};
use futures::StreamExt;
use serde::Serialize;
use std::mem;
use tokio::sync::watch;
use tracing::{debug, error, info, trace, warn};

use super::event::{text, StreamEvent};
use super::transport::{EventStream, HttpStreamTransport, StreamTransport};
use crate::models::timestamp::parse_timestamp;

/// One reasoning or tool-call event of a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutionStep {
    /// Arrival index within the execution, starting at zero
    pub id: u64,
    pub content: String,
    /// Producer time when the event carried one, receipt time otherwise
    pub timestamp: DateTime<Utc>,
}

/// Read-only view of the controller's state, published after every transition.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExecutionSnapshot {
    pub is_executing: bool,
    pub execution_result: Option<String>,
    pub execution_steps: Vec<ExecutionStep>,
    /// Why the last run ended abnormally, if it did
    pub error: Option<String>,
}

/// What a single inbound event did to the state.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionUpdate {
    Step(ExecutionStep),
    Result(String),
    Completed,
    Failed(String),
    /// Noise: keep-alives, unknown event types, malformed payloads
    Ignored,
}

struct ActiveStream {
    id: u64,
    agent_id: String,
    events: EventStream,
}

impl ActiveStream {
    fn close(self) {
        debug!(stream = self.id, agent_id = %self.agent_id, "closing execution stream");
        drop(self.events);
    }
}

enum Phase {
    Idle,
    Running(ActiveStream),
}

/// Drives one agent execution at a time over a server-push stream.
///
/// The stream handle lives inside the running phase, so the controller can
/// never report `is_executing` without a live stream, nor hold two streams.
/// Every mutation goes through `&mut self`; callers that need to stop a run
/// while waiting for events race [`next_update`](Self::next_update) against
/// their stop signal with `tokio::select!`.
pub struct ExecutionController<T: StreamTransport = HttpStreamTransport> {
    transport: T,
    phase: Phase,
    result: Option<String>,
    steps: Vec<ExecutionStep>,
    error: Option<String>,
    streams_opened: u64,
    updates: watch::Sender<ExecutionSnapshot>,
}

impl<T: StreamTransport> ExecutionController<T> {
    pub fn new(transport: T) -> Self {
        let (updates, _) = watch::channel(ExecutionSnapshot::default());
        Self {
            transport,
            phase: Phase::Idle,
            result: None,
            steps: Vec::new(),
            error: None,
            streams_opened: 0,
            updates,
        }
    }

    pub fn is_executing(&self) -> bool {
        matches!(self.phase, Phase::Running(_))
    }

    pub fn execution_result(&self) -> Option<&str> {
        self.result.as_deref()
    }

    pub fn execution_steps(&self) -> &[ExecutionStep] {
        &self.steps
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn snapshot(&self) -> ExecutionSnapshot {
        ExecutionSnapshot {
            is_executing: self.is_executing(),
            execution_result: self.result.clone(),
            execution_steps: self.steps.clone(),
            error: self.error.clone(),
        }
    }

    /// Receiver that always holds the latest snapshot.
    pub fn subscribe(&self) -> watch::Receiver<ExecutionSnapshot> {
        self.updates.subscribe()
    }

    /// Start executing `agent_id` against `query`.
    ///
    /// Ignored while a run is in progress: the first execution wins and later
    /// requests are not queued. Blank arguments are ignored as well.
    pub fn execute_agent(&mut self, agent_id: &str, query: &str) {
        if self.is_executing() {
            debug!(agent_id, "execution already in progress, ignoring request");
            return;
        }
        if agent_id.trim().is_empty() || query.trim().is_empty() {
            warn!("refusing to execute with an empty agent id or query");
            return;
        }

        self.result = None;
        self.steps.clear();
        self.error = None;

        self.streams_opened += 1;
        let events = self.transport.open(agent_id, query);
        info!(stream = self.streams_opened, agent_id, "started execution");
        self.phase = Phase::Running(ActiveStream {
            id: self.streams_opened,
            agent_id: agent_id.to_string(),
            events,
        });
        self.publish();
    }

    /// Stop listening to the current run, if any. The server may keep working;
    /// only the local stream is released. Safe to call at any time.
    pub fn stop_execution(&mut self) {
        if let Phase::Running(stream) = mem::replace(&mut self.phase, Phase::Idle) {
            info!(stream = stream.id, "execution stopped");
            stream.close();
            self.publish();
        }
    }

    /// Wait for the next event of the current run and apply it.
    ///
    /// Returns `None` when no run is active. Cancel-safe: dropping the future
    /// before it resolves loses no event.
    pub async fn next_update(&mut self) -> Option<ExecutionUpdate> {
        let Phase::Running(stream) = &mut self.phase else {
            return None;
        };

        let received = stream.events.next().await;
        let update = match received {
            Some(Ok(data)) => self.apply(&data),
            Some(Err(err)) => {
                error!(error = %err, "execution stream failed");
                let message = err.to_string();
                self.finish(Some(message.clone()));
                ExecutionUpdate::Failed(message)
            }
            None => {
                let message = "execution stream closed before the run completed".to_string();
                warn!("{}", message);
                self.finish(Some(message.clone()));
                ExecutionUpdate::Failed(message)
            }
        };
        Some(update)
    }

    /// Apply events until the current run ends.
    pub async fn run(&mut self) {
        while self.next_update().await.is_some() {}
    }

    fn apply(&mut self, data: &str) -> ExecutionUpdate {
        let Some(event) = StreamEvent::parse(data) else {
            trace!(payload = data, "ignoring stream payload");
            return ExecutionUpdate::Ignored;
        };

        match event {
            StreamEvent::Message { content, timestamp } => {
                let step = ExecutionStep {
                    id: self.steps.len() as u64,
                    content: text(&content),
                    timestamp: timestamp
                        .as_ref()
                        .and_then(parse_timestamp)
                        .unwrap_or_else(Utc::now),
                };
                self.steps.push(step.clone());
                self.publish();
                ExecutionUpdate::Step(step)
            }
            StreamEvent::Result { content } => {
                let result = text(&content);
                self.result = Some(result.clone());
                self.publish();
                ExecutionUpdate::Result(result)
            }
            StreamEvent::Complete { execution_id } => {
                info!(execution_id = ?execution_id, "execution completed");
                self.finish(None);
                ExecutionUpdate::Completed
            }
            StreamEvent::Error { message, content } => {
                let message = StreamEvent::error_message(message.as_ref(), content.as_ref());
                error!(%message, "execution error");
                self.finish(Some(message.clone()));
                ExecutionUpdate::Failed(message)
            }
        }
    }

    fn finish(&mut self, error: Option<String>) {
        if let Phase::Running(stream) = mem::replace(&mut self.phase, Phase::Idle) {
            stream.close();
        }
        self.error = error;
        self.publish();
    }

    fn publish(&self) {
        self.updates.send_replace(self.snapshot());
    }
}

impl<T: StreamTransport> Drop for ExecutionController<T> {
    fn drop(&mut self) {
        if let Phase::Running(stream) = mem::replace(&mut self.phase, Phase::Idle) {
            debug!(stream = stream.id, "controller dropped during execution");
            stream.close();
        }
    }
}
