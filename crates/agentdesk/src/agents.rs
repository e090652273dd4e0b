use chrono::{TimeZone, Utc};
use tracing::{info, warn};

use crate::errors::{ClientError, ClientResult};
use crate::http::{decode, ApiClient};
use crate::models::agent::{Agent, AgentDraft, AgentList, AgentPatch};
use crate::validation::{validate_agent_draft, validate_agent_patch};

pub const FALLBACK_NOTICE: &str = "Backend not reachable, showing sample agents";

/// Where the current agent collection came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentSource {
    Server,
    Fallback,
}

/// The client's single source of truth for agents.
///
/// The collection is replaced wholesale on fetch and mutated eagerly by the
/// write operations. A failed write leaves it exactly as it was.
pub struct AgentRegistry {
    api: ApiClient,
    agents: Vec<Agent>,
    loading: bool,
    error: Option<String>,
}

impl AgentRegistry {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            agents: Vec::new(),
            loading: true,
            error: None,
        }
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    /// True until the first fetch has finished, successfully or not.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    /// Load every agent from the server. On failure the collection becomes
    /// `fallback` and a non-fatal notice is recorded, so callers always have
    /// something to show.
    pub async fn fetch_agents(&mut self, fallback: Vec<Agent>) -> AgentSource {
        self.loading = true;
        self.error = None;
        let fetched = self.api.get_json::<AgentList>("/api/agents").await;
        self.loading = false;
        match fetched {
            Ok(list) => {
                self.agents = list.into_vec();
                info!(count = self.agents.len(), "fetched agents");
                AgentSource::Server
            }
            Err(e) => {
                warn!(kind = e.kind(), error = %e, "failed to fetch agents, using fallback");
                self.agents = fallback;
                self.error = Some(FALLBACK_NOTICE.to_string());
                AgentSource::Fallback
            }
        }
    }

    /// Load a single agent straight from the server, bypassing the collection.
    pub async fn fetch_agent(&self, id: &str) -> ClientResult<Agent> {
        let path = format!("/api/agents/{}", urlencoding::encode(id));
        match self.api.get_json::<Agent>(&path).await {
            Err(e) if e.status() == Some(404) => Err(ClientError::AgentNotFound(id.to_string())),
            other => other,
        }
    }

    /// Save a new agent. The server assigns its id; the returned agent is
    /// appended to the collection.
    pub async fn create_agent(&mut self, draft: AgentDraft) -> ClientResult<Agent> {
        match self.post_agent(&draft).await {
            Ok(agent) => {
                info!(id = %agent.id, name = %agent.name, "created agent");
                self.agents.push(agent.clone());
                Ok(agent)
            }
            Err(e) => {
                warn!(error = %e, "failed to create agent");
                self.error = Some("Failed to create agent".to_string());
                Err(e)
            }
        }
    }

    async fn post_agent(&self, draft: &AgentDraft) -> ClientResult<Agent> {
        validate_agent_draft(draft)?;
        let response = self
            .api
            .post_json(&self.api.endpoint("/api/agents"), draft)
            .await?;
        decode(response).await
    }

    /// Merge `patch` into the agent with `id` and stamp `updated_at`.
    ///
    /// Local only. An unknown id leaves the collection untouched and returns
    /// `Ok(None)`.
    pub fn update_agent(&mut self, id: &str, patch: AgentPatch) -> ClientResult<Option<&Agent>> {
        if let Err(e) = validate_agent_patch(&patch) {
            self.error = Some(format!("Failed to update agent: {}", e));
            return Err(e);
        }
        let Some(agent) = self.agents.iter_mut().find(|a| a.id == id) else {
            return Ok(None);
        };
        agent.apply(patch, Utc::now());
        Ok(Some(agent))
    }

    /// Remove the agent with `id` from the collection. Local only.
    pub fn delete_agent(&mut self, id: &str) -> Option<Agent> {
        let index = self.agents.iter().position(|a| a.id == id)?;
        Some(self.agents.remove(index))
    }

    pub fn get_agent(&self, id: &str) -> Option<&Agent> {
        self.agents.iter().find(|a| a.id == id)
    }
}

/// Built-in agents shown when the server cannot be reached.
pub fn sample_agents() -> Vec<Agent> {
    vec![
        Agent {
            id: "1".to_string(),
            name: "Research Assistant".to_string(),
            description: "Helps with research tasks".to_string(),
            tools: vec!["web_search".to_string(), "summarizer".to_string()],
            created_at: Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).single(),
            updated_at: Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).single(),
        },
        Agent {
            id: "2".to_string(),
            name: "Math Tutor".to_string(),
            description: "Assists with mathematical problems".to_string(),
            tools: vec!["calculator".to_string()],
            created_at: Utc.with_ymd_and_hms(2023, 1, 2, 0, 0, 0).single(),
            updated_at: Utc.with_ymd_and_hms(2023, 1, 2, 0, 0, 0).single(),
        },
    ]
}
