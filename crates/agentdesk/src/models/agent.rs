use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::timestamp::deserialize_lenient;

/// An agent as stored by the server: a named, described bundle of tools.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Tool identifiers in display order
    #[serde(default)]
    pub tools: Vec<String>,
    #[serde(
        default,
        rename = "createdAt",
        alias = "created_at",
        deserialize_with = "deserialize_lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(
        default,
        rename = "updatedAt",
        alias = "updated_at",
        deserialize_with = "deserialize_lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Agent {
    /// Merge `patch` into this agent and stamp `updated_at`.
    pub fn apply(&mut self, patch: AgentPatch, now: DateTime<Utc>) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(tools) = patch.tools {
            self.tools = tools;
        }
        self.updated_at = Some(now);
    }
}

/// A client-constructed agent that has not been saved yet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentDraft {
    pub name: String,
    pub description: String,
    pub tools: Vec<String>,
}

impl AgentDraft {
    pub fn new<N, D>(name: N, description: D) -> Self
    where
        N: Into<String>,
        D: Into<String>,
    {
        Self {
            name: name.into(),
            description: description.into(),
            tools: Vec::new(),
        }
    }

    pub fn with_tool<S: Into<String>>(mut self, tool: S) -> Self {
        self.add_tool(tool);
        self
    }

    /// Append a tool unless it is already selected. Returns whether it was added.
    pub fn add_tool<S: Into<String>>(&mut self, tool: S) -> bool {
        let tool = tool.into();
        if self.tools.contains(&tool) {
            return false;
        }
        self.tools.push(tool);
        true
    }

    pub fn remove_tool(&mut self, tool: &str) -> bool {
        let before = self.tools.len();
        self.tools.retain(|t| t != tool);
        self.tools.len() != before
    }
}

/// A partial update. Unset fields are left alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AgentPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub tools: Option<Vec<String>>,
}

impl AgentPatch {
    pub fn name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn description<S: Into<String>>(mut self, description: S) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn tools<I, S>(mut self, tools: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tools = Some(tools.into_iter().map(Into::into).collect());
        self
    }
}

/// The list endpoint answers either with a bare array or an `{"agents": [...]}` envelope.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum AgentList {
    Bare(Vec<Agent>),
    Envelope { agents: Vec<Agent> },
}

impl AgentList {
    pub(crate) fn into_vec(self) -> Vec<Agent> {
        match self {
            AgentList::Bare(agents) | AgentList::Envelope { agents } => agents,
        }
    }
}
