pub mod agents;
pub mod config;
pub mod errors;
pub mod execution;
pub mod http;
pub mod models;
pub mod tools;
pub mod validation;

pub use agents::{sample_agents, AgentRegistry, AgentSource};
pub use config::{ApiSettings, Settings};
pub use errors::{ClientError, ClientResult};
pub use execution::{ExecutionController, ExecutionSnapshot, ExecutionStep, ExecutionUpdate};
pub use http::ApiClient;
pub use models::agent::{Agent, AgentDraft, AgentPatch};
pub use models::tool::Tool;
pub use tools::ToolRegistry;
