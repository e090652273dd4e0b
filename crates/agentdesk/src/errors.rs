use thiserror::Error;

#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ClientError {
    /// The server answered with a non-success status. `message` is the
    /// `detail` string from the body when there is one, `HTTP <status>` otherwise.
    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    Decode(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Agent not found: {0}")]
    AgentNotFound(String),

    #[error("Registration failed: {0}")]
    Registration(String),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Transport(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Short, stable name of the failure class, for log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            ClientError::Api { .. } => "api",
            ClientError::Transport(_) => "transport",
            ClientError::Decode(_) => "decode",
            ClientError::Validation(_) => "validation",
            ClientError::AgentNotFound(_) => "not_found",
            ClientError::Registration(_) => "registration",
            ClientError::Config(_) => "config",
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Decode(err.to_string())
    }
}

pub type ClientResult<T> = Result<T, ClientError>;
