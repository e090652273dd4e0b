use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::errors::{ClientError, ClientResult};
use crate::execution::event::text;
use crate::http::{decode, join_url, ApiClient};
use crate::models::tool::{tools_from_map, Tool};
use crate::validation::{validate_tool_code, validate_tool_description, validate_tool_name};

/// Paths tried, in order, when registering a prompt tool. Deployments disagree
/// on the spelling so every variant is attempted.
pub const PROMPT_TOOL_PATHS: &[&str] = &[
    "/api/tools/register_llm",
    "/api/tools/register_llm/",
    "/api/tools/register-llm",
];

pub const CHATBOT_TOOL_NAME: &str = "chatbot_fn";
pub const CHATBOT_TOOL_DESCRIPTION: &str = "Lightweight OpenAI-powered chatbot (async function)";
pub const CHATBOT_TOOL_CODE: &str = r#"async def chatbot_fn(query: str) -> str:
    from openai import OpenAI
    client = OpenAI()
    resp = client.chat.completions.create(
        model="gpt-4o-mini",
        messages=[
            {"role": "system", "content": "You are helpful and concise."},
            {"role": "user", "content": query},
        ],
        temperature=0.2,
    )
    return (resp.choices[0].message.content or "").strip()"#;

#[derive(Serialize)]
struct CodeToolRegistration<'a> {
    tool_name: &'a str,
    description: &'a str,
    code: &'a str,
}

#[derive(Serialize)]
struct PromptToolRegistration<'a> {
    name: &'a str,
    description: &'a str,
}

#[derive(Serialize)]
struct ToolExecution<'a> {
    tool_type: &'a str,
    parameters: &'a Map<String, Value>,
}

/// Lists server tools and registers new ones.
pub struct ToolRegistry {
    api: ApiClient,
    tools: Vec<Tool>,
    loading: bool,
    error: Option<String>,
}

impl ToolRegistry {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            tools: Vec::new(),
            loading: false,
            error: None,
        }
    }

    pub fn tools(&self) -> &[Tool] {
        &self.tools
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    /// Replace the tool list with the server's. On failure the previous list
    /// is kept.
    pub async fn fetch_tools(&mut self) -> ClientResult<&[Tool]> {
        self.loading = true;
        self.error = None;
        let fetched = self.api.get_json::<Map<String, Value>>("/api/tools").await;
        self.loading = false;
        match fetched {
            Ok(map) => {
                self.tools = tools_from_map(&map);
                info!(count = self.tools.len(), "fetched tools");
                Ok(&self.tools)
            }
            Err(e) => {
                warn!(error = %e, "failed to fetch tools");
                self.error = Some(format!("Failed to load tools: {}", e));
                Err(e)
            }
        }
    }

    /// Register a tool backed by an `async def` function.
    ///
    /// Name and description are trimmed before validation; code is sent as
    /// written.
    pub async fn register_code_tool(
        &mut self,
        name: &str,
        description: &str,
        code: &str,
    ) -> ClientResult<()> {
        self.error = None;
        if let Err(e) = self.submit_code_tool(name.trim(), description.trim(), code).await {
            self.error = Some(format!("Failed to register tool: {}", e));
            return Err(e);
        }
        self.reconcile().await;
        Ok(())
    }

    /// Register the canned `chatbot_fn` tool.
    pub async fn register_chatbot_tool(&mut self) -> ClientResult<()> {
        self.error = None;
        let submitted = self
            .submit_code_tool(CHATBOT_TOOL_NAME, CHATBOT_TOOL_DESCRIPTION, CHATBOT_TOOL_CODE)
            .await;
        if let Err(e) = submitted {
            self.error = Some(format!("Failed to quick-add chatbot: {}", e));
            return Err(e);
        }
        self.reconcile().await;
        Ok(())
    }

    async fn submit_code_tool(
        &mut self,
        name: &str,
        description: &str,
        code: &str,
    ) -> ClientResult<()> {
        validate_tool_name(name)?;
        validate_tool_description(description)?;
        validate_tool_code(code)?;

        let body = CodeToolRegistration {
            tool_name: name,
            description,
            code,
        };
        let response = self
            .api
            .post_json(&self.api.endpoint("/api/tools/register"), &body)
            .await?;
        info!(name, "registered code tool");

        // Some servers answer with the updated mapping; others just echo the name.
        if let Ok(Value::Object(reply)) = decode::<Value>(response).await {
            if let Some(Value::Object(tools)) = reply.get("tools") {
                self.tools = tools_from_map(tools);
            }
        }
        Ok(())
    }

    /// Register a prompt-only tool, trying every known endpoint spelling on
    /// the API base and then on the direct base. The first success wins.
    pub async fn register_prompt_tool(&mut self, name: &str, description: &str) -> ClientResult<()> {
        self.error = None;
        let name = name.trim();
        let description = description.trim();
        if let Err(e) = validate_tool_name(name).and_then(|_| validate_tool_description(description)) {
            self.error = Some(format!("Failed to register LLM tool: {}", e));
            return Err(e);
        }

        let body = PromptToolRegistration { name, description };
        let mut last_failure = None;
        for url in self.prompt_tool_urls() {
            match self.api.post_json(&url, &body).await {
                Ok(_) => {
                    info!(name, %url, "registered prompt tool");
                    last_failure = None;
                    break;
                }
                Err(e) => {
                    debug!(%url, error = %e, "prompt tool endpoint failed");
                    last_failure = Some(format!("{}: {}", url, e));
                }
            }
        }

        if let Some(failure) = last_failure {
            let err = ClientError::Registration(failure);
            self.error = Some(format!("Failed to register LLM tool: {}", err));
            return Err(err);
        }
        self.reconcile().await;
        Ok(())
    }

    /// Every URL `register_prompt_tool` will try, in order.
    pub fn prompt_tool_urls(&self) -> Vec<String> {
        let bases = std::iter::once(self.api.base_url()).chain(self.api.direct_base_url());
        bases
            .flat_map(|base| PROMPT_TOOL_PATHS.iter().map(move |path| join_url(base, path)))
            .collect()
    }

    /// Run a tool on the server and return its output.
    pub async fn execute_tool(
        &self,
        tool_type: &str,
        parameters: &Map<String, Value>,
    ) -> ClientResult<String> {
        let body = ToolExecution {
            tool_type,
            parameters,
        };
        let response = self
            .api
            .post_json(&self.api.endpoint("/api/tools/execute"), &body)
            .await?;
        let reply: Value = decode(response).await?;
        Ok(reply.get("result").map(text).unwrap_or_default())
    }

    /// Re-read the list after a successful write. A failure here only
    /// records the error; the write itself already succeeded.
    async fn reconcile(&mut self) {
        let _ = self.fetch_tools().await;
    }
}
