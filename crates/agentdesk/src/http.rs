use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::config::ApiSettings;
use crate::errors::{ClientError, ClientResult};
use crate::execution::HttpStreamTransport;

/// Thin wrapper around `reqwest` bound to one API base.
///
/// Every non-success status becomes [`ClientError::Api`]; the message is the
/// body's `detail` string when the body is JSON and has one.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    stream_client: Client,
    base_url: String,
    direct_base_url: Option<String>,
}

impl ApiClient {
    pub fn new(settings: &ApiSettings) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(settings.request_timeout())
            .connect_timeout(settings.connect_timeout())
            .build()?;

        // An execution stream stays open for the whole run, so only the
        // connect phase is bounded.
        let stream_client = Client::builder()
            .connect_timeout(settings.connect_timeout())
            .build()?;

        Ok(Self {
            client,
            stream_client,
            base_url: settings.base_url.clone(),
            direct_base_url: settings.direct_base_url.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn direct_base_url(&self) -> Option<&str> {
        self.direct_base_url.as_deref()
    }

    pub fn endpoint(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let url = self.endpoint(path);
        debug!(%url, "GET");
        let response = self.client.get(&url).send().await?;
        decode(error_for_status(response).await?).await
    }

    /// POST a JSON body to an absolute URL and return the checked response.
    pub async fn post_json<B>(&self, url: &str, body: &B) -> ClientResult<Response>
    where
        B: Serialize + ?Sized,
    {
        debug!(%url, "POST");
        let response = self.client.post(url).json(body).send().await?;
        error_for_status(response).await
    }

    /// Transport that opens execution streams against this API base.
    pub fn stream_transport(&self) -> HttpStreamTransport {
        HttpStreamTransport::new(self.stream_client.clone(), self.base_url.clone())
    }
}

pub fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

pub(crate) async fn decode<T: DeserializeOwned>(response: Response) -> ClientResult<T> {
    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

pub(crate) async fn error_for_status(response: Response) -> ClientResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ClientError::Api {
        status: status.as_u16(),
        message: error_message(status, &body),
    })
}

/// User-facing message for a failed response: the JSON `detail` string if
/// present, `HTTP <status>` otherwise.
pub fn error_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("detail").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()))
}
