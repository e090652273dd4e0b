use eventsource_stream::Eventsource;
use futures::stream::BoxStream;
use futures::StreamExt;
use reqwest::header::ACCEPT;
use reqwest::Client;
use thiserror::Error;

use crate::http::{error_message, join_url};

/// Raw `data` payloads of one execution stream, in arrival order.
///
/// Dropping the stream closes the underlying connection.
pub type EventStream = BoxStream<'static, Result<String, StreamError>>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StreamError {
    #[error("could not connect to execution stream: {0}")]
    Connect(String),

    #[error("execution stream rejected: {message}")]
    Status { status: u16, message: String },

    #[error("execution stream interrupted: {0}")]
    Read(String),
}

/// Opens server-push streams for agent executions.
///
/// `open` never blocks: connection happens lazily when the stream is first
/// polled, and connection failures arrive as the stream's first item.
pub trait StreamTransport: Send + Sync {
    fn open(&self, agent_id: &str, query: &str) -> EventStream;
}

/// Streams `GET {base}/api/agents/{agent_id}/stream?query=...` as server-sent events.
#[derive(Clone)]
pub struct HttpStreamTransport {
    client: Client,
    base_url: String,
}

impl HttpStreamTransport {
    pub fn new(client: Client, base_url: String) -> Self {
        Self { client, base_url }
    }

    pub fn stream_url(&self, agent_id: &str) -> String {
        join_url(
            &self.base_url,
            &format!("/api/agents/{}/stream", urlencoding::encode(agent_id)),
        )
    }
}

impl StreamTransport for HttpStreamTransport {
    fn open(&self, agent_id: &str, query: &str) -> EventStream {
        let request = self
            .client
            .get(self.stream_url(agent_id))
            .query(&[("query", query)])
            .header(ACCEPT, "text/event-stream");

        Box::pin(async_stream::stream! {
            let response = match request.send().await {
                Ok(response) => response,
                Err(e) => {
                    yield Err(StreamError::Connect(e.to_string()));
                    return;
                }
            };

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                yield Err(StreamError::Status {
                    status: status.as_u16(),
                    message: error_message(status, &body),
                });
                return;
            }

            let mut events = response.bytes_stream().eventsource();
            while let Some(event) = events.next().await {
                match event {
                    Ok(event) => yield Ok(event.data),
                    Err(e) => {
                        yield Err(StreamError::Read(e.to_string()));
                        return;
                    }
                }
            }
        })
    }
}
