use futures::stream::{self, Stream, StreamExt};
use std::collections::VecDeque;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};

use super::transport::{EventStream, StreamError, StreamTransport};

/// A scripted transport for testing. Each `open` consumes the next script;
/// clones share scripts and counters so a test can keep a handle after
/// moving the transport into a controller.
#[derive(Clone, Default)]
pub struct MockTransport {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    scripts: Mutex<VecDeque<Script>>,
    requests: Mutex<Vec<(String, String)>>,
    closed: AtomicUsize,
}

struct Script {
    events: Vec<Result<String, StreamError>>,
    hang: bool,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next stream yields `events` and then ends.
    pub fn push_script(&self, events: Vec<Result<String, StreamError>>) -> &Self {
        self.push(Script {
            events,
            hang: false,
        })
    }

    /// Next stream yields `events` and then stays open without emitting.
    pub fn push_hanging(&self, events: Vec<Result<String, StreamError>>) -> &Self {
        self.push(Script { events, hang: true })
    }

    fn push(&self, script: Script) -> &Self {
        self.inner.scripts.lock().unwrap().push_back(script);
        self
    }

    /// `(agent_id, query)` for every stream opened so far
    pub fn requests(&self) -> Vec<(String, String)> {
        self.inner.requests.lock().unwrap().clone()
    }

    pub fn opened(&self) -> usize {
        self.inner.requests.lock().unwrap().len()
    }

    /// Number of streams that have been dropped
    pub fn closed(&self) -> usize {
        self.inner.closed.load(Ordering::SeqCst)
    }
}

impl StreamTransport for MockTransport {
    fn open(&self, agent_id: &str, query: &str) -> EventStream {
        self.inner
            .requests
            .lock()
            .unwrap()
            .push((agent_id.to_string(), query.to_string()));

        let script = self.inner.scripts.lock().unwrap().pop_front().unwrap_or(Script {
            events: Vec::new(),
            hang: true,
        });

        let events = stream::iter(script.events);
        let inner: EventStream = if script.hang {
            events.chain(stream::pending()).boxed()
        } else {
            events.boxed()
        };

        Box::pin(Tracked {
            inner,
            owner: self.inner.clone(),
        })
    }
}

struct Tracked {
    inner: EventStream,
    owner: Arc<Inner>,
}

impl Stream for Tracked {
    type Item = Result<String, StreamError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.as_mut().poll_next(cx)
    }
}

impl Drop for Tracked {
    fn drop(&mut self) {
        self.owner.closed.fetch_add(1, Ordering::SeqCst);
    }
}

pub fn payload(value: serde_json::Value) -> Result<String, StreamError> {
    Ok(value.to_string())
}
