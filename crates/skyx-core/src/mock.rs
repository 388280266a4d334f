//! In-memory transport for testing wrappers without a running host.

use crate::error::{AppResult, SkyxError};
use crate::transport::ScriptTransport;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;

type Responder = Box<dyn Fn(&str) -> AppResult<String> + Send + Sync>;

/// Records every script and answers from a queue of canned replies.
///
/// When the queue is empty the optional responder closure is consulted;
/// without one the call fails as if the host had refused the connection.
#[derive(Default)]
pub struct MockTransport {
    replies: Mutex<VecDeque<AppResult<String>>>,
    responder: Option<Responder>,
    sent: Mutex<Vec<String>>,
}

impl MockTransport {
    /// Create a mock with no replies queued.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock that answers with `replies` in order.
    pub fn with_replies<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mock = Self::new();
        for reply in replies {
            mock.push_reply(reply);
        }
        mock
    }

    /// Create a mock that computes every reply from the script text.
    pub fn responding<F>(responder: F) -> Self
    where
        F: Fn(&str) -> AppResult<String> + Send + Sync + 'static,
    {
        Self {
            responder: Some(Box::new(responder)),
            ..Self::default()
        }
    }

    /// Queue a successful reply.
    pub fn push_reply(&self, reply: impl Into<String>) {
        self.replies.lock().push_back(Ok(reply.into()));
    }

    /// Queue a failure.
    pub fn push_error(&self, error: SkyxError) {
        self.replies.lock().push_back(Err(error));
    }

    /// Scripts sent so far, oldest first.
    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().clone()
    }

    /// Most recent script, if any.
    pub fn last_sent(&self) -> Option<String> {
        self.sent.lock().last().cloned()
    }
}

#[async_trait]
impl ScriptTransport for MockTransport {
    async fn send(&self, script: &str) -> AppResult<String> {
        tracing::debug!("Mock script:\n{}", script);
        self.sent.lock().push(script.to_string());

        if let Some(reply) = self.replies.lock().pop_front() {
            return reply;
        }
        match &self.responder {
            Some(responder) => responder(script),
            None => Err(SkyxError::ConnectionFailure {
                endpoint: "mock".into(),
                cause: "no scripted reply left".into(),
            }),
        }
    }
}
