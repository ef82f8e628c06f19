//! Test doubles for code that talks to an [`LlmProvider`].
//!
//! Compiled for this crate's unit tests and, through the `testing` feature,
//! for downstream crates' tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use scriptorium_types::llm::{
    CompletionRequest, CompletionResponse, LlmError, ProviderCapabilities, StopReason, Usage,
};

use crate::llm::provider::LlmProvider;

/// Shared handle on every request a [`ScriptedProvider`] received.
pub type RequestLog = Arc<Mutex<Vec<CompletionRequest>>>;

#[derive(Debug, Clone)]
enum Reply {
    Text(String),
    Fail(String),
}

/// Provider that answers from a queue of canned replies.
///
/// Once the queue is drained it answers `"reply {n}"`, where `n` is the
/// zero-based index of the request.
pub struct ScriptedProvider {
    replies: Mutex<VecDeque<Reply>>,
    requests: RequestLog,
    capabilities: ProviderCapabilities,
}

impl ScriptedProvider {
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            replies: Mutex::new(replies.into_iter().map(|r| Reply::Text(r.into())).collect()),
            requests: Arc::new(Mutex::new(Vec::new())),
            capabilities: ProviderCapabilities {
                structured_output: true,
                max_context_tokens: 8_192,
                max_output_tokens: 1_024,
            },
        }
    }

    /// Provider whose every call fails with a provider error.
    pub fn failing(message: &str) -> Self {
        let provider = Self::new(Vec::<String>::new());
        provider
            .replies
            .lock()
            .expect("reply queue poisoned")
            .push_back(Reply::Fail(message.to_string()));
        provider
    }

    /// Report no structured-output support.
    pub fn without_structured_output(mut self) -> Self {
        self.capabilities.structured_output = false;
        self
    }

    /// Handle for inspecting requests after the provider has been boxed.
    pub fn requests(&self) -> RequestLog {
        Arc::clone(&self.requests)
    }
}

impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    fn capabilities(&self) -> &ProviderCapabilities {
        &self.capabilities
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let index = {
            let mut requests = self.requests.lock().expect("request log poisoned");
            requests.push(request.clone());
            requests.len() - 1
        };

        let reply = {
            let mut replies = self.replies.lock().expect("reply queue poisoned");
            match replies.front() {
                // A failure reply is sticky so `failing()` fails every call.
                Some(Reply::Fail(_)) => replies.front().cloned(),
                _ => replies.pop_front(),
            }
        };

        let content = match reply {
            Some(Reply::Text(text)) => text,
            Some(Reply::Fail(message)) => return Err(LlmError::Provider { message }),
            None => format!("reply {index}"),
        };

        Ok(CompletionResponse {
            id: format!("scripted-{index}"),
            content,
            model: request.model.clone(),
            stop_reason: StopReason::EndTurn,
            usage: Usage::default(),
        })
    }
}
