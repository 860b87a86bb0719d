//! LLM client abstraction layer.
//!
//! This module provides:
//! - [`LlmClient`] trait for swappable completion backends
//! - [`CompletionResult`], the validated shape of one completion
//! - [`OpenAiClient`] for OpenAI-compatible endpoints (DeepSeek by default)

mod types;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::tools::ToolDefinition;
use crate::Result;

pub use types::*;

pub mod openai;

pub use openai::OpenAiClient;

use super::message::{Message, ToolCallRequest};

/// What the model answered with.
#[derive(Debug, Clone, PartialEq)]
pub enum CompletionResult {
    /// The model answered directly.
    Text { content: String },

    /// The model wants one or more tools executed. Never empty.
    ToolCalls {
        /// Text sent alongside the calls, if any.
        content: Option<String>,
        invocations: Vec<ToolCallRequest>,
    },
}

/// Response from an LLM provider.
#[derive(Debug, Clone)]
pub struct LlmResponse {
    pub result: CompletionResult,

    /// Reason the response finished.
    pub finish_reason: String,

    /// Token usage statistics.
    pub usage: Usage,
}

impl LlmResponse {
    /// Create a simple text response.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            result: CompletionResult::Text {
                content: content.into(),
            },
            finish_reason: "stop".to_string(),
            usage: Usage::default(),
        }
    }

    /// Create a response requesting tool calls.
    pub fn tool_calls(invocations: Vec<ToolCallRequest>) -> Self {
        Self {
            result: CompletionResult::ToolCalls {
                content: None,
                invocations,
            },
            finish_reason: "tool_calls".to_string(),
            usage: Usage::default(),
        }
    }

    /// Check if response has tool calls.
    #[inline]
    pub fn has_tool_calls(&self) -> bool {
        matches!(self.result, CompletionResult::ToolCalls { .. })
    }
}

/// Token usage information.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: usize,
    pub completion_tokens: usize,
    pub total_tokens: usize,
}

/// LLM client trait - swappable provider abstraction.
///
/// One call is one network round trip: no retries, no caching.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Send messages and get response.
    ///
    /// An empty `tools` slice requests a text-only completion.
    async fn chat(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
    ) -> Result<LlmResponse>;

    /// Get the default model for this provider.
    fn default_model(&self) -> &str;
}

#[async_trait]
impl<T: LlmClient + ?Sized> LlmClient for Arc<T> {
    async fn chat(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
    ) -> Result<LlmResponse> {
        (**self).chat(messages, tools).await
    }

    fn default_model(&self) -> &str {
        (**self).default_model()
    }
}

/// One request seen by [`FakeLlmClient`].
#[cfg(test)]
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub messages: Vec<Message>,
    pub tool_names: Vec<String>,
}

/// Fake LLM client for testing.
#[cfg(test)]
pub struct FakeLlmClient {
    responses: std::sync::Mutex<std::collections::VecDeque<Result<LlmResponse>>>,
    requests: std::sync::Mutex<Vec<RecordedRequest>>,
}

#[cfg(test)]
impl FakeLlmClient {
    /// Create with predefined text responses.
    pub fn new(responses: Vec<&str>) -> Self {
        Self::scripted(responses.iter().map(|s| LlmResponse::text(*s)).collect())
    }

    /// Create with arbitrary responses, replayed in order.
    pub fn scripted(responses: Vec<LlmResponse>) -> Self {
        Self::with_results(responses.into_iter().map(Ok).collect())
    }

    /// Create with responses that may be errors.
    pub fn with_results(results: Vec<Result<LlmResponse>>) -> Self {
        Self {
            responses: std::sync::Mutex::new(results.into()),
            requests: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// Create with a single tool call followed by a text response.
    pub fn with_tool_call(name: &str, args: serde_json::Value, final_response: &str) -> Self {
        let call = ToolCallRequest {
            id: "tc_1".to_string(),
            name: name.to_string(),
            arguments: args,
        };
        Self::scripted(vec![
            LlmResponse::tool_calls(vec![call]),
            LlmResponse::text(final_response),
        ])
    }

    /// Every request received so far.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[cfg(test)]
#[async_trait]
impl LlmClient for FakeLlmClient {
    async fn chat(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
    ) -> Result<LlmResponse> {
        self.requests.lock().unwrap().push(RecordedRequest {
            messages: messages.to_vec(),
            tool_names: tools.iter().map(|t| t.name.clone()).collect(),
        });

        let mut responses = self.responses.lock().unwrap();
        responses.pop_front().unwrap_or_else(|| {
            Err(crate::error::Error::UpstreamUnavailable(
                "No more fake responses".to_string(),
            ))
        })
    }

    fn default_model(&self) -> &str {
        "fake-model"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fake_llm_client() {
        let client = FakeLlmClient::new(vec!["Hello!", "World!"]);

        let resp1 = client.chat(&[], &[]).await.unwrap();
        assert_eq!(
            resp1.result,
            CompletionResult::Text { content: "Hello!".to_string() }
        );

        let resp2 = client.chat(&[], &[]).await.unwrap();
        assert!(!resp2.has_tool_calls());

        assert!(client.chat(&[], &[]).await.is_err());
        assert_eq!(client.call_count(), 3);
    }

    #[tokio::test]
    async fn test_arc_client_delegates() {
        let client = Arc::new(FakeLlmClient::new(vec!["shared"]));
        let shared: Arc<dyn LlmClient> = client.clone();

        shared.chat(&[Message::user("hi")], &[]).await.unwrap();
        assert_eq!(shared.default_model(), "fake-model");
        assert_eq!(client.requests()[0].messages.len(), 1);
    }
}
