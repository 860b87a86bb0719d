//! OpenAI-compatible chat completions client (DeepSeek, OpenAI, OpenRouter, ...).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::debug;

use crate::config::LlmConfig;
use crate::error::Error;
use crate::tools::ToolDefinition;
use crate::Result;

use super::super::message::{Message, Role, ToolCallRequest};
use super::{ChatCompletionResponse, CompletionResult, LlmClient, LlmResponse, Usage};

/// Client for any endpoint speaking the `/chat/completions` protocol.
#[derive(Clone)]
pub struct OpenAiClient {
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
    timeout: Duration,
    client: Client,
}

impl OpenAiClient {
    /// Create a client from configuration.
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let timeout = Duration::from_secs(config.timeout_secs);
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            temperature: config.temperature,
            timeout,
            client,
        })
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn convert_messages(&self, messages: &[Message]) -> Vec<Value> {
        messages
            .iter()
            .map(|m| match m.role {
                Role::User => json!({
                    "role": "user",
                    "content": m.content
                }),
                Role::Tool => json!({
                    "role": "tool",
                    "tool_call_id": m.tool_call_id.as_deref().unwrap_or_default(),
                    "content": m.content
                }),
                Role::Assistant => match m.tool_calls {
                    Some(ref tool_calls) if !tool_calls.is_empty() => {
                        let calls: Vec<Value> = tool_calls
                            .iter()
                            .map(|tc| {
                                json!({
                                    "id": tc.id,
                                    "type": "function",
                                    "function": {
                                        "name": tc.name,
                                        "arguments": tc.arguments.to_string()
                                    }
                                })
                            })
                            .collect();

                        let content = if m.content.is_empty() {
                            Value::Null
                        } else {
                            Value::String(m.content.clone())
                        };

                        json!({
                            "role": "assistant",
                            "content": content,
                            "tool_calls": calls
                        })
                    }
                    _ => json!({
                        "role": "assistant",
                        "content": m.content
                    }),
                },
            })
            .collect()
    }

    fn convert_tools(&self, tools: &[ToolDefinition]) -> Option<Value> {
        if tools.is_empty() {
            return None;
        }

        let declarations: Vec<Value> = tools
            .iter()
            .map(|t| {
                json!({
                    "type": "function",
                    "function": {
                        "name": t.name,
                        "description": t.description,
                        "parameters": t.parameters
                    }
                })
            })
            .collect();

        Some(Value::Array(declarations))
    }

    fn build_request(&self, messages: &[Message], tools: &[ToolDefinition]) -> Value {
        let mut request = json!({
            "model": self.model,
            "messages": self.convert_messages(messages),
            "temperature": self.temperature,
            "stream": false
        });

        if let Some(declarations) = self.convert_tools(tools) {
            request["tools"] = declarations;
            request["tool_choice"] = json!("auto");
        }

        request
    }
}

/// Validate the response shape and turn it into a [`CompletionResult`].
fn parse_response(response: ChatCompletionResponse) -> Result<LlmResponse> {
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| Error::MalformedResponse("no choices in response".to_string()))?;

    let message = choice
        .message
        .ok_or_else(|| Error::MalformedResponse("choice has no message".to_string()))?;

    let tool_calls = message.tool_calls.unwrap_or_default();

    let result = if !tool_calls.is_empty() {
        let invocations = tool_calls
            .into_iter()
            .map(|tc| -> Result<ToolCallRequest> {
                let raw = tc.function.arguments.trim();
                let arguments = if raw.is_empty() {
                    json!({})
                } else {
                    serde_json::from_str(raw).map_err(|e| {
                        Error::MalformedResponse(format!(
                            "arguments for {} are not valid JSON: {e}",
                            tc.function.name
                        ))
                    })?
                };
                Ok(ToolCallRequest {
                    id: tc.id,
                    name: tc.function.name,
                    arguments,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        CompletionResult::ToolCalls {
            content: message.content.filter(|c| !c.is_empty()),
            invocations,
        }
    } else {
        let content = message.content.ok_or_else(|| {
            Error::MalformedResponse("message has neither content nor tool calls".to_string())
        })?;
        CompletionResult::Text { content }
    };

    let usage = response
        .usage
        .map(|u| Usage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        })
        .unwrap_or_default();

    Ok(LlmResponse {
        result,
        finish_reason: choice.finish_reason.unwrap_or_else(|| "stop".to_string()),
        usage,
    })
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn chat(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
    ) -> Result<LlmResponse> {
        let request = self.build_request(messages, tools);
        debug!(
            "POST {} ({} messages, {} tools)",
            self.completions_url(),
            messages.len(),
            tools.len()
        );

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::UpstreamUnavailable(format!(
                        "request timed out after {}s",
                        self.timeout.as_secs()
                    ))
                } else {
                    Error::UpstreamUnavailable(format!("request failed: {e}"))
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::UpstreamUnavailable(format!("failed to read response: {e}")))?;

        if !status.is_success() {
            return Err(Error::UpstreamUnavailable(format!("API error {status}: {body}")));
        }

        let parsed: ChatCompletionResponse = serde_json::from_str(&body)
            .map_err(|e| Error::MalformedResponse(format!("undecodable body: {e}")))?;
        let response = parse_response(parsed)?;
        debug!(
            "Completion finished ({}), {} tokens",
            response.finish_reason, response.usage.total_tokens
        );
        Ok(response)
    }

    fn default_model(&self) -> &str {
        &self.model
    }
}
