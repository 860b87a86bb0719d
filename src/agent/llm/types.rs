//! Wire types for OpenAI-compatible chat completion responses.

use serde::Deserialize;

/// Top-level `/chat/completions` response.
#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
    pub usage: Option<UsageBlock>,
}

/// A single response choice.
#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: Option<AssistantPayload>,
    pub finish_reason: Option<String>,
}

/// The assistant's message: text, tool calls, or both.
#[derive(Debug, Deserialize)]
pub struct AssistantPayload {
    pub content: Option<String>,
    #[serde(default)]
    pub tool_calls: Option<Vec<WireToolCall>>,
}

/// Tool call as sent by the API.
#[derive(Debug, Deserialize)]
pub struct WireToolCall {
    pub id: String,
    pub function: WireFunction,
}

/// Function name plus JSON-encoded arguments.
#[derive(Debug, Deserialize)]
pub struct WireFunction {
    pub name: String,
    #[serde(default)]
    pub arguments: String,
}

/// Token usage block.
#[derive(Debug, Deserialize)]
pub struct UsageBlock {
    #[serde(default)]
    pub prompt_tokens: usize,
    #[serde(default)]
    pub completion_tokens: usize,
    #[serde(default)]
    pub total_tokens: usize,
}
