//! Agent module - core agent logic.
//!
//! This module contains:
//! - Message types (Message, ToolCallRequest, Response)
//! - LLM client trait and the OpenAI-compatible implementation
//! - Context with the tool table and persona preamble
//! - Agent loop driving one exchange

mod context;
mod exchange;
mod loop_impl;
mod message;

// LLM providers in submodule
pub mod llm;

// Re-exports for convenience
pub use context::Context;
pub use exchange::{Exchange, Phase};
pub use llm::{CompletionResult, LlmClient, LlmResponse, OpenAiClient, Usage};
pub use loop_impl::AgentLoop;
pub use message::{Message, Response, Role, ToolCall, ToolCallRequest};
