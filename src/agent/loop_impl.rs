//! Agent loop - one question, at most one tool, one answer

use tracing::{debug, info, warn};
use crate::Result;
use crate::error::Error;
use crate::tools::ToolDefinition;
use super::context::Context;
use super::exchange::Exchange;
use super::llm::{CompletionResult, LlmClient, LlmResponse};
use super::message::Response;

/// The agent loop runs exchanges through the completion client and tools
pub struct AgentLoop<C: LlmClient> {
    client: C,
}

impl<C: LlmClient> AgentLoop<C> {
    /// Create a new agent loop
    pub fn new(client: C) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Run one exchange for the given user text.
    ///
    /// Only the first of several simultaneous tool calls is executed; the
    /// rest are dropped with a warning.
    pub async fn run(&self, text: &str, ctx: &Context) -> Result<Response> {
        let question = text.trim();
        if question.is_empty() {
            return Err(Error::InvalidInput("message must not be empty".to_string()));
        }

        info!("Starting exchange ({} chars)", question.len());
        debug!("Question: {}", question);

        let mut exchange = Exchange::new(ctx.build_messages(question));
        let tools = ctx.tool_runner.definitions();

        let first = self.complete(&mut exchange, &tools).await?;
        let (content, invocations) = match first.result {
            CompletionResult::Text { content } => {
                info!("Exchange finished without tools: {} chars", content.len());
                return Ok(exchange.finish(content));
            }
            CompletionResult::ToolCalls { content, invocations } => (content, invocations),
        };

        let mut invocations = invocations.into_iter();
        let request = invocations.next().ok_or_else(|| {
            Error::MalformedResponse("tool call result without invocations".to_string())
        })?;
        let ignored = invocations.count();
        if ignored > 0 {
            warn!(
                "Model requested {} tool calls; only '{}' ({}) will run",
                ignored + 1,
                request.name,
                request.id
            );
        }

        let tool = ctx
            .tool_runner
            .find_by_name(&request.name)
            .ok_or_else(|| Error::ToolNotFound(request.name.clone()))?;

        debug!("Executing tool: {} with args: {}", request.name, request.arguments);
        let output = tool.execute(request.arguments.clone()).await?;
        debug!("Tool {} succeeded: {} chars", request.name, output.len());

        exchange.record_tool_result(content, request, output);

        let second = self.complete(&mut exchange, &[]).await?;
        match second.result {
            CompletionResult::Text { content } => {
                info!("Exchange finished after tool call: {} chars", content.len());
                Ok(exchange.finish(content))
            }
            CompletionResult::ToolCalls { invocations, .. } => {
                let names: Vec<&str> = invocations.iter().map(|c| c.name.as_str()).collect();
                Err(Error::ProtocolViolation(format!(
                    "finishing completion requested tools: {}",
                    names.join(", ")
                )))
            }
        }
    }

    async fn complete(
        &self,
        exchange: &mut Exchange,
        tools: &[ToolDefinition],
    ) -> Result<LlmResponse> {
        exchange.note_completion_call();
        debug!(
            "Completion call {} ({:?}, {} messages, {} tools)",
            exchange.completion_calls(),
            exchange.phase(),
            exchange.messages().len(),
            tools.len()
        );
        self.client.chat(exchange.messages(), tools).await
    }
}
