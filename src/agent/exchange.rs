//! Request-scoped state of one exchange.

use tracing::debug;

use super::message::{Message, Response, ToolCall, ToolCallRequest};

/// Where an exchange stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// First completion call not yet answered with a tool request.
    Initial,
    /// A tool result has been appended; the finishing call is next.
    ToolPending,
    /// Terminal.
    Finished,
}

/// Append-only message list plus at most one tool round trip.
#[derive(Debug)]
pub struct Exchange {
    messages: Vec<Message>,
    phase: Phase,
    tool_call: Option<ToolCall>,
    completion_calls: usize,
}

impl Exchange {
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            messages,
            phase: Phase::Initial,
            tool_call: None,
            completion_calls: 0,
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn completion_calls(&self) -> usize {
        self.completion_calls
    }

    pub(crate) fn note_completion_call(&mut self) {
        self.completion_calls += 1;
    }

    /// Append the assistant's tool request and the tool's output, then move to
    /// [`Phase::ToolPending`].
    pub(crate) fn record_tool_result(
        &mut self,
        assistant_content: Option<String>,
        request: ToolCallRequest,
        output: String,
    ) {
        debug_assert_eq!(self.phase, Phase::Initial);

        self.messages.push(Message::assistant_with_tools(
            assistant_content.unwrap_or_default(),
            vec![request.clone()],
        ));
        self.messages.push(Message::tool_result(&request.id, output.clone()));
        self.tool_call = Some(ToolCall::completed(request, output));
        self.phase = Phase::ToolPending;
    }

    /// Close the exchange with the final answer.
    pub(crate) fn finish(mut self, content: String) -> Response {
        self.phase = Phase::Finished;
        debug!(
            "Exchange {:?} after {} completion calls, {} messages",
            self.phase,
            self.completion_calls,
            self.messages.len()
        );
        Response {
            content,
            tool_call: self.tool_call,
            completion_calls: self.completion_calls,
        }
    }
}
