//! Context shared by every exchange: the tool table and the persona preamble.
//!
//! Built once at startup and never mutated, so concurrent exchanges can hold
//! it behind an `Arc` without locking.

use std::sync::Arc;

use crate::config::Config;
use crate::inventory::InventoryStore;
use crate::tools::ToolRunner;

use super::message::Message;

/// Read-only state consulted by the agent loop.
pub struct Context {
    pub tool_runner: ToolRunner,
    persona: String,
}

impl Context {
    /// Create a new context from configuration and an opened store.
    pub fn new(config: &Config, store: Arc<dyn InventoryStore>) -> Self {
        Self::with_parts(ToolRunner::with_defaults(store), &config.persona)
    }

    pub fn with_parts(tool_runner: ToolRunner, persona: &str) -> Self {
        Self {
            tool_runner,
            persona: persona.trim().to_string(),
        }
    }

    /// Create a test context over the default in-memory inventory.
    #[cfg(test)]
    pub fn test() -> Self {
        use crate::inventory::InMemoryInventory;

        let config = Config::default();
        let store = InMemoryInventory::seeded(&config.inventory.seed);
        Self::new(&config, Arc::new(store))
    }

    pub fn persona(&self) -> &str {
        &self.persona
    }

    /// Wrap the user's question in the persona preamble.
    pub fn build_prompt(&self, question: &str) -> String {
        if self.persona.is_empty() {
            return question.to_string();
        }
        format!("{}\n\nQuestion: {}", self.persona, question)
    }

    /// The opening message list of an exchange: one user message.
    pub fn build_messages(&self, question: &str) -> Vec<Message> {
        vec![Message::user(self.build_prompt(question))]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::message::Role;

    #[test]
    fn test_context_build_messages() {
        let ctx = Context::test();
        let messages = ctx.build_messages("How many iPhone 15 do you have?");

        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, Role::User);
        assert!(messages[0].content.starts_with(ctx.persona()));
        assert!(messages[0].content.ends_with("Question: How many iPhone 15 do you have?"));
    }

    #[test]
    fn test_default_persona_mentions_dialect() {
        let ctx = Context::test();
        assert!(ctx.persona().contains("Algerian"));
    }

    #[test]
    fn test_empty_persona_passes_question_through() {
        let ctx = Context::with_parts(ToolRunner::new(), "   ");
        assert_eq!(ctx.build_prompt("hello"), "hello");
    }
}
