//! CLI adapter - single-message and interactive command line interface.
//!
//! Every line is its own exchange; nothing is remembered between lines.

use std::io::{self, Write};

use colored::Colorize;

use super::Channel;
use crate::agent::{AgentLoop, Context, LlmClient, Response};
use crate::Result;

/// CLI channel for terminal sessions.
pub struct CliChannel<C: LlmClient> {
    agent: AgentLoop<C>,
    context: Context,
}

impl<C: LlmClient> CliChannel<C> {
    /// Create a new CLI channel.
    pub fn new(agent: AgentLoop<C>, context: Context) -> Self {
        Self { agent, context }
    }

    /// Run a single message and return the response.
    pub async fn run_once(&self, message: &str) -> Result<Response> {
        self.agent.run(message, &self.context).await
    }

    /// Run interactive REPL loop.
    pub async fn run_interactive(&self) -> Result<()> {
        let stdin = io::stdin();

        loop {
            print!("{}: ", "You".blue().bold());
            io::stdout().flush()?;

            let mut line = String::new();
            if stdin.read_line(&mut line)? == 0 {
                // EOF
                break;
            }

            let input = line.trim();
            if input.is_empty() {
                continue;
            }

            if matches!(input.to_lowercase().as_str(), "exit" | "quit" | "q") {
                println!("Goodbye! 👋");
                break;
            }

            match self.run_once(input).await {
                Ok(response) => println!("\n{}: {}\n", "Bot".green().bold(), response.content),
                Err(e) => println!("\n{}: {}\n", "Error".red().bold(), e),
            }
        }

        Ok(())
    }
}

impl<C: LlmClient> Channel for CliChannel<C> {
    fn name(&self) -> &str {
        "cli"
    }

    fn start(&self) -> impl std::future::Future<Output = Result<()>> + Send {
        self.run_interactive()
    }

    fn stop(&self) -> impl std::future::Future<Output = Result<()>> + Send {
        async { Ok(()) }
    }
}
