//! Adapters module - ways to reach the agent.
//!
//! Each adapter implements the [`Channel`] trait for uniform handling.
//!
//! # Supported Channels
//!
//! - **CLI** - One-shot or interactive command line
//! - **HTTP** - Chat page plus `POST /chat` JSON endpoint via axum

pub mod cli;
pub mod http;

/// Channel trait for chat adapters.
///
/// All channel implementations must be [`Send`] + [`Sync`] for async compatibility.
pub trait Channel: Send + Sync {
    /// Channel name (e.g., "http", "cli").
    fn name(&self) -> &str;

    /// Start listening for messages.
    fn start(&self) -> impl std::future::Future<Output = crate::Result<()>> + Send;

    /// Stop the channel.
    fn stop(&self) -> impl std::future::Future<Output = crate::Result<()>> + Send;
}
