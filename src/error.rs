//! Error types for stock-agent

use thiserror::Error;

/// Result type alias for stock-agent operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while serving an exchange
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    /// Empty or missing user message. The agent loop is never invoked.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The completion endpoint could not be reached, timed out, or answered
    /// with a non-success status.
    #[error("Completion API unavailable: {0}")]
    UpstreamUnavailable(String),

    /// The completion endpoint answered, but the body is unusable.
    #[error("Malformed completion response: {0}")]
    MalformedResponse(String),

    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    #[error("Tool {tool} failed: {message}")]
    ToolExecution { tool: String, message: String },

    /// The finishing completion call asked for another tool.
    #[error("Protocol violation: {0}")]
    ProtocolViolation(String),

    #[error("Inventory store error: {0}")]
    Store(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP server error: {0}")]
    Http(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Shorthand for a tool execution failure.
    pub fn tool(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Error::ToolExecution {
            tool: tool.into(),
            message: message.into(),
        }
    }

    /// Whether the caller, not the service, is at fault.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Error::InvalidInput(_))
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Store(err.to_string())
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Other(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_invalid_input_is_client_error() {
        assert!(Error::InvalidInput("empty".into()).is_client_error());
        assert!(!Error::ToolNotFound("x".into()).is_client_error());
        assert!(!Error::UpstreamUnavailable("down".into()).is_client_error());
    }

    #[test]
    fn test_tool_error_display() {
        let err = Error::tool("get_product_stock", "missing 'product_name'");
        assert_eq!(
            err.to_string(),
            "Tool get_product_stock failed: missing 'product_name'"
        );
    }
}
