//! Tools module - agent capabilities
//!
//! The set of tools is closed: each one is a [`Tool`] variant. Adding a tool
//! means adding a variant, matching it in the methods below, and registering
//! it in [`ToolRunner::with_defaults`].

mod runner;
mod stock;

pub use runner::{ToolDefinition, ToolRunner};
pub use stock::{ProductStockArgs, ProductStockTool, NOT_FOUND_MESSAGE};

use serde_json::Value;
use crate::Result;

/// Every tool the agent can call
#[derive(Clone)]
pub enum Tool {
    ProductStock(ProductStockTool),
}

impl Tool {
    /// Tool name used in function calls
    pub fn name(&self) -> &'static str {
        match self {
            Tool::ProductStock(_) => ProductStockTool::NAME,
        }
    }

    /// Description of what the tool does
    pub fn description(&self) -> &'static str {
        match self {
            Tool::ProductStock(t) => t.description(),
        }
    }

    /// JSON Schema for parameters
    pub fn parameters(&self) -> Value {
        match self {
            Tool::ProductStock(t) => t.parameters(),
        }
    }

    /// Validate `params` into the tool's argument type, then execute
    pub async fn execute(&self, params: Value) -> Result<String> {
        match self {
            Tool::ProductStock(t) => t.execute(ProductStockArgs::parse(params)?).await,
        }
    }

    /// Convert to tool definition for LLM
    pub fn to_definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters(),
        }
    }
}
