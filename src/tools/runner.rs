//! Tool runner - the name-keyed table of registered tools

use std::collections::HashMap;
use std::sync::Arc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use crate::Result;
use crate::error::Error;
use crate::inventory::InventoryStore;
use super::{ProductStockTool, Tool};

/// Tool definition for LLM
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

/// Tool runner holds registered tools in registration order
pub struct ToolRunner {
    tools: Vec<Tool>,
    index: HashMap<&'static str, usize>,
}

impl ToolRunner {
    /// Create an empty tool runner
    pub fn new() -> Self {
        Self {
            tools: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Create a tool runner with every built-in tool
    pub fn with_defaults(store: Arc<dyn InventoryStore>) -> Self {
        let mut runner = Self::new();
        runner.tools.push(Tool::ProductStock(ProductStockTool::new(store)));
        runner.index.insert(ProductStockTool::NAME, 0);
        runner
    }

    /// Register a tool. Names must be unique.
    pub fn register(&mut self, tool: Tool) -> Result<()> {
        let name = tool.name();
        if self.index.contains_key(name) {
            return Err(Error::Config(format!("Tool already registered: {}", name)));
        }
        self.index.insert(name, self.tools.len());
        self.tools.push(tool);
        Ok(())
    }

    /// Look up a tool by name
    pub fn find_by_name(&self, name: &str) -> Option<&Tool> {
        self.index.get(name).map(|&i| &self.tools[i])
    }

    /// Get tool definitions for LLM
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(Tool::to_definition).collect()
    }

    /// Check if a tool exists
    pub fn has(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// List registered tool names
    pub fn tool_names(&self) -> Vec<&str> {
        self.tools.iter().map(Tool::name).collect()
    }
}

impl Default for ToolRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::InventoryConfig;
    use crate::inventory::InMemoryInventory;

    fn store() -> Arc<dyn InventoryStore> {
        Arc::new(InMemoryInventory::seeded(&InventoryConfig::default().seed))
    }

    #[tokio::test]
    async fn test_defaults_register_stock_tool() {
        let runner = ToolRunner::with_defaults(store());

        assert!(runner.has("get_product_stock"));
        assert_eq!(runner.tool_names(), vec!["get_product_stock"]);

        let tool = runner.find_by_name("get_product_stock").unwrap();
        let result = tool
            .execute(serde_json::json!({"product_name": "AirPods"}))
            .await
            .unwrap();
        assert!(result.contains("25"));
    }

    #[test]
    fn test_definitions_carry_schema() {
        let runner = ToolRunner::with_defaults(store());
        let defs = runner.definitions();

        assert_eq!(defs.len(), 1);
        assert_eq!(defs[0].name, "get_product_stock");
        assert_eq!(defs[0].parameters["required"][0], "product_name");
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let mut runner = ToolRunner::with_defaults(store());
        let again = Tool::ProductStock(ProductStockTool::new(store()));
        assert!(runner.register(again).is_err());
        assert_eq!(runner.definitions().len(), 1);
    }

    #[test]
    fn test_unknown_tool() {
        let runner = ToolRunner::with_defaults(store());
        assert!(runner.find_by_name("send_email").is_none());
        assert!(ToolRunner::new().find_by_name("get_product_stock").is_none());
    }

    #[tokio::test]
    async fn test_bad_arguments_fail_before_lookup() {
        let runner = ToolRunner::with_defaults(store());
        let tool = runner.find_by_name("get_product_stock").unwrap();
        let result = tool.execute(serde_json::json!({"name": "iPhone"})).await;
        assert!(matches!(result, Err(Error::ToolExecution { .. })));
    }
}
