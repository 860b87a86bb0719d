//! Stock tool - look up how many units of a product are on hand

use std::sync::Arc;

use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::error::Error;
use crate::inventory::InventoryStore;
use crate::Result;

/// Returned when no product name contains the requested text
pub const NOT_FOUND_MESSAGE: &str = "Product not found in inventory.";

/// Arguments accepted by [`ProductStockTool`]
#[derive(Debug, Clone, Deserialize)]
pub struct ProductStockArgs {
    pub product_name: String,
}

impl ProductStockArgs {
    /// Validate raw invocation arguments.
    pub fn parse(params: Value) -> Result<Self> {
        let args: Self = serde_json::from_value(params)
            .map_err(|e| Error::tool(ProductStockTool::NAME, format!("invalid arguments: {e}")))?;

        if args.product_name.trim().is_empty() {
            return Err(Error::tool(
                ProductStockTool::NAME,
                "'product_name' must not be empty",
            ));
        }
        Ok(args)
    }
}

/// Substring lookup against the inventory store
#[derive(Clone)]
pub struct ProductStockTool {
    store: Arc<dyn InventoryStore>,
}

impl ProductStockTool {
    pub const NAME: &'static str = "get_product_stock";

    pub fn new(store: Arc<dyn InventoryStore>) -> Self {
        Self { store }
    }

    pub fn description(&self) -> &'static str {
        "Get the current stock of a product by name"
    }

    pub fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "product_name": {
                    "type": "string",
                    "description": "Product name, or part of it (e.g. \"iPhone 15\")"
                }
            },
            "required": ["product_name"]
        })
    }

    pub async fn execute(&self, args: ProductStockArgs) -> Result<String> {
        let query = args.product_name.trim();
        let record = self
            .store
            .find_first_containing(query)
            .map_err(|e| Error::tool(Self::NAME, e.to_string()))?;

        match record {
            Some(record) => {
                debug!("Stock lookup '{}' matched '{}'", query, record.name);
                Ok(format!(
                    "Product: **{}** | Stock: **{} units**",
                    record.name, record.stock
                ))
            }
            None => {
                debug!("Stock lookup '{}' matched nothing", query);
                Ok(NOT_FOUND_MESSAGE.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::InventoryConfig;
    use crate::inventory::{InventoryRecord, SqliteInventory};

    fn tool() -> ProductStockTool {
        let store = SqliteInventory::seeded(&InventoryConfig::default().seed).unwrap();
        ProductStockTool::new(Arc::new(store))
    }

    fn args(name: &str) -> ProductStockArgs {
        ProductStockArgs {
            product_name: name.to_string(),
        }
    }

    /// Store whose every query fails.
    struct BrokenStore;

    impl InventoryStore for BrokenStore {
        fn find_first_containing(&self, _fragment: &str) -> Result<Option<InventoryRecord>> {
            Err(Error::Store("database is locked".to_string()))
        }

        fn len(&self) -> Result<usize> {
            Err(Error::Store("database is locked".to_string()))
        }
    }

    #[tokio::test]
    async fn test_existing_product() {
        let result = tool().execute(args("iPhone 15")).await.unwrap();
        assert!(result.contains("iPhone 15"));
        assert!(result.contains("12"));
    }

    #[tokio::test]
    async fn test_missing_product() {
        let result = tool().execute(args("Nokia 3310")).await.unwrap();
        assert_eq!(result, NOT_FOUND_MESSAGE);
    }

    #[tokio::test]
    async fn test_lookup_is_idempotent() {
        let tool = tool();
        let first = tool.execute(args("Galaxy")).await.unwrap();
        let second = tool.execute(args("Galaxy")).await.unwrap();
        assert_eq!(first, second);
        assert!(first.contains("Galaxy S24"));
    }

    #[tokio::test]
    async fn test_store_failure_is_tool_error() {
        let tool = ProductStockTool::new(Arc::new(BrokenStore));
        let err = tool.execute(args("iPhone")).await.unwrap_err();
        assert!(matches!(err, Error::ToolExecution { ref tool, .. } if tool.as_str() == ProductStockTool::NAME));
    }

    #[test]
    fn test_args_validation() {
        assert!(ProductStockArgs::parse(json!({"product_name": "AirPods"})).is_ok());
        assert!(ProductStockArgs::parse(json!({})).is_err());
        assert!(ProductStockArgs::parse(json!({"product_name": 42})).is_err());
        assert!(ProductStockArgs::parse(json!({"product_name": "   "})).is_err());
        assert!(ProductStockArgs::parse(Value::Null).is_err());
    }
}
