//! Inventory module - read-only product stock lookup
//!
//! Stores are seeded once at startup and never written afterwards. Both
//! backends match names by case-insensitive substring and, when several
//! records match, return the one inserted first.

use std::sync::Mutex;

use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};

use crate::config::{InventoryBackend, InventoryConfig};
use crate::error::Error;
use crate::Result;

/// A product and how many units are on hand
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryRecord {
    pub name: String,
    pub stock: u32,
}

impl InventoryRecord {
    pub fn new(name: impl Into<String>, stock: u32) -> Self {
        Self {
            name: name.into(),
            stock,
        }
    }
}

/// Inventory store trait - the single read query the stock tool needs
pub trait InventoryStore: Send + Sync {
    /// First record whose name contains `fragment`, if any
    fn find_first_containing(&self, fragment: &str) -> Result<Option<InventoryRecord>>;

    /// Number of records in the store
    fn len(&self) -> Result<usize>;

    fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

/// Build the configured store and seed it
pub fn open(config: &InventoryConfig) -> Result<Box<dyn InventoryStore>> {
    match config.backend {
        InventoryBackend::Sqlite => Ok(Box::new(SqliteInventory::seeded(&config.seed)?)),
        InventoryBackend::Memory => Ok(Box::new(InMemoryInventory::seeded(&config.seed))),
    }
}

/// SQLite-backed store living in an in-memory database
pub struct SqliteInventory {
    // rusqlite::Connection is Send but not Sync
    conn: Mutex<Connection>,
}

impl SqliteInventory {
    /// Create the schema and insert `seed`. Duplicate names keep the first row.
    pub fn seeded(seed: &[InventoryRecord]) -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS products (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT UNIQUE NOT NULL,
                stock INTEGER NOT NULL CHECK (stock >= 0)
            );",
        )?;

        {
            let mut stmt =
                conn.prepare("INSERT OR IGNORE INTO products (name, stock) VALUES (?1, ?2)")?;
            for record in seed {
                stmt.execute(params![record.name, record.stock])?;
            }
        }

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| Error::Store("inventory connection poisoned".to_string()))
    }
}

/// Escape LIKE wildcards so the fragment matches literally.
fn escape_like(fragment: &str) -> String {
    let mut escaped = String::with_capacity(fragment.len());
    for c in fragment.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

impl InventoryStore for SqliteInventory {
    fn find_first_containing(&self, fragment: &str) -> Result<Option<InventoryRecord>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare_cached(
            "SELECT name, stock FROM products
             WHERE name LIKE '%' || ?1 || '%' ESCAPE '\\'
             ORDER BY id
             LIMIT 1",
        )?;

        let record = stmt
            .query_row(params![escape_like(fragment)], |row| {
                Ok(InventoryRecord {
                    name: row.get(0)?,
                    stock: row.get(1)?,
                })
            })
            .optional()?;

        Ok(record)
    }

    fn len(&self) -> Result<usize> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM products", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

/// Plain vector store, used when SQLite is not wanted
pub struct InMemoryInventory {
    records: Vec<InventoryRecord>,
}

impl InMemoryInventory {
    pub fn seeded(seed: &[InventoryRecord]) -> Self {
        let mut records: Vec<InventoryRecord> = Vec::with_capacity(seed.len());
        for record in seed {
            if !records.iter().any(|r| r.name == record.name) {
                records.push(record.clone());
            }
        }
        Self { records }
    }
}

impl InventoryStore for InMemoryInventory {
    fn find_first_containing(&self, fragment: &str) -> Result<Option<InventoryRecord>> {
        let needle = fragment.to_ascii_lowercase();
        Ok(self
            .records
            .iter()
            .find(|r| r.name.to_ascii_lowercase().contains(&needle))
            .cloned())
    }

    fn len(&self) -> Result<usize> {
        Ok(self.records.len())
    }
}
