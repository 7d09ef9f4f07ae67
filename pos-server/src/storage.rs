//! redb-based storage for orders and dining tables
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `orders` | `order_id` | `Order` (JSON) | Canonical order records |
//! | `dining_tables` | `table_id` | `DiningTable` (JSON) | Tables with their seats |
//! | `table_number_index` | `table_number` | `table_id` | Unique human-facing numbers |
//! | `sequence_counter` | name | `i64` | Id allocation |
//!
//! # Transactions
//!
//! Every mutation that touches an order and its table runs inside a single
//! `WriteTransaction`. redb admits one writer at a time, so two requests
//! racing for the same seat or the same order are serialized and the second
//! one observes the first one's committed result. Dropping a transaction
//! without committing aborts it.
//!
//! # Durability
//!
//! redb's default `Durability::Immediate` makes a commit persistent as soon
//! as `commit()` returns, so a restarted process resumes from the file.

use redb::{
    Database, ReadTransaction, ReadableDatabase, ReadableTable, TableDefinition,
    WriteTransaction,
};
use shared::models::{DiningTable, Order};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Orders: key = order_id, value = JSON-serialized Order
const ORDERS_TABLE: TableDefinition<i64, &[u8]> = TableDefinition::new("orders");

/// Dining tables: key = table_id, value = JSON-serialized DiningTable
const DINING_TABLES_TABLE: TableDefinition<i64, &[u8]> = TableDefinition::new("dining_tables");

/// Unique index: key = table_number, value = table_id
const TABLE_NUMBER_INDEX: TableDefinition<u32, i64> = TableDefinition::new("table_number_index");

/// Id counters: key = "order_id" / "table_id", value = last issued id
const SEQUENCE_TABLE: TableDefinition<&str, i64> = TableDefinition::new("sequence_counter");

pub const ORDER_ID_KEY: &str = "order_id";
pub const TABLE_ID_KEY: &str = "table_id";

const READ_RETRY_ATTEMPTS: u32 = 3;
const READ_RETRY_BACKOFF_MS: u64 = 20;

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StorageError {
    /// Errors a read may succeed on when simply tried again
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            StorageError::Transaction(_) | StorageError::Storage(redb::StorageError::Io(_))
        )
    }
}

pub type StorageResult<T> = Result<T, StorageError>;

/// POS storage backed by redb
#[derive(Clone)]
pub struct PosStorage {
    db: Arc<Database>,
}

impl PosStorage {
    /// Open or create the database at the given path
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let db = Database::create(path)?;
        Self::init(db)
    }

    /// Open an in-memory database (for testing)
    #[cfg(test)]
    pub fn open_in_memory() -> StorageResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        Self::init(db)
    }

    fn init(db: Database) -> StorageResult<Self> {
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(ORDERS_TABLE)?;
            let _ = write_txn.open_table(DINING_TABLES_TABLE)?;
            let _ = write_txn.open_table(TABLE_NUMBER_INDEX)?;
            let _ = write_txn.open_table(SEQUENCE_TABLE)?;
        }
        write_txn.commit()?;

        Ok(Self { db: Arc::new(db) })
    }

    /// Begin a write transaction
    ///
    /// Blocks while another write transaction is open.
    pub fn begin_write(&self) -> StorageResult<WriteTransaction> {
        Ok(self.db.begin_write()?)
    }

    /// Run an idempotent read, retrying transient failures a bounded number
    /// of times
    fn read<T>(&self, f: impl Fn(&ReadTransaction) -> StorageResult<T>) -> StorageResult<T> {
        let mut attempt = 1;
        loop {
            let result = self
                .db
                .begin_read()
                .map_err(StorageError::from)
                .and_then(|txn| f(&txn));
            match result {
                Err(e) if e.is_transient() && attempt < READ_RETRY_ATTEMPTS => {
                    tracing::warn!(attempt, error = %e, "Transient read failure, retrying");
                    std::thread::sleep(Duration::from_millis(
                        READ_RETRY_BACKOFF_MS * u64::from(attempt),
                    ));
                    attempt += 1;
                }
                other => return other,
            }
        }
    }

    // ========== Sequence Operations ==========

    /// Allocate the next id for `key` (within transaction)
    pub fn next_id(&self, txn: &WriteTransaction, key: &str) -> StorageResult<i64> {
        let mut table = txn.open_table(SEQUENCE_TABLE)?;
        let current = table.get(key)?.map(|guard| guard.value()).unwrap_or(0);
        let next = current + 1;
        table.insert(key, next)?;
        Ok(next)
    }

    // ========== Order Operations ==========

    pub fn store_order(&self, txn: &WriteTransaction, order: &Order) -> StorageResult<()> {
        let mut table = txn.open_table(ORDERS_TABLE)?;
        let value = serde_json::to_vec(order)?;
        table.insert(order.id, value.as_slice())?;
        Ok(())
    }

    /// Get an order (within transaction)
    pub fn get_order_txn(&self, txn: &WriteTransaction, order_id: i64) -> StorageResult<Option<Order>> {
        let table = txn.open_table(ORDERS_TABLE)?;
        match table.get(order_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    pub fn get_order(&self, order_id: i64) -> StorageResult<Option<Order>> {
        self.read(|txn| {
            let table = txn.open_table(ORDERS_TABLE)?;
            match table.get(order_id)? {
                Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
                None => Ok(None),
            }
        })
    }

    /// All orders, in id (creation) order
    pub fn list_orders(&self) -> StorageResult<Vec<Order>> {
        self.read(|txn| {
            let table = txn.open_table(ORDERS_TABLE)?;
            let mut orders = Vec::new();
            for result in table.iter()? {
                let (_key, value) = result?;
                orders.push(serde_json::from_slice(value.value())?);
            }
            Ok(orders)
        })
    }

    // ========== Dining Table Operations ==========

    pub fn store_table(&self, txn: &WriteTransaction, table: &DiningTable) -> StorageResult<()> {
        let mut t = txn.open_table(DINING_TABLES_TABLE)?;
        let value = serde_json::to_vec(table)?;
        t.insert(table.id, value.as_slice())?;
        Ok(())
    }

    /// Get a dining table (within transaction)
    pub fn get_table_txn(
        &self,
        txn: &WriteTransaction,
        table_id: i64,
    ) -> StorageResult<Option<DiningTable>> {
        let t = txn.open_table(DINING_TABLES_TABLE)?;
        match t.get(table_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    pub fn get_table(&self, table_id: i64) -> StorageResult<Option<DiningTable>> {
        self.read(|txn| {
            let t = txn.open_table(DINING_TABLES_TABLE)?;
            match t.get(table_id)? {
                Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
                None => Ok(None),
            }
        })
    }

    /// All dining tables, sorted by table number
    pub fn list_tables(&self) -> StorageResult<Vec<DiningTable>> {
        let mut tables: Vec<DiningTable> = self.read(|txn| {
            let t = txn.open_table(DINING_TABLES_TABLE)?;
            let mut tables = Vec::new();
            for result in t.iter()? {
                let (_key, value) = result?;
                tables.push(serde_json::from_slice(value.value())?);
            }
            Ok(tables)
        })?;
        tables.sort_by_key(|t| t.table_number);
        Ok(tables)
    }

    /// Remove a dining table and its number index entry (within transaction)
    pub fn remove_table(&self, txn: &WriteTransaction, table: &DiningTable) -> StorageResult<()> {
        {
            let mut t = txn.open_table(DINING_TABLES_TABLE)?;
            t.remove(table.id)?;
        }
        let mut index = txn.open_table(TABLE_NUMBER_INDEX)?;
        index.remove(table.table_number)?;
        Ok(())
    }

    // ========== Table Number Index ==========

    /// Resolve a table number to its id (within transaction)
    pub fn find_table_id_txn(
        &self,
        txn: &WriteTransaction,
        table_number: u32,
    ) -> StorageResult<Option<i64>> {
        let index = txn.open_table(TABLE_NUMBER_INDEX)?;
        Ok(index.get(table_number)?.map(|guard| guard.value()))
    }

    pub fn index_table_number(
        &self,
        txn: &WriteTransaction,
        table_number: u32,
        table_id: i64,
    ) -> StorageResult<()> {
        let mut index = txn.open_table(TABLE_NUMBER_INDEX)?;
        index.insert(table_number, table_id)?;
        Ok(())
    }
}
