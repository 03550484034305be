use std::sync::Mutex;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::history::OrderHistory;
use crate::stage::{Cell, Column, StageTable};

/// Input tables and the columns the pipeline reads from each.
pub const REQUIRED_SCHEMA: &[(&str, &[&str])] = &[
    ("orders", &["order_id", "user_id", "eval_set", "order_number", "days_since_prior_order"]),
    ("order_products__prior", &["order_id", "product_id"]),
    ("order_products__train", &["order_id", "product_id"]),
];

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("schema error: required table `{table}` is missing")]
    MissingTable { table: String },
    #[error("schema error: required column `{column}` is missing from table `{table}`")]
    MissingColumn { table: String, column: String },
    #[error("decode error: {0}")]
    Decode(String),
    #[error("source failure: {0}")]
    Backend(String),
}

#[derive(Debug, Error)]
#[error("could not materialize stage table `{table}`: {message}")]
pub struct StoreError {
    pub table: String,
    pub message: String,
}

impl StoreError {
    pub fn new(table: impl Into<String>, message: impl Into<String>) -> Self {
        Self { table: table.into(), message: message.into() }
    }
}

/// Read side: the relational store filled by the external loader.
#[async_trait]
pub trait OrderSource: Send + Sync {
    async fn verify_schema(&self) -> Result<(), SourceError>;
    async fn load_history(&self) -> Result<OrderHistory, SourceError>;
}

/// Write side: where intermediate stage outputs are materialized.
#[async_trait]
pub trait StageStore: Send + Sync {
    /// Drops any previous table of the same name before writing. Returns the
    /// number of rows written.
    async fn replace_table(&self, table: StageTable<'_>) -> Result<u64, StoreError>;
}

/// Serves a fixed [`OrderHistory`]; every required table is assumed present.
#[derive(Debug, Default)]
pub struct InMemoryOrderSource {
    history: OrderHistory,
}

impl InMemoryOrderSource {
    pub fn new(history: OrderHistory) -> Self {
        Self { history }
    }
}

#[async_trait]
impl OrderSource for InMemoryOrderSource {
    async fn verify_schema(&self) -> Result<(), SourceError> {
        Ok(())
    }

    async fn load_history(&self) -> Result<OrderHistory, SourceError> {
        Ok(self.history.clone())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct CapturedTable {
    pub name: String,
    pub columns: Vec<Column>,
    pub rows: Vec<Vec<Cell>>,
}

/// Keeps every replaced table in memory, newest version per name.
#[derive(Debug, Default)]
pub struct InMemoryStageStore {
    tables: Mutex<Vec<CapturedTable>>,
}

impl InMemoryStageStore {
    pub fn table(&self, name: &str) -> Option<CapturedTable> {
        self.tables.lock().ok()?.iter().find(|table| table.name == name).cloned()
    }

    pub fn table_names(&self) -> Vec<String> {
        self.tables
            .lock()
            .map(|tables| tables.iter().map(|table| table.name.clone()).collect())
            .unwrap_or_default()
    }
}

#[async_trait]
impl StageStore for InMemoryStageStore {
    async fn replace_table(&self, table: StageTable<'_>) -> Result<u64, StoreError> {
        let captured = CapturedTable {
            name: table.name.to_string(),
            columns: table.columns.to_vec(),
            rows: table.rows.collect(),
        };
        let written = captured.rows.len() as u64;

        let mut tables = self
            .tables
            .lock()
            .map_err(|_| StoreError::new(table.name, "in-memory stage store lock is poisoned"))?;
        tables.retain(|existing| existing.name != captured.name);
        tables.push(captured);
        Ok(written)
    }
}

/// Discards stage tables; used when materialization is switched off.
#[derive(Clone, Copy, Debug, Default)]
pub struct DiscardStageStore;

#[async_trait]
impl StageStore for DiscardStageStore {
    async fn replace_table(&self, _table: StageTable<'_>) -> Result<u64, StoreError> {
        Ok(0)
    }
}
