use async_trait::async_trait;
use sqlx::{QueryBuilder, Sqlite};
use tracing::info;

use reorder_core::stage::{Cell, Column, StageTable};
use reorder_core::store::{StageStore, StoreError};

use crate::{quote_ident, DbPool};

pub const DEFAULT_BATCH_ROWS: usize = 500;

/// Materializes stage tables in the same SQLite file the input was read from.
pub struct SqlStageStore {
    pool: DbPool,
    batch_rows: usize,
}

impl SqlStageStore {
    pub fn new(pool: DbPool) -> Self {
        Self::with_batch_rows(pool, DEFAULT_BATCH_ROWS)
    }

    pub fn with_batch_rows(pool: DbPool, batch_rows: usize) -> Self {
        Self { pool, batch_rows: batch_rows.max(1) }
    }
}

#[async_trait]
impl StageStore for SqlStageStore {
    async fn replace_table(&self, table: StageTable<'_>) -> Result<u64, StoreError> {
        let name = table.name;
        let store_error = |error: sqlx::Error| StoreError::new(name, error.to_string());

        let mut tx = self.pool.begin().await.map_err(store_error)?;

        sqlx::query(&format!("DROP TABLE IF EXISTS {}", quote_ident(name)))
            .execute(&mut *tx)
            .await
            .map_err(store_error)?;
        sqlx::query(&create_table_sql(name, table.columns))
            .execute(&mut *tx)
            .await
            .map_err(store_error)?;

        let insert_head = insert_head_sql(name, table.columns);
        let mut rows = table.rows;
        let mut written = 0u64;
        loop {
            let batch = rows.by_ref().take(self.batch_rows).collect::<Vec<_>>();
            if batch.is_empty() {
                break;
            }
            if let Some(row) = batch.iter().find(|row| row.len() != table.columns.len()) {
                return Err(StoreError::new(
                    name,
                    format!("row has {} cells for {} columns", row.len(), table.columns.len()),
                ));
            }
            let batch_len = batch.len() as u64;

            let mut builder = QueryBuilder::<Sqlite>::new(&insert_head);
            builder.push_values(batch, |mut values, row| {
                for cell in row {
                    match cell {
                        Cell::Null => {
                            values.push_bind(None::<i64>);
                        }
                        Cell::Integer(value) => {
                            values.push_bind(value);
                        }
                        Cell::Real(value) => {
                            values.push_bind(value);
                        }
                        Cell::Text(value) => {
                            values.push_bind(value);
                        }
                    }
                }
            });
            builder.build().execute(&mut *tx).await.map_err(store_error)?;
            written += batch_len;
        }

        tx.commit().await.map_err(store_error)?;

        info!(
            event_name = "store.stage_table.replaced",
            table = name,
            rows = written,
            "stage table replaced"
        );
        Ok(written)
    }
}

fn create_table_sql(name: &str, columns: &[Column]) -> String {
    let columns = columns
        .iter()
        .map(|column| format!("{} {}", quote_ident(column.name), column.kind.sql_type()))
        .collect::<Vec<_>>()
        .join(", ");
    format!("CREATE TABLE {} ({columns})", quote_ident(name))
}

fn insert_head_sql(name: &str, columns: &[Column]) -> String {
    let columns =
        columns.iter().map(|column| quote_ident(column.name)).collect::<Vec<_>>().join(", ");
    format!("INSERT INTO {} ({columns}) ", quote_ident(name))
}
