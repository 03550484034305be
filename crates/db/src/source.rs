use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use tracing::debug;

use reorder_core::domain::order::{EvalSet, ItemId, Order, OrderId, OrderItem, UserId};
use reorder_core::store::{OrderSource, SourceError, REQUIRED_SCHEMA};
use reorder_core::OrderHistory;

use crate::{quote_ident, DbPool};

/// Reads the three input tables written by the external loader.
pub struct SqlOrderSource {
    pool: DbPool,
}

impl SqlOrderSource {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn table_columns(&self, table: &str) -> Result<Vec<String>, SourceError> {
        sqlx::query_scalar::<_, String>("SELECT name FROM pragma_table_info(?1)")
            .bind(table)
            .fetch_all(&self.pool)
            .await
            .map_err(source_error)
    }

    async fn load_items(&self, table: &str) -> Result<Vec<OrderItem>, SourceError> {
        let rows = sqlx::query(&format!(
            "SELECT
                CAST(order_id AS INTEGER) AS order_id,
                CAST(product_id AS INTEGER) AS product_id
             FROM {}",
            quote_ident(table)
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(source_error)?;

        rows.iter().map(item_from_row).collect()
    }
}

#[async_trait]
impl OrderSource for SqlOrderSource {
    async fn verify_schema(&self) -> Result<(), SourceError> {
        for (table, required) in REQUIRED_SCHEMA {
            let columns = self.table_columns(table).await?;
            if columns.is_empty() {
                return Err(SourceError::MissingTable { table: (*table).to_string() });
            }
            let missing = required.iter().find(|column| !columns.iter().any(|c| c == *column));
            if let Some(missing) = missing {
                return Err(SourceError::MissingColumn {
                    table: (*table).to_string(),
                    column: (*missing).to_string(),
                });
            }
        }
        debug!(
            event_name = "store.schema.verified",
            tables = REQUIRED_SCHEMA.len(),
            "input schema verified"
        );
        Ok(())
    }

    async fn load_history(&self) -> Result<OrderHistory, SourceError> {
        let rows = sqlx::query(
            "SELECT
                CAST(order_id AS INTEGER) AS order_id,
                CAST(user_id AS INTEGER) AS user_id,
                eval_set,
                CAST(order_number AS INTEGER) AS order_number,
                CAST(days_since_prior_order AS REAL) AS days_since_prior_order
             FROM orders",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(source_error)?;
        let orders = rows.iter().map(order_from_row).collect::<Result<Vec<_>, _>>()?;

        let prior_items = self.load_items("order_products__prior").await?;
        let train_items = self.load_items("order_products__train").await?;

        Ok(OrderHistory::new(orders, prior_items, train_items))
    }
}

fn order_from_row(row: &SqliteRow) -> Result<Order, SourceError> {
    let eval_set_raw = row.try_get::<String, _>("eval_set").map_err(source_error)?;
    let eval_set = eval_set_raw
        .parse::<EvalSet>()
        .map_err(|error| SourceError::Decode(error.to_string()))?;

    Ok(Order {
        order_id: OrderId(row.try_get("order_id").map_err(source_error)?),
        user_id: UserId(row.try_get("user_id").map_err(source_error)?),
        eval_set,
        order_number: row.try_get("order_number").map_err(source_error)?,
        days_since_prior_order: row.try_get("days_since_prior_order").map_err(source_error)?,
    })
}

fn item_from_row(row: &SqliteRow) -> Result<OrderItem, SourceError> {
    Ok(OrderItem {
        order_id: OrderId(row.try_get("order_id").map_err(source_error)?),
        item_id: ItemId(row.try_get("product_id").map_err(source_error)?),
    })
}

pub(crate) fn source_error(error: sqlx::Error) -> SourceError {
    match error {
        sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::ColumnNotFound(_)
        | sqlx::Error::Decode(_) => SourceError::Decode(error.to_string()),
        other => SourceError::Backend(other.to_string()),
    }
}
