use serde::Serialize;

use crate::connection::DbPool;

/// Bundled sample order history with a hand-checked feature table.
///
/// Loading replaces the three input tables, so it is safe to run twice.
pub struct SampleDataset;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct SeedResult {
    pub orders: i64,
    pub prior_items: i64,
    pub train_items: i64,
}

impl SampleDataset {
    pub const SQL: &'static str = include_str!("../../../config/fixtures/sample_orders.sql");

    /// Feature file the default settings produce from [`SampleDataset::SQL`].
    pub const EXPECTED_CSV: &'static str =
        include_str!("../../../config/fixtures/sample_features.csv");

    pub async fn load(pool: &DbPool) -> Result<SeedResult, sqlx::Error> {
        let mut tx = pool.begin().await?;
        sqlx::raw_sql(Self::SQL).execute(&mut *tx).await?;
        tx.commit().await?;

        Ok(SeedResult {
            orders: count(pool, "orders").await?,
            prior_items: count(pool, "order_products__prior").await?,
            train_items: count(pool, "order_products__train").await?,
        })
    }
}

async fn count(pool: &DbPool, table: &str) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar(&format!("SELECT COUNT(1) FROM {}", crate::quote_ident(table)))
        .fetch_one(pool)
        .await
}
