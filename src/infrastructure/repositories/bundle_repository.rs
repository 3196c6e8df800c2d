//! Bundle Repository Implementation
//!
//! PostgreSQL implementation of the BundleRepository trait.
//! Bundles are loaded together with their `bundle_items` rows in position order.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use super::not_found_or_database;
use crate::domain::{Bundle, BundleItem, BundleRepository};
use crate::shared::error::AppError;

#[derive(Debug, sqlx::FromRow)]
struct BundleRow {
    id: Uuid,
    name: String,
    price: Decimal,
    is_deleted: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct BundleItemRow {
    bundle_id: Uuid,
    product_id: Uuid,
    distributed_price: Decimal,
}

impl BundleRow {
    fn into_bundle(self, items: Vec<BundleItem>) -> Bundle {
        Bundle {
            id: self.id,
            name: self.name,
            price: self.price,
            is_deleted: self.is_deleted,
            items,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl From<BundleItemRow> for BundleItem {
    fn from(row: BundleItemRow) -> Self {
        BundleItem {
            bundle_id: row.bundle_id,
            product_id: row.product_id,
            distributed_price: row.distributed_price,
        }
    }
}

/// PostgreSQL bundle repository implementation.
#[derive(Clone)]
pub struct PgBundleRepository {
    pool: PgPool,
}

impl PgBundleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn load_items(&self, bundle_ids: &[Uuid]) -> Result<HashMap<Uuid, Vec<BundleItem>>, AppError> {
        let rows = sqlx::query_as::<_, BundleItemRow>(
            r#"
            SELECT bundle_id, product_id, distributed_price
            FROM bundle_items
            WHERE bundle_id = ANY($1)
            ORDER BY bundle_id, position
            "#,
        )
        .bind(bundle_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut items: HashMap<Uuid, Vec<BundleItem>> = HashMap::new();
        for row in rows {
            items.entry(row.bundle_id).or_default().push(row.into());
        }
        Ok(items)
    }
}

#[async_trait]
impl BundleRepository for PgBundleRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Bundle>, AppError> {
        Ok(self.find_by_ids(&[id]).await?.into_iter().next())
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Bundle>, AppError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, BundleRow>(
            r#"
            SELECT id, name, price, is_deleted, created_at, updated_at
            FROM bundles
            WHERE id = ANY($1)
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        let mut items = self.load_items(ids).await?;
        Ok(rows
            .into_iter()
            .map(|r| {
                let bundle_items = items.remove(&r.id).unwrap_or_default();
                r.into_bundle(bundle_items)
            })
            .collect())
    }

    async fn create(&self, bundle: &Bundle) -> Result<Bundle, AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO bundles (id, name, price, is_deleted, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(bundle.id)
        .bind(&bundle.name)
        .bind(bundle.price)
        .bind(bundle.is_deleted)
        .bind(bundle.created_at)
        .bind(bundle.updated_at)
        .execute(&mut *tx)
        .await?;

        for (position, item) in bundle.items.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO bundle_items (bundle_id, product_id, distributed_price, position)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(bundle.id)
            .bind(item.product_id)
            .bind(item.distributed_price)
            .bind(position as i32)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                not_found_or_database(e, || format!("Product {} not found", item.product_id))
            })?;
        }

        tx.commit().await?;
        Ok(bundle.clone())
    }

    async fn update_distribution(
        &self,
        bundle_id: Uuid,
        items: &[BundleItem],
    ) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        for item in items {
            sqlx::query(
                r#"
                UPDATE bundle_items
                SET distributed_price = $3
                WHERE bundle_id = $1 AND product_id = $2
                "#,
            )
            .bind(bundle_id)
            .bind(item.product_id)
            .bind(item.distributed_price)
            .execute(&mut *tx)
            .await?;
        }

        let result = sqlx::query("UPDATE bundles SET updated_at = NOW() WHERE id = $1")
            .bind(bundle_id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Bundle {} not found", bundle_id)));
        }

        tx.commit().await?;
        Ok(())
    }
}
