//! Discount Repository Implementation
//!
//! PostgreSQL implementation of the DiscountRepository trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use super::not_found_or_database;
use crate::domain::{Discount, DiscountRepository};
use crate::shared::error::AppError;

#[derive(Debug, sqlx::FromRow)]
struct DiscountRow {
    id: Uuid,
    product_id: Uuid,
    percent: Decimal,
    starts_at: DateTime<Utc>,
    ends_at: Option<DateTime<Utc>>,
    is_deleted: bool,
}

impl From<DiscountRow> for Discount {
    fn from(row: DiscountRow) -> Self {
        Discount {
            id: row.id,
            product_id: row.product_id,
            percent: row.percent,
            starts_at: row.starts_at,
            ends_at: row.ends_at,
            is_deleted: row.is_deleted,
        }
    }
}

/// PostgreSQL discount repository implementation.
#[derive(Clone)]
pub struct PgDiscountRepository {
    pool: PgPool,
}

impl PgDiscountRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DiscountRepository for PgDiscountRepository {
    async fn find_active_for_products(
        &self,
        product_ids: &[Uuid],
        now: DateTime<Utc>,
    ) -> Result<Vec<Discount>, AppError> {
        if product_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, DiscountRow>(
            r#"
            SELECT id, product_id, percent, starts_at, ends_at, is_deleted
            FROM discounts
            WHERE product_id = ANY($1)
              AND is_deleted = FALSE
              AND starts_at <= $2
              AND (ends_at IS NULL OR ends_at > $2)
            "#,
        )
        .bind(product_ids)
        .bind(now)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Discount::from).collect())
    }

    async fn create(&self, discount: &Discount) -> Result<Discount, AppError> {
        let row = sqlx::query_as::<_, DiscountRow>(
            r#"
            INSERT INTO discounts (id, product_id, percent, starts_at, ends_at, is_deleted)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, product_id, percent, starts_at, ends_at, is_deleted
            "#,
        )
        .bind(discount.id)
        .bind(discount.product_id)
        .bind(discount.percent)
        .bind(discount.starts_at)
        .bind(discount.ends_at)
        .bind(discount.is_deleted)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            not_found_or_database(e, || format!("Product {} not found", discount.product_id))
        })?;

        Ok(row.into())
    }
}
