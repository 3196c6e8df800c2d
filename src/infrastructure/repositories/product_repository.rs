//! Product Repository Implementation
//!
//! PostgreSQL implementation of the ProductRepository trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use super::conflict_or_database;
use crate::domain::{Product, ProductKind, ProductRepository};
use crate::shared::error::AppError;

/// Database row representation matching the products table schema.
#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: Uuid,
    name: String,
    kind: String,
    base_price: Decimal,
    base_game_id: Option<Uuid>,
    is_deleted: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ProductRow {
    fn into_product(self) -> Product {
        Product {
            id: self.id,
            name: self.name,
            kind: ProductKind::from_str(&self.kind),
            base_price: self.base_price,
            base_game_id: self.base_game_id,
            is_deleted: self.is_deleted,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// PostgreSQL product repository implementation.
#[derive(Clone)]
pub struct PgProductRepository {
    pool: PgPool,
}

impl PgProductRepository {
    /// Create a new PgProductRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductRepository for PgProductRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, AppError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r#"
            SELECT id, name, kind, base_price, base_game_id, is_deleted, created_at, updated_at
            FROM products
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into_product()))
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Product>, AppError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, ProductRow>(
            r#"
            SELECT id, name, kind, base_price, base_game_id, is_deleted, created_at, updated_at
            FROM products
            WHERE id = ANY($1)
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into_product()).collect())
    }

    async fn create(&self, product: &Product) -> Result<Product, AppError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r#"
            INSERT INTO products (id, name, kind, base_price, base_game_id, is_deleted, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, name, kind, base_price, base_game_id, is_deleted, created_at, updated_at
            "#,
        )
        .bind(product.id)
        .bind(&product.name)
        .bind(product.kind.as_str())
        .bind(product.base_price)
        .bind(product.base_game_id)
        .bind(product.is_deleted)
        .bind(product.created_at)
        .bind(product.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            conflict_or_database(e, || format!("Product {} already exists", product.id))
        })?;

        Ok(row.into_product())
    }
}
