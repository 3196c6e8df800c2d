//! Cart Repository Implementation
//!
//! PostgreSQL implementation of the CartRepository trait.
//! A cart is loaded together with its `cart_items` rows.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use super::conflict_or_database;
use crate::domain::{Cart, CartItem, CartRepository, CartStatus};
use crate::shared::error::AppError;

#[derive(Debug, sqlx::FromRow)]
struct CartRow {
    id: Uuid,
    user_id: Uuid,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct CartItemRow {
    id: Uuid,
    cart_id: Uuid,
    product_id: Uuid,
    bundle_id: Option<Uuid>,
    price: Decimal,
    added_at: DateTime<Utc>,
}

impl CartRow {
    fn into_cart(self, items: Vec<CartItem>) -> Cart {
        Cart {
            id: self.id,
            user_id: self.user_id,
            status: CartStatus::from_str(&self.status),
            items,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl From<CartItemRow> for CartItem {
    fn from(row: CartItemRow) -> Self {
        CartItem {
            id: row.id,
            cart_id: row.cart_id,
            product_id: row.product_id,
            bundle_id: row.bundle_id,
            price: row.price,
            added_at: row.added_at,
        }
    }
}

/// PostgreSQL cart repository implementation.
#[derive(Clone)]
pub struct PgCartRepository {
    pool: PgPool,
}

impl PgCartRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn load_items(&self, cart_id: Uuid) -> Result<Vec<CartItem>, AppError> {
        let rows = sqlx::query_as::<_, CartItemRow>(
            r#"
            SELECT id, cart_id, product_id, bundle_id, price, added_at
            FROM cart_items
            WHERE cart_id = $1
            ORDER BY added_at, id
            "#,
        )
        .bind(cart_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(CartItem::from).collect())
    }

    async fn with_items(&self, row: Option<CartRow>) -> Result<Option<Cart>, AppError> {
        match row {
            Some(row) => {
                let items = self.load_items(row.id).await?;
                Ok(Some(row.into_cart(items)))
            }
            None => Ok(None),
        }
    }

    async fn touch(&self, cart_id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE carts SET updated_at = NOW() WHERE id = $1")
            .bind(cart_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Cart {} not found", cart_id)));
        }
        Ok(())
    }
}

#[async_trait]
impl CartRepository for PgCartRepository {
    async fn find_active_by_user(&self, user_id: Uuid) -> Result<Option<Cart>, AppError> {
        let row = sqlx::query_as::<_, CartRow>(
            r#"
            SELECT id, user_id, status, created_at, updated_at
            FROM carts
            WHERE user_id = $1 AND status = 'active'
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        self.with_items(row).await
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Cart>, AppError> {
        let row = sqlx::query_as::<_, CartRow>(
            r#"
            SELECT id, user_id, status, created_at, updated_at
            FROM carts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        self.with_items(row).await
    }

    async fn create(&self, cart: &Cart) -> Result<Cart, AppError> {
        let row = sqlx::query_as::<_, CartRow>(
            r#"
            INSERT INTO carts (id, user_id, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, status, created_at, updated_at
            "#,
        )
        .bind(cart.id)
        .bind(cart.user_id)
        .bind(cart.status.as_str())
        .bind(cart.created_at)
        .bind(cart.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            conflict_or_database(e, || {
                format!("User {} already has an active cart", cart.user_id)
            })
        })?;

        Ok(row.into_cart(Vec::new()))
    }

    async fn add_items(&self, cart_id: Uuid, items: &[CartItem]) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        for item in items {
            sqlx::query(
                r#"
                INSERT INTO cart_items (id, cart_id, product_id, bundle_id, price, added_at)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(item.id)
            .bind(cart_id)
            .bind(item.product_id)
            .bind(item.bundle_id)
            .bind(item.price)
            .bind(item.added_at)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                conflict_or_database(e, || {
                    format!("Product {} is already in the cart", item.product_id)
                })
            })?;
        }

        sqlx::query("UPDATE carts SET updated_at = NOW() WHERE id = $1")
            .bind(cart_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn update_item_prices(
        &self,
        cart_id: Uuid,
        prices: &[(Uuid, Decimal)],
    ) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        for (item_id, price) in prices {
            sqlx::query("UPDATE cart_items SET price = $3 WHERE cart_id = $1 AND id = $2")
                .bind(cart_id)
                .bind(item_id)
                .bind(price)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        self.touch(cart_id).await
    }

    async fn remove_items(&self, cart_id: Uuid, item_ids: &[Uuid]) -> Result<(), AppError> {
        sqlx::query("DELETE FROM cart_items WHERE cart_id = $1 AND id = ANY($2)")
            .bind(cart_id)
            .bind(item_ids)
            .execute(&self.pool)
            .await?;

        self.touch(cart_id).await
    }

    async fn clear(&self, cart_id: Uuid) -> Result<(), AppError> {
        sqlx::query("DELETE FROM cart_items WHERE cart_id = $1")
            .bind(cart_id)
            .execute(&self.pool)
            .await?;

        self.touch(cart_id).await
    }

    async fn set_status(&self, cart_id: Uuid, status: CartStatus) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE carts SET status = $2, updated_at = NOW() WHERE id = $1")
            .bind(cart_id)
            .bind(status.as_str())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Cart {} not found", cart_id)));
        }
        Ok(())
    }
}
