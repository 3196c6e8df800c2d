//! Library Repository Implementation
//!
//! PostgreSQL implementation of the LibraryRepository trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{LibraryEntry, LibraryRepository};
use crate::shared::error::AppError;

#[derive(Debug, sqlx::FromRow)]
struct LibraryEntryRow {
    user_id: Uuid,
    product_id: Uuid,
    order_id: Uuid,
    acquired_at: DateTime<Utc>,
}

impl From<LibraryEntryRow> for LibraryEntry {
    fn from(row: LibraryEntryRow) -> Self {
        LibraryEntry {
            user_id: row.user_id,
            product_id: row.product_id,
            order_id: row.order_id,
            acquired_at: row.acquired_at,
        }
    }
}

/// PostgreSQL library repository implementation.
#[derive(Clone)]
pub struct PgLibraryRepository {
    pool: PgPool,
}

impl PgLibraryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LibraryRepository for PgLibraryRepository {
    async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<LibraryEntry>, AppError> {
        let rows = sqlx::query_as::<_, LibraryEntryRow>(
            r#"
            SELECT user_id, product_id, order_id, acquired_at
            FROM library_entries
            WHERE user_id = $1
            ORDER BY acquired_at, product_id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(LibraryEntry::from).collect())
    }

    async fn owned_product_ids(
        &self,
        user_id: Uuid,
        product_ids: &[Uuid],
    ) -> Result<Vec<Uuid>, AppError> {
        if product_ids.is_empty() {
            return Ok(Vec::new());
        }

        let owned = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT product_id
            FROM library_entries
            WHERE user_id = $1 AND product_id = ANY($2)
            "#,
        )
        .bind(user_id)
        .bind(product_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(owned)
    }

    async fn add_entries(&self, entries: &[LibraryEntry]) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        for entry in entries {
            sqlx::query(
                r#"
                INSERT INTO library_entries (user_id, product_id, order_id, acquired_at)
                VALUES ($1, $2, $3, $4)
                ON CONFLICT (user_id, product_id) DO NOTHING
                "#,
            )
            .bind(entry.user_id)
            .bind(entry.product_id)
            .bind(entry.order_id)
            .bind(entry.acquired_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}
