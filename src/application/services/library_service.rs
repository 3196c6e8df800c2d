//! Library Service
//!
//! Products a user owns.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{LibraryRepository, ProductRepository};
use crate::shared::error::AppError;

/// Library service trait
#[async_trait]
pub trait LibraryService: Send + Sync {
    /// List the user's owned products in acquisition order
    async fn list_library(&self, user_id: Uuid) -> Result<Vec<LibraryEntryDto>, LibraryError>;

    /// Whether the user owns a product
    async fn owns(&self, user_id: Uuid, product_id: Uuid) -> Result<bool, LibraryError>;
}

/// Library entry data transfer object
#[derive(Debug, Clone)]
pub struct LibraryEntryDto {
    pub product_id: Uuid,
    pub name: String,
    pub kind: String,
    pub order_id: Uuid,
    pub acquired_at: DateTime<Utc>,
}

/// Library service errors
#[derive(Debug, thiserror::Error)]
pub enum LibraryError {
    #[error(transparent)]
    Repository(#[from] AppError),
}

impl From<LibraryError> for AppError {
    fn from(err: LibraryError) -> Self {
        match err {
            LibraryError::Repository(e) => e,
        }
    }
}

/// LibraryService implementation
pub struct LibraryServiceImpl<L, P>
where
    L: LibraryRepository,
    P: ProductRepository,
{
    library_repo: Arc<L>,
    product_repo: Arc<P>,
}

impl<L, P> LibraryServiceImpl<L, P>
where
    L: LibraryRepository,
    P: ProductRepository,
{
    pub fn new(library_repo: Arc<L>, product_repo: Arc<P>) -> Self {
        Self {
            library_repo,
            product_repo,
        }
    }
}

#[async_trait]
impl<L, P> LibraryService for LibraryServiceImpl<L, P>
where
    L: LibraryRepository + 'static,
    P: ProductRepository + 'static,
{
    async fn list_library(&self, user_id: Uuid) -> Result<Vec<LibraryEntryDto>, LibraryError> {
        let entries = self.library_repo.find_by_user(user_id).await?;
        let product_ids: Vec<Uuid> = entries.iter().map(|e| e.product_id).collect();
        // Owned products stay listed after they leave the catalog.
        let products = self.product_repo.find_by_ids(&product_ids).await?;

        Ok(entries
            .into_iter()
            .map(|entry| {
                let product = products.iter().find(|p| p.id == entry.product_id);
                LibraryEntryDto {
                    product_id: entry.product_id,
                    name: product.map(|p| p.name.clone()).unwrap_or_default(),
                    kind: product
                        .map(|p| p.kind.as_str().to_string())
                        .unwrap_or_default(),
                    order_id: entry.order_id,
                    acquired_at: entry.acquired_at,
                }
            })
            .collect())
    }

    async fn owns(&self, user_id: Uuid, product_id: Uuid) -> Result<bool, LibraryError> {
        let owned = self
            .library_repo
            .owned_product_ids(user_id, &[product_id])
            .await?;
        Ok(!owned.is_empty())
    }
}
