use async_trait::async_trait;
use thiserror::Error;

use crate::models::Order;

#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The `orders.barcode` unique constraint rejected the write. The
    /// constraint is the authority on uniqueness; the read-time pre-check
    /// only filters candidates during generation.
    #[error("barcode already stored: {0}")]
    DuplicateBarcode(String),

    #[error("storage failure: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Repository trait for order persistence
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Insert a fully approved order. Exactly one row per successful
    /// workflow run; a barcode collision at write time surfaces as
    /// [`RepositoryError::DuplicateBarcode`].
    async fn insert_order(&self, order: &Order) -> Result<(), RepositoryError>;

    /// Whether any persisted order already uses this barcode.
    async fn barcode_exists(&self, barcode: &str) -> Result<bool, RepositoryError>;
}
