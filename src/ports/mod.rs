//! Ports implemented by the storage adapters.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{NewTransaction, Transaction};

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// The transaction ledger.
///
/// Identity is assigned by the backing store from a single sequence, so
/// ids strictly increase with insertion order. Records are never updated
/// or deleted through this trait.
#[async_trait]
pub trait TransactionRepository: Send + Sync {
    /// Persists the record atomically and returns its assigned id.
    async fn insert(&self, tx: &NewTransaction) -> RepositoryResult<i64>;

    /// Point lookup. An unknown id is `Ok(None)`, not an error.
    async fn get_by_id(&self, id: i64) -> RepositoryResult<Option<Transaction>>;

    /// Up to `limit` most recently inserted records, highest id first.
    async fn list_recent(&self, limit: i64) -> RepositoryResult<Vec<Transaction>>;
}
