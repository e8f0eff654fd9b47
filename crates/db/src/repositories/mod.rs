use async_trait::async_trait;
use thiserror::Error;

use quotebook_core::domain::quote::{Quote, QuoteContent, QuoteId};
use quotebook_core::errors::ApplicationError;

pub mod memory;
pub mod quote;

pub use memory::InMemoryQuoteRepository;
pub use quote::SqlQuoteRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
}

impl From<RepositoryError> for ApplicationError {
    fn from(value: RepositoryError) -> Self {
        ApplicationError::StoreUnavailable(value.to_string())
    }
}

/// Persistence seam for quotes. Implementations are the only writers of
/// durable quote state.
#[async_trait]
pub trait QuoteRepository: Send + Sync {
    /// Every stored quote in insertion order.
    async fn list_all(&self) -> Result<Vec<Quote>, RepositoryError>;

    /// `Ok(None)` when no record carries `id`.
    async fn find_by_id(&self, id: &QuoteId) -> Result<Option<Quote>, RepositoryError>;

    async fn create(&self, content: QuoteContent) -> Result<Quote, RepositoryError>;

    /// Overwrites an existing record; never inserts. `Ok(None)` when absent.
    async fn update(
        &self,
        id: &QuoteId,
        content: QuoteContent,
    ) -> Result<Option<Quote>, RepositoryError>;

    /// Returns whether a record was removed. Unknown ids are not an error.
    async fn delete(&self, id: &QuoteId) -> Result<bool, RepositoryError>;

    /// Case-insensitive literal substring match on `author`.
    async fn find_by_author(&self, needle: &str) -> Result<Vec<Quote>, RepositoryError>;

    async fn count(&self) -> Result<u64, RepositoryError>;

    async fn insert_many(
        &self,
        contents: Vec<QuoteContent>,
    ) -> Result<Vec<Quote>, RepositoryError>;
}
