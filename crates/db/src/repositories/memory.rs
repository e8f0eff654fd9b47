use tokio::sync::RwLock;

use quotebook_core::domain::quote::{timestamp_now, Quote, QuoteContent, QuoteId};

use super::{QuoteRepository, RepositoryError};

/// Vector-backed store; order of the vector is insertion order.
#[derive(Default)]
pub struct InMemoryQuoteRepository {
    quotes: RwLock<Vec<Quote>>,
}

impl InMemoryQuoteRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl QuoteRepository for InMemoryQuoteRepository {
    async fn list_all(&self) -> Result<Vec<Quote>, RepositoryError> {
        Ok(self.quotes.read().await.clone())
    }

    async fn find_by_id(&self, id: &QuoteId) -> Result<Option<Quote>, RepositoryError> {
        let quotes = self.quotes.read().await;
        Ok(quotes.iter().find(|quote| &quote.id == id).cloned())
    }

    async fn create(&self, content: QuoteContent) -> Result<Quote, RepositoryError> {
        let quote = Quote::create(content, timestamp_now());
        self.quotes.write().await.push(quote.clone());
        Ok(quote)
    }

    async fn update(
        &self,
        id: &QuoteId,
        content: QuoteContent,
    ) -> Result<Option<Quote>, RepositoryError> {
        let mut quotes = self.quotes.write().await;
        Ok(quotes.iter_mut().find(|quote| &quote.id == id).map(|quote| {
            quote.apply_edit(content, timestamp_now());
            quote.clone()
        }))
    }

    async fn delete(&self, id: &QuoteId) -> Result<bool, RepositoryError> {
        let mut quotes = self.quotes.write().await;
        let before = quotes.len();
        quotes.retain(|quote| &quote.id != id);
        Ok(quotes.len() != before)
    }

    async fn find_by_author(&self, needle: &str) -> Result<Vec<Quote>, RepositoryError> {
        let quotes = self.quotes.read().await;
        Ok(quotes.iter().filter(|quote| quote.author_contains(needle)).cloned().collect())
    }

    async fn count(&self) -> Result<u64, RepositoryError> {
        Ok(self.quotes.read().await.len() as u64)
    }

    async fn insert_many(
        &self,
        contents: Vec<QuoteContent>,
    ) -> Result<Vec<Quote>, RepositoryError> {
        let created_at = timestamp_now();
        let inserted = contents
            .into_iter()
            .map(|content| Quote::create(content, created_at))
            .collect::<Vec<_>>();
        self.quotes.write().await.extend(inserted.iter().cloned());
        Ok(inserted)
    }
}

#[cfg(test)]
mod tests {
    use quotebook_core::domain::quote::{QuoteContent, QuoteId};

    use crate::repositories::{InMemoryQuoteRepository, QuoteRepository};

    #[tokio::test]
    async fn create_then_find_returns_stored_record() {
        let repo = InMemoryQuoteRepository::new();

        let created = repo.create(QuoteContent::new("Test", "Ada")).await.expect("create");
        let found = repo.find_by_id(&created.id).await.expect("find");

        assert_eq!(found, Some(created.clone()));
        assert!(created.modified_at.is_none());
    }

    #[tokio::test]
    async fn update_of_unknown_id_does_not_insert() {
        let repo = InMemoryQuoteRepository::new();

        let updated =
            repo.update(&QuoteId::generate(), QuoteContent::new("x", "y")).await.expect("update");

        assert!(updated.is_none());
        assert_eq!(repo.count().await.expect("count"), 0);
    }

    #[tokio::test]
    async fn update_stamps_modified_at() {
        let repo = InMemoryQuoteRepository::new();
        let created = repo.create(QuoteContent::new("Draft", "Ada")).await.expect("create");

        let updated = repo
            .update(&created.id, QuoteContent::new("Final", "Ada Lovelace"))
            .await
            .expect("update")
            .expect("record exists");

        assert_eq!(updated.quote, "Final");
        assert_eq!(updated.author, "Ada Lovelace");
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.modified_at.is_some_and(|at| at >= created.created_at));
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let repo = InMemoryQuoteRepository::new();
        let created = repo.create(QuoteContent::new("Gone", "Ada")).await.expect("create");

        assert!(repo.delete(&created.id).await.expect("first delete"));
        assert!(!repo.delete(&created.id).await.expect("second delete"));
        assert_eq!(repo.find_by_id(&created.id).await.expect("find"), None);
    }

    #[tokio::test]
    async fn find_by_author_matches_substring_in_insertion_order() {
        let repo = InMemoryQuoteRepository::new();
        repo.insert_many(vec![
            QuoteContent::new("one", "Winston Churchill"),
            QuoteContent::new("two", "Mark Twain"),
            QuoteContent::new("three", "winston churchill"),
        ])
        .await
        .expect("insert");

        let found = repo.find_by_author("CHURCHILL").await.expect("search");

        let texts = found.iter().map(|quote| quote.quote.as_str()).collect::<Vec<_>>();
        assert_eq!(texts, vec!["one", "three"]);
    }

    #[tokio::test]
    async fn find_by_author_folds_non_ascii_case() {
        let repo = InMemoryQuoteRepository::new();
        repo.create(QuoteContent::new("L'art, c'est la vie.", "Émile Zola")).await.expect("create");

        let found = repo.find_by_author("émile").await.expect("search");

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].author, "Émile Zola");
    }
}
