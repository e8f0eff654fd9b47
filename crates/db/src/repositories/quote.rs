use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use quotebook_core::domain::quote::{timestamp_now, Quote, QuoteContent, QuoteId};

use super::{QuoteRepository, RepositoryError};
use crate::DbPool;

const SELECT_QUOTE: &str = "SELECT id, quote, author, created_at, modified_at FROM quote";

pub struct SqlQuoteRepository {
    pool: DbPool,
}

impl SqlQuoteRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

fn format_timestamp(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn parse_timestamp(column: &str, value: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Decode(format!("{column}: {e}")))
}

fn row_to_quote(row: &SqliteRow) -> Result<Quote, RepositoryError> {
    let id: String = row.try_get("id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let quote: String =
        row.try_get("quote").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let author: String =
        row.try_get("author").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let created_at_str: String =
        row.try_get("created_at").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let modified_at_str: Option<String> =
        row.try_get("modified_at").map_err(|e| RepositoryError::Decode(e.to_string()))?;

    let id = QuoteId::parse(&id).map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let created_at = parse_timestamp("created_at", &created_at_str)?;
    let modified_at =
        modified_at_str.map(|value| parse_timestamp("modified_at", &value)).transpose()?;

    Ok(Quote { id, quote, author, created_at, modified_at })
}

async fn insert_quote<'e, E>(executor: E, quote: &Quote) -> Result<(), RepositoryError>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    sqlx::query(
        "INSERT INTO quote (id, quote, author, created_at, modified_at)
         VALUES (?, ?, ?, ?, NULL)",
    )
    .bind(quote.id.as_str())
    .bind(&quote.quote)
    .bind(&quote.author)
    .bind(format_timestamp(quote.created_at))
    .execute(executor)
    .await?;

    Ok(())
}

#[async_trait::async_trait]
impl QuoteRepository for SqlQuoteRepository {
    async fn list_all(&self) -> Result<Vec<Quote>, RepositoryError> {
        let rows = sqlx::query(&format!("{SELECT_QUOTE} ORDER BY seq ASC"))
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(row_to_quote).collect()
    }

    async fn find_by_id(&self, id: &QuoteId) -> Result<Option<Quote>, RepositoryError> {
        let row = sqlx::query(&format!("{SELECT_QUOTE} WHERE id = ?"))
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(row_to_quote).transpose()
    }

    async fn create(&self, content: QuoteContent) -> Result<Quote, RepositoryError> {
        let quote = Quote::create(content, timestamp_now());
        insert_quote(&self.pool, &quote).await?;
        Ok(quote)
    }

    async fn update(
        &self,
        id: &QuoteId,
        content: QuoteContent,
    ) -> Result<Option<Quote>, RepositoryError> {
        // One statement, so concurrent edits queue on the write lock instead of
        // failing a read-to-write upgrade. Fixed-width RFC 3339 text orders
        // chronologically, which keeps `max()` valid.
        let row = sqlx::query(
            "UPDATE quote SET quote = ?, author = ?, modified_at = max(created_at, ?)
             WHERE id = ?
             RETURNING id, quote, author, created_at, modified_at",
        )
        .bind(&content.quote)
        .bind(&content.author)
        .bind(format_timestamp(timestamp_now()))
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_quote).transpose()
    }

    async fn delete(&self, id: &QuoteId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM quote WHERE id = ?")
            .bind(id.as_str())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_by_author(&self, needle: &str) -> Result<Vec<Quote>, RepositoryError> {
        // SQLite's lower() folds ASCII only, so matching happens here with the
        // same Unicode folding as every other adapter.
        let rows = sqlx::query(&format!("{SELECT_QUOTE} ORDER BY seq ASC"))
            .fetch_all(&self.pool)
            .await?;

        let mut matches = Vec::new();
        for row in &rows {
            let quote = row_to_quote(row)?;
            if quote.author_contains(needle) {
                matches.push(quote);
            }
        }
        Ok(matches)
    }

    async fn count(&self) -> Result<u64, RepositoryError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM quote").fetch_one(&self.pool).await?;
        Ok(count.max(0) as u64)
    }

    async fn insert_many(
        &self,
        contents: Vec<QuoteContent>,
    ) -> Result<Vec<Quote>, RepositoryError> {
        let created_at = timestamp_now();
        let quotes = contents
            .into_iter()
            .map(|content| Quote::create(content, created_at))
            .collect::<Vec<_>>();

        let mut tx = self.pool.begin().await?;
        for quote in &quotes {
            insert_quote(&mut *tx, quote).await?;
        }
        tx.commit().await?;

        Ok(quotes)
    }
}
