use quotebook_core::domain::quote::QuoteContent;

use crate::repositories::{QuoteRepository, RepositoryError};

/// `(author, quote)` pairs inserted into an empty store.
pub const SEED_QUOTES: &[(&str, &str)] = &[
    ("Mark Twain", "There are three kinds of lies: Lies, Damned Lies, and Statistics."),
    ("Winston Churchill", "If you're going through Hell, keep going."),
    (
        "Winston Churchill",
        "Tact is the ability to tell someone to go to hell in such a way that they look forward to the trip.",
    ),
    ("Tim Notke", "Hard work beats talent when talent doesn't work hard."),
    (
        "Winston Churchill",
        "Success is not final, failure is not fatal: it is the courage to continue that counts.",
    ),
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SeedOutcome {
    Seeded(usize),
    Skipped { existing: u64 },
}

pub fn seed_contents() -> Vec<QuoteContent> {
    SEED_QUOTES.iter().map(|(author, quote)| QuoteContent::new(*quote, *author)).collect()
}

/// Populates the example set when the store holds no quotes at all.
///
/// The emptiness check and the insert are separate calls; two processes
/// seeding the same store concurrently can both insert.
pub async fn seed_if_empty(repo: &dyn QuoteRepository) -> Result<SeedOutcome, RepositoryError> {
    let existing = repo.count().await?;
    if existing > 0 {
        return Ok(SeedOutcome::Skipped { existing });
    }

    let inserted = repo.insert_many(seed_contents()).await?;
    Ok(SeedOutcome::Seeded(inserted.len()))
}

#[cfg(test)]
mod tests {
    use quotebook_core::domain::quote::QuoteContent;

    use super::{seed_if_empty, SeedOutcome, SEED_QUOTES};
    use crate::repositories::{InMemoryQuoteRepository, QuoteRepository, SqlQuoteRepository};
    use crate::{connect_with_settings, migrations};

    #[tokio::test]
    async fn seeds_empty_store_exactly_once() {
        let repo = InMemoryQuoteRepository::new();

        let first = seed_if_empty(&repo).await.expect("first seed");
        let second = seed_if_empty(&repo).await.expect("second seed");

        assert_eq!(first, SeedOutcome::Seeded(SEED_QUOTES.len()));
        assert_eq!(second, SeedOutcome::Skipped { existing: SEED_QUOTES.len() as u64 });
        assert_eq!(repo.count().await.expect("count"), SEED_QUOTES.len() as u64);
    }

    #[tokio::test]
    async fn skips_store_with_any_record() {
        let repo = InMemoryQuoteRepository::new();
        repo.create(QuoteContent::new("Mine", "Me")).await.expect("create");

        let outcome = seed_if_empty(&repo).await.expect("seed");

        assert_eq!(outcome, SeedOutcome::Skipped { existing: 1 });
        assert_eq!(repo.count().await.expect("count"), 1);
    }

    #[tokio::test]
    async fn seeded_sql_store_keeps_seed_order_and_supports_author_search() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");
        let repo = SqlQuoteRepository::new(pool.clone());

        seed_if_empty(&repo).await.expect("seed");

        let authors = repo
            .list_all()
            .await
            .expect("list")
            .into_iter()
            .map(|quote| quote.author)
            .collect::<Vec<_>>();
        let expected =
            SEED_QUOTES.iter().map(|(author, _)| author.to_string()).collect::<Vec<_>>();
        assert_eq!(authors, expected);

        let churchill = repo.find_by_author("churchill").await.expect("search");
        assert_eq!(churchill.len(), 3);
        assert!(churchill.iter().all(|quote| quote.author == "Winston Churchill"));

        pool.close().await;
    }

    #[test]
    fn seed_texts_carry_no_stray_quotation_marks() {
        for (author, quote) in SEED_QUOTES {
            assert!(
                !quote.contains(['\u{201c}', '\u{201d}', '"']),
                "seed quote by {author} has a stray quotation mark"
            );
        }
        let twain = SEED_QUOTES
            .iter()
            .find(|(author, _)| *author == "Mark Twain")
            .map(|(_, quote)| *quote);
        assert_eq!(
            twain,
            Some("There are three kinds of lies: Lies, Damned Lies, and Statistics.")
        );
    }
}
