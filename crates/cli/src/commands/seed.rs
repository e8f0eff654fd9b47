use crate::commands::{self, CommandResult, EXIT_MIGRATION};
use quotebook_db::{migrations, seed_if_empty, SeedOutcome, SqlQuoteRepository};

pub fn run() -> CommandResult {
    let config = match commands::load_config("seed") {
        Ok(config) => config,
        Err(result) => return result,
    };
    let runtime = match commands::runtime("seed") {
        Ok(runtime) => runtime,
        Err(result) => return result,
    };

    let result = runtime.block_on(async {
        let pool = commands::connect(&config).await?;

        let outcome = async {
            migrations::run_pending(&pool)
                .await
                .map_err(|error| ("migration", error.to_string(), EXIT_MIGRATION))?;
            let repository = SqlQuoteRepository::new(pool.clone());
            seed_if_empty(&repository)
                .await
                .map_err(|error| ("seed_execution", error.to_string(), EXIT_MIGRATION))
        }
        .await;

        pool.close().await;
        outcome
    });

    match result {
        Ok(outcome) => CommandResult::success("seed", describe(outcome)),
        Err(failure) => CommandResult::from_failure("seed", failure),
    }
}

fn describe(outcome: SeedOutcome) -> String {
    match outcome {
        SeedOutcome::Seeded(count) => format!("seeded {count} example quotes"),
        SeedOutcome::Skipped { existing } => {
            format!("store already holds {existing} quotes; nothing seeded")
        }
    }
}

#[cfg(test)]
mod tests {
    use quotebook_db::SeedOutcome;

    use super::describe;

    #[test]
    fn describes_both_outcomes() {
        assert_eq!(describe(SeedOutcome::Seeded(5)), "seeded 5 example quotes");
        assert_eq!(
            describe(SeedOutcome::Skipped { existing: 7 }),
            "store already holds 7 quotes; nothing seeded"
        );
    }
}
