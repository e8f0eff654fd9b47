use std::sync::Arc;

use axum::http::HeaderValue;
use axum::Router;
use quotebook_core::config::{AppConfig, ConfigError, CorsConfig, LoadOptions};
use quotebook_db::{
    connect_with_settings, migrations, seed_if_empty, DbPool, QuoteRepository, RepositoryError,
    SeedOutcome, SqlQuoteRepository,
};
use thiserror::Error;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::{api, health, openapi};

pub struct Application {
    pub config: AppConfig,
    pub db_pool: DbPool,
    pub repository: Arc<dyn QuoteRepository>,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database connection failed: {0}")]
    DatabaseConnect(#[source] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),
    #[error("seeding example quotes failed: {0}")]
    Seed(#[source] RepositoryError),
}

pub async fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config).await
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );

    let db_pool = connect_with_settings(
        &config.database.url,
        config.database.max_connections,
        config.database.timeout_secs,
    )
    .await
    .map_err(BootstrapError::DatabaseConnect)?;
    info!(
        event_name = "system.bootstrap.database_connected",
        correlation_id = "bootstrap",
        "database connection established"
    );

    migrations::run_pending(&db_pool).await.map_err(BootstrapError::Migration)?;
    info!(
        event_name = "system.bootstrap.migrations_applied",
        correlation_id = "bootstrap",
        "database migrations applied"
    );

    let repository: Arc<dyn QuoteRepository> =
        Arc::new(SqlQuoteRepository::new(db_pool.clone()));

    if config.seed.enabled {
        match seed_if_empty(repository.as_ref()).await.map_err(BootstrapError::Seed)? {
            SeedOutcome::Seeded(count) => info!(
                event_name = "system.bootstrap.seeded",
                correlation_id = "bootstrap",
                count,
                "example quotes inserted into empty store"
            ),
            SeedOutcome::Skipped { existing } => info!(
                event_name = "system.bootstrap.seed_skipped",
                correlation_id = "bootstrap",
                existing,
                "store already holds quotes; seeding skipped"
            ),
        }
    }

    Ok(Application { config, db_pool, repository })
}

pub fn build_router(app: &Application) -> Router {
    api::router(app.repository.clone())
        .merge(health::router(app.db_pool.clone()))
        .merge(openapi::router())
        .layer(cors_layer(&app.config.cors))
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(cors: &CorsConfig) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if cors.allows_any_origin() {
        return layer.allow_origin(Any);
    }

    let origins = cors
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(
                    event_name = "system.bootstrap.cors_origin_ignored",
                    origin = %origin,
                    "ignoring CORS origin that is not a valid header value"
                );
                None
            }
        })
        .collect::<Vec<_>>();
    layer.allow_origin(origins)
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use quotebook_core::config::{AppConfig, ConfigOverrides, LoadOptions};
    use quotebook_db::{QuoteRepository, SEED_QUOTES};
    use tower::ServiceExt;

    use super::{bootstrap, bootstrap_with_config, build_router, BootstrapError};

    fn memory_config(seed: bool) -> AppConfig {
        let mut config = AppConfig::default();
        config.database.url = "sqlite::memory:".to_string();
        config.seed.enabled = seed;
        config
    }

    #[tokio::test]
    async fn bootstrap_migrates_and_seeds_empty_store() {
        let app = bootstrap_with_config(memory_config(true)).await.expect("bootstrap");

        assert_eq!(app.repository.count().await.expect("count"), SEED_QUOTES.len() as u64);

        app.db_pool.close().await;
    }

    #[tokio::test]
    async fn bootstrap_leaves_store_empty_when_seeding_disabled() {
        let app = bootstrap_with_config(memory_config(false)).await.expect("bootstrap");

        assert_eq!(app.repository.count().await.expect("count"), 0);

        app.db_pool.close().await;
    }

    #[tokio::test]
    async fn bootstrap_rejects_non_sqlite_url() {
        let options = LoadOptions {
            overrides: ConfigOverrides {
                database_url: Some("postgres://localhost/quotes".to_string()),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        };

        let result = bootstrap(options).await;

        assert!(matches!(result, Err(BootstrapError::Config(_))));
    }

    #[tokio::test]
    async fn router_serves_quotes_health_and_docs() {
        let app = bootstrap_with_config(memory_config(true)).await.expect("bootstrap");
        let router = build_router(&app);

        for uri in ["/quote/", "/quote", "/health", "/api-docs/openapi.json", "/api-docs/"] {
            let request = Request::builder().uri(uri).body(Body::empty()).expect("request");
            let response = router.clone().oneshot(request).await.expect("response");
            assert_eq!(response.status(), StatusCode::OK, "GET {uri}");
        }

        app.db_pool.close().await;
    }

    #[tokio::test]
    async fn router_answers_cross_origin_requests() {
        let app = bootstrap_with_config(memory_config(false)).await.expect("bootstrap");
        let router = build_router(&app);

        let request = Request::builder()
            .uri("/quote/")
            .header(header::ORIGIN, "http://example.com")
            .body(Body::empty())
            .expect("request");
        let response = router.oneshot(request).await.expect("response");

        assert_eq!(
            response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).map(|v| v.as_bytes()),
            Some(&b"*"[..])
        );

        app.db_pool.close().await;
    }
}
