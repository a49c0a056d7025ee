use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{PgPool, SqlitePool};
use tracing::info;

use crate::config::Config;
use crate::domain::ports::{BookingRepository, ServiceRepository};
use crate::domain::services::availability::AvailabilityResolver;
use crate::domain::services::lifecycle::BookingLifecycle;
use crate::infra::cache::AvailabilityCache;
use crate::infra::notify::http_notifier::HttpNotifier;
use crate::infra::repositories::{
    postgres_booking_repo::PostgresBookingRepo, postgres_service_repo::PostgresServiceRepo,
    sqlite_booking_repo::SqliteBookingRepo, sqlite_service_repo::SqliteServiceRepo,
};
use crate::state::AppState;

pub async fn bootstrap_state(config: &Config) -> AppState {
    let database_url = &config.database_url;

    let notifier = Arc::new(HttpNotifier::new(
        config.notify_url.clone(),
        config.notify_token.clone(),
    ));

    let (service_repo, booking_repo): (Arc<dyn ServiceRepository>, Arc<dyn BookingRepository>) =
        if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
            info!("Initializing PostgreSQL connection...");

            let pool = PgPoolOptions::new()
                .max_connections(10)
                .connect(database_url)
                .await
                .expect("Failed to connect to Postgres");

            run_postgres_migrations(&pool).await;

            (
                Arc::new(PostgresServiceRepo::new(pool.clone())),
                Arc::new(PostgresBookingRepo::new(pool)),
            )
        } else {
            info!("Initializing SQLite connection with WAL Mode...");

            let opts = SqliteConnectOptions::from_str(database_url)
                .expect("Invalid SQLite connection string")
                .create_if_missing(true)
                .journal_mode(SqliteJournalMode::Wal)
                .busy_timeout(Duration::from_secs(5));

            let pool = SqlitePoolOptions::new()
                .max_connections(5)
                .connect_with(opts)
                .await
                .expect("Failed to connect to SQLite");

            run_sqlite_migrations(&pool).await;

            (
                Arc::new(SqliteServiceRepo::new(pool.clone())),
                Arc::new(SqliteBookingRepo::new(pool)),
            )
        };

    let cache = AvailabilityCache::new(Duration::from_secs(config.cache_ttl_secs));

    let resolver = Arc::new(AvailabilityResolver::new(
        service_repo.clone(),
        booking_repo.clone(),
        cache.clone(),
    ));

    let lifecycle = Arc::new(BookingLifecycle::new(
        service_repo.clone(),
        booking_repo.clone(),
        cache.clone(),
        notifier.clone(),
    ));

    AppState {
        config: config.clone(),
        service_repo,
        booking_repo,
        notifier,
        cache,
        resolver,
        lifecycle,
    }
}

async fn run_postgres_migrations(pool: &PgPool) {
    sqlx::migrate!("./migrations/postgres")
        .run(pool)
        .await
        .expect("Failed to run Postgres migrations");
}

async fn run_sqlite_migrations(pool: &SqlitePool) {
    sqlx::migrate!("./migrations/sqlite")
        .run(pool)
        .await
        .expect("Failed to run SQLite migrations");
}
