pub(crate) mod models;
pub(crate) mod types;

use std::time::Duration;

use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{ConnectOptions, PgPool};

use crate::core::config::Settings;

pub(crate) async fn init_pool(settings: &Settings) -> Result<PgPool, sqlx::Error> {
    let database = settings.database();
    let connect_options = database
        .database_url()
        .parse::<PgConnectOptions>()?
        .application_name("examonline-rust")
        .log_statements(tracing::log::LevelFilter::Off);

    PgPoolOptions::new()
        .max_connections(database.max_connections)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(database.acquire_timeout_seconds))
        .test_before_acquire(true)
        .connect_with(connect_options)
        .await
}

/// Applies the embedded `migrations/` directory.
pub(crate) async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
    let migrator = sqlx::migrate!("./migrations");
    migrator.run(pool).await?;
    tracing::info!(migrations = migrator.iter().count(), "Database schema is up to date");
    Ok(())
}
