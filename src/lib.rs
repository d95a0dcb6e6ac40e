pub(crate) mod api;
pub(crate) mod core;
pub(crate) mod db;
pub(crate) mod repositories;
pub(crate) mod schemas;
pub(crate) mod services;

#[cfg(test)]
mod test_support;

use crate::core::{config::Settings, redis::RedisHandle, state::AppState, telemetry};

pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::load()?;
    telemetry::init_tracing(&settings)?;
    core::metrics::init(&settings)?;

    if settings.security().secret_key_generated {
        tracing::warn!("SECRET_KEY is not set; tokens are signed with a generated local key");
    }

    let db_pool = db::init_pool(&settings).await?;
    db::run_migrations(&db_pool).await?;
    let redis = connect_redis(&settings).await;

    let state = AppState::new(settings, db_pool, redis.clone());
    let addr = state.settings().server_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!(
        %addr,
        environment = state.settings().runtime().environment.as_str(),
        "ExamOnline API listening"
    );

    let served = axum::serve(listener, api::router::router(state))
        .with_graceful_shutdown(core::shutdown::shutdown_signal())
        .await;

    redis.disconnect().await;
    tracing::info!("Redis disconnected");

    served?;
    Ok(())
}

/// Redis is optional at runtime: without it draft saves are not throttled.
async fn connect_redis(settings: &Settings) -> RedisHandle {
    let redis = RedisHandle::new(settings.redis().redis_url());
    match redis.connect().await {
        Ok(()) => tracing::info!("Redis connected successfully"),
        Err(err) => {
            tracing::error!(error = %err, "Failed to connect to Redis; draft throttling disabled")
        }
    }
    redis
}
