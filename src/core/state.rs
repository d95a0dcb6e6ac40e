use std::sync::Arc;

use sqlx::PgPool;

use crate::core::{config::Settings, redis::RedisHandle};

/// Handles shared by every request. The pool and the Redis handle are
/// reference counted already, so only the settings need an `Arc`.
#[derive(Clone)]
pub(crate) struct AppState {
    settings: Arc<Settings>,
    db: PgPool,
    redis: RedisHandle,
}

impl AppState {
    pub(crate) fn new(settings: Settings, db: PgPool, redis: RedisHandle) -> Self {
        Self { settings: Arc::new(settings), db, redis }
    }

    pub(crate) fn settings(&self) -> &Settings {
        &self.settings
    }

    pub(crate) fn db(&self) -> &PgPool {
        &self.db
    }

    pub(crate) fn redis(&self) -> &RedisHandle {
        &self.redis
    }
}
