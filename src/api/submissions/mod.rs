mod handlers;

use axum::{routing::get, Router};

use crate::core::state::AppState;

pub(crate) fn router() -> Router<AppState> {
    Router::new().route("/my", get(handlers::my_submissions))
}
