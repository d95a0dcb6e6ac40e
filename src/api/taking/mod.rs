mod handlers;

use axum::{routing::get, routing::post, Router};

use crate::core::state::AppState;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/available", get(handlers::available_exams))
        .route("/:exam_id/info", get(handlers::exam_info))
        .route("/:exam_id/start", post(handlers::start_exam))
        .route("/:exam_id/save-draft", post(handlers::save_draft))
        .route("/:exam_id/save-answer", post(handlers::save_answer))
        .route("/:exam_id/submit", post(handlers::submit_exam))
        .route("/:exam_id/status", get(handlers::exam_status))
        .route("/:exam_id/result", get(handlers::exam_result))
}

pub(crate) use handlers::map_taking_error;
