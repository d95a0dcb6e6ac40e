use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::Json;
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::CurrentStudent;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::schemas::taking::{
    AvailableExamsResponse, DraftSavedResponse, ExamInfoResponse, ExamResultResponse,
    ExamStatusResponse, SaveAnswerRequest, SaveDraftRequest, StartExamResponse,
    SubmitExamResponse, SubmitRequest,
};
use crate::services::exam_taking::{self, TakingError};

pub(super) async fn available_exams(
    CurrentStudent(student): CurrentStudent,
    State(state): State<AppState>,
) -> Result<Json<AvailableExamsResponse>, ApiError> {
    let response = exam_taking::available_exams(state.db(), &student, primitive_now_utc())
        .await
        .map_err(map_taking_error)?;
    Ok(Json(response))
}

pub(super) async fn exam_info(
    Path(exam_id): Path<i64>,
    CurrentStudent(student): CurrentStudent,
    State(state): State<AppState>,
) -> Result<Json<ExamInfoResponse>, ApiError> {
    let response =
        exam_taking::exam_info(state.db(), &student, exam_id).await.map_err(map_taking_error)?;
    Ok(Json(response))
}

pub(super) async fn start_exam(
    Path(exam_id): Path<i64>,
    CurrentStudent(student): CurrentStudent,
    State(state): State<AppState>,
) -> Result<Json<StartExamResponse>, ApiError> {
    let response = exam_taking::start_exam(state.db(), &student, exam_id, primitive_now_utc())
        .await
        .map_err(map_taking_error)?;
    Ok(Json(response))
}

pub(super) async fn save_draft(
    Path(exam_id): Path<i64>,
    CurrentStudent(student): CurrentStudent,
    State(state): State<AppState>,
    Json(payload): Json<SaveDraftRequest>,
) -> Result<Json<DraftSavedResponse>, ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let response =
        exam_taking::save_draft(&state, &student, exam_id, payload.answers, primitive_now_utc())
            .await
            .map_err(map_taking_error)?;
    Ok(Json(response))
}

pub(super) async fn save_answer(
    Path(exam_id): Path<i64>,
    CurrentStudent(student): CurrentStudent,
    State(state): State<AppState>,
    Json(payload): Json<SaveAnswerRequest>,
) -> Result<Json<DraftSavedResponse>, ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let response =
        exam_taking::save_answer(&state, &student, exam_id, payload, primitive_now_utc())
            .await
            .map_err(map_taking_error)?;
    Ok(Json(response))
}

/// The body is optional: an empty body submits no answers, which lets a
/// late submit fall back to the saved draft.
pub(super) async fn submit_exam(
    Path(exam_id): Path<i64>,
    CurrentStudent(student): CurrentStudent,
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<SubmitExamResponse>, ApiError> {
    let payload = if body.iter().all(u8::is_ascii_whitespace) {
        SubmitRequest::default()
    } else {
        serde_json::from_slice::<SubmitRequest>(&body)
            .map_err(|e| ApiError::BadRequest(format!("Invalid submit payload: {e}")))?
    };
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let answers = payload.answers.into_iter().map(Into::into).collect();
    let response = exam_taking::submit_exam(state.db(), &student, exam_id, answers, primitive_now_utc())
        .await
        .map_err(map_taking_error)?;
    Ok(Json(response))
}

pub(super) async fn exam_status(
    Path(exam_id): Path<i64>,
    CurrentStudent(student): CurrentStudent,
    State(state): State<AppState>,
) -> Result<Json<ExamStatusResponse>, ApiError> {
    let response = exam_taking::exam_status(state.db(), &student, exam_id, primitive_now_utc())
        .await
        .map_err(map_taking_error)?;
    Ok(Json(response))
}

pub(super) async fn exam_result(
    Path(exam_id): Path<i64>,
    CurrentStudent(student): CurrentStudent,
    State(state): State<AppState>,
) -> Result<Json<ExamResultResponse>, ApiError> {
    let response =
        exam_taking::exam_result(state.db(), &student, exam_id).await.map_err(map_taking_error)?;
    Ok(Json(response))
}

pub(crate) fn map_taking_error(error: TakingError) -> ApiError {
    match error {
        TakingError::ExamNotFound
        | TakingError::PaperNotFound
        | TakingError::SubmissionNotFound => ApiError::NotFound(error.to_string()),
        TakingError::NotEnrolled => ApiError::Forbidden("Not enrolled in this examination"),
        TakingError::RateLimited => ApiError::TooManyRequests("Draft save rate limit exceeded"),
        TakingError::Precondition(precondition) => ApiError::Precondition {
            code: precondition.code(),
            detail: precondition.detail().to_string(),
        },
        TakingError::Ledger(err) => ApiError::internal(err, "Exam attempt is in an invalid state"),
        TakingError::Database(err) => ApiError::internal(err, "Failed to process exam request"),
    }
}
