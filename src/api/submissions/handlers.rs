use axum::extract::State;
use axum::Json;

use crate::api::errors::ApiError;
use crate::api::guards::CurrentStudent;
use crate::api::taking::map_taking_error;
use crate::core::state::AppState;
use crate::schemas::taking::MySubmissionResponse;
use crate::services::exam_taking;

pub(super) async fn my_submissions(
    CurrentStudent(student): CurrentStudent,
    State(state): State<AppState>,
) -> Result<Json<Vec<MySubmissionResponse>>, ApiError> {
    let submissions =
        exam_taking::my_submissions(state.db(), &student).await.map_err(map_taking_error)?;
    Ok(Json(submissions))
}
