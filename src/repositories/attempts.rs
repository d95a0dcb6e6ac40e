use sqlx::types::Json;
use sqlx::PgPool;
use time::PrimitiveDateTime;

use crate::db::models::ExamAttempt;

pub(crate) const COLUMNS: &str = "\
    id, exam_id, student_id, test_paper_id, started_at, submitted_at, is_submitted, \
    is_auto_submitted, score, time_used_minutes, detail_records, created_at, updated_at";

pub(crate) struct FinalizeAttempt<'a> {
    pub(crate) id: i64,
    pub(crate) detail_records: &'a serde_json::Value,
    pub(crate) score: i32,
    pub(crate) submitted_at: PrimitiveDateTime,
    pub(crate) time_used_minutes: i32,
    pub(crate) is_auto_submitted: bool,
}

pub(crate) async fn find_for_exam_student(
    executor: impl sqlx::PgExecutor<'_>,
    exam_id: i64,
    student_id: i64,
) -> Result<Option<ExamAttempt>, sqlx::Error> {
    sqlx::query_as::<_, ExamAttempt>(&format!(
        "SELECT {COLUMNS} FROM exam_attempts WHERE exam_id = $1 AND student_id = $2"
    ))
    .bind(exam_id)
    .bind(student_id)
    .fetch_optional(executor)
    .await
}

/// Same as [`find_for_exam_student`] but holds a row lock until the
/// surrounding transaction ends.
pub(crate) async fn lock_for_exam_student(
    executor: impl sqlx::PgExecutor<'_>,
    exam_id: i64,
    student_id: i64,
) -> Result<Option<ExamAttempt>, sqlx::Error> {
    sqlx::query_as::<_, ExamAttempt>(&format!(
        "SELECT {COLUMNS} FROM exam_attempts WHERE exam_id = $1 AND student_id = $2 FOR UPDATE"
    ))
    .bind(exam_id)
    .bind(student_id)
    .fetch_optional(executor)
    .await
}

/// Inserts a started attempt. Returns `None` when a row for the pair already exists.
pub(crate) async fn insert_started(
    executor: impl sqlx::PgExecutor<'_>,
    exam_id: i64,
    student_id: i64,
    test_paper_id: i64,
    now: PrimitiveDateTime,
) -> Result<Option<ExamAttempt>, sqlx::Error> {
    sqlx::query_as::<_, ExamAttempt>(&format!(
        "INSERT INTO exam_attempts (\
            exam_id, student_id, test_paper_id, started_at, is_submitted, is_auto_submitted, \
            score, detail_records, created_at, updated_at\
         ) VALUES ($1, $2, $3, $4, FALSE, FALSE, 0, '{{}}'::jsonb, $4, $4) \
         ON CONFLICT ON CONSTRAINT exam_attempts_exam_student_key DO NOTHING \
         RETURNING {COLUMNS}"
    ))
    .bind(exam_id)
    .bind(student_id)
    .bind(test_paper_id)
    .bind(now)
    .fetch_optional(executor)
    .await
}

/// Stamps the start time on a record that exists but was never started.
pub(crate) async fn mark_started(
    executor: impl sqlx::PgExecutor<'_>,
    id: i64,
    test_paper_id: i64,
    now: PrimitiveDateTime,
) -> Result<Option<ExamAttempt>, sqlx::Error> {
    sqlx::query_as::<_, ExamAttempt>(&format!(
        "UPDATE exam_attempts \
         SET started_at = $3, test_paper_id = $2, score = 0, \
             detail_records = '{{}}'::jsonb, updated_at = $3 \
         WHERE id = $1 AND started_at IS NULL AND NOT is_submitted \
         RETURNING {COLUMNS}"
    ))
    .bind(id)
    .bind(test_paper_id)
    .bind(now)
    .fetch_optional(executor)
    .await
}

/// Replaces the whole draft map of an open attempt. `None` when the attempt
/// is missing, not started or already submitted.
pub(crate) async fn replace_draft(
    executor: impl sqlx::PgExecutor<'_>,
    exam_id: i64,
    student_id: i64,
    records: &serde_json::Value,
    now: PrimitiveDateTime,
) -> Result<Option<i64>, sqlx::Error> {
    sqlx::query_scalar(
        "UPDATE exam_attempts SET detail_records = $3, updated_at = $4 \
         WHERE exam_id = $1 AND student_id = $2 \
           AND started_at IS NOT NULL AND NOT is_submitted \
         RETURNING id",
    )
    .bind(exam_id)
    .bind(student_id)
    .bind(Json(records))
    .bind(now)
    .fetch_optional(executor)
    .await
}

/// Sets one key of the draft map of an open attempt, leaving the others intact.
pub(crate) async fn merge_draft_entry(
    executor: impl sqlx::PgExecutor<'_>,
    exam_id: i64,
    student_id: i64,
    key: &str,
    entry: &serde_json::Value,
    now: PrimitiveDateTime,
) -> Result<Option<i64>, sqlx::Error> {
    sqlx::query_scalar(
        "UPDATE exam_attempts \
         SET detail_records = COALESCE(detail_records, '{}'::jsonb) || jsonb_build_object($3::text, $4::jsonb), \
             updated_at = $5 \
         WHERE exam_id = $1 AND student_id = $2 \
           AND started_at IS NOT NULL AND NOT is_submitted \
         RETURNING id",
    )
    .bind(exam_id)
    .bind(student_id)
    .bind(key)
    .bind(Json(entry))
    .bind(now)
    .fetch_optional(executor)
    .await
}

/// Compare-and-set on `is_submitted`. `None` means another request finalized first.
pub(crate) async fn finalize(
    executor: impl sqlx::PgExecutor<'_>,
    params: FinalizeAttempt<'_>,
) -> Result<Option<ExamAttempt>, sqlx::Error> {
    sqlx::query_as::<_, ExamAttempt>(&format!(
        "UPDATE exam_attempts \
         SET detail_records = $2, score = $3, submitted_at = $4, time_used_minutes = $5, \
             is_auto_submitted = $6, is_submitted = TRUE, updated_at = $4 \
         WHERE id = $1 AND started_at IS NOT NULL AND NOT is_submitted \
         RETURNING {COLUMNS}"
    ))
    .bind(params.id)
    .bind(Json(params.detail_records))
    .bind(params.score)
    .bind(params.submitted_at)
    .bind(params.time_used_minutes)
    .bind(params.is_auto_submitted)
    .fetch_optional(executor)
    .await
}

pub(crate) async fn list_submitted_by_student(
    pool: &PgPool,
    student_id: i64,
) -> Result<Vec<ExamAttempt>, sqlx::Error> {
    sqlx::query_as::<_, ExamAttempt>(&format!(
        "SELECT {COLUMNS} FROM exam_attempts \
         WHERE student_id = $1 AND is_submitted \
         ORDER BY submitted_at DESC, id DESC"
    ))
    .bind(student_id)
    .fetch_all(pool)
    .await
}
