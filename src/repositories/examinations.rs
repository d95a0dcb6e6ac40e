use sqlx::PgPool;
use time::PrimitiveDateTime;

use crate::db::models::Examination;

pub(crate) const COLUMNS: &str = "\
    e.id, e.subject_id, s.subject_name, e.name, e.start_time, e.end_time, \
    e.state, e.enrollment_count, e.created_by, e.created_at";

const FROM: &str = "examinations e JOIN subjects s ON s.id = e.subject_id";

/// An exam the student can open right now, together with the paper it uses.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct AvailableExamRow {
    pub(crate) id: i64,
    pub(crate) name: String,
    pub(crate) subject_id: i64,
    pub(crate) subject_name: String,
    pub(crate) start_time: PrimitiveDateTime,
    pub(crate) end_time: PrimitiveDateTime,
    pub(crate) created_by: String,
    pub(crate) creator_name: String,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) paper_id: i64,
    pub(crate) paper_name: String,
    pub(crate) question_count: i32,
    pub(crate) total_score: i32,
    pub(crate) passing_score: i32,
    pub(crate) paper_created_at: PrimitiveDateTime,
    pub(crate) paper_updated_at: PrimitiveDateTime,
}

pub(crate) async fn find_by_id(
    executor: impl sqlx::PgExecutor<'_>,
    id: i64,
) -> Result<Option<Examination>, sqlx::Error> {
    sqlx::query_as::<_, Examination>(&format!("SELECT {COLUMNS} FROM {FROM} WHERE e.id = $1"))
        .bind(id)
        .fetch_optional(executor)
        .await
}

pub(crate) async fn find_many_by_ids(
    pool: &PgPool,
    ids: &[i64],
) -> Result<Vec<Examination>, sqlx::Error> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    sqlx::query_as::<_, Examination>(&format!(
        "SELECT {COLUMNS} FROM {FROM} WHERE e.id = ANY($1)"
    ))
    .bind(ids)
    .fetch_all(pool)
    .await
}

/// Enrolled, inside the window at `now`, backed by a paper and not yet
/// submitted by the student.
pub(crate) async fn list_available_for_student(
    pool: &PgPool,
    student_id: i64,
    now: PrimitiveDateTime,
) -> Result<Vec<AvailableExamRow>, sqlx::Error> {
    sqlx::query_as::<_, AvailableExamRow>(
        "SELECT e.id, e.name, e.subject_id, s.subject_name, e.start_time, e.end_time, \
                e.created_by, u.full_name AS creator_name, e.created_at, \
                p.id AS paper_id, p.name AS paper_name, p.question_count, p.total_score, \
                p.passing_score, p.created_at AS paper_created_at, \
                p.updated_at AS paper_updated_at \
         FROM examinations e \
         JOIN subjects s ON s.id = e.subject_id \
         JOIN users u ON u.id = e.created_by \
         JOIN exam_enrollments en ON en.exam_id = e.id AND en.student_id = $1 \
         JOIN LATERAL ( \
             SELECT tp.id, tp.name, tp.question_count, tp.total_score, tp.passing_score, \
                    tp.created_at, tp.updated_at \
             FROM exam_papers ep JOIN test_papers tp ON tp.id = ep.test_paper_id \
             WHERE ep.exam_id = e.id \
             ORDER BY ep.id \
             LIMIT 1 \
         ) p ON TRUE \
         WHERE e.start_time <= $2 AND e.end_time >= $2 \
           AND NOT EXISTS ( \
               SELECT 1 FROM exam_attempts a \
               WHERE a.exam_id = e.id AND a.student_id = $1 AND a.is_submitted \
           ) \
         ORDER BY e.end_time, e.id",
    )
    .bind(student_id)
    .bind(now)
    .fetch_all(pool)
    .await
}
