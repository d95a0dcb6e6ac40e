use sqlx::PgPool;

use crate::db::models::{PaperQuestion, TestPaper};
use crate::db::types::QuestionType;

const COLUMNS: &str = "\
    tp.id, tp.subject_id, tp.name, tp.total_score, tp.passing_score, tp.question_count, \
    tp.created_at, tp.updated_at";

/// One answer-key entry: the link weight, the question type and the lowest
/// correct option id, if any option is flagged correct.
#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct AnswerKeyRow {
    pub(crate) question_id: i64,
    pub(crate) score: i32,
    pub(crate) question_type: QuestionType,
    pub(crate) correct_option_id: Option<i64>,
}

pub(crate) async fn find_by_id(
    executor: impl sqlx::PgExecutor<'_>,
    id: i64,
) -> Result<Option<TestPaper>, sqlx::Error> {
    sqlx::query_as::<_, TestPaper>(&format!("SELECT {COLUMNS} FROM test_papers tp WHERE tp.id = $1"))
        .bind(id)
        .fetch_optional(executor)
        .await
}

pub(crate) async fn find_many_by_ids(
    pool: &PgPool,
    ids: &[i64],
) -> Result<Vec<TestPaper>, sqlx::Error> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    sqlx::query_as::<_, TestPaper>(&format!(
        "SELECT {COLUMNS} FROM test_papers tp WHERE tp.id = ANY($1)"
    ))
    .bind(ids)
    .fetch_all(pool)
    .await
}

/// The paper behind an exam. Exams linked to several papers use the earliest link.
pub(crate) async fn find_first_for_exam(
    executor: impl sqlx::PgExecutor<'_>,
    exam_id: i64,
) -> Result<Option<TestPaper>, sqlx::Error> {
    sqlx::query_as::<_, TestPaper>(&format!(
        "SELECT {COLUMNS} FROM exam_papers ep \
         JOIN test_papers tp ON tp.id = ep.test_paper_id \
         WHERE ep.exam_id = $1 \
         ORDER BY ep.id \
         LIMIT 1"
    ))
    .bind(exam_id)
    .fetch_optional(executor)
    .await
}

pub(crate) async fn list_questions(
    pool: &PgPool,
    paper_id: i64,
) -> Result<Vec<PaperQuestion>, sqlx::Error> {
    sqlx::query_as::<_, PaperQuestion>(
        "SELECT q.id AS question_id, q.name, q.question_type, q.difficulty, q.image, \
                pq.score, pq.order_index \
         FROM test_paper_questions pq \
         JOIN questions q ON q.id = pq.question_id \
         WHERE pq.test_paper_id = $1 \
         ORDER BY pq.order_index, pq.id",
    )
    .bind(paper_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn answer_key_rows(
    executor: impl sqlx::PgExecutor<'_>,
    paper_id: i64,
) -> Result<Vec<AnswerKeyRow>, sqlx::Error> {
    sqlx::query_as::<_, AnswerKeyRow>(
        "SELECT pq.question_id, pq.score, q.question_type, \
                ( \
                    SELECT o.id FROM question_options o \
                    WHERE o.question_id = q.id AND o.is_correct \
                    ORDER BY o.id \
                    LIMIT 1 \
                ) AS correct_option_id \
         FROM test_paper_questions pq \
         JOIN questions q ON q.id = pq.question_id \
         WHERE pq.test_paper_id = $1",
    )
    .bind(paper_id)
    .fetch_all(executor)
    .await
}
