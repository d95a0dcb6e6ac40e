use sqlx::PgPool;

use crate::db::models::{Question, QuestionOption};

const COLUMNS: &str = "\
    id, subject_id, name, question_type, difficulty, default_score, image, is_archived";

pub(crate) async fn find_many_by_ids(
    pool: &PgPool,
    ids: &[i64],
) -> Result<Vec<Question>, sqlx::Error> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    sqlx::query_as::<_, Question>(&format!("SELECT {COLUMNS} FROM questions WHERE id = ANY($1)"))
        .bind(ids)
        .fetch_all(pool)
        .await
}

/// Options of every listed question, grouped by question and ordered by id.
pub(crate) async fn list_options_for_questions(
    pool: &PgPool,
    question_ids: &[i64],
) -> Result<Vec<QuestionOption>, sqlx::Error> {
    if question_ids.is_empty() {
        return Ok(Vec::new());
    }

    sqlx::query_as::<_, QuestionOption>(
        "SELECT id, question_id, option_text, is_correct FROM question_options \
         WHERE question_id = ANY($1) \
         ORDER BY question_id, id",
    )
    .bind(question_ids)
    .fetch_all(pool)
    .await
}
