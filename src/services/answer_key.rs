use std::collections::HashMap;

use crate::db::types::QuestionType;
use crate::repositories;
use crate::repositories::test_papers::AnswerKeyRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct KeyEntry {
    /// Weight of the question on this paper, not the question's default score.
    pub(crate) max_score: i32,
    pub(crate) question_type: QuestionType,
    /// `None` for free-text questions and for option questions with no
    /// option flagged correct. Either way nothing can earn points.
    pub(crate) correct_option_id: Option<i64>,
}

/// Per-question scoring data for one test paper.
#[derive(Debug, Clone, Default)]
pub(crate) struct AnswerKey {
    entries: HashMap<i64, KeyEntry>,
}

impl AnswerKey {
    pub(crate) fn from_rows(rows: impl IntoIterator<Item = AnswerKeyRow>) -> Self {
        let entries = rows
            .into_iter()
            .map(|row| {
                let correct_option_id = if row.question_type.is_auto_gradable() {
                    row.correct_option_id
                } else {
                    None
                };
                let entry = KeyEntry {
                    max_score: row.score,
                    question_type: row.question_type,
                    correct_option_id,
                };
                (row.question_id, entry)
            })
            .collect();

        Self { entries }
    }

    pub(crate) fn get(&self, question_id: i64) -> Option<&KeyEntry> {
        self.entries.get(&question_id)
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Loads the key for `paper_id` with a single query.
pub(crate) async fn resolve(
    executor: impl sqlx::PgExecutor<'_>,
    paper_id: i64,
) -> Result<AnswerKey, sqlx::Error> {
    let rows = repositories::test_papers::answer_key_rows(executor, paper_id).await?;
    Ok(AnswerKey::from_rows(rows))
}
