use sqlx::{PgConnection, PgPool};
use thiserror::Error;
use time::PrimitiveDateTime;

use crate::db::models::ExamAttempt;
use crate::repositories;
use crate::repositories::attempts::FinalizeAttempt;

#[derive(Debug, Error)]
pub(crate) enum LedgerError {
    #[error("attempt has not been started")]
    NotStarted,
    #[error("attempt has already been submitted")]
    AlreadySubmitted,
    #[error("attempt {attempt_id} is inconsistent: {reason}")]
    InconsistentState { attempt_id: i64, reason: &'static str },
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Lifecycle of one (exam, student) pair, derived from the stored row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AttemptState {
    NotStarted,
    InProgress { started_at: PrimitiveDateTime },
    Submitted { started_at: PrimitiveDateTime, submitted_at: PrimitiveDateTime, score: i32 },
}

impl AttemptState {
    pub(crate) fn of(attempt: Option<&ExamAttempt>) -> Result<Self, LedgerError> {
        let Some(attempt) = attempt else {
            return Ok(Self::NotStarted);
        };

        match (attempt.is_submitted, attempt.started_at, attempt.submitted_at) {
            (true, Some(started_at), Some(submitted_at)) => {
                Ok(Self::Submitted { started_at, submitted_at, score: attempt.score })
            }
            (true, _, _) => Err(LedgerError::InconsistentState {
                attempt_id: attempt.id,
                reason: "submitted without both timestamps",
            }),
            (false, _, Some(_)) => Err(LedgerError::InconsistentState {
                attempt_id: attempt.id,
                reason: "submit time recorded on an open attempt",
            }),
            (false, Some(started_at), None) => Ok(Self::InProgress { started_at }),
            (false, None, None) => Ok(Self::NotStarted),
        }
    }

    pub(crate) fn is_started(self) -> bool {
        !matches!(self, Self::NotStarted)
    }

    pub(crate) fn is_submitted(self) -> bool {
        matches!(self, Self::Submitted { .. })
    }
}

#[derive(Debug)]
pub(crate) enum StartOutcome {
    /// No record existed; a started one was inserted.
    Created(ExamAttempt),
    /// A record existed without a start time and has now been started.
    Started(ExamAttempt),
    /// The attempt was already in progress and is returned unchanged.
    Resumed(ExamAttempt),
}

impl StartOutcome {
    pub(crate) fn into_attempt(self) -> ExamAttempt {
        match self {
            Self::Created(attempt) | Self::Started(attempt) | Self::Resumed(attempt) => attempt,
        }
    }

    pub(crate) fn already_started(&self) -> bool {
        matches!(self, Self::Resumed(_))
    }
}

pub(crate) async fn get(
    executor: impl sqlx::PgExecutor<'_>,
    exam_id: i64,
    student_id: i64,
) -> Result<Option<ExamAttempt>, LedgerError> {
    Ok(repositories::attempts::find_for_exam_student(executor, exam_id, student_id).await?)
}

/// Locks the attempt row for the rest of the caller's transaction.
pub(crate) async fn lock(
    conn: &mut PgConnection,
    exam_id: i64,
    student_id: i64,
) -> Result<Option<ExamAttempt>, LedgerError> {
    Ok(repositories::attempts::lock_for_exam_student(conn, exam_id, student_id).await?)
}

/// Must run inside a transaction: the insert and the row lock together make
/// concurrent starts converge on one record.
pub(crate) async fn start_or_resume(
    conn: &mut PgConnection,
    exam_id: i64,
    student_id: i64,
    test_paper_id: i64,
    now: PrimitiveDateTime,
) -> Result<StartOutcome, LedgerError> {
    if let Some(created) =
        repositories::attempts::insert_started(&mut *conn, exam_id, student_id, test_paper_id, now)
            .await?
    {
        return Ok(StartOutcome::Created(created));
    }

    let existing = repositories::attempts::lock_for_exam_student(&mut *conn, exam_id, student_id)
        .await?
        .ok_or(LedgerError::Database(sqlx::Error::RowNotFound))?;

    match AttemptState::of(Some(&existing))? {
        AttemptState::NotStarted => {
            let started =
                repositories::attempts::mark_started(&mut *conn, existing.id, test_paper_id, now)
                    .await?
                    .ok_or(LedgerError::InconsistentState {
                        attempt_id: existing.id,
                        reason: "locked unstarted attempt could not be started",
                    })?;
            Ok(StartOutcome::Started(started))
        }
        AttemptState::InProgress { .. } => Ok(StartOutcome::Resumed(existing)),
        AttemptState::Submitted { .. } => Err(LedgerError::AlreadySubmitted),
    }
}

/// Replaces the draft map wholesale.
pub(crate) async fn save_draft(
    pool: &PgPool,
    exam_id: i64,
    student_id: i64,
    records: &serde_json::Value,
    now: PrimitiveDateTime,
) -> Result<i64, LedgerError> {
    match repositories::attempts::replace_draft(pool, exam_id, student_id, records, now).await? {
        Some(attempt_id) => Ok(attempt_id),
        None => Err(diagnose_rejected_write(pool, exam_id, student_id).await),
    }
}

/// Sets the entry for one question, keeping the rest of the draft.
pub(crate) async fn save_single_answer(
    pool: &PgPool,
    exam_id: i64,
    student_id: i64,
    question_id: i64,
    entry: &serde_json::Value,
    now: PrimitiveDateTime,
) -> Result<i64, LedgerError> {
    let key = question_id.to_string();
    match repositories::attempts::merge_draft_entry(pool, exam_id, student_id, &key, entry, now)
        .await?
    {
        Some(attempt_id) => Ok(attempt_id),
        None => Err(diagnose_rejected_write(pool, exam_id, student_id).await),
    }
}

pub(crate) struct Finalization<'a> {
    pub(crate) attempt_id: i64,
    pub(crate) records: &'a serde_json::Value,
    pub(crate) score: i32,
    pub(crate) now: PrimitiveDateTime,
    pub(crate) minutes_used: i32,
    pub(crate) is_auto_submitted: bool,
}

/// Records the graded result. Losing a race with another submit yields
/// [`LedgerError::AlreadySubmitted`].
pub(crate) async fn finalize(
    conn: &mut PgConnection,
    finalization: Finalization<'_>,
) -> Result<ExamAttempt, LedgerError> {
    repositories::attempts::finalize(
        conn,
        FinalizeAttempt {
            id: finalization.attempt_id,
            detail_records: finalization.records,
            score: finalization.score,
            submitted_at: finalization.now,
            time_used_minutes: finalization.minutes_used,
            is_auto_submitted: finalization.is_auto_submitted,
        },
    )
    .await?
    .ok_or(LedgerError::AlreadySubmitted)
}

/// Explains why a guarded draft write matched no row.
async fn diagnose_rejected_write(pool: &PgPool, exam_id: i64, student_id: i64) -> LedgerError {
    let attempt = match repositories::attempts::find_for_exam_student(pool, exam_id, student_id)
        .await
    {
        Ok(attempt) => attempt,
        Err(err) => return LedgerError::Database(err),
    };

    match AttemptState::of(attempt.as_ref()) {
        Ok(AttemptState::NotStarted) => LedgerError::NotStarted,
        Ok(AttemptState::Submitted { .. }) => LedgerError::AlreadySubmitted,
        Ok(AttemptState::InProgress { .. }) => LedgerError::InconsistentState {
            attempt_id: attempt.map(|row| row.id).unwrap_or_default(),
            reason: "open attempt rejected a draft write",
        },
        Err(err) => err,
    }
}
