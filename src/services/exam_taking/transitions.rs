use sqlx::PgPool;
use time::PrimitiveDateTime;

use crate::core::metrics::{ATTEMPTS_STARTED, DRAFT_SAVES_THROTTLED, SUBMISSIONS};
use crate::core::redis::draft_save_key;
use crate::core::state::AppState;
use crate::core::time::{elapsed_minutes, format_primitive};
use crate::db::models::StudentProfile;
use crate::repositories;
use crate::schemas::taking::{
    AnswerPayload, DraftSavedResponse, StartExamResponse, SubmitExamResponse,
};
use crate::services::answer_key::{self, AnswerKey};
use crate::services::attempt_ledger::{self, AttemptState, Finalization};
use crate::services::exam_window::{self, SubmitMode};
use crate::services::grading::{self, SubmittedAnswer};

use super::{exam_summary, load_exam, Precondition, TakingError};

pub(crate) async fn start_exam(
    pool: &PgPool,
    student: &StudentProfile,
    exam_id: i64,
    now: PrimitiveDateTime,
) -> Result<StartExamResponse, TakingError> {
    let exam = load_exam(pool, exam_id).await?;
    exam_window::require_enrollment(pool, exam.id, student.id).await?;
    exam_window::check_start(&exam, now)?;

    let paper = repositories::test_papers::find_first_for_exam(pool, exam.id)
        .await?
        .ok_or(TakingError::PaperNotFound)?;

    let mut tx = pool.begin().await?;
    let outcome =
        attempt_ledger::start_or_resume(&mut tx, exam.id, student.id, paper.id, now).await?;
    tx.commit().await?;

    let already_started = outcome.already_started();
    let attempt = outcome.into_attempt();
    let started_at = attempt.started_at.unwrap_or(now);

    if already_started {
        tracing::info!(
            exam_id = exam.id,
            student_id = student.id,
            attempt_id = attempt.id,
            "Exam attempt resumed"
        );
    } else {
        metrics::counter!(ATTEMPTS_STARTED).increment(1);
        tracing::info!(
            exam_id = exam.id,
            student_id = student.id,
            attempt_id = attempt.id,
            test_paper_id = paper.id,
            "Exam attempt started"
        );
    }

    Ok(StartExamResponse {
        submission_id: attempt.id,
        examination: exam_summary(&exam),
        started_at: format_primitive(started_at),
        already_started,
    })
}

pub(crate) async fn save_draft(
    state: &AppState,
    student: &StudentProfile,
    exam_id: i64,
    answers: serde_json::Map<String, serde_json::Value>,
    now: PrimitiveDateTime,
) -> Result<DraftSavedResponse, TakingError> {
    let pool = state.db();
    let exam = load_exam(pool, exam_id).await?;
    exam_window::require_enrollment(pool, exam.id, student.id).await?;
    throttle_draft_saves(state, exam.id, student.id).await?;

    let records = serde_json::Value::Object(answers);
    let attempt_id = attempt_ledger::save_draft(pool, exam.id, student.id, &records, now)
        .await
        .inspect_err(|err| log_rejected_write(exam.id, student.id, err))?;

    tracing::debug!(exam_id = exam.id, student_id = student.id, attempt_id, "Draft saved");

    Ok(DraftSavedResponse {
        detail: "Draft saved".to_string(),
        submission_id: attempt_id,
        saved_at: format_primitive(now),
    })
}

pub(crate) async fn save_answer(
    state: &AppState,
    student: &StudentProfile,
    exam_id: i64,
    payload: AnswerPayload,
    now: PrimitiveDateTime,
) -> Result<DraftSavedResponse, TakingError> {
    let pool = state.db();
    let exam = load_exam(pool, exam_id).await?;
    exam_window::require_enrollment(pool, exam.id, student.id).await?;
    throttle_draft_saves(state, exam.id, student.id).await?;

    let entry = serde_json::json!({
        "answer": payload.answer,
        "selected_options": payload.selected_options,
    });
    let attempt_id = attempt_ledger::save_single_answer(
        pool,
        exam.id,
        student.id,
        payload.question_id,
        &entry,
        now,
    )
    .await
    .inspect_err(|err| log_rejected_write(exam.id, student.id, err))?;

    tracing::debug!(
        exam_id = exam.id,
        student_id = student.id,
        attempt_id,
        question_id = payload.question_id,
        "Answer saved"
    );

    Ok(DraftSavedResponse {
        detail: "Answer saved".to_string(),
        submission_id: attempt_id,
        saved_at: format_primitive(now),
    })
}

/// Grades and finalizes the attempt. The attempt row stays locked from the
/// state check until the graded result is committed.
pub(crate) async fn submit_exam(
    pool: &PgPool,
    student: &StudentProfile,
    exam_id: i64,
    answers: Vec<SubmittedAnswer>,
    now: PrimitiveDateTime,
) -> Result<SubmitExamResponse, TakingError> {
    let exam = load_exam(pool, exam_id).await?;
    exam_window::require_enrollment(pool, exam.id, student.id).await?;

    let mut tx = pool.begin().await?;
    let attempt = attempt_ledger::lock(&mut tx, exam.id, student.id).await?;

    let (attempt, started_at) = match (AttemptState::of(attempt.as_ref())?, attempt) {
        (AttemptState::InProgress { started_at }, Some(attempt)) => (attempt, started_at),
        (AttemptState::Submitted { .. }, _) => {
            tracing::info!(exam_id = exam.id, student_id = student.id, "Repeated submit rejected");
            return Err(Precondition::AlreadySubmitted.into());
        }
        _ => return Err(Precondition::AttemptNotStarted.into()),
    };

    let mode = exam_window::check_submit(&exam, now)?;
    let answers = if mode.is_auto() && answers.is_empty() {
        grading::answers_from_draft(&attempt.detail_records.0)
    } else {
        answers
    };

    let (key, total_possible, passing_score) = match attempt.test_paper_id {
        Some(paper_id) => {
            let key = answer_key::resolve(&mut *tx, paper_id).await?;
            let paper = repositories::test_papers::find_by_id(&mut *tx, paper_id).await?;
            let (total, passing) =
                paper.map(|paper| (paper.total_score, paper.passing_score)).unwrap_or((0, 0));
            (key, total, passing)
        }
        None => (AnswerKey::default(), 0, 0),
    };

    if key.is_empty() {
        tracing::warn!(
            exam_id = exam.id,
            attempt_id = attempt.id,
            "Grading against an empty answer key"
        );
    }

    let report = grading::grade(&key, &answers);
    let records = report.records_json();
    let minutes_used = i32::try_from(elapsed_minutes(started_at, now)).unwrap_or(i32::MAX);

    let finalized = attempt_ledger::finalize(
        &mut tx,
        Finalization {
            attempt_id: attempt.id,
            records: &records,
            score: report.total,
            now,
            minutes_used,
            is_auto_submitted: mode.is_auto(),
        },
    )
    .await?;
    tx.commit().await?;

    metrics::counter!(SUBMISSIONS, "mode" => mode.as_str()).increment(1);
    tracing::info!(
        exam_id = exam.id,
        student_id = student.id,
        attempt_id = finalized.id,
        mode = mode.as_str(),
        answers = answers.len(),
        key_questions = key.len(),
        score = report.total,
        minutes_used,
        "Exam attempt submitted"
    );

    let detail = match mode {
        SubmitMode::Manual => "Answers submitted",
        SubmitMode::Auto => "Time is over; answers were submitted automatically",
    };

    Ok(SubmitExamResponse {
        detail: detail.to_string(),
        submission_id: finalized.id,
        score: finalized.score,
        total_possible,
        passed: finalized.score >= passing_score,
        time_used: minutes_used,
        is_auto_submitted: finalized.is_auto_submitted,
    })
}

/// Fixed-window limit on draft writes per (exam, student). Only checked for
/// enrolled callers; a Redis failure lets the write through.
async fn throttle_draft_saves(
    state: &AppState,
    exam_id: i64,
    student_id: i64,
) -> Result<(), TakingError> {
    let taking = state.settings().taking();
    let allowed = state
        .redis()
        .rate_limit(
            &draft_save_key(exam_id, student_id),
            taking.draft_save_rate_limit,
            taking.draft_save_rate_window_seconds,
        )
        .await
        .unwrap_or_else(|err| {
            tracing::warn!(error = %err, exam_id, student_id, "Draft rate limiter unavailable");
            true
        });

    if !allowed {
        metrics::counter!(DRAFT_SAVES_THROTTLED).increment(1);
        return Err(TakingError::RateLimited);
    }
    Ok(())
}

fn log_rejected_write(exam_id: i64, student_id: i64, err: &attempt_ledger::LedgerError) {
    tracing::info!(exam_id, student_id, reason = %err, "Draft write rejected");
}
