use time::PrimitiveDateTime;

use crate::core::time::{elapsed_minutes, whole_minutes_between};
use crate::db::models::Examination;
use crate::repositories;
use crate::services::exam_taking::{Precondition, TakingError};

/// Where `now` sits relative to the exam's `[start_time, end_time]` window.
/// Both bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WindowPosition {
    BeforeStart,
    Open,
    AfterEnd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SubmitMode {
    Manual,
    Auto,
}

impl SubmitMode {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::Auto => "auto",
        }
    }

    pub(crate) fn is_auto(self) -> bool {
        matches!(self, Self::Auto)
    }
}

pub(crate) fn position(exam: &Examination, now: PrimitiveDateTime) -> WindowPosition {
    if now < exam.start_time {
        WindowPosition::BeforeStart
    } else if now > exam.end_time {
        WindowPosition::AfterEnd
    } else {
        WindowPosition::Open
    }
}

pub(crate) fn check_start(exam: &Examination, now: PrimitiveDateTime) -> Result<(), Precondition> {
    match position(exam, now) {
        WindowPosition::BeforeStart => Err(Precondition::ExamNotStarted),
        WindowPosition::Open => Ok(()),
        WindowPosition::AfterEnd => Err(Precondition::ExamEnded),
    }
}

/// Submitting past the end is allowed and switches to auto-submission.
pub(crate) fn check_submit(
    exam: &Examination,
    now: PrimitiveDateTime,
) -> Result<SubmitMode, Precondition> {
    match position(exam, now) {
        WindowPosition::BeforeStart => Err(Precondition::ExamNotStarted),
        WindowPosition::Open => Ok(SubmitMode::Manual),
        WindowPosition::AfterEnd => Ok(SubmitMode::Auto),
    }
}

pub(crate) fn duration_minutes(exam: &Examination) -> i64 {
    elapsed_minutes(exam.start_time, exam.end_time)
}

pub(crate) fn remaining_minutes(exam: &Examination, now: PrimitiveDateTime) -> i64 {
    whole_minutes_between(now, exam.end_time).max(0)
}

pub(crate) async fn require_enrollment(
    executor: impl sqlx::PgExecutor<'_>,
    exam_id: i64,
    student_id: i64,
) -> Result<(), TakingError> {
    if repositories::enrollments::is_enrolled(executor, exam_id, student_id).await? {
        Ok(())
    } else {
        Err(TakingError::NotEnrolled)
    }
}
