use std::fmt;

use thiserror::Error;

use crate::services::attempt_ledger::LedgerError;

/// A transition the current exam or attempt state does not allow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Precondition {
    ExamNotStarted,
    ExamEnded,
    AttemptNotStarted,
    AlreadySubmitted,
}

impl Precondition {
    pub(crate) fn code(self) -> &'static str {
        match self {
            Self::ExamNotStarted => "exam_not_started",
            Self::ExamEnded => "exam_ended",
            Self::AttemptNotStarted => "attempt_not_started",
            Self::AlreadySubmitted => "already_submitted",
        }
    }

    pub(crate) fn detail(self) -> &'static str {
        match self {
            Self::ExamNotStarted => "The examination has not started yet",
            Self::ExamEnded => "The examination has already ended",
            Self::AttemptNotStarted => "The examination attempt has not been started",
            Self::AlreadySubmitted => "The examination has already been submitted",
        }
    }
}

impl fmt::Display for Precondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.detail())
    }
}

#[derive(Debug, Error)]
pub(crate) enum TakingError {
    #[error("Examination not found")]
    ExamNotFound,
    #[error("No test paper is linked to this examination")]
    PaperNotFound,
    #[error("Not enrolled in this examination")]
    NotEnrolled,
    #[error("No submitted attempt for this examination")]
    SubmissionNotFound,
    #[error("{0}")]
    Precondition(Precondition),
    #[error("Draft save rate limit exceeded")]
    RateLimited,
    #[error("ledger error: {0}")]
    Ledger(LedgerError),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<Precondition> for TakingError {
    fn from(value: Precondition) -> Self {
        Self::Precondition(value)
    }
}

impl From<LedgerError> for TakingError {
    fn from(value: LedgerError) -> Self {
        match value {
            LedgerError::NotStarted => Self::Precondition(Precondition::AttemptNotStarted),
            LedgerError::AlreadySubmitted => Self::Precondition(Precondition::AlreadySubmitted),
            LedgerError::Database(err) => Self::Database(err),
            other @ LedgerError::InconsistentState { .. } => Self::Ledger(other),
        }
    }
}
