//! Drives an attempt through `NotStarted -> InProgress -> Submitted`.
//!
//! Every operation takes `now` from the caller and re-checks enrollment and
//! the exam window; nothing is cached between requests.

mod errors;
mod reads;
mod transitions;

use crate::core::time::format_primitive;
use crate::db::models::Examination;
use crate::repositories;
use crate::schemas::taking::ExamSummary;

pub(crate) use errors::{Precondition, TakingError};
pub(crate) use reads::{available_exams, exam_info, exam_result, exam_status, my_submissions};
pub(crate) use transitions::{save_answer, save_draft, start_exam, submit_exam};

async fn load_exam(
    executor: impl sqlx::PgExecutor<'_>,
    exam_id: i64,
) -> Result<Examination, TakingError> {
    repositories::examinations::find_by_id(executor, exam_id)
        .await?
        .ok_or(TakingError::ExamNotFound)
}

fn exam_summary(exam: &Examination) -> ExamSummary {
    ExamSummary {
        id: exam.id,
        exam_name: exam.name.clone(),
        subject_id: exam.subject_id,
        subject_name: exam.subject_name.clone(),
        start_time: format_primitive(exam.start_time),
        end_time: format_primitive(exam.end_time),
    }
}
