use std::collections::HashMap;

use sqlx::PgPool;
use time::PrimitiveDateTime;

use crate::core::time::format_primitive;
use crate::db::models::{ExamAttempt, Examination, Question, QuestionOption, StudentProfile, TestPaper};
use crate::repositories;
use crate::schemas::taking::{
    AnswerDetail, AvailableExam, AvailableExamsResponse, ExamInfoResponse, ExamResultResponse,
    ExamStatusResponse, InfoQuestion, MySubmissionResponse, OptionView, PaperSummary,
    ResultOption, ResultQuestion, StudentSummary, SubjectSummary, SubmissionView, UserSummary,
};
use crate::services::attempt_ledger::{self, AttemptState};
use crate::services::exam_window;
use crate::services::grading;

use super::{exam_summary, load_exam, TakingError};

pub(crate) async fn available_exams(
    pool: &PgPool,
    student: &StudentProfile,
    now: PrimitiveDateTime,
) -> Result<AvailableExamsResponse, TakingError> {
    let rows =
        repositories::examinations::list_available_for_student(pool, student.id, now).await?;

    let results: Vec<AvailableExam> = rows
        .into_iter()
        .map(|row| AvailableExam {
            id: row.id,
            exam_name: row.name,
            testpaper: PaperSummary {
                id: row.paper_id,
                name: row.paper_name,
                subject: SubjectSummary { id: row.subject_id, subject_name: row.subject_name },
                question_count: row.question_count,
                total_score: row.total_score,
                passing_score: row.passing_score,
                created_at: format_primitive(row.paper_created_at),
                updated_at: format_primitive(row.paper_updated_at),
            },
            start_time: format_primitive(row.start_time),
            end_time: format_primitive(row.end_time),
            create_user: UserSummary { id: row.created_by, full_name: row.creator_name },
            created_at: format_primitive(row.created_at),
        })
        .collect();

    Ok(AvailableExamsResponse { count: results.len(), results })
}

pub(crate) async fn exam_info(
    pool: &PgPool,
    student: &StudentProfile,
    exam_id: i64,
) -> Result<ExamInfoResponse, TakingError> {
    let exam = load_exam(pool, exam_id).await?;
    exam_window::require_enrollment(pool, exam.id, student.id).await?;

    let paper = repositories::test_papers::find_first_for_exam(pool, exam.id)
        .await?
        .ok_or(TakingError::PaperNotFound)?;

    let paper_questions = repositories::test_papers::list_questions(pool, paper.id).await?;
    let question_ids: Vec<i64> = paper_questions.iter().map(|pq| pq.question_id).collect();
    let mut options = group_options(
        repositories::questions::list_options_for_questions(pool, &question_ids).await?,
    );

    let questions = paper_questions
        .into_iter()
        .map(|pq| InfoQuestion {
            options: options
                .remove(&pq.question_id)
                .unwrap_or_default()
                .into_iter()
                .map(|option| OptionView { id: option.id, option: option.option_text })
                .collect(),
            id: pq.question_id,
            name: pq.name,
            tq_type: pq.question_type,
            difficulty: pq.difficulty,
            image: pq.image,
            order_index: pq.order_index,
            assigned_score: pq.score,
        })
        .collect();

    let attempt = attempt_ledger::get(pool, exam.id, student.id).await?;
    let state = AttemptState::of(attempt.as_ref())?;

    Ok(ExamInfoResponse {
        exam_id: exam.id,
        exam_name: exam.name.clone(),
        subject_name: exam.subject_name.clone(),
        exam_state: exam.state,
        start_time: format_primitive(exam.start_time),
        end_time: format_primitive(exam.end_time),
        duration: exam_window::duration_minutes(&exam),
        total_score: paper.total_score,
        passing_score: paper.passing_score,
        question_count: paper.question_count,
        questions,
        is_started: state.is_started(),
        is_submitted: state.is_submitted(),
    })
}

/// Read-only snapshot. An attempt left open past the deadline is reported
/// with zero minutes remaining; only a submit call closes it.
pub(crate) async fn exam_status(
    pool: &PgPool,
    student: &StudentProfile,
    exam_id: i64,
    now: PrimitiveDateTime,
) -> Result<ExamStatusResponse, TakingError> {
    let exam = load_exam(pool, exam_id).await?;
    exam_window::require_enrollment(pool, exam.id, student.id).await?;

    let attempt = attempt_ledger::get(pool, exam.id, student.id).await?;
    let state = AttemptState::of(attempt.as_ref())?;

    let mut response = ExamStatusResponse {
        exam_id: exam.id,
        exam_name: exam.name.clone(),
        is_started: false,
        is_submitted: false,
        start_time: None,
        submit_time: None,
        time_remaining: None,
        draft_answers: None,
        score: None,
    };

    match state {
        AttemptState::NotStarted => {}
        AttemptState::InProgress { started_at } => {
            response.is_started = true;
            response.start_time = Some(format_primitive(started_at));
            response.time_remaining = Some(exam_window::remaining_minutes(&exam, now));
            response.draft_answers = attempt.map(|attempt| attempt.detail_records.0);
        }
        AttemptState::Submitted { started_at, submitted_at, score } => {
            response.is_started = true;
            response.is_submitted = true;
            response.start_time = Some(format_primitive(started_at));
            response.submit_time = Some(format_primitive(submitted_at));
            response.score = Some(score);
        }
    }

    Ok(response)
}

pub(crate) async fn exam_result(
    pool: &PgPool,
    student: &StudentProfile,
    exam_id: i64,
) -> Result<ExamResultResponse, TakingError> {
    let exam = load_exam(pool, exam_id).await?;
    exam_window::require_enrollment(pool, exam.id, student.id).await?;

    let attempt = attempt_ledger::get(pool, exam.id, student.id).await?;
    if !AttemptState::of(attempt.as_ref())?.is_submitted() {
        return Err(TakingError::SubmissionNotFound);
    }
    let attempt = attempt.ok_or(TakingError::SubmissionNotFound)?;

    let mut views = build_submission_views(pool, student, vec![attempt]).await?;
    let (view, passing_score) = views.pop().ok_or(TakingError::SubmissionNotFound)?;

    let accuracy = accuracy(&view.answers);
    let pass = view.score >= passing_score;

    Ok(ExamResultResponse { submission: view, pass, pass_score: passing_score, accuracy })
}

pub(crate) async fn my_submissions(
    pool: &PgPool,
    student: &StudentProfile,
) -> Result<Vec<MySubmissionResponse>, TakingError> {
    let attempts = repositories::attempts::list_submitted_by_student(pool, student.id).await?;
    let views = build_submission_views(pool, student, attempts).await?;

    Ok(views
        .into_iter()
        .map(|(submission, passing_score)| MySubmissionResponse {
            passed: submission.score >= passing_score,
            submission,
        })
        .collect())
}

/// Share of answered questions graded correct, in percent with two decimals.
pub(crate) fn accuracy(answers: &[AnswerDetail]) -> f64 {
    if answers.is_empty() {
        return 0.0;
    }

    let correct = answers.iter().filter(|answer| answer.is_correct).count();
    let percent = correct as f64 / answers.len() as f64 * 100.0;
    (percent * 100.0).round() / 100.0
}

/// Builds submission views for finalized attempts, pairing each with the
/// passing score of its paper (0 when the paper is gone). Questions and
/// options are fetched in bulk; records pointing at deleted questions are
/// left out.
async fn build_submission_views(
    pool: &PgPool,
    student: &StudentProfile,
    attempts: Vec<ExamAttempt>,
) -> Result<Vec<(SubmissionView, i32)>, TakingError> {
    if attempts.is_empty() {
        return Ok(Vec::new());
    }

    let exam_ids = unique(attempts.iter().map(|attempt| attempt.exam_id));
    let paper_ids = unique(attempts.iter().filter_map(|attempt| attempt.test_paper_id));
    let parsed: Vec<_> =
        attempts.iter().map(|attempt| grading::parse_records(&attempt.detail_records.0)).collect();
    let question_ids = unique(parsed.iter().flat_map(|records| records.keys().copied()));

    let exams: HashMap<i64, Examination> =
        repositories::examinations::find_many_by_ids(pool, &exam_ids)
            .await?
            .into_iter()
            .map(|exam| (exam.id, exam))
            .collect();
    let papers: HashMap<i64, TestPaper> =
        repositories::test_papers::find_many_by_ids(pool, &paper_ids)
            .await?
            .into_iter()
            .map(|paper| (paper.id, paper))
            .collect();
    let questions: HashMap<i64, Question> =
        repositories::questions::find_many_by_ids(pool, &question_ids)
            .await?
            .into_iter()
            .map(|question| (question.id, question))
            .collect();
    let options = group_options(
        repositories::questions::list_options_for_questions(pool, &question_ids).await?,
    );

    let mut views = Vec::with_capacity(attempts.len());
    for (attempt, records) in attempts.into_iter().zip(parsed) {
        let Some(exam) = exams.get(&attempt.exam_id) else {
            tracing::warn!(attempt_id = attempt.id, exam_id = attempt.exam_id, "Submission without exam");
            continue;
        };
        let paper = attempt.test_paper_id.and_then(|paper_id| papers.get(&paper_id));

        let answers = records
            .into_iter()
            .filter_map(|(question_id, record)| {
                let question = questions.get(&question_id)?;
                Some(AnswerDetail {
                    id: question_id,
                    question: result_question(question, options.get(&question_id)),
                    answer: record.answer,
                    selected_options: record.selected_options,
                    is_correct: record.is_correct,
                    score: record.score,
                    max_score: record.max_score,
                })
            })
            .collect();

        let view = SubmissionView {
            id: attempt.id,
            examination: exam_summary(exam),
            test_paper_id: attempt.test_paper_id,
            student: StudentSummary { id: student.id, student_name: student.student_name.clone() },
            answers,
            score: attempt.score,
            total_score: paper.map(|paper| paper.total_score).unwrap_or(0),
            time_used: attempt.time_used_minutes,
            is_auto_submitted: attempt.is_auto_submitted,
            submitted_at: attempt.submitted_at.map(format_primitive),
            created_at: format_primitive(attempt.created_at),
        };
        views.push((view, paper.map(|paper| paper.passing_score).unwrap_or(0)));
    }

    Ok(views)
}

fn result_question(question: &Question, options: Option<&Vec<QuestionOption>>) -> ResultQuestion {
    let options = options.map(Vec::as_slice).unwrap_or_default();
    let correct_option_id = if question.question_type.is_auto_gradable() {
        options.iter().find(|option| option.is_correct).map(|option| option.id)
    } else {
        None
    };

    ResultQuestion {
        id: question.id,
        name: question.name.clone(),
        tq_type: question.question_type,
        difficulty: question.difficulty,
        image: question.image.clone(),
        options: options
            .iter()
            .map(|option| ResultOption {
                id: option.id,
                option: option.option_text.clone(),
                is_right: option.is_correct,
            })
            .collect(),
        correct_option_id,
    }
}

fn group_options(options: Vec<QuestionOption>) -> HashMap<i64, Vec<QuestionOption>> {
    let mut grouped: HashMap<i64, Vec<QuestionOption>> = HashMap::new();
    for option in options {
        grouped.entry(option.question_id).or_default().push(option);
    }
    grouped
}

fn unique(ids: impl Iterator<Item = i64>) -> Vec<i64> {
    let mut ids: Vec<i64> = ids.collect();
    ids.sort_unstable();
    ids.dedup();
    ids
}
