use serde::{Deserialize, Deserializer, Serialize};
use validator::{Validate, ValidationError};

use crate::db::types::{DifficultyLevel, ExamState, QuestionType};
use crate::services::grading::SubmittedAnswer;

pub(crate) const MAX_ANSWERS_PER_REQUEST: usize = 1000;

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub(crate) struct AnswerPayload {
    #[validate(range(min = 1, message = "question_id must be positive"))]
    pub(crate) question_id: i64,
    #[serde(default, deserialize_with = "deserialize_answer")]
    #[validate(length(max = 10000, message = "answer is too long"))]
    pub(crate) answer: String,
    #[serde(default)]
    #[validate(length(max = 100, message = "too many selected options"))]
    pub(crate) selected_options: Vec<i64>,
}

impl From<AnswerPayload> for SubmittedAnswer {
    fn from(value: AnswerPayload) -> Self {
        Self {
            question_id: value.question_id,
            answer: value.answer,
            selected_options: value.selected_options,
        }
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
pub(crate) struct SubmitRequest {
    #[serde(default)]
    #[validate(custom(function = "validate_answer_count"), nested)]
    pub(crate) answers: Vec<AnswerPayload>,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct SaveDraftRequest {
    #[serde(default)]
    #[validate(custom(function = "validate_draft_entries"))]
    pub(crate) answers: serde_json::Map<String, serde_json::Value>,
}

pub(crate) type SaveAnswerRequest = AnswerPayload;

#[derive(Debug, Serialize)]
pub(crate) struct OptionView {
    pub(crate) id: i64,
    pub(crate) option: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct InfoQuestion {
    pub(crate) id: i64,
    pub(crate) name: String,
    pub(crate) tq_type: QuestionType,
    pub(crate) difficulty: DifficultyLevel,
    pub(crate) image: Option<String>,
    pub(crate) order_index: i32,
    pub(crate) assigned_score: i32,
    pub(crate) options: Vec<OptionView>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ExamInfoResponse {
    pub(crate) exam_id: i64,
    pub(crate) exam_name: String,
    pub(crate) subject_name: String,
    pub(crate) exam_state: ExamState,
    pub(crate) start_time: String,
    pub(crate) end_time: String,
    pub(crate) duration: i64,
    pub(crate) total_score: i32,
    pub(crate) passing_score: i32,
    pub(crate) question_count: i32,
    pub(crate) questions: Vec<InfoQuestion>,
    pub(crate) is_started: bool,
    pub(crate) is_submitted: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct ExamSummary {
    pub(crate) id: i64,
    pub(crate) exam_name: String,
    pub(crate) subject_id: i64,
    pub(crate) subject_name: String,
    pub(crate) start_time: String,
    pub(crate) end_time: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct StartExamResponse {
    pub(crate) submission_id: i64,
    pub(crate) examination: ExamSummary,
    pub(crate) started_at: String,
    pub(crate) already_started: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct DraftSavedResponse {
    pub(crate) detail: String,
    pub(crate) submission_id: i64,
    pub(crate) saved_at: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct SubmitExamResponse {
    pub(crate) detail: String,
    pub(crate) submission_id: i64,
    pub(crate) score: i32,
    pub(crate) total_possible: i32,
    pub(crate) passed: bool,
    pub(crate) time_used: i32,
    pub(crate) is_auto_submitted: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct ExamStatusResponse {
    pub(crate) exam_id: i64,
    pub(crate) exam_name: String,
    pub(crate) is_started: bool,
    pub(crate) is_submitted: bool,
    pub(crate) start_time: Option<String>,
    pub(crate) submit_time: Option<String>,
    pub(crate) time_remaining: Option<i64>,
    pub(crate) draft_answers: Option<serde_json::Value>,
    pub(crate) score: Option<i32>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ResultOption {
    pub(crate) id: i64,
    pub(crate) option: String,
    pub(crate) is_right: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct ResultQuestion {
    pub(crate) id: i64,
    pub(crate) name: String,
    pub(crate) tq_type: QuestionType,
    pub(crate) difficulty: DifficultyLevel,
    pub(crate) image: Option<String>,
    pub(crate) options: Vec<ResultOption>,
    pub(crate) correct_option_id: Option<i64>,
}

#[derive(Debug, Serialize)]
pub(crate) struct AnswerDetail {
    pub(crate) id: i64,
    pub(crate) question: ResultQuestion,
    pub(crate) answer: String,
    pub(crate) selected_options: Vec<i64>,
    pub(crate) is_correct: bool,
    pub(crate) score: i32,
    pub(crate) max_score: i32,
}

#[derive(Debug, Serialize)]
pub(crate) struct StudentSummary {
    pub(crate) id: i64,
    pub(crate) student_name: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct SubmissionView {
    pub(crate) id: i64,
    pub(crate) examination: ExamSummary,
    pub(crate) test_paper_id: Option<i64>,
    pub(crate) student: StudentSummary,
    pub(crate) answers: Vec<AnswerDetail>,
    pub(crate) score: i32,
    pub(crate) total_score: i32,
    pub(crate) time_used: Option<i32>,
    pub(crate) is_auto_submitted: bool,
    pub(crate) submitted_at: Option<String>,
    pub(crate) created_at: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct ExamResultResponse {
    pub(crate) submission: SubmissionView,
    pub(crate) pass: bool,
    pub(crate) pass_score: i32,
    pub(crate) accuracy: f64,
}

#[derive(Debug, Serialize)]
pub(crate) struct MySubmissionResponse {
    #[serde(flatten)]
    pub(crate) submission: SubmissionView,
    pub(crate) passed: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct SubjectSummary {
    pub(crate) id: i64,
    pub(crate) subject_name: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct UserSummary {
    pub(crate) id: String,
    pub(crate) full_name: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct PaperSummary {
    pub(crate) id: i64,
    pub(crate) name: String,
    pub(crate) subject: SubjectSummary,
    pub(crate) question_count: i32,
    pub(crate) total_score: i32,
    pub(crate) passing_score: i32,
    pub(crate) created_at: String,
    pub(crate) updated_at: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct AvailableExam {
    pub(crate) id: i64,
    pub(crate) exam_name: String,
    pub(crate) testpaper: PaperSummary,
    pub(crate) start_time: String,
    pub(crate) end_time: String,
    pub(crate) create_user: UserSummary,
    pub(crate) created_at: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct AvailableExamsResponse {
    pub(crate) count: usize,
    pub(crate) results: Vec<AvailableExam>,
}

/// Clients send answers as strings or bare numbers; both are kept as text.
fn deserialize_answer<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error as _;

    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Null => Ok(String::new()),
        serde_json::Value::String(text) => Ok(text),
        serde_json::Value::Number(number) => Ok(number.to_string()),
        serde_json::Value::Bool(flag) => Ok(flag.to_string()),
        other => Err(D::Error::custom(format!("answer must be a string or number, got {other}"))),
    }
}

fn validate_answer_count(answers: &[AnswerPayload]) -> Result<(), ValidationError> {
    if answers.len() > MAX_ANSWERS_PER_REQUEST {
        return Err(ValidationError::new("too_many_answers")
            .with_message("too many answers".into()));
    }
    Ok(())
}

fn validate_draft_entries(
    answers: &serde_json::Map<String, serde_json::Value>,
) -> Result<(), ValidationError> {
    if answers.len() > MAX_ANSWERS_PER_REQUEST {
        return Err(ValidationError::new("too_many_answers")
            .with_message("draft holds too many answers".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn answer_accepts_text_numbers_and_null() {
        let text: AnswerPayload =
            serde_json::from_value(json!({"question_id": 1, "answer": "10"})).unwrap();
        let number: AnswerPayload =
            serde_json::from_value(json!({"question_id": 1, "answer": 10})).unwrap();
        let null: AnswerPayload =
            serde_json::from_value(json!({"question_id": 1, "answer": null})).unwrap();
        let missing: AnswerPayload =
            serde_json::from_value(json!({"question_id": 1, "selected_options": [3]})).unwrap();

        assert_eq!(text.answer, "10");
        assert_eq!(number.answer, "10");
        assert_eq!(null.answer, "");
        assert_eq!(missing.answer, "");
        assert_eq!(missing.selected_options, vec![3]);
    }

    #[test]
    fn answer_rejects_structured_values() {
        let result = serde_json::from_value::<AnswerPayload>(
            json!({"question_id": 1, "answer": {"nested": true}}),
        );
        assert!(result.is_err());
    }

    #[test]
    fn nested_answers_are_validated() {
        let request: SubmitRequest = serde_json::from_value(json!({
            "answers": [{"question_id": 0, "answer": "1"}]
        }))
        .unwrap();

        assert!(request.validate().is_err());
    }

    #[test]
    fn empty_submit_body_defaults_to_no_answers() {
        let request: SubmitRequest = serde_json::from_value(json!({})).unwrap();
        assert!(request.answers.is_empty());
        assert!(request.validate().is_ok());
    }

    #[test]
    fn oversized_submission_is_rejected() {
        let answers = (1..=MAX_ANSWERS_PER_REQUEST as i64 + 1)
            .map(|question_id| AnswerPayload {
                question_id,
                answer: "1".to_string(),
                selected_options: Vec::new(),
            })
            .collect::<Vec<_>>();

        let at_limit = SubmitRequest { answers: answers[..MAX_ANSWERS_PER_REQUEST].to_vec() };
        assert!(at_limit.validate().is_ok());

        let over_limit = SubmitRequest { answers };
        let errors = over_limit.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("answers"));
    }

    #[test]
    fn oversized_draft_is_rejected() {
        let answers = (0..=MAX_ANSWERS_PER_REQUEST)
            .map(|id| (id.to_string(), json!({"answer": "1"})))
            .collect::<serde_json::Map<_, _>>();
        let request = SaveDraftRequest { answers };

        assert!(request.validate().is_err());
    }
}
