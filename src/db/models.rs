use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use time::PrimitiveDateTime;

use crate::db::types::{DifficultyLevel, ExamState, QuestionType, UserRole};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct User {
    pub(crate) id: String,
    pub(crate) username: String,
    pub(crate) full_name: String,
    pub(crate) role: UserRole,
    pub(crate) is_active: bool,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct StudentProfile {
    pub(crate) id: i64,
    pub(crate) user_id: String,
    pub(crate) student_name: String,
    pub(crate) created_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Examination {
    pub(crate) id: i64,
    pub(crate) subject_id: i64,
    pub(crate) subject_name: String,
    pub(crate) name: String,
    pub(crate) start_time: PrimitiveDateTime,
    pub(crate) end_time: PrimitiveDateTime,
    pub(crate) state: ExamState,
    pub(crate) enrollment_count: i32,
    pub(crate) created_by: String,
    pub(crate) created_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct TestPaper {
    pub(crate) id: i64,
    pub(crate) subject_id: i64,
    pub(crate) name: String,
    pub(crate) total_score: i32,
    pub(crate) passing_score: i32,
    pub(crate) question_count: i32,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Question {
    pub(crate) id: i64,
    pub(crate) subject_id: i64,
    pub(crate) name: String,
    pub(crate) question_type: QuestionType,
    pub(crate) difficulty: DifficultyLevel,
    pub(crate) default_score: i32,
    pub(crate) image: Option<String>,
    pub(crate) is_archived: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct QuestionOption {
    pub(crate) id: i64,
    pub(crate) question_id: i64,
    pub(crate) option_text: String,
    pub(crate) is_correct: bool,
}

/// A question as it appears on a specific paper: the question row plus the
/// link's weight and position.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct PaperQuestion {
    pub(crate) question_id: i64,
    pub(crate) name: String,
    pub(crate) question_type: QuestionType,
    pub(crate) difficulty: DifficultyLevel,
    pub(crate) image: Option<String>,
    pub(crate) score: i32,
    pub(crate) order_index: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct ExamAttempt {
    pub(crate) id: i64,
    pub(crate) exam_id: i64,
    pub(crate) student_id: i64,
    pub(crate) test_paper_id: Option<i64>,
    pub(crate) started_at: Option<PrimitiveDateTime>,
    pub(crate) submitted_at: Option<PrimitiveDateTime>,
    pub(crate) is_submitted: bool,
    pub(crate) is_auto_submitted: bool,
    pub(crate) score: i32,
    pub(crate) time_used_minutes: Option<i32>,
    pub(crate) detail_records: Json<serde_json::Value>,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}
