use serde::{Deserialize, Serialize};
use sqlx::Type;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "userrole", rename_all = "lowercase")]
pub(crate) enum UserRole {
    Admin,
    Teacher,
    Student,
}

/// Stored lifecycle state of an examination. Advisory only: the taking flow
/// compares the clock against `start_time`/`end_time` instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "examstate", rename_all = "lowercase")]
pub(crate) enum ExamState {
    Scheduled,
    Open,
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "questiontype", rename_all = "snake_case")]
pub(crate) enum QuestionType {
    Objective,
    TrueFalse,
    FreeText,
}

impl QuestionType {
    /// Whether answers to this type can be checked against a single correct option.
    pub(crate) fn is_auto_gradable(self) -> bool {
        matches!(self, Self::Objective | Self::TrueFalse)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "difficultylevel", rename_all = "lowercase")]
pub(crate) enum DifficultyLevel {
    Easy,
    Medium,
    Hard,
}

#[cfg(test)]
mod tests {
    use super::QuestionType;

    #[test]
    fn only_option_based_types_are_auto_gradable() {
        assert!(QuestionType::Objective.is_auto_gradable());
        assert!(QuestionType::TrueFalse.is_auto_gradable());
        assert!(!QuestionType::FreeText.is_auto_gradable());
    }

    #[test]
    fn question_type_serializes_snake_case() {
        let value = serde_json::to_value(QuestionType::TrueFalse).unwrap();
        assert_eq!(value, serde_json::json!("true_false"));
    }
}
