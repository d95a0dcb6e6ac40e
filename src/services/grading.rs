//! Scores submitted answers against an [`AnswerKey`]. Pure: all lookups happen
//! before grading starts.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::services::answer_key::AnswerKey;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) struct SubmittedAnswer {
    pub(crate) question_id: i64,
    pub(crate) answer: String,
    pub(crate) selected_options: Vec<i64>,
}

/// Stored per question once an attempt is finalized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct GradedRecord {
    #[serde(default)]
    pub(crate) answer: String,
    #[serde(default)]
    pub(crate) selected_options: Vec<i64>,
    #[serde(default)]
    pub(crate) is_correct: bool,
    #[serde(default)]
    pub(crate) score: i32,
    #[serde(default)]
    pub(crate) max_score: i32,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct GradeReport {
    pub(crate) total: i32,
    pub(crate) records: BTreeMap<i64, GradedRecord>,
}

impl GradeReport {
    /// Detail-record map keyed by the question id rendered as a string.
    pub(crate) fn records_json(&self) -> serde_json::Value {
        let map = self
            .records
            .iter()
            .map(|(question_id, record)| {
                let value = serde_json::to_value(record).unwrap_or(serde_json::Value::Null);
                (question_id.to_string(), value)
            })
            .collect::<serde_json::Map<_, _>>();
        serde_json::Value::Object(map)
    }
}

pub(crate) fn grade(key: &AnswerKey, answers: &[SubmittedAnswer]) -> GradeReport {
    let mut records = BTreeMap::new();

    for submitted in answers {
        let Some(entry) = key.get(submitted.question_id) else {
            continue;
        };

        let is_correct = match entry.correct_option_id {
            Some(correct) if entry.question_type.is_auto_gradable() => {
                if submitted.selected_options.is_empty() {
                    submitted.answer == correct.to_string()
                } else {
                    submitted.selected_options.contains(&correct)
                }
            }
            _ => false,
        };

        let record = GradedRecord {
            answer: submitted.answer.clone(),
            selected_options: submitted.selected_options.clone(),
            is_correct,
            score: if is_correct { entry.max_score } else { 0 },
            max_score: entry.max_score,
        };
        // Repeated question ids: the last one wins.
        records.insert(submitted.question_id, record);
    }

    let total = records.values().map(|record| record.score).sum();
    GradeReport { total, records }
}

/// Rebuilds answers from a saved draft map for auto-submission. Each entry
/// contributes its `answer` field; keys that are not question ids are ignored.
pub(crate) fn answers_from_draft(draft: &serde_json::Value) -> Vec<SubmittedAnswer> {
    let Some(map) = draft.as_object() else {
        return Vec::new();
    };

    let mut answers: Vec<SubmittedAnswer> = map
        .iter()
        .filter_map(|(key, entry)| {
            let question_id = key.trim().parse::<i64>().ok()?;
            let answer = match entry.get("answer") {
                Some(serde_json::Value::String(text)) => text.clone(),
                Some(serde_json::Value::Number(number)) => number.to_string(),
                _ => String::new(),
            };
            Some(SubmittedAnswer { question_id, answer, selected_options: Vec::new() })
        })
        .collect();

    answers.sort_by_key(|answer| answer.question_id);
    answers
}

/// Reads a stored detail-record map back. Entries that are not objects are
/// skipped; missing fields fall back to defaults.
pub(crate) fn parse_records(records: &serde_json::Value) -> BTreeMap<i64, GradedRecord> {
    let Some(map) = records.as_object() else {
        return BTreeMap::new();
    };

    map.iter()
        .filter_map(|(key, value)| {
            let question_id = key.trim().parse::<i64>().ok()?;
            if !value.is_object() {
                return None;
            }
            let record = serde_json::from_value::<GradedRecord>(value.clone()).ok()?;
            Some((question_id, record))
        })
        .collect()
}
