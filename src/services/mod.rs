pub(crate) mod answer_key;
pub(crate) mod attempt_ledger;
pub(crate) mod exam_taking;
pub(crate) mod exam_window;
pub(crate) mod grading;
