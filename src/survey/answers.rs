//! Answer store — accumulated responses keyed by step and question id.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Answers for a single step, keyed by question id.
pub type StepAnswers = BTreeMap<String, String>;

/// stepId → questionId → answer.
///
/// Absent entries read the same as empty strings. Entries are only ever
/// inserted or overwritten, never removed. Serializes as a plain nested
/// object, which is the `surveyData` wire shape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerStore {
    steps: BTreeMap<String, StepAnswers>,
}

impl AnswerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite one answer.
    pub fn set(
        &mut self,
        step_id: impl Into<String>,
        question_id: impl Into<String>,
        value: impl Into<String>,
    ) {
        self.steps
            .entry(step_id.into())
            .or_default()
            .insert(question_id.into(), value.into());
    }

    /// The recorded answer, or `""` when nothing was recorded.
    pub fn get(&self, step_id: &str, question_id: &str) -> &str {
        self.steps
            .get(step_id)
            .and_then(|answers| answers.get(question_id))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Whether a question has a non-blank answer.
    pub fn is_answered(&self, step_id: &str, question_id: &str) -> bool {
        !self.get(step_id, question_id).trim().is_empty()
    }

    pub fn step(&self, step_id: &str) -> Option<&StepAnswers> {
        self.steps.get(step_id)
    }

    pub fn is_empty(&self) -> bool {
        self.steps.values().all(|answers| answers.is_empty())
    }

    /// Number of recorded answers across all steps, blank ones included.
    pub fn answer_count(&self) -> usize {
        self.steps.values().map(|answers| answers.len()).sum()
    }
}

impl From<BTreeMap<String, StepAnswers>> for AnswerStore {
    fn from(steps: BTreeMap<String, StepAnswers>) -> Self {
        Self { steps }
    }
}
