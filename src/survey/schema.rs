//! Survey schema — the static step/question configuration.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::SurveyError;

/// What kind of input a question takes.
///
/// Serialized with the wire names used by the web form
/// (`multiple-choice`, `text`, `textarea`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum QuestionKind {
    #[serde(rename = "multiple-choice")]
    Choice { options: Vec<String> },
    #[serde(rename = "text")]
    ShortText,
    #[serde(rename = "textarea")]
    LongText,
}

impl std::fmt::Display for QuestionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Choice { .. } => write!(f, "multiple-choice"),
            Self::ShortText => write!(f, "text"),
            Self::LongText => write!(f, "textarea"),
        }
    }
}

/// A single survey question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub text: String,
    #[serde(flatten)]
    pub kind: QuestionKind,
}

impl Question {
    pub fn choice<I, S>(id: impl Into<String>, text: impl Into<String>, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: id.into(),
            text: text.into(),
            kind: QuestionKind::Choice {
                options: options.into_iter().map(Into::into).collect(),
            },
        }
    }

    pub fn short_text(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            kind: QuestionKind::ShortText,
        }
    }

    pub fn long_text(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            kind: QuestionKind::LongText,
        }
    }

    /// The choice set, if this is a choice question.
    pub fn options(&self) -> Option<&[String]> {
        match &self.kind {
            QuestionKind::Choice { options } => Some(options),
            _ => None,
        }
    }
}

/// A titled group of questions shown together as one page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub id: String,
    pub title: String,
    pub description: String,
    pub questions: Vec<Question>,
}

impl Step {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        questions: Vec<Question>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: description.into(),
            questions,
        }
    }
}

/// The ordered list of steps making up a survey.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveySchema {
    pub steps: Vec<Step>,
}

impl SurveySchema {
    /// Build a schema, rejecting empty surveys, duplicate ids, and choice
    /// questions without options.
    pub fn new(steps: Vec<Step>) -> Result<Self, SurveyError> {
        let schema = Self { steps };
        schema.validate()?;
        Ok(schema)
    }

    pub fn validate(&self) -> Result<(), SurveyError> {
        if self.steps.is_empty() {
            return Err(SurveyError::Empty);
        }

        let mut step_ids = HashSet::new();
        for step in &self.steps {
            if !step_ids.insert(step.id.as_str()) {
                return Err(SurveyError::DuplicateStep(step.id.clone()));
            }

            let mut question_ids = HashSet::new();
            for question in &step.questions {
                if !question_ids.insert(question.id.as_str()) {
                    return Err(SurveyError::DuplicateQuestion {
                        step_id: step.id.clone(),
                        question_id: question.id.clone(),
                    });
                }
                if matches!(question.options(), Some(options) if options.is_empty()) {
                    return Err(SurveyError::MissingOptions {
                        step_id: step.id.clone(),
                        question_id: question.id.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// The four-step HRD training needs analysis.
    pub fn hrd_needs_analysis() -> Self {
        Self {
            steps: vec![
                Step::new(
                    "step1",
                    "Step 1: Organization Diagnosis",
                    "Understand the situation the organization faces and why training is needed.",
                    vec![
                        Question::choice(
                            "q1",
                            "What is the biggest business challenge your organization currently faces?",
                            [
                                "Declining market share",
                                "No growth engine for new business",
                                "Loss of key talent",
                                "Falling productivity",
                                "Other",
                            ],
                        ),
                        Question::short_text(
                            "q2",
                            "What specific performance goal should the training help achieve?",
                        ),
                        Question::choice(
                            "q3",
                            "Which role or level most urgently needs training?",
                            [
                                "New hires",
                                "Practitioners (junior)",
                                "Middle managers (senior / team lead)",
                                "Executives",
                                "Company-wide",
                            ],
                        ),
                    ],
                ),
                Step::new(
                    "step2",
                    "Step 2: Training Goals",
                    "Set the concrete goals (KSA) the training should achieve.",
                    vec![
                        Question::long_text(
                            "q1",
                            "What knowledge should participants acquire after the training?",
                        ),
                        Question::long_text(
                            "q2",
                            "What skills should participants be able to apply proficiently after the training?",
                        ),
                        Question::long_text(
                            "q3",
                            "What change in attitude do you expect from participants after the training?",
                        ),
                    ],
                ),
                Step::new(
                    "step3",
                    "Step 3: Learner Analysis",
                    "Analyze the characteristics of the learners who will take part.",
                    vec![
                        Question::choice(
                            "q1",
                            "What is the average work experience of the target group?",
                            [
                                "Less than 1 year",
                                "1-3 years",
                                "4-7 years",
                                "8-10 years",
                                "More than 10 years",
                            ],
                        ),
                        Question::choice(
                            "q2",
                            "How would you rate the target group's current job competency?",
                            ["Basic", "Intermediate", "Advanced"],
                        ),
                        Question::choice(
                            "q3",
                            "Which learning style does the target group prefer most?",
                            [
                                "Lecture / theory",
                                "Discussion / case study",
                                "Hands-on / workshop",
                                "Online / micro-learning",
                                "Coaching / mentoring",
                            ],
                        ),
                    ],
                ),
                Step::new(
                    "step4",
                    "Step 4: Environment Analysis",
                    "Check the organizational factors that affect delivering the training.",
                    vec![
                        Question::choice(
                            "q1",
                            "What budget range is available for the training?",
                            ["Unlimited", "Ample", "Moderate", "Tight"],
                        ),
                        Question::choice(
                            "q2",
                            "How much total time can be invested in the training?",
                            [
                                "Up to 4 hours",
                                "1 day (8 hours)",
                                "2 days (16 hours)",
                                "3 days or more",
                                "Long-term program (1 month or more)",
                            ],
                        ),
                        Question::choice(
                            "q3",
                            "How strongly does leadership support the training?",
                            ["Very active", "Active", "Neutral", "Passive"],
                        ),
                    ],
                ),
            ],
        }
    }
}

impl Default for SurveySchema {
    fn default() -> Self {
        Self::hrd_needs_analysis()
    }
}
