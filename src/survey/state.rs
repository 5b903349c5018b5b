//! Survey session state machine — step navigation gated on completion.

use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use super::answers::AnswerStore;
use super::schema::{Step, SurveySchema};
use crate::error::SurveyError;

/// Outcome of a transition request.
///
/// Transitions whose precondition fails are no-ops rather than errors, so a
/// stale button press never faults the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Applied,
    Ignored,
}

impl Transition {
    pub fn applied(self) -> bool {
        matches!(self, Self::Applied)
    }
}

/// Whether every question in `step` has a non-blank answer.
///
/// A step with no questions is vacuously complete.
pub fn is_step_complete(step: &Step, answers: &AnswerStore) -> bool {
    step.questions
        .iter()
        .all(|q| answers.is_answered(&step.id, &q.id))
}

/// A single pass through the survey.
///
/// Progresses linearly from step 0 to step N-1, then to `finished` exactly
/// once. After that no transition has any effect.
#[derive(Debug, Clone)]
pub struct SurveySession {
    id: Uuid,
    schema: Arc<SurveySchema>,
    current_step_index: usize,
    answers: AnswerStore,
    finished: bool,
}

impl SurveySession {
    /// Start a session at step 0 with no answers.
    ///
    /// The schema is validated first, so a session always has a current step.
    pub fn new(schema: Arc<SurveySchema>) -> Result<Self, SurveyError> {
        schema.validate()?;
        Ok(Self::fresh(schema))
    }

    fn fresh(schema: Arc<SurveySchema>) -> Self {
        Self {
            id: Uuid::new_v4(),
            schema,
            current_step_index: 0,
            answers: AnswerStore::new(),
            finished: false,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn answers(&self) -> &AnswerStore {
        &self.answers
    }

    pub fn current_step_index(&self) -> usize {
        self.current_step_index
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn step_count(&self) -> usize {
        self.schema.step_count()
    }

    pub fn current_step(&self) -> &Step {
        &self.schema.steps[self.current_step_index]
    }

    pub fn is_last_step(&self) -> bool {
        self.current_step_index + 1 >= self.step_count()
    }

    pub fn is_current_step_complete(&self) -> bool {
        is_step_complete(self.current_step(), &self.answers)
    }

    /// Percentage of the survey reached, counting the current step.
    pub fn progress_percent(&self) -> f64 {
        (self.current_step_index + 1) as f64 / self.step_count() as f64 * 100.0
    }

    pub fn can_advance(&self) -> bool {
        !self.finished && !self.is_last_step() && self.is_current_step_complete()
    }

    pub fn can_retreat(&self) -> bool {
        !self.finished && self.current_step_index > 0
    }

    pub fn can_submit(&self) -> bool {
        !self.finished && self.is_last_step() && self.is_current_step_complete()
    }

    /// Record an answer. Ignored once the session is finished.
    pub fn set_answer(
        &mut self,
        step_id: impl Into<String>,
        question_id: impl Into<String>,
        value: impl Into<String>,
    ) -> Transition {
        if self.finished {
            return Transition::Ignored;
        }
        self.answers.set(step_id, question_id, value);
        Transition::Applied
    }

    /// Move to the next step if the current one is complete.
    pub fn advance(&mut self) -> Transition {
        if !self.can_advance() {
            debug!(session_id = %self.id, step = self.current_step_index, "advance ignored");
            return Transition::Ignored;
        }
        self.current_step_index += 1;
        debug!(session_id = %self.id, step = self.current_step_index, "advanced");
        Transition::Applied
    }

    /// Move back one step. No completion requirement.
    pub fn retreat(&mut self) -> Transition {
        if !self.can_retreat() {
            debug!(session_id = %self.id, step = self.current_step_index, "retreat ignored");
            return Transition::Ignored;
        }
        self.current_step_index -= 1;
        debug!(session_id = %self.id, step = self.current_step_index, "retreated");
        Transition::Applied
    }

    /// Finish the survey from a complete final step.
    pub fn submit(&mut self) -> Transition {
        if !self.can_submit() {
            debug!(session_id = %self.id, step = self.current_step_index, "submit ignored");
            return Transition::Ignored;
        }
        self.finished = true;
        debug!(session_id = %self.id, "survey submitted");
        Transition::Applied
    }

    /// Discard this session and start over on the same schema.
    pub fn restart(&mut self) {
        *self = Self::fresh(Arc::clone(&self.schema));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::survey::schema::Question;

    fn two_step_schema() -> Arc<SurveySchema> {
        Arc::new(
            SurveySchema::new(vec![
                Step::new(
                    "a",
                    "A",
                    "",
                    vec![Question::short_text("q1", "One?"), Question::long_text("q2", "Two?")],
                ),
                Step::new("b", "B", "", vec![Question::choice("q1", "Pick", ["x", "y"])]),
            ])
            .unwrap(),
        )
    }

    fn answer_step_a(session: &mut SurveySession) {
        session.set_answer("a", "q1", "yes");
        session.set_answer("a", "q2", "also yes");
    }

    #[test]
    fn new_session_starts_at_zero() {
        let session = SurveySession::new(two_step_schema()).unwrap();
        assert_eq!(session.current_step_index(), 0);
        assert!(!session.is_finished());
        assert!(session.answers().is_empty());
        assert_eq!(session.progress_percent(), 50.0);
    }

    #[test]
    fn invalid_schema_cannot_start_a_session() {
        let empty = Arc::new(SurveySchema { steps: vec![] });
        assert!(matches!(SurveySession::new(empty), Err(SurveyError::Empty)));

        let duplicate = Arc::new(SurveySchema {
            steps: vec![
                Step::new("a", "A", "", vec![]),
                Step::new("a", "Again", "", vec![]),
            ],
        });
        assert!(matches!(
            SurveySession::new(duplicate),
            Err(SurveyError::DuplicateStep(id)) if id == "a"
        ));
    }

    #[test]
    fn completion_requires_every_question() {
        let schema = two_step_schema();
        let mut answers = AnswerStore::new();
        assert!(!is_step_complete(&schema.steps[0], &answers));
        answers.set("a", "q1", "yes");
        assert!(!is_step_complete(&schema.steps[0], &answers));
        answers.set("a", "q2", "   ");
        assert!(!is_step_complete(&schema.steps[0], &answers));
        answers.set("a", "q2", "ok");
        assert!(is_step_complete(&schema.steps[0], &answers));
    }

    #[test]
    fn empty_step_is_vacuously_complete() {
        let step = Step::new("empty", "Empty", "", vec![]);
        assert!(is_step_complete(&step, &AnswerStore::new()));
    }

    #[test]
    fn advance_is_gated_on_completion() {
        let mut session = SurveySession::new(two_step_schema()).unwrap();
        assert_eq!(session.advance(), Transition::Ignored);
        assert_eq!(session.current_step_index(), 0);

        session.set_answer("a", "q1", "yes");
        assert_eq!(session.advance(), Transition::Ignored);
        assert_eq!(session.current_step_index(), 0);

        session.set_answer("a", "q2", "also yes");
        assert_eq!(session.advance(), Transition::Applied);
        assert_eq!(session.current_step_index(), 1);
        assert_eq!(session.progress_percent(), 100.0);
    }

    #[test]
    fn advance_never_passes_last_step() {
        let mut session = SurveySession::new(two_step_schema()).unwrap();
        answer_step_a(&mut session);
        session.advance();
        session.set_answer("b", "q1", "x");
        assert_eq!(session.advance(), Transition::Ignored);
        assert_eq!(session.current_step_index(), 1);
    }

    #[test]
    fn retreat_stops_at_zero_and_ignores_completion() {
        let mut session = SurveySession::new(two_step_schema()).unwrap();
        assert_eq!(session.retreat(), Transition::Ignored);
        assert_eq!(session.current_step_index(), 0);

        answer_step_a(&mut session);
        session.advance();
        // Step "b" is unanswered, retreat still allowed.
        assert_eq!(session.retreat(), Transition::Applied);
        assert_eq!(session.current_step_index(), 0);
    }

    #[test]
    fn submit_only_from_complete_last_step() {
        let mut session = SurveySession::new(two_step_schema()).unwrap();
        answer_step_a(&mut session);
        assert_eq!(session.submit(), Transition::Ignored, "not on last step");
        assert!(!session.is_finished());

        session.advance();
        assert_eq!(session.submit(), Transition::Ignored, "last step incomplete");
        assert!(!session.is_finished());

        session.set_answer("b", "q1", "y");
        assert_eq!(session.submit(), Transition::Applied);
        assert!(session.is_finished());
    }

    #[test]
    fn finished_is_terminal() {
        let mut session = SurveySession::new(two_step_schema()).unwrap();
        answer_step_a(&mut session);
        session.advance();
        session.set_answer("b", "q1", "y");
        session.submit();

        let before = session.answers().clone();
        assert_eq!(session.advance(), Transition::Ignored);
        assert_eq!(session.retreat(), Transition::Ignored);
        assert_eq!(session.submit(), Transition::Ignored);
        assert_eq!(session.set_answer("b", "q1", "x"), Transition::Ignored);
        assert_eq!(session.current_step_index(), 1);
        assert!(session.is_finished());
        assert_eq!(session.answers(), &before);
    }

    #[test]
    fn set_answer_keeps_index_and_flag() {
        let mut session = SurveySession::new(two_step_schema()).unwrap();
        session.set_answer("b", "q1", "x");
        assert_eq!(session.current_step_index(), 0);
        assert!(!session.is_finished());
        assert_eq!(session.answers().get("b", "q1"), "x");
    }

    #[test]
    fn single_step_survey_submits_directly() {
        let schema = Arc::new(
            SurveySchema::new(vec![Step::new(
                "only",
                "Only",
                "",
                vec![Question::choice("c", "Pick", ["red", "blue"]), Question::short_text("t", "Why?")],
            )])
            .unwrap(),
        );
        let mut session = SurveySession::new(schema).unwrap();
        assert!(session.is_last_step());
        session.set_answer("only", "c", "blue");
        session.set_answer("only", "t", "x");
        assert!(session.is_current_step_complete());
        assert_eq!(session.submit(), Transition::Applied);
        assert!(session.is_finished());
    }

    #[test]
    fn restart_discards_everything() {
        let mut session = SurveySession::new(two_step_schema()).unwrap();
        let first_id = session.id();
        answer_step_a(&mut session);
        session.advance();
        session.restart();
        assert_ne!(session.id(), first_id);
        assert_eq!(session.current_step_index(), 0);
        assert!(session.answers().is_empty());
        assert!(!session.is_finished());
    }
}
