//! Proposal generation prompt built from the schema and the recorded answers.

use super::answers::AnswerStore;
use super::schema::SurveySchema;

/// Substituted for questions that have no (or only blank) answer.
pub const NO_RESPONSE: &str = "no response";

const SURVEY_HEADER: &str = "HRD training needs survey results:";

const CONSULTANT_PERSONA: &str = "\
You are a leading corporate training (HRD) consultant. Based on the training needs \
survey results below, write a professional, actionable training program proposal.";

const PROPOSAL_GUIDELINES: &str = "\
**Proposal guidelines:**

Write a structured, persuasive proposal that includes the following sections.

1.  **Proposed course titles:** Synthesize the survey results into 2-3 compelling course titles that capture the core of the training.
2.  **Learning objectives:** State concrete, measurable objectives (KSA) learners should reach after the training.
3.  **Target audience:** Refine the audience based on the key roles and levels named in the survey.
4.  **Expected outcomes:** Describe specifically how the training contributes to solving the business challenge and reaching the performance goals.
5.  **Curriculum (draft):** Present modules, key content, delivery method, and time allocation as a table. Use markdown table syntax.
6.  **Delivery methods:** Propose the most effective methodology given learner preferences and the objectives (e.g. workshops, action learning, blended learning).
7.  **Evaluation plan:** Propose a multi-level plan for measuring training effectiveness (e.g. pre/post assessment, satisfaction survey, on-the-job transfer evaluation).

Throughout, show in-depth analysis and insight from an expert's perspective.";

/// Render every step and answer as the survey-results section of the prompt.
///
/// Every question of every step is listed, in schema order.
pub fn format_survey_results(schema: &SurveySchema, answers: &AnswerStore) -> String {
    let mut out = format!("{SURVEY_HEADER}\n\n");

    for step in &schema.steps {
        out.push_str(&format!("**{}**\n", step.title));
        for question in &step.questions {
            let answer = answers.get(&step.id, &question.id);
            let answer = if answer.trim().is_empty() {
                NO_RESPONSE
            } else {
                answer
            };
            out.push_str(&format!("- {}\n  - Answer: {}\n", question.text, answer));
        }
        out.push('\n');
    }

    out
}

/// Build the full instruction sent to the text-generation service.
///
/// Deterministic: the same schema and answers always yield the same prompt.
pub fn build_prompt(schema: &SurveySchema, answers: &AnswerStore) -> String {
    let results = format_survey_results(schema, answers);
    format!("{CONSULTANT_PERSONA}\n\n---\n{results}---\n\n{PROPOSAL_GUIDELINES}\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::survey::schema::{Question, Step};

    fn single_step() -> SurveySchema {
        SurveySchema::new(vec![Step::new(
            "only",
            "Only step",
            "",
            vec![
                Question::choice("c", "Which color?", ["red", "blue"]),
                Question::short_text("t", "Anything else?"),
            ],
        )])
        .unwrap()
    }

    #[test]
    fn prompt_contains_questions_and_answers_verbatim() {
        let schema = single_step();
        let mut answers = AnswerStore::new();
        answers.set("only", "c", "blue");
        answers.set("only", "t", "x");

        let prompt = build_prompt(&schema, &answers);
        assert!(prompt.contains("**Only step**"));
        assert!(prompt.contains("- Which color?\n  - Answer: blue\n"));
        assert!(prompt.contains("- Anything else?\n  - Answer: x\n"));
        assert!(!prompt.contains(NO_RESPONSE));
    }

    #[test]
    fn missing_and_blank_answers_use_placeholder() {
        let schema = single_step();
        let mut answers = AnswerStore::new();
        answers.set("only", "t", "  ");

        let results = format_survey_results(&schema, &answers);
        assert_eq!(results.matches(NO_RESPONSE).count(), 2);
    }

    #[test]
    fn every_step_title_is_listed_even_without_answers() {
        let schema = SurveySchema::hrd_needs_analysis();
        let prompt = build_prompt(&schema, &AnswerStore::new());
        for step in &schema.steps {
            assert!(prompt.contains(&step.title), "missing {}", step.title);
            for question in &step.questions {
                assert!(prompt.contains(&question.text));
            }
        }
    }

    #[test]
    fn prompt_names_required_sections() {
        let prompt = build_prompt(&single_step(), &AnswerStore::new());
        for section in [
            "Proposed course titles",
            "Learning objectives",
            "Target audience",
            "Expected outcomes",
            "Curriculum",
            "Delivery methods",
            "Evaluation plan",
        ] {
            assert!(prompt.contains(section), "missing section {section}");
        }
        assert!(prompt.contains("markdown table"));
    }

    #[test]
    fn prompt_is_deterministic() {
        let schema = SurveySchema::hrd_needs_analysis();
        let mut answers = AnswerStore::new();
        answers.set("step1", "q2", "Raise NPS by 10 points");
        assert_eq!(build_prompt(&schema, &answers), build_prompt(&schema, &answers));
    }

    #[test]
    fn results_are_fenced_by_rules() {
        let prompt = build_prompt(&single_step(), &AnswerStore::new());
        let header_at = prompt.find(SURVEY_HEADER).unwrap();
        let first_rule = prompt.find("---\n").unwrap();
        assert!(first_rule < header_at);
        assert!(prompt[header_at..].contains("---\n\n**Proposal guidelines:**"));
    }
}
