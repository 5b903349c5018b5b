//! ADDIE instructional-design phases shown alongside a proposal.

/// `(phase, description)` in model order.
pub const ADDIE_PHASES: &[(&str, &str)] = &[
    (
        "Analysis",
        "Based on the survey results, the organization's current situation, training goals and \
         learner characteristics were analyzed to establish why training is needed and where it \
         should go.",
    ),
    (
        "Design",
        "Turns the analysis into concrete learning objectives, designs the learning experience \
         and sets the evaluation strategy. The generated proposal provides the blueprint for this \
         design.",
    ),
    (
        "Development",
        "Builds the actual course content and materials from the blueprint. Lesson plans, \
         workbooks and audiovisual material can be produced from the proposed curriculum.",
    ),
    (
        "Implementation",
        "Delivers the developed program to real learners. Use the proposed delivery methods to \
         plan effective sessions and operations.",
    ),
    (
        "Evaluation",
        "Measures the program's effect systematically. Use the proposed evaluation plan to \
         confirm outcomes and find improvements.",
    ),
];

/// Render the phases as a plain-text section for the terminal.
pub fn addie_overview() -> String {
    let mut out = String::from("Training direction (ADDIE model)\n\n");
    for (phase, description) in ADDIE_PHASES {
        let initial = phase.chars().next().unwrap_or(' ');
        out.push_str(&format!("[{initial}] {phase}\n    {description}\n"));
    }
    out
}
