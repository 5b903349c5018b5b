//! Terminal survey form — stdin/stdout REPL over a `SurveySession`.

use std::fmt::Write as _;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::RwLock;
use tracing::warn;

use crate::proposal::addie::addie_overview;
use crate::proposal::{ProposalRequestor, ProposalView};
use crate::settings::ThemeSettings;
use crate::survey::{QuestionKind, SurveySession};

const HELP: &str = "\
Commands:
  <n> <answer>   answer question n (for choices, the option number or text)
  <n>            clear the answer to question n
  :next          go to the next step (every question must be answered)
  :back          go to the previous step
  :submit        finish the survey on the last step and request a proposal
  :retry         request the proposal again after a failure
  :theme         toggle light/dark
  :restart       start a new survey
  :quit          exit";

/// A parsed line of input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `question` is 1-based as shown on screen.
    Answer { question: usize, value: String },
    Next,
    Back,
    Submit,
    Retry,
    Theme,
    Restart,
    Help,
    Quit,
}

impl Command {
    pub fn parse(line: &str) -> Result<Self, String> {
        let line = line.trim();
        if let Some(word) = line.strip_prefix(':') {
            return match word.to_ascii_lowercase().as_str() {
                "next" | "n" => Ok(Self::Next),
                "back" | "b" => Ok(Self::Back),
                "submit" => Ok(Self::Submit),
                "retry" => Ok(Self::Retry),
                "theme" => Ok(Self::Theme),
                "restart" => Ok(Self::Restart),
                "help" | "h" | "?" => Ok(Self::Help),
                "quit" | "q" | "exit" => Ok(Self::Quit),
                other => Err(format!("Unknown command ':{other}'. Type :help for a list.")),
            };
        }

        let (number, value) = match line.split_once(char::is_whitespace) {
            Some((n, rest)) => (n, rest.trim()),
            None => (line, ""),
        };
        match number.parse::<usize>() {
            Ok(question) if question > 0 => Ok(Self::Answer {
                question,
                value: value.to_string(),
            }),
            _ => Err("Start with a question number (e.g. `1 Sales`) or a :command.".to_string()),
        }
    }
}

/// What the caller should do after a line has been handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Print(String),
    /// The survey is finished; call `request_proposal` (it may take a while).
    RequestProposal,
    Quit,
}

/// Interactive survey over stdin/stdout.
pub struct SurveyRepl {
    session: SurveySession,
    requestor: ProposalRequestor,
    theme: Arc<RwLock<ThemeSettings>>,
    view: Option<ProposalView>,
}

impl SurveyRepl {
    pub fn new(
        session: SurveySession,
        requestor: ProposalRequestor,
        theme: Arc<RwLock<ThemeSettings>>,
    ) -> Self {
        Self {
            session,
            requestor,
            theme,
            view: None,
        }
    }

    pub fn session(&self) -> &SurveySession {
        &self.session
    }

    pub fn view(&self) -> Option<&ProposalView> {
        self.view.as_ref()
    }

    /// Draw the current step with progress, questions and recorded answers.
    pub fn render_step(&self) -> String {
        let session = &self.session;
        let step = session.current_step();
        let mut out = String::new();

        let _ = writeln!(
            out,
            "Step {} / {} ({:.0}%): {}",
            session.current_step_index() + 1,
            session.step_count(),
            session.progress_percent(),
            step.title
        );
        if !step.description.is_empty() {
            let _ = writeln!(out, "{}", step.description);
        }
        out.push('\n');

        for (i, question) in step.questions.iter().enumerate() {
            let _ = writeln!(out, "{}. {}", i + 1, question.text);
            if let Some(options) = question.options() {
                for (j, option) in options.iter().enumerate() {
                    let _ = writeln!(out, "     {}) {}", j + 1, option);
                }
            }
            let answer = session.answers().get(&step.id, &question.id);
            if answer.trim().is_empty() {
                let _ = writeln!(out, "   > (unanswered)");
            } else {
                let _ = writeln!(out, "   > {answer}");
            }
        }

        out.push('\n');
        let mut actions = Vec::new();
        if session.can_retreat() {
            actions.push(":back");
        }
        if session.is_last_step() {
            actions.push(":submit");
        } else {
            actions.push(":next");
        }
        actions.push(":help");
        let _ = write!(out, "[{}]", actions.join("  "));
        out
    }

    /// Apply one line of input.
    pub async fn handle_line(&mut self, line: &str) -> Outcome {
        let command = match Command::parse(line) {
            Ok(command) => command,
            Err(message) => return Outcome::Print(message),
        };

        match command {
            Command::Quit => Outcome::Quit,
            Command::Help => Outcome::Print(HELP.to_string()),
            Command::Theme => Outcome::Print(self.toggle_theme().await),
            Command::Restart => {
                self.session.restart();
                self.view = None;
                Outcome::Print(self.render_step())
            }
            Command::Retry => match self.view {
                Some(ProposalView::Failed(_)) => Outcome::RequestProposal,
                _ => Outcome::Print("Nothing to retry.".to_string()),
            },
            _ if self.session.is_finished() => Outcome::Print(
                "The survey has been submitted. Use :retry or :restart.".to_string(),
            ),
            Command::Answer { question, value } => self.answer(question, value),
            Command::Next => {
                if self.session.advance().applied() {
                    Outcome::Print(self.render_step())
                } else if self.session.is_last_step() {
                    Outcome::Print("This is the last step. Use :submit.".to_string())
                } else {
                    Outcome::Print("Answer every question on this step first.".to_string())
                }
            }
            Command::Back => {
                if self.session.retreat().applied() {
                    Outcome::Print(self.render_step())
                } else {
                    Outcome::Print("Already at the first step.".to_string())
                }
            }
            Command::Submit => {
                if self.session.submit().applied() {
                    Outcome::RequestProposal
                } else if !self.session.is_last_step() {
                    Outcome::Print("Submit is available on the last step.".to_string())
                } else {
                    Outcome::Print("Answer every question on this step first.".to_string())
                }
            }
        }
    }

    fn answer(&mut self, number: usize, value: String) -> Outcome {
        let step = self.session.current_step();
        let Some(question) = step.questions.get(number - 1) else {
            return Outcome::Print(format!(
                "This step has {} questions.",
                step.questions.len()
            ));
        };

        let value = match &question.kind {
            QuestionKind::Choice { options } if !value.is_empty() => {
                match resolve_option(options, &value) {
                    Some(option) => option.to_string(),
                    None => {
                        return Outcome::Print(format!(
                            "Choose an option between 1 and {}.",
                            options.len()
                        ));
                    }
                }
            }
            _ => value,
        };

        let (step_id, question_id) = (step.id.clone(), question.id.clone());
        self.session.set_answer(step_id, question_id, value);
        Outcome::Print(self.render_step())
    }

    async fn toggle_theme(&self) -> String {
        let mut theme = self.theme.write().await;
        match theme.toggle().await {
            Ok(next) => format!("Theme: {next}"),
            Err(e) => {
                warn!("Failed to persist theme: {}", e);
                format!("Theme: {} (not saved: {e})", theme.current())
            }
        }
    }

    /// Send the finished survey and store the result view.
    pub async fn request_proposal(&mut self) -> String {
        self.view = Some(ProposalView::Loading);
        let view = self.requestor.request(&self.session).await;
        let out = render_view(&view);
        self.view = Some(view);
        out
    }

    /// Read commands from stdin until `:quit` or EOF.
    pub async fn run(mut self) -> std::io::Result<()> {
        let reader = BufReader::new(tokio::io::stdin());
        let mut lines = reader.lines();

        println!("{}\n", self.render_step());
        eprint!("> ");

        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                eprint!("> ");
                continue;
            }
            match self.handle_line(&line).await {
                Outcome::Print(text) => println!("\n{text}\n"),
                Outcome::RequestProposal => {
                    eprintln!("⏳ Generating proposal...");
                    let text = self.request_proposal().await;
                    println!("\n{text}\n");
                }
                Outcome::Quit => break,
            }
            eprint!("> ");
        }
        Ok(())
    }
}

/// Option by 1-based number, or by exact (case-insensitive) text.
fn resolve_option<'a>(options: &'a [String], input: &str) -> Option<&'a str> {
    if let Ok(n) = input.parse::<usize>() {
        return options.get(n.checked_sub(1)?).map(String::as_str);
    }
    options
        .iter()
        .find(|o| o.eq_ignore_ascii_case(input))
        .map(String::as_str)
}

fn render_view(view: &ProposalView) -> String {
    match view {
        ProposalView::Loading => "Generating proposal...".to_string(),
        ProposalView::Ready { rendered, .. } => {
            format!("{}\n{}", addie_overview(), rendered.to_terminal())
        }
        ProposalView::Failed(message) => {
            format!("{message}\nType :retry to try again or :restart to start over.")
        }
    }
}
