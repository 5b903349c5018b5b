//! Proposal requestor — the one outbound call made when a survey finishes.

use std::sync::Arc;

use tracing::{error, info};

use super::format::{RenderedProposal, render};
use super::generator::ProposalGenerator;
use crate::error::ProposalError;
use crate::survey::SurveySession;

/// What the result view shows for a finished survey.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProposalView {
    /// Request in flight; only a loading indicator is valid.
    Loading,
    Ready {
        raw: String,
        rendered: RenderedProposal,
    },
    /// Human-readable message, safe to show as-is.
    Failed(String),
}

impl ProposalView {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }
}

/// Convert a generation failure into the message shown to the user.
pub fn failure_message(err: &ProposalError) -> String {
    format!(
        "An error occurred while generating the proposal. Please try again shortly. (error: {err})"
    )
}

/// Sends finished surveys to a `ProposalGenerator` and formats the result.
#[derive(Clone)]
pub struct ProposalRequestor {
    generator: Arc<dyn ProposalGenerator>,
}

impl ProposalRequestor {
    pub fn new(generator: Arc<dyn ProposalGenerator>) -> Self {
        Self { generator }
    }

    /// Request a proposal for a finished session.
    ///
    /// Only reads the session, so a failure leaves it untouched and the
    /// call can be repeated with identical input. Never returns `Loading`.
    pub async fn request(&self, session: &SurveySession) -> ProposalView {
        if !session.is_finished() {
            return ProposalView::Failed(
                "The survey must be completed before a proposal can be generated.".to_string(),
            );
        }

        info!(session_id = %session.id(), "Requesting proposal");
        match self.generator.generate(session.answers()).await {
            Ok(raw) => {
                let rendered = render(&raw);
                info!(
                    session_id = %session.id(),
                    blocks = rendered.blocks.len(),
                    headings = rendered.headings().count(),
                    tables = rendered.tables().count(),
                    "Proposal ready"
                );
                ProposalView::Ready { raw, rendered }
            }
            Err(e) => {
                error!(session_id = %session.id(), error = %e, "Proposal generation failed");
                ProposalView::Failed(failure_message(&e))
            }
        }
    }
}
