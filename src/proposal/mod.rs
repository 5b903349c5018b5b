//! Proposal generation and display.
//!
//! A finished survey's answers go to a `ProposalGenerator` (either an LLM
//! directly or the HTTP proposal endpoint). The returned markdown-ish text is
//! turned into display blocks by `format::render` and drawn as HTML or for a
//! terminal by `render`.

pub mod addie;
pub mod client;
pub mod format;
pub mod generator;
pub mod render;
pub mod requestor;

pub use addie::ADDIE_PHASES;
pub use client::HttpProposalClient;
pub use format::{Block, Inline, RenderedProposal, Table, render};
pub use generator::{LlmProposalGenerator, ProposalGenerator, UnavailableGenerator};
pub use requestor::{ProposalRequestor, ProposalView, failure_message};
