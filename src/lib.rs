//! HRD Survey — training-needs survey with LLM-generated proposals.

pub mod cli;
pub mod config;
pub mod error;
pub mod llm;
pub mod proposal;
pub mod server;
pub mod settings;
pub mod store;
pub mod survey;
