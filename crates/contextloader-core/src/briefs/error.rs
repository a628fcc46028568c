//! Brief generation errors
//!
//! Never surfaced to callers: every variant degrades to the truncation
//! fallback.

use thiserror::Error;

use crate::completion::CompletionError;

#[derive(Error, Debug)]
pub enum BriefError {
    #[error("summarizer call failed: {0}")]
    Service(#[from] CompletionError),

    #[error("summarizer returned no text")]
    EmptyResponse,

    #[error("summarizer reply is not the expected JSON: {0}")]
    Parse(#[from] serde_json::Error),
}
