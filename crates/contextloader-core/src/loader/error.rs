//! Loader request errors
//!
//! These are returned to the model as text (prefixed "Error: "), never
//! raised past the loader.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoaderError {
    #[error("servers list is required for load_tool_summaries action.")]
    ServersRequired,

    #[error("server {0} not recognized")]
    UnknownServer(String),

    #[error("tools list and server are required for load_tools action.")]
    ToolsAndServerRequired,

    #[error("Tool summaries for {0} must be loaded first.")]
    SummariesNotLoaded(String),

    #[error("Invalid action. Use 'load_tool_summaries' or 'load_tools'.")]
    InvalidAction(String),

    #[error("tool_names must be a list of strings.")]
    ToolNamesRequired,

    #[error("{action} is not available in {mode} mode.")]
    WrongMode { action: &'static str, mode: &'static str },
}
