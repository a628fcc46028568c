//! Completion service trait definition

use async_trait::async_trait;

use crate::types::{ChatMessage, ToolCall, ToolDefinition};
use super::error::CompletionResult;

/// Options for a completion request
#[derive(Debug, Clone, Default)]
pub struct CompletionOptions {
    /// Temperature for response generation (0.0 - 2.0)
    pub temperature: Option<f32>,
    /// Maximum tokens to generate
    pub max_tokens: Option<u32>,
    /// Tools available for the model to use
    pub tools: Option<Vec<ToolDefinition>>,
}

impl CompletionOptions {
    /// Create new options with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set temperature
    pub fn with_temperature(mut self, temp: f32) -> Self {
        self.temperature = Some(temp);
        self
    }

    /// Set max tokens
    pub fn with_max_tokens(mut self, tokens: u32) -> Self {
        self.max_tokens = Some(tokens);
        self
    }

    /// Set tools
    pub fn with_tools(mut self, tools: Vec<ToolDefinition>) -> Self {
        self.tools = Some(tools);
        self
    }
}

/// A single model response
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Completion {
    /// Assistant text, if any
    pub text: Option<String>,
    /// Tool calls requested by the model, in order
    pub tool_calls: Vec<ToolCall>,
}

impl Completion {
    /// A plain text response
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            tool_calls: vec![],
        }
    }

    /// A response that only requests tool calls
    pub fn tool_calls(calls: Vec<ToolCall>) -> Self {
        Self {
            text: None,
            tool_calls: calls,
        }
    }

    /// Whether the model asked for any tool calls
    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}

/// Completion service used by the conversation loop and the brief generator
///
/// The service is an external collaborator: every call is a suspension point
/// and any call may fail.
#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Get the service name (e.g., "genai", "mock")
    fn name(&self) -> &str;

    /// Request one completion for the given conversation
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        options: CompletionOptions,
    ) -> CompletionResult<Completion>;
}
