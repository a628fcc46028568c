//! Mock completion service for testing
//!
//! Provides deterministic, scripted responses without network dependencies
//! and records every request so tests can inspect what the model was offered.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

use super::error::{CompletionError, CompletionResult};
use super::traits::{Completion, CompletionOptions, CompletionService};
use crate::logging::{Logger, NoOpLogger};
use crate::log_debug;
use crate::types::{ChatMessage, ContentPart, MessageContent, MessageRole, ToolDefinition};

/// Mock response mode
#[derive(Debug, Clone)]
pub enum MockMode {
    /// Echo back the last user message
    Echo,
    /// Return the same text for every request
    Fixed(String),
    /// Fail every request
    Error(String),
}

/// A request the mock received
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub messages: Vec<ChatMessage>,
    pub tools: Vec<ToolDefinition>,
}

impl RecordedRequest {
    /// Names of the tools offered with this request, in order
    pub fn tool_names(&self) -> Vec<String> {
        self.tools.iter().map(|t| t.name.clone()).collect()
    }
}

/// Mock completion service
///
/// Scripted responses are consumed first; once the script is empty the
/// fallback mode answers.
pub struct MockCompletion {
    mode: MockMode,
    script: Mutex<VecDeque<CompletionResult<Completion>>>,
    requests: Mutex<Vec<RecordedRequest>>,
    logger: Arc<dyn Logger>,
}

impl MockCompletion {
    /// Create a mock with the given fallback mode
    pub fn new(mode: MockMode) -> Self {
        Self {
            mode,
            script: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            logger: Arc::new(NoOpLogger::new()),
        }
    }

    /// Echo mock
    pub fn echo() -> Self {
        Self::new(MockMode::Echo)
    }

    /// Fixed-response mock
    pub fn fixed(response: impl Into<String>) -> Self {
        Self::new(MockMode::Fixed(response.into()))
    }

    /// Always-failing mock
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(MockMode::Error(message.into()))
    }

    /// Mock that plays back the given responses in order, then fails
    pub fn scripted(responses: impl IntoIterator<Item = Completion>) -> Self {
        let mock = Self::error("mock script exhausted");
        for response in responses {
            mock.push(response);
        }
        mock
    }

    /// Attach a logger
    pub fn with_logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = logger;
        self
    }

    /// Queue a successful response
    pub fn push(&self, response: Completion) {
        self.script.lock().push_back(Ok(response));
    }

    /// Queue a failure
    pub fn push_error(&self, message: impl Into<String>) {
        self.script
            .lock()
            .push_back(Err(CompletionError::Other(message.into())));
    }

    /// Every request received so far
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().clone()
    }

    /// Number of requests received so far
    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }

    fn last_user_text(messages: &[ChatMessage]) -> String {
        messages
            .iter()
            .rev()
            .filter(|m| m.role == MessageRole::User)
            .find_map(|m| {
                let text = match &m.content {
                    MessageContent::Text(text) => text.clone(),
                    MessageContent::Parts(parts) => parts
                        .iter()
                        .filter_map(|p| match p {
                            ContentPart::Text { text } => Some(text.as_str()),
                            _ => None,
                        })
                        .collect(),
                };
                (!text.is_empty()).then_some(text)
            })
            .unwrap_or_else(|| "Hello from MockCompletion!".to_string())
    }
}

#[async_trait]
impl CompletionService for MockCompletion {
    fn name(&self) -> &str {
        "mock"
    }

    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        options: CompletionOptions,
    ) -> CompletionResult<Completion> {
        let tools = options.tools.unwrap_or_default();
        log_debug!(
            self.logger,
            "[MockCompletion] complete: messages={}, tools={}",
            messages.len(),
            tools.len()
        );

        let reply = Self::last_user_text(&messages);
        self.requests.lock().push(RecordedRequest { messages, tools });

        if let Some(scripted) = self.script.lock().pop_front() {
            return scripted;
        }

        match &self.mode {
            MockMode::Echo => Ok(Completion::text(format!("Echo: {}", reply))),
            MockMode::Fixed(response) => Ok(Completion::text(response.clone())),
            MockMode::Error(message) => Err(CompletionError::Other(message.clone())),
        }
    }
}
