//! The conversation loop
//!
//! Each turn offers the model the current ActiveSet, runs every requested
//! tool call in order and feeds back one result per call id. The loop ends
//! when a response carries no tool calls.

use std::sync::Arc;
use thiserror::Error;

use crate::completion::{CompletionError, CompletionOptions, CompletionService};
use crate::dispatch::Dispatcher;
use crate::logging::Logger;
use crate::types::ChatMessage;
use crate::{log_debug, log_error, log_info};

/// Default bound on model round trips per prompt
pub const DEFAULT_MAX_TURNS: usize = 20;

/// Errors that end a conversation
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Completion failed: {0}")]
    Completion(#[from] CompletionError),

    #[error("No final answer after {0} turns")]
    TurnLimit(usize),
}

pub type AgentResult<T> = Result<T, AgentError>;

/// Owns the message history for one session
pub struct Conversation {
    service: Arc<dyn CompletionService>,
    dispatcher: Arc<Dispatcher>,
    messages: Vec<ChatMessage>,
    options: CompletionOptions,
    max_turns: usize,
    logger: Arc<dyn Logger>,
}

impl Conversation {
    pub fn new(
        service: Arc<dyn CompletionService>,
        dispatcher: Arc<Dispatcher>,
        logger: Arc<dyn Logger>,
    ) -> Self {
        Self {
            service,
            dispatcher,
            messages: Vec::new(),
            options: CompletionOptions::new(),
            max_turns: DEFAULT_MAX_TURNS,
            logger,
        }
    }

    /// Prepend a system message
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.messages.insert(0, ChatMessage::system(prompt));
        self
    }

    /// Temperature and token limits for every request (tools are set per turn)
    pub fn with_options(mut self, options: CompletionOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_max_turns(mut self, max_turns: usize) -> Self {
        self.max_turns = max_turns.max(1);
        self
    }

    /// History so far
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Send a user prompt and drive tool calls until the model answers
    pub async fn send(&mut self, prompt: impl Into<String>) -> AgentResult<String> {
        self.messages.push(ChatMessage::user(prompt));

        for turn in 1..=self.max_turns {
            // Re-read every turn: the loader may have changed the set
            let tools = self.dispatcher.loader().active_set().snapshot();
            log_debug!(
                self.logger,
                "[Conversation] Turn {} with {} active tools",
                turn,
                tools.len()
            );

            let options = self.options.clone().with_tools(tools);
            let completion = match self.service.complete(self.messages.clone(), options).await {
                Ok(c) => c,
                Err(e) => {
                    log_error!(self.logger, "[Conversation] Completion failed: {}", e);
                    return Err(e.into());
                }
            };

            if !completion.has_tool_calls() {
                let answer = completion.text.unwrap_or_default();
                self.messages.push(ChatMessage::assistant(answer.clone()));
                log_info!(self.logger, "[Conversation] Answered after {} turns", turn);
                return Ok(answer);
            }

            self.messages.push(ChatMessage::tool_calls(
                completion.text.clone(),
                &completion.tool_calls,
            ));
            let results = self.dispatcher.dispatch_all(&completion.tool_calls).await;
            self.messages
                .extend(results.iter().map(ChatMessage::tool_result));
        }

        Err(AgentError::TurnLimit(self.max_turns))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::briefs::BriefGenerator;
    use crate::completion::{Completion, MockCompletion};
    use crate::config::LoaderMode;
    use crate::loader::LoaderController;
    use crate::logging::NoOpLogger;
    use crate::tools::{FnTool, ToolBinding, ToolRegistry};
    use crate::types::{ContentPart, MessageContent, MessageRole, ToolCall, ToolDefinition};
    use serde_json::json;

    fn logger() -> Arc<dyn Logger> {
        Arc::new(NoOpLogger::new())
    }

    async fn dispatcher() -> Arc<Dispatcher> {
        let registry = Arc::new(ToolRegistry::new(logger()));
        registry.register(ToolBinding::local(Arc::new(FnTool::new(
            ToolDefinition::new("calculator", "Evaluates arithmetic"),
            |_| Ok("105".into()),
        ))));
        let briefs = BriefGenerator::new(Arc::new(MockCompletion::error("offline")), logger());
        let loader = Arc::new(LoaderController::new(
            LoaderMode::Flat,
            Arc::clone(&registry),
            briefs,
            logger(),
        ));
        loader.prepare().await;
        Arc::new(Dispatcher::new(loader, registry, logger()))
    }

    #[tokio::test]
    async fn test_activation_then_answer() {
        let model = Arc::new(MockCompletion::scripted([
            Completion::tool_calls(vec![ToolCall::new(
                "c1",
                "loader",
                json!({"tool_names": ["calculator"]}),
            )]),
            Completion::tool_calls(vec![ToolCall::new(
                "c2",
                "calculator",
                json!({"expression": "15 * 7"}),
            )]),
            Completion::text("15 * 7 = 105"),
        ]));
        let mut convo = Conversation::new(model.clone(), dispatcher().await, logger());

        let answer = convo.send("What is 15 * 7?").await.unwrap();
        assert_eq!(answer, "15 * 7 = 105");

        let requests = model.requests();
        assert_eq!(requests.len(), 3);
        assert_eq!(requests[0].tool_names(), vec!["loader"]);
        assert_eq!(requests[1].tool_names(), vec!["loader", "calculator"]);
    }

    #[tokio::test]
    async fn test_one_result_per_call_id() {
        let model = Arc::new(MockCompletion::scripted([
            Completion::tool_calls(vec![
                ToolCall::new("a", "calculator", json!({})),
                ToolCall::new("b", "loader", json!({"tool_names": ["calculator"]})),
            ]),
            Completion::text("done"),
        ]));
        let mut convo = Conversation::new(model, dispatcher().await, logger());
        convo.send("go").await.unwrap();

        let ids: Vec<String> = convo
            .messages()
            .iter()
            .filter(|m| m.role == MessageRole::Tool)
            .filter_map(|m| match &m.content {
                MessageContent::Parts(parts) => parts.iter().find_map(|p| match p {
                    ContentPart::ToolResult { tool_use_id, .. } => Some(tool_use_id.clone()),
                    _ => None,
                }),
                MessageContent::Text(_) => None,
            })
            .collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_completion_failure_ends_loop() {
        let model = Arc::new(MockCompletion::error("rate limited"));
        let mut convo = Conversation::new(model, dispatcher().await, logger());
        assert!(matches!(
            convo.send("hi").await,
            Err(AgentError::Completion(_))
        ));
    }

    #[tokio::test]
    async fn test_turn_limit() {
        let model = Arc::new(MockCompletion::error("unused"));
        for i in 0..3 {
            model.push(Completion::tool_calls(vec![ToolCall::new(
                format!("c{}", i),
                "loader",
                json!({"tool_names": []}),
            )]));
        }
        let mut convo = Conversation::new(model, dispatcher().await, logger()).with_max_turns(2);
        assert!(matches!(
            convo.send("loop forever").await,
            Err(AgentError::TurnLimit(2))
        ));
    }
}
