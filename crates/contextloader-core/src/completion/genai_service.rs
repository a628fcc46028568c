//! GenaiCompletion - completion service backed by the genai crate
//!
//! Handles every genai-supported provider (OpenAI, Anthropic, Gemini, etc.)
//! plus OpenAI-compatible services routed through the ServiceTargetResolver.

use async_trait::async_trait;
use std::sync::Arc;

use genai::chat::ChatRequest;
use genai::Client;

use crate::logging::Logger;
use crate::types::{ChatMessage, ModelConfig};
use crate::{log_debug, log_info};

use super::error::{CompletionError, CompletionResult};
use super::genai_adapter::{
    create_client, from_genai_tool_call, split_model, to_genai_messages, to_genai_options,
    to_genai_tools,
};
use super::traits::{Completion, CompletionOptions, CompletionService};

/// Completion service using genai for all supported LLM APIs
pub struct GenaiCompletion {
    config: ModelConfig,
    client: Client,
    logger: Arc<dyn Logger>,
}

impl GenaiCompletion {
    /// Create a new GenaiCompletion for the configured model
    pub fn new(config: ModelConfig, logger: Arc<dyn Logger>) -> Self {
        let client = create_client(&config);
        Self {
            config,
            client,
            logger,
        }
    }

    /// The configured model identifier
    pub fn model(&self) -> &str {
        &self.config.model
    }
}

#[async_trait]
impl CompletionService for GenaiCompletion {
    fn name(&self) -> &str {
        "genai"
    }

    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        options: CompletionOptions,
    ) -> CompletionResult<Completion> {
        let (_, model_name) = split_model(&self.config.model);
        let tool_count = options.tools.as_ref().map_or(0, Vec::len);

        log_info!(
            self.logger,
            "[GenaiCompletion] complete: model={}, messages={}, tools={}",
            model_name,
            messages.len(),
            tool_count
        );

        let mut chat_req = ChatRequest::new(to_genai_messages(messages));
        if let Some(tools) = options.tools.as_deref().filter(|t| !t.is_empty()) {
            chat_req = chat_req.with_tools(to_genai_tools(tools));
        }

        let genai_options = to_genai_options(&options);

        let response = self
            .client
            .exec_chat(model_name, chat_req, Some(&genai_options))
            .await
            .map_err(|e| CompletionError::api_error(self.name(), e.to_string()))?;

        let text = response
            .first_text()
            .filter(|t| !t.is_empty())
            .map(str::to_string);
        let tool_calls: Vec<_> = response
            .into_tool_calls()
            .iter()
            .map(from_genai_tool_call)
            .collect();

        log_debug!(
            self.logger,
            "[GenaiCompletion] response: text={}, tool_calls={}",
            text.as_deref().map_or(0, str::len),
            tool_calls.len()
        );

        Ok(Completion { text, tool_calls })
    }
}
