//! Adapter between contextloader types and genai types
//!
//! This module provides conversion functions between our types and genai's types,
//! and builds the genai client with any explicit key / endpoint from `ModelConfig`.
//! Without an explicit key, genai's own per-provider env var lookup applies.

use genai::chat::{
    ChatMessage as GenaiMessage, ChatOptions as GenaiOptions,
    MessageContent as GenaiContent, Tool as GenaiTool, ToolCall as GenaiToolCall,
    ToolResponse as GenaiToolResponse,
};
use genai::resolver::{AuthData, AuthResolver, Endpoint, ServiceTargetResolver};
use genai::{adapter::AdapterKind, Client, ModelIden, ServiceTarget};
use serde_json::json;

use crate::types::{
    ChatMessage, ContentPart, MessageContent, MessageRole, ModelConfig, ToolCall, ToolDefinition,
};

use super::traits::CompletionOptions;

// ============================================================================
// Message Conversion: contextloader -> genai
// ============================================================================

/// Convert one of our messages into one or more genai messages.
///
/// Assistant turns carrying tool uses become a single genai tool-call message
/// (interim assistant text is dropped); every tool result becomes its own
/// genai tool-response message.
pub fn to_genai_message(msg: ChatMessage) -> Vec<GenaiMessage> {
    let parts = match msg.content {
        MessageContent::Text(text) => return vec![text_message(msg.role, text)],
        MessageContent::Parts(parts) => parts,
    };

    let mut texts = Vec::new();
    let mut calls = Vec::new();
    let mut responses = Vec::new();

    for part in parts {
        match part {
            ContentPart::Text { text } => texts.push(text),
            ContentPart::ToolUse { id, name, input } => {
                if let Some(call) = to_genai_tool_call(&ToolCall::new(id, name, input)) {
                    calls.push(call);
                }
            }
            ContentPart::ToolResult { tool_use_id, content } => {
                responses.push(GenaiMessage::from(GenaiToolResponse::new(tool_use_id, content)));
            }
        }
    }

    if !calls.is_empty() {
        return vec![GenaiMessage::from(calls)];
    }
    if !responses.is_empty() {
        return responses;
    }
    vec![text_message(msg.role, texts.join("\n"))]
}

fn text_message(role: MessageRole, text: String) -> GenaiMessage {
    let content = GenaiContent::from(text);
    match role {
        MessageRole::System => GenaiMessage::system(content),
        MessageRole::User | MessageRole::Tool => GenaiMessage::user(content),
        MessageRole::Assistant => GenaiMessage::assistant(content),
    }
}

/// Convert a vector of our messages to genai messages
pub fn to_genai_messages(messages: Vec<ChatMessage>) -> Vec<GenaiMessage> {
    messages.into_iter().flat_map(to_genai_message).collect()
}

// ============================================================================
// Tool Conversion
// ============================================================================

/// Convert a ToolDefinition to a genai Tool
pub fn to_genai_tool(tool: &ToolDefinition) -> GenaiTool {
    GenaiTool::new(&tool.name)
        .with_description(&tool.description)
        .with_schema(tool.parameters.clone())
}

/// Convert tool definitions to genai tools
pub fn to_genai_tools(tools: &[ToolDefinition]) -> Vec<GenaiTool> {
    tools.iter().map(to_genai_tool).collect()
}

/// Convert our ToolCall back into a genai ToolCall for the history.
///
/// Built through serde so provider-specific optional fields take their defaults.
/// `thought_signatures` is not carried by our `ToolCall`, so it is empty here.
pub fn to_genai_tool_call(call: &ToolCall) -> Option<GenaiToolCall> {
    serde_json::from_value(json!({
        "call_id": call.id,
        "fn_name": call.name,
        "fn_arguments": call.input,
    }))
    .ok()
}

/// Convert genai ToolCall to our ToolCall (drops `thought_signatures`)
pub fn from_genai_tool_call(tc: &GenaiToolCall) -> ToolCall {
    ToolCall {
        id: tc.call_id.clone(),
        name: tc.fn_name.clone(),
        input: tc.fn_arguments.clone(),
    }
}

// ============================================================================
// Options Conversion
// ============================================================================

/// Convert CompletionOptions to genai ChatOptions
pub fn to_genai_options(options: &CompletionOptions) -> GenaiOptions {
    let mut genai_opts = GenaiOptions::default();

    if let Some(temp) = options.temperature {
        genai_opts = genai_opts.with_temperature(temp as f64);
    }

    if let Some(max_tokens) = options.max_tokens {
        genai_opts = genai_opts.with_max_tokens(max_tokens);
    }

    genai_opts
}

// ============================================================================
// Provider Resolution
// ============================================================================

/// Split "provider/model" into its parts ("gpt-4o" has no provider)
pub fn split_model(model: &str) -> (Option<&str>, &str) {
    match model.split_once('/') {
        Some((provider, name)) if !provider.is_empty() && !name.is_empty() => (Some(provider), name),
        _ => (None, model),
    }
}

/// Adapter and default endpoint for a provider prefix
///
/// OpenAI-compatible services are routed through the OpenAI adapter.
pub fn adapter_for_provider(provider: &str) -> Option<(AdapterKind, Option<&'static str>)> {
    let resolved = match provider.to_lowercase().as_str() {
        "openai" => (AdapterKind::OpenAI, None),
        "anthropic" => (AdapterKind::Anthropic, None),
        "gemini" | "google" => (AdapterKind::Gemini, None),
        "ollama" => (AdapterKind::Ollama, None),
        "groq" => (AdapterKind::Groq, None),
        "xai" => (AdapterKind::Xai, None),
        "deepseek" => (AdapterKind::DeepSeek, None),
        "cohere" => (AdapterKind::Cohere, None),
        "fireworks" => (AdapterKind::Fireworks, None),
        "together" => (AdapterKind::Together, None),
        "openrouter" => (AdapterKind::OpenAI, Some("https://openrouter.ai/api/v1/")),
        "mistral" => (AdapterKind::OpenAI, Some("https://api.mistral.ai/v1/")),
        _ => return None,
    };
    Some(resolved)
}

// ============================================================================
// Client Creation
// ============================================================================

/// Create a genai Client honouring the explicit key, endpoint and provider prefix
pub fn create_client(config: &ModelConfig) -> Client {
    let mut builder = Client::builder();

    if let Some(key) = config.api_key.clone() {
        let auth_resolver = AuthResolver::from_resolver_fn(
            move |_model_iden: ModelIden| -> Result<Option<AuthData>, genai::resolver::Error> {
                Ok(Some(AuthData::from_single(key.clone())))
            },
        );
        builder = builder.with_auth_resolver(auth_resolver);
    }

    let (provider, _) = split_model(&config.model);
    let routing = provider.and_then(adapter_for_provider);
    let api_base = config.api_base.clone();

    if routing.is_some() || api_base.is_some() {
        let target_resolver = ServiceTargetResolver::from_resolver_fn(
            move |target: ServiceTarget| -> Result<ServiceTarget, genai::resolver::Error> {
                let ServiceTarget { endpoint, auth, model } = target;

                let adapter_kind = routing.map(|(kind, _)| kind).unwrap_or(model.adapter_kind);
                let endpoint = match (&api_base, routing.and_then(|(_, ep)| ep)) {
                    (Some(base), _) => Endpoint::from_owned(base.clone()),
                    (None, Some(default)) => Endpoint::from_static(default),
                    (None, None) => endpoint,
                };

                Ok(ServiceTarget {
                    endpoint,
                    auth,
                    model: ModelIden::new(adapter_kind, model.model_name.clone()),
                })
            },
        );
        builder = builder.with_service_target_resolver(target_resolver);
    }

    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use genai::chat::ChatRole as GenaiRole;

    #[test]
    fn test_message_conversion() {
        let converted = to_genai_message(ChatMessage::user("Hello, world!"));
        assert_eq!(converted.len(), 1);
        assert!(matches!(converted[0].role, GenaiRole::User));
    }

    #[test]
    fn test_tool_turns_conversion() {
        let calls = vec![ToolCall::new("c1", "calculator", json!({"expression": "1+1"}))];
        let assistant = to_genai_message(ChatMessage::tool_calls(Some("thinking".into()), &calls));
        assert_eq!(assistant.len(), 1);
        assert!(matches!(assistant[0].role, GenaiRole::Assistant));

        let result = to_genai_message(ChatMessage::tool_result(
            &crate::types::ToolResult::success("c1", "2"),
        ));
        assert_eq!(result.len(), 1);
        assert!(matches!(result[0].role, GenaiRole::Tool));
    }

    #[test]
    fn test_tool_call_round_trip_fields() {
        let call = ToolCall::new("call_1", "get_weather", json!({"location": "New York"}));
        let genai_call = to_genai_tool_call(&call).expect("tool call converts");
        assert_eq!(genai_call.call_id, "call_1");
        assert_eq!(from_genai_tool_call(&genai_call), call);
    }

    #[test]
    fn test_tool_conversion() {
        let tool = ToolDefinition::new("get_weather", "Get weather for a location")
            .with_parameters(json!({
                "type": "object",
                "properties": {
                    "location": { "type": "string" }
                }
            }));

        let genai_tool = to_genai_tool(&tool);
        assert_eq!(genai_tool.name, "get_weather");
    }

    #[test]
    fn test_split_model() {
        assert_eq!(split_model("openai/gpt-4o"), (Some("openai"), "gpt-4o"));
        assert_eq!(
            split_model("openrouter/meta-llama/llama-3-70b"),
            (Some("openrouter"), "meta-llama/llama-3-70b")
        );
        assert_eq!(split_model("gpt-4o"), (None, "gpt-4o"));
    }

    #[test]
    fn test_provider_routing() {
        assert!(matches!(adapter_for_provider("openai"), Some((AdapterKind::OpenAI, None))));
        assert!(matches!(adapter_for_provider("Anthropic"), Some((AdapterKind::Anthropic, None))));
        assert!(matches!(
            adapter_for_provider("openrouter"),
            Some((AdapterKind::OpenAI, Some(_)))
        ));
        assert!(adapter_for_provider("unknown_provider").is_none());
    }
}
