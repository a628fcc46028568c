//! Routing model tool calls to the loader or a registry binding

use serde_json::{json, Value};
use std::sync::Arc;
use thiserror::Error;

use crate::loader::LoaderController;
use crate::logging::Logger;
use crate::tools::{validate_arguments, ToolError, ToolRegistry};
use crate::types::{ToolCall, ToolResult};
use crate::{log_debug, log_warn};

/// Why a call could not be served
///
/// Never leaves the dispatcher: each variant becomes tool-result text.
#[derive(Error, Debug)]
pub enum DispatchError {
    /// The model named a tool that is not in the ActiveSet
    #[error("Tool '{0}' is not active. Use the loader tool to activate it first.")]
    Inactive(String),

    /// Active but no longer registered (its provider went away)
    #[error("Tool '{0}' is no longer available.")]
    Unavailable(String),

    #[error("Invalid arguments for '{tool}': {message}")]
    InvalidArguments { tool: String, message: String },

    #[error("Error executing tool '{tool}': {source}")]
    Tool {
        tool: String,
        #[source]
        source: ToolError,
    },
}

pub type DispatchResult<T> = Result<T, DispatchError>;

/// Resolves calls against the ActiveSet and the registry
pub struct Dispatcher {
    loader: Arc<LoaderController>,
    registry: Arc<ToolRegistry>,
    logger: Arc<dyn Logger>,
}

impl Dispatcher {
    pub fn new(
        loader: Arc<LoaderController>,
        registry: Arc<ToolRegistry>,
        logger: Arc<dyn Logger>,
    ) -> Self {
        Self {
            loader,
            registry,
            logger,
        }
    }

    pub fn loader(&self) -> &Arc<LoaderController> {
        &self.loader
    }

    /// Run one call, surfacing why it could not be served
    pub async fn try_dispatch(&self, name: &str, arguments: Value) -> DispatchResult<String> {
        // A missing payload means "no arguments"
        let arguments = match arguments {
            Value::Null => json!({}),
            other => other,
        };

        if LoaderController::is_loader(name) {
            return Ok(self.loader.execute(&arguments));
        }

        if !self.loader.active_set().contains(name) {
            return Err(DispatchError::Inactive(name.to_string()));
        }

        let binding = self
            .registry
            .lookup(name)
            .ok_or_else(|| DispatchError::Unavailable(name.to_string()))?;

        validate_arguments(&binding.definition, &arguments).map_err(|e| match e {
            ToolError::InvalidArguments(message) => DispatchError::InvalidArguments {
                tool: name.to_string(),
                message,
            },
            source => DispatchError::Tool {
                tool: name.to_string(),
                source,
            },
        })?;

        binding
            .invoke(arguments)
            .await
            .map_err(|source| DispatchError::Tool {
                tool: name.to_string(),
                source,
            })
    }

    /// Run one call; always yields exactly one result for its id
    pub async fn dispatch(&self, call: &ToolCall) -> ToolResult {
        log_debug!(self.logger, "[Dispatcher] Calling '{}' ({})", call.name, call.id);
        match self.try_dispatch(&call.name, call.input.clone()).await {
            Ok(text) => ToolResult::success(&call.id, text),
            Err(e) => {
                log_warn!(self.logger, "[Dispatcher] {}", e);
                ToolResult::error(&call.id, e.to_string())
            }
        }
    }

    /// Run calls in order, so an activation takes effect for later calls
    pub async fn dispatch_all(&self, calls: &[ToolCall]) -> Vec<ToolResult> {
        let mut results = Vec::with_capacity(calls.len());
        for call in calls {
            results.push(self.dispatch(call).await);
        }
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::briefs::BriefGenerator;
    use crate::completion::MockCompletion;
    use crate::config::LoaderMode;
    use crate::logging::NoOpLogger;
    use crate::tools::{FnTool, ToolBinding};
    use crate::types::ToolDefinition;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn logger() -> Arc<dyn Logger> {
        Arc::new(NoOpLogger::new())
    }

    async fn setup(runs: Arc<AtomicUsize>) -> Dispatcher {
        let registry = Arc::new(ToolRegistry::new(logger()));
        let weather = ToolDefinition::new("get_weather", "Get current weather").with_parameters(json!({
            "type": "object",
            "properties": { "location": { "type": "string" } },
            "required": ["location"]
        }));
        registry.register(ToolBinding::local(Arc::new(FnTool::new(weather, move |args| {
            runs.fetch_add(1, Ordering::SeqCst);
            Ok(format!("Sunny in {}", args["location"].as_str().unwrap_or("?")))
        }))));
        registry.register(ToolBinding::local(Arc::new(FnTool::new(
            ToolDefinition::new("broken", "Always fails"),
            |_| Err(ToolError::execution("disk on fire")),
        ))));

        let briefs = BriefGenerator::new(Arc::new(MockCompletion::error("offline")), logger());
        let loader = Arc::new(LoaderController::new(
            LoaderMode::Flat,
            Arc::clone(&registry),
            briefs,
            logger(),
        ));
        loader.prepare().await;
        Dispatcher::new(loader, registry, logger())
    }

    #[tokio::test]
    async fn test_inactive_tool_is_explained() {
        let runs = Arc::new(AtomicUsize::new(0));
        let d = setup(Arc::clone(&runs)).await;

        let result = d
            .dispatch(&ToolCall::new("c1", "get_weather", json!({"location": "Paris"})))
            .await;
        assert!(result.is_error);
        assert_eq!(result.call_id, "c1");
        assert!(result.content.contains("not active"));
        assert_eq!(runs.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_activation_applies_to_later_calls_in_batch() {
        let runs = Arc::new(AtomicUsize::new(0));
        let d = setup(Arc::clone(&runs)).await;

        let results = d
            .dispatch_all(&[
                ToolCall::new("c1", "loader", json!({"tool_names": ["get_weather"]})),
                ToolCall::new("c2", "get_weather", json!({"location": "Paris"})),
            ])
            .await;

        assert_eq!(results.len(), 2);
        assert!(results[0].content.starts_with("Activated tools: get_weather."));
        assert_eq!(results[1], ToolResult::success("c2", "Sunny in Paris"));
    }

    #[tokio::test]
    async fn test_invalid_arguments_rejected_before_running() {
        let runs = Arc::new(AtomicUsize::new(0));
        let d = setup(Arc::clone(&runs)).await;
        d.loader().activate(&["get_weather".to_string()]).unwrap();

        let err = d
            .try_dispatch("get_weather", json!({"location": 42}))
            .await
            .unwrap_err();
        assert!(matches!(err, DispatchError::InvalidArguments { .. }));
        assert_eq!(runs.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_execution_failure_becomes_text() {
        let d = setup(Arc::new(AtomicUsize::new(0))).await;
        d.loader().activate(&["broken".to_string()]).unwrap();

        let result = d.dispatch(&ToolCall::new("c9", "broken", Value::Null)).await;
        assert!(result.is_error);
        assert_eq!(result.content, "Error executing tool 'broken': disk on fire");
    }

    #[tokio::test]
    async fn test_loader_errors_are_plain_results() {
        let d = setup(Arc::new(AtomicUsize::new(0))).await;
        let result = d
            .dispatch(&ToolCall::new("c1", "loader", json!({"tool_names": "get_weather"})))
            .await;
        assert!(!result.is_error);
        assert_eq!(result.content, "Error: tool_names must be a list of strings.");
    }

    #[tokio::test]
    async fn test_tool_whose_provider_left() {
        let d = setup(Arc::new(AtomicUsize::new(0))).await;
        let mut scratch = ToolBinding::local(Arc::new(FnTool::new(
            ToolDefinition::new("scratch_note", "Writes a note"),
            |_| Ok("noted".into()),
        )));
        scratch.provider = Some("scratch".into());
        d.registry.register(scratch);
        d.loader().refresh_catalogue().await;
        d.loader().activate(&["scratch_note".to_string()]).unwrap();

        d.registry.remove_provider("scratch");
        let err = d.try_dispatch("scratch_note", json!({})).await.unwrap_err();
        assert!(matches!(err, DispatchError::Unavailable(name) if name == "scratch_note"));
    }
}
