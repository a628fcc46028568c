//! In-process tools

use async_trait::async_trait;
use serde_json::Value;

use super::error::ToolError;
use crate::types::ToolDefinition;

/// A tool implemented inside this process
#[async_trait]
pub trait LocalTool: Send + Sync {
    /// Definition exposed to the model
    fn definition(&self) -> ToolDefinition;

    /// Run the tool
    async fn invoke(&self, arguments: Value) -> Result<String, ToolError>;
}

type ToolFn = dyn Fn(Value) -> Result<String, ToolError> + Send + Sync;

/// Closure-backed local tool
///
/// ```rust
/// use contextloader_core::tools::FnTool;
/// use contextloader_core::ToolDefinition;
///
/// let echo = FnTool::new(ToolDefinition::new("echo", "Echo the input"), |args| {
///     Ok(args.to_string())
/// });
/// ```
pub struct FnTool {
    definition: ToolDefinition,
    func: Box<ToolFn>,
}

impl FnTool {
    pub fn new<F>(definition: ToolDefinition, func: F) -> Self
    where
        F: Fn(Value) -> Result<String, ToolError> + Send + Sync + 'static,
    {
        Self {
            definition,
            func: Box::new(func),
        }
    }
}

impl std::fmt::Debug for FnTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnTool")
            .field("name", &self.definition.name)
            .finish()
    }
}

#[async_trait]
impl LocalTool for FnTool {
    fn definition(&self) -> ToolDefinition {
        self.definition.clone()
    }

    async fn invoke(&self, arguments: Value) -> Result<String, ToolError> {
        (self.func)(arguments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_fn_tool_invokes_closure() {
        let tool = FnTool::new(ToolDefinition::new("upper", "Uppercase text"), |args| {
            args.get("text")
                .and_then(Value::as_str)
                .map(str::to_uppercase)
                .ok_or_else(|| ToolError::execution("text missing"))
        });

        assert_eq!(tool.definition().name, "upper");
        assert_eq!(tool.invoke(json!({"text": "abc"})).await.unwrap(), "ABC");
        assert!(tool.invoke(json!({})).await.is_err());
    }
}
