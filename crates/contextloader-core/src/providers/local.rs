//! Local capability provider

use std::sync::Arc;

use crate::tools::{LocalTool, ToolBinding, ToolRegistry};

/// In-process tools, registered without an owning provider id
#[derive(Default)]
pub struct LocalProvider {
    tools: Vec<Arc<dyn LocalTool>>,
}

impl LocalProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tool
    pub fn with_tool(mut self, tool: impl LocalTool + 'static) -> Self {
        self.tools.push(Arc::new(tool));
        self
    }

    /// Add a shared tool
    pub fn add(&mut self, tool: Arc<dyn LocalTool>) {
        self.tools.push(tool);
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Bindings for every tool
    pub fn bindings(&self) -> Vec<ToolBinding> {
        self.tools
            .iter()
            .map(|t| ToolBinding::local(Arc::clone(t)))
            .collect()
    }

    /// Register every tool, returning how many were registered
    pub fn register_into(&self, registry: &ToolRegistry) -> usize {
        registry.register_all(self.bindings())
    }
}
