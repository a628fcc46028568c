//! The tools currently exposed to the model

use parking_lot::RwLock;

use crate::types::ToolDefinition;

/// Ordered, duplicate-free list of exposed tool definitions
///
/// The loader's own definition sits first and can be updated in place but
/// never removed. Readers get cloned snapshots.
#[derive(Debug)]
pub struct ActiveSet {
    loader_name: String,
    tools: RwLock<Vec<ToolDefinition>>,
}

impl ActiveSet {
    /// Create a set holding only the loader
    pub fn new(loader: ToolDefinition) -> Self {
        Self {
            loader_name: loader.name.clone(),
            tools: RwLock::new(vec![loader]),
        }
    }

    /// Name of the pinned loader tool
    pub fn loader_name(&self) -> &str {
        &self.loader_name
    }

    /// Consistent copy of every exposed definition, in order
    pub fn snapshot(&self) -> Vec<ToolDefinition> {
        self.tools.read().clone()
    }

    /// Exposed names, in order
    pub fn names(&self) -> Vec<String> {
        self.tools.read().iter().map(|t| t.name.clone()).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.read().iter().any(|t| t.name == name)
    }

    /// Current definition of an exposed tool
    pub fn get(&self, name: &str) -> Option<ToolDefinition> {
        self.tools.read().iter().find(|t| t.name == name).cloned()
    }

    pub fn len(&self) -> usize {
        self.tools.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.read().is_empty()
    }

    /// Append a definition; false if the name is already exposed
    pub fn insert(&self, tool: ToolDefinition) -> bool {
        let mut tools = self.tools.write();
        if tools.iter().any(|t| t.name == tool.name) {
            return false;
        }
        tools.push(tool);
        true
    }

    /// Replace an exposed definition keeping its position; false if absent
    pub fn update(&self, tool: ToolDefinition) -> bool {
        let mut tools = self.tools.write();
        match tools.iter_mut().find(|t| t.name == tool.name) {
            Some(slot) => {
                *slot = tool;
                true
            }
            None => false,
        }
    }

    /// Remove a tool; the loader is never removed
    pub fn remove(&self, name: &str) -> bool {
        if name == self.loader_name {
            return false;
        }
        let mut tools = self.tools.write();
        let before = tools.len();
        tools.retain(|t| t.name != name);
        tools.len() != before
    }

    /// Remove every tool named in `names` (except the loader), returning
    /// how many were removed
    pub fn remove_all<'a>(&self, names: impl IntoIterator<Item = &'a str>) -> usize {
        names.into_iter().filter(|n| self.remove(n)).count()
    }
}
