//! Tool registry: the canonical name -> binding store
//!
//! Bindings are registered by the local provider and by every remote
//! provider that reaches Ready. Registration order is kept so catalogues
//! list tools the way their servers announced them.

use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use super::binding::ToolBinding;
use crate::logging::Logger;
use crate::types::ToolDefinition;
use crate::{log_debug, log_info};

/// Which owners a filter admits
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ProviderScope {
    /// Every tool
    #[default]
    Any,
    /// Only in-process tools
    Local,
    /// Only tools owned by this provider
    Named(String),
}

/// Filter for selecting tools from the registry
#[derive(Debug, Clone, Default)]
pub struct ToolFilter {
    /// If set, only include tools with these names
    pub include: Option<HashSet<String>>,
    /// Exclude tools with these names
    pub exclude: HashSet<String>,
    /// Restrict by owner
    pub scope: ProviderScope,
}

impl ToolFilter {
    /// Include all tools
    pub fn all() -> Self {
        Self::default()
    }

    /// Include only specific tools
    pub fn with_include(mut self, names: impl IntoIterator<Item = String>) -> Self {
        self.include = Some(names.into_iter().collect());
        self
    }

    /// Exclude specific tools
    pub fn with_exclude(mut self, names: impl IntoIterator<Item = String>) -> Self {
        self.exclude = names.into_iter().collect();
        self
    }

    /// Only tools owned by `provider`
    pub fn for_provider(mut self, provider: impl Into<String>) -> Self {
        self.scope = ProviderScope::Named(provider.into());
        self
    }

    /// Only in-process tools
    pub fn local_only(mut self) -> Self {
        self.scope = ProviderScope::Local;
        self
    }

    /// Check if a binding matches this filter
    pub fn matches(&self, binding: &ToolBinding) -> bool {
        let name = binding.name();

        if self.exclude.contains(name) {
            return false;
        }

        if let Some(ref include) = self.include {
            if !include.contains(name) {
                return false;
            }
        }

        match &self.scope {
            ProviderScope::Any => true,
            ProviderScope::Local => binding.provider.is_none(),
            ProviderScope::Named(p) => binding.provider.as_deref() == Some(p.as_str()),
        }
    }
}

#[derive(Default)]
struct Entries {
    by_name: HashMap<String, Arc<ToolBinding>>,
    order: Vec<String>,
}

/// Registry of every known tool
///
/// A name maps to exactly one binding; registering an existing name
/// replaces the binding in place (last write wins).
pub struct ToolRegistry {
    entries: RwLock<Entries>,
    logger: Arc<dyn Logger>,
}

impl ToolRegistry {
    /// Create an empty registry
    pub fn new(logger: Arc<dyn Logger>) -> Self {
        Self {
            entries: RwLock::new(Entries::default()),
            logger,
        }
    }

    /// Insert or overwrite a binding, returning the one it replaced
    pub fn register(&self, binding: ToolBinding) -> Option<Arc<ToolBinding>> {
        let name = binding.name().to_string();
        let owner = binding.provider.clone();
        let mut entries = self.entries.write();

        let previous = entries.by_name.insert(name.clone(), Arc::new(binding));
        if previous.is_none() {
            entries.order.push(name.clone());
        }
        drop(entries);

        match &previous {
            Some(old) => log_info!(
                self.logger,
                "[ToolRegistry] Replaced tool '{}' (was {:?}, now {:?})",
                name,
                old.provider,
                owner
            ),
            None => log_debug!(
                self.logger,
                "[ToolRegistry] Registered tool '{}' ({:?})",
                name,
                owner
            ),
        }

        previous
    }

    /// Register several bindings, returning how many were registered
    pub fn register_all(&self, bindings: impl IntoIterator<Item = ToolBinding>) -> usize {
        bindings.into_iter().map(|b| self.register(b)).count()
    }

    /// Find the binding for a tool name
    pub fn lookup(&self, name: &str) -> Option<Arc<ToolBinding>> {
        self.entries.read().by_name.get(name).cloned()
    }

    /// Whether a tool name is registered
    pub fn contains(&self, name: &str) -> bool {
        self.entries.read().by_name.contains_key(name)
    }

    /// Bindings owned by a provider, in registration order
    pub fn list_by_provider(&self, provider: &str) -> Vec<Arc<ToolBinding>> {
        let entries = self.entries.read();
        entries
            .order
            .iter()
            .filter_map(|name| entries.by_name.get(name))
            .filter(|b| b.provider.as_deref() == Some(provider))
            .cloned()
            .collect()
    }

    /// Distinct owning providers, in order of first registration
    pub fn providers(&self) -> Vec<String> {
        let entries = self.entries.read();
        let mut seen: Vec<String> = Vec::new();
        for binding in entries.order.iter().filter_map(|n| entries.by_name.get(n)) {
            if let Some(owner) = &binding.provider {
                if !seen.contains(owner) {
                    seen.push(owner.clone());
                }
            }
        }
        seen
    }

    /// Drop every binding still owned by `provider`
    ///
    /// Bindings that another provider has since overwritten are kept.
    pub fn remove_provider(&self, provider: &str) -> Vec<String> {
        let mut entries = self.entries.write();
        let removed: Vec<String> = entries
            .by_name
            .iter()
            .filter(|(_, b)| b.provider.as_deref() == Some(provider))
            .map(|(name, _)| name.clone())
            .collect();

        for name in &removed {
            entries.by_name.remove(name);
        }
        entries.order.retain(|n| !removed.contains(n));
        drop(entries);

        if !removed.is_empty() {
            log_info!(
                self.logger,
                "[ToolRegistry] Removed {} tools owned by '{}'",
                removed.len(),
                provider
            );
        }
        removed
    }

    /// Definitions of the tools matching a filter, in registration order
    pub fn definitions(&self, filter: &ToolFilter) -> Vec<ToolDefinition> {
        let entries = self.entries.read();
        entries
            .order
            .iter()
            .filter_map(|name| entries.by_name.get(name))
            .filter(|b| filter.matches(b))
            .map(|b| b.definition.clone())
            .collect()
    }

    /// All tool names, in registration order
    pub fn names(&self) -> Vec<String> {
        self.entries.read().order.clone()
    }

    /// Number of registered tools
    pub fn len(&self) -> usize {
        self.entries.read().order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
