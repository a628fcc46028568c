//! Disclosure state behind the loader

use std::collections::BTreeMap;

use crate::briefs::{Briefs, ProviderSummary};
use crate::types::ToolDefinition;

/// What the model has been shown of one remote server
#[derive(Debug, Clone, Default)]
pub struct ServerDisclosure {
    pub summary: String,
    pub briefs: Briefs,
    /// The server's catalogue, in the order it was announced
    pub tools: Vec<ToolDefinition>,
    pub summaries_loaded: bool,
    /// Tools activated from this server, in activation order
    pub active_tools: Vec<String>,
}

impl ServerDisclosure {
    pub fn new(tools: Vec<ToolDefinition>, summary: ProviderSummary) -> Self {
        Self {
            summary: summary.summary,
            briefs: summary.briefs,
            tools,
            summaries_loaded: false,
            active_tools: Vec::new(),
        }
    }

    pub fn offers(&self, name: &str) -> bool {
        self.tools.iter().any(|t| t.name == name)
    }
}

/// The flat catalogue: every briefed tool
#[derive(Debug, Clone, Default)]
pub struct FlatCatalogue {
    pub tools: Vec<ToolDefinition>,
    pub briefs: Briefs,
}

impl FlatCatalogue {
    pub fn offers(&self, name: &str) -> bool {
        self.briefs.contains_key(name)
    }
}

/// Loader state for both modes
#[derive(Debug, Default)]
pub struct LoaderState {
    pub servers: BTreeMap<String, ServerDisclosure>,
    pub flat: FlatCatalogue,
}
