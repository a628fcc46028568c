//! The progressive-disclosure state machine
//!
//! Flat mode:
//! ```text
//! catalogue (briefs) ──activate(names)──► ActiveSet
//! ```
//! Partitioned mode, per server:
//! ```text
//! NotDisclosed ──load_summaries──► SummariesLoaded ──load_tools──► tools Active
//! ```

use parking_lot::RwLock;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;

use super::active_set::ActiveSet;
use super::description::{
    flat_definition, flat_description, partitioned_definition, partitioned_description,
    LOADER_TOOL_NAME,
};
use super::error::LoaderError;
use super::report::ActivationReport;
use super::state::{LoaderState, ServerDisclosure};
use crate::briefs::BriefGenerator;
use crate::config::LoaderMode;
use crate::logging::Logger;
use crate::tools::{ToolFilter, ToolRegistry};
use crate::types::ToolDefinition;
use crate::{log_debug, log_info};

#[derive(Debug, Deserialize)]
struct FlatArgs {
    tool_names: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct PartitionedArgs {
    #[serde(default)]
    action: String,
    #[serde(default)]
    servers: Option<Vec<String>>,
    #[serde(default)]
    tools: Option<Vec<String>>,
    #[serde(default)]
    server: Option<String>,
}

/// A decoded loader call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoaderRequest {
    Activate { tool_names: Vec<String> },
    LoadSummaries { servers: Vec<String> },
    LoadTools { server: String, tools: Vec<String> },
}

impl LoaderRequest {
    /// Decode the model's argument payload for the given mode
    pub fn decode(mode: LoaderMode, arguments: &Value) -> Result<Self, LoaderError> {
        match mode {
            LoaderMode::Flat => serde_json::from_value::<FlatArgs>(arguments.clone())
                .map(|a| LoaderRequest::Activate {
                    tool_names: a.tool_names,
                })
                .map_err(|_| LoaderError::ToolNamesRequired),
            LoaderMode::Partitioned => {
                let args: PartitionedArgs = serde_json::from_value(arguments.clone())
                    .map_err(|e| LoaderError::InvalidAction(e.to_string()))?;
                match args.action.as_str() {
                    "load_tool_summaries" => match args.servers {
                        Some(servers) if !servers.is_empty() => {
                            Ok(LoaderRequest::LoadSummaries { servers })
                        }
                        _ => Err(LoaderError::ServersRequired),
                    },
                    "load_tools" => match (args.server, args.tools) {
                        (Some(server), Some(tools)) if !server.is_empty() && !tools.is_empty() => {
                            Ok(LoaderRequest::LoadTools { server, tools })
                        }
                        _ => Err(LoaderError::ToolsAndServerRequired),
                    },
                    other => Err(LoaderError::InvalidAction(other.to_string())),
                }
            }
        }
    }
}

/// Owns the loader meta-tool, its disclosure state and the ActiveSet
pub struct LoaderController {
    mode: LoaderMode,
    registry: Arc<ToolRegistry>,
    briefs: BriefGenerator,
    active: Arc<ActiveSet>,
    state: RwLock<LoaderState>,
    hidden: HashSet<String>,
    logger: Arc<dyn Logger>,
}

impl LoaderController {
    pub fn new(
        mode: LoaderMode,
        registry: Arc<ToolRegistry>,
        briefs: BriefGenerator,
        logger: Arc<dyn Logger>,
    ) -> Self {
        let state = LoaderState::default();
        let definition = Self::build_definition(mode, &state);
        Self {
            mode,
            registry,
            briefs,
            active: Arc::new(ActiveSet::new(definition)),
            state: RwLock::new(state),
            hidden: HashSet::new(),
            logger,
        }
    }

    /// Leave these tools out of the flat catalogue
    pub fn with_hidden_tools(mut self, names: impl IntoIterator<Item = String>) -> Self {
        self.hidden = names.into_iter().collect();
        self
    }

    pub fn mode(&self) -> LoaderMode {
        self.mode
    }

    /// The exposed tool set shared with the dispatcher
    pub fn active_set(&self) -> Arc<ActiveSet> {
        Arc::clone(&self.active)
    }

    /// Current loader definition
    pub fn definition(&self) -> ToolDefinition {
        self.active
            .get(LOADER_TOOL_NAME)
            .unwrap_or_else(|| Self::build_definition(self.mode, &self.state.read()))
    }

    pub fn is_loader(name: &str) -> bool {
        name == LOADER_TOOL_NAME
    }

    /// Known servers, in name order
    pub fn servers(&self) -> Vec<String> {
        self.state.read().servers.keys().cloned().collect()
    }

    /// Whether summaries are loaded for a server (None if unknown)
    pub fn summaries_loaded(&self, server: &str) -> Option<bool> {
        self.state
            .read()
            .servers
            .get(server)
            .map(|s| s.summaries_loaded)
    }

    /// Tools activated from a server
    pub fn active_tools(&self, server: &str) -> Vec<String> {
        self.state
            .read()
            .servers
            .get(server)
            .map(|s| s.active_tools.clone())
            .unwrap_or_default()
    }

    /// Names in the flat catalogue, in order
    pub fn catalogue(&self) -> Vec<String> {
        self.state
            .read()
            .flat
            .tools
            .iter()
            .map(|t| t.name.clone())
            .collect()
    }

    fn build_definition(mode: LoaderMode, state: &LoaderState) -> ToolDefinition {
        match mode {
            LoaderMode::Flat => flat_definition(flat_description(&state.flat)),
            LoaderMode::Partitioned => partitioned_definition(partitioned_description(state)),
        }
    }

    fn refresh_description(&self, state: &LoaderState) {
        self.active.update(Self::build_definition(self.mode, state));
        log_debug!(self.logger, "[LoaderController] Regenerated loader description");
    }

    fn flat_filter(&self) -> ToolFilter {
        let mut exclude: Vec<String> = self.hidden.iter().cloned().collect();
        exclude.push(LOADER_TOOL_NAME.to_string());
        ToolFilter::all().with_exclude(exclude)
    }

    /// Rebuild the flat catalogue from the registry, briefing only new tools
    pub async fn refresh_catalogue(&self) {
        let tools = self.registry.definitions(&self.flat_filter());
        let missing: Vec<ToolDefinition> = {
            let state = self.state.read();
            tools
                .iter()
                .filter(|t| !state.flat.briefs.contains_key(&t.name))
                .cloned()
                .collect()
        };
        let fresh = self.briefs.brief(&missing).await;

        let mut state = self.state.write();
        let mut briefs = std::mem::take(&mut state.flat.briefs);
        briefs.extend(fresh);
        briefs.retain(|name, _| tools.iter().any(|t| &t.name == name));
        state.flat.briefs = briefs;
        state.flat.tools = tools;

        log_info!(
            self.logger,
            "[LoaderController] Flat catalogue holds {} tools",
            state.flat.tools.len()
        );
        self.refresh_description(&state);
    }

    /// Build the initial catalogue
    ///
    /// Flat mode briefs every registered tool; partitioned mode summarizes
    /// every provider that owns tools in the registry.
    pub async fn prepare(&self) {
        match self.mode {
            LoaderMode::Flat => self.refresh_catalogue().await,
            LoaderMode::Partitioned => {
                for server in self.registry.providers() {
                    self.add_server(&server).await;
                }
            }
        }
    }

    /// Make a Ready server's tools disclosable
    pub async fn add_server(&self, name: &str) {
        if self.mode == LoaderMode::Flat {
            self.refresh_catalogue().await;
            return;
        }

        let tools: Vec<ToolDefinition> = self
            .registry
            .list_by_provider(name)
            .iter()
            .map(|b| b.definition.clone())
            .collect();
        let summary = self.briefs.provider_summary(name, &tools).await;

        let mut state = self.state.write();
        let mut disclosure = ServerDisclosure::new(tools, summary);
        if let Some(previous) = state.servers.remove(name) {
            // A refreshed server keeps what was already disclosed
            disclosure.summaries_loaded = previous.summaries_loaded;
            let (kept, gone): (Vec<String>, Vec<String>) = previous
                .active_tools
                .into_iter()
                .partition(|t| disclosure.offers(t));
            self.active.remove_all(gone.iter().map(String::as_str));
            disclosure.active_tools = kept;
        }
        state.servers.insert(name.to_string(), disclosure);
        log_info!(self.logger, "[LoaderController] Added server '{}'", name);
        self.refresh_description(&state);
    }

    /// Forget a server and withdraw its tools from the ActiveSet
    ///
    /// Call after its tools have left the registry.
    pub fn remove_server(&self, name: &str) -> bool {
        let mut state = self.state.write();
        let removed = match self.mode {
            LoaderMode::Partitioned => match state.servers.remove(name) {
                Some(server) => {
                    self.active
                        .remove_all(server.tools.iter().map(|t| t.name.as_str()));
                    true
                }
                None => false,
            },
            LoaderMode::Flat => {
                let registry = &self.registry;
                let gone: Vec<String> = state
                    .flat
                    .tools
                    .iter()
                    .filter(|t| !registry.contains(&t.name))
                    .map(|t| t.name.clone())
                    .collect();
                state.flat.tools.retain(|t| !gone.contains(&t.name));
                state.flat.briefs.retain(|n, _| !gone.contains(n));
                self.active.remove_all(gone.iter().map(String::as_str));
                !gone.is_empty()
            }
        };

        if removed {
            log_info!(self.logger, "[LoaderController] Removed server '{}'", name);
            self.refresh_description(&state);
        }
        removed
    }

    /// Flat mode: expose the named tools
    pub fn activate(&self, tool_names: &[String]) -> Result<ActivationReport, LoaderError> {
        if self.mode != LoaderMode::Flat {
            return Err(LoaderError::WrongMode {
                action: "activate",
                mode: self.mode.as_str(),
            });
        }

        let state = self.state.read();
        let mut report = ActivationReport::default();
        for name in tool_names {
            if self.active.contains(name) {
                report.duplicates.push(name.clone());
                continue;
            }
            let binding = state
                .flat
                .offers(name)
                .then(|| self.registry.lookup(name))
                .flatten();
            match binding {
                Some(binding) => {
                    if self.active.insert(binding.definition.clone()) {
                        report.activated.push(name.clone());
                    } else {
                        report.duplicates.push(name.clone());
                    }
                }
                None => report.failed.push(name.clone()),
            }
        }

        log_info!(self.logger, "[LoaderController] activate: {:?}", report);
        Ok(report)
    }

    /// Partitioned mode: reveal per-tool briefs for servers
    ///
    /// Every name is checked before any is marked.
    pub fn load_summaries(&self, servers: &[String]) -> Result<Vec<String>, LoaderError> {
        if self.mode != LoaderMode::Partitioned {
            return Err(LoaderError::WrongMode {
                action: "load_tool_summaries",
                mode: self.mode.as_str(),
            });
        }
        if servers.is_empty() {
            return Err(LoaderError::ServersRequired);
        }

        let mut state = self.state.write();
        if let Some(unknown) = servers.iter().find(|s| !state.servers.contains_key(*s)) {
            return Err(LoaderError::UnknownServer(unknown.clone()));
        }

        let mut changed = false;
        for name in servers {
            if let Some(server) = state.servers.get_mut(name) {
                changed |= !server.summaries_loaded;
                server.summaries_loaded = true;
            }
        }
        if changed {
            self.refresh_description(&state);
        }

        log_info!(
            self.logger,
            "[LoaderController] Loaded summaries for {}",
            servers.join(", ")
        );
        Ok(servers.to_vec())
    }

    /// Partitioned mode: expose tools of a server whose summaries are loaded
    pub fn load_tools(&self, server: &str, tools: &[String]) -> Result<ActivationReport, LoaderError> {
        if self.mode != LoaderMode::Partitioned {
            return Err(LoaderError::WrongMode {
                action: "load_tools",
                mode: self.mode.as_str(),
            });
        }
        if server.is_empty() || tools.is_empty() {
            return Err(LoaderError::ToolsAndServerRequired);
        }

        let mut state = self.state.write();
        let disclosure = match state.servers.get_mut(server) {
            Some(d) if d.summaries_loaded => d,
            _ => return Err(LoaderError::SummariesNotLoaded(server.to_string())),
        };

        let mut report = ActivationReport::for_server(server);
        for name in tools {
            if self.active.contains(name) {
                report.duplicates.push(name.clone());
                continue;
            }
            let binding = self
                .registry
                .lookup(name)
                .filter(|b| b.provider.as_deref() == Some(server) && disclosure.offers(name));
            match binding {
                Some(binding) => {
                    if self.active.insert(binding.definition.clone()) {
                        disclosure.active_tools.push(name.clone());
                        report.activated.push(name.clone());
                    } else {
                        report.duplicates.push(name.clone());
                    }
                }
                None => report.failed.push(name.clone()),
            }
        }

        log_info!(self.logger, "[LoaderController] load_tools: {:?}", report);
        Ok(report)
    }

    /// Run a decoded request and render the reply text
    pub fn handle(&self, request: LoaderRequest) -> Result<String, LoaderError> {
        match request {
            LoaderRequest::Activate { tool_names } => {
                self.activate(&tool_names).map(|r| r.to_string())
            }
            LoaderRequest::LoadSummaries { servers } => self
                .load_summaries(&servers)
                .map(|loaded| format!("Loaded tool summaries for servers: {}.", loaded.join(", "))),
            LoaderRequest::LoadTools { server, tools } => {
                self.load_tools(&server, &tools).map(|r| r.to_string())
            }
        }
    }

    /// Entry point for a model call to the loader; always yields text
    pub fn execute(&self, arguments: &Value) -> String {
        LoaderRequest::decode(self.mode, arguments)
            .and_then(|request| self.handle(request))
            .unwrap_or_else(|e| format!("Error: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::MockCompletion;
    use crate::logging::NoOpLogger;
    use crate::tools::{FnTool, ToolBinding};
    use serde_json::json;

    fn logger() -> Arc<dyn Logger> {
        Arc::new(NoOpLogger::new())
    }

    fn local(name: &str) -> ToolBinding {
        ToolBinding::local(Arc::new(FnTool::new(
            ToolDefinition::new(name, format!("The {} tool.", name)),
            |_| Ok(String::new()),
        )))
    }

    fn owned(name: &str, provider: &str) -> ToolBinding {
        let mut binding = local(name);
        binding.provider = Some(provider.to_string());
        binding
    }

    fn controller(mode: LoaderMode, bindings: Vec<ToolBinding>) -> LoaderController {
        let registry = Arc::new(ToolRegistry::new(logger()));
        registry.register_all(bindings);
        let briefs = BriefGenerator::new(Arc::new(MockCompletion::error("offline")), logger());
        LoaderController::new(mode, registry, briefs, logger())
    }

    async fn flat() -> LoaderController {
        let c = controller(
            LoaderMode::Flat,
            vec![local("calculator"), local("get_weather")],
        );
        c.prepare().await;
        c
    }

    async fn partitioned() -> LoaderController {
        let c = controller(
            LoaderMode::Partitioned,
            vec![
                owned("search_code", "github"),
                owned("get_issue", "github"),
                owned("get_figma_data", "figma"),
            ],
        );
        c.prepare().await;
        c
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_flat_activation_reports_each_name() {
        let c = flat().await;
        let report = c.activate(&names(&["calculator", "bogus"])).unwrap();

        assert_eq!(report.activated, names(&["calculator"]));
        assert_eq!(report.failed, names(&["bogus"]));
        assert_eq!(c.active_set().names(), names(&["loader", "calculator"]));
    }

    #[tokio::test]
    async fn test_duplicate_activation_is_a_notice() {
        let c = flat().await;
        let report = c.activate(&names(&["calculator", "calculator"])).unwrap();

        assert_eq!(report.activated, names(&["calculator"]));
        assert_eq!(report.duplicates, names(&["calculator"]));
        assert!(report.failed.is_empty());
        assert_eq!(c.active_set().len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_name_never_mutates() {
        let c = flat().await;
        let before = c.active_set().snapshot();
        let report = c.activate(&names(&["bogus"])).unwrap();
        assert_eq!(report.failed, names(&["bogus"]));
        assert_eq!(c.active_set().snapshot(), before);
    }

    #[tokio::test]
    async fn test_loader_cannot_be_activated_twice() {
        let c = flat().await;
        let report = c.activate(&names(&["loader"])).unwrap();
        assert_eq!(report.duplicates, names(&["loader"]));
    }

    #[tokio::test]
    async fn test_hidden_tools_stay_out_of_catalogue() {
        let c = controller(
            LoaderMode::Flat,
            vec![local("calculator"), local("run_shell_command")],
        )
        .with_hidden_tools(["run_shell_command".to_string()]);
        c.prepare().await;

        assert_eq!(c.catalogue(), names(&["calculator"]));
        assert!(!c.definition().description.contains("run_shell_command"));
        let report = c.activate(&names(&["run_shell_command"])).unwrap();
        assert_eq!(report.failed, names(&["run_shell_command"]));
    }

    #[tokio::test]
    async fn test_load_tools_before_summaries_fails_without_mutation() {
        let c = partitioned().await;
        let before = c.active_set().snapshot();

        let err = c.load_tools("github", &names(&["search_code"])).unwrap_err();
        assert_eq!(err, LoaderError::SummariesNotLoaded("github".into()));
        assert_eq!(c.active_set().snapshot(), before);
        assert!(c.active_tools("github").is_empty());
    }

    #[tokio::test]
    async fn test_unknown_server_leaves_state_untouched() {
        let c = partitioned().await;
        let description = c.definition().description;

        let err = c.load_summaries(&names(&["github", "slack"])).unwrap_err();
        assert_eq!(err.to_string(), "server slack not recognized");
        assert_eq!(c.summaries_loaded("github"), Some(false));
        assert_eq!(c.definition().description, description);
    }

    #[tokio::test]
    async fn test_partitioned_flow() {
        let c = partitioned().await;
        assert!(!c.definition().description.contains("search_code"));

        c.load_summaries(&names(&["github"])).unwrap();
        assert_eq!(c.summaries_loaded("github"), Some(true));
        assert!(c.definition().description.contains("- search_code:"));

        let report = c
            .load_tools("github", &names(&["search_code", "get_figma_data", "search_code"]))
            .unwrap();
        assert_eq!(report.activated, names(&["search_code"]));
        assert_eq!(report.failed, names(&["get_figma_data"]));
        assert_eq!(report.duplicates, names(&["search_code"]));
        assert_eq!(c.active_tools("github"), names(&["search_code"]));
        assert_eq!(c.active_set().names(), names(&["loader", "search_code"]));
    }

    #[tokio::test]
    async fn test_readding_server_keeps_disclosure() {
        let c = partitioned().await;
        c.load_summaries(&names(&["github"])).unwrap();
        c.load_tools("github", &names(&["search_code", "get_issue"])).unwrap();

        // get_issue disappears from the server's catalogue
        c.registry.remove_provider("github");
        c.registry.register(owned("search_code", "github"));
        c.add_server("github").await;

        assert_eq!(c.summaries_loaded("github"), Some(true));
        assert_eq!(c.active_tools("github"), names(&["search_code"]));
        assert_eq!(c.active_set().names(), names(&["loader", "search_code"]));
        assert!(c.definition().description.contains("- search_code:"));
    }

    #[tokio::test]
    async fn test_activation_leaves_description_alone() {
        let c = partitioned().await;
        c.load_summaries(&names(&["github"])).unwrap();
        let before = c.definition();
        c.load_tools("github", &names(&["search_code"])).unwrap();
        assert_eq!(c.definition(), before);

        let f = flat().await;
        let before = f.definition();
        f.activate(&names(&["calculator"])).unwrap();
        assert_eq!(f.definition(), before);
    }

    #[tokio::test]
    async fn test_resolved_but_not_inserted_is_duplicate() {
        let c = flat().await;
        // Activated behind the controller's back, as a concurrent request would
        c.active_set()
            .insert(c.registry.lookup("calculator").unwrap().definition.clone());
        let report = c.activate(&names(&["calculator"])).unwrap();
        assert_eq!(report.duplicates, names(&["calculator"]));
        assert!(report.failed.is_empty());
    }

    #[tokio::test]
    async fn test_remove_server_withdraws_tools() {
        let c = partitioned().await;
        c.load_summaries(&names(&["github"])).unwrap();
        c.load_tools("github", &names(&["search_code"])).unwrap();

        assert!(c.remove_server("github"));
        assert_eq!(c.servers(), names(&["figma"]));
        assert_eq!(c.active_set().names(), names(&["loader"]));
        assert!(!c.definition().description.contains("'github' MCP"));
    }

    #[tokio::test]
    async fn test_execute_textual_errors() {
        let c = partitioned().await;
        assert_eq!(
            c.execute(&json!({"action": "load_tool_summaries"})),
            "Error: servers list is required for load_tool_summaries action."
        );
        assert_eq!(
            c.execute(&json!({"action": "load_tools", "server": "github"})),
            "Error: tools list and server are required for load_tools action."
        );
        assert_eq!(
            c.execute(&json!({"action": "unload"})),
            "Error: Invalid action. Use 'load_tool_summaries' or 'load_tools'."
        );
        assert_eq!(
            c.execute(&json!({"action": "load_tool_summaries", "servers": ["figma"]})),
            "Loaded tool summaries for servers: figma."
        );
    }

    #[tokio::test]
    async fn test_flat_execute_requires_list() {
        let c = flat().await;
        assert_eq!(
            c.execute(&json!({"tool_names": "calculator"})),
            "Error: tool_names must be a list of strings."
        );
        assert!(c
            .execute(&json!({"tool_names": ["get_weather"]}))
            .starts_with("Activated tools: get_weather."));
    }

    #[tokio::test]
    async fn test_mode_mismatch() {
        let c = flat().await;
        assert!(matches!(
            c.load_summaries(&names(&["github"])),
            Err(LoaderError::WrongMode { .. })
        ));
    }
}
