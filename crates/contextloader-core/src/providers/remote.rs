//! Remote capability provider: lifecycle plus a serialized session

use parking_lot::RwLock;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::Mutex;

use super::error::{ProviderError, ProviderResult};
use super::session::{CallOutcome, SessionConnector, ToolSession};
use crate::logging::Logger;
use crate::tools::ToolBinding;
use crate::types::{LaunchSpec, ToolDefinition};
use crate::{log_debug, log_info, log_warn};

/// Lifecycle of a provider
///
/// `Unstarted -> Initializing -> Ready -> Closed`, with `Failed` reachable
/// from `Initializing` or `Ready`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderState {
    Unstarted,
    Initializing,
    Ready,
    Closed,
    Failed(String),
}

impl ProviderState {
    pub fn is_ready(&self) -> bool {
        matches!(self, ProviderState::Ready)
    }
}

impl std::fmt::Display for ProviderState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderState::Unstarted => write!(f, "unstarted"),
            ProviderState::Initializing => write!(f, "initializing"),
            ProviderState::Ready => write!(f, "ready"),
            ProviderState::Closed => write!(f, "closed"),
            ProviderState::Failed(reason) => write!(f, "failed: {}", reason),
        }
    }
}

/// A tool server reached over a session
///
/// The session sits behind an async mutex, so calls to one provider run one
/// at a time while different providers proceed independently.
pub struct RemoteProvider {
    name: String,
    spec: LaunchSpec,
    state: RwLock<ProviderState>,
    session: Mutex<Option<Box<dyn ToolSession>>>,
    logger: Arc<dyn Logger>,
}

impl RemoteProvider {
    pub fn new(name: impl Into<String>, spec: LaunchSpec, logger: Arc<dyn Logger>) -> Self {
        Self {
            name: name.into(),
            spec,
            state: RwLock::new(ProviderState::Unstarted),
            session: Mutex::new(None),
            logger,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn spec(&self) -> &LaunchSpec {
        &self.spec
    }

    /// Current lifecycle state
    pub fn state(&self) -> ProviderState {
        self.state.read().clone()
    }

    fn set_state(&self, state: ProviderState) {
        log_debug!(self.logger, "[RemoteProvider] '{}' -> {}", self.name, state);
        *self.state.write() = state;
    }

    fn ensure_ready(&self) -> ProviderResult<()> {
        let state = self.state.read();
        if state.is_ready() {
            Ok(())
        } else {
            Err(ProviderError::NotReady {
                provider: self.name.clone(),
                state: state.to_string(),
            })
        }
    }

    /// Start the server and complete the handshake
    ///
    /// Only valid from `Unstarted`; a Ready provider returns `Ok` untouched.
    pub async fn initialize(&self, connector: &dyn SessionConnector) -> ProviderResult<()> {
        {
            let mut state = self.state.write();
            match &*state {
                ProviderState::Unstarted => *state = ProviderState::Initializing,
                ProviderState::Ready => return Ok(()),
                other => {
                    return Err(ProviderError::NotReady {
                        provider: self.name.clone(),
                        state: other.to_string(),
                    })
                }
            }
        }

        log_info!(
            self.logger,
            "[RemoteProvider] Starting '{}': {} {}",
            self.name,
            self.spec.command,
            self.spec.args.join(" ")
        );

        let mut slot = self.session.lock().await;
        match connector.connect(&self.name, &self.spec).await {
            Ok(session) => {
                *slot = Some(session);
                self.set_state(ProviderState::Ready);
                Ok(())
            }
            Err(e) => {
                self.set_state(ProviderState::Failed(e.to_string()));
                Err(e)
            }
        }
    }

    /// Enumerate the server's tools (Ready only)
    pub async fn list_tools(&self) -> ProviderResult<Vec<ToolDefinition>> {
        self.ensure_ready()?;
        let slot = self.session.lock().await;
        match slot.as_ref() {
            Some(session) => session.list_tools().await,
            None => Err(ProviderError::NotReady {
                provider: self.name.clone(),
                state: "no session".to_string(),
            }),
        }
    }

    /// List the server's tools as bindings that proxy through this provider
    pub async fn bindings(self: &Arc<Self>) -> ProviderResult<Vec<ToolBinding>> {
        let tools = self.list_tools().await?;
        Ok(tools
            .into_iter()
            .map(|def| ToolBinding::remote(def, Arc::clone(self)))
            .collect())
    }

    /// Invoke a tool (Ready only); calls on one provider are serialized
    pub async fn call_tool(&self, name: &str, arguments: Value) -> ProviderResult<CallOutcome> {
        self.ensure_ready()?;
        log_debug!(self.logger, "[RemoteProvider] '{}' calling {}", self.name, name);

        let slot = self.session.lock().await;
        match slot.as_ref() {
            Some(session) => session.call_tool(name, arguments).await,
            None => Err(ProviderError::NotReady {
                provider: self.name.clone(),
                state: "no session".to_string(),
            }),
        }
    }

    /// Record a failure and release any half-open session
    pub async fn fail(&self, reason: impl Into<String>) {
        self.set_state(ProviderState::Failed(reason.into()));
        self.release().await;
    }

    /// Release the session; safe to call any number of times
    ///
    /// A Failed provider keeps its failure state.
    pub async fn close(&self) {
        {
            let mut state = self.state.write();
            if !matches!(*state, ProviderState::Failed(_)) {
                *state = ProviderState::Closed;
            }
        }
        self.release().await;
    }

    async fn release(&self) {
        let session = self.session.lock().await.take();
        if let Some(session) = session {
            log_info!(self.logger, "[RemoteProvider] Shutting down '{}'", self.name);
            if let Err(e) = session.shutdown().await {
                log_warn!(
                    self.logger,
                    "[RemoteProvider] '{}' did not shut down cleanly: {}",
                    self.name,
                    e
                );
            }
        }
    }
}

impl std::fmt::Debug for RemoteProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteProvider")
            .field("name", &self.name)
            .field("command", &self.spec.command)
            .field("state", &self.state())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::NoOpLogger;
    use crate::providers::testing::FakeConnector;
    use serde_json::json;

    fn provider(name: &str) -> Arc<RemoteProvider> {
        Arc::new(RemoteProvider::new(
            name,
            LaunchSpec::new("fake-server"),
            Arc::new(NoOpLogger::new()),
        ))
    }

    #[tokio::test]
    async fn test_lifecycle_to_ready_and_closed() {
        let connector = FakeConnector::new().with_server("figma", &["get_figma_data"]);
        let figma = provider("figma");
        assert_eq!(figma.state(), ProviderState::Unstarted);

        figma.initialize(&connector).await.unwrap();
        assert_eq!(figma.state(), ProviderState::Ready);

        let bindings = figma.bindings().await.unwrap();
        assert_eq!(bindings.len(), 1);
        assert_eq!(bindings[0].provider.as_deref(), Some("figma"));

        let out = figma.call_tool("get_figma_data", json!({"fileKey": "abc"})).await.unwrap();
        assert_eq!(out.text, "figma/get_figma_data ok");

        figma.close().await;
        figma.close().await;
        assert_eq!(figma.state(), ProviderState::Closed);
        assert_eq!(connector.shutdowns(), 1);
    }

    #[tokio::test]
    async fn test_failed_init() {
        let connector = FakeConnector::new().with_failing("github");
        let github = provider("github");

        assert!(github.initialize(&connector).await.is_err());
        assert!(matches!(github.state(), ProviderState::Failed(_)));

        github.close().await;
        assert!(matches!(github.state(), ProviderState::Failed(_)));
    }

    #[tokio::test]
    async fn test_calls_require_ready() {
        let github = provider("github");
        let err = github.call_tool("search_code", json!({})).await.unwrap_err();
        assert!(matches!(err, ProviderError::NotReady { .. }));
        assert!(github.list_tools().await.is_err());
    }

    #[tokio::test]
    async fn test_closed_provider_cannot_restart() {
        let connector = FakeConnector::new().with_server("figma", &["get_figma_data"]);
        let figma = provider("figma");
        figma.close().await;
        assert!(figma.initialize(&connector).await.is_err());
    }
}
