//! Session manager: starts, tracks and tears down remote providers
//!
//! Startup runs every provider concurrently, each under the init timeout.
//! A provider that fails or hangs is marked Failed and contributes no
//! tools; the others carry on.

use futures::future::join_all;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use super::error::{ProviderError, ProviderResult};
use super::remote::{ProviderState, RemoteProvider};
use super::session::SessionConnector;
use crate::logging::Logger;
use crate::tools::ToolRegistry;
use crate::types::{LaunchSpec, ToolDefinition};
use crate::{log_error, log_info};

/// Default per-provider initialization bound
pub const DEFAULT_INIT_TIMEOUT: Duration = Duration::from_secs(30);

/// A provider that reached Ready, with the tools it registered
#[derive(Debug, Clone)]
pub struct ReadyProvider {
    pub name: String,
    pub tools: Vec<ToolDefinition>,
}

/// A provider that did not start
#[derive(Debug)]
pub struct ProviderFailure {
    pub name: String,
    pub error: ProviderError,
}

/// Outcome of starting a batch of providers
#[derive(Debug, Default)]
pub struct StartupReport {
    pub ready: Vec<ReadyProvider>,
    pub failed: Vec<ProviderFailure>,
}

impl StartupReport {
    pub fn ready_names(&self) -> Vec<&str> {
        self.ready.iter().map(|p| p.name.as_str()).collect()
    }

    pub fn failed_names(&self) -> Vec<&str> {
        self.failed.iter().map(|p| p.name.as_str()).collect()
    }
}

/// Owns every remote provider
pub struct SessionManager {
    connector: Arc<dyn SessionConnector>,
    registry: Arc<ToolRegistry>,
    providers: RwLock<BTreeMap<String, Arc<RemoteProvider>>>,
    init_timeout: Duration,
    logger: Arc<dyn Logger>,
}

impl SessionManager {
    pub fn new(
        connector: Arc<dyn SessionConnector>,
        registry: Arc<ToolRegistry>,
        logger: Arc<dyn Logger>,
    ) -> Self {
        Self {
            connector,
            registry,
            providers: RwLock::new(BTreeMap::new()),
            init_timeout: DEFAULT_INIT_TIMEOUT,
            logger,
        }
    }

    /// Set the per-provider initialization bound
    pub fn with_init_timeout(mut self, timeout: Duration) -> Self {
        self.init_timeout = timeout;
        self
    }

    pub fn registry(&self) -> &Arc<ToolRegistry> {
        &self.registry
    }

    /// Start every provider concurrently; never fails as a whole
    pub async fn start_all<I>(&self, specs: I) -> StartupReport
    where
        I: IntoIterator<Item = (String, LaunchSpec)>,
    {
        let results = join_all(
            specs
                .into_iter()
                .map(|(name, spec)| async move {
                    let outcome = self.start(&name, spec).await;
                    (name, outcome)
                }),
        )
        .await;

        let mut report = StartupReport::default();
        for (name, outcome) in results {
            match outcome {
                Ok(ready) => report.ready.push(ready),
                Err(error) => report.failed.push(ProviderFailure { name, error }),
            }
        }

        log_info!(
            self.logger,
            "[SessionManager] Startup complete: {} ready, {} failed",
            report.ready.len(),
            report.failed.len()
        );
        report
    }

    /// Start one provider and register its tools
    pub async fn start(&self, name: &str, spec: LaunchSpec) -> ProviderResult<ReadyProvider> {
        let provider = Arc::new(RemoteProvider::new(name, spec, Arc::clone(&self.logger)));
        {
            let mut providers = self.providers.write();
            if providers.get(name).is_some_and(|p| p.state().is_ready()) {
                return Err(ProviderError::init_failed(name, "provider is already running"));
            }
            providers.insert(name.to_string(), Arc::clone(&provider));
        }

        let started = tokio::time::timeout(self.init_timeout, async {
            provider.initialize(self.connector.as_ref()).await?;
            provider.bindings().await
        })
        .await;

        let bindings = match started {
            Ok(Ok(bindings)) => bindings,
            Ok(Err(e)) => return Err(self.record_failure(&provider, e).await),
            Err(_) => {
                let e = ProviderError::Timeout {
                    provider: name.to_string(),
                    secs: self.init_timeout.as_secs(),
                };
                return Err(self.record_failure(&provider, e).await);
            }
        };

        let tools: Vec<ToolDefinition> = bindings.iter().map(|b| b.definition.clone()).collect();
        self.registry.register_all(bindings);

        log_info!(
            self.logger,
            "[SessionManager] '{}' ready with {} tools",
            name,
            tools.len()
        );
        Ok(ReadyProvider {
            name: name.to_string(),
            tools,
        })
    }

    async fn record_failure(&self, provider: &RemoteProvider, error: ProviderError) -> ProviderError {
        log_error!(self.logger, "[SessionManager] {}", error);
        provider.fail(error.to_string()).await;
        error
    }

    /// Look up a provider
    pub fn provider(&self, name: &str) -> Option<Arc<RemoteProvider>> {
        self.providers.read().get(name).cloned()
    }

    /// Names of providers currently Ready
    pub fn ready_providers(&self) -> Vec<String> {
        self.providers
            .read()
            .iter()
            .filter(|(_, p)| p.state().is_ready())
            .map(|(n, _)| n.clone())
            .collect()
    }

    /// State of every known provider
    pub fn states(&self) -> Vec<(String, ProviderState)> {
        self.providers
            .read()
            .iter()
            .map(|(n, p)| (n.clone(), p.state()))
            .collect()
    }

    /// Close a provider and unregister its tools; false if unknown
    pub async fn remove(&self, name: &str) -> bool {
        let provider = self.providers.write().remove(name);
        match provider {
            Some(provider) => {
                self.registry.remove_provider(name);
                provider.close().await;
                log_info!(self.logger, "[SessionManager] Removed '{}'", name);
                true
            }
            None => false,
        }
    }

    /// Close every provider; safe to call repeatedly
    pub async fn close_all(&self) {
        let providers: Vec<_> = std::mem::take(&mut *self.providers.write())
            .into_values()
            .collect();
        if providers.is_empty() {
            return;
        }

        log_info!(
            self.logger,
            "[SessionManager] Closing {} providers",
            providers.len()
        );
        for provider in &providers {
            self.registry.remove_provider(provider.name());
        }
        join_all(providers.iter().map(|p| p.close())).await;
    }
}
