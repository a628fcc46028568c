//! In-memory session connector
//!
//! Stands in for real tool servers in tests: servers can be configured to
//! expose tools, fail their handshake, or hang until cancelled.

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use super::error::{ProviderError, ProviderResult};
use super::session::{CallOutcome, SessionConnector, ToolSession};
use crate::types::{LaunchSpec, ToolDefinition};

#[derive(Clone)]
enum FakeServer {
    Tools(Vec<ToolDefinition>),
    Fails(String),
    Hangs,
}

#[derive(Default)]
struct Counters {
    shutdowns: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    calls: Mutex<Vec<String>>,
}

/// Connector serving canned sessions
#[derive(Default)]
pub struct FakeConnector {
    servers: HashMap<String, FakeServer>,
    call_delay: Option<Duration>,
    counters: Arc<Counters>,
}

impl FakeConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// A server exposing tools with the given names and a one-string schema
    pub fn with_server(self, name: &str, tools: &[&str]) -> Self {
        let defs = tools
            .iter()
            .map(|t| {
                ToolDefinition::new(*t, format!("{} from the {} server", t, name)).with_parameters(
                    json!({
                        "type": "object",
                        "properties": {
                            "query": { "type": "string", "description": "What to look up" }
                        }
                    }),
                )
            })
            .collect();
        self.with_tools(name, defs)
    }

    /// A server exposing exactly these definitions
    pub fn with_tools(mut self, name: &str, tools: Vec<ToolDefinition>) -> Self {
        self.servers.insert(name.to_string(), FakeServer::Tools(tools));
        self
    }

    /// A server whose handshake fails
    pub fn with_failing(mut self, name: &str) -> Self {
        self.servers.insert(
            name.to_string(),
            FakeServer::Fails(format!("{} exited during handshake", name)),
        );
        self
    }

    /// A server that never finishes its handshake
    pub fn with_hanging(mut self, name: &str) -> Self {
        self.servers.insert(name.to_string(), FakeServer::Hangs);
        self
    }

    /// Delay every tool call
    pub fn with_call_delay(mut self, delay: Duration) -> Self {
        self.call_delay = Some(delay);
        self
    }

    /// Sessions shut down so far
    pub fn shutdowns(&self) -> usize {
        self.counters.shutdowns.load(Ordering::SeqCst)
    }

    /// Calls made so far, as "server/tool"
    pub fn calls(&self) -> Vec<String> {
        self.counters.calls.lock().clone()
    }

    /// Highest number of calls running at once, across all sessions
    pub fn max_in_flight(&self) -> usize {
        self.counters.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SessionConnector for FakeConnector {
    async fn connect(
        &self,
        provider: &str,
        _spec: &LaunchSpec,
    ) -> ProviderResult<Box<dyn ToolSession>> {
        match self.servers.get(provider).cloned() {
            Some(FakeServer::Tools(tools)) => Ok(Box::new(FakeSession {
                provider: provider.to_string(),
                tools,
                call_delay: self.call_delay,
                counters: Arc::clone(&self.counters),
            })),
            Some(FakeServer::Fails(message)) => Err(ProviderError::init_failed(provider, message)),
            Some(FakeServer::Hangs) => {
                tokio::time::sleep(Duration::from_secs(24 * 60 * 60)).await;
                Err(ProviderError::init_failed(provider, "handshake never completed"))
            }
            None => Err(ProviderError::init_failed(provider, "command not found")),
        }
    }
}

struct FakeSession {
    provider: String,
    tools: Vec<ToolDefinition>,
    call_delay: Option<Duration>,
    counters: Arc<Counters>,
}

#[async_trait]
impl ToolSession for FakeSession {
    async fn list_tools(&self) -> ProviderResult<Vec<ToolDefinition>> {
        Ok(self.tools.clone())
    }

    async fn call_tool(&self, name: &str, _arguments: Value) -> ProviderResult<CallOutcome> {
        if !self.tools.iter().any(|t| t.name == name) {
            return Err(ProviderError::protocol(
                &self.provider,
                format!("tool '{}' not found", name),
            ));
        }

        let now = self.counters.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.counters.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if let Some(delay) = self.call_delay {
            tokio::time::sleep(delay).await;
        }
        self.counters.in_flight.fetch_sub(1, Ordering::SeqCst);

        self.counters
            .calls
            .lock()
            .push(format!("{}/{}", self.provider, name));
        Ok(CallOutcome::ok(format!("{}/{} ok", self.provider, name)))
    }

    async fn shutdown(self: Box<Self>) -> ProviderResult<()> {
        self.counters.shutdowns.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
