//! Configuration provider trait

use async_trait::async_trait;
use std::collections::BTreeMap;

use super::settings::LoaderSettings;
use crate::types::{LaunchSpec, ModelConfig};

/// Configuration provider abstraction
///
/// Implementations:
/// - `MemoryConfigProvider`: In-memory for testing
/// - `FileConfigProvider`: Reads from YAML file (~/.config/contextloader/config.yaml)
#[async_trait]
pub trait ConfigProvider: Send + Sync {
    /// Get every configured server, keyed by name
    async fn get_servers(&self) -> BTreeMap<String, LaunchSpec>;

    /// Get the completion model settings
    async fn get_model(&self) -> ModelConfig;

    /// Get the loader settings
    async fn get_loader_settings(&self) -> LoaderSettings;

    /// Replace a server's launch spec
    async fn update_server(&self, name: &str, spec: LaunchSpec) -> Result<(), ConfigError>;

    /// Add a new server
    async fn add_server(&self, name: &str, spec: LaunchSpec) -> Result<(), ConfigError>;

    /// Remove a server
    async fn remove_server(&self, name: &str) -> Result<(), ConfigError>;

    /// Servers that are enabled, in name order
    async fn enabled_servers(&self) -> Vec<(String, LaunchSpec)> {
        self.get_servers()
            .await
            .into_iter()
            .filter(|(_, spec)| spec.enabled)
            .collect()
    }
}

/// Errors that can occur during configuration operations
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Server not found: {0}")]
    ServerNotFound(String),

    #[error("Server already exists: {0}")]
    ServerExists(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Other(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;
