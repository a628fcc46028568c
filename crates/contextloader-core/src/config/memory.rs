//! In-memory configuration provider

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::BTreeMap;

use super::file::ConfigFile;
use super::settings::LoaderSettings;
use super::traits::{ConfigError, ConfigProvider};
use crate::types::{LaunchSpec, ModelConfig};

/// In-memory configuration provider for testing
#[derive(Debug, Default)]
pub struct MemoryConfigProvider {
    config: RwLock<ConfigFile>,
}

impl MemoryConfigProvider {
    /// Create a new empty memory config provider
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a memory config provider from a full config
    pub fn with_config(config: ConfigFile) -> Self {
        Self {
            config: RwLock::new(config),
        }
    }

    /// Replace the loader settings
    pub fn set_loader_settings(&self, settings: LoaderSettings) {
        self.config.write().loader = settings;
    }

    /// Clear all servers
    pub fn clear(&self) {
        self.config.write().servers.clear();
    }
}

#[async_trait]
impl ConfigProvider for MemoryConfigProvider {
    async fn get_servers(&self) -> BTreeMap<String, LaunchSpec> {
        self.config.read().servers.clone()
    }

    async fn get_model(&self) -> ModelConfig {
        self.config.read().model.clone()
    }

    async fn get_loader_settings(&self) -> LoaderSettings {
        self.config.read().loader.clone()
    }

    async fn update_server(&self, name: &str, spec: LaunchSpec) -> Result<(), ConfigError> {
        self.config.write().replace_server(name, spec)
    }

    async fn add_server(&self, name: &str, spec: LaunchSpec) -> Result<(), ConfigError> {
        self.config.write().insert_server(name, spec)
    }

    async fn remove_server(&self, name: &str) -> Result<(), ConfigError> {
        self.config.write().delete_server(name)
    }
}
