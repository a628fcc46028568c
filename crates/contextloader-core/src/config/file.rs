//! File-based configuration provider (YAML)
//!
//! Supports user-level (~/.config/contextloader/config.yaml) and
//! workspace-level (.config/contextloader/config.yaml) config.

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use super::settings::LoaderSettings;
use super::traits::{ConfigError, ConfigProvider, ConfigResult};
use crate::types::{LaunchSpec, ModelConfig};

/// Configuration file structure
///
/// ```yaml
/// model:
///   model: openai/gpt-4o-mini
/// servers:
///   figma:
///     command: npx
///     args: ["-y", "figma-developer-mcp", "--stdio"]
///     env:
///       FIGMA_OAUTH_TOKEN: "${FIGMA_OAUTH_TOKEN}"
/// loader:
///   mode: partitioned
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ConfigFile {
    /// Completion model
    #[serde(default)]
    pub model: ModelConfig,

    /// Remote tool servers by name
    #[serde(default)]
    pub servers: BTreeMap<String, LaunchSpec>,

    /// Loader settings
    #[serde(default)]
    pub loader: LoaderSettings,
}

impl ConfigFile {
    /// Parse a YAML document
    pub fn from_yaml(content: &str) -> ConfigResult<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub(crate) fn insert_server(&mut self, name: &str, spec: LaunchSpec) -> ConfigResult<()> {
        if self.servers.contains_key(name) {
            return Err(ConfigError::ServerExists(name.to_string()));
        }
        self.servers.insert(name.to_string(), spec);
        Ok(())
    }

    pub(crate) fn replace_server(&mut self, name: &str, spec: LaunchSpec) -> ConfigResult<()> {
        match self.servers.get_mut(name) {
            Some(slot) => {
                *slot = spec;
                Ok(())
            }
            None => Err(ConfigError::ServerNotFound(name.to_string())),
        }
    }

    pub(crate) fn delete_server(&mut self, name: &str) -> ConfigResult<()> {
        self.servers
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| ConfigError::ServerNotFound(name.to_string()))
    }
}

/// Config level (user or workspace)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigLevel {
    /// User-level config (~/.config/contextloader/config.yaml)
    User,
    /// Workspace-level config (.config/contextloader/config.yaml in workspace root)
    Workspace,
}

impl ConfigLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigLevel::User => "user",
            ConfigLevel::Workspace => "workspace",
        }
    }
}

/// File-based configuration provider
///
/// Reads and writes configuration from YAML files. A missing file reads as
/// the default configuration; a malformed one is an error.
///
/// # Example
///
/// ```no_run
/// use contextloader_core::config::FileConfigProvider;
///
/// let user_config = FileConfigProvider::user();
/// let workspace_config = FileConfigProvider::workspace("/path/to/workspace");
/// ```
pub struct FileConfigProvider {
    path: PathBuf,
    level: ConfigLevel,
    cache: RwLock<Option<ConfigFile>>,
}

impl FileConfigProvider {
    /// Create a new file config provider for a specific path
    pub fn new(path: impl Into<PathBuf>, level: ConfigLevel) -> Self {
        Self {
            path: path.into(),
            level,
            cache: RwLock::new(None),
        }
    }

    /// Create a user-level config provider (~/.config/contextloader/config.yaml)
    pub fn user() -> Self {
        let config_dir = dirs::config_dir().unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config")
        });
        Self::new(
            config_dir.join("contextloader").join("config.yaml"),
            ConfigLevel::User,
        )
    }

    /// Create a workspace-level config provider (.config/contextloader/config.yaml)
    pub fn workspace(workspace_root: impl AsRef<Path>) -> Self {
        let path = workspace_root
            .as_ref()
            .join(".config")
            .join("contextloader")
            .join("config.yaml");
        Self::new(path, ConfigLevel::Workspace)
    }

    /// Get the config file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get the config level
    pub fn level(&self) -> ConfigLevel {
        self.level
    }

    /// Check if the config file exists
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    fn load(&self) -> ConfigResult<ConfigFile> {
        if !self.path.exists() {
            return Ok(ConfigFile::default());
        }
        let content = fs::read_to_string(&self.path)?;
        ConfigFile::from_yaml(&content)
    }

    fn save(&self, config: &ConfigFile) -> ConfigResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_yaml::to_string(config)?)?;
        *self.cache.write() = Some(config.clone());
        Ok(())
    }

    /// Cached config, loading it on first use
    pub fn config(&self) -> ConfigResult<ConfigFile> {
        if let Some(config) = self.cache.read().as_ref() {
            return Ok(config.clone());
        }
        self.reload()
    }

    /// Reload config from disk (invalidate cache)
    pub fn reload(&self) -> ConfigResult<ConfigFile> {
        let config = self.load()?;
        *self.cache.write() = Some(config.clone());
        Ok(config)
    }

    fn modify<F>(&self, f: F) -> ConfigResult<()>
    where
        F: FnOnce(&mut ConfigFile) -> ConfigResult<()>,
    {
        let mut config = self.config()?;
        f(&mut config)?;
        self.save(&config)
    }

    /// Create a backup of the current config file
    pub fn backup(&self) -> ConfigResult<Option<PathBuf>> {
        if !self.exists() {
            return Ok(None);
        }
        let backup_path = self.path.with_extension("yaml.backup");
        fs::copy(&self.path, &backup_path)?;
        Ok(Some(backup_path))
    }
}

impl std::fmt::Debug for FileConfigProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileConfigProvider")
            .field("path", &self.path)
            .field("level", &self.level)
            .field("exists", &self.exists())
            .finish()
    }
}

#[async_trait]
impl ConfigProvider for FileConfigProvider {
    async fn get_servers(&self) -> BTreeMap<String, LaunchSpec> {
        self.config().map(|c| c.servers).unwrap_or_default()
    }

    async fn get_model(&self) -> ModelConfig {
        self.config().map(|c| c.model).unwrap_or_default()
    }

    async fn get_loader_settings(&self) -> LoaderSettings {
        self.config().map(|c| c.loader).unwrap_or_default()
    }

    async fn update_server(&self, name: &str, spec: LaunchSpec) -> ConfigResult<()> {
        self.modify(|c| c.replace_server(name, spec))
    }

    async fn add_server(&self, name: &str, spec: LaunchSpec) -> ConfigResult<()> {
        self.modify(|c| c.insert_server(name, spec))
    }

    async fn remove_server(&self, name: &str) -> ConfigResult<()> {
        self.modify(|c| c.delete_server(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LoaderMode;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_file_config_provider() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        let provider = FileConfigProvider::new(&path, ConfigLevel::User);

        assert!(!provider.exists());
        assert!(provider.get_servers().await.is_empty());

        provider
            .add_server("figma", LaunchSpec::new("npx").with_args(["-y", "figma-developer-mcp"]))
            .await
            .unwrap();

        assert!(provider.exists());
        assert_eq!(provider.get_servers().await.len(), 1);

        provider.reload().unwrap();
        assert_eq!(provider.get_servers().await["figma"].command, "npx");

        assert!(matches!(
            provider.add_server("figma", LaunchSpec::new("docker")).await,
            Err(ConfigError::ServerExists(_))
        ));
        assert!(matches!(
            provider.update_server("github", LaunchSpec::new("docker")).await,
            Err(ConfigError::ServerNotFound(_))
        ));

        provider.remove_server("figma").await.unwrap();
        assert!(provider.get_servers().await.is_empty());
    }

    #[tokio::test]
    async fn test_reads_full_document() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(
            &path,
            r#"
model:
  model: anthropic/claude-3-5-haiku-latest
servers:
  github:
    command: docker
    args: ["run", "-i", "--rm", "ghcr.io/github/github-mcp-server"]
    env:
      GITHUB_PERSONAL_ACCESS_TOKEN: "${GITHUB_TOKEN}"
  figma:
    command: npx
    enabled: false
loader:
  mode: flat
  init_timeout_secs: 10
  hidden_tools: [run_shell_command]
"#,
        )
        .unwrap();

        let provider = FileConfigProvider::new(&path, ConfigLevel::Workspace);
        assert_eq!(provider.get_model().await.model, "anthropic/claude-3-5-haiku-latest");

        let settings = provider.get_loader_settings().await;
        assert_eq!(settings.mode, LoaderMode::Flat);
        assert_eq!(settings.init_timeout_secs, 10);
        assert_eq!(settings.hidden_tools, vec!["run_shell_command".to_string()]);

        let enabled = provider.enabled_servers().await;
        assert_eq!(enabled.len(), 1);
        assert_eq!(enabled[0].0, "github");
    }

    #[test]
    fn test_malformed_yaml_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "servers: [not, a, map").unwrap();

        let provider = FileConfigProvider::new(&path, ConfigLevel::User);
        assert!(matches!(provider.config(), Err(ConfigError::Yaml(_))));
    }

    #[test]
    fn test_backup() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        let provider = FileConfigProvider::new(&path, ConfigLevel::User);

        assert!(provider.backup().unwrap().is_none());

        fs::write(&path, "servers: {}").unwrap();

        let backup_path = provider.backup().unwrap().unwrap();
        assert!(backup_path.exists());
        assert!(backup_path.to_string_lossy().contains("backup"));
    }

    #[test]
    fn test_workspace_path() {
        let provider = FileConfigProvider::workspace("/tmp/project");
        assert!(provider.path().ends_with(".config/contextloader/config.yaml"));
        assert_eq!(provider.level().as_str(), "workspace");
    }
}
