//! Model and server configuration types

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Configuration for the completion model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Model identifier, optionally provider-prefixed (e.g. "openai/gpt-4o-mini")
    pub model: String,
    /// API key for authentication (falls back to the provider's env var)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Custom API base URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
}

impl ModelConfig {
    /// Create a new model configuration
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            api_key: None,
            api_base: None,
        }
    }

    /// Set the API key
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the API base URL
    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = Some(base.into());
        self
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self::new("openai/gpt-4o-mini")
    }
}

/// How to launch a remote tool server as a subprocess
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaunchSpec {
    /// Executable to run
    pub command: String,
    /// Arguments, in order
    #[serde(default)]
    pub args: Vec<String>,
    /// Environment overrides for the child process
    #[serde(default)]
    pub env: BTreeMap<String, String>,
    /// Whether this server is started (default: true)
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl LaunchSpec {
    /// Create a launch spec for a command
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            args: vec![],
            env: BTreeMap::new(),
            enabled: true,
        }
    }

    /// Set the arguments
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Add an environment override
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Disable the server
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Resolve the environment overrides against a lookup function.
    ///
    /// A value of the exact form `${VAR}` is replaced by `lookup("VAR")`;
    /// keys whose variable is unset are returned in the second list.
    pub fn resolve_env<F>(&self, lookup: F) -> (Vec<(String, String)>, Vec<String>)
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut resolved = Vec::with_capacity(self.env.len());
        let mut missing = Vec::new();

        for (key, value) in &self.env {
            match value
                .strip_prefix("${")
                .and_then(|rest| rest.strip_suffix('}'))
            {
                Some(var) => match lookup(var) {
                    Some(v) => resolved.push((key.clone(), v)),
                    None => missing.push(key.clone()),
                },
                None => resolved.push((key.clone(), value.clone())),
            }
        }

        (resolved, missing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_config_builder() {
        let config = ModelConfig::new("openai/gpt-4o")
            .with_api_key("sk-test")
            .with_api_base("http://localhost:8080/v1/");

        assert_eq!(config.model, "openai/gpt-4o");
        assert_eq!(config.api_key, Some("sk-test".to_string()));
        assert_eq!(config.api_base.as_deref(), Some("http://localhost:8080/v1/"));
    }

    #[test]
    fn test_launch_spec_yaml() {
        let yaml = r#"
command: npx
args: ["-y", "figma-developer-mcp", "--stdio"]
env:
  FIGMA_OAUTH_TOKEN: "${FIGMA_OAUTH_TOKEN}"
"#;
        let spec: LaunchSpec = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(spec.command, "npx");
        assert_eq!(spec.args.len(), 3);
        assert!(spec.enabled);
    }

    #[test]
    fn test_resolve_env() {
        let spec = LaunchSpec::new("docker")
            .with_env("LITERAL", "value")
            .with_env("TOKEN", "${GITHUB_TOKEN}")
            .with_env("MISSING", "${NOT_SET_ANYWHERE}");

        let (resolved, missing) = spec.resolve_env(|var| {
            (var == "GITHUB_TOKEN").then(|| "ghp_secret".to_string())
        });

        assert!(resolved.contains(&("LITERAL".to_string(), "value".to_string())));
        assert!(resolved.contains(&("TOKEN".to_string(), "ghp_secret".to_string())));
        assert_eq!(missing, vec!["MISSING".to_string()]);
    }
}
