//! Loader settings

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How the loader exposes the catalogue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoaderMode {
    /// One `activate(tool_names)` action over every registered tool
    Flat,
    /// Per-server summaries first, then `load_tools(server, tools)`
    #[default]
    Partitioned,
}

impl LoaderMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoaderMode::Flat => "flat",
            LoaderMode::Partitioned => "partitioned",
        }
    }
}

impl std::str::FromStr for LoaderMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "flat" => Ok(LoaderMode::Flat),
            "partitioned" => Ok(LoaderMode::Partitioned),
            other => Err(format!("unknown loader mode: {}", other)),
        }
    }
}

/// Tunables for the loader, the brief generator and the conversation loop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderSettings {
    pub mode: LoaderMode,
    /// Per-server initialization bound
    pub init_timeout_secs: u64,
    /// Budget for one tool brief
    pub brief_max_chars: usize,
    /// Budget for one server summary
    pub summary_max_chars: usize,
    /// Model round trips allowed per prompt
    pub max_turns: usize,
    /// Tools left out of the flat catalogue
    pub hidden_tools: Vec<String>,
}

impl Default for LoaderSettings {
    fn default() -> Self {
        Self {
            mode: LoaderMode::Partitioned,
            init_timeout_secs: 30,
            brief_max_chars: 100,
            summary_max_chars: 200,
            max_turns: 20,
            hidden_tools: Vec::new(),
        }
    }
}

impl LoaderSettings {
    pub fn init_timeout(&self) -> Duration {
        Duration::from_secs(self.init_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let settings: LoaderSettings = serde_yaml::from_str("mode: flat\nmax_turns: 5\n").unwrap();
        assert_eq!(settings.mode, LoaderMode::Flat);
        assert_eq!(settings.max_turns, 5);
        assert_eq!(settings.init_timeout_secs, 30);
        assert_eq!(settings.brief_max_chars, 100);
    }

    #[test]
    fn test_mode_from_str() {
        assert_eq!("FLAT".parse::<LoaderMode>(), Ok(LoaderMode::Flat));
        assert!("tree".parse::<LoaderMode>().is_err());
    }
}
