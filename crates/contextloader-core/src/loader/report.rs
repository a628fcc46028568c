//! Aggregated outcome of an activation request

use serde::Serialize;
use std::fmt;

/// What happened to each requested tool name
///
/// Partial failure is normal: unknown names land in `failed`, names that
/// were already exposed land in `duplicates`, and neither is an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ActivationReport {
    /// Server the tools were loaded from (partitioned mode)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server: Option<String>,
    pub activated: Vec<String>,
    pub failed: Vec<String>,
    pub duplicates: Vec<String>,
}

impl ActivationReport {
    pub fn for_server(server: impl Into<String>) -> Self {
        Self {
            server: Some(server.into()),
            ..Self::default()
        }
    }

    /// True when every requested name was activated
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty() && self.duplicates.is_empty()
    }

    fn errors(&self) -> String {
        self.duplicates
            .iter()
            .map(|d| format!("{} already loaded.", d))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for ActivationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.server {
            None => {
                if self.activated.is_empty() {
                    write!(f, "No tools activated.")?;
                } else {
                    write!(f, "Activated tools: {}.", self.activated.join(", "))?;
                }
                if !self.failed.is_empty() {
                    write!(f, " Failed to activate: {}.", self.failed.join(", "))?;
                }
                write!(f, " They are now available for use in the next message.")?;
            }
            Some(server) => {
                if self.activated.is_empty() {
                    write!(f, "No tools activated from {}.", server)?;
                } else {
                    write!(
                        f,
                        "Activated tools from {}: {}.",
                        server,
                        self.activated.join(", ")
                    )?;
                }
                if !self.failed.is_empty() {
                    write!(f, " Failed: {}.", self.failed.join(", "))?;
                }
            }
        }
        if !self.duplicates.is_empty() {
            write!(f, " Errors: {}", self.errors())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_text() {
        let report = ActivationReport {
            activated: vec!["calculator".into()],
            failed: vec!["bogus".into()],
            ..Default::default()
        };
        assert_eq!(
            report.to_string(),
            "Activated tools: calculator. Failed to activate: bogus. \
They are now available for use in the next message."
        );
    }

    #[test]
    fn test_partitioned_text_with_duplicates() {
        let mut report = ActivationReport::for_server("github");
        report.duplicates.push("search_code".into());
        assert_eq!(
            report.to_string(),
            "No tools activated from github. Errors: search_code already loaded."
        );
        assert!(!report.is_clean());
    }

    #[test]
    fn test_serializes_structured() {
        let mut report = ActivationReport::default();
        report.activated.push("a".into());
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["activated"][0], "a");
        assert!(json.get("server").is_none());
    }
}
