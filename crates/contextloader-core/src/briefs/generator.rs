//! Brief generator backed by the completion service

use serde::Deserialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use super::error::BriefError;
use super::parse::{parse_reply, truncate_brief};
use crate::completion::{CompletionOptions, CompletionService};
use crate::logging::Logger;
use crate::types::{ChatMessage, ToolDefinition};
use crate::{log_debug, log_warn};

/// Tool name -> brief text
pub type Briefs = BTreeMap<String, String>;

/// Character budgets for generated text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BriefLimits {
    pub brief_max_chars: usize,
    pub summary_max_chars: usize,
}

impl Default for BriefLimits {
    fn default() -> Self {
        Self {
            brief_max_chars: 100,
            summary_max_chars: 200,
        }
    }
}

/// Summary of one provider's catalogue
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProviderSummary {
    pub summary: String,
    pub briefs: Briefs,
}

#[derive(Deserialize)]
struct SummaryReply {
    #[serde(default)]
    server_summary: String,
    #[serde(default)]
    tool_briefs: HashMap<String, Value>,
}

/// Produces short catalogue text for the loader's description
///
/// Every requested name always gets an entry: whatever the service leaves
/// out (or the whole reply, if the call fails) falls back to the tool's own
/// description cut to the brief budget.
pub struct BriefGenerator {
    service: Arc<dyn CompletionService>,
    limits: BriefLimits,
    logger: Arc<dyn Logger>,
}

impl BriefGenerator {
    pub fn new(service: Arc<dyn CompletionService>, logger: Arc<dyn Logger>) -> Self {
        Self {
            service,
            limits: BriefLimits::default(),
            logger,
        }
    }

    pub fn with_limits(mut self, limits: BriefLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn limits(&self) -> BriefLimits {
        self.limits
    }

    /// Briefs for the given tools
    pub async fn brief(&self, tools: &[ToolDefinition]) -> Briefs {
        if tools.is_empty() {
            return Briefs::new();
        }

        let generated = match self.request_briefs(tools).await {
            Ok(map) => map,
            Err(e) => {
                log_warn!(
                    self.logger,
                    "[BriefGenerator] Falling back to truncated descriptions for {} tools: {}",
                    tools.len(),
                    e
                );
                HashMap::new()
            }
        };

        self.complete_briefs(tools, generated)
    }

    /// Summary and briefs for one provider's tools
    pub async fn provider_summary(&self, provider: &str, tools: &[ToolDefinition]) -> ProviderSummary {
        if tools.is_empty() {
            return ProviderSummary::default();
        }

        let reply = match self.request_summary(provider, tools).await {
            Ok(reply) => Some(reply),
            Err(e) => {
                log_warn!(
                    self.logger,
                    "[BriefGenerator] Falling back to default summary for '{}': {}",
                    provider,
                    e
                );
                None
            }
        };

        let (summary, generated) = match reply {
            Some(r) => (r.server_summary, r.tool_briefs),
            None => (String::new(), HashMap::new()),
        };

        let summary = if summary.trim().is_empty() {
            Self::fallback_summary(provider)
        } else {
            truncate_brief(&summary, self.limits.summary_max_chars)
        };

        ProviderSummary {
            summary,
            briefs: self.complete_briefs(tools, generated),
        }
    }

    /// Summary used when the service gives none
    pub fn fallback_summary(provider: &str) -> String {
        format!("{} MCP server provides various tools for specific tasks.", provider)
    }

    fn complete_briefs(&self, tools: &[ToolDefinition], mut generated: HashMap<String, Value>) -> Briefs {
        let max = self.limits.brief_max_chars;
        tools
            .iter()
            .map(|tool| {
                let text = generated
                    .remove(&tool.name)
                    .and_then(|v| v.as_str().map(str::to_string))
                    .filter(|s| !s.trim().is_empty())
                    .unwrap_or_else(|| tool.description.clone());
                (tool.name.clone(), truncate_brief(&text, max))
            })
            .collect()
    }

    async fn ask(&self, prompt: String) -> Result<String, BriefError> {
        let completion = self
            .service
            .complete(vec![ChatMessage::user(prompt)], CompletionOptions::new())
            .await?;
        completion.text.ok_or(BriefError::EmptyResponse)
    }

    async fn request_briefs(&self, tools: &[ToolDefinition]) -> Result<HashMap<String, Value>, BriefError> {
        let prompt = format!(
            "You are a helpful assistant that generates concise, accurate briefs for tools \
based on their full definitions.\n\n\
Below is a list of tool definitions in JSON format:\n\n{}\n\n\
Please generate a brief description for each tool. Each brief should be:\n\
- Concise (1-2 sentences, under {} characters)\n\
- Accurate to the tool's purpose\n\
- Helpful for users to understand what the tool does\n\n\
Return a JSON object where keys are tool names and values are the brief descriptions.\n\n\
Example output:\n{{\n  \"tool1\": \"Brief description here.\",\n  \"tool2\": \"Another brief description.\"\n}}\n\n\
Generate the briefs now:",
            serde_json::to_string_pretty(tools)?,
            self.limits.brief_max_chars
        );

        let text = self.ask(prompt).await?;
        let parsed: HashMap<String, Value> = parse_reply(&text)?;
        log_debug!(
            self.logger,
            "[BriefGenerator] Service returned {} briefs for {} tools",
            parsed.len(),
            tools.len()
        );
        Ok(parsed)
    }

    async fn request_summary(&self, provider: &str, tools: &[ToolDefinition]) -> Result<SummaryReply, BriefError> {
        let prompt = format!(
            "You are a helpful assistant that generates concise summaries for MCP servers and their tools.\n\n\
Below is a list of tool definitions for the {provider} MCP server:\n\n{tools}\n\n\
Please provide:\n\
1. A 1-2 sentence summary of what the server's tools can do overall (under {summary} characters).\n\
2. Brief descriptions for each tool (1-2 sentences, under {brief} characters each).\n\n\
Return a JSON object:\n{{\n  \"server_summary\": \"Overall summary here.\",\n  \"tool_briefs\": {{\n    \"tool1\": \"Brief description.\",\n    \"tool2\": \"Another brief.\"\n  }}\n}}\n\n\
Generate now:",
            provider = provider,
            tools = serde_json::to_string_pretty(tools)?,
            summary = self.limits.summary_max_chars,
            brief = self.limits.brief_max_chars,
        );

        let text = self.ask(prompt).await?;
        parse_reply(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::{Completion, MockCompletion};
    use crate::logging::NoOpLogger;

    fn generator(mock: MockCompletion) -> BriefGenerator {
        BriefGenerator::new(Arc::new(mock), Arc::new(NoOpLogger::new()))
    }

    fn tools() -> Vec<ToolDefinition> {
        vec![
            ToolDefinition::new("calculator", "Evaluate a basic arithmetic expression."),
            ToolDefinition::new("get_weather", "w".repeat(150)),
        ]
    }

    #[tokio::test]
    async fn test_service_briefs_used() {
        let mock = MockCompletion::fixed(
            "```json\n{\"calculator\": \"Does arithmetic.\", \"get_weather\": \"Weather lookup.\", \"invented\": \"x\"}\n```",
        );
        let briefs = generator(mock).brief(&tools()).await;

        assert_eq!(briefs.len(), 2);
        assert_eq!(briefs["calculator"], "Does arithmetic.");
        assert_eq!(briefs["get_weather"], "Weather lookup.");
        assert!(!briefs.contains_key("invented"));
    }

    #[tokio::test]
    async fn test_every_name_covered_when_service_fails() {
        let briefs = generator(MockCompletion::error("service down")).brief(&tools()).await;

        assert_eq!(briefs.len(), 2);
        assert_eq!(briefs["calculator"], "Evaluate a basic arithmetic expression.");
        assert_eq!(briefs["get_weather"], format!("{}...", "w".repeat(100)));
    }

    #[tokio::test]
    async fn test_partial_reply_fills_gaps() {
        let mock = MockCompletion::fixed("{\"calculator\": \"Math.\"}");
        let briefs = generator(mock).brief(&tools()).await;
        assert_eq!(briefs["calculator"], "Math.");
        assert!(briefs["get_weather"].ends_with("..."));
    }

    #[tokio::test]
    async fn test_unparsable_reply_falls_back() {
        let briefs = generator(MockCompletion::fixed("I cannot do that.")).brief(&tools()).await;
        assert_eq!(briefs.len(), 2);
    }

    #[tokio::test]
    async fn test_empty_input_skips_service() {
        let mock = Arc::new(MockCompletion::fixed("{}"));
        let generator = BriefGenerator::new(mock.clone(), Arc::new(NoOpLogger::new()));
        assert!(generator.brief(&[]).await.is_empty());
        assert_eq!(
            generator.provider_summary("figma", &[]).await,
            ProviderSummary::default()
        );
        assert_eq!(mock.request_count(), 0);
    }

    #[tokio::test]
    async fn test_provider_summary() {
        let mock = MockCompletion::scripted([Completion::text(
            r#"{"server_summary": "Reads Figma designs.", "tool_briefs": {"calculator": "Math."}}"#,
        )]);
        let summary = generator(mock).provider_summary("figma", &tools()).await;
        assert_eq!(summary.summary, "Reads Figma designs.");
        assert_eq!(summary.briefs["calculator"], "Math.");
        assert!(summary.briefs.contains_key("get_weather"));
    }

    #[tokio::test]
    async fn test_provider_summary_fallback() {
        let summary = generator(MockCompletion::error("boom"))
            .provider_summary("github", &tools())
            .await;
        assert_eq!(
            summary.summary,
            "github MCP server provides various tools for specific tasks."
        );
        assert_eq!(summary.briefs.len(), 2);
    }
}
