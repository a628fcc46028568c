//! Loader tool definitions and their generated descriptions

use serde_json::json;

use super::state::{FlatCatalogue, LoaderState};
use crate::types::ToolDefinition;

/// Name the loader is exposed under
pub const LOADER_TOOL_NAME: &str = "loader";

/// Description for the flat catalogue
pub fn flat_description(catalogue: &FlatCatalogue) -> String {
    let available = catalogue
        .tools
        .iter()
        .filter_map(|t| catalogue.briefs.get(&t.name).map(|b| format!("- {}: {}", t.name, b)))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Dynamic Tool Loader for managing available tools. Provides brief descriptions of each \
tool and allows activating multiple tools by name.\n\n\
Available tools:\n{}\n\n\
Choosing tools will make them available in the model context for the next interaction.\n\n\
Usage: Provide a list of exact tool names you want to activate.",
        available
    )
}

/// Description for the per-server catalogue
pub fn partitioned_description(state: &LoaderState) -> String {
    let servers = state
        .servers
        .iter()
        .map(|(name, server)| {
            let mut entry = format!("'{}' MCP: {}", name, server.summary);
            if server.summaries_loaded {
                entry.push_str("\n Tools summaries loaded:");
                for tool in &server.tools {
                    if let Some(brief) = server.briefs.get(&tool.name) {
                        entry.push_str(&format!("\n  - {}: {}", tool.name, brief));
                    }
                }
            }
            entry
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "Dynamic Tool Loader for managing MCP tools. Provides descriptions and enables activation \
of multiple tools by name.\n\n{}\n\n\
Tools become available in the model context for the next interaction.\n\n\
Usage: Use 'load_tool_summaries' to load a server's tool summaries. Once loaded, use \
'load_tools' to activate specific tools. If interested in a server's tools, first load \
summaries, then activate needed ones.",
        servers
    )
}

/// Loader definition taking a flat list of names
pub fn flat_definition(description: String) -> ToolDefinition {
    ToolDefinition::new(LOADER_TOOL_NAME, description).with_parameters(json!({
        "type": "object",
        "properties": {
            "tool_names": {
                "type": "array",
                "items": { "type": "string" },
                "description": "List of tool names to activate and add to context."
            }
        },
        "required": ["tool_names"]
    }))
}

/// Loader definition with the two-step server actions
pub fn partitioned_definition(description: String) -> ToolDefinition {
    ToolDefinition::new(LOADER_TOOL_NAME, description).with_parameters(json!({
        "type": "object",
        "properties": {
            "action": {
                "type": "string",
                "enum": ["load_tool_summaries", "load_tools"],
                "description": "Action to perform: load_tool_summaries or load_tools."
            },
            "servers": {
                "type": "array",
                "items": { "type": "string" },
                "description": "List of MCP server names to load (for load_tool_summaries)."
            },
            "tools": {
                "type": "array",
                "items": { "type": "string" },
                "description": "List of tool names to activate (for load_tools)."
            },
            "server": {
                "type": "string",
                "description": "MCP server name for the tools (for load_tools)."
            }
        },
        "required": ["action"]
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::briefs::ProviderSummary;
    use crate::loader::state::ServerDisclosure;

    #[test]
    fn test_flat_description_lists_briefs() {
        let mut catalogue = FlatCatalogue::default();
        catalogue.tools.push(ToolDefinition::new("calculator", "long description"));
        catalogue.briefs.insert("calculator".into(), "Does math.".into());

        let text = flat_description(&catalogue);
        assert!(text.contains("Available tools:\n- calculator: Does math.\n\n"));
        assert!(text.ends_with("Provide a list of exact tool names you want to activate."));
    }

    #[test]
    fn test_partitioned_description_grows_after_load() {
        let mut state = LoaderState::default();
        let mut summary = ProviderSummary {
            summary: "Reads Figma files.".into(),
            ..Default::default()
        };
        summary.briefs.insert("get_figma_data".into(), "Fetch a design.".into());
        state.servers.insert(
            "figma".into(),
            ServerDisclosure::new(vec![ToolDefinition::new("get_figma_data", "")], summary),
        );

        let before = partitioned_description(&state);
        assert!(before.contains("'figma' MCP: Reads Figma files."));
        assert!(!before.contains("get_figma_data"));

        state.servers.get_mut("figma").unwrap().summaries_loaded = true;
        let after = partitioned_description(&state);
        assert!(after.contains("\n Tools summaries loaded:\n  - get_figma_data: Fetch a design."));
    }

    #[test]
    fn test_definitions_schema() {
        assert_eq!(flat_definition(String::new()).required(), vec!["tool_names"]);
        let partitioned = partitioned_definition(String::new());
        assert_eq!(partitioned.name, LOADER_TOOL_NAME);
        assert_eq!(partitioned.required(), vec!["action"]);
        assert_eq!(partitioned.property_names().len(), 4);
    }
}
