//! Argument validation against a tool's parameter schema

use serde_json::Value;

use super::error::ToolError;
use crate::types::ToolDefinition;

/// Check `arguments` against the tool's JSON schema.
///
/// Every violation is reported in one message. A schema that does not
/// compile is treated as permissive and `Ok` is returned, since the server
/// is the final judge of its own arguments.
pub fn validate_arguments(definition: &ToolDefinition, arguments: &Value) -> Result<(), ToolError> {
    let validator = match jsonschema::validator_for(&definition.parameters) {
        Ok(v) => v,
        Err(_) => return Ok(()),
    };

    let errors: Vec<String> = validator
        .iter_errors(arguments)
        .map(|e| {
            let path = e.instance_path.to_string();
            if path.is_empty() {
                e.to_string()
            } else {
                format!("{}: {}", path, e)
            }
        })
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ToolError::InvalidArguments(errors.join("; ")))
    }
}
