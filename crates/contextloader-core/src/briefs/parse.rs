//! Parsing and fallback helpers for generated briefs

use serde::de::DeserializeOwned;

use super::error::BriefError;

/// Truncate to `max_chars` characters, appending "..." when shortened
pub fn truncate_brief(text: &str, max_chars: usize) -> String {
    let text = text.trim();
    if text.chars().count() > max_chars {
        let head: String = text.chars().take(max_chars).collect();
        format!("{}...", head)
    } else {
        text.to_string()
    }
}

/// Remove a surrounding Markdown code fence, if any
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string ("json") on the opening line.
    let body = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest,
    };
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

/// Parse a model reply as JSON, tolerating a code fence
pub fn parse_reply<T: DeserializeOwned>(text: &str) -> Result<T, BriefError> {
    let body = strip_code_fence(text);
    if body.is_empty() {
        return Err(BriefError::EmptyResponse);
    }
    Ok(serde_json::from_str(body)?)
}
