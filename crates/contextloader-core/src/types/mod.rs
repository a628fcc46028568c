//! Core types shared across the registry, loader and completion service
//!
//! This module contains the tool and chat message types used everywhere else.

mod message;
mod model;
mod tool;

pub use message::{ChatMessage, ContentPart, MessageRole, MessageContent};
pub use model::{ModelConfig, LaunchSpec};
pub use tool::{ToolDefinition, ToolCall, ToolResult};
