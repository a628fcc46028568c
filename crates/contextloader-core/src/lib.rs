//! ContextLoader Core
//!
//! A dynamic tool registry with progressive disclosure for LLM agents.
//! Only a single `loader` meta-tool is exposed at first; its description
//! carries compact briefs, and calling it moves full tool definitions into
//! the working set the model is offered on the next turn.
//!
//! ## Architecture
//!
//! - `providers`: local tools and remote MCP servers, each with its own
//!   session lifecycle and failure isolation
//! - `tools`: the registry every provider feeds, plus argument validation
//! - `briefs`: catalogue summaries from an external, fallible model call
//! - `loader`: the disclosure state machine and the `ActiveSet`
//! - `dispatch`: routes model tool calls to the loader or a binding
//! - `agent`: the conversation loop
//!
//! ```rust,ignore
//! use contextloader_core::*;
//!
//! let registry = Arc::new(ToolRegistry::new(logger.clone()));
//! let manager = SessionManager::new(Arc::new(McpConnector::new(logger.clone())), registry.clone(), logger.clone());
//! let report = manager.start_all(config.enabled_servers().await).await;
//!
//! let loader = Arc::new(LoaderController::new(LoaderMode::Partitioned, registry.clone(), briefs, logger.clone()));
//! loader.prepare().await;
//!
//! let dispatcher = Arc::new(Dispatcher::new(loader, registry, logger.clone()));
//! let answer = Conversation::new(model, dispatcher, logger).send("List my repositories").await?;
//! manager.close_all().await;
//! ```

pub mod types;
pub mod logging;
pub mod config;
pub mod completion;
pub mod tools;
pub mod providers;
pub mod mcp;
pub mod briefs;
pub mod loader;
pub mod dispatch;
pub mod agent;

// Re-export commonly used types
pub use types::{
    ChatMessage, ContentPart, MessageRole, MessageContent,
    ModelConfig, LaunchSpec,
    ToolDefinition, ToolCall, ToolResult,
};

pub use logging::{Logger, LogLevel, NoOpLogger, RecordingLogger, ConsoleLogger, TracingLogger};

pub use config::{
    ConfigProvider, ConfigError, ConfigResult,
    FileConfigProvider, MemoryConfigProvider, ConfigFile, ConfigLevel,
    LoaderMode, LoaderSettings,
};

pub use completion::{
    CompletionService, CompletionError, CompletionOptions, Completion,
    GenaiCompletion, MockCompletion,
};

pub use tools::{ToolBinding, ToolError, ToolFilter, ToolRegistry, LocalTool, FnTool};

pub use providers::{
    LocalProvider, RemoteProvider, ProviderState, ProviderError,
    SessionConnector, SessionManager, StartupReport,
};

pub use mcp::McpConnector;

pub use briefs::{BriefGenerator, BriefLimits};

pub use loader::{ActiveSet, ActivationReport, LoaderController, LoaderError, LOADER_TOOL_NAME};

pub use dispatch::{Dispatcher, DispatchError};

pub use agent::{AgentError, Conversation};
