//! Completion services
//!
//! The conversation loop and the brief generator talk to the model through
//! the `CompletionService` trait.
//!
//! ## Architecture
//!
//! `GenaiCompletion` uses the `genai` crate, which handles:
//! - Provider-specific protocols (OpenAI, Anthropic, Gemini, etc.)
//! - Tool calling
//! - Auth via each provider's env var unless an explicit key is configured
//!
//! OpenAI-compatible services (OpenRouter, Mistral) are routed through genai's
//! `ServiceTargetResolver`.
//!
//! `MockCompletion` is kept for testing.

mod error;
mod genai_adapter;
mod genai_service;
mod mock;
mod traits;

pub use error::{CompletionError, CompletionResult};
pub use traits::{Completion, CompletionOptions, CompletionService};

pub use genai_adapter::{adapter_for_provider, split_model};
pub use genai_service::GenaiCompletion;

pub use mock::{MockCompletion, MockMode, RecordedRequest};
