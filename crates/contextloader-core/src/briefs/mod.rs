//! Catalogue briefs
//!
//! Short per-tool and per-provider text embedded in the loader's
//! description. Generation goes through the completion service and falls
//! back to truncated tool descriptions whenever that fails.

mod error;
mod generator;
mod parse;

pub use error::BriefError;
pub use generator::{BriefGenerator, BriefLimits, Briefs, ProviderSummary};
pub use parse::{strip_code_fence, truncate_brief};
