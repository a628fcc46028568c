//! Progressive disclosure
//!
//! The loader is a single meta-tool. Its description carries compact
//! catalogue text; calling it moves full tool definitions into the
//! `ActiveSet` that is sent with every model request.

mod active_set;
mod controller;
mod description;
mod error;
mod report;
mod state;

pub use active_set::ActiveSet;
pub use controller::{LoaderController, LoaderRequest};
pub use description::{flat_description, partitioned_description, LOADER_TOOL_NAME};
pub use error::LoaderError;
pub use report::ActivationReport;
pub use state::{FlatCatalogue, LoaderState, ServerDisclosure};
