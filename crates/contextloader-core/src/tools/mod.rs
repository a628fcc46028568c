//! Tool management module
//!
//! ```text
//! LocalProvider ──┐                      ┌── Dispatcher (ActiveSet gate,
//!                 ├──► ToolRegistry ◄────┤    schema check, invoke)
//! RemoteProvider ─┘   name -> binding    └── LoaderController (catalogue)
//! ```
//!
//! A binding is either an in-process `LocalTool` or a proxy through the
//! owning `RemoteProvider`'s session; both run through `ToolBinding::invoke`.

mod binding;
mod error;
mod local;
mod registry;
mod schema;

pub use binding::{ToolBinding, ToolHandler};
pub use error::ToolError;
pub use local::{FnTool, LocalTool};
pub use registry::{ProviderScope, ToolFilter, ToolRegistry};
pub use schema::validate_arguments;
