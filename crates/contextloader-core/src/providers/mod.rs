//! Capability providers
//!
//! A provider contributes tools to the registry. Local providers hold
//! in-process tools; remote providers reach a tool server over a session
//! opened by a `SessionConnector` (the MCP connector in production, the
//! in-memory `testing::FakeConnector` in tests).

mod error;
mod local;
mod manager;
mod remote;
mod session;
pub mod testing;

pub use error::{ProviderError, ProviderResult};
pub use local::LocalProvider;
pub use manager::{
    ProviderFailure, ReadyProvider, SessionManager, StartupReport, DEFAULT_INIT_TIMEOUT,
};
pub use remote::{ProviderState, RemoteProvider};
pub use session::{CallOutcome, SessionConnector, ToolSession};
