//! Application layer containing configuration, shared state and the
//! process lifecycle.

pub mod config;
pub mod shutdown;
pub mod state;

pub use config::{HealthConfig, LogFormat, ServerConfig};
pub use shutdown::{ShutdownOutcome, serve_with_shutdown, shutdown_signal};
pub use state::AppState;
