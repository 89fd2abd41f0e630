//! Infrastructure layer implementations.

pub mod metrics;
pub mod observability;

pub use metrics::{LATENCY_METRIC, REQUESTS_METRIC, ServerMetrics};
pub use observability::{build_registry, init_tracing, render};
