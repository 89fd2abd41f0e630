//! The API layer, containing web handlers, routing and the instrumentation
//! middleware.

pub mod handlers;
pub mod middleware;
pub mod router;

pub use middleware::{MetricsLayer, MetricsService};
pub use router::create_router;
