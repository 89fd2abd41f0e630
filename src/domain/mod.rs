//! Domain layer containing core types, traits, and error definitions.

pub mod error;
pub mod traits;
pub mod types;

pub use error::{AppError, ConfigError, MetricsError};
pub use traits::RequestRecorder;
pub use types::{
    ErrorDetail, ErrorResponse, HealthResponse, HealthStatus, LatencySnapshot, RequestLabels,
};
