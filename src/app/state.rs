//! Application state management.
//!
//! This module provides the shared application state that is
//! accessible to all request handlers via Axum's State extractor.

use std::sync::Arc;

use prometheus::Registry;

use crate::domain::RequestRecorder;
use crate::infra::ServerMetrics;

use super::config::{HealthConfig, ServerConfig};

/// Shared application state for the Axum web server.
///
/// The registry and the metrics it scrapes are explicit dependencies, so
/// every test can build an isolated pair.
#[derive(Clone)]
pub struct AppState {
    /// Request counter and latency histogram.
    pub metrics: Arc<ServerMetrics>,

    /// Registry rendered by the metrics endpoint.
    pub registry: Arc<Registry>,

    /// Server configuration.
    pub config: ServerConfig,
}

impl AppState {
    /// Creates a new `AppState` from an already populated registry.
    #[must_use]
    pub fn new(metrics: Arc<ServerMetrics>, registry: Registry, config: ServerConfig) -> Self {
        Self {
            metrics,
            registry: Arc::new(registry),
            config,
        }
    }

    /// The metrics as the recorder seam used by the instrumentation layer.
    #[must_use]
    pub fn recorder(&self) -> Arc<dyn RequestRecorder> {
        Arc::clone(&self.metrics) as Arc<dyn RequestRecorder>
    }

    /// Settings of the sample health endpoint.
    #[must_use]
    pub fn health(&self) -> &HealthConfig {
        &self.config.health
    }
}
