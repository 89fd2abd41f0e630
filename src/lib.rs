//! Instrumented HTTP
//!
//! Request metrics for HTTP handlers: a Prometheus request counter and
//! latency histogram recorded by a `tower` middleware, a pull-based metrics
//! endpoint, and signal-driven graceful shutdown.
//!
//! # Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                   API Layer                  │
//! │   Router, handlers, MetricsLayer middleware  │
//! ├─────────────────────────────────────────────┤
//! │               Application Layer              │
//! │   Configuration, shared state, shutdown      │
//! ├─────────────────────────────────────────────┤
//! │                 Domain Layer                 │
//! │   RequestRecorder trait, types, errors       │
//! ├─────────────────────────────────────────────┤
//! │             Infrastructure Layer             │
//! │   ServerMetrics, registry, tracing setup     │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Metrics
//!
//! | name | type | labels |
//! |---|---|---|
//! | `http_requests_total` | counter | `method`, `path`, `code` |
//! | `http_request_latency_seconds` | histogram | `method`, `path` |
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use instrumented_http::api::MetricsLayer;
//! use instrumented_http::infra::{ServerMetrics, build_registry};
//!
//! let metrics = Arc::new(ServerMetrics::new()?);
//! let registry = build_registry(&metrics)?;
//!
//! let router = Router::new().route(
//!     "/orders/{id}",
//!     get(get_order).route_layer(MetricsLayer::new(metrics.clone())),
//! );
//! ```

pub mod api;
pub mod app;
pub mod domain;
pub mod infra;

// Test utilities are available in tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
