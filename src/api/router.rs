//! HTTP routing configuration.

use std::sync::Arc;

use axum::{Router, http::StatusCode, routing::get};
use tower::ServiceBuilder;
use tower_http::{
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::app::AppState;

use super::handlers::{health_handler, metrics_handler};
use super::middleware::MetricsLayer;

/// Create the application router.
///
/// Business routes are wrapped by [`MetricsLayer`] through the method
/// router's `route_layer`, so the `path` label is the matched route template
/// and neither unmatched paths (404) nor rejected methods (405) are
/// recorded. The metrics route itself is not instrumented.
pub fn create_router(app_state: Arc<AppState>) -> Router {
    let middleware = ServiceBuilder::new()
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            app_state.config.request_timeout,
        ));

    let instrumented_routes = Router::new().route(
        "/health",
        get(health_handler).route_layer(MetricsLayer::new(app_state.recorder())),
    );

    Router::new()
        .route(&app_state.config.metrics_path, get(metrics_handler))
        .merge(instrumented_routes)
        .layer(middleware)
        .with_state(app_state)
}
