//! Logging and metrics registry setup.
//!
//! The registry is built explicitly and handed to the application state;
//! nothing here installs a process-global recorder.

use std::sync::Arc;

use prometheus::{Encoder, Registry, TextEncoder};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::app::config::LogFormat;
use crate::domain::MetricsError;

use super::metrics::ServerMetrics;

/// Install the global tracing subscriber.
///
/// `RUST_LOG` overrides the default `info` filter.
pub fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_current_span(false))
            .init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

/// Build the registry scraped by the metrics endpoint.
///
/// Registers the request metrics and, on Linux, the process collector.
///
/// # Errors
/// Returns an error if a collector is registered twice or its descriptors
/// conflict with an already registered one.
pub fn build_registry(metrics: &Arc<ServerMetrics>) -> Result<Registry, MetricsError> {
    let registry = Registry::new();
    registry.register(Box::new(ServerMetrics::clone(metrics)))?;

    #[cfg(target_os = "linux")]
    registry.register(Box::new(
        prometheus::process_collector::ProcessCollector::for_self(),
    ))?;

    Ok(registry)
}

/// Encode every registered metric family in the text exposition format.
///
/// Returns the body together with its content type.
///
/// # Errors
/// Returns an error if a family cannot be encoded.
pub fn render(registry: &Registry) -> Result<(String, String), MetricsError> {
    let encoder = TextEncoder::new();
    let families = registry.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&families, &mut buffer)
        .map_err(|e| MetricsError::Encoding(e.to_string()))?;
    Ok((String::from_utf8(buffer)?, encoder.format_type().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RequestRecorder;

    #[test]
    fn test_build_registry_registers_request_metrics() {
        let metrics = Arc::new(ServerMetrics::new().unwrap());
        let registry = build_registry(&metrics).unwrap();

        metrics.record_request("GET", "/health", 200);

        let names: Vec<String> = registry
            .gather()
            .iter()
            .map(|f| f.get_name().to_string())
            .collect();
        assert!(names.contains(&"http_requests_total".to_string()));
    }

    #[test]
    fn test_duplicate_registration_is_rejected() {
        let metrics = Arc::new(ServerMetrics::new().unwrap());
        let registry = build_registry(&metrics).unwrap();

        let result = registry.register(Box::new(ServerMetrics::clone(&metrics)));

        assert!(matches!(result, Err(prometheus::Error::AlreadyReg)));
    }

    #[test]
    fn test_render_text_format() {
        let metrics = Arc::new(ServerMetrics::new().unwrap());
        let registry = build_registry(&metrics).unwrap();

        metrics.record_request("GET", "/health", 200);
        metrics.record_latency("GET", "/health", 0.02);

        let (body, content_type) = render(&registry).unwrap();
        assert!(content_type.starts_with("text/plain"));
        assert!(body.contains("# TYPE http_requests_total counter"));
        assert!(body.contains(r#"http_requests_total{code="200",method="GET",path="/health"} 1"#));
        assert!(body.contains("# TYPE http_request_latency_seconds histogram"));
        assert!(
            body.contains(r#"http_request_latency_seconds_count{method="GET",path="/health"} 1"#)
        );
    }

    #[test]
    fn test_render_empty_registry() {
        let registry = Registry::new();
        let (body, _) = render(&registry).unwrap();
        assert!(body.is_empty());
    }
}
