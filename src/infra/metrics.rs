//! Prometheus-backed request metrics.
//!
//! [`ServerMetrics`] owns the request counter and the latency histogram and
//! implements [`Collector`], so it is registered into an explicitly
//! constructed [`prometheus::Registry`] rather than a process-global one.

use prometheus::core::{Collector, Desc};
use prometheus::proto::{Metric, MetricFamily};
use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, Opts};
use tracing::warn;

use crate::domain::{LatencySnapshot, MetricsError, RequestRecorder};

pub const REQUESTS_METRIC: &str = "http_requests_total";
pub const LATENCY_METRIC: &str = "http_request_latency_seconds";

const REQUEST_LABELS: [&str; 3] = ["method", "path", "code"];
const LATENCY_LABELS: [&str; 2] = ["method", "path"];

/// Request counter and latency histogram for instrumented handlers.
///
/// Cloning is cheap and every clone shares the same underlying cells, so
/// one clone can be boxed into a registry while another records.
#[derive(Clone)]
pub struct ServerMetrics {
    requests: IntCounterVec,
    latency: HistogramVec,
}

impl ServerMetrics {
    /// Create the metric vectors with the default Prometheus buckets.
    ///
    /// # Errors
    /// Returns an error if a metric name or label set is invalid.
    pub fn new() -> Result<Self, MetricsError> {
        let requests = IntCounterVec::new(
            Opts::new(REQUESTS_METRIC, "Total number of HTTP requests."),
            &REQUEST_LABELS,
        )?;
        let latency = HistogramVec::new(
            HistogramOpts::new(
                LATENCY_METRIC,
                "Histogram of response latency of HTTP requests that had been application-level handled by the server.",
            ),
            &LATENCY_LABELS,
        )?;

        Ok(Self { requests, latency })
    }

    /// Current value of the counter cell, 0 if it was never created.
    pub fn request_count(&self, method: &str, path: &str, status: u16) -> u64 {
        let code = status.to_string();
        self.requests
            .collect()
            .iter()
            .flat_map(|family| family.get_metric())
            .find(|metric| {
                has_labels(
                    metric,
                    &[("method", method), ("path", path), ("code", code.as_str())],
                )
            })
            .map_or(0, |metric| metric.get_counter().get_value() as u64)
    }

    /// Observation count and sum of the histogram cell, if it exists.
    pub fn latency_snapshot(&self, method: &str, path: &str) -> Option<LatencySnapshot> {
        self.latency
            .collect()
            .iter()
            .flat_map(|family| family.get_metric())
            .find(|metric| has_labels(metric, &[("method", method), ("path", path)]))
            .map(|metric| {
                let histogram = metric.get_histogram();
                LatencySnapshot {
                    count: histogram.get_sample_count(),
                    sum: histogram.get_sample_sum(),
                }
            })
    }
}

impl RequestRecorder for ServerMetrics {
    fn record_request(&self, method: &str, path: &str, status: u16) {
        let code = status.to_string();
        self.requests
            .with_label_values(&[method, path, code.as_str()])
            .inc();
    }

    fn record_latency(&self, method: &str, path: &str, duration_seconds: f64) {
        let seconds = if duration_seconds.is_finite() && duration_seconds >= 0.0 {
            duration_seconds
        } else {
            warn!(method, path, duration_seconds, "Clamping invalid latency observation to zero");
            0.0
        };
        self.latency
            .with_label_values(&[method, path])
            .observe(seconds);
    }
}

impl Collector for ServerMetrics {
    fn desc(&self) -> Vec<&Desc> {
        let mut descs = self.requests.desc();
        descs.extend(self.latency.desc());
        descs
    }

    fn collect(&self) -> Vec<MetricFamily> {
        let mut families = self.requests.collect();
        families.extend(self.latency.collect());
        families
    }
}

fn has_labels(metric: &Metric, expected: &[(&str, &str)]) -> bool {
    let labels = metric.get_label();
    labels.len() == expected.len()
        && expected.iter().all(|(name, value)| {
            labels
                .iter()
                .any(|pair| pair.get_name() == *name && pair.get_value() == *value)
        })
}
