//! Mock implementations for testing.
//!
//! These mocks provide in-memory implementations of domain traits
//! that record every call for later assertions.

use std::sync::Mutex;

use crate::domain::RequestRecorder;

/// A single call made against [`MockRecorder`].
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCall {
    Request {
        method: String,
        path: String,
        status: u16,
    },
    Latency {
        method: String,
        path: String,
        seconds: f64,
    },
}

/// Recorder that keeps every call in call order.
///
/// # Example
///
/// ```ignore
/// let recorder = Arc::new(MockRecorder::new());
/// let layer = MetricsLayer::new(recorder.clone());
/// // ... drive a request through the layer ...
/// assert_eq!(recorder.request_count("GET", "/health", 200), 1);
/// ```
#[derive(Debug, Default)]
pub struct MockRecorder {
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockRecorder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All calls in the order they were made.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of `record_request` calls with exactly these labels.
    pub fn request_count(&self, method: &str, path: &str, status: u16) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| {
                matches!(call, RecordedCall::Request { method: m, path: p, status: s }
                    if m == method && p == path && *s == status)
            })
            .count()
    }

    /// Number of `record_request` calls regardless of labels.
    pub fn total_requests(&self) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| matches!(call, RecordedCall::Request { .. }))
            .count()
    }

    /// Latency observations recorded for `(method, path)`, in call order.
    pub fn latencies(&self, method: &str, path: &str) -> Vec<f64> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter_map(|call| match call {
                RecordedCall::Latency {
                    method: m,
                    path: p,
                    seconds,
                } if m == method && p == path => Some(*seconds),
                _ => None,
            })
            .collect()
    }

    pub fn latency_count(&self, method: &str, path: &str) -> usize {
        self.latencies(method, path).len()
    }
}

impl RequestRecorder for MockRecorder {
    fn record_request(&self, method: &str, path: &str, status: u16) {
        self.calls.lock().unwrap().push(RecordedCall::Request {
            method: method.to_string(),
            path: path.to_string(),
            status,
        });
    }

    fn record_latency(&self, method: &str, path: &str, duration_seconds: f64) {
        self.calls.lock().unwrap().push(RecordedCall::Latency {
            method: method.to_string(),
            path: path.to_string(),
            seconds: duration_seconds,
        });
    }
}
