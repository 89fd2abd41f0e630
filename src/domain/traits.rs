//! Domain traits defining contracts for metric sinks.

/// Sink for per-request metrics.
///
/// Implementations must be safe to call concurrently from every request task;
/// all synchronization stays inside the implementation.
pub trait RequestRecorder: Send + Sync {
    /// Increment the request counter for `(method, path, status)`.
    fn record_request(&self, method: &str, path: &str, status: u16);

    /// Record one latency observation, in seconds, for `(method, path)`.
    fn record_latency(&self, method: &str, path: &str, duration_seconds: f64);
}
