//! Request instrumentation middleware.
//!
//! [`MetricsLayer`] wraps any `tower::Service` that answers `http` requests
//! and records, per request, one latency observation and one request count
//! labelled by method, route and status code.
//!
//! Outcomes of the wrapped service:
//!
//! - response: latency, then the counter with the response status;
//! - panic: latency, then the counter with `500`, then the panic resumes;
//! - service error: latency only, the error is returned unchanged;
//! - future dropped before completion: latency only (recorded on drop).

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Instant;

use axum::extract::MatchedPath;
use axum::http::{Request, Response, StatusCode};
use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use tower::{Layer, Service};
use tracing::{debug, error};

use crate::domain::{RequestLabels, RequestRecorder};

/// Layer producing [`MetricsService`].
#[derive(Clone)]
pub struct MetricsLayer {
    recorder: Arc<dyn RequestRecorder>,
}

impl MetricsLayer {
    pub fn new(recorder: Arc<dyn RequestRecorder>) -> Self {
        Self { recorder }
    }
}

impl<S> Layer<S> for MetricsLayer {
    type Service = MetricsService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MetricsService {
            inner,
            recorder: Arc::clone(&self.recorder),
        }
    }
}

/// Service that records request metrics around an inner service.
#[derive(Clone)]
pub struct MetricsService<S> {
    inner: S,
    recorder: Arc<dyn RequestRecorder>,
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for MetricsService<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    S::Error: 'static,
    ReqBody: Send + 'static,
    ResBody: 'static,
{
    type Response = Response<ResBody>;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request<ReqBody>) -> Self::Future {
        let labels = request_labels(&request);
        let recorder = Arc::clone(&self.recorder);

        // The clone is not ready; keep the instance poll_ready was called on.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        Box::pin(async move {
            let mut timer = LatencyTimer::start(Arc::clone(&recorder), labels);
            let outcome = AssertUnwindSafe(async move { inner.call(request).await })
                .catch_unwind()
                .await;
            timer.observe();
            let labels = timer.labels();

            match outcome {
                Ok(Ok(response)) => {
                    recorder.record_request(
                        &labels.method,
                        &labels.path,
                        response.status().as_u16(),
                    );
                    Ok(response)
                }
                Ok(Err(err)) => {
                    debug!(
                        method = %labels.method,
                        path = %labels.path,
                        "Inner service failed without a response; request not counted"
                    );
                    Err(err)
                }
                Err(panic) => {
                    error!(
                        method = %labels.method,
                        path = %labels.path,
                        "Handler panicked; counted as 500"
                    );
                    recorder.record_request(
                        &labels.method,
                        &labels.path,
                        StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
                    );
                    std::panic::resume_unwind(panic)
                }
            }
        })
    }
}

/// Labels for a request: the matched route template when routed by axum,
/// otherwise the raw URI path.
fn request_labels<B>(request: &Request<B>) -> RequestLabels {
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);
    RequestLabels::new(request.method().as_str(), path)
}

/// Records one latency observation, on [`LatencyTimer::observe`] or on
/// drop, whichever comes first.
struct LatencyTimer {
    recorder: Arc<dyn RequestRecorder>,
    labels: RequestLabels,
    start: Instant,
    observed: bool,
}

impl LatencyTimer {
    fn start(recorder: Arc<dyn RequestRecorder>, labels: RequestLabels) -> Self {
        Self {
            recorder,
            labels,
            start: Instant::now(),
            observed: false,
        }
    }

    fn labels(&self) -> &RequestLabels {
        &self.labels
    }

    fn observe(&mut self) {
        if self.observed {
            return;
        }
        self.observed = true;
        let elapsed = self.start.elapsed().as_secs_f64();
        self.recorder
            .record_latency(&self.labels.method, &self.labels.path, elapsed);
    }
}

impl Drop for LatencyTimer {
    fn drop(&mut self) {
        self.observe();
    }
}
