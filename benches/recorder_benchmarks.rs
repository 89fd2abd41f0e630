use std::convert::Infallible;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, Response};
use criterion::{Criterion, black_box, criterion_group, criterion_main};
use instrumented_http::api::MetricsLayer;
use instrumented_http::domain::RequestRecorder;
use instrumented_http::infra::ServerMetrics;
use tower::{Layer, ServiceExt, service_fn};

fn bench_record(c: &mut Criterion) {
    let metrics = ServerMetrics::new().unwrap();

    c.bench_function("record_request_existing_cell", |b| {
        b.iter(|| metrics.record_request(black_box("GET"), black_box("/health"), 200))
    });

    c.bench_function("record_latency_existing_cell", |b| {
        b.iter(|| metrics.record_latency(black_box("GET"), black_box("/health"), 0.012))
    });
}

fn bench_wrapped_call(c: &mut Criterion) {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap();
    let metrics: Arc<dyn RequestRecorder> = Arc::new(ServerMetrics::new().unwrap());
    let service = MetricsLayer::new(metrics).layer(service_fn(|_req: Request<Body>| async {
        Ok::<_, Infallible>(Response::new(Body::empty()))
    }));

    c.bench_function("instrumented_call", |b| {
        b.iter(|| {
            let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
            runtime.block_on(service.clone().oneshot(request)).unwrap()
        })
    });
}

criterion_group!(benches, bench_record, bench_wrapped_call);
criterion_main!(benches);
