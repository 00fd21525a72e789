//! HTTP routing of the exporter endpoints.

mod support;

use std::sync::Arc;

use acm_exporter::{server, AcmCollector, Config};
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use chrono::{TimeDelta, Utc};
use prometheus::Registry;
use support::{arn, certificate, FakeBackend, FakeRegion};
use tower::ServiceExt;

async fn get(registry: Registry, path: &str) -> (StatusCode, Option<String>, String) {
    let response = server::router(registry)
        .oneshot(Request::builder().uri(path).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .map(|value| value.to_str().unwrap().to_string());
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, content_type, String::from_utf8(body.to_vec()).unwrap())
}

#[tokio::test]
async fn test_health_endpoints() {
    for path in ["/health", "/healthz"] {
        let (status, _, body) = get(Registry::new(), path).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "OK");
    }
}

#[tokio::test]
async fn test_unknown_path_is_not_found() {
    let (status, _, body) = get(Registry::new(), "/metrics/extra").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, "Not Found");
}

#[tokio::test]
async fn test_metrics_with_empty_registry() {
    let (status, content_type, body) = get(Registry::new(), "/metrics").await;
    assert_eq!(status, StatusCode::OK);
    assert!(content_type.unwrap().starts_with("text/plain"));
    assert!(body.is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_metrics_exposes_certificates() {
    let now = Utc::now();
    let cert = arn("us-east-1", "served");
    let backend = FakeBackend::new().region(
        "us-east-1",
        FakeRegion::new()
            .page(vec![certificate(&cert, "served.example.com", now + TimeDelta::days(90))])
            .tags(&cert, &[("Env", "prod")]),
    );
    let config = Config {
        regions: Some(vec!["us-east-1".to_string()]),
        ..Config::default()
    };

    let registry = Registry::new();
    let collector = AcmCollector::new(&config, Arc::new(backend)).unwrap();
    collector.register(&registry).unwrap();

    let (status, content_type, body) = get(registry, "/metrics").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("text/plain; version=0.0.4"));
    assert!(body.contains("acm_certificate_expiry_duration_days{"));
    assert!(body.contains("domain=\"served.example.com\""));
    assert!(body.contains("tags_Env=\"prod\""));
}
