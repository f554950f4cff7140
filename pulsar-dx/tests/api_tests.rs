//! HTTP API tests for pulsar-dx
//!
//! Drives the full router in-process with `oneshot`, backed by a temporary
//! diagnosis database.

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use image::{GrayImage, ImageFormat, Luma};
use pulsar_dx::analysis::Fingerprint;
use pulsar_dx::warmup::{ModelCache, StoreHandle};
use pulsar_dx::{build_router, AppState, DiagnosisEngine, ServerConfig};
use serde_json::Value;
use std::io::Cursor;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

const BOUNDARY: &str = "pulsar-test-boundary";

/// Router over a lazily opened store in a fresh temp directory
fn setup_app() -> (Router, TempDir) {
    setup_app_with(ServerConfig::default())
}

fn setup_app_with(config: ServerConfig) -> (Router, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let store = StoreHandle::new(temp_dir.path().join("medical_diagnosis.db"));
    let engine = DiagnosisEngine::new(Arc::new(store), Arc::new(ModelCache::new()));
    let app = build_router(AppState::new(engine), &config);
    (app, temp_dir)
}

fn png(image: &GrayImage) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    image.write_to(&mut buf, ImageFormat::Png).unwrap();
    buf.into_inner()
}

/// multipart/form-data body with a single part
fn multipart_body(field: &str, filename: &str, content_type: &str, data: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
            field, filename
        )
        .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", content_type).as_bytes());
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
    body
}

fn predict_request(body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/predict")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

async fn history(app: &Router) -> Vec<Value> {
    let response = app.clone().oneshot(get("/history")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    json_body(response).await.as_array().unwrap().clone()
}

#[tokio::test]
async fn test_health_endpoints() {
    let (app, _temp) = setup_app();

    for uri in ["/", "/health"] {
        let response = app.clone().oneshot(get(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = json_body(response).await;
        assert_eq!(json["status"], "online");
        assert_eq!(json["engine"], "Robust Deep Ensemble");
        assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
        // YYYY-MM-DD HH:MM:SS
        assert_eq!(json["server_time"].as_str().unwrap().len(), 19);
    }
}

#[tokio::test]
async fn test_history_empty_store() {
    let (app, _temp) = setup_app();
    assert!(history(&app).await.is_empty());
}

#[tokio::test]
async fn test_predict_black_scan_is_normal_brain_mri() {
    let (app, _temp) = setup_app();
    let bytes = png(&GrayImage::from_pixel(224, 224, Luma([0])));
    let fingerprint = Fingerprint::of(&bytes);

    let response = app
        .clone()
        .oneshot(predict_request(multipart_body("file", "black.png", "image/png", &bytes)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    assert_eq!(json["modality"], "Brain MRI");
    assert_eq!(json["condition"], "Normal");

    let expected = 0.92 + fingerprint.rem(75) as f64 / 1000.0;
    assert!((json["confidence"].as_f64().unwrap() - expected).abs() < 1e-9);

    let report = &json["report"];
    assert_eq!(report["severity"], "Normal");
    assert_eq!(report["impression"], "Normal diagnostic study. No acute findings.");
    assert_eq!(
        report["diagnosis_id"],
        format!("RAD-AI-{:04}", fingerprint.rem(10_000))
    );
    assert_eq!(report["clinical_findings"].as_array().unwrap().len(), 2);
    assert_eq!(report["summary"]["impacting_condition"], "Normal");

    let breakdown = json["ensemble_breakdown"].as_array().unwrap();
    let models: Vec<_> = breakdown.iter().map(|m| m["model"].as_str().unwrap()).collect();
    assert_eq!(models, vec!["ResNet50", "DenseNet121", "VGG16"]);

    let entries = history(&app).await;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["condition"], "Normal");
    assert_eq!(entries[0]["modality"], "Brain MRI");
    assert_eq!(entries[0]["filename"], "black.png");
    assert_eq!(entries[0]["diagnostic_issue"], report["impression"]);
}

#[tokio::test]
async fn test_predict_is_deterministic_apart_from_timestamp() {
    let (app, _temp) = setup_app();
    let image = GrayImage::from_fn(120, 80, |x, y| Luma([((x * 7 + y * 13) % 256) as u8]));
    let bytes = png(&image);

    let mut results = Vec::new();
    for name in ["first.png", "second.png"] {
        let response = app
            .clone()
            .oneshot(predict_request(multipart_body("file", name, "image/png", &bytes)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let mut json = json_body(response).await;
        json["report"]
            .as_object_mut()
            .unwrap()
            .remove("analysis_timestamp");
        results.push(json);
    }
    assert_eq!(results[0], results[1]);

    // Both recorded, newest first
    let entries = history(&app).await;
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["filename"], "second.png");
    assert_eq!(entries[1]["filename"], "first.png");
}

#[tokio::test]
async fn test_distinct_uploads_recorded_newest_first() {
    let (app, _temp) = setup_app();
    let dark = png(&GrayImage::from_pixel(64, 64, Luma([10])));
    let white = png(&GrayImage::from_pixel(64, 64, Luma([255])));

    for (name, bytes) in [("dark.png", &dark), ("white.png", &white)] {
        let response = app
            .clone()
            .oneshot(predict_request(multipart_body("file", name, "image/png", bytes)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let entries = history(&app).await;
    assert_eq!(entries.len(), 2);
    assert_ne!(entries[0]["id"], entries[1]["id"]);
    assert_eq!(entries[0]["filename"], "white.png");
    assert_eq!(entries[0]["modality"], "CT Scan");
    assert_eq!(entries[1]["filename"], "dark.png");
    assert_eq!(entries[1]["modality"], "Brain MRI");
}

#[tokio::test]
async fn test_history_limit_parameter() {
    let (app, _temp) = setup_app();
    let bytes = png(&GrayImage::from_pixel(16, 16, Luma([200])));

    for _ in 0..3 {
        let response = app
            .clone()
            .oneshot(predict_request(multipart_body("file", "scan.png", "image/png", &bytes)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app.clone().oneshot(get("/history?limit=2")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await.as_array().unwrap().len(), 2);

    let response = app.clone().oneshot(get("/history?limit=0")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(json_body(response).await.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_non_image_upload_rejected_without_history() {
    let (app, _temp) = setup_app();

    let response = app
        .clone()
        .oneshot(predict_request(multipart_body(
            "file",
            "notes.txt",
            "text/plain",
            b"not a scan",
        )))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = json_body(response).await;
    assert_eq!(json["error"]["code"], "BAD_REQUEST");

    assert!(history(&app).await.is_empty());
}

#[tokio::test]
async fn test_missing_file_field_rejected() {
    let (app, _temp) = setup_app();
    let bytes = png(&GrayImage::from_pixel(8, 8, Luma([0])));

    let response = app
        .clone()
        .oneshot(predict_request(multipart_body("scan", "black.png", "image/png", &bytes)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(history(&app).await.is_empty());
}

#[tokio::test]
async fn test_corrupt_image_returns_degraded_result() {
    let (app, _temp) = setup_app();

    let response = app
        .clone()
        .oneshot(predict_request(multipart_body(
            "file",
            "broken.png",
            "image/png",
            b"\x89PNG\r\n\x1a\nthis is not really a png",
        )))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    assert_eq!(json["modality"], "Unknown");
    assert_eq!(json["condition"], "Analysis Error");
    assert_eq!(json["confidence"], 0.0);
    assert_eq!(json["report"]["finding"], "Analysis failed to complete.");
    assert_eq!(json["report"]["severity"], "Error");
    assert!(json["ensemble_breakdown"].as_array().unwrap().is_empty());

    let entries = history(&app).await;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["condition"], "Analysis Error");
    assert_eq!(entries[0]["filename"], "broken.png");
}

#[tokio::test]
async fn test_upload_over_body_limit_rejected() {
    let (app, _temp) = setup_app_with(ServerConfig {
        max_upload_bytes: 1024,
        ..ServerConfig::default()
    });
    let noisy = GrayImage::from_fn(256, 256, |x, y| Luma([((x * 31 + y * 17 + x * y) % 251) as u8]));
    let bytes = png(&noisy);
    assert!(bytes.len() > 1024);

    let response = app
        .clone()
        .oneshot(predict_request(multipart_body("file", "big.png", "image/png", &bytes)))
        .await
        .unwrap();
    assert!(response.status().is_client_error());
    assert!(history(&app).await.is_empty());
}
