use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::Result;
use reqwest::{Client, Method, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};

use solar_fault_analyzer::{router, ArtifactPaths, Config, FaultClass, PredictionService};

#[derive(Debug, Deserialize)]
struct Prediction {
    result: String,
    probabilities: HashMap<String, f64>,
}

#[derive(Debug, Deserialize)]
struct ErrorReply {
    result: Option<String>,
    error: String,
}

fn fixture_paths() -> ArtifactPaths {
    // ---
    let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures");
    ArtifactPaths {
        model: dir.join("solar_panel_classifier.json"),
        scaler: dir.join("scaler.json"),
    }
}

/// Serve the real router on an ephemeral port and return its base URL.
async fn spawn_app(service: PredictionService) -> Result<String> {
    spawn_app_with(service, &Config::default()).await
}

async fn spawn_app_with(service: PredictionService, config: &Config) -> Result<String> {
    // ---
    let app = router(service, config);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });
    Ok(format!("http://{}", addr))
}

async fn ready_app() -> Result<String> {
    // ---
    let service = PredictionService::load(&fixture_paths());
    assert!(service.readiness().is_ready(), "fixtures failed to load");
    spawn_app(service).await
}

async fn degraded_app() -> Result<String> {
    // ---
    let service = PredictionService::load(&ArtifactPaths {
        model: PathBuf::from("/nonexistent/solar_panel_classifier.json"),
        scaler: fixture_paths().scaler,
    });
    spawn_app(service).await
}

async fn post_predict(base: &str, body: Value) -> Result<reqwest::Response> {
    Ok(Client::new()
        .post(format!("{}/predict", base))
        .json(&body)
        .send()
        .await?)
}

#[tokio::test]
async fn predict_returns_label_and_full_distribution() -> Result<()> {
    // ---
    let base = ready_app().await?;

    let resp = post_predict(
        &base,
        json!({"voltage": 12.0, "temperature": 25.0, "dust": 5.0, "irradiance": 800.0}),
    )
    .await?;
    assert_eq!(resp.status(), StatusCode::OK);

    let prediction: Prediction = resp.json().await?;
    assert_eq!(prediction.result, FaultClass::Normal.label());

    // Every class label is present and the distribution sums to one
    assert_eq!(prediction.probabilities.len(), FaultClass::ALL.len());
    for class in FaultClass::ALL {
        assert!(
            prediction.probabilities.contains_key(class.label()),
            "missing {}",
            class.label()
        );
    }
    let total: f64 = prediction.probabilities.values().sum();
    assert!((total - 1.0).abs() < 1e-6, "probabilities sum to {}", total);

    Ok(())
}

#[tokio::test]
async fn predict_uses_dust_in_second_feature_slot() -> Result<()> {
    // ---
    // The fixture network only weighs the second feature, which must be dust
    let base = ready_app().await?;

    let resp = post_predict(
        &base,
        json!({"voltage": 12.0, "temperature": 25.0, "dust": 900.0, "irradiance": 800.0}),
    )
    .await?;
    assert_eq!(resp.status(), StatusCode::OK);

    let prediction: Prediction = resp.json().await?;
    assert_eq!(prediction.result, FaultClass::Soiling.label());

    Ok(())
}

#[tokio::test]
async fn numeric_strings_are_accepted() -> Result<()> {
    // ---
    let base = ready_app().await?;

    let resp = post_predict(
        &base,
        json!({"voltage": "12", "temperature": "25.5", "dust": "5", "irradiance": "800"}),
    )
    .await?;
    assert_eq!(resp.status(), StatusCode::OK);

    Ok(())
}

#[tokio::test]
async fn out_of_range_returns_fault_class() -> Result<()> {
    // ---
    let base = ready_app().await?;

    let resp = post_predict(
        &base,
        json!({"voltage": 12.0, "temperature": 75, "dust": 5.0, "irradiance": 800.0}),
    )
    .await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let reply: ErrorReply = resp.json().await?;
    assert_eq!(
        reply.result.as_deref(),
        Some(FaultClass::DESIGNATED_FAULT.label())
    );
    assert!(reply.error.contains("temperature"), "{}", reply.error);
    assert!(reply.error.contains("75.00"), "{}", reply.error);
    assert!(reply.error.contains("-50"), "{}", reply.error);
    assert!(reply.error.contains("60"), "{}", reply.error);

    Ok(())
}

#[tokio::test]
async fn missing_key_lists_required_keys() -> Result<()> {
    // ---
    let base = ready_app().await?;

    let resp = post_predict(
        &base,
        json!({"voltage": 12.0, "temperature": 25.0, "irradiance": 800.0}),
    )
    .await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let reply: ErrorReply = resp.json().await?;
    assert!(reply.result.is_none());
    for key in ["voltage", "temperature", "dust", "irradiance"] {
        assert!(reply.error.contains(key), "{}", reply.error);
    }

    Ok(())
}

#[tokio::test]
async fn non_numeric_value_is_invalid_format() -> Result<()> {
    // ---
    let base = ready_app().await?;

    let resp = post_predict(
        &base,
        json!({"voltage": "abc", "temperature": 25.0, "dust": 5.0, "irradiance": 800.0}),
    )
    .await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let reply: ErrorReply = resp.json().await?;
    assert!(reply.error.starts_with("Invalid data format."), "{}", reply.error);

    Ok(())
}

#[tokio::test]
async fn malformed_bodies_get_json_errors() -> Result<()> {
    // ---
    let base = ready_app().await?;
    let client = Client::new();

    let resp = client
        .post(format!("{}/predict", base))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let reply: ErrorReply = resp.json().await?;
    assert!(!reply.error.is_empty());

    let resp = post_predict(&base, json!([12.0, 25.0, 5.0, 800.0])).await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let reply: ErrorReply = resp.json().await?;
    assert!(reply.error.contains("JSON object"), "{}", reply.error);

    Ok(())
}

#[tokio::test]
async fn degraded_service_answers_503() -> Result<()> {
    // ---
    let base = degraded_app().await?;

    for body in [
        json!({"voltage": 12.0, "temperature": 25.0, "dust": 5.0, "irradiance": 800.0}),
        json!({"voltage": 99.0, "temperature": 25.0, "dust": 5.0, "irradiance": 800.0}),
        json!({"voltage": "abc"}),
    ] {
        let resp = post_predict(&base, body).await?;
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
        let reply: ErrorReply = resp.json().await?;
        assert!(reply.error.contains("Service unavailable"), "{}", reply.error);
    }

    Ok(())
}

#[tokio::test]
async fn home_is_up_even_when_degraded() -> Result<()> {
    // ---
    for base in [ready_app().await?, degraded_app().await?] {
        let resp = Client::new().get(format!("{}/", base)).send().await?;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: Value = resp.json().await?;
        assert_eq!(body["message"], "Solar Fault Analyzer API is running");
    }

    Ok(())
}

#[tokio::test]
async fn health_reports_artifact_state() -> Result<()> {
    // ---
    let client = Client::new();

    let body: Value = client
        .get(format!("{}/health", ready_app().await?))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(body["status"], "ok");

    let resp = client
        .get(format!("{}/health", degraded_app().await?))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await?;
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["model_loaded"], false);
    assert_eq!(body["scaler_loaded"], true);

    Ok(())
}

#[tokio::test]
async fn preflight_returns_no_content() -> Result<()> {
    // ---
    for base in [ready_app().await?, degraded_app().await?] {
        let resp = Client::new()
            .request(Method::OPTIONS, format!("{}/predict", base))
            .header("origin", "http://localhost:3000")
            .header("access-control-request-method", "POST")
            .header("access-control-request-headers", "content-type")
            .send()
            .await?;

        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
        assert_eq!(
            resp.headers()
                .get("access-control-allow-origin")
                .and_then(|v| v.to_str().ok()),
            Some("http://localhost:3000")
        );
        assert_eq!(
            resp.headers()
                .get("access-control-allow-credentials")
                .and_then(|v| v.to_str().ok()),
            Some("true")
        );
        assert!(resp.text().await?.is_empty());
    }

    Ok(())
}

#[tokio::test]
async fn missing_content_type_is_415_with_json_error() -> Result<()> {
    // ---
    let base = ready_app().await?;

    let resp = Client::new()
        .post(format!("{}/predict", base))
        .body(r#"{"voltage": 12.0, "temperature": 25.0, "dust": 5.0, "irradiance": 800.0}"#)
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);

    let reply: ErrorReply = resp.json().await?;
    assert!(reply.result.is_none());
    assert!(!reply.error.is_empty());

    Ok(())
}

#[tokio::test]
async fn wildcard_inside_origin_list_mirrors_origin() -> Result<()> {
    // ---
    let config = Config {
        cors_origin: "http://localhost:3000, *".to_string(),
        ..Config::default()
    };
    let base = spawn_app_with(PredictionService::load(&fixture_paths()), &config).await?;

    let resp = Client::new()
        .request(Method::OPTIONS, format!("{}/predict", base))
        .header("origin", "http://dashboard.example")
        .header("access-control-request-method", "POST")
        .send()
        .await?;

    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert_eq!(
        resp.headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("http://dashboard.example")
    );

    Ok(())
}
