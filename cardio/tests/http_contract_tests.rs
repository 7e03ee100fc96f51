//! Tests for the server side of the `/predict` contract.

#![cfg(feature = "http-server")]

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower::ServiceExt;

use cardio_rust::client::PredictionClient;
use cardio_rust::config::{AppConfig, ResetPolicy, ServiceConfig};
use cardio_rust::form::{AppView, SubmitOutcome};
use cardio_rust::http::{create_router, AppState, Classification, RiskModel};
use cardio_rust::models::{Field, PredictionLabel, PredictionRequest, RiskCategory};

/// High risk as soon as two or more major vessels are reported.
struct VesselModel;

impl RiskModel for VesselModel {
    fn classify(&self, request: &PredictionRequest) -> anyhow::Result<Classification> {
        Ok(if request.major_vessels >= 2.0 {
            Classification {
                label: PredictionLabel::HighRisk,
                probability: 0.8,
            }
        } else {
            Classification {
                label: PredictionLabel::LowRisk,
                probability: 0.2,
            }
        })
    }

    fn name(&self) -> &str {
        "vessel-threshold"
    }
}

struct BrokenModel;

impl RiskModel for BrokenModel {
    fn classify(&self, _: &PredictionRequest) -> anyhow::Result<Classification> {
        anyhow::bail!("Model not available")
    }
}

fn app(model: Arc<dyn RiskModel>) -> Router {
    create_router(AppState::new(model))
}

async fn post_predict(router: Router, body: impl Into<Body>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri("/predict")
        .header("content-type", "application/json")
        .body(body.into())
        .unwrap();
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn default_body() -> Value {
    serde_json::to_value(PredictionRequest::default()).unwrap()
}

#[tokio::test]
async fn test_predict_success() {
    let mut body = default_body();
    body["noofmajorvessels"] = json!(3);

    let (status, value) = post_predict(app(Arc::new(VesselModel)), body.to_string()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(value, json!({"prediction": "1", "probability": 0.8}));
}

#[tokio::test]
async fn test_missing_field_is_bad_request() {
    let mut body = default_body();
    body.as_object_mut().unwrap().remove("restingBP");

    let (status, value) = post_predict(app(Arc::new(VesselModel)), body.to_string()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(value, json!({"error": "Missing required field: restingBP"}));
}

#[tokio::test]
async fn test_numeric_strings_are_accepted() {
    let mut body = default_body();
    body["noofmajorvessels"] = json!("2");
    body["age"] = json!("58");

    let (status, value) = post_predict(app(Arc::new(VesselModel)), body.to_string()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(value["prediction"], "1");
}

#[tokio::test]
async fn test_non_numeric_value_is_bad_request() {
    let mut body = default_body();
    body["slope"] = json!([1]);

    let (status, value) = post_predict(app(Arc::new(VesselModel)), body.to_string()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(value["error"]
        .as_str()
        .unwrap()
        .starts_with("Invalid value for field slope"));
}

#[tokio::test]
async fn test_invalid_json_and_non_object_bodies() {
    let (status, value) = post_predict(app(Arc::new(VesselModel)), "{not json").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(value["error"].as_str().unwrap().starts_with("Invalid JSON body"));

    let (status, value) = post_predict(app(Arc::new(VesselModel)), "[1, 2, 3]").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(value["error"], "Request body must be a JSON object");
}

#[tokio::test]
async fn test_model_failure_is_reported_in_error_body() {
    let (status, value) =
        post_predict(app(Arc::new(BrokenModel)), default_body().to_string()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(value, json!({"error": "Model not available"}));
}

#[tokio::test]
async fn test_health_and_unknown_route() {
    let router = app(Arc::new(VesselModel));

    let response = router
        .clone()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let health: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(health["status"], "ok");
    assert_eq!(health["model"], "vessel-threshold");

    let response = router
        .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

/// Client and server agree on the contract end to end.
#[tokio::test]
async fn test_client_against_contract_server() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let router = app(Arc::new(VesselModel));
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    let config = AppConfig {
        service: ServiceConfig::with_base_url(format!("http://{}/", addr)),
        ..Default::default()
    };
    let mut view = AppView::from_config(&config).unwrap();
    assert_eq!(view.reset_policy(), ResetPolicy::RestoreDefaults);

    view.collector().set(Field::MajorVessels, 3.0);
    assert_eq!(view.submit().await, SubmitOutcome::Delivered);
    let result = *view.result().unwrap();
    assert_eq!(result.risk, RiskCategory::High);
    assert_eq!(result.probability, 0.8);
    assert!(!result.probability_defaulted);

    view.reset();
    assert_eq!(view.submit().await, SubmitOutcome::Delivered);
    assert_eq!(view.result().unwrap().risk, RiskCategory::Low);

    // Server-side validation errors surface verbatim through the client
    let client = PredictionClient::with_base_url(format!("http://{}", addr)).unwrap();
    let raw = reqwest::Client::new()
        .post(client.predict_url().clone())
        .json(&json!({"age": 50}))
        .send()
        .await
        .unwrap();
    assert_eq!(raw.status(), 400);
    let err = cardio_rust::client::PredictionError::from_status(400, &raw.text().await.unwrap());
    assert_eq!(err.user_message(), "Missing required field: gender");
}
