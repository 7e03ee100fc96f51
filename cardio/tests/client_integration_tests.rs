//! Integration tests for the HTTP prediction client.
//!
//! Each test spawns a stub `/predict` server on an ephemeral port and points
//! a real `PredictionClient` at it.

#![cfg(feature = "http-server")]

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    http::{header::CONTENT_TYPE, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use parking_lot::Mutex;
use serde_json::{json, Value};
use tokio::net::TcpListener;

use cardio_rust::client::{PredictionClient, PredictionError, Predictor, GENERIC_FAILURE_MESSAGE};
use cardio_rust::config::ServiceConfig;
use cardio_rust::form::{InputCollector, SubmitOutcome};
use cardio_rust::models::{Field, PredictionLabel, PredictionRequest, RiskCategory};

#[derive(Clone)]
struct Stub {
    status: StatusCode,
    body: Option<Value>,
    delay: Duration,
    seen: Arc<Mutex<Vec<(Option<String>, Value)>>>,
}

impl Stub {
    fn new(status: StatusCode, body: Option<Value>) -> Self {
        Self {
            status,
            body,
            delay: Duration::ZERO,
            seen: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn ok(body: Value) -> Self {
        Self::new(StatusCode::OK, Some(body))
    }

    fn requests(&self) -> Vec<(Option<String>, Value)> {
        self.seen.lock().clone()
    }
}

async fn handle(State(stub): State<Stub>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    stub.seen.lock().push((content_type, body));

    if !stub.delay.is_zero() {
        tokio::time::sleep(stub.delay).await;
    }

    match &stub.body {
        Some(body) => (stub.status, Json(body.clone())).into_response(),
        None => stub.status.into_response(),
    }
}

/// Spawns the stub on an available port and returns the base URL
async fn spawn_stub(stub: Stub) -> String {
    let app = Router::new()
        .route("/predict", post(handle))
        .with_state(stub);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

#[tokio::test]
async fn test_payload_matches_field_state_at_submit() {
    let stub = Stub::ok(json!({"prediction": "0", "probability": 0.12}));
    let base_url = spawn_stub(stub.clone()).await;

    let client = PredictionClient::with_base_url(base_url).unwrap();
    let collector = InputCollector::with_defaults(Arc::new(client));
    collector.set(Field::Age, 61.0);
    collector.set_from_input("gender", "female").unwrap();
    collector.set(Field::Oldpeak, 1.4);
    collector.set(Field::MajorVessels, 2.0);
    let expected = collector.fields();

    let outcome = collector.submit(|_| {}).await;
    assert_eq!(outcome, SubmitOutcome::Delivered);

    let requests = stub.requests();
    assert_eq!(requests.len(), 1);
    let (content_type, body) = &requests[0];
    assert_eq!(content_type.as_deref(), Some("application/json"));

    let object = body.as_object().unwrap();
    assert_eq!(object.len(), 12);
    for (field, value) in expected.entries() {
        assert_eq!(
            object.get(field.wire_name()).and_then(Value::as_f64),
            Some(value),
            "field {}",
            field
        );
    }
    assert_eq!(object["gender"].as_f64(), Some(0.0));
}

#[tokio::test]
async fn test_high_risk_reply() {
    let base_url = spawn_stub(Stub::ok(json!({"prediction": "1", "probability": 0.83}))).await;
    let client = PredictionClient::with_base_url(base_url).unwrap();

    let response = client.predict(&PredictionRequest::default()).await.unwrap();
    assert_eq!(response.prediction, PredictionLabel::HighRisk);
    assert_eq!(response.probability, Some(0.83));

    let collector = InputCollector::with_defaults(Arc::new(client));
    let mut result = None;
    collector.submit(|r| result = Some(r)).await;
    let result = result.unwrap();
    assert_eq!(result.risk, RiskCategory::High);
    assert_eq!(result.probability, 0.83);
}

#[tokio::test]
async fn test_missing_probability_defaults() {
    let base_url = spawn_stub(Stub::ok(json!({"prediction": "0"}))).await;
    let collector = InputCollector::with_defaults(Arc::new(
        PredictionClient::with_base_url(base_url).unwrap(),
    ));

    let mut result = None;
    collector.submit(|r| result = Some(r)).await;
    let result = result.unwrap();
    assert_eq!(result.risk, RiskCategory::Low);
    assert_eq!(result.probability, 0.5);
    assert!(result.probability_defaulted);
}

#[tokio::test]
async fn test_non_one_predictions_are_low_risk() {
    for prediction in [json!("0"), json!("2"), json!(1), json!(null)] {
        let base_url =
            spawn_stub(Stub::ok(json!({"prediction": prediction, "probability": 0.9}))).await;
        let client = PredictionClient::with_base_url(base_url).unwrap();
        let response = client.predict(&PredictionRequest::default()).await.unwrap();
        assert_eq!(response.prediction, PredictionLabel::LowRisk, "{}", prediction);
    }
}

#[tokio::test]
async fn test_error_body_message_is_shown() {
    let base_url = spawn_stub(Stub::new(
        StatusCode::BAD_REQUEST,
        Some(json!({"error": "bad input"})),
    ))
    .await;
    let client = PredictionClient::with_base_url(base_url).unwrap();

    let err = client.predict(&PredictionRequest::default()).await.unwrap_err();
    assert_eq!(
        err,
        PredictionError::RequestFailed {
            status: 400,
            message: "bad input".to_string()
        }
    );

    let collector = InputCollector::with_defaults(Arc::new(client));
    let outcome = collector.submit(|_| panic!("no result expected")).await;
    assert_eq!(outcome, SubmitOutcome::Failed("bad input".to_string()));
    assert_eq!(collector.error().as_deref(), Some("bad input"));
    assert!(!collector.is_busy());
}

#[tokio::test]
async fn test_error_without_body_uses_generic_message() {
    let base_url = spawn_stub(Stub::new(StatusCode::BAD_REQUEST, None)).await;
    let collector = InputCollector::with_defaults(Arc::new(
        PredictionClient::with_base_url(base_url).unwrap(),
    ));

    let outcome = collector.submit(|_| {}).await;
    assert_eq!(outcome, SubmitOutcome::Failed(GENERIC_FAILURE_MESSAGE.to_string()));
    assert_eq!(collector.error().as_deref(), Some(GENERIC_FAILURE_MESSAGE));
}

#[tokio::test]
async fn test_server_error_status() {
    let base_url = spawn_stub(Stub::new(
        StatusCode::INTERNAL_SERVER_ERROR,
        Some(json!({"error": "Model not available"})),
    ))
    .await;
    let client = PredictionClient::with_base_url(base_url).unwrap();
    let err = client.predict(&PredictionRequest::default()).await.unwrap_err();
    assert!(matches!(
        err,
        PredictionError::RequestFailed { status: 500, ref message } if message == "Model not available"
    ));
}

#[tokio::test]
async fn test_malformed_success_body_is_transport_error() {
    let base_url = spawn_stub(Stub::ok(json!({"prediction": "1", "probability": "high"}))).await;
    let client = PredictionClient::with_base_url(base_url).unwrap();
    let err = client.predict(&PredictionRequest::default()).await.unwrap_err();
    assert!(matches!(err, PredictionError::TransportError(_)));
}

#[tokio::test]
async fn test_unreachable_service_is_transport_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let collector = InputCollector::with_defaults(Arc::new(
        PredictionClient::with_base_url(format!("http://{}", addr)).unwrap(),
    ));
    let outcome = collector.submit(|_| {}).await;
    let SubmitOutcome::Failed(message) = outcome else {
        panic!("expected failure, got {:?}", outcome);
    };
    assert!(message.starts_with("Could not reach the prediction service"));
    assert!(!collector.is_busy());
}

#[tokio::test]
async fn test_timeout_is_transport_error() {
    let mut stub = Stub::ok(json!({"prediction": "1", "probability": 0.9}));
    stub.delay = Duration::from_secs(3);
    let base_url = spawn_stub(stub).await;

    let config = ServiceConfig {
        base_url: Some(base_url),
        timeout_secs: 1,
        ..Default::default()
    };
    let client = PredictionClient::new(&config).unwrap();
    let err = client.predict(&PredictionRequest::default()).await.unwrap_err();
    assert!(matches!(err, PredictionError::TransportError(_)), "{:?}", err);
}

#[tokio::test]
async fn test_trailing_slash_base_url() {
    let stub = Stub::ok(json!({"prediction": "1", "probability": 0.6}));
    let base_url = spawn_stub(stub.clone()).await;

    let client = PredictionClient::with_base_url(format!("{}/", base_url)).unwrap();
    assert_eq!(client.predict_url().as_str(), format!("{}/predict", base_url));
    client.predict(&PredictionRequest::default()).await.unwrap();
    assert_eq!(stub.requests().len(), 1);
}

#[tokio::test]
async fn test_resubmit_after_failure_issues_new_request() {
    let stub = Stub::new(StatusCode::BAD_REQUEST, Some(json!({"error": "bad input"})));
    let base_url = spawn_stub(stub.clone()).await;
    let collector = InputCollector::with_defaults(Arc::new(
        PredictionClient::with_base_url(base_url).unwrap(),
    ));

    collector.submit(|_| {}).await;
    collector.submit(|_| {}).await;
    assert_eq!(stub.requests().len(), 2);
}

/// Answers every connection with an error status whose body is cut short.
async fn spawn_truncating_server(status_line: &'static str) -> String {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let mut received = Vec::new();
            let mut buf = [0u8; 4096];
            loop {
                let n = socket.read(&mut buf).await.unwrap_or(0);
                if n == 0 {
                    break;
                }
                received.extend_from_slice(&buf[..n]);
                let text = String::from_utf8_lossy(&received);
                if let Some(end) = text.find("\r\n\r\n") {
                    let length = text[..end]
                        .lines()
                        .find_map(|l| {
                            let (name, value) = l.split_once(':')?;
                            name.eq_ignore_ascii_case("content-length")
                                .then(|| value.trim().parse::<usize>().ok())?
                        })
                        .unwrap_or(0);
                    if received.len() >= end + 4 + length {
                        break;
                    }
                }
            }
            let reply = format!(
                "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: 64\r\n\r\n{{\"error\":",
                status_line
            );
            let _ = socket.write_all(reply.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
    });
    format!("http://{}", addr)
}

#[tokio::test]
async fn test_unreadable_error_body_still_reports_status() {
    let base_url = spawn_truncating_server("503 Service Unavailable").await;
    let client = PredictionClient::with_base_url(base_url).unwrap();

    let err = client.predict(&PredictionRequest::default()).await.unwrap_err();
    assert_eq!(
        err,
        PredictionError::RequestFailed {
            status: 503,
            message: GENERIC_FAILURE_MESSAGE.to_string(),
        }
    );
}

#[tokio::test]
async fn test_numeric_string_probability_is_accepted() {
    let base_url = spawn_stub(Stub::ok(json!({"prediction": "1", "probability": "0.83"}))).await;
    let client = PredictionClient::with_base_url(base_url).unwrap();

    let response = client.predict(&PredictionRequest::default()).await.unwrap();
    assert_eq!(response.prediction, PredictionLabel::HighRisk);
    assert_eq!(response.probability, Some(0.83));
}
