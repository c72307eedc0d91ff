//! HttpPredictionClient against a local stand-in for the prediction service.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};

use whatif_risk_sim::{
    FeatureVector, HttpPredictionClient, PredictionClient, PredictionError, PredictionRequest,
};

#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<Value>>>);

async fn whatif_ok(State(captured): State<Captured>, Json(body): Json<Value>) -> Json<Value> {
    captured.0.lock().unwrap().push(body);
    Json(json!({ "probability": 0.31, "prediction": 0 }))
}

async fn whatif_rejected() -> (StatusCode, Json<Value>) {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "error": "could not convert string to float" })),
    )
}

async fn whatif_unavailable() -> (StatusCode, String) {
    (StatusCode::SERVICE_UNAVAILABLE, "down for maintenance".to_string())
}

async fn whatif_no_probability() -> Json<Value> {
    Json(json!({ "prediction": 1 }))
}

async fn whatif_slow() -> Json<Value> {
    tokio::time::sleep(Duration::from_secs(5)).await;
    Json(json!({ "probability": 0.5 }))
}

async fn spawn_service() -> (SocketAddr, Captured) {
    let captured = Captured::default();
    let app = Router::new()
        .route("/whatif_predict", post(whatif_ok))
        .route("/rejected", post(whatif_rejected))
        .route("/unavailable", post(whatif_unavailable))
        .route("/no_probability", post(whatif_no_probability))
        .route("/slow", post(whatif_slow))
        .with_state(captured.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, captured)
}

fn request() -> PredictionRequest {
    PredictionRequest::new(FeatureVector::new(55.0, 92.0, 120.0))
}

fn client(addr: SocketAddr, path: &str) -> HttpPredictionClient {
    HttpPredictionClient::new(format!("http://{addr}"), path, None).unwrap()
}

#[tokio::test]
async fn test_success_sends_string_encoded_body() {
    let (addr, captured) = spawn_service().await;

    let result = client(addr, "/whatif_predict")
        .request_prediction(&request())
        .await
        .unwrap();

    assert_eq!(result.probability, 0.31);
    let bodies = captured.0.lock().unwrap();
    assert_eq!(bodies.len(), 1);
    // 92 / 1.75 / 1.75 = 30.04
    assert_eq!(
        bodies[0],
        json!({ "Age": "55", "BMI": "30.0", "Insulin": "120" })
    );
}

#[tokio::test]
async fn test_client_error_status_is_failure() {
    let (addr, _) = spawn_service().await;

    let err = client(addr, "/rejected")
        .request_prediction(&request())
        .await
        .unwrap_err();

    match err {
        PredictionError::Http { status, kind } => {
            assert_eq!(status, 400);
            assert!(kind.to_string().contains("could not convert"));
        }
        other => panic!("expected Http error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_server_error_status_is_failure() {
    let (addr, _) = spawn_service().await;

    let err = client(addr, "/unavailable")
        .request_prediction(&request())
        .await
        .unwrap_err();

    assert!(matches!(err, PredictionError::Http { status: 503, .. }));
}

#[tokio::test]
async fn test_missing_probability_is_malformed() {
    let (addr, _) = spawn_service().await;

    let err = client(addr, "/no_probability")
        .request_prediction(&request())
        .await
        .unwrap_err();

    assert!(matches!(err, PredictionError::MalformedResponse(_)));
}

#[tokio::test]
async fn test_unreachable_service_is_transport_failure() {
    // bind then drop to get a port nothing listens on
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = client(addr, "/whatif_predict")
        .request_prediction(&request())
        .await
        .unwrap_err();

    assert!(matches!(err, PredictionError::Transport(_)));
}

#[tokio::test]
async fn test_timeout_is_transport_failure() {
    let (addr, _) = spawn_service().await;
    let client = HttpPredictionClient::new(
        format!("http://{addr}"),
        "/slow",
        Some(Duration::from_millis(100)),
    )
    .unwrap();

    let err = client.request_prediction(&request()).await.unwrap_err();

    assert!(matches!(err, PredictionError::Transport(_)));
}
