//! End-to-end session against a local prediction service.

use std::sync::Arc;
use std::time::Duration;

use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};

use whatif_risk_sim::{
    CycleOutcome, EndpointConfig, HttpPredictionClient, PredictionError, RecordingSurface,
    SimulationConfig, SimulationController, Slider, SliderSet,
};

async fn spawn_fixed_service(probability: f64) -> String {
    let app = Router::new().route(
        "/whatif_predict",
        post(move |Json(_body): Json<Value>| async move {
            Json(json!({ "probability": probability }))
        }),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn controller(base_url: &str) -> SimulationController<RecordingSurface> {
    controller_with_timeout(base_url, None)
}

fn controller_with_timeout(
    base_url: &str,
    timeout: Option<Duration>,
) -> SimulationController<RecordingSurface> {
    let client = HttpPredictionClient::new(base_url, "/whatif_predict", timeout).unwrap();
    SimulationController::new(
        SliderSet::default(),
        &SimulationConfig::default(),
        Arc::new(client),
        RecordingSurface::new(),
    )
    .unwrap()
}

#[tokio::test]
async fn test_initial_load_renders_one_point() {
    let base_url = spawn_fixed_service(0.2).await;
    let mut ctl = controller(&base_url);

    ctl.start();
    let outcome = ctl.process_next().await.unwrap();

    assert!(matches!(outcome, CycleOutcome::Applied { .. }));
    // age 30 and weight 70 are below both boost thresholds
    assert_eq!(ctl.series().data(), vec![0.2]);
    assert_eq!(ctl.surface().redraw_count(), 1);
}

#[tokio::test]
async fn test_boost_applied_to_remote_answer() {
    let base_url = spawn_fixed_service(0.5).await;
    let mut ctl = controller(&base_url);

    ctl.on_input(Slider::Age, 60.0);
    ctl.process_next().await.unwrap();
    ctl.on_input(Slider::Weight, 100.0);
    ctl.process_next().await.unwrap();

    let data = ctl.series().data();
    assert!((data[0] - 0.6).abs() < 1e-12);
    assert!((data[1] - 0.75).abs() < 1e-12);
}

#[tokio::test]
async fn test_unreachable_service_never_touches_chart() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let mut ctl = controller(&format!("http://{addr}"));

    ctl.start();
    ctl.on_input(Slider::Insulin, 150.0);
    let outcomes = ctl.drain().await;

    assert_eq!(outcomes.len(), 2);
    assert!(outcomes
        .iter()
        .all(|o| matches!(o, CycleOutcome::Failed { .. })));
    assert!(ctl.series().is_empty());
    assert_eq!(ctl.surface().redraw_count(), 0);
}

#[tokio::test]
async fn test_timed_out_cycle_leaves_chart_untouched() {
    let app = Router::new().route(
        "/whatif_predict",
        post(|Json(_body): Json<Value>| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Json(json!({ "probability": 0.9 }))
        }),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let endpoint = EndpointConfig {
        base_url: format!("http://{addr}"),
        timeout_ms: Some(100),
        ..EndpointConfig::default()
    };
    let mut ctl = controller_with_timeout(&endpoint.base_url, endpoint.timeout());

    ctl.start();
    let outcome = ctl.process_next().await.unwrap();

    assert!(matches!(
        outcome,
        CycleOutcome::Failed {
            error: PredictionError::Transport(_),
            ..
        }
    ));
    assert!(ctl.series().is_empty());
    assert_eq!(ctl.surface().redraw_count(), 0);
    let summary = ctl.metrics().summary();
    assert_eq!(summary.cycles_failed, 1);
    assert_eq!(summary.cycles_applied, 0);
}
