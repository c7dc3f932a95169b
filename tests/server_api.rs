//! End-to-end flows through the HTTP control surface.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use cellarium_core::config::AppConfig;
use cellarium_net::{LoadPresetRequest, SetIntervalRequest};
use cellarium_server::{router, AppState};
use std::sync::Arc;
use std::time::Duration;
use tower::util::ServiceExt;

fn create_app() -> axum::Router {
    let mut config = AppConfig::default();
    config.grid.width = 16;
    config.grid.height = 16;
    config.grid.cell_size = 2;
    config.simulation.seed = Some(21);
    config.render.output_dir = std::env::temp_dir()
        .join(format!("cellarium_api_test_{}", std::process::id()))
        .display()
        .to_string();
    router(Arc::new(AppState::new(config)))
}

fn post_json<T: serde::Serialize>(uri: &str, payload: &T) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(payload).unwrap()))
        .unwrap()
}

fn post_empty(uri: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

async fn fetch_state(app: &axum::Router) -> serde_json::Value {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/life/state")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await
}

#[tokio::test(flavor = "multi_thread")]
async fn load_preset_then_state_shows_the_pattern() {
    let app = create_app();

    let request = post_json(
        "/api/life/load_preset",
        &LoadPresetRequest {
            preset_name: "blinker".to_string(),
            x_offset: Some(6),
            y_offset: Some(6),
        },
    );
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let state = fetch_state(&app).await;
    let grid = state["data"]["grid"].as_array().unwrap();
    let live: usize = grid
        .iter()
        .flat_map(|row| row.as_array().unwrap())
        .filter(|c| c.as_u64() == Some(1))
        .count();
    assert_eq!(live, 3);
    assert_eq!(state["data"]["generation"], 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn start_step_stop_through_the_api() {
    let app = create_app();

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/life/set_interval",
            &SetIntervalRequest { interval: 0.01 },
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(post_empty("/api/life/random_init"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.clone().oneshot(post_empty("/api/life/start")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    tokio::time::sleep(Duration::from_millis(100)).await;

    let running = fetch_state(&app).await;
    assert_eq!(running["data"]["running"], true);

    let response = app.clone().oneshot(post_empty("/api/life/stop")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let stopped = fetch_state(&app).await;
    assert_eq!(stopped["data"]["running"], false);
    assert!(stopped["data"]["generation"].as_u64().unwrap() > 0);

    // The loop is down; the generation no longer advances.
    tokio::time::sleep(Duration::from_millis(100)).await;
    let later = fetch_state(&app).await;
    assert_eq!(later["data"]["generation"], stopped["data"]["generation"]);
}

#[tokio::test(flavor = "multi_thread")]
async fn clear_resets_generation_and_grid() {
    let app = create_app();

    let response = app
        .clone()
        .oneshot(post_empty("/api/life/random_init"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.clone().oneshot(post_empty("/api/life/clear")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let state = fetch_state(&app).await;
    assert_eq!(state["data"]["generation"], 0);
    let grid = state["data"]["grid"].as_array().unwrap();
    assert!(grid
        .iter()
        .flat_map(|row| row.as_array().unwrap())
        .all(|c| c.as_u64() == Some(0)));
}
