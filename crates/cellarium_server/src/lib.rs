//! # Cellarium Server
//!
//! HTTP + WebSocket transport over the simulation controller. Every REST
//! handler is a short translation layer: decode the payload, call one
//! controller operation, wrap the result in the JSON status envelope.
//! `/ws/updates` subscribes clients to the controller's event hub and pushes
//! updates as typed `cellarium_net` messages.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, State,
    },
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use cellarium_core::config::AppConfig;
use cellarium_net::{
    AnimationMode, AnimationRequest, LoadPresetRequest, RandomInitRequest, SetCellRequest,
    SetIntervalRequest, ToggleCellRequest, UpdateMessage,
};
use cellarium_render::{
    encode_png, render_frame, AnimationExporter, AnimationInit, AnimationSpec, Palette,
};
use cellarium_sim::{SimEvent, Simulation};
use futures::{sink::SinkExt, stream::StreamExt};
use std::sync::Arc;
use tokio::sync::broadcast;
use tower_http::cors::CorsLayer;
use uuid::Uuid;

/// Server state shared by all handlers.
pub struct AppState {
    pub sim: Arc<Simulation>,
    pub config: AppConfig,
    pub palette: Palette,
    pub exporter: AnimationExporter,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let sim = Arc::new(Simulation::new(&config));
        let palette = Palette::from_hex(&config.render.alive_color, &config.render.dead_color)
            .unwrap_or_else(|e| {
                tracing::warn!("Invalid colors in config ({}); using defaults", e);
                Palette::default()
            });
        let exporter =
            AnimationExporter::new(&config.render.output_dir, &config.render.filename_prefix);
        Self {
            sim,
            config,
            palette,
            exporter,
        }
    }
}

/// Builds the full route table.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/life/start", post(start_sim))
        .route("/api/life/stop", post(stop_sim))
        .route("/api/life/random_init", post(random_init))
        .route("/api/life/clear", post(clear_grid))
        .route("/api/life/state", get(get_state))
        .route("/api/life/image", get(get_image))
        .route("/api/life/set_cell", post(set_cell))
        .route("/api/life/toggle_cell", post(toggle_cell))
        .route("/api/life/set_interval", post(set_interval))
        .route("/api/life/presets", get(get_presets))
        .route("/api/life/load_preset", post(load_preset))
        .route("/api/life/animation", post(create_animation))
        .route("/api/life/animation/:filename", get(get_animation))
        .route("/ws/updates", get(websocket_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn error_response(status: StatusCode, message: impl Into<String>) -> axum::response::Response {
    (
        status,
        Json(serde_json::json!({ "status": "error", "message": message.into() })),
    )
        .into_response()
}

async fn start_sim(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    state.sim.start();
    Json(serde_json::json!({ "status": "success", "message": "Simulation started" }))
}

async fn stop_sim(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    state.sim.stop().await;
    Json(serde_json::json!({ "status": "success", "message": "Simulation stopped" }))
}

/// POST body is optional; a missing or empty payload falls back to the
/// configured default density.
async fn random_init(
    State(state): State<Arc<AppState>>,
    payload: Option<Json<RandomInitRequest>>,
) -> impl IntoResponse {
    let density = payload
        .and_then(|Json(req)| req.density)
        .unwrap_or(state.config.simulation.density);
    state.sim.randomize(density);
    Json(serde_json::json!({
        "status": "success",
        "message": format!("Grid initialized randomly with density {}", density)
    }))
}

async fn clear_grid(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    state.sim.clear();
    Json(serde_json::json!({ "status": "success", "message": "Grid cleared" }))
}

async fn get_state(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.sim.get_state() {
        Some(status) => Json(serde_json::json!({ "status": "success", "data": status }))
            .into_response(),
        None => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "simulation state unavailable",
        ),
    }
}

async fn get_image(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let Some(snapshot) = state.sim.snapshot() else {
        return error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "simulation state unavailable",
        );
    };
    let image = render_frame(&snapshot, state.sim.cell_size(), &state.palette);
    match encode_png(&image) {
        Ok(bytes) => ([(header::CONTENT_TYPE, "image/png")], bytes).into_response(),
        Err(e) => {
            tracing::error!("Failed to encode grid image: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "image encoding failed")
        }
    }
}

async fn set_cell(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SetCellRequest>,
) -> impl IntoResponse {
    state.sim.set_cell(req.x, req.y, req.state != 0);
    Json(serde_json::json!({
        "status": "success",
        "message": format!("Cell at ({}, {}) set to {}", req.x, req.y, req.state)
    }))
}

async fn toggle_cell(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ToggleCellRequest>,
) -> impl IntoResponse {
    match state.sim.toggle_cell(req.x, req.y) {
        Some(alive) => Json(serde_json::json!({
            "status": "success",
            "message": format!("Cell at ({}, {}) toggled", req.x, req.y),
            "state": alive
        }))
        .into_response(),
        None => error_response(
            StatusCode::BAD_REQUEST,
            format!("Cell at ({}, {}) is out of bounds", req.x, req.y),
        ),
    }
}

async fn set_interval(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SetIntervalRequest>,
) -> impl IntoResponse {
    let clamped = state.sim.set_update_interval(req.interval);
    Json(serde_json::json!({
        "status": "success",
        "message": format!("Update interval set to {}s", clamped),
        "interval": clamped
    }))
}

async fn get_presets(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "success",
        "presets": state.sim.pattern_names()
    }))
}

async fn load_preset(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoadPresetRequest>,
) -> impl IntoResponse {
    if req.preset_name.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "preset_name is required");
    }
    if state
        .sim
        .load_pattern(&req.preset_name, req.x_offset, req.y_offset)
    {
        Json(serde_json::json!({
            "status": "success",
            "message": format!("Preset '{}' loaded successfully", req.preset_name)
        }))
        .into_response()
    } else {
        error_response(
            StatusCode::NOT_FOUND,
            format!("Preset '{}' not found", req.preset_name),
        )
    }
}

/// Records an animation with a private engine, exports it as a GIF and
/// publishes the artifact to all subscribers.
async fn create_animation(
    State(state): State<Arc<AppState>>,
    payload: Option<Json<AnimationRequest>>,
) -> impl IntoResponse {
    let req = payload.map(|Json(req)| req).unwrap_or(AnimationRequest {
        frames: None,
        mode: None,
        preset: None,
        density: None,
        x_offset: None,
        y_offset: None,
        fps: None,
    });

    let init = match req.mode.unwrap_or(AnimationMode::Preset) {
        AnimationMode::Preset => AnimationInit::Preset {
            name: req.preset.unwrap_or_else(|| "glider".to_string()),
            x_offset: req.x_offset,
            y_offset: req.y_offset,
        },
        AnimationMode::Random => AnimationInit::Random {
            density: req.density.unwrap_or(state.config.simulation.density),
        },
    };
    let spec = AnimationSpec {
        width: state.config.grid.width,
        height: state.config.grid.height,
        cell_size: state.config.grid.cell_size,
        frames: req.frames.unwrap_or(30),
        fps: req.fps.unwrap_or(state.config.render.fps),
        init,
        seed: state.config.simulation.seed,
    };

    let palette = state.palette;
    let state_clone = Arc::clone(&state);
    let exported = tokio::task::spawn_blocking(move || {
        state_clone.exporter.export(&spec, &palette)
    })
    .await;

    match exported {
        Ok(Ok(filename)) => {
            state.sim.hub().publish_artifact(filename.clone());
            Json(serde_json::json!({
                "status": "success",
                "message": format!("Animation '{}' exported", filename),
                "artifact_id": filename
            }))
            .into_response()
        }
        Ok(Err(e)) => {
            tracing::warn!("Animation export failed: {}", e);
            error_response(StatusCode::BAD_REQUEST, e.to_string())
        }
        Err(e) => {
            tracing::error!("Animation export task failed: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "export task failed")
        }
    }
}

/// Serves a previously exported animation. Filenames that could escape the
/// output directory are rejected.
async fn get_animation(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> impl IntoResponse {
    let Some(path) = state.exporter.resolve(&filename) else {
        return error_response(StatusCode::FORBIDDEN, "Invalid filename");
    };
    match tokio::fs::read(&path).await {
        Ok(bytes) => ([(header::CONTENT_TYPE, "image/gif")], bytes).into_response(),
        Err(_) => error_response(
            StatusCode::NOT_FOUND,
            format!("File not found: {}", filename),
        ),
    }
}

async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| websocket(socket, state))
}

async fn websocket(stream: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = stream.split();
    let client_id = Uuid::new_v4();
    tracing::info!("Subscriber connected: {}", client_id);

    let welcome = UpdateMessage::Welcome { client_id };
    if let Ok(text) = serde_json::to_string(&welcome) {
        let _ = sender.send(Message::Text(text)).await;
    }

    // Bring late subscribers up to date with the most recent artifact.
    if let Some(latest) = state.sim.hub().latest_artifact() {
        let msg = UpdateMessage::ArtifactUpdate {
            artifact_id: latest.artifact_id,
            timestamp: latest.timestamp,
        };
        if let Ok(text) = serde_json::to_string(&msg) {
            let _ = sender.send(Message::Text(text)).await;
        }
    }

    let mut rx = state.sim.hub().subscribe();
    let send_task = tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    let msg = match event {
                        SimEvent::GenerationAdvanced { generation } => {
                            UpdateMessage::Generation { generation }
                        }
                        SimEvent::GridReset { generation } => {
                            UpdateMessage::GridReset { generation }
                        }
                        SimEvent::ArtifactReady(update) => UpdateMessage::ArtifactUpdate {
                            artifact_id: update.artifact_id,
                            timestamp: update.timestamp,
                        },
                    };
                    let Ok(text) = serde_json::to_string(&msg) else {
                        continue;
                    };
                    if sender.send(Message::Text(text)).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::debug!("Subscriber {} lagged by {} events", client_id, skipped);
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    // Drain the incoming side until the client goes away; subscribers only
    // listen on this socket.
    while let Some(Ok(_)) = receiver.next().await {}

    send_task.abort();
    tracing::info!("Subscriber disconnected: {}", client_id);
}
