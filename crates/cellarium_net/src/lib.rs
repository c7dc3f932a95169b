//! Wire protocol shared between the control server and its clients.
//!
//! Request payloads for the REST control surface and the tagged messages
//! pushed over the `/ws/updates` WebSocket. Transport-agnostic: nothing here
//! opens a socket.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Messages pushed to WebSocket subscribers.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UpdateMessage {
    /// Sent once when a subscriber connects.
    Welcome { client_id: Uuid },
    /// A newly exported artifact is available for preview.
    ArtifactUpdate { artifact_id: String, timestamp: i64 },
    /// The background loop completed a step.
    Generation { generation: u64 },
    /// The grid was replaced wholesale.
    GridReset { generation: u64 },
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RandomInitRequest {
    pub density: Option<f64>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SetCellRequest {
    pub x: u16,
    pub y: u16,
    /// 0 = dead, anything else = alive.
    pub state: u8,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ToggleCellRequest {
    pub x: u16,
    pub y: u16,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SetIntervalRequest {
    /// Seconds between steps; clamped server-side.
    pub interval: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct LoadPresetRequest {
    pub preset_name: String,
    pub x_offset: Option<i32>,
    pub y_offset: Option<i32>,
}

/// How an animation recording initializes its grid.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AnimationMode {
    Preset,
    Random,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AnimationRequest {
    pub frames: Option<u32>,
    pub mode: Option<AnimationMode>,
    pub preset: Option<String>,
    pub density: Option<f64>,
    pub x_offset: Option<i32>,
    pub y_offset: Option<i32>,
    pub fps: Option<u16>,
}
