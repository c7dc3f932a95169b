//! Change-notification fan-out for observers.
//!
//! The hub owns a broadcast channel; the transport layer subscribes and
//! pushes events to its own clients. The hub itself owns no transport. The
//! most recent artifact is retained so a subscriber that connects late can
//! be brought up to date immediately.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use tokio::sync::broadcast;

const CHANNEL_CAPACITY: usize = 100;

/// A shareable artifact (e.g. an exported animation) some collaborator
/// finished producing from the simulation state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactUpdate {
    pub artifact_id: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
}

/// Events observers can subscribe to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SimEvent {
    /// The background loop completed a step.
    GenerationAdvanced { generation: u64 },
    /// The grid was replaced wholesale (clear, random init, pattern load).
    GridReset { generation: u64 },
    /// An export collaborator finished producing an artifact.
    ArtifactReady(ArtifactUpdate),
}

pub struct UpdateHub {
    tx: broadcast::Sender<SimEvent>,
    latest_artifact: Mutex<Option<ArtifactUpdate>>,
}

impl Default for UpdateHub {
    fn default() -> Self {
        Self::new()
    }
}

impl UpdateHub {
    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            tx,
            latest_artifact: Mutex::new(None),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SimEvent> {
        self.tx.subscribe()
    }

    /// Sends an event to all current subscribers. Lagging or absent
    /// subscribers are not an error.
    pub(crate) fn emit(&self, event: SimEvent) {
        let _ = self.tx.send(event);
    }

    /// Records a finished artifact and notifies all subscribers.
    pub fn publish_artifact<S: Into<String>>(&self, artifact_id: S) {
        let update = ArtifactUpdate {
            artifact_id: artifact_id.into(),
            timestamp: Utc::now().timestamp_millis(),
        };
        match self.latest_artifact.lock() {
            Ok(mut latest) => *latest = Some(update.clone()),
            Err(e) => tracing::error!("Failed to lock latest-artifact mutex: {}", e),
        }
        tracing::info!(artifact_id = %update.artifact_id, "artifact published");
        self.emit(SimEvent::ArtifactReady(update));
    }

    /// The most recently published artifact, if any.
    pub fn latest_artifact(&self) -> Option<ArtifactUpdate> {
        match self.latest_artifact.lock() {
            Ok(latest) => latest.clone(),
            Err(e) => {
                tracing::error!("Failed to lock latest-artifact mutex: {}", e);
                None
            }
        }
    }
}
