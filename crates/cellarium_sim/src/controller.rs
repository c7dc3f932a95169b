//! Shared simulation state and the start/stop lifecycle.

use crate::events::{SimEvent, UpdateHub};
use cellarium_core::config::{AppConfig, MAX_UPDATE_INTERVAL, MIN_UPDATE_INTERVAL};
use cellarium_core::{patterns, GridSnapshot, LifeEngine};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;

/// Bounded wait applied when joining the background loop on `stop()`.
const STOP_TIMEOUT: Duration = Duration::from_secs(1);

/// Point-in-time view of the simulation, taken under the state lock.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct SimulationStatus {
    pub running: bool,
    pub generation: u64,
    /// Nested 0/1 rows, row-major.
    pub grid: Vec<Vec<u8>>,
    /// Seconds between steps.
    pub interval: f64,
    pub width: u16,
    pub height: u16,
}

/// Everything the state lock guards.
struct SimState {
    engine: LifeEngine,
    running: bool,
    update_interval: f64,
}

/// The controller: one shared instance per process, handed by `Arc` to the
/// transport layer and export jobs. All grid access goes through the single
/// state mutex; the pattern registry is static and needs none.
pub struct Simulation {
    state: Arc<Mutex<SimState>>,
    worker: Mutex<Option<JoinHandle<()>>>,
    hub: Arc<UpdateHub>,
    /// Rendering hint: pixels per cell. Immutable after construction and
    /// never consulted by engine logic, so it lives outside the lock.
    cell_size: u16,
}

impl Simulation {
    pub fn new(config: &AppConfig) -> Self {
        let engine = LifeEngine::new(config.grid.width, config.grid.height, config.simulation.seed);
        let update_interval = config
            .simulation
            .update_interval
            .clamp(MIN_UPDATE_INTERVAL, MAX_UPDATE_INTERVAL);
        Self {
            state: Arc::new(Mutex::new(SimState {
                engine,
                running: false,
                update_interval,
            })),
            worker: Mutex::new(None),
            hub: Arc::new(UpdateHub::new()),
            cell_size: config.grid.cell_size,
        }
    }

    pub fn hub(&self) -> &UpdateHub {
        &self.hub
    }

    pub fn cell_size(&self) -> u16 {
        self.cell_size
    }

    /// Runs a closure with the state lock held. Returns `None` when the lock
    /// is poisoned — a panic inside a prior critical section — which is a
    /// programming error, not a recoverable condition; callers degrade.
    fn with_state<R>(&self, f: impl FnOnce(&mut SimState) -> R) -> Option<R> {
        match self.state.lock() {
            Ok(mut state) => Some(f(&mut state)),
            Err(e) => {
                tracing::error!("Failed to lock simulation state: {}", e);
                None
            }
        }
    }

    /// Starts the background stepping loop. Idempotent: calling while the
    /// loop is already running does nothing. Returns immediately.
    pub fn start(&self) {
        let already_running = self.with_state(|state| {
            if state.running {
                true
            } else {
                state.running = true;
                false
            }
        });
        match already_running {
            Some(true) => {
                tracing::debug!("start ignored: loop already running");
                return;
            }
            Some(false) => {}
            None => return,
        }

        let state = Arc::clone(&self.state);
        let hub = Arc::clone(&self.hub);
        let handle = tokio::spawn(async move {
            tracing::info!("simulation loop started");
            loop {
                let (generation, interval) = {
                    let mut st = match state.lock() {
                        Ok(st) => st,
                        Err(e) => {
                            tracing::error!("Failed to lock simulation state: {}", e);
                            break;
                        }
                    };
                    if !st.running {
                        break;
                    }
                    st.engine.step();
                    (st.engine.generation(), st.update_interval)
                };
                hub.emit(SimEvent::GenerationAdvanced { generation });
                tokio::time::sleep(Duration::from_secs_f64(interval)).await;
            }
            tracing::info!("simulation loop stopped");
        });

        match self.worker.lock() {
            Ok(mut worker) => *worker = Some(handle),
            Err(e) => tracing::error!("Failed to lock worker handle: {}", e),
        }
    }

    /// Lowers the running flag and waits a bounded time for the loop to
    /// observe it. On timeout the call returns anyway; the loop may still be
    /// finishing its current iteration but will not start another.
    pub async fn stop(&self) {
        self.with_state(|state| state.running = false);

        let handle = match self.worker.lock() {
            Ok(mut worker) => worker.take(),
            Err(e) => {
                tracing::error!("Failed to lock worker handle: {}", e);
                None
            }
        };
        let Some(handle) = handle else { return };

        match tokio::time::timeout(STOP_TIMEOUT, handle).await {
            Ok(Ok(())) => tracing::info!("simulation loop joined"),
            Ok(Err(e)) => tracing::warn!("simulation loop task failed: {}", e),
            Err(_) => tracing::warn!(
                "simulation loop did not exit within {:?}; returning anyway",
                STOP_TIMEOUT
            ),
        }
    }

    pub fn is_running(&self) -> bool {
        self.with_state(|state| state.running).unwrap_or(false)
    }

    /// Clamps the interval into [0.01, 2.0] seconds, stores it and returns
    /// the clamped value. Takes effect on the next tick; a sleep already in
    /// progress is not interrupted.
    pub fn set_update_interval(&self, seconds: f64) -> f64 {
        let clamped = seconds.clamp(MIN_UPDATE_INTERVAL, MAX_UPDATE_INTERVAL);
        self.with_state(|state| state.update_interval = clamped);
        clamped
    }

    /// Replaces the grid with random cells at the given density and resets
    /// the generation counter.
    pub fn randomize(&self, density: f64) {
        let done = self.with_state(|state| state.engine.randomize(density));
        if done.is_some() {
            self.hub.emit(SimEvent::GridReset { generation: 0 });
        }
    }

    /// Kills every cell and resets the generation counter.
    pub fn clear(&self) {
        let done = self.with_state(|state| state.engine.clear());
        if done.is_some() {
            self.hub.emit(SimEvent::GridReset { generation: 0 });
        }
    }

    /// Loads a registered pattern; `false` (state untouched) on unknown name.
    pub fn load_pattern(&self, name: &str, x_offset: Option<i32>, y_offset: Option<i32>) -> bool {
        let loaded = self
            .with_state(|state| state.engine.load_pattern(name, x_offset, y_offset))
            .unwrap_or(false);
        if loaded {
            tracing::info!(pattern = name, "pattern loaded");
            self.hub.emit(SimEvent::GridReset { generation: 0 });
        }
        loaded
    }

    /// Sets one cell. Out of bounds is a silent no-op.
    pub fn set_cell(&self, x: u16, y: u16, alive: bool) {
        self.with_state(|state| state.engine.set_cell(x, y, alive));
    }

    /// Flips one cell and returns its new state, `None` out of bounds.
    pub fn toggle_cell(&self, x: u16, y: u16) -> Option<bool> {
        self.with_state(|state| state.engine.toggle_cell(x, y))
            .flatten()
    }

    /// Names of all registered patterns. The registry is static data; no
    /// lock is taken.
    pub fn pattern_names(&self) -> Vec<&'static str> {
        patterns::names()
    }

    /// Point-in-time consistent snapshot of the whole simulation.
    pub fn get_state(&self) -> Option<SimulationStatus> {
        self.with_state(|state| {
            let snapshot = state.engine.snapshot();
            SimulationStatus {
                running: state.running,
                generation: snapshot.generation,
                grid: snapshot.grid,
                interval: state.update_interval,
                width: snapshot.width,
                height: snapshot.height,
            }
        })
    }

    /// Grid-only snapshot, for rendering collaborators.
    pub fn snapshot(&self) -> Option<GridSnapshot> {
        self.with_state(|state| state.engine.snapshot())
    }
}
