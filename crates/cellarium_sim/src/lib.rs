//! # Cellarium Sim
//!
//! The simulation controller: owns the single shared simulation state and
//! arbitrates access between the background stepping loop and external
//! callers (transport handlers, export jobs).
//!
//! One exclusive mutex guards the whole state — grid, generation counter and
//! running flag — because the full-grid step scan and full-grid snapshots
//! both need an all-or-nothing view. The background loop releases the lock
//! before its inter-tick sleep and reacquires it only to step, so external
//! calls stay short, bounded critical sections.
//!
//! Cancellation is cooperative: `stop()` lowers the running flag and waits a
//! bounded time for the loop to observe it. A step already in flight is
//! never interrupted.

/// Shared simulation state and the start/stop lifecycle
pub mod controller;
/// Change-notification fan-out for observers
pub mod events;

pub use controller::{Simulation, SimulationStatus};
pub use events::{ArtifactUpdate, SimEvent, UpdateHub};
