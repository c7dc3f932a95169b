//! Grid engine operations: the state machine behind the simulation.

use crate::grid::CellGrid;
use crate::patterns;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Read-only copy of the engine state at a point in time.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct GridSnapshot {
    pub generation: u64,
    pub width: u16,
    pub height: u16,
    /// Nested 0/1 rows, row-major.
    pub grid: Vec<Vec<u8>>,
}

/// The cell grid plus the generation counter and the RNG used for random
/// initialization. Pure state and transition logic — the controller crate
/// owns locking and scheduling.
#[derive(Debug)]
pub struct LifeEngine {
    grid: CellGrid,
    generation: u64,
    rng: ChaCha8Rng,
}

impl LifeEngine {
    /// Creates an all-dead grid of the given dimensions. A seed makes
    /// random initialization reproducible; otherwise thread entropy is used.
    pub fn new(width: u16, height: u16, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Self {
            grid: CellGrid::new(width, height),
            generation: 0,
            rng,
        }
    }

    pub fn width(&self) -> u16 {
        self.grid.width()
    }

    pub fn height(&self) -> u16 {
        self.grid.height()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn grid(&self) -> &CellGrid {
        &self.grid
    }

    /// Replaces the grid with Bernoulli(density) draws and resets the
    /// generation counter. Density is clamped into [0.0, 1.0].
    pub fn randomize(&mut self, density: f64) {
        self.grid.randomize(&mut self.rng, density);
        self.generation = 0;
        tracing::debug!(density, "grid randomized");
    }

    /// Kills every cell and resets the generation counter.
    pub fn clear(&mut self) {
        self.grid.clear();
        self.generation = 0;
    }

    /// Loads a registered pattern, replacing the whole grid.
    ///
    /// Returns `false` without touching any state when the name is unknown.
    /// Omitted offsets center the pattern; supplied or computed offsets are
    /// clamped so the pattern stays inside the grid where possible (floored
    /// at 0 when the pattern is wider or taller than the grid).
    pub fn load_pattern(
        &mut self,
        name: &str,
        x_offset: Option<i32>,
        y_offset: Option<i32>,
    ) -> bool {
        let Some(pattern) = patterns::find(name) else {
            tracing::debug!(name, "unknown pattern requested");
            return false;
        };

        let (max_x, max_y) = pattern.extent();
        let w = self.grid.width() as i32;
        let h = self.grid.height() as i32;

        let x_off = x_offset.unwrap_or((w - max_x as i32 - 1) / 2);
        let y_off = y_offset.unwrap_or((h - max_y as i32 - 1) / 2);
        let x_off = x_off.min(w - max_x as i32 - 1).max(0);
        let y_off = y_off.min(h - max_y as i32 - 1).max(0);

        self.grid.clear();
        for &(x, y) in pattern.cells {
            let nx = x as i32 + x_off;
            let ny = y as i32 + y_off;
            if nx >= 0 && nx < w && ny >= 0 && ny < h {
                self.grid.set(nx as u16, ny as u16, true);
            }
        }
        self.generation = 0;
        tracing::debug!(name, x_off, y_off, "pattern loaded");
        true
    }

    /// Advances the grid by exactly one generation.
    pub fn step(&mut self) {
        self.grid.step();
        self.generation += 1;
    }

    /// Sets one cell directly. Out of bounds is a no-op; the generation
    /// counter is untouched either way.
    pub fn set_cell(&mut self, x: u16, y: u16, alive: bool) {
        self.grid.set(x, y, alive);
    }

    /// Flips one cell and returns its new state, or `None` out of bounds.
    pub fn toggle_cell(&mut self, x: u16, y: u16) -> Option<bool> {
        self.grid.toggle(x, y)
    }

    pub fn snapshot(&self) -> GridSnapshot {
        GridSnapshot {
            generation: self.generation,
            width: self.grid.width(),
            height: self.grid.height(),
            grid: self.grid.rows(),
        }
    }
}
