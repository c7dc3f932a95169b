//! Double-buffered cell grid with toroidal neighbor lookup.

use rand::Rng;

/// Fixed-size boolean grid, row-major.
///
/// The back buffer holds the next generation while a step is being computed,
/// so every cell is evaluated against the same source state. Sequential
/// in-place updates would corrupt neighbor counts for cells not yet visited.
#[derive(Clone, Debug)]
pub struct CellGrid {
    cells: Vec<bool>,
    back_buffer: Vec<bool>,
    width: u16,
    height: u16,
}

impl CellGrid {
    pub fn new(width: u16, height: u16) -> Self {
        let cells = vec![false; width as usize * height as usize];
        let back_buffer = cells.clone();
        Self {
            cells,
            back_buffer,
            width,
            height,
        }
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    #[inline(always)]
    fn index(&self, x: u16, y: u16) -> usize {
        (y as usize * self.width as usize) + x as usize
    }

    #[inline]
    pub fn in_bounds(&self, x: u16, y: u16) -> bool {
        x < self.width && y < self.height
    }

    pub fn get(&self, x: u16, y: u16) -> Option<bool> {
        if self.in_bounds(x, y) {
            Some(self.cells[self.index(x, y)])
        } else {
            None
        }
    }

    /// Sets a single cell. Out-of-bounds coordinates are a silent no-op;
    /// returns whether the write landed.
    pub fn set(&mut self, x: u16, y: u16, alive: bool) -> bool {
        if !self.in_bounds(x, y) {
            return false;
        }
        let idx = self.index(x, y);
        self.cells[idx] = alive;
        true
    }

    /// Flips a single cell and returns its new state, or `None` when the
    /// coordinates are out of bounds.
    pub fn toggle(&mut self, x: u16, y: u16) -> Option<bool> {
        if !self.in_bounds(x, y) {
            return None;
        }
        let idx = self.index(x, y);
        self.cells[idx] = !self.cells[idx];
        Some(self.cells[idx])
    }

    pub fn clear(&mut self) {
        self.cells.fill(false);
    }

    /// Replaces every cell with an independent Bernoulli(density) draw.
    pub fn randomize<R: Rng>(&mut self, rng: &mut R, density: f64) {
        let density = density.clamp(0.0, 1.0);
        for cell in &mut self.cells {
            *cell = rng.gen_bool(density);
        }
    }

    /// Counts alive cells among the 8 toroidally wrapped neighbors.
    /// Edges connect to the opposite edge, so there are no boundary cases.
    pub fn live_neighbors(&self, x: u16, y: u16) -> u8 {
        let w = self.width as i32;
        let h = self.height as i32;
        let mut count = 0;
        for dy in -1..=1i32 {
            for dx in -1..=1i32 {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let nx = (x as i32 + dx).rem_euclid(w) as u16;
                let ny = (y as i32 + dy).rem_euclid(h) as u16;
                if self.cells[self.index(nx, ny)] {
                    count += 1;
                }
            }
        }
        count
    }

    /// Advances the whole grid by one generation.
    ///
    /// A live cell survives with 2 or 3 neighbors; a dead cell is born with
    /// exactly 3. The new generation is written to the back buffer and the
    /// buffers are swapped, so no allocation happens per step.
    pub fn step(&mut self) {
        for y in 0..self.height {
            for x in 0..self.width {
                let idx = self.index(x, y);
                let alive = self.cells[idx];
                let neighbors = self.live_neighbors(x, y);
                self.back_buffer[idx] = matches!((alive, neighbors), (true, 2) | (true, 3) | (false, 3));
            }
        }
        std::mem::swap(&mut self.cells, &mut self.back_buffer);
    }

    pub fn live_cells(&self) -> usize {
        self.cells.iter().filter(|c| **c).count()
    }

    /// Copies the grid out as nested 0/1 rows, the shape external callers
    /// (state queries, rendering) consume.
    pub fn rows(&self) -> Vec<Vec<u8>> {
        (0..self.height)
            .map(|y| {
                (0..self.width)
                    .map(|x| u8::from(self.cells[self.index(x, y)]))
                    .collect()
            })
            .collect()
    }
}
