//! Dense toroidal grid with a wrap-replicated halo ring.
//!
//! The augmented buffer is an (N+2)x(N+2) copy of the grid whose outer ring
//! replicates the opposite edges, so `neighbor_sum` never branches on
//! wrap-around. Callers must rebuild the ring after mutating the cells and
//! before the next round of neighbor reads; during a step the ring is the
//! fixed previous-generation snapshot that next states are computed from.

use rand::RngCore;
use rand::SeedableRng;
use rand::rngs::StdRng;

pub type Cell = u8;
pub const DEAD: Cell = 0;
pub const ALIVE: Cell = 1;

pub struct ToroidalGrid {
    size: usize,
    cells: Vec<Cell>,
    augmented: Vec<Cell>,
}

impl ToroidalGrid {
    /// All-dead grid of side length `size`.
    pub fn new(size: usize) -> Self {
        assert!(size > 0, "grid size must be positive");
        let mut grid = Self {
            size,
            cells: vec![DEAD; size * size],
            augmented: vec![DEAD; (size + 2) * (size + 2)],
        };
        grid.rebuild_augmented();
        grid
    }

    /// Wrap an existing row-major cell matrix.
    pub fn from_cells(size: usize, cells: Vec<Cell>) -> Self {
        assert_eq!(cells.len(), size * size, "cell matrix must be size * size");
        let mut grid = Self {
            size,
            cells,
            augmented: vec![DEAD; (size + 2) * (size + 2)],
        };
        grid.rebuild_augmented();
        grid
    }

    /// Random initial state at the given live density.
    pub fn random(size: usize, seed: u64, density: f64) -> Self {
        Self::from_cells(size, random_cells(size, seed, density))
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn into_cells(self) -> Vec<Cell> {
        self.cells
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Cell {
        self.cells[row * self.size + col]
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, state: Cell) {
        self.cells[row * self.size + col] = state;
    }

    #[inline]
    pub fn row(&self, row: usize) -> &[Cell] {
        &self.cells[row * self.size..(row + 1) * self.size]
    }

    /// Overwrite one row of the cell matrix. The halo ring is not touched;
    /// rebuild it once the full grid is in its next-generation state.
    #[inline]
    pub fn set_row(&mut self, row: usize, cells: &[Cell]) {
        debug_assert_eq!(cells.len(), self.size);
        self.cells[row * self.size..(row + 1) * self.size].copy_from_slice(cells);
    }

    pub fn population(&self) -> u64 {
        self.cells.iter().map(|&c| c as u64).sum()
    }

    /// Sum of the 8 toroidally-wrapped neighbors of `(row, col)`.
    ///
    /// Reads only the augmented buffer, so the result reflects the grid as of
    /// the last `rebuild_augmented` call regardless of in-flight cell writes.
    #[inline(always)]
    pub fn neighbor_sum(&self, row: usize, col: usize) -> u8 {
        let stride = self.size + 2;
        // (row, col) sits at augmented (row + 1, col + 1); base is the
        // top-left corner of its 3x3 neighborhood.
        let base = row * stride + col;
        let a = &self.augmented;
        a[base]
            + a[base + 1]
            + a[base + 2]
            + a[base + stride]
            + a[base + stride + 2]
            + a[base + 2 * stride]
            + a[base + 2 * stride + 1]
            + a[base + 2 * stride + 2]
    }

    /// Rebuild the halo ring from the current cell matrix: interior mirrors
    /// the grid, row 0 <- last row, row N+1 <- first row, col 0 <- last col,
    /// col N+1 <- first col, corners wrap diagonally.
    pub fn rebuild_augmented(&mut self) {
        let n = self.size;
        let stride = n + 2;

        for row in 0..n {
            let dst = (row + 1) * stride + 1;
            self.augmented[dst..dst + n].copy_from_slice(&self.cells[row * n..(row + 1) * n]);
        }
        self.augmented[1..1 + n].copy_from_slice(&self.cells[(n - 1) * n..]);
        let bottom = (n + 1) * stride + 1;
        self.augmented[bottom..bottom + n].copy_from_slice(&self.cells[..n]);

        // Column wrap last: rows 0 and N+1 already hold wrapped data, so
        // copying their edge cells fills the diagonal corners too.
        for row in 0..stride {
            self.augmented[row * stride] = self.augmented[row * stride + n];
            self.augmented[row * stride + n + 1] = self.augmented[row * stride + 1];
        }
    }

    #[cfg(test)]
    pub(crate) fn augmented_at(&self, row: usize, col: usize) -> Cell {
        self.augmented[row * (self.size + 2) + col]
    }
}

/// Random row-major cell matrix at the given live density.
pub fn random_cells(size: usize, seed: u64, density: f64) -> Vec<Cell> {
    let mut rng = StdRng::seed_from_u64(seed);
    let threshold = (u64::MAX as f64 * density.clamp(0.0, 1.0)) as u64;
    (0..size * size)
        .map(|_| if rng.next_u64() <= threshold { ALIVE } else { DEAD })
        .collect()
}

/// A stable, fully-reconciled copy of the grid handed to the presentation
/// layer. Never reflects a partially updated generation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GridSnapshot {
    pub size: usize,
    pub generation: u64,
    pub cells: Vec<Cell>,
}

impl GridSnapshot {
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Cell {
        self.cells[row * self.size + col]
    }

    pub fn population(&self) -> u64 {
        self.cells.iter().map(|&c| c as u64).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::{ALIVE, Cell, ToroidalGrid, random_cells};

    fn naive_neighbor_sum(cells: &[Cell], n: usize, row: usize, col: usize) -> u8 {
        let mut sum = 0;
        for dr in [n - 1, 0, 1] {
            for dc in [n - 1, 0, 1] {
                if dr == 0 && dc == 0 {
                    continue;
                }
                sum += cells[((row + dr) % n) * n + ((col + dc) % n)];
            }
        }
        sum
    }

    #[test]
    fn neighbor_sum_matches_modulo_reference() {
        for (n, seed) in [(3usize, 0xA1u64), (4, 0xB2), (7, 0xC3), (16, 0xD4)] {
            let grid = ToroidalGrid::random(n, seed, 0.5);
            for row in 0..n {
                for col in 0..n {
                    assert_eq!(
                        grid.neighbor_sum(row, col),
                        naive_neighbor_sum(grid.cells(), n, row, col),
                        "mismatch at ({row},{col}) for n={n} seed={seed:#x}"
                    );
                }
            }
        }
    }

    #[test]
    fn augmented_ring_mirrors_wrapped_edges() {
        let n = 6;
        let grid = ToroidalGrid::random(n, 0x5EED, 0.4);

        for c in 0..n {
            assert_eq!(grid.augmented_at(0, c + 1), grid.get(n - 1, c));
            assert_eq!(grid.augmented_at(n + 1, c + 1), grid.get(0, c));
        }
        for r in 0..n {
            assert_eq!(grid.augmented_at(r + 1, 0), grid.get(r, n - 1));
            assert_eq!(grid.augmented_at(r + 1, n + 1), grid.get(r, 0));
        }
        assert_eq!(grid.augmented_at(0, 0), grid.get(n - 1, n - 1));
        assert_eq!(grid.augmented_at(0, n + 1), grid.get(n - 1, 0));
        assert_eq!(grid.augmented_at(n + 1, 0), grid.get(0, n - 1));
        assert_eq!(grid.augmented_at(n + 1, n + 1), grid.get(0, 0));
    }

    #[test]
    fn rebuild_tracks_cell_mutation() {
        let mut grid = ToroidalGrid::new(4);
        grid.set(0, 0, ALIVE);
        grid.set(3, 3, ALIVE);
        grid.rebuild_augmented();

        // (0,0) and (3,3) are diagonal torus neighbors.
        assert_eq!(grid.neighbor_sum(0, 0), 1);
        assert_eq!(grid.neighbor_sum(3, 3), 1);
        assert_eq!(grid.neighbor_sum(1, 1), 1);
        assert_eq!(grid.neighbor_sum(2, 2), 1);
    }

    #[test]
    fn density_extremes() {
        assert!(random_cells(8, 1, 1.0).iter().all(|&c| c == ALIVE));
        // threshold 0 still admits an exact-zero draw
        assert!(random_cells(8, 1, 0.0).iter().map(|&c| c as u32).sum::<u32>() <= 1);
    }
}
