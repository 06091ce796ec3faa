use toro_life::exchange::SerialCollective;
use toro_life::grid::{ALIVE, Cell, DEAD, ToroidalGrid};
use toro_life::StepCoordinator;

fn grid_with(size: usize, live: &[(usize, usize)]) -> ToroidalGrid {
    let mut grid = ToroidalGrid::new(size);
    for &(row, col) in live {
        grid.set(row, col, ALIVE);
    }
    grid.rebuild_augmented();
    grid
}

fn assert_alive(grid: &ToroidalGrid, cells: &[(usize, usize)]) {
    for &(row, col) in cells {
        assert_eq!(grid.get(row, col), ALIVE, "expected alive at ({row},{col})");
    }
}

/// One generation by explicit modulo-N indexing of the flat grid, no halo.
fn naive_step(cells: &[Cell], n: usize) -> Vec<Cell> {
    let mut next = vec![DEAD; n * n];
    for row in 0..n {
        for col in 0..n {
            let mut neighbors = 0u8;
            for dr in [n - 1, 0, 1] {
                for dc in [n - 1, 0, 1] {
                    if dr == 0 && dc == 0 {
                        continue;
                    }
                    neighbors += cells[((row + dr) % n) * n + ((col + dc) % n)];
                }
            }
            let alive = cells[row * n + col] == ALIVE;
            next[row * n + col] = if neighbors == 3 || (alive && neighbors == 2) {
                ALIVE
            } else {
                DEAD
            };
        }
    }
    next
}

#[test]
fn lone_cell_dies() {
    let grid = grid_with(5, &[(2, 2)]);
    let mut coordinator = StepCoordinator::new(grid, SerialCollective);
    coordinator.step().unwrap();
    assert_eq!(coordinator.grid().population(), 0);
}

#[test]
fn block_is_a_still_life() {
    let block = [(1, 1), (1, 2), (2, 1), (2, 2)];
    let grid = grid_with(6, &block);
    let mut coordinator = StepCoordinator::new(grid, SerialCollective);

    for _ in 0..10 {
        coordinator.step().unwrap();
        assert_eq!(coordinator.grid().population(), 4);
        assert_alive(coordinator.grid(), &block);
    }
}

#[test]
fn blinker_oscillates_with_period_two() {
    let horizontal = [(2, 1), (2, 2), (2, 3)];
    let vertical = [(1, 2), (2, 2), (3, 2)];
    let grid = grid_with(5, &horizontal);
    let mut coordinator = StepCoordinator::new(grid, SerialCollective);

    coordinator.step().unwrap();
    assert_eq!(coordinator.grid().population(), 3);
    assert_alive(coordinator.grid(), &vertical);

    coordinator.step().unwrap();
    assert_eq!(coordinator.grid().population(), 3);
    assert_alive(coordinator.grid(), &horizontal);
}

#[test]
fn glider_crosses_the_torus_edge() {
    // A glider launched near the boundary must wrap, not vanish.
    let glider = [(0, 1), (1, 2), (2, 0), (2, 1), (2, 2)];
    let grid = grid_with(8, &glider);
    let mut coordinator = StepCoordinator::new(grid, SerialCollective);

    // Gliders translate by (1, 1) every 4 generations; after 32 on an 8x8
    // torus the translation is a full lap back to the start.
    coordinator.step_n(32).unwrap();
    assert_eq!(coordinator.grid().population(), 5);
    assert_alive(coordinator.grid(), &glider);
}

#[test]
fn engine_matches_naive_modulo_reference() {
    for (size, seed) in [(6usize, 0x11u64), (9, 0x22), (12, 0x33)] {
        let grid = ToroidalGrid::random(size, seed, 0.45);
        let mut reference = grid.cells().to_vec();
        let mut coordinator = StepCoordinator::new(grid, SerialCollective);

        for generation in 1..=8u64 {
            coordinator.step().unwrap();
            reference = naive_step(&reference, size);
            assert_eq!(
                coordinator.grid().cells(),
                &reference[..],
                "divergence at generation {generation} for size {size} seed {seed:#x}"
            );
        }
    }
}
