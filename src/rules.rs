//! Game of Life transition rule (B3/S23).

use crate::grid::{ALIVE, Cell, DEAD};

/// Next state of a cell given its current state and live-neighbor count.
///
/// Standard rule: a live cell survives with 2 or 3 neighbors, a dead cell is
/// born with exactly 3, everything else is dead.
#[inline(always)]
pub fn next_state(state: Cell, neighbors: u8) -> Cell {
    if neighbors == 3 || (state == ALIVE && neighbors == 2) {
        ALIVE
    } else {
        DEAD
    }
}

/// Precomputed (state, neighbor count) -> next state lookup.
///
/// The step loop computes each neighbor sum once and indexes this table,
/// instead of re-deriving the sum per rule branch.
pub struct RuleTable {
    table: [Cell; 18],
}

impl RuleTable {
    pub fn new() -> Self {
        let mut table = [DEAD; 18];
        for state in 0..2u8 {
            for neighbors in 0..9u8 {
                table[state as usize * 9 + neighbors as usize] = next_state(state, neighbors);
            }
        }
        Self { table }
    }

    #[inline(always)]
    pub fn lookup(&self, state: Cell, neighbors: u8) -> Cell {
        self.table[state as usize * 9 + neighbors as usize]
    }
}

impl Default for RuleTable {
    fn default() -> Self {
        Self::new()
    }
}
