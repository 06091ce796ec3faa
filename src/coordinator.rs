//! Per-worker generation state machine.
//!
//! One `StepCoordinator` lives on each worker thread and drives the
//! Idle -> LocalCompute -> Exchange -> Reconciled -> Idle cycle. Every worker
//! holds a full private replica of the grid; replicas agree only at
//! generation boundaries, after the row exchange.

use crate::exchange::{Collective, ExchangeError};
use crate::grid::{Cell, GridSnapshot, ToroidalGrid};
use crate::partition::{RowPartition, WorkerId};
use crate::rules::RuleTable;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Idle,
    LocalCompute,
    Exchange,
    Reconciled,
}

pub struct StepCoordinator<C: Collective> {
    grid: ToroidalGrid,
    partition: RowPartition,
    rules: RuleTable,
    collective: C,
    generation: u64,
    phase: Phase,
    row_scratch: Vec<Cell>,
}

impl<C: Collective> StepCoordinator<C> {
    /// Wrap a seeded, already-synchronized grid replica. The partition is
    /// derived from the collective's worker count.
    pub fn new(grid: ToroidalGrid, collective: C) -> Self {
        let size = grid.size();
        Self {
            grid,
            partition: RowPartition::new(collective.worker_count()),
            rules: RuleTable::new(),
            collective,
            generation: 0,
            phase: Phase::Idle,
            row_scratch: vec![0; size],
        }
    }

    #[inline]
    pub fn worker(&self) -> WorkerId {
        self.collective.worker()
    }

    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[inline]
    pub fn grid(&self) -> &ToroidalGrid {
        &self.grid
    }

    #[inline]
    pub fn collective_mut(&mut self) -> &mut C {
        &mut self.collective
    }

    /// Advance one generation.
    ///
    /// LocalCompute reads neighbor sums from the augmented snapshot of the
    /// previous generation and writes next states into this worker's owned
    /// rows only; non-owned rows stay stale until Exchange overwrites them
    /// with their owners' values. Reconciled then rebuilds the augmented view
    /// from the now-identical grid. Each worker rebuilds redundantly from
    /// identical input, which is equivalent to a rebuild-once-and-broadcast.
    pub fn step(&mut self) -> Result<(), ExchangeError> {
        debug_assert_eq!(self.phase, Phase::Idle);
        let size = self.grid.size();

        self.phase = Phase::LocalCompute;
        for row in self.partition.rows_owned_by(self.worker(), size) {
            for col in 0..size {
                let neighbors = self.grid.neighbor_sum(row, col);
                self.row_scratch[col] = self.rules.lookup(self.grid.get(row, col), neighbors);
            }
            self.grid.set_row(row, &self.row_scratch);
        }

        self.phase = Phase::Exchange;
        self.collective.exchange_rows(&mut self.grid, &self.partition)?;

        self.phase = Phase::Reconciled;
        self.grid.rebuild_augmented();
        self.generation += 1;

        self.phase = Phase::Idle;
        Ok(())
    }

    /// Advance `count` generations.
    pub fn step_n(&mut self, count: u64) -> Result<(), ExchangeError> {
        for _ in 0..count {
            self.step()?;
        }
        Ok(())
    }

    /// Stable copy of the reconciled grid for the presentation layer.
    pub fn snapshot(&self) -> GridSnapshot {
        debug_assert_eq!(self.phase, Phase::Idle, "snapshot mid-step");
        GridSnapshot {
            size: self.grid.size(),
            generation: self.generation,
            cells: self.grid.cells().to_vec(),
        }
    }
}
