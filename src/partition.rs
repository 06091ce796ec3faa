//! Row-based domain decomposition across workers.

use std::fmt;

/// Identity of one participating worker, in `[0, worker_count)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WorkerId(usize);

impl WorkerId {
    #[inline]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Static modulo assignment of grid rows to workers.
///
/// Stateless and identical on every worker, so ownership never needs to be
/// communicated; ownership does not change across generations.
#[derive(Clone, Copy, Debug)]
pub struct RowPartition {
    worker_count: usize,
}

impl RowPartition {
    pub fn new(worker_count: usize) -> Self {
        assert!(worker_count > 0, "worker count must be positive");
        Self { worker_count }
    }

    #[inline]
    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    #[inline]
    pub fn owner_of(&self, row: usize) -> WorkerId {
        WorkerId(row % self.worker_count)
    }

    /// Rows assigned to `worker` on a grid of side `grid_size`, ascending.
    pub fn rows_owned_by(&self, worker: WorkerId, grid_size: usize) -> impl Iterator<Item = usize> {
        let stride = self.worker_count;
        (worker.0..grid_size).step_by(stride)
    }

    #[inline]
    pub fn rows_per_worker(&self, grid_size: usize) -> usize {
        grid_size / self.worker_count
    }
}
