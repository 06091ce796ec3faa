//! Simulation configuration.
//!
//! One explicit object built at startup and passed to every component; the
//! row decomposition precondition (grid size divisible by worker count) is
//! checked here, once, before any worker spawns.

use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_GRID_SIZE: usize = 50;
pub const DEFAULT_SEED: u64 = 0x5EED_1234_ABCD_EF01;
pub const DEFAULT_DENSITY: f64 = 0.5;
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(10);
pub const DEFAULT_HEADLESS_STEPS: u64 = 100;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("grid size must be positive")]
    ZeroGridSize,
    #[error("worker count must be positive")]
    ZeroWorkers,
    #[error(
        "grid size {grid_size} is not evenly divisible by {workers} workers; use different values"
    )]
    IndivisibleGrid { grid_size: usize, workers: usize },
}

/// Configuration for one simulation run.
///
/// Use `SimConfig::default()` and override individual knobs via the builder
/// methods. `workers: None` derives the count from the execution environment
/// (physical cores).
#[derive(Clone, Debug)]
pub struct SimConfig {
    /// Side length of the square grid.
    pub grid_size: usize,
    /// Fixed worker count; `None` means auto-detect.
    pub workers: Option<usize>,
    /// RNG seed for the initial state, generated on worker 0 and broadcast.
    pub seed: u64,
    /// Initial live-cell density in `[0, 1]`.
    pub density: f64,
    /// Animation pacing; one generation per interval.
    pub frame_interval: Duration,
    /// Headless generation count; `None` means the default.
    pub steps: Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            grid_size: DEFAULT_GRID_SIZE,
            workers: None,
            seed: DEFAULT_SEED,
            density: DEFAULT_DENSITY,
            frame_interval: DEFAULT_FRAME_INTERVAL,
            steps: None,
        }
    }
}

impl SimConfig {
    pub fn grid_size(mut self, size: usize) -> Self {
        self.grid_size = size;
        self
    }

    pub fn workers(mut self, count: usize) -> Self {
        self.workers = Some(count);
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn density(mut self, density: f64) -> Self {
        self.density = density.clamp(0.0, 1.0);
        self
    }

    pub fn frame_interval(mut self, interval: Duration) -> Self {
        self.frame_interval = interval;
        self
    }

    pub fn steps(mut self, steps: u64) -> Self {
        self.steps = Some(steps);
        self
    }

    /// Worker count after auto-detection, before validation.
    pub fn resolved_workers(&self) -> usize {
        self.workers.unwrap_or_else(|| num_cpus::get_physical().max(1))
    }

    /// Validate the decomposition precondition and return the resolved worker
    /// count. Fatal on failure; every worker would otherwise have to detect
    /// the violation identically, so it is rejected before any spawns.
    pub fn validate(&self) -> Result<usize, ConfigError> {
        if self.grid_size == 0 {
            return Err(ConfigError::ZeroGridSize);
        }
        let workers = self.resolved_workers();
        if workers == 0 {
            return Err(ConfigError::ZeroWorkers);
        }
        if self.grid_size % workers != 0 {
            return Err(ConfigError::IndivisibleGrid {
                grid_size: self.grid_size,
                workers,
            });
        }
        Ok(workers)
    }
}
