//! Lockstep-parallel Conway's Game of Life (B3/S23) on a toroidal grid.
//!
//! A fixed set of workers each holds a full grid replica, computes the rows
//! it owns (row mod worker count), then reconciles via an all-to-all row
//! exchange so every replica ends each generation bit-identical.

pub mod config;
pub mod coordinator;
pub mod exchange;
pub mod grid;
pub mod partition;
pub mod render;
pub mod rules;
pub mod runtime;

pub use config::{ConfigError, SimConfig};
pub use coordinator::StepCoordinator;
pub use exchange::{ChannelCollective, Collective, ExchangeError, SerialCollective};
pub use grid::{GridSnapshot, ToroidalGrid};
pub use partition::{RowPartition, WorkerId};
pub use runtime::{SimError, run_animated, run_headless};
