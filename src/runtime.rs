//! Worker spawning and run modes.
//!
//! Both run modes drive the identical per-generation path in
//! [`StepCoordinator`]: a fixed set of threads, one per [`WorkerId`], spawned
//! once and run in lockstep. Worker 0 seeds the random grid and broadcasts it
//! so every replica starts identical; in animated mode worker 0 also paces
//! generations to the frame interval and publishes snapshots.

use std::sync::mpsc::{SyncSender, TrySendError, sync_channel};
use std::thread;
use std::time::Instant;

use log::{info, warn};
use thiserror::Error;

use crate::config::{ConfigError, DEFAULT_HEADLESS_STEPS, SimConfig};
use crate::coordinator::StepCoordinator;
use crate::exchange::{ChannelCollective, Collective, ExchangeError};
use crate::grid::{DEAD, GridSnapshot, ToroidalGrid, random_cells};
use crate::partition::WorkerId;
use crate::render::Renderer;

#[derive(Debug, Error)]
pub enum SimError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Exchange(#[from] ExchangeError),
}

#[derive(Clone, Copy)]
enum RunMode {
    Headless(u64),
    Animated,
}

const ROOT: WorkerId = WorkerId::new(0);

/// Run a fixed number of generations and return the final snapshot.
pub fn run_headless(config: &SimConfig) -> Result<GridSnapshot, SimError> {
    let workers = config.validate()?;
    announce(workers);
    let steps = config.steps.unwrap_or(DEFAULT_HEADLESS_STEPS);

    let results = spawn_workers(config, workers, RunMode::Headless(steps));

    let mut snapshot = None;
    let mut failure = None;
    for result in results {
        match result {
            Ok(Some(finished)) => snapshot = Some(finished),
            Ok(None) => {}
            Err(err) => failure = failure.or(Some(err)),
        }
    }
    if let Some(err) = failure {
        return Err(err.into());
    }
    Ok(snapshot.expect("root worker returns the final snapshot"))
}

/// Run generations indefinitely, feeding reconciled snapshots to `renderer`
/// at the configured frame interval.
///
/// Renderer failures are logged and swallowed; they never reach the workers.
/// A slow renderer only drops frames, it cannot block a generation.
pub fn run_animated<R: Renderer>(config: &SimConfig, renderer: &mut R) -> Result<(), SimError> {
    let workers = config.validate()?;
    announce(workers);

    let (frame_tx, frame_rx) = sync_channel::<GridSnapshot>(1);
    let endpoints = ChannelCollective::connect(workers);

    let results = thread::scope(|scope| {
        let handles: Vec<_> = endpoints
            .into_iter()
            .enumerate()
            .map(|(index, collective)| {
                let frames = (index == ROOT.index()).then(|| frame_tx.clone());
                scope.spawn(move || worker_body(config, collective, RunMode::Animated, frames))
            })
            .collect();
        drop(frame_tx);

        for snapshot in frame_rx.iter() {
            if let Err(err) = renderer.frame(&snapshot) {
                warn!("renderer failure ignored: {err}");
            }
        }

        join_all(handles)
    });

    for result in results {
        result?;
    }
    Ok(())
}

fn announce(workers: usize) {
    if workers > 1 {
        info!("parallelizing across {workers} workers");
    } else {
        info!("running in serial mode");
    }
}

fn spawn_workers(
    config: &SimConfig,
    workers: usize,
    mode: RunMode,
) -> Vec<Result<Option<GridSnapshot>, ExchangeError>> {
    let endpoints = ChannelCollective::connect(workers);
    thread::scope(|scope| {
        let handles: Vec<_> = endpoints
            .into_iter()
            .map(|collective| scope.spawn(move || worker_body(config, collective, mode, None)))
            .collect();
        join_all(handles)
    })
}

fn join_all<'scope, T>(handles: Vec<thread::ScopedJoinHandle<'scope, T>>) -> Vec<T> {
    handles
        .into_iter()
        .map(|handle| {
            handle
                .join()
                .unwrap_or_else(|payload| std::panic::resume_unwind(payload))
        })
        .collect()
}

/// One worker's whole life: receive (or generate) the seed, then step
/// generations until the mode says stop.
///
/// On a fatal collective error the worker announces an abort before exiting,
/// so peers blocked in a collective fail too instead of waiting forever on a
/// worker that is gone.
fn worker_body(
    config: &SimConfig,
    mut collective: ChannelCollective,
    mode: RunMode,
    frames: Option<SyncSender<GridSnapshot>>,
) -> Result<Option<GridSnapshot>, ExchangeError> {
    let size = config.grid_size;
    let is_root = collective.worker() == ROOT;

    let mut cells = if is_root {
        random_cells(size, config.seed, config.density)
    } else {
        vec![DEAD; size * size]
    };
    if let Err(err) = collective.broadcast_seed(ROOT, &mut cells) {
        collective.abort();
        return Err(err);
    }

    let grid = ToroidalGrid::from_cells(size, cells);
    let mut coordinator = StepCoordinator::new(grid, collective);

    let result = run_generations(config, &mut coordinator, mode, frames);
    if result.is_err() {
        coordinator.collective_mut().abort();
    }
    result
}

/// The per-mode generation loop; both modes drive the identical step path.
fn run_generations(
    config: &SimConfig,
    coordinator: &mut StepCoordinator<ChannelCollective>,
    mode: RunMode,
    frames: Option<SyncSender<GridSnapshot>>,
) -> Result<Option<GridSnapshot>, ExchangeError> {
    let is_root = coordinator.worker() == ROOT;

    match mode {
        RunMode::Headless(steps) => {
            coordinator.step_n(steps)?;
            Ok(is_root.then(|| coordinator.snapshot()))
        }
        RunMode::Animated => {
            loop {
                let frame_start = Instant::now();
                coordinator.step()?;

                let mut go = true;
                if let Some(frames) = &frames {
                    match frames.try_send(coordinator.snapshot()) {
                        Ok(()) => {}
                        // Renderer behind; drop the frame rather than stall
                        // the generation.
                        Err(TrySendError::Full(_)) => {}
                        // Display closed; end the run collectively.
                        Err(TrySendError::Disconnected(_)) => go = false,
                    }
                    let elapsed = frame_start.elapsed();
                    if go && elapsed < config.frame_interval {
                        thread::sleep(config.frame_interval - elapsed);
                    }
                }

                if !coordinator.collective_mut().broadcast_control(ROOT, go)? {
                    return Ok(None);
                }
            }
        }
    }
}
