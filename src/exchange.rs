//! Blocking collectives between lockstep workers.
//!
//! The coordinator only sees the [`Collective`] trait, so its step logic is
//! independent of the transport. [`ChannelCollective`] is the in-process
//! transport: a full mpsc mesh plus a barrier delimiting generations.
//! [`SerialCollective`] is the single-worker endpoint where every collective
//! degenerates to a no-op.

use std::sync::mpsc::{Receiver, Sender, channel};
use std::sync::{Arc, Barrier};

use thiserror::Error;

use crate::grid::{Cell, ToroidalGrid};
use crate::partition::{RowPartition, WorkerId};

#[derive(Debug, Error)]
pub enum ExchangeError {
    /// A peer's channel endpoint is gone. The generation is invalid and the
    /// run must be restarted; there is no partial recovery.
    #[error("worker {worker} lost a peer during a collective")]
    PeerDisconnected { worker: usize },
    /// A peer hit a fatal error and broadcast an abort before exiting.
    #[error("worker {worker} received an abort from worker {peer}")]
    PeerAborted { worker: usize, peer: usize },
    /// A packet arrived that does not belong to the collective in progress.
    #[error("worker {worker} received an out-of-protocol packet")]
    Protocol { worker: usize },
}

enum Packet {
    Seed(Vec<Cell>),
    Row { index: usize, cells: Arc<[Cell]> },
    Control { go: bool },
    Abort { worker: usize },
}

/// Collective operations every worker participates in, in lockstep.
///
/// All three are blocking: no worker returns from a collective before every
/// worker has entered it. A worker that never arrives stalls the rest; only
/// an outright disconnect is surfaced, as a fatal [`ExchangeError`].
pub trait Collective: Send {
    fn worker(&self) -> WorkerId;

    fn worker_count(&self) -> usize;

    /// One-to-all broadcast of the initial cell matrix from `root`, so every
    /// worker starts from an identical seed.
    fn broadcast_seed(&mut self, root: WorkerId, cells: &mut Vec<Cell>)
    -> Result<(), ExchangeError>;

    /// All-to-all row exchange: each row's value at its owning worker
    /// overwrites every other worker's copy. On return the grids of all
    /// workers are bit-identical.
    fn exchange_rows(
        &mut self,
        grid: &mut ToroidalGrid,
        partition: &RowPartition,
    ) -> Result<(), ExchangeError>;

    /// One-to-all broadcast of a continue/stop decision from `root`.
    /// Returns the root's value on every worker. Blocking like the other
    /// collectives: no worker moves on until every worker holds the decision.
    fn broadcast_control(&mut self, root: WorkerId, go: bool) -> Result<bool, ExchangeError>;

    /// Best-effort abort announcement for a worker's fatal error path, so
    /// peers blocked in a collective fail instead of waiting on a worker
    /// that will never arrive. Never blocks and never fails.
    fn abort(&mut self);
}

/// Degenerate single-worker collective.
pub struct SerialCollective;

impl Collective for SerialCollective {
    fn worker(&self) -> WorkerId {
        WorkerId::new(0)
    }

    fn worker_count(&self) -> usize {
        1
    }

    fn broadcast_seed(
        &mut self,
        _root: WorkerId,
        _cells: &mut Vec<Cell>,
    ) -> Result<(), ExchangeError> {
        Ok(())
    }

    fn exchange_rows(
        &mut self,
        _grid: &mut ToroidalGrid,
        _partition: &RowPartition,
    ) -> Result<(), ExchangeError> {
        Ok(())
    }

    fn broadcast_control(&mut self, _root: WorkerId, go: bool) -> Result<bool, ExchangeError> {
        Ok(go)
    }

    fn abort(&mut self) {}
}

/// In-process collective endpoint: one inbox per worker, a clone of every
/// worker's sender, and a shared barrier.
pub struct ChannelCollective {
    worker: WorkerId,
    worker_count: usize,
    /// Senders to every other worker; the own slot is empty so that a
    /// worker's inbox disconnects once all its peers are gone.
    peers: Vec<Option<Sender<Packet>>>,
    inbox: Receiver<Packet>,
    barrier: Arc<Barrier>,
}

impl ChannelCollective {
    /// Build the full mesh for `worker_count` workers. Endpoint `i` is moved
    /// into the thread running worker `i`.
    pub fn connect(worker_count: usize) -> Vec<Self> {
        assert!(worker_count > 0, "worker count must be positive");
        let barrier = Arc::new(Barrier::new(worker_count));
        let (senders, receivers): (Vec<_>, Vec<_>) =
            (0..worker_count).map(|_| channel()).unzip();

        receivers
            .into_iter()
            .enumerate()
            .map(|(index, inbox)| {
                let mut peers: Vec<_> = senders.iter().cloned().map(Some).collect();
                peers[index] = None;
                Self {
                    worker: WorkerId::new(index),
                    worker_count,
                    peers,
                    inbox,
                    barrier: Arc::clone(&barrier),
                }
            })
            .collect()
    }

    fn send_to_peers(&self, packet: impl Fn() -> Packet) -> Result<(), ExchangeError> {
        for tx in self.peers.iter().flatten() {
            tx.send(packet()).map_err(|_| ExchangeError::PeerDisconnected {
                worker: self.worker.index(),
            })?;
        }
        Ok(())
    }

    fn recv(&self) -> Result<Packet, ExchangeError> {
        match self.inbox.recv() {
            Ok(Packet::Abort { worker }) => Err(ExchangeError::PeerAborted {
                worker: self.worker.index(),
                peer: worker,
            }),
            Ok(packet) => Ok(packet),
            Err(_) => Err(ExchangeError::PeerDisconnected {
                worker: self.worker.index(),
            }),
        }
    }
}

impl Collective for ChannelCollective {
    fn worker(&self) -> WorkerId {
        self.worker
    }

    fn worker_count(&self) -> usize {
        self.worker_count
    }

    fn broadcast_seed(
        &mut self,
        root: WorkerId,
        cells: &mut Vec<Cell>,
    ) -> Result<(), ExchangeError> {
        if self.worker == root {
            self.send_to_peers(|| Packet::Seed(cells.clone()))?;
        } else {
            match self.recv()? {
                Packet::Seed(seed) => *cells = seed,
                _ => {
                    return Err(ExchangeError::Protocol {
                        worker: self.worker.index(),
                    });
                }
            }
        }
        self.barrier.wait();
        Ok(())
    }

    fn exchange_rows(
        &mut self,
        grid: &mut ToroidalGrid,
        partition: &RowPartition,
    ) -> Result<(), ExchangeError> {
        let size = grid.size();
        let mut expected = 0usize;

        for row in 0..size {
            if partition.owner_of(row) == self.worker {
                // One copy per row, shared across all peers.
                let cells: Arc<[Cell]> = Arc::from(grid.row(row));
                self.send_to_peers(|| Packet::Row {
                    index: row,
                    cells: Arc::clone(&cells),
                })?;
            } else {
                expected += 1;
            }
        }

        for _ in 0..expected {
            match self.recv()? {
                Packet::Row { index, cells } => grid.set_row(index, &cells),
                _ => {
                    return Err(ExchangeError::Protocol {
                        worker: self.worker.index(),
                    });
                }
            }
        }

        // No worker may start the next generation while a peer is still
        // draining this one; otherwise its fresh row packets would be
        // consumed as this generation's.
        self.barrier.wait();
        Ok(())
    }

    fn broadcast_control(&mut self, root: WorkerId, go: bool) -> Result<bool, ExchangeError> {
        let decision = if self.worker == root {
            self.send_to_peers(|| Packet::Control { go })?;
            go
        } else {
            match self.recv()? {
                Packet::Control { go } => go,
                _ => {
                    return Err(ExchangeError::Protocol {
                        worker: self.worker.index(),
                    });
                }
            }
        };
        // Delimit the generation exactly as exchange_rows does. Without this
        // a worker holding the decision early could start the next
        // generation's row sends while a peer is still waiting here, and
        // that peer would pull a row packet as its control message.
        self.barrier.wait();
        Ok(decision)
    }

    fn abort(&mut self) {
        for tx in self.peers.iter().flatten() {
            let _ = tx.send(Packet::Abort {
                worker: self.worker.index(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ChannelCollective, Collective};
    use crate::grid::{ALIVE, DEAD};
    use crate::partition::WorkerId;
    use std::thread;

    #[test]
    fn seed_broadcast_reaches_every_worker() {
        let endpoints = ChannelCollective::connect(3);
        let seed = vec![ALIVE, DEAD, ALIVE, DEAD, ALIVE, DEAD, ALIVE, DEAD, ALIVE];

        thread::scope(|scope| {
            for mut endpoint in endpoints {
                let root_seed = seed.clone();
                scope.spawn(move || {
                    let mut cells = if endpoint.worker() == WorkerId::new(0) {
                        root_seed.clone()
                    } else {
                        vec![DEAD; root_seed.len()]
                    };
                    endpoint
                        .broadcast_seed(WorkerId::new(0), &mut cells)
                        .unwrap();
                    assert_eq!(cells, root_seed);
                });
            }
        });
    }

    #[test]
    fn control_broadcast_propagates_stop() {
        let endpoints = ChannelCollective::connect(4);

        thread::scope(|scope| {
            for mut endpoint in endpoints {
                scope.spawn(move || {
                    let go = endpoint.broadcast_control(WorkerId::new(0), false).unwrap();
                    assert!(!go);
                });
            }
        });
    }

    #[test]
    fn abort_unblocks_a_waiting_peer() {
        use super::ExchangeError;

        let mut endpoints = ChannelCollective::connect(2);
        let mut waiting = endpoints.pop().unwrap();
        let mut dying = endpoints.pop().unwrap();

        let waiter = thread::spawn(move || waiting.broadcast_control(WorkerId::new(0), true));
        dying.abort();

        let result = waiter.join().unwrap();
        assert!(matches!(
            result,
            Err(ExchangeError::PeerAborted { worker: 1, peer: 0 })
        ));
    }
}
