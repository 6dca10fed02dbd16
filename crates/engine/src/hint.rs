//! Background hint worker.
//!
//! Bridges the sync engine with a tokio runtime that runs feasibility scans
//! off the caller's thread. Each request carries a deep copy of the grid and
//! a generation number; results for anything but the latest generation are
//! dropped, so a new player action simply supersedes a scan in flight.

use log::{debug, trace};
use tokio::runtime::Runtime;
use tokio::sync::mpsc;

use crate::core::{find_possible_move, Grid};
use crate::types::SwapMove;

/// Scan a grid snapshot on the blocking pool
pub async fn scan(grid: Grid) -> Option<SwapMove> {
    tokio::task::spawn_blocking(move || find_possible_move(&grid))
        .await
        .ok()
        .flatten()
}

#[derive(Debug)]
struct HintRequest {
    generation: u64,
    grid: Grid,
}

/// Scan outcome for one generation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HintResult {
    pub generation: u64,
    pub hint: Option<SwapMove>,
}

/// Running worker instance.
pub struct HintWorker {
    _rt: Runtime,
    request_tx: mpsc::UnboundedSender<HintRequest>,
    result_rx: mpsc::UnboundedReceiver<HintResult>,
    generation: u64,
    in_flight: bool,
}

impl HintWorker {
    pub fn start() -> std::io::Result<Self> {
        let (request_tx, mut request_rx) = mpsc::unbounded_channel::<HintRequest>();
        let (result_tx, result_rx) = mpsc::unbounded_channel::<HintResult>();

        let rt = Runtime::new()?;
        rt.spawn(async move {
            while let Some(request) = request_rx.recv().await {
                let hint = scan(request.grid).await;
                let result = HintResult {
                    generation: request.generation,
                    hint,
                };
                if result_tx.send(result).is_err() {
                    break;
                }
            }
            debug!("hint worker stopped");
        });

        Ok(Self {
            _rt: rt,
            request_tx,
            result_rx,
            generation: 0,
            in_flight: false,
        })
    }

    /// Queue a scan of `grid`, superseding any earlier request
    pub fn request(&mut self, grid: &Grid) -> u64 {
        self.generation += 1;
        let request = HintRequest {
            generation: self.generation,
            grid: grid.clone(),
        };
        self.in_flight = self.request_tx.send(request).is_ok();
        trace!("hint scan requested (generation {})", self.generation);
        self.generation
    }

    /// Drop interest in whatever is in flight
    pub fn cancel(&mut self) {
        if self.in_flight {
            self.generation += 1;
            self.in_flight = false;
        }
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    fn accept(&mut self, result: HintResult) -> Option<HintResult> {
        if result.generation != self.generation {
            trace!("dropping stale hint (generation {})", result.generation);
            return None;
        }
        self.in_flight = false;
        Some(result)
    }

    /// Non-blocking poll for the current generation's result
    pub fn try_recv(&mut self) -> Option<HintResult> {
        while let Ok(result) = self.result_rx.try_recv() {
            if let Some(result) = self.accept(result) {
                return Some(result);
            }
        }
        None
    }

    /// Block until the current generation's result arrives.
    ///
    /// Returns `None` right away if nothing is in flight. Must not be called
    /// from inside an async context.
    pub fn wait(&mut self) -> Option<HintResult> {
        while self.in_flight {
            let result = self.result_rx.blocking_recv()?;
            if let Some(result) = self.accept(result) {
                return Some(result);
            }
        }
        None
    }
}
