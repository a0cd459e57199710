//! Batched result delivery.
//!
//! Completions land in an unordered buffer; a short recurring tick drains
//! the buffer and forwards it as one message, then stops itself once no
//! jobs are active and nothing is buffered. Coalescing many small
//! completions into one delivery amortizes the per-message cost at the
//! controller boundary.
//!
//! # State machine
//!
//! ```text
//!            job_started() while idle
//!   ┌──────┐ ─────────────────────────► ┌─────────┐
//!   │ Idle │                            │ Ticking │──┐ every flush_interval:
//!   └──────┘ ◄───────────────────────── └─────────┘◄─┘ drain buffer, emit batch
//!            tick observes active == 0
//! ```
//!
//! The drain and the stop check happen under one lock hold, so a tick
//! that flushes the final batch and observes zero active jobs does both
//! in the same pass. The controller never needs an extra idle tick to
//! receive the last results.

use crate::protocol::WorkerEvent;
use crate::result::FetchResult;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, trace};

/// Shared reporter state.
///
/// Buffer, active-job count, and the ticking flag live behind a single
/// lock: one mutation path, independent of the gate's admission state.
#[derive(Debug, Default)]
struct ReporterState {
    /// Completed results awaiting the next flush. Unordered.
    buffer: Vec<FetchResult>,

    /// Jobs submitted but not yet completed.
    active_jobs: usize,

    /// Whether a flush task is currently running.
    ticking: bool,
}

/// Handle for recording job lifecycle events and buffering results.
///
/// Cheaply cloneable; all clones share one state. The flush task is
/// spawned on demand by [`job_started`](Self::job_started) and exits on
/// its own once it observes an idle worker.
#[derive(Clone)]
pub struct BatchReporter {
    state: Arc<Mutex<ReporterState>>,
    events_tx: mpsc::UnboundedSender<WorkerEvent>,
    flush_interval: Duration,
}

impl BatchReporter {
    /// Creates a reporter flushing to `events_tx` every `flush_interval`.
    ///
    /// # Panics
    ///
    /// Panics if `flush_interval` is zero.
    pub fn new(flush_interval: Duration, events_tx: mpsc::UnboundedSender<WorkerEvent>) -> Self {
        assert!(!flush_interval.is_zero(), "flush_interval must be > 0");

        Self {
            state: Arc::new(Mutex::new(ReporterState::default())),
            events_tx,
            flush_interval,
        }
    }

    /// Records a job entering the system, starting the flush tick if it
    /// is not already running.
    ///
    /// This is the only Idle → Ticking transition; an already-running
    /// tick is never restarted.
    pub fn job_started(&self) {
        let start_tick = {
            let mut state = self.state.lock().expect("reporter state lock poisoned");
            state.active_jobs += 1;
            if state.ticking {
                false
            } else {
                state.ticking = true;
                true
            }
        };

        if start_tick {
            trace!("flush tick starting");
            let reporter = self.clone();
            tokio::spawn(async move {
                reporter.run_flush_tick().await;
            });
        }
    }

    /// Buffers one completed result for the next flush.
    pub fn push(&self, result: FetchResult) {
        let mut state = self.state.lock().expect("reporter state lock poisoned");
        state.buffer.push(result);
    }

    /// Records a job leaving the system.
    pub fn job_finished(&self) {
        let mut state = self.state.lock().expect("reporter state lock poisoned");
        state.active_jobs = state.active_jobs.saturating_sub(1);
    }

    /// Returns the number of jobs submitted but not yet completed.
    pub fn active_jobs(&self) -> usize {
        self.state
            .lock()
            .expect("reporter state lock poisoned")
            .active_jobs
    }

    /// Returns the number of results awaiting the next flush.
    pub fn buffered(&self) -> usize {
        self.state
            .lock()
            .expect("reporter state lock poisoned")
            .buffer
            .len()
    }

    /// Returns true while a flush task is running.
    pub fn is_ticking(&self) -> bool {
        self.state
            .lock()
            .expect("reporter state lock poisoned")
            .ticking
    }

    /// The flush loop. Runs until it observes zero active jobs.
    async fn run_flush_tick(self) {
        let mut tick = tokio::time::interval(self.flush_interval);
        tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tick.tick().await;

            // Drain and stop-check under one lock hold: results pushed
            // before a job's final decrement are always part of the batch
            // the stopping tick delivers.
            let (batch, stop) = {
                let mut state = self.state.lock().expect("reporter state lock poisoned");
                let batch = std::mem::take(&mut state.buffer);
                let stop = state.active_jobs == 0;
                if stop {
                    state.ticking = false;
                }
                (batch, stop)
            };

            if !batch.is_empty() {
                debug!(results = batch.len(), "flushing result batch");
                let _ = self.events_tx.send(WorkerEvent::Results(batch));
            }

            if stop {
                trace!("flush tick stopped");
                break;
            }
        }
    }
}

impl std::fmt::Debug for BatchReporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock().expect("reporter state lock poisoned");
        f.debug_struct("BatchReporter")
            .field("active_jobs", &state.active_jobs)
            .field("buffered", &state.buffer.len())
            .field("ticking", &state.ticking)
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
