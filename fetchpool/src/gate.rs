//! Bounded admission gate for fetch execution.
//!
//! The gate guarantees that no more than a fixed number of fetches are
//! outstanding at once. Submissions beyond the ceiling park in a FIFO
//! queue and are admitted as earlier fetches complete.
//!
//! The budget is a counting semaphore rather than an explicit waiting
//! list: tokio's semaphore queues waiters fairly, so parked submissions
//! are admitted strictly in arrival order, and releasing a permit on
//! completion doubles as the "admit the next waiter" step. Queued
//! submissions cannot be reprioritized or cancelled.
//!
//! # Usage
//!
//! ```ignore
//! use fetchpool::gate::FetchGate;
//!
//! let gate = FetchGate::new(200);
//!
//! // Either fetch through the gate directly...
//! let response = gate.submit_fetch(&client, url, &options).await?;
//!
//! // ...or hold a raw slot around other bounded work.
//! let _permit = gate.acquire().await;
//! ```

use crate::client::{FetchClient, FetchResponse};
use crate::error::FetchError;
use crate::job::RequestOptions;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Admission-controlled executor for fetch calls.
///
/// Tracks in-flight and parked counts for observability; the counts are
/// advisory and the semaphore alone enforces the ceiling.
#[derive(Debug)]
pub struct FetchGate {
    /// Semaphore holding the concurrency budget.
    semaphore: Arc<Semaphore>,

    /// Ceiling the gate was created with.
    max_in_flight: usize,

    /// Current number of admitted fetches.
    in_flight: AtomicUsize,

    /// Peak admitted fetches observed (for tuning).
    peak_in_flight: AtomicUsize,

    /// Submissions currently parked waiting for a slot.
    waiting: AtomicUsize,
}

impl FetchGate {
    /// Creates a gate with the given in-flight ceiling.
    ///
    /// # Panics
    ///
    /// Panics if `max_in_flight` is 0.
    pub fn new(max_in_flight: usize) -> Self {
        assert!(max_in_flight > 0, "max_in_flight must be > 0");

        Self {
            semaphore: Arc::new(Semaphore::new(max_in_flight)),
            max_in_flight,
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
            waiting: AtomicUsize::new(0),
        }
    }

    /// Submits one fetch through the gate.
    ///
    /// Issues the underlying call immediately if budget is available,
    /// otherwise parks FIFO until a slot frees. Errors from the client
    /// are propagated unchanged; the slot is released on completion
    /// either way.
    pub async fn submit_fetch<C: FetchClient>(
        &self,
        client: &C,
        url: &str,
        options: &RequestOptions,
    ) -> Result<FetchResponse, FetchError> {
        let _permit = self.acquire().await;
        client.fetch(url, options).await
    }

    /// Acquires an execution slot, parking FIFO behind earlier
    /// submissions when the gate is full.
    ///
    /// The slot is released when the returned permit is dropped.
    pub async fn acquire(&self) -> GatePermit<'_> {
        let permit = match self.semaphore.clone().try_acquire_owned() {
            Ok(permit) => permit,
            Err(_) => {
                // At the ceiling: park in the semaphore's FIFO queue.
                self.waiting.fetch_add(1, Ordering::SeqCst);
                let permit = self
                    .semaphore
                    .clone()
                    .acquire_owned()
                    .await
                    .expect("gate semaphore closed unexpectedly");
                self.waiting.fetch_sub(1, Ordering::SeqCst);
                permit
            }
        };

        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.update_peak(current);

        GatePermit {
            _permit: permit,
            in_flight: &self.in_flight,
        }
    }

    /// Updates the peak counter if current exceeds it.
    fn update_peak(&self, current: usize) {
        let mut peak = self.peak_in_flight.load(Ordering::Relaxed);
        while current > peak {
            match self.peak_in_flight.compare_exchange_weak(
                peak,
                current,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => break,
                Err(p) => peak = p,
            }
        }
    }

    /// Returns the ceiling the gate was created with.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight
    }

    /// Returns the current number of admitted fetches.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Returns the peak number of admitted fetches observed.
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::Relaxed)
    }

    /// Returns the number of submissions parked waiting for a slot.
    pub fn waiting(&self) -> usize {
        self.waiting.load(Ordering::SeqCst)
    }

    /// Returns the number of free slots.
    pub fn available_permits(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// Resets the peak counter (useful for periodic stats).
    pub fn reset_peak(&self) {
        self.peak_in_flight.store(0, Ordering::Relaxed);
    }
}

/// A held execution slot.
///
/// While this permit is alive it counts against the gate's ceiling.
/// Dropping it releases the slot and admits the oldest parked waiter,
/// if any.
pub struct GatePermit<'a> {
    _permit: OwnedSemaphorePermit,
    in_flight: &'a AtomicUsize,
}

impl Drop for GatePermit<'_> {
    fn drop(&mut self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}
