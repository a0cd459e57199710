//! Boundary messages between controller and worker.
//!
//! This module defines the message types used for communication between
//! the controlling process and the fetch worker via channels.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────┐        Job (one per submission)        ┌──────────────┐
//! │ Controller │ ─────────────────────────────────────► │ Fetch Worker │
//! │            │ ◄───────────────────────────────────── │              │
//! └────────────┘   WorkerEvent::Support (once, first)   └──────────────┘
//!                  WorkerEvent::Results (one per flush)
//! ```
//!
//! Job submissions are never batched; results always are, one
//! [`WorkerEvent::Results`] message per flush tick. Everything here is
//! serde-serializable so the boundary can cross a process edge unchanged.

use crate::result::FetchResult;
use serde::{Deserialize, Serialize};

/// Capability advertisement.
///
/// Emitted unsolicited, exactly once, before the worker accepts any job.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capability {
    /// Whether the network primitive is available in this context.
    pub fetch: bool,
}

/// Messages emitted by the worker.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkerEvent {
    /// Capability probe response; always the first message.
    Support(Capability),

    /// One flushed batch of completed results.
    ///
    /// Payload buffers are moved into the batch, not copied; the
    /// reporter's view of them is gone once the batch is sent.
    Results(Vec<FetchResult>),
}

impl WorkerEvent {
    /// Consumes the event, returning the batch if this is a results
    /// message.
    pub fn into_results(self) -> Option<Vec<FetchResult>> {
        match self {
            Self::Results(results) => Some(results),
            Self::Support(_) => None,
        }
    }
}
