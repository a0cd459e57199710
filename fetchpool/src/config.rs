//! Worker configuration.
//!
//! Two knobs matter: the in-flight ceiling and the flush interval. The
//! rest is channel plumbing with sensible defaults.

use std::time::Duration;

// =============================================================================
// Configuration Constants
// =============================================================================

/// Default ceiling on simultaneously in-flight fetches.
pub const DEFAULT_MAX_IN_FLIGHT: usize = 200;

/// Default interval between result flush ticks.
///
/// Deliberately short: the workload is bursts of many small completions,
/// and the tick exists to coalesce them, not to rate-limit delivery.
pub const DEFAULT_FLUSH_INTERVAL: Duration = Duration::from_millis(1);

/// Default job submission channel capacity.
pub const DEFAULT_JOB_CHANNEL_CAPACITY: usize = 1024;

// =============================================================================
// Worker Configuration
// =============================================================================

/// Configuration for the fetch worker.
#[derive(Clone, Debug)]
pub struct WorkerConfig {
    /// Maximum number of simultaneously in-flight fetches.
    ///
    /// Submissions beyond this ceiling park in a FIFO queue until a slot
    /// frees.
    pub max_in_flight: usize,

    /// Interval between result flush ticks.
    pub flush_interval: Duration,

    /// Capacity of the job submission channel.
    pub job_channel_capacity: usize,
}

impl WorkerConfig {
    /// Creates a configuration with the given ceiling and flush interval,
    /// defaults elsewhere.
    pub fn new(max_in_flight: usize, flush_interval: Duration) -> Self {
        Self {
            max_in_flight,
            flush_interval,
            ..Self::default()
        }
    }
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            max_in_flight: DEFAULT_MAX_IN_FLIGHT,
            flush_interval: DEFAULT_FLUSH_INTERVAL,
            job_channel_capacity: DEFAULT_JOB_CHANNEL_CAPACITY,
        }
    }
}
