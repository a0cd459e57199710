//! Error types for the fetch worker.
//!
//! Only transport-level failures are errors at this layer. A completed
//! HTTP exchange with a non-success status is still an `Ok` response;
//! status classification happens in the job completion handler, not here.

use thiserror::Error;

/// Errors raised by the underlying network call.
///
/// These represent a failure to complete an HTTP exchange at all. The
/// gate propagates them unchanged to its caller; the completion handler
/// is the only place they are converted into result records.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    /// The HTTP client could not be constructed
    #[error("failed to create HTTP client: {0}")]
    ClientBuild(String),

    /// The request failed before a response was received
    #[error("request failed: {0}")]
    Transport(String),

    /// A response arrived but its body could not be read
    #[error("failed to read response: {0}")]
    Body(String),
}
