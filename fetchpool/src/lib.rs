//! Fetchpool - bounded-concurrency fetch execution with batched delivery.
//!
//! This library runs many network fetches on behalf of a controlling
//! process while guaranteeing that no more than a fixed number are in
//! flight at once, and delivers completed results back in periodic
//! batches instead of one message per completion.
//!
//! # High-Level API
//!
//! Most callers only need the [`worker`] module:
//!
//! ```ignore
//! use fetchpool::{FetchWorker, Job, JobId, ReqwestFetchClient, WorkerConfig, WorkerEvent};
//! use tokio_util::sync::CancellationToken;
//!
//! let client = ReqwestFetchClient::new().ok();
//! let (worker, job_tx, mut events_rx) = FetchWorker::new(WorkerConfig::default(), client);
//!
//! let shutdown = CancellationToken::new();
//! tokio::spawn(worker.run(shutdown.clone()));
//!
//! job_tx.send(Job::new(JobId::new("tile-1"), "https://example.com/tile-1.bin")).await?;
//!
//! while let Some(event) = events_rx.recv().await {
//!     match event {
//!         WorkerEvent::Support(capability) => { /* fetch available? */ }
//!         WorkerEvent::Results(batch) => { /* one message, many results */ }
//!     }
//! }
//! ```
//!
//! The pieces compose independently: [`gate::FetchGate`] bounds
//! admission, [`reporter::BatchReporter`] coalesces completions, and
//! [`client::FetchClient`] abstracts the HTTP stack for testing.

pub mod client;
pub mod config;
pub mod error;
pub mod gate;
pub mod job;
pub mod logging;
pub mod protocol;
pub mod reporter;
pub mod result;
pub mod worker;

pub use client::{FetchClient, FetchResponse, ReqwestFetchClient};
pub use config::{
    WorkerConfig, DEFAULT_FLUSH_INTERVAL, DEFAULT_JOB_CHANNEL_CAPACITY, DEFAULT_MAX_IN_FLIGHT,
};
pub use error::FetchError;
pub use gate::{FetchGate, GatePermit};
pub use job::{Job, JobId, RequestOptions};
pub use protocol::{Capability, WorkerEvent};
pub use reporter::BatchReporter;
pub use result::FetchResult;
pub use worker::{FetchWorker, FETCH_UNAVAILABLE};

/// Version of the fetchpool library and CLI.
///
/// Synchronized across all crates in the workspace and injected at
/// compile time from `Cargo.toml`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
