//! The fetch worker daemon.
//!
//! The [`FetchWorker`] is a long-running background service that:
//! - Advertises its fetch capability once at startup
//! - Receives job submissions via a channel
//! - Pushes each fetch through the bounded admission gate
//! - Classifies completions and hands them to the batch reporter
//!
//! # Architecture
//!
//! ```text
//! ┌────────────┐   Job    ┌─────────────────────────────────────────┐
//! │ Controller │ ───────► │               FetchWorker                │
//! └────────────┘          │                                          │
//!       ▲                 │  job ──► FetchGate ──► FetchClient       │
//!       │                 │              │                           │
//!       │                 │              ▼ classify                  │
//!       │                 │         BatchReporter                    │
//!       └──────────────── │              │ flush tick                │
//!     WorkerEvent         └──────────────┼───────────────────────────┘
//!     (support, results)                 ▼
//! ```
//!
//! # Example
//!
//! ```ignore
//! use fetchpool::{FetchWorker, Job, JobId, ReqwestFetchClient, WorkerConfig};
//! use tokio_util::sync::CancellationToken;
//!
//! let client = ReqwestFetchClient::new().ok();
//! let (worker, job_tx, mut events_rx) = FetchWorker::new(WorkerConfig::default(), client);
//!
//! let shutdown = CancellationToken::new();
//! tokio::spawn(worker.run(shutdown.clone()));
//!
//! job_tx.send(Job::new(JobId::new("j1"), "https://example.com/a.bin")).await?;
//! while let Some(event) = events_rx.recv().await { /* ... */ }
//! ```

use crate::client::FetchClient;
use crate::config::WorkerConfig;
use crate::gate::FetchGate;
use crate::job::Job;
use crate::protocol::{Capability, WorkerEvent};
use crate::reporter::BatchReporter;
use crate::result::FetchResult;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Error string returned for every job when the network primitive is
/// unavailable.
pub const FETCH_UNAVAILABLE: &str = "fetch is unavailable";

/// The fetch worker daemon.
///
/// Owns the admission gate and the batch reporter, and receives jobs
/// from the controller via channel. Runs as a long-lived background
/// task.
///
/// A worker created without a client runs in degraded mode: it still
/// advertises its (missing) capability, then answers every submission
/// with an immediate single-result error batch, bypassing gate and
/// reporter entirely.
pub struct FetchWorker<C: FetchClient> {
    /// HTTP client, absent when the network primitive is unavailable.
    client: Option<Arc<C>>,

    /// Bounded admission gate.
    gate: Arc<FetchGate>,

    /// Batched result delivery.
    reporter: BatchReporter,

    /// Channel receiver for job submissions.
    job_rx: mpsc::Receiver<Job>,

    /// Channel sender for outgoing worker events.
    events_tx: mpsc::UnboundedSender<WorkerEvent>,
}

impl<C: FetchClient + 'static> FetchWorker<C> {
    /// Creates a worker with its submission and event channels.
    ///
    /// Pass `None` for the client when the network primitive is
    /// unavailable in this execution context.
    ///
    /// # Returns
    ///
    /// The worker, the job submission sender, and the event receiver.
    pub fn new(
        config: WorkerConfig,
        client: Option<C>,
    ) -> (
        Self,
        mpsc::Sender<Job>,
        mpsc::UnboundedReceiver<WorkerEvent>,
    ) {
        let (job_tx, job_rx) = mpsc::channel(config.job_channel_capacity);
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        let worker = Self {
            client: client.map(Arc::new),
            gate: Arc::new(FetchGate::new(config.max_in_flight)),
            reporter: BatchReporter::new(config.flush_interval, events_tx.clone()),
            job_rx,
            events_tx,
        };

        (worker, job_tx, events_rx)
    }

    /// Returns a handle to the admission gate, for observability.
    pub fn gate(&self) -> Arc<FetchGate> {
        Arc::clone(&self.gate)
    }

    /// Runs the worker until shutdown is signalled or the job channel
    /// closes.
    ///
    /// The capability message is emitted exactly once, before the first
    /// job is accepted. Shutdown stops admission of new jobs; fetches
    /// already in flight run to completion and their results are still
    /// flushed.
    pub async fn run(self, shutdown: CancellationToken) {
        let Self {
            client,
            gate,
            reporter,
            mut job_rx,
            events_tx,
        } = self;

        let fetch_available = client.is_some();
        info!(
            fetch = fetch_available,
            max_in_flight = gate.max_in_flight(),
            "fetch worker starting"
        );
        let _ = events_tx.send(WorkerEvent::Support(Capability {
            fetch: fetch_available,
        }));

        loop {
            tokio::select! {
                biased;

                _ = shutdown.cancelled() => {
                    info!("fetch worker shutting down");
                    break;
                }

                job = job_rx.recv() => {
                    match job {
                        Some(job) => {
                            Self::handle_job(job, client.as_ref(), &gate, &reporter, &events_tx);
                        }
                        None => {
                            debug!("job channel closed");
                            break;
                        }
                    }
                }
            }
        }
    }

    /// Admits one job: bookkeeping first, then the fetch itself on a
    /// spawned task so the intake loop never blocks on the gate.
    fn handle_job(
        job: Job,
        client: Option<&Arc<C>>,
        gate: &Arc<FetchGate>,
        reporter: &BatchReporter,
        events_tx: &mpsc::UnboundedSender<WorkerEvent>,
    ) {
        let Job { id, url, options } = job;

        let Some(client) = client else {
            warn!(id = %id, url = %url, "job refused: fetch is unavailable");
            let result = FetchResult::Failed {
                id,
                error: FETCH_UNAVAILABLE.to_string(),
            };
            let _ = events_tx.send(WorkerEvent::Results(vec![result]));
            return;
        };

        debug!(id = %id, url = %url, "job accepted");
        reporter.job_started();

        let client = Arc::clone(client);
        let gate = Arc::clone(gate);
        let reporter = reporter.clone();

        tokio::spawn(async move {
            let outcome = gate.submit_fetch(client.as_ref(), &url, &options).await;
            let result = FetchResult::classify(id, &url, outcome);

            // Push before the decrement so a tick that observes zero
            // active jobs always finds this result already buffered.
            reporter.push(result);
            reporter.job_finished();
        });
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{FetchResponse, ReqwestFetchClient};
    use crate::error::FetchError;
    use crate::job::{JobId, RequestOptions};
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Mock client with per-URL canned outcomes.
    #[derive(Clone, Default)]
    struct MockFetchClient {
        responses: Arc<Mutex<HashMap<String, Result<FetchResponse, FetchError>>>>,
    }

    impl MockFetchClient {
        fn with_response(url: &str, response: Result<FetchResponse, FetchError>) -> Self {
            let mock = Self::default();
            mock.responses
                .lock()
                .unwrap()
                .insert(url.to_string(), response);
            mock
        }
    }

    impl FetchClient for MockFetchClient {
        async fn fetch(
            &self,
            url: &str,
            _options: &RequestOptions,
        ) -> Result<FetchResponse, FetchError> {
            self.responses
                .lock()
                .unwrap()
                .get(url)
                .cloned()
                .unwrap_or_else(|| Ok(FetchResponse::new(200, "ok")))
        }
    }

    fn test_config() -> WorkerConfig {
        WorkerConfig::new(4, Duration::from_millis(1))
    }

    async fn next_event(rx: &mut mpsc::UnboundedReceiver<WorkerEvent>) -> WorkerEvent {
        tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .expect("timed out waiting for worker event")
            .expect("event channel closed")
    }

    #[tokio::test]
    async fn test_capability_is_first_message() {
        let mock = MockFetchClient::default();
        let (worker, job_tx, mut events_rx) = FetchWorker::new(test_config(), Some(mock));

        let shutdown = CancellationToken::new();
        let handle = tokio::spawn(worker.run(shutdown.clone()));

        job_tx
            .send(Job::new(JobId::new("j1"), "http://example.com/a"))
            .await
            .unwrap();

        assert_eq!(
            next_event(&mut events_rx).await,
            WorkerEvent::Support(Capability { fetch: true })
        );

        shutdown.cancel();
        let _ = handle.await;
    }

    #[tokio::test]
    async fn test_successful_job_yields_payload_batch() {
        let mock = MockFetchClient::with_response(
            "http://example.com/a",
            Ok(FetchResponse::new(200, vec![1u8, 2, 3])),
        );
        let (worker, job_tx, mut events_rx) = FetchWorker::new(test_config(), Some(mock));

        let shutdown = CancellationToken::new();
        let handle = tokio::spawn(worker.run(shutdown.clone()));

        job_tx
            .send(Job::new(JobId::new("j1"), "http://example.com/a"))
            .await
            .unwrap();

        let _support = next_event(&mut events_rx).await;
        let batch = next_event(&mut events_rx).await.into_results().unwrap();

        assert_eq!(batch.len(), 1);
        match &batch[0] {
            FetchResult::Success { id, payload } => {
                assert_eq!(id.as_str(), "j1");
                assert_eq!(payload.as_ref(), &[1, 2, 3]);
            }
            other => panic!("expected Success, got {:?}", other),
        }

        shutdown.cancel();
        let _ = handle.await;
    }

    #[tokio::test]
    async fn test_not_found_yields_not_found_record() {
        let mock =
            MockFetchClient::with_response("http://example.com/a", Ok(FetchResponse::new(404, "")));
        let (worker, job_tx, mut events_rx) = FetchWorker::new(test_config(), Some(mock));

        let shutdown = CancellationToken::new();
        let handle = tokio::spawn(worker.run(shutdown.clone()));

        job_tx
            .send(Job::new(JobId::new("j1"), "http://example.com/a"))
            .await
            .unwrap();

        let _support = next_event(&mut events_rx).await;
        let batch = next_event(&mut events_rx).await.into_results().unwrap();

        assert!(batch[0].is_not_found());
        assert!(!batch[0].is_error());

        shutdown.cancel();
        let _ = handle.await;
    }

    #[tokio::test]
    async fn test_degraded_mode_reports_unavailable() {
        let (worker, job_tx, mut events_rx) =
            FetchWorker::<MockFetchClient>::new(test_config(), None);

        let shutdown = CancellationToken::new();
        let handle = tokio::spawn(worker.run(shutdown.clone()));

        assert_eq!(
            next_event(&mut events_rx).await,
            WorkerEvent::Support(Capability { fetch: false })
        );

        job_tx
            .send(Job::new(JobId::new("j1"), "http://example.com/a"))
            .await
            .unwrap();
        job_tx
            .send(Job::new(JobId::new("j2"), "http://example.com/b"))
            .await
            .unwrap();

        // One single-result error batch per job, no batching delay.
        for expected in ["j1", "j2"] {
            let batch = next_event(&mut events_rx).await.into_results().unwrap();
            assert_eq!(batch.len(), 1);
            match &batch[0] {
                FetchResult::Failed { id, error } => {
                    assert_eq!(id.as_str(), expected);
                    assert_eq!(error, FETCH_UNAVAILABLE);
                }
                other => panic!("expected Failed, got {:?}", other),
            }
        }

        shutdown.cancel();
        let _ = handle.await;
    }

    #[tokio::test]
    async fn test_degraded_mode_never_touches_gate() {
        let (worker, job_tx, mut events_rx) =
            FetchWorker::<MockFetchClient>::new(test_config(), None);
        let gate = worker.gate();

        let shutdown = CancellationToken::new();
        let handle = tokio::spawn(worker.run(shutdown.clone()));

        job_tx
            .send(Job::new(JobId::new("j1"), "http://example.com/a"))
            .await
            .unwrap();

        let _support = next_event(&mut events_rx).await;
        let _batch = next_event(&mut events_rx).await;

        assert_eq!(gate.in_flight(), 0);
        assert_eq!(gate.peak_in_flight(), 0);

        shutdown.cancel();
        let _ = handle.await;
    }

    #[tokio::test]
    async fn test_worker_builds_with_real_client_type() {
        // Type-level check that the reqwest client satisfies the worker
        // bounds; no network traffic.
        let client = ReqwestFetchClient::new().ok();
        let (_worker, _job_tx, _events_rx) = FetchWorker::new(WorkerConfig::default(), client);
    }
}
