//! Fetchpool CLI - submit a batch of URLs through the bounded fetch worker.
//!
//! This binary drives the fetchpool library end to end: it builds an HTTP
//! client, runs a worker, submits one job per URL, and prints results as
//! the worker's batches arrive.

use clap::Parser;
use fetchpool::logging;
use fetchpool::{
    FetchResult, FetchWorker, Job, JobId, ReqwestFetchClient, WorkerConfig, WorkerEvent,
};
use std::path::PathBuf;
use std::process;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::warn;

#[derive(Parser)]
#[command(name = "fetchpool")]
#[command(version = fetchpool::VERSION)]
#[command(about = "Fetch many URLs with bounded concurrency and batched results", long_about = None)]
struct Args {
    /// URLs to fetch
    #[arg(required = true)]
    urls: Vec<String>,

    /// Maximum simultaneously in-flight requests
    #[arg(long, default_value_t = fetchpool::DEFAULT_MAX_IN_FLIGHT)]
    max_in_flight: usize,

    /// Flush interval for result batches, in milliseconds
    #[arg(long, default_value_t = 1)]
    flush_interval_ms: u64,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,

    /// Directory for the log file (stderr only when omitted)
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Print each result as a JSON line instead of human-readable text
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let _logging_guard = match logging::init_logging(args.log_dir.as_deref()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Error initialising logging: {}", e);
            process::exit(1);
        }
    };

    // A client build failure puts the worker in degraded mode rather than
    // aborting: every job then reports "fetch is unavailable".
    let client = match ReqwestFetchClient::with_timeout(Duration::from_secs(args.timeout_secs)) {
        Ok(client) => Some(client),
        Err(e) => {
            warn!(error = %e, "HTTP client unavailable, running degraded");
            None
        }
    };

    let config = WorkerConfig {
        max_in_flight: args.max_in_flight.max(1),
        flush_interval: Duration::from_millis(args.flush_interval_ms.max(1)),
        ..WorkerConfig::default()
    };

    let (worker, job_tx, mut events_rx) = FetchWorker::new(config, client);
    let shutdown = CancellationToken::new();
    let worker_handle = tokio::spawn(worker.run(shutdown.clone()));

    let total = args.urls.len();
    for (index, url) in args.urls.iter().enumerate() {
        let job = Job::new(JobId::new(format!("job-{}", index)), url.clone());
        if job_tx.send(job).await.is_err() {
            eprintln!("Error: worker stopped accepting jobs");
            process::exit(1);
        }
    }

    let mut received = 0usize;
    let mut failed = 0usize;
    let mut batches = 0usize;

    while received < total {
        match events_rx.recv().await {
            Some(WorkerEvent::Support(capability)) => {
                if !capability.fetch {
                    eprintln!("Warning: fetch is unavailable; all jobs will fail");
                }
            }
            Some(WorkerEvent::Results(results)) => {
                batches += 1;
                for result in results {
                    received += 1;
                    if result.is_error() {
                        failed += 1;
                    }
                    print_result(&result, args.json);
                }
            }
            None => {
                eprintln!("Error: worker event channel closed early");
                process::exit(1);
            }
        }
    }

    println!(
        "{} results in {} batches ({} failed)",
        received, batches, failed
    );

    shutdown.cancel();
    let _ = worker_handle.await;

    if failed > 0 {
        process::exit(1);
    }
}

fn print_result(result: &FetchResult, json: bool) {
    if json {
        match serde_json::to_string(result) {
            Ok(line) => println!("{}", line),
            Err(e) => eprintln!("Error encoding result: {}", e),
        }
        return;
    }

    match result {
        FetchResult::Success { id, payload } => {
            println!("{}  {} bytes", id, payload.len());
        }
        FetchResult::NotFound { id } => {
            println!("{}  not found", id);
        }
        FetchResult::Failed { id, error } => {
            eprintln!("{}  error: {}", id, error);
        }
    }
}
