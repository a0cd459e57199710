//! Job submission types.
//!
//! A job is one unit of requested work: fetch a target URL with the given
//! request options. Jobs are created by the controller, submitted once,
//! and immutable afterwards. The worker owns a job from admission until
//! its result is handed to the batch reporter.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Global counter for auto-generated job IDs.
static JOB_ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Opaque identifier for a job, chosen by the controller.
///
/// The worker never interprets the ID; it only carries it back on the
/// matching result record so the controller can correlate the two.
#[derive(Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct JobId(String);

impl JobId {
    /// Creates a job ID with the given string value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Creates a unique auto-generated job ID.
    ///
    /// The format is `job-{counter}` where counter is monotonically
    /// increasing. Suitable for callers that don't need meaningful IDs.
    pub fn auto() -> Self {
        let counter = JOB_ID_COUNTER.fetch_add(1, Ordering::Relaxed);
        Self(format!("job-{}", counter))
    }

    /// Returns the string value of this job ID.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "JobId({})", self.0)
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for JobId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for JobId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Request configuration carried with a job.
///
/// Opaque to the admission gate; only the HTTP client interprets it.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RequestOptions {
    /// Extra request headers as (name, value) pairs.
    pub headers: Vec<(String, String)>,
}

impl RequestOptions {
    /// Creates empty request options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a request header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// One unit of requested work: fetch `url` with `options`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Job {
    /// Controller-chosen identifier, echoed on the result record.
    pub id: JobId,

    /// Target resource locator.
    pub url: String,

    /// Request configuration, passed through to the HTTP client.
    pub options: RequestOptions,
}

impl Job {
    /// Creates a job with default request options.
    pub fn new(id: JobId, url: impl Into<String>) -> Self {
        Self {
            id,
            url: url.into(),
            options: RequestOptions::default(),
        }
    }

    /// Creates a job with explicit request options.
    pub fn with_options(id: JobId, url: impl Into<String>, options: RequestOptions) -> Self {
        Self {
            id,
            url: url.into(),
            options,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_id_new() {
        let id = JobId::new("tile-42");
        assert_eq!(id.as_str(), "tile-42");
    }

    #[test]
    fn test_job_id_auto_is_unique() {
        let id1 = JobId::auto();
        let id2 = JobId::auto();
        assert_ne!(id1, id2);
        assert!(id1.as_str().starts_with("job-"));
    }

    #[test]
    fn test_job_id_equality() {
        assert_eq!(JobId::new("a"), JobId::new("a"));
        assert_ne!(JobId::new("a"), JobId::new("b"));
    }

    #[test]
    fn test_job_id_display() {
        let id = JobId::new("my-job-123");
        assert_eq!(format!("{}", id), "my-job-123");
    }

    #[test]
    fn test_job_id_from_str() {
        let id: JobId = "from-str".into();
        assert_eq!(id.as_str(), "from-str");

        let id: JobId = String::from("from-string").into();
        assert_eq!(id.as_str(), "from-string");
    }

    #[test]
    fn test_request_options_builder() {
        let options = RequestOptions::new()
            .with_header("Accept", "application/octet-stream")
            .with_header("X-Session", "abc");

        assert_eq!(options.headers.len(), 2);
        assert_eq!(options.headers[0].0, "Accept");
        assert_eq!(options.headers[1].1, "abc");
    }

    #[test]
    fn test_job_new_has_empty_options() {
        let job = Job::new(JobId::new("j1"), "https://example.com/a.bin");
        assert_eq!(job.url, "https://example.com/a.bin");
        assert!(job.options.headers.is_empty());
    }

    #[test]
    fn test_job_serde_round_trip() {
        let job = Job::with_options(
            JobId::new("j1"),
            "https://example.com/a.bin",
            RequestOptions::new().with_header("Accept", "*/*"),
        );

        let json = serde_json::to_string(&job).unwrap();
        let back: Job = serde_json::from_str(&json).unwrap();

        assert_eq!(back.id, job.id);
        assert_eq!(back.url, job.url);
        assert_eq!(back.options.headers, job.options.headers);
    }
}
