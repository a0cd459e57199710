//! Completed fetch results and their classification.
//!
//! Every submitted job produces exactly one [`FetchResult`], which lives
//! in the reporter's buffer until a flush moves it (payload included,
//! no copy) into an outgoing batch.
//!
//! A not-found status is a legitimate empty outcome, not an error: the
//! controller can treat "resource absent" as a final answer instead of
//! retrying it like a transport failure.

use crate::client::FetchResponse;
use crate::error::FetchError;
use crate::job::JobId;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// The terminal outcome of one job.
///
/// Serializes untagged, so the wire shapes are `{id, payload}`,
/// `{id, error}` and bare `{id}` for not-found.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FetchResult {
    /// Fetch completed with a success status.
    Success {
        id: JobId,
        /// Binary payload, moved into the outgoing batch on flush.
        payload: Bytes,
    },

    /// Transport failure, non-success status, or an unavailable fetch
    /// primitive.
    Failed { id: JobId, error: String },

    /// The resource does not exist (HTTP 404).
    NotFound { id: JobId },
}

impl FetchResult {
    /// Classifies the outcome of one fetch.
    ///
    /// - success status: the body becomes the payload
    /// - 404: not-found, explicitly not an error
    /// - any other status, or a client error: an error record carrying a
    ///   best-effort message
    pub fn classify(id: JobId, url: &str, outcome: Result<FetchResponse, FetchError>) -> Self {
        match outcome {
            Ok(resp) if resp.is_success() => Self::Success {
                id,
                payload: resp.body,
            },
            Ok(resp) if resp.is_not_found() => Self::NotFound { id },
            Ok(resp) => Self::Failed {
                id,
                error: format!("HTTP {} from {}", resp.status, url),
            },
            Err(err) => {
                let message = err.to_string();
                let error = if message.is_empty() {
                    format!("failed request for {}", url)
                } else {
                    message
                };
                Self::Failed { id, error }
            }
        }
    }

    /// Returns the job ID this result belongs to.
    pub fn id(&self) -> &JobId {
        match self {
            Self::Success { id, .. } | Self::Failed { id, .. } | Self::NotFound { id } => id,
        }
    }

    /// Returns true for error records.
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    /// Returns true for not-found records.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id() -> JobId {
        JobId::new("j1")
    }

    #[test]
    fn test_classify_success_takes_body_as_payload() {
        let body = Bytes::from(vec![1u8, 2, 3]);
        let outcome = Ok(FetchResponse::new(200, body.clone()));

        let result = FetchResult::classify(id(), "http://example.com/a", outcome);

        match result {
            FetchResult::Success { payload, .. } => assert_eq!(payload, body),
            other => panic!("expected Success, got {:?}", other),
        }
    }

    #[test]
    fn test_classify_not_found_is_not_an_error() {
        let outcome = Ok(FetchResponse::new(404, "gone"));

        let result = FetchResult::classify(id(), "http://example.com/a", outcome);

        assert!(result.is_not_found());
        assert!(!result.is_error());
    }

    #[test]
    fn test_classify_other_status_is_error() {
        let outcome = Ok(FetchResponse::new(503, ""));

        let result = FetchResult::classify(id(), "http://example.com/a", outcome);

        match result {
            FetchResult::Failed { error, .. } => {
                assert_eq!(error, "HTTP 503 from http://example.com/a");
            }
            other => panic!("expected Failed, got {:?}", other),
        }
    }

    #[test]
    fn test_classify_transport_error_carries_message() {
        let outcome = Err(FetchError::Transport("connection refused".to_string()));

        let result = FetchResult::classify(id(), "http://example.com/a", outcome);

        match result {
            FetchResult::Failed { error, .. } => {
                assert_eq!(error, "request failed: connection refused");
            }
            other => panic!("expected Failed, got {:?}", other),
        }
    }

    #[test]
    fn test_id_accessor_covers_all_variants() {
        let success = FetchResult::Success {
            id: JobId::new("a"),
            payload: Bytes::new(),
        };
        let not_found = FetchResult::NotFound { id: JobId::new("b") };
        let failed = FetchResult::Failed {
            id: JobId::new("c"),
            error: "x".to_string(),
        };

        assert_eq!(success.id().as_str(), "a");
        assert_eq!(not_found.id().as_str(), "b");
        assert_eq!(failed.id().as_str(), "c");
    }

    #[test]
    fn test_serde_wire_shapes() {
        let success = FetchResult::Success {
            id: JobId::new("a"),
            payload: Bytes::from_static(&[7, 8]),
        };
        let value = serde_json::to_value(&success).unwrap();
        assert_eq!(value["id"], "a");
        assert_eq!(value["payload"], serde_json::json!([7, 8]));

        let failed = FetchResult::Failed {
            id: JobId::new("b"),
            error: "boom".to_string(),
        };
        let value = serde_json::to_value(&failed).unwrap();
        assert_eq!(value["error"], "boom");

        let not_found = FetchResult::NotFound { id: JobId::new("c") };
        let value = serde_json::to_value(&not_found).unwrap();
        assert_eq!(value, serde_json::json!({"id": "c"}));
    }

    #[test]
    fn test_serde_round_trip() {
        let results = vec![
            FetchResult::Success {
                id: JobId::new("a"),
                payload: Bytes::from_static(&[1, 2, 3]),
            },
            FetchResult::Failed {
                id: JobId::new("b"),
                error: "boom".to_string(),
            },
            FetchResult::NotFound { id: JobId::new("c") },
        ];

        let json = serde_json::to_string(&results).unwrap();
        let back: Vec<FetchResult> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, results);
    }
}
