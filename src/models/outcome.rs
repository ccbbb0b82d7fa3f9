//! Per-request outcome records

use crate::types::{is_success_status, OutcomeStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Result of one GET issued by one virtual user
///
/// `timestamp` is taken when the response completed (or failed), so it is
/// never earlier than dispatch time plus `latency`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestOutcome {
    /// Virtual user that issued the request
    pub vu: u32,

    /// Success / failure classification
    pub status: OutcomeStatus,

    /// HTTP status code, when a response was received
    pub http_status: Option<u16>,

    /// Wall-clock time from dispatch to full body or failure
    pub latency: Duration,

    /// Completion time
    pub timestamp: DateTime<Utc>,

    /// Size of the response body
    pub bytes_received: u64,

    /// Error description for failed requests
    pub error_message: Option<String>,
}

impl RequestOutcome {
    /// A response with a 2xx/3xx status
    pub fn success(vu: u32, http_status: u16, latency: Duration, bytes_received: u64) -> Self {
        Self {
            vu,
            status: OutcomeStatus::Success,
            http_status: Some(http_status),
            latency,
            timestamp: Utc::now(),
            bytes_received,
            error_message: None,
        }
    }

    /// A transport error or a response with a failing status
    pub fn failed<S: Into<String>>(vu: u32, http_status: Option<u16>, latency: Duration, error: S) -> Self {
        Self {
            vu,
            status: OutcomeStatus::Failed,
            http_status,
            latency,
            timestamp: Utc::now(),
            bytes_received: 0,
            error_message: Some(error.into()),
        }
    }

    /// No complete response within the request timeout
    pub fn timeout(vu: u32, latency: Duration) -> Self {
        Self {
            vu,
            status: OutcomeStatus::Timeout,
            http_status: None,
            latency,
            timestamp: Utc::now(),
            bytes_received: 0,
            error_message: Some(format!("Request timed out after {}ms", latency.as_millis())),
        }
    }

    /// Classify a received response by its status code
    pub fn from_response(vu: u32, http_status: u16, latency: Duration, bytes_received: u64) -> Self {
        if is_success_status(http_status) {
            Self::success(vu, http_status, latency, bytes_received)
        } else {
            Self {
                bytes_received,
                ..Self::failed(vu, Some(http_status), latency, format!("HTTP {}", http_status))
            }
        }
    }

    /// Check if this request counts as successful
    pub fn is_successful(&self) -> bool {
        self.status.is_success()
    }

    /// Latency in milliseconds
    pub fn latency_ms(&self) -> f64 {
        self.latency.as_secs_f64() * 1000.0
    }
}
