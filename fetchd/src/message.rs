//! Data structures passed between intake, pollers, executors and the result service.

use serde::Serialize;
use std::fmt;

/// Placeholder stored whenever an attempt produced no usable body text.
pub const SENTINEL_CONTENT: &str = "null";

/// A polling job accepted by intake.
///
/// # Fields
/// * `id` - Key allocated by the fetch store
/// * `url` - The URL fetched on every tick
/// * `interval` - Seconds between the end of one attempt and the start of the next
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Job {
    pub id: i64,
    pub url: String,
    pub interval: u64,
}

/// Classification of a single attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    Success,
    NotFound,
    ClientOrNetworkError,
    TooLarge,
    Other,
}

impl fmt::Display for StatusClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StatusClass::Success => "success",
            StatusClass::NotFound => "not found",
            StatusClass::ClientOrNetworkError => "client or network error",
            StatusClass::TooLarge => "body too large",
            StatusClass::Other => "unclassified status",
        };
        f.write_str(s)
    }
}

/// Normalized result of one attempt, consumed by the reporting step.
///
/// # Fields
/// * `class` - How the attempt ended
/// * `content` - Body text, or [`SENTINEL_CONTENT`]
/// * `elapsed` - Normalized latency in seconds, `0.0` on failure
/// * `message` - Human readable detail, used as the termination message on failure
#[derive(Debug, Clone, PartialEq)]
pub struct FetchOutcome {
    pub class: StatusClass,
    pub content: String,
    pub elapsed: f64,
    pub message: String,
}

impl FetchOutcome {
    pub fn is_success(&self) -> bool {
        self.class == StatusClass::Success
    }

    /// Builds the record submitted to the result reporter for the given job key.
    pub fn to_record(&self, key: i64) -> ResponseRecord {
        ResponseRecord {
            key,
            content: self.content.clone(),
            duration: self.elapsed,
        }
    }
}

/// Record handed to the result reporter.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseRecord {
    pub key: i64,
    pub content: String,
    pub duration: f64,
}

/// Reply of the result reporter to a submitted record.
///
/// `key` is `-1` whenever the record was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Acknowledgement {
    pub key: i64,
    pub accepted: bool,
    pub message: String,
}

impl Acknowledgement {
    pub fn accepted(key: i64, message: impl Into<String>) -> Self {
        Self {
            key,
            accepted: true,
            message: message.into(),
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            key: -1,
            accepted: false,
            message: message.into(),
        }
    }
}

/// Why a job's loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// An attempt ended with a non-success classification.
    Failed(StatusClass),
    /// The result reporter declined a successful attempt's record.
    Rejected,
    /// The halt timer fired.
    RequestTimeout,
    /// The job was cancelled through its handle.
    Cancelled,
}

/// The value a job's loop ends with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerminationSignal {
    pub reason: StopReason,
    pub message: String,
}

impl TerminationSignal {
    pub fn new(reason: StopReason, message: impl Into<String>) -> Self {
        Self {
            reason,
            message: message.into(),
        }
    }
}

impl fmt::Display for TerminationSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.reason {
            StopReason::Failed(class) => write!(f, "failed ({}): {}", class, self.message),
            StopReason::Rejected => write!(f, "rejected: {}", self.message),
            StopReason::RequestTimeout => write!(f, "request timeout: {}", self.message),
            StopReason::Cancelled => write!(f, "cancelled: {}", self.message),
        }
    }
}
