//! Structured progress-event sink consumed by the retrieval core.
//!
//! The core emits activities at stage boundaries only; it never reads them
//! back. Implementations are fire-and-forget.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::info;

/// Activity type emitted by retrieval calls.
pub const ACTIVITY_RAG_RETRIEVAL: &str = "rag-retrieval";
/// Activity type emitted by ingestion paths.
pub const ACTIVITY_RAG_STORAGE: &str = "rag-storage";

/// Status of an activity event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityStatus {
    /// The stage has started and is in progress.
    Pending,
    /// The stage finished successfully.
    Complete,
    /// The stage finished with a degraded outcome.
    Warning,
    /// The stage failed.
    Error,
    /// Informational, no outcome implied.
    Info,
}

impl fmt::Display for ActivityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ActivityStatus::Pending => "pending",
            ActivityStatus::Complete => "complete",
            ActivityStatus::Warning => "warning",
            ActivityStatus::Error => "error",
            ActivityStatus::Info => "info",
        };
        write!(f, "{s}")
    }
}

/// A sink for progress events.
///
/// Implementations must be safe for concurrent use; the core may emit from
/// multiple in-flight requests against the same tracker.
pub trait ActivityTracker: Send + Sync {
    /// Record one event. No return value is consumed.
    fn add(&self, activity_type: &str, status: ActivityStatus, message: &str);
}

/// A tracker that discards all events.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTracker;

impl ActivityTracker for NoopTracker {
    fn add(&self, _activity_type: &str, _status: ActivityStatus, _message: &str) {}
}

/// A tracker that forwards events to the `tracing` subscriber.
///
/// Useful for deployments without a UI consuming activities.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingTracker;

impl ActivityTracker for TracingTracker {
    fn add(&self, activity_type: &str, status: ActivityStatus, message: &str) {
        info!(activity = activity_type, status = %status, message, "activity");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_display_matches_wire_values() {
        assert_eq!(ActivityStatus::Pending.to_string(), "pending");
        assert_eq!(ActivityStatus::Complete.to_string(), "complete");
        assert_eq!(ActivityStatus::Error.to_string(), "error");
    }

    #[test]
    fn status_serializes_lowercase() {
        let json = serde_json::to_string(&ActivityStatus::Warning).unwrap();
        assert_eq!(json, "\"warning\"");
    }
}
