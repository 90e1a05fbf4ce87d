//! Derived session analytics.
//!
//! Counters computed from the other state machines, never authoritative on
//! their own: `refresh` recomputes message and file counts from the log and
//! tracker so the snapshot cannot drift from its sources. The view layer
//! compares consecutive snapshots to skip redundant renders, so equality
//! covers the derived counters and ignores the refresh timestamp.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::transcript::TranscriptLog;
use crate::upload::UploadTracker;

/// Snapshot of session-derived counters.
#[derive(Debug, Clone, Serialize)]
pub struct Analytics {
    /// Total entries in the transcript log.
    pub messages_count: usize,
    /// Files in the `Processed` terminal state.
    pub files_processed: usize,
    /// Whole seconds spent connected in the current session.
    pub connection_duration_secs: u64,
    /// Running mean of user-input to first-bot-text latency.
    pub average_response_time_ms: f64,
    /// Time of the last refresh.
    pub last_updated: DateTime<Utc>,
    #[serde(skip)]
    response_samples: u32,
}

/// Snapshots with identical derived counters compare equal; the refresh
/// timestamp is excluded so a refresh that changes nothing is observable
/// as "no change".
impl PartialEq for Analytics {
    fn eq(&self, other: &Self) -> bool {
        self.messages_count == other.messages_count
            && self.files_processed == other.files_processed
            && self.connection_duration_secs == other.connection_duration_secs
            && self.average_response_time_ms == other.average_response_time_ms
    }
}

impl Analytics {
    /// Create a zeroed snapshot stamped with `now`.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            messages_count: 0,
            files_processed: 0,
            connection_duration_secs: 0,
            average_response_time_ms: 0.0,
            last_updated: now,
            response_samples: 0,
        }
    }

    /// One second elapsed; duration advances only while connected.
    pub fn tick_second(&mut self, connected: bool) {
        if connected {
            self.connection_duration_secs += 1;
        }
    }

    /// A new connection started; the duration counter belongs to it.
    pub fn reset_duration(&mut self) {
        self.connection_duration_secs = 0;
    }

    /// Fold one response latency into the running mean.
    pub fn record_response_time(&mut self, millis: u64) {
        self.response_samples += 1;
        let n = f64::from(self.response_samples);
        #[allow(clippy::cast_precision_loss)]
        let sample = millis as f64;
        self.average_response_time_ms += (sample - self.average_response_time_ms) / n;
    }

    /// Recompute the derived counts from their sources and stamp the
    /// snapshot.
    pub fn refresh(&mut self, log: &TranscriptLog, uploads: &UploadTracker, now: DateTime<Utc>) {
        self.messages_count = log.len();
        self.files_processed = uploads.processed_count();
        self.last_updated = now;
    }

    /// Zero everything (session teardown).
    pub fn reset(&mut self, now: DateTime<Utc>) {
        *self = Self::new(now);
    }
}
