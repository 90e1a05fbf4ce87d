//! Connection state reducer.
//!
//! Reconciles the transport's granular lifecycle states onto the local
//! four-valued [`Status`] and tracks bot participant presence. The mapping
//! in [`TransportState::status`] is the only place that ambiguity is
//! resolved; it is total (exhaustive match) and surjective.
//!
//! # State Machine
//!
//! ```text
//!                 initializing/initialized/
//!                 authenticating/connecting      connected/ready
//! ┌──────────────┐──────────────────────>┌────────────┐──────>┌───────────┐
//! │ Disconnected │                       │ Connecting │       │ Connected │
//! └──────────────┘<──────────────────────└────────────┘       └───────────┘
//!        ▲         disconnecting/disconnected   │                   │
//!        │                                      │ error             │
//!        └──────────────────────────────────────▼───────────────────┘
//!                                          ┌───────┐
//!                                          │ Error │
//!                                          └───────┘
//! ```

use serde::{Deserialize, Serialize};

/// Local connection status presented to the view layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// No session.
    #[default]
    Disconnected,
    /// Connect in progress (any transport setup phase).
    Connecting,
    /// Session established and usable.
    Connected,
    /// The last connect attempt or the session itself failed.
    Error,
}

/// Transport-level lifecycle state as emitted by the external client.
///
/// More granular than [`Status`]; every value maps to exactly one local
/// status via [`TransportState::status`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransportState {
    /// No transport session.
    Disconnected,
    /// Transport object is being set up.
    Initializing,
    /// Setup finished, not yet authenticated.
    Initialized,
    /// Credentials being exchanged.
    Authenticating,
    /// Media/signaling connection being established.
    Connecting,
    /// Signaling established.
    Connected,
    /// Media flowing; session fully usable.
    Ready,
    /// Teardown in progress.
    Disconnecting,
    /// Transport-level failure.
    Error,
}

impl TransportState {
    /// Total surjective mapping onto the local [`Status`].
    pub fn status(self) -> Status {
        match self {
            Self::Initializing | Self::Initialized | Self::Authenticating | Self::Connecting => {
                Status::Connecting
            },
            Self::Connected | Self::Ready => Status::Connected,
            Self::Disconnecting | Self::Disconnected => Status::Disconnected,
            Self::Error => Status::Error,
        }
    }
}

/// Connection state owned by the session reducer.
///
/// Mutated only by transport lifecycle events and explicit
/// connect/disconnect intents; the view layer reads snapshots.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConnectionState {
    /// Local status derived from transport lifecycle events.
    pub status: Status,
    /// Number of remote bot participants. Never negative.
    pub participant_count: u32,
    /// Opaque session identifier assigned by the transport, if any.
    pub session_id: Option<String>,
    /// Message from the last failed connect attempt, if any.
    pub error: Option<String>,
}

impl ConnectionState {
    /// Create the disconnected baseline state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a transport lifecycle event.
    ///
    /// The stale error message is cleared whenever the transport reports
    /// anything other than an error state.
    pub fn apply_transport_state(&mut self, state: TransportState) {
        self.status = state.status();
        if self.status != Status::Error {
            self.error = None;
        }
    }

    /// A bot participant joined. Independent of [`Status`] transitions.
    pub fn bot_connected(&mut self) {
        self.participant_count += 1;
    }

    /// A bot participant left.
    ///
    /// Clamped at zero: a stray disconnect before any connect must not
    /// drive the count negative.
    pub fn bot_disconnected(&mut self) {
        self.participant_count = self.participant_count.saturating_sub(1);
    }

    /// Record a rejected connect attempt.
    pub fn record_connect_failure(&mut self, message: impl Into<String>) {
        self.status = Status::Error;
        self.error = Some(message.into());
    }

    /// Reset to the disconnected baseline (session teardown).
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
