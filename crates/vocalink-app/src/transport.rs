//! Transport boundary.
//!
//! [`Transport`] is the seam between the session layer and the external
//! media client. The runtime only calls these methods and never reaches
//! into transport internals; lifecycle and media notifications come back
//! through the event channel handed over at runtime construction.
//!
//! Protocol logic stays out of implementations: they send commands and
//! surface events, and the session state machine decides what they mean.

use async_trait::async_trait;
use thiserror::Error;

/// Transport errors.
///
/// These never cross into session state directly; the runtime converts
/// them into events (connect rejections, upload failures) or logs them.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection failed.
    #[error("connection failed: {0}")]
    Connection(String),

    /// A device or message control command failed.
    #[error("control command failed: {0}")]
    Control(String),
}

/// External media client boundary.
///
/// Implementations wrap a concrete signaling/media stack. All methods take
/// `&self`; implementations handle their own interior synchronization so
/// the runtime can issue commands from spawned tasks.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Establish the session.
    ///
    /// Returns the transport-assigned session id, if the backend exposes
    /// one.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Connection`] if the session could not be
    /// established.
    async fn connect(&self) -> Result<Option<String>, TransportError>;

    /// Tear the session down.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Connection`] if teardown failed; local
    /// state is reset regardless.
    async fn disconnect(&self) -> Result<(), TransportError>;

    /// Enable or disable the local camera.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Control`] if the device command failed.
    async fn enable_cam(&self, enabled: bool) -> Result<(), TransportError>;

    /// Enable or disable the local microphone.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Control`] if the device command failed.
    async fn enable_mic(&self, enabled: bool) -> Result<(), TransportError>;

    /// Send a typed user message to the assistant.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Control`] if the message could not be
    /// delivered.
    async fn send_user_message(&self, text: &str) -> Result<(), TransportError>;
}
