//! Session input events.
//!
//! This module defines [`SessionEvent`], the closed set of inputs that
//! drive the [`crate::Session`] state machine.
//!
//! Events originate from three distinct sources:
//! - Transport notifications ([`TransportEvent`], wrapped as
//!   `SessionEvent::Transport`).
//! - View intents (connect, toggles, message/file submission).
//! - Async resolutions reported back by the runtime (connect/disconnect
//!   completions, upload timer ticks).

use vocalink_core::{FileDescriptor, TrackKind, TransportState};

/// Lifecycle and media notifications emitted by the transport client.
///
/// The transport pushes these in its own order; the session reducer is
/// responsible for making any interleaving safe.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    /// Transport lifecycle state changed.
    StateChanged {
        /// New transport-level state.
        state: TransportState,
    },

    /// A media track started.
    TrackStarted {
        /// Audio or video.
        kind: TrackKind,
        /// True for our own track, false for a remote participant's.
        local: bool,
        /// Whether the track started enabled.
        enabled: bool,
    },

    /// A media track stopped.
    TrackStopped {
        /// Audio or video.
        kind: TrackKind,
        /// True for our own track.
        local: bool,
    },

    /// A bot participant joined the session.
    BotConnected,

    /// A bot participant left the session.
    BotDisconnected,

    /// Speech-to-text result for the user's audio.
    UserTranscript {
        /// Transcribed text.
        text: String,
        /// True for a final result; interim results are display-only.
        is_final: bool,
    },

    /// Text output from the bot.
    BotText {
        /// Output text.
        text: String,
    },

    /// Voice activity: the user started speaking.
    UserStartedSpeaking,

    /// Voice activity: the user stopped speaking.
    UserStoppedSpeaking,

    /// The bot started generating a response.
    BotLlmStarted,

    /// The bot finished generating a response.
    BotLlmStopped,
}

/// Events processed by the Session state machine.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// Transport notification.
    Transport(TransportEvent),

    /// View intent: start a session.
    Connect,

    /// Runtime resolution of an earlier connect.
    ConnectResolved {
        /// Token of the connect attempt this resolves.
        epoch: u64,
        /// Session id on success, failure description otherwise.
        result: Result<Option<String>, String>,
    },

    /// View intent: end the session.
    Disconnect,

    /// Runtime resolution of an earlier disconnect.
    DisconnectResolved {
        /// Failure description if teardown itself failed.
        error: Option<String>,
    },

    /// View intent: toggle the local camera.
    ToggleCamera,

    /// View intent: toggle the local microphone.
    ToggleMicrophone,

    /// View intent: toggle screen sharing.
    ToggleScreenShare,

    /// View intent: toggle the mute flag.
    ToggleMute,

    /// View intent: send a typed message.
    SendMessage {
        /// Message text.
        text: String,
    },

    /// View intent: submit files for upload.
    SubmitFiles {
        /// Candidate files, validated independently.
        files: Vec<FileDescriptor>,
    },

    /// Runtime timer tick advancing one file's simulated progress.
    UploadTick {
        /// Id of the ticked file.
        file_id: String,
    },

    /// Runtime report that a file's upload failed.
    UploadFailed {
        /// Id of the failed file.
        file_id: String,
        /// Failure description.
        message: String,
    },

    /// View intent: remove a file, mid-upload included.
    DeleteFile {
        /// Id of the file to remove.
        file_id: String,
    },

    /// View intent: fetch analysis for a processed file.
    AnalyzeFile {
        /// Id of the file to analyze.
        file_id: String,
    },

    /// View intent: recompute analytics counters now.
    RefreshAnalytics,

    /// Periodic 1-second tick from the runtime.
    Tick,
}

/// Actions produced by the Session state machine for the runtime.
///
/// The session never performs I/O; each action names one side effect for
/// the runtime to execute.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionAction {
    /// Call the transport's async connect, tagged with the attempt token.
    StartConnect {
        /// Token to echo back in `ConnectResolved`.
        epoch: u64,
    },

    /// Call the transport's async disconnect.
    StartDisconnect,

    /// Enable or disable the local camera on the transport.
    EnableCam {
        /// Desired state.
        enabled: bool,
    },

    /// Enable or disable the local microphone on the transport.
    EnableMic {
        /// Desired state.
        enabled: bool,
    },

    /// Send a user message through the transport.
    SendUserMessage {
        /// Message text.
        text: String,
    },

    /// Start a simulated-progress timer for an accepted file.
    StartUploadTimer {
        /// Id of the accepted file.
        file_id: String,
    },

    /// Cancel a file's progress timer (completion, failure, or deletion).
    CancelUploadTimer {
        /// Id of the file whose timer must stop.
        file_id: String,
    },

    /// Surface validation rejections to the embedder.
    NotifyRejectedFiles {
        /// Rejected filenames with the rule each violated.
        reasons: Vec<String>,
    },

    /// Deliver analysis text (or the lookup error) to the embedder.
    DeliverAnalysis {
        /// Id of the analyzed file.
        file_id: String,
        /// Analysis text, or why it is unavailable.
        result: Result<String, String>,
    },

    /// State changed; the embedder should re-read its snapshot.
    Render,
}
