//! Session state machine.
//!
//! This module defines the [`Session`] state machine, which reconciles
//! transport lifecycle events and view intents onto the local session
//! state, completely decoupled from I/O and transport mechanics.
//!
//! This is a pure state machine: it consumes [`crate::SessionEvent`] inputs
//! and produces [`crate::SessionAction`] instructions for the runtime to
//! execute. Wall-clock time is always passed in by the caller.
//!
//! # Responsibilities
//!
//! - Maps transport states onto the local connection status and tracks bot
//!   participant presence.
//! - Owns the transcript log, upload tracker, analytics counters, and
//!   media flags exclusively; nothing else mutates them.
//! - Tags every connect attempt with a generation token so a resolution
//!   from a superseded attempt cannot clobber current state.

use chrono::{DateTime, Utc};
use tracing::warn;
use vocalink_core::{
    Analytics, ConnectionState, Message, MessageKind, Status, TickOutcome, TranscriptLog,
    TransportState, UploadPolicy, UploadTracker, VideoState,
};

use crate::{SessionAction, SessionEvent, TransportEvent};

/// Session state machine.
///
/// Pure state machine that processes events and produces actions.
/// No I/O dependencies, fully testable without a runtime.
#[derive(Debug, Clone)]
pub struct Session {
    /// Connection status, participant count, session id.
    connection: ConnectionState,
    /// Append-only message log.
    transcript: TranscriptLog,
    /// Per-file upload state.
    uploads: UploadTracker,
    /// Derived counters.
    analytics: Analytics,
    /// Local and remote media flags.
    video: VideoState,
    /// Bot is generating a response.
    is_typing: bool,
    /// User voice activity detected.
    is_listening: bool,
    /// Generation token of the newest connect or disconnect intent.
    /// Resolutions carrying an older token are stale.
    epoch: u64,
    /// Set when a user message lands; consumed by the first bot text to
    /// derive response latency.
    awaiting_response_since: Option<DateTime<Utc>>,
}

impl Session {
    /// Create a new disconnected session with the default upload policy.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self::with_policy(UploadPolicy::default(), now)
    }

    /// Create a new disconnected session with an explicit upload policy.
    pub fn with_policy(policy: UploadPolicy, now: DateTime<Utc>) -> Self {
        Self {
            connection: ConnectionState::new(),
            transcript: TranscriptLog::new(),
            uploads: UploadTracker::new(policy),
            analytics: Analytics::new(now),
            video: VideoState::new(),
            is_typing: false,
            is_listening: false,
            epoch: 0,
            awaiting_response_since: None,
        }
    }

    /// Process an event and return actions.
    pub fn handle(&mut self, event: SessionEvent, now: DateTime<Utc>) -> Vec<SessionAction> {
        match event {
            SessionEvent::Transport(transport) => self.handle_transport(transport, now),
            SessionEvent::Connect => {
                self.epoch += 1;
                self.connection.apply_transport_state(TransportState::Connecting);
                vec![SessionAction::StartConnect { epoch: self.epoch }, SessionAction::Render]
            },
            SessionEvent::ConnectResolved { epoch, result } => {
                if epoch != self.epoch {
                    warn!(stale = epoch, current = self.epoch, "ignoring stale connect resolution");
                    return vec![];
                }
                match result {
                    Ok(session_id) => {
                        // Status stays Connecting; the transport's own
                        // state change drives the Connected transition.
                        self.connection.session_id = session_id;
                    },
                    Err(message) => self.connection.record_connect_failure(message),
                }
                vec![SessionAction::Render]
            },
            SessionEvent::Disconnect => {
                // Bumping the epoch invalidates any in-flight connect.
                self.epoch += 1;
                vec![SessionAction::StartDisconnect, SessionAction::Render]
            },
            SessionEvent::DisconnectResolved { error } => {
                if let Some(message) = error {
                    warn!(%message, "disconnect failed; resetting local state anyway");
                }
                self.teardown(now)
            },
            SessionEvent::ToggleCamera => {
                vec![SessionAction::EnableCam { enabled: !self.video.is_video_enabled }]
            },
            SessionEvent::ToggleMicrophone => {
                vec![SessionAction::EnableMic { enabled: !self.video.is_audio_enabled }]
            },
            SessionEvent::ToggleScreenShare => {
                self.video.is_screen_sharing = !self.video.is_screen_sharing;
                vec![SessionAction::Render]
            },
            SessionEvent::ToggleMute => {
                self.video.is_muted = !self.video.is_muted;
                vec![
                    SessionAction::EnableMic { enabled: !self.video.is_muted },
                    SessionAction::Render,
                ]
            },
            SessionEvent::SendMessage { text } => {
                self.transcript.append(Message::new(MessageKind::User, text.clone(), now));
                self.awaiting_response_since = Some(now);
                self.sync_analytics(now);
                vec![SessionAction::SendUserMessage { text }, SessionAction::Render]
            },
            SessionEvent::SubmitFiles { files } => {
                let outcome = self.uploads.submit(files, now);
                let mut actions: Vec<SessionAction> = outcome
                    .accepted
                    .into_iter()
                    .map(|file_id| SessionAction::StartUploadTimer { file_id })
                    .collect();
                if !outcome.rejected.is_empty() {
                    actions.push(SessionAction::NotifyRejectedFiles {
                        reasons: outcome
                            .rejected
                            .into_iter()
                            .map(|(name, error)| format!("{name}: {error}"))
                            .collect(),
                    });
                }
                actions.push(SessionAction::Render);
                actions
            },
            SessionEvent::UploadTick { file_id } => match self.uploads.advance(&file_id, now) {
                TickOutcome::Advanced(_) => vec![SessionAction::Render],
                TickOutcome::Completed => {
                    self.sync_analytics(now);
                    vec![SessionAction::CancelUploadTimer { file_id }, SessionAction::Render]
                },
                TickOutcome::Gone => vec![SessionAction::CancelUploadTimer { file_id }],
            },
            SessionEvent::UploadFailed { file_id, message } => {
                if self.uploads.fail(&file_id, message) {
                    vec![SessionAction::CancelUploadTimer { file_id }, SessionAction::Render]
                } else {
                    vec![]
                }
            },
            SessionEvent::DeleteFile { file_id } => {
                if self.uploads.delete(&file_id) {
                    self.sync_analytics(now);
                    vec![SessionAction::CancelUploadTimer { file_id }, SessionAction::Render]
                } else {
                    vec![]
                }
            },
            SessionEvent::AnalyzeFile { file_id } => {
                let result = self
                    .uploads
                    .analyze(&file_id)
                    .map(String::from)
                    .map_err(|error| error.to_string());
                vec![SessionAction::DeliverAnalysis { file_id, result }]
            },
            SessionEvent::RefreshAnalytics => {
                self.sync_analytics(now);
                vec![SessionAction::Render]
            },
            SessionEvent::Tick => {
                let connected = self.connection.status == Status::Connected;
                self.analytics.tick_second(connected);
                if connected { vec![SessionAction::Render] } else { vec![] }
            },
        }
    }

    fn handle_transport(
        &mut self,
        event: TransportEvent,
        now: DateTime<Utc>,
    ) -> Vec<SessionAction> {
        match event {
            TransportEvent::StateChanged { state } => {
                let was_connected = self.connection.status == Status::Connected;
                self.connection.apply_transport_state(state);
                if !was_connected && self.connection.status == Status::Connected {
                    // The duration counter belongs to the new connection.
                    self.analytics.reset_duration();
                }
                vec![SessionAction::Render]
            },
            TransportEvent::TrackStarted { kind, local, enabled } => {
                self.video.track_started(kind, local, enabled);
                vec![SessionAction::Render]
            },
            TransportEvent::TrackStopped { kind, local } => {
                self.video.track_stopped(kind, local);
                vec![SessionAction::Render]
            },
            TransportEvent::BotConnected => {
                self.connection.bot_connected();
                vec![SessionAction::Render]
            },
            TransportEvent::BotDisconnected => {
                self.connection.bot_disconnected();
                vec![SessionAction::Render]
            },
            TransportEvent::UserTranscript { text, is_final } => {
                if self.transcript.append_transcript(text, is_final, now).is_none() {
                    return vec![];
                }
                self.awaiting_response_since = Some(now);
                self.sync_analytics(now);
                vec![SessionAction::Render]
            },
            TransportEvent::BotText { text } => {
                self.transcript.append(Message::new(MessageKind::Bot, text, now));
                if let Some(since) = self.awaiting_response_since.take() {
                    let millis =
                        u64::try_from((now - since).num_milliseconds()).unwrap_or_default();
                    self.analytics.record_response_time(millis);
                }
                self.sync_analytics(now);
                vec![SessionAction::Render]
            },
            TransportEvent::UserStartedSpeaking => {
                self.is_listening = true;
                vec![SessionAction::Render]
            },
            TransportEvent::UserStoppedSpeaking => {
                self.is_listening = false;
                vec![SessionAction::Render]
            },
            TransportEvent::BotLlmStarted => {
                self.is_typing = true;
                vec![SessionAction::Render]
            },
            TransportEvent::BotLlmStopped => {
                self.is_typing = false;
                vec![SessionAction::Render]
            },
        }
    }

    /// Reset every session-scoped piece of state and cancel live timers.
    fn teardown(&mut self, now: DateTime<Utc>) -> Vec<SessionAction> {
        let mut actions: Vec<SessionAction> = self
            .uploads
            .uploading_ids()
            .into_iter()
            .map(|file_id| SessionAction::CancelUploadTimer { file_id })
            .collect();

        self.connection.reset();
        self.transcript.clear();
        self.uploads.clear();
        self.video.reset();
        self.is_typing = false;
        self.is_listening = false;
        self.awaiting_response_since = None;
        self.analytics.reset(now);

        actions.push(SessionAction::Render);
        actions
    }

    /// Recompute derived counters from their sources.
    fn sync_analytics(&mut self, now: DateTime<Utc>) {
        self.analytics.refresh(&self.transcript, &self.uploads, now);
    }

    /// Connection status, participant count, and session id.
    pub fn connection(&self) -> &ConnectionState {
        &self.connection
    }

    /// The append-only message log.
    pub fn transcript(&self) -> &TranscriptLog {
        &self.transcript
    }

    /// Per-file upload state.
    pub fn uploads(&self) -> &UploadTracker {
        &self.uploads
    }

    /// Derived counters.
    pub fn analytics(&self) -> &Analytics {
        &self.analytics
    }

    /// Local and remote media flags.
    pub fn video(&self) -> &VideoState {
        &self.video
    }

    /// True while the bot is generating a response.
    pub fn is_typing(&self) -> bool {
        self.is_typing
    }

    /// True while user voice activity is detected.
    pub fn is_listening(&self) -> bool {
        self.is_listening
    }

    /// Generation token of the newest connect or disconnect intent.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }
}
