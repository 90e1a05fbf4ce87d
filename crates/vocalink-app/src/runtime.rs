//! Async runtime for session orchestration.
//!
//! The Runtime drives the session event loop, coordinating between:
//! - [`Session`]: pure state machine
//! - [`Transport`]: external media client boundary
//! - The embedder: intents in via [`RuntimeHandle`], [`Notice`]s out
//!
//! All transport calls are spawned so the loop never blocks on the
//! network; their resolutions come back as events through the same merged
//! channel the embedder's intents use, which keeps event processing
//! single-threaded and race-free. Per-file upload timers are owned here as
//! abortable tasks keyed by file id.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::mpsc;
use tokio::task::AbortHandle;
use tokio::time::{MissedTickBehavior, interval, sleep};
use tracing::{debug, error, warn};
use vocalink_session::{Session, SessionAction, SessionEvent, TransportEvent};

use crate::{AppConfig, Transport};

/// Simulated upload progress tick interval.
const UPLOAD_TICK_INTERVAL: Duration = Duration::from_millis(100);

/// Buffer size for the merged event channel.
const EVENT_BUFFER: usize = 64;

/// Notifications pushed to the embedder.
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    /// State changed; re-read the session snapshot.
    Render,
    /// Submitted files were rejected, one reason per file.
    FilesRejected(Vec<String>),
    /// A requested analysis resolved.
    AnalysisReady {
        /// Id of the analyzed file.
        file_id: String,
        /// Analysis text, or why it is unavailable.
        result: Result<String, String>,
    },
}

/// Runtime-level commands carried on the merged channel.
#[derive(Debug)]
enum Command {
    /// Feed an event to the session.
    Event(SessionEvent),
    /// Stop the event loop.
    Shutdown,
}

/// Cloneable handle for feeding intents into a running [`Runtime`].
///
/// Handed to the embedder at construction; there is no global session
/// object, every caller goes through a handle.
#[derive(Debug, Clone)]
pub struct RuntimeHandle {
    commands: mpsc::Sender<Command>,
}

impl RuntimeHandle {
    /// Send an event to the session.
    ///
    /// Dropped with a diagnostic if the runtime has already stopped.
    pub async fn send(&self, event: SessionEvent) {
        if self.commands.send(Command::Event(event)).await.is_err() {
            warn!("runtime stopped; dropping event");
        }
    }

    /// Stop the runtime's event loop.
    pub async fn shutdown(&self) {
        let _ = self.commands.send(Command::Shutdown).await;
    }
}

/// Async runtime that owns the session and executes its actions.
pub struct Runtime<T: Transport> {
    session: Session,
    /// `None` when the embedder never configured a transport; intents that
    /// need one become diagnosed no-ops.
    transport: Option<Arc<T>>,
    transport_events: mpsc::Receiver<TransportEvent>,
    commands: mpsc::Receiver<Command>,
    /// Retained so spawned tasks can always feed resolutions back.
    feedback: mpsc::Sender<Command>,
    notices: mpsc::Sender<Notice>,
    upload_timers: HashMap<String, AbortHandle>,
}

impl<T: Transport> Runtime<T> {
    /// Create a runtime over an optional transport.
    ///
    /// `transport_events` is the transport's notification stream. Returns
    /// the runtime, the intent handle, and the notice stream.
    pub fn new(
        config: &AppConfig,
        transport: Option<Arc<T>>,
        transport_events: mpsc::Receiver<TransportEvent>,
    ) -> (Self, RuntimeHandle, mpsc::Receiver<Notice>) {
        let (command_tx, command_rx) = mpsc::channel(EVENT_BUFFER);
        let (notice_tx, notice_rx) = mpsc::channel(EVENT_BUFFER);

        let runtime = Self {
            session: Session::with_policy(config.upload_policy(), Utc::now()),
            transport,
            transport_events,
            commands: command_rx,
            feedback: command_tx.clone(),
            notices: notice_tx,
            upload_timers: HashMap::new(),
        };
        (runtime, RuntimeHandle { commands: command_tx }, notice_rx)
    }

    /// Run the main event loop.
    ///
    /// Multiplexes transport notifications, embedder intents, task
    /// resolutions, and the 1-second analytics tick. Returns when a
    /// shutdown command arrives; the session stays readable afterwards.
    pub async fn run(&mut self) {
        let mut ticker = interval(Duration::from_secs(1));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                Some(event) = self.transport_events.recv() => {
                    self.dispatch(SessionEvent::Transport(event)).await;
                },
                Some(command) = self.commands.recv() => {
                    match command {
                        Command::Event(event) => self.dispatch(event).await,
                        Command::Shutdown => break,
                    }
                },
                _ = ticker.tick() => {
                    self.dispatch(SessionEvent::Tick).await;
                },
            }
        }

        for (_, timer) in self.upload_timers.drain() {
            timer.abort();
        }
    }

    /// Feed one event through the session and execute the actions.
    pub async fn dispatch(&mut self, event: SessionEvent) {
        if self.transport.is_none() && requires_transport(&event) {
            // Configuration error: no transport was provided. The session
            // state must not move, so the event is dropped here.
            error!(?event, "transport not configured; ignoring intent");
            return;
        }

        let actions = self.session.handle(event, Utc::now());
        for action in actions {
            self.execute(action).await;
        }
    }

    async fn execute(&mut self, action: SessionAction) {
        match action {
            SessionAction::StartConnect { epoch } => {
                let Some(transport) = self.transport.clone() else { return };
                let feedback = self.feedback.clone();
                tokio::spawn(async move {
                    let result =
                        transport.connect().await.map_err(|error| error.to_string());
                    let resolved = SessionEvent::ConnectResolved { epoch, result };
                    let _ = feedback.send(Command::Event(resolved)).await;
                });
            },
            SessionAction::StartDisconnect => {
                let Some(transport) = self.transport.clone() else { return };
                let feedback = self.feedback.clone();
                tokio::spawn(async move {
                    let error = transport.disconnect().await.err().map(|e| e.to_string());
                    let resolved = SessionEvent::DisconnectResolved { error };
                    let _ = feedback.send(Command::Event(resolved)).await;
                });
            },
            SessionAction::EnableCam { enabled } => {
                let Some(transport) = self.transport.clone() else { return };
                tokio::spawn(async move {
                    if let Err(error) = transport.enable_cam(enabled).await {
                        warn!(%error, enabled, "camera toggle failed");
                    }
                });
            },
            SessionAction::EnableMic { enabled } => {
                let Some(transport) = self.transport.clone() else { return };
                tokio::spawn(async move {
                    if let Err(error) = transport.enable_mic(enabled).await {
                        warn!(%error, enabled, "microphone toggle failed");
                    }
                });
            },
            SessionAction::SendUserMessage { text } => {
                let Some(transport) = self.transport.clone() else { return };
                tokio::spawn(async move {
                    if let Err(error) = transport.send_user_message(&text).await {
                        warn!(%error, "message send failed");
                    }
                });
            },
            SessionAction::StartUploadTimer { file_id } => {
                self.start_upload_timer(file_id);
            },
            SessionAction::CancelUploadTimer { file_id } => {
                if let Some(timer) = self.upload_timers.remove(&file_id) {
                    timer.abort();
                } else {
                    debug!(%file_id, "cancel for a timer that is not running");
                }
            },
            SessionAction::NotifyRejectedFiles { reasons } => {
                let _ = self.notices.send(Notice::FilesRejected(reasons)).await;
            },
            SessionAction::DeliverAnalysis { file_id, result } => {
                let _ = self.notices.send(Notice::AnalysisReady { file_id, result }).await;
            },
            SessionAction::Render => {
                // Coalesce: a full notice queue already implies a pending
                // render, so dropping this one loses nothing.
                let _ = self.notices.try_send(Notice::Render);
            },
        }
    }

    /// Spawn the fixed-interval progress task for one accepted file.
    fn start_upload_timer(&mut self, file_id: String) {
        let feedback = self.feedback.clone();
        let tick_id = file_id.clone();
        let handle = tokio::spawn(async move {
            loop {
                sleep(UPLOAD_TICK_INTERVAL).await;
                let event = SessionEvent::UploadTick { file_id: tick_id.clone() };
                if feedback.send(Command::Event(event)).await.is_err() {
                    break;
                }
            }
        });

        if let Some(stale) = self.upload_timers.insert(file_id, handle.abort_handle()) {
            stale.abort();
        }
    }

    /// The session state, for snapshot reads.
    pub fn session(&self) -> &Session {
        &self.session
    }
}

fn requires_transport(event: &SessionEvent) -> bool {
    matches!(
        event,
        SessionEvent::Connect
            | SessionEvent::Disconnect
            | SessionEvent::ToggleCamera
            | SessionEvent::ToggleMicrophone
            | SessionEvent::ToggleMute
            | SessionEvent::SendMessage { .. }
    )
}
