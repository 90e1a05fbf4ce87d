//! Property-based tests for the Session state machine.
//!
//! Tests verify that invariants hold under arbitrary event sequences.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use proptest::prelude::*;
use vocalink_core::{FileDescriptor, TrackKind, TransportState, UploadPhase};
use vocalink_session::{Session, SessionAction, SessionEvent, TransportEvent};

fn at(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap_or_default()
}

fn transport_state_strategy() -> impl Strategy<Value = TransportState> {
    prop_oneof![
        Just(TransportState::Disconnected),
        Just(TransportState::Initializing),
        Just(TransportState::Authenticating),
        Just(TransportState::Connecting),
        Just(TransportState::Connected),
        Just(TransportState::Ready),
        Just(TransportState::Disconnecting),
        Just(TransportState::Error),
    ]
}

/// Generate random session events, weighted toward the interesting
/// interleavings: transport churn, upload ticks against a small id space,
/// and teardown.
fn event_strategy() -> impl Strategy<Value = SessionEvent> {
    let file_id = (0i64..4, 0u64..3).prop_map(|(ts, seq)| format!("file-{}-{seq}", ts * 1000));
    prop_oneof![
        3 => transport_state_strategy()
            .prop_map(|state| SessionEvent::Transport(TransportEvent::StateChanged { state })),
        1 => Just(SessionEvent::Transport(TransportEvent::BotConnected)),
        1 => Just(SessionEvent::Transport(TransportEvent::BotDisconnected)),
        2 => (".{0,8}", any::<bool>()).prop_map(|(text, is_final)| {
            SessionEvent::Transport(TransportEvent::UserTranscript { text, is_final })
        }),
        1 => ".{0,8}".prop_map(|text| {
            SessionEvent::Transport(TransportEvent::BotText { text })
        }),
        1 => (any::<bool>(), any::<bool>(), any::<bool>()).prop_map(|(video, local, enabled)| {
            let kind = if video { TrackKind::Video } else { TrackKind::Audio };
            SessionEvent::Transport(TransportEvent::TrackStarted { kind, local, enabled })
        }),
        1 => Just(SessionEvent::Connect),
        1 => (1u64..5, any::<bool>()).prop_map(|(epoch, ok)| SessionEvent::ConnectResolved {
            epoch,
            result: if ok { Ok(None) } else { Err("refused".into()) },
        }),
        1 => Just(SessionEvent::Disconnect),
        1 => Just(SessionEvent::DisconnectResolved { error: None }),
        2 => prop::collection::vec(
            (".{1,8}", 1u64..100_000_000, prop_oneof![
                Just("text/plain".to_string()),
                Just("image/png".to_string()),
                Just("application/zip".to_string()),
            ]),
            1..3,
        )
        .prop_map(|specs| SessionEvent::SubmitFiles {
            files: specs
                .into_iter()
                .map(|(name, size, mime)| FileDescriptor { name, size, mime })
                .collect(),
        }),
        3 => file_id.clone().prop_map(|file_id| SessionEvent::UploadTick { file_id }),
        1 => file_id.prop_map(|file_id| SessionEvent::DeleteFile { file_id }),
        1 => Just(SessionEvent::Tick),
        1 => Just(SessionEvent::RefreshAnalytics),
    ]
}

proptest! {
    /// Core invariants hold after every step of any event sequence.
    #[test]
    fn prop_session_invariants_hold(events in prop::collection::vec(event_strategy(), 0..60)) {
        let mut session = Session::new(at(0));

        for (i, event) in events.into_iter().enumerate() {
            let now = at(i as i64);
            let _ = session.handle(event, now);

            // Analytics counters never drift from their sources
            session.handle(SessionEvent::RefreshAnalytics, now);
            prop_assert_eq!(session.analytics().messages_count, session.transcript().len());
            prop_assert_eq!(
                session.analytics().files_processed,
                session.uploads().processed_count()
            );

            // Terminal upload states are exclusive and progress is bounded
            for file in session.uploads().files() {
                match &file.phase {
                    UploadPhase::Uploading { progress } => prop_assert!(*progress < 100),
                    UploadPhase::Processed { .. } | UploadPhase::Errored { .. } => {
                        prop_assert_eq!(file.progress(), None);
                    },
                }
            }
        }
    }

    /// Replaying a recorded event sequence reproduces the same state.
    #[test]
    fn prop_session_replay_is_deterministic(events in prop::collection::vec(event_strategy(), 0..40)) {
        let mut first = Session::new(at(0));
        let mut second = Session::new(at(0));

        let mut first_actions = Vec::new();
        let mut second_actions = Vec::new();
        for (i, event) in events.iter().enumerate() {
            first_actions.extend(first.handle(event.clone(), at(i as i64)));
        }
        for (i, event) in events.iter().enumerate() {
            second_actions.extend(second.handle(event.clone(), at(i as i64)));
        }

        prop_assert_eq!(first_actions, second_actions);
        prop_assert_eq!(first.connection(), second.connection());
        prop_assert_eq!(first.uploads().files(), second.uploads().files());
        prop_assert_eq!(first.transcript().messages(), second.transcript().messages());
    }

    /// Timer actions stay balanced: after teardown no timer is live, and a
    /// cancel is never emitted for a timer that was not started, except for
    /// ticks naming ids the session never accepted.
    #[test]
    fn prop_timers_balanced_after_teardown(events in prop::collection::vec(event_strategy(), 0..60)) {
        let mut session = Session::new(at(0));
        let mut live: HashSet<String> = HashSet::new();

        for (i, event) in events.into_iter().enumerate() {
            for action in session.handle(event, at(i as i64)) {
                match action {
                    SessionAction::StartUploadTimer { file_id } => {
                        prop_assert!(live.insert(file_id), "timer started twice");
                    },
                    SessionAction::CancelUploadTimer { file_id } => {
                        // Cancels for unknown ids are the no-op guard path
                        live.remove(&file_id);
                    },
                    _ => {},
                }
            }
        }

        for action in session.handle(SessionEvent::DisconnectResolved { error: None }, at(1000)) {
            if let SessionAction::CancelUploadTimer { file_id } = action {
                live.remove(&file_id);
            }
        }
        prop_assert!(live.is_empty(), "timers leaked across teardown: {live:?}");
        prop_assert!(session.uploads().files().is_empty());
    }
}
