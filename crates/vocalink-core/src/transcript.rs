//! Append-only transcript log.
//!
//! The log is the "View Model" for the chat/transcription panel: an ordered
//! sequence of entries keyed by arrival order. Ordering is insertion order,
//! never timestamp order: two events arriving out of wall-clock order still
//! append in arrival order. Entries are immutable once appended and the log
//! is cleared as a whole on disconnect.
//!
//! Final-only policy: interim speech-to-text results never produce an
//! entry; only results the transport flags as final do.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Role of a transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    /// Typed or spoken user input.
    User,
    /// Assistant output.
    Bot,
    /// Session notices (joined, disconnected, ...).
    System,
    /// Speech-sourced entry labelled distinctly by the view.
    Voice,
}

impl MessageKind {
    /// Display name used in transcript exports.
    pub fn role(self) -> &'static str {
        match self {
            Self::User => "User",
            Self::Bot => "Bot",
            Self::System => "System",
            Self::Voice => "Voice",
        }
    }

    /// Suffix composed into message ids.
    fn id_suffix(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Bot => "bot",
            Self::System => "system",
            Self::Voice => "voice",
        }
    }
}

/// A single transcript entry. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    /// Creation-order id: `msg-{epoch_millis}-{role}`. Not deduplicated.
    pub id: String,
    /// Entry role.
    pub kind: MessageKind,
    /// Text content.
    pub content: String,
    /// Arrival wall-clock time.
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Create a message stamped with `now`.
    pub fn new(kind: MessageKind, content: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: format!("msg-{}-{}", now.timestamp_millis(), kind.id_suffix()),
            kind,
            content: content.into(),
            timestamp: now,
        }
    }
}

/// Append-only message log scoped to one session.
#[derive(Debug, Clone, Default)]
pub struct TranscriptLog {
    messages: Vec<Message>,
}

impl TranscriptLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append unconditionally. No id dedup: ids compose creation time with
    /// a role suffix, so duplicates are accepted as-is.
    pub fn append(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Append a speech-to-text result, honoring the final-only policy.
    ///
    /// Returns the appended message, or `None` for interim results.
    pub fn append_transcript(
        &mut self,
        text: impl Into<String>,
        is_final: bool,
        now: DateTime<Utc>,
    ) -> Option<&Message> {
        if !is_final {
            return None;
        }
        self.append(Message::new(MessageKind::User, text, now));
        self.messages.last()
    }

    /// All entries in arrival order.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// True if the log holds no entries.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Case-insensitive substring filter over content.
    ///
    /// An empty query matches everything, mirroring the unfiltered panel.
    pub fn filter(&self, query: &str) -> Vec<&Message> {
        if query.is_empty() {
            return self.messages.iter().collect();
        }
        let needle = query.to_lowercase();
        self.messages.iter().filter(|m| m.content.to_lowercase().contains(&needle)).collect()
    }

    /// Plain-text export: one `[HH:MM:SS] Role: content` line per entry,
    /// in log order.
    pub fn export(&self) -> String {
        self.messages
            .iter()
            .map(|m| {
                format!("[{}] {}: {}", m.timestamp.format("%H:%M:%S"), m.kind.role(), m.content)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Drop all entries (session teardown).
    pub fn clear(&mut self) {
        self.messages.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, 0).unwrap()
    }

    #[test]
    fn append_preserves_arrival_order_over_timestamp_order() {
        let mut log = TranscriptLog::new();
        // Second event carries an earlier wall-clock timestamp
        log.append(Message::new(MessageKind::User, "later clock", at(100)));
        log.append(Message::new(MessageKind::Bot, "earlier clock", at(50)));

        let contents: Vec<_> = log.messages().iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, ["later clock", "earlier clock"]);
    }

    #[test]
    fn interim_transcripts_append_nothing() {
        let mut log = TranscriptLog::new();
        assert!(log.append_transcript("he", false, at(1)).is_none());
        assert!(log.is_empty());

        let msg = log.append_transcript("hello", true, at(2)).cloned();
        assert_eq!(msg.map(|m| m.content), Some("hello".to_string()));
        assert_eq!(log.len(), 1);
        assert_eq!(log.messages()[0].kind, MessageKind::User);
    }

    #[test]
    fn duplicate_ids_are_accepted() {
        let mut log = TranscriptLog::new();
        log.append(Message::new(MessageKind::User, "a", at(7)));
        log.append(Message::new(MessageKind::User, "b", at(7)));

        assert_eq!(log.len(), 2);
        assert_eq!(log.messages()[0].id, log.messages()[1].id);
    }

    #[test]
    fn filter_is_case_insensitive_substring() {
        let mut log = TranscriptLog::new();
        log.append(Message::new(MessageKind::User, "Hello World", at(1)));
        log.append(Message::new(MessageKind::Bot, "goodbye", at(2)));

        assert_eq!(log.filter("WORLD").len(), 1);
        assert_eq!(log.filter("o").len(), 2);
        assert_eq!(log.filter("absent").len(), 0);
        assert_eq!(log.filter("").len(), 2);
    }

    #[test]
    fn export_format() {
        let mut log = TranscriptLog::new();
        // 1970-01-01 12:34:56 UTC
        log.append(Message::new(MessageKind::User, "hello", at(45_296)));
        log.append(Message::new(MessageKind::Bot, "hi there", at(45_300)));

        insta::assert_snapshot!(log.export(), @r"
        [12:34:56] User: hello
        [12:35:00] Bot: hi there
        ");
    }

    #[test]
    fn clear_empties_log() {
        let mut log = TranscriptLog::new();
        log.append(Message::new(MessageKind::System, "joined", at(1)));
        log.clear();
        assert!(log.is_empty());
        assert_eq!(log.export(), "");
    }
}
