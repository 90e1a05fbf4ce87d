//! Core state machines for the Vocalink session layer.
//!
//! Pure data types and reducers with no I/O: connection status
//! reconciliation, the append-only transcript log, the per-file upload
//! tracker, derived analytics, and local media flags. Time is always passed
//! in as a parameter so every state machine is deterministic and fully
//! testable without a clock.

mod analytics;
mod connection;
mod error;
mod media;
mod transcript;
mod upload;

pub use analytics::Analytics;
pub use connection::{ConnectionState, Status, TransportState};
pub use error::UploadError;
pub use media::{TrackKind, VideoState};
pub use transcript::{Message, MessageKind, TranscriptLog};
pub use upload::{
    DEFAULT_MAX_FILE_SIZE, FileDescriptor, PROGRESS_STEP, SubmitOutcome, TickOutcome, TypePattern,
    UploadFile, UploadPhase, UploadPolicy, UploadTracker,
};
