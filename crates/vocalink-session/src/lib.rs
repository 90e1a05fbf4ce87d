//! Session state machine for the Vocalink client.
//!
//! Consumes a closed set of transport events, view intents, and async
//! resolutions ([`SessionEvent`]) and produces [`SessionAction`]
//! instructions for a runtime to execute. The state machine performs no
//! I/O and receives wall-clock time as a parameter, so every behavior is
//! reproducible in tests.

mod event;
mod session;

pub use event::{SessionAction, SessionEvent, TransportEvent};
pub use session::Session;
