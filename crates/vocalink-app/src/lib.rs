//! Async runtime layer for the Vocalink client.
//!
//! Wires the pure [`vocalink_session::Session`] state machine to a
//! concrete [`Transport`] implementation: a tokio event loop multiplexes
//! transport notifications, embedder intents, and timers, executes the
//! session's actions, and pushes [`Notice`]s back to the embedder.

mod config;
mod runtime;
mod transport;

pub use config::{AppConfig, ServiceConfig, ServiceOption};
pub use runtime::{Notice, Runtime, RuntimeHandle};
pub use transport::{Transport, TransportError};
