//! Streaming ingestion pipeline.
//!
//! - `connection`: live stream transport (`Connector`, `EventStream`)
//! - `session`: connection lifecycle with reconnect (`StreamSession`)
//! - `tracker`: per-message guest processing (`GuestTracker`)
//! - `ledger`: in-memory deduplication (`GuestLedger`)

pub mod connection;
pub mod ledger;
pub mod session;
pub mod tracker;

#[cfg(test)]
mod testing;

pub use connection::{Connector, EventStream, WsConnector, WsStream};
pub use ledger::GuestLedger;
pub use session::{ReconnectSignal, SessionEnd, StreamSession};
pub use tracker::{GuestTracker, MessageOutcome};
