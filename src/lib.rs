// src/lib.rs

//! Mist Guest Logger Library
//!
//! Watches the Mist client statistics stream of every site in an
//! organization, detects guest sessions, enriches them through the REST API
//! and appends one record per guest to a daily JSON Lines file.
//!
//! Deduplication only covers the lifetime of the process: the ledger of
//! recorded guests is kept in memory and starts empty on every restart.

pub mod error;
#[cfg(feature = "cli")]
pub mod logging;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
