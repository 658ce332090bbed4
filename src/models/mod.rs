// src/models/mod.rs

//! Domain models for the guest logger.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod client;
mod config;
mod guest;
mod site;

// Re-export all public types
pub use client::{ClientEvent, ClientRecord, GuestDetail, GuestIdentity, InboundEvent};
pub use config::{
    ApiConfig, ClassifierConfig, Config, LoggingConfig, RetryConfig, StorageConfig, StreamConfig,
};
pub use guest::{GuestProfile, SCHEMA_VERSION};
pub use site::Site;
