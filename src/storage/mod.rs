//! Storage abstractions for guest record persistence.
//!
//! Records are appended, one JSON document per line, to one file per
//! calendar day:
//!
//! ```text
//! {output_dir}/
//! ├── mist-guests-logger-logs-2025-01-30.jsonl
//! └── mist-guests-logger-logs-2025-01-31.jsonl
//! ```
//!
//! Writes assume a single process; concurrent writers may interleave.

pub mod local;

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::Result;
use crate::models::GuestProfile;

// Re-export for convenience
pub use local::LocalStorage;

/// Trait for guest record storage backends.
#[async_trait]
pub trait GuestSink: Send + Sync {
    /// Append one record to the partition for `day`.
    ///
    /// Returns the location written to.
    async fn append(&self, profile: &GuestProfile, day: NaiveDate) -> Result<PathBuf>;
}
