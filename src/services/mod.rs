//! Service layer for the guest logger.
//!
//! This module contains the business logic for:
//! - Mist REST access (`MistClient`, `ClientLookup`)
//! - Guest detection (`GuestRules`)
//! - Bounded retries (`RetryPolicy`)

pub mod api;
pub mod classifier;
pub mod retry;

pub use api::{ClientLookup, MistClient};
pub use classifier::GuestRules;
pub use retry::{Backoff, RetryPolicy};
