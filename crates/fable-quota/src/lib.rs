//! Per-user generation quota enforcement
//!
//! Tracks daily and monthly story counters over a pluggable `QuotaStore`.
//! The check-then-increment sequence holds a per-user async mutex, so two
//! simultaneous requests at exactly the limit can never both pass. Expired
//! windows roll forward lazily on access.

#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod error;
mod guard;
mod state;
pub mod window;

pub use error::{QuotaError, QuotaScope};
pub use guard::{QuotaGuard, QuotaStore};
pub use state::{QuotaSnapshot, QuotaState};
