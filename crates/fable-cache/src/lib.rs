//! Image-analysis cache with single-flight miss coalescing
//!
//! Analyses are expensive provider calls, so reads go through two layers
//! before the network: an in-process TTL hot cache, then the persistent
//! `AnalysisStore`. Concurrent misses for the same image identifier
//! collapse into one upstream call; waiters share the winner's result or
//! error, and an abandoned flight surfaces as an error rather than a hang.

#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod cache;
mod error;
mod store;

pub use cache::AnalysisCache;
pub use error::CacheError;
pub use store::AnalysisStore;
