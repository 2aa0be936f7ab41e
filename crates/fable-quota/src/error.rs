use serde::Serialize;
use strum::Display;
use thiserror::Error;

/// Quota enforcement errors
#[derive(Debug, Error)]
pub enum QuotaError {
    /// A usage limit was reached
    #[error("{scope} story limit of {limit} reached")]
    Exceeded {
        /// Which window was exhausted
        scope: QuotaScope,
        /// Limit for that window
        limit: u32,
        /// Unix second when the window resets
        resets_at: u64,
    },

    /// The backing store failed
    #[error("quota store error: {0}")]
    Store(String),
}

/// Which quota window a rejection refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum QuotaScope {
    /// Rolling 24-hour window
    Daily,
    /// Monthly window per the configured policy
    Monthly,
}
