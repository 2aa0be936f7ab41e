use fable_config::{MonthlyWindow, QuotaConfig};
use serde::{Deserialize, Serialize};

use crate::window::{DAY_SECS, monthly_reset};

/// Persisted per-user quota counters
///
/// Windows are lazy: nothing fires when one expires, the state rolls
/// forward on the next access instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaState {
    /// Stories generated in the current daily window
    pub daily_used: u32,
    /// Daily limit in force when the state was last written
    pub daily_limit: u32,
    /// Unix second when the daily window resets
    pub daily_resets_at: u64,
    /// Stories generated in the current monthly window
    pub monthly_used: u32,
    /// Monthly limit in force when the state was last written
    pub monthly_limit: u32,
    /// Unix second when the monthly window resets
    pub monthly_resets_at: u64,
}

impl QuotaState {
    /// Zeroed state with both windows starting at `now`
    pub fn fresh(config: &QuotaConfig, now: u64) -> Self {
        Self {
            daily_used: 0,
            daily_limit: config.daily_limit,
            daily_resets_at: now + DAY_SECS,
            monthly_used: 0,
            monthly_limit: config.monthly_limit,
            monthly_resets_at: monthly_reset(config.monthly_window, now),
        }
    }

    /// Reset any window whose deadline has passed
    pub fn roll_windows(&mut self, now: u64, window: MonthlyWindow) {
        if now >= self.daily_resets_at {
            self.daily_used = 0;
            self.daily_resets_at = now + DAY_SECS;
        }
        if now >= self.monthly_resets_at {
            self.monthly_used = 0;
            self.monthly_resets_at = monthly_reset(window, now);
        }
    }
}

/// Read-only view of a user's quota position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QuotaSnapshot {
    /// Stories generated in the current daily window
    pub daily_used: u32,
    /// Daily limit
    pub daily_limit: u32,
    /// Stories left today
    pub daily_remaining: u32,
    /// Unix second when the daily window resets
    pub daily_resets_at: u64,
    /// Stories generated in the current monthly window
    pub monthly_used: u32,
    /// Monthly limit
    pub monthly_limit: u32,
    /// Stories left this month
    pub monthly_remaining: u32,
    /// Unix second when the monthly window resets
    pub monthly_resets_at: u64,
}

impl From<QuotaState> for QuotaSnapshot {
    fn from(state: QuotaState) -> Self {
        Self {
            daily_used: state.daily_used,
            daily_limit: state.daily_limit,
            daily_remaining: state.daily_limit.saturating_sub(state.daily_used),
            daily_resets_at: state.daily_resets_at,
            monthly_used: state.monthly_used,
            monthly_limit: state.monthly_limit,
            monthly_remaining: state.monthly_limit.saturating_sub(state.monthly_used),
            monthly_resets_at: state.monthly_resets_at,
        }
    }
}
