use serde::Deserialize;
use strum::{Display, EnumString};

/// Per-user quota limits and the monthly window policy
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QuotaConfig {
    /// Generations allowed per user per day
    #[serde(default = "default_daily_limit")]
    pub daily_limit: u32,
    /// Generations allowed per user per month
    #[serde(default = "default_monthly_limit")]
    pub monthly_limit: u32,
    /// How the monthly window resets
    #[serde(default)]
    pub monthly_window: MonthlyWindow,
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            daily_limit: default_daily_limit(),
            monthly_limit: default_monthly_limit(),
            monthly_window: MonthlyWindow::default(),
        }
    }
}

/// Monthly quota window policy
///
/// Daily windows always roll 24h from first use; the monthly window can
/// either roll the same way over 30 days or reset with the UTC calendar
/// month.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MonthlyWindow {
    /// 30 days from the first generation in the window
    #[default]
    Rolling,
    /// Resets at the first instant of the next UTC calendar month
    Calendar,
}

#[allow(clippy::missing_const_for_fn)]
fn default_daily_limit() -> u32 {
    10
}

#[allow(clippy::missing_const_for_fn)]
fn default_monthly_limit() -> u32 {
    100
}
