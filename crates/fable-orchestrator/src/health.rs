//! Concurrent health fan-out across registered providers

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use fable_provider::ProviderHealth;
use futures_util::future::join_all;

use crate::registry::ProviderRegistry;

/// Probes every registered provider concurrently
///
/// Each provider is checked under its own timeout, so a slow or failing
/// provider never delays or hides another provider's result.
pub struct HealthMonitor {
    registry: Arc<ProviderRegistry>,
    check_timeout: Duration,
}

impl HealthMonitor {
    /// Monitor over a registry with a per-check timeout
    pub const fn new(registry: Arc<ProviderRegistry>, check_timeout: Duration) -> Self {
        Self {
            registry,
            check_timeout,
        }
    }

    /// Probe all providers and aggregate per-provider status
    pub async fn check_all(&self) -> HashMap<String, ProviderHealth> {
        let checks = self.registry.providers().iter().map(|(name, provider)| {
            let name = name.clone();
            let provider = Arc::clone(provider);
            let check_timeout = self.check_timeout;
            async move {
                let started = Instant::now();
                let health =
                    match tokio::time::timeout(check_timeout, provider.health_check()).await {
                        Ok(health) => health,
                        Err(_) => {
                            tracing::warn!(provider = %name, "health check timed out");
                            ProviderHealth::down(
                                elapsed_ms(started),
                                format!(
                                    "health check timed out after {}s",
                                    check_timeout.as_secs()
                                ),
                            )
                        }
                    };
                (name, health)
            }
        });

        join_all(checks).await.into_iter().collect()
    }
}

#[allow(clippy::cast_possible_truncation)]
fn elapsed_ms(start: Instant) -> u64 {
    start.elapsed().as_millis() as u64
}
