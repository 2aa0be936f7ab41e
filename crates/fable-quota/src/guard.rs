use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use fable_config::QuotaConfig;
use fable_core::{ParentId, now_secs};
use tokio::sync::Mutex;

use crate::error::{QuotaError, QuotaScope};
use crate::state::{QuotaSnapshot, QuotaState};

/// Persistence collaborator for per-user quota state
#[async_trait]
pub trait QuotaStore: Send + Sync {
    /// Load the persisted state for a user
    async fn load(&self, user: ParentId) -> anyhow::Result<Option<QuotaState>>;

    /// Persist the state for a user
    async fn save(&self, user: ParentId, state: QuotaState) -> anyhow::Result<()>;
}

/// Checks and atomically consumes per-user generation quota
pub struct QuotaGuard {
    store: Arc<dyn QuotaStore>,
    config: QuotaConfig,
    locks: DashMap<ParentId, Arc<Mutex<()>>>,
}

impl QuotaGuard {
    /// Create a guard over a store with the configured limits
    pub fn new(store: Arc<dyn QuotaStore>, config: QuotaConfig) -> Self {
        Self {
            store,
            config,
            locks: DashMap::new(),
        }
    }

    /// Consume one generation from the user's quota
    ///
    /// The user's mutex is held across load-check-increment-save, so
    /// concurrent requests from the same user serialize here. Returns the
    /// post-increment snapshot.
    pub async fn try_acquire(&self, user: ParentId) -> Result<QuotaSnapshot, QuotaError> {
        let lock = self.user_lock(user);
        let _held = lock.lock().await;

        let now = now_secs();
        let mut state = self.load_state(user, now).await?;
        state.roll_windows(now, self.config.monthly_window);

        if state.daily_used >= state.daily_limit {
            tracing::debug!(%user, used = state.daily_used, "daily quota exhausted");
            return Err(QuotaError::Exceeded {
                scope: QuotaScope::Daily,
                limit: state.daily_limit,
                resets_at: state.daily_resets_at,
            });
        }
        if state.monthly_used >= state.monthly_limit {
            tracing::debug!(%user, used = state.monthly_used, "monthly quota exhausted");
            return Err(QuotaError::Exceeded {
                scope: QuotaScope::Monthly,
                limit: state.monthly_limit,
                resets_at: state.monthly_resets_at,
            });
        }

        state.daily_used += 1;
        state.monthly_used += 1;

        self.store
            .save(user, state)
            .await
            .map_err(|e| QuotaError::Store(format!("{e:#}")))?;

        Ok(QuotaSnapshot::from(state))
    }

    /// Current quota position without consuming anything
    pub async fn snapshot(&self, user: ParentId) -> Result<QuotaSnapshot, QuotaError> {
        let lock = self.user_lock(user);
        let _held = lock.lock().await;

        let now = now_secs();
        let mut state = self.load_state(user, now).await?;
        state.roll_windows(now, self.config.monthly_window);

        Ok(QuotaSnapshot::from(state))
    }

    async fn load_state(&self, user: ParentId, now: u64) -> Result<QuotaState, QuotaError> {
        let mut state = self
            .store
            .load(user)
            .await
            .map_err(|e| QuotaError::Store(format!("{e:#}")))?
            .unwrap_or_else(|| QuotaState::fresh(&self.config, now));

        // Limits follow configuration, not the persisted row
        state.daily_limit = self.config.daily_limit;
        state.monthly_limit = self.config.monthly_limit;
        Ok(state)
    }

    fn user_lock(&self, user: ParentId) -> Arc<Mutex<()>> {
        self.locks.entry(user).or_default().clone()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex as StdMutex;
    use std::sync::atomic::{AtomicBool, Ordering};

    use fable_config::MonthlyWindow;

    use super::*;

    #[derive(Default)]
    struct MemStore {
        states: StdMutex<HashMap<ParentId, QuotaState>>,
        fail_saves: AtomicBool,
    }

    #[async_trait]
    impl QuotaStore for MemStore {
        async fn load(&self, user: ParentId) -> anyhow::Result<Option<QuotaState>> {
            Ok(self.states.lock().unwrap().get(&user).copied())
        }

        async fn save(&self, user: ParentId, state: QuotaState) -> anyhow::Result<()> {
            if self.fail_saves.load(Ordering::Relaxed) {
                anyhow::bail!("disk full");
            }
            self.states.lock().unwrap().insert(user, state);
            Ok(())
        }
    }

    fn guard(daily_limit: u32, monthly_limit: u32) -> (QuotaGuard, Arc<MemStore>) {
        let store = Arc::new(MemStore::default());
        let config = QuotaConfig {
            daily_limit,
            monthly_limit,
            monthly_window: MonthlyWindow::Rolling,
        };
        let quota_store: Arc<dyn QuotaStore> = store.clone();
        (QuotaGuard::new(quota_store, config), store)
    }

    #[tokio::test]
    async fn acquires_until_daily_limit() {
        let (guard, _) = guard(2, 100);
        let user = ParentId::new();

        assert!(guard.try_acquire(user).await.is_ok());
        assert!(guard.try_acquire(user).await.is_ok());

        let error = guard.try_acquire(user).await.unwrap_err();
        assert!(matches!(
            error,
            QuotaError::Exceeded {
                scope: QuotaScope::Daily,
                limit: 2,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn monthly_limit_binds_when_daily_allows() {
        let (guard, _) = guard(10, 3);
        let user = ParentId::new();

        for _ in 0..3 {
            guard.try_acquire(user).await.unwrap();
        }

        let error = guard.try_acquire(user).await.unwrap_err();
        assert!(matches!(
            error,
            QuotaError::Exceeded {
                scope: QuotaScope::Monthly,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn concurrent_requests_never_overrun() {
        let (guard, _) = guard(5, 100);
        let guard = Arc::new(guard);
        let user = ParentId::new();

        let mut handles = Vec::new();
        for _ in 0..20 {
            let guard = Arc::clone(&guard);
            handles.push(tokio::spawn(async move { guard.try_acquire(user).await }));
        }

        let mut granted = 0;
        let mut rejected = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => granted += 1,
                Err(QuotaError::Exceeded { .. }) => rejected += 1,
                Err(e) => panic!("unexpected error: {e}"),
            }
        }

        assert_eq!(granted, 5);
        assert_eq!(rejected, 15);
    }

    #[tokio::test]
    async fn expired_daily_window_frees_quota() {
        let (guard, store) = guard(1, 100);
        let user = ParentId::new();

        let config = QuotaConfig {
            daily_limit: 1,
            monthly_limit: 100,
            monthly_window: MonthlyWindow::Rolling,
        };
        let mut state = QuotaState::fresh(&config, 0);
        state.daily_used = 1;
        state.daily_resets_at = 10;
        store.states.lock().unwrap().insert(user, state);

        let snapshot = guard.try_acquire(user).await.unwrap();
        assert_eq!(snapshot.daily_used, 1);
        assert!(snapshot.daily_resets_at > 10);
    }

    #[tokio::test]
    async fn snapshot_never_consumes() {
        let (guard, _) = guard(1, 1);
        let user = ParentId::new();

        assert_eq!(guard.snapshot(user).await.unwrap().daily_remaining, 1);
        assert_eq!(guard.snapshot(user).await.unwrap().daily_remaining, 1);

        guard.try_acquire(user).await.unwrap();
        assert_eq!(guard.snapshot(user).await.unwrap().daily_remaining, 0);
    }

    #[tokio::test]
    async fn limits_follow_configuration_changes() {
        let (guard, store) = guard(5, 100);
        let user = ParentId::new();

        guard.try_acquire(user).await.unwrap();
        drop(guard);

        // Same store, tighter limits
        let config = QuotaConfig {
            daily_limit: 1,
            monthly_limit: 100,
            monthly_window: MonthlyWindow::Rolling,
        };
        let guard = QuotaGuard::new(store, config);

        let error = guard.try_acquire(user).await.unwrap_err();
        assert!(matches!(
            error,
            QuotaError::Exceeded {
                scope: QuotaScope::Daily,
                limit: 1,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn store_failures_surface_as_store_errors() {
        let (guard, store) = guard(5, 5);
        store.fail_saves.store(true, Ordering::Relaxed);

        let error = guard.try_acquire(ParentId::new()).await.unwrap_err();
        assert!(matches!(error, QuotaError::Store(_)));
    }
}
