use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use fable_config::CacheConfig;
use fable_core::{ImageAnalysis, ImageId};
use futures_util::FutureExt;
use futures_util::future::{BoxFuture, Shared};
use tokio::sync::oneshot;

use crate::error::CacheError;
use crate::store::AnalysisStore;

type FlightResult = Result<ImageAnalysis, String>;
type SharedFlight = Shared<BoxFuture<'static, FlightResult>>;

/// Two-layer image-analysis cache with per-key single-flight
///
/// Reads consult the hot layer, then the store (promoting hits), and only
/// then fetch upstream. One flight exists per missing identifier at a
/// time; results are written back store-first so a key never re-fetches
/// once its flight completes.
pub struct AnalysisCache {
    store: Arc<dyn AnalysisStore>,
    hot: mini_moka::sync::Cache<ImageId, ImageAnalysis>,
    flights: DashMap<ImageId, SharedFlight>,
}

impl AnalysisCache {
    /// Create a cache over a store with the configured hot layer
    pub fn new(store: Arc<dyn AnalysisStore>, config: &CacheConfig) -> Self {
        Self {
            store,
            hot: mini_moka::sync::Cache::builder()
                .max_capacity(config.capacity)
                .time_to_live(config.ttl())
                .build(),
            flights: DashMap::new(),
        }
    }

    /// Resolve analyses for `ids`, fetching upstream only for true misses
    ///
    /// `fetch` receives the deduplicated identifiers this call owns and
    /// must return one analysis per identifier. Calls racing on the same
    /// identifier share a single flight; the losers wait on the winner's
    /// shared result.
    pub async fn get_or_analyze<F, Fut>(
        &self,
        ids: &[ImageId],
        fetch: F,
    ) -> Result<HashMap<ImageId, ImageAnalysis>, CacheError>
    where
        F: FnOnce(Vec<ImageId>) -> Fut + Send,
        Fut: Future<Output = Result<HashMap<ImageId, ImageAnalysis>, String>> + Send,
    {
        let mut results = HashMap::new();
        let mut misses = Vec::new();

        for &id in ids {
            if results.contains_key(&id) || misses.contains(&id) {
                continue;
            }
            match self.hot.get(&id) {
                Some(analysis) => {
                    results.insert(id, analysis);
                }
                None => misses.push(id),
            }
        }

        if misses.is_empty() {
            return Ok(results);
        }

        let stored = self
            .store
            .cached(&misses)
            .await
            .map_err(|e| CacheError::Backend(format!("{e:#}")))?;
        misses.retain(|id| !stored.contains_key(id));
        for (id, analysis) in stored {
            self.hot.insert(id, analysis.clone());
            results.insert(id, analysis);
        }

        if misses.is_empty() {
            tracing::debug!(count = results.len(), "analyses served from store");
            return Ok(results);
        }

        // True misses: join an existing flight or own a fresh one
        let mut waiting = Vec::new();
        let mut owned = Vec::new();
        let mut senders = Vec::new();
        for &id in &misses {
            match self.flights.entry(id) {
                Entry::Occupied(entry) => waiting.push((id, entry.get().clone())),
                Entry::Vacant(entry) => {
                    let (tx, rx) = oneshot::channel();
                    let flight: SharedFlight = rx
                        .map(|received| {
                            received
                                .unwrap_or_else(|_| Err("analysis flight abandoned".to_owned()))
                        })
                        .boxed()
                        .shared();
                    entry.insert(flight);
                    owned.push(id);
                    senders.push((id, tx));
                }
            }
        }

        if !owned.is_empty() {
            // The guard unregisters the flights whether the fetch resolves
            // or this future is dropped mid-call; an abandoned sender shows
            // up at the waiters as the abandoned-flight error.
            let _guard = FlightGuard {
                flights: &self.flights,
                ids: &owned,
            };

            tracing::debug!(count = owned.len(), "fetching analyses upstream");
            let outcome = fetch(owned.clone()).await;
            self.settle_flights(&owned, senders, outcome, &mut results)
                .await?;
        }

        for (id, flight) in waiting {
            match flight.await {
                Ok(analysis) => {
                    results.insert(id, analysis);
                }
                Err(message) => return Err(CacheError::Analysis(message)),
            }
        }

        Ok(results)
    }

    /// Distribute a fetch outcome to this call and its waiters
    ///
    /// Write-back runs before any sender fires, so by the time the flight
    /// entries are removed the keys are already served from cache.
    async fn settle_flights(
        &self,
        owned: &[ImageId],
        senders: Vec<(ImageId, oneshot::Sender<FlightResult>)>,
        outcome: Result<HashMap<ImageId, ImageAnalysis>, String>,
        results: &mut HashMap<ImageId, ImageAnalysis>,
    ) -> Result<(), CacheError> {
        match outcome {
            Ok(mut fetched) => {
                if let Err(e) = self.store.store(&fetched).await {
                    tracing::warn!(error = %e, "analysis write-back failed");
                }
                for (id, analysis) in &fetched {
                    self.hot.insert(*id, analysis.clone());
                }

                for (id, tx) in senders {
                    let result = fetched
                        .remove(&id)
                        .ok_or_else(|| format!("no analysis returned for image {id}"));
                    if let Ok(analysis) = &result {
                        results.insert(id, analysis.clone());
                    }
                    let _ = tx.send(result);
                }

                for id in owned {
                    if !results.contains_key(id) {
                        return Err(CacheError::Analysis(format!(
                            "no analysis returned for image {id}"
                        )));
                    }
                }
                Ok(())
            }
            Err(message) => {
                for (_, tx) in senders {
                    let _ = tx.send(Err(message.clone()));
                }
                Err(CacheError::Analysis(message))
            }
        }
    }
}

struct FlightGuard<'a> {
    flights: &'a DashMap<ImageId, SharedFlight>,
    ids: &'a [ImageId],
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        for id in self.ids {
            self.flights.remove(id);
        }
    }
}
