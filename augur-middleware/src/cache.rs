use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use augur_core::{
    AugurError, Clock, DateRange, InstrumentId, RawSeries, SeriesProvider, SystemClock,
};
use augur_types::CacheConfig;
use chrono::{DateTime, TimeDelta, Utc};
use futures::future::{BoxFuture, FutureExt, Shared};
use lru::LruCache;

/// An in-flight upstream fetch that any number of callers can await.
type Flight = Shared<BoxFuture<'static, Result<Arc<RawSeries>, AugurError>>>;

/// Exact cache key: instrument plus requested range. No range subsumption.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SeriesKey {
    /// Canonical instrument id.
    pub instrument: InstrumentId,
    /// Requested half-open range.
    pub range: DateRange,
}

/// A retained provider result.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// Shared, immutable raw series.
    pub series: Arc<RawSeries>,
    /// Clock reading when the fetch completed.
    pub fetched_at: DateTime<Utc>,
}

/// Completed entries live in the bounded LRU. In-flight fetches are kept apart
/// so that eviction pressure can never drop a fetch other callers may join.
struct Slots {
    ready: LruCache<SeriesKey, CacheEntry>,
    pending: HashMap<SeriesKey, (u64, Flight)>,
}

enum Lookup {
    Hit(Arc<RawSeries>),
    Join(Flight),
    Stale,
    Miss,
}

struct Inner {
    provider: Arc<dyn SeriesProvider>,
    clock: Arc<dyn Clock>,
    config: CacheConfig,
    ttl: TimeDelta,
    slots: Mutex<Slots>,
    next_flight: AtomicU64,
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, Slots> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_stale(&self, entry: &CacheEntry, now: DateTime<Utc>) -> bool {
        now - entry.fetched_at > self.ttl
    }

    /// Build the shared fetch for `key`. The flight writes its own outcome back,
    /// but only while the pending map still points at this flight.
    fn start_flight(this: &Arc<Self>, key: SeriesKey, id: u64) -> Flight {
        let provider = Arc::clone(&this.provider);
        let timeout = this.config.fetch_timeout;
        let weak = Arc::downgrade(this);
        async move {
            let result = fetch(provider.as_ref(), &key, timeout).await;
            if let Some(inner) = weak.upgrade() {
                inner.settle(&key, id, &result);
            }
            result
        }
        .boxed()
        .shared()
    }

    fn settle(&self, key: &SeriesKey, id: u64, result: &Result<Arc<RawSeries>, AugurError>) {
        let mut slots = self.lock();
        let ours = matches!(slots.pending.get(key), Some((current, _)) if *current == id);
        if !ours {
            return;
        }
        slots.pending.remove(key);
        if let Ok(series) = result
            && self.config.enabled()
        {
            slots.ready.put(
                key.clone(),
                CacheEntry {
                    series: Arc::clone(series),
                    fetched_at: self.clock.now(),
                },
            );
        }
    }
}

/// TTL cache with singleflight in front of a [`SeriesProvider`].
///
/// - Fresh entries (age `<= ttl`) are served without calling the provider.
/// - Concurrent callers for the same key share one upstream fetch.
/// - Failures are delivered to every waiter of that fetch and are never cached.
/// - An empty provider result is reported as `NotFound`.
/// - `ttl == 0` retains nothing, but concurrent callers still share a fetch.
///
/// Clones share the same underlying cache.
#[derive(Clone)]
pub struct SeriesCache {
    inner: Arc<Inner>,
}

impl SeriesCache {
    /// Cache over `provider` using wall-clock time.
    #[must_use]
    pub fn new(provider: Arc<dyn SeriesProvider>, config: CacheConfig) -> Self {
        Self::with_clock(provider, config, Arc::new(SystemClock))
    }

    /// Cache over `provider` measuring freshness with `clock`.
    #[must_use]
    pub fn with_clock(
        provider: Arc<dyn SeriesProvider>,
        config: CacheConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let capacity = NonZeroUsize::new(config.max_entries).unwrap_or(NonZeroUsize::MIN);
        let ttl = TimeDelta::from_std(config.ttl).unwrap_or(TimeDelta::MAX);
        Self {
            inner: Arc::new(Inner {
                provider,
                clock,
                config,
                ttl,
                slots: Mutex::new(Slots {
                    ready: LruCache::new(capacity),
                    pending: HashMap::new(),
                }),
                next_flight: AtomicU64::new(0),
            }),
        }
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &CacheConfig {
        &self.inner.config
    }

    /// Number of retained (completed) entries, fresh or stale.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().ready.len()
    }

    /// Whether no completed entry is retained.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Inspect the retained entry for a key without refreshing it or bumping recency.
    #[must_use]
    pub fn entry(&self, instrument: &InstrumentId, range: DateRange) -> Option<CacheEntry> {
        let key = SeriesKey {
            instrument: instrument.clone(),
            range,
        };
        self.inner.lock().ready.peek(&key).cloned()
    }

    /// Drop the entry (or forget the in-flight fetch) for a key.
    ///
    /// Returns true if something was removed. Callers already awaiting a dropped
    /// fetch still receive its result.
    pub fn invalidate(&self, instrument: &InstrumentId, range: DateRange) -> bool {
        let key = SeriesKey {
            instrument: instrument.clone(),
            range,
        };
        let mut slots = self.inner.lock();
        let dropped_entry = slots.ready.pop(&key).is_some();
        let dropped_flight = slots.pending.remove(&key).is_some();
        dropped_entry || dropped_flight
    }

    /// Drop every entry and forget every in-flight fetch.
    pub fn clear(&self) {
        let mut slots = self.inner.lock();
        slots.ready.clear();
        slots.pending.clear();
    }

    /// Return the raw series for `(instrument, range)`, fetching at most once per
    /// key across concurrent callers.
    ///
    /// # Errors
    /// - `NotFound` when the provider knows no such instrument or returns no rows.
    /// - `ProviderTimeout` when the fetch exceeds `fetch_timeout`.
    /// - `Provider` for any other upstream failure.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "augur::middleware::cache::get",
            skip(self),
            fields(instrument = %instrument, start = %range.start(), end = %range.end()),
        )
    )]
    pub async fn get(
        &self,
        instrument: &InstrumentId,
        range: DateRange,
    ) -> Result<Arc<RawSeries>, AugurError> {
        let key = SeriesKey {
            instrument: instrument.clone(),
            range,
        };
        let flight = {
            let mut slots = self.inner.lock();
            let now = self.inner.clock.now();
            let lookup = match slots.ready.get(&key) {
                Some(entry) if !self.inner.is_stale(entry, now) => {
                    Lookup::Hit(Arc::clone(&entry.series))
                }
                Some(_) => Lookup::Stale,
                None => match slots.pending.get(&key) {
                    Some((_, flight)) => Lookup::Join(flight.clone()),
                    None => Lookup::Miss,
                },
            };
            match lookup {
                Lookup::Hit(series) => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!("cache hit");
                    return Ok(series);
                }
                Lookup::Join(flight) => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!("joining in-flight fetch");
                    flight
                }
                Lookup::Stale => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!("cache entry expired");
                    slots.ready.pop(&key);
                    Self::launch(&self.inner, &mut slots, key)
                }
                Lookup::Miss => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!("cache miss");
                    Self::launch(&self.inner, &mut slots, key)
                }
            }
        };
        flight.await
    }

    /// Register a new flight for `key` and return it, unless one is already
    /// running, in which case that one is joined.
    fn launch(inner: &Arc<Inner>, slots: &mut Slots, key: SeriesKey) -> Flight {
        if let Some((_, flight)) = slots.pending.get(&key) {
            return flight.clone();
        }
        let id = inner.next_flight.fetch_add(1, Ordering::Relaxed);
        let flight = Inner::start_flight(inner, key.clone(), id);
        slots.pending.insert(key, (id, flight.clone()));
        flight
    }
}

/// Call the provider under a timeout and normalize its outcome.
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(
        name = "augur::middleware::cache::fetch",
        skip(provider, key),
        fields(
            provider = provider.name(),
            instrument = %key.instrument,
            timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
        ),
    )
)]
async fn fetch(
    provider: &dyn SeriesProvider,
    key: &SeriesKey,
    timeout: Duration,
) -> Result<Arc<RawSeries>, AugurError> {
    let name = provider.name();
    let raw = tokio::time::timeout(timeout, provider.fetch_series(&key.instrument, key.range))
        .await
        .unwrap_or_else(|_| Err(AugurError::provider_timeout(name)))
        .map_err(|e| tag_provider_error(name, e))?;
    if raw.is_empty() {
        return Err(AugurError::not_found(format!(
            "series for {} in [{}, {})",
            key.instrument,
            key.range.start(),
            key.range.end()
        )));
    }
    Ok(Arc::new(raw))
}

/// Keep provider-class errors as-is and attribute anything else to the provider.
fn tag_provider_error(provider: &str, err: AugurError) -> AugurError {
    if err.is_provider_error() {
        err
    } else {
        AugurError::provider(provider, err.to_string())
    }
}

#[async_trait]
impl SeriesProvider for SeriesCache {
    fn name(&self) -> &'static str {
        self.inner.provider.name()
    }

    fn vendor(&self) -> &'static str {
        self.inner.provider.vendor()
    }

    async fn fetch_series(
        &self,
        instrument: &InstrumentId,
        range: DateRange,
    ) -> Result<RawSeries, AugurError> {
        self.get(instrument, range)
            .await
            .map(|series| series.as_ref().clone())
    }
}
