//! TTL cache for rates, trend series and news, plus the preferred base currency

use super::clock::Clock;
use super::currency::{DEFAULT_BASE_CURRENCY, normalize_currency_code};
use super::news::NewsRecord;
use super::rates::RateRecord;
use super::trend::TrendPoint;
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Durable home for a serialized [`CacheState`].
pub trait SnapshotStore: Send + Sync {
    fn load(&self) -> anyhow::Result<Option<Vec<u8>>>;
    fn save(&self, snapshot: &[u8]) -> anyhow::Result<()>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    pub data: T,
    pub expires_at: DateTime<Utc>,
}

impl<T> CacheEntry<T> {
    pub fn is_fresh_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// String-keyed map of entries carrying an absolute expiry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TtlMap<V> {
    entries: HashMap<String, CacheEntry<V>>,
}

impl<V> Default for TtlMap<V> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<V> TtlMap<V> {
    pub fn get(&self, key: &str) -> Option<&CacheEntry<V>> {
        self.entries.get(key)
    }

    pub fn insert(&mut self, key: String, data: V, expires_at: DateTime<Utc>) {
        self.entries.insert(key, CacheEntry { data, expires_at });
    }

    /// Drops every entry with `expires_at <= now`, returning how many went.
    pub fn purge_expired(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.is_fresh_at(now));
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Everything the store owns; this is what gets persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheState {
    pub base_currency: String,
    #[serde(default)]
    pub rates: TtlMap<Vec<RateRecord>>,
    #[serde(default)]
    pub trend: TtlMap<Vec<TrendPoint>>,
    #[serde(default)]
    pub news: TtlMap<Vec<NewsRecord>>,
}

impl CacheState {
    fn empty(base_currency: &str) -> Self {
        Self {
            base_currency: base_currency.to_string(),
            rates: TtlMap::default(),
            trend: TtlMap::default(),
            news: TtlMap::default(),
        }
    }

    fn purge_expired(&mut self, now: DateTime<Utc>) -> usize {
        self.rates.purge_expired(now) + self.trend.purge_expired(now) + self.news.purge_expired(now)
    }
}

/// Selects one of the three tables inside [`CacheState`].
pub trait CacheTable {
    type Data: Clone + Send;
    const NAME: &'static str;

    fn table(state: &CacheState) -> &TtlMap<Self::Data>;
    fn table_mut(state: &mut CacheState) -> &mut TtlMap<Self::Data>;
}

/// Latest rates keyed by base currency code.
pub struct RatesTable;
/// Trend series keyed by `base:from->to`.
pub struct TrendTable;
/// Headlines keyed by currency code.
pub struct NewsTable;

impl CacheTable for RatesTable {
    type Data = Vec<RateRecord>;
    const NAME: &'static str = "rates";

    fn table(state: &CacheState) -> &TtlMap<Self::Data> {
        &state.rates
    }

    fn table_mut(state: &mut CacheState) -> &mut TtlMap<Self::Data> {
        &mut state.rates
    }
}

impl CacheTable for TrendTable {
    type Data = Vec<TrendPoint>;
    const NAME: &'static str = "trend";

    fn table(state: &CacheState) -> &TtlMap<Self::Data> {
        &state.trend
    }

    fn table_mut(state: &mut CacheState) -> &mut TtlMap<Self::Data> {
        &mut state.trend
    }
}

impl CacheTable for NewsTable {
    type Data = Vec<NewsRecord>;
    const NAME: &'static str = "news";

    fn table(state: &CacheState) -> &TtlMap<Self::Data> {
        &state.news
    }

    fn table_mut(state: &mut CacheState) -> &mut TtlMap<Self::Data> {
        &mut state.news
    }
}

/// Process-wide cache shared by all providers.
///
/// All reads and writes go through one async mutex. When a [`SnapshotStore`]
/// is attached, every mutation is written through on a best-effort basis.
pub struct CacheStore {
    state: Mutex<CacheState>,
    clock: Arc<dyn Clock>,
    snapshots: Option<Arc<dyn SnapshotStore>>,
}

impl CacheStore {
    /// An empty, memory-only store.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Mutex::new(CacheState::empty(DEFAULT_BASE_CURRENCY)),
            clock,
            snapshots: None,
        }
    }

    /// Rehydrates from `snapshots`, falling back to an empty store with
    /// `default_base` when nothing usable is persisted.
    pub fn open(
        clock: Arc<dyn Clock>,
        snapshots: Arc<dyn SnapshotStore>,
        default_base: &str,
    ) -> Self {
        let default_base =
            normalize_currency_code(default_base).unwrap_or_else(|| DEFAULT_BASE_CURRENCY.into());

        let state = match snapshots.load() {
            Ok(Some(bytes)) => match serde_json::from_slice::<CacheState>(&bytes) {
                Ok(mut state) => {
                    debug!("Rehydrated cache state");
                    match normalize_currency_code(&state.base_currency) {
                        Some(code) => state.base_currency = code,
                        None => {
                            warn!("Persisted base currency is blank, using {}", default_base);
                            state.base_currency = default_base.clone();
                        }
                    }
                    state
                }
                Err(e) => {
                    warn!("Discarding corrupt cache snapshot: {}", e);
                    CacheState::empty(&default_base)
                }
            },
            Ok(None) => CacheState::empty(&default_base),
            Err(e) => {
                warn!("Failed to load cache snapshot: {}", e);
                CacheState::empty(&default_base)
            }
        };

        Self {
            state: Mutex::new(state),
            clock,
            snapshots: Some(snapshots),
        }
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Current entry for `key`, expired or not. Does not mutate state.
    pub async fn get<T: CacheTable>(&self, key: &str) -> Option<CacheEntry<T::Data>> {
        let state = self.state.lock().await;
        let entry = T::table(&state).get(key).cloned();
        if entry.is_some() {
            debug!("Cache HIT for {} key: {}", T::NAME, key);
        } else {
            debug!("Cache MISS for {} key: {}", T::NAME, key);
        }
        entry
    }

    /// Stores `data` under `key` until `now + ttl`, replacing any prior entry.
    pub async fn set<T: CacheTable>(&self, key: &str, data: T::Data, ttl: Duration) {
        let now = self.now();
        let ttl = TimeDelta::from_std(ttl).unwrap_or(TimeDelta::MAX);
        let expires_at = now.checked_add_signed(ttl).unwrap_or(DateTime::<Utc>::MAX_UTC);

        let mut state = self.state.lock().await;
        T::table_mut(&mut state).insert(key.to_string(), data, expires_at);
        debug!("Cache PUT for {} key: {}", T::NAME, key);
        self.persist(&state);
    }

    /// Removes expired entries from all three tables.
    pub async fn purge_expired(&self) -> usize {
        let now = self.now();
        let mut state = self.state.lock().await;
        let purged = state.purge_expired(now);
        if purged > 0 {
            debug!("Cache PURGE removed {} expired entries", purged);
            self.persist(&state);
        }
        purged
    }

    /// Sets the preferred base currency. Blank codes are ignored.
    pub async fn set_base_currency(&self, code: &str) {
        let Some(code) = normalize_currency_code(code) else {
            debug!("Ignoring blank base currency");
            return;
        };
        let mut state = self.state.lock().await;
        state.base_currency = code;
        self.persist(&state);
    }

    pub async fn base_currency(&self) -> String {
        self.state.lock().await.base_currency.clone()
    }

    /// Number of entries currently held in table `T`.
    pub async fn len<T: CacheTable>(&self) -> usize {
        T::table(&*self.state.lock().await).len()
    }

    fn persist(&self, state: &CacheState) {
        let Some(snapshots) = &self.snapshots else {
            return;
        };
        let result = serde_json::to_vec(state)
            .map_err(anyhow::Error::from)
            .and_then(|bytes| snapshots.save(&bytes));
        if let Err(e) = result {
            warn!("Failed to persist cache snapshot: {}", e);
        }
    }
}
