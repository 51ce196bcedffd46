//! Client-side cache and pagination primitives.
//!
//! `KeyedCache` is the live representation of every entity cache: a hash map
//! keyed by primary key, with store-time stamps for max-age expiry and a
//! recency index for bounded LRU eviction. Page slicing and filter predicates
//! operate on plain slices of cached values.

use crate::types::{ChainStatus, L2Chain, Transaction, TxStatus};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, OnceCell};

// ---------------------------------------------------------------------------
// Time

/// Millisecond wall clock, injectable so expiry is testable.
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> u64;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        chrono::Utc::now().timestamp_millis().max(0) as u64
    }
}

/// Clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock(AtomicU64);

impl ManualClock {
    pub fn new(start_ms: u64) -> Self {
        Self(AtomicU64::new(start_ms))
    }

    pub fn advance(&self, ms: u64) {
        self.0.fetch_add(ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }
}

// ---------------------------------------------------------------------------
// Keyed cache

/// A cached value and the time it was stored. Also the persisted entry shape
/// (`{ "value": ..., "timestamp": ... }`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stamped<V> {
    pub value: V,
    pub timestamp: u64,
}

#[derive(Debug)]
struct Slot<V> {
    stamped: Stamped<V>,
    tick: u64,
}

#[derive(Debug)]
pub struct KeyedCache<K, V> {
    slots: HashMap<K, Slot<V>>,
    /// tick → key, oldest first
    recency: BTreeMap<u64, K>,
    next_tick: u64,
    capacity: usize,
    max_age_ms: Option<u64>,
}

impl<K, V> KeyedCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// `capacity` is clamped to at least 1. `max_age_ms = None` never expires.
    pub fn new(capacity: usize, max_age_ms: Option<u64>) -> Self {
        Self {
            slots: HashMap::new(),
            recency: BTreeMap::new(),
            next_tick: 0,
            capacity: capacity.max(1),
            max_age_ms,
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    fn is_expired(&self, stored_at: u64, now_ms: u64) -> bool {
        self.max_age_ms
            .is_some_and(|max| now_ms.saturating_sub(stored_at) >= max)
    }

    fn bump(&mut self) -> u64 {
        self.next_tick += 1;
        self.next_tick
    }

    /// Returns a copy of the live entry and marks it most recently used.
    /// An expired entry is dropped and reported as a miss.
    pub fn get(&mut self, key: &K, now_ms: u64) -> Option<V> {
        let stored_at = self.slots.get(key)?.stamped.timestamp;
        if self.is_expired(stored_at, now_ms) {
            self.remove(key);
            return None;
        }
        let tick = self.bump();
        let slot = self.slots.get_mut(key)?;
        self.recency.remove(&slot.tick);
        slot.tick = tick;
        self.recency.insert(tick, key.clone());
        Some(slot.stamped.value.clone())
    }

    /// Live entry without touching recency.
    pub fn peek(&self, key: &K, now_ms: u64) -> Option<&V> {
        self.slots
            .get(key)
            .filter(|s| !self.is_expired(s.stamped.timestamp, now_ms))
            .map(|s| &s.stamped.value)
    }

    pub fn contains(&self, key: &K, now_ms: u64) -> bool {
        self.peek(key, now_ms).is_some()
    }

    pub fn insert(&mut self, key: K, value: V, now_ms: u64) {
        self.insert_stamped(
            key,
            Stamped {
                value,
                timestamp: now_ms,
            },
        );
    }

    /// Inserts with an existing stamp (used when rehydrating a snapshot).
    /// Evicts the least recently used entry when a new key arrives at capacity.
    pub fn insert_stamped(&mut self, key: K, stamped: Stamped<V>) {
        if let Some(old) = self.slots.remove(&key) {
            self.recency.remove(&old.tick);
        } else if self.slots.len() >= self.capacity {
            if let Some((_, oldest)) = self.recency.pop_first() {
                self.slots.remove(&oldest);
            }
        }
        let tick = self.bump();
        self.recency.insert(tick, key.clone());
        self.slots.insert(key, Slot { stamped, tick });
    }

    pub fn remove(&mut self, key: &K) -> Option<V> {
        let slot = self.slots.remove(key)?;
        self.recency.remove(&slot.tick);
        Some(slot.stamped.value)
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.recency.clear();
    }

    /// Drops every expired entry, returning how many were removed.
    pub fn purge_expired(&mut self, now_ms: u64) -> usize {
        let expired: Vec<K> = self
            .slots
            .iter()
            .filter(|(_, s)| self.is_expired(s.stamped.timestamp, now_ms))
            .map(|(k, _)| k.clone())
            .collect();
        for k in &expired {
            self.remove(k);
        }
        expired.len()
    }

    /// Live values, least recently used first.
    pub fn values(&self, now_ms: u64) -> impl Iterator<Item = &V> + '_ {
        self.recency
            .values()
            .filter_map(move |k| self.peek(k, now_ms))
    }

    /// All entries with their stamps, least recently used first, so that
    /// re-inserting them in order restores the same recency.
    pub fn export(&self) -> Vec<(K, Stamped<V>)> {
        self.recency
            .values()
            .filter_map(|k| self.slots.get(k).map(|s| (k.clone(), s.stamped.clone())))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Pagination and filters

/// Slice `[(page-1)*size, page*size)` of `items` plus the total item count.
/// Pages are 1-based; page 0 is treated as page 1. A page past the end is
/// empty but still reports the true total.
pub fn paginate<T: Clone>(items: &[T], page: usize, page_size: usize) -> (Vec<T>, usize) {
    let total = items.len();
    let page = page.max(1);
    let start = (page - 1).saturating_mul(page_size).min(total);
    let end = start.saturating_add(page_size).min(total);
    (items[start..end].to_vec(), total)
}

/// Parses a status filter; `"all"` and empty mean no filter.
pub fn parse_status_filter(s: &str) -> anyhow::Result<Option<TxStatus>> {
    match s.trim() {
        "" | "all" => Ok(None),
        other => other.parse().map(Some),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TxFilter {
    /// Exact status match
    pub status: Option<TxStatus>,
    /// Case-insensitive substring over signature, signer and recipient
    pub search: Option<String>,
}

impl TxFilter {
    pub fn with_status(mut self, status: TxStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_search(mut self, needle: impl Into<String>) -> Self {
        let needle = needle.into();
        self.search = if needle.trim().is_empty() {
            None
        } else {
            Some(needle)
        };
        self
    }

    pub fn matches(&self, tx: &Transaction) -> bool {
        if let Some(status) = self.status {
            if tx.status != status {
                return false;
            }
        }
        match &self.search {
            Some(needle) => {
                let needle = needle.to_lowercase();
                [&tx.signature, &tx.signer, &tx.recipient]
                    .iter()
                    .any(|field| field.to_lowercase().contains(&needle))
            }
            None => true,
        }
    }
}

/// Read-side filter over the L2 catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChainFilter {
    pub status: Option<ChainStatus>,
    /// Case-insensitive substring over id, name and native token
    pub search: Option<String>,
}

impl ChainFilter {
    pub fn matches(&self, chain: &L2Chain) -> bool {
        if self.status.is_some_and(|s| s != chain.status) {
            return false;
        }
        match &self.search {
            Some(needle) => {
                let needle = needle.to_lowercase();
                [&chain.id, &chain.name, &chain.native_token]
                    .iter()
                    .any(|field| field.to_lowercase().contains(&needle))
            }
            None => true,
        }
    }
}

// ---------------------------------------------------------------------------
// In-flight de-duplication

/// Collapses concurrent requests for the same key into one upstream call.
///
/// The first caller for a key runs the fetch; callers arriving while it is
/// pending await the same result. The slot is released once the fetch
/// settles, so a later call (e.g. after expiry) fetches again.
pub struct InFlight<K, V> {
    slots: Mutex<HashMap<K, Arc<OnceCell<Option<V>>>>>,
}

impl<K, V> Default for InFlight<K, V> {
    fn default() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
        }
    }
}

impl<K, V> InFlight<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub async fn run<F, Fut>(&self, key: K, fetch: F) -> Option<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Option<V>>,
    {
        let cell = {
            let mut slots = self.slots.lock().await;
            slots
                .entry(key.clone())
                .or_insert_with(|| Arc::new(OnceCell::new()))
                .clone()
        };
        let out = cell.get_or_init(fetch).await.clone();

        let mut slots = self.slots.lock().await;
        if slots.get(&key).is_some_and(|cur| Arc::ptr_eq(cur, &cell)) {
            slots.remove(&key);
        }
        out
    }

    pub async fn pending(&self) -> usize {
        self.slots.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    #[test]
    fn expired_entries_are_misses() {
        let mut cache: KeyedCache<String, u32> = KeyedCache::new(10, Some(1_000));
        cache.insert("a".into(), 1, 0);
        assert_eq!(cache.get(&"a".into(), 999), Some(1));
        assert_eq!(cache.get(&"a".into(), 1_000), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn no_max_age_never_expires() {
        let mut cache: KeyedCache<u64, u32> = KeyedCache::new(10, None);
        cache.insert(1, 1, 0);
        assert_eq!(cache.get(&1, u64::MAX), Some(1));
    }

    #[test]
    fn lru_evicts_least_recently_used_at_capacity() {
        let mut cache: KeyedCache<u64, &str> = KeyedCache::new(2, None);
        cache.insert(1, "one", 0);
        cache.insert(2, "two", 0);
        // touching 1 makes 2 the eviction candidate
        assert_eq!(cache.get(&1, 0), Some("one"));
        cache.insert(3, "three", 0);
        assert_eq!(cache.len(), 2);
        assert!(cache.contains(&1, 0));
        assert!(!cache.contains(&2, 0));
        assert!(cache.contains(&3, 0));

        // replacing an existing key never evicts
        cache.insert(3, "THREE", 0);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.peek(&3, 0), Some(&"THREE"));
    }

    #[test]
    fn export_preserves_recency_order_and_stamps() {
        let mut cache: KeyedCache<u64, u32> = KeyedCache::new(10, Some(100));
        cache.insert(1, 10, 5);
        cache.insert(2, 20, 6);
        cache.get(&1, 7);
        let exported = cache.export();
        assert_eq!(exported.iter().map(|(k, _)| *k).collect::<Vec<_>>(), vec![2, 1]);
        assert_eq!(exported[1].1.timestamp, 5);

        assert_eq!(cache.purge_expired(106), 2);
        assert!(cache.is_empty());
    }

    #[test]
    fn paginate_slices_and_reports_total() {
        let items: Vec<u32> = (1..=25).collect();
        assert_eq!(paginate(&items, 1, 10), ((1..=10).collect(), 25));
        assert_eq!(paginate(&items, 3, 10), ((21..=25).collect(), 25));
        assert_eq!(paginate(&items, 0, 10).0, paginate(&items, 1, 10).0);
        assert_eq!(paginate(&items, 4, 10), (vec![], 25));
        assert_eq!(paginate(&items, usize::MAX, usize::MAX), (vec![], 25));
        assert_eq!(paginate::<u32>(&[], 1, 10), (vec![], 0));
    }

    #[test]
    fn status_filter_parsing() {
        assert_eq!(parse_status_filter("all").unwrap(), None);
        assert_eq!(parse_status_filter("").unwrap(), None);
        assert_eq!(parse_status_filter("FAILED").unwrap(), Some(TxStatus::Failed));
        assert!(parse_status_filter("bogus").is_err());
    }

    #[tokio::test]
    async fn concurrent_runs_share_one_fetch() {
        let inflight: Arc<InFlight<String, u32>> = Arc::new(InFlight::default());
        let calls = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let inflight = inflight.clone();
            let calls = calls.clone();
            handles.push(tokio::spawn(async move {
                inflight
                    .run("k".to_string(), || async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(50)).await;
                        Some(7)
                    })
                    .await
            }));
        }
        for h in handles {
            assert_eq!(h.await.unwrap(), Some(7));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(inflight.pending().await, 0);

        // settled slots are released; the next call fetches again
        let again = inflight.run("k".to_string(), || async { None }).await;
        assert_eq!(again, None);
    }
}
