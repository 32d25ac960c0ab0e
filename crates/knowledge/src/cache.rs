//! Bounded cache with per-entry TTL.
//!
//! Semantics:
//! - Capacity-bounded: inserting into a full cache evicts the oldest
//!   surviving entry (insertion order).
//! - Lazy expiry: TTLs are checked at read time and expired entries removed
//!   then. There is no background sweeper, so an expired entry that is never
//!   read occupies its slot until capacity eviction reaches it;
//!   `stats().expired_unread` exposes how many entries are in that state.
//!
//! Interior locking makes mutation safe from a multi-threaded host; no lock
//! is held across an await point (all operations are synchronous).

use std::collections::{HashMap, VecDeque};
use std::sync::RwLock;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

pub const DEFAULT_MAX_ENTRIES: usize = 100;

/// Counters and sizing exposed by `TtlCache::stats`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheStats {
    pub entries: usize,
    pub max_entries: usize,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    /// Entries past their TTL that no read has reclaimed yet.
    pub expired_unread: usize,
}

struct Entry<V> {
    value: V,
    stored_at: Instant,
    ttl: Option<Duration>,
}

impl<V> Entry<V> {
    fn is_expired(&self, now: Instant) -> bool {
        self.ttl
            .is_some_and(|ttl| now.duration_since(self.stored_at) >= ttl)
    }
}

struct Inner<V> {
    entries: HashMap<String, Entry<V>>,
    /// Keys in insertion order; front is the eviction candidate.
    order: VecDeque<String>,
    hits: u64,
    misses: u64,
    evictions: u64,
}

/// A bounded, TTL-aware key-value cache.
pub struct TtlCache<V> {
    inner: RwLock<Inner<V>>,
    max_entries: usize,
}

impl<V: Clone> TtlCache<V> {
    pub fn new(max_entries: usize) -> Self {
        Self {
            inner: RwLock::new(Inner {
                entries: HashMap::new(),
                order: VecDeque::new(),
                hits: 0,
                misses: 0,
                evictions: 0,
            }),
            max_entries: max_entries.max(1),
        }
    }

    /// Store a value, optionally with a TTL.
    ///
    /// Re-setting an existing key refreshes its value, TTL, and insertion
    /// order (it becomes the newest entry). Inserting a new key into a full
    /// cache evicts the oldest surviving entry first.
    pub fn set(&self, key: impl Into<String>, value: V, ttl: Option<Duration>) {
        let key = key.into();
        let mut inner = match self.inner.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        if inner.entries.contains_key(&key) {
            inner.order.retain(|k| k != &key);
        } else if inner.entries.len() >= self.max_entries {
            if let Some(oldest) = inner.order.pop_front() {
                inner.entries.remove(&oldest);
                inner.evictions += 1;
            }
        }

        inner.order.push_back(key.clone());
        inner.entries.insert(
            key,
            Entry {
                value,
                stored_at: Instant::now(),
                ttl,
            },
        );
    }

    /// Read a value. Expired entries are removed here — this is the only
    /// place expiry is enforced.
    pub fn get(&self, key: &str) -> Option<V> {
        let mut inner = match self.inner.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        let expired = match inner.entries.get(key) {
            None => {
                inner.misses += 1;
                return None;
            }
            Some(entry) => entry.is_expired(Instant::now()),
        };

        if expired {
            inner.entries.remove(key);
            inner.order.retain(|k| k != key);
            inner.misses += 1;
            return None;
        }

        inner.hits += 1;
        inner.entries.get(key).map(|e| e.value.clone())
    }

    /// Remove a single key. Returns whether it was present.
    pub fn remove(&self, key: &str) -> bool {
        let mut inner = match self.inner.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let removed = inner.entries.remove(key).is_some();
        if removed {
            inner.order.retain(|k| k != key);
        }
        removed
    }

    /// Drop every entry. Counters survive.
    pub fn clear(&self) {
        let mut inner = match self.inner.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        inner.entries.clear();
        inner.order.clear();
    }

    pub fn len(&self) -> usize {
        match self.inner.read() {
            Ok(guard) => guard.entries.len(),
            Err(poisoned) => poisoned.into_inner().entries.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        let inner = match self.inner.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let now = Instant::now();
        let expired_unread = inner.entries.values().filter(|e| e.is_expired(now)).count();
        CacheStats {
            entries: inner.entries.len(),
            max_entries: self.max_entries,
            hits: inner.hits,
            misses: inner.misses,
            evictions: inner.evictions,
            expired_unread,
        }
    }
}

impl<V: Clone> Default for TtlCache<V> {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ENTRIES)
    }
}
