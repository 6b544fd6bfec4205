//! Explicit TTL cache.
//!
//! Constructed once by the owner and handed to whoever needs it; there is no
//! global instance. Entries expire lazily on lookup.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

struct Entry<V> {
    value: V,
    expires_at: Option<Instant>,
}

impl<V> Entry<V> {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }
}

struct Inner<K, V> {
    entries: HashMap<K, Entry<V>>,
    /// Bumped by `remove` and `clear`.
    generation: u64,
}

pub struct TtlCache<K, V> {
    inner: Mutex<Inner<K, V>>,
}

impl<K, V> Default for TtlCache<K, V> {
    fn default() -> Self {
        Self {
            inner: Mutex::new(Inner {
                entries: HashMap::new(),
                generation: 0,
            }),
        }
    }
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner<K, V>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lookup(inner: &mut Inner<K, V>, key: &K) -> Option<V> {
        let expired = inner.entries.get(key)?.is_expired(Instant::now());
        if expired {
            inner.entries.remove(key);
            return None;
        }
        inner.entries.get(key).map(|entry| entry.value.clone())
    }

    /// Cached value, unless missing or expired.
    pub fn get(&self, key: &K) -> Option<V> {
        Self::lookup(&mut self.lock(), key)
    }

    /// Store a value. `None` keeps it until removed or cleared.
    pub fn insert(&self, key: K, value: V, ttl: Option<Duration>) {
        let expires_at = ttl.map(|ttl| Instant::now() + ttl);
        self.lock().entries.insert(key, Entry { value, expires_at });
    }

    pub fn remove(&self, key: &K) -> Option<V> {
        let mut inner = self.lock();
        inner.generation += 1;
        inner.entries.remove(key).map(|entry| entry.value)
    }

    pub fn clear(&self) {
        let mut inner = self.lock();
        inner.generation += 1;
        inner.entries.clear();
    }

    /// Number of stored entries, expired ones included until next touched.
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Return the cached value for `key`, or run `op` and cache its success.
    ///
    /// The lock is not held while `op` runs. If the cache is cleared or an
    /// entry removed meanwhile, the computed value is returned but not
    /// stored. Errors are returned and not cached.
    pub fn get_or_try_insert_with<E, F>(&self, key: K, ttl: Option<Duration>, op: F) -> Result<V, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        let generation = {
            let mut inner = self.lock();
            if let Some(value) = Self::lookup(&mut inner, &key) {
                return Ok(value);
            }
            inner.generation
        };

        let value = op()?;

        let mut inner = self.lock();
        if inner.generation == generation {
            let expires_at = ttl.map(|ttl| Instant::now() + ttl);
            inner.entries.insert(
                key,
                Entry {
                    value: value.clone(),
                    expires_at,
                },
            );
        }
        Ok(value)
    }
}
