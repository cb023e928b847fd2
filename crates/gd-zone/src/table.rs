//! `ZoneTable<K, V>` — zone-partitioned record storage with per-record locks.
//!
//! # Locking model
//!
//! ```text
//! RwLock ── zones: ZoneKey → BTreeMap<K, Arc<Mutex<V>>>
//!        └─ index: K → ZoneKey
//! ```
//!
//! The outer `RwLock` only guards membership (which record lives in which
//! zone).  Each record has its own `Mutex`, so two writers touching
//! different records never contend, and a conditional update on one record
//! is a plain lock-check-write on that record's mutex.
//!
//! Lock order is always **table, then record**.  Callers must never call
//! back into a table while holding one of its record guards.
//!
//! Rosters are `BTreeMap`s so iteration within a zone is in ascending key
//! order, which is what dispatch tie-breaking relies on.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::ZoneKey;

#[cfg(feature = "fx-hash")]
type Map<K, V> = rustc_hash::FxHashMap<K, V>;
#[cfg(not(feature = "fx-hash"))]
type Map<K, V> = std::collections::HashMap<K, V>;

/// Lock a record, recovering the data if a previous holder panicked.
///
/// Record updates are single-field writes that cannot leave a value
/// half-modified, so a poisoned lock still guards consistent data.
#[inline]
pub fn lock<V>(m: &Mutex<V>) -> MutexGuard<'_, V> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

struct Inner<K, V> {
    zones: Map<ZoneKey, BTreeMap<K, Arc<Mutex<V>>>>,
    index: Map<K, ZoneKey>,
}

/// Concurrent map of zone → ordered roster of records.
pub struct ZoneTable<K, V> {
    inner: RwLock<Inner<K, V>>,
}

impl<K, V> Default for ZoneTable<K, V>
where
    K: Ord + Copy + std::hash::Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> ZoneTable<K, V>
where
    K: Ord + Copy + std::hash::Hash,
{
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner { zones: Map::default(), index: Map::default() }),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Inner<K, V>> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner<K, V>> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    // ── Membership ────────────────────────────────────────────────────────

    /// Insert `value` under `key` in `zone`, replacing any existing record
    /// for `key` (in whichever zone it was).  Returns the new record handle.
    pub fn insert(&self, zone: ZoneKey, key: K, value: V) -> Arc<Mutex<V>> {
        let handle = Arc::new(Mutex::new(value));
        let mut inner = self.write();
        if let Some(old_zone) = inner.index.remove(&key) {
            detach(&mut inner.zones, &old_zone, &key);
        }
        inner.zones.entry(zone.clone()).or_default().insert(key, Arc::clone(&handle));
        inner.index.insert(key, zone);
        handle
    }

    /// Move `key`'s record into `zone`.  Returns `false` if `key` is absent.
    pub fn relocate(&self, key: &K, zone: ZoneKey) -> bool {
        let mut inner = self.write();
        let Some(old_zone) = inner.index.get(key).cloned() else {
            return false;
        };
        if old_zone == zone {
            return true;
        }
        let Some(handle) = detach(&mut inner.zones, &old_zone, key) else {
            return false;
        };
        inner.zones.entry(zone.clone()).or_default().insert(*key, handle);
        inner.index.insert(*key, zone);
        true
    }

    /// Remove `key` unconditionally, returning its handle.
    pub fn remove(&self, key: &K) -> Option<Arc<Mutex<V>>> {
        let mut inner = self.write();
        let zone = inner.index.remove(key)?;
        detach(&mut inner.zones, &zone, key)
    }

    /// Remove `key` only if `pred` approves, evaluated under the record lock.
    ///
    /// `pred` may also mark the value (e.g. as retired) so that callers still
    /// holding a stale handle can tell the record is gone.
    pub fn remove_if<F>(&self, key: &K, pred: F) -> Option<Arc<Mutex<V>>>
    where
        F: FnOnce(&mut V) -> bool,
    {
        let mut inner = self.write();
        let zone = inner.index.get(key).cloned()?;
        let handle = inner.zones.get(&zone)?.get(key).cloned()?;
        let mut record = lock(&handle);
        if !pred(&mut *record) {
            return None;
        }
        drop(record);
        inner.index.remove(key);
        detach(&mut inner.zones, &zone, key)
    }

    // ── Lookup ────────────────────────────────────────────────────────────

    pub fn get(&self, key: &K) -> Option<Arc<Mutex<V>>> {
        let inner = self.read();
        let zone = inner.index.get(key)?;
        inner.zones.get(zone)?.get(key).cloned()
    }

    pub fn zone_of(&self, key: &K) -> Option<ZoneKey> {
        self.read().index.get(key).cloned()
    }

    pub fn contains(&self, key: &K) -> bool {
        self.read().index.contains_key(key)
    }

    /// Handles for every record in `zone`, in ascending key order.
    pub fn zone_snapshot(&self, zone: &ZoneKey) -> Vec<(K, Arc<Mutex<V>>)> {
        self.read()
            .zones
            .get(zone)
            .map(|roster| roster.iter().map(|(k, v)| (*k, Arc::clone(v))).collect())
            .unwrap_or_default()
    }

    /// Handles for every record, grouped by zone (zones sorted, keys
    /// ascending within each zone).
    pub fn snapshot(&self) -> Vec<(ZoneKey, K, Arc<Mutex<V>>)> {
        let inner = self.read();
        let mut zones: Vec<&ZoneKey> = inner.zones.keys().collect();
        zones.sort();
        zones
            .into_iter()
            .flat_map(|z| {
                inner.zones[z].iter().map(move |(k, v)| (z.clone(), *k, Arc::clone(v)))
            })
            .collect()
    }

    /// All non-empty zones, sorted.
    pub fn zones(&self) -> Vec<ZoneKey> {
        let mut zones: Vec<ZoneKey> = self.read().zones.keys().cloned().collect();
        zones.sort();
        zones
    }

    pub fn len(&self) -> usize {
        self.read().index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn zone_len(&self, zone: &ZoneKey) -> usize {
        self.read().zones.get(zone).map_or(0, BTreeMap::len)
    }
}

/// Remove `key` from `zone`'s roster, dropping the roster once empty.
fn detach<K: Ord, V>(
    zones: &mut Map<ZoneKey, BTreeMap<K, Arc<Mutex<V>>>>,
    zone:  &ZoneKey,
    key:   &K,
) -> Option<Arc<Mutex<V>>> {
    let roster = zones.get_mut(zone)?;
    let handle = roster.remove(key);
    if roster.is_empty() {
        zones.remove(zone);
    }
    handle
}
