use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

/// Performance metrics for cache effectiveness
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of cache hits
    pub hits: usize,
    /// Number of cache misses
    pub misses: usize,
    /// Number of entries dropped to respect the capacity
    pub evictions: usize,
}

struct Slot<K, V> {
    key: K,
    value: V,
    /// Towards the most recently used end
    prev: Option<usize>,
    /// Towards the least recently used end
    next: Option<usize>,
}

/// Capacity-bounded least-recently-used map
///
/// Entries live in a slot arena and are threaded onto an intrusive
/// recency list, so lookups, insertions and evictions are O(1) apart from
/// hashing. A capacity of zero disables caching entirely.
pub struct LruCache<K, V> {
    capacity: usize,
    index: HashMap<K, usize>,
    slots: Vec<Option<Slot<K, V>>>,
    free: Vec<usize>,
    head: Option<usize>,
    tail: Option<usize>,

    /// Cache performance statistics
    pub stats: CacheStats,
}

impl<K, V> fmt::Debug for LruCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LruCache")
            .field("len", &self.index.len())
            .field("capacity", &self.capacity)
            .field("stats", &self.stats)
            .finish()
    }
}

impl<K, V> LruCache<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Create an empty cache holding at most `capacity` entries
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            index: HashMap::with_capacity(capacity.min(4096)),
            slots: Vec::new(),
            free: Vec::new(),
            head: None,
            tail: None,
            stats: CacheStats::default(),
        }
    }

    /// Maximum number of entries
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of entries currently held
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Whether the cache holds no entries
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Whether a key is cached, without touching recency or statistics
    pub fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    /// Look up a value and mark it most recently used
    pub fn get(&mut self, key: &K) -> Option<&V> {
        let Some(&slot) = self.index.get(key) else {
            self.stats.misses += 1;
            return None;
        };
        self.stats.hits += 1;
        self.touch(slot);
        self.value(slot)
    }

    /// Look up a value without affecting recency or statistics
    pub fn peek(&self, key: &K) -> Option<&V> {
        self.index.get(key).and_then(|&slot| self.value(slot))
    }

    /// Retrieve a cached value or compute, store and return a new one
    ///
    /// Nothing is stored when `compute_fn` yields `None`.
    pub fn get_or_compute<F>(&mut self, key: K, compute_fn: F) -> Option<V>
    where
        F: FnOnce() -> Option<V>,
        V: Clone,
    {
        if let Some(&slot) = self.index.get(&key) {
            self.stats.hits += 1;
            self.touch(slot);
            return self.value(slot).cloned();
        }

        self.stats.misses += 1;
        let value = compute_fn()?;
        self.insert(key, value.clone());
        Some(value)
    }

    /// Insert or replace a value, returning the entry evicted to make room
    pub fn insert(&mut self, key: K, value: V) -> Option<(K, V)> {
        if self.capacity == 0 {
            return Some((key, value));
        }
        if let Some(&slot) = self.index.get(&key) {
            if let Some(entry) = self.slots.get_mut(slot).and_then(Option::as_mut) {
                entry.value = value;
            }
            self.touch(slot);
            return None;
        }

        let evicted = if self.index.len() >= self.capacity {
            self.evict_least_recent()
        } else {
            None
        };
        self.insert_new(key, value);
        evicted
    }

    /// Remove an entry
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let slot = self.index.remove(key)?;
        self.detach(slot);
        self.free.push(slot);
        self.slots
            .get_mut(slot)
            .and_then(Option::take)
            .map(|entry| entry.value)
    }

    /// Keep only the entries for which `keep` returns true
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&K, &V) -> bool,
    {
        let doomed: Vec<K> = self
            .slots
            .iter()
            .flatten()
            .filter(|entry| !keep(&entry.key, &entry.value))
            .map(|entry| entry.key.clone())
            .collect();
        for key in &doomed {
            self.remove(key);
        }
    }

    /// Drop every entry, keeping statistics
    pub fn clear(&mut self) {
        self.index.clear();
        self.slots.clear();
        self.free.clear();
        self.head = None;
        self.tail = None;
    }

    /// Keys from most to least recently used
    pub fn keys_by_recency(&self) -> Vec<K> {
        let mut keys = Vec::with_capacity(self.len());
        let mut cursor = self.head;
        while let Some(slot) = cursor {
            let Some(entry) = self.slots.get(slot).and_then(Option::as_ref) else {
                break;
            };
            keys.push(entry.key.clone());
            cursor = entry.next;
        }
        keys
    }

    fn value(&self, slot: usize) -> Option<&V> {
        self.slots
            .get(slot)
            .and_then(Option::as_ref)
            .map(|entry| &entry.value)
    }

    fn insert_new(&mut self, key: K, value: V) -> usize {
        let entry = Slot {
            key: key.clone(),
            value,
            prev: None,
            next: None,
        };
        let slot = if let Some(slot) = self.free.pop() {
            if let Some(cell) = self.slots.get_mut(slot) {
                *cell = Some(entry);
            }
            slot
        } else {
            self.slots.push(Some(entry));
            self.slots.len() - 1
        };
        self.index.insert(key, slot);
        self.push_front(slot);
        slot
    }

    fn evict_least_recent(&mut self) -> Option<(K, V)> {
        let slot = self.tail?;
        self.detach(slot);
        self.free.push(slot);
        let entry = self.slots.get_mut(slot).and_then(Option::take)?;
        self.index.remove(&entry.key);
        self.stats.evictions += 1;
        Some((entry.key, entry.value))
    }

    fn touch(&mut self, slot: usize) {
        if self.head != Some(slot) {
            self.detach(slot);
            self.push_front(slot);
        }
    }

    fn detach(&mut self, slot: usize) {
        let Some((prev, next)) = self
            .slots
            .get(slot)
            .and_then(Option::as_ref)
            .map(|entry| (entry.prev, entry.next))
        else {
            return;
        };

        match prev {
            Some(prev) => {
                if let Some(entry) = self.slots.get_mut(prev).and_then(Option::as_mut) {
                    entry.next = next;
                }
            }
            None => self.head = next,
        }
        match next {
            Some(next) => {
                if let Some(entry) = self.slots.get_mut(next).and_then(Option::as_mut) {
                    entry.prev = prev;
                }
            }
            None => self.tail = prev,
        }

        if let Some(entry) = self.slots.get_mut(slot).and_then(Option::as_mut) {
            entry.prev = None;
            entry.next = None;
        }
    }

    fn push_front(&mut self, slot: usize) {
        let old_head = self.head;
        if let Some(entry) = self.slots.get_mut(slot).and_then(Option::as_mut) {
            entry.prev = None;
            entry.next = old_head;
        }
        match old_head {
            Some(head) => {
                if let Some(entry) = self.slots.get_mut(head).and_then(Option::as_mut) {
                    entry.prev = Some(slot);
                }
            }
            None => self.tail = Some(slot),
        }
        self.head = Some(slot);
    }
}
