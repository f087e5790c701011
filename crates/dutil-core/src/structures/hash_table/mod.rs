//! Byte-string keyed hash table with insertion-order iteration
//!
//! Buckets are chains of entry ids kept in [`List`]s. Entries live in an
//! arena and are threaded in insertion order, which is the order used by
//! [`HashTable::get_next`], [`HashTable::iter`] and [`HashTable::export`].
//! Keys are private copies held in an internal [`MemPool`], so callers can
//! reuse their key buffers right after a call.

use std::cmp::Ordering;
use std::fmt;

use crate::core::config::{PoolConfig, TableConfig};
use crate::debug_log;
use crate::structures::arena::{Arena, Index};
use crate::structures::list::List;
use crate::structures::mem_pool::{MemPool, PoolAlloc};
use crate::types::{Error, Identity, Result};


/// Block size of the pool holding key bytes
const KEY_BLOCK_SIZE: usize = 4096;

fn default_key_pool() -> PoolConfig {
    PoolConfig {
        default_block_size: KEY_BLOCK_SIZE,
        fence: false,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct EntryId(Index);

impl Identity for EntryId {
    // truncated to the low word on 32-bit targets; compare_ref stays exact
    #[inline]
    fn identity(&self) -> usize {
        ((u64::from(self.0.generation()) << 32) | self.0.slot() as u64) as usize
    }

    #[inline]
    fn same_ref(&self, other: &Self) -> bool {
        self == other
    }

    #[inline]
    fn compare_ref(&self, other: &Self) -> Ordering {
        (self.0.slot(), self.0.generation()).cmp(&(other.0.slot(), other.0.generation()))
    }
}

struct Entry<V> {
    key: PoolAlloc,
    hash: u64,
    data: V,
    prev: Option<EntryId>,
    next: Option<EntryId>,
}

/// Keys and data of a table as parallel vectors
///
/// Borrows the table; valid only while the table is not modified.
#[derive(Debug)]
pub struct Export<'a, V> {
    /// Keys in table order
    pub keys: Vec<&'a [u8]>,
    /// Data in the same order as `keys`
    pub datas: Vec<&'a V>,
}

/// Hash table keyed by arbitrary byte strings
pub struct HashTable<V> {
    entries: Arena<Entry<V>>,
    buckets: Vec<List<EntryId>>,
    keys: MemPool,
    hasher: ahash::RandomState,
    head: Option<EntryId>,
    tail: Option<EntryId>,
    max_load_factor: f64,
}

impl<V> HashTable<V> {
    /// Create an empty table with default sizing
    pub fn new() -> Result<Self> {
        Self::with_config(&TableConfig::default())
    }

    /// Create an empty table from configuration
    pub fn with_config(config: &TableConfig) -> Result<Self> {
        Self::with_key_pool(config, &default_key_pool())
    }

    /// Create an empty table whose key copies live in a pool built from `pool`
    pub fn with_key_pool(config: &TableConfig, pool: &PoolConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            entries: Arena::new(),
            buckets: Self::empty_buckets(config.bucket_count()?)?,
            keys: MemPool::from_config(pool)?,
            hasher: ahash::RandomState::new(),
            head: None,
            tail: None,
            max_load_factor: config.max_load_factor,
        })
    }

    fn empty_buckets(count: usize) -> Result<Vec<List<EntryId>>> {
        let mut buckets = Vec::new();
        buckets.try_reserve_exact(count)?;
        buckets.resize_with(count, List::new);
        Ok(buckets)
    }

    /// Number of entries; O(1)
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the table holds no entry
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Current bucket count
    #[inline]
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    #[inline]
    fn hash(&self, key: &[u8]) -> u64 {
        self.hasher.hash_one(key)
    }

    #[inline]
    fn bucket_of(&self, hash: u64) -> usize {
        (hash as usize) & (self.buckets.len() - 1)
    }

    #[inline]
    fn entry(&self, id: EntryId) -> Option<&Entry<V>> {
        self.entries.get(id.0)
    }

    #[inline]
    fn key_of(&self, entry: &Entry<V>) -> Option<&[u8]> {
        self.keys.bytes(&entry.key).ok()
    }

    fn find(&self, key: &[u8]) -> Option<EntryId> {
        let hash = self.hash(key);
        self.buckets[self.bucket_of(hash)].iter().copied().find(|&id| {
            self.entry(id)
                .is_some_and(|e| e.hash == hash && self.key_of(e) == Some(key))
        })
    }

    #[inline]
    fn check_key(key: &[u8]) -> Result<()> {
        if key.is_empty() {
            Err(Error::IllegalKey)
        } else {
            Ok(())
        }
    }

    /// Insert or replace; returns the replaced data.
    ///
    /// Replacing keeps the entry at its original position in table order.
    pub fn add(&mut self, key: &[u8], data: V) -> Result<Option<V>> {
        Self::check_key(key)?;
        if let Some(id) = self.find(key) {
            if let Some(entry) = self.entries.get_mut(id.0) {
                return Ok(Some(std::mem::replace(&mut entry.data, data)));
            }
        }

        let hash = self.hash(key);
        let stored = self.keys.alloc(key.len())?;
        if let Err(e) = self.keys.write_at(&stored, 0, key) {
            let _ = self.keys.free(stored, key.len());
            return Err(e);
        }

        let entry = Entry {
            key: stored,
            hash,
            data,
            prev: self.tail,
            next: None,
        };
        let id = match self.entries.insert(entry) {
            Ok(index) => EntryId(index),
            Err(e) => {
                let _ = self.keys.free(stored, key.len());
                return Err(e);
            }
        };
        let bucket = self.bucket_of(hash);
        if let Err(e) = self.buckets[bucket].append(id) {
            self.entries.remove(id.0);
            let _ = self.keys.free(stored, key.len());
            return Err(e);
        }

        match self.tail.and_then(|t| self.entries.get_mut(t.0)) {
            Some(last) => last.next = Some(id),
            None => self.head = Some(id),
        }
        self.tail = Some(id);

        if self.len() as f64 > self.buckets.len() as f64 * self.max_load_factor {
            self.grow();
        }
        Ok(None)
    }

    /// Double the bucket count; on allocation failure the table keeps its buckets
    fn grow(&mut self) {
        let Some(count) = self.buckets.len().checked_mul(2) else {
            return;
        };
        let Ok(mut buckets) = Self::empty_buckets(count) else {
            return;
        };
        let mut at = self.head;
        while let Some(id) = at {
            let Some(entry) = self.entry(id) else {
                return;
            };
            let slot = (entry.hash as usize) & (count - 1);
            if buckets[slot].append(id).is_err() {
                return;
            }
            at = entry.next;
        }
        debug_log!(
            "rehash: {} -> {} buckets for {} entries",
            self.buckets.len(),
            count,
            self.len()
        );
        self.buckets = buckets;
    }

    /// Data stored under `key`, `None` when absent
    pub fn retrieve(&self, key: &[u8]) -> Result<Option<&V>> {
        Self::check_key(key)?;
        Ok(self.find(key).and_then(|id| self.entry(id)).map(|e| &e.data))
    }

    /// Mutable data stored under `key`, `None` when absent
    pub fn retrieve_mut(&mut self, key: &[u8]) -> Result<Option<&mut V>> {
        Self::check_key(key)?;
        Ok(match self.find(key) {
            Some(id) => self.entries.get_mut(id.0).map(|e| &mut e.data),
            None => None,
        })
    }

    /// Whether `key` is present
    pub fn contains(&self, key: &[u8]) -> Result<bool> {
        Ok(self.retrieve(key)?.is_some())
    }

    /// Remove `key`, returning its data; a missing key is not an error
    pub fn remove(&mut self, key: &[u8]) -> Result<Option<V>> {
        Self::check_key(key)?;
        let Some(id) = self.find(key) else {
            return Ok(None);
        };
        let Some(entry) = self.entry(id) else {
            return Ok(None);
        };
        let bucket = self.bucket_of(entry.hash);
        self.buckets[bucket].remove(&id)?;

        let Some(entry) = self.entries.remove(id.0) else {
            return Ok(None);
        };
        match entry.prev.and_then(|p| self.entries.get_mut(p.0)) {
            Some(prev) => prev.next = entry.next,
            None => self.head = entry.next,
        }
        match entry.next.and_then(|n| self.entries.get_mut(n.0)) {
            Some(next) => next.prev = entry.prev,
            None => self.tail = entry.prev,
        }
        self.keys.free(entry.key, key.len())?;
        Ok(Some(entry.data))
    }

    /// Successor of `key` in table order.
    ///
    /// `None` or an empty key yields the first entry. The last entry and
    /// unknown keys yield `None`, the end marker.
    pub fn get_next(&self, key: Option<&[u8]>) -> Option<(&[u8], &V)> {
        let next = match key {
            None => self.head,
            Some(k) if k.is_empty() => self.head,
            Some(k) => self.entry(self.find(k)?)?.next,
        };
        let entry = self.entry(next?)?;
        Some((self.key_of(entry)?, &entry.data))
    }

    /// Entries in table order
    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            table: self,
            at: self.head,
        }
    }

    /// Keys and data as parallel vectors sized to `len`
    pub fn export(&self) -> Result<Export<'_, V>> {
        let mut keys = Vec::new();
        let mut datas = Vec::new();
        keys.try_reserve_exact(self.len())?;
        datas.try_reserve_exact(self.len())?;
        for (key, data) in self.iter() {
            keys.push(key);
            datas.push(data);
        }
        Ok(Export { keys, datas })
    }

    /// Build a table from parallel key and data sequences, copying every key
    pub fn import<K: AsRef<[u8]>>(keys: &[K], datas: Vec<V>) -> Result<Self> {
        if keys.len() != datas.len() {
            return Err(Error::illegal_argument(format!(
                "{} keys but {} data entries",
                keys.len(),
                datas.len()
            )));
        }
        let mut table = Self::new()?;
        for (key, data) in keys.iter().zip(datas) {
            table.add(key.as_ref(), data)?;
        }
        Ok(table)
    }

    /// Remove every entry; bucket and key memory is kept
    pub fn clear(&mut self) {
        self.entries.clear();
        for bucket in &mut self.buckets {
            bucket.clear();
        }
        self.keys.clear();
        self.head = None;
        self.tail = None;
    }
}

impl<V: fmt::Debug> fmt::Debug for HashTable<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// Iterator over a table in insertion order
pub struct Iter<'a, V> {
    table: &'a HashTable<V>,
    at: Option<EntryId>,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (&'a [u8], &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let table = self.table;
        let entry = table.entry(self.at?)?;
        self.at = entry.next;
        Some((table.key_of(entry)?, &entry.data))
    }
}

impl<'a, V> IntoIterator for &'a HashTable<V> {
    type Item = (&'a [u8], &'a V);
    type IntoIter = Iter<'a, V>;

    fn into_iter(self) -> Iter<'a, V> {
        self.iter()
    }
}
