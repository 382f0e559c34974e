//! A bounded cache ordered by recency of use, with a pluggable equality function.
//!
//! Lookups scan the list under a shared lock. Inserting or promoting an entry takes the
//! exclusive lock; a version counter tells the writer whether the list changed since the
//! optimistic scan, in which case it scans again.

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::trace;

type EqualityFn<T> = Box<dyn Fn(&T, &T) -> bool + Send + Sync>;

/// Outcome of `MostRecentlyUsedCache::lookup()`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CacheLookup<T> {
    /// An equal entry was cached; this is the cached entry.
    Hit(T),
    /// No equal entry was cached; the looked up item has been inserted.
    Inserted(T),
    Miss,
}

impl<T> CacheLookup<T> {
    /// Whether an equal entry existed before the lookup.
    pub fn is_hit(&self) -> bool {
        matches!(self, CacheLookup::Hit(_))
    }

    pub fn cached(&self) -> Option<&T> {
        match self {
            CacheLookup::Hit(t) | CacheLookup::Inserted(t) => Some(t),
            CacheLookup::Miss => None,
        }
    }

    pub fn into_cached(self) -> Option<T> {
        match self {
            CacheLookup::Hit(t) | CacheLookup::Inserted(t) => Some(t),
            CacheLookup::Miss => None,
        }
    }
}

struct Entries<T> {
    // index 0 is the most recently used entry
    list: Vec<T>,
    version: u64,
}

pub struct MostRecentlyUsedCache<T> {
    max_size: usize,
    fn_equals: EqualityFn<T>,
    entries: RwLock<Entries<T>>,
}

impl<T: PartialEq + 'static> MostRecentlyUsedCache<T> {
    pub fn new(max_size: usize) -> MostRecentlyUsedCache<T> {
        MostRecentlyUsedCache::with_equality(max_size, |a: &T, b: &T| a == b)
    }
}

impl<T> MostRecentlyUsedCache<T> {
    pub fn with_equality<F>(max_size: usize, fn_equals: F) -> MostRecentlyUsedCache<T>
    where
        F: Fn(&T, &T) -> bool + Send + Sync + 'static,
    {
        MostRecentlyUsedCache {
            max_size,
            fn_equals: Box::new(fn_equals),
            entries: RwLock::new(Entries {
                list: Vec::with_capacity(max_size),
                version: 0,
            }),
        }
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn len(&self) -> usize {
        self.read().list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        let mut entries = self.write();
        entries.list.clear();
        entries.version += 1;
    }

    fn read(&self) -> RwLockReadGuard<'_, Entries<T>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Entries<T>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn position(&self, list: &[T], item: &T) -> Option<usize> {
        list.iter().position(|cached| (self.fn_equals)(cached, item))
    }
}

impl<T: Clone> MostRecentlyUsedCache<T> {
    /// Looks up an entry equal to `item`.
    ///
    /// With `add`, a found entry is moved to the front and a missing one is inserted at the
    /// front, dropping the least recently used entry if the cache is over capacity.
    pub fn lookup(&self, item: T, add: bool) -> CacheLookup<T> {
        let (found, seen_version) = self.scan(&item);

        match &found {
            Some((ix, cached)) if !add || *ix == 0 => return CacheLookup::Hit(cached.clone()),
            None if !add => return CacheLookup::Miss,
            _ => (),
        }
        self.promote_or_insert(item, found.map(|(ix, _)| ix), seen_version)
    }

    /// Optimistic lookup under the shared lock. Returns the position and a copy of the equal
    /// entry, plus the list version the scan saw.
    fn scan(&self, item: &T) -> (Option<(usize, T)>, u64) {
        let entries = self.read();
        let found = self
            .position(&entries.list, item)
            .map(|ix| (ix, entries.list[ix].clone()));
        (found, entries.version)
    }

    /// Moves the entry at `found` (or a new entry for `item`) to the front. `found` is only
    /// trusted if the list is still at `seen_version`.
    fn promote_or_insert(
        &self,
        item: T,
        found: Option<usize>,
        seen_version: u64,
    ) -> CacheLookup<T> {
        let mut entries = self.write();
        let ix = if entries.version == seen_version {
            found
        } else {
            // list has changed; find it again
            self.position(&entries.list, &item)
        };

        let result = match ix {
            Some(ix) => {
                let cached = entries.list.remove(ix);
                entries.list.insert(0, cached.clone());
                CacheLookup::Hit(cached)
            }
            None => {
                entries.list.insert(0, item.clone());
                CacheLookup::Inserted(item)
            }
        };

        while entries.list.len() > self.max_size {
            entries.list.pop();
            trace!(max_size = self.max_size, "evicted least recently used cache entry");
        }
        entries.version += 1;
        result
    }

    /// Copy of all entries, most recently used first.
    pub fn snapshot(&self) -> Vec<T> {
        self.read().list.clone()
    }
}
