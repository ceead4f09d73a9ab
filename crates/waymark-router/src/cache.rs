//! Cache of built route tables, owned by whatever assembles them.

use std::hash::Hash;
use std::sync::Arc;

use dashmap::DashMap;

use crate::error::RouteError;
use crate::table::RouteTable;

/// Route tables keyed by the identity of the handler set that produced them.
///
/// Tables are handed out as `Arc`s. Clearing or replacing an entry never
/// affects tables already handed out, since a table is never mutated after
/// it is built.
#[derive(Debug)]
pub struct RouteTableCache<K, H>
where
    K: Eq + Hash,
{
    tables: DashMap<K, Arc<RouteTable<H>>>,
}

impl<K, H> Default for RouteTableCache<K, H>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self {
            tables: DashMap::new(),
        }
    }
}

impl<K, H> RouteTableCache<K, H>
where
    K: Eq + Hash + Clone,
{
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached table for `key`, building it on first use.
    ///
    /// The build runs without holding any lock. When several threads build
    /// the same key at once, the first table inserted is kept and returned
    /// to all of them; the other builds are dropped. A failed build caches
    /// nothing.
    pub fn get_or_build<F>(&self, key: K, build: F) -> Result<Arc<RouteTable<H>>, RouteError>
    where
        F: FnOnce() -> Result<RouteTable<H>, RouteError>,
    {
        if let Some(table) = self.get(&key) {
            return Ok(table);
        }

        let built = Arc::new(build()?);
        let table = Arc::clone(self.tables.entry(key).or_insert(built).value());
        tracing::debug!(entries = table.len(), "route table cached");
        Ok(table)
    }

    /// The cached table for `key`, if one was built.
    pub fn get(&self, key: &K) -> Option<Arc<RouteTable<H>>> {
        self.tables.get(key).map(|table| Arc::clone(table.value()))
    }

    /// Drop one cached table. Returns whether it was present.
    pub fn remove(&self, key: &K) -> bool {
        self.tables.remove(key).is_some()
    }

    /// Drop every cached table, e.g. after handlers were reloaded.
    pub fn invalidate(&self) {
        let count = self.tables.len();
        self.tables.clear();
        tracing::debug!(tables = count, "route table cache invalidated");
    }

    /// Number of cached tables.
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Whether no table is cached.
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}
