//! Shared holder for the most recently loaded table.
//!
//! Readers take an `Arc` snapshot and search it without holding the lock, so
//! a concurrent [`TableStore::replace`] never changes a table mid-search.
use crate::parser::Table;
use std::sync::{Arc, PoisonError, RwLock};

#[derive(Debug)]
pub struct TableStore<T> {
    current: RwLock<Option<Arc<Table<T>>>>,
}

impl<T> Default for TableStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TableStore<T> {
    pub fn new() -> Self {
        Self {
            current: RwLock::new(None),
        }
    }

    /// Swap in a freshly parsed table. Returns the one it replaced.
    pub fn replace(&self, table: Table<T>) -> Option<Arc<Table<T>>> {
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        current.replace(Arc::new(table))
    }

    /// The current table, or `None` if nothing was ever loaded.
    pub fn snapshot(&self) -> Option<Arc<Table<T>>> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Whether any table has been loaded, even an empty one.
    pub fn is_loaded(&self) -> bool {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    pub fn clear(&self) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = None;
    }
}
