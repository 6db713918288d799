//! Name-keyed catalog of components of one kind.

use crate::capability::domain::{CapabilityError, CapabilityResult, Component};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Thread-safe catalog keyed by prefixed component name.
///
/// Listing follows insertion order. Registration is expected before the
/// registry becomes ready; mutating the catalog while requests are being
/// dispatched is unsupported and only guarded against data races.
pub struct Repository<C: ?Sized> {
    state: RwLock<CatalogState<C>>,
}

struct CatalogState<C: ?Sized> {
    entries: HashMap<String, CatalogEntry<C>>,
    next_sequence: u64,
}

struct CatalogEntry<C: ?Sized> {
    sequence: u64,
    component: Arc<C>,
}

impl<C: ?Sized> Default for Repository<C> {
    fn default() -> Self {
        Self {
            state: RwLock::new(CatalogState {
                entries: HashMap::new(),
                next_sequence: 0,
            }),
        }
    }
}

impl<C> Repository<C>
where
    C: ?Sized + Component,
{
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `component` under its prefixed name.
    ///
    /// # Errors
    ///
    /// Returns `ALREADY_EXISTS` when the name is taken. The catalog is left
    /// unchanged.
    pub fn register(&self, component: Arc<C>) -> CapabilityResult<()> {
        let name = component.name().as_str().to_owned();
        let mut state = self.write();
        if state.entries.contains_key(&name) {
            return Err(CapabilityError::already_exists(&name));
        }
        let sequence = state.next_sequence;
        state.next_sequence += 1;
        state.entries.insert(
            name,
            CatalogEntry {
                sequence,
                component,
            },
        );
        Ok(())
    }

    /// Looks up a component by prefixed name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<C>> {
        self.read()
            .entries
            .get(name)
            .map(|entry| Arc::clone(&entry.component))
    }

    /// Returns every component in insertion order.
    #[must_use]
    pub fn get_all(&self) -> Vec<Arc<C>> {
        let state = self.read();
        let mut entries: Vec<&CatalogEntry<C>> = state.entries.values().collect();
        entries.sort_by_key(|entry| entry.sequence);
        entries
            .into_iter()
            .map(|entry| Arc::clone(&entry.component))
            .collect()
    }

    /// Returns the wire descriptor of every component in insertion order.
    #[must_use]
    pub fn get_all_definitions(&self) -> Vec<C::Descriptor> {
        self.get_all()
            .iter()
            .map(|component| component.descriptor())
            .collect()
    }

    /// Removes the component registered under `name`.
    ///
    /// # Errors
    ///
    /// Returns `NOT_FOUND` when no such component exists.
    pub fn unregister(&self, name: &str) -> CapabilityResult<Arc<C>> {
        self.write()
            .entries
            .remove(name)
            .map(|entry| entry.component)
            .ok_or_else(|| {
                CapabilityError::not_found(name, format!("component {name} is not registered"))
            })
    }

    /// Returns the number of registered components.
    #[must_use]
    pub fn len(&self) -> usize {
        self.read().entries.len()
    }

    /// Returns `true` when nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read().entries.is_empty()
    }

    /// Returns the registered names in insertion order.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.get_all()
            .iter()
            .map(|component| component.name().to_string())
            .collect()
    }

    // Every mutation is a single map operation, so a poisoned lock still
    // guards a consistent catalog.
    fn read(&self) -> RwLockReadGuard<'_, CatalogState<C>> {
        self.state
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, CatalogState<C>> {
        self.state
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl<C> fmt::Debug for Repository<C>
where
    C: ?Sized + Component,
{
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Repository")
            .field("names", &self.names())
            .finish()
    }
}
