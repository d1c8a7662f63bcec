//! Shared catalog state with single-reload discipline.
//!
//! Bulk reloads and availability recomputes are long-running batch jobs.
//! Readers must never observe a half-updated state, and two diff-based
//! updates must never race: the handle computes the new state off to the
//! side, then swaps it in as one atomic store, and an advisory lock refuses
//! a second reload while one is in flight.

use std::sync::{Arc, Mutex, RwLock};

use crate::domain::RouteRecord;

use super::{AvailableRoutes, ConcertIndex, InitStats, RouteCatalog, UpdateStats};

/// Error returned when a bulk job is refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReloadError {
    /// Another bulk reload or availability recompute is already running.
    #[error("a bulk reload is already in flight")]
    InProgress,
}

/// One immutable snapshot of the catalog and its available subset.
#[derive(Debug, Clone)]
pub struct CatalogState {
    pub catalog: Arc<RouteCatalog>,
    pub available: AvailableRoutes,
}

impl CatalogState {
    pub fn new(catalog: RouteCatalog, available: AvailableRoutes) -> Self {
        Self {
            catalog: Arc::new(catalog),
            available,
        }
    }
}

/// Handle through which request paths read and batch jobs replace the
/// catalog state.
#[derive(Debug)]
pub struct CatalogHandle {
    state: RwLock<Arc<CatalogState>>,
    reload: Mutex<()>,
}

impl CatalogHandle {
    pub fn new(state: CatalogState) -> Self {
        Self {
            state: RwLock::new(Arc::new(state)),
            reload: Mutex::new(()),
        }
    }

    /// Current snapshot; cheap, safe to hold across request handling.
    pub fn snapshot(&self) -> Arc<CatalogState> {
        self.state
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Replace the whole catalog from freshly-ingested records and run the
    /// full availability pass.
    ///
    /// Fails fast with [`ReloadError::InProgress`] instead of queueing.
    pub fn reload(
        &self,
        records: Vec<RouteRecord>,
        index: &ConcertIndex,
    ) -> Result<InitStats, ReloadError> {
        let _guard = self
            .reload
            .try_lock()
            .map_err(|_| ReloadError::InProgress)?;

        let catalog = RouteCatalog::from_records(records);
        let (available, stats) = AvailableRoutes::initialize(&catalog, index);
        self.swap(CatalogState::new(catalog, available));
        Ok(stats)
    }

    /// Recompute availability against a fresh concert snapshot using the
    /// incremental diff, then swap the new state in.
    pub fn refresh_availability(&self, index: &ConcertIndex) -> Result<UpdateStats, ReloadError> {
        let _guard = self
            .reload
            .try_lock()
            .map_err(|_| ReloadError::InProgress)?;

        let current = self.snapshot();
        let mut available = current.available.clone();
        let stats = available.update(&current.catalog, index);
        self.swap(CatalogState {
            catalog: Arc::clone(&current.catalog),
            available,
        });
        Ok(stats)
    }

    fn swap(&self, state: CatalogState) {
        *self.state.write().unwrap_or_else(|e| e.into_inner()) = Arc::new(state);
    }
}
