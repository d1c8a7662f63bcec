//! The precomputed route catalog and its availability filter.
//!
//! Routes are generated by an offline process and bulk-loaded in the tens of
//! thousands; this module indexes them for O(1) exact-composition lookup and
//! sub-linear partial-match candidate pruning, and maintains the materialized
//! "available" subset as ticket availability changes.

mod availability;
mod handle;

use std::collections::HashMap;

use tracing::warn;

use crate::domain::{Concert, ConcertId, Composition, Route, RouteId, RouteRecord};

pub use availability::{
    AvailabilityStats, AvailableRoutes, InitStats, UpdateStats, filter_available,
    is_route_available,
};
pub use handle::{CatalogHandle, CatalogState, ReloadError};

/// Snapshot of the concert table, keyed by concert id.
///
/// Built once per availability computation so that membership and on-sale
/// checks are O(1) and nothing re-queries per concert.
#[derive(Debug, Clone, Default)]
pub struct ConcertIndex {
    concerts: HashMap<ConcertId, Concert>,
}

impl ConcertIndex {
    pub fn from_concerts(concerts: impl IntoIterator<Item = Concert>) -> Self {
        Self {
            concerts: concerts.into_iter().map(|c| (c.id, c)).collect(),
        }
    }

    pub fn get(&self, id: ConcertId) -> Option<&Concert> {
        self.concerts.get(&id)
    }

    /// True only for a known concert currently on sale.
    pub fn on_sale(&self, id: ConcertId) -> bool {
        self.concerts.get(&id).is_some_and(|c| c.on_sale)
    }

    pub fn len(&self) -> usize {
        self.concerts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.concerts.is_empty()
    }

    /// Borrow the underlying map, e.g. for visit aggregation.
    pub fn as_map(&self) -> &HashMap<ConcertId, Concert> {
        &self.concerts
    }
}

/// The loaded route catalog with its lookup indexes.
#[derive(Debug, Clone, Default)]
pub struct RouteCatalog {
    routes: Vec<Route>,
    by_id: HashMap<RouteId, usize>,
    /// Exact-match lookup; first-loaded route wins on duplicate compositions.
    by_composition: HashMap<Composition, RouteId>,
    /// Inverted index: concert id -> routes containing it, in load order.
    by_concert: HashMap<ConcertId, Vec<RouteId>>,
}

impl RouteCatalog {
    /// Build the catalog from ingested records.
    ///
    /// A record whose composition string fails to parse is logged and
    /// skipped; one bad row never aborts the batch.
    pub fn from_records(records: impl IntoIterator<Item = RouteRecord>) -> Self {
        let mut catalog = Self::default();
        for record in records {
            let record_id = record.id;
            match Route::from_record(record) {
                Ok(route) => catalog.push(route),
                Err(err) => {
                    warn!(route = record_id, %err, "skipping route with malformed composition");
                }
            }
        }
        catalog
    }

    fn push(&mut self, route: Route) {
        let id = route.id;
        self.by_id.insert(id, self.routes.len());
        self.by_composition
            .entry(route.composition.clone())
            .or_insert(id);
        for &concert in route.composition.ids() {
            self.by_concert.entry(concert).or_default().push(id);
        }
        self.routes.push(route);
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn get(&self, id: RouteId) -> Option<&Route> {
        self.by_id.get(&id).map(|&i| &self.routes[i])
    }

    /// Route whose composition equals `composition` exactly, if any.
    pub fn exact_match(&self, composition: &Composition) -> Option<RouteId> {
        self.by_composition.get(composition).copied()
    }

    /// Routes whose composition contains `concert`, in load order.
    pub fn routes_containing(&self, concert: ConcertId) -> &[RouteId] {
        self.by_concert
            .get(&concert)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
