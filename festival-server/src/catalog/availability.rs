//! The materialized set of routes whose every concert is still on sale.
//!
//! Invariant: the available set is always a subset of the catalog. It is
//! recomputed with a two-pass diff whenever ticket state flips, because a
//! full rebuild over tens of thousands of routes is too expensive to run on
//! every change.

use std::collections::HashSet;

use tracing::info;

use crate::domain::{Route, RouteId};

use super::{ConcertIndex, RouteCatalog};

/// How often batch passes report progress, in routes.
const PROGRESS_EVERY: usize = 1000;

/// True iff every concert in the route's composition is known and on sale.
///
/// An unknown concert id excludes the route (fail-closed).
pub fn is_route_available(route: &Route, index: &ConcertIndex) -> bool {
    route.composition.ids().iter().all(|&id| index.on_sale(id))
}

/// Result of a full availability initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InitStats {
    pub total: usize,
    pub available: usize,
    pub unavailable: usize,
}

/// Result of an incremental availability update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateStats {
    pub previous: usize,
    pub removed: usize,
    pub added: usize,
    pub current: usize,
    pub net_change: i64,
}

/// Availability counters for dashboards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AvailabilityStats {
    pub total: usize,
    pub available: usize,
    pub unavailable: usize,
    pub availability_percentage: f64,
}

/// The materialized available-route subset.
#[derive(Debug, Clone, Default)]
pub struct AvailableRoutes {
    ids: HashSet<RouteId>,
}

impl AvailableRoutes {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Full pass over the catalog; run once when no materialized set exists.
    pub fn initialize(catalog: &RouteCatalog, index: &ConcertIndex) -> (Self, InitStats) {
        let total = catalog.len();
        info!(total, "initializing available routes");

        let mut ids = HashSet::new();
        for (i, route) in catalog.routes().iter().enumerate() {
            if is_route_available(route, index) {
                ids.insert(route.id);
            }
            let done = i + 1;
            if done % PROGRESS_EVERY == 0 || done == total {
                info!(checked = done, total, available = ids.len(), "availability check progress");
            }
        }

        let stats = InitStats {
            total,
            available: ids.len(),
            unavailable: total - ids.len(),
        };
        info!(
            available = stats.available,
            unavailable = stats.unavailable,
            "availability initialization finished"
        );
        (Self { ids }, stats)
    }

    /// Initialize only if the set is empty. Returns the stats when a full
    /// pass actually ran.
    pub fn ensure_initialized(
        &mut self,
        catalog: &RouteCatalog,
        index: &ConcertIndex,
    ) -> Option<InitStats> {
        if !self.ids.is_empty() {
            return None;
        }
        let (set, stats) = Self::initialize(catalog, index);
        *self = set;
        Some(stats)
    }

    /// Two-pass incremental diff against a fresh availability snapshot.
    ///
    /// Pass 1 re-checks only the currently-available routes and removes the
    /// ones that went off sale (or vanished from the catalog). Pass 2 checks
    /// only routes not yet marked available and adds the ones that came back.
    pub fn update(&mut self, catalog: &RouteCatalog, index: &ConcertIndex) -> UpdateStats {
        let previous = self.ids.len();
        info!(previous, "updating available routes");

        let stale: Vec<RouteId> = self
            .ids
            .iter()
            .filter(|&&id| {
                catalog
                    .get(id)
                    .is_none_or(|route| !is_route_available(route, index))
            })
            .copied()
            .collect();
        for id in &stale {
            self.ids.remove(id);
        }

        let total = catalog.len();
        let mut added = 0usize;
        for (i, route) in catalog.routes().iter().enumerate() {
            if !self.ids.contains(&route.id) && is_route_available(route, index) {
                self.ids.insert(route.id);
                added += 1;
            }
            let done = i + 1;
            if done % PROGRESS_EVERY == 0 || done == total {
                info!(checked = done, total, newly_available = added, "availability update progress");
            }
        }

        let current = self.ids.len();
        let stats = UpdateStats {
            previous,
            removed: stale.len(),
            added,
            current,
            net_change: current as i64 - previous as i64,
        };
        info!(
            removed = stats.removed,
            added = stats.added,
            current = stats.current,
            "availability update finished"
        );
        stats
    }

    pub fn contains(&self, id: RouteId) -> bool {
        self.ids.contains(&id)
    }

    pub fn ids(&self) -> &HashSet<RouteId> {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Counters for the admin dashboard; cheap enough to cache with a TTL.
    pub fn stats(&self, catalog: &RouteCatalog) -> AvailabilityStats {
        let total = catalog.len();
        let available = self.ids.len();
        let percentage = if total > 0 {
            (available as f64 / total as f64 * 10_000.0).round() / 100.0
        } else {
            0.0
        };
        AvailabilityStats {
            total,
            available,
            unavailable: total - available,
            availability_percentage: percentage,
        }
    }
}

/// Set of route ids whose every concert is on sale in `index`.
///
/// The one-shot form of [`AvailableRoutes::initialize`] for callers that
/// just need the set.
pub fn filter_available(catalog: &RouteCatalog, index: &ConcertIndex) -> HashSet<RouteId> {
    catalog
        .routes()
        .iter()
        .filter(|route| is_route_available(route, index))
        .map(|route| route.id)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{concert, record};
    use super::*;
    use crate::catalog::RouteCatalog;
    use crate::domain::ConcertId;

    fn catalog() -> RouteCatalog {
        RouteCatalog::from_records([record(1, "1,2"), record(2, "1,3"), record(3, "2,3")])
    }

    fn index(on_sale: &[i64], off_sale: &[i64]) -> ConcertIndex {
        ConcertIndex::from_concerts(
            on_sale
                .iter()
                .map(|&id| concert(id, true))
                .chain(off_sale.iter().map(|&id| concert(id, false))),
        )
    }

    #[test]
    fn initialize_marks_fully_on_sale_routes() {
        let catalog = catalog();
        let index = index(&[1, 2], &[3]);

        let (available, stats) = AvailableRoutes::initialize(&catalog, &index);

        assert!(available.contains(RouteId(1)));
        assert!(!available.contains(RouteId(2)));
        assert!(!available.contains(RouteId(3)));
        assert_eq!(
            stats,
            InitStats {
                total: 3,
                available: 1,
                unavailable: 2,
            },
        );
    }

    #[test]
    fn unknown_concert_excludes_route() {
        let catalog = RouteCatalog::from_records([record(1, "1,99")]);
        let index = index(&[1], &[]);

        let set = filter_available(&catalog, &index);
        assert!(set.is_empty());
    }

    #[test]
    fn available_set_is_subset_of_catalog() {
        let catalog = catalog();
        let index = index(&[1, 2, 3], &[]);

        let set = filter_available(&catalog, &index);
        for id in &set {
            assert!(catalog.get(*id).is_some());
        }
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn update_removes_newly_off_sale_routes() {
        let catalog = catalog();
        let (mut available, _) = AvailableRoutes::initialize(&catalog, &index(&[1, 2, 3], &[]));

        // Concert 3 goes off sale: routes 2 and 3 must drop out.
        let stats = available.update(&catalog, &index(&[1, 2], &[3]));

        assert_eq!(stats.previous, 3);
        assert_eq!(stats.removed, 2);
        assert_eq!(stats.added, 0);
        assert_eq!(stats.current, 1);
        assert_eq!(stats.net_change, -2);
        assert!(available.contains(RouteId(1)));
    }

    #[test]
    fn update_adds_newly_on_sale_routes() {
        let catalog = catalog();
        let (mut available, _) = AvailableRoutes::initialize(&catalog, &index(&[1, 2], &[3]));
        assert_eq!(available.len(), 1);

        let stats = available.update(&catalog, &index(&[1, 2, 3], &[]));

        assert_eq!(stats.added, 2);
        assert_eq!(stats.removed, 0);
        assert_eq!(stats.current, 3);
        assert_eq!(stats.net_change, 2);
    }

    #[test]
    fn ensure_initialized_runs_once() {
        let catalog = catalog();
        let index = index(&[1, 2, 3], &[]);

        let mut available = AvailableRoutes::empty();
        assert!(available.ensure_initialized(&catalog, &index).is_some());
        assert!(available.ensure_initialized(&catalog, &index).is_none());
    }

    #[test]
    fn stats_percentage() {
        let catalog = catalog();
        let (available, _) = AvailableRoutes::initialize(&catalog, &index(&[1, 2], &[3]));

        let stats = available.stats(&catalog);
        assert_eq!(stats.total, 3);
        assert_eq!(stats.available, 1);
        assert_eq!(stats.unavailable, 2);
        assert!((stats.availability_percentage - 33.33).abs() < 1e-9);
    }

    #[test]
    fn empty_catalog_stats() {
        let catalog = RouteCatalog::default();
        let available = AvailableRoutes::empty();
        let stats = available.stats(&catalog);
        assert_eq!(stats.availability_percentage, 0.0);
    }

    #[test]
    fn availability_follows_on_sale_flag_not_ticket_counter() {
        let mut c = concert(1, true);
        c.tickets_left = Some(0);
        let index = ConcertIndex::from_concerts([c, concert(2, true)]);
        let catalog = RouteCatalog::from_records([record(1, "1,2")]);

        assert!(index.on_sale(ConcertId(1)));
        assert_eq!(filter_available(&catalog, &index).len(), 1);
    }
}
