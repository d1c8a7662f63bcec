//! Matching a visitor's purchased concerts against the route catalog.
//!
//! A visitor's concert set either equals a route's composition exactly, is a
//! strict subset of one (partial match, scored by coverage percentage), or
//! matches nothing. The exhaustive scan here is the reference behavior; the
//! whole-population recompute lives in [`batch`] and trades completeness for
//! speed.

mod batch;

use serde::{Deserialize, Serialize};

use crate::catalog::RouteCatalog;
use crate::domain::{Composition, ConcertId, RouteId};

pub use batch::{CustomerRouteMatch, VisitorConcerts, match_all_visitors};

/// Classification of a customer-route match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchKind {
    Exact,
    Partial,
    None,
}

/// Outcome of matching one visitor against the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub found: bool,
    pub match_type: MatchKind,
    /// Coverage of the matched route: 100 for exact, |visitor|/|route|*100
    /// for partial, 0 otherwise.
    pub match_percentage: f64,
    pub best_route_id: Option<RouteId>,
    /// Candidate routes actually scanned, for auditability.
    pub routes_checked: usize,
    pub reason: Option<String>,
}

impl MatchResult {
    fn none(routes_checked: usize, reason: impl Into<String>) -> Self {
        Self {
            found: false,
            match_type: MatchKind::None,
            match_percentage: 0.0,
            best_route_id: None,
            routes_checked,
            reason: Some(reason.into()),
        }
    }
}

/// Match one visitor's concert ids against the catalog, exhaustively.
///
/// The input need not be sorted or deduplicated. An exact composition match
/// wins outright; otherwise every route is scanned for the best strict
/// superset, highest coverage first, ties broken by catalog order.
pub fn match_visitor(catalog: &RouteCatalog, concert_ids: &[ConcertId]) -> MatchResult {
    let visitor = Composition::new(concert_ids.iter().copied());
    if visitor.is_empty() {
        return MatchResult::none(0, "no purchases");
    }

    if let Some(route_id) = catalog.exact_match(&visitor) {
        return MatchResult {
            found: true,
            match_type: MatchKind::Exact,
            match_percentage: 100.0,
            best_route_id: Some(route_id),
            routes_checked: catalog.len(),
            reason: None,
        };
    }

    let mut best: Option<(RouteId, f64)> = None;
    for route in catalog.routes() {
        if visitor.len() < route.composition.len() && visitor.is_subset_of(&route.composition) {
            let percentage = visitor.len() as f64 / route.composition.len() as f64 * 100.0;
            // Strictly-greater keeps the first-encountered route on ties.
            if best.is_none_or(|(_, p)| percentage > p) {
                best = Some((route.id, percentage));
            }
        }
    }

    match best {
        Some((route_id, percentage)) => MatchResult {
            found: true,
            match_type: MatchKind::Partial,
            match_percentage: percentage,
            best_route_id: Some(route_id),
            routes_checked: catalog.len(),
            reason: None,
        },
        None => MatchResult::none(catalog.len(), "no matching route"),
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::catalog::test_support::record;
    use proptest::prelude::*;

    fn catalog_and_visitor() -> impl Strategy<Value = (Vec<Vec<i64>>, Vec<i64>)> {
        (
            prop::collection::vec(prop::collection::vec(1i64..30, 1..8), 0..25),
            prop::collection::vec(1i64..30, 0..8),
        )
    }

    fn build_catalog(compositions: &[Vec<i64>]) -> RouteCatalog {
        RouteCatalog::from_records(compositions.iter().enumerate().map(|(i, ids)| {
            let joined = ids
                .iter()
                .map(|id| id.to_string())
                .collect::<Vec<_>>()
                .join(",");
            record(i as i64 + 1, &joined)
        }))
    }

    proptest! {
        /// Exact iff some route's composition equals the visitor's set.
        #[test]
        fn exactness((compositions, visitor) in catalog_and_visitor()) {
            let catalog = build_catalog(&compositions);
            let visitor_ids: Vec<ConcertId> =
                visitor.iter().copied().map(ConcertId).collect();
            let visitor_comp = Composition::new(visitor_ids.iter().copied());

            let result = match_visitor(&catalog, &visitor_ids);

            let has_exact = !visitor_comp.is_empty()
                && catalog
                    .routes()
                    .iter()
                    .any(|r| r.composition == visitor_comp);
            prop_assert_eq!(result.match_type == MatchKind::Exact, has_exact);
            if result.match_type == MatchKind::Exact {
                prop_assert_eq!(result.match_percentage, 100.0);
            }
        }

        /// A partial match is a strict subset with the exact percentage.
        #[test]
        fn subset_soundness((compositions, visitor) in catalog_and_visitor()) {
            let catalog = build_catalog(&compositions);
            let visitor_ids: Vec<ConcertId> =
                visitor.iter().copied().map(ConcertId).collect();
            let visitor_comp = Composition::new(visitor_ids.iter().copied());

            let result = match_visitor(&catalog, &visitor_ids);

            if result.match_type == MatchKind::Partial {
                let route = catalog.get(result.best_route_id.unwrap()).unwrap();
                prop_assert!(visitor_comp.is_subset_of(&route.composition));
                prop_assert!(visitor_comp.len() < route.composition.len());
                let expected =
                    visitor_comp.len() as f64 / route.composition.len() as f64 * 100.0;
                prop_assert_eq!(result.match_percentage, expected);
            }
        }

        /// `found` agrees with the match type.
        #[test]
        fn found_flag_consistent((compositions, visitor) in catalog_and_visitor()) {
            let catalog = build_catalog(&compositions);
            let visitor_ids: Vec<ConcertId> =
                visitor.iter().copied().map(ConcertId).collect();

            let result = match_visitor(&catalog, &visitor_ids);

            prop_assert_eq!(result.found, result.match_type != MatchKind::None);
            prop_assert_eq!(result.best_route_id.is_some(), result.found);
        }
    }
}
