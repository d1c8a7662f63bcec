//! Whole-population route matching.
//!
//! Recomputing every visitor against every route is quadratic, so the batch
//! path narrows each visitor's candidates to the posting list of their
//! smallest concert id. Any route a visitor fits inside must contain that
//! concert, so the narrowing loses nothing for subset matches; it only skips
//! routes the exhaustive scan would have rejected anyway.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::catalog::RouteCatalog;
use crate::domain::{Composition, ConcertId, RouteId, VisitorId};

use super::MatchKind;

/// One visitor's purchased concert ids, as fed to the batch recompute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisitorConcerts {
    pub visitor: VisitorId,
    pub concert_ids: Vec<ConcertId>,
}

/// Persisted outcome of the batch recompute for one visitor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerRouteMatch {
    pub visitor: VisitorId,
    pub found: bool,
    pub match_type: MatchKind,
    pub reason: Option<String>,
    /// The visitor's concerts in canonical (sorted, deduplicated) order.
    pub customer_concerts: Vec<ConcertId>,
    pub customer_concerts_count: usize,
    pub best_route_id: Option<RouteId>,
    pub match_percentage: f64,
    pub total_routes_checked: usize,
    pub computed_at: NaiveDateTime,
}

impl CustomerRouteMatch {
    fn new(visitor: VisitorId, composition: &Composition, computed_at: NaiveDateTime) -> Self {
        Self {
            visitor,
            found: false,
            match_type: MatchKind::None,
            reason: None,
            customer_concerts: composition.ids().to_vec(),
            customer_concerts_count: composition.len(),
            best_route_id: None,
            match_percentage: 0.0,
            total_routes_checked: 0,
            computed_at,
        }
    }
}

/// Recompute route matches for every visitor in one pass over the catalog's
/// inverted index.
///
/// Results come back in input order, one per visitor, stamped with a single
/// shared `computed_at` so a batch is identifiable in storage.
pub fn match_all_visitors(
    catalog: &RouteCatalog,
    visitors: &[VisitorConcerts],
) -> Vec<CustomerRouteMatch> {
    let computed_at = chrono::Utc::now().naive_utc();
    let results: Vec<CustomerRouteMatch> = visitors
        .iter()
        .map(|v| match_one(catalog, v, computed_at))
        .collect();

    let matched = results.iter().filter(|r| r.found).count();
    info!(
        visitors = results.len(),
        matched,
        unmatched = results.len() - matched,
        "batch route match complete"
    );
    results
}

fn match_one(
    catalog: &RouteCatalog,
    visitor: &VisitorConcerts,
    computed_at: NaiveDateTime,
) -> CustomerRouteMatch {
    let composition = Composition::new(visitor.concert_ids.iter().copied());
    let mut result = CustomerRouteMatch::new(visitor.visitor.clone(), &composition, computed_at);

    let Some(first) = composition.first() else {
        result.reason = Some("no purchases".to_owned());
        return result;
    };

    if let Some(route_id) = catalog.exact_match(&composition) {
        result.found = true;
        result.match_type = MatchKind::Exact;
        result.match_percentage = 100.0;
        result.best_route_id = Some(route_id);
        result.total_routes_checked = 1;
        return result;
    }

    let candidates = catalog.routes_containing(first);
    result.total_routes_checked = candidates.len();

    let mut best: Option<(RouteId, f64)> = None;
    for &route_id in candidates {
        let Some(route) = catalog.get(route_id) else {
            continue;
        };
        if composition.len() < route.composition.len()
            && composition.is_subset_of(&route.composition)
        {
            let percentage = composition.len() as f64 / route.composition.len() as f64 * 100.0;
            if best.is_none_or(|(_, p)| percentage > p) {
                best = Some((route_id, percentage));
            }
        }
    }

    match best {
        Some((route_id, percentage)) => {
            result.found = true;
            result.match_type = MatchKind::Partial;
            result.match_percentage = percentage;
            result.best_route_id = Some(route_id);
        }
        None => result.reason = Some("no matching route".to_owned()),
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::test_support::record;

    fn visitor(name: &str, ids: &[i64]) -> VisitorConcerts {
        VisitorConcerts {
            visitor: VisitorId::new(name),
            concert_ids: ids.iter().copied().map(ConcertId).collect(),
        }
    }

    #[test]
    fn exact_hit_checks_one_route() {
        let catalog = RouteCatalog::from_records([record(1, "5,7,12"), record(2, "1,2")]);
        let results = match_all_visitors(&catalog, &[visitor("a", &[7, 5, 12])]);

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].match_type, MatchKind::Exact);
        assert_eq!(results[0].best_route_id, Some(RouteId(1)));
        assert_eq!(results[0].total_routes_checked, 1);
    }

    #[test]
    fn partial_scans_only_the_first_concerts_posting_list() {
        let catalog = RouteCatalog::from_records([
            record(1, "5,7,12"),
            record(2, "5,9"),
            record(3, "8,9"), // no concert 5, never scanned
        ]);
        let results = match_all_visitors(&catalog, &[visitor("a", &[5, 12])]);

        assert_eq!(results[0].match_type, MatchKind::Partial);
        assert_eq!(results[0].best_route_id, Some(RouteId(1)));
        assert!((results[0].match_percentage - 200.0 / 3.0).abs() < 1e-9);
        assert_eq!(results[0].total_routes_checked, 2);
    }

    #[test]
    fn empty_visitor_is_reported_not_skipped() {
        let catalog = RouteCatalog::from_records([record(1, "1,2")]);
        let results = match_all_visitors(&catalog, &[visitor("a", &[])]);

        assert!(!results[0].found);
        assert_eq!(results[0].total_routes_checked, 0);
        assert_eq!(results[0].reason.as_deref(), Some("no purchases"));
        assert!(results[0].customer_concerts.is_empty());
    }

    #[test]
    fn results_preserve_input_order_and_share_a_timestamp() {
        let catalog = RouteCatalog::from_records([record(1, "1,2")]);
        let results = match_all_visitors(
            &catalog,
            &[visitor("b", &[1, 2]), visitor("a", &[9]), visitor("c", &[1])],
        );

        let names: Vec<_> = results.iter().map(|r| r.visitor.clone()).collect();
        assert_eq!(
            names,
            vec![VisitorId::new("b"), VisitorId::new("a"), VisitorId::new("c")]
        );
        assert!(results.windows(2).all(|w| w[0].computed_at == w[1].computed_at));
    }

    #[test]
    fn canonical_concert_list_is_stored() {
        let catalog = RouteCatalog::default();
        let results = match_all_visitors(&catalog, &[visitor("a", &[3, 1, 3, 2])]);

        assert_eq!(
            results[0].customer_concerts,
            vec![ConcertId(1), ConcertId(2), ConcertId(3)]
        );
        assert_eq!(results[0].customer_concerts_count, 3);
    }
}
