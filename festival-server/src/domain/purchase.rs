//! Purchases and the per-concert visit aggregation.

use std::collections::HashMap;
use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Concert, ConcertId};

/// A visitor's identity in the external ticketing system.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VisitorId(String);

impl VisitorId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VisitorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One ticket-purchase operation from the external feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Purchase {
    /// Operation id in the external system.
    pub op_id: i64,
    pub visitor: VisitorId,
    pub concert: ConcertId,
    pub purchased_at: NaiveDateTime,
    pub price: Option<u32>,
}

/// One concert a visitor will attend, with purchase aggregates.
///
/// Multiple purchases of the same concert (group or repeat buys) collapse
/// into a single visit; the ticket count and total spend are retained.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Visit {
    pub concert: Concert,
    pub tickets: u32,
    pub spent: u32,
}

/// Collapse a visitor's purchases into one [`Visit`] per concert.
///
/// Purchases referencing a concert missing from `concerts` are dropped (the
/// reference data is incomplete, not an error). The result is sorted by
/// concert start time.
pub fn aggregate_visits(
    purchases: &[Purchase],
    concerts: &HashMap<ConcertId, Concert>,
) -> Vec<Visit> {
    let mut by_concert: HashMap<ConcertId, Visit> = HashMap::new();

    for purchase in purchases {
        let Some(concert) = concerts.get(&purchase.concert) else {
            debug!(concert = %purchase.concert, op = purchase.op_id, "purchase references unknown concert, skipping");
            continue;
        };
        let price = purchase.price.unwrap_or(0);
        by_concert
            .entry(purchase.concert)
            .and_modify(|visit| {
                visit.tickets += 1;
                visit.spent += price;
            })
            .or_insert_with(|| Visit {
                concert: concert.clone(),
                tickets: 1,
                spent: price,
            });
    }

    let mut visits: Vec<Visit> = by_concert.into_values().collect();
    visits.sort_by_key(|v| (v.concert.starts_at, v.concert.id));
    visits
}
