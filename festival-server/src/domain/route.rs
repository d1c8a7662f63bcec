//! Route (candidate itinerary) records and their composition.
//!
//! A route's composition is persisted as a sorted comma-joined string
//! ("5,7,12"). Inside the core it is always the typed, sorted form; the
//! string conversion happens only at the load/save boundary.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::ConcertId;

/// Identifier of a precomputed route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RouteId(pub i64);

impl fmt::Display for RouteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error returned when a composition string contains a non-numeric token.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid concert id in composition: {token:?}")]
pub struct CompositionError {
    token: String,
}

/// The unordered concert-ID set a route is made of.
///
/// Stored sorted and deduplicated, so equality and hashing are
/// order-insensitive and the serialized form ("5,7,12") is canonical.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Composition(Vec<ConcertId>);

impl Composition {
    /// Build a composition from arbitrary ids, sorting and deduplicating.
    pub fn new(ids: impl IntoIterator<Item = ConcertId>) -> Self {
        let mut ids: Vec<ConcertId> = ids.into_iter().collect();
        ids.sort_unstable();
        ids.dedup();
        Self(ids)
    }

    /// Parse the comma-joined serialized form.
    ///
    /// Tokens may appear in any order and with surrounding whitespace; empty
    /// tokens are ignored. A non-numeric token fails the whole composition.
    ///
    /// # Examples
    ///
    /// ```
    /// use festival_server::domain::Composition;
    ///
    /// let c = Composition::parse("12, 5,7").unwrap();
    /// assert_eq!(c.to_string(), "5,7,12");
    ///
    /// assert!(Composition::parse("5,x,12").is_err());
    /// assert!(Composition::parse("").unwrap().is_empty());
    /// ```
    pub fn parse(s: &str) -> Result<Self, CompositionError> {
        let mut ids = Vec::new();
        for token in s.split(',') {
            let token = token.trim();
            if token.is_empty() {
                continue;
            }
            let id: i64 = token.parse().map_err(|_| CompositionError {
                token: token.to_string(),
            })?;
            ids.push(ConcertId(id));
        }
        Ok(Self::new(ids))
    }

    pub fn ids(&self) -> &[ConcertId] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The smallest concert id, if any.
    pub fn first(&self) -> Option<ConcertId> {
        self.0.first().copied()
    }

    pub fn contains(&self, id: ConcertId) -> bool {
        self.0.binary_search(&id).is_ok()
    }

    /// True if every id of `self` appears in `other`.
    pub fn is_subset_of(&self, other: &Composition) -> bool {
        self.0.iter().all(|id| other.contains(*id))
    }
}

impl fmt::Display for Composition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for id in &self.0 {
            if !first {
                f.write_str(",")?;
            }
            write!(f, "{id}")?;
            first = false;
        }
        Ok(())
    }
}

/// A route record as handed over by the ingestion layer, composition still
/// in its serialized form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteRecord {
    pub id: i64,
    pub composition: String,
    pub days: u32,
    pub concert_count: u32,
    pub venue_count: u32,
    pub genre: Option<String>,
    pub show_time_mins: f64,
    pub transit_time_mins: f64,
    pub wait_time_mins: f64,
    pub cost: f64,
    pub comfort_score: Option<f64>,
    pub comfort_level: Option<String>,
    pub intellect_score: Option<f64>,
    pub intellect_category: Option<String>,
}

/// A precomputed candidate itinerary.
///
/// Routes are generated offline and bulk-loaded; the core only reads,
/// filters and matches them. The comfort and intellect scores are two
/// independent 0-100 metrics computed by the offline process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub id: RouteId,
    pub composition: Composition,
    pub days: u32,
    pub concert_count: u32,
    pub venue_count: u32,
    pub genre: Option<String>,
    pub show_time_mins: f64,
    pub transit_time_mins: f64,
    pub wait_time_mins: f64,
    pub cost: f64,
    pub comfort_score: Option<f64>,
    pub comfort_level: Option<String>,
    pub intellect_score: Option<f64>,
    pub intellect_category: Option<String>,
}

impl Route {
    /// Parse a record's composition string into the typed form.
    pub fn from_record(record: RouteRecord) -> Result<Self, CompositionError> {
        let composition = Composition::parse(&record.composition)?;
        Ok(Self {
            id: RouteId(record.id),
            composition,
            days: record.days,
            concert_count: record.concert_count,
            venue_count: record.venue_count,
            genre: record.genre,
            show_time_mins: record.show_time_mins,
            transit_time_mins: record.transit_time_mins,
            wait_time_mins: record.wait_time_mins,
            cost: record.cost,
            comfort_score: record.comfort_score,
            comfort_level: record.comfort_level,
            intellect_score: record.intellect_score,
            intellect_category: record.intellect_category,
        })
    }
}
