//! Concert records.

use std::fmt;

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::VenueId;

/// Identifier of a concert, as used in route compositions and purchases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConcertId(pub i64);

impl fmt::Display for ConcertId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A concert in the festival programme.
///
/// A concert belongs to exactly one venue and its duration is fixed once
/// created. `tickets_left` and `on_sale` mirror the external sales feed and
/// are snapshots, not live values; `tickets_left` legitimately reaches zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Concert {
    pub id: ConcertId,
    /// Identity in the source ticketing system, distinct from `id`.
    pub external_id: i64,
    pub name: String,
    pub venue: VenueId,
    pub starts_at: NaiveDateTime,
    pub duration_mins: i64,
    /// Free-text genre label.
    pub genre: Option<String>,
    pub price: Option<u32>,
    pub tickets_left: Option<u32>,
    pub on_sale: bool,
}

impl Concert {
    /// Duration as a chrono [`Duration`].
    pub fn duration(&self) -> Duration {
        Duration::minutes(self.duration_mins)
    }

    /// The moment the concert ends.
    pub fn end_time(&self) -> NaiveDateTime {
        self.starts_at + self.duration()
    }
}
