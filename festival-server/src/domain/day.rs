//! Festival-day boundaries.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// One day of the festival calendar, with programme-wide counts.
///
/// Supplied by the persistence layer; used as explicit day boundaries for
/// itinerary reconstruction and for the day-overview strip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FestivalDay {
    pub day: NaiveDate,
    pub first_concert_time: NaiveTime,
    pub end_of_last_concert: NaiveTime,
    pub concert_count: u32,
    pub available_concerts: u32,
}
