//! Rebuilding a visitor's day-by-day concert schedule from their visits.

mod transition;

use std::collections::BTreeMap;
use std::collections::HashSet;

use chrono::NaiveDate;

use crate::domain::{ConcertId, FestivalDay, Visit};

pub use transition::{Transition, TransitionStatus, compute_transition};

/// Day number (1-based) to that day's visits, in ascending start order.
pub type Itinerary = BTreeMap<u32, Vec<Visit>>;

/// Group a visitor's visits into numbered festival days.
///
/// Visits are deduplicated to one per concert and sorted chronologically.
/// Without explicit boundaries, day numbers follow the order in which
/// calendar dates first appear in the visitor's own schedule. With
/// `festival_days`, numbering follows the festival calendar instead, and
/// visits on dates outside the calendar are appended as extra days after it.
pub fn build_itinerary(visits: &[Visit], festival_days: Option<&[FestivalDay]>) -> Itinerary {
    let mut seen: HashSet<ConcertId> = HashSet::new();
    let mut ordered: Vec<&Visit> = visits
        .iter()
        .filter(|v| seen.insert(v.concert.id))
        .collect();
    ordered.sort_by_key(|v| (v.concert.starts_at, v.concert.id));

    let mut day_numbers: BTreeMap<NaiveDate, u32> = BTreeMap::new();
    let mut next_day = 1u32;
    if let Some(days) = festival_days {
        let mut calendar: Vec<NaiveDate> = days.iter().map(|d| d.day).collect();
        calendar.sort_unstable();
        calendar.dedup();
        for day in calendar {
            day_numbers.insert(day, next_day);
            next_day += 1;
        }
    }

    let mut itinerary = Itinerary::new();
    for visit in ordered {
        let date = visit.concert.starts_at.date();
        let number = *day_numbers.entry(date).or_insert_with(|| {
            let n = next_day;
            next_day += 1;
            n
        });
        itinerary.entry(number).or_default().push(visit.clone());
    }
    itinerary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Concert, ConcertId, VenueId};
    use chrono::{NaiveDate, NaiveTime};

    fn visit(id: i64, day: u32, hour: u32) -> Visit {
        Visit {
            concert: Concert {
                id: ConcertId(id),
                external_id: id,
                name: format!("concert {id}"),
                venue: VenueId(1),
                starts_at: NaiveDate::from_ymd_opt(2026, 6, day)
                    .unwrap()
                    .and_hms_opt(hour, 0, 0)
                    .unwrap(),
                duration_mins: 60,
                genre: None,
                price: None,
                tickets_left: None,
                on_sale: true,
            },
            tickets: 1,
            spent: 500,
        }
    }

    fn festival_day(day: u32) -> FestivalDay {
        FestivalDay {
            day: NaiveDate::from_ymd_opt(2026, 6, day).unwrap(),
            first_concert_time: NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
            end_of_last_concert: NaiveTime::from_hms_opt(22, 0, 0).unwrap(),
            concert_count: 0,
            available_concerts: 0,
        }
    }

    #[test]
    fn days_number_in_order_of_first_appearance() {
        let visits = vec![visit(1, 22, 19), visit(2, 20, 18), visit(3, 22, 15)];
        let itinerary = build_itinerary(&visits, None);

        assert_eq!(itinerary.len(), 2);
        assert_eq!(itinerary[&1].len(), 1); // 20 June, earliest start
        assert_eq!(itinerary[&2].len(), 2);
    }

    #[test]
    fn within_a_day_concerts_sort_by_start_time() {
        let visits = vec![visit(1, 20, 21), visit(2, 20, 15), visit(3, 20, 18)];
        let itinerary = build_itinerary(&visits, None);

        let ids: Vec<_> = itinerary[&1].iter().map(|v| v.concert.id).collect();
        assert_eq!(ids, vec![ConcertId(2), ConcertId(3), ConcertId(1)]);
    }

    #[test]
    fn duplicate_concerts_collapse_to_one() {
        let visits = vec![visit(1, 20, 18), visit(1, 20, 18)];
        let itinerary = build_itinerary(&visits, None);

        assert_eq!(itinerary[&1].len(), 1);
    }

    #[test]
    fn explicit_calendar_fixes_day_numbers() {
        // Visitor skips day 2 of the festival; their 23 June concert is
        // still day 3.
        let calendar = vec![festival_day(21), festival_day(22), festival_day(23)];
        let visits = vec![visit(1, 23, 18), visit(2, 21, 18)];
        let itinerary = build_itinerary(&visits, Some(&calendar));

        assert_eq!(itinerary[&1][0].concert.id, ConcertId(2));
        assert_eq!(itinerary[&3][0].concert.id, ConcertId(1));
        assert!(!itinerary.contains_key(&2));
    }

    #[test]
    fn out_of_calendar_dates_append_after_festival_days() {
        let calendar = vec![festival_day(21), festival_day(22)];
        let visits = vec![visit(1, 25, 18)];
        let itinerary = build_itinerary(&visits, Some(&calendar));

        assert_eq!(itinerary[&3][0].concert.id, ConcertId(1));
    }

    #[test]
    fn no_visits_is_an_empty_itinerary() {
        assert!(build_itinerary(&[], None).is_empty());
    }
}
