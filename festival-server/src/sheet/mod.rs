//! Assembling the full per-visitor route sheet.
//!
//! The sheet is the one document a visitor sees: their concerts grouped
//! into festival days, the move between each pair of concerts, side events
//! fitted into the idle windows, totals for the whole visit, and how their
//! purchases line up with the official routes.

use chrono::NaiveDate;
use serde::Serialize;

use crate::catalog::{AvailableRoutes, RouteCatalog};
use crate::domain::{FestivalDay, Route, SideEvent, Venue, Visit, VisitorId};
use crate::itinerary::{Transition, build_itinerary, compute_transition};
use crate::matcher::{MatchResult, match_visitor};
use crate::slotter::{SlottedEvent, Window, slot_events};
use crate::transitions::TransitionTable;

/// Everything the sheet assembly reads; one snapshot, no shared state.
pub struct SheetContext<'a> {
    pub catalog: &'a RouteCatalog,
    pub available: &'a AvailableRoutes,
    pub table: &'a TransitionTable,
    pub venues: &'a [Venue],
    pub events: &'a [SideEvent],
    pub festival_days: &'a [FestivalDay],
}

/// One concert on the sheet, with its onward transition and the side events
/// slotted around it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SheetEntry {
    pub visit: Visit,
    /// Move to the next concert of the day; `None` for the day's last.
    pub transition: Option<Transition>,
    /// Suggestions before the day's first concert; empty elsewhere.
    pub events_before: Vec<SlottedEvent>,
    /// Suggestions in the gap to the next concert.
    pub events_between: Vec<SlottedEvent>,
    /// Suggestions after the day's last concert; empty elsewhere.
    pub events_after: Vec<SlottedEvent>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SheetDay {
    pub number: u32,
    pub date: NaiveDate,
    pub concerts: Vec<SheetEntry>,
}

/// Visit-wide totals for the sheet header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SheetSummary {
    pub concert_count: usize,
    pub day_count: usize,
    pub venue_count: usize,
    pub genre_count: usize,
    pub total_spent: u32,
    pub concert_mins: i64,
    /// Sum of the known walks between adjacent concerts; unknown walks
    /// contribute nothing.
    pub walk_mins: u32,
}

/// The visitor's match against the official routes, with the route's
/// details when one matched.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SheetMatch {
    pub result: MatchResult,
    pub route: Option<Route>,
    /// Whether every concert of the matched route is still purchasable.
    pub route_available: bool,
}

/// One festival day in the overview strip, with the visitor's own count.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayOverview {
    pub day: FestivalDay,
    pub visitor_concerts: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteSheet {
    pub visitor: VisitorId,
    pub summary: SheetSummary,
    pub route_match: SheetMatch,
    pub days: Vec<SheetDay>,
    pub festival_days_overview: Vec<DayOverview>,
}

/// Build the complete route sheet for one visitor.
///
/// A visitor with no purchases gets a valid empty sheet, never an error.
pub fn build_route_sheet(
    ctx: &SheetContext<'_>,
    visitor: &VisitorId,
    visits: &[Visit],
) -> RouteSheet {
    let calendar = (!ctx.festival_days.is_empty()).then_some(ctx.festival_days);
    let itinerary = build_itinerary(visits, calendar);

    let days: Vec<SheetDay> = itinerary
        .iter()
        .map(|(&number, day_visits)| build_day(ctx, number, day_visits))
        .collect();

    RouteSheet {
        visitor: visitor.clone(),
        summary: summarize(&days),
        route_match: match_against_routes(ctx, visits),
        festival_days_overview: overview(ctx.festival_days, visits),
        days,
    }
}

fn build_day(ctx: &SheetContext<'_>, number: u32, day_visits: &[Visit]) -> SheetDay {
    let last = day_visits.len() - 1;
    let concerts = day_visits
        .iter()
        .enumerate()
        .map(|(i, visit)| {
            let next = day_visits.get(i + 1);
            let transition = next.map(|n| compute_transition(&visit.concert, &n.concert, ctx.table));

            let events_before = if i == 0 {
                slot(ctx, &Window::before_first(&visit.concert))
            } else {
                Vec::new()
            };
            let events_between = match next {
                Some(n) => slot(ctx, &Window::between(&visit.concert, &n.concert)),
                None => Vec::new(),
            };
            let events_after = if i == last {
                slot(ctx, &Window::after_last(&visit.concert))
            } else {
                Vec::new()
            };

            SheetEntry {
                visit: visit.clone(),
                transition,
                events_before,
                events_between,
                events_after,
            }
        })
        .collect();

    SheetDay {
        number,
        date: day_visits[0].concert.starts_at.date(),
        concerts,
    }
}

fn slot(ctx: &SheetContext<'_>, window: &Window) -> Vec<SlottedEvent> {
    slot_events(window, ctx.events, ctx.table, ctx.venues)
}

fn summarize(days: &[SheetDay]) -> SheetSummary {
    let mut venues = std::collections::HashSet::new();
    let mut genres = std::collections::HashSet::new();
    let mut concert_count = 0;
    let mut total_spent = 0;
    let mut concert_mins = 0;
    let mut walk_mins = 0;

    for day in days {
        for entry in &day.concerts {
            concert_count += 1;
            venues.insert(entry.visit.concert.venue);
            if let Some(genre) = &entry.visit.concert.genre {
                genres.insert(genre.clone());
            }
            total_spent += entry.visit.spent;
            concert_mins += entry.visit.concert.duration_mins;
            if let Some(walk) = entry.transition.and_then(|t| t.walk_mins) {
                walk_mins += walk;
            }
        }
    }

    SheetSummary {
        concert_count,
        day_count: days.len(),
        venue_count: venues.len(),
        genre_count: genres.len(),
        total_spent,
        concert_mins,
        walk_mins,
    }
}

fn match_against_routes(ctx: &SheetContext<'_>, visits: &[Visit]) -> SheetMatch {
    let concert_ids: Vec<_> = visits.iter().map(|v| v.concert.id).collect();
    let result = match_visitor(ctx.catalog, &concert_ids);
    let route = result
        .best_route_id
        .and_then(|id| ctx.catalog.get(id))
        .cloned();
    let route_available = result
        .best_route_id
        .is_some_and(|id| ctx.available.contains(id));

    SheetMatch {
        result,
        route,
        route_available,
    }
}

fn overview(festival_days: &[FestivalDay], visits: &[Visit]) -> Vec<DayOverview> {
    festival_days
        .iter()
        .map(|day| DayOverview {
            day: day.clone(),
            visitor_concerts: visits
                .iter()
                .filter(|v| v.concert.starts_at.date() == day.day)
                .count(),
        })
        .collect()
}
