//! Slotting side-program events into a visitor's idle windows.
//!
//! A window is the idle time around or between a visitor's concerts. An
//! event fits when it is recommended, runs entirely inside the window, its
//! venue can be resolved, and the walking legs on both sides leave enough of
//! the window for the event itself. Everything here is a pure function of
//! its inputs; re-running a slotting produces the same answer.

use chrono::{Duration, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::{Concert, SideEvent, Venue, VenueId};
use crate::transitions::TransitionTable;

/// How early before the day's first concert a visitor is assumed to be
/// around, and when the evening ends for after-last suggestions.
const BEFORE_FIRST_LOOKBACK_HOURS: i64 = 4;
const EVENING_CLOSE: (u32, u32) = (22, 0);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WindowKind {
    BeforeFirst,
    Between,
    AfterLast,
}

/// An idle window in a visitor's day.
///
/// A `None` boundary venue means the visitor has no fixed position on that
/// side of the window, so no walking leg is charged there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Window {
    pub opens_at: NaiveDateTime,
    pub closes_at: NaiveDateTime,
    pub from_venue: Option<VenueId>,
    pub to_venue: Option<VenueId>,
    kind: WindowKind,
}

impl Window {
    /// The gap between two adjacent concerts of one day.
    pub fn between(current: &Concert, next: &Concert) -> Self {
        Self {
            opens_at: current.end_time(),
            closes_at: next.starts_at,
            from_venue: Some(current.venue),
            to_venue: Some(next.venue),
            kind: WindowKind::Between,
        }
    }

    /// The morning before the day's first concert.
    pub fn before_first(first: &Concert) -> Self {
        Self {
            opens_at: first.starts_at - Duration::hours(BEFORE_FIRST_LOOKBACK_HOURS),
            closes_at: first.starts_at,
            from_venue: None,
            to_venue: Some(first.venue),
            kind: WindowKind::BeforeFirst,
        }
    }

    /// The evening after the day's last concert, up to the close of the
    /// festival programme. Empty when the concert already ends later.
    pub fn after_last(last: &Concert) -> Self {
        let close = last
            .starts_at
            .date()
            .and_time(NaiveTime::from_hms_opt(EVENING_CLOSE.0, EVENING_CLOSE.1, 0)
                .unwrap_or(NaiveTime::MIN));
        Self {
            opens_at: last.end_time(),
            closes_at: close,
            from_venue: Some(last.venue),
            to_venue: None,
            kind: WindowKind::AfterLast,
        }
    }

    pub fn length_mins(&self) -> i64 {
        (self.closes_at - self.opens_at).num_minutes()
    }
}

/// A side event that fits a window, with the walking legs that were charged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlottedEvent {
    pub event: SideEvent,
    /// Walk from the window's starting venue to the event, if any.
    pub walk_to_mins: u32,
    /// Walk from the event to the window's closing venue, if any.
    pub walk_from_mins: u32,
    pub total_walk_mins: u32,
    pub duration_mins: i64,
    pub window_mins: i64,
}

/// Pick the events that fit a window, sorted by start time.
///
/// Events whose venue cannot be resolved, or whose walking leg is unknown,
/// are excluded rather than assumed reachable.
pub fn slot_events(
    window: &Window,
    events: &[SideEvent],
    table: &TransitionTable,
    venues: &[Venue],
) -> Vec<SlottedEvent> {
    let window_mins = window.length_mins();
    if window_mins <= 0 {
        return Vec::new();
    }

    let mut slotted: Vec<SlottedEvent> = events
        .iter()
        .filter(|e| e.recommended)
        .filter_map(|event| try_slot(window, window_mins, event, table, venues))
        .collect();

    match window.kind {
        // Mornings surface the curated picks first.
        WindowKind::BeforeFirst => {
            slotted.sort_by_key(|s| (!s.event.recommended, s.event.starts_at, s.event.id));
        }
        WindowKind::Between | WindowKind::AfterLast => {
            slotted.sort_by_key(|s| (s.event.starts_at, s.event.id));
        }
    }
    slotted
}

fn try_slot(
    window: &Window,
    window_mins: i64,
    event: &SideEvent,
    table: &TransitionTable,
    venues: &[Venue],
) -> Option<SlottedEvent> {
    if event.starts_at < window.opens_at || event.starts_at >= window.closes_at {
        return None;
    }

    let duration_mins = match event.duration_mins() {
        Ok(mins) => mins,
        Err(error) => {
            warn!(event = event.id, %error, "skipping side event with bad duration");
            return None;
        }
    };
    if event.starts_at + Duration::minutes(duration_mins) > window.closes_at {
        return None;
    }

    let event_venue = resolve_venue(&event.venue_name, venues)?;
    let walk_to_mins = match window.from_venue {
        Some(from) => table.walk(from, event_venue)?,
        None => 0,
    };
    let walk_from_mins = match window.to_venue {
        Some(to) => table.walk(event_venue, to)?,
        None => 0,
    };

    let total_walk_mins = walk_to_mins + walk_from_mins;
    if i64::from(total_walk_mins) + duration_mins > window_mins {
        return None;
    }

    Some(SlottedEvent {
        event: event.clone(),
        walk_to_mins,
        walk_from_mins,
        total_walk_mins,
        duration_mins,
        window_mins,
    })
}

/// Resolve a free-text venue name to a catalog venue.
///
/// The source data abbreviates and decorates venue names, so matching is a
/// case-insensitive substring test in both directions; the first catalog hit
/// wins.
fn resolve_venue(name: &str, venues: &[Venue]) -> Option<VenueId> {
    let needle = name.trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }
    venues
        .iter()
        .find(|v| {
            let catalog = v.name.to_lowercase();
            catalog.contains(&needle) || needle.contains(&catalog)
        })
        .map(|v| v.id)
}
