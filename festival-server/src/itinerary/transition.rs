//! Classifying the move between two chronologically adjacent concerts.

use serde::{Deserialize, Serialize};

use crate::domain::Concert;
use crate::transitions::TransitionTable;

/// How comfortable the move from one concert to the next is, given the gap
/// between them and the walk time between their venues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionStatus {
    /// Same venue, no move at all.
    SameHall,
    /// One-minute walk, different hall in the same building.
    SameBuilding,
    /// The next concert starts before the visitor can plausibly arrive.
    Overlap,
    /// Arrival is possible but only at a run.
    Hurry,
    /// Enough time to walk, none to spare.
    Tight,
    /// Comfortable margin.
    Success,
    /// No walk time recorded for this venue pair.
    NoTransitionData,
}

/// The move between two adjacent concerts within one festival day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    /// Gap from the first concert's end to the second's start, in whole
    /// minutes. Negative when the concerts overlap; never clamped.
    pub time_between_mins: i64,
    pub walk_mins: Option<u32>,
    pub status: TransitionStatus,
}

/// Margins around the walk time, in minutes. A gap up to 3 minutes short of
/// the walk still counts as reachable at a run; 10 minutes over the walk is
/// the first comfortable margin.
const HURRY_SLACK_MINS: i64 = 3;
const COMFORT_MARGIN_MINS: i64 = 10;

pub fn compute_transition(
    current: &Concert,
    next: &Concert,
    table: &TransitionTable,
) -> Transition {
    let time_between_mins = (next.starts_at - current.end_time()).num_minutes();
    let walk_mins = table.walk(current.venue, next.venue);

    let status = match walk_mins {
        None => TransitionStatus::NoTransitionData,
        Some(0) => TransitionStatus::SameHall,
        Some(1) => TransitionStatus::SameBuilding,
        Some(walk) => {
            let walk = i64::from(walk);
            if time_between_mins < walk - HURRY_SLACK_MINS {
                TransitionStatus::Overlap
            } else if time_between_mins < walk {
                TransitionStatus::Hurry
            } else if time_between_mins < walk + COMFORT_MARGIN_MINS {
                TransitionStatus::Tight
            } else {
                TransitionStatus::Success
            }
        }
    };

    Transition {
        time_between_mins,
        walk_mins,
        status,
    }
}
