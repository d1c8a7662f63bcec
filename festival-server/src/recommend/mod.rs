//! Ranking routes against a visitor's stated preferences.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{Route, RouteId};

/// Which quality of a route the visitor cares about most.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Intellect,
    Comfort,
    Balance,
}

impl Priority {
    /// (intellect, comfort) weights for the combined score.
    fn weights(self) -> (f64, f64) {
        match self {
            Priority::Intellect => (1.0, 0.0),
            Priority::Comfort => (0.0, 1.0),
            Priority::Balance => (0.5, 0.5),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    pub priority: Priority,
    pub min_concerts: Option<u32>,
    pub max_concerts: Option<u32>,
    pub top_n: usize,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            priority: Priority::Balance,
            min_concerts: None,
            max_concerts: None,
            top_n: 10,
        }
    }
}

/// One ranked route with the scores that placed it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredRoute {
    pub route_id: RouteId,
    pub concert_count: u32,
    pub intellect_score: f64,
    pub comfort_score: f64,
    pub weighted_score: f64,
}

/// The four leaderboards served to the visitor, each capped at `top_n`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendations {
    pub top_weighted: Vec<ScoredRoute>,
    pub top_intellect: Vec<ScoredRoute>,
    pub top_comfort: Vec<ScoredRoute>,
    pub top_balanced: Vec<ScoredRoute>,
    /// The minimum actually applied after any relaxation.
    pub effective_min_concerts: Option<u32>,
}

/// Rank routes for a visitor.
///
/// When the requested concert-count band is empty, the minimum is relaxed
/// downward one concert at a time until routes appear; the maximum is the
/// visitor's hard ceiling and never moves.
pub fn recommend(routes: &[Route], prefs: &Preferences) -> Recommendations {
    let (band, effective_min) = select_band(routes, prefs);
    let (w_intellect, w_comfort) = prefs.priority.weights();

    let mut scored: Vec<ScoredRoute> = band
        .iter()
        .map(|route| {
            let intellect = route.intellect_score.unwrap_or(0.0);
            let comfort = route.comfort_score.unwrap_or(0.0);
            ScoredRoute {
                route_id: route.id,
                concert_count: route.concert_count,
                intellect_score: intellect,
                comfort_score: comfort,
                weighted_score: w_intellect * intellect + w_comfort * comfort,
            }
        })
        .collect();

    let top = |scored: &mut Vec<ScoredRoute>, key: fn(&ScoredRoute) -> f64, top_n: usize| {
        scored.sort_by(|a, b| {
            key(b)
                .partial_cmp(&key(a))
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.route_id.cmp(&b.route_id))
        });
        scored.iter().take(top_n).cloned().collect::<Vec<_>>()
    };

    let top_weighted = top(&mut scored, |s| s.weighted_score, prefs.top_n);
    let top_intellect = top(&mut scored, |s| s.intellect_score, prefs.top_n);
    let top_comfort = top(&mut scored, |s| s.comfort_score, prefs.top_n);
    // Balance is closeness of the two scores, smallest gap first.
    let top_balanced = top(
        &mut scored,
        |s| -(s.intellect_score - s.comfort_score).abs(),
        prefs.top_n,
    );

    Recommendations {
        top_weighted,
        top_intellect,
        top_comfort,
        top_balanced,
        effective_min_concerts: effective_min,
    }
}

fn select_band<'a>(routes: &'a [Route], prefs: &Preferences) -> (Vec<&'a Route>, Option<u32>) {
    let in_band = |min: Option<u32>, route: &Route| {
        min.is_none_or(|m| route.concert_count >= m)
            && prefs.max_concerts.is_none_or(|m| route.concert_count <= m)
    };

    let mut min = prefs.min_concerts;
    loop {
        let band: Vec<&Route> = routes.iter().filter(|r| in_band(min, r)).collect();
        if !band.is_empty() {
            if min != prefs.min_concerts {
                debug!(
                    requested = prefs.min_concerts,
                    effective = min,
                    "relaxed minimum concert count to fill the band"
                );
            }
            return (band, min);
        }
        match min {
            Some(m) if m > 0 => min = Some(m - 1),
            _ => return (Vec::new(), min),
        }
    }
}
