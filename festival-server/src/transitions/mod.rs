//! Walk times between festival venues.
//!
//! The source matrix is directed, but physical walking time is symmetric, so
//! the table stores one entry per unordered venue pair under a canonical
//! `(min, max)` key. Lookup in either direction hits the same entry.
//!
//! An absent pair means "unknown", which is distinct from a stored
//! zero-minute walk (same building).

use std::collections::HashMap;

use crate::domain::VenueId;

fn pair_key(a: VenueId, b: VenueId) -> (VenueId, VenueId) {
    if a <= b { (a, b) } else { (b, a) }
}

/// Pairwise walk times between venues, in minutes.
#[derive(Debug, Clone, Default)]
pub struct TransitionTable {
    walks: HashMap<(VenueId, VenueId), u32>,
}

impl TransitionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from directed edges, e.g. rows of the source matrix.
    ///
    /// Diagonal (self-to-self) entries are skipped; when both directions of
    /// a pair appear, the later one wins.
    pub fn from_edges(edges: impl IntoIterator<Item = (VenueId, VenueId, u32)>) -> Self {
        let mut table = Self::new();
        for (from, to, minutes) in edges {
            table.insert(from, to, minutes);
        }
        table
    }

    /// Record the walk time between two venues. Self-pairs are ignored.
    pub fn insert(&mut self, from: VenueId, to: VenueId, minutes: u32) {
        if from == to {
            return;
        }
        self.walks.insert(pair_key(from, to), minutes);
    }

    /// Walk time between two venues, in minutes.
    ///
    /// Same-venue lookups short-circuit to `Some(0)` without consulting the
    /// table. `None` means the pair is unknown, not that the walk is free.
    pub fn walk(&self, from: VenueId, to: VenueId) -> Option<u32> {
        if from == to {
            return Some(0);
        }
        self.walks.get(&pair_key(from, to)).copied()
    }

    /// Number of stored unordered pairs.
    pub fn len(&self) -> usize {
        self.walks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.walks.is_empty()
    }
}
