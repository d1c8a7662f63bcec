//! Side-program (off-programme) events.
//!
//! Talks, workshops and other non-concert activities that can be slotted
//! into a visitor's idle time. The source data states durations as
//! "HH:MM[:SS]" strings and uses "00:00" to mean "short/unspecified", not
//! "instantaneous".

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Default applied when an event's duration is stated as zero or missing.
const DEFAULT_EVENT_MINS: i64 = 30;

/// Error returned for a duration string that cannot be parsed at all.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid event duration: {reason}")]
pub struct EventDurationError {
    reason: &'static str,
}

impl EventDurationError {
    fn new(reason: &'static str) -> Self {
        Self { reason }
    }
}

/// Parse an event duration in "HH:MM" or "HH:MM:SS" form into minutes.
///
/// An empty string or a stated "00:00" yields the 30-minute default; a
/// string that is present but malformed is an error (the caller logs and
/// skips that record).
///
/// # Examples
///
/// ```
/// use festival_server::domain::parse_event_duration;
///
/// assert_eq!(parse_event_duration("01:30").unwrap(), 90);
/// assert_eq!(parse_event_duration("01:30:00").unwrap(), 90);
/// assert_eq!(parse_event_duration("00:00").unwrap(), 30);
/// assert_eq!(parse_event_duration("").unwrap(), 30);
/// assert!(parse_event_duration("ninety").is_err());
/// ```
pub fn parse_event_duration(s: &str) -> Result<i64, EventDurationError> {
    let s = s.trim();
    if s.is_empty() {
        return Ok(DEFAULT_EVENT_MINS);
    }

    let mut parts = s.split(':');
    let (Some(hours), Some(minutes)) = (parts.next(), parts.next()) else {
        return Err(EventDurationError::new("expected HH:MM[:SS]"));
    };
    let hours: i64 = hours
        .trim()
        .parse()
        .map_err(|_| EventDurationError::new("non-numeric hours"))?;
    let minutes: i64 = minutes
        .trim()
        .parse()
        .map_err(|_| EventDurationError::new("non-numeric minutes"))?;
    if hours < 0 || !(0..60).contains(&minutes) {
        return Err(EventDurationError::new("out-of-range components"));
    }

    let total = hours * 60 + minutes;
    if total == 0 {
        Ok(DEFAULT_EVENT_MINS)
    } else {
        Ok(total)
    }
}

/// Format of a side-program event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventFormat {
    Lecture,
    Workshop,
    Masterclass,
    Consultation,
    Broadcast,
    Other,
}

/// One side-program event.
///
/// `venue_name` is free text from the source data and names venues
/// inconsistently; resolution against the venue catalog is by substring
/// match, not equality.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SideEvent {
    pub id: i64,
    pub number: u32,
    pub name: String,
    pub description: Option<String>,
    pub starts_at: NaiveDateTime,
    /// Duration as stated by the source, "HH:MM[:SS]".
    pub duration_text: String,
    pub venue_name: String,
    pub format: Option<EventFormat>,
    pub recommended: bool,
    pub link: Option<String>,
}

impl SideEvent {
    /// The event's duration in minutes, applying the zero-means-default rule.
    pub fn duration_mins(&self) -> Result<i64, EventDurationError> {
        parse_event_duration(&self.duration_text)
    }
}
