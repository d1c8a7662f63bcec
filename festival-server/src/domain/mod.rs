//! Domain types for the festival route-sheet engine.
//!
//! These are the plain typed records the core operates on. The persistence
//! layer maps its rows into these types exactly once at the boundary, so
//! nothing downstream ever sees row/tuple ambiguity.

mod concert;
mod day;
mod event;
mod purchase;
mod route;
mod venue;

pub use concert::{Concert, ConcertId};
pub use day::FestivalDay;
pub use event::{EventDurationError, EventFormat, SideEvent, parse_event_duration};
pub use purchase::{Purchase, Visit, VisitorId, aggregate_visits};
pub use route::{Composition, CompositionError, Route, RouteId, RouteRecord};
pub use venue::{Venue, VenueId};
