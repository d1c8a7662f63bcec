//! Festival route-sheet engine.
//!
//! A library that answers: "given the concerts a visitor bought tickets for,
//! which precomputed festival itinerary fits them best, and what does their
//! day look like on the ground?"
//!
//! The core pieces, in dependency order:
//! - [`transitions`]: pairwise walk times between venues;
//! - [`catalog`]: the precomputed route catalog and its on-sale availability
//!   filter;
//! - [`matcher`]: exact/subset matching of a visitor's concert set against
//!   the catalog;
//! - [`itinerary`]: day-by-day schedule reconstruction with walk-feasibility
//!   classification between adjacent concerts;
//! - [`slotter`]: side-program events slotted into idle windows;
//! - [`recommend`]: preference-weighted route ranking;
//! - [`sheet`]: the assembled per-visitor route sheet.
//!
//! The HTTP layer, persistence and data ingestion live outside this crate;
//! everything here operates on plain typed records.

pub mod cache;
pub mod catalog;
pub mod domain;
pub mod itinerary;
pub mod matcher;
pub mod recommend;
pub mod sheet;
pub mod slotter;
pub mod transitions;
