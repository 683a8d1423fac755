//! Local store for vaccination centers.
//!
//! This module provides the `CenterStore`, the source of truth for what the
//! display shows. Rows are persisted as JSON with positions encoded as
//! `"<lat>;<lng>"` strings, and every mutation is broadcast on a live feed.

pub mod store;

pub use store::{CachedData, CenterSnapshot, CenterStore};
