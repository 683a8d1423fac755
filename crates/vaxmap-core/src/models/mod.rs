//! Data models for vaccination centers.
//!
//! - `VaccinationCenter`, `Position`, `CenterCategory`, `MarkerColor`: the
//!   domain types the store persists and the display reads back
//! - `RemoteCenterRecord`, `CenterPage`: raw shapes returned by the center API
//!
//! A remote record becomes a domain center through `TryFrom`, which only
//! fails on malformed coordinates.

pub mod center;
pub mod remote;

pub use center::{CenterCategory, MarkerColor, Position, TransformError, VaccinationCenter};
pub use remote::{CenterPage, RemoteCenterRecord};
