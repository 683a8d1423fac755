//! Core library for vaxmap.
//!
//! Fetches COVID-19 vaccination centers from the public center API, caches
//! them in a local store, and exposes the refresh progress that drives the
//! splash screen. Front ends read the cached centers through
//! [`display::DisplayedCenters`].

pub mod api;
pub mod cache;
pub mod config;
pub mod display;
pub mod models;
pub mod refresh;
pub mod utils;

pub use api::{ApiClient, ApiError, CenterSource};
pub use cache::CenterStore;
pub use config::Config;
pub use display::DisplayedCenters;
pub use models::{CenterCategory, MarkerColor, Position, VaccinationCenter};
pub use refresh::{ProgressState, RefreshError, RefreshOptions, RefreshOrchestrator};
