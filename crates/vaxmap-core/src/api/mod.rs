//! REST API client module for the public vaccination center service.
//!
//! This module provides the `ApiClient` for fetching center pages from
//! `GET /v1/centers`, and the `CenterSource` trait the refresh orchestrator
//! is generic over so that tests can feed pages without a network.
//!
//! The API authenticates with a `serviceKey` query parameter.

pub mod client;
pub mod error;

pub use client::{ApiClient, CenterSource};
pub use error::ApiError;
