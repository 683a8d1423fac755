// Allow dead code: API response structs have fields for completeness
#![allow(dead_code)]

use serde::{Deserialize, Serialize};

/// One center as returned by `GET /v1/centers`.
///
/// Coordinates arrive as strings and are only parsed during transformation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteCenterRecord {
    pub id: i64,
    #[serde(default)]
    pub center_name: String,
    #[serde(default)]
    pub sido: String,
    #[serde(default)]
    pub sigungu: String,
    #[serde(default)]
    pub facility_name: String,
    #[serde(default)]
    pub zip_code: String,
    #[serde(default)]
    pub address: String,
    pub lat: String,
    pub lng: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
    #[serde(default)]
    pub center_type: String,
    #[serde(default)]
    pub org: String,
    #[serde(default)]
    pub phone_number: String,
}

/// Paged response envelope. `data.len()` equals `current_count`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CenterPage {
    pub page: u32,
    pub per_page: u32,
    pub total_count: u32,
    pub current_count: u32,
    pub match_count: u32,
    #[serde(default)]
    pub data: Vec<RemoteCenterRecord>,
}
