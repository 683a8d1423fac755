//! API client for the public vaccination center REST API.
//!
//! This module provides the `ApiClient` struct for fetching single pages of
//! center records, and the `CenterSource` trait that abstracts "give me page
//! N" for the refresh orchestrator.

use std::future::Future;
use std::time::Duration;

use reqwest::Client;
use tracing::debug;

use crate::models::CenterPage;

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// Base URL for the center dataset (dataset id 15077586 on odcloud.kr)
pub const DEFAULT_BASE_URL: &str = "https://api.odcloud.kr/api/15077586";

/// Path of the paged centers endpoint, relative to the base URL
const CENTERS_PATH: &str = "v1/centers";

/// HTTP request timeout in seconds.
/// 30s allows for slow API responses while failing fast enough for the splash screen.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Anything that can produce one page of remote center records.
///
/// Pages are 1-based, as the API numbers them.
pub trait CenterSource: Clone + Send + Sync + 'static {
    fn fetch_page(
        &self,
        page: u32,
        per_page: u32,
    ) -> impl Future<Output = Result<CenterPage, ApiError>> + Send;
}

/// API client for the center dataset.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    service_key: String,
}

impl ApiClient {
    /// Create a new API client against the given base URL
    pub fn new(base_url: impl Into<String>, service_key: impl Into<String>) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            service_key: service_key.into(),
        })
    }

    fn centers_url(&self) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), CENTERS_PATH)
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    /// Fetch one page of centers
    pub async fn fetch_centers(&self, page: u32, per_page: u32) -> Result<CenterPage, ApiError> {
        let url = self.centers_url();
        let page_param = page.to_string();
        let per_page_param = per_page.to_string();

        let response = self
            .client
            .get(&url)
            .query(&[
                ("serviceKey", self.service_key.as_str()),
                ("page", page_param.as_str()),
                ("perPage", per_page_param.as_str()),
            ])
            .send()
            .await?;

        let response = Self::check_response(response).await?;
        let text = response.text().await?;

        let parsed: CenterPage = serde_json::from_str(&text)
            .map_err(|e| ApiError::InvalidResponse(format!("page {}: {}", page, e)))?;

        debug!(page, count = parsed.data.len(), total = parsed.total_count, "Center page received");
        Ok(parsed)
    }
}

impl CenterSource for ApiClient {
    fn fetch_page(
        &self,
        page: u32,
        per_page: u32,
    ) -> impl Future<Output = Result<CenterPage, ApiError>> + Send {
        let api = self.clone();
        async move { api.fetch_centers(page, per_page).await }
    }
}
