//! HTTP client for the CRM's REST API.
//!
//! Every list endpoint wraps its records in a `{"data": [...]}` envelope.
//! Deals are paginated; a page shorter than the page size ends the walk.
//! Connectivity or auth failure surfaces as `DashError::Crm` — distinct
//! from an empty result, which is a successful fetch of zero records.

use std::time::Duration;

use salesdash_core::config::CrmConfig;
use salesdash_core::types::{RawDeal, RawFunnel, RawUser};
use salesdash_core::{DashError, DashResult};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, info};

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default = "Vec::new")]
    data: Vec<T>,
}

pub struct CrmClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
    page_size: usize,
    page_delay: Duration,
}

impl CrmClient {
    pub fn new(config: &CrmConfig) -> DashResult<Self> {
        if config.token.is_empty() {
            return Err(DashError::Config("CRM token is not configured".into()));
        }
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| DashError::Crm(format!("building HTTP client: {e}")))?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
            page_size: config.page_size,
            page_delay: Duration::from_millis(config.page_delay_ms),
        })
    }

    async fn get_envelope<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, String)],
    ) -> DashResult<Vec<T>> {
        let url = format!("{}/{}", self.base_url, endpoint);
        let resp = self
            .http
            .get(&url)
            .header("Authorization", format!("Token {}", self.token))
            .query(query)
            .send()
            .await
            .map_err(|e| DashError::Crm(format!("GET {endpoint}: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(DashError::Crm(format!("GET {endpoint}: HTTP {status}")));
        }

        let envelope: Envelope<T> = resp
            .json()
            .await
            .map_err(|e| DashError::Crm(format!("GET {endpoint}: bad response body: {e}")))?;
        Ok(envelope.data)
    }

    /// Walk every page of an endpoint. Stops on an empty or short page.
    async fn get_all_pages<T: DeserializeOwned>(&self, endpoint: &str) -> DashResult<Vec<T>> {
        let mut all = Vec::new();
        let mut page = 1usize;

        loop {
            let query = [
                ("page", page.to_string()),
                ("per_page", self.page_size.to_string()),
            ];
            let batch: Vec<T> = self.get_envelope(endpoint, &query).await?;
            let batch_len = batch.len();
            all.extend(batch);
            debug!(endpoint, page, records = batch_len, "fetched page");

            if batch_len < self.page_size {
                break;
            }
            page += 1;
            // Stay under the CRM rate limit between pages.
            tokio::time::sleep(self.page_delay).await;
        }

        Ok(all)
    }

    /// All deals, across every pipeline status.
    pub async fn fetch_deals(&self) -> DashResult<Vec<RawDeal>> {
        let deals = self.get_all_pages("deals").await?;
        info!(count = deals.len(), "deals loaded from CRM");
        Ok(deals)
    }

    pub async fn fetch_users(&self) -> DashResult<Vec<RawUser>> {
        self.get_envelope("users", &[]).await
    }

    pub async fn fetch_funnels(&self) -> DashResult<Vec<RawFunnel>> {
        self.get_envelope("funnels", &[]).await
    }

    /// Cheap connectivity and token check before starting a load cycle.
    pub async fn test_connection(&self) -> bool {
        let url = format!("{}/users", self.base_url);
        match self
            .http
            .get(&url)
            .header("Authorization", format!("Token {}", self.token))
            .send()
            .await
        {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }
}
