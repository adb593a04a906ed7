//! Hosted Backend Client
//!
//! Request/response client for the hosted relational backend that owns the
//! catalog (PostgREST-style REST surface). The backend stays a black box:
//! this module only lists tables, calls the search RPC, and pushes
//! operator upserts.

use crate::catalog::{CatalogSnapshot, InventoryEntry, Location, Medicine, Pharmacy};
use crate::config::Config;
use crate::error::{GuideError, GuideResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tokio_retry::strategy::{jitter, ExponentialBackoff};
use tokio_retry::Retry;
use tracing::{debug, warn};

/// List fetches retry this many times before giving up
const FETCH_RETRIES: usize = 3;

#[derive(Clone)]
pub struct BackendClient {
    base_url: String,
    api_key: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl BackendClient {
    pub fn new(config: &Config) -> Self {
        Self {
            base_url: config.backend_url.trim_end_matches('/').to_string(),
            api_key: config.backend_api_key.clone(),
            timeout: Duration::from_secs(config.request_timeout_secs.max(1)),
            client: reqwest::Client::new(),
        }
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn rpc_url(&self, function: &str) -> String {
        format!("{}/rest/v1/rpc/{}", self.base_url, function)
    }

    /// Verify the backend is reachable
    pub async fn health_check(&self) -> bool {
        match self
            .client
            .get(self.table_url("locations"))
            .query(&[("select", "id"), ("limit", "1")])
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .timeout(Duration::from_secs(2))
            .send()
            .await
        {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }

    async fn fetch_table<T: DeserializeOwned>(&self, table: &str) -> GuideResult<Vec<T>> {
        let strategy = ExponentialBackoff::from_millis(100)
            .map(jitter)
            .take(FETCH_RETRIES);

        let rows = Retry::spawn(strategy, || async {
            let response = self
                .client
                .get(self.table_url(table))
                .query(&[("select", "*")])
                .header("apikey", &self.api_key)
                .bearer_auth(&self.api_key)
                .timeout(self.timeout)
                .send()
                .await
                .map_err(GuideError::from)?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                warn!("Backend list {} failed ({}): {}", table, status, body);
                return Err(GuideError::Backend(format!(
                    "list {} returned {}",
                    table, status
                )));
            }

            response.json::<Vec<T>>().await.map_err(GuideError::from)
        })
        .await?;

        debug!("Fetched {} rows from {}", rows.len(), table);
        Ok(rows)
    }

    /// Pull a full catalog snapshot for the local cache
    pub async fn fetch_snapshot(&self) -> GuideResult<CatalogSnapshot> {
        Ok(CatalogSnapshot {
            locations: self.fetch_table::<Location>("locations").await?,
            medicines: self.fetch_table::<Medicine>("medicines").await?,
            pharmacies: self.fetch_table::<Pharmacy>("pharmacies").await?,
            inventory: self.fetch_table::<InventoryEntry>("inventory").await?,
        })
    }

    /// Free-text medicine search through the backend's RPC endpoint
    pub async fn search_medicines(&self, query: &str) -> GuideResult<Vec<Medicine>> {
        let response = self
            .client
            .post(self.rpc_url("search_medicines"))
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .json(&serde_json::json!({ "query": query }))
            .timeout(self.timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GuideError::Backend(format!(
                "search rpc returned {}",
                status
            )));
        }
        Ok(response.json::<Vec<Medicine>>().await?)
    }

    /// Server-side filtered location lookup (name pattern)
    pub async fn find_locations(&self, name_pattern: &str) -> GuideResult<Vec<Location>> {
        let filter = format!("ilike.*{}*", name_pattern);
        let url = format!(
            "{}?select=*&name={}",
            self.table_url("locations"),
            urlencoding::encode(&filter)
        );
        let response = self
            .client
            .get(url)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .timeout(self.timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GuideError::Backend(format!(
                "location lookup returned {}",
                status
            )));
        }
        Ok(response.json::<Vec<Location>>().await?)
    }

    async fn upsert<T: Serialize>(&self, table: &str, row: &T) -> GuideResult<()> {
        let response = self
            .client
            .post(self.table_url(table))
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .header("Prefer", "resolution=merge-duplicates")
            .json(row)
            .timeout(self.timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GuideError::Backend(format!(
                "upsert into {} returned {}: {}",
                table, status, body
            )));
        }
        Ok(())
    }

    pub async fn upsert_location(&self, location: &Location) -> GuideResult<()> {
        self.upsert("locations", location).await
    }

    pub async fn upsert_medicine(&self, medicine: &Medicine) -> GuideResult<()> {
        self.upsert("medicines", medicine).await
    }

    pub async fn set_inventory(&self, entry: &InventoryEntry) -> GuideResult<()> {
        self.upsert("inventory", entry).await
    }
}
