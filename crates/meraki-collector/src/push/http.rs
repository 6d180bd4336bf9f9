//! HTTP implementation of [`PushService`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Serialize;
use tracing::debug;

use crate::config::PushConfig;
use crate::error::{CollectError, Result};
use crate::schema::{Record, Table};

use super::PushService;

/// Reqwest-backed push service client with bearer auth.
pub struct PushClient {
    http: reqwest::Client,
    endpoint: String,
    token: String,
}

#[derive(Serialize)]
struct UpsertRecordsInput<'a> {
    records: &'a [Record],
}

impl PushClient {
    pub fn new(cfg: &PushConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()
            .map_err(|e| CollectError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            endpoint: cfg.endpoint.trim_end_matches('/').to_string(),
            token: cfg.token.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.endpoint, path.trim_start_matches('/'))
    }

    async fn check(rsp: reqwest::Response, url: &str) -> Result<reqwest::Response> {
        let status = rsp.status();
        if status.is_success() {
            return Ok(rsp);
        }
        let body = rsp.text().await.unwrap_or_default();
        Err(CollectError::Push(format!(
            "{url} returned {status}: {}",
            body.chars().take(200).collect::<String>()
        )))
    }
}

#[async_trait]
impl PushService for PushClient {
    async fn get_table(&self, name: &str) -> Result<Option<Table>> {
        let url = self.url(&format!("v1/tables/{name}"));
        debug!(url, "GET");
        let rsp = self
            .http
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| CollectError::Push(format!("GET {url} failed: {e}")))?;

        if rsp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let rsp = Self::check(rsp, &url).await?;
        let table = rsp
            .json::<Table>()
            .await
            .map_err(|e| CollectError::Push(format!("GET {url} returned invalid body: {e}")))?;
        Ok(Some(table))
    }

    async fn create_table(&self, table: &Table) -> Result<()> {
        let url = self.url("v1/tables");
        debug!(url, table = %table.name, "POST");
        let rsp = self
            .http
            .post(&url)
            .bearer_auth(&self.token)
            .json(table)
            .send()
            .await
            .map_err(|e| CollectError::Push(format!("POST {url} failed: {e}")))?;
        Self::check(rsp, &url).await?;
        Ok(())
    }

    async fn upsert_records(&self, records: &[Record]) -> Result<()> {
        let url = self.url("v1/records");
        debug!(url, count = records.len(), "POST");
        let rsp = self
            .http
            .post(&url)
            .bearer_auth(&self.token)
            .json(&UpsertRecordsInput { records })
            .send()
            .await
            .map_err(|e| CollectError::Push(format!("POST {url} failed: {e}")))?;
        Self::check(rsp, &url).await?;
        Ok(())
    }
}
