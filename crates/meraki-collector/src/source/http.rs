//! HTTP implementation of [`DashboardApi`] against the Meraki Dashboard API.

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::MerakiConfig;
use crate::error::{CollectError, Result};
use crate::resource::{ConfigurationChange, Device, DeviceClient, Network, Organization};

use super::{DashboardApi, TopologyLinkLayerResponse};

/// Page size requested from list endpoints.
const PER_PAGE: &str = "1000";

/// Lookback window for the configuration change log, in seconds.
const CONFIGURATION_CHANGES_TIMESPAN: &str = "86400";

/// Reqwest-backed Meraki Dashboard API client with bearer auth and
/// Link-header pagination.
pub struct MerakiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl MerakiClient {
    pub fn new(cfg: &MerakiConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!(
                "meraki-collector/",
                env!("CARGO_PKG_VERSION"),
                " (+https://github.com/secberus/meraki-collector-rs)"
            ))
            .build()
            .map_err(|e| CollectError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            api_key: cfg.api_key.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// GET one page; returns the payload and the `rel=next` URL if any.
    async fn get_page<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<(T, Option<String>)> {
        debug!(url, "GET");
        let rsp = self
            .http
            .get(url)
            .query(query)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| CollectError::Source(format!("GET {url} failed: {e}")))?;

        let status = rsp.status();
        if !status.is_success() {
            let body = rsp.text().await.unwrap_or_default();
            return Err(CollectError::Source(format!(
                "GET {url} returned {status}: {}",
                body.chars().take(200).collect::<String>()
            )));
        }

        let next = next_link(rsp.headers());
        let value = rsp
            .json::<T>()
            .await
            .map_err(|e| CollectError::Source(format!("GET {url} returned invalid body: {e}")))?;
        Ok((value, next))
    }

    /// GET a single document.
    async fn get_one<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.url(path);
        let (value, _) = self.get_page(&url, &[]).await?;
        Ok(value)
    }

    /// GET a list, following pagination links until exhausted.
    async fn get_all<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<Vec<T>> {
        let url = self.url(path);
        let (mut items, mut next): (Vec<T>, _) = self.get_page(&url, query).await?;

        while let Some(next_url) = next {
            let (mut page, n): (Vec<T>, _) = self.get_page(&next_url, &[]).await?;
            items.append(&mut page);
            next = n;
        }

        Ok(items)
    }
}

/// Extract the `rel=next` target from a `Link` response header.
fn next_link(headers: &HeaderMap) -> Option<String> {
    let link = headers.get(reqwest::header::LINK)?.to_str().ok()?;
    for part in link.split(',') {
        let mut segments = part.split(';');
        let target = segments.next()?.trim();
        let is_next = segments
            .any(|s| matches!(s.trim(), "rel=next" | "rel=\"next\""));
        if is_next {
            return Some(target.trim_matches(|c| c == '<' || c == '>').to_string());
        }
    }
    None
}

#[async_trait]
impl DashboardApi for MerakiClient {
    async fn organizations(&self) -> Result<Vec<Organization>> {
        self.get_all("organizations", &[("perPage", PER_PAGE)]).await
    }

    async fn organization_networks(&self, organization_id: &str) -> Result<Vec<Network>> {
        self.get_all(
            &format!("organizations/{organization_id}/networks"),
            &[("perPage", PER_PAGE)],
        )
        .await
    }

    async fn organization_configuration_changes(
        &self,
        organization_id: &str,
    ) -> Result<Vec<ConfigurationChange>> {
        self.get_all(
            &format!("organizations/{organization_id}/configurationChanges"),
            &[
                ("perPage", PER_PAGE),
                ("timespan", CONFIGURATION_CHANGES_TIMESPAN),
            ],
        )
        .await
    }

    async fn network_devices(&self, network_id: &str) -> Result<Vec<Device>> {
        self.get_all(&format!("networks/{network_id}/devices"), &[])
            .await
    }

    async fn network_topology_link_layer(
        &self,
        network_id: &str,
    ) -> Result<TopologyLinkLayerResponse> {
        self.get_one(&format!("networks/{network_id}/topology/linkLayer"))
            .await
    }

    async fn device_clients(&self, serial: &str) -> Result<Vec<DeviceClient>> {
        self.get_all(&format!("devices/{serial}/clients"), &[]).await
    }
}
