//! Source API handle: the Meraki Dashboard side of the pipeline.
//!
//! The collector and the resolvers only see [`DashboardApi`]: typed "list
//! entities for parent X" operations. [`MerakiClient`] is the HTTP
//! implementation; tests substitute their own.

mod http;

pub use http::MerakiClient;

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::Result;
use crate::resource::{ConfigurationChange, Device, DeviceClient, Network, Organization};

/// Raw link-layer topology document for one network, before it is keyed by
/// network id and reshaped into an entity.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TopologyLinkLayerResponse {
    #[serde(default)]
    pub errors: Vec<String>,
    pub links: Option<serde_json::Value>,
    pub nodes: Option<serde_json::Value>,
}

/// Typed listing operations against the Meraki Dashboard API.
///
/// Every call may fail with a transport or API-level error, which the
/// resolver surfaces unchanged as its terminal error element. An empty
/// listing is a legitimate result, not a failure.
#[async_trait]
pub trait DashboardApi: Send + Sync {
    /// List the organizations the API key can access.
    async fn organizations(&self) -> Result<Vec<Organization>>;

    /// List the networks of an organization.
    async fn organization_networks(&self, organization_id: &str) -> Result<Vec<Network>>;

    /// List configuration changes for an organization over the lookback window.
    async fn organization_configuration_changes(
        &self,
        organization_id: &str,
    ) -> Result<Vec<ConfigurationChange>>;

    /// List the devices claimed into a network.
    async fn network_devices(&self, network_id: &str) -> Result<Vec<Device>>;

    /// Fetch the link-layer topology snapshot of a network.
    async fn network_topology_link_layer(
        &self,
        network_id: &str,
    ) -> Result<TopologyLinkLayerResponse>;

    /// List the clients a device has seen.
    async fn device_clients(&self, serial: &str) -> Result<Vec<DeviceClient>>;
}
