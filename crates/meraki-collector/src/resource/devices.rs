//! Devices claimed into a network.

use std::net::IpAddr;
use std::sync::Arc;

use tokio::sync::watch;

use crate::schema::{Json, MacAddress, SyncType, Table};
use crate::source::DashboardApi;

use super::{
    clients, parent_as, stream_entities, EntityRef, EntityStream, Network, Resolve, Resource,
};

crate::entity! {
    /// One device claimed into a network.
    pub struct Device {
        "serial" serial: String,
        "name" name: Option<String>,
        "mac" mac: Option<MacAddress>,
        "networkId" network_id: Option<String>,
        "model" model: Option<String>,
        "productType" product_type: Option<String>,
        "firmware" firmware: Option<String>,
        "lanIp" lan_ip: Option<IpAddr>,
        "address" address: Option<String>,
        "notes" notes: Option<String>,
        "tags" tags: Option<Json<Vec<String>>>,
        "lat" lat: Option<f64>,
        "lng" lng: Option<f64>,
        "details" details: Option<Json<serde_json::Value>>,
    }
}

pub fn devices() -> Resource {
    Resource::new(
        Table::for_shape("meraki_devices", SyncType::Append, Device::SHAPE, "serial"),
        DevicesResolver,
    )
    .with_children(vec![clients::device_clients()])
}

struct DevicesResolver;

impl Resolve for DevicesResolver {
    fn resolve(
        &self,
        api: Arc<dyn DashboardApi>,
        parent: Option<EntityRef>,
        cancel: watch::Receiver<bool>,
    ) -> EntityStream {
        let network_id = parent_as::<Network>(parent.as_ref()).id.clone();
        stream_entities(cancel, async move { api.network_devices(&network_id).await })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_deserializes_dashboard_payload() {
        let device: Device = serde_json::from_str(
            r#"{
                "serial": "Q2QN-9J8L-SLPD",
                "name": "sw-hq-01",
                "mac": "00:18:0a:aa:bb:01",
                "networkId": "N_24329156",
                "model": "MS120-8",
                "lanIp": "10.0.0.2",
                "lat": 37.4180951,
                "lng": -122.098531
            }"#,
        )
        .unwrap();

        assert_eq!(device.serial, "Q2QN-9J8L-SLPD");
        assert_eq!(device.lan_ip, Some("10.0.0.2".parse().unwrap()));
        let mac = device.mac.unwrap();
        assert!(mac.to_string().eq_ignore_ascii_case("00:18:0a:aa:bb:01"));
    }
}
