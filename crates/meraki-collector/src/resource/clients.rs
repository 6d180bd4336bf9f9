//! Clients observed on a device.

use std::net::IpAddr;
use std::sync::Arc;

use tokio::sync::watch;

use crate::schema::{MacAddress, SyncType, Table};
use crate::source::DashboardApi;

use super::{parent_as, stream_entities, Device, EntityRef, EntityStream, Resolve, Resource};

crate::entity! {
    /// One client seen by a device during the lookback window.
    pub struct DeviceClient {
        "id" id: String,
        "description" description: Option<String>,
        "mac" mac: Option<MacAddress>,
        "ip" ip: Option<IpAddr>,
        "ip6" ip6: Option<IpAddr>,
        "user" user: Option<String>,
        "vlan" vlan: Option<i32>,
        "namedVlan" named_vlan: Option<String>,
        "switchport" switchport: Option<String>,
        "adaptivePolicyGroup" adaptive_policy_group: Option<String>,
        "mdnsName" mdns_name: Option<String>,
        "dhcpHostname" dhcp_hostname: Option<String>,
    }
}

pub fn device_clients() -> Resource {
    Resource::new(
        Table::for_shape(
            "meraki_device_client",
            SyncType::Append,
            DeviceClient::SHAPE,
            "id",
        ),
        DeviceClientsResolver,
    )
}

struct DeviceClientsResolver;

impl Resolve for DeviceClientsResolver {
    fn resolve(
        &self,
        api: Arc<dyn DashboardApi>,
        parent: Option<EntityRef>,
        cancel: watch::Receiver<bool>,
    ) -> EntityStream {
        let serial = parent_as::<Device>(parent.as_ref()).serial.clone();
        stream_entities(cancel, async move { api.device_clients(&serial).await })
    }
}
