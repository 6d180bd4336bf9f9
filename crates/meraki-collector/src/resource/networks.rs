//! Networks owned by an organization.

use std::sync::Arc;

use tokio::sync::watch;

use crate::schema::{Json, SyncType, Table};
use crate::source::DashboardApi;

use super::{
    devices, parent_as, stream_entities, topology, EntityRef, EntityStream, Organization, Resolve,
    Resource,
};

crate::entity! {
    /// One network inside an organization.
    pub struct Network {
        "id" id: String,
        "organizationId" organization_id: Option<String>,
        "name" name: Option<String>,
        "productTypes" product_types: Option<Json<Vec<String>>>,
        "timeZone" time_zone: Option<String>,
        "tags" tags: Option<Json<Vec<String>>>,
        "enrollmentString" enrollment_string: Option<String>,
        "url" url: Option<String>,
        "notes" notes: Option<String>,
        "isBoundToConfigTemplate" is_bound_to_config_template: Option<bool>,
    }
}

pub fn networks() -> Resource {
    Resource::new(
        Table::for_shape("meraki_networks", SyncType::Append, Network::SHAPE, "id"),
        NetworksResolver,
    )
    .with_children(vec![devices::devices(), topology::topology_link_layer()])
}

struct NetworksResolver;

impl Resolve for NetworksResolver {
    fn resolve(
        &self,
        api: Arc<dyn DashboardApi>,
        parent: Option<EntityRef>,
        cancel: watch::Receiver<bool>,
    ) -> EntityStream {
        let organization_id = parent_as::<Organization>(parent.as_ref()).id.clone();
        stream_entities(cancel, async move {
            api.organization_networks(&organization_id).await
        })
    }
}
