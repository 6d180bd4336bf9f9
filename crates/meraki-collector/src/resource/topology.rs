//! Link-layer topology snapshot for a network.
//!
//! The topology endpoint returns one document per network rather than a list;
//! the resolver reshapes it into a single entity keyed by the network id.

use std::sync::Arc;

use tokio::sync::watch;

use crate::schema::{Json, SyncType, Table};
use crate::source::DashboardApi;

use super::{parent_as, stream_entities, EntityRef, EntityStream, Network, Resolve, Resource};

crate::entity! {
    /// One link-layer topology snapshot.
    pub struct TopologyLinkLayer {
        "networkId" network_id: String,
        "errors" errors: Option<Json<Vec<String>>>,
        "links" links: Option<Json<serde_json::Value>>,
        "nodes" nodes: Option<Json<serde_json::Value>>,
    }
}

pub fn topology_link_layer() -> Resource {
    Resource::new(
        Table::for_shape(
            "meraki_topology_link_layers",
            SyncType::Append,
            TopologyLinkLayer::SHAPE,
            "network_id",
        ),
        TopologyResolver,
    )
}

struct TopologyResolver;

impl Resolve for TopologyResolver {
    fn resolve(
        &self,
        api: Arc<dyn DashboardApi>,
        parent: Option<EntityRef>,
        cancel: watch::Receiver<bool>,
    ) -> EntityStream {
        let network_id = parent_as::<Network>(parent.as_ref()).id.clone();
        stream_entities(cancel, async move {
            let rsp = api.network_topology_link_layer(&network_id).await?;
            Ok(vec![TopologyLinkLayer {
                network_id,
                errors: Some(Json(rsp.errors)),
                links: rsp.links.map(Json),
                nodes: rsp.nodes.map(Json),
            }])
        })
    }
}
