//! Organizations: the root of the collection tree.

use std::sync::Arc;

use tokio::sync::watch;

use crate::schema::{Json, SyncType, Table};
use crate::source::DashboardApi;

use super::{
    configuration_changes, networks, stream_entities, EntityRef, EntityStream, Resolve, Resource,
};

crate::entity! {
    /// One organization the configured API key has access to.
    pub struct Organization {
        "id" id: String,
        "name" name: Option<String>,
        "url" url: Option<String>,
        "api" api: Option<Json<serde_json::Value>>,
        "licensing" licensing: Option<Json<serde_json::Value>>,
        "cloud" cloud: Option<Json<serde_json::Value>>,
        "management" management: Option<Json<serde_json::Value>>,
    }
}

/// Build the full collection tree, rooted at organizations.
///
/// Constructed once at startup; immutable thereafter.
pub fn organizations() -> Resource {
    Resource::new(
        Table::for_shape(
            "meraki_organizations",
            SyncType::Append,
            Organization::SHAPE,
            "id",
        ),
        OrganizationsResolver,
    )
    .with_children(vec![
        networks::networks(),
        configuration_changes::configuration_changes(),
    ])
}

struct OrganizationsResolver;

impl Resolve for OrganizationsResolver {
    fn resolve(
        &self,
        api: Arc<dyn DashboardApi>,
        parent: Option<EntityRef>,
        cancel: watch::Receiver<bool>,
    ) -> EntityStream {
        debug_assert!(parent.is_none(), "organizations is the tree root");
        stream_entities(cancel, async move { api.organizations().await })
    }
}
