//! Organization configuration change log, last 24 hours.
//!
//! Unlike the inventory tables this one is truncate-and-replace: each run
//! pushes a fresh window and the destination discards the previous content.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::watch;

use crate::schema::{Json, SyncType, Table};
use crate::source::DashboardApi;

use super::{parent_as, stream_entities, EntityRef, EntityStream, Organization, Resolve, Resource};

crate::entity! {
    /// One configuration change event.
    pub struct ConfigurationChange {
        "ts" ts: DateTime<Utc>,
        "adminName" admin_name: Option<String>,
        "adminEmail" admin_email: Option<String>,
        "adminId" admin_id: Option<String>,
        "networkName" network_name: Option<String>,
        "networkId" network_id: Option<String>,
        "networkUrl" network_url: Option<String>,
        "ssidName" ssid_name: Option<String>,
        "page" page: Option<String>,
        "label" label: Option<String>,
        "oldValue" old_value: Option<Json<serde_json::Value>>,
        "newValue" new_value: Option<Json<serde_json::Value>>,
    }
}

pub fn configuration_changes() -> Resource {
    Resource::new(
        Table::for_shape(
            "meraki_configuration_changes",
            SyncType::Truncate,
            ConfigurationChange::SHAPE,
            "ts",
        ),
        ConfigurationChangesResolver,
    )
}

struct ConfigurationChangesResolver;

impl Resolve for ConfigurationChangesResolver {
    fn resolve(
        &self,
        api: Arc<dyn DashboardApi>,
        parent: Option<EntityRef>,
        cancel: watch::Receiver<bool>,
    ) -> EntityStream {
        let organization_id = parent_as::<Organization>(parent.as_ref()).id.clone();
        stream_entities(cancel, async move {
            api.organization_configuration_changes(&organization_id)
                .await
        })
    }
}
