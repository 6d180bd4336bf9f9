//! Resource tree declarations and the resolver protocol.
//!
//! A [`Resource`] is one collectible entity type: its destination table, the
//! resolver that lists its entities given a parent, and child resources whose
//! resolvers expect *this* resource's entity as parent context. The tree is
//! declared statically by [`organizations`] and is read-only during
//! collection.

pub mod clients;
pub mod configuration_changes;
pub mod devices;
pub mod networks;
pub mod organizations;
pub mod topology;

pub use clients::DeviceClient;
pub use configuration_changes::ConfigurationChange;
pub use devices::Device;
pub use networks::Network;
pub use organizations::{organizations, Organization};
pub use topology::TopologyLinkLayer;

use std::future::Future;
use std::sync::Arc;

use tokio::sync::{mpsc, watch};

use crate::error::{CollectError, Result};
use crate::schema::{Entity, Table};
use crate::source::DashboardApi;

/// Shared handle to one resolved entity instance.
pub type EntityRef = Arc<dyn Entity>;

/// Lazy, possibly-erroring entity sequence.
///
/// Pull-based: the consumer advances one element at a time and may stop early
/// by dropping the receiver, which stops the producer without further work.
/// At most one error element is yielded and nothing follows it; an exhausted
/// channel with no error is the legitimate empty terminal state.
pub type EntityStream = mpsc::Receiver<Result<EntityRef>>;

/// Bound on in-flight entities per resolver; keeps producers from running
/// unboundedly ahead of the consumer.
const RESOLVER_BUFFER: usize = 32;

/// The contract a resource node uses to fetch its entities.
///
/// A resolver may depend on the parent entity's identity fields only; it must
/// not assume sibling or ancestor state beyond the immediate parent.
pub trait Resolve: Send + Sync {
    fn resolve(
        &self,
        api: Arc<dyn DashboardApi>,
        parent: Option<EntityRef>,
        cancel: watch::Receiver<bool>,
    ) -> EntityStream;
}

/// One declared node in the collection tree.
pub struct Resource {
    /// Destination table descriptor, derived once from the entity shape.
    pub table: Table,

    /// Entity resolver for this node.
    pub resolver: Box<dyn Resolve>,

    /// Child resources; each child's resolver receives this node's entity as
    /// parent context.
    pub children: Vec<Resource>,
}

impl Resource {
    pub fn new(table: Table, resolver: impl Resolve + 'static) -> Self {
        Self {
            table,
            resolver: Box::new(resolver),
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<Resource>) -> Self {
        self.children = children;
        self
    }
}

/// Adapt one fallible listing call into an [`EntityStream`].
///
/// The fetch future runs on a spawned task; its items are fed through a
/// bounded channel one element at a time. A fetch error becomes the stream's
/// single terminal error element. The producer stops as soon as the consumer
/// drops the receiver or cancellation is signalled.
///
/// The producer task is joined by a supervisor holding its own sender clone:
/// a producer that dies without sending (a panic in the fetch) yields a
/// terminal error, never the empty terminal state.
pub(crate) fn stream_entities<T, F>(cancel: watch::Receiver<bool>, fetch: F) -> EntityStream
where
    T: Entity,
    F: Future<Output = Result<Vec<T>>> + Send + 'static,
{
    let (tx, rx) = mpsc::channel(RESOLVER_BUFFER);

    let producer = tokio::spawn({
        let tx = tx.clone();
        async move {
            match fetch.await {
                Err(err) => {
                    let _ = tx.send(Err(err)).await;
                }
                Ok(items) => {
                    for item in items {
                        if *cancel.borrow() {
                            break;
                        }
                        if tx.send(Ok(Arc::new(item) as EntityRef)).await.is_err() {
                            break;
                        }
                    }
                }
            }
        }
    });

    tokio::spawn(async move {
        if let Err(err) = producer.await {
            let _ = tx
                .send(Err(CollectError::Source(format!(
                    "entity producer task failed: {err}"
                ))))
                .await;
        }
    });

    rx
}

/// Downcast a parent entity back to its concrete shape.
///
/// A node with children guarantees every entity it yields is a valid parent
/// for each child's resolver; a mismatch here is a programming error in the
/// tree declaration, not a runtime-recoverable condition.
pub(crate) fn parent_as<T: Entity>(parent: Option<&EntityRef>) -> &T {
    parent
        .expect("resolver invoked without a parent entity")
        .as_any()
        .downcast_ref::<T>()
        .expect("resolver invoked with a parent entity of the wrong shape")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SyncType;

    #[test]
    fn test_tree_shape() {
        let root = organizations();
        assert_eq!(root.table.name, "meraki_organizations");
        assert_eq!(root.table.sync_type, SyncType::Append);

        let child_tables: Vec<&str> = root
            .children
            .iter()
            .map(|c| c.table.name.as_str())
            .collect();
        assert_eq!(
            child_tables,
            vec!["meraki_networks", "meraki_configuration_changes"]
        );

        let networks = &root.children[0];
        let net_children: Vec<&str> = networks
            .children
            .iter()
            .map(|c| c.table.name.as_str())
            .collect();
        assert_eq!(
            net_children,
            vec!["meraki_devices", "meraki_topology_link_layers"]
        );

        let devices = &networks.children[0];
        assert_eq!(devices.children.len(), 1);
        assert_eq!(devices.children[0].table.name, "meraki_device_client");
        assert!(devices.children[0].children.is_empty());
    }

    #[test]
    fn test_every_table_has_one_primary_key() {
        fn check(node: &Resource) {
            let pks = node.table.columns.iter().filter(|c| c.primary_key).count();
            assert_eq!(pks, 1, "table {} has {} pk columns", node.table.name, pks);
            for child in &node.children {
                check(child);
            }
        }
        check(&organizations());
    }

    #[test]
    fn test_configuration_changes_truncate_policy() {
        let root = organizations();
        let changes = &root.children[1];
        assert_eq!(changes.table.sync_type, SyncType::Truncate);
    }

    #[tokio::test]
    async fn test_stream_entities_empty_is_not_an_error() {
        let (_tx, cancel) = watch::channel(false);
        let mut rx = stream_entities::<Organization, _>(cancel, async { Ok(Vec::new()) });
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_stream_entities_error_is_terminal() {
        let (_tx, cancel) = watch::channel(false);
        let mut rx = stream_entities::<Organization, _>(cancel, async {
            Err(crate::error::CollectError::Source("boom".to_string()))
        });
        assert!(rx.recv().await.unwrap().is_err());
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_stream_entities_dead_producer_is_an_error() {
        async fn exploding_fetch() -> Result<Vec<Organization>> {
            panic!("listing blew up")
        }

        let (_tx, cancel) = watch::channel(false);
        let mut rx = stream_entities::<Organization, _>(cancel, exploding_fetch());

        // A producer that dies before sending must not read as an empty
        // listing.
        let item = rx.recv().await.expect("expected a terminal element");
        match item {
            Err(CollectError::Source(msg)) => assert!(msg.contains("producer")),
            Err(other) => panic!("expected a source error, got {other:?}"),
            Ok(_) => panic!("expected an error element"),
        }
        assert!(rx.recv().await.is_none());
    }
}
