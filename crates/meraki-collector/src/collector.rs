//! Collection engine: single-threaded, depth-first traversal of the
//! resource tree.
//!
//! For each node the collector registers the destination table (once per run,
//! via the [`TableRegistry`]), drains the node's resolver, encodes each
//! entity into a record, recurses into child nodes per entity, and finally
//! submits the invocation's record buffer as one upsert call. The first error
//! at any depth aborts the whole run.

use std::collections::HashSet;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info};

use crate::error::{CollectError, Result};
use crate::push::PushService;
use crate::resource::{EntityRef, Resource};
use crate::schema::{record_for, Table};
use crate::source::DashboardApi;

/// Run-scoped set of table names already confirmed to exist at the
/// destination. A table is checked (and created if absent) at most once per
/// run, regardless of how many times its node is revisited across parents.
#[derive(Debug, Default)]
pub struct TableRegistry {
    names: HashSet<String>,
}

impl TableRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn insert(&mut self, name: impl Into<String>) {
        self.names.insert(name.into());
    }
}

/// Depth-first resource collector.
///
/// Owns the run-scoped [`TableRegistry`]; construct a fresh collector per
/// run.
pub struct Collector {
    api: Arc<dyn DashboardApi>,
    push: Arc<dyn PushService>,
    registry: TableRegistry,
    dry_run: bool,
}

impl Collector {
    pub fn new(api: Arc<dyn DashboardApi>, push: Arc<dyn PushService>) -> Self {
        Self {
            api,
            push,
            registry: TableRegistry::new(),
            dry_run: false,
        }
    }

    /// Suppress destination writes (table creation and upserts) while still
    /// performing lookups and encoding.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Run a full collection from the tree root. The root invocation has no
    /// parent entity.
    pub async fn collect(&mut self, root: &Resource, cancel: watch::Receiver<bool>) -> Result<()> {
        self.collect_node(root, None, &cancel).await
    }

    /// Ensure the node's table exists at the destination.
    ///
    /// Registry hit is a no-op; a destination miss creates the table; any
    /// other existence-check or creation failure aborts the run.
    async fn register(&mut self, table: &Table) -> Result<()> {
        if self.registry.contains(&table.name) {
            return Ok(());
        }

        match self
            .push
            .get_table(&table.name)
            .await
            .map_err(|e| CollectError::register(&table.name, e))?
        {
            Some(_) => {}
            None => {
                info!(table = %table.name, "table does not exist, creating");
                if self.dry_run {
                    info!(table = %table.name, "dry run, skipping table creation");
                } else {
                    self.push
                        .create_table(table)
                        .await
                        .map_err(|e| CollectError::register(&table.name, e))?;
                }
            }
        }

        self.registry.insert(&table.name);
        Ok(())
    }

    fn collect_node<'a>(
        &'a mut self,
        node: &'a Resource,
        parent: Option<EntityRef>,
        cancel: &'a watch::Receiver<bool>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(async move {
            debug!(table = %node.table.name, "collecting");
            ensure_live(cancel)?;

            self.register(&node.table).await?;

            let mut records = Vec::new();
            let mut entities =
                node.resolver
                    .resolve(self.api.clone(), parent, cancel.clone());

            while let Some(item) = entities.recv().await {
                ensure_live(cancel)?;

                let entity =
                    item.map_err(|e| CollectError::resolve(&node.table.name, e))?;
                records.push(record_for(&node.table, entity.as_ref())?);

                // Children are collected per parent entity, before the next
                // sibling entity; this bounds memory to one parent's subtree
                // breadth at the cost of many small upsert calls.
                for child in &node.children {
                    self.collect_node(child, Some(entity.clone()), cancel).await?;
                }
            }

            ensure_live(cancel)?;

            // The call is issued even for an empty buffer so every node
            // invocation produces exactly one upsert.
            info!(table = %node.table.name, count = records.len(), "upserting records");
            if self.dry_run {
                info!(table = %node.table.name, "dry run, skipping upsert");
            } else {
                let count = records.len();
                self.push
                    .upsert_records(&records)
                    .await
                    .map_err(|e| CollectError::upsert(&node.table.name, count, e))?;
            }

            Ok(())
        })
    }
}

fn ensure_live(cancel: &watch::Receiver<bool>) -> Result<()> {
    if *cancel.borrow() {
        Err(CollectError::Cancelled)
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_is_idempotent() {
        let mut registry = TableRegistry::new();
        assert!(!registry.contains("meraki_devices"));

        registry.insert("meraki_devices");
        registry.insert("meraki_devices");
        assert!(registry.contains("meraki_devices"));
        assert_eq!(registry.names.len(), 1);
    }

    #[test]
    fn test_ensure_live() {
        let (tx, rx) = watch::channel(false);
        assert!(ensure_live(&rx).is_ok());

        tx.send(true).unwrap();
        assert!(matches!(ensure_live(&rx), Err(CollectError::Cancelled)));
    }
}
