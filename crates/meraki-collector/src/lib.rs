//! # meraki-collector
//!
//! Collect hierarchical resource data from the Meraki Dashboard API and
//! upload it as typed rows to a table-oriented push service.
//!
//! The library walks a statically declared tree of resource types
//! (organizations owning networks, networks owning devices and topology,
//! devices owning clients), derives a destination table schema from each
//! entity shape, and encodes every live entity into a positional row of
//! typed column values:
//!
//! - **Schema inference** ([`schema::infer`]) maps an entity shape to an
//!   ordered column list once per shape.
//! - **Value encoding** ([`schema::encode`]) converts one entity instance
//!   into one record, with deterministic numeric-widening fallbacks.
//! - **Resource tree** ([`resource`]) declares what to collect and how nodes
//!   nest.
//! - **Collector** ([`collector`]) drives the depth-first traversal and the
//!   per-node upsert batching.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use meraki_collector::{resource, Collector, Config, MerakiClient, PushClient};
//! use tokio::sync::watch;
//!
//! #[tokio::main]
//! async fn main() -> meraki_collector::Result<()> {
//!     let config = Config::load("config.yaml")?;
//!     let api = Arc::new(MerakiClient::new(&config.meraki)?);
//!     let push = Arc::new(PushClient::new(&config.push)?);
//!
//!     let (_cancel_tx, cancel) = watch::channel(false);
//!     let mut collector = Collector::new(api, push);
//!     collector.collect(&resource::organizations(), cancel).await
//! }
//! ```

pub mod collector;
pub mod config;
pub mod error;
pub mod push;
pub mod resource;
pub mod schema;
pub mod source;

// Re-exports for convenient access
pub use collector::{Collector, TableRegistry};
pub use config::{Config, MerakiConfig, PushConfig};
pub use error::{CollectError, Result};
pub use push::{PushClient, PushService};
pub use resource::{EntityRef, Resource};
pub use schema::{Column, ColumnValue, DataType, Record, SyncType, Table};
pub use source::{DashboardApi, MerakiClient};
