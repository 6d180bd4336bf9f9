//! Destination table service: the push side of the pipeline.
//!
//! The collector only sees [`PushService`]: look up a table, create a table,
//! append a batch of records. [`PushClient`] is the HTTP implementation;
//! tests substitute their own.

mod http;

pub use http::PushClient;

use async_trait::async_trait;

use crate::error::Result;
use crate::schema::{Record, Table};

/// Table-oriented ingestion operations at the destination.
///
/// No partial-success contract is assumed: each call either fully succeeds or
/// fully fails, and no transaction spans multiple calls.
#[async_trait]
pub trait PushService: Send + Sync {
    /// Fetch a table definition. `Ok(None)` means the destination does not
    /// know the table; any other failure is an error.
    async fn get_table(&self, name: &str) -> Result<Option<Table>>;

    /// Create a table at the destination.
    async fn create_table(&self, table: &Table) -> Result<()>;

    /// Submit one batch of records as a single atomic upsert call.
    async fn upsert_records(&self, records: &[Record]) -> Result<()>;
}
