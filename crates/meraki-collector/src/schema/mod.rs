//! Destination schema model: tables, columns, typed column values, records.
//!
//! These types are the wire-facing representation the push service consumes.
//! Schemas are derived once per entity shape by [`infer`] and rows are
//! produced positionally by [`encode`].

pub mod encode;
pub mod entity;
pub mod infer;

pub use encode::record_for;
pub use entity::{Entity, EntityShape, Field, FieldKind, FieldSpec, FieldValue, Json, MacAddress};

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Fixed enumeration of destination column data types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Text,
    Boolean,
    Smallint,
    Integer,
    Bigint,
    Real,
    Double,
    Bytea,
    Timestamptz,
    Inet,
    Cidr,
    Macaddr,
    Jsonb,
}

impl DataType {
    /// Destination type name, as used in error messages and on the wire.
    pub fn name(&self) -> &'static str {
        match self {
            DataType::Text => "text",
            DataType::Boolean => "boolean",
            DataType::Smallint => "smallint",
            DataType::Integer => "integer",
            DataType::Bigint => "bigint",
            DataType::Real => "real",
            DataType::Double => "double",
            DataType::Bytea => "bytea",
            DataType::Timestamptz => "timestamptz",
            DataType::Inet => "inet",
            DataType::Cidr => "cidr",
            DataType::Macaddr => "macaddr",
            DataType::Jsonb => "jsonb",
        }
    }
}

/// Table refresh policy at the destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncType {
    /// Each upsert appends to the destination table.
    Append,
    /// The destination replaces the table's content on each write cycle.
    Truncate,
}

/// One destination column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    /// Snake-cased column name derived from the source field name.
    pub name: String,

    /// Data type tag.
    pub data_type: DataType,

    /// Whether the column allows NULL.
    #[serde(default)]
    pub nullable: bool,

    /// Whether this is the table's primary-key column.
    #[serde(default)]
    pub primary_key: bool,
}

/// Destination table descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// Table name; unique key at the destination.
    pub name: String,

    /// Refresh policy.
    pub sync_type: SyncType,

    /// Ordered column list; records are positionally aligned with it.
    pub columns: Vec<Column>,
}

impl Table {
    /// Derive a table from an entity shape.
    ///
    /// Runs schema inference over the shape's declared fields; the field whose
    /// transformed name matches `primary_key` becomes the single primary-key
    /// column. Called once per shape at tree-construction time.
    pub fn for_shape(
        name: impl Into<String>,
        sync_type: SyncType,
        shape: &EntityShape,
        primary_key: &str,
    ) -> Self {
        let name = name.into();
        let columns = infer::columns_for(shape, primary_key);

        let pk_count = columns.iter().filter(|c| c.primary_key).count();
        if pk_count != 1 {
            warn!(
                table = %name,
                primary_key,
                pk_count,
                "expected exactly one primary-key column"
            );
        }

        Self {
            name,
            sync_type,
            columns,
        }
    }

    /// The primary-key column, if one was inferred.
    pub fn primary_key(&self) -> Option<&Column> {
        self.columns.iter().find(|c| c.primary_key)
    }
}

/// One typed column value; the tagged union over [`DataType`] plus null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum ColumnValue {
    Null,
    Text(String),
    Boolean(bool),
    Smallint(i16),
    Integer(i32),
    Bigint(i64),
    Real(f32),
    Double(f64),
    Bytea(Vec<u8>),
    /// Pre-rendered `YYYY-MM-DD HH:MM:SS.ffffff±HH:MM` wire string.
    Timestamptz(String),
    /// Canonical address string.
    Inet(String),
    /// Canonical address-with-prefix string.
    Cidr(String),
    /// Canonical hardware address string.
    Macaddr(String),
    /// Serialized JSON document.
    Jsonb(String),
}

impl ColumnValue {
    pub fn is_null(&self) -> bool {
        matches!(self, ColumnValue::Null)
    }
}

/// One encoded row for a specific table.
///
/// Transient; produced and consumed within a single node invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Destination table the row belongs to.
    pub table_name: String,

    /// Column values, positionally aligned with the table's column list.
    pub columns: Vec<ColumnValue>,
}
