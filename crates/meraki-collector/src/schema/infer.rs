//! Schema inference: entity shape → ordered column list.
//!
//! Runs once per distinct shape, at tree-construction time. The produced
//! ordering is the declaration order of the shape's fields, which is also the
//! order the encoder reads fields back out of live instances.

use tracing::warn;

use super::entity::{snake_case, EntityShape, FieldKind, FieldSpec};
use super::{Column, DataType};

/// Derive the column list for an entity shape.
///
/// Column names are the snake-cased wire names; optional fields become
/// nullable columns and map by their wrapped kind. The field whose name
/// matches `primary_key` (before or after the name transform) is flagged as
/// the primary-key column.
pub fn columns_for(shape: &EntityShape, primary_key: &str) -> Vec<Column> {
    let pk = snake_case(primary_key);

    shape
        .fields
        .iter()
        .map(|f| {
            let name = snake_case(f.name);
            let primary_key = f.name == primary_key || name == pk;
            Column {
                data_type: data_type_for(shape.name, f),
                nullable: f.optional,
                name,
                primary_key,
            }
        })
        .collect()
}

/// Map a field kind to its destination data type.
///
/// Fixed mapping, in priority order of specificity; unrecognized kinds fall
/// back to jsonb with a logged warning rather than failing schema derivation.
fn data_type_for(shape: &str, f: &FieldSpec) -> DataType {
    match f.kind {
        FieldKind::Text => DataType::Text,
        FieldKind::Boolean => DataType::Boolean,
        FieldKind::I8 | FieldKind::U8 | FieldKind::I16 => DataType::Smallint,
        FieldKind::U16 | FieldKind::I32 => DataType::Integer,
        FieldKind::I64 | FieldKind::U32 => DataType::Bigint,
        FieldKind::F32 => DataType::Real,
        FieldKind::F64 => DataType::Double,
        FieldKind::Bytes | FieldKind::SignedBytes => DataType::Bytea,
        FieldKind::Inet => DataType::Inet,
        FieldKind::Macaddr => DataType::Macaddr,
        FieldKind::Cidr => DataType::Cidr,
        FieldKind::Timestamp => DataType::Timestamptz,
        FieldKind::Json => DataType::Jsonb,
        FieldKind::Unknown(desc) => {
            warn!(
                shape,
                field = f.name,
                kind = desc,
                "unhandled field kind, storing as jsonb"
            );
            DataType::Jsonb
        }
    }
}
