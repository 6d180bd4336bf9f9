//! Value encoding: one live entity instance → one positional record.
//!
//! Each field is read at the same index its column was inferred at, then
//! converted into the column's data-type slot. Numeric columns accept a fixed
//! widening fallback chain; anything else that does not line up fails the
//! whole record with an error naming the column.

use chrono::{DateTime, SubsecRound, Utc};

use crate::error::{CollectError, Result};

use super::entity::{Entity, FieldValue};
use super::{Column, ColumnValue, DataType, Record, Table};

/// Wire format required by the destination for timestamptz values: fixed six
/// fractional digits and an explicit timezone offset.
const TIMESTAMPTZ_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f%:z";

/// Encode one entity instance into a record for its table.
///
/// Fields are read positionally in the table's column order; any column that
/// cannot be satisfied fails the whole record (no partial rows).
pub fn record_for(table: &Table, entity: &dyn Entity) -> Result<Record> {
    let mut columns = Vec::with_capacity(table.columns.len());

    for (i, col) in table.columns.iter().enumerate() {
        let value = entity.field(i).ok_or_else(|| {
            CollectError::encode(
                &table.name,
                format!(
                    "shape {} has no field at index {} for column {:?}",
                    entity.shape().name,
                    i,
                    col.name
                ),
            )
        })?;
        let encoded =
            encode_value(col, &value).map_err(|msg| CollectError::encode(&table.name, msg))?;
        columns.push(encoded);
    }

    Ok(Record {
        table_name: table.name.clone(),
        columns,
    })
}

/// Encode one field value into a column's data-type slot.
///
/// Conversion chains are tried in a fixed order; the first match wins. An
/// absent optional encodes as null rather than an error.
fn encode_value(col: &Column, value: &FieldValue<'_>) -> std::result::Result<ColumnValue, String> {
    use FieldValue as F;

    if matches!(value, F::Null) {
        return Ok(ColumnValue::Null);
    }

    let encoded = match (col.data_type, value) {
        (DataType::Text, F::Text(s)) => ColumnValue::Text((*s).to_owned()),
        (DataType::Boolean, F::Boolean(b)) => ColumnValue::Boolean(*b),

        (DataType::Smallint, F::I16(v)) => ColumnValue::Smallint(*v),
        (DataType::Smallint, F::I8(v)) => ColumnValue::Smallint(i16::from(*v)),
        (DataType::Smallint, F::U8(v)) => ColumnValue::Smallint(i16::from(*v)),

        (DataType::Integer, F::I32(v)) => ColumnValue::Integer(*v),
        (DataType::Integer, F::U16(v)) => ColumnValue::Integer(i32::from(*v)),

        (DataType::Bigint, F::I64(v)) => ColumnValue::Bigint(*v),
        (DataType::Bigint, F::U32(v)) => ColumnValue::Bigint(i64::from(*v)),

        (DataType::Real, F::F32(v)) => ColumnValue::Real(*v),
        (DataType::Double, F::F64(v)) => ColumnValue::Double(*v),

        (DataType::Bytea, F::Bytes(b)) => ColumnValue::Bytea(b.to_vec()),
        (DataType::Bytea, F::SignedBytes(b)) => {
            ColumnValue::Bytea(b.iter().map(|v| *v as u8).collect())
        }

        (DataType::Timestamptz, F::Timestamp(ts)) => {
            ColumnValue::Timestamptz(format_timestamptz(ts))
        }

        (DataType::Inet, F::Inet(ip)) => ColumnValue::Inet(ip.to_string()),
        (DataType::Macaddr, F::Macaddr(mac)) => ColumnValue::Macaddr(mac.to_string()),
        (DataType::Cidr, F::Cidr(net)) => ColumnValue::Cidr(net.to_string()),

        (DataType::Jsonb, F::Json(v)) => ColumnValue::Jsonb(v.to_json().map_err(|e| {
            format!("column {:?}: jsonb serialization failed: {}", col.name, e)
        })?),

        _ => {
            return Err(format!(
                "column {:?}: cannot encode {} value as {}",
                col.name,
                value.kind_name(),
                col.data_type.name()
            ))
        }
    };

    Ok(encoded)
}

/// Render a timestamp truncated to microsecond precision.
pub(crate) fn format_timestamptz(ts: &DateTime<Utc>) -> String {
    ts.trunc_subsecs(6).format(TIMESTAMPTZ_FORMAT).to_string()
}
