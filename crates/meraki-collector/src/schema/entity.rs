//! Entity shapes: the capability abstraction behind schema inference.
//!
//! The source API hands back structured entities whose fields must be read
//! generically, both when a table schema is derived (once per shape) and when
//! each live instance is encoded into a row. Instead of per-row runtime type
//! inspection, every entity type exposes a static [`EntityShape`] (an ordered
//! field descriptor list) plus positional field access. The [`entity!`]
//! macro declares both from one field list, so descriptor order, serde wire
//! names, and field access can never drift apart.

use std::any::Any;
use std::fmt;
use std::net::IpAddr;

use chrono::{DateTime, Utc};
use ipnet::IpNet;
use macaddr::MacAddr6;
use serde::{Deserialize, Serialize};

/// Kind tag for a declared entity field, prior to data-type mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Boolean,
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    I64,
    F32,
    F64,
    Bytes,
    SignedBytes,
    Inet,
    Macaddr,
    Cidr,
    Timestamp,
    Json,
    /// A kind the mapping table does not recognize; the payload describes it
    /// for the warning log. Falls back to jsonb at inference time.
    Unknown(&'static str),
}

/// One declared field of an entity shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Wire name as the source API spells it (typically camelCase).
    pub name: &'static str,
    /// Declared kind, after unwrapping optionality.
    pub kind: FieldKind,
    /// Whether the field is optional (maps to a nullable column).
    pub optional: bool,
}

/// Static descriptor for an entity shape: name plus ordered field list.
///
/// Column ordering produced from this list is the same ordering used to read
/// fields back out of live instances; records are positional.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityShape {
    pub name: &'static str,
    pub fields: &'static [FieldSpec],
}

/// Object-safe serialization capability for jsonb-bound values.
pub trait ToJson {
    fn to_json(&self) -> serde_json::Result<String>;
}

impl<T: Serialize> ToJson for T {
    fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// One live field value, borrowed from an entity instance.
pub enum FieldValue<'a> {
    /// Absent optional field; encodes as a null column value.
    Null,
    Text(&'a str),
    Boolean(bool),
    I8(i8),
    U8(u8),
    I16(i16),
    U16(u16),
    I32(i32),
    U32(u32),
    I64(i64),
    F32(f32),
    F64(f64),
    Bytes(&'a [u8]),
    SignedBytes(&'a [i8]),
    Inet(IpAddr),
    Macaddr(MacAddr6),
    Cidr(IpNet),
    Timestamp(DateTime<Utc>),
    Json(&'a dyn ToJson),
}

impl FieldValue<'_> {
    /// Human-readable kind name for type-mismatch errors.
    pub fn kind_name(&self) -> &'static str {
        match self {
            FieldValue::Null => "null",
            FieldValue::Text(_) => "text",
            FieldValue::Boolean(_) => "boolean",
            FieldValue::I8(_) => "i8",
            FieldValue::U8(_) => "u8",
            FieldValue::I16(_) => "i16",
            FieldValue::U16(_) => "u16",
            FieldValue::I32(_) => "i32",
            FieldValue::U32(_) => "u32",
            FieldValue::I64(_) => "i64",
            FieldValue::F32(_) => "f32",
            FieldValue::F64(_) => "f64",
            FieldValue::Bytes(_) => "bytes",
            FieldValue::SignedBytes(_) => "signed bytes",
            FieldValue::Inet(_) => "inet",
            FieldValue::Macaddr(_) => "macaddr",
            FieldValue::Cidr(_) => "cidr",
            FieldValue::Timestamp(_) => "timestamp",
            FieldValue::Json(_) => "json",
        }
    }
}

impl fmt::Debug for FieldValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Json(_) => f.write_str("Json(..)"),
            other => f.write_str(other.kind_name()),
        }
    }
}

/// A collectible entity instance.
///
/// Implemented by the [`entity!`] macro; resolvers hand entities around as
/// `Arc<dyn Entity>` and child resolvers downcast the parent back to its
/// concrete shape to read identity fields.
pub trait Entity: Any + Send + Sync {
    /// Static shape descriptor for this entity type.
    fn shape(&self) -> &'static EntityShape;

    /// Read the field at `index` in declaration order; `None` past the end.
    fn field(&self, index: usize) -> Option<FieldValue<'_>>;

    /// Upcast for parent-shape downcasting in child resolvers.
    fn as_any(&self) -> &dyn Any;
}

/// Typed field capability: kind tag, optionality, and value extraction.
///
/// `Option<T>` is transparently optional; the wrapped kind drives data-type
/// mapping while absence encodes as [`FieldValue::Null`].
pub trait Field {
    const KIND: FieldKind;
    const OPTIONAL: bool = false;

    fn value(&self) -> FieldValue<'_>;
}

macro_rules! scalar_field {
    ($ty:ty, $kind:ident) => {
        impl Field for $ty {
            const KIND: FieldKind = FieldKind::$kind;

            fn value(&self) -> FieldValue<'_> {
                FieldValue::$kind(*self)
            }
        }
    };
}

scalar_field!(bool, Boolean);
scalar_field!(i8, I8);
scalar_field!(u8, U8);
scalar_field!(i16, I16);
scalar_field!(u16, U16);
scalar_field!(i32, I32);
scalar_field!(u32, U32);
scalar_field!(i64, I64);
scalar_field!(f32, F32);
scalar_field!(f64, F64);
scalar_field!(IpAddr, Inet);
scalar_field!(IpNet, Cidr);
scalar_field!(DateTime<Utc>, Timestamp);

impl Field for String {
    const KIND: FieldKind = FieldKind::Text;

    fn value(&self) -> FieldValue<'_> {
        FieldValue::Text(self)
    }
}

impl Field for Vec<u8> {
    const KIND: FieldKind = FieldKind::Bytes;

    fn value(&self) -> FieldValue<'_> {
        FieldValue::Bytes(self)
    }
}

impl Field for Vec<i8> {
    const KIND: FieldKind = FieldKind::SignedBytes;

    fn value(&self) -> FieldValue<'_> {
        FieldValue::SignedBytes(self)
    }
}

impl<T: Field> Field for Option<T> {
    const KIND: FieldKind = T::KIND;
    const OPTIONAL: bool = true;

    fn value(&self) -> FieldValue<'_> {
        match self {
            Some(v) => v.value(),
            None => FieldValue::Null,
        }
    }
}

/// Hardware address, carried on the wire as its canonical string form.
///
/// `macaddr`'s own serde impl reads a 6-byte array; source APIs send
/// `"00:18:0a:aa:bb:01"`, so deserialization goes through `str::parse`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MacAddress(pub MacAddr6);

impl std::str::FromStr for MacAddress {
    type Err = macaddr::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<MacAddr6>().map(MacAddress)
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl Serialize for MacAddress {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for MacAddress {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

impl Field for MacAddress {
    const KIND: FieldKind = FieldKind::Macaddr;

    fn value(&self) -> FieldValue<'_> {
        FieldValue::Macaddr(self.0)
    }
}

/// Wrapper marking a structured field for jsonb storage.
///
/// Deserializes transparently, so nested API objects can be declared as
/// `Json<T>` without changing the wire format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Json<T>(pub T);

impl<T: Serialize> Field for Json<T> {
    const KIND: FieldKind = FieldKind::Json;

    fn value(&self) -> FieldValue<'_> {
        FieldValue::Json(&self.0)
    }
}

/// Snake-case a wire field name.
///
/// A run of one or more uppercase letters starts a new word: the run is
/// lower-cased and, except at position 0, preceded by a single underscore.
pub fn snake_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 4);
    let mut caps = true;
    for (i, c) in s.chars().enumerate() {
        if c.is_uppercase() {
            if i > 0 && !caps {
                out.push('_');
            }
            caps = true;
            out.extend(c.to_lowercase());
        } else {
            caps = false;
            out.push(c);
        }
    }
    out
}

/// Declare an entity type: a deserializable struct plus its [`Entity`] impl.
///
/// Each field is listed as `"wireName" rust_name: Type`; the wire name feeds
/// both the serde rename and the shape descriptor, and declaration order is
/// the positional column order.
#[macro_export]
macro_rules! entity {
    (
        $(#[$meta:meta])*
        pub struct $name:ident {
            $( $(#[$fmeta:meta])* $wire:literal $field:ident : $fty:ty ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, serde::Deserialize)]
        pub struct $name {
            $(
                $(#[$fmeta])*
                #[serde(rename = $wire)]
                pub $field: $fty,
            )+
        }

        impl $name {
            /// Static field descriptor list, in declaration order.
            pub const SHAPE: &'static $crate::schema::entity::EntityShape =
                &$crate::schema::entity::EntityShape {
                    name: stringify!($name),
                    fields: &[
                        $(
                            $crate::schema::entity::FieldSpec {
                                name: $wire,
                                kind: <$fty as $crate::schema::entity::Field>::KIND,
                                optional: <$fty as $crate::schema::entity::Field>::OPTIONAL,
                            },
                        )+
                    ],
                };
        }

        impl $crate::schema::entity::Entity for $name {
            fn shape(&self) -> &'static $crate::schema::entity::EntityShape {
                Self::SHAPE
            }

            fn field(
                &self,
                index: usize,
            ) -> Option<$crate::schema::entity::FieldValue<'_>> {
                let mut i = 0usize;
                $(
                    if index == i {
                        return Some($crate::schema::entity::Field::value(&self.$field));
                    }
                    i += 1;
                )+
                let _ = i;
                None
            }

            fn as_any(&self) -> &dyn std::any::Any {
                self
            }
        }
    };
}
