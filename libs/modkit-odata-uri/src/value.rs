use std::any::Any;
use std::fmt;
use std::sync::Arc;

use bigdecimal::BigDecimal;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, TimeDelta};
use uuid::Uuid;

/// A literal converted to a typed value.
#[derive(Clone)]
pub enum LiteralValue {
    Null,
    Boolean(bool),
    Byte(u8),
    SByte(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Single(f32),
    Double(f64),
    Decimal(BigDecimal),
    String(String),
    Guid(Uuid),
    Date(NaiveDate),
    TimeOfDay(NaiveTime),
    DateTimeOffset(DateTime<FixedOffset>),
    Duration(TimeDelta),
    Binary(Vec<u8>),
    /// Value produced by a host parser for a type the built-ins don't know.
    Custom(Arc<dyn Any + Send + Sync>),
}

impl LiteralValue {
    #[must_use]
    pub fn custom<T: Any + Send + Sync>(value: T) -> Self {
        LiteralValue::Custom(Arc::new(value))
    }

    /// Borrow a custom value as `T`.
    #[must_use]
    pub fn downcast_custom<T: Any>(&self) -> Option<&T> {
        match self {
            LiteralValue::Custom(v) => v.downcast_ref::<T>(),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, LiteralValue::Null)
    }

    /// Short kind name, used in logs.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            LiteralValue::Null => "null",
            LiteralValue::Boolean(_) => "boolean",
            LiteralValue::Byte(_) => "byte",
            LiteralValue::SByte(_) => "sbyte",
            LiteralValue::Int16(_) => "int16",
            LiteralValue::Int32(_) => "int32",
            LiteralValue::Int64(_) => "int64",
            LiteralValue::Single(_) => "single",
            LiteralValue::Double(_) => "double",
            LiteralValue::Decimal(_) => "decimal",
            LiteralValue::String(_) => "string",
            LiteralValue::Guid(_) => "guid",
            LiteralValue::Date(_) => "date",
            LiteralValue::TimeOfDay(_) => "time_of_day",
            LiteralValue::DateTimeOffset(_) => "datetime_offset",
            LiteralValue::Duration(_) => "duration",
            LiteralValue::Binary(_) => "binary",
            LiteralValue::Custom(_) => "custom",
        }
    }
}

impl fmt::Debug for LiteralValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LiteralValue::Null => f.write_str("Null"),
            LiteralValue::Boolean(v) => f.debug_tuple("Boolean").field(v).finish(),
            LiteralValue::Byte(v) => f.debug_tuple("Byte").field(v).finish(),
            LiteralValue::SByte(v) => f.debug_tuple("SByte").field(v).finish(),
            LiteralValue::Int16(v) => f.debug_tuple("Int16").field(v).finish(),
            LiteralValue::Int32(v) => f.debug_tuple("Int32").field(v).finish(),
            LiteralValue::Int64(v) => f.debug_tuple("Int64").field(v).finish(),
            LiteralValue::Single(v) => f.debug_tuple("Single").field(v).finish(),
            LiteralValue::Double(v) => f.debug_tuple("Double").field(v).finish(),
            LiteralValue::Decimal(v) => f.debug_tuple("Decimal").field(v).finish(),
            LiteralValue::String(v) => f.debug_tuple("String").field(v).finish(),
            LiteralValue::Guid(v) => f.debug_tuple("Guid").field(v).finish(),
            LiteralValue::Date(v) => f.debug_tuple("Date").field(v).finish(),
            LiteralValue::TimeOfDay(v) => f.debug_tuple("TimeOfDay").field(v).finish(),
            LiteralValue::DateTimeOffset(v) => f.debug_tuple("DateTimeOffset").field(v).finish(),
            LiteralValue::Duration(v) => f.debug_tuple("Duration").field(v).finish(),
            LiteralValue::Binary(v) => f.debug_tuple("Binary").field(v).finish(),
            LiteralValue::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl PartialEq for LiteralValue {
    fn eq(&self, other: &Self) -> bool {
        use LiteralValue as V;
        match (self, other) {
            (V::Null, V::Null) => true,
            (V::Boolean(a), V::Boolean(b)) => a == b,
            (V::Byte(a), V::Byte(b)) => a == b,
            (V::SByte(a), V::SByte(b)) => a == b,
            (V::Int16(a), V::Int16(b)) => a == b,
            (V::Int32(a), V::Int32(b)) => a == b,
            (V::Int64(a), V::Int64(b)) => a == b,
            (V::Single(a), V::Single(b)) => a.to_bits() == b.to_bits(),
            (V::Double(a), V::Double(b)) => a.to_bits() == b.to_bits(),
            (V::Decimal(a), V::Decimal(b)) => a == b,
            (V::String(a), V::String(b)) => a == b,
            (V::Guid(a), V::Guid(b)) => a == b,
            (V::Date(a), V::Date(b)) => a == b,
            (V::TimeOfDay(a), V::TimeOfDay(b)) => a == b,
            (V::DateTimeOffset(a), V::DateTimeOffset(b)) => a == b,
            (V::Duration(a), V::Duration(b)) => a == b,
            (V::Binary(a), V::Binary(b)) => a == b,
            // Host values have no equality contract; only the same allocation is equal.
            (V::Custom(a), V::Custom(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}
