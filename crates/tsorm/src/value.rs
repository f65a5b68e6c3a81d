//! Runtime values and static member kinds.
//!
//! [`Value`] is what a mapped member (or a captured closure value) holds at statement
//! build time. [`SqlKind`] is what a member is declared as, known without an instance;
//! metadata discovery uses it to validate attribute combinations and the expression
//! compiler uses it to carry enum context into sibling literals.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::entity::Record;
use crate::error::{OrmError, OrmResult};

/// One variant of a mapped enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EnumVariant {
    pub name: &'static str,
    pub discriminant: i64,
}

/// Static variant table of a mapped enum, generated by `#[derive(SqlEnum)]`.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct EnumInfo {
    pub name: &'static str,
    pub variants: &'static [EnumVariant],
}

impl EnumInfo {
    /// Find a variant by its exact name.
    pub fn by_name(&'static self, name: &str) -> Option<EnumValue> {
        self.variants
            .iter()
            .find(|v| v.name == name)
            .map(|v| EnumValue::new(self, v))
    }

    /// Find a variant by its discriminant.
    pub fn by_discriminant(&'static self, discriminant: i64) -> Option<EnumValue> {
        self.variants
            .iter()
            .find(|v| v.discriminant == discriminant)
            .map(|v| EnumValue::new(self, v))
    }
}

/// A concrete enum value: the variant plus the table it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnumValue {
    pub info: &'static EnumInfo,
    pub name: &'static str,
    pub discriminant: i64,
}

impl EnumValue {
    fn new(info: &'static EnumInfo, variant: &EnumVariant) -> Self {
        Self {
            info,
            name: variant.name,
            discriminant: variant.discriminant,
        }
    }
}

/// Implemented by `#[derive(SqlEnum)]` for fieldless enums.
pub trait SqlEnum: Copy + 'static {
    /// The enum's variant table.
    fn enum_info() -> &'static EnumInfo;

    /// This value's variant.
    fn enum_value(&self) -> EnumValue;
}

/// Declared kind of a mapped member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlKind {
    Bool,
    Integer,
    Float,
    Decimal,
    Char,
    String,
    Bytes,
    Date,
    Time,
    DateTime,
    DateTimeOffset,
    Guid,
    Enum(&'static EnumInfo),
    Json,
    List,
    Record,
}

impl SqlKind {
    /// Whether `auto_generate` is legal on a member of this kind.
    pub fn supports_auto_generate(&self) -> bool {
        matches!(self, Self::Guid | Self::DateTime | Self::DateTimeOffset)
    }

    /// The enum table, if this is an enum kind.
    pub fn enum_info(&self) -> Option<&'static EnumInfo> {
        match self {
            Self::Enum(info) => Some(info),
            _ => None,
        }
    }
}

/// A runtime value about to be rendered as a SQL literal.
#[derive(Clone)]
pub enum Value {
    Null,
    Bool(bool),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    #[cfg(feature = "decimal")]
    Decimal(rust_decimal::Decimal),
    Char(char),
    String(String),
    Bytes(Vec<u8>),
    Date(NaiveDate),
    Time(NaiveTime),
    /// A timestamp without zone, taken as UTC.
    DateTime(NaiveDateTime),
    DateTimeUtc(DateTime<Utc>),
    DateTimeOffset(DateTime<FixedOffset>),
    Uuid(Uuid),
    Enum(EnumValue),
    Json(serde_json::Value),
    /// A collection of values, the right side of an `IN` test.
    List(Vec<Value>),
    /// A captured object whose members can be read during constant folding.
    Record(Arc<dyn Record>),
}

impl Value {
    /// Serialize any `serde` value into a JSON document value.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> OrmResult<Self> {
        Ok(Self::Json(serde_json::to_value(value)?))
    }

    /// Build a value collection.
    pub fn list<I>(values: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        Self::List(values.into_iter().map(Into::into).collect())
    }

    /// Wrap a captured object so its members can be folded into literals.
    pub fn record<R: Record>(record: R) -> Self {
        Self::Record(Arc::new(record))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Integer payload of any integral value, used for enum coercion.
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Self::I8(v) => Some(v.into()),
            Self::I16(v) => Some(v.into()),
            Self::I32(v) => Some(v.into()),
            Self::I64(v) => Some(v),
            Self::U8(v) => Some(v.into()),
            Self::U16(v) => Some(v.into()),
            Self::U32(v) => Some(v.into()),
            Self::U64(v) => i64::try_from(v).ok(),
            _ => None,
        }
    }

    /// Short name of the value's shape for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::I8(_) => "i8",
            Self::I16(_) => "i16",
            Self::I32(_) => "i32",
            Self::I64(_) => "i64",
            Self::U8(_) => "u8",
            Self::U16(_) => "u16",
            Self::U32(_) => "u32",
            Self::U64(_) => "u64",
            Self::F32(_) => "f32",
            Self::F64(_) => "f64",
            #[cfg(feature = "decimal")]
            Self::Decimal(_) => "decimal",
            Self::Char(_) => "char",
            Self::String(_) => "string",
            Self::Bytes(_) => "bytes",
            Self::Date(_) => "date",
            Self::Time(_) => "time",
            Self::DateTime(_) | Self::DateTimeUtc(_) => "datetime",
            Self::DateTimeOffset(_) => "datetimeoffset",
            Self::Uuid(_) => "uuid",
            Self::Enum(_) => "enum",
            Self::Json(_) => "json",
            Self::List(_) => "list",
            Self::Record(_) => "record",
        }
    }

    /// Convert into a JSON document value (for JSON-serialized columns).
    pub fn to_json(&self) -> OrmResult<serde_json::Value> {
        use serde_json::Value as J;

        let json = match self {
            Self::Null => J::Null,
            Self::Bool(v) => J::from(*v),
            Self::I8(v) => J::from(*v),
            Self::I16(v) => J::from(*v),
            Self::I32(v) => J::from(*v),
            Self::I64(v) => J::from(*v),
            Self::U8(v) => J::from(*v),
            Self::U16(v) => J::from(*v),
            Self::U32(v) => J::from(*v),
            Self::U64(v) => J::from(*v),
            Self::F32(v) => J::from(*v),
            Self::F64(v) => J::from(*v),
            #[cfg(feature = "decimal")]
            Self::Decimal(v) => J::from(v.to_string()),
            Self::Char(v) => J::from(v.to_string()),
            Self::String(v) => J::from(v.as_str()),
            Self::Date(v) => serde_json::to_value(v)?,
            Self::Time(v) => serde_json::to_value(v)?,
            Self::DateTime(v) => serde_json::to_value(v)?,
            Self::DateTimeUtc(v) => serde_json::to_value(v)?,
            Self::DateTimeOffset(v) => serde_json::to_value(v)?,
            Self::Uuid(v) => J::from(v.to_string()),
            Self::Enum(v) => J::from(v.name),
            Self::Json(v) => v.clone(),
            Self::List(items) => J::Array(
                items
                    .iter()
                    .map(Value::to_json)
                    .collect::<OrmResult<Vec<_>>>()?,
            ),
            Self::Bytes(_) | Self::Record(_) => {
                return Err(OrmError::unsupported_type(format!(
                    "{} values cannot be serialized as JSON",
                    self.type_name()
                )));
            }
        };
        Ok(json)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("Null"),
            Self::Bool(v) => f.debug_tuple("Bool").field(v).finish(),
            Self::I8(v) => f.debug_tuple("I8").field(v).finish(),
            Self::I16(v) => f.debug_tuple("I16").field(v).finish(),
            Self::I32(v) => f.debug_tuple("I32").field(v).finish(),
            Self::I64(v) => f.debug_tuple("I64").field(v).finish(),
            Self::U8(v) => f.debug_tuple("U8").field(v).finish(),
            Self::U16(v) => f.debug_tuple("U16").field(v).finish(),
            Self::U32(v) => f.debug_tuple("U32").field(v).finish(),
            Self::U64(v) => f.debug_tuple("U64").field(v).finish(),
            Self::F32(v) => f.debug_tuple("F32").field(v).finish(),
            Self::F64(v) => f.debug_tuple("F64").field(v).finish(),
            #[cfg(feature = "decimal")]
            Self::Decimal(v) => f.debug_tuple("Decimal").field(v).finish(),
            Self::Char(v) => f.debug_tuple("Char").field(v).finish(),
            Self::String(v) => f.debug_tuple("String").field(v).finish(),
            Self::Bytes(v) => f.debug_tuple("Bytes").field(v).finish(),
            Self::Date(v) => f.debug_tuple("Date").field(v).finish(),
            Self::Time(v) => f.debug_tuple("Time").field(v).finish(),
            Self::DateTime(v) => f.debug_tuple("DateTime").field(v).finish(),
            Self::DateTimeUtc(v) => f.debug_tuple("DateTimeUtc").field(v).finish(),
            Self::DateTimeOffset(v) => f.debug_tuple("DateTimeOffset").field(v).finish(),
            Self::Uuid(v) => f.debug_tuple("Uuid").field(v).finish(),
            Self::Enum(v) => write!(f, "Enum({}::{})", v.info.name, v.name),
            Self::Json(v) => f.debug_tuple("Json").field(v).finish(),
            Self::List(v) => f.debug_tuple("List").field(v).finish(),
            Self::Record(r) => f.debug_tuple("Record").field(r).finish(),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::I8(a), Self::I8(b)) => a == b,
            (Self::I16(a), Self::I16(b)) => a == b,
            (Self::I32(a), Self::I32(b)) => a == b,
            (Self::I64(a), Self::I64(b)) => a == b,
            (Self::U8(a), Self::U8(b)) => a == b,
            (Self::U16(a), Self::U16(b)) => a == b,
            (Self::U32(a), Self::U32(b)) => a == b,
            (Self::U64(a), Self::U64(b)) => a == b,
            (Self::F32(a), Self::F32(b)) => a == b,
            (Self::F64(a), Self::F64(b)) => a == b,
            #[cfg(feature = "decimal")]
            (Self::Decimal(a), Self::Decimal(b)) => a == b,
            (Self::Char(a), Self::Char(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Bytes(a), Self::Bytes(b)) => a == b,
            (Self::Date(a), Self::Date(b)) => a == b,
            (Self::Time(a), Self::Time(b)) => a == b,
            (Self::DateTime(a), Self::DateTime(b)) => a == b,
            (Self::DateTimeUtc(a), Self::DateTimeUtc(b)) => a == b,
            (Self::DateTimeOffset(a), Self::DateTimeOffset(b)) => a == b,
            (Self::Uuid(a), Self::Uuid(b)) => a == b,
            (Self::Enum(a), Self::Enum(b)) => a == b,
            (Self::Json(a), Self::Json(b)) => a == b,
            (Self::List(a), Self::List(b)) => a == b,
            (Self::Record(a), Self::Record(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// A host type that can be stored in a mapped member.
pub trait SqlType {
    /// Declared kind, known without an instance.
    fn sql_kind() -> SqlKind;

    /// Runtime value of this instance.
    fn to_value(&self) -> Value;
}

macro_rules! impl_sql_type {
    ($($ty:ty => $kind:ident, $variant:ident;)*) => {
        $(
            impl SqlType for $ty {
                fn sql_kind() -> SqlKind {
                    SqlKind::$kind
                }

                fn to_value(&self) -> Value {
                    Value::$variant(self.clone())
                }
            }
        )*
    };
}

impl_sql_type! {
    bool => Bool, Bool;
    i8 => Integer, I8;
    i16 => Integer, I16;
    i32 => Integer, I32;
    i64 => Integer, I64;
    u8 => Integer, U8;
    u16 => Integer, U16;
    u32 => Integer, U32;
    u64 => Integer, U64;
    f32 => Float, F32;
    f64 => Float, F64;
    char => Char, Char;
    String => String, String;
    Vec<u8> => Bytes, Bytes;
    NaiveDate => Date, Date;
    NaiveTime => Time, Time;
    NaiveDateTime => DateTime, DateTime;
    DateTime<Utc> => DateTime, DateTimeUtc;
    DateTime<FixedOffset> => DateTimeOffset, DateTimeOffset;
    Uuid => Guid, Uuid;
    serde_json::Value => Json, Json;
}

#[cfg(feature = "decimal")]
impl_sql_type! {
    rust_decimal::Decimal => Decimal, Decimal;
}

impl SqlType for str {
    fn sql_kind() -> SqlKind {
        SqlKind::String
    }

    fn to_value(&self) -> Value {
        Value::String(self.to_string())
    }
}

impl SqlType for DateTime<Local> {
    fn sql_kind() -> SqlKind {
        SqlKind::DateTime
    }

    fn to_value(&self) -> Value {
        Value::DateTimeUtc(self.with_timezone(&Utc))
    }
}

impl<T: SqlType + ?Sized> SqlType for &T {
    fn sql_kind() -> SqlKind {
        T::sql_kind()
    }

    fn to_value(&self) -> Value {
        (**self).to_value()
    }
}

impl<T: SqlType> SqlType for Option<T> {
    fn sql_kind() -> SqlKind {
        T::sql_kind()
    }

    fn to_value(&self) -> Value {
        match self {
            Some(v) => v.to_value(),
            None => Value::Null,
        }
    }
}

impl<T: SqlType> From<T> for Value {
    fn from(value: T) -> Self {
        value.to_value()
    }
}

impl From<EnumValue> for Value {
    fn from(value: EnumValue) -> Self {
        Value::Enum(value)
    }
}
