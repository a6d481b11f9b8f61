//! Dynamic values produced by the reader and consumed by the writer.

use derive_more::derive::{AsRef, Constructor, Deref, From, Into};
use indexmap::IndexMap;
use std::fmt;

use crate::descriptor::BinaryRecord;
use crate::error::{Result, SchemaError};

/// Raw bytes stored in a fixed length blob field
#[derive(Constructor, Clone, Debug, Default, PartialEq, Eq, Hash, Deref, AsRef, From, Into)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Blob(Vec<u8>);

/// A single decoded field value
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
    String(String),
    Blob(Blob),
    Record(Record),
    Sequence(Vec<Value>),
    /// A conditional field whose presence rule was not met
    Absent,
}

impl Value {
    /// Short name of the variant, used in error messages
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::U8(_) => "u8",
            Value::U16(_) => "u16",
            Value::U32(_) => "u32",
            Value::U64(_) => "u64",
            Value::I8(_) => "i8",
            Value::I16(_) => "i16",
            Value::I32(_) => "i32",
            Value::I64(_) => "i64",
            Value::F32(_) => "f32",
            Value::F64(_) => "f64",
            Value::String(_) => "string",
            Value::Blob(_) => "blob",
            Value::Record(_) => "record",
            Value::Sequence(_) => "sequence",
            Value::Absent => "absent",
        }
    }

    /// The value as an element count, if it is a non-negative integer
    pub fn as_count(&self) -> Option<usize> {
        match *self {
            Value::U8(v) => Some(v as usize),
            Value::U16(v) => Some(v as usize),
            Value::U32(v) => usize::try_from(v).ok(),
            Value::U64(v) => usize::try_from(v).ok(),
            Value::I8(v) => usize::try_from(v).ok(),
            Value::I16(v) => usize::try_from(v).ok(),
            Value::I32(v) => usize::try_from(v).ok(),
            Value::I64(v) => usize::try_from(v).ok(),
            _ => None,
        }
    }

    /// The value widened to an `i128`, if it is an integer
    pub fn as_integer(&self) -> Option<i128> {
        match *self {
            Value::U8(v) => Some(v.into()),
            Value::U16(v) => Some(v.into()),
            Value::U32(v) => Some(v.into()),
            Value::U64(v) => Some(v.into()),
            Value::I8(v) => Some(v.into()),
            Value::I16(v) => Some(v.into()),
            Value::I32(v) => Some(v.into()),
            Value::I64(v) => Some(v.into()),
            _ => None,
        }
    }

    /// Whether this is the value of a field that was not present
    pub fn is_absent(&self) -> bool {
        matches!(self, Value::Absent)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::U8(v) => write!(f, "{v}"),
            Value::U16(v) => write!(f, "{v}"),
            Value::U32(v) => write!(f, "{v}"),
            Value::U64(v) => write!(f, "{v}"),
            Value::I8(v) => write!(f, "{v}"),
            Value::I16(v) => write!(f, "{v}"),
            Value::I32(v) => write!(f, "{v}"),
            Value::I64(v) => write!(f, "{v}"),
            Value::F32(v) => write!(f, "{v}"),
            Value::F64(v) => write!(f, "{v}"),
            Value::String(v) => write!(f, "{v:?}"),
            Value::Blob(v) => write!(f, "{:02X?}", v.as_slice()),
            Value::Record(v) => write!(f, "{v}"),
            Value::Sequence(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Value::Absent => f.write_str("-"),
        }
    }
}

/// Field values of one record, kept in wire order
///
/// ```
/// use gcf_binary::value::{Record, Value};
///
/// let mut record = Record::new().with("id", 42i64).with("name", "Potion");
/// assert_eq!(record.get("id"), Some(&Value::I64(42)));
///
/// let name: String = record.take("name").unwrap();
/// assert_eq!(name, "Potion");
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Record {
    fields: IndexMap<Box<str>, Value>,
}

impl Record {
    /// Create an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field and return the record
    pub fn with(mut self, name: impl Into<Box<str>>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Set a field, replacing any previous value under the same name
    pub fn insert(&mut self, name: impl Into<Box<str>>, value: impl Into<Value>) {
        self.fields.insert(name.into(), value.into());
    }

    /// Get a field by name
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Get a field by its position
    pub fn get_index(&self, index: usize) -> Option<(&str, &Value)> {
        self.fields
            .get_index(index)
            .map(|(name, value)| (name.as_ref(), value))
    }

    /// Number of fields on this record
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the record has no fields
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate over the fields in order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(name, value)| (name.as_ref(), value))
    }

    /// Remove a field and convert it
    pub fn take<T: FromValue>(&mut self, name: &str) -> Result<T> {
        let value = self
            .fields
            .shift_remove(name)
            .ok_or_else(|| SchemaError::MissingField {
                field: name.to_owned(),
            })?;
        T::from_value(value).map_err(|err| with_field_name(err, name))
    }

    /// Remove a nested record field and convert it into its declared type
    pub fn take_record<T: BinaryRecord>(&mut self, name: &str) -> Result<T> {
        T::from_record(self.take(name)?)
    }

    /// Remove a sequence of nested records and convert each into its declared type
    pub fn take_records<T: BinaryRecord>(&mut self, name: &str) -> Result<Vec<T>> {
        self.take::<Vec<Record>>(name)?
            .into_iter()
            .map(T::from_record)
            .collect()
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (name, value)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{name}: {value}")?;
        }
        f.write_str("}")
    }
}

impl<'a> IntoIterator for &'a Record {
    type Item = (&'a Box<str>, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, Box<str>, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

fn with_field_name(err: crate::error::Error, name: &str) -> crate::error::Error {
    match err {
        crate::error::Error::Schema(SchemaError::TypeMismatch {
            field,
            expected,
            found,
        }) if field.is_empty() => SchemaError::TypeMismatch {
            field: name.to_owned(),
            expected,
            found,
        }
        .into(),
        other => other,
    }
}

fn mismatch(expected: &str, found: &Value) -> crate::error::Error {
    SchemaError::TypeMismatch {
        field: String::new(),
        expected: expected.to_owned(),
        found: found.kind_name().to_owned(),
    }
    .into()
}

/// Conversion out of a decoded [`Value`]
///
/// Conversions are exact: a field decoded as `u16` only converts into `u16`.
pub trait FromValue: Sized {
    fn from_value(value: Value) -> Result<Self>;
}

macro_rules! impl_scalar {
    ($($ty:ty => $variant:ident, $name:literal);* $(;)?) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::$variant(value)
                }
            }

            impl FromValue for $ty {
                fn from_value(value: Value) -> Result<Self> {
                    match value {
                        Value::$variant(v) => Ok(v),
                        other => Err(mismatch($name, &other)),
                    }
                }
            }
        )*
    };
}

impl_scalar! {
    u8 => U8, "u8";
    u16 => U16, "u16";
    u32 => U32, "u32";
    u64 => U64, "u64";
    i8 => I8, "i8";
    i16 => I16, "i16";
    i32 => I32, "i32";
    i64 => I64, "i64";
    f32 => F32, "f32";
    f64 => F64, "f64";
    String => String, "string";
    Blob => Blob, "blob";
    Record => Record, "record";
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_owned())
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(value: Vec<T>) -> Self {
        Value::Sequence(value.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Absent, Into::into)
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Sequence(items) => items.into_iter().map(T::from_value).collect(),
            other => Err(mismatch("sequence", &other)),
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Absent => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl FromValue for Value {
    fn from_value(value: Value) -> Result<Self> {
        Ok(value)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            Value::U8(v) => serializer.serialize_u8(*v),
            Value::U16(v) => serializer.serialize_u16(*v),
            Value::U32(v) => serializer.serialize_u32(*v),
            Value::U64(v) => serializer.serialize_u64(*v),
            Value::I8(v) => serializer.serialize_i8(*v),
            Value::I16(v) => serializer.serialize_i16(*v),
            Value::I32(v) => serializer.serialize_i32(*v),
            Value::I64(v) => serializer.serialize_i64(*v),
            Value::F32(v) => serializer.serialize_f32(*v),
            Value::F64(v) => serializer.serialize_f64(*v),
            Value::String(v) => serializer.serialize_str(v),
            Value::Blob(v) => serde::Serialize::serialize(v, serializer),
            Value::Record(v) => serde::Serialize::serialize(v, serializer),
            Value::Sequence(v) => serializer.collect_seq(v),
            Value::Absent => serializer.serialize_none(),
        }
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Record {
    fn serialize<S>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeMap;

        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (k, v) in self.iter() {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use crate::error::{Error, Result, SchemaError};
    use crate::value::{Blob, Record, Value};

    #[test]
    fn record_keeps_insertion_order() {
        let record = Record::new()
            .with("z", 1u8)
            .with("a", 2u16)
            .with("m", "three");

        let names = record.iter().map(|(name, _)| name).collect::<Vec<_>>();
        assert_eq!(names, vec!["z", "a", "m"]);
        assert_eq!(record.get_index(1), Some(("a", &Value::U16(2))));
    }

    #[test]
    fn take_converts_exact_variants() -> Result<()> {
        let mut record = Record::new()
            .with("id", 7u32)
            .with("tags", vec![1i16, -1i16])
            .with("extra", Option::<u8>::None)
            .with("raw", Blob::new(vec![1, 2]));

        assert_eq!(record.take::<u32>("id")?, 7);
        assert_eq!(record.take::<Vec<i16>>("tags")?, vec![1, -1]);
        assert_eq!(record.take::<Option<u8>>("extra")?, None);
        assert_eq!(record.take::<Blob>("raw")?.as_slice(), &[1, 2]);
        assert!(record.is_empty());

        Ok(())
    }

    #[test]
    fn take_reports_mismatch_with_field_name() {
        let mut record = Record::new().with("id", 7u16);

        let err = record.take::<u32>("id").unwrap_err();
        assert!(matches!(
            err,
            Error::Schema(SchemaError::TypeMismatch { ref field, ref expected, ref found })
                if field == "id" && expected == "u32" && found == "u16"
        ));
    }

    #[test]
    fn take_missing_field() {
        let err = Record::new().take::<u8>("nope").unwrap_err();
        assert!(matches!(
            err,
            Error::Schema(SchemaError::MissingField { ref field }) if field == "nope"
        ));
    }

    #[test]
    fn count_conversion() {
        assert_eq!(Value::U8(3).as_count(), Some(3));
        assert_eq!(Value::I32(-1).as_count(), None);
        assert_eq!(Value::F32(1.0).as_count(), None);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serialize_as_json() {
        let record = Record::new()
            .with("id", 42i64)
            .with("name", "Potion")
            .with("drops", vec![Record::new().with("rate", 0.5f32)])
            .with("bonus", Option::<u8>::None);

        assert_eq!(
            serde_json::to_string(&record).unwrap(),
            r#"{"id":42,"name":"Potion","drops":[{"rate":0.5}],"bonus":null}"#
        );
    }
}
