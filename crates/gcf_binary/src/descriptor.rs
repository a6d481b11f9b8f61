//! Record declarations and their resolved descriptors.
//!
//! A record type declares its layout once through [`BinaryRecord::schema`]. The first
//! call to [`resolve`] validates that declaration into an immutable [`RecordDescriptor`]
//! and caches it for the rest of the process.

use std::{
    any::TypeId,
    collections::HashMap,
    fmt,
    sync::{Arc, OnceLock, PoisonError, RwLock},
};

use tracing::debug;

use crate::error::{Result, SchemaError};
use crate::value::Record;

/// A type with one fixed binary layout
///
/// ```
/// use gcf_binary::descriptor::{BinaryRecord, FieldSpec, PrefixWidth, Schema};
/// use gcf_binary::value::Record;
///
/// #[derive(Debug, PartialEq)]
/// struct Potion {
///     id: i64,
///     name: String,
/// }
///
/// impl BinaryRecord for Potion {
///     fn schema() -> Schema {
///         Schema::new("Potion")
///             .field("id", FieldSpec::i64())
///             .field("name", FieldSpec::string().length_prefixed(PrefixWidth::U8))
///     }
///
///     fn from_record(mut record: Record) -> gcf_binary::error::Result<Self> {
///         Ok(Self {
///             id: record.take("id")?,
///             name: record.take("name")?,
///         })
///     }
///
///     fn to_record(&self) -> Record {
///         Record::new().with("id", self.id).with("name", self.name.as_str())
///     }
/// }
///
/// let potion = Potion { id: 42, name: "Potion".into() };
/// let bytes = gcf_binary::write_record(&potion).unwrap();
/// assert_eq!(gcf_binary::read_record::<Potion>(&bytes).unwrap(), potion);
/// ```
pub trait BinaryRecord: Sized + 'static {
    /// Declare the fields of this record in wire order
    fn schema() -> Schema;

    /// Build the record from decoded field values
    fn from_record(record: Record) -> Result<Self>;

    /// Collect the field values to encode
    fn to_record(&self) -> Record;
}

/// Fixed size numeric types
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    U8,
    U16,
    U32,
    U64,
    I8,
    I16,
    I32,
    I64,
    F32,
    F64,
}

impl PrimitiveKind {
    /// Encoded size in bytes
    pub const fn size(self) -> usize {
        match self {
            PrimitiveKind::U8 | PrimitiveKind::I8 => 1,
            PrimitiveKind::U16 | PrimitiveKind::I16 => 2,
            PrimitiveKind::U32 | PrimitiveKind::I32 | PrimitiveKind::F32 => 4,
            PrimitiveKind::U64 | PrimitiveKind::I64 | PrimitiveKind::F64 => 8,
        }
    }

    /// Whether values of this kind can serve as counts
    pub const fn is_integer(self) -> bool {
        !matches!(self, PrimitiveKind::F32 | PrimitiveKind::F64)
    }

    pub const fn name(self) -> &'static str {
        match self {
            PrimitiveKind::U8 => "u8",
            PrimitiveKind::U16 => "u16",
            PrimitiveKind::U32 => "u32",
            PrimitiveKind::U64 => "u64",
            PrimitiveKind::I8 => "i8",
            PrimitiveKind::I16 => "i16",
            PrimitiveKind::I32 => "i32",
            PrimitiveKind::I64 => "i64",
            PrimitiveKind::F32 => "f32",
            PrimitiveKind::F64 => "f64",
        }
    }
}

/// Width of a length prefix
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum PrefixWidth {
    U8,
    U16,
    U32,
}

impl PrefixWidth {
    /// Encoded size in bytes
    pub const fn size(self) -> usize {
        match self {
            PrefixWidth::U8 => 1,
            PrefixWidth::U16 => 2,
            PrefixWidth::U32 => 4,
        }
    }

    /// Largest length the prefix can hold
    pub const fn max(self) -> u64 {
        match self {
            PrefixWidth::U8 => u8::MAX as u64,
            PrefixWidth::U16 => u16::MAX as u64,
            PrefixWidth::U32 => u32::MAX as u64,
        }
    }
}

/// How text is turned into code units
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub enum TextEncoding {
    /// One byte per unit
    #[default]
    Utf8,

    /// Two little-endian bytes per unit
    Utf16,
}

impl TextEncoding {
    /// Bytes per code unit
    pub const fn unit(self) -> usize {
        match self {
            TextEncoding::Utf8 => 1,
            TextEncoding::Utf16 => 2,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            TextEncoding::Utf8 => "utf-8",
            TextEncoding::Utf16 => "utf-16",
        }
    }
}

/// How a string's extent is framed on the wire. Lengths count code units.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum StringEncoding {
    /// Exactly this many units, zero padded
    FixedLength(usize),

    /// A unit count of the given width followed by the units
    LengthPrefixed(PrefixWidth),

    /// Units followed by a zero unit
    NullTerminated,
}

/// Where a sequence takes its element count from
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CountSource {
    /// Always this many elements
    Constant(usize),

    /// The decoded value of an earlier integer field
    Field(String),

    /// As many elements as fit in the rest of the buffer
    Remaining,
}

/// Whether a field is on the wire at all
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Presence {
    #[default]
    Always,

    /// Present when an earlier integer field is not zero
    NonZero(String),

    /// Present when an earlier integer field holds this value
    Equals(String, i64),
}

impl Presence {
    fn target(&self) -> Option<&str> {
        match self {
            Presence::Always => None,
            Presence::NonZero(target) | Presence::Equals(target, _) => Some(target.as_str()),
        }
    }

    /// Evaluate against the sibling values decoded or supplied so far
    pub fn holds(&self, siblings: &Record) -> bool {
        let value_of = |target: &str| {
            siblings
                .get(target)
                .and_then(|value| value.as_integer())
                .unwrap_or(0)
        };

        match self {
            Presence::Always => true,
            Presence::NonZero(target) => value_of(target) != 0,
            Presence::Equals(target, expected) => value_of(target) == i128::from(*expected),
        }
    }
}

#[derive(Clone)]
enum KindSpec {
    Primitive(PrimitiveKind),
    String {
        text: TextEncoding,
        encoding: Option<StringEncoding>,
    },
    Blob(usize),
    Record(fn() -> Result<Arc<RecordDescriptor>>),
    Sequence {
        element: Box<FieldSpec>,
        count: Option<CountSource>,
    },
}

/// The declared encoding of one field
///
/// Constructors pick the kind, modifiers add the encoding parameters. Whether the
/// combination is complete is checked when the owning schema is resolved.
#[derive(Clone)]
pub struct FieldSpec {
    kind: KindSpec,
    presence: Presence,
    misapplied: Option<&'static str>,
}

macro_rules! primitive_specs {
    ($($fn:ident => $kind:ident),* $(,)?) => {
        $(
            pub fn $fn() -> Self {
                Self::new(KindSpec::Primitive(PrimitiveKind::$kind))
            }
        )*
    };
}

impl FieldSpec {
    fn new(kind: KindSpec) -> Self {
        Self {
            kind,
            presence: Presence::Always,
            misapplied: None,
        }
    }

    primitive_specs! {
        u8 => U8,
        u16 => U16,
        u32 => U32,
        u64 => U64,
        i8 => I8,
        i16 => I16,
        i32 => I32,
        i64 => I64,
        f32 => F32,
        f64 => F64,
    }

    /// UTF-8 text, which still needs an encoding mode
    pub fn string() -> Self {
        Self::new(KindSpec::String {
            text: TextEncoding::Utf8,
            encoding: None,
        })
    }

    /// UTF-16 text, which still needs an encoding mode
    pub fn wide_string() -> Self {
        Self::new(KindSpec::String {
            text: TextEncoding::Utf16,
            encoding: None,
        })
    }

    /// Exactly `len` raw bytes
    pub fn blob(len: usize) -> Self {
        Self::new(KindSpec::Blob(len))
    }

    /// A nested record of type `T`
    pub fn record<T: BinaryRecord>() -> Self {
        Self::new(KindSpec::Record(resolve::<T>))
    }

    /// A homogeneous sequence, which still needs a count source
    pub fn sequence(element: FieldSpec) -> Self {
        Self::new(KindSpec::Sequence {
            element: Box::new(element),
            count: None,
        })
    }

    fn with_encoding(mut self, modifier: &'static str, mode: StringEncoding) -> Self {
        match &mut self.kind {
            KindSpec::String { encoding, .. } => *encoding = Some(mode),
            _ => self.misapplied = Some(modifier),
        }
        self
    }

    /// Zero padded string of exactly `len` units
    pub fn fixed_length(self, len: usize) -> Self {
        self.with_encoding("fixed_length", StringEncoding::FixedLength(len))
    }

    /// String preceded by its unit count
    pub fn length_prefixed(self, width: PrefixWidth) -> Self {
        self.with_encoding("length_prefixed", StringEncoding::LengthPrefixed(width))
    }

    /// String followed by a zero unit
    pub fn null_terminated(self) -> Self {
        self.with_encoding("null_terminated", StringEncoding::NullTerminated)
    }

    /// Set where a sequence takes its element count from
    pub fn count(mut self, source: CountSource) -> Self {
        match &mut self.kind {
            KindSpec::Sequence { count, .. } => *count = Some(source),
            _ => self.misapplied = Some("count"),
        }
        self
    }

    pub fn count_constant(self, count: usize) -> Self {
        self.count(CountSource::Constant(count))
    }

    pub fn count_field(self, field: impl Into<String>) -> Self {
        self.count(CountSource::Field(field.into()))
    }

    pub fn count_remaining(self) -> Self {
        self.count(CountSource::Remaining)
    }

    /// Only read and write this field when `presence` holds
    pub fn present_if(mut self, presence: Presence) -> Self {
        self.presence = presence;
        self
    }
}

/// An ordered list of field declarations for one record type
#[derive(Clone)]
pub struct Schema {
    name: &'static str,
    fields: Vec<(String, FieldSpec)>,
}

impl Schema {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            fields: Vec::new(),
        }
    }

    /// Append a field. Declaration order is wire order.
    pub fn field(mut self, name: impl Into<String>, spec: FieldSpec) -> Self {
        self.fields.push((name.into(), spec));
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

/// The resolved encoding of a field
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    Primitive(PrimitiveKind),
    String {
        text: TextEncoding,
        encoding: StringEncoding,
    },
    Blob(usize),
    Record(Arc<RecordDescriptor>),
    Sequence {
        element: Box<FieldKind>,
        count: CountSource,
    },
}

impl FieldKind {
    /// Encoded size, if it does not depend on the value
    pub fn fixed_size(&self) -> Option<usize> {
        match self {
            FieldKind::Primitive(kind) => Some(kind.size()),
            FieldKind::String {
                text,
                encoding: StringEncoding::FixedLength(len),
            } => Some(len * text.unit()),
            FieldKind::String { .. } => None,
            FieldKind::Blob(len) => Some(*len),
            FieldKind::Record(descriptor) => descriptor.fixed_size(),
            FieldKind::Sequence {
                element,
                count: CountSource::Constant(count),
            } => element.fixed_size().map(|size| size * count),
            FieldKind::Sequence { .. } => None,
        }
    }

    fn consumes_remainder(&self) -> bool {
        match self {
            FieldKind::Sequence {
                count: CountSource::Remaining,
                ..
            } => true,
            FieldKind::Sequence { element, .. } => element.consumes_remainder(),
            FieldKind::Record(descriptor) => descriptor.consumes_remainder(),
            _ => false,
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::Primitive(kind) => f.write_str(kind.name()),
            FieldKind::String { text, encoding } => match encoding {
                StringEncoding::FixedLength(len) => {
                    write!(f, "string({}, fixed {len})", text.name())
                }
                StringEncoding::LengthPrefixed(width) => {
                    write!(f, "string({}, {} byte prefix)", text.name(), width.size())
                }
                StringEncoding::NullTerminated => {
                    write!(f, "string({}, null terminated)", text.name())
                }
            },
            FieldKind::Blob(len) => write!(f, "blob({len})"),
            FieldKind::Record(descriptor) => write!(f, "record {}", descriptor.name()),
            FieldKind::Sequence { element, count } => match count {
                CountSource::Constant(count) => write!(f, "sequence<{element}>[{count}]"),
                CountSource::Field(field) => write!(f, "sequence<{element}>[{field}]"),
                CountSource::Remaining => write!(f, "sequence<{element}>[..]"),
            },
        }
    }
}

/// The resolved encoding of one named field
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    name: Box<str>,
    kind: FieldKind,
    presence: Presence,
}

impl FieldDescriptor {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    pub fn presence(&self) -> &Presence {
        &self.presence
    }
}

impl fmt::Display for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.kind)?;
        match &self.presence {
            Presence::Always => Ok(()),
            Presence::NonZero(target) => write!(f, " if {target} != 0"),
            Presence::Equals(target, value) => write!(f, " if {target} == {value}"),
        }
    }
}

/// The validated, immutable layout of a record type
#[derive(Debug, Clone, PartialEq)]
pub struct RecordDescriptor {
    name: &'static str,
    fields: Vec<FieldDescriptor>,
}

impl RecordDescriptor {
    /// Validate a schema
    pub fn from_schema(schema: Schema) -> Result<Self> {
        let record = schema.name;
        let mut fields: Vec<FieldDescriptor> = Vec::with_capacity(schema.fields.len());

        for (position, (name, spec)) in schema.fields.iter().enumerate() {
            let located = |field: &str| (record.to_owned(), field.to_owned());

            if fields.iter().any(|f| *f.name == **name) {
                let (record, field) = located(name);
                return Err(SchemaError::DuplicateField { record, field }.into());
            }

            if let Some(previous) = fields.last().filter(|f| f.kind.consumes_remainder()) {
                let (record, field) = located(name);
                return Err(SchemaError::FieldAfterRemainder {
                    record,
                    field,
                    previous: previous.name.to_string(),
                }
                .into());
            }

            if let Some(modifier) = spec.misapplied {
                let (record, field) = located(name);
                return Err(SchemaError::InvalidModifier {
                    record,
                    field,
                    modifier,
                }
                .into());
            }

            let references = |target: &str| -> Result<()> {
                let (record, field) = located(name);
                let target_owned = target.to_owned();
                match fields.iter().find(|f| &*f.name == target) {
                    Some(FieldDescriptor {
                        kind: FieldKind::Primitive(kind),
                        ..
                    }) if kind.is_integer() => Ok(()),
                    Some(_) => Err(SchemaError::ReferenceNotInteger {
                        record,
                        field,
                        target: target_owned,
                    }
                    .into()),
                    None if schema.fields[position..].iter().any(|(n, _)| n == target) => {
                        Err(SchemaError::ForwardReference {
                            record,
                            field,
                            target: target_owned,
                        }
                        .into())
                    }
                    None => Err(SchemaError::UnknownReference {
                        record,
                        field,
                        target: target_owned,
                    }
                    .into()),
                }
            };

            if let Some(target) = spec.presence.target() {
                references(target)?;
            }

            let kind = resolve_kind(record, name, &spec.kind, true)?;
            if let FieldKind::Sequence {
                count: CountSource::Field(target),
                ..
            } = &kind
            {
                references(target.as_str())?;
            }

            fields.push(FieldDescriptor {
                name: name.as_str().into(),
                kind,
                presence: spec.presence.clone(),
            });
        }

        Ok(Self {
            name: record,
            fields,
        })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Fields in wire order
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Find a field by name
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| &*f.name == name)
    }

    /// Encoded size of every value of this record, if all fields are fixed size and
    /// unconditional
    pub fn fixed_size(&self) -> Option<usize> {
        self.fields.iter().try_fold(0, |total, field| match field.presence {
            Presence::Always => field.kind.fixed_size().map(|size| total + size),
            _ => None,
        })
    }

    /// Whether decoding this record reads until the end of the buffer
    pub fn consumes_remainder(&self) -> bool {
        self.fields
            .last()
            .is_some_and(|field| field.kind.consumes_remainder())
    }
}

impl fmt::Display for RecordDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.name)?;
        for field in &self.fields {
            writeln!(f, "  {field}")?;
        }
        Ok(())
    }
}

fn resolve_kind(record: &str, field: &str, spec: &KindSpec, top_level: bool) -> Result<FieldKind> {
    let located = || (record.to_owned(), field.to_owned());

    Ok(match spec {
        KindSpec::Primitive(kind) => FieldKind::Primitive(*kind),
        KindSpec::String { text, encoding } => {
            let Some(encoding) = encoding else {
                let (record, field) = located();
                return Err(SchemaError::MissingEncoding { record, field }.into());
            };
            if *encoding == StringEncoding::FixedLength(0) {
                let (record, field) = located();
                return Err(SchemaError::ZeroLength { record, field }.into());
            }
            FieldKind::String {
                text: *text,
                encoding: *encoding,
            }
        }
        KindSpec::Blob(0) => {
            let (record, field) = located();
            return Err(SchemaError::ZeroLength { record, field }.into());
        }
        KindSpec::Blob(len) => FieldKind::Blob(*len),
        KindSpec::Record(resolve) => FieldKind::Record(resolve()?),
        KindSpec::Sequence { element, count } => {
            let Some(count) = count else {
                let (record, field) = located();
                return Err(SchemaError::MissingCount { record, field }.into());
            };
            if !top_level && !matches!(count, CountSource::Constant(_)) {
                let (record, field) = located();
                return Err(SchemaError::ElementCount { record, field }.into());
            }
            if let Some(modifier) = element.misapplied {
                let (record, field) = located();
                return Err(SchemaError::InvalidModifier {
                    record,
                    field,
                    modifier,
                }
                .into());
            }
            if element.presence != Presence::Always {
                let (record, field) = located();
                return Err(SchemaError::InvalidModifier {
                    record,
                    field,
                    modifier: "present_if",
                }
                .into());
            }
            let element = resolve_kind(record, field, &element.kind, false)?;
            // An element reading to the end would swallow every element after it.
            if element.consumes_remainder() {
                let (record, field) = located();
                return Err(SchemaError::ElementCount { record, field }.into());
            }
            FieldKind::Sequence {
                element: Box::new(element),
                count: count.clone(),
            }
        }
    })
}

type DescriptorCache = RwLock<HashMap<TypeId, Arc<RecordDescriptor>>>;

fn cache() -> &'static DescriptorCache {
    static CACHE: OnceLock<DescriptorCache> = OnceLock::new();
    CACHE.get_or_init(Default::default)
}

/// Get the descriptor for `T`, validating its schema on first use
///
/// Descriptors are never invalidated. Failed resolutions are not cached.
pub fn resolve<T: BinaryRecord>() -> Result<Arc<RecordDescriptor>> {
    let id = TypeId::of::<T>();
    if let Some(descriptor) = cache()
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(&id)
    {
        return Ok(Arc::clone(descriptor));
    }

    // Built outside the lock, nested record types resolve through this same cache.
    let schema = T::schema();
    debug!(record = schema.name(), "resolving record descriptor");
    let descriptor = Arc::new(RecordDescriptor::from_schema(schema)?);

    let mut cache = cache().write().unwrap_or_else(PoisonError::into_inner);
    Ok(Arc::clone(cache.entry(id).or_insert(descriptor)))
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use tracing_test::traced_test;

    use crate::descriptor::{
        resolve, BinaryRecord, CountSource, FieldKind, FieldSpec, Presence, PrefixWidth,
        RecordDescriptor, Schema,
    };
    use crate::error::{Error, Result, SchemaError};
    use crate::value::Record;

    fn schema_error(schema: Schema) -> SchemaError {
        match RecordDescriptor::from_schema(schema) {
            Err(Error::Schema(err)) => err,
            other => panic!("expected a schema error, got {other:?}"),
        }
    }

    struct Vertex;

    impl BinaryRecord for Vertex {
        fn schema() -> Schema {
            Schema::new("Vertex")
                .field("x", FieldSpec::f32())
                .field("y", FieldSpec::f32())
                .field("z", FieldSpec::f32())
        }

        fn from_record(_: Record) -> Result<Self> {
            Ok(Vertex)
        }

        fn to_record(&self) -> Record {
            Record::new()
        }
    }

    #[traced_test]
    #[test]
    fn resolve_is_cached() -> Result<()> {
        let first = resolve::<Vertex>()?;
        let second = resolve::<Vertex>()?;

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.fields().len(), 3);
        assert_eq!(first.fixed_size(), Some(12));

        Ok(())
    }

    #[test]
    fn keeps_declaration_order() -> Result<()> {
        let descriptor = RecordDescriptor::from_schema(
            Schema::new("Ordered")
                .field("z", FieldSpec::u8())
                .field("a", FieldSpec::string().null_terminated())
                .field("m", FieldSpec::blob(4)),
        )?;

        let names = descriptor
            .fields()
            .iter()
            .map(|f| f.name())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["z", "a", "m"]);
        assert_eq!(descriptor.fixed_size(), None);

        Ok(())
    }

    #[test]
    fn string_without_encoding() {
        let err = schema_error(Schema::new("Item").field("name", FieldSpec::string()));
        assert_eq!(
            err,
            SchemaError::MissingEncoding {
                record: "Item".into(),
                field: "name".into()
            }
        );
    }

    #[test]
    fn sequence_without_count() {
        let err = schema_error(
            Schema::new("Table").field("rows", FieldSpec::sequence(FieldSpec::u32())),
        );
        assert!(matches!(err, SchemaError::MissingCount { .. }));
    }

    #[test]
    fn count_references_unknown_field() {
        let err = schema_error(
            Schema::new("Table").field(
                "rows",
                FieldSpec::sequence(FieldSpec::u32()).count_field("row_count"),
            ),
        );
        assert_eq!(
            err,
            SchemaError::UnknownReference {
                record: "Table".into(),
                field: "rows".into(),
                target: "row_count".into()
            }
        );
    }

    #[test]
    fn count_references_later_field() {
        let err = schema_error(
            Schema::new("Table")
                .field(
                    "rows",
                    FieldSpec::sequence(FieldSpec::u32()).count_field("row_count"),
                )
                .field("row_count", FieldSpec::u32()),
        );
        assert!(matches!(err, SchemaError::ForwardReference { .. }));
    }

    #[test]
    fn count_references_non_integer() {
        let err = schema_error(
            Schema::new("Table")
                .field("row_count", FieldSpec::f32())
                .field(
                    "rows",
                    FieldSpec::sequence(FieldSpec::u32()).count_field("row_count"),
                ),
        );
        assert!(matches!(err, SchemaError::ReferenceNotInteger { .. }));
    }

    #[test]
    fn presence_references_later_field() {
        let err = schema_error(
            Schema::new("Item")
                .field(
                    "bonus",
                    FieldSpec::u32().present_if(Presence::NonZero("flags".into())),
                )
                .field("flags", FieldSpec::u8()),
        );
        assert!(matches!(err, SchemaError::ForwardReference { .. }));
    }

    #[test]
    fn duplicate_field() {
        let err = schema_error(
            Schema::new("Item")
                .field("id", FieldSpec::u32())
                .field("id", FieldSpec::u64()),
        );
        assert!(matches!(err, SchemaError::DuplicateField { .. }));
    }

    #[test]
    fn field_after_remaining_sequence() {
        let err = schema_error(
            Schema::new("Heights")
                .field("values", FieldSpec::sequence(FieldSpec::f32()).count_remaining())
                .field("checksum", FieldSpec::u32()),
        );
        assert_eq!(
            err,
            SchemaError::FieldAfterRemainder {
                record: "Heights".into(),
                field: "checksum".into(),
                previous: "values".into()
            }
        );
    }

    #[test]
    fn element_count_must_be_constant() {
        let err = schema_error(Schema::new("Grid").field(
            "rows",
            FieldSpec::sequence(FieldSpec::sequence(FieldSpec::u8()).count_remaining())
                .count_constant(4),
        ));
        assert!(matches!(err, SchemaError::ElementCount { .. }));
    }

    struct Trailer;

    impl BinaryRecord for Trailer {
        fn schema() -> Schema {
            Schema::new("Trailer")
                .field("tag", FieldSpec::u8())
                .field("rest", FieldSpec::sequence(FieldSpec::u8()).count_remaining())
        }

        fn from_record(_: Record) -> Result<Self> {
            Ok(Trailer)
        }

        fn to_record(&self) -> Record {
            Record::new()
        }
    }

    #[test]
    fn element_reading_to_end_with_constant_count() {
        let err = schema_error(Schema::new("Outer").field(
            "items",
            FieldSpec::sequence(FieldSpec::record::<Trailer>()).count_constant(2),
        ));
        assert_eq!(
            err,
            SchemaError::ElementCount {
                record: "Outer".into(),
                field: "items".into()
            }
        );
    }

    #[test]
    fn element_reading_to_end_with_remaining_count() {
        let err = schema_error(Schema::new("Outer").field(
            "items",
            FieldSpec::sequence(FieldSpec::record::<Trailer>()).count_remaining(),
        ));
        assert!(matches!(err, SchemaError::ElementCount { .. }));
    }

    #[test]
    fn nested_record_ending_in_remainder_is_last() -> Result<()> {
        let descriptor = RecordDescriptor::from_schema(
            Schema::new("File")
                .field("version", FieldSpec::u16())
                .field("body", FieldSpec::record::<Trailer>()),
        )?;
        assert!(descriptor.consumes_remainder());

        let err = schema_error(
            Schema::new("File")
                .field("body", FieldSpec::record::<Trailer>())
                .field("checksum", FieldSpec::u32()),
        );
        assert!(matches!(err, SchemaError::FieldAfterRemainder { .. }));

        Ok(())
    }

    #[test]
    fn modifier_on_wrong_kind() {
        let err = schema_error(
            Schema::new("Item").field("id", FieldSpec::u32().fixed_length(4)),
        );
        assert!(matches!(
            err,
            SchemaError::InvalidModifier {
                modifier: "fixed_length",
                ..
            }
        ));
    }

    #[test]
    fn zero_fixed_length() {
        let err = schema_error(
            Schema::new("Item").field("name", FieldSpec::string().fixed_length(0)),
        );
        assert!(matches!(err, SchemaError::ZeroLength { .. }));
    }

    #[test]
    fn nested_constant_sequences_have_fixed_size() -> Result<()> {
        let descriptor = RecordDescriptor::from_schema(
            Schema::new("Patch")
                .field(
                    "heights",
                    FieldSpec::sequence(FieldSpec::sequence(FieldSpec::f32()).count_constant(3))
                        .count_constant(3),
                )
                .field("name", FieldSpec::wide_string().fixed_length(8))
                .field("origin", FieldSpec::record::<Vertex>()),
        )?;

        assert_eq!(descriptor.fixed_size(), Some(36 + 16 + 12));
        assert!(matches!(
            descriptor.field("heights").map(|f| f.kind()),
            Some(FieldKind::Sequence {
                count: CountSource::Constant(3),
                ..
            })
        ));
        assert_eq!(
            descriptor.field("origin").map(|f| f.kind().to_string()),
            Some("record Vertex".to_owned())
        );

        Ok(())
    }

    #[test]
    fn describe_layout() -> Result<()> {
        let descriptor = RecordDescriptor::from_schema(
            Schema::new("Monster")
                .field("id", FieldSpec::u32())
                .field("name", FieldSpec::string().length_prefixed(PrefixWidth::U16))
                .field("drop_count", FieldSpec::u8())
                .field(
                    "drops",
                    FieldSpec::sequence(FieldSpec::u32()).count_field("drop_count"),
                )
                .field(
                    "boss_bonus",
                    FieldSpec::u32().present_if(Presence::Equals("drop_count".into(), 3)),
                ),
        )?;

        assert_eq!(
            descriptor.to_string(),
            "Monster\n  id: u32\n  name: string(utf-8, 2 byte prefix)\n  drop_count: u8\n  drops: sequence<u32>[drop_count]\n  boss_bonus: u32 if drop_count == 3\n"
        );

        Ok(())
    }
}
