//! Types for writing records
//!

use std::any::type_name;

use tracing::{instrument, trace};

use crate::{
    codec,
    cursor::BinaryCursor,
    descriptor::{resolve, BinaryRecord, RecordDescriptor},
    error::{Result, SchemaError},
    value::{Record, Value},
};

/// Record writer appending to a growable buffer
///
/// ```
/// # fn doit() -> gcf_binary::error::Result<()>
/// # {
/// use gcf_binary::descriptor::{FieldSpec, RecordDescriptor, Schema};
/// use gcf_binary::value::Record;
/// use gcf_binary::write::RecordWriter;
///
/// let descriptor = RecordDescriptor::from_schema(
///     Schema::new("Point").field("x", FieldSpec::i16()).field("y", FieldSpec::i16()),
/// )?;
///
/// let mut writer = RecordWriter::new();
/// writer.write_dynamic(&descriptor, &Record::new().with("x", 1i16).with("y", -1i16))?;
/// writer.write_dynamic(&descriptor, &Record::new().with("x", 2i16).with("y", -2i16))?;
///
/// assert_eq!(writer.finish(), vec![0x01, 0x00, 0xFF, 0xFF, 0x02, 0x00, 0xFE, 0xFF]);
/// # Ok(())
/// # }
/// # doit().unwrap();
/// ```
#[derive(Debug, Clone, Default)]
pub struct RecordWriter {
    cursor: BinaryCursor<Vec<u8>>,
}

impl RecordWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with room for `capacity` bytes
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            cursor: BinaryCursor::new(Vec::with_capacity(capacity)),
        }
    }

    /// Append the encoding of `value`
    #[instrument(level = "debug", skip_all, fields(record = type_name::<T>()), err)]
    pub fn write<T: BinaryRecord>(&mut self, value: &T) -> Result<()> {
        let descriptor = resolve::<T>()?;
        self.write_dynamic(&descriptor, &value.to_record())
    }

    /// Append the encoding of `record` against a descriptor.
    ///
    /// Nothing is appended when encoding fails.
    pub fn write_dynamic(&mut self, descriptor: &RecordDescriptor, record: &Record) -> Result<()> {
        let start = self.cursor.position();
        encode_record(descriptor, record, &mut self.cursor).map_err(|err| {
            self.cursor.truncate(start);
            err.within(descriptor.name())
        })
    }

    /// Bytes written so far
    pub fn len(&self) -> usize {
        self.cursor.position()
    }

    /// Whether nothing has been written
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Return the encoded bytes
    pub fn finish(self) -> Vec<u8> {
        self.cursor.into_inner()
    }
}

static ABSENT: Value = Value::Absent;

pub(crate) fn encode_record(
    descriptor: &RecordDescriptor,
    record: &Record,
    cursor: &mut BinaryCursor<Vec<u8>>,
) -> Result<()> {
    if let Some((name, _)) = record
        .iter()
        .find(|(name, _)| descriptor.field(name).is_none())
    {
        return Err(SchemaError::UndeclaredField {
            record: descriptor.name().to_owned(),
            field: name.to_owned(),
        }
        .into());
    }

    for field in descriptor.fields() {
        let present = field.presence().holds(record);
        // Conditional fields may be left out of the record entirely when absent.
        let value = match record.get(field.name()) {
            Some(value) => value,
            None if !present => &ABSENT,
            None => {
                return Err(SchemaError::MissingField {
                    field: field.name().to_owned(),
                }
                .into())
            }
        };

        if present == value.is_absent() {
            return Err(SchemaError::PresenceMismatch {
                field: field.name().to_owned(),
                expected: present,
            }
            .into());
        }

        if present {
            codec::encode(field.kind(), value, cursor, record)
                .map_err(|err| err.within(field.name()))?;
        }

        trace!(
            record = descriptor.name(),
            field = field.name(),
            position = cursor.position(),
            "encoded field"
        );
    }
    Ok(())
}

/// Encode `value` into a new buffer
pub fn write_record<T: BinaryRecord>(value: &T) -> Result<Vec<u8>> {
    let mut writer = RecordWriter::new();
    writer.write(value)?;
    Ok(writer.finish())
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use tracing_test::traced_test;

    use crate::descriptor::{FieldSpec, PrefixWidth, Presence, RecordDescriptor, Schema};
    use crate::error::{Error, Result, SchemaError};
    use crate::value::Record;
    use crate::write::RecordWriter;

    fn item() -> Result<RecordDescriptor> {
        RecordDescriptor::from_schema(
            Schema::new("Item")
                .field("id", FieldSpec::i64())
                .field("name", FieldSpec::string().length_prefixed(PrefixWidth::U16)),
        )
    }

    #[traced_test]
    #[test]
    fn write_dynamic_record() -> Result<()> {
        #[rustfmt::skip]
        let expected = vec![
            0x2A, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x06, 0x00,
            b'P', b'o', b't', b'i', b'o', b'n',
        ];

        let mut writer = RecordWriter::new();
        writer.write_dynamic(
            &item()?,
            &Record::new().with("id", 42i64).with("name", "Potion"),
        )?;

        assert_eq!(writer.finish(), expected);

        Ok(())
    }

    #[test]
    fn field_order_follows_declaration() -> Result<()> {
        let mut writer = RecordWriter::new();
        writer.write_dynamic(
            &item()?,
            &Record::new().with("name", "A").with("id", 1i64),
        )?;

        assert_eq!(
            writer.finish(),
            vec![0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00, b'A']
        );

        Ok(())
    }

    #[test]
    fn failed_write_appends_nothing() -> Result<()> {
        let descriptor = item()?;
        let mut writer = RecordWriter::new();
        writer.write_dynamic(&descriptor, &Record::new().with("id", 1i64).with("name", "A"))?;

        let err = writer
            .write_dynamic(&descriptor, &Record::new().with("id", 2i64).with("name", 3u8))
            .unwrap_err();

        assert_eq!(err.field(), Some("Item.name"));
        assert_eq!(writer.len(), 11);

        Ok(())
    }

    #[test]
    fn missing_and_undeclared_fields() -> Result<()> {
        let descriptor = item()?;
        let mut writer = RecordWriter::new();

        let err = writer
            .write_dynamic(&descriptor, &Record::new().with("id", 1i64))
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Schema(SchemaError::MissingField { ref field }) if field == "Item.name"
        ));

        let err = writer
            .write_dynamic(
                &descriptor,
                &Record::new()
                    .with("id", 1i64)
                    .with("name", "A")
                    .with("price", 5u32),
            )
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Schema(SchemaError::UndeclaredField { .. })
        ));

        Ok(())
    }

    #[test]
    fn presence_must_agree_with_rule() -> Result<()> {
        let descriptor = RecordDescriptor::from_schema(
            Schema::new("Buff")
                .field("flags", FieldSpec::u8())
                .field(
                    "duration",
                    FieldSpec::u16().present_if(Presence::NonZero("flags".into())),
                ),
        )?;
        let mut writer = RecordWriter::new();

        writer.write_dynamic(&descriptor, &Record::new().with("flags", 0u8))?;
        writer.write_dynamic(
            &descriptor,
            &Record::new().with("flags", 1u8).with("duration", 16u16),
        )?;
        assert_eq!(writer.clone().finish(), vec![0x00, 0x01, 0x10, 0x00]);

        let err = writer
            .write_dynamic(
                &descriptor,
                &Record::new().with("flags", 0u8).with("duration", 16u16),
            )
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Schema(SchemaError::PresenceMismatch {
                expected: false,
                ..
            })
        ));

        let err = writer
            .write_dynamic(
                &descriptor,
                &Record::new().with("flags", 1u8).with("duration", Option::<u16>::None),
            )
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Schema(SchemaError::PresenceMismatch { expected: true, .. })
        ));

        Ok(())
    }
}
