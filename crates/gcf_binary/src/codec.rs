//! Encode and decode strategies for every field kind.

use byteorder::{ByteOrder, LittleEndian};
use widestring::U16String;

use crate::cursor::BinaryCursor;
use crate::descriptor::{
    CountSource, FieldKind, PrefixWidth, PrimitiveKind, StringEncoding, TextEncoding,
};
use crate::error::{Error, Result, SchemaError};
use crate::value::{Blob, Record, Value};
use crate::{read, write};

fn schema(err: SchemaError) -> Error {
    err.into()
}

fn empty_element() -> Error {
    schema(SchemaError::EmptyElement {
        field: String::new(),
    })
}

fn mismatch(expected: &FieldKind, found: &Value) -> Error {
    schema(SchemaError::TypeMismatch {
        field: String::new(),
        expected: expected.to_string(),
        found: found.kind_name().to_owned(),
    })
}

/// Element count of a sequence whose count is not taken from the buffer length
fn declared_count(count: &CountSource, siblings: &Record) -> Result<Option<usize>> {
    Ok(match count {
        CountSource::Constant(count) => Some(*count),
        CountSource::Field(target) => match siblings.get(target) {
            None | Some(Value::Absent) => Some(0),
            Some(value) => Some(value.as_count().ok_or_else(|| {
                schema(SchemaError::InvalidCount {
                    field: String::new(),
                    count: value.to_string(),
                })
            })?),
        },
        CountSource::Remaining => None,
    })
}

/// Decode one value of `kind` at the cursor. `siblings` holds the fields of the enclosing
/// record decoded so far.
pub(crate) fn decode<B: AsRef<[u8]>>(
    kind: &FieldKind,
    cursor: &mut BinaryCursor<B>,
    siblings: &Record,
) -> Result<Value> {
    match kind {
        FieldKind::Primitive(primitive) => decode_primitive(*primitive, cursor),
        FieldKind::String { text, encoding } => {
            decode_string(*text, *encoding, cursor).map(Value::String)
        }
        FieldKind::Blob(len) => Ok(Value::Blob(Blob::new(cursor.read_bytes(*len)?.to_vec()))),
        FieldKind::Record(descriptor) => read::decode_record(descriptor, cursor).map(Value::Record),
        FieldKind::Sequence {
            element,
            count: count_source,
        } => {
            let items = match declared_count(count_source, siblings)? {
                Some(count) => {
                    let bounded = matches!(count_source, CountSource::Constant(_));
                    let mut items = Vec::with_capacity(count.min(cursor.remaining()));
                    for i in 0..count {
                        let start = cursor.position();
                        let item = decode(element, cursor, siblings)
                            .map_err(|err| err.within(&format!("[{i}]")))?;
                        // Counts taken from the input are only bounded by the bytes they consume.
                        if cursor.position() == start && !bounded {
                            return Err(empty_element());
                        }
                        items.push(item);
                    }
                    items
                }
                None => {
                    let mut items = Vec::new();
                    while cursor.remaining() > 0 {
                        let start = cursor.position();
                        let item = decode(element, cursor, siblings)
                            .map_err(|err| err.within(&format!("[{}]", items.len())))?;
                        if cursor.position() == start {
                            return Err(empty_element());
                        }
                        items.push(item);
                    }
                    items
                }
            };
            Ok(Value::Sequence(items))
        }
    }
}

fn decode_primitive<B: AsRef<[u8]>>(
    kind: PrimitiveKind,
    cursor: &mut BinaryCursor<B>,
) -> Result<Value> {
    Ok(match kind {
        PrimitiveKind::U8 => Value::U8(cursor.read_primitive()?),
        PrimitiveKind::U16 => Value::U16(cursor.read_primitive()?),
        PrimitiveKind::U32 => Value::U32(cursor.read_primitive()?),
        PrimitiveKind::U64 => Value::U64(cursor.read_primitive()?),
        PrimitiveKind::I8 => Value::I8(cursor.read_primitive()?),
        PrimitiveKind::I16 => Value::I16(cursor.read_primitive()?),
        PrimitiveKind::I32 => Value::I32(cursor.read_primitive()?),
        PrimitiveKind::I64 => Value::I64(cursor.read_primitive()?),
        PrimitiveKind::F32 => Value::F32(cursor.read_primitive()?),
        PrimitiveKind::F64 => Value::F64(cursor.read_primitive()?),
    })
}

fn read_prefix<B: AsRef<[u8]>>(width: PrefixWidth, cursor: &mut BinaryCursor<B>) -> Result<usize> {
    Ok(match width {
        PrefixWidth::U8 => cursor.read_primitive::<u8>()? as usize,
        PrefixWidth::U16 => cursor.read_primitive::<u16>()? as usize,
        PrefixWidth::U32 => cursor.read_primitive::<u32>()? as usize,
    })
}

fn decode_string<B: AsRef<[u8]>>(
    text: TextEncoding,
    encoding: StringEncoding,
    cursor: &mut BinaryCursor<B>,
) -> Result<String> {
    let unit = text.unit();
    let bytes = match encoding {
        StringEncoding::FixedLength(len) => {
            let bytes = cursor.read_bytes(len * unit)?;
            let end = bytes
                .chunks_exact(unit)
                .position(|chunk| chunk.iter().all(|b| *b == 0))
                .map_or(bytes.len(), |units| units * unit);
            &bytes[..end]
        }
        StringEncoding::LengthPrefixed(width) => {
            let units = read_prefix(width, cursor)?;
            cursor.read_bytes(units * unit)?
        }
        StringEncoding::NullTerminated => cursor.read_until_zero(unit)?,
    };
    decode_text(text, bytes)
}

fn decode_text(text: TextEncoding, bytes: &[u8]) -> Result<String> {
    let invalid = || {
        schema(SchemaError::InvalidText {
            field: String::new(),
            encoding: text.name().to_owned(),
        })
    };

    match text {
        TextEncoding::Utf8 => std::str::from_utf8(bytes)
            .map(str::to_owned)
            .map_err(|_| invalid()),
        TextEncoding::Utf16 => {
            let mut units = vec![0u16; bytes.len() / 2];
            LittleEndian::read_u16_into(bytes, &mut units);
            U16String::from_vec(units)
                .to_string()
                .map_err(|_| invalid())
        }
    }
}

/// Encode `value` as `kind` at the cursor. `siblings` holds the fields of the enclosing
/// record, used to check sequence lengths against their count field.
pub(crate) fn encode(
    kind: &FieldKind,
    value: &Value,
    cursor: &mut BinaryCursor<Vec<u8>>,
    siblings: &Record,
) -> Result<()> {
    match (kind, value) {
        (FieldKind::Primitive(primitive), value) => encode_primitive(*primitive, value, cursor)
            .ok_or_else(|| mismatch(kind, value)),
        (FieldKind::String { text, encoding }, Value::String(s)) => {
            encode_string(*text, *encoding, s, cursor)
        }
        (FieldKind::Blob(len), Value::Blob(blob)) => {
            if blob.len() != *len {
                return Err(schema(SchemaError::BlobLength {
                    field: String::new(),
                    length: blob.len(),
                    capacity: *len,
                }));
            }
            cursor.write_bytes(blob);
            Ok(())
        }
        (FieldKind::Record(descriptor), Value::Record(record)) => {
            write::encode_record(descriptor, record, cursor)
        }
        (FieldKind::Sequence { element, count }, Value::Sequence(items)) => {
            if let Some(expected) = declared_count(count, siblings)? {
                if expected != items.len() {
                    return Err(schema(SchemaError::CountMismatch {
                        field: String::new(),
                        expected,
                        actual: items.len(),
                    }));
                }
            }
            // The count itself, if any, was written by its own field.
            for (i, item) in items.iter().enumerate() {
                let start = cursor.position();
                encode(element, item, cursor, siblings)
                    .map_err(|err| err.within(&format!("[{i}]")))?;
                // Such an element could not be told apart when decoding.
                if cursor.position() == start && !matches!(count, CountSource::Constant(_)) {
                    return Err(empty_element());
                }
            }
            Ok(())
        }
        (kind, value) => Err(mismatch(kind, value)),
    }
}

fn encode_primitive(
    kind: PrimitiveKind,
    value: &Value,
    cursor: &mut BinaryCursor<Vec<u8>>,
) -> Option<()> {
    match (kind, value) {
        (PrimitiveKind::U8, Value::U8(v)) => cursor.write_primitive(*v),
        (PrimitiveKind::U16, Value::U16(v)) => cursor.write_primitive(*v),
        (PrimitiveKind::U32, Value::U32(v)) => cursor.write_primitive(*v),
        (PrimitiveKind::U64, Value::U64(v)) => cursor.write_primitive(*v),
        (PrimitiveKind::I8, Value::I8(v)) => cursor.write_primitive(*v),
        (PrimitiveKind::I16, Value::I16(v)) => cursor.write_primitive(*v),
        (PrimitiveKind::I32, Value::I32(v)) => cursor.write_primitive(*v),
        (PrimitiveKind::I64, Value::I64(v)) => cursor.write_primitive(*v),
        (PrimitiveKind::F32, Value::F32(v)) => cursor.write_primitive(*v),
        (PrimitiveKind::F64, Value::F64(v)) => cursor.write_primitive(*v),
        _ => return None,
    }
    Some(())
}

/// Code units of `s` as little-endian bytes, with the unit count
fn encode_text(text: TextEncoding, s: &str) -> (Vec<u8>, usize) {
    match text {
        TextEncoding::Utf8 => (s.as_bytes().to_vec(), s.len()),
        TextEncoding::Utf16 => {
            let units = U16String::from_str(s).into_vec();
            let mut bytes = vec![0u8; units.len() * 2];
            LittleEndian::write_u16_into(&units, &mut bytes);
            (bytes, units.len())
        }
    }
}

fn encode_string(
    text: TextEncoding,
    encoding: StringEncoding,
    s: &str,
    cursor: &mut BinaryCursor<Vec<u8>>,
) -> Result<()> {
    let (bytes, units) = encode_text(text, s);
    // A zero code unit is only possible when the text contains U+0000.
    let embedded_zero = s.contains('\0');

    match encoding {
        StringEncoding::FixedLength(len) => {
            if units > len {
                return Err(schema(SchemaError::FixedLengthExceeded {
                    field: String::new(),
                    length: units,
                    capacity: len,
                }));
            }
            if embedded_zero {
                return Err(schema(SchemaError::EmbeddedZero {
                    field: String::new(),
                }));
            }
            cursor.write_bytes(&bytes);
            cursor.write_zeros((len - units) * text.unit());
        }
        StringEncoding::LengthPrefixed(width) => {
            if units as u64 > width.max() {
                return Err(schema(SchemaError::PrefixOverflow {
                    field: String::new(),
                    length: units,
                    width: width.size(),
                }));
            }
            match width {
                PrefixWidth::U8 => cursor.write_primitive(units as u8),
                PrefixWidth::U16 => cursor.write_primitive(units as u16),
                PrefixWidth::U32 => cursor.write_primitive(units as u32),
            }
            cursor.write_bytes(&bytes);
        }
        StringEncoding::NullTerminated => {
            if embedded_zero {
                return Err(schema(SchemaError::EmbeddedZero {
                    field: String::new(),
                }));
            }
            cursor.write_bytes(&bytes);
            cursor.write_zeros(text.unit());
        }
    }
    Ok(())
}
