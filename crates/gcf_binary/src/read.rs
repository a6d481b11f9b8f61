//! Types for reading records
//!

use std::{any::type_name, io::Read};

use tracing::{instrument, trace};

use crate::{
    codec,
    cursor::BinaryCursor,
    descriptor::{resolve, BinaryRecord, RecordDescriptor},
    error::Result,
    value::{Record, Value},
};

/// Record reader over a byte buffer
///
/// Records are decoded one after another from the current position.
///
/// ```no_run
/// use gcf_binary::descriptor::BinaryRecord;
/// use gcf_binary::read::RecordReader;
///
/// fn read_rows<T: BinaryRecord>(bytes: &[u8]) -> gcf_binary::error::Result<Vec<T>> {
///     let mut reader = RecordReader::new(bytes);
///     let mut rows = Vec::new();
///     while !reader.is_exhausted() {
///         rows.push(reader.read::<T>()?);
///     }
///     Ok(rows)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct RecordReader<B> {
    cursor: BinaryCursor<B>,
}

impl<B: AsRef<[u8]>> RecordReader<B> {
    pub fn new(inner: B) -> Self {
        Self {
            cursor: BinaryCursor::new(inner),
        }
    }

    /// Decode the next record as `T`
    #[instrument(level = "debug", skip_all, fields(record = type_name::<T>()), err)]
    pub fn read<T: BinaryRecord>(&mut self) -> Result<T> {
        let descriptor = resolve::<T>()?;
        let start = self.cursor.position();
        let record = self.read_dynamic(&descriptor)?;
        T::from_record(record).map_err(|err| {
            let _ = self.cursor.set_position(start);
            err
        })
    }

    /// Decode the next record against a descriptor without converting it.
    ///
    /// The position is left untouched when decoding fails.
    pub fn read_dynamic(&mut self, descriptor: &RecordDescriptor) -> Result<Record> {
        let start = self.cursor.position();
        decode_record(descriptor, &mut self.cursor).map_err(|err| {
            // Moving back to a position already visited cannot fail.
            let _ = self.cursor.set_position(start);
            err.within(descriptor.name())
        })
    }

    /// Decode records as `T` until the buffer is exhausted
    pub fn read_all<T: BinaryRecord>(&mut self) -> Result<Vec<T>> {
        let mut records = Vec::new();
        while !self.is_exhausted() {
            records.push(self.read()?);
        }
        Ok(records)
    }

    /// Offset of the next record
    pub fn position(&self) -> usize {
        self.cursor.position()
    }

    /// Bytes left after the current position
    pub fn remaining(&self) -> usize {
        self.cursor.remaining()
    }

    /// Whether every byte has been consumed
    pub fn is_exhausted(&self) -> bool {
        self.remaining() == 0
    }

    /// Unwrap and return the underlying buffer
    pub fn into_inner(self) -> B {
        self.cursor.into_inner()
    }
}

pub(crate) fn decode_record<B: AsRef<[u8]>>(
    descriptor: &RecordDescriptor,
    cursor: &mut BinaryCursor<B>,
) -> Result<Record> {
    let mut record = Record::new();
    for field in descriptor.fields() {
        let value = if field.presence().holds(&record) {
            codec::decode(field.kind(), cursor, &record).map_err(|err| err.within(field.name()))?
        } else {
            Value::Absent
        };

        trace!(
            record = descriptor.name(),
            field = field.name(),
            position = cursor.position(),
            "decoded field"
        );
        record.insert(field.name(), value);
    }
    Ok(record)
}

/// Decode one `T` from the start of `bytes`. Trailing bytes are ignored.
pub fn read_record<T: BinaryRecord>(bytes: &[u8]) -> Result<T> {
    RecordReader::new(bytes).read()
}

/// Load everything from `reader` and decode one `T` from it
pub fn read_record_from<T: BinaryRecord, R: Read>(mut reader: R) -> Result<T> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    read_record(&bytes)
}
