//! This library maps record types to the fixed binary layouts used by legacy game client files.
//!
//! # Binary Record Format Documentation
//!
//! Game client data tables, cash shop catalogues and asset headers are stored as flat
//! sequences of records. A record is a list of fields written back to back, with no tags,
//! no alignment and no padding other than what a field declares. The layout is known only
//! from the declaration of the record type, so each type here declares it once through
//! [`descriptor::BinaryRecord::schema`].
//!
//! ## Field Encodings
//!
//! | Kind                      | Bytes                               | Example                      | Description                                          |
//! |---------------------------|-------------------------------------|------------------------------|------------------------------------------------------|
//! | `u8` `i8`                 | 1                                   | `05`                         | Integer                                              |
//! | `u16` `i16`               | 2                                   | `05 00`                      | Integer                                              |
//! | `u32` `i32` `f32`         | 4                                   | `00 00 80 3F`                | Integer or IEEE-754 float, bit pattern kept          |
//! | `u64` `i64` `f64`         | 8                                   | `2A 00 00 00 00 00 00 00`    | Integer or IEEE-754 float, bit pattern kept          |
//! | Fixed length string       | N units                             | `48 69 00 00` (N = 4)        | Text zero padded to N units                          |
//! | Length prefixed string    | 1, 2 or 4 + units                   | `02 48 69`                   | Unit count followed by the text                      |
//! | Null terminated string    | units + 1 unit                      | `48 69 00`                   | Text followed by a zero unit                         |
//! | Blob                      | N                                   | `DE AD BE EF` (N = 4)        | Raw bytes                                            |
//! | Record                    | sum of its fields                   |                              | A nested record, inline                              |
//! | Sequence                  | sum of its elements                 |                              | Elements back to back, never a count of its own      |
//!
//! A unit is one byte for UTF-8 text and two bytes for UTF-16 text.
//!
//! ### Sequence Counts
//!
//! A sequence does not store its length. The number of elements comes from one of:
//!
//! - **Constant**: the declaration fixes the count.
//! - **Field**: an earlier integer field of the same record holds the count. That field is
//!   written like any other field, so its value has to agree with the sequence length.
//! - **Remaining**: elements are decoded until the buffer is exhausted. Nothing may follow.
//!
//! ### Conditional Fields
//!
//! A field may only be present when an earlier integer field is non-zero or holds a given
//! value. Absent fields take no bytes and decode to [`value::Value::Absent`].
//!
//! ## Example
//!
//! A record `{ id: i64 = 42, name: string(u8 prefix) = "Potion" }` encodes as:
//!
//! | Offset (bytes) | Field  | Bytes                             |
//! |----------------|--------|-----------------------------------|
//! | 0x0000         | id     | `2A 00 00 00 00 00 00 00`         |
//! | 0x0008         | name   | `06`                              |
//! | 0x0009         |        | `50 6F 74 69 6F 6E`               |
//!
//! ## Additional Information
//!
//! - **Endianness**: Little-endian for all multi-byte values
//! - **Errors**: only truncated input ([`error::Error::OutOfBounds`]) or an invalid
//!   declaration or value ([`error::Error::Schema`])
//!

mod codec;
pub mod cursor;
pub mod descriptor;
pub mod error;
pub mod read;
pub mod value;
pub mod write;

pub use descriptor::{resolve, BinaryRecord, FieldSpec, Schema};
pub use read::{read_record, read_record_from, RecordReader};
pub use value::{Blob, Record, Value};
pub use write::{write_record, RecordWriter};
