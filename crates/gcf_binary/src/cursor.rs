//! Position tracked primitive access over a byte buffer.
//!
//! All multi-byte values are little-endian. Reads never move the position past the end
//! of the buffer; writes overwrite at the position and grow the buffer as needed.

use byteorder::{ByteOrder, LittleEndian};

use crate::error::{Error, Result};

/// A fixed size value that can be read from or written to a [`BinaryCursor`]
pub trait Primitive: Copy + Sized {
    /// Encoded size in bytes
    const SIZE: usize;

    /// Decode from exactly [`Primitive::SIZE`] little-endian bytes
    fn read_le(buf: &[u8]) -> Self;

    /// Encode into exactly [`Primitive::SIZE`] little-endian bytes
    fn write_le(self, buf: &mut [u8]);
}

impl Primitive for u8 {
    const SIZE: usize = 1;

    fn read_le(buf: &[u8]) -> Self {
        buf[0]
    }

    fn write_le(self, buf: &mut [u8]) {
        buf[0] = self;
    }
}

impl Primitive for i8 {
    const SIZE: usize = 1;

    fn read_le(buf: &[u8]) -> Self {
        buf[0] as i8
    }

    fn write_le(self, buf: &mut [u8]) {
        buf[0] = self as u8;
    }
}

macro_rules! impl_primitive {
    ($($ty:ty => $read:ident, $write:ident);* $(;)?) => {
        $(
            impl Primitive for $ty {
                const SIZE: usize = std::mem::size_of::<$ty>();

                fn read_le(buf: &[u8]) -> Self {
                    LittleEndian::$read(buf)
                }

                fn write_le(self, buf: &mut [u8]) {
                    LittleEndian::$write(buf, self)
                }
            }
        )*
    };
}

// Floats go through their bit patterns, so NaN payloads and signed zeros survive.
impl_primitive! {
    u16 => read_u16, write_u16;
    u32 => read_u32, write_u32;
    u64 => read_u64, write_u64;
    i16 => read_i16, write_i16;
    i32 => read_i32, write_i32;
    i64 => read_i64, write_i64;
    f32 => read_f32, write_f32;
    f64 => read_f64, write_f64;
}

/// A cursor over a byte buffer
///
/// ```
/// use gcf_binary::cursor::BinaryCursor;
///
/// let mut output = BinaryCursor::new(Vec::new());
/// output.write_primitive(42u32);
/// output.write_bytes(b"hi");
///
/// let mut input = BinaryCursor::new(output.into_inner());
/// assert_eq!(input.read_primitive::<u32>().unwrap(), 42);
/// assert_eq!(input.read_bytes(2).unwrap(), b"hi");
/// assert_eq!(input.remaining(), 0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct BinaryCursor<B> {
    inner: B,
    position: usize,
}

impl<B> BinaryCursor<B> {
    /// Create a cursor positioned at the start of `inner`
    pub fn new(inner: B) -> Self {
        Self { inner, position: 0 }
    }

    /// Current offset from the start of the buffer
    pub fn position(&self) -> usize {
        self.position
    }

    /// Get a reference to the underlying buffer
    pub fn get_ref(&self) -> &B {
        &self.inner
    }

    /// Unwrap and return the underlying buffer
    pub fn into_inner(self) -> B {
        self.inner
    }
}

impl<B: AsRef<[u8]>> BinaryCursor<B> {
    /// Length of the underlying buffer
    pub fn len(&self) -> usize {
        self.inner.as_ref().len()
    }

    /// Whether the underlying buffer holds no bytes
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bytes between the position and the end of the buffer
    pub fn remaining(&self) -> usize {
        self.len() - self.position
    }

    /// Move to `position`, which may not lie past the end of the buffer
    pub fn set_position(&mut self, position: usize) -> Result<()> {
        if position > self.len() {
            return Err(self.out_of_bounds(position - self.position));
        }
        self.position = position;
        Ok(())
    }

    /// Read a little-endian primitive and advance past it
    pub fn read_primitive<T: Primitive>(&mut self) -> Result<T> {
        self.read_bytes(T::SIZE).map(T::read_le)
    }

    /// Borrow the next `count` bytes and advance past them
    pub fn read_bytes(&mut self, count: usize) -> Result<&[u8]> {
        if count > self.remaining() {
            return Err(self.out_of_bounds(count));
        }

        let start = self.position;
        self.position += count;
        Ok(&self.inner.as_ref()[start..self.position])
    }

    /// Borrow the units up to the next all-zero unit of `unit` bytes and advance past the
    /// terminator. The terminator is not part of the returned slice.
    pub fn read_until_zero(&mut self, unit: usize) -> Result<&[u8]> {
        let tail = &self.inner.as_ref()[self.position..];
        let Some(units) = tail
            .chunks_exact(unit)
            .position(|chunk| chunk.iter().all(|b| *b == 0))
        else {
            // Ask for one unit past whatever is left so the error reports the shortfall.
            return Err(self.out_of_bounds(tail.len() - tail.len() % unit + unit));
        };

        let start = self.position;
        let end = start + units * unit;
        self.position = end + unit;
        Ok(&self.inner.as_ref()[start..end])
    }

    fn out_of_bounds(&self, requested: usize) -> Error {
        Error::OutOfBounds {
            field: String::new(),
            position: self.position,
            requested,
            remaining: self.remaining(),
        }
    }
}

impl BinaryCursor<Vec<u8>> {
    /// Write a little-endian primitive at the position and advance past it
    pub fn write_primitive<T: Primitive>(&mut self, value: T) {
        let mut buf = [0u8; 8];
        value.write_le(&mut buf[..T::SIZE]);
        self.write_bytes(&buf[..T::SIZE]);
    }

    /// Write raw bytes at the position and advance past them
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        let end = self.position + bytes.len();
        if end > self.inner.len() {
            self.inner.resize(end, 0);
        }
        self.inner[self.position..end].copy_from_slice(bytes);
        self.position = end;
    }

    /// Drop everything from `len` onwards, moving the position back if it lies past it
    pub fn truncate(&mut self, len: usize) {
        self.inner.truncate(len);
        self.position = self.position.min(self.inner.len());
    }

    /// Write `count` zero bytes at the position and advance past them
    pub fn write_zeros(&mut self, count: usize) {
        let end = self.position + count;
        if end > self.inner.len() {
            self.inner.resize(end, 0);
        }
        self.inner[self.position..end].fill(0);
        self.position = end;
    }
}
