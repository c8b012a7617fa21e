//! Byte-level reader with bounded operations.

use crate::error::{ByteError, ByteResult};

/// A sequential reader over a byte slice with bounds checking.
///
/// All multi-byte reads are big-endian, matching the Photon wire format.
/// Every operation either succeeds and advances the cursor by the consumed
/// byte count, or fails with [`ByteError::Underflow`] and leaves the cursor
/// unchanged. The reader never panics on malformed input.
#[derive(Debug)]
pub struct ByteReader<'a> {
    /// The underlying byte buffer.
    data: &'a [u8],
    /// Current read position.
    position: usize,
}

impl<'a> ByteReader<'a> {
    /// Creates a new `ByteReader` over a byte slice.
    #[must_use]
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    /// Returns the total size of the buffer.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns the current read position.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.position
    }

    /// Returns the number of bytes remaining to read.
    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.data.len() - self.position
    }

    /// Returns `true` if there are no more bytes to read.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.position >= self.data.len()
    }

    /// Returns `true` if at least `n` bytes are available.
    #[must_use]
    pub const fn can_read(&self, n: usize) -> bool {
        self.remaining() >= n
    }

    fn check(&self, n: usize) -> ByteResult<()> {
        if self.can_read(n) {
            Ok(())
        } else {
            Err(ByteError::Underflow {
                requested: n,
                available: self.remaining(),
            })
        }
    }

    /// Advances the cursor by `n` bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ByteError::Underflow`] if fewer than `n` bytes remain.
    pub fn skip(&mut self, n: usize) -> ByteResult<()> {
        self.check(n)?;
        self.position += n;
        Ok(())
    }

    /// Moves the cursor to an absolute position.
    ///
    /// # Errors
    ///
    /// Returns [`ByteError::Underflow`] if `pos` is past the end of the buffer.
    pub fn seek(&mut self, pos: usize) -> ByteResult<()> {
        if pos > self.data.len() {
            return Err(ByteError::Underflow {
                requested: pos,
                available: self.data.len(),
            });
        }
        self.position = pos;
        Ok(())
    }

    /// Moves the cursor back to the beginning.
    pub fn reset(&mut self) {
        self.position = 0;
    }

    /// Reads one byte as `u8`.
    pub fn read_u8(&mut self) -> ByteResult<u8> {
        self.check(1)?;
        let value = self.data[self.position];
        self.position += 1;
        Ok(value)
    }

    /// Reads two bytes big-endian as `u16`.
    pub fn read_u16(&mut self) -> ByteResult<u16> {
        let bytes = self.read_array::<2>()?;
        Ok(u16::from_be_bytes(bytes))
    }

    /// Reads four bytes big-endian as `u32`.
    pub fn read_u32(&mut self) -> ByteResult<u32> {
        let bytes = self.read_array::<4>()?;
        Ok(u32::from_be_bytes(bytes))
    }

    /// Reads eight bytes big-endian as `u64`.
    pub fn read_u64(&mut self) -> ByteResult<u64> {
        let bytes = self.read_array::<8>()?;
        Ok(u64::from_be_bytes(bytes))
    }

    /// Reads one byte as `i8`.
    pub fn read_i8(&mut self) -> ByteResult<i8> {
        Ok(self.read_u8()? as i8)
    }

    /// Reads two bytes big-endian as `i16`.
    pub fn read_i16(&mut self) -> ByteResult<i16> {
        Ok(self.read_u16()? as i16)
    }

    /// Reads four bytes big-endian as `i32`.
    pub fn read_i32(&mut self) -> ByteResult<i32> {
        Ok(self.read_u32()? as i32)
    }

    /// Reads eight bytes big-endian as `i64`.
    pub fn read_i64(&mut self) -> ByteResult<i64> {
        Ok(self.read_u64()? as i64)
    }

    /// Reads four bytes big-endian as an IEEE-754 `f32`.
    pub fn read_f32(&mut self) -> ByteResult<f32> {
        Ok(f32::from_bits(self.read_u32()?))
    }

    /// Reads eight bytes big-endian as an IEEE-754 `f64`.
    pub fn read_f64(&mut self) -> ByteResult<f64> {
        Ok(f64::from_bits(self.read_u64()?))
    }

    /// Reads one byte as a boolean (`false` iff the byte is zero).
    pub fn read_bool(&mut self) -> ByteResult<bool> {
        Ok(self.read_u8()? != 0)
    }

    /// Reads `n` bytes and returns an owned copy.
    pub fn read_bytes(&mut self, n: usize) -> ByteResult<Vec<u8>> {
        Ok(self.read_bytes_borrowed(n)?.to_vec())
    }

    /// Reads `n` bytes as a borrowed view of the underlying buffer.
    pub fn read_bytes_borrowed(&mut self, n: usize) -> ByteResult<&'a [u8]> {
        self.check(n)?;
        let slice = &self.data[self.position..self.position + n];
        self.position += n;
        Ok(slice)
    }

    /// Reads a string with a two-byte big-endian length prefix.
    ///
    /// Invalid UTF-8 sequences are replaced rather than rejected; the wire
    /// format does not guarantee well-formed input.
    ///
    /// # Errors
    ///
    /// Returns [`ByteError::Underflow`] if the prefix or the string body is
    /// truncated. The cursor is unchanged on failure.
    pub fn read_string(&mut self) -> ByteResult<String> {
        let start = self.position;
        let length = self.read_u16()? as usize;
        match self.read_bytes_borrowed(length) {
            Ok(bytes) => Ok(String::from_utf8_lossy(bytes).into_owned()),
            Err(err) => {
                self.position = start;
                Err(err)
            }
        }
    }

    /// Returns the next `n` bytes without advancing the cursor.
    pub fn peek(&self, n: usize) -> ByteResult<&'a [u8]> {
        self.check(n)?;
        Ok(&self.data[self.position..self.position + n])
    }

    /// Returns the next byte without advancing the cursor.
    pub fn peek_u8(&self) -> ByteResult<u8> {
        self.check(1)?;
        Ok(self.data[self.position])
    }

    /// Splits off a sub-reader over the next `n` bytes.
    ///
    /// The outer cursor advances past the sub-range.
    pub fn slice(&mut self, n: usize) -> ByteResult<ByteReader<'a>> {
        Ok(ByteReader::new(self.read_bytes_borrowed(n)?))
    }

    /// Returns the remaining bytes without advancing the cursor.
    #[must_use]
    pub fn remaining_bytes(&self) -> &'a [u8] {
        &self.data[self.position..]
    }

    fn read_array<const N: usize>(&mut self) -> ByteResult<[u8; N]> {
        self.check(N)?;
        let mut bytes = [0u8; N];
        bytes.copy_from_slice(&self.data[self.position..self.position + N]);
        self.position += N;
        Ok(bytes)
    }
}
