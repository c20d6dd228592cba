//! raw font bytes

use std::ops::{Bound, RangeBounds};

use types::Scalar;

use crate::array::{Array, FixedRecord, RecordArray};
use crate::read::{FontRead, FontReadWithArgs, ReadError};

/// A reference to raw binary font data.
///
/// This is a wrapper around a byte slice, that provides convenience methods
/// for parsing and validating that data.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FontData<'a> {
    bytes: &'a [u8],
}

/// A cursor for validating bytes during parsing.
///
/// Reads advance the position even when they fail, so a sequence of reads
/// can be checked once at the end.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    pos: usize,
    data: FontData<'a>,
}

impl<'a> FontData<'a> {
    /// Create a new `FontData` with these bytes.
    pub const fn new(bytes: &'a [u8]) -> Self {
        FontData { bytes }
    }

    /// The length of the data, in bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// `true` if the data has a length of zero bytes.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Returns the data starting at `pos`, or `None` if `pos` is past the end.
    pub fn split_off(&self, pos: usize) -> Option<FontData<'a>> {
        self.bytes.get(pos..).map(|bytes| FontData { bytes })
    }

    /// Returns the data up to `pos`, or `None` if `pos` is past the end.
    pub fn take_up_to(&self, pos: usize) -> Option<FontData<'a>> {
        self.bytes.get(..pos).map(|bytes| FontData { bytes })
    }

    pub fn slice(&self, range: impl RangeBounds<usize>) -> Option<FontData<'a>> {
        let bounds = (range.start_bound().cloned(), range.end_bound().cloned());
        self.bytes.get(bounds).map(|bytes| FontData { bytes })
    }

    /// Returns the data in `offset..offset + len`, checking for overflow.
    pub fn slice_len(&self, offset: usize, len: usize) -> Result<FontData<'a>, ReadError> {
        offset
            .checked_add(len)
            .and_then(|end| self.slice(offset..end))
            .ok_or(ReadError::OutOfBounds)
    }

    /// Read a scalar at the given byte offset.
    pub fn read_at<T: Scalar>(&self, offset: usize) -> Result<T, ReadError> {
        self.bytes
            .get(offset..)
            .and_then(T::read)
            .ok_or(ReadError::OutOfBounds)
    }

    /// Read `count` scalars starting at `offset`.
    ///
    /// The returned array borrows the underlying bytes.
    pub fn read_array<T: Scalar>(&self, offset: usize, count: usize) -> Result<Array<'a, T>, ReadError> {
        let len = count
            .checked_mul(T::RAW_BYTE_LEN)
            .ok_or(ReadError::OutOfBounds)?;
        self.slice_len(offset, len)
            .map(|data| Array::new(data.as_bytes()))
    }

    /// Read `count` fixed size records starting at `offset`.
    pub fn read_records<R: FixedRecord<'a>>(
        &self,
        offset: usize,
        count: usize,
    ) -> Result<RecordArray<'a, R>, ReadError> {
        let len = count
            .checked_mul(R::RAW_BYTE_LEN)
            .ok_or(ReadError::OutOfBounds)?;
        self.slice_len(offset, len).map(RecordArray::new)
    }

    /// Read a fixed size record at `offset`.
    pub fn read_record<R: FixedRecord<'a>>(&self, offset: usize) -> Result<R, ReadError> {
        self.slice_len(offset, R::RAW_BYTE_LEN)
            .and_then(R::read_record)
    }

    pub fn read_with_args<T>(&self, offset: usize, args: &T::Args) -> Result<T, ReadError>
    where
        T: FontReadWithArgs<'a>,
    {
        self.split_off(offset)
            .ok_or(ReadError::OutOfBounds)
            .and_then(|data| T::read_with_args(data, args))
    }

    /// Resolve a non-null offset to a table.
    ///
    /// A zero offset produces [`ReadError::NullOffset`].
    pub fn resolve_offset<T: FontRead<'a>>(&self, offset: impl Into<u32>) -> Result<T, ReadError> {
        match offset.into() {
            0 => Err(ReadError::NullOffset),
            offset => self
                .split_off(offset as usize)
                .ok_or(ReadError::OutOfBounds)
                .and_then(T::read),
        }
    }

    /// Resolve an offset that may be null.
    pub fn resolve_nullable<T: FontRead<'a>>(
        &self,
        offset: impl Into<u32>,
    ) -> Option<Result<T, ReadError>> {
        match offset.into() {
            0 => None,
            offset => Some(
                self.split_off(offset as usize)
                    .ok_or(ReadError::OutOfBounds)
                    .and_then(T::read),
            ),
        }
    }

    /// Ensure that at least `expected` bytes are available.
    pub fn check_len(&self, expected: usize) -> Result<(), ReadError> {
        if self.bytes.len() < expected {
            Err(ReadError::Eof {
                expected,
                actual: self.bytes.len(),
            })
        } else {
            Ok(())
        }
    }

    pub fn cursor(&self) -> Cursor<'a> {
        Cursor {
            pos: 0,
            data: *self,
        }
    }

    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }
}

impl<'a> Cursor<'a> {
    /// A cursor positioned at `pos` in `data`.
    pub fn new_at(data: FontData<'a>, pos: usize) -> Self {
        Cursor { pos, data }
    }

    pub fn advance<T: Scalar>(&mut self) {
        self.pos = self.pos.saturating_add(T::RAW_BYTE_LEN);
    }

    pub fn advance_by(&mut self, n_bytes: usize) {
        self.pos = self.pos.saturating_add(n_bytes);
    }

    pub fn read<T: Scalar>(&mut self) -> Result<T, ReadError> {
        let temp = self.data.read_at(self.pos);
        self.advance::<T>();
        temp
    }

    pub fn read_array<T: Scalar>(&mut self, count: usize) -> Result<Array<'a, T>, ReadError> {
        let temp = self.data.read_array(self.pos, count)?;
        self.pos = self
            .pos
            .saturating_add(count.saturating_mul(T::RAW_BYTE_LEN));
        Ok(temp)
    }

    pub fn read_records<R: FixedRecord<'a>>(
        &mut self,
        count: usize,
    ) -> Result<RecordArray<'a, R>, ReadError> {
        let temp = self.data.read_records(self.pos, count)?;
        self.pos = self.pos.saturating_add(count.saturating_mul(R::RAW_BYTE_LEN));
        Ok(temp)
    }

    /// Read `len` raw bytes.
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], ReadError> {
        let temp = self.data.slice_len(self.pos, len)?;
        self.pos = self.pos.saturating_add(len);
        Ok(temp.as_bytes())
    }

    /// The current position, in bytes.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Returns the number of bytes remaining after the current position.
    pub fn remaining_bytes(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    /// The unread data.
    pub fn remaining(&self) -> Option<FontData<'a>> {
        self.data.split_off(self.pos)
    }

    /// Returns `true` if there is no more data to read.
    pub fn is_empty(&self) -> bool {
        self.pos >= self.data.len()
    }
}

impl AsRef<[u8]> for FontData<'_> {
    fn as_ref(&self) -> &[u8] {
        self.bytes
    }
}

impl<'a> From<&'a [u8]> for FontData<'a> {
    fn from(src: &'a [u8]) -> FontData<'a> {
        FontData::new(src)
    }
}

// useful so we can have offsets that are just to data
impl<'a> FontRead<'a> for FontData<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        Ok(data)
    }
}
