//! Parsing for PostScript INDEX objects.
//!
//! See <https://learn.microsoft.com/en-us/typography/opentype/spec/cff2#5-index-data>

use types::Uint24;

use super::Error;
use crate::{FontData, ReadError};

/// An array of variable sized objects.
///
/// CFF stores the object count in 16 bits, CFF2 in 32 bits; the layout is
/// otherwise identical.
#[derive(Clone, Debug, Default)]
pub struct Index<'a> {
    count: u32,
    off_size: u8,
    offsets: &'a [u8],
    data: &'a [u8],
    size_in_bytes: usize,
}

impl<'a> Index<'a> {
    /// Creates a new index from the given data.
    ///
    /// The caller must specify whether the data comes from a `CFF2` table.
    pub fn new(data: &'a [u8], is_cff2: bool) -> Result<Self, Error> {
        let data = FontData::new(data);
        let (count, count_size) = if is_cff2 {
            (data.read_at::<u32>(0)?, 4)
        } else {
            (data.read_at::<u16>(0)? as u32, 2)
        };
        if count == 0 {
            return Ok(Self {
                size_in_bytes: count_size,
                ..Default::default()
            });
        }
        let off_size: u8 = data.read_at(count_size)?;
        if !(1..=4).contains(&off_size) {
            return Err(Error::InvalidIndexOffsetSize(off_size));
        }
        let offsets_start = count_size + 1;
        let offsets_len = (count as usize + 1) * off_size as usize;
        let offsets = data.slice_len(offsets_start, offsets_len)?.as_bytes();
        let data_start = offsets_start + offsets_len;
        let data_len = read_offset(count as usize, count as usize, off_size, offsets)?;
        let object_data = data.slice_len(data_start, data_len)?.as_bytes();
        Ok(Self {
            count,
            off_size,
            offsets,
            data: object_data,
            size_in_bytes: data_start + data_len,
        })
    }

    /// Returns the number of objects in the index.
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Computes a bias that is added to a subroutine operator in a
    /// charstring.
    ///
    /// See <https://learn.microsoft.com/en-us/typography/opentype/spec/cff2#9-local-and-global-subr-indexes>
    pub fn subr_bias(&self) -> i32 {
        if self.count < 1240 {
            107
        } else if self.count < 33900 {
            1131
        } else {
            32768
        }
    }

    /// Returns the total size in bytes of the index.
    pub fn size_in_bytes(&self) -> usize {
        self.size_in_bytes
    }

    /// Returns the offset of the object at the given index.
    pub fn get_offset(&self, index: usize) -> Result<usize, Error> {
        read_offset(index, self.count as usize, self.off_size, self.offsets)
    }

    /// Returns the data for the object at the given index.
    pub fn get(&self, index: usize) -> Result<&'a [u8], Error> {
        let start = self.get_offset(index)?;
        let end = self.get_offset(index + 1)?;
        self.data
            .get(start..end)
            .ok_or(Error::Read(ReadError::OutOfBounds))
    }
}

/// Reads an offset which is encoded as a variable sized integer.
///
/// There are `count + 1` entries and every stored offset is one greater than
/// the position of the object relative to the start of the object data.
fn read_offset(index: usize, count: usize, off_size: u8, offsets: &[u8]) -> Result<usize, Error> {
    if index > count {
        return Err(ReadError::OutOfBounds.into());
    }
    let pos = index * off_size as usize;
    let offsets = FontData::new(offsets);
    let offset = match off_size {
        1 => offsets.read_at::<u8>(pos)? as usize,
        2 => offsets.read_at::<u16>(pos)? as usize,
        3 => offsets.read_at::<Uint24>(pos)?.to_u32() as usize,
        4 => offsets.read_at::<u32>(pos)? as usize,
        _ => return Err(Error::InvalidIndexOffsetSize(off_size)),
    };
    offset.checked_sub(1).ok_or(Error::ZeroOffset)
}

#[cfg(test)]
mod tests {
    use font_test_data::be_buffer;

    use super::*;

    #[test]
    fn cff_index() {
        let buf = be_buffer! {
            3u16,           // count
            1u8,            // offSize
            [1u8, 3, 3, 6], // offsets
            [b'a', b'b', b'c', b'd', b'e']
        };
        let index = Index::new(&buf, false).unwrap();
        assert_eq!(index.count(), 3);
        assert_eq!(index.get(0).unwrap(), b"ab");
        assert_eq!(index.get(1).unwrap(), b"");
        assert_eq!(index.get(2).unwrap(), b"cde");
        assert!(index.get(3).is_err());
        assert_eq!(index.size_in_bytes(), buf.len());
        assert_eq!(index.subr_bias(), 107);
    }

    #[test]
    fn cff2_index() {
        let buf = be_buffer! {
            2u32,           // count
            2u8,            // offSize
            [1u16, 2, 4],   // offsets
            [7u8, 8, 9]
        };
        let index = Index::new(&buf, true).unwrap();
        assert_eq!(index.count(), 2);
        assert_eq!(index.get(1).unwrap(), &[8, 9]);
        assert_eq!(index.size_in_bytes(), buf.len());
    }

    #[test]
    fn empty_and_invalid() {
        let index = Index::new(&[0, 0], false).unwrap();
        assert_eq!(index.count(), 0);
        assert_eq!(index.size_in_bytes(), 2);
        assert!(index.get(0).is_err());
        assert_eq!(
            Index::new(&[0, 1, 5, 1, 1], false).err(),
            Some(Error::InvalidIndexOffsetSize(5))
        );
        assert_eq!(
            Index::new(&[0, 1, 1, 1, 0], false).err(),
            Some(Error::ZeroOffset)
        );
        // data shorter than the final offset claims
        assert!(Index::new(&[0, 1, 1, 1, 9, 0], false).is_err());
    }
}
