//! The [CFF2](https://learn.microsoft.com/en-us/typography/opentype/spec/cff2) table

use types::Tag;

use super::postscript::Index;
use crate::{FontData, FontRead, ReadError};

/// 'CFF2'
pub const TAG: Tag = Tag::new(b"CFF2");

/// The [Compact Font Format (CFF) version 2](https://learn.microsoft.com/en-us/typography/opentype/spec/cff2) table
#[derive(Clone, Debug)]
pub struct Cff2<'a> {
    data: FontData<'a>,
    top_dict_data: &'a [u8],
    global_subrs: Index<'a>,
}

impl<'a> FontRead<'a> for Cff2<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        data.check_len(5)?;
        let major: u8 = data.read_at(0)?;
        if major != 2 {
            return Err(ReadError::InvalidFormat(major as i64));
        }
        let header_size: u8 = data.read_at(2)?;
        let top_dict_length: u16 = data.read_at(3)?;
        let top_dict_data = data
            .slice_len(header_size as usize, top_dict_length as usize)?
            .as_bytes();
        let subrs_start = header_size as usize + top_dict_length as usize;
        let subrs_data = data.split_off(subrs_start).ok_or(ReadError::OutOfBounds)?;
        let global_subrs =
            Index::new(subrs_data.as_bytes(), true).map_err(|e| e.into_read_error())?;
        Ok(Self {
            data,
            top_dict_data,
            global_subrs,
        })
    }
}

impl<'a> Cff2<'a> {
    /// Returns the data that top DICT offsets are relative to.
    pub fn offset_data(&self) -> FontData<'a> {
        self.data
    }

    /// Returns the raw data containing the top dict.
    ///
    /// See <https://learn.microsoft.com/en-us/typography/opentype/spec/cff2#7-top-dict-data>
    pub fn top_dict_data(&self) -> &'a [u8] {
        self.top_dict_data
    }

    /// Returns the global subroutine index.
    pub fn global_subrs(&self) -> Index<'a> {
        self.global_subrs.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::postscript::dict::{self, Entry};

    #[test]
    fn read_simple_cff2() {
        let data = font_test_data::cff::simple_cff2();
        let cff2 = Cff2::read(FontData::new(&data)).unwrap();
        assert_eq!(cff2.global_subrs().count(), 0);
        let entries: Vec<_> = dict::entries(cff2.top_dict_data(), None)
            .map(|entry| entry.unwrap())
            .collect();
        assert_eq!(entries.len(), 3);
        assert!(matches!(entries[0], Entry::CharstringsOffset(22)));
        assert!(matches!(entries[1], Entry::FdArrayOffset(_)));
        assert!(matches!(entries[2], Entry::VariationStoreOffset(_)));
    }

    #[test]
    fn truncated_top_dict() {
        let data = font_test_data::cff::simple_cff2();
        assert!(Cff2::read(FontData::new(&data[..10])).is_err());
    }
}
