//! The [CFF](https://learn.microsoft.com/en-us/typography/opentype/spec/cff) table

use types::Tag;

use super::postscript::Index;
use crate::{FontData, FontRead, ReadError};

/// 'CFF '
pub const TAG: Tag = Tag::new(b"CFF ");

/// The [Compact Font Format](https://learn.microsoft.com/en-us/typography/opentype/spec/cff) table.
///
/// Only the fixed prefix of the font set is parsed here. Offsets found in
/// the top DICT are relative to [`Cff::offset_data`].
#[derive(Clone, Debug)]
pub struct Cff<'a> {
    data: FontData<'a>,
    major: u8,
    minor: u8,
    names: Index<'a>,
    top_dicts: Index<'a>,
    strings: Index<'a>,
    global_subrs: Index<'a>,
}

impl<'a> FontRead<'a> for Cff<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        data.check_len(4)?;
        let major: u8 = data.read_at(0)?;
        let minor: u8 = data.read_at(1)?;
        if major != 1 {
            return Err(ReadError::InvalidFormat(major as i64));
        }
        let header_size: u8 = data.read_at(2)?;
        let mut pos = header_size as usize;
        let mut next_index = || -> Result<Index<'a>, ReadError> {
            let index_data = data.split_off(pos).ok_or(ReadError::OutOfBounds)?;
            let index = Index::new(index_data.as_bytes(), false).map_err(|e| e.into_read_error())?;
            pos += index.size_in_bytes();
            Ok(index)
        };
        let names = next_index()?;
        let top_dicts = next_index()?;
        let strings = next_index()?;
        let global_subrs = next_index()?;
        Ok(Self {
            data,
            major,
            minor,
            names,
            top_dicts,
            strings,
            global_subrs,
        })
    }
}

impl<'a> Cff<'a> {
    /// Returns the data that top DICT offsets are relative to.
    pub fn offset_data(&self) -> FontData<'a> {
        self.data
    }

    pub fn version(&self) -> (u8, u8) {
        (self.major, self.minor)
    }

    /// Returns the name index.
    ///
    /// This contains the PostScript names of all fonts in the font set.
    pub fn names(&self) -> Index<'a> {
        self.names.clone()
    }

    /// Returns the PostScript name of the font at the given index.
    pub fn name(&self, index: usize) -> Option<&'a [u8]> {
        self.names.get(index).ok()
    }

    /// Returns the top DICT index.
    ///
    /// The objects here correspond to those in the name index.
    pub fn top_dicts(&self) -> Index<'a> {
        self.top_dicts.clone()
    }

    pub fn strings(&self) -> Index<'a> {
        self.strings.clone()
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
    fn read_simple_cff() {
        let data = font_test_data::cff::simple_cff();
        let cff = Cff::read(FontData::new(&data)).unwrap();
        assert_eq!(cff.version(), (1, 0));
        assert_eq!(cff.names().count(), 1);
        assert_eq!(cff.name(0).unwrap(), b"Test");
        assert_eq!(cff.top_dicts().count(), 1);
        assert_eq!(cff.strings().count(), 0);
        assert_eq!(cff.global_subrs().count(), 0);
        let top_dict = cff.top_dicts().get(0).unwrap();
        let charstrings_offset = dict::entries(top_dict, None)
            .filter_map(|entry| match entry {
                Ok(Entry::CharstringsOffset(offset)) => Some(offset),
                _ => None,
            })
            .next()
            .unwrap();
        let charstrings_data = cff.offset_data().split_off(charstrings_offset).unwrap();
        let charstrings = Index::new(charstrings_data.as_bytes(), false).unwrap();
        assert_eq!(charstrings.count(), 3);
        assert_eq!(
            charstrings.get(1).unwrap(),
            font_test_data::cff::CFF_SQUARE
        );
    }

    #[test]
    fn reject_cff2_data() {
        let data = font_test_data::cff::simple_cff2();
        assert!(matches!(
            Cff::read(FontData::new(&data)),
            Err(ReadError::InvalidFormat(2))
        ));
    }
}
