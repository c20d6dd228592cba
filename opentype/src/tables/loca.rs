//! The [loca (Index to Location)][loca] table
//!
//! [loca]: https://docs.microsoft.com/en-us/typography/opentype/spec/loca

use types::{GlyphId, Tag};

use crate::{
    tables::glyf::{Glyf, Glyph},
    Array, FontData, FontRead, FontReadWithArgs, ReadArgs, ReadError,
};

/// 'loca'
pub const TAG: Tag = Tag::new(b"loca");

/// The [loca] table.
///
/// [loca]: https://docs.microsoft.com/en-us/typography/opentype/spec/loca
#[derive(Clone, Debug)]
pub enum Loca<'a> {
    Short(Array<'a, u16>),
    Long(Array<'a, u32>),
}

impl<'a> Loca<'a> {
    pub fn read(data: FontData<'a>, is_long: bool) -> Result<Self, ReadError> {
        Self::read_with_args(data, &is_long)
    }

    /// The number of glyphs with an entry; one less than the number of
    /// offsets.
    pub fn len(&self) -> usize {
        match self {
            Loca::Short(data) => data.len().saturating_sub(1),
            Loca::Long(data) => data.len().saturating_sub(1),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Attempt to return the byte offset for a given glyph id.
    pub fn get_raw(&self, idx: usize) -> Option<u32> {
        match self {
            Loca::Short(data) => data.get(idx).map(|x| x as u32 * 2),
            Loca::Long(data) => data.get(idx),
        }
    }

    /// Returns the glyph data for the given glyph.
    ///
    /// Glyphs with equal consecutive offsets have no outline and produce
    /// `Ok(None)`.
    pub fn get_glyf(&self, gid: GlyphId, glyf: &Glyf<'a>) -> Result<Option<Glyph<'a>>, ReadError> {
        let idx = gid.to_usize();
        let start = self.get_raw(idx).ok_or(ReadError::OutOfBounds)?;
        let end = self.get_raw(idx + 1).ok_or(ReadError::OutOfBounds)?;
        if start >= end {
            return Ok(None);
        }
        let data = glyf
            .offset_data()
            .slice(start as usize..end as usize)
            .ok_or(ReadError::OutOfBounds)?;
        Glyph::read(data).map(Some)
    }
}

impl ReadArgs for Loca<'_> {
    type Args = bool;
}

impl<'a> FontReadWithArgs<'a> for Loca<'a> {
    fn read_with_args(data: FontData<'a>, args: &bool) -> Result<Self, ReadError> {
        let is_long = *args;
        Ok(if is_long {
            Loca::Long(Array::new(data.as_bytes()))
        } else {
            Loca::Short(Array::new(data.as_bytes()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_and_long() {
        let short = [0u8, 0, 0, 5, 0, 5, 0, 9];
        let loca = Loca::read(FontData::new(&short), false).unwrap();
        assert_eq!(loca.len(), 3);
        assert_eq!(loca.get_raw(1), Some(10));
        assert_eq!(loca.get_raw(4), None);

        let long = [0u8, 0, 0, 0, 0, 0, 0, 7];
        let loca = Loca::read(FontData::new(&long), true).unwrap();
        assert_eq!(loca.len(), 1);
        assert_eq!(loca.get_raw(1), Some(7));
    }
}
