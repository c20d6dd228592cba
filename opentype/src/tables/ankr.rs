//! The [anchor point](https://developer.apple.com/fonts/TrueType-Reference-Manual/RM06/Chap6ankr.html) table.

use types::{GlyphId, Tag};

use super::aat::LookupU16;
use crate::{record, FontData, FontRead, ReadError, RecordArray};

/// 'ankr'
pub const TAG: Tag = Tag::new(b"ankr");

/// The anchor point table.
#[derive(Clone, Debug)]
pub struct Ankr<'a> {
    data: FontData<'a>,
    lookup_table: LookupU16<'a>,
    glyph_data_table_offset: u32,
}

impl<'a> FontRead<'a> for Ankr<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let version: u16 = data.read_at(0)?;
        if version != 0 {
            return Err(ReadError::InvalidFormat(version as i64));
        }
        let lookup_start = data.read_at::<u32>(4)? as usize;
        let glyph_data_table_offset: u32 = data.read_at(8)?;
        // a format 0 lookup has no count of its own, so it ends where the
        // glyph data begins
        let lookup_end = match glyph_data_table_offset as usize {
            end if end > lookup_start => end,
            _ => data.len(),
        };
        let lookup_table = LookupU16::read(
            data.slice(lookup_start..lookup_end)
                .ok_or(ReadError::OutOfBounds)?,
        )?;
        Ok(Self {
            data,
            lookup_table,
            glyph_data_table_offset,
        })
    }
}

record! {
    /// A single anchor point in font units.
    pub struct AnchorPoint {
        pub x: i16,
        pub y: i16,
    }
}

impl<'a> Ankr<'a> {
    /// Returns the set of anchor points for the given glyph.
    pub fn anchor_points(&self, glyph_id: GlyphId) -> Result<RecordArray<'a, AnchorPoint>, ReadError> {
        let glyph_id = u16::try_from(glyph_id.to_u32()).map_err(|_| ReadError::OutOfBounds)?;
        let entry_offset = self.lookup_table.value(glyph_id)?;
        let full_offset = (self.glyph_data_table_offset as usize)
            .checked_add(entry_offset as usize)
            .ok_or(ReadError::OutOfBounds)?;
        let count: u32 = self.data.read_at(full_offset)?;
        self.data.read_records(full_offset + 4, count as usize)
    }
}
