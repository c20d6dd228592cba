//! Parsing for CFF FDSelect tables.

use types::GlyphId;

use crate::{record, Array, FontData, FontRead, ReadError, RecordArray};

record! {
    /// A range of glyphs sharing a font DICT, for FDSelect format 3.
    pub struct Range3 {
        pub first: u16,
        pub fd: u8,
    }
}

record! {
    /// A range of glyphs sharing a font DICT, for FDSelect format 4.
    pub struct Range4 {
        pub first: u32,
        pub fd: u16,
    }
}

/// Maps glyph identifiers to font DICT indices in CID-keyed fonts.
///
/// See <https://learn.microsoft.com/en-us/typography/opentype/spec/cff2#fdselect>
#[derive(Clone, Debug)]
pub enum FdSelect<'a> {
    Format0(Array<'a, u8>),
    Format3(RecordArray<'a, Range3>),
    Format4(RecordArray<'a, Range4>),
}

impl<'a> FontRead<'a> for FdSelect<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let format: u8 = data.read_at(0)?;
        match format {
            // the glyph count is not known here so take every byte
            0 => Ok(Self::Format0(Array::new(
                data.split_off(1).unwrap_or_default().as_bytes(),
            ))),
            3 => {
                let count: u16 = data.read_at(1)?;
                Ok(Self::Format3(data.read_records(3, count as usize)?))
            }
            4 => {
                let count: u32 = data.read_at(1)?;
                Ok(Self::Format4(data.read_records(5, count as usize)?))
            }
            _ => Err(ReadError::InvalidFormat(format.into())),
        }
    }
}

impl FdSelect<'_> {
    /// Returns the associated font DICT index for the given glyph identifier.
    pub fn font_index(&self, glyph_id: GlyphId) -> Option<u16> {
        let gid = glyph_id.to_u32();
        match self {
            Self::Format0(fds) => fds.get(gid as usize).map(u16::from),
            Self::Format3(ranges) => {
                let ix = match ranges.binary_search_by(|range| (range.first as u32).cmp(&gid)) {
                    Ok(ix) => ix,
                    Err(ix) => ix.checked_sub(1)?,
                };
                ranges.get(ix).map(|range| range.fd as u16)
            }
            Self::Format4(ranges) => {
                let ix = match ranges.binary_search_by(|range| range.first.cmp(&gid)) {
                    Ok(ix) => ix,
                    Err(ix) => ix.checked_sub(1)?,
                };
                ranges.get(ix).map(|range| range.fd)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::ops::Range;

    use font_test_data::bebuffer::BeBuffer;

    use super::*;

    #[test]
    fn select_font_index() {
        let map = &[
            (0..10, 0),
            (10..32, 4),
            (32..34, 1),
            (34..128, 12),
            (128..1024, 2),
        ];
        for data in make_fd_selects(map) {
            let fd_select = FdSelect::read(FontData::new(&data)).unwrap();
            for (range, font_index) in map {
                for gid in range.clone() {
                    assert_eq!(
                        fd_select.font_index(GlyphId::new(gid as u32)),
                        Some(*font_index as u16)
                    );
                }
            }
        }
    }

    /// Builds FDSelect structures in all three formats for the given
    /// Range<GID> -> font index mapping.
    fn make_fd_selects(map: &[(Range<u16>, u8)]) -> [BeBuffer; 3] {
        let glyph_count = map.last().unwrap().0.end;
        let mut fds = vec![0u8; glyph_count as usize];
        for (range, font_index) in map {
            for gid in range.clone() {
                fds[gid as usize] = *font_index;
            }
        }
        let format0 = BeBuffer::new().push(0u8).extend(fds);
        let mut format3 = BeBuffer::new().push(3u8).push(map.len() as u16);
        let mut format4 = BeBuffer::new().push(4u8).push(map.len() as u32);
        for (range, font_index) in map {
            format3 = format3.push(range.start).push(*font_index);
            format4 = format4.push(range.start as u32).push(*font_index as u16);
        }
        [
            format0,
            format3.push(glyph_count),
            format4.push(glyph_count as u32),
        ]
    }
}
