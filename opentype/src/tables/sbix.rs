//! The [sbix (Standard Bitmap Graphics)](https://docs.microsoft.com/en-us/typography/opentype/spec/sbix) table

use types::{GlyphId, Tag};

use crate::{Array, FontData, FontRead, FontReadWithArgs, ReadArgs, ReadError};

/// 'sbix'
pub const TAG: Tag = Tag::new(b"sbix");

/// Graphic type of glyphs that reuse the image of another glyph.
pub const DUPE: Tag = Tag::new(b"dupe");

/// The standard bitmap graphics table.
#[derive(Clone, Debug)]
pub struct Sbix<'a> {
    data: FontData<'a>,
    flags: u16,
    num_glyphs: u16,
    strike_offsets: Array<'a, u32>,
}

impl ReadArgs for Sbix<'_> {
    type Args = u16;
}

impl<'a> FontReadWithArgs<'a> for Sbix<'a> {
    fn read_with_args(data: FontData<'a>, num_glyphs: &u16) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let version: u16 = cursor.read()?;
        if version != 1 {
            return Err(ReadError::InvalidFormat(version as _));
        }
        let flags = cursor.read()?;
        let num_strikes: u32 = cursor.read()?;
        let strike_offsets = cursor.read_array(num_strikes as usize)?;
        Ok(Self {
            data,
            flags,
            num_glyphs: *num_glyphs,
            strike_offsets,
        })
    }
}

impl<'a> Sbix<'a> {
    /// Bit 1 requests drawing outlines in addition to the bitmaps.
    pub fn flags(&self) -> u16 {
        self.flags
    }

    pub fn num_strikes(&self) -> usize {
        self.strike_offsets.len()
    }

    pub fn strike(&self, index: usize) -> Result<Strike<'a>, ReadError> {
        let offset = self.strike_offsets.get(index).ok_or(ReadError::OutOfBounds)?;
        let data = self
            .data
            .split_off(offset as usize)
            .ok_or(ReadError::OutOfBounds)?;
        Strike::read_with_args(data, &self.num_glyphs)
    }

    pub fn strikes(&self) -> impl Iterator<Item = Result<Strike<'a>, ReadError>> + '_ {
        (0..self.num_strikes()).map(|ix| self.strike(ix))
    }

    /// Returns the strike with the ppem closest to `ppem`, preferring the
    /// smallest strike that is at least as large.
    pub fn best_strike(&self, ppem: u16) -> Option<Strike<'a>> {
        let mut best: Option<Strike<'a>> = None;
        for strike in self.strikes().filter_map(|strike| strike.ok()) {
            let Some(current) = &best else {
                best = Some(strike);
                continue;
            };
            let better = if current.ppem() < ppem {
                strike.ppem() > current.ppem()
            } else {
                strike.ppem() >= ppem && strike.ppem() < current.ppem()
            };
            if better {
                best = Some(strike);
            }
        }
        best
    }
}

/// A set of glyph images at a single pixel density.
#[derive(Clone, Debug)]
pub struct Strike<'a> {
    data: FontData<'a>,
    ppem: u16,
    ppi: u16,
    glyph_data_offsets: Array<'a, u32>,
}

impl ReadArgs for Strike<'_> {
    type Args = u16;
}

impl<'a> FontReadWithArgs<'a> for Strike<'a> {
    fn read_with_args(data: FontData<'a>, num_glyphs: &u16) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let ppem = cursor.read()?;
        let ppi = cursor.read()?;
        let glyph_data_offsets = cursor.read_array(*num_glyphs as usize + 1)?;
        Ok(Self {
            data,
            ppem,
            ppi,
            glyph_data_offsets,
        })
    }
}

impl<'a> Strike<'a> {
    pub fn ppem(&self) -> u16 {
        self.ppem
    }

    pub fn ppi(&self) -> u16 {
        self.ppi
    }

    /// Returns the image for `glyph_id`, or `None` if the glyph has no image
    /// in this strike.
    pub fn glyph_data(&self, glyph_id: GlyphId) -> Result<Option<GlyphData<'a>>, ReadError> {
        let ix = glyph_id.to_usize();
        let start = self
            .glyph_data_offsets
            .get(ix)
            .ok_or(ReadError::OutOfBounds)? as usize;
        let end = self
            .glyph_data_offsets
            .get(ix + 1)
            .ok_or(ReadError::OutOfBounds)? as usize;
        if start == end {
            // Empty glyphs are okay
            return Ok(None);
        }
        let data = self
            .data
            .slice(start..end)
            .ok_or(ReadError::OutOfBounds)?;
        Ok(Some(GlyphData::read(data)?))
    }
}

/// A single glyph image with its origin offset.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GlyphData<'a> {
    pub origin_offset_x: i16,
    pub origin_offset_y: i16,
    /// Usually `png `, `jpg ` or `tiff`.
    pub graphic_type: Tag,
    pub data: &'a [u8],
}

impl<'a> FontRead<'a> for GlyphData<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let origin_offset_x = cursor.read()?;
        let origin_offset_y = cursor.read()?;
        let graphic_type = cursor.read()?;
        let data = cursor.read_bytes(cursor.remaining_bytes())?;
        Ok(Self {
            origin_offset_x,
            origin_offset_y,
            graphic_type,
            data,
        })
    }
}

impl GlyphData<'_> {
    /// For `dupe` images, the glyph whose image should be used instead.
    pub fn dupe_glyph(&self) -> Option<GlyphId> {
        if self.graphic_type != DUPE {
            return None;
        }
        let id: u16 = FontData::new(self.data).read_at(0).ok()?;
        Some(GlyphId::from(id))
    }
}
