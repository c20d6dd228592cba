//! The [VORG (Vertical Origin)](https://docs.microsoft.com/en-us/typography/opentype/spec/vorg) table.

use types::{GlyphId, Tag};

use crate::{record, FontData, FontRead, ReadError, RecordArray};

/// 'VORG'
pub const TAG: Tag = Tag::new(b"VORG");

record! {
    pub struct VertOriginYMetrics {
        pub glyph_index: u16,
        pub vert_origin_y: i16,
    }
}

#[derive(Clone, Debug)]
pub struct Vorg<'a> {
    default_vert_origin_y: i16,
    metrics: RecordArray<'a, VertOriginYMetrics>,
}

impl<'a> FontRead<'a> for Vorg<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let major: u16 = cursor.read()?;
        if major != 1 {
            return Err(ReadError::InvalidFormat(major as _));
        }
        cursor.advance::<u16>();
        let default_vert_origin_y = cursor.read()?;
        let count: u16 = cursor.read()?;
        let metrics = cursor.read_records(count as usize)?;
        Ok(Self {
            default_vert_origin_y,
            metrics,
        })
    }
}

impl<'a> Vorg<'a> {
    pub fn default_vert_origin_y(&self) -> i16 {
        self.default_vert_origin_y
    }

    pub fn vert_origin_y_metrics(&self) -> RecordArray<'a, VertOriginYMetrics> {
        self.metrics
    }

    /// Returns the y coordinate of the of the glyph's vertical origin.
    pub fn vertical_origin_y(&self, glyph_id: GlyphId) -> i16 {
        let gid = glyph_id.to_u32();
        match self
            .metrics
            .binary_search_by_key(&gid, |rec| rec.glyph_index as u32)
        {
            Ok(ix) => self
                .metrics
                .get(ix)
                .map(|metric| metric.vert_origin_y)
                .unwrap_or_default(),
            _ => self.default_vert_origin_y,
        }
    }
}

#[cfg(test)]
mod tests {
    use font_test_data::bebuffer::BeBuffer;

    use super::*;

    #[test]
    fn vertical_origins() {
        let buf = BeBuffer::new()
            .push(1u16)
            .push(0u16)
            .push(880i16)
            .push(2u16)
            .push(1u16)
            .push(867i16)
            .push(3u16)
            .push(824i16);
        let vorg = Vorg::read(FontData::new(&buf)).unwrap();
        // Glyphs 1 and 3 have entries while 0 and 2 use the default value
        assert_eq!(vorg.vertical_origin_y(GlyphId::new(0)), 880);
        assert_eq!(vorg.vertical_origin_y(GlyphId::new(1)), 867);
        assert_eq!(vorg.vertical_origin_y(GlyphId::new(2)), 880);
        assert_eq!(vorg.vertical_origin_y(GlyphId::new(3)), 824);
    }
}
