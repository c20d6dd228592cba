//! The [hmtx](https://docs.microsoft.com/en-us/typography/opentype/spec/hmtx)
//! and [vmtx](https://docs.microsoft.com/en-us/typography/opentype/spec/vmtx)
//! tables.

use types::{GlyphId, Tag};

use crate::{record, Array, FontData, FontReadWithArgs, ReadArgs, ReadError, RecordArray};

/// 'hmtx'
pub const HMTX_TAG: Tag = Tag::new(b"hmtx");
/// 'vmtx'
pub const VMTX_TAG: Tag = Tag::new(b"vmtx");

record! {
    /// An advance and side bearing pair.
    pub struct LongMetric {
        pub advance: u16,
        pub side_bearing: i16,
    }
}

/// Horizontal or vertical glyph metrics.
#[derive(Clone, Debug)]
pub struct HVmtx<'a> {
    long_metrics: RecordArray<'a, LongMetric>,
    side_bearings: Array<'a, i16>,
}

impl ReadArgs for HVmtx<'_> {
    /// The number of long metrics and the glyph count.
    type Args = (u16, u16);
}

impl<'a> FontReadWithArgs<'a> for HVmtx<'a> {
    fn read_with_args(data: FontData<'a>, args: &(u16, u16)) -> Result<Self, ReadError> {
        let (num_long, num_glyphs) = *args;
        let mut cursor = data.cursor();
        let long_metrics = cursor.read_records(num_long as usize)?;
        // fonts in the wild truncate the bearing array; take what is there
        let num_bearings = num_glyphs.saturating_sub(num_long) as usize;
        let available = cursor.remaining_bytes() / 2;
        let side_bearings = cursor.read_array(num_bearings.min(available))?;
        Ok(HVmtx {
            long_metrics,
            side_bearings,
        })
    }
}

impl<'a> HVmtx<'a> {
    pub fn long_metrics(&self) -> RecordArray<'a, LongMetric> {
        self.long_metrics
    }

    pub fn side_bearings(&self) -> Array<'a, i16> {
        self.side_bearings
    }

    /// Returns the advance for the given glyph.
    ///
    /// Glyphs past the long metrics share the advance of the last entry.
    pub fn advance(&self, glyph_id: GlyphId) -> Option<u16> {
        let ix = glyph_id.to_u32() as usize;
        let metrics = self.long_metrics;
        metrics
            .get(ix)
            .or_else(|| {
                (ix < metrics.len() + self.side_bearings.len())
                    .then(|| metrics.get(metrics.len().checked_sub(1)?))
                    .flatten()
            })
            .map(|metric| metric.advance)
    }

    /// Returns the left (or top) side bearing for the given glyph.
    pub fn side_bearing(&self, glyph_id: GlyphId) -> Option<i16> {
        let ix = glyph_id.to_u32() as usize;
        let metrics = self.long_metrics;
        if let Some(metric) = metrics.get(ix) {
            Some(metric.side_bearing)
        } else {
            self.side_bearings.get(ix.checked_sub(metrics.len())?)
        }
    }
}
