//! The [HVAR (Horizontal Metrics Variation)](https://docs.microsoft.com/en-us/typography/opentype/spec/hvar)
//! and [VVAR (Vertical Metrics Variation)](https://docs.microsoft.com/en-us/typography/opentype/spec/vvar)
//! tables
//!
//! Both share a layout; VVAR appends a mapping for vertical origins.

use types::{F2Dot14, Fixed, GlyphId, Tag};

use super::variations::{self, DeltaSetIndexMap, ItemVariationStore};
use crate::{FontData, FontRead, ReadError};

/// 'HVAR'
pub const HVAR_TAG: Tag = Tag::new(b"HVAR");
/// 'VVAR'
pub const VVAR_TAG: Tag = Tag::new(b"VVAR");

#[derive(Clone, Debug)]
pub struct Hvar<'a> {
    data: FontData<'a>,
    item_variation_store: ItemVariationStore<'a>,
}

impl<'a> FontRead<'a> for Hvar<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let major: u16 = data.read_at(0)?;
        if major != 1 {
            return Err(ReadError::InvalidFormat(major as _));
        }
        data.check_len(20)?;
        let store_offset: u32 = data.read_at(4)?;
        let item_variation_store = data.resolve_offset(store_offset)?;
        Ok(Self {
            data,
            item_variation_store,
        })
    }
}

impl<'a> Hvar<'a> {
    pub fn item_variation_store(&self) -> &ItemVariationStore<'a> {
        &self.item_variation_store
    }

    fn mapping(&self, pos: usize) -> Option<Result<DeltaSetIndexMap<'a>, ReadError>> {
        let offset: u32 = self.data.read_at(pos).ok()?;
        self.data.resolve_nullable(offset)
    }

    /// Mapping for advance widths (or heights); without one the glyph id is
    /// the inner index of the first data set.
    pub fn advance_mapping(&self) -> Option<Result<DeltaSetIndexMap<'a>, ReadError>> {
        self.mapping(8)
    }

    /// Mapping for left (or top) side bearings.
    pub fn lsb_mapping(&self) -> Option<Result<DeltaSetIndexMap<'a>, ReadError>> {
        self.mapping(12)
    }

    /// Mapping for right (or bottom) side bearings.
    pub fn rsb_mapping(&self) -> Option<Result<DeltaSetIndexMap<'a>, ReadError>> {
        self.mapping(16)
    }

    /// Mapping for vertical origins, only present in VVAR.
    pub fn vorg_mapping(&self) -> Option<Result<DeltaSetIndexMap<'a>, ReadError>> {
        self.mapping(20)
    }

    /// Returns the advance delta for the specified glyph.
    pub fn advance_delta(&self, glyph_id: GlyphId, coords: &[F2Dot14]) -> Result<Fixed, ReadError> {
        let map = self.advance_mapping().transpose()?;
        variations::advance_delta(map.as_ref(), &self.item_variation_store, glyph_id, coords)
    }

    /// Returns the side bearing delta for the specified glyph, if the table
    /// carries a mapping for side bearings.
    pub fn lsb_delta(
        &self,
        glyph_id: GlyphId,
        coords: &[F2Dot14],
    ) -> Option<Result<Fixed, ReadError>> {
        self.mapped_delta(self.lsb_mapping()?, glyph_id, coords)
    }

    pub fn rsb_delta(
        &self,
        glyph_id: GlyphId,
        coords: &[F2Dot14],
    ) -> Option<Result<Fixed, ReadError>> {
        self.mapped_delta(self.rsb_mapping()?, glyph_id, coords)
    }

    pub fn vorg_delta(
        &self,
        glyph_id: GlyphId,
        coords: &[F2Dot14],
    ) -> Option<Result<Fixed, ReadError>> {
        self.mapped_delta(self.vorg_mapping()?, glyph_id, coords)
    }

    fn mapped_delta(
        &self,
        map: Result<DeltaSetIndexMap<'a>, ReadError>,
        glyph_id: GlyphId,
        coords: &[F2Dot14],
    ) -> Option<Result<Fixed, ReadError>> {
        Some(map.and_then(|map| {
            variations::advance_delta(Some(&map), &self.item_variation_store, glyph_id, coords)
        }))
    }
}

#[cfg(test)]
mod tests {
    use font_test_data::{be_buffer, bebuffer::BeBuffer, variations::item_variation_store};

    use super::*;

    fn coords(values: &[f32]) -> Vec<F2Dot14> {
        values.iter().copied().map(F2Dot14::from_f32).collect()
    }

    #[test]
    fn advance_without_mapping() {
        let store = item_variation_store();
        let buf = be_buffer! { 1u16, 0u16, 20u32, 0u32, 0u32, 0u32 }.extend_bytes(&store);
        let hvar = Hvar::read(FontData::new(&buf)).unwrap();
        let delta = |gid: u32, values: &[f32]| {
            hvar.advance_delta(GlyphId::new(gid), &coords(values))
                .unwrap()
                .to_f64()
        };
        assert_eq!(delta(0, &[1.0]), 100.0);
        assert_eq!(delta(1, &[-0.5]), 10.0);
        // no data for this glyph
        assert_eq!(delta(5, &[1.0]), 0.0);
        assert!(hvar.lsb_delta(GlyphId::new(0), &coords(&[1.0])).is_none());
    }

    #[test]
    fn vvar_mappings() {
        let store = item_variation_store();
        // every glyph maps to (0, 1): a one bit inner index
        let map = [0u8, 0x00, 0, 1, 0x01];
        let buf = be_buffer! { 1u16, 0u16, 29u32, 24u32, 0u32, 0u32, 24u32 }
            .extend_bytes(&map)
            .extend_bytes(&store);
        let vvar = Hvar::read(FontData::new(&buf)).unwrap();
        let c = coords(&[1.0]);
        assert_eq!(
            vvar.advance_delta(GlyphId::new(0), &c).unwrap(),
            Fixed::from_i32(10)
        );
        assert_eq!(
            vvar.vorg_delta(GlyphId::new(7), &c).unwrap().unwrap(),
            Fixed::from_i32(10)
        );
        assert!(vvar.lsb_delta(GlyphId::new(0), &c).is_none());
    }
}
