//! PostScript outlines from the `CFF ` and `CFF2` tables.

use std::ops::Range;

use opentype::{
    tables::{
        cff::Cff,
        cff2::Cff2,
        postscript::{
            charstring,
            dict::{self, Entry},
            BlendState, Error, FdSelect, Index, PenSink,
        },
        variations::ItemVariationStore,
    },
    types::{GlyphId, Pen},
    FontData, FontRead, ReadError,
};

use super::DrawError;
use crate::NormalizedCoord;

/// Charstrings and the dictionaries needed to evaluate them.
#[derive(Clone)]
pub(crate) struct Outlines<'a> {
    offset_data: FontData<'a>,
    global_subrs: Index<'a>,
    charstrings: Index<'a>,
    font_dicts: Option<Index<'a>>,
    fd_select: Option<FdSelect<'a>>,
    /// Private DICT of fonts that are not CID-keyed.
    private_range: Option<Range<usize>>,
    var_store: Option<ItemVariationStore<'a>>,
    is_cff2: bool,
}

/// Offsets gathered from a top DICT.
#[derive(Default)]
struct TopDict {
    charstrings_offset: Option<usize>,
    private_range: Option<Range<usize>>,
    fd_array_offset: Option<usize>,
    fd_select_offset: Option<usize>,
    var_store_offset: Option<usize>,
}

impl TopDict {
    fn parse(data: &[u8]) -> Result<Self, Error> {
        let mut top = Self::default();
        for entry in dict::entries(data, None) {
            match entry? {
                Entry::CharstringsOffset(offset) => top.charstrings_offset = Some(offset),
                Entry::PrivateDictRange(range) => top.private_range = Some(range),
                Entry::FdArrayOffset(offset) => top.fd_array_offset = Some(offset),
                Entry::FdSelectOffset(offset) => top.fd_select_offset = Some(offset),
                Entry::VariationStoreOffset(offset) => top.var_store_offset = Some(offset),
                _ => {}
            }
        }
        Ok(top)
    }
}

impl<'a> Outlines<'a> {
    pub fn from_cff(cff: &Cff<'a>) -> Result<Self, Error> {
        let top_dict = cff.top_dicts().get(0)?;
        Self::new(
            cff.offset_data(),
            cff.global_subrs(),
            TopDict::parse(top_dict)?,
            false,
        )
    }

    pub fn from_cff2(cff2: &Cff2<'a>) -> Result<Self, Error> {
        Self::new(
            cff2.offset_data(),
            cff2.global_subrs(),
            TopDict::parse(cff2.top_dict_data())?,
            true,
        )
    }

    fn new(
        offset_data: FontData<'a>,
        global_subrs: Index<'a>,
        top: TopDict,
        is_cff2: bool,
    ) -> Result<Self, Error> {
        let data_at = |offset: usize| -> Result<&'a [u8], Error> {
            Ok(offset_data
                .split_off(offset)
                .ok_or(ReadError::OutOfBounds)?
                .as_bytes())
        };
        let charstrings_offset = top.charstrings_offset.ok_or(Error::MissingCharstrings)?;
        let charstrings = Index::new(data_at(charstrings_offset)?, is_cff2)?;
        let font_dicts = top
            .fd_array_offset
            .map(|offset| Index::new(data_at(offset)?, is_cff2))
            .transpose()?;
        let fd_select = top
            .fd_select_offset
            .map(|offset| -> Result<_, Error> {
                Ok(FdSelect::read(FontData::new(data_at(offset)?))?)
            })
            .transpose()?;
        // the store is preceded by a 16-bit length
        let var_store = top
            .var_store_offset
            .map(|offset| -> Result<_, Error> {
                Ok(ItemVariationStore::read(FontData::new(
                    data_at(offset + 2)?,
                ))?)
            })
            .transpose()?;
        if font_dicts.is_none() && top.private_range.is_none() {
            return Err(Error::MissingPrivateDict);
        }
        Ok(Self {
            offset_data,
            global_subrs,
            charstrings,
            font_dicts,
            fd_select,
            private_range: top.private_range,
            var_store,
            is_cff2,
        })
    }

    pub fn is_cff2(&self) -> bool {
        self.is_cff2
    }

    pub fn glyph_count(&self) -> u32 {
        self.charstrings.count()
    }

    pub fn draw(
        &self,
        glyph_id: GlyphId,
        coords: &[NormalizedCoord],
        pen: &mut impl Pen,
    ) -> Result<(), DrawError> {
        if glyph_id.to_u32() >= self.glyph_count() {
            return Err(DrawError::GlyphNotFound(glyph_id));
        }
        let charstring = self.charstrings.get(glyph_id.to_usize())?;
        let private_range = self.private_range(glyph_id)?;
        let private = self.private_dict(private_range, coords)?;
        let blend_state = self
            .var_store
            .clone()
            .map(|store| BlendState::new(store, coords, private.store_index))
            .transpose()?;
        let mut sink = PenSink::new(pen);
        charstring::evaluate(
            charstring,
            self.global_subrs.clone(),
            private.subrs,
            blend_state,
            &mut sink,
        )?;
        Ok(())
    }

    /// Returns the range of the private DICT that applies to the glyph.
    fn private_range(&self, glyph_id: GlyphId) -> Result<Range<usize>, Error> {
        let Some(font_dicts) = &self.font_dicts else {
            return self.private_range.clone().ok_or(Error::MissingPrivateDict);
        };
        let fd_index = self
            .fd_select
            .as_ref()
            .map(|fd_select| fd_select.font_index(glyph_id))
            .unwrap_or(Some(0))
            .ok_or(ReadError::OutOfBounds)?;
        for entry in dict::entries(font_dicts.get(fd_index as usize)?, None) {
            if let Entry::PrivateDictRange(range) = entry? {
                return Ok(range);
            }
        }
        Err(Error::MissingPrivateDict)
    }

    fn private_dict<'c>(
        &self,
        range: Range<usize>,
        coords: &'c [NormalizedCoord],
    ) -> Result<PrivateDict<'c>, Error>
    where
        'a: 'c,
    {
        let data = self
            .offset_data
            .slice(range.clone())
            .ok_or(ReadError::OutOfBounds)?
            .as_bytes();
        let blend_state = self
            .var_store
            .clone()
            .map(|store| BlendState::new(store, coords, 0))
            .transpose()?;
        let mut subrs_offset = None;
        let mut store_index = 0;
        for entry in dict::entries(data, blend_state) {
            match entry? {
                // relative to the start of the private DICT
                Entry::SubrsOffset(offset) => subrs_offset = Some(range.start + offset),
                Entry::VariationStoreIndex(index) => store_index = index,
                _ => {}
            }
        }
        let subrs = subrs_offset
            .map(|offset| -> Result<_, Error> {
                let data = self
                    .offset_data
                    .split_off(offset)
                    .ok_or(ReadError::OutOfBounds)?;
                Ok(Index::new(data.as_bytes(), self.is_cff2)?)
            })
            .transpose()?;
        Ok(PrivateDict { subrs, store_index })
    }
}

struct PrivateDict<'a> {
    subrs: Option<Index<'a>>,
    store_index: u16,
}
