//! the [GDEF] table
//!
//! [GDEF]: https://docs.microsoft.com/en-us/typography/opentype/spec/gdef

use types::{GlyphId, Tag};

use super::layout::{ClassDef, CoverageTable};
use super::variations::ItemVariationStore;
use crate::{Array, FontData, FontRead, ReadError};

/// 'GDEF'
pub const TAG: Tag = Tag::new(b"GDEF");

/// The class of a glyph, as assigned by the glyph class definition table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GlyphClassDef {
    Base,
    Ligature,
    Mark,
    Component,
    Unknown,
}

impl GlyphClassDef {
    fn from_raw(raw: u16) -> Self {
        match raw {
            1 => Self::Base,
            2 => Self::Ligature,
            3 => Self::Mark,
            4 => Self::Component,
            _ => Self::Unknown,
        }
    }
}

/// The glyph definition table.
#[derive(Clone, Debug)]
pub struct Gdef<'a> {
    data: FontData<'a>,
    minor_version: u16,
    glyph_class_def_offset: u16,
    attach_list_offset: u16,
    lig_caret_list_offset: u16,
    mark_attach_class_def_offset: u16,
    mark_glyph_sets_def_offset: u16,
    item_var_store_offset: u32,
}

impl<'a> FontRead<'a> for Gdef<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let major: u16 = cursor.read()?;
        let minor_version: u16 = cursor.read()?;
        if major != 1 {
            return Err(ReadError::InvalidFormat(major as _));
        }
        let glyph_class_def_offset = cursor.read()?;
        let attach_list_offset = cursor.read()?;
        let lig_caret_list_offset = cursor.read()?;
        let mark_attach_class_def_offset = cursor.read()?;
        let mark_glyph_sets_def_offset = if minor_version >= 2 {
            cursor.read()?
        } else {
            0
        };
        let item_var_store_offset = if minor_version >= 3 {
            cursor.read()?
        } else {
            0
        };
        Ok(Self {
            data,
            minor_version,
            glyph_class_def_offset,
            attach_list_offset,
            lig_caret_list_offset,
            mark_attach_class_def_offset,
            mark_glyph_sets_def_offset,
            item_var_store_offset,
        })
    }
}

impl<'a> Gdef<'a> {
    pub fn minor_version(&self) -> u16 {
        self.minor_version
    }

    pub fn glyph_class_def(&self) -> Option<Result<ClassDef<'a>, ReadError>> {
        self.data.resolve_nullable(self.glyph_class_def_offset)
    }

    pub fn attach_list(&self) -> Option<Result<AttachList<'a>, ReadError>> {
        self.data.resolve_nullable(self.attach_list_offset)
    }

    pub fn lig_caret_list(&self) -> Option<Result<LigCaretList<'a>, ReadError>> {
        self.data.resolve_nullable(self.lig_caret_list_offset)
    }

    pub fn mark_attach_class_def(&self) -> Option<Result<ClassDef<'a>, ReadError>> {
        self.data.resolve_nullable(self.mark_attach_class_def_offset)
    }

    pub fn mark_glyph_sets_def(&self) -> Option<Result<MarkGlyphSets<'a>, ReadError>> {
        self.data.resolve_nullable(self.mark_glyph_sets_def_offset)
    }

    pub fn item_var_store(&self) -> Option<Result<ItemVariationStore<'a>, ReadError>> {
        self.data.resolve_nullable(self.item_var_store_offset)
    }

    /// Returns the class of `gid`, or `Unknown` when the table does not
    /// classify it.
    pub fn glyph_class(&self, gid: GlyphId) -> GlyphClassDef {
        match self.glyph_class_def() {
            Some(Ok(class_def)) => GlyphClassDef::from_raw(class_def.get(gid)),
            _ => GlyphClassDef::Unknown,
        }
    }

    /// Returns the mark attachment class of `gid`, 0 when it has none.
    pub fn mark_attachment_class(&self, gid: GlyphId) -> u16 {
        match self.mark_attach_class_def() {
            Some(Ok(class_def)) => class_def.get(gid),
            _ => 0,
        }
    }

    /// Returns true if `gid` belongs to the mark glyph set at `set_index`.
    pub fn is_mark_glyph(&self, set_index: u16, gid: GlyphId) -> bool {
        let Some(Ok(sets)) = self.mark_glyph_sets_def() else {
            return false;
        };
        match sets.get(set_index as usize) {
            Ok(coverage) => coverage.get(gid).is_some(),
            Err(_) => false,
        }
    }
}

/// Attachment points of glyphs, indexed by coverage.
#[derive(Clone, Debug)]
pub struct AttachList<'a> {
    data: FontData<'a>,
    coverage_offset: u16,
    attach_point_offsets: Array<'a, u16>,
}

impl<'a> FontRead<'a> for AttachList<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let coverage_offset = data.read_at(0)?;
        let count: u16 = data.read_at(2)?;
        Ok(Self {
            data,
            coverage_offset,
            attach_point_offsets: data.read_array(4, count as usize)?,
        })
    }
}

impl<'a> AttachList<'a> {
    pub fn coverage(&self) -> Result<CoverageTable<'a>, ReadError> {
        self.data.resolve_offset(self.coverage_offset)
    }

    /// Returns the contour point indices used for attachment by `gid`.
    pub fn attach_points(&self, gid: GlyphId) -> Option<Array<'a, u16>> {
        let ix = self.coverage().ok()?.get(gid)?;
        let offset = self.attach_point_offsets.get(ix as usize)?;
        let count: u16 = self.data.read_at(offset as usize).ok()?;
        self.data
            .read_array(offset as usize + 2, count as usize)
            .ok()
    }
}

/// Ligature caret positions, indexed by coverage.
#[derive(Clone, Debug)]
pub struct LigCaretList<'a> {
    data: FontData<'a>,
    coverage_offset: u16,
    lig_glyph_offsets: Array<'a, u16>,
}

impl<'a> FontRead<'a> for LigCaretList<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let coverage_offset = data.read_at(0)?;
        let count: u16 = data.read_at(2)?;
        Ok(Self {
            data,
            coverage_offset,
            lig_glyph_offsets: data.read_array(4, count as usize)?,
        })
    }
}

/// A single caret position in one of its three formats.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CaretValue {
    Coordinate(i16),
    PointIndex(u16),
    CoordinateWithDevice { coordinate: i16, device_offset: u16 },
}

impl<'a> LigCaretList<'a> {
    pub fn coverage(&self) -> Result<CoverageTable<'a>, ReadError> {
        self.data.resolve_offset(self.coverage_offset)
    }

    /// Returns the caret values for the ligature glyph `gid`.
    pub fn carets(&self, gid: GlyphId) -> Option<Vec<CaretValue>> {
        let ix = self.coverage().ok()?.get(gid)?;
        let lig_offset = self.lig_glyph_offsets.get(ix as usize)? as usize;
        let lig_data = self.data.split_off(lig_offset)?;
        let count: u16 = lig_data.read_at(0).ok()?;
        let offsets: Array<u16> = lig_data.read_array(2, count as usize).ok()?;
        offsets
            .iter()
            .map(|offset| {
                let caret = lig_data.split_off(offset as usize)?;
                let format: u16 = caret.read_at(0).ok()?;
                match format {
                    1 => Some(CaretValue::Coordinate(caret.read_at(2).ok()?)),
                    2 => Some(CaretValue::PointIndex(caret.read_at(2).ok()?)),
                    3 => Some(CaretValue::CoordinateWithDevice {
                        coordinate: caret.read_at(2).ok()?,
                        device_offset: caret.read_at(4).ok()?,
                    }),
                    _ => None,
                }
            })
            .collect()
    }
}

/// The mark glyph sets used by lookups with a mark filtering set.
#[derive(Clone, Debug)]
pub struct MarkGlyphSets<'a> {
    data: FontData<'a>,
    coverage_offsets: Array<'a, u32>,
}

impl<'a> FontRead<'a> for MarkGlyphSets<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let format: u16 = data.read_at(0)?;
        if format != 1 {
            return Err(ReadError::InvalidFormat(format as _));
        }
        let count: u16 = data.read_at(2)?;
        Ok(Self {
            data,
            coverage_offsets: data.read_array(4, count as usize)?,
        })
    }
}

impl<'a> MarkGlyphSets<'a> {
    pub fn len(&self) -> usize {
        self.coverage_offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coverage_offsets.is_empty()
    }

    pub fn get(&self, index: usize) -> Result<CoverageTable<'a>, ReadError> {
        let offset = self
            .coverage_offsets
            .get(index)
            .ok_or(ReadError::OutOfBounds)?;
        self.data.resolve_offset(offset)
    }
}
