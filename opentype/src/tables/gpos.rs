//! the [GPOS] table
//!
//! [GPOS]: https://docs.microsoft.com/en-us/typography/opentype/spec/gpos

use std::ops::Deref;

use types::{GlyphId, Tag};

use super::layout::{ClassDef, CoverageTable, DeviceOrVariationIndex, LayoutHeader, Lookup, SequenceContext};
use crate::{Array, FontData, FontRead, ReadError};

/// 'GPOS'
pub const TAG: Tag = Tag::new(b"GPOS");

const EXTENSION_TYPE: u16 = 9;

/// The glyph positioning table.
#[derive(Clone, Debug)]
pub struct Gpos<'a>(LayoutHeader<'a>);

impl<'a> FontRead<'a> for Gpos<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        LayoutHeader::read(data).map(Self)
    }
}

impl<'a> Deref for Gpos<'a> {
    type Target = LayoutHeader<'a>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<'a> Gpos<'a> {
    /// Returns the lookup at `index` in the lookup list.
    pub fn lookup(&self, index: usize) -> Result<PositionLookup<'a>, ReadError> {
        self.lookup_list()?.get(index).map(PositionLookup)
    }
}

/// A GPOS lookup.
#[derive(Clone, Debug)]
pub struct PositionLookup<'a>(Lookup<'a>);

impl<'a> Deref for PositionLookup<'a> {
    type Target = Lookup<'a>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<'a> PositionLookup<'a> {
    /// Returns the subtable at `index`, following extension subtables.
    pub fn subtable(&self, index: usize) -> Result<PositionSubtable<'a>, ReadError> {
        let (lookup_type, data) = self.0.subtable_data(index, EXTENSION_TYPE)?;
        PositionSubtable::read(lookup_type, data)
    }

    pub fn subtables(&self) -> impl Iterator<Item = Result<PositionSubtable<'a>, ReadError>> + '_ {
        (0..self.subtable_count()).map(|ix| self.subtable(ix))
    }
}

/// A typed GPOS subtable.
#[derive(Clone, Debug)]
pub enum PositionSubtable<'a> {
    Single(SinglePos<'a>),
    Pair(PairPos<'a>),
    Cursive(CursivePos<'a>),
    MarkToBase(MarkAttachPos<'a>),
    MarkToLigature(MarkLigPos<'a>),
    MarkToMark(MarkAttachPos<'a>),
    Contextual(SequenceContext<'a>),
    ChainContextual(SequenceContext<'a>),
}

impl<'a> PositionSubtable<'a> {
    /// Reads a subtable of the given lookup type.
    pub fn read(lookup_type: u16, data: FontData<'a>) -> Result<Self, ReadError> {
        match lookup_type {
            1 => SinglePos::read(data).map(Self::Single),
            2 => PairPos::read(data).map(Self::Pair),
            3 => CursivePos::read(data).map(Self::Cursive),
            4 => MarkAttachPos::read(data).map(Self::MarkToBase),
            5 => MarkLigPos::read(data).map(Self::MarkToLigature),
            6 => MarkAttachPos::read(data).map(Self::MarkToMark),
            7 => SequenceContext::read(data).map(Self::Contextual),
            8 => SequenceContext::read_chained(data).map(Self::ChainContextual),
            other => Err(ReadError::InvalidFormat(other as _)),
        }
    }
}

/// The set of fields present in a [`ValueRecord`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ValueFormat(u16);

impl ValueFormat {
    pub const X_PLACEMENT: Self = Self(0x0001);
    pub const Y_PLACEMENT: Self = Self(0x0002);
    pub const X_ADVANCE: Self = Self(0x0004);
    pub const Y_ADVANCE: Self = Self(0x0008);
    pub const X_PLACEMENT_DEVICE: Self = Self(0x0010);
    pub const Y_PLACEMENT_DEVICE: Self = Self(0x0020);
    pub const X_ADVANCE_DEVICE: Self = Self(0x0040);
    pub const Y_ADVANCE_DEVICE: Self = Self(0x0080);

    pub fn from_bits_truncate(bits: u16) -> Self {
        Self(bits & 0x00FF)
    }

    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// The number of bytes a record in this format occupies.
    pub fn record_byte_len(self) -> usize {
        self.0.count_ones() as usize * 2
    }
}

/// A positioning adjustment.
///
/// Device offsets are relative to the subtable the record was read from and
/// are 0 when absent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ValueRecord {
    pub x_placement: Option<i16>,
    pub y_placement: Option<i16>,
    pub x_advance: Option<i16>,
    pub y_advance: Option<i16>,
    pub x_placement_device: u16,
    pub y_placement_device: u16,
    pub x_advance_device: u16,
    pub y_advance_device: u16,
}

impl ValueRecord {
    pub fn read(data: FontData, format: ValueFormat) -> Result<Self, ReadError> {
        let mut this = ValueRecord::default();
        let mut cursor = data.cursor();
        if format.contains(ValueFormat::X_PLACEMENT) {
            this.x_placement = Some(cursor.read()?);
        }
        if format.contains(ValueFormat::Y_PLACEMENT) {
            this.y_placement = Some(cursor.read()?);
        }
        if format.contains(ValueFormat::X_ADVANCE) {
            this.x_advance = Some(cursor.read()?);
        }
        if format.contains(ValueFormat::Y_ADVANCE) {
            this.y_advance = Some(cursor.read()?);
        }
        if format.contains(ValueFormat::X_PLACEMENT_DEVICE) {
            this.x_placement_device = cursor.read()?;
        }
        if format.contains(ValueFormat::Y_PLACEMENT_DEVICE) {
            this.y_placement_device = cursor.read()?;
        }
        if format.contains(ValueFormat::X_ADVANCE_DEVICE) {
            this.x_advance_device = cursor.read()?;
        }
        if format.contains(ValueFormat::Y_ADVANCE_DEVICE) {
            this.y_advance_device = cursor.read()?;
        }
        Ok(this)
    }

    pub fn x_advance_device<'a>(
        &self,
        data: FontData<'a>,
    ) -> Option<Result<DeviceOrVariationIndex<'a>, ReadError>> {
        data.resolve_nullable(self.x_advance_device)
    }

    pub fn y_advance_device<'a>(
        &self,
        data: FontData<'a>,
    ) -> Option<Result<DeviceOrVariationIndex<'a>, ReadError>> {
        data.resolve_nullable(self.y_advance_device)
    }

    pub fn x_placement_device<'a>(
        &self,
        data: FontData<'a>,
    ) -> Option<Result<DeviceOrVariationIndex<'a>, ReadError>> {
        data.resolve_nullable(self.x_placement_device)
    }

    pub fn y_placement_device<'a>(
        &self,
        data: FontData<'a>,
    ) -> Option<Result<DeviceOrVariationIndex<'a>, ReadError>> {
        data.resolve_nullable(self.y_placement_device)
    }
}

/// An attachment point.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Anchor<'a> {
    Format1 {
        x: i16,
        y: i16,
    },
    /// Coordinates hinted to the given contour point.
    Format2 {
        x: i16,
        y: i16,
        anchor_point: u16,
    },
    Format3 {
        x: i16,
        y: i16,
        x_device: Option<DeviceOrVariationIndex<'a>>,
        y_device: Option<DeviceOrVariationIndex<'a>>,
    },
}

impl<'a> FontRead<'a> for Anchor<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let format: u16 = data.read_at(0)?;
        let x = data.read_at(2)?;
        let y = data.read_at(4)?;
        match format {
            1 => Ok(Self::Format1 { x, y }),
            2 => Ok(Self::Format2 {
                x,
                y,
                anchor_point: data.read_at(6)?,
            }),
            3 => Ok(Self::Format3 {
                x,
                y,
                x_device: data.resolve_nullable(data.read_at::<u16>(6)?).transpose()?,
                y_device: data.resolve_nullable(data.read_at::<u16>(8)?).transpose()?,
            }),
            other => Err(ReadError::InvalidFormat(other as _)),
        }
    }
}

impl Anchor<'_> {
    /// The design space coordinates of the anchor.
    pub fn position(&self) -> (i16, i16) {
        match self {
            Self::Format1 { x, y } | Self::Format2 { x, y, .. } | Self::Format3 { x, y, .. } => {
                (*x, *y)
            }
        }
    }
}

/// Lookup type 1: adjust the position of a single glyph.
#[derive(Clone, Debug)]
pub struct SinglePos<'a> {
    data: FontData<'a>,
    format: u16,
    pub coverage: CoverageTable<'a>,
    value_format: ValueFormat,
    value_count: u16,
}

impl<'a> FontRead<'a> for SinglePos<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let format: u16 = data.read_at(0)?;
        let coverage = data.resolve_offset(data.read_at::<u16>(2)?)?;
        let value_format = ValueFormat::from_bits_truncate(data.read_at(4)?);
        let value_count = match format {
            1 => 1,
            2 => data.read_at(6)?,
            other => return Err(ReadError::InvalidFormat(other as _)),
        };
        let start = if format == 1 { 6 } else { 8 };
        data.check_len(start + value_format.record_byte_len() * value_count as usize)?;
        Ok(Self {
            data,
            format,
            coverage,
            value_format,
            value_count,
        })
    }
}

impl<'a> SinglePos<'a> {
    pub fn value_format(&self) -> ValueFormat {
        self.value_format
    }

    /// The subtable data that device offsets are relative to.
    pub fn offset_data(&self) -> FontData<'a> {
        self.data
    }

    /// Returns the adjustment for `gid`, if it is covered.
    pub fn value(&self, gid: GlyphId) -> Option<ValueRecord> {
        let ix = self.coverage.get(gid)?;
        let pos = if self.format == 1 {
            6
        } else {
            if ix >= self.value_count {
                return None;
            }
            8 + ix as usize * self.value_format.record_byte_len()
        };
        ValueRecord::read(self.data.split_off(pos)?, self.value_format).ok()
    }
}

/// Lookup type 2: adjust the positions of a pair of glyphs.
#[derive(Clone, Debug)]
pub enum PairPos<'a> {
    /// Adjustments for specific glyph pairs.
    Format1 {
        data: FontData<'a>,
        coverage: CoverageTable<'a>,
        value_format1: ValueFormat,
        value_format2: ValueFormat,
        pair_set_offsets: Array<'a, u16>,
    },
    /// Adjustments by glyph class.
    Format2 {
        data: FontData<'a>,
        coverage: CoverageTable<'a>,
        value_format1: ValueFormat,
        value_format2: ValueFormat,
        class_def1: ClassDef<'a>,
        class_def2: ClassDef<'a>,
        class1_count: u16,
        class2_count: u16,
    },
}

impl<'a> FontRead<'a> for PairPos<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let format: u16 = data.read_at(0)?;
        let coverage = data.resolve_offset(data.read_at::<u16>(2)?)?;
        let value_format1 = ValueFormat::from_bits_truncate(data.read_at(4)?);
        let value_format2 = ValueFormat::from_bits_truncate(data.read_at(6)?);
        match format {
            1 => {
                let count: u16 = data.read_at(8)?;
                Ok(Self::Format1 {
                    data,
                    coverage,
                    value_format1,
                    value_format2,
                    pair_set_offsets: data.read_array(10, count as usize)?,
                })
            }
            2 => {
                let class1_count: u16 = data.read_at(12)?;
                let class2_count: u16 = data.read_at(14)?;
                let record_len = value_format1.record_byte_len() + value_format2.record_byte_len();
                data.check_len(16 + class1_count as usize * class2_count as usize * record_len)?;
                Ok(Self::Format2 {
                    data,
                    coverage,
                    value_format1,
                    value_format2,
                    class_def1: data.resolve_offset(data.read_at::<u16>(8)?)?,
                    class_def2: data.resolve_offset(data.read_at::<u16>(10)?)?,
                    class1_count,
                    class2_count,
                })
            }
            other => Err(ReadError::InvalidFormat(other as _)),
        }
    }
}

impl<'a> PairPos<'a> {
    pub fn coverage(&self) -> &CoverageTable<'a> {
        match self {
            Self::Format1 { coverage, .. } | Self::Format2 { coverage, .. } => coverage,
        }
    }

    /// The subtable data that device offsets are relative to.
    pub fn offset_data(&self) -> FontData<'a> {
        match self {
            Self::Format1 { data, .. } | Self::Format2 { data, .. } => *data,
        }
    }

    /// Returns the adjustments for the first and second glyph of a pair.
    pub fn adjustment(&self, first: GlyphId, second: GlyphId) -> Option<(ValueRecord, ValueRecord)> {
        match self {
            Self::Format1 {
                data,
                coverage,
                value_format1,
                value_format2,
                pair_set_offsets,
            } => {
                let ix = coverage.get(first)?;
                let set_offset = pair_set_offsets.get(ix as usize)? as usize;
                let set = data.split_off(set_offset)?;
                let count: u16 = set.read_at(0).ok()?;
                let record_len =
                    2 + value_format1.record_byte_len() + value_format2.record_byte_len();
                let second = u16::try_from(second.to_u32()).ok()?;
                // pair value records are sorted by second glyph
                let (mut lo, mut hi) = (0usize, count as usize);
                while lo < hi {
                    let mid = (lo + hi) / 2;
                    let pos = 2 + mid * record_len;
                    let glyph: u16 = set.read_at(pos).ok()?;
                    match glyph.cmp(&second) {
                        std::cmp::Ordering::Less => lo = mid + 1,
                        std::cmp::Ordering::Greater => hi = mid,
                        std::cmp::Ordering::Equal => {
                            let first_pos = pos + 2;
                            let second_pos = first_pos + value_format1.record_byte_len();
                            return Some((
                                ValueRecord::read(set.split_off(first_pos)?, *value_format1).ok()?,
                                ValueRecord::read(set.split_off(second_pos)?, *value_format2)
                                    .ok()?,
                            ));
                        }
                    }
                }
                None
            }
            Self::Format2 {
                data,
                coverage,
                value_format1,
                value_format2,
                class_def1,
                class_def2,
                class1_count,
                class2_count,
            } => {
                coverage.get(first)?;
                let class1 = class_def1.get(first);
                let class2 = class_def2.get(second);
                if class1 >= *class1_count || class2 >= *class2_count {
                    return None;
                }
                let len1 = value_format1.record_byte_len();
                let record_len = len1 + value_format2.record_byte_len();
                let pos = 16
                    + (class1 as usize * *class2_count as usize + class2 as usize) * record_len;
                Some((
                    ValueRecord::read(data.split_off(pos)?, *value_format1).ok()?,
                    ValueRecord::read(data.split_off(pos + len1)?, *value_format2).ok()?,
                ))
            }
        }
    }
}

/// Lookup type 3: connect the exit anchor of a glyph to the entry anchor of
/// the next.
#[derive(Clone, Debug)]
pub struct CursivePos<'a> {
    data: FontData<'a>,
    pub coverage: CoverageTable<'a>,
    count: u16,
}

impl<'a> FontRead<'a> for CursivePos<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let format: u16 = data.read_at(0)?;
        if format != 1 {
            return Err(ReadError::InvalidFormat(format as _));
        }
        let count: u16 = data.read_at(4)?;
        data.check_len(6 + count as usize * 4)?;
        Ok(Self {
            data,
            coverage: data.resolve_offset(data.read_at::<u16>(2)?)?,
            count,
        })
    }
}

impl<'a> CursivePos<'a> {
    /// Returns the entry and exit anchors of `gid`, if it is covered.
    #[allow(clippy::type_complexity)]
    pub fn entry_exit(
        &self,
        gid: GlyphId,
    ) -> Option<(
        Option<Result<Anchor<'a>, ReadError>>,
        Option<Result<Anchor<'a>, ReadError>>,
    )> {
        let ix = self.coverage.get(gid)?;
        if ix >= self.count {
            return None;
        }
        let pos = 6 + ix as usize * 4;
        let entry: u16 = self.data.read_at(pos).ok()?;
        let exit: u16 = self.data.read_at(pos + 2).ok()?;
        Some((
            self.data.resolve_nullable(entry),
            self.data.resolve_nullable(exit),
        ))
    }
}

/// A list of marks with their class and anchor.
#[derive(Clone, Debug)]
struct MarkArray<'a> {
    data: FontData<'a>,
    count: u16,
}

impl<'a> FontRead<'a> for MarkArray<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let count: u16 = data.read_at(0)?;
        data.check_len(2 + count as usize * 4)?;
        Ok(Self { data, count })
    }
}

impl<'a> MarkArray<'a> {
    fn get(&self, index: u16) -> Option<(u16, Result<Anchor<'a>, ReadError>)> {
        if index >= self.count {
            return None;
        }
        let pos = 2 + index as usize * 4;
        let class: u16 = self.data.read_at(pos).ok()?;
        let offset: u16 = self.data.read_at(pos + 2).ok()?;
        Some((class, self.data.resolve_offset(offset)))
    }
}

/// A matrix of anchor offsets: one row per glyph, one column per mark class.
#[derive(Clone, Debug)]
struct AnchorMatrix<'a> {
    data: FontData<'a>,
    rows: u16,
    columns: u16,
}

impl<'a> AnchorMatrix<'a> {
    fn read(data: FontData<'a>, columns: u16) -> Result<Self, ReadError> {
        let rows: u16 = data.read_at(0)?;
        data.check_len(2 + rows as usize * columns as usize * 2)?;
        Ok(Self {
            data,
            rows,
            columns,
        })
    }

    fn get(&self, row: u16, column: u16) -> Option<Result<Anchor<'a>, ReadError>> {
        if row >= self.rows || column >= self.columns {
            return None;
        }
        let pos = 2 + (row as usize * self.columns as usize + column as usize) * 2;
        let offset: u16 = self.data.read_at(pos).ok()?;
        self.data.resolve_nullable(offset)
    }
}

/// Lookup types 4 and 6: attach a mark to a base glyph or to another mark.
#[derive(Clone, Debug)]
pub struct MarkAttachPos<'a> {
    pub mark_coverage: CoverageTable<'a>,
    pub base_coverage: CoverageTable<'a>,
    mark_class_count: u16,
    marks: MarkArray<'a>,
    bases: AnchorMatrix<'a>,
}

impl<'a> FontRead<'a> for MarkAttachPos<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let format: u16 = data.read_at(0)?;
        if format != 1 {
            return Err(ReadError::InvalidFormat(format as _));
        }
        let mark_class_count: u16 = data.read_at(6)?;
        let base_array = data
            .split_off(data.read_at::<u16>(10)? as usize)
            .ok_or(ReadError::OutOfBounds)?;
        Ok(Self {
            mark_coverage: data.resolve_offset(data.read_at::<u16>(2)?)?,
            base_coverage: data.resolve_offset(data.read_at::<u16>(4)?)?,
            mark_class_count,
            marks: data.resolve_offset(data.read_at::<u16>(8)?)?,
            bases: AnchorMatrix::read(base_array, mark_class_count)?,
        })
    }
}

impl<'a> MarkAttachPos<'a> {
    pub fn mark_class_count(&self) -> u16 {
        self.mark_class_count
    }

    /// Returns the class and anchor of the mark `gid`.
    pub fn mark_anchor(&self, gid: GlyphId) -> Option<(u16, Anchor<'a>)> {
        let ix = self.mark_coverage.get(gid)?;
        let (class, anchor) = self.marks.get(ix)?;
        Some((class, anchor.ok()?))
    }

    /// Returns the anchor of the base (or mark) `gid` for marks of `class`.
    pub fn base_anchor(&self, gid: GlyphId, class: u16) -> Option<Anchor<'a>> {
        let ix = self.base_coverage.get(gid)?;
        self.bases.get(ix, class)?.ok()
    }
}

/// Lookup type 5: attach a mark to a component of a ligature.
#[derive(Clone, Debug)]
pub struct MarkLigPos<'a> {
    pub mark_coverage: CoverageTable<'a>,
    pub ligature_coverage: CoverageTable<'a>,
    mark_class_count: u16,
    marks: MarkArray<'a>,
    ligature_array: FontData<'a>,
}

impl<'a> FontRead<'a> for MarkLigPos<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let format: u16 = data.read_at(0)?;
        if format != 1 {
            return Err(ReadError::InvalidFormat(format as _));
        }
        let ligature_array = data
            .split_off(data.read_at::<u16>(10)? as usize)
            .ok_or(ReadError::OutOfBounds)?;
        let count: u16 = ligature_array.read_at(0)?;
        ligature_array.check_len(2 + count as usize * 2)?;
        Ok(Self {
            mark_coverage: data.resolve_offset(data.read_at::<u16>(2)?)?,
            ligature_coverage: data.resolve_offset(data.read_at::<u16>(4)?)?,
            mark_class_count: data.read_at(6)?,
            marks: data.resolve_offset(data.read_at::<u16>(8)?)?,
            ligature_array,
        })
    }
}

impl<'a> MarkLigPos<'a> {
    pub fn mark_class_count(&self) -> u16 {
        self.mark_class_count
    }

    /// Returns the class and anchor of the mark `gid`.
    pub fn mark_anchor(&self, gid: GlyphId) -> Option<(u16, Anchor<'a>)> {
        let ix = self.mark_coverage.get(gid)?;
        let (class, anchor) = self.marks.get(ix)?;
        Some((class, anchor.ok()?))
    }

    /// Returns the number of components of the ligature `gid`.
    pub fn component_count(&self, gid: GlyphId) -> Option<u16> {
        let attach = self.ligature_attach(gid)?;
        Some(attach.rows)
    }

    /// Returns the anchor on `component` of the ligature `gid` for marks of
    /// `class`.
    pub fn ligature_anchor(&self, gid: GlyphId, component: u16, class: u16) -> Option<Anchor<'a>> {
        self.ligature_attach(gid)?.get(component, class)?.ok()
    }

    fn ligature_attach(&self, gid: GlyphId) -> Option<AnchorMatrix<'a>> {
        let ix = self.ligature_coverage.get(gid)?;
        let offset: u16 = self.ligature_array.read_at(2 + ix as usize * 2).ok()?;
        let data = self.ligature_array.split_off(offset as usize)?;
        AnchorMatrix::read(data, self.mark_class_count).ok()
    }
}

#[cfg(test)]
mod tests {
    use font_test_data::{be_buffer, bebuffer::BeBuffer};

    use super::*;

    #[test]
    fn single_positioning() {
        // format 2, x advance only, glyphs 3 and 4
        let buf = be_buffer! {
            2u16, 12u16, 0x0004u16, 2u16, [(-50i16), 25i16],
            1u16, 2u16, [3u16, 4]
        };
        let pos = SinglePos::read(FontData::new(&buf)).unwrap();
        assert_eq!(pos.value(GlyphId::new(4)).unwrap().x_advance, Some(25));
        assert_eq!(pos.value(GlyphId::new(3)).unwrap().x_advance, Some(-50));
        assert_eq!(pos.value(GlyphId::new(3)).unwrap().y_advance, None);
        assert!(pos.value(GlyphId::new(5)).is_none());
        // a truncated record array is rejected
        let short = be_buffer! { 2u16, 10u16, 0x0004u16, 4u16, [1i16], 1u16, 0u16 };
        assert!(SinglePos::read(FontData::new(&short)).is_err());
    }

    #[test]
    fn pair_positioning_by_glyph() {
        // A V -> -80 on the first glyph; A W -> -40
        let buf = be_buffer! {
            1u16, 12u16, 0x0004u16, 0u16, 1u16, [18u16],
            1u16, 1u16, [36u16],
            // pair set at 18
            2u16,
            57u16, (-80i16),
            58u16, (-40i16)
        };
        let pair = PairPos::read(FontData::new(&buf)).unwrap();
        let (first, second) = pair.adjustment(GlyphId::new(36), GlyphId::new(57)).unwrap();
        assert_eq!(first.x_advance, Some(-80));
        assert_eq!(second, ValueRecord::default());
        let (first, _) = pair.adjustment(GlyphId::new(36), GlyphId::new(58)).unwrap();
        assert_eq!(first.x_advance, Some(-40));
        assert!(pair.adjustment(GlyphId::new(36), GlyphId::new(59)).is_none());
        assert!(pair.adjustment(GlyphId::new(37), GlyphId::new(57)).is_none());
    }

    #[test]
    fn pair_positioning_by_class() {
        let buf = be_buffer! {
            2u16, 24u16, 0x0004u16, 0u16, 30u16, 38u16, 2u16, 2u16,
            // class1 x class2 matrix
            [0i16, 0, 0, (-30i16)],
            // coverage at 24
            1u16, 1u16, [10u16],
            // class def 1 at 30: glyph 10 is class 1
            1u16, 10u16, 1u16, [1u16],
            // class def 2 at 38: glyph 20 is class 1
            1u16, 20u16, 1u16, [1u16]
        };
        let pair = PairPos::read(FontData::new(&buf)).unwrap();
        let (first, _) = pair.adjustment(GlyphId::new(10), GlyphId::new(20)).unwrap();
        assert_eq!(first.x_advance, Some(-30));
        let (first, _) = pair.adjustment(GlyphId::new(10), GlyphId::new(21)).unwrap();
        assert_eq!(first.x_advance, Some(0));
        assert!(pair.adjustment(GlyphId::new(11), GlyphId::new(20)).is_none());
    }

    #[test]
    fn anchors() {
        let buf = be_buffer! { 3u16, 100i16, (-20i16), 10u16, 0u16, 11u16, 13u16, 1u16, 0x1000u16 };
        let anchor = Anchor::read(FontData::new(&buf)).unwrap();
        assert_eq!(anchor.position(), (100, -20));
        let Anchor::Format3 { x_device, y_device, .. } = &anchor else {
            panic!("wrong format");
        };
        assert!(y_device.is_none());
        assert_eq!(x_device.as_ref().unwrap().device_delta(12), Some(1));
    }

    #[test]
    fn cursive_attachment() {
        let buf = be_buffer! {
            1u16, 10u16, 1u16, 16u16, 0u16,
            // coverage at 10
            1u16, 1u16, [5u16],
            // entry anchor at 16
            1u16, 10i16, 20i16
        };
        let pos = CursivePos::read(FontData::new(&buf)).unwrap();
        let (entry, exit) = pos.entry_exit(GlyphId::new(5)).unwrap();
        assert_eq!(entry.unwrap().unwrap().position(), (10, 20));
        assert!(exit.is_none());
        assert!(pos.entry_exit(GlyphId::new(6)).is_none());
    }

    /// Mark glyph 100 (class 0) attaches to base glyph 1 at (300, 600).
    fn mark_to_base() -> BeBuffer {
        be_buffer! {
            1u16, 12u16, 18u16, 1u16, 24u16, 36u16,
            // mark coverage at 12
            1u16, 1u16, [100u16],
            // base coverage at 18
            1u16, 1u16, [1u16],
            // mark array at 24: class 0, anchor at +6
            1u16, 0u16, 6u16,
            1u16, 50i16, 0i16,
            // base array at 36: one row, anchor at +4
            1u16, [4u16],
            1u16, 300i16, 600i16
        }
    }

    #[test]
    fn mark_attachment() {
        let buf = mark_to_base();
        let subtable = PositionSubtable::read(4, FontData::new(&buf)).unwrap();
        let PositionSubtable::MarkToBase(pos) = &subtable else {
            panic!("wrong type");
        };
        let (class, mark) = pos.mark_anchor(GlyphId::new(100)).unwrap();
        assert_eq!((class, mark.position()), (0, (50, 0)));
        let base = pos.base_anchor(GlyphId::new(1), class).unwrap();
        assert_eq!(base.position(), (300, 600));
        assert!(pos.base_anchor(GlyphId::new(1), 1).is_none());
        assert!(pos.mark_anchor(GlyphId::new(1)).is_none());
    }

    #[test]
    fn ligature_attachment() {
        let buf = be_buffer! {
            1u16, 12u16, 18u16, 1u16, 24u16, 36u16,
            1u16, 1u16, [100u16],
            1u16, 1u16, [7u16],
            // mark array at 24
            1u16, 0u16, 6u16,
            1u16, 0i16, 0i16,
            // ligature array at 36 with one ligature attach at +4
            1u16, [4u16],
            // two components, the second without an anchor
            2u16, [6u16, 0u16],
            1u16, 120i16, 500i16
        };
        let pos = MarkLigPos::read(FontData::new(&buf)).unwrap();
        assert_eq!(pos.component_count(GlyphId::new(7)), Some(2));
        let anchor = pos.ligature_anchor(GlyphId::new(7), 0, 0).unwrap();
        assert_eq!(anchor.position(), (120, 500));
        assert!(pos.ligature_anchor(GlyphId::new(7), 1, 0).is_none());
        assert!(pos.ligature_anchor(GlyphId::new(7), 2, 0).is_none());
    }

    #[test]
    fn extension_lookup() {
        let buf = be_buffer! {
            1u16, 0u16, 10u16, 12u16, 14u16,
            0u16, 0u16,
            // lookup list at 14
            1u16, [4u16],
            // lookup at 18: extension wrapping a single positioning subtable
            9u16, 0u16, 1u16, [8u16],
            1u16, 1u16, 8u32,
            1u16, 8u16, 0x0004u16, 15i16,
            1u16, 1u16, [2u16]
        };
        let gpos = Gpos::read(FontData::new(&buf)).unwrap();
        let lookup = gpos.lookup(0).unwrap();
        assert_eq!(lookup.lookup_type(), 9);
        let PositionSubtable::Single(single) = lookup.subtable(0).unwrap() else {
            panic!("wrong type");
        };
        assert_eq!(single.value(GlyphId::new(2)).unwrap().x_advance, Some(15));
    }
}
