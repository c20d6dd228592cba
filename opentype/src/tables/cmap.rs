//! The [cmap](https://docs.microsoft.com/en-us/typography/opentype/spec/cmap) table

use std::{cmp::Ordering, ops::Range};

use types::{GlyphId, Scalar, Tag, Uint24};

use crate::{record, Array, FontData, FontRead, ReadError, RecordArray};

/// 'cmap'
pub const TAG: Tag = Tag::new(b"cmap");

/// The largest valid unicode scalar value; group ranges are clamped to it.
const MAX_CODEPOINT: u32 = 0x10FFFF;

record! {
    /// Locates the subtable for a platform and encoding pair.
    pub struct EncodingRecord {
        pub platform_id: u16,
        pub encoding_id: u16,
        /// Byte offset from the beginning of the table.
        pub subtable_offset: u32,
    }
}

impl EncodingRecord {
    /// Resolve the subtable referenced by this record.
    pub fn subtable<'a>(&self, cmap_data: FontData<'a>) -> Result<CmapSubtable<'a>, ReadError> {
        cmap_data.resolve_offset(self.subtable_offset)
    }
}

/// [cmap](https://docs.microsoft.com/en-us/typography/opentype/spec/cmap#overview)
#[derive(Clone, Debug)]
pub struct Cmap<'a> {
    data: FontData<'a>,
    encoding_records: RecordArray<'a, EncodingRecord>,
}

impl<'a> FontRead<'a> for Cmap<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        data.check_len(4)?;
        let num_tables: u16 = data.read_at(2)?;
        let encoding_records = data.read_records(4, num_tables as usize)?;
        Ok(Cmap {
            data,
            encoding_records,
        })
    }
}

impl<'a> Cmap<'a> {
    pub fn version(&self) -> u16 {
        self.data.read_at(0).unwrap_or_default()
    }

    pub fn encoding_records(&self) -> RecordArray<'a, EncodingRecord> {
        self.encoding_records
    }

    /// The data that subtable offsets are relative to.
    pub fn offset_data(&self) -> FontData<'a> {
        self.data
    }

    /// Map a codepoint to a nominal glyph identifier
    ///
    /// This uses the first available subtable that provides a valid mapping.
    pub fn map_codepoint(&self, codepoint: impl Into<u32>) -> Option<GlyphId> {
        let codepoint = codepoint.into();
        self.encoding_records
            .iter()
            .filter_map(|record| record.subtable(self.data).ok())
            .find_map(|subtable| subtable.map_codepoint(codepoint))
    }
}

/// A format discriminated cmap subtable.
#[derive(Clone, Debug)]
pub enum CmapSubtable<'a> {
    Format0(Cmap0<'a>),
    Format4(Cmap4<'a>),
    Format6(Cmap6<'a>),
    Format10(Cmap10<'a>),
    Format12(Cmap12<'a>),
    Format13(Cmap13<'a>),
    Format14(Cmap14<'a>),
}

impl<'a> FontRead<'a> for CmapSubtable<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let format: u16 = data.read_at(0)?;
        match format {
            0 => Cmap0::read(data).map(Self::Format0),
            4 => Cmap4::read(data).map(Self::Format4),
            6 => Cmap6::read(data).map(Self::Format6),
            10 => Cmap10::read(data).map(Self::Format10),
            12 => Cmap12::read(data).map(Self::Format12),
            13 => Cmap13::read(data).map(Self::Format13),
            14 => Cmap14::read(data).map(Self::Format14),
            other => Err(ReadError::InvalidFormat(other.into())),
        }
    }
}

impl<'a> CmapSubtable<'a> {
    pub fn format(&self) -> u16 {
        match self {
            Self::Format0(_) => 0,
            Self::Format4(_) => 4,
            Self::Format6(_) => 6,
            Self::Format10(_) => 10,
            Self::Format12(_) => 12,
            Self::Format13(_) => 13,
            Self::Format14(_) => 14,
        }
    }

    /// Maps a codepoint to a nominal glyph identifier.
    ///
    /// Format 14 subtables never produce a nominal mapping.
    pub fn map_codepoint(&self, codepoint: impl Into<u32>) -> Option<GlyphId> {
        let codepoint = codepoint.into();
        match self {
            Self::Format0(t) => t.map_codepoint(codepoint),
            Self::Format4(t) => t.map_codepoint(codepoint),
            Self::Format6(t) => t.map_codepoint(codepoint),
            Self::Format10(t) => t.map_codepoint(codepoint),
            Self::Format12(t) => t.map_codepoint(codepoint),
            Self::Format13(t) => t.map_codepoint(codepoint),
            Self::Format14(_) => None,
        }
    }

    /// Returns an iterator over all (codepoint, glyph identifier) pairs
    /// in the subtable.
    pub fn iter(&self) -> CmapIter<'a> {
        match self {
            Self::Format0(t) => CmapIter::Dense(t.iter()),
            Self::Format4(t) => CmapIter::Format4(t.iter()),
            Self::Format6(t) => CmapIter::Dense(t.iter()),
            Self::Format10(t) => CmapIter::Dense(t.iter()),
            Self::Format12(t) => CmapIter::Groups(t.iter()),
            Self::Format13(t) => CmapIter::Groups(t.iter()),
            Self::Format14(_) => CmapIter::Empty,
        }
    }
}

/// Iterator over the nominal mappings of any subtable format.
#[derive(Clone)]
pub enum CmapIter<'a> {
    Empty,
    Dense(DenseIter<'a>),
    Format4(Cmap4Iter<'a>),
    Groups(GroupIter<'a>),
}

impl Iterator for CmapIter<'_> {
    type Item = (u32, GlyphId);

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Self::Empty => None,
            Self::Dense(iter) => iter.next(),
            Self::Format4(iter) => iter.next(),
            Self::Groups(iter) => iter.next(),
        }
    }
}

/// Glyph ids stored as a dense array indexed by `codepoint - first_code`.
#[derive(Clone, Copy, Debug)]
enum DenseGlyphs<'a> {
    Bytes(Array<'a, u8>),
    Words(Array<'a, u16>),
}

impl DenseGlyphs<'_> {
    fn len(&self) -> usize {
        match self {
            Self::Bytes(a) => a.len(),
            Self::Words(a) => a.len(),
        }
    }

    fn get(&self, index: usize) -> Option<GlyphId> {
        let gid = match self {
            Self::Bytes(a) => a.get(index)? as u32,
            Self::Words(a) => a.get(index)? as u32,
        };
        (gid != 0).then_some(GlyphId::new(gid))
    }
}

/// Iterator over subtables storing a contiguous glyph array (formats 0, 6
/// and 10).
#[derive(Clone)]
pub struct DenseIter<'a> {
    first_code: u32,
    glyphs: DenseGlyphs<'a>,
    pos: usize,
}

impl Iterator for DenseIter<'_> {
    type Item = (u32, GlyphId);

    fn next(&mut self) -> Option<Self::Item> {
        while self.pos < self.glyphs.len() {
            let ix = self.pos;
            self.pos += 1;
            if let Some(gid) = self.glyphs.get(ix) {
                return Some((self.first_code + ix as u32, gid));
            }
        }
        None
    }
}

fn dense_lookup(first_code: u32, glyphs: DenseGlyphs, codepoint: u32) -> Option<GlyphId> {
    let ix = codepoint.checked_sub(first_code)?;
    glyphs.get(ix as usize)
}

/// [cmap Format 0](https://docs.microsoft.com/en-us/typography/opentype/spec/cmap#format-0-byte-encoding-table): Byte encoding table
#[derive(Clone, Debug)]
pub struct Cmap0<'a> {
    glyph_id_array: Array<'a, u8>,
}

impl<'a> FontRead<'a> for Cmap0<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        data.check_len(6 + 256)?;
        let glyph_id_array = data.read_array(6, 256)?;
        Ok(Cmap0 { glyph_id_array })
    }
}

impl<'a> Cmap0<'a> {
    pub fn glyph_id_array(&self) -> Array<'a, u8> {
        self.glyph_id_array
    }

    pub fn map_codepoint(&self, codepoint: impl Into<u32>) -> Option<GlyphId> {
        dense_lookup(0, DenseGlyphs::Bytes(self.glyph_id_array), codepoint.into())
    }

    pub fn iter(&self) -> DenseIter<'a> {
        DenseIter {
            first_code: 0,
            glyphs: DenseGlyphs::Bytes(self.glyph_id_array),
            pos: 0,
        }
    }
}

/// [cmap Format 4](https://docs.microsoft.com/en-us/typography/opentype/spec/cmap#format-4-segment-mapping-to-delta-values): Segment mapping to delta values
#[derive(Clone, Debug)]
pub struct Cmap4<'a> {
    end_code: Array<'a, u16>,
    start_code: Array<'a, u16>,
    id_delta: Array<'a, i16>,
    id_range_offsets: Array<'a, u16>,
    glyph_id_array: Array<'a, u16>,
}

impl<'a> FontRead<'a> for Cmap4<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        data.check_len(14)?;
        let seg_count_x2: u16 = data.read_at(6)?;
        let seg_count = (seg_count_x2 / 2) as usize;
        let mut cursor = data.cursor();
        cursor.advance_by(14);
        let end_code = cursor.read_array(seg_count)?;
        cursor.advance::<u16>();
        let start_code = cursor.read_array(seg_count)?;
        let id_delta = cursor.read_array(seg_count)?;
        let id_range_offsets = cursor.read_array(seg_count)?;
        let glyph_id_array = Array::new(cursor.remaining().unwrap_or_default().as_bytes());
        Ok(Cmap4 {
            end_code,
            start_code,
            id_delta,
            id_range_offsets,
            glyph_id_array,
        })
    }
}

impl<'a> Cmap4<'a> {
    pub fn seg_count(&self) -> usize {
        self.end_code.len()
    }

    pub fn end_code(&self) -> Array<'a, u16> {
        self.end_code
    }

    pub fn start_code(&self) -> Array<'a, u16> {
        self.start_code
    }

    pub fn id_delta(&self) -> Array<'a, i16> {
        self.id_delta
    }

    pub fn id_range_offsets(&self) -> Array<'a, u16> {
        self.id_range_offsets
    }

    pub fn glyph_id_array(&self) -> Array<'a, u16> {
        self.glyph_id_array
    }

    /// Maps a codepoint to a nominal glyph identifier.
    pub fn map_codepoint(&self, codepoint: impl Into<u32>) -> Option<GlyphId> {
        let codepoint = codepoint.into();
        if codepoint > 0xFFFF {
            return None;
        }
        let codepoint = codepoint as u16;
        let mut lo = 0;
        let mut hi = self.seg_count();
        while lo < hi {
            let i = (lo + hi) / 2;
            let start_code = self.start_code.get(i)?;
            if codepoint < start_code {
                hi = i;
            } else if codepoint > self.end_code.get(i)? {
                lo = i + 1;
            } else {
                return self.lookup_glyph_id(codepoint, i, start_code);
            }
        }
        None
    }

    /// Returns an iterator over all (codepoint, glyph identifier) pairs
    /// in the subtable.
    pub fn iter(&self) -> Cmap4Iter<'a> {
        Cmap4Iter::new(self.clone())
    }

    /// Does the final phase of glyph id lookup.
    ///
    /// Shared between Self::map and Cmap4Iter.
    fn lookup_glyph_id(&self, codepoint: u16, index: usize, start_code: u16) -> Option<GlyphId> {
        let delta = self.id_delta.get(index)? as i32;
        let range_offset = self.id_range_offsets.get(index)? as usize;
        let gid = if range_offset == 0 {
            (codepoint as i32 + delta) as u16
        } else {
            // the offset is relative to the location of the range offset
            // itself, which is `seg_count - index` words before the glyph
            // id array
            let offset = (range_offset / 2 + (codepoint - start_code) as usize)
                .checked_sub(self.seg_count() - index)?;
            let gid = self.glyph_id_array.get(offset)?;
            if gid == 0 {
                return None;
            }
            (gid as i32 + delta) as u16
        };
        (gid != 0).then_some(GlyphId::new(gid as u32))
    }

    /// Returns the [start_code, end_code] range at the given index.
    fn code_range(&self, index: usize) -> Option<Range<u32>> {
        // Extend to u32 to ensure we don't overflow on the end + 1 bound
        // below.
        let start = self.start_code.get(index)? as u32;
        let end = self.end_code.get(index)? as u32;
        // Use end + 1 here because the range in the table is inclusive
        Some(start..end + 1)
    }
}

/// Iterator over all (codepoint, glyph identifier) pairs in
/// the subtable.
#[derive(Clone)]
pub struct Cmap4Iter<'a> {
    subtable: Cmap4<'a>,
    cur_range: Range<u32>,
    cur_start_code: u16,
    cur_range_ix: usize,
}

impl<'a> Cmap4Iter<'a> {
    fn new(subtable: Cmap4<'a>) -> Self {
        let cur_range = subtable.code_range(0).unwrap_or_default();
        let cur_start_code = cur_range.start as u16;
        Self {
            subtable,
            cur_range,
            cur_start_code,
            cur_range_ix: 0,
        }
    }
}

impl Iterator for Cmap4Iter<'_> {
    type Item = (u32, GlyphId);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(codepoint) = self.cur_range.next() {
                // The table might explicitly map some codepoints to 0. Avoid
                // returning those here.
                let Some(glyph_id) = self.subtable.lookup_glyph_id(
                    codepoint as u16,
                    self.cur_range_ix,
                    self.cur_start_code,
                ) else {
                    continue;
                };
                // segments overlapping an earlier one are shadowed by it
                if self.subtable.map_codepoint(codepoint) != Some(glyph_id) {
                    continue;
                }
                return Some((codepoint, glyph_id));
            } else {
                self.cur_range_ix += 1;
                let next_range = self.subtable.code_range(self.cur_range_ix)?;
                // Skip overlapping ranges, keeping the iteration monotonic
                self.cur_range = next_range.start.max(self.cur_range.end)..next_range.end;
                self.cur_start_code = next_range.start as u16;
            }
        }
    }
}

/// [cmap Format 6](https://docs.microsoft.com/en-us/typography/opentype/spec/cmap#format-6-trimmed-table-mapping): Trimmed table mapping
#[derive(Clone, Debug)]
pub struct Cmap6<'a> {
    first_code: u16,
    glyph_id_array: Array<'a, u16>,
}

impl<'a> FontRead<'a> for Cmap6<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        data.check_len(10)?;
        let first_code = data.read_at(6)?;
        let entry_count: u16 = data.read_at(8)?;
        let glyph_id_array = data.read_array(10, entry_count as usize)?;
        Ok(Cmap6 {
            first_code,
            glyph_id_array,
        })
    }
}

impl<'a> Cmap6<'a> {
    pub fn first_code(&self) -> u16 {
        self.first_code
    }

    pub fn glyph_id_array(&self) -> Array<'a, u16> {
        self.glyph_id_array
    }

    pub fn map_codepoint(&self, codepoint: impl Into<u32>) -> Option<GlyphId> {
        dense_lookup(
            self.first_code as u32,
            DenseGlyphs::Words(self.glyph_id_array),
            codepoint.into(),
        )
    }

    pub fn iter(&self) -> DenseIter<'a> {
        DenseIter {
            first_code: self.first_code as u32,
            glyphs: DenseGlyphs::Words(self.glyph_id_array),
            pos: 0,
        }
    }
}

/// [cmap Format 10](https://docs.microsoft.com/en-us/typography/opentype/spec/cmap#format-10-trimmed-array): Trimmed array
#[derive(Clone, Debug)]
pub struct Cmap10<'a> {
    start_char_code: u32,
    glyph_id_array: Array<'a, u16>,
}

impl<'a> FontRead<'a> for Cmap10<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        data.check_len(20)?;
        let start_char_code = data.read_at(12)?;
        let num_chars: u32 = data.read_at(16)?;
        let glyph_id_array = data.read_array(20, num_chars as usize)?;
        Ok(Cmap10 {
            start_char_code,
            glyph_id_array,
        })
    }
}

impl<'a> Cmap10<'a> {
    pub fn start_char_code(&self) -> u32 {
        self.start_char_code
    }

    pub fn glyph_id_array(&self) -> Array<'a, u16> {
        self.glyph_id_array
    }

    pub fn map_codepoint(&self, codepoint: impl Into<u32>) -> Option<GlyphId> {
        dense_lookup(
            self.start_char_code,
            DenseGlyphs::Words(self.glyph_id_array),
            codepoint.into(),
        )
    }

    pub fn iter(&self) -> DenseIter<'a> {
        DenseIter {
            first_code: self.start_char_code,
            glyphs: DenseGlyphs::Words(self.glyph_id_array),
            pos: 0,
        }
    }
}

record! {
    /// A range of codepoints mapped to glyphs.
    ///
    /// In format 12 the glyph increments along the range, in format 13 it is
    /// constant.
    pub struct SequentialMapGroup {
        pub start_char_code: u32,
        pub end_char_code: u32,
        pub start_glyph_id: u32,
    }
}

/// Shared reader for the 32-bit group formats.
#[derive(Clone, Debug)]
struct Groups<'a> {
    groups: RecordArray<'a, SequentialMapGroup>,
    constant: bool,
}

impl<'a> Groups<'a> {
    fn read(data: FontData<'a>, constant: bool) -> Result<Self, ReadError> {
        data.check_len(16)?;
        let num_groups: u32 = data.read_at(12)?;
        let groups = data.read_records(16, num_groups as usize)?;
        Ok(Groups { groups, constant })
    }

    fn map_codepoint(&self, codepoint: u32) -> Option<GlyphId> {
        let ix = self
            .groups
            .binary_search_by(|group| {
                if codepoint < group.start_char_code {
                    Ordering::Greater
                } else if codepoint > group.end_char_code {
                    Ordering::Less
                } else {
                    Ordering::Equal
                }
            })
            .ok()?;
        let group = self.groups.get(ix)?;
        let gid = self.lookup_glyph_id(codepoint, group.start_char_code, group.start_glyph_id);
        (gid != GlyphId::NOTDEF).then_some(gid)
    }

    /// Does the final phase of glyph id lookup.
    ///
    /// Shared between Self::map_codepoint and GroupIter.
    fn lookup_glyph_id(&self, codepoint: u32, start_char_code: u32, start_glyph_id: u32) -> GlyphId {
        if self.constant {
            GlyphId::new(start_glyph_id)
        } else {
            GlyphId::new(start_glyph_id.wrapping_add(codepoint.wrapping_sub(start_char_code)))
        }
    }

    /// Returns the codepoint range and start glyph id for the group
    /// at the given index.
    fn group(&self, index: usize) -> Option<(Range<u32>, u32)> {
        let group = self.groups.get(index)?;
        let end = group.end_char_code.min(MAX_CODEPOINT);
        // Use + 1 here because the group range is inclusive
        Some((group.start_char_code..end + 1, group.start_glyph_id))
    }

    fn iter(&self) -> GroupIter<'a> {
        let (cur_range, cur_start_glyph_id) = self.group(0).unwrap_or_default();
        GroupIter {
            cur_start_code: cur_range.start,
            subtable: self.clone(),
            cur_range,
            cur_start_glyph_id,
            cur_range_ix: 0,
        }
    }
}

/// [cmap Format 12](https://docs.microsoft.com/en-us/typography/opentype/spec/cmap#format-12-segmented-coverage): Segmented coverage
#[derive(Clone, Debug)]
pub struct Cmap12<'a>(Groups<'a>);

impl<'a> FontRead<'a> for Cmap12<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        Groups::read(data, false).map(Self)
    }
}

impl<'a> Cmap12<'a> {
    pub fn groups(&self) -> RecordArray<'a, SequentialMapGroup> {
        self.0.groups
    }

    /// Maps a codepoint to a nominal glyph identifier.
    pub fn map_codepoint(&self, codepoint: impl Into<u32>) -> Option<GlyphId> {
        self.0.map_codepoint(codepoint.into())
    }

    /// Returns an iterator over all (codepoint, glyph identifier) pairs
    /// in the subtable.
    pub fn iter(&self) -> GroupIter<'a> {
        self.0.iter()
    }
}

/// [cmap Format 13](https://docs.microsoft.com/en-us/typography/opentype/spec/cmap#format-13-many-to-one-range-mappings): Many-to-one range mappings
#[derive(Clone, Debug)]
pub struct Cmap13<'a>(Groups<'a>);

impl<'a> FontRead<'a> for Cmap13<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        Groups::read(data, true).map(Self)
    }
}

impl<'a> Cmap13<'a> {
    pub fn groups(&self) -> RecordArray<'a, SequentialMapGroup> {
        self.0.groups
    }

    pub fn map_codepoint(&self, codepoint: impl Into<u32>) -> Option<GlyphId> {
        self.0.map_codepoint(codepoint.into())
    }

    pub fn iter(&self) -> GroupIter<'a> {
        self.0.iter()
    }
}

/// Iterator over all (codepoint, glyph identifier) pairs in
/// a format 12 or 13 subtable.
#[derive(Clone)]
pub struct GroupIter<'a> {
    subtable: Groups<'a>,
    cur_range: Range<u32>,
    cur_start_code: u32,
    cur_start_glyph_id: u32,
    cur_range_ix: usize,
}

impl Iterator for GroupIter<'_> {
    type Item = (u32, GlyphId);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(codepoint) = self.cur_range.next() {
                let glyph_id = self.subtable.lookup_glyph_id(
                    codepoint,
                    self.cur_start_code,
                    self.cur_start_glyph_id,
                );
                // The table might explicitly map some codepoints to 0. Avoid
                // returning those here.
                if glyph_id == GlyphId::NOTDEF {
                    continue;
                }
                return Some((codepoint, glyph_id));
            } else {
                self.cur_range_ix += 1;
                let (next_range, start_glyph_id) = self.subtable.group(self.cur_range_ix)?;
                // Skip overlapping groups, keeping the iteration monotonic
                self.cur_range = next_range.start.max(self.cur_range.end)..next_range.end;
                self.cur_start_code = next_range.start;
                self.cur_start_glyph_id = start_glyph_id;
            }
        }
    }
}

/// Result of mapping a codepoint with a variation selector.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum MapVariant {
    /// The variation selector should be ignored and the default mapping
    /// of the character should be used.
    UseDefault,
    /// The variant glyph mapped by a codepoint and associated variation
    /// selector.
    Variant(GlyphId),
}

record! {
    /// A variation selector and the offsets of its mapping tables.
    pub struct VariationSelector {
        pub var_selector: Uint24,
        pub default_uvs_offset: u32,
        pub non_default_uvs_offset: u32,
    }
}

record! {
    /// A range of codepoints using their default glyph.
    pub struct UnicodeRange {
        pub start_unicode_value: Uint24,
        pub additional_count: u8,
    }
}

record! {
    /// A codepoint mapped to a specific variant glyph.
    pub struct UvsMapping {
        pub unicode_value: Uint24,
        pub glyph_id: u16,
    }
}

impl UnicodeRange {
    fn contains(&self, codepoint: u32) -> Ordering {
        let start = self.start_unicode_value.to_u32();
        if codepoint < start {
            Ordering::Greater
        } else if codepoint > start + self.additional_count as u32 {
            Ordering::Less
        } else {
            Ordering::Equal
        }
    }
}

/// [cmap Format 14](https://docs.microsoft.com/en-us/typography/opentype/spec/cmap#format-14-unicode-variation-sequences): Unicode Variation Sequences
#[derive(Clone, Debug)]
pub struct Cmap14<'a> {
    data: FontData<'a>,
    var_selectors: RecordArray<'a, VariationSelector>,
}

impl<'a> FontRead<'a> for Cmap14<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        data.check_len(10)?;
        let count: u32 = data.read_at(6)?;
        let var_selectors = data.read_records(10, count as usize)?;
        Ok(Cmap14 {
            data,
            var_selectors,
        })
    }
}

impl<'a> Cmap14<'a> {
    pub fn var_selectors(&self) -> RecordArray<'a, VariationSelector> {
        self.var_selectors
    }

    fn default_uvs(&self, record: &VariationSelector) -> Option<RecordArray<'a, UnicodeRange>> {
        self.uvs_table(record.default_uvs_offset)
    }

    fn non_default_uvs(&self, record: &VariationSelector) -> Option<RecordArray<'a, UvsMapping>> {
        self.uvs_table(record.non_default_uvs_offset)
    }

    /// Both uvs tables are a u32 count followed by records; a null offset
    /// or a truncated table is treated as absent.
    fn uvs_table<R: crate::FixedRecord<'a>>(&self, offset: u32) -> Option<RecordArray<'a, R>> {
        if offset == 0 {
            return None;
        }
        let offset = offset as usize;
        let count: u32 = self.data.read_at(offset).ok()?;
        self.data
            .read_records(offset + u32::RAW_BYTE_LEN, count as usize)
            .ok()
    }

    /// Maps a codepoint and variation selector to a nominal glyph identifier.
    pub fn map_variant(
        &self,
        codepoint: impl Into<u32>,
        selector: impl Into<u32>,
    ) -> Option<MapVariant> {
        let codepoint = codepoint.into();
        let selector = selector.into();
        // Variation selector records are sorted in order of var_selector.
        let selector_record = self
            .var_selectors
            .binary_search_by_key(&selector, |rec| rec.var_selector.to_u32())
            .ok()
            .and_then(|idx| self.var_selectors.get(idx))?;
        // Codepoints in the default table ignore the selector
        if let Some(default_uvs) = self.default_uvs(&selector_record) {
            if default_uvs
                .binary_search_by(|range| range.contains(codepoint))
                .is_ok()
            {
                return Some(MapVariant::UseDefault);
            }
        }
        let mapping = self.non_default_uvs(&selector_record)?;
        let ix = mapping
            .binary_search_by_key(&codepoint, |map| map.unicode_value.to_u32())
            .ok()?;
        Some(MapVariant::Variant(GlyphId::new(
            mapping.get(ix)?.glyph_id as u32,
        )))
    }

    /// Returns an iterator over all (codepoint, selector, mapping variant)
    /// triples in the subtable.
    pub fn iter(&self) -> Cmap14Iter<'a> {
        Cmap14Iter {
            subtable: self.clone(),
            cur_selector_ix: 0,
            default_ix: 0,
            default_code: None,
            non_default_ix: 0,
        }
    }
}

/// Iterator over all (codepoint, selector, mapping variant) triples
/// in the subtable.
#[derive(Clone)]
pub struct Cmap14Iter<'a> {
    subtable: Cmap14<'a>,
    cur_selector_ix: usize,
    default_ix: usize,
    default_code: Option<Range<u32>>,
    non_default_ix: usize,
}

impl Iterator for Cmap14Iter<'_> {
    type Item = (u32, u32, MapVariant);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let record = self.subtable.var_selectors.get(self.cur_selector_ix)?;
            let selector = record.var_selector.to_u32();
            if let Some(default_uvs) = self.subtable.default_uvs(&record) {
                loop {
                    if let Some(codepoint) = self.default_code.as_mut().and_then(Iterator::next) {
                        return Some((codepoint, selector, MapVariant::UseDefault));
                    }
                    let Some(range) = default_uvs.get(self.default_ix) else {
                        break;
                    };
                    self.default_ix += 1;
                    let start = range.start_unicode_value.to_u32();
                    self.default_code = Some(start..start + range.additional_count as u32 + 1);
                }
            }
            if let Some(mapping) = self
                .subtable
                .non_default_uvs(&record)
                .and_then(|uvs| uvs.get(self.non_default_ix))
            {
                self.non_default_ix += 1;
                return Some((
                    mapping.unicode_value.to_u32(),
                    selector,
                    MapVariant::Variant(GlyphId::new(mapping.glyph_id as u32)),
                ));
            }
            self.cur_selector_ix += 1;
            self.default_ix = 0;
            self.default_code = None;
            self.non_default_ix = 0;
        }
    }
}
