//! OpenType Layout common table formats

mod context;
mod lookup_flag;

pub use context::{RuleSet, RuleSets, SequenceContext, SequenceLookupRecord, SequenceRule};
pub use lookup_flag::LookupFlag;

use types::{GlyphId, Tag};

use super::variations::DeltaSetIndex;
use crate::{record, Array, FontData, FontRead, ReadError, RecordArray};

record! {
    pub struct RangeRecord {
        pub start_glyph_id: u16,
        pub end_glyph_id: u16,
        pub start_coverage_index: u16,
    }
}

impl RangeRecord {
    fn iter(&self) -> impl Iterator<Item = GlyphId> {
        (self.start_glyph_id..=self.end_glyph_id).map(GlyphId::from)
    }
}

/// A [coverage table](https://learn.microsoft.com/en-us/typography/opentype/spec/chapter2#coverage-table):
/// the set of glyphs a subtable applies to, each with a coverage index.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CoverageTable<'a> {
    Format1(Array<'a, u16>),
    Format2(RecordArray<'a, RangeRecord>),
}

impl<'a> FontRead<'a> for CoverageTable<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let format: u16 = data.read_at(0)?;
        let count: u16 = data.read_at(2)?;
        match format {
            1 => Ok(Self::Format1(data.read_array(4, count as usize)?)),
            2 => Ok(Self::Format2(data.read_records(4, count as usize)?)),
            other => Err(ReadError::InvalidFormat(other as _)),
        }
    }
}

impl<'a> CoverageTable<'a> {
    /// Returns the coverage index of `glyph_id`, if it is covered.
    pub fn get(&self, glyph_id: GlyphId) -> Option<u16> {
        let gid = u16::try_from(glyph_id.to_u32()).ok()?;
        match self {
            Self::Format1(glyphs) => glyphs.binary_search(&gid).ok().map(|ix| ix as u16),
            Self::Format2(ranges) => {
                let ix = ranges
                    .binary_search_by(|range| {
                        if range.start_glyph_id > gid {
                            std::cmp::Ordering::Greater
                        } else if range.end_glyph_id < gid {
                            std::cmp::Ordering::Less
                        } else {
                            std::cmp::Ordering::Equal
                        }
                    })
                    .ok()?;
                let range = ranges.get(ix)?;
                Some(range.start_coverage_index + (gid - range.start_glyph_id))
            }
        }
    }

    /// Iterates the covered glyphs in coverage index order.
    pub fn iter(&self) -> impl Iterator<Item = GlyphId> + 'a {
        // all one expression so that we have a single return type
        let (iter1, iter2) = match self {
            Self::Format1(glyphs) => (Some(glyphs.iter().map(GlyphId::from)), None),
            Self::Format2(ranges) => {
                let iter = ranges.iter().flat_map(|range| range.iter());
                (None, Some(iter))
            }
        };
        iter1
            .into_iter()
            .flatten()
            .chain(iter2.into_iter().flatten())
    }

    pub fn population(&self) -> usize {
        match self {
            Self::Format1(glyphs) => glyphs.len(),
            Self::Format2(ranges) => ranges
                .iter()
                .map(|range| range.end_glyph_id.saturating_sub(range.start_glyph_id) as usize + 1)
                .sum(),
        }
    }
}

record! {
    pub struct ClassRangeRecord {
        pub start_glyph_id: u16,
        pub end_glyph_id: u16,
        pub class: u16,
    }
}

/// A [class definition table](https://learn.microsoft.com/en-us/typography/opentype/spec/chapter2#class-definition-table).
///
/// Glyphs not listed belong to class 0.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClassDef<'a> {
    Format1 {
        start_glyph_id: u16,
        class_values: Array<'a, u16>,
    },
    Format2(RecordArray<'a, ClassRangeRecord>),
}

impl<'a> FontRead<'a> for ClassDef<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let format: u16 = data.read_at(0)?;
        match format {
            1 => {
                let start_glyph_id = data.read_at(2)?;
                let count: u16 = data.read_at(4)?;
                Ok(Self::Format1 {
                    start_glyph_id,
                    class_values: data.read_array(6, count as usize)?,
                })
            }
            2 => {
                let count: u16 = data.read_at(2)?;
                Ok(Self::Format2(data.read_records(4, count as usize)?))
            }
            other => Err(ReadError::InvalidFormat(other as _)),
        }
    }
}

impl<'a> ClassDef<'a> {
    /// Returns the class of `glyph_id`.
    pub fn get(&self, glyph_id: GlyphId) -> u16 {
        let Ok(gid) = u16::try_from(glyph_id.to_u32()) else {
            return 0;
        };
        match self {
            Self::Format1 {
                start_glyph_id,
                class_values,
            } => gid
                .checked_sub(*start_glyph_id)
                .and_then(|ix| class_values.get(ix as usize))
                .unwrap_or(0),
            Self::Format2(ranges) => ranges
                .binary_search_by(|range| {
                    if range.start_glyph_id > gid {
                        std::cmp::Ordering::Greater
                    } else if range.end_glyph_id < gid {
                        std::cmp::Ordering::Less
                    } else {
                        std::cmp::Ordering::Equal
                    }
                })
                .ok()
                .and_then(|ix| ranges.get(ix))
                .map(|range| range.class)
                .unwrap_or(0),
        }
    }

    /// Iterates the glyphs with an explicit, non-zero class.
    pub fn iter(&self) -> impl Iterator<Item = (GlyphId, u16)> + 'a {
        let (iter1, iter2) = match self {
            Self::Format1 {
                start_glyph_id,
                class_values,
            } => {
                let start = *start_glyph_id as u32;
                let iter = class_values
                    .iter()
                    .enumerate()
                    .map(move |(ix, class)| (GlyphId::new(start + ix as u32), class));
                (Some(iter), None)
            }
            Self::Format2(ranges) => {
                let iter = ranges.iter().flat_map(|range| {
                    (range.start_glyph_id..=range.end_glyph_id)
                        .map(move |gid| (GlyphId::from(gid), range.class))
                });
                (None, Some(iter))
            }
        };
        iter1
            .into_iter()
            .flatten()
            .chain(iter2.into_iter().flatten())
            .filter(|(_, class)| *class != 0)
    }
}

record! {
    /// A tag with an offset to the tagged table.
    pub struct TagRecord {
        pub tag: Tag,
        pub offset: u16,
    }
}

/// A list of tagged tables, shared by the script and feature lists and the
/// language systems of a script.
#[derive(Clone, Debug)]
struct TaggedList<'a> {
    data: FontData<'a>,
    records: RecordArray<'a, TagRecord>,
}

impl<'a> TaggedList<'a> {
    fn read(data: FontData<'a>, count_pos: usize) -> Result<Self, ReadError> {
        let count: u16 = data.read_at(count_pos)?;
        Ok(Self {
            data,
            records: data.read_records(count_pos + 2, count as usize)?,
        })
    }

    fn find(&self, tag: Tag) -> Option<usize> {
        self.records.iter().position(|record| record.tag == tag)
    }

    fn get<T: FontRead<'a>>(&self, index: usize) -> Result<(Tag, T), ReadError> {
        let record = self.records.get(index).ok_or(ReadError::OutOfBounds)?;
        Ok((record.tag, self.data.resolve_offset(record.offset)?))
    }
}

/// The [ScriptList](https://learn.microsoft.com/en-us/typography/opentype/spec/chapter2#script-list-table-and-script-record).
#[derive(Clone, Debug)]
pub struct ScriptList<'a>(TaggedList<'a>);

impl<'a> FontRead<'a> for ScriptList<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        TaggedList::read(data, 0).map(Self)
    }
}

impl<'a> ScriptList<'a> {
    pub fn script_records(&self) -> RecordArray<'a, TagRecord> {
        self.0.records
    }

    pub fn len(&self) -> usize {
        self.0.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.records.is_empty()
    }

    pub fn get(&self, index: usize) -> Result<(Tag, Script<'a>), ReadError> {
        self.0.get(index)
    }

    /// Returns the index of the script with the given tag.
    pub fn index_for_tag(&self, tag: Tag) -> Option<u16> {
        self.0.find(tag).map(|ix| ix as u16)
    }

    pub fn script(&self, tag: Tag) -> Option<Result<Script<'a>, ReadError>> {
        let ix = self.0.find(tag)?;
        Some(self.get(ix).map(|(_, script)| script))
    }
}

/// A script with its language systems.
#[derive(Clone, Debug)]
pub struct Script<'a> {
    default_lang_sys_offset: u16,
    lang_sys: TaggedList<'a>,
}

impl<'a> FontRead<'a> for Script<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        Ok(Self {
            default_lang_sys_offset: data.read_at(0)?,
            lang_sys: TaggedList::read(data, 2)?,
        })
    }
}

impl<'a> Script<'a> {
    pub fn default_lang_sys(&self) -> Option<Result<LangSys<'a>, ReadError>> {
        self.lang_sys
            .data
            .resolve_nullable(self.default_lang_sys_offset)
    }

    pub fn lang_sys_records(&self) -> RecordArray<'a, TagRecord> {
        self.lang_sys.records
    }

    /// Returns the language system for `tag`, if the script has one.
    pub fn lang_sys(&self, tag: Tag) -> Option<Result<LangSys<'a>, ReadError>> {
        let ix = self.lang_sys.find(tag)?;
        Some(self.lang_sys.get(ix).map(|(_, lang_sys)| lang_sys))
    }
}

/// The features enabled for a language system.
#[derive(Clone, Debug)]
pub struct LangSys<'a> {
    required_feature_index: u16,
    feature_indices: Array<'a, u16>,
}

impl<'a> FontRead<'a> for LangSys<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let required_feature_index = data.read_at(2)?;
        let count: u16 = data.read_at(4)?;
        Ok(Self {
            required_feature_index,
            feature_indices: data.read_array(6, count as usize)?,
        })
    }
}

impl<'a> LangSys<'a> {
    pub fn required_feature_index(&self) -> Option<u16> {
        (self.required_feature_index != 0xFFFF).then_some(self.required_feature_index)
    }

    pub fn feature_indices(&self) -> Array<'a, u16> {
        self.feature_indices
    }
}

/// The [FeatureList](https://learn.microsoft.com/en-us/typography/opentype/spec/chapter2#feature-list-table).
#[derive(Clone, Debug)]
pub struct FeatureList<'a>(TaggedList<'a>);

impl<'a> FontRead<'a> for FeatureList<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        TaggedList::read(data, 0).map(Self)
    }
}

impl<'a> FeatureList<'a> {
    pub fn feature_records(&self) -> RecordArray<'a, TagRecord> {
        self.0.records
    }

    pub fn len(&self) -> usize {
        self.0.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.records.is_empty()
    }

    pub fn get(&self, index: usize) -> Result<(Tag, Feature<'a>), ReadError> {
        self.0.get(index)
    }
}

/// A feature with the lookups that implement it.
#[derive(Clone, Debug)]
pub struct Feature<'a> {
    feature_params_offset: u16,
    lookup_list_indices: Array<'a, u16>,
}

impl<'a> FontRead<'a> for Feature<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let feature_params_offset = data.read_at(0)?;
        let count: u16 = data.read_at(2)?;
        Ok(Self {
            feature_params_offset,
            lookup_list_indices: data.read_array(4, count as usize)?,
        })
    }
}

impl<'a> Feature<'a> {
    pub fn has_params(&self) -> bool {
        self.feature_params_offset != 0
    }

    pub fn lookup_list_indices(&self) -> Array<'a, u16> {
        self.lookup_list_indices
    }
}

/// The [LookupList](https://learn.microsoft.com/en-us/typography/opentype/spec/chapter2#lookup-list-table).
#[derive(Clone, Debug)]
pub struct LookupList<'a> {
    data: FontData<'a>,
    offsets: Array<'a, u16>,
}

impl<'a> FontRead<'a> for LookupList<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let count: u16 = data.read_at(0)?;
        Ok(Self {
            data,
            offsets: data.read_array(2, count as usize)?,
        })
    }
}

impl<'a> LookupList<'a> {
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    pub fn get(&self, index: usize) -> Result<Lookup<'a>, ReadError> {
        let offset = self.offsets.get(index).ok_or(ReadError::OutOfBounds)?;
        self.data.resolve_offset(offset)
    }

    pub fn iter(&self) -> impl Iterator<Item = Result<Lookup<'a>, ReadError>> + '_ {
        (0..self.len()).map(|ix| self.get(ix))
    }
}

/// A lookup: a type, flags and the subtables implementing it.
///
/// The interpretation of the subtables is left to GSUB and GPOS.
#[derive(Clone, Debug)]
pub struct Lookup<'a> {
    data: FontData<'a>,
    lookup_type: u16,
    lookup_flag: LookupFlag,
    subtable_offsets: Array<'a, u16>,
    mark_filtering_set: Option<u16>,
}

impl<'a> FontRead<'a> for Lookup<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let lookup_type = cursor.read()?;
        let lookup_flag: LookupFlag = cursor.read()?;
        let count: u16 = cursor.read()?;
        let subtable_offsets = cursor.read_array(count as usize)?;
        let mark_filtering_set = if lookup_flag.contains(LookupFlag::USE_MARK_FILTERING_SET) {
            Some(cursor.read()?)
        } else {
            None
        };
        Ok(Self {
            data,
            lookup_type,
            lookup_flag,
            subtable_offsets,
            mark_filtering_set,
        })
    }
}

impl<'a> Lookup<'a> {
    pub fn lookup_type(&self) -> u16 {
        self.lookup_type
    }

    pub fn lookup_flag(&self) -> LookupFlag {
        self.lookup_flag
    }

    pub fn mark_filtering_set(&self) -> Option<u16> {
        self.mark_filtering_set
    }

    pub fn subtable_count(&self) -> usize {
        self.subtable_offsets.len()
    }

    /// Returns the data of the subtable at `index` along with its effective
    /// lookup type.
    ///
    /// Extension subtables (of type `extension_type`) are followed to the
    /// subtable they wrap.
    pub fn subtable_data(
        &self,
        index: usize,
        extension_type: u16,
    ) -> Result<(u16, FontData<'a>), ReadError> {
        let offset = self
            .subtable_offsets
            .get(index)
            .ok_or(ReadError::OutOfBounds)?;
        if offset == 0 {
            return Err(ReadError::NullOffset);
        }
        let data = self
            .data
            .split_off(offset as usize)
            .ok_or(ReadError::OutOfBounds)?;
        if self.lookup_type != extension_type {
            return Ok((self.lookup_type, data));
        }
        let format: u16 = data.read_at(0)?;
        if format != 1 {
            return Err(ReadError::InvalidFormat(format as _));
        }
        let wrapped_type: u16 = data.read_at(2)?;
        if wrapped_type == extension_type {
            return Err(ReadError::MalformedData("nested extension lookup"));
        }
        let ext_offset: u32 = data.read_at(4)?;
        let wrapped = data
            .split_off(ext_offset as usize)
            .ok_or(ReadError::OutOfBounds)?;
        Ok((wrapped_type, wrapped))
    }
}

/// A [device or variation index table](https://learn.microsoft.com/en-us/typography/opentype/spec/chapter2#device-and-variationindex-tables).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DeviceOrVariationIndex<'a> {
    /// Pixel adjustments for a range of sizes.
    Device {
        start_size: u16,
        end_size: u16,
        delta_format: u16,
        delta_values: Array<'a, u16>,
    },
    /// Indices into an item variation store.
    VariationIndex(DeltaSetIndex),
}

impl<'a> FontRead<'a> for DeviceOrVariationIndex<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let first: u16 = data.read_at(0)?;
        let second: u16 = data.read_at(2)?;
        let delta_format: u16 = data.read_at(4)?;
        match delta_format {
            1..=3 => {
                let range_len = second.saturating_add(1).saturating_sub(first) as usize;
                let per_word = 16 >> delta_format;
                let count = range_len.div_ceil(per_word);
                Ok(Self::Device {
                    start_size: first,
                    end_size: second,
                    delta_format,
                    delta_values: data.read_array(6, count)?,
                })
            }
            0x8000 => Ok(Self::VariationIndex(DeltaSetIndex {
                outer: first,
                inner: second,
            })),
            other => Err(ReadError::InvalidFormat(other as _)),
        }
    }
}

impl DeviceOrVariationIndex<'_> {
    /// Returns the pixel adjustment at `ppem` for device tables.
    pub fn device_delta(&self, ppem: u16) -> Option<i16> {
        let Self::Device {
            start_size,
            end_size,
            delta_format,
            delta_values,
        } = self
        else {
            return None;
        };
        if ppem < *start_size || ppem > *end_size {
            return None;
        }
        let bits = 1usize << delta_format;
        let per_word = 16 / bits;
        let ix = (ppem - start_size) as usize;
        let word = delta_values.get(ix / per_word)?;
        let shift = 16 - bits * (ix % per_word + 1);
        let raw = (word >> shift) & ((1u16 << bits) - 1);
        // sign extend
        let value = ((raw << (16 - bits)) as i16) >> (16 - bits);
        Some(value)
    }
}

/// The header shared by GSUB and GPOS.
#[derive(Clone, Debug)]
pub struct LayoutHeader<'a> {
    data: FontData<'a>,
    minor_version: u16,
    script_list_offset: u16,
    feature_list_offset: u16,
    lookup_list_offset: u16,
    feature_variations_offset: u32,
}

impl<'a> FontRead<'a> for LayoutHeader<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let major: u16 = cursor.read()?;
        let minor_version: u16 = cursor.read()?;
        if major != 1 {
            return Err(ReadError::InvalidFormat(major as _));
        }
        let script_list_offset = cursor.read()?;
        let feature_list_offset = cursor.read()?;
        let lookup_list_offset = cursor.read()?;
        let feature_variations_offset = if minor_version >= 1 {
            cursor.read()?
        } else {
            0
        };
        Ok(Self {
            data,
            minor_version,
            script_list_offset,
            feature_list_offset,
            lookup_list_offset,
            feature_variations_offset,
        })
    }
}

impl<'a> LayoutHeader<'a> {
    pub fn minor_version(&self) -> u16 {
        self.minor_version
    }

    pub fn script_list(&self) -> Result<ScriptList<'a>, ReadError> {
        self.data.resolve_offset(self.script_list_offset)
    }

    pub fn feature_list(&self) -> Result<FeatureList<'a>, ReadError> {
        self.data.resolve_offset(self.feature_list_offset)
    }

    pub fn lookup_list(&self) -> Result<LookupList<'a>, ReadError> {
        self.data.resolve_offset(self.lookup_list_offset)
    }

    /// Returns true if the table carries feature variations (version 1.1).
    pub fn has_feature_variations(&self) -> bool {
        self.feature_variations_offset != 0
    }
}

#[cfg(test)]
mod tests {
    use font_test_data::{be_buffer, bebuffer::BeBuffer};

    use super::*;

    #[test]
    fn coverage_formats() {
        let buf = be_buffer! { 1u16, 3u16, [5u16, 9, 20] };
        let coverage = CoverageTable::read(FontData::new(&buf)).unwrap();
        assert_eq!(coverage.get(GlyphId::new(9)), Some(1));
        assert_eq!(coverage.get(GlyphId::new(10)), None);
        assert_eq!(coverage.population(), 3);
        let buf = be_buffer! { 2u16, 2u16, [10u16, 12, 0], [20u16, 21, 3] };
        let coverage = CoverageTable::read(FontData::new(&buf)).unwrap();
        assert_eq!(coverage.get(GlyphId::new(11)), Some(1));
        assert_eq!(coverage.get(GlyphId::new(21)), Some(4));
        assert_eq!(coverage.get(GlyphId::new(15)), None);
        let glyphs: Vec<_> = coverage.iter().map(|gid| gid.to_u32()).collect();
        assert_eq!(glyphs, [10, 11, 12, 20, 21]);
        let bad = be_buffer! { 3u16, 0u16 };
        assert!(CoverageTable::read(FontData::new(&bad)).is_err());
    }

    #[test]
    fn class_def_formats() {
        let buf = be_buffer! { 1u16, 10u16, 3u16, [1u16, 0, 2] };
        let class_def = ClassDef::read(FontData::new(&buf)).unwrap();
        assert_eq!(class_def.get(GlyphId::new(10)), 1);
        assert_eq!(class_def.get(GlyphId::new(11)), 0);
        assert_eq!(class_def.get(GlyphId::new(12)), 2);
        assert_eq!(class_def.get(GlyphId::new(9)), 0);
        assert_eq!(class_def.get(GlyphId::new(13)), 0);
        let classes: Vec<_> = class_def.iter().map(|(g, c)| (g.to_u32(), c)).collect();
        assert_eq!(classes, [(10, 1), (12, 2)]);
        let buf = be_buffer! { 2u16, 2u16, [4u16, 6, 3], [8u16, 8, 1] };
        let class_def = ClassDef::read(FontData::new(&buf)).unwrap();
        assert_eq!(class_def.get(GlyphId::new(5)), 3);
        assert_eq!(class_def.get(GlyphId::new(7)), 0);
        assert_eq!(class_def.get(GlyphId::new(8)), 1);
    }

    /// A script list with `latn` (default lang sys plus `TRK `) and a
    /// feature list with `liga` and `kern`.
    fn lists() -> (BeBuffer, BeBuffer) {
        let scripts = be_buffer! {
            1u16,
            (Tag::new(b"latn")), 8u16,
            // Script at 8
            10u16,          // defaultLangSysOffset
            1u16,
            (Tag::new(b"TRK ")), 20u16,
            // default LangSys at 18
            0u16, 0xFFFFu16, 2u16, [0u16, 1],
            // TRK LangSys at 28
            0u16, 1u16, 1u16, [0u16]
        };
        let features = be_buffer! {
            2u16,
            (Tag::new(b"liga")), 14u16,
            (Tag::new(b"kern")), 20u16,
            0u16, 1u16, [0u16],
            0u16, 2u16, [1u16, 2]
        };
        (scripts, features)
    }

    #[test]
    fn script_and_feature_lists() {
        let (scripts, features) = lists();
        let scripts = ScriptList::read(FontData::new(&scripts)).unwrap();
        assert_eq!(scripts.index_for_tag(Tag::new(b"latn")), Some(0));
        assert!(scripts.script(Tag::new(b"arab")).is_none());
        let latn = scripts.script(Tag::new(b"latn")).unwrap().unwrap();
        let default = latn.default_lang_sys().unwrap().unwrap();
        assert_eq!(default.required_feature_index(), None);
        assert_eq!(default.feature_indices().iter().collect::<Vec<_>>(), [0, 1]);
        let trk = latn.lang_sys(Tag::new(b"TRK ")).unwrap().unwrap();
        assert_eq!(trk.required_feature_index(), Some(1));
        let features = FeatureList::read(FontData::new(&features)).unwrap();
        assert_eq!(features.len(), 2);
        let (tag, kern) = features.get(1).unwrap();
        assert_eq!(tag, Tag::new(b"kern"));
        assert!(!kern.has_params());
        assert_eq!(kern.lookup_list_indices().iter().collect::<Vec<_>>(), [1, 2]);
    }

    #[test]
    fn lookups_and_extensions() {
        let buf = be_buffer! {
            2u16, [6u16, 22],
            // lookup 0 at 6: type 1, mark filtering set 7
            1u16, 0x0010u16, 1u16, [10u16], 7u16,
            // subtable at 16
            [0xAAu8, 0xBB, 0xCC, 0xDD, 0, 0],
            // lookup 1 at 22: extension (type 7) wrapping type 4
            7u16, 0u16, 1u16, [8u16],
            1u16, 4u16, 8u32,
            [0x11u8, 0x22]
        };
        let list = LookupList::read(FontData::new(&buf)).unwrap();
        let lookup = list.get(0).unwrap();
        assert_eq!(lookup.lookup_type(), 1);
        assert_eq!(lookup.mark_filtering_set(), Some(7));
        let (kind, data) = lookup.subtable_data(0, 7).unwrap();
        assert_eq!(kind, 1);
        assert_eq!(&data.as_bytes()[..2], &[0xAA, 0xBB]);
        let ext = list.get(1).unwrap();
        assert_eq!(ext.mark_filtering_set(), None);
        let (kind, data) = ext.subtable_data(0, 7).unwrap();
        assert_eq!(kind, 4);
        assert_eq!(data.as_bytes(), &[0x11, 0x22]);
        assert!(ext.subtable_data(1, 7).is_err());
    }

    #[test]
    fn device_tables() {
        // sizes 11..=14 with 2 bit deltas: 1, -1, 0, -2
        let buf = be_buffer! { 11u16, 14u16, 1u16, 0b0111_0010_0000_0000u16 };
        let device = DeviceOrVariationIndex::read(FontData::new(&buf)).unwrap();
        let deltas: Vec<_> = (10..=15).map(|ppem| device.device_delta(ppem)).collect();
        assert_eq!(deltas, [None, Some(1), Some(-1), Some(0), Some(-2), None]);
        let buf = be_buffer! { 2u16, 5u16, 0x8000u16 };
        let index = DeviceOrVariationIndex::read(FontData::new(&buf)).unwrap();
        assert_eq!(
            index,
            DeviceOrVariationIndex::VariationIndex(DeltaSetIndex { outer: 2, inner: 5 })
        );
        assert_eq!(index.device_delta(12), None);
    }
}
