//! The [kern](https://docs.microsoft.com/en-us/typography/opentype/spec/kern) table
//!
//! Both the OpenType (version 0) and Apple (version 1) layouts are
//! supported. See <https://developer.apple.com/fonts/TrueType-Reference-Manual/RM06/Chap6kern.html>

use types::{GlyphId, Tag};

use crate::{record, Array, FontData, FontRead, ReadError, RecordArray};

/// 'kern'
pub const TAG: Tag = Tag::new(b"kern");

/// The kerning table.
#[derive(Clone, Debug)]
pub struct Kern<'a> {
    is_apple: bool,
    num_tables: u32,
    subtables_data: FontData<'a>,
}

impl<'a> FontRead<'a> for Kern<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let version: u16 = data.read_at(0)?;
        let (is_apple, num_tables, header_len) = match version {
            0 => (false, data.read_at::<u16>(2)? as u32, 4),
            1 => {
                let minor: u16 = data.read_at(2)?;
                if minor != 0 {
                    return Err(ReadError::InvalidFormat(minor as i64));
                }
                (true, data.read_at::<u32>(4)?, 8)
            }
            _ => return Err(ReadError::InvalidFormat(version as i64)),
        };
        Ok(Self {
            is_apple,
            num_tables,
            subtables_data: data.split_off(header_len).unwrap_or_default(),
        })
    }
}

impl<'a> Kern<'a> {
    /// True if the table uses the Apple layout.
    pub fn is_apple(&self) -> bool {
        self.is_apple
    }

    pub fn num_tables(&self) -> u32 {
        self.num_tables
    }

    /// Returns an iterator over the subtables.
    ///
    /// Iteration stops after the first subtable whose header cannot be
    /// read, since the position of the following ones is unknown.
    pub fn subtables(&self) -> impl Iterator<Item = Result<Subtable<'a>, ReadError>> + 'a {
        let mut data = self.subtables_data;
        let is_apple = self.is_apple;
        let mut remaining = self.num_tables;
        std::iter::from_fn(move || {
            if remaining == 0 {
                return None;
            }
            remaining -= 1;
            let result = Subtable::read(data, is_apple, remaining == 0);
            match &result {
                Ok(subtable) => data = data.split_off(subtable.data.len()).unwrap_or_default(),
                Err(_) => remaining = 0,
            }
            Some(result)
        })
    }
}

/// A single kerning subtable.
#[derive(Clone, Debug)]
pub struct Subtable<'a> {
    is_apple: bool,
    coverage: u16,
    tuple_index: u16,
    /// The complete subtable, including its header.
    data: FontData<'a>,
    header_len: usize,
}

impl<'a> Subtable<'a> {
    fn read(data: FontData<'a>, is_apple: bool, is_last: bool) -> Result<Self, ReadError> {
        let (length, coverage, tuple_index, header_len) = if is_apple {
            let length: u32 = data.read_at(0)?;
            (length as usize, data.read_at(4)?, data.read_at(6)?, 8)
        } else {
            let length: u16 = data.read_at(2)?;
            (length as usize, data.read_at(4)?, 0, 6)
        };
        let mut length = length;
        let format = if is_apple { coverage & 0xFF } else { coverage >> 8 };
        // The 16-bit length of OpenType subtables overflows for large
        // format 0 subtables, so trust the pair count instead.
        if !is_apple && format == 0 {
            let n_pairs: u16 = data.read_at(header_len)?;
            length = header_len + 8 + n_pairs as usize * KernPair::RAW_LEN;
        } else if is_last && length > data.len() {
            length = data.len();
        }
        if length < header_len {
            return Err(ReadError::MalformedData("kern subtable shorter than header"));
        }
        let data = data.take_up_to(length).ok_or(ReadError::OutOfBounds)?;
        Ok(Self {
            is_apple,
            coverage,
            tuple_index,
            data,
            header_len,
        })
    }

    /// The subtable format.
    pub fn format(&self) -> u8 {
        if self.is_apple {
            (self.coverage & 0xFF) as u8
        } else {
            (self.coverage >> 8) as u8
        }
    }

    pub fn tuple_index(&self) -> u16 {
        self.tuple_index
    }

    /// True if the subtable holds horizontal kerning values.
    pub fn is_horizontal(&self) -> bool {
        if self.is_apple {
            self.coverage & 0x8000 == 0
        } else {
            self.coverage & 0x0001 != 0
        }
    }

    /// True if the values adjust glyphs perpendicular to the text flow.
    pub fn is_cross_stream(&self) -> bool {
        if self.is_apple {
            self.coverage & 0x4000 != 0
        } else {
            self.coverage & 0x0004 != 0
        }
    }

    /// True if the subtable holds variation values.
    pub fn is_variable(&self) -> bool {
        self.is_apple && self.coverage & 0x2000 != 0
    }

    /// True if the values replace, rather than add to, the accumulated
    /// kerning (OpenType only).
    pub fn is_override(&self) -> bool {
        !self.is_apple && self.coverage & 0x0008 != 0
    }

    /// Returns an enum representing the actual subtable data.
    pub fn kind(&self) -> Result<SubtableKind<'a>, ReadError> {
        match self.format() {
            0 => Ok(SubtableKind::Format0(Subtable0::read(
                self.data.split_off(self.header_len).unwrap_or_default(),
            )?)),
            2 => Ok(SubtableKind::Format2(Subtable2::read(
                self.data,
                self.header_len,
            )?)),
            3 if self.is_apple => Ok(SubtableKind::Format3(Subtable3::read(
                self.data.split_off(self.header_len).unwrap_or_default(),
            )?)),
            format => Err(ReadError::InvalidFormat(format as i64)),
        }
    }
}

/// The various `kern` subtable formats.
#[derive(Clone, Debug)]
pub enum SubtableKind<'a> {
    Format0(Subtable0<'a>),
    Format2(Subtable2<'a>),
    Format3(Subtable3<'a>),
}

impl SubtableKind<'_> {
    /// Returns the kerning adjustment for the given pair, if the subtable
    /// has an entry for it.
    pub fn kerning(&self, left: GlyphId, right: GlyphId) -> Option<i16> {
        match self {
            Self::Format0(subtable) => subtable.kerning(left, right),
            Self::Format2(subtable) => subtable.kerning(left, right),
            Self::Format3(subtable) => subtable.kerning(left, right),
        }
    }
}

record! {
    /// A kerning pair in a format 0 subtable.
    pub struct KernPair {
        pub left: u16,
        pub right: u16,
        pub value: i16,
    }
}

impl KernPair {
    const RAW_LEN: usize = 6;

    fn key(&self) -> u32 {
        (self.left as u32) << 16 | self.right as u32
    }
}

/// Ordered list of kerning pairs.
#[derive(Clone, Debug)]
pub struct Subtable0<'a> {
    pairs: RecordArray<'a, KernPair>,
}

impl<'a> Subtable0<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let n_pairs: u16 = data.read_at(0)?;
        Ok(Self {
            pairs: data.read_records(8, n_pairs as usize)?,
        })
    }

    pub fn pairs(&self) -> RecordArray<'a, KernPair> {
        self.pairs
    }

    /// Returns the kerning adjustment for the given pair.
    pub fn kerning(&self, left: GlyphId, right: GlyphId) -> Option<i16> {
        let left = u16::try_from(left.to_u32()).ok()?;
        let right = u16::try_from(right.to_u32()).ok()?;
        let key = (left as u32) << 16 | right as u32;
        let ix = self.pairs.binary_search_by_key(&key, |pair| pair.key()).ok()?;
        self.pairs.get(ix).map(|pair| pair.value)
    }
}

/// Class based kerning with a two dimensional array of values.
///
/// Class values are byte offsets from the start of the subtable; the sum
/// of the left and right values locates the kerning value.
#[derive(Clone, Debug)]
pub struct Subtable2<'a> {
    data: FontData<'a>,
    row_width: u16,
    left_classes: ClassTable<'a>,
    right_classes: ClassTable<'a>,
    array_offset: usize,
}

impl<'a> Subtable2<'a> {
    fn read(data: FontData<'a>, header_len: usize) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        cursor.advance_by(header_len);
        let row_width = cursor.read()?;
        let left_offset: u16 = cursor.read()?;
        let right_offset: u16 = cursor.read()?;
        let array_offset: u16 = cursor.read()?;
        Ok(Self {
            data,
            row_width,
            left_classes: ClassTable::read(data, left_offset)?,
            right_classes: ClassTable::read(data, right_offset)?,
            array_offset: array_offset as usize,
        })
    }

    /// The width in bytes of one row of the kerning array.
    pub fn row_width(&self) -> u16 {
        self.row_width
    }

    /// Returns the kerning adjustment for the given pair.
    pub fn kerning(&self, left: GlyphId, right: GlyphId) -> Option<i16> {
        let left = self.left_classes.get(left)? as usize;
        let right = self.right_classes.get(right).unwrap_or(0) as usize;
        let offset = left + right;
        // a missing left class resolves to an offset inside the header
        if offset < self.array_offset {
            return None;
        }
        self.data.read_at(offset).ok()
    }
}

#[derive(Clone, Debug)]
struct ClassTable<'a> {
    first_glyph: u16,
    values: Array<'a, u16>,
}

impl<'a> ClassTable<'a> {
    fn read(data: FontData<'a>, offset: u16) -> Result<Self, ReadError> {
        let offset = offset as usize;
        let first_glyph = data.read_at(offset)?;
        let n_glyphs: u16 = data.read_at(offset + 2)?;
        Ok(Self {
            first_glyph,
            values: data.read_array(offset + 4, n_glyphs as usize)?,
        })
    }

    fn get(&self, glyph_id: GlyphId) -> Option<u16> {
        let ix = glyph_id.to_u32().checked_sub(self.first_glyph as u32)?;
        self.values.get(ix as usize)
    }
}

/// Compact class based kerning using byte indices (Apple only).
#[derive(Clone, Debug)]
pub struct Subtable3<'a> {
    kern_values: Array<'a, i16>,
    left_classes: &'a [u8],
    right_classes: &'a [u8],
    right_class_count: u8,
    left_class_count: u8,
    kern_indices: &'a [u8],
}

impl<'a> Subtable3<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let glyph_count = cursor.read::<u16>()? as usize;
        let kern_value_count = cursor.read::<u8>()? as usize;
        let left_class_count = cursor.read::<u8>()?;
        let right_class_count = cursor.read::<u8>()?;
        let _flags = cursor.read::<u8>()?;
        let kern_values = cursor.read_array(kern_value_count)?;
        let left_classes = cursor.read_bytes(glyph_count)?;
        let right_classes = cursor.read_bytes(glyph_count)?;
        let kern_indices =
            cursor.read_bytes(left_class_count as usize * right_class_count as usize)?;
        Ok(Self {
            kern_values,
            left_classes,
            right_classes,
            right_class_count,
            left_class_count,
            kern_indices,
        })
    }

    /// Returns the kerning adjustment for the given pair.
    pub fn kerning(&self, left: GlyphId, right: GlyphId) -> Option<i16> {
        let left_class = *self.left_classes.get(left.to_usize())?;
        let right_class = *self.right_classes.get(right.to_usize())?;
        if left_class >= self.left_class_count || right_class >= self.right_class_count {
            return None;
        }
        let ix = left_class as usize * self.right_class_count as usize + right_class as usize;
        let value_ix = *self.kern_indices.get(ix)?;
        self.kern_values.get(value_ix as usize)
    }
}

#[cfg(test)]
mod tests {
    use font_test_data::kern;

    use super::*;

    fn gid(id: u32) -> GlyphId {
        GlyphId::new(id)
    }

    #[test]
    fn format_0() {
        let kern = Kern::read(FontData::new(kern::KERN0_EXP)).unwrap();
        assert!(!kern.is_apple());
        assert_eq!(kern.num_tables(), 1);
        let subtable = kern.subtables().next().unwrap().unwrap();
        assert_eq!(subtable.format(), 0);
        assert!(subtable.is_horizontal());
        assert!(!subtable.is_cross_stream());
        let kind = subtable.kind().unwrap();
        let SubtableKind::Format0(format0) = &kind else {
            panic!("expected a format 0 subtable");
        };
        assert_eq!(format0.pairs().len(), 3);
        assert_eq!(kind.kerning(gid(104), gid(504)), Some(-42));
        assert_eq!(kind.kerning(gid(36), gid(57)), Some(-10));
        assert_eq!(kind.kerning(gid(504), gid(1108)), None);
        assert_eq!(kind.kerning(gid(0x10000), gid(504)), None);
    }

    #[test]
    fn apple_formats_2_and_3() {
        let data = kern::apple_kern_2_3();
        let kern = Kern::read(FontData::new(&data)).unwrap();
        assert!(kern.is_apple());
        let subtables: Vec<_> = kern.subtables().map(|s| s.unwrap()).collect();
        assert_eq!(subtables.len(), 2);
        assert_eq!(subtables[0].format(), 2);
        assert_eq!(subtables[1].format(), 3);
        let format2 = subtables[0].kind().unwrap();
        assert_eq!(format2.kerning(gid(10), gid(20)), Some(0));
        assert_eq!(format2.kerning(gid(10), gid(21)), Some(-30));
        assert_eq!(format2.kerning(gid(11), gid(20)), Some(15));
        assert_eq!(format2.kerning(gid(11), gid(21)), Some(-5));
        assert_eq!(format2.kerning(gid(12), gid(20)), None);
        let format3 = subtables[1].kind().unwrap();
        assert_eq!(format3.kerning(gid(0), gid(2)), Some(-20));
        assert_eq!(format3.kerning(gid(1), gid(0)), Some(40));
        assert_eq!(format3.kerning(gid(1), gid(2)), Some(0));
        assert_eq!(format3.kerning(gid(4), gid(0)), None);
    }

    #[test]
    fn truncated_subtable_stops_iteration() {
        let data = &kern::KERN0_EXP[..20];
        let kern = Kern::read(FontData::new(data)).unwrap();
        let mut subtables = kern.subtables();
        assert!(subtables.next().unwrap().is_err());
        assert!(subtables.next().is_none());
    }
}
