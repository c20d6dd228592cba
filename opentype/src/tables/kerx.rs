//! The [Extended Kerning (kerx)](https://developer.apple.com/fonts/TrueType-Reference-Manual/RM06/Chap6kerx.html) table.

use types::{GlyphId, Tag};

use super::aat::{read_array_to_end, ExtendedStateTable, LookupU16, LookupU32};
use crate::{record, Array, FontData, FontRead, ReadError, RecordArray};

/// 'kerx'
pub const TAG: Tag = Tag::new(b"kerx");

/// length, coverage, tuple_count: all u32
const SUBTABLE_HEADER_SIZE: usize = 12;

/// The extended kerning table.
#[derive(Clone, Debug)]
pub struct Kerx<'a> {
    version: u16,
    n_tables: u32,
    subtables_data: FontData<'a>,
}

impl<'a> FontRead<'a> for Kerx<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let version: u16 = data.read_at(0)?;
        if version < 2 {
            return Err(ReadError::InvalidFormat(version as i64));
        }
        Ok(Self {
            version,
            n_tables: data.read_at(4)?,
            subtables_data: data.split_off(8).unwrap_or_default(),
        })
    }
}

impl<'a> Kerx<'a> {
    pub fn version(&self) -> u16 {
        self.version
    }

    pub fn n_tables(&self) -> u32 {
        self.n_tables
    }

    /// Returns an iterator over the subtables.
    ///
    /// Each subtable records its own length, so iteration ends at the
    /// first subtable that cannot be delimited.
    pub fn subtables(&self) -> impl Iterator<Item = Result<Subtable<'a>, ReadError>> + 'a {
        let mut data = self.subtables_data;
        let mut remaining = self.n_tables;
        std::iter::from_fn(move || {
            if remaining == 0 {
                return None;
            }
            remaining -= 1;
            let result = Subtable::read(data);
            match &result {
                Ok(subtable) => data = data.split_off(subtable.data.len()).unwrap_or_default(),
                Err(_) => remaining = 0,
            }
            Some(result)
        })
    }
}

/// A single `kerx` subtable.
#[derive(Clone, Debug)]
pub struct Subtable<'a> {
    coverage: u32,
    tuple_count: u32,
    /// The complete subtable, including its header.
    data: FontData<'a>,
}

impl<'a> Subtable<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let length = data.read_at::<u32>(0)? as usize;
        if length < SUBTABLE_HEADER_SIZE {
            return Err(ReadError::MalformedData("kerx subtable shorter than header"));
        }
        Ok(Self {
            coverage: data.read_at(4)?,
            tuple_count: data.read_at(8)?,
            data: data.take_up_to(length).ok_or(ReadError::OutOfBounds)?,
        })
    }

    pub fn coverage(&self) -> u32 {
        self.coverage
    }

    /// The number of tuples for variation kerning values; zero if the
    /// values are not variable.
    pub fn tuple_count(&self) -> u32 {
        self.tuple_count
    }

    /// The format is the low byte of the coverage field.
    pub fn format(&self) -> u8 {
        (self.coverage & 0xFF) as u8
    }

    /// True if the table has vertical kerning values.
    #[inline]
    pub fn is_vertical(&self) -> bool {
        self.coverage & 0x8000_0000 != 0
    }

    /// True if the table has horizontal kerning values.
    #[inline]
    pub fn is_horizontal(&self) -> bool {
        !self.is_vertical()
    }

    /// True if the table has cross-stream kerning values.
    #[inline]
    pub fn is_cross_stream(&self) -> bool {
        self.coverage & 0x4000_0000 != 0
    }

    /// True if the table has variation kerning values.
    #[inline]
    pub fn is_variable(&self) -> bool {
        self.coverage & 0x2000_0000 != 0
    }

    /// If set, the state table based formats (1 and 4) process glyphs
    /// from last to first.
    #[inline]
    pub fn process_direction(&self) -> bool {
        self.coverage & 0x1000_0000 != 0
    }

    /// Returns an enum representing the actual subtable data.
    pub fn kind(&self) -> Result<SubtableKind<'a>, ReadError> {
        let body = self
            .data
            .split_off(SUBTABLE_HEADER_SIZE)
            .unwrap_or_default();
        match self.format() {
            0 => Ok(SubtableKind::Format0(Subtable0::read(body)?)),
            1 => Ok(SubtableKind::Format1(Subtable1::read(body)?)),
            2 => Ok(SubtableKind::Format2(Subtable2::read(self.data)?)),
            4 => Ok(SubtableKind::Format4(Subtable4::read(body)?)),
            6 => Ok(SubtableKind::Format6(Subtable6::read(self.data)?)),
            format => Err(ReadError::InvalidFormat(format as i64)),
        }
    }
}

/// The various `kerx` subtable formats.
#[derive(Clone, Debug)]
pub enum SubtableKind<'a> {
    Format0(Subtable0<'a>),
    Format1(Subtable1<'a>),
    Format2(Subtable2<'a>),
    Format4(Subtable4<'a>),
    Format6(Subtable6<'a>),
}

impl SubtableKind<'_> {
    /// Returns the kerning adjustment for the given pair.
    ///
    /// The state table formats depend on context and always return
    /// `None`.
    pub fn kerning(&self, left: GlyphId, right: GlyphId) -> Option<i32> {
        match self {
            Self::Format0(subtable) => subtable.kerning(left, right).map(Into::into),
            Self::Format2(subtable) => subtable.kerning(left, right).map(Into::into),
            Self::Format6(subtable) => subtable.kerning(left, right),
            Self::Format1(_) | Self::Format4(_) => None,
        }
    }
}

record! {
    /// A kerning pair in a format 0 subtable.
    pub struct KerxPair {
        pub left: u16,
        pub right: u16,
        pub value: i16,
    }
}

/// Ordered list of kerning pairs.
#[derive(Clone, Debug)]
pub struct Subtable0<'a> {
    pairs: RecordArray<'a, KerxPair>,
}

impl<'a> Subtable0<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let n_pairs: u32 = data.read_at(0)?;
        Ok(Self {
            pairs: data.read_records(16, n_pairs as usize)?,
        })
    }

    pub fn pairs(&self) -> RecordArray<'a, KerxPair> {
        self.pairs
    }

    /// Returns the kerning adjustment for the given pair.
    pub fn kerning(&self, left: GlyphId, right: GlyphId) -> Option<i16> {
        let left = u16::try_from(left.to_u32()).ok()?;
        let right = u16::try_from(right.to_u32()).ok()?;
        let key = |l: u16, r: u16| (l as u32) << 16 | r as u32;
        let ix = self
            .pairs
            .binary_search_by_key(&key(left, right), |pair| key(pair.left, pair.right))
            .ok()?;
        self.pairs.get(ix).map(|pair| pair.value)
    }
}

/// Contextual kerning driven by a state table.
#[derive(Clone, Debug)]
pub struct Subtable1<'a> {
    /// Entry payloads are indices into `values`.
    pub state_table: ExtendedStateTable<'a, u16>,
    /// Contains the set of kerning values, one for each state.
    pub values: Array<'a, i16>,
}

impl<'a> Subtable1<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let state_table = ExtendedStateTable::read(data)?;
        let values_offset: u32 = data.read_at(ExtendedStateTable::<()>::HEADER_LEN)?;
        Ok(Self {
            state_table,
            values: read_array_to_end(&data, values_offset as usize)?,
        })
    }
}

/// Class based kerning with AAT lookup tables.
///
/// The class values are element indices whose sum locates the kerning
/// value in the array.
#[derive(Clone, Debug)]
pub struct Subtable2<'a> {
    data: FontData<'a>,
    row_width: u32,
    left_offset_table: LookupU16<'a>,
    right_offset_table: LookupU16<'a>,
    array_offset: usize,
}

impl<'a> Subtable2<'a> {
    /// Offsets here are from the start of the subtable, header included.
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        cursor.advance_by(SUBTABLE_HEADER_SIZE);
        let row_width = cursor.read()?;
        let left_offset = cursor.read::<u32>()? as usize;
        let right_offset = cursor.read::<u32>()? as usize;
        let array_offset = cursor.read::<u32>()? as usize;
        let lookup_at = |offset: usize| {
            data.split_off(offset)
                .ok_or(ReadError::OutOfBounds)
                .and_then(LookupU16::read)
        };
        Ok(Self {
            data,
            row_width,
            left_offset_table: lookup_at(left_offset)?,
            right_offset_table: lookup_at(right_offset)?,
            array_offset,
        })
    }

    /// The width in bytes of one row of the kerning array.
    pub fn row_width(&self) -> u32 {
        self.row_width
    }

    /// Returns the kerning adjustment for the given pair.
    pub fn kerning(&self, left: GlyphId, right: GlyphId) -> Option<i16> {
        let left = u16::try_from(left.to_u32()).ok()?;
        let right = u16::try_from(right.to_u32()).ok()?;
        let left_class = self.left_offset_table.value(left).unwrap_or(0) as usize;
        let right_class = self.right_offset_table.value(right).unwrap_or(0) as usize;
        let offset = self.array_offset + (left_class + right_class) * 2;
        self.data.read_at(offset).ok()
    }
}

/// Control point or anchor point kerning driven by a state table.
#[derive(Clone, Debug)]
pub struct Subtable4<'a> {
    /// Entry payloads are indices into the action data.
    pub state_table: ExtendedStateTable<'a, u16>,
    /// Flags for control point positioning.
    pub flags: u32,
}

impl<'a> Subtable4<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let state_table = ExtendedStateTable::read(data)?;
        let flags = data.read_at(ExtendedStateTable::<()>::HEADER_LEN)?;
        Ok(Self { state_table, flags })
    }

    /// 0 for control point actions, 1 for anchor points from `ankr` and
    /// 2 for coordinate actions.
    pub fn action_type(&self) -> u8 {
        ((self.flags >> 30) & 0x3) as u8
    }

    /// Offset of the action data from the start of the subtable body.
    pub fn action_offset(&self) -> u32 {
        self.flags & 0x00FF_FFFF
    }
}

/// Row and column index lookups over a two dimensional kerning array.
#[derive(Clone, Debug)]
pub enum IndexTables<'a> {
    Short {
        rows: LookupU16<'a>,
        columns: LookupU16<'a>,
    },
    Long {
        rows: LookupU32<'a>,
        columns: LookupU32<'a>,
    },
}

/// Kerning with 16 or 32 bit index lookups into a value array.
#[derive(Clone, Debug)]
pub struct Subtable6<'a> {
    data: FontData<'a>,
    pub flags: u32,
    pub row_count: u16,
    pub column_count: u16,
    indices: IndexTables<'a>,
    array_offset: usize,
}

impl<'a> Subtable6<'a> {
    const VALUES_ARE_LONG: u32 = 0x0000_0001;

    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        cursor.advance_by(SUBTABLE_HEADER_SIZE);
        let flags: u32 = cursor.read()?;
        let row_count = cursor.read()?;
        let column_count = cursor.read()?;
        let row_offset = cursor.read::<u32>()? as usize;
        let column_offset = cursor.read::<u32>()? as usize;
        let array_offset = cursor.read::<u32>()? as usize;
        let at = |offset: usize| data.split_off(offset).ok_or(ReadError::OutOfBounds);
        let indices = if flags & Self::VALUES_ARE_LONG != 0 {
            IndexTables::Long {
                rows: LookupU32::read(at(row_offset)?)?,
                columns: LookupU32::read(at(column_offset)?)?,
            }
        } else {
            IndexTables::Short {
                rows: LookupU16::read(at(row_offset)?)?,
                columns: LookupU16::read(at(column_offset)?)?,
            }
        };
        Ok(Self {
            data,
            flags,
            row_count,
            column_count,
            indices,
            array_offset,
        })
    }

    /// Returns the kerning adjustment for the given pair.
    pub fn kerning(&self, left: GlyphId, right: GlyphId) -> Option<i32> {
        let left = u16::try_from(left.to_u32()).ok()?;
        let right = u16::try_from(right.to_u32()).ok()?;
        match &self.indices {
            IndexTables::Short { rows, columns } => {
                let ix = rows.value(left).unwrap_or(0) as usize
                    + columns.value(right).unwrap_or(0) as usize;
                let value: i16 = self.data.read_at(self.array_offset + ix * 2).ok()?;
                Some(value.into())
            }
            IndexTables::Long { rows, columns } => {
                let ix = (rows.value(left).unwrap_or(0) as usize)
                    .checked_add(columns.value(right).unwrap_or(0) as usize)?;
                let offset = ix.checked_mul(4)?.checked_add(self.array_offset)?;
                self.data.read_at(offset).ok()
            }
        }
    }
}
