//! Apple Advanced Typography common tables.
//!
//! See <https://developer.apple.com/fonts/TrueType-Reference-Manual/RM06/Chap6Tables.html>

use std::marker::PhantomData;

use types::{GlyphId, GlyphId16, Scalar};

use crate::{Array, FixedRecord, FontData, FontRead, ReadError};

/// Predefined classes.
///
/// See <https://developer.apple.com/fonts/TrueType-Reference-Manual/RM06/Chap6Tables.html>
pub mod class {
    pub const END_OF_TEXT: u8 = 0;
    pub const OUT_OF_BOUNDS: u8 = 1;
    pub const DELETED_GLYPH: u8 = 2;
    pub const END_OF_LINE: u8 = 3;
}

/// Trait for values that can be read from lookup tables.
pub trait LookupValue: Copy + Scalar {
    fn from_u16(v: u16) -> Self;
    fn from_u32(v: u32) -> Self;
}

impl LookupValue for u16 {
    fn from_u16(v: u16) -> Self {
        v
    }

    fn from_u32(v: u32) -> Self {
        // intentionally truncates
        v as _
    }
}

impl LookupValue for u32 {
    fn from_u16(v: u16) -> Self {
        v as _
    }

    fn from_u32(v: u32) -> Self {
        v
    }
}

impl LookupValue for GlyphId16 {
    fn from_u16(v: u16) -> Self {
        GlyphId16::new(v)
    }

    fn from_u32(v: u32) -> Self {
        // intentionally truncates
        GlyphId16::new(v as u16)
    }
}

/// Binary search header shared by lookup formats 2, 4 and 6.
#[derive(Copy, Clone, Debug)]
pub struct BinSearch<'a> {
    /// The complete lookup table; format 4 value offsets are relative to it.
    data: FontData<'a>,
    unit_size: usize,
    units: FontData<'a>,
    n_units: usize,
}

impl<'a> BinSearch<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let unit_size: u16 = data.read_at(2)?;
        let mut n_units: u16 = data.read_at(4)?;
        if unit_size == 0 {
            return Err(ReadError::MalformedData("zero unit size in AAT lookup"));
        }
        let units = data.slice_len(12, unit_size as usize * n_units as usize)?;
        // a trailing 0xFFFF terminator unit is optional
        if n_units > 0 && units.read_at::<u16>((n_units as usize - 1) * unit_size as usize)? == 0xFFFF
        {
            n_units -= 1;
        }
        Ok(Self {
            data,
            unit_size: unit_size as usize,
            units,
            n_units: n_units as usize,
        })
    }

    pub fn len(&self) -> usize {
        self.n_units
    }

    pub fn is_empty(&self) -> bool {
        self.n_units == 0
    }

    /// Returns the position of the unit whose key field, read at
    /// `key_offset`, is the greatest key not larger than `glyph_id`.
    fn search(&self, glyph_id: u16, key_offset: usize) -> Option<usize> {
        let key = |ix: usize| {
            self.units
                .read_at::<u16>(ix * self.unit_size + key_offset)
                .ok()
        };
        let mut lo = 0;
        let mut hi = self.n_units;
        while lo < hi {
            let mid = (lo + hi) / 2;
            if key(mid)? <= glyph_id {
                lo = mid + 1;
            } else {
                hi = mid;
            }
        }
        lo.checked_sub(1)
    }

    fn read_unit<T: Scalar>(&self, ix: usize, field_offset: usize) -> Result<T, ReadError> {
        self.units.read_at(ix * self.unit_size + field_offset)
    }
}

/// An AAT lookup table, mapping glyph identifiers to values.
///
/// See <https://developer.apple.com/fonts/TrueType-Reference-Manual/RM06/Chap6Tables.html#LookupTables>
#[derive(Copy, Clone, Debug)]
pub enum Lookup<'a> {
    /// Simple array indexed by glyph identifier.
    Format0(FontData<'a>),
    /// Segments mapping a range of glyphs to a single value.
    Format2(BinSearch<'a>),
    /// Segments mapping a range of glyphs to an array of values.
    Format4(BinSearch<'a>),
    /// Sorted glyph/value pairs.
    Format6(BinSearch<'a>),
    /// Trimmed array of 16-bit values.
    Format8 {
        first_glyph: u16,
        values: Array<'a, u16>,
    },
    /// Trimmed array of values with variable size.
    Format10 {
        unit_size: u16,
        first_glyph: u16,
        values: FontData<'a>,
    },
}

impl<'a> FontRead<'a> for Lookup<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let format: u16 = data.read_at(0)?;
        match format {
            0 => Ok(Self::Format0(data.split_off(2).unwrap_or_default())),
            2 => Ok(Self::Format2(BinSearch::read(data)?)),
            4 => Ok(Self::Format4(BinSearch::read(data)?)),
            6 => Ok(Self::Format6(BinSearch::read(data)?)),
            8 => {
                let first_glyph = data.read_at(2)?;
                let count: u16 = data.read_at(4)?;
                Ok(Self::Format8 {
                    first_glyph,
                    values: data.read_array(6, count as usize)?,
                })
            }
            10 => {
                let unit_size = data.read_at(2)?;
                let first_glyph = data.read_at(4)?;
                let count: u16 = data.read_at(6)?;
                let values = data.slice_len(8, count as usize * unit_size as usize)?;
                Ok(Self::Format10 {
                    unit_size,
                    first_glyph,
                    values,
                })
            }
            _ => Err(ReadError::InvalidFormat(format.into())),
        }
    }
}

impl Lookup<'_> {
    /// Returns the value associated with the given glyph identifier.
    pub fn value<T: LookupValue>(&self, index: u16) -> Result<T, ReadError> {
        match self {
            Self::Format0(values) => values.read_at(index as usize * T::RAW_BYTE_LEN),
            Self::Format2(segments) => {
                let ix = segments
                    .search(index, 2)
                    .ok_or(ReadError::OutOfBounds)?;
                let last: u16 = segments.read_unit(ix, 0)?;
                if index <= last {
                    segments.read_unit(ix, 4)
                } else {
                    Err(ReadError::OutOfBounds)
                }
            }
            Self::Format4(segments) => {
                let ix = segments
                    .search(index, 2)
                    .ok_or(ReadError::OutOfBounds)?;
                let last: u16 = segments.read_unit(ix, 0)?;
                let first: u16 = segments.read_unit(ix, 2)?;
                if index > last {
                    return Err(ReadError::OutOfBounds);
                }
                let base_offset: u16 = segments.read_unit(ix, 4)?;
                let offset = base_offset as usize + (index - first) as usize * T::RAW_BYTE_LEN;
                segments.data.read_at(offset)
            }
            Self::Format6(entries) => {
                let ix = entries.search(index, 0).ok_or(ReadError::OutOfBounds)?;
                let glyph: u16 = entries.read_unit(ix, 0)?;
                if glyph == index {
                    entries.read_unit(ix, 2)
                } else {
                    Err(ReadError::OutOfBounds)
                }
            }
            Self::Format8 {
                first_glyph,
                values,
            } => index
                .checked_sub(*first_glyph)
                .and_then(|ix| values.get(ix as usize))
                .map(T::from_u16)
                .ok_or(ReadError::OutOfBounds),
            Self::Format10 {
                unit_size,
                first_glyph,
                values,
            } => {
                let ix = index
                    .checked_sub(*first_glyph)
                    .ok_or(ReadError::OutOfBounds)? as usize;
                let offset = ix * *unit_size as usize;
                let value = match unit_size {
                    1 => values.read_at::<u8>(offset)? as u32,
                    2 => values.read_at::<u16>(offset)? as u32,
                    4 => values.read_at::<u32>(offset)?,
                    _ => {
                        return Err(ReadError::MalformedData(
                            "invalid unit_size in format 10 AAT lookup table",
                        ))
                    }
                };
                Ok(T::from_u32(value))
            }
        }
    }
}

/// A lookup table with a known value type.
#[derive(Copy, Clone, Debug)]
pub struct TypedLookup<'a, T> {
    pub lookup: Lookup<'a>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: LookupValue> TypedLookup<'_, T> {
    /// Returns the value associated with the given index.
    pub fn value(&self, index: u16) -> Result<T, ReadError> {
        self.lookup.value::<T>(index)
    }
}

impl<'a, T> FontRead<'a> for TypedLookup<'a, T> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        Ok(Self {
            lookup: Lookup::read(data)?,
            _marker: PhantomData,
        })
    }
}

pub type LookupU16<'a> = TypedLookup<'a, u16>;
pub type LookupU32<'a> = TypedLookup<'a, u32>;
pub type LookupGlyphId<'a> = TypedLookup<'a, GlyphId16>;

/// Empty data type for a state table entry with no payload.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct NoPayload;

impl<'a> FixedRecord<'a> for NoPayload {
    const RAW_BYTE_LEN: usize = 0;

    fn read_record(_data: FontData<'a>) -> Result<Self, ReadError> {
        Ok(Self)
    }
}

impl<'a> FixedRecord<'a> for u16 {
    const RAW_BYTE_LEN: usize = 2;

    fn read_record(data: FontData<'a>) -> Result<Self, ReadError> {
        data.read_at(0)
    }
}

/// Entry in an extended state table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StateEntry<T = NoPayload> {
    /// Index of the next state.
    pub new_state: u16,
    /// Flag values are table specific.
    pub flags: u16,
    /// Payload is table specific.
    pub payload: T,
}

impl<'a, T: FixedRecord<'a>> FixedRecord<'a> for StateEntry<T> {
    // Two u16 fields + payload
    const RAW_BYTE_LEN: usize = 4 + T::RAW_BYTE_LEN;

    fn read_record(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let new_state = cursor.read()?;
        let flags = cursor.read()?;
        let remaining = cursor.remaining().unwrap_or_default();
        let payload = T::read_record(remaining)?;
        Ok(Self {
            new_state,
            flags,
            payload,
        })
    }
}

/// Table for driving a finite state machine for layout.
///
/// The input to the state machine consists of the current state and a
/// glyph class. The output is an [entry](StateEntry) containing the next
/// state and a payload that is dependent on the type of layout action
/// being performed.
///
/// See <https://developer.apple.com/fonts/TrueType-Reference-Manual/RM06/Chap6Tables.html#StateHeader>
#[derive(Clone, Debug)]
pub struct ExtendedStateTable<'a, T = NoPayload> {
    pub n_classes: usize,
    pub class_table: LookupU16<'a>,
    state_array: Array<'a, u16>,
    entry_table: FontData<'a>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> ExtendedStateTable<'_, T> {
    /// nClasses and the class table, state array and entry table offsets.
    pub const HEADER_LEN: usize = 16;
}

impl<'a, T: FixedRecord<'a>> ExtendedStateTable<'a, T> {
    /// Returns the class table entry for the given glyph identifier.
    ///
    /// Glyphs not covered by the class table are out of bounds.
    pub fn class(&self, glyph_id: GlyphId) -> u16 {
        let Ok(glyph_id) = u16::try_from(glyph_id.to_u32()) else {
            return class::OUT_OF_BOUNDS as u16;
        };
        if glyph_id == 0xFFFF {
            return class::DELETED_GLYPH as u16;
        }
        self.class_table
            .value(glyph_id)
            .unwrap_or(class::OUT_OF_BOUNDS as u16)
    }

    /// The number of states in the state array.
    pub fn n_states(&self) -> usize {
        self.state_array.len() / self.n_classes
    }

    /// The number of entries referenced by the state array.
    pub fn n_entries(&self) -> usize {
        self.state_array
            .iter()
            .max()
            .map(|max| max as usize + 1)
            .unwrap_or_default()
    }

    /// Returns the entry for the given state and class.
    pub fn entry(&self, state: u16, class: u16) -> Result<StateEntry<T>, ReadError> {
        let mut class = class as usize;
        if class >= self.n_classes {
            class = class::OUT_OF_BOUNDS as usize;
        }
        let state_ix = state as usize * self.n_classes + class;
        let entry_ix = self
            .state_array
            .get(state_ix)
            .ok_or(ReadError::OutOfBounds)? as usize;
        let entry_offset = entry_ix * <StateEntry<T> as FixedRecord<'a>>::RAW_BYTE_LEN;
        let entry_data = self
            .entry_table
            .split_off(entry_offset)
            .ok_or(ReadError::OutOfBounds)?;
        StateEntry::read_record(entry_data)
    }
}

impl<'a, T> FontRead<'a> for ExtendedStateTable<'a, T> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let n_classes = cursor.read::<u32>()? as usize;
        if n_classes == 0 {
            return Err(ReadError::MalformedData("empty AAT state table"));
        }
        let class_table_offset = cursor.read::<u32>()? as usize;
        let state_array_offset = cursor.read::<u32>()? as usize;
        let entry_table_offset = cursor.read::<u32>()? as usize;
        let class_table = LookupU16::read(
            data.split_off(class_table_offset)
                .ok_or(ReadError::OutOfBounds)?,
        )?;
        // the state array has no explicit length; it usually ends where the
        // entry table begins
        let state_array_data = if entry_table_offset > state_array_offset {
            data.slice(state_array_offset..entry_table_offset)
        } else {
            data.split_off(state_array_offset)
        }
        .ok_or(ReadError::OutOfBounds)?;
        let entry_table = data
            .split_off(entry_table_offset)
            .ok_or(ReadError::OutOfBounds)?;
        Ok(Self {
            n_classes,
            class_table,
            state_array: Array::new(state_array_data.as_bytes()),
            entry_table,
            _marker: PhantomData,
        })
    }
}

/// Reads an array of `T` from `offset` to the end of the data, dropping a
/// trailing partial element.
///
/// Many of the `morx` subtables have arrays without associated lengths so
/// we simply read to the end of the available data.
pub(crate) fn read_array_to_end<'a, T: Scalar>(
    data: &FontData<'a>,
    offset: usize,
) -> Result<Array<'a, T>, ReadError> {
    let tail = data.split_off(offset).ok_or(ReadError::OutOfBounds)?;
    Ok(Array::new(tail.as_bytes()))
}

/// Reads an array of `T` from `offset` up to the nearest of `ends` that lies
/// past it, or to the end of the data when none does.
///
/// Used for unsized arrays that are packed one after another.
pub(crate) fn read_array_until<'a, T: Scalar>(
    data: &FontData<'a>,
    offset: usize,
    ends: &[usize],
) -> Result<Array<'a, T>, ReadError> {
    let end = ends
        .iter()
        .copied()
        .filter(|end| *end > offset)
        .min()
        .unwrap_or(data.len());
    let bytes = data
        .slice(offset..end.min(data.len()))
        .ok_or(ReadError::OutOfBounds)?;
    Ok(Array::new(bytes.as_bytes()))
}

#[cfg(test)]
mod tests {
    use font_test_data::bebuffer::BeBuffer;

    use super::*;

    #[test]
    fn lookup_format_0() {
        #[rustfmt::skip]
        let words = [
            0_u16, // format
            0, 2, 4, 6, 8, 10, 12, 14, 16, // maps all glyphs to gid * 2
        ];
        let buf = BeBuffer::new().extend(words);
        let lookup = LookupU16::read(FontData::new(&buf)).unwrap();
        for gid in 0..=8 {
            assert_eq!(lookup.value(gid).unwrap(), gid * 2);
        }
        assert!(lookup.value(9).is_err());
    }

    // Taken from example 2 at https://developer.apple.com/fonts/TrueType-Reference-Manual/RM06/Chap6morx.html
    #[test]
    fn lookup_format_2() {
        #[rustfmt::skip]
        let words = [
            2_u16, // format
            6,     // unit size (6 bytes)
            3,     // number of units
            12,    // search range
            1,     // entry selector
            6,     // range shift
            22, 20, 4, // First segment, mapping glyphs 20 through 22 to class 4
            24, 23, 5, // Second segment, mapping glyph 23 and 24 to class 5
            28, 25, 6, // Third segment, mapping glyphs 25 through 28 to class 6
        ];
        let buf = BeBuffer::new().extend(words);
        let lookup = LookupU16::read(FontData::new(&buf)).unwrap();
        let expected = [(20..=22, 4), (23..=24, 5), (25..=28, 6)];
        for (range, class) in expected {
            for gid in range {
                assert_eq!(lookup.value(gid).unwrap(), class);
            }
        }
        for fail in [0, 10, 19, 29, 0xFFFF] {
            assert!(lookup.value(fail).is_err());
        }
    }

    #[test]
    fn lookup_format_4() {
        #[rustfmt::skip]
        let words = [
            4_u16, // format
            6,     // unit size (6 bytes)
            3,     // number of units
            12,    // search range
            1,     // entry selector
            6,     // range shift
            22, 20, 30, // glyphs 20 through 22 map to data at offset 30
            24, 23, 36, // glyphs 23 and 24 map to data at offset 36
            28, 25, 40, // glyphs 25 through 28 map to data at offset 40
            // mapped data
            3, 2, 1,
            100, 150,
            8, 6, 7, 9
        ];
        let buf = BeBuffer::new().extend(words);
        let lookup = LookupU16::read(FontData::new(&buf)).unwrap();
        let expected = [
            (20, 3),
            (21, 2),
            (22, 1),
            (23, 100),
            (24, 150),
            (25, 8),
            (26, 6),
            (27, 7),
            (28, 9),
        ];
        for (in_glyph, out_glyph) in expected {
            assert_eq!(lookup.value(in_glyph).unwrap(), out_glyph);
        }
        for fail in [0, 10, 19, 29, 0xFFFF] {
            assert!(lookup.value(fail).is_err());
        }
    }

    // Taken from example 1 at https://developer.apple.com/fonts/TrueType-Reference-Manual/RM06/Chap6morx.html
    #[test]
    fn lookup_format_6() {
        #[rustfmt::skip]
        let words = [
            6_u16, // format
            4,     // unit size (4 bytes)
            4,     // number of units
            16,    // search range
            2,     // entry selector
            0,     // range shift
            50, 600, // Input glyph 50 maps to glyph 600
            51, 601, // Input glyph 51 maps to glyph 601
            201, 602, // Input glyph 201 maps to glyph 602
            202, 900, // Input glyph 202 maps to glyph 900
        ];
        let buf = BeBuffer::new().extend(words);
        let lookup = LookupGlyphId::read(FontData::new(&buf)).unwrap();
        let expected = [(50, 600), (51, 601), (201, 602), (202, 900)];
        for (in_glyph, out_glyph) in expected {
            assert_eq!(lookup.value(in_glyph).unwrap().to_u16(), out_glyph);
        }
        for fail in [0, 10, 49, 52, 203, 0xFFFF] {
            assert!(lookup.value(fail).is_err());
        }
    }

    #[test]
    fn lookup_format_8() {
        #[rustfmt::skip]
        let words = [
            8_u16, // format
            201,   // first glyph
            7,     // glyph count
            0, 3, 2, 1, 1, 1, 0, // classes
        ];
        let buf = BeBuffer::new().extend(words);
        let lookup = LookupU16::read(FontData::new(&buf)).unwrap();
        let expected = [0, 3, 2, 1, 1, 1, 0];
        for (gid, class) in (201..).zip(expected) {
            assert_eq!(lookup.value(gid).unwrap(), class);
        }
        for fail in [0, 200, 208, 0xFFFF] {
            assert!(lookup.value(fail).is_err());
        }
    }

    #[test]
    fn lookup_format_10() {
        let buf = BeBuffer::new()
            .extend([10u16, 4, 201, 3])
            .extend([0x0001_0000u32, 2, 0xFFFF_FFFF]);
        let lookup = LookupU32::read(FontData::new(&buf)).unwrap();
        assert_eq!(lookup.value(201).unwrap(), 0x0001_0000);
        assert_eq!(lookup.value(202).unwrap(), 2);
        assert_eq!(lookup.value(203).unwrap(), 0xFFFF_FFFF);
        assert!(lookup.value(204).is_err());
        assert!(lookup.value(200).is_err());
    }

    #[test]
    fn extended_state_table() {
        let body = font_test_data::morx::ligature_subtable_body();
        let table = ExtendedStateTable::<u16>::read(FontData::new(&body)).unwrap();
        assert_eq!(table.n_classes, 7);
        assert_eq!(table.class(GlyphId::new(10)), 4);
        assert_eq!(table.class(GlyphId::new(12)), 6);
        assert_eq!(table.class(GlyphId::new(13)), class::OUT_OF_BOUNDS as u16);
        assert_eq!(table.class(GlyphId::new(0xFFFF)), class::DELETED_GLYPH as u16);
        // f in the start state moves to state 2
        let entry = table.entry(0, 4).unwrap();
        assert_eq!(entry.new_state, 2);
        assert_eq!(entry.flags, 0x8000);
        // l in state 2 performs the second ligature action
        let entry = table.entry(2, 6).unwrap();
        assert_eq!(
            entry,
            StateEntry {
                new_state: 0,
                flags: 0xA000,
                payload: 2
            }
        );
        // classes beyond the table are treated as out of bounds
        assert_eq!(table.entry(2, 40).unwrap().new_state, 0);
        assert!(table.entry(9, 0).is_err());
    }
}
