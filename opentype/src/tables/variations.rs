//! OpenType font variations common tables.

use types::{F2Dot14, Fixed, GlyphId, Scalar, Uint24};

use crate::{record, Array, Cursor, FontData, FontRead, ReadError, RecordArray};

/// Outer and inner indices for reading from an [ItemVariationStore].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct DeltaSetIndex {
    /// Outer delta set index.
    pub outer: u16,
    /// Inner delta set index.
    pub inner: u16,
}

impl DeltaSetIndex {
    /// The sentinel meaning "no variation data" in tables such as GDEF device
    /// records.
    pub const NO_VARIATION_INDEX: Self = Self {
        outer: 0xFFFF,
        inner: 0xFFFF,
    };
}

/// The [ItemVariationStore](https://learn.microsoft.com/en-us/typography/opentype/spec/otvarcommonformats#item-variation-store)
#[derive(Clone, Debug)]
pub struct ItemVariationStore<'a> {
    data: FontData<'a>,
    item_variation_data_offsets: Array<'a, u32>,
}

impl<'a> FontRead<'a> for ItemVariationStore<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        data.check_len(8)?;
        let format: u16 = data.read_at(0)?;
        if format != 1 {
            return Err(ReadError::InvalidFormat(format.into()));
        }
        let count: u16 = data.read_at(6)?;
        let item_variation_data_offsets = data.read_array(8, count as usize)?;
        Ok(ItemVariationStore {
            data,
            item_variation_data_offsets,
        })
    }
}

impl<'a> ItemVariationStore<'a> {
    pub fn variation_region_list_offset(&self) -> u32 {
        self.data.read_at(2).unwrap_or_default()
    }

    pub fn variation_region_list(&self) -> Result<VariationRegionList<'a>, ReadError> {
        self.data.resolve_offset(self.variation_region_list_offset())
    }

    /// The number of item variation data subtables.
    pub fn item_variation_data_count(&self) -> usize {
        self.item_variation_data_offsets.len()
    }

    /// Returns the item variation data at the given outer index.
    ///
    /// Null offsets are permitted and produce `None`.
    pub fn item_variation_data(&self, outer: usize) -> Option<Result<ItemVariationData<'a>, ReadError>> {
        let offset = self.item_variation_data_offsets.get(outer)?;
        self.data.resolve_nullable(offset)
    }

    /// Computes the delta value for the specified index and set of normalized
    /// variation coordinates.
    ///
    /// Indices outside of the store produce a zero delta.
    pub fn compute_delta(&self, index: DeltaSetIndex, coords: &[F2Dot14]) -> Result<i32, ReadError> {
        self.compute_delta_fixed(index, coords)
            .map(|delta| delta.round_to_i32())
    }

    /// Like [`compute_delta`](Self::compute_delta) but retains the
    /// fractional part.
    pub fn compute_delta_fixed(
        &self,
        index: DeltaSetIndex,
        coords: &[F2Dot14],
    ) -> Result<Fixed, ReadError> {
        let data = match self.item_variation_data(index.outer as usize) {
            Some(data) => data?,
            None => return Ok(Fixed::ZERO),
        };
        let regions = self.variation_region_list()?;
        let region_indices = data.region_indexes();
        // Compute deltas with 64-bit precision.
        let mut accum = 0i64;
        for (i, region_delta) in data.delta_set(index.inner).enumerate() {
            let region_index = region_indices
                .get(i)
                .ok_or(ReadError::MalformedData(
                    "invalid delta sets in ItemVariationStore",
                ))? as usize;
            let region = regions.get(region_index)?;
            let scalar = region.compute_scalar(coords);
            accum += region_delta as i64 * scalar.to_bits() as i64;
        }
        Ok(Fixed::from_bits(accum.clamp(i32::MIN as i64, i32::MAX as i64) as i32))
    }
}

/// The list of regions referenced by an item variation store.
#[derive(Clone, Debug)]
pub struct VariationRegionList<'a> {
    axis_count: u16,
    regions: FontData<'a>,
    region_count: u16,
}

impl<'a> FontRead<'a> for VariationRegionList<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        data.check_len(4)?;
        let axis_count: u16 = data.read_at(0)?;
        let region_count: u16 = data.read_at(2)?;
        let len = axis_count as usize * region_count as usize * RegionAxisCoordinates::LEN;
        let regions = data.slice_len(4, len)?;
        Ok(VariationRegionList {
            axis_count,
            regions,
            region_count,
        })
    }
}

impl<'a> VariationRegionList<'a> {
    pub fn axis_count(&self) -> u16 {
        self.axis_count
    }

    pub fn region_count(&self) -> u16 {
        self.region_count
    }

    pub fn get(&self, index: usize) -> Result<VariationRegion<'a>, ReadError> {
        if index >= self.region_count as usize {
            return Err(ReadError::OutOfBounds);
        }
        let stride = self.axis_count as usize * RegionAxisCoordinates::LEN;
        let region_axes = self
            .regions
            .read_records(index * stride, self.axis_count as usize)?;
        Ok(VariationRegion { region_axes })
    }
}

record! {
    /// The extent of a region along one axis.
    pub struct RegionAxisCoordinates {
        pub start_coord: F2Dot14,
        pub peak_coord: F2Dot14,
        pub end_coord: F2Dot14,
    }
}

impl RegionAxisCoordinates {
    const LEN: usize = 3 * F2Dot14::RAW_BYTE_LEN;
}

/// A region of the design space.
#[derive(Clone, Debug)]
pub struct VariationRegion<'a> {
    region_axes: RecordArray<'a, RegionAxisCoordinates>,
}

impl<'a> VariationRegion<'a> {
    pub fn region_axes(&self) -> RecordArray<'a, RegionAxisCoordinates> {
        self.region_axes
    }

    /// Computes a scalar value for this region and the specified
    /// normalized variation coordinates.
    ///
    /// Each axis contributes a tent function: zero outside of
    /// `[start, end]`, one at the peak and linear in between. Axes with a
    /// zero peak or an invalid range do not constrain the region.
    pub fn compute_scalar(&self, coords: &[F2Dot14]) -> Fixed {
        const ZERO: Fixed = Fixed::ZERO;
        let mut scalar = Fixed::ONE;
        for (i, axis_coords) in self.region_axes.iter().enumerate() {
            let coord = coords.get(i).map(|coord| coord.to_fixed()).unwrap_or(ZERO);
            let start = axis_coords.start_coord.to_fixed();
            let end = axis_coords.end_coord.to_fixed();
            let peak = axis_coords.peak_coord.to_fixed();
            if start > peak || peak > end || peak == ZERO || start < ZERO && end > ZERO {
                continue;
            } else if coord < start || coord > end {
                return ZERO;
            } else if coord == peak {
                continue;
            } else if coord < peak {
                scalar = scalar.mul_div(coord - start, peak - start);
            } else {
                scalar = scalar.mul_div(end - coord, end - peak);
            }
        }
        scalar
    }
}

/// Rows of deltas for one set of regions.
#[derive(Clone, Debug)]
pub struct ItemVariationData<'a> {
    item_count: u16,
    word_delta_count: u16,
    region_indexes: Array<'a, u16>,
    delta_sets: &'a [u8],
}

impl<'a> FontRead<'a> for ItemVariationData<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        data.check_len(6)?;
        let item_count: u16 = data.read_at(0)?;
        let word_delta_count: u16 = data.read_at(2)?;
        let region_index_count: u16 = data.read_at(4)?;
        let region_indexes = data.read_array(6, region_index_count as usize)?;
        let delta_sets = data
            .split_off(6 + region_index_count as usize * 2)
            .unwrap_or_default()
            .as_bytes();
        Ok(ItemVariationData {
            item_count,
            word_delta_count,
            region_indexes,
            delta_sets,
        })
    }
}

impl<'a> ItemVariationData<'a> {
    pub fn item_count(&self) -> u16 {
        self.item_count
    }

    pub fn region_indexes(&self) -> Array<'a, u16> {
        self.region_indexes
    }

    /// Returns an iterator over the per-region delta values for the specified
    /// inner index.
    ///
    /// An inner index past the end of the data yields no deltas.
    pub fn delta_set(&self, inner_index: u16) -> impl Iterator<Item = i32> + 'a + Clone {
        let long_words = self.word_delta_count & 0x8000 != 0;
        let (word_size, small_size) = if long_words { (4, 2) } else { (2, 1) };
        let word_delta_count = self.word_delta_count & 0x7FFF;
        let region_count = self.region_indexes.len();
        let row_size = word_delta_count as usize * word_size
            + region_count.saturating_sub(word_delta_count as usize) * small_size;
        let offset = row_size * inner_index as usize;
        let in_range = inner_index < self.item_count;
        ItemDeltas {
            cursor: FontData::new(self.delta_sets)
                .slice(offset..)
                .filter(|_| in_range)
                .unwrap_or_default()
                .cursor(),
            word_delta_count,
            long_words,
            len: region_count as u16,
            pos: 0,
        }
    }
}

#[derive(Clone)]
struct ItemDeltas<'a> {
    cursor: Cursor<'a>,
    word_delta_count: u16,
    long_words: bool,
    len: u16,
    pos: u16,
}

impl Iterator for ItemDeltas<'_> {
    type Item = i32;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos >= self.len {
            return None;
        }
        let pos = self.pos;
        self.pos += 1;
        let value = match (pos >= self.word_delta_count, self.long_words) {
            (true, true) | (false, false) => self.cursor.read::<i16>().ok()? as i32,
            (true, false) => self.cursor.read::<i8>().ok()? as i32,
            (false, true) => self.cursor.read::<i32>().ok()?,
        };
        Some(value)
    }
}

/// Maps glyph ids (or other item indices) to delta set indices.
#[derive(Clone, Debug)]
pub struct DeltaSetIndexMap<'a> {
    entry_format: u8,
    map_count: u32,
    map_data: FontData<'a>,
}

impl<'a> FontRead<'a> for DeltaSetIndexMap<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let format: u8 = data.read_at(0)?;
        let entry_format: u8 = data.read_at(1)?;
        let (map_count, header_len) = match format {
            0 => (data.read_at::<u16>(2)? as u32, 4),
            1 => (data.read_at::<u32>(2)?, 6),
            other => return Err(ReadError::InvalidFormat(other.into())),
        };
        let entry_size = ((entry_format & 0x30) >> 4) as usize + 1;
        let map_data = data.slice_len(header_len, entry_size * map_count as usize)?;
        Ok(DeltaSetIndexMap {
            entry_format,
            map_count,
            map_data,
        })
    }
}

impl DeltaSetIndexMap<'_> {
    pub fn entry_size(&self) -> u8 {
        ((self.entry_format & 0x30) >> 4) + 1
    }

    pub fn bit_count(&self) -> u8 {
        (self.entry_format & 0x0F) + 1
    }

    pub fn map_count(&self) -> u32 {
        self.map_count
    }

    /// Returns the delta set index for the specified value.
    ///
    /// Indices past the end of the map use the last entry.
    pub fn get(&self, index: u32) -> Result<DeltaSetIndex, ReadError> {
        let entry_size = self.entry_size();
        let index = index.min(self.map_count.saturating_sub(1));
        let offset = index as usize * entry_size as usize;
        let data = self.map_data;
        let entry = match entry_size {
            1 => data.read_at::<u8>(offset)? as u32,
            2 => data.read_at::<u16>(offset)? as u32,
            3 => data.read_at::<Uint24>(offset)?.to_u32(),
            _ => data.read_at::<u32>(offset)?,
        };
        let bit_count = self.bit_count();
        Ok(DeltaSetIndex {
            outer: (entry >> bit_count) as u16,
            inner: (entry & ((1 << bit_count) - 1)) as u16,
        })
    }
}

/// Computes the delta for a glyph, using the mapping if present and the
/// glyph id as the inner index otherwise.
pub fn advance_delta(
    map: Option<&DeltaSetIndexMap>,
    store: &ItemVariationStore,
    glyph_id: GlyphId,
    coords: &[F2Dot14],
) -> Result<Fixed, ReadError> {
    let gid = glyph_id.to_u32();
    let ix = match map {
        Some(map) => map.get(gid)?,
        None => DeltaSetIndex {
            outer: 0,
            inner: gid.try_into().map_err(|_| ReadError::OutOfBounds)?,
        },
    };
    store.compute_delta_fixed(ix, coords)
}

/// A normalized coordinate for each axis.
#[derive(Clone, Copy, Debug, Default)]
pub struct Tuple<'a> {
    values: Array<'a, F2Dot14>,
}

impl<'a> Tuple<'a> {
    pub fn new(values: Array<'a, F2Dot14>) -> Self {
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<F2Dot14> {
        self.values.get(idx)
    }

    pub fn values(&self) -> Array<'a, F2Dot14> {
        self.values
    }
}

/// Flags and shared tuple index of a tuple variation header.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TupleIndex(u16);

impl TupleIndex {
    /// The header includes an embedded peak tuple.
    pub const EMBEDDED_PEAK_TUPLE: u16 = 0x8000;
    /// The header includes intermediate start and end tuples.
    pub const INTERMEDIATE_REGION: u16 = 0x4000;
    /// The serialized data includes private point numbers.
    pub const PRIVATE_POINT_NUMBERS: u16 = 0x2000;
    /// Mask for the low 12 bits to give the shared tuple records index.
    pub const TUPLE_INDEX_MASK: u16 = 0x0FFF;

    pub fn bits(self) -> u16 {
        self.0
    }

    pub fn from_bits(bits: u16) -> Self {
        TupleIndex(bits)
    }

    pub fn embedded_peak_tuple(self) -> bool {
        (self.0 & Self::EMBEDDED_PEAK_TUPLE) != 0
    }

    pub fn intermediate_region(self) -> bool {
        (self.0 & Self::INTERMEDIATE_REGION) != 0
    }

    pub fn private_point_numbers(self) -> bool {
        (self.0 & Self::PRIVATE_POINT_NUMBERS) != 0
    }

    /// The index into the shared tuples when there is no embedded peak.
    pub fn tuple_records_index(self) -> Option<u16> {
        (!self.embedded_peak_tuple()).then_some(self.0 & Self::TUPLE_INDEX_MASK)
    }
}

impl Scalar for TupleIndex {
    type Raw = [u8; 2];

    fn from_raw(raw: Self::Raw) -> Self {
        Self(u16::from_be_bytes(raw))
    }

    fn to_raw(self) -> Self::Raw {
        self.0.to_be_bytes()
    }
}

/// The count field of a tuple variation store with its shared points flag.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TupleVariationCount(u16);

impl TupleVariationCount {
    /// The serialized data includes shared point numbers.
    pub const SHARED_POINT_NUMBERS: u16 = 0x8000;
    /// Mask for the low 12 bits to give the number of tuple headers.
    pub const COUNT_MASK: u16 = 0x0FFF;

    pub fn from_bits(bits: u16) -> Self {
        Self(bits)
    }

    pub fn shared_point_numbers(self) -> bool {
        (self.0 & Self::SHARED_POINT_NUMBERS) != 0
    }

    pub fn count(self) -> u16 {
        self.0 & Self::COUNT_MASK
    }
}

impl Scalar for TupleVariationCount {
    type Raw = [u8; 2];

    fn from_raw(raw: Self::Raw) -> Self {
        Self(u16::from_be_bytes(raw))
    }

    fn to_raw(self) -> Self::Raw {
        self.0.to_be_bytes()
    }
}

/// Describes the region and serialized data size of one tuple variation.
#[derive(Clone, Debug)]
pub struct TupleVariationHeader<'a> {
    variation_data_size: u16,
    tuple_index: TupleIndex,
    peak_tuple: Option<Tuple<'a>>,
    intermediate: Option<(Tuple<'a>, Tuple<'a>)>,
    byte_len: usize,
}

impl<'a> TupleVariationHeader<'a> {
    pub fn read(data: FontData<'a>, axis_count: u16) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let variation_data_size: u16 = cursor.read()?;
        let tuple_index: TupleIndex = cursor.read()?;
        let axis_count = axis_count as usize;
        let peak_tuple = if tuple_index.embedded_peak_tuple() {
            Some(Tuple::new(cursor.read_array(axis_count)?))
        } else {
            None
        };
        let intermediate = if tuple_index.intermediate_region() {
            let start = Tuple::new(cursor.read_array(axis_count)?);
            let end = Tuple::new(cursor.read_array(axis_count)?);
            Some((start, end))
        } else {
            None
        };
        Ok(TupleVariationHeader {
            variation_data_size,
            tuple_index,
            peak_tuple,
            intermediate,
            byte_len: cursor.position(),
        })
    }

    /// The size in bytes of the serialized data for this tuple.
    pub fn variation_data_size(&self) -> u16 {
        self.variation_data_size
    }

    pub fn tuple_index(&self) -> TupleIndex {
        self.tuple_index
    }

    /// Peak tuple record for this tuple variation table, if embedded.
    pub fn peak_tuple(&self) -> Option<Tuple<'a>> {
        self.peak_tuple
    }

    pub fn intermediate_start_tuple(&self) -> Option<Tuple<'a>> {
        self.intermediate.map(|(start, _)| start)
    }

    pub fn intermediate_end_tuple(&self) -> Option<Tuple<'a>> {
        self.intermediate.map(|(_, end)| end)
    }

    /// The size of this header in bytes.
    pub fn byte_len(&self) -> usize {
        self.byte_len
    }

    /// Computes the scalar for this tuple given the peak (embedded or
    /// shared) and the current coordinates.
    ///
    /// Returns `None` when the tuple does not apply.
    pub fn compute_scalar(&self, peak: Tuple, coords: &[F2Dot14]) -> Option<Fixed> {
        const ZERO: Fixed = Fixed::ZERO;
        let mut scalar = Fixed::ONE;
        let inter = self.intermediate;
        for (i, peak) in peak.values().iter().enumerate() {
            let peak = peak.to_fixed();
            if peak == ZERO {
                continue;
            }
            let coord = coords.get(i).copied().unwrap_or_default().to_fixed();
            if coord == peak {
                continue;
            }
            if coord == ZERO {
                return None;
            }
            if let Some((start, end)) = inter {
                let start = start.get(i).unwrap_or_default().to_fixed();
                let end = end.get(i).unwrap_or_default().to_fixed();
                if start > peak || peak > end {
                    continue;
                }
                if coord < start || coord > end {
                    return None;
                }
                if coord < peak {
                    if peak != start {
                        scalar = scalar.mul_div(coord - start, peak - start);
                    }
                } else if peak != end {
                    scalar = scalar.mul_div(end - coord, end - peak);
                }
            } else if coord < peak.min(ZERO) || coord > peak.max(ZERO) {
                return None;
            } else {
                scalar = scalar.mul_div(coord, peak);
            }
        }
        (scalar != ZERO).then_some(scalar)
    }
}

/// Iterates the headers of a tuple variation store.
#[derive(Clone, Debug)]
pub struct TupleVariationHeaderIter<'a> {
    data: FontData<'a>,
    n_headers: usize,
    current: usize,
    axis_count: u16,
}

impl<'a> TupleVariationHeaderIter<'a> {
    pub fn new(data: FontData<'a>, n_headers: usize, axis_count: u16) -> Self {
        Self {
            data,
            n_headers,
            current: 0,
            axis_count,
        }
    }
}

impl<'a> Iterator for TupleVariationHeaderIter<'a> {
    type Item = Result<TupleVariationHeader<'a>, ReadError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current == self.n_headers {
            return None;
        }
        self.current += 1;
        let next = TupleVariationHeader::read(self.data, self.axis_count);
        let next_len = next.as_ref().map(|h| h.byte_len()).unwrap_or(0);
        self.data = self.data.split_off(next_len)?;
        Some(next)
    }
}

/// [Packed "Point" Numbers](https://learn.microsoft.com/en-us/typography/opentype/spec/otvarcommonformats#packed-point-numbers)
#[derive(Clone, Debug)]
pub struct PackedPointNumbers<'a> {
    data: FontData<'a>,
}

impl<'a> PackedPointNumbers<'a> {
    /// read point numbers off the front of this data, returning the remaining data
    pub fn split_off_front(data: FontData<'a>) -> (Self, FontData<'a>) {
        let this = PackedPointNumbers { data };
        let total_len = this.total_len();
        let remainder = data.split_off(total_len).unwrap_or_default();
        (this, remainder)
    }

    /// The number of points in this set; zero means "all points".
    pub fn count(&self) -> u16 {
        self.count_and_count_bytes().0
    }

    /// compute the count, and the number of bytes used to store it
    fn count_and_count_bytes(&self) -> (u16, usize) {
        match self.data.read_at::<u8>(0).unwrap_or(0) {
            0 => (0, 1),
            count @ 1..=127 => (count as u16, 1),
            _ => {
                // the high bit of the first byte selects a 15 bit count
                let count = self.data.read_at::<u16>(0).unwrap_or_default() & 0x7FFF;
                (count, 2)
            }
        }
    }

    /// the number of bytes to encode the packed point numbers
    fn total_len(&self) -> usize {
        let (n_points, mut n_bytes) = self.count_and_count_bytes();
        if n_points == 0 {
            return n_bytes;
        }
        let mut cursor = self.data.cursor();
        cursor.advance_by(n_bytes);
        let mut n_seen = 0;
        while n_seen < n_points {
            let Some((count, two_bytes)) = read_control_byte(&mut cursor) else {
                return n_bytes;
            };
            let word_size = 1 + usize::from(two_bytes);
            let run_size = word_size * count as usize;
            // plus the control byte
            n_bytes += run_size + 1;
            cursor.advance_by(run_size);
            n_seen += count as u16;
        }
        n_bytes
    }

    /// Iterate over the packed points
    pub fn iter(&self) -> PackedPointNumbersIter<'a> {
        let (count, n_bytes) = self.count_and_count_bytes();
        let mut cursor = self.data.cursor();
        cursor.advance_by(n_bytes);
        PackedPointNumbersIter {
            count,
            seen: 0,
            last_val: 0,
            current_run: PointRunIter {
                remaining: 0,
                two_bytes: false,
                cursor,
            },
        }
    }
}

/// An iterator over the packed point numbers data.
///
/// A count of zero denotes every point and never terminates on its own.
#[derive(Clone, Debug)]
pub struct PackedPointNumbersIter<'a> {
    count: u16,
    seen: u16,
    last_val: u16,
    current_run: PointRunIter<'a>,
}

#[derive(Clone, Debug)]
struct PointRunIter<'a> {
    remaining: u8,
    two_bytes: bool,
    cursor: Cursor<'a>,
}

impl Iterator for PointRunIter<'_> {
    type Item = u16;

    fn next(&mut self) -> Option<Self::Item> {
        // if no items remain in this run, start the next one.
        while self.remaining == 0 {
            (self.remaining, self.two_bytes) = read_control_byte(&mut self.cursor)?;
        }
        self.remaining -= 1;
        if self.two_bytes {
            self.cursor.read().ok()
        } else {
            self.cursor.read::<u8>().ok().map(|v| v as u16)
        }
    }
}

/// returns the count and the 'uses_two_bytes' flag from the control byte
fn read_control_byte(cursor: &mut Cursor) -> Option<(u8, bool)> {
    let control: u8 = cursor.read().ok()?;
    let two_bytes = (control & 0x80) != 0;
    let count = (control & 0x7F) + 1;
    Some((count, two_bytes))
}

impl Iterator for PackedPointNumbersIter<'_> {
    type Item = u16;

    fn next(&mut self) -> Option<Self::Item> {
        if self.count == 0 {
            let result = self.last_val;
            self.last_val = self.last_val.checked_add(1)?;
            return Some(result);
        }
        if self.count == self.seen {
            return None;
        }
        self.seen += 1;
        self.last_val = self.last_val.wrapping_add(self.current_run.next()?);
        Some(self.last_val)
    }
}

/// [Packed Deltas](https://learn.microsoft.com/en-us/typography/opentype/spec/otvarcommonformats#packed-deltas)
#[derive(Clone, Debug)]
pub struct PackedDeltas<'a> {
    data: FontData<'a>,
}

impl<'a> PackedDeltas<'a> {
    pub fn new(data: FontData<'a>) -> Self {
        Self { data }
    }

    pub fn iter(&self) -> DeltaRunIter<'a> {
        DeltaRunIter {
            remaining: 0,
            two_bytes: false,
            are_zero: false,
            cursor: self.data.cursor(),
        }
    }
}

/// Implements the logic for iterating over the individual runs
#[derive(Clone, Debug)]
pub struct DeltaRunIter<'a> {
    remaining: u8,
    two_bytes: bool,
    are_zero: bool,
    cursor: Cursor<'a>,
}

impl DeltaRunIter<'_> {
    /// Returns the number of bytes consumed so far.
    pub fn position(&self) -> usize {
        self.cursor.position()
    }
}

impl Iterator for DeltaRunIter<'_> {
    type Item = i16;

    fn next(&mut self) -> Option<Self::Item> {
        /// The run has no data and all deltas are zero.
        const DELTAS_ARE_ZERO: u8 = 0x80;
        /// The run stores 16 bit values.
        const DELTAS_ARE_WORDS: u8 = 0x40;
        /// Mask for the low 6 bits to provide the number of delta values in the run, minus one.
        const DELTA_RUN_COUNT_MASK: u8 = 0x3F;

        // if no items remain in this run, start the next one.
        while self.remaining == 0 {
            let control: u8 = self.cursor.read().ok()?;
            self.are_zero = (control & DELTAS_ARE_ZERO) != 0;
            self.two_bytes = (control & DELTAS_ARE_WORDS) != 0;
            self.remaining = (control & DELTA_RUN_COUNT_MASK) + 1;
        }
        self.remaining -= 1;
        if self.are_zero {
            Some(0)
        } else if self.two_bytes {
            self.cursor.read().ok()
        } else {
            self.cursor.read::<i8>().ok().map(|v| v as i16)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use font_test_data::variations as test_data;

    fn coords(values: &[f32]) -> Vec<F2Dot14> {
        values.iter().copied().map(F2Dot14::from_f32).collect()
    }

    #[test]
    fn ivs_regions() {
        let data = test_data::item_variation_store();
        let ivs = ItemVariationStore::read(FontData::new(&data)).unwrap();
        let regions = ivs.variation_region_list().unwrap();
        assert_eq!(regions.region_count(), 2);
        let region = regions.get(0).unwrap();
        assert_eq!(region.compute_scalar(&coords(&[1.0])), Fixed::ONE);
        assert_eq!(region.compute_scalar(&coords(&[0.5])), Fixed::from_f64(0.5));
        assert_eq!(region.compute_scalar(&coords(&[-0.5])), Fixed::ZERO);
        assert!(regions.get(2).is_err());
    }

    #[test]
    fn ivs_deltas() {
        let data = test_data::item_variation_store();
        let ivs = ItemVariationStore::read(FontData::new(&data)).unwrap();
        let ix = |outer, inner| DeltaSetIndex { outer, inner };
        assert_eq!(ivs.compute_delta(ix(0, 0), &coords(&[1.0])), Ok(100));
        assert_eq!(ivs.compute_delta(ix(0, 0), &coords(&[-1.0])), Ok(-50));
        assert_eq!(ivs.compute_delta(ix(0, 0), &coords(&[0.5])), Ok(50));
        assert_eq!(ivs.compute_delta(ix(0, 1), &coords(&[-0.5])), Ok(10));
        assert_eq!(ivs.compute_delta(ix(0, 1), &[]), Ok(0));
    }

    #[test]
    fn ivs_out_of_range_indices_are_zero() {
        let data = test_data::item_variation_store();
        let ivs = ItemVariationStore::read(FontData::new(&data)).unwrap();
        let coords = coords(&[1.0]);
        for index in [
            DeltaSetIndex { outer: 1, inner: 0 },
            DeltaSetIndex { outer: 0xFFFF, inner: 0 },
            DeltaSetIndex { outer: 0, inner: 2 },
            DeltaSetIndex { outer: 0, inner: 0xFFFF },
        ] {
            assert_eq!(ivs.compute_delta(index, &coords), Ok(0), "{index:?}");
        }
    }

    #[test]
    fn delta_set_index_map() {
        // format 0, entry size 1, 4 inner bits
        let data = [0u8, 0x03, 0, 3, 0x01, 0x12, 0x23];
        let map = DeltaSetIndexMap::read(FontData::new(&data)).unwrap();
        assert_eq!(map.map_count(), 3);
        assert_eq!(map.get(0).unwrap(), DeltaSetIndex { outer: 0, inner: 1 });
        assert_eq!(map.get(2).unwrap(), DeltaSetIndex { outer: 2, inner: 3 });
        // past the end uses the last entry
        assert_eq!(map.get(100).unwrap(), DeltaSetIndex { outer: 2, inner: 3 });
        let bad_format = [2u8, 0, 0, 0];
        assert!(DeltaSetIndexMap::read(FontData::new(&bad_format)).is_err());
    }

    #[test]
    fn packed_points() {
        fn decode_points(bytes: &[u8]) -> Option<Vec<u16>> {
            let data = FontData::new(bytes);
            let packed = PackedPointNumbers { data };
            if packed.count() == 0 {
                None
            } else {
                Some(packed.iter().collect())
            }
        }

        assert_eq!(decode_points(&[0]), None);
        // all points in glyph (in overly verbose encoding, which fonts are allowed to use)
        assert_eq!(decode_points(&[0x80, 0]), None);
        // 2 points; first run: [9, 9+6]
        assert_eq!(decode_points(&[0x02, 0x01, 0x09, 0x06]), Some(vec![9, 15]));
        // 2 points; first run: [0xBEEF, 0xCAFE]
        assert_eq!(
            decode_points(&[0x02, 0x81, 0xbe, 0xef, 0x0c, 0x0f]),
            Some(vec![0xbeef, 0xcafe])
        );
        // 1 point; first run: [7]
        assert_eq!(decode_points(&[0x01, 0, 0x07]), Some(vec![7]));
        // 1 point; first run: [7] in overly verbose encoding
        assert_eq!(decode_points(&[0x01, 0x80, 0, 0x07]), Some(vec![7]));
        // 1 point; first run: [65535]; requires words to be treated as unsigned numbers
        assert_eq!(decode_points(&[0x01, 0x80, 0xff, 0xff]), Some(vec![65535]));
        // 4 points; first run: [7, 8]; second run: [255, 257]. 257 is stored in delta-encoded bytes (0xFF + 2).
        assert_eq!(
            decode_points(&[0x04, 1, 7, 1, 1, 0xff, 2]),
            Some(vec![7, 8, 263, 265])
        );
    }

    #[test]
    fn packed_point_split() {
        let data = FontData::new(&[2, 1, 1, 2, 1, 205, 143]);
        let (points, remainder) = PackedPointNumbers::split_off_front(data);
        assert_eq!(points.count(), 2);
        assert_eq!(remainder.as_bytes(), &[1, 205, 143]);
    }

    #[test]
    fn packed_deltas() {
        // 4 zeros, one word, then two signed bytes
        static INPUT: FontData = FontData::new(&[0x83, 0x40, 0x01, 0x02, 0x01, 0x81, 0x7F]);
        let deltas = PackedDeltas::new(INPUT);
        assert_eq!(deltas.iter().collect::<Vec<_>>(), &[0, 0, 0, 0, 258, -127, 127]);
    }

    #[test]
    fn packed_deltas_spec() {
        static INPUT: FontData = FontData::new(&[
            0x03, 0x0A, 0x97, 0x00, 0xC6, 0x87, 0x41, 0x10, 0x22, 0xFB, 0x34,
        ]);
        static EXPECTED: &[i16] = &[10, -105, 0, -58, 0, 0, 0, 0, 0, 0, 0, 0, 4130, -1228];
        let deltas = PackedDeltas::new(INPUT);
        assert_eq!(deltas.iter().collect::<Vec<_>>(), EXPECTED);
    }

    #[test]
    fn tuple_scalars() {
        let peak_data = [0x40u8, 0x00];
        let header_data = [0u8, 4, 0x80, 0];
        let header = TupleVariationHeader::read(FontData::new(&header_data), 0).unwrap();
        let peak = Tuple::new(Array::new(&peak_data));
        assert_eq!(header.compute_scalar(peak, &coords(&[1.0])), Some(Fixed::ONE));
        assert_eq!(
            header.compute_scalar(peak, &coords(&[0.25])),
            Some(Fixed::from_f64(0.25))
        );
        assert_eq!(header.compute_scalar(peak, &coords(&[0.0])), None);
        assert_eq!(header.compute_scalar(peak, &coords(&[-0.5])), None);
    }
}
