//! The [gvar (Glyph Variations)](https://learn.microsoft.com/en-us/typography/opentype/spec/gvar)
//! table

use types::{F2Dot14, Fixed, GlyphId, Tag};

use super::variations::{
    PackedDeltas, PackedPointNumbers, Tuple, TupleVariationCount, TupleVariationHeader,
    TupleVariationHeaderIter,
};
use crate::{Array, FontData, FontRead, ReadError};

/// 'gvar'
pub const TAG: Tag = Tag::new(b"gvar");

/// Glyph data offsets are 32-bit rather than halved 16-bit values.
const LONG_OFFSETS: u16 = 0x0001;

#[derive(Clone, Debug)]
pub struct Gvar<'a> {
    data: FontData<'a>,
    axis_count: u16,
    shared_tuples: Array<'a, F2Dot14>,
    glyph_count: u16,
    long_offsets: bool,
    glyph_variation_data_array_offset: u32,
}

impl<'a> FontRead<'a> for Gvar<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let major: u16 = cursor.read()?;
        if major != 1 {
            return Err(ReadError::InvalidFormat(major as _));
        }
        cursor.advance::<u16>();
        let axis_count: u16 = cursor.read()?;
        let shared_tuple_count: u16 = cursor.read()?;
        let shared_tuples_offset: u32 = cursor.read()?;
        let glyph_count: u16 = cursor.read()?;
        let flags: u16 = cursor.read()?;
        let glyph_variation_data_array_offset = cursor.read()?;
        let long_offsets = flags & LONG_OFFSETS != 0;
        let offset_size = if long_offsets { 4 } else { 2 };
        data.check_len(20 + (glyph_count as usize + 1) * offset_size)?;
        let shared_tuples = data.read_array(
            shared_tuples_offset as usize,
            shared_tuple_count as usize * axis_count as usize,
        )?;
        Ok(Self {
            data,
            axis_count,
            shared_tuples,
            glyph_count,
            long_offsets,
            glyph_variation_data_array_offset,
        })
    }
}

impl<'a> Gvar<'a> {
    pub fn axis_count(&self) -> u16 {
        self.axis_count
    }

    pub fn glyph_count(&self) -> u16 {
        self.glyph_count
    }

    pub fn shared_tuple_count(&self) -> usize {
        if self.axis_count == 0 {
            return 0;
        }
        self.shared_tuples.len() / self.axis_count as usize
    }

    /// Returns the shared peak tuple at `index`.
    pub fn shared_tuple(&self, index: usize) -> Option<Tuple<'a>> {
        shared_tuple(self.shared_tuples, self.axis_count, index)
    }

    fn glyph_offset(&self, index: usize) -> Result<usize, ReadError> {
        Ok(if self.long_offsets {
            self.data.read_at::<u32>(20 + index * 4)? as usize
        } else {
            self.data.read_at::<u16>(20 + index * 2)? as usize * 2
        })
    }

    /// Returns the variation data for `glyph_id`, or `None` if the glyph has
    /// no variations.
    pub fn glyph_variation_data(
        &self,
        glyph_id: GlyphId,
    ) -> Result<Option<GlyphVariationData<'a>>, ReadError> {
        let ix = glyph_id.to_usize();
        if ix >= self.glyph_count as usize {
            return Err(ReadError::OutOfBounds);
        }
        let start = self.glyph_offset(ix)?;
        let end = self.glyph_offset(ix + 1)?;
        if end <= start {
            return Ok(None);
        }
        let base = self.glyph_variation_data_array_offset as usize;
        let data = self
            .data
            .slice(base + start..base + end)
            .ok_or(ReadError::OutOfBounds)?;
        GlyphVariationData::new(data, self.axis_count, self.shared_tuples).map(Some)
    }
}

fn shared_tuple(tuples: Array<F2Dot14>, axis_count: u16, index: usize) -> Option<Tuple> {
    let axis_count = axis_count as usize;
    let start = index.checked_mul(axis_count)?;
    let bytes = tuples
        .as_bytes()
        .get(start * 2..(start + axis_count) * 2)?;
    Some(Tuple::new(Array::new(bytes)))
}

/// The tuple variations of a single glyph.
#[derive(Clone, Debug)]
pub struct GlyphVariationData<'a> {
    axis_count: u16,
    shared_tuples: Array<'a, F2Dot14>,
    tuple_count: TupleVariationCount,
    header_data: FontData<'a>,
    shared_point_numbers: Option<PackedPointNumbers<'a>>,
    serialized_data: FontData<'a>,
}

impl<'a> GlyphVariationData<'a> {
    fn new(
        data: FontData<'a>,
        axis_count: u16,
        shared_tuples: Array<'a, F2Dot14>,
    ) -> Result<Self, ReadError> {
        let tuple_count: TupleVariationCount = data.read_at(0)?;
        let data_offset: u16 = data.read_at(2)?;
        let header_data = data.split_off(4).ok_or(ReadError::OutOfBounds)?;
        let mut serialized_data = data
            .split_off(data_offset as usize)
            .ok_or(ReadError::OutOfBounds)?;
        let shared_point_numbers = if tuple_count.shared_point_numbers() {
            let (points, rest) = PackedPointNumbers::split_off_front(serialized_data);
            serialized_data = rest;
            Some(points)
        } else {
            None
        };
        Ok(Self {
            axis_count,
            shared_tuples,
            tuple_count,
            header_data,
            shared_point_numbers,
            serialized_data,
        })
    }

    pub fn tuple_count(&self) -> u16 {
        self.tuple_count.count()
    }

    /// Iterates the tuple variations, stopping at the first malformed one.
    pub fn tuples(&self) -> impl Iterator<Item = TupleVariation<'a>> + '_ {
        let mut headers = TupleVariationHeaderIter::new(
            self.header_data,
            self.tuple_count() as usize,
            self.axis_count,
        );
        let mut data_pos = 0usize;
        std::iter::from_fn(move || {
            let header = headers.next()?.ok()?;
            let peak = match header.peak_tuple() {
                Some(peak) => peak,
                None => shared_tuple(
                    self.shared_tuples,
                    self.axis_count,
                    header.tuple_index().tuple_records_index()? as usize,
                )?,
            };
            let size = header.variation_data_size() as usize;
            let mut data = self.serialized_data.slice_len(data_pos, size).ok()?;
            data_pos += size;
            let point_numbers = if header.tuple_index().private_point_numbers() {
                let (points, rest) = PackedPointNumbers::split_off_front(data);
                data = rest;
                Some(points)
            } else {
                self.shared_point_numbers.clone()
            };
            Some(TupleVariation {
                header,
                peak,
                point_numbers,
                deltas: data,
            })
        })
    }
}

/// A single tuple: a region of the design space with point deltas.
#[derive(Clone, Debug)]
pub struct TupleVariation<'a> {
    header: TupleVariationHeader<'a>,
    peak: Tuple<'a>,
    point_numbers: Option<PackedPointNumbers<'a>>,
    deltas: FontData<'a>,
}

impl<'a> TupleVariation<'a> {
    pub fn peak(&self) -> Tuple<'a> {
        self.peak
    }

    /// Returns true if the tuple has a delta for every point of the glyph.
    pub fn has_deltas_for_all_points(&self) -> bool {
        self.point_numbers
            .as_ref()
            .map(|points| points.count() == 0)
            .unwrap_or(true)
    }

    /// Computes the weight of this tuple at `coords`, or `None` if it has no
    /// influence there.
    pub fn compute_scalar(&self, coords: &[F2Dot14]) -> Option<Fixed> {
        self.header.compute_scalar(self.peak, coords)
    }

    /// Iterates the deltas with the point each one applies to.
    pub fn deltas(&self) -> impl Iterator<Item = GlyphDelta> + 'a {
        let packed = PackedDeltas::new(self.deltas);
        let count = packed.iter().count() / 2;
        let positions: Box<dyn Iterator<Item = u16> + 'a> = match &self.point_numbers {
            Some(points) if points.count() != 0 => Box::new(points.iter()),
            _ => Box::new(0u16..),
        };
        let xs = packed.iter().take(count);
        let ys = packed.iter().skip(count);
        positions
            .zip(xs.zip(ys))
            .map(|(position, (x, y))| GlyphDelta {
                position,
                x_delta: x as i32,
                y_delta: y as i32,
            })
    }
}

/// A delta for a single point.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GlyphDelta {
    /// Index of the point, including the four phantom points.
    pub position: u16,
    pub x_delta: i32,
    pub y_delta: i32,
}
