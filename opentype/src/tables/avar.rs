//! The [Axis Variations](https://docs.microsoft.com/en-us/typography/opentype/spec/avar) table

use types::{F2Dot14, Fixed, Tag};

use super::variations::{DeltaSetIndexMap, ItemVariationStore};
use crate::{record, FontData, FontRead, ReadError, RecordArray};

/// 'avar'
pub const TAG: Tag = Tag::new(b"avar");

record! {
    /// A single `(from, to)` pivot of a segment map.
    pub struct AxisValueMap {
        pub from_coordinate: F2Dot14,
        pub to_coordinate: F2Dot14,
    }
}

/// The piecewise linear mapping for one axis.
#[derive(Clone, Debug)]
pub struct SegmentMaps<'a> {
    axis_value_maps: RecordArray<'a, AxisValueMap>,
}

impl<'a> FontRead<'a> for SegmentMaps<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let count: u16 = data.read_at(0)?;
        Ok(Self {
            axis_value_maps: data.read_records(2, count as usize)?,
        })
    }
}

impl<'a> SegmentMaps<'a> {
    pub fn axis_value_maps(&self) -> RecordArray<'a, AxisValueMap> {
        self.axis_value_maps
    }

    fn byte_len(&self) -> usize {
        2 + self.axis_value_maps.len() * 4
    }

    /// Applies the piecewise linear mapping to the specified coordinate.
    ///
    /// Beyond the letter of the format this recovers from maps that carry
    /// duplicate pivots or that lack the required -1, 0 and 1 entries.
    pub fn apply(&self, coord: Fixed) -> Fixed {
        let maps = self.axis_value_maps;
        let len = maps.len();
        let pivot = |ix: usize| -> (Fixed, Fixed) {
            maps.get(ix)
                .map(|map| (map.from_coordinate.to_fixed(), map.to_coordinate.to_fixed()))
                .unwrap_or_default()
        };
        if len < 2 {
            return if len == 0 {
                coord
            } else {
                // shift by the single mapping delta
                let (from, to) = pivot(0);
                coord - from + to
            };
        }
        let neg1 = -Fixed::ONE;
        let pos1 = Fixed::ONE;
        let mut start = 0;
        let mut end = len;
        // trim duplicated -1 and +1 caps
        if pivot(start) == (neg1, neg1) && pivot(start + 1).0 == neg1 {
            start += 1;
        }
        if pivot(end - 1) == (pos1, pos1) && pivot(end - 2).0 == pos1 {
            end -= 1;
        }
        if let Some(i) = (start..end).find(|&i| pivot(i).0 == coord) {
            let mut j = i;
            while j + 1 < end && pivot(j + 1).0 == coord {
                j += 1;
            }
            if i == j {
                return pivot(i).1;
            }
            if i + 2 == j {
                return pivot(i + 1).1;
            }
            // several matches: use the one nearest to zero
            if coord < Fixed::ZERO {
                return pivot(j).1;
            }
            if coord > Fixed::ZERO {
                return pivot(i).1;
            }
            let (ti, tj) = (pivot(i).1, pivot(j).1);
            return if ti.abs() < tj.abs() { ti } else { tj };
        }
        let k = (start..end)
            .find(|&k| coord < pivot(k).0)
            .unwrap_or(end);
        if k == 0 {
            let (from, to) = pivot(0);
            return coord - from + to;
        }
        if k == end {
            let (from, to) = pivot(end - 1);
            return coord - from + to;
        }
        let (bf, bt) = pivot(k - 1);
        let (af, at) = pivot(k);
        bt + (at - bt).mul_div(coord - bf, af - bf)
    }
}

/// The axis variations table.
#[derive(Clone, Debug)]
pub struct Avar<'a> {
    data: FontData<'a>,
    major_version: u16,
    axis_count: u16,
    segment_maps: Vec<SegmentMaps<'a>>,
    v2_offsets_pos: usize,
}

impl<'a> FontRead<'a> for Avar<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let major_version: u16 = cursor.read()?;
        if !(1..=2).contains(&major_version) {
            return Err(ReadError::InvalidFormat(major_version as _));
        }
        cursor.advance_by(4);
        let axis_count: u16 = cursor.read()?;
        let mut pos = cursor.position();
        let mut segment_maps = Vec::with_capacity(axis_count as usize);
        for _ in 0..axis_count {
            let maps = SegmentMaps::read(data.split_off(pos).ok_or(ReadError::OutOfBounds)?)?;
            pos += maps.byte_len();
            segment_maps.push(maps);
        }
        if major_version == 2 {
            data.check_len(pos + 8)?;
        }
        Ok(Self {
            data,
            major_version,
            axis_count,
            segment_maps,
            v2_offsets_pos: pos,
        })
    }
}

impl<'a> Avar<'a> {
    pub fn major_version(&self) -> u16 {
        self.major_version
    }

    pub fn axis_count(&self) -> u16 {
        self.axis_count
    }

    pub fn axis_segment_maps(&self) -> &[SegmentMaps<'a>] {
        &self.segment_maps
    }

    /// Version 2 mapping from axis index to delta set index.
    pub fn axis_index_map(&self) -> Option<Result<DeltaSetIndexMap<'a>, ReadError>> {
        self.v2_offset(0)
    }

    /// Version 2 variation store for cross-axis adjustments.
    pub fn var_store(&self) -> Option<Result<ItemVariationStore<'a>, ReadError>> {
        self.v2_offset(4)
    }

    fn v2_offset<T: FontRead<'a>>(&self, field: usize) -> Option<Result<T, ReadError>> {
        if self.major_version < 2 {
            return None;
        }
        let offset: u32 = self.data.read_at(self.v2_offsets_pos + field).ok()?;
        self.data.resolve_nullable(offset)
    }
}

#[cfg(test)]
mod tests {
    use font_test_data::{be_buffer, bebuffer::BeBuffer, variations::avar_two_axes};

    use super::*;

    fn f(value: f64) -> Fixed {
        Fixed::from_f64(value)
    }

    #[test]
    fn map_coords() {
        let buf = avar_two_axes();
        let avar = Avar::read(FontData::new(&buf)).unwrap();
        assert_eq!(avar.axis_count(), 2);
        let maps = &avar.axis_segment_maps()[0];
        assert_eq!(maps.apply(f(-1.0)), f(-1.0));
        assert_eq!(maps.apply(f(-0.5)), f(-0.75));
        assert_eq!(maps.apply(f(0.0)), f(0.0));
        assert_eq!(maps.apply(f(0.5)), f(0.25));
        assert_eq!(maps.apply(f(0.75)), f(0.625));
        assert_eq!(maps.apply(f(1.0)), f(1.0));
        let identity = &avar.axis_segment_maps()[1];
        assert_eq!(identity.apply(f(0.3)), f(0.3));
        assert!(avar.var_store().is_none());
    }

    fn segment_maps(pivots: &[(f32, f32)]) -> BeBuffer {
        let mut buf = be_buffer! { (pivots.len() as u16) };
        for (from, to) in pivots {
            buf = buf
                .push(F2Dot14::from_f32(*from))
                .push(F2Dot14::from_f32(*to));
        }
        buf
    }

    #[test]
    fn robust_mapping() {
        let empty = segment_maps(&[]);
        let maps = SegmentMaps::read(FontData::new(&empty)).unwrap();
        assert_eq!(maps.apply(f(0.5)), f(0.5));
        // a single pivot shifts everything
        let single = segment_maps(&[(0.0, 0.25)]);
        let maps = SegmentMaps::read(FontData::new(&single)).unwrap();
        assert_eq!(maps.apply(f(0.5)), f(0.75));
        // three identical pivots resolve to the middle one
        let triple = segment_maps(&[(-1.0, -1.0), (0.5, 0.25), (0.5, 0.5), (0.5, 0.75), (1.0, 1.0)]);
        let maps = SegmentMaps::read(FontData::new(&triple)).unwrap();
        assert_eq!(maps.apply(f(0.5)), f(0.5));
        // missing zero pivot: interpolate between the neighbors
        let sparse = segment_maps(&[(-1.0, -1.0), (1.0, 0.5)]);
        let maps = SegmentMaps::read(FontData::new(&sparse)).unwrap();
        assert_eq!(maps.apply(f(0.0)), f(-0.25));
    }

    #[test]
    fn repeated_zero_pivots() {
        // the mapping nearest to zero wins
        let nearer = segment_maps(&[(-1.0, -1.0), (0.0, -0.25), (0.0, 0.5), (1.0, 1.0)]);
        let maps = SegmentMaps::read(FontData::new(&nearer)).unwrap();
        assert_eq!(maps.apply(f(0.0)), f(-0.25));
        // equally near: the later pivot wins
        let tied = segment_maps(&[(-1.0, -1.0), (0.0, -0.5), (0.0, 0.5), (1.0, 1.0)]);
        let maps = SegmentMaps::read(FontData::new(&tied)).unwrap();
        assert_eq!(maps.apply(f(0.0)), f(0.5));
    }
}
