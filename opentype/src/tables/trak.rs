//! The [tracking (trak)](https://developer.apple.com/fonts/TrueType-Reference-Manual/RM06/Chap6trak.html) table.

use types::{Fixed, Tag};

use crate::{record, Array, FontData, FontRead, ReadError, RecordArray};

/// 'trak'
pub const TAG: Tag = Tag::new(b"trak");

/// The tracking table.
#[derive(Clone, Debug)]
pub struct Trak<'a> {
    data: FontData<'a>,
    horiz_offset: u16,
    vert_offset: u16,
}

impl<'a> FontRead<'a> for Trak<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        data.check_len(12)?;
        let version: u32 = data.read_at(0)?;
        if version != 0x0001_0000 {
            return Err(ReadError::InvalidFormat(version as i64));
        }
        Ok(Self {
            data,
            horiz_offset: data.read_at(6)?,
            vert_offset: data.read_at(8)?,
        })
    }
}

impl<'a> Trak<'a> {
    /// The data that track entry and size table offsets are relative to.
    pub fn offset_data(&self) -> FontData<'a> {
        self.data
    }

    /// Tracking data for horizontal text, if present.
    pub fn horiz(&self) -> Option<Result<TrackData<'a>, ReadError>> {
        self.track_data(self.horiz_offset)
    }

    /// Tracking data for vertical text, if present.
    pub fn vert(&self) -> Option<Result<TrackData<'a>, ReadError>> {
        self.track_data(self.vert_offset)
    }

    fn track_data(&self, offset: u16) -> Option<Result<TrackData<'a>, ReadError>> {
        (offset != 0).then(|| TrackData::read(self.data, offset as usize))
    }
}

record! {
    /// A single track in a [`TrackData`] table.
    pub struct TrackTableEntry {
        /// The track value; 0 is the normal track.
        pub track: Fixed,
        pub name_index: u16,
        /// Offset from the start of the table to the per size values.
        pub offset: u16,
    }
}

/// Tracking values for one text direction.
#[derive(Clone, Debug)]
pub struct TrackData<'a> {
    tracks: RecordArray<'a, TrackTableEntry>,
    sizes: Array<'a, Fixed>,
    table_data: FontData<'a>,
}

impl<'a> TrackData<'a> {
    fn read(table_data: FontData<'a>, offset: usize) -> Result<Self, ReadError> {
        let data = table_data.split_off(offset).ok_or(ReadError::OutOfBounds)?;
        let n_tracks: u16 = data.read_at(0)?;
        let n_sizes: u16 = data.read_at(2)?;
        let size_table_offset: u32 = data.read_at(4)?;
        let tracks = data.read_records(8, n_tracks as usize)?;
        let sizes = table_data.read_array(size_table_offset as usize, n_sizes as usize)?;
        Ok(Self {
            tracks,
            sizes,
            table_data,
        })
    }

    pub fn track_table(&self) -> RecordArray<'a, TrackTableEntry> {
        self.tracks
    }

    /// The point sizes for which tracking values are stored.
    pub fn size_table(&self) -> Array<'a, Fixed> {
        self.sizes
    }

    /// Returns the list of per-size tracking values for the given entry.
    pub fn per_size_values(&self, entry: &TrackTableEntry) -> Result<Array<'a, i16>, ReadError> {
        self.table_data
            .read_array(entry.offset as usize, self.sizes.len())
    }

    /// Returns the tracking adjustment, in font units, for the given track
    /// at the given point size.
    ///
    /// Values between the stored sizes are linearly interpolated; sizes
    /// outside the table use the nearest stored value.
    pub fn tracking(&self, track: Fixed, point_size: f32) -> Option<f32> {
        let entry = self.tracks.iter().find(|entry| entry.track == track)?;
        let values = self.per_size_values(&entry).ok()?;
        let n = self.sizes.len().min(values.len());
        if n == 0 {
            return None;
        }
        let size_at = |ix: usize| self.sizes.get(ix).map(|s| s.to_f32()).unwrap_or_default();
        let value_at = |ix: usize| values.get(ix).unwrap_or_default() as f32;
        let Some(next) = (0..n).find(|&ix| size_at(ix) >= point_size) else {
            return Some(value_at(n - 1));
        };
        if next == 0 {
            return Some(value_at(0));
        }
        let (s0, s1) = (size_at(next - 1), size_at(next));
        let (v0, v1) = (value_at(next - 1), value_at(next));
        if s1 <= s0 {
            return Some(v1);
        }
        let t = (point_size - s0) / (s1 - s0);
        Some(v0 + t * (v1 - v0))
    }
}
