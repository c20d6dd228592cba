//! The [Font Variations](https://docs.microsoft.com/en-us/typography/opentype/spec/fvar) table

use types::{Fixed, Tag};

use crate::{record, Array, FontData, FontRead, ReadError, RecordArray};

/// 'fvar'
pub const TAG: Tag = Tag::new(b"fvar");

record! {
    /// A single design axis.
    pub struct VariationAxisRecord {
        pub axis_tag: Tag,
        pub min_value: Fixed,
        pub default_value: Fixed,
        pub max_value: Fixed,
        pub flags: u16,
        pub axis_name_id: u16,
    }
}

impl VariationAxisRecord {
    /// The axis should not be exposed in user interfaces.
    pub const HIDDEN_AXIS: u16 = 0x0001;

    pub fn is_hidden(&self) -> bool {
        self.flags & Self::HIDDEN_AXIS != 0
    }

    /// Returns a normalized coordinate for the given value.
    ///
    /// The value is clamped to the axis range and mapped to `[-1, 0]` below
    /// the default and `[0, 1]` above it.
    pub fn normalize(&self, mut value: Fixed) -> Fixed {
        use std::cmp::Ordering::*;
        let min_value = self.min_value;
        let default_value = self.default_value;
        // Make sure max is >= min to avoid potential panic in clamp.
        let max_value = self.max_value.max(min_value);
        value = value.clamp(min_value, max_value);
        value = match value.cmp(&default_value) {
            Less => {
                -((default_value.saturating_sub(value)) / (default_value.saturating_sub(min_value)))
            }
            Greater => {
                (value.saturating_sub(default_value)) / (max_value.saturating_sub(default_value))
            }
            Equal => Fixed::ZERO,
        };
        value.clamp(-Fixed::ONE, Fixed::ONE)
    }
}

/// A named instance: a predefined location in the design space.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InstanceRecord<'a> {
    pub subfamily_name_id: u16,
    pub flags: u16,
    /// User space coordinates, one per axis.
    pub coordinates: Array<'a, Fixed>,
    pub post_script_name_id: Option<u16>,
}

#[derive(Clone, Debug)]
pub struct Fvar<'a> {
    data: FontData<'a>,
    axes: RecordArray<'a, VariationAxisRecord>,
    instance_count: u16,
    instance_size: u16,
    instances_offset: usize,
}

impl<'a> FontRead<'a> for Fvar<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let major: u16 = cursor.read()?;
        if major != 1 {
            return Err(ReadError::InvalidFormat(major as _));
        }
        cursor.advance::<u16>();
        let axes_offset: u16 = cursor.read()?;
        cursor.advance::<u16>();
        let axis_count: u16 = cursor.read()?;
        let axis_size: u16 = cursor.read()?;
        let instance_count: u16 = cursor.read()?;
        let instance_size: u16 = cursor.read()?;
        if axis_size != 20 {
            return Err(ReadError::MalformedData("unexpected fvar axis record size"));
        }
        let min_instance_size = axis_count as usize * 4 + 4;
        if instance_count != 0 && (instance_size as usize) < min_instance_size {
            return Err(ReadError::MalformedData("fvar instance record too small"));
        }
        let axes = data.read_records(axes_offset as usize, axis_count as usize)?;
        let instances_offset = axes_offset as usize + axis_count as usize * 20;
        data.check_len(instances_offset + instance_count as usize * instance_size as usize)?;
        Ok(Self {
            data,
            axes,
            instance_count,
            instance_size,
            instances_offset,
        })
    }
}

impl<'a> Fvar<'a> {
    pub fn axis_count(&self) -> u16 {
        self.axes.len() as u16
    }

    pub fn axes(&self) -> RecordArray<'a, VariationAxisRecord> {
        self.axes
    }

    pub fn instance_count(&self) -> u16 {
        self.instance_count
    }

    pub fn instance(&self, index: usize) -> Result<InstanceRecord<'a>, ReadError> {
        if index >= self.instance_count as usize {
            return Err(ReadError::OutOfBounds);
        }
        let size = self.instance_size as usize;
        let data = self
            .data
            .slice_len(self.instances_offset + index * size, size)?;
        let axis_count = self.axes.len();
        let mut cursor = data.cursor();
        let subfamily_name_id = cursor.read()?;
        let flags = cursor.read()?;
        let coordinates = cursor.read_array(axis_count)?;
        // the postscript name id is present only when the record has room
        let post_script_name_id = if size >= axis_count * 4 + 6 {
            Some(cursor.read()?)
        } else {
            None
        };
        Ok(InstanceRecord {
            subfamily_name_id,
            flags,
            coordinates,
            post_script_name_id,
        })
    }

    pub fn instances(&self) -> impl Iterator<Item = Result<InstanceRecord<'a>, ReadError>> + '_ {
        (0..self.instance_count as usize).map(|ix| self.instance(ix))
    }
}
