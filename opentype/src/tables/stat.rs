//! The [STAT](https://learn.microsoft.com/en-us/typography/opentype/spec/stat) table

use types::{Fixed, Tag};

use crate::{record, Array, FontData, FontRead, ReadError, RecordArray};

/// 'STAT'
pub const TAG: Tag = Tag::new(b"STAT");

record! {
    pub struct AxisRecord {
        pub axis_tag: Tag,
        pub axis_name_id: u16,
        pub axis_ordering: u16,
    }
}

record! {
    /// An axis and value pair of a format 4 axis value.
    pub struct AxisValueRecord {
        pub axis_index: u16,
        pub value: Fixed,
    }
}

/// Axis value flags.
pub mod flags {
    /// The value is for an older font in the family.
    pub const OLDER_SIBLING_FONT_ATTRIBUTE: u16 = 0x0001;
    /// The value may be omitted when composing names, e.g. "Regular".
    pub const ELIDABLE_AXIS_VALUE_NAME: u16 = 0x0002;
}

/// A name for a position or range on one or more axes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AxisValue<'a> {
    /// A single value on one axis.
    Format1 {
        axis_index: u16,
        flags: u16,
        value_name_id: u16,
        value: Fixed,
    },
    /// A range on one axis with a nominal value.
    Format2 {
        axis_index: u16,
        flags: u16,
        value_name_id: u16,
        nominal_value: Fixed,
        range_min_value: Fixed,
        range_max_value: Fixed,
    },
    /// A value with a linked style, such as Regular and Bold.
    Format3 {
        axis_index: u16,
        flags: u16,
        value_name_id: u16,
        value: Fixed,
        linked_value: Fixed,
    },
    /// A combination of values on several axes.
    Format4 {
        flags: u16,
        value_name_id: u16,
        values: RecordArray<'a, AxisValueRecord>,
    },
}

impl<'a> FontRead<'a> for AxisValue<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let format: u16 = cursor.read()?;
        Ok(match format {
            1 => AxisValue::Format1 {
                axis_index: cursor.read()?,
                flags: cursor.read()?,
                value_name_id: cursor.read()?,
                value: cursor.read()?,
            },
            2 => AxisValue::Format2 {
                axis_index: cursor.read()?,
                flags: cursor.read()?,
                value_name_id: cursor.read()?,
                nominal_value: cursor.read()?,
                range_min_value: cursor.read()?,
                range_max_value: cursor.read()?,
            },
            3 => AxisValue::Format3 {
                axis_index: cursor.read()?,
                flags: cursor.read()?,
                value_name_id: cursor.read()?,
                value: cursor.read()?,
                linked_value: cursor.read()?,
            },
            4 => {
                let axis_count: u16 = cursor.read()?;
                AxisValue::Format4 {
                    flags: cursor.read()?,
                    value_name_id: cursor.read()?,
                    values: cursor.read_records(axis_count as usize)?,
                }
            }
            other => return Err(ReadError::InvalidFormat(other as _)),
        })
    }
}

impl AxisValue<'_> {
    pub fn flags(&self) -> u16 {
        match self {
            Self::Format1 { flags, .. }
            | Self::Format2 { flags, .. }
            | Self::Format3 { flags, .. }
            | Self::Format4 { flags, .. } => *flags,
        }
    }

    pub fn value_name_id(&self) -> u16 {
        match self {
            Self::Format1 { value_name_id, .. }
            | Self::Format2 { value_name_id, .. }
            | Self::Format3 { value_name_id, .. }
            | Self::Format4 { value_name_id, .. } => *value_name_id,
        }
    }

    pub fn is_elidable(&self) -> bool {
        self.flags() & flags::ELIDABLE_AXIS_VALUE_NAME != 0
    }
}

/// The style attributes table.
#[derive(Clone, Debug)]
pub struct Stat<'a> {
    design_axes: RecordArray<'a, AxisRecord>,
    axis_values_data: FontData<'a>,
    axis_value_offsets: Array<'a, u16>,
    elided_fallback_name_id: Option<u16>,
}

impl<'a> FontRead<'a> for Stat<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let major: u16 = cursor.read()?;
        let minor: u16 = cursor.read()?;
        if major != 1 {
            return Err(ReadError::InvalidFormat(major as _));
        }
        let design_axis_size: u16 = cursor.read()?;
        let design_axis_count: u16 = cursor.read()?;
        let design_axes_offset: u32 = cursor.read()?;
        let axis_value_count: u16 = cursor.read()?;
        let axis_value_offsets_offset: u32 = cursor.read()?;
        let elided_fallback_name_id = if minor >= 1 {
            Some(cursor.read()?)
        } else {
            None
        };
        if design_axis_count != 0 && design_axis_size != 8 {
            return Err(ReadError::MalformedData("unexpected STAT axis record size"));
        }
        let design_axes =
            data.read_records(design_axes_offset as usize, design_axis_count as usize)?;
        let (axis_values_data, axis_value_offsets) = if axis_value_count == 0 {
            (FontData::default(), Array::empty())
        } else {
            let values_data = data
                .split_off(axis_value_offsets_offset as usize)
                .ok_or(ReadError::OutOfBounds)?;
            let offsets = values_data.read_array(0, axis_value_count as usize)?;
            (values_data, offsets)
        };
        Ok(Self {
            design_axes,
            axis_values_data,
            axis_value_offsets,
            elided_fallback_name_id,
        })
    }
}

impl<'a> Stat<'a> {
    pub fn design_axes(&self) -> RecordArray<'a, AxisRecord> {
        self.design_axes
    }

    pub fn elided_fallback_name_id(&self) -> Option<u16> {
        self.elided_fallback_name_id
    }

    pub fn axis_value_count(&self) -> usize {
        self.axis_value_offsets.len()
    }

    pub fn axis_value(&self, index: usize) -> Result<AxisValue<'a>, ReadError> {
        let offset = self
            .axis_value_offsets
            .get(index)
            .ok_or(ReadError::OutOfBounds)?;
        self.axis_values_data.resolve_offset(offset)
    }

    /// Iterates the axis values; malformed entries yield errors without
    /// ending the iteration.
    pub fn axis_values(&self) -> impl Iterator<Item = Result<AxisValue<'a>, ReadError>> + '_ {
        (0..self.axis_value_count()).map(|ix| self.axis_value(ix))
    }
}

#[cfg(test)]
mod tests {
    use font_test_data::{be_buffer, bebuffer::BeBuffer};

    use super::*;

    fn fixed(value: i32) -> u32 {
        Fixed::from_i32(value).to_bits() as u32
    }

    #[test]
    fn axes_and_values() {
        let buf = be_buffer! {
            1u16, 2u16,     // version
            8u16,           // designAxisSize
            2u16,           // designAxisCount
            20u32,          // designAxesOffset
            4u16,           // axisValueCount
            36u32,          // offsetToAxisValueOffsets
            2u16,           // elidedFallbackNameID
            (Tag::new(b"wght")), 256u16, 0u16,
            (Tag::new(b"ital")), 257u16, 1u16,
            // offsets from 36
            [8u16, 20, 36, 56],
            // format 1: Regular, elidable
            1u16, 0u16, 2u16, 258u16, (fixed(400)),
            // format 3: Bold, linked to 400
            3u16, 0u16, 0u16, 259u16, (fixed(700)), (fixed(400)),
            // format 2: range 100..=300 with nominal 200
            2u16, 0u16, 0u16, 260u16, (fixed(200)), (fixed(100)), (fixed(300)),
            // format 4: wght 700 + ital 1
            4u16, 2u16, 0u16, 261u16,
            0u16, (fixed(700)),
            1u16, (fixed(1))
        };
        let stat = Stat::read(FontData::new(&buf)).unwrap();
        assert_eq!(stat.elided_fallback_name_id(), Some(2));
        let axes: Vec<_> = stat.design_axes().iter().map(|a| a.axis_tag).collect();
        assert_eq!(axes, [Tag::new(b"wght"), Tag::new(b"ital")]);
        let values: Vec<_> = stat.axis_values().map(|v| v.unwrap()).collect();
        assert_eq!(values.len(), 4);
        assert_eq!(
            values[0],
            AxisValue::Format1 {
                axis_index: 0,
                flags: flags::ELIDABLE_AXIS_VALUE_NAME,
                value_name_id: 258,
                value: Fixed::from_i32(400),
            }
        );
        assert!(values[0].is_elidable());
        assert!(
            matches!(values[1], AxisValue::Format3 { linked_value, .. } if linked_value == Fixed::from_i32(400))
        );
        assert!(
            matches!(values[2], AxisValue::Format2 { range_max_value, .. } if range_max_value == Fixed::from_i32(300))
        );
        let AxisValue::Format4 { values: records, .. } = &values[3] else {
            panic!("expected format 4");
        };
        let records: Vec<_> = records.iter().map(|r| (r.axis_index, r.value)).collect();
        assert_eq!(
            records,
            [(0, Fixed::from_i32(700)), (1, Fixed::from_i32(1))]
        );
        assert_eq!(values[3].value_name_id(), 261);
    }
}
