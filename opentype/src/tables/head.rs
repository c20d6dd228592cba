//! The [head](https://docs.microsoft.com/en-us/typography/opentype/spec/head) table

use types::{BoundingBox, Fixed, Tag};

use crate::{FontData, FontRead, ReadError};

/// 'head'
pub const TAG: Tag = Tag::new(b"head");

/// The font header table.
#[derive(Clone, Debug)]
pub struct Head<'a> {
    data: FontData<'a>,
}

impl<'a> FontRead<'a> for Head<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        data.check_len(54)?;
        let magic: u32 = data.read_at(12)?;
        if magic != 0x5F0F_3CF5 {
            return Err(ReadError::MalformedData("bad magic number in head"));
        }
        Ok(Head { data })
    }
}

impl<'a> Head<'a> {
    pub fn font_revision(&self) -> Fixed {
        self.data.read_at(4).unwrap_or_default()
    }

    pub fn flags(&self) -> u16 {
        self.data.read_at(16).unwrap_or_default()
    }

    /// Valid range is from 16 to 16384.
    pub fn units_per_em(&self) -> u16 {
        self.data.read_at(18).unwrap_or_default()
    }

    pub fn x_min(&self) -> i16 {
        self.data.read_at(36).unwrap_or_default()
    }

    pub fn y_min(&self) -> i16 {
        self.data.read_at(38).unwrap_or_default()
    }

    pub fn x_max(&self) -> i16 {
        self.data.read_at(40).unwrap_or_default()
    }

    pub fn y_max(&self) -> i16 {
        self.data.read_at(42).unwrap_or_default()
    }

    /// The bounding box for all glyphs in the font.
    pub fn bbox(&self) -> BoundingBox<i16> {
        BoundingBox {
            x_min: self.x_min(),
            y_min: self.y_min(),
            x_max: self.x_max(),
            y_max: self.y_max(),
        }
    }

    pub fn mac_style(&self) -> u16 {
        self.data.read_at(44).unwrap_or_default()
    }

    /// Smallest readable size in pixels.
    pub fn lowest_rec_ppem(&self) -> u16 {
        self.data.read_at(46).unwrap_or_default()
    }

    /// 0 for short offsets (Offset16), 1 for long (Offset32).
    pub fn index_to_loc_format(&self) -> i16 {
        self.data.read_at(50).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use font_test_data::bebuffer::BeBuffer;

    #[test]
    fn smoke_test() {
        let buf = BeBuffer::new()
            .extend([1u16, 0u16])
            .push(Fixed::from_f64(2.8))
            .extend([42u32, 0x5f0f3cf5])
            .extend([16u16, 4096]) // flags, upm
            .extend([-500i64, 101])
            .extend([-100i16, -50, 400, 711])
            .extend([0u16, 12]) // mac_style / ppem
            .extend([2i16, 1, 0]);

        let head = Head::read(FontData::new(&buf)).unwrap();
        assert_eq!(head.font_revision(), Fixed::from_f64(2.8));
        assert_eq!(head.units_per_em(), 4096);
        assert_eq!(head.y_min(), -50);
        assert_eq!(head.lowest_rec_ppem(), 12);
        assert_eq!(head.index_to_loc_format(), 1);
    }

    #[test]
    fn truncated() {
        let buf = BeBuffer::new().extend([1u16, 0u16]);
        assert_eq!(
            Head::read(FontData::new(&buf)).err(),
            Some(ReadError::Eof {
                expected: 54,
                actual: 4
            })
        );
    }
}
