//! The [CPAL](https://docs.microsoft.com/en-us/typography/opentype/spec/cpal) table

use types::Tag;

use crate::{record, Array, FontData, FontRead, ReadError, RecordArray};

/// 'CPAL'
pub const TAG: Tag = Tag::new(b"CPAL");

record! {
    /// A color in sRGB, stored in BGRA order.
    pub struct ColorRecord {
        pub blue: u8,
        pub green: u8,
        pub red: u8,
        pub alpha: u8,
    }
}

/// The color palette table.
#[derive(Clone, Debug)]
pub struct Cpal<'a> {
    data: FontData<'a>,
    version: u16,
    num_palette_entries: u16,
    color_records: RecordArray<'a, ColorRecord>,
    color_record_indices: Array<'a, u16>,
}

impl<'a> FontRead<'a> for Cpal<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let version: u16 = cursor.read()?;
        let num_palette_entries = cursor.read()?;
        let num_palettes: u16 = cursor.read()?;
        let num_color_records: u16 = cursor.read()?;
        let color_records_offset: u32 = cursor.read()?;
        if num_palettes == 0 {
            return Err(ReadError::MalformedData("CPAL table without palettes"));
        }
        let color_record_indices = cursor.read_array(num_palettes as usize)?;
        let color_records =
            data.read_records(color_records_offset as usize, num_color_records as usize)?;
        Ok(Self {
            data,
            version,
            num_palette_entries,
            color_records,
            color_record_indices,
        })
    }
}

impl<'a> Cpal<'a> {
    pub fn version(&self) -> u16 {
        self.version
    }

    /// The number of colors in each palette.
    pub fn num_palette_entries(&self) -> u16 {
        self.num_palette_entries
    }

    pub fn num_palettes(&self) -> u16 {
        self.color_record_indices.len() as u16
    }

    pub fn color_records(&self) -> RecordArray<'a, ColorRecord> {
        self.color_records
    }

    /// Returns the color at `entry` in the given palette.
    pub fn color(&self, palette: u16, entry: u16) -> Option<ColorRecord> {
        if entry >= self.num_palette_entries {
            return None;
        }
        let first = self.color_record_indices.get(palette as usize)?;
        self.color_records.get(first as usize + entry as usize)
    }

    /// Returns the palette type flags of a version 1 table.
    ///
    /// Bit 0 marks palettes usable on light backgrounds, bit 1 on dark
    /// backgrounds.
    pub fn palette_type(&self, palette: u16) -> Option<u32> {
        let offset = self.v1_offset(0)?;
        self.data
            .read_at(offset as usize + palette as usize * 4)
            .ok()
    }

    /// Returns the `name` identifier of the palette label, if any.
    pub fn palette_label(&self, palette: u16) -> Option<u16> {
        let offset = self.v1_offset(4)?;
        let name_id: u16 = self
            .data
            .read_at(offset as usize + palette as usize * 2)
            .ok()?;
        (name_id != 0xFFFF).then_some(name_id)
    }

    fn v1_offset(&self, field: usize) -> Option<u32> {
        if self.version < 1 {
            return None;
        }
        let pos = 12 + self.color_record_indices.len() * 2 + field;
        let offset: u32 = self.data.read_at(pos).ok()?;
        (offset != 0).then_some(offset)
    }
}

#[cfg(test)]
mod tests {
    use font_test_data::bebuffer::BeBuffer;

    use super::*;

    fn sample(version: u16, num_palettes: u16) -> BeBuffer {
        let indices_len = num_palettes as u32 * 2;
        let v1_len = if version == 1 { 12 } else { 0 };
        let records_offset = 12 + indices_len + v1_len;
        let mut buf = BeBuffer::new()
            .extend([version, 2, num_palettes, 4])
            .push(records_offset)
            .extend((0..num_palettes).map(|ix| ix * 2));
        if version == 1 {
            let types_offset = records_offset + 16;
            let labels_offset = types_offset + num_palettes as u32 * 4;
            buf = buf.extend([types_offset, labels_offset, 0]);
        }
        buf = buf.extend([
            0x00u8, 0x00, 0xFF, 0xFF, // blue
            0xFF, 0x00, 0x00, 0xFF, // red
            0x00, 0xFF, 0x00, 0xFF, // green
            0x00, 0x00, 0x00, 0x80, // translucent black
        ]);
        if version == 1 {
            buf = buf.extend([1u32, 2]).extend([300u16, 0xFFFF]);
        }
        buf
    }

    #[test]
    fn read_palettes() {
        let data = sample(0, 2);
        let cpal = Cpal::read(FontData::new(&data)).unwrap();
        assert_eq!(cpal.num_palettes(), 2);
        assert_eq!(cpal.num_palette_entries(), 2);
        assert_eq!(cpal.color_records().len(), 4);
        let color = cpal.color(0, 0).unwrap();
        assert_eq!([color.red, color.green, color.blue, color.alpha], [0xFF, 0, 0, 0xFF]);
        let color = cpal.color(1, 1).unwrap();
        assert_eq!(color.alpha, 0x80);
        assert!(cpal.color(0, 2).is_none());
        assert!(cpal.color(2, 0).is_none());
        assert!(cpal.palette_type(0).is_none());
    }

    #[test]
    fn version_1_fields() {
        let data = sample(1, 2);
        let cpal = Cpal::read(FontData::new(&data)).unwrap();
        assert_eq!(cpal.version(), 1);
        assert_eq!(cpal.palette_type(0), Some(1));
        assert_eq!(cpal.palette_type(1), Some(2));
        assert_eq!(cpal.palette_label(0), Some(300));
        assert_eq!(cpal.palette_label(1), None);
        assert_eq!(cpal.color(1, 0).unwrap().green, 0xFF);
    }

    #[test]
    fn zero_palettes_is_an_error() {
        let data = sample(0, 0);
        assert!(matches!(
            Cpal::read(FontData::new(&data)),
            Err(ReadError::MalformedData(_))
        ));
    }
}
