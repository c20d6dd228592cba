//! Embedded bitmap tables: [EBLC]/[EBDT] and their color counterparts
//! [CBLC]/[CBDT].
//!
//! The location tables share a single layout, as do the data tables, so
//! one pair of types reads both.
//!
//! [EBLC]: https://learn.microsoft.com/en-us/typography/opentype/spec/eblc
//! [EBDT]: https://learn.microsoft.com/en-us/typography/opentype/spec/ebdt
//! [CBLC]: https://learn.microsoft.com/en-us/typography/opentype/spec/cblc
//! [CBDT]: https://learn.microsoft.com/en-us/typography/opentype/spec/cbdt

use types::{GlyphId, Tag};

use crate::{array::FixedRecord, record, FontData, FontRead, ReadError, RecordArray};

/// 'CBLC'
pub const CBLC_TAG: Tag = Tag::new(b"CBLC");
/// 'CBDT'
pub const CBDT_TAG: Tag = Tag::new(b"CBDT");
/// 'EBLC'
pub const EBLC_TAG: Tag = Tag::new(b"EBLC");
/// 'EBDT'
pub const EBDT_TAG: Tag = Tag::new(b"EBDT");

record! {
    /// Line metrics for one direction of a strike.
    pub struct SbitLineMetrics {
        pub ascender: i8,
        pub descender: i8,
        pub width_max: u8,
        pub caret_slope_numerator: i8,
        pub caret_slope_denominator: i8,
        pub caret_offset: i8,
        pub min_origin_sb: i8,
        pub min_advance_sb: i8,
        pub max_before_bl: i8,
        pub min_after_bl: i8,
        pub pad1: i8,
        pub pad2: i8,
    }
}

record! {
    pub struct BigGlyphMetrics {
        pub height: u8,
        pub width: u8,
        pub hori_bearing_x: i8,
        pub hori_bearing_y: i8,
        pub hori_advance: u8,
        pub vert_bearing_x: i8,
        pub vert_bearing_y: i8,
        pub vert_advance: u8,
    }
}

record! {
    pub struct SmallGlyphMetrics {
        pub height: u8,
        pub width: u8,
        pub bearing_x: i8,
        pub bearing_y: i8,
        pub advance: u8,
    }
}

record! {
    /// Entry of the index subtable list.
    pub struct IndexSubtableRecord {
        pub first_glyph_index: u16,
        pub last_glyph_index: u16,
        pub index_subtable_offset: u32,
    }
}

record! {
    /// A glyph that is part of a composite bitmap.
    pub struct BdtComponent {
        pub glyph_id: u16,
        pub x_offset: i8,
        pub y_offset: i8,
    }
}

/// Description of a single strike: a set of bitmaps at one size.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BitmapSize {
    pub index_subtable_list_offset: u32,
    pub index_subtable_list_size: u32,
    pub number_of_index_subtables: u32,
    pub hori: SbitLineMetrics,
    pub vert: SbitLineMetrics,
    pub start_glyph_index: u16,
    pub end_glyph_index: u16,
    pub ppem_x: u8,
    pub ppem_y: u8,
    pub bit_depth: u8,
    pub flags: i8,
}

impl<'a> FixedRecord<'a> for BitmapSize {
    const RAW_BYTE_LEN: usize = 48;

    fn read_record(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let index_subtable_list_offset = cursor.read()?;
        let index_subtable_list_size = cursor.read()?;
        let number_of_index_subtables = cursor.read()?;
        // colorRef, always zero
        cursor.advance::<u32>();
        let hori = cursor.read_records::<SbitLineMetrics>(1)?;
        let vert = cursor.read_records::<SbitLineMetrics>(1)?;
        Ok(Self {
            index_subtable_list_offset,
            index_subtable_list_size,
            number_of_index_subtables,
            hori: hori.get(0).ok_or(ReadError::OutOfBounds)?,
            vert: vert.get(0).ok_or(ReadError::OutOfBounds)?,
            start_glyph_index: cursor.read()?,
            end_glyph_index: cursor.read()?,
            ppem_x: cursor.read()?,
            ppem_y: cursor.read()?,
            bit_depth: cursor.read()?,
            flags: cursor.read()?,
        })
    }
}

impl BitmapSize {
    /// Returns the location of the bitmap for `glyph_id` in the data table.
    ///
    /// `offset_data` is the whole location table, which the index subtable
    /// list offsets are relative to.
    pub fn location(
        &self,
        offset_data: FontData,
        glyph_id: GlyphId,
    ) -> Result<BitmapLocation, ReadError> {
        let gid = u16::try_from(glyph_id.to_u32()).map_err(|_| ReadError::OutOfBounds)?;
        if !(self.start_glyph_index..=self.end_glyph_index).contains(&gid) {
            return Err(ReadError::OutOfBounds);
        }
        let list_offset = self.index_subtable_list_offset as usize;
        let list_data = offset_data
            .split_off(list_offset)
            .ok_or(ReadError::OutOfBounds)?;
        let records: RecordArray<IndexSubtableRecord> =
            list_data.read_records(0, self.number_of_index_subtables as usize)?;
        for record in records.iter() {
            if !(record.first_glyph_index..=record.last_glyph_index).contains(&gid) {
                continue;
            }
            let subtable = list_data
                .split_off(record.index_subtable_offset as usize)
                .ok_or(ReadError::OutOfBounds)?;
            let mut cursor = subtable.cursor();
            let index_format: u16 = cursor.read()?;
            let image_format: u16 = cursor.read()?;
            let image_data_offset: u32 = cursor.read()?;
            let mut location = BitmapLocation {
                format: image_format,
                data_offset: image_data_offset as usize,
                data_size: 0,
                bit_depth: self.bit_depth,
                metrics: None,
            };
            let glyph_ix = (gid - record.first_glyph_index) as usize;
            match index_format {
                1 | 3 => {
                    let (start, end) = if index_format == 1 {
                        let offsets = cursor.read_array::<u32>(glyph_ix + 2)?;
                        (offsets.get(glyph_ix), offsets.get(glyph_ix + 1))
                    } else {
                        let offsets = cursor.read_array::<u16>(glyph_ix + 2)?;
                        (
                            offsets.get(glyph_ix).map(u32::from),
                            offsets.get(glyph_ix + 1).map(u32::from),
                        )
                    };
                    let (start, end) = start.zip(end).ok_or(ReadError::OutOfBounds)?;
                    location.data_offset += start as usize;
                    location.data_size = end.checked_sub(start).ok_or(ReadError::OutOfBounds)?
                        as usize;
                }
                2 => {
                    let image_size: u32 = cursor.read()?;
                    let metrics = read_big_metrics(&mut cursor)?;
                    location.data_offset += glyph_ix * image_size as usize;
                    location.data_size = image_size as usize;
                    location.metrics = Some(metrics);
                }
                4 => {
                    let num_glyphs: u32 = cursor.read()?;
                    // (glyph id, offset) pairs with a trailing sentinel
                    let pairs = cursor.read_array::<u16>((num_glyphs as usize + 1) * 2)?;
                    let found = (0..num_glyphs as usize)
                        .find(|ix| pairs.get(ix * 2) == Some(gid))
                        .ok_or(ReadError::OutOfBounds)?;
                    let start = pairs.get(found * 2 + 1).ok_or(ReadError::OutOfBounds)?;
                    let end = pairs.get(found * 2 + 3).ok_or(ReadError::OutOfBounds)?;
                    location.data_offset += start as usize;
                    location.data_size = end.checked_sub(start).ok_or(ReadError::OutOfBounds)?
                        as usize;
                }
                5 => {
                    let image_size: u32 = cursor.read()?;
                    let metrics = read_big_metrics(&mut cursor)?;
                    let num_glyphs: u32 = cursor.read()?;
                    let glyphs = cursor.read_array::<u16>(num_glyphs as usize)?;
                    let ix = glyphs.binary_search(&gid).map_err(|_| ReadError::OutOfBounds)?;
                    location.data_offset += ix * image_size as usize;
                    location.data_size = image_size as usize;
                    location.metrics = Some(metrics);
                }
                other => return Err(ReadError::InvalidFormat(other as _)),
            }
            return Ok(location);
        }
        Err(ReadError::OutOfBounds)
    }
}

fn read_big_metrics(cursor: &mut crate::Cursor) -> Result<BigGlyphMetrics, ReadError> {
    cursor
        .read_records::<BigGlyphMetrics>(1)?
        .get(0)
        .ok_or(ReadError::OutOfBounds)
}

/// Where a glyph bitmap lives in the data table and how it is stored.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BitmapLocation {
    /// Image format in the data table.
    pub format: u16,
    pub data_offset: usize,
    pub data_size: usize,
    pub bit_depth: u8,
    /// Metrics shared by every glyph in the index subtable, for formats that
    /// store them there.
    pub metrics: Option<BigGlyphMetrics>,
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum BitmapDataFormat {
    /// Rows are packed with no padding between them.
    BitAligned,
    /// Each row starts on a byte boundary.
    ByteAligned,
    Png,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BitmapMetrics {
    Small(SmallGlyphMetrics),
    Big(BigGlyphMetrics),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BitmapContent<'a> {
    Data(BitmapDataFormat, &'a [u8]),
    Composite(RecordArray<'a, BdtComponent>),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BitmapData<'a> {
    pub metrics: BitmapMetrics,
    pub content: BitmapContent<'a>,
}

/// A bitmap location table (`EBLC` or `CBLC`).
#[derive(Clone, Debug)]
pub struct Blc<'a> {
    data: FontData<'a>,
    major_version: u16,
    bitmap_sizes: RecordArray<'a, BitmapSize>,
}

impl<'a> FontRead<'a> for Blc<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let major_version: u16 = cursor.read()?;
        if !(2..=3).contains(&major_version) {
            return Err(ReadError::InvalidFormat(major_version as _));
        }
        cursor.advance::<u16>();
        let num_sizes: u32 = cursor.read()?;
        let bitmap_sizes = cursor.read_records(num_sizes as usize)?;
        Ok(Self {
            data,
            major_version,
            bitmap_sizes,
        })
    }
}

impl<'a> Blc<'a> {
    /// 2 for `EBLC`, 3 for `CBLC`.
    pub fn major_version(&self) -> u16 {
        self.major_version
    }

    pub fn bitmap_sizes(&self) -> RecordArray<'a, BitmapSize> {
        self.bitmap_sizes
    }

    pub fn offset_data(&self) -> FontData<'a> {
        self.data
    }

    /// Returns the strike whose vertical ppem is closest to `ppem`, preferring
    /// larger strikes when none matches exactly.
    pub fn best_size(&self, ppem: u8) -> Option<BitmapSize> {
        let mut best: Option<BitmapSize> = None;
        for size in self.bitmap_sizes.iter() {
            let Some(current) = best else {
                best = Some(size);
                continue;
            };
            let better = if current.ppem_y < ppem {
                size.ppem_y > current.ppem_y
            } else {
                size.ppem_y >= ppem && size.ppem_y < current.ppem_y
            };
            if better {
                best = Some(size);
            }
        }
        best
    }

    /// Convenience for locating a glyph in `size`.
    pub fn location(&self, size: &BitmapSize, glyph_id: GlyphId) -> Result<BitmapLocation, ReadError> {
        size.location(self.data, glyph_id)
    }
}

/// A bitmap data table (`EBDT` or `CBDT`).
#[derive(Clone, Debug)]
pub struct Bdt<'a> {
    data: FontData<'a>,
    major_version: u16,
}

impl<'a> FontRead<'a> for Bdt<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let major_version: u16 = data.read_at(0)?;
        if !(2..=3).contains(&major_version) {
            return Err(ReadError::InvalidFormat(major_version as _));
        }
        data.check_len(4)?;
        Ok(Self {
            data,
            major_version,
        })
    }
}

impl<'a> Bdt<'a> {
    pub fn major_version(&self) -> u16 {
        self.major_version
    }

    /// Color data tables may carry PNG images.
    pub fn is_color(&self) -> bool {
        self.major_version == 3
    }

    pub fn data(&self, location: &BitmapLocation) -> Result<BitmapData<'a>, ReadError> {
        bitmap_data(self.data, location, self.is_color())
    }
}

/// Decodes the bitmap at `location` in a data table.
///
/// Formats 17 through 19 are only valid in color tables.
pub fn bitmap_data<'a>(
    offset_data: FontData<'a>,
    location: &BitmapLocation,
    is_color: bool,
) -> Result<BitmapData<'a>, ReadError> {
    let mut image_data = offset_data
        .slice(location.data_offset..location.data_offset + location.data_size)
        .ok_or(ReadError::OutOfBounds)?
        .cursor();
    let small = |cursor: &mut crate::Cursor<'a>| -> Result<BitmapMetrics, ReadError> {
        let metrics = cursor.read_records::<SmallGlyphMetrics>(1)?;
        Ok(BitmapMetrics::Small(
            metrics.get(0).ok_or(ReadError::OutOfBounds)?,
        ))
    };
    let big = |cursor: &mut crate::Cursor<'a>| -> Result<BitmapMetrics, ReadError> {
        Ok(BitmapMetrics::Big(read_big_metrics(cursor)?))
    };
    let shared = || -> Result<BitmapMetrics, ReadError> {
        location
            .metrics
            .map(BitmapMetrics::Big)
            .ok_or(ReadError::MalformedData("missing index subtable metrics"))
    };
    let remaining = |cursor: &mut crate::Cursor<'a>| -> Result<&'a [u8], ReadError> {
        cursor.read_bytes(cursor.remaining_bytes())
    };
    let png = |cursor: &mut crate::Cursor<'a>| -> Result<&'a [u8], ReadError> {
        let len: u32 = cursor.read()?;
        cursor.read_bytes(len as usize)
    };
    let components = |cursor: &mut crate::Cursor<'a>| -> Result<BitmapContent<'a>, ReadError> {
        let count: u16 = cursor.read()?;
        Ok(BitmapContent::Composite(cursor.read_records(count as usize)?))
    };
    use BitmapDataFormat::*;
    let (metrics, content) = match location.format {
        1 => (
            small(&mut image_data)?,
            BitmapContent::Data(ByteAligned, remaining(&mut image_data)?),
        ),
        2 => (
            small(&mut image_data)?,
            BitmapContent::Data(BitAligned, remaining(&mut image_data)?),
        ),
        5 => (
            shared()?,
            BitmapContent::Data(BitAligned, remaining(&mut image_data)?),
        ),
        6 => (
            big(&mut image_data)?,
            BitmapContent::Data(ByteAligned, remaining(&mut image_data)?),
        ),
        7 => (
            big(&mut image_data)?,
            BitmapContent::Data(BitAligned, remaining(&mut image_data)?),
        ),
        8 => {
            let metrics = small(&mut image_data)?;
            image_data.advance::<u8>();
            (metrics, components(&mut image_data)?)
        }
        9 => (big(&mut image_data)?, components(&mut image_data)?),
        17 if is_color => (
            small(&mut image_data)?,
            BitmapContent::Data(Png, png(&mut image_data)?),
        ),
        18 if is_color => (
            big(&mut image_data)?,
            BitmapContent::Data(Png, png(&mut image_data)?),
        ),
        19 if is_color => (shared()?, BitmapContent::Data(Png, png(&mut image_data)?)),
        other => return Err(ReadError::InvalidFormat(other as _)),
    };
    Ok(BitmapData { metrics, content })
}

#[cfg(test)]
mod tests {
    use font_test_data::bebuffer::BeBuffer;

    use super::*;

    fn line_metrics(buf: BeBuffer, ascender: i8) -> BeBuffer {
        buf.push(ascender).push(-2i8).extend([0u8; 10])
    }

    /// A location table with one strike covering glyphs 1..=4.
    ///
    /// Glyphs 1 and 2 use index format 1 with image format 1, glyphs 3 and 4
    /// use index format 2 with image format 5.
    fn blc(major_version: u16, ppem: u8, image_format: u16) -> BeBuffer {
        let list_offset = 8 + 48;
        let buf = BeBuffer::new()
            .push(major_version)
            .push(0u16)
            .push(1u32)
            // BitmapSize
            .push(list_offset as u32)
            .push(48u32)
            .push(2u32)
            .push(0u32);
        let buf = line_metrics(buf, 10);
        let buf = line_metrics(buf, 8);
        buf.push(1u16)
            .push(4u16)
            .extend([ppem, ppem, 1, 1])
            // IndexSubtableList
            .push(1u16)
            .push(2u16)
            .push(16u32)
            .push(3u16)
            .push(4u16)
            .push(36u32)
            // format 1 subtable
            .push(1u16)
            .push(image_format)
            .push(4u32)
            .extend([0u32, 8, 14])
            // format 2 subtable
            .push(2u16)
            .push(5u16)
            .push(100u32)
            .push(3u32)
            .extend([3u8, 8, 0, 3, 9, 0, 0, 9])
    }

    #[test]
    fn read_strike() {
        let buf = blc(2, 12, 1);
        let table = Blc::read(FontData::new(&buf)).unwrap();
        assert_eq!(table.major_version(), 2);
        let size = table.bitmap_sizes().get(0).unwrap();
        assert_eq!(size.ppem_y, 12);
        assert_eq!(size.hori.ascender, 10);
        assert_eq!(size.vert.ascender, 8);
        assert_eq!(size.hori.descender, -2);
        assert_eq!((size.start_glyph_index, size.end_glyph_index), (1, 4));
        assert_eq!(table.best_size(20).unwrap().ppem_y, 12);
    }

    #[test]
    fn index_formats() {
        let buf = blc(2, 12, 1);
        let table = Blc::read(FontData::new(&buf)).unwrap();
        let size = table.bitmap_sizes().get(0).unwrap();
        let loc = table.location(&size, GlyphId::new(1)).unwrap();
        assert_eq!((loc.format, loc.data_offset, loc.data_size), (1, 4, 8));
        let loc = table.location(&size, GlyphId::new(2)).unwrap();
        assert_eq!((loc.format, loc.data_offset, loc.data_size), (1, 12, 6));
        let loc = table.location(&size, GlyphId::new(4)).unwrap();
        assert_eq!((loc.format, loc.data_offset, loc.data_size), (5, 103, 3));
        assert_eq!(loc.metrics.unwrap().hori_advance, 9);
        assert!(table.location(&size, GlyphId::new(5)).is_err());
        assert!(table.location(&size, GlyphId::new(0)).is_err());
    }

    #[test]
    fn decode_bitmaps() {
        let buf = blc(2, 12, 1);
        let table = Blc::read(FontData::new(&buf)).unwrap();
        let size = table.bitmap_sizes().get(0).unwrap();
        let data = BeBuffer::new()
            .push(2u16)
            .push(0u16)
            // glyph 1: small metrics and 3 bytes of data
            .extend([3u8, 8, 0, 3, 9])
            .extend([0xAAu8, 0xBB, 0xCC])
            // glyph 2: small metrics and one byte
            .extend([1u8, 8, 0, 1, 9, 0xFF]);
        let bdt = Bdt::read(FontData::new(&data)).unwrap();
        assert!(!bdt.is_color());
        let loc = table.location(&size, GlyphId::new(1)).unwrap();
        let bitmap = bdt.data(&loc).unwrap();
        let BitmapMetrics::Small(metrics) = bitmap.metrics else {
            panic!("expected small metrics");
        };
        assert_eq!((metrics.height, metrics.width, metrics.advance), (3, 8, 9));
        assert_eq!(
            bitmap.content,
            BitmapContent::Data(BitmapDataFormat::ByteAligned, &[0xAA, 0xBB, 0xCC])
        );
        let loc = table.location(&size, GlyphId::new(2)).unwrap();
        let bitmap = bdt.data(&loc).unwrap();
        assert_eq!(
            bitmap.content,
            BitmapContent::Data(BitmapDataFormat::ByteAligned, &[0xFF])
        );
    }

    #[test]
    fn png_only_in_color_tables() {
        let png = [0x89u8, b'P', b'N', b'G'];
        let data = BeBuffer::new()
            .push(3u16)
            .push(0u16)
            .extend([1u8, 1, 0, 1, 1])
            .push(png.len() as u32)
            .extend(png);
        let location = BitmapLocation {
            format: 17,
            data_offset: 4,
            data_size: data.len() - 4,
            bit_depth: 32,
            metrics: None,
        };
        let bdt = Bdt::read(FontData::new(&data)).unwrap();
        assert!(bdt.is_color());
        let bitmap = bdt.data(&location).unwrap();
        assert_eq!(
            bitmap.content,
            BitmapContent::Data(BitmapDataFormat::Png, &png)
        );
        assert_eq!(
            bitmap_data(FontData::new(&data), &location, false),
            Err(ReadError::InvalidFormat(17))
        );
    }

    #[test]
    fn composite_bitmap() {
        let data = BeBuffer::new()
            .extend([4u8, 4, 0, 4, 5])
            .push(0u8)
            .push(2u16)
            .push(3u16)
            .extend([1i8, 2])
            .push(4u16)
            .extend([-1i8, 0]);
        let location = BitmapLocation {
            format: 8,
            data_offset: 0,
            data_size: data.len(),
            bit_depth: 1,
            metrics: None,
        };
        let bitmap = bitmap_data(FontData::new(&data), &location, false).unwrap();
        let BitmapContent::Composite(components) = bitmap.content else {
            panic!("expected a composite");
        };
        let ids: Vec<_> = components.iter().map(|c| (c.glyph_id, c.x_offset)).collect();
        assert_eq!(ids, [(3, 1), (4, -1)]);
    }
}
