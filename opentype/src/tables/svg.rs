//! The [SVG](https://learn.microsoft.com/en-us/typography/opentype/spec/svg) table

use std::cmp::Ordering;

use types::{GlyphId, Tag};

use crate::{record, FontData, FontRead, ReadError, RecordArray};

/// 'SVG '
pub const TAG: Tag = Tag::new(b"SVG ");

record! {
    pub struct SvgDocumentRecord {
        pub start_glyph_id: u16,
        pub end_glyph_id: u16,
        pub svg_doc_offset: u32,
        pub svg_doc_length: u32,
    }
}

#[derive(Clone, Debug)]
pub struct Svg<'a> {
    document_list: FontData<'a>,
    records: RecordArray<'a, SvgDocumentRecord>,
}

impl<'a> FontRead<'a> for Svg<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let version: u16 = cursor.read()?;
        if version != 0 {
            return Err(ReadError::InvalidFormat(version as _));
        }
        let list_offset: u32 = cursor.read()?;
        let document_list = data
            .split_off(list_offset as usize)
            .ok_or(ReadError::OutOfBounds)?;
        let num_entries: u16 = document_list.read_at(0)?;
        let records = document_list.read_records(2, num_entries as usize)?;
        Ok(Self {
            document_list,
            records,
        })
    }
}

impl<'a> Svg<'a> {
    pub fn document_records(&self) -> RecordArray<'a, SvgDocumentRecord> {
        self.records
    }

    /// Returns the SVG document that contains `glyph_id`.
    ///
    /// The document may be gzip compressed and is not validated.
    pub fn glyph_data(&self, glyph_id: GlyphId) -> Result<Option<&'a [u8]>, ReadError> {
        let gid = glyph_id.to_u32();
        let Ok(ix) = self.records.binary_search_by(|record| {
            if record.start_glyph_id as u32 > gid {
                Ordering::Greater
            } else if (record.end_glyph_id as u32) < gid {
                Ordering::Less
            } else {
                Ordering::Equal
            }
        }) else {
            return Ok(None);
        };
        let record = self.records.get(ix).ok_or(ReadError::OutOfBounds)?;
        let data = self
            .document_list
            .slice_len(record.svg_doc_offset as usize, record.svg_doc_length as usize)?;
        Ok(Some(data.as_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use font_test_data::bebuffer::BeBuffer;

    use super::*;

    #[test]
    fn documents_by_glyph() {
        let doc_a = b"<svg id='a'/>";
        let doc_b = b"<svg id='b'/>";
        let list_start = 2 + 2 * 12;
        let buf = BeBuffer::new()
            .push(0u16)
            .push(10u32)
            .push(0u32)
            .push(2u16)
            .push(1u16)
            .push(3u16)
            .push(list_start as u32)
            .push(doc_a.len() as u32)
            .push(5u16)
            .push(5u16)
            .push((list_start + doc_a.len()) as u32)
            .push(doc_b.len() as u32)
            .extend_bytes(doc_a)
            .extend_bytes(doc_b);
        let svg = Svg::read(FontData::new(&buf)).unwrap();
        assert_eq!(svg.document_records().len(), 2);
        assert_eq!(svg.glyph_data(GlyphId::new(0)).unwrap(), None);
        assert_eq!(svg.glyph_data(GlyphId::new(2)).unwrap(), Some(&doc_a[..]));
        assert_eq!(svg.glyph_data(GlyphId::new(4)).unwrap(), None);
        assert_eq!(svg.glyph_data(GlyphId::new(5)).unwrap(), Some(&doc_b[..]));
    }
}
