//! The [MVAR (Metrics Variations)](https://docs.microsoft.com/en-us/typography/opentype/spec/mvar) table

use types::{F2Dot14, Fixed, Tag};

use super::variations::{DeltaSetIndex, ItemVariationStore};
use crate::{record, FontData, FontRead, ReadError, RecordArray};

/// 'MVAR'
pub const TAG: Tag = Tag::new(b"MVAR");

/// Tags of the font-wide metrics that may vary.
pub mod tags {
    use types::Tag;

    pub const HASC: Tag = Tag::new(b"hasc");
    pub const HDSC: Tag = Tag::new(b"hdsc");
    pub const HLGP: Tag = Tag::new(b"hlgp");
    pub const HCLA: Tag = Tag::new(b"hcla");
    pub const HCLD: Tag = Tag::new(b"hcld");
    pub const VASC: Tag = Tag::new(b"vasc");
    pub const VDSC: Tag = Tag::new(b"vdsc");
    pub const VLGP: Tag = Tag::new(b"vlgp");
    pub const XHGT: Tag = Tag::new(b"xhgt");
    pub const CPHT: Tag = Tag::new(b"cpht");
    pub const UNDO: Tag = Tag::new(b"undo");
    pub const UNDS: Tag = Tag::new(b"unds");
    pub const STRO: Tag = Tag::new(b"stro");
    pub const STRS: Tag = Tag::new(b"strs");
}

record! {
    pub struct ValueRecord {
        pub value_tag: Tag,
        pub delta_set_outer_index: u16,
        pub delta_set_inner_index: u16,
    }
}

#[derive(Clone, Debug)]
pub struct Mvar<'a> {
    value_records: RecordArray<'a, ValueRecord>,
    item_variation_store: Option<ItemVariationStore<'a>>,
}

impl<'a> FontRead<'a> for Mvar<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let major: u16 = cursor.read()?;
        if major != 1 {
            return Err(ReadError::InvalidFormat(major as _));
        }
        cursor.advance_by(4);
        let record_size: u16 = cursor.read()?;
        let record_count: u16 = cursor.read()?;
        let store_offset: u16 = cursor.read()?;
        if record_count != 0 && record_size != 8 {
            return Err(ReadError::MalformedData("unexpected MVAR value record size"));
        }
        let value_records = cursor.read_records(record_count as usize)?;
        let item_variation_store = data.resolve_nullable(store_offset).transpose()?;
        Ok(Self {
            value_records,
            item_variation_store,
        })
    }
}

impl<'a> Mvar<'a> {
    pub fn value_records(&self) -> RecordArray<'a, ValueRecord> {
        self.value_records
    }

    /// Returns the delta for the metric identified by `tag`.
    pub fn metric_delta(&self, tag: Tag, coords: &[F2Dot14]) -> Result<Fixed, ReadError> {
        let Some(store) = &self.item_variation_store else {
            return Err(ReadError::NullOffset);
        };
        let ix = self
            .value_records
            .binary_search_by_key(&tag, |record| record.value_tag)
            .map_err(|_| ReadError::MetricIsMissing(tag))?;
        let record = self
            .value_records
            .get(ix)
            .ok_or(ReadError::MetricIsMissing(tag))?;
        store.compute_delta_fixed(
            DeltaSetIndex {
                outer: record.delta_set_outer_index,
                inner: record.delta_set_inner_index,
            },
            coords,
        )
    }
}
