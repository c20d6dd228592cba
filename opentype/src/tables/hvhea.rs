//! The [hhea](https://docs.microsoft.com/en-us/typography/opentype/spec/hhea)
//! and [vhea](https://docs.microsoft.com/en-us/typography/opentype/spec/vhea)
//! tables, which share a layout.

use types::Tag;

use crate::{FontData, FontRead, ReadError};

/// 'hhea'
pub const HHEA_TAG: Tag = Tag::new(b"hhea");
/// 'vhea'
pub const VHEA_TAG: Tag = Tag::new(b"vhea");

/// A horizontal or vertical header table.
#[derive(Clone, Debug)]
pub struct HVhea<'a> {
    data: FontData<'a>,
}

impl<'a> FontRead<'a> for HVhea<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        data.check_len(36)?;
        Ok(HVhea { data })
    }
}

impl HVhea<'_> {
    /// Distance from baseline of highest ascender (or vertical typographic
    /// ascender for vhea).
    pub fn ascender(&self) -> i16 {
        self.data.read_at(4).unwrap_or_default()
    }

    /// Distance from baseline of lowest descender.
    pub fn descender(&self) -> i16 {
        self.data.read_at(6).unwrap_or_default()
    }

    /// Typographic line gap.
    pub fn line_gap(&self) -> i16 {
        self.data.read_at(8).unwrap_or_default()
    }

    /// Maximum advance value in the metrics table.
    pub fn advance_max(&self) -> u16 {
        self.data.read_at(10).unwrap_or_default()
    }

    pub fn caret_slope_rise(&self) -> i16 {
        self.data.read_at(18).unwrap_or_default()
    }

    pub fn caret_slope_run(&self) -> i16 {
        self.data.read_at(20).unwrap_or_default()
    }

    pub fn caret_offset(&self) -> i16 {
        self.data.read_at(22).unwrap_or_default()
    }

    /// Number of long metric entries in the hmtx/vmtx table.
    pub fn number_of_long_metrics(&self) -> u16 {
        self.data.read_at(34).unwrap_or_default()
    }
}
