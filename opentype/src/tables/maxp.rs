//! The [maxp](https://docs.microsoft.com/en-us/typography/opentype/spec/maxp) table

use types::Tag;

use crate::{FontData, FontRead, ReadError};

/// 'maxp'
pub const TAG: Tag = Tag::new(b"maxp");

/// The maximum profile table.
///
/// Only the glyph count is interpreted; the version 1.0 TrueType limits are
/// not needed for reading.
#[derive(Clone, Debug)]
pub struct Maxp<'a> {
    data: FontData<'a>,
}

impl<'a> FontRead<'a> for Maxp<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        data.check_len(6)?;
        let version: u32 = data.read_at(0)?;
        match version {
            0x0000_5000 => (),
            0x0001_0000 => data.check_len(32)?,
            other => return Err(ReadError::InvalidFormat(other as i64)),
        }
        Ok(Maxp { data })
    }
}

impl Maxp<'_> {
    pub fn version(&self) -> u32 {
        self.data.read_at(0).unwrap_or_default()
    }

    /// The number of glyphs in the font.
    pub fn num_glyphs(&self) -> u16 {
        self.data.read_at(4).unwrap_or_default()
    }

    /// Maximum levels of recursion; 1 for simple components.
    pub fn max_component_depth(&self) -> Option<u16> {
        (self.version() == 0x0001_0000)
            .then(|| self.data.read_at(30).ok())
            .flatten()
    }
}
