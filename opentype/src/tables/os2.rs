//! The [OS/2](https://docs.microsoft.com/en-us/typography/opentype/spec/os2) table

use types::Tag;

use crate::{FontData, FontRead, ReadError};

/// 'OS/2'
pub const TAG: Tag = Tag::new(b"OS/2");

/// OS/2 [selection flags](https://learn.microsoft.com/en-us/typography/opentype/spec/os2#fsselection)
pub mod selection {
    pub const ITALIC: u16 = 1 << 0;
    pub const UNDERSCORE: u16 = 1 << 1;
    pub const NEGATIVE: u16 = 1 << 2;
    pub const OUTLINED: u16 = 1 << 3;
    pub const STRIKEOUT: u16 = 1 << 4;
    pub const BOLD: u16 = 1 << 5;
    pub const REGULAR: u16 = 1 << 6;
    /// Use the typographic ascender, descender and line gap for line
    /// metrics.
    pub const USE_TYPO_METRICS: u16 = 1 << 7;
    pub const WWS: u16 = 1 << 8;
    pub const OBLIQUE: u16 = 1 << 9;
}

/// The OS/2 and Windows metrics table.
#[derive(Clone, Debug)]
pub struct Os2<'a> {
    data: FontData<'a>,
}

impl<'a> FontRead<'a> for Os2<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        data.check_len(2)?;
        let version: u16 = data.read_at(0)?;
        let min_len = match version {
            0 => 78,
            1 => 86,
            2..=4 => 96,
            _ => 100,
        };
        data.check_len(min_len)?;
        Ok(Os2 { data })
    }
}

impl Os2<'_> {
    pub fn version(&self) -> u16 {
        self.data.read_at(0).unwrap_or_default()
    }

    pub fn x_avg_char_width(&self) -> i16 {
        self.data.read_at(2).unwrap_or_default()
    }

    pub fn us_weight_class(&self) -> u16 {
        self.data.read_at(4).unwrap_or_default()
    }

    pub fn us_width_class(&self) -> u16 {
        self.data.read_at(6).unwrap_or_default()
    }

    pub fn fs_type(&self) -> u16 {
        self.data.read_at(8).unwrap_or_default()
    }

    pub fn y_subscript_x_size(&self) -> i16 {
        self.data.read_at(10).unwrap_or_default()
    }

    pub fn y_subscript_y_size(&self) -> i16 {
        self.data.read_at(12).unwrap_or_default()
    }

    pub fn y_subscript_x_offset(&self) -> i16 {
        self.data.read_at(14).unwrap_or_default()
    }

    pub fn y_subscript_y_offset(&self) -> i16 {
        self.data.read_at(16).unwrap_or_default()
    }

    pub fn y_superscript_x_size(&self) -> i16 {
        self.data.read_at(18).unwrap_or_default()
    }

    pub fn y_superscript_y_size(&self) -> i16 {
        self.data.read_at(20).unwrap_or_default()
    }

    pub fn y_superscript_x_offset(&self) -> i16 {
        self.data.read_at(22).unwrap_or_default()
    }

    pub fn y_superscript_y_offset(&self) -> i16 {
        self.data.read_at(24).unwrap_or_default()
    }

    pub fn y_strikeout_size(&self) -> i16 {
        self.data.read_at(26).unwrap_or_default()
    }

    pub fn y_strikeout_position(&self) -> i16 {
        self.data.read_at(28).unwrap_or_default()
    }

    pub fn s_family_class(&self) -> i16 {
        self.data.read_at(30).unwrap_or_default()
    }

    pub fn panose_10(&self) -> &[u8] {
        self.data.as_bytes().get(32..42).unwrap_or_default()
    }

    pub fn ach_vend_id(&self) -> Tag {
        self.data.read_at(58).unwrap_or_default()
    }

    pub fn fs_selection(&self) -> u16 {
        self.data.read_at(62).unwrap_or_default()
    }

    pub fn us_first_char_index(&self) -> u16 {
        self.data.read_at(64).unwrap_or_default()
    }

    pub fn us_last_char_index(&self) -> u16 {
        self.data.read_at(66).unwrap_or_default()
    }

    pub fn s_typo_ascender(&self) -> i16 {
        self.data.read_at(68).unwrap_or_default()
    }

    pub fn s_typo_descender(&self) -> i16 {
        self.data.read_at(70).unwrap_or_default()
    }

    pub fn s_typo_line_gap(&self) -> i16 {
        self.data.read_at(72).unwrap_or_default()
    }

    pub fn us_win_ascent(&self) -> u16 {
        self.data.read_at(74).unwrap_or_default()
    }

    pub fn us_win_descent(&self) -> u16 {
        self.data.read_at(76).unwrap_or_default()
    }

    /// Code page character range bits, available in version 1 and later.
    pub fn ul_code_page_range(&self) -> Option<(u32, u32)> {
        (self.version() >= 1).then(|| {
            (
                self.data.read_at(78).unwrap_or_default(),
                self.data.read_at(82).unwrap_or_default(),
            )
        })
    }

    /// Available in version 2 and later.
    pub fn sx_height(&self) -> Option<i16> {
        (self.version() >= 2).then(|| self.data.read_at(86).unwrap_or_default())
    }

    /// Available in version 2 and later.
    pub fn s_cap_height(&self) -> Option<i16> {
        (self.version() >= 2).then(|| self.data.read_at(88).unwrap_or_default())
    }

    /// Available in version 2 and later.
    pub fn us_default_char(&self) -> Option<u16> {
        (self.version() >= 2).then(|| self.data.read_at(90).unwrap_or_default())
    }

    /// Available in version 2 and later.
    pub fn us_break_char(&self) -> Option<u16> {
        (self.version() >= 2).then(|| self.data.read_at(92).unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use font_test_data::tables::Os2 as Os2Builder;

    #[test]
    fn version_gated_fields() {
        let v4 = Os2Builder::default().build();
        let os2 = Os2::read(FontData::new(&v4)).unwrap();
        assert_eq!(os2.s_typo_ascender(), 800);
        assert_eq!(os2.us_win_descent(), 300);
        assert_eq!(os2.sx_height(), Some(500));
        assert_eq!(os2.s_cap_height(), Some(700));
        assert_eq!(os2.ach_vend_id(), Tag::new(b"TEST"));

        let v0 = Os2Builder {
            version: 0,
            fs_selection: 0xB200,
            ..Default::default()
        }
        .build();
        let os2 = Os2::read(FontData::new(&v0)).unwrap();
        assert_eq!(os2.fs_selection(), 0xB200);
        assert_eq!(os2.sx_height(), None);
        assert_eq!(os2.ul_code_page_range(), None);
    }
}
