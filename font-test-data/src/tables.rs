//! builders for the small fixed-layout tables every test font needs

use font_types::{Fixed, Tag};

use crate::{be_buffer, bebuffer::BeBuffer};

/// A version 1.0 head table.
pub fn head(units_per_em: u16, long_loca: bool) -> BeBuffer {
    be_buffer! {
        1u16, 0u16,             // version
        (Fixed::from_i32(1)),   // fontRevision
        0u32,                   // checksumAdjustment
        0x5F0F_3CF5u32,         // magicNumber
        0u16,                   // flags
        units_per_em,
        0i64, 0i64,             // created, modified
        0i16, 0i16, 1000i16, 1000i16,
        0u16,                   // macStyle
        8u16,                   // lowestRecPPEM
        2i16,                   // fontDirectionHint
        (long_loca as i16),     // indexToLocFormat
        0i16                    // glyphDataFormat
    }
}

/// A version 0.5 maxp table.
pub fn maxp(num_glyphs: u16) -> BeBuffer {
    be_buffer! { 0x0000_5000u32, num_glyphs }
}

/// An hhea (or vhea) table.
pub fn hhea(ascender: i16, descender: i16, line_gap: i16, num_long_metrics: u16) -> BeBuffer {
    be_buffer! {
        1u16, 0u16,
        ascender, descender, line_gap,
        1000u16,                // advanceMax
        0i16, 0i16, 1000i16,    // min bearings, max extent
        1i16, 0i16, 0i16,       // caret slope rise, run, offset
        [0i16, 0, 0, 0],        // reserved
        0i16,                   // metricDataFormat
        num_long_metrics
    }
}

/// An hmtx (or vmtx) table from `(advance, side bearing)` pairs followed
/// by trailing side bearings.
pub fn hmtx(long_metrics: &[(u16, i16)], trailing: &[i16]) -> BeBuffer {
    let mut buf = BeBuffer::new();
    for (advance, bearing) in long_metrics {
        buf = buf.push(*advance).push(*bearing);
    }
    buf.extend(trailing.iter().copied())
}

/// Parameters for an OS/2 table.
#[derive(Clone, Debug)]
pub struct Os2 {
    pub version: u16,
    pub fs_selection: u16,
    pub typo: (i16, i16, i16),
    pub win: (u16, u16),
    pub x_height: i16,
    pub cap_height: i16,
    pub strikeout: (i16, i16),
    pub first_char: u16,
}

impl Default for Os2 {
    fn default() -> Self {
        Self {
            version: 4,
            fs_selection: 0,
            typo: (800, -200, 90),
            win: (900, 300),
            x_height: 500,
            cap_height: 700,
            strikeout: (50, 300),
            first_char: 0x20,
        }
    }
}

impl Os2 {
    pub fn build(&self) -> BeBuffer {
        let buf = be_buffer! {
            (self.version),
            500i16,                 // xAvgCharWidth
            400u16, 5u16, 0u16,     // weight, width, fsType
            [650i16, 600, 0, 75],   // subscript
            [650i16, 600, 0, 350],  // superscript
            (self.strikeout.0), (self.strikeout.1),
            0i16                    // sFamilyClass
        }
        .extend([0u8; 10]) // panose
        .extend([0u32; 4]) // unicode ranges
        .push(Tag::new(b"TEST"))
        .push(self.fs_selection)
        .push(self.first_char)
        .push(0xFFFFu16)
        .push(self.typo.0)
        .push(self.typo.1)
        .push(self.typo.2)
        .push(self.win.0)
        .push(self.win.1);
        if self.version == 0 {
            return buf;
        }
        let buf = buf.extend([0u32; 2]);
        if self.version == 1 {
            return buf;
        }
        buf.push(self.x_height)
            .push(self.cap_height)
            .extend([0u16, 0x20, 2])
    }
}

/// A version 3.0 post table.
pub fn post_v3(underline_position: i16, underline_thickness: i16) -> BeBuffer {
    let header = be_buffer! {
        0x0003_0000u32,
        0u32,                   // italicAngle
        underline_position,
        underline_thickness,
        0u32                    // isFixedPitch
    };
    header.extend([0u32; 4])
}
