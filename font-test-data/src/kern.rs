//! kern and kerx fixtures

use crate::{be_buffer, bebuffer::BeBuffer};

/// OpenType style kern table with a single format 0 subtable.
///
/// Contains the pair `(104, 504) => -42` and no entry for `(504, 1108)`.
#[rustfmt::skip]
pub static KERN0_EXP: &[u8] = &[
    0x00, 0x00,             // version=0
    0x00, 0x01,             // nTables=1
    0x00, 0x00,             // subtable version=0
    0x00, 0x20,             // length=32
    0x00,                   // format=0
    0x01,                   // coverage=horizontal
    0x00, 0x03,             // nPairs=3
    0x00, 0x0C,             // searchRange=12
    0x00, 0x01,             // entrySelector=1
    0x00, 0x06,             // rangeShift=6
    0x00, 0x24, 0x00, 0x39, 0xFF, 0xF6, // l=36, r=57, v=-10
    0x00, 0x68, 0x01, 0xF8, 0xFF, 0xD6, // l=104, r=504, v=-42
    0x01, 0xF8, 0x03, 0xE8, 0x00, 0x0F, // l=504, r=1000, v=15
];

/// Apple style kern table with a format 2 and a format 3 subtable.
pub fn apple_kern_2_3() -> BeBuffer {
    be_buffer! {
        0x0001_0000u32, // version
        2u32,           // nTables

        // format 2 subtable
        40u32,          // length
        0x0002u16,      // coverage: horizontal, format 2
        0u16,           // tupleIndex
        4u16,           // rowWidth
        16u16,          // leftClassTable
        24u16,          // rightClassTable
        32u16,          // kerningArray
        // left classes: glyphs 10 and 11, row offsets from subtable start
        10u16, 2u16, [32u16, 36],
        // right classes: glyphs 20 and 21, column offsets
        20u16, 2u16, [0u16, 2],
        // kerning array
        [0i16, -30, 15, -5],

        // format 3 subtable
        32u32,          // length
        0x0003u16,      // coverage: horizontal, format 3
        0u16,           // tupleIndex
        4u16,           // glyphCount
        3u8,            // kernValueCount
        2u8,            // leftClassCount
        2u8,            // rightClassCount
        0u8,            // flags
        [0i16, -20, 40],
        [0u8, 1, 0, 1], // left classes
        [0u8, 0, 1, 1], // right classes
        [0u8, 1, 2, 0]  // kern index
    }
}

/// kerx version 2 table with a format 0 subtable and a format 2 subtable
/// whose classes are stored in AAT lookup tables.
pub fn kerx_0_2() -> BeBuffer {
    be_buffer! {
        2u16,           // version
        0u16,           // padding
        2u32,           // nTables

        // format 0
        40u32,          // length
        0x0000_0000u32, // coverage: horizontal, format 0
        0u32,           // tupleCount
        2u32,           // nPairs
        12u32,          // searchRange
        1u32,           // entrySelector
        0u32,           // rangeShift
        4u16, 12u16, (-40i16),
        5u16, 40u16, (-50i16),

        // format 2
        62u32,          // length
        0x0000_0002u32, // coverage: horizontal, format 2
        0u32,           // tupleCount
        4u32,           // rowWidth
        28u32,          // leftClassTable
        40u32,          // rightClassTable
        52u32,          // kerningArray
        // left lookup, format 8: first glyph 10, row start indices
        8u16, 10u16, 2u16, [0u16, 2],
        0u16,           // padding
        // right lookup, format 8: first glyph 20, column indices
        8u16, 20u16, 2u16, [0u16, 1],
        0u16,           // padding
        [0i16, -30, 15, -5],
        0u16            // padding
    }
}
