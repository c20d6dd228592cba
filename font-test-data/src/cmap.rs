//! cmap test data for scenarios not readily produced with font tools

use font_types::Uint24;

use crate::{be_buffer, bebuffer::BeBuffer};

/// Assemble a cmap table from `(platform_id, encoding_id, subtable)`
/// triples.
pub fn cmap_table(subtables: &[(u16, u16, &[u8])]) -> Vec<u8> {
    let header_len = 4 + 8 * subtables.len();
    let mut buf = BeBuffer::new().push(0u16).push(subtables.len() as u16);
    let mut offset = header_len;
    for (platform, encoding, data) in subtables {
        buf = buf.push(*platform).push(*encoding).push(offset as u32);
        offset += data.len();
    }
    for (_, _, data) in subtables {
        buf = buf.extend_bytes(data);
    }
    buf.into_vec()
}

/// Format 4 with a single delta segment: 10..=20 maps to 1..=11.
pub fn cmap4_delta() -> BeBuffer {
    be_buffer! {
        4u16,           // format
        32u16,          // length
        0u16,           // language
        4u16,           // segCountX2
        4u16,           // searchRange
        1u16,           // entrySelector
        0u16,           // rangeShift
        [20u16, 0xFFFF],  // endCode
        0u16,           // reservedPad
        [10u16, 0xFFFF],  // startCode
        [(-9i16), 1],   // idDelta
        [0u16, 0]       // idRangeOffset
    }
}

/// Format 4 with a segment resolved through the glyph id array:
/// 30 => 40, 31 => missing, 32 => 42.
pub fn cmap4_glyph_array() -> BeBuffer {
    be_buffer! {
        4u16,           // format
        38u16,          // length
        0u16,           // language
        4u16,           // segCountX2
        4u16,           // searchRange
        1u16,           // entrySelector
        0u16,           // rangeShift
        [32u16, 0xFFFF],  // endCode
        0u16,           // reservedPad
        [30u16, 0xFFFF],  // startCode
        [0i16, 1],      // idDelta
        [4u16, 0],      // idRangeOffset
        [40u16, 0, 42]  // glyphIdArray
    }
}

/// Contains two codepoint ranges, both [6, 64]. Surely you don't duplicate them?
pub fn repetitive_cmap4() -> BeBuffer {
    be_buffer! {
        4u16,           // format
        0u16,           // length, unused
        0u16,           // language, unused
        4u16,           // segCountX2, 2 * 2 segments
        0u16,           // searchRange, unused
        0u16,           // entrySelector, unused
        0u16,           // rangeShift, unused
        [64u16, 64],    // endCode
        0u16,           // reservedPad
        [6u16, 6],      // startCode
        [0u16, 0],      // idDelta
        [0u16, 0]       // idRangeOffset
    }
}

/// Format 0: 'A' => 5 and 0x8E (MacRoman e acute) => 9.
pub fn cmap0_mac() -> BeBuffer {
    let mut glyphs = [0u8; 256];
    glyphs[0x41] = 5;
    glyphs[0x8E] = 9;
    let header = be_buffer! {
        0u16,           // format
        262u16,         // length
        0u16            // language
    };
    header.extend(glyphs)
}

/// Format 6: 0x30 => 1, 0x31 => 2, 0x32 => missing, 0x33 => 4.
pub fn cmap6() -> BeBuffer {
    be_buffer! {
        6u16,           // format
        18u16,          // length
        0u16,           // language
        0x30u16,        // firstCode
        4u16,           // entryCount
        [1u16, 2, 0, 4]
    }
}

/// Format 10: 0x10400 => 50, 0x10401 => 51.
pub fn cmap10() -> BeBuffer {
    be_buffer! {
        10u16,          // format
        0u16,           // reserved
        24u32,          // length
        0u32,           // language
        0x10400u32,     // startCharCode
        2u32,           // numChars
        [50u16, 51]
    }
}

/// Format 12 with two groups, including a supplementary plane range.
pub fn cmap12() -> BeBuffer {
    be_buffer! {
        12u16,          // format
        0u16,           // reserved
        52u32,          // length
        0u32,           // language
        3u32,           // numGroups
        [0x41u32, 0x43, 1],
        [0x1F600u32, 0x1F602, 100],
        [0x20000u32, 0x20000, 200]
    }
}

/// Format 13: every code point in 0x10000..=0x10010 maps to glyph 7.
pub fn cmap13() -> BeBuffer {
    be_buffer! {
        13u16,          // format
        0u16,           // reserved
        28u32,          // length
        0u32,           // language
        1u32,           // numGroups
        [0x10000u32, 0x10010, 7]
    }
}

/// Format 14 with two selectors.
///
/// U+2269 U+FE00 uses the default glyph, U+82A6 U+FE00 maps to 33 and
/// U+845B U+E0100 maps to 34.
pub fn cmap14() -> BeBuffer {
    be_buffer! {
        14u16,          // format
        58u32,          // length
        2u32,           // numVarSelectorRecords
        (Uint24::new(0xFE00)), 32u32, 40u32,
        (Uint24::new(0xE0100)), 0u32, 49u32,
        // default uvs for FE00
        1u32, (Uint24::new(0x2269)), 0u8,
        // non default uvs for FE00
        1u32, (Uint24::new(0x82A6)), 33u16,
        // non default uvs for E0100
        1u32, (Uint24::new(0x845B)), 34u16
    }
}

/// Format 4 subtable for a Microsoft Symbol font: 0xF020..=0xF07E maps to
/// glyphs starting at 3.
pub fn cmap4_symbol() -> BeBuffer {
    be_buffer! {
        4u16,           // format
        32u16,          // length
        0u16,           // language
        4u16,           // segCountX2
        4u16,           // searchRange
        1u16,           // entrySelector
        0u16,           // rangeShift
        [0xF07Eu16, 0xFFFF],
        0u16,
        [0xF020u16, 0xFFFF],
        [(3i16 - 0xF020u16 as i16), 1],
        [0u16, 0]
    }
}

/// Symbol subtable covering U+F020..U+F0FF, mapping each code to
/// `code - 0xF000`.
pub fn cmap4_symbol_page() -> BeBuffer {
    be_buffer! {
        4u16,           // format
        32u16,          // length
        0u16,           // language
        4u16,           // segCountX2
        4u16,           // searchRange
        1u16,           // entrySelector
        0u16,           // rangeShift
        [0xF0FFu16, 0xFFFF],
        0u16,
        [0xF020u16, 0xFFFF],
        [0x1000i16, 1],
        [0u16, 0]
    }
}
