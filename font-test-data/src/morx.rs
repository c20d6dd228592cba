//! AAT morx fixtures

use crate::{be_buffer, bebuffer::BeBuffer};

/// Glyphs used by the ligature fixture.
pub const F: u16 = 10;
pub const I: u16 = 11;
pub const L: u16 = 12;
pub const F_I: u16 = 20;
pub const F_L: u16 = 21;

/// Body of an extended ligature subtable forming `f i` and `f l`.
///
/// The state table has 7 classes (4 predefined plus f, i and l), 4 states
/// and 4 entries.
pub fn ligature_subtable_body() -> BeBuffer {
    be_buffer! {
        7u32,       // nClasses
        28u32,      // classTable
        40u32,      // stateArray
        96u32,      // entryTable
        120u32,     // ligActions
        136u32,     // components
        142u32,     // ligatures

        // class lookup, format 8
        8u16, F, 3u16, [4u16, 5, 6],

        // state array: EOT, OOB, deleted, EOL, f, i, l
        [0u16, 0, 0, 0, 1, 0, 0],
        [0u16, 0, 0, 0, 1, 0, 0],
        [0u16, 0, 0, 0, 1, 2, 3],
        [0u16, 0, 0, 0, 1, 0, 0],

        // entries: newState, flags, ligActionIndex
        [0u16, 0, 0],
        [2u16, 0x8000, 0],
        [0u16, 0xA000, 0],
        [0u16, 0xA000, 2],

        // ligature actions
        [0x3FFF_FFF6u32, 0xFFFF_FFF6, 0x3FFF_FFF6, 0xFFFF_FFF6],
        // components
        [0u16, 0, 1],
        // ligatures
        [F_I, F_L]
    }
}

/// "Example 2: A ligature table" from Apple's morx documentation, as a
/// complete morx table with one chain and one vertical ligature subtable.
///
/// The class table covers glyphs 20..=22 (class 4), 23..=24 (class 5) and
/// 26..=28 (class 6).
#[rustfmt::skip]
pub static LIGATURE_EXAMPLE: &[u8] = &[
    // 0: version 2, one chain
    0x00, 0x02, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x01,
    // 8: chain: default flags 1, length 218, no features, one subtable
    0x00, 0x00, 0x00, 0x01,
    0x00, 0x00, 0x00, 0xDA,
    0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x01,
    // 24: subtable: length 202, coverage vertical + ligature, flags 1
    0x00, 0x00, 0x00, 0xCA,
    0x80, 0x00, 0x00, 0x02,
    0x00, 0x00, 0x00, 0x01,
    // 36: nClasses 7, classTable 28, stateArray 64, entryTable 120,
    // ligActions 144, components 156, ligatures 174
    0x00, 0x00, 0x00, 0x07,
    0x00, 0x00, 0x00, 0x1C,
    0x00, 0x00, 0x00, 0x40,
    0x00, 0x00, 0x00, 0x78,
    0x00, 0x00, 0x00, 0x90,
    0x00, 0x00, 0x00, 0x9C,
    0x00, 0x00, 0x00, 0xAE,
    // 64: class lookup, format 2 with 3 segments
    0x00, 0x02, 0x00, 0x06,
    0x00, 0x03, 0x00, 0x0C,
    0x00, 0x01, 0x00, 0x06,
    0x00, 0x16, 0x00, 0x14, 0x00, 0x04,
    0x00, 0x18, 0x00, 0x17, 0x00, 0x05,
    0x00, 0x1C, 0x00, 0x1A, 0x00, 0x06,
    0xFF, 0xFF, 0xFF, 0xFF, 0x00, 0x00,
    // 100: state array
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0x02, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0x02, 0x00, 0x03,
    // 156: entries: newState, flags, ligActionIndex
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x02, 0x80, 0x00, 0x00, 0x00,
    0x00, 0x03, 0x80, 0x00, 0x00, 0x00,
    0x00, 0x00, 0xA0, 0x00, 0x00, 0x00,
    // 180: ligature actions
    0x3F, 0xFF, 0xFF, 0xE7,
    0x3F, 0xFF, 0xFF, 0xED,
    0xBF, 0xFF, 0xFF, 0xF2,
    // 192: components
    0x00, 0x00, 0x00, 0x01,
    0x00, 0x02, 0x00, 0x03,
    0x00, 0x00, 0x00, 0x04,
    0x00, 0x00, 0x00, 0x08,
    0x00, 0x10,
    // 210: ligatures 1000..=1007
    0x03, 0xE8, 0x03, 0xE9,
    0x03, 0xEA, 0x03, 0xEB,
    0x03, 0xEC, 0x03, 0xED,
    0x03, 0xEE, 0x03, 0xEF,
];

/// Body of a noncontextual subtable using a format 6 lookup that maps
/// glyph 30 to 31 and 40 to 41.
pub fn noncontextual_subtable_body() -> BeBuffer {
    be_buffer! {
        6u16,       // format
        4u16,       // unitSize
        3u16,       // nUnits (including the terminator)
        12u16,      // searchRange
        1u16,       // entrySelector
        0u16,       // rangeShift
        [30u16, 31],
        [40u16, 41],
        [0xFFFFu16, 0xFFFF]
    }
}

/// A complete morx table with one chain holding the ligature and
/// noncontextual subtables. The ligature subtable is disabled by the
/// chain's default flags unless the `liga` style feature (type 1,
/// setting 2) is turned on.
pub fn morx_table() -> Vec<u8> {
    let ligature = ligature_subtable_body();
    let noncontextual = noncontextual_subtable_body();
    let lig_len = 12 + ligature.len() as u32;
    let nc_len = 12 + noncontextual.len() as u32;
    let chain_len = 16 + 12 + lig_len + nc_len;
    let header = be_buffer! {
        2u16,       // version
        0u16,       // unused
        1u32,       // nChains
        // chain
        0x0000_0002u32, // defaultFlags
        chain_len,
        1u32,       // nFeatureEntries
        2u32,       // nSubtables
        // feature: type 1, setting 2 enables flag 1
        1u16, 2u16, 0x0000_0001u32, 0xFFFF_FFFFu32,
        // ligature subtable
        lig_len,
        0x0000_0002u32, // coverage: ligature
        0x0000_0001u32  // subFeatureFlags
    };
    header
        .extend_bytes(&ligature)
        .push(nc_len)
        .push(0x0000_0004u32) // coverage: noncontextual
        .push(0x0000_0002u32) // subFeatureFlags
        .extend_bytes(&noncontextual)
        .into_vec()
}
