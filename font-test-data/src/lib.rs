//! test data shared between the font engine crates.

pub mod bebuffer;
pub mod cff;
pub mod cmap;
pub mod fonts;
pub mod glyf;
pub mod kern;
pub mod morx;
pub mod tables;
pub mod variations;

use font_types::Tag;

/// Assemble a single font file from a set of tables.
///
/// Tables are written in the given order, each padded to a four byte
/// boundary. The table directory is written in the given order too, which
/// lets tests exercise unsorted directories.
pub fn build_font(sfnt_version: u32, tables: &[(Tag, &[u8])]) -> Vec<u8> {
    let num_tables = tables.len() as u16;
    let header_len = 12 + 16 * tables.len();
    let mut out = Vec::new();
    out.extend(sfnt_version.to_be_bytes());
    out.extend(num_tables.to_be_bytes());
    // search range, entry selector and range shift are never consulted
    out.extend([0u8; 6]);
    let mut offset = header_len;
    for (tag, data) in tables {
        out.extend(tag.to_be_bytes());
        out.extend(0u32.to_be_bytes());
        out.extend((offset as u32).to_be_bytes());
        out.extend((data.len() as u32).to_be_bytes());
        offset += data.len().next_multiple_of(4);
    }
    for (_, data) in tables {
        out.extend_from_slice(data);
        out.resize(out.len().next_multiple_of(4), 0);
    }
    out
}

/// Assemble a font collection from already built fonts.
///
/// Table offsets inside each member are rebased onto the collection.
pub fn build_collection(fonts: &[Vec<u8>]) -> Vec<u8> {
    let header_len = 12 + 4 * fonts.len();
    let mut out = Vec::new();
    out.extend(*b"ttcf");
    out.extend(0x0001_0000u32.to_be_bytes());
    out.extend((fonts.len() as u32).to_be_bytes());
    let mut offset = header_len;
    for font in fonts {
        out.extend((offset as u32).to_be_bytes());
        offset += font.len().next_multiple_of(4);
    }
    for font in fonts {
        let base = out.len() as u32;
        let mut font = font.clone();
        let num_tables = u16::from_be_bytes([font[4], font[5]]) as usize;
        for i in 0..num_tables {
            let pos = 12 + 16 * i + 8;
            let old = u32::from_be_bytes([font[pos], font[pos + 1], font[pos + 2], font[pos + 3]]);
            font[pos..pos + 4].copy_from_slice(&(old + base).to_be_bytes());
        }
        out.extend_from_slice(&font);
        out.resize(out.len().next_multiple_of(4), 0);
    }
    out
}

pub mod post {

    #[rustfmt::skip]
    pub static SIMPLE: &[u8] = &[
        0x00, 0x02, 0x00, 0x00, // version 2.0
        0x00, 0x00, 0x00, 0x00, // italic angle
        0xFF, 0xb5,             // underlinePosition -75
        0x00, 0x32,             // underlineThickness 50
        0x00, 0x00, 0x00, 0x00, // fixedpitch
        0x00, 0x00, 0x00, 0x00, // min/max mem:
        0x00, 0x00, 0x00, 0x00,
        0x00, 0x00, 0x00, 0x00,
        0x00, 0x00, 0x00, 0x00,
        0x00, 0x0A,             // numGlyphs 10
                                // glyph name index:
        0x00, 0x00,             // glyph 0 -> name 0
        0x00, 0x00,             // glyph 1 -> name 0
        0x00, 0x03,             // glyph 2 -> name 3 ('space')
        0x00, 0x04,             // glyph 3 -> name 4 ('exclam')
        0x00, 0x06,
        0x00, 0x07,
        0x00, 0x08,
        0x01, 0x02,             // glyph 7 -> name 258 first custom
        0x01, 0x03,             // glyph 8 -> name 259
        0x01, 0x04,             // glyph 9 -> name 260
        0x05, 0x68, 0x65, 0x6c, 0x6c, 0x6f, // 5, h e l l o
        0x02, 0x68, 0x69, // 2, h i
        0x4, 0x68, 0x6f, 0x6c, 0x61, // 4, h o l a
    ];
}

pub mod name {
    use crate::be_buffer;

    /// A name table with a Windows family name, a Macintosh Roman family
    /// name and a broken record pointing past the end of storage.
    pub fn family_names() -> Vec<u8> {
        // "Caf\u{e9}" in utf-16be and mac roman
        let utf16: Vec<u8> = "Caf\u{e9}"
            .encode_utf16()
            .flat_map(|c| c.to_be_bytes())
            .collect();
        let mac = [b'C', b'a', b'f', 0x8E];
        let header = be_buffer! {
            0u16,           // version
            3u16,           // count
            42u16,          // storage offset: 6 + 3 * 12
            // platform, encoding, language, name id, length, offset
            1u16, 0u16, 0u16, 1u16, 4u16, 8u16,
            3u16, 1u16, 0x409u16, 1u16, 8u16, 0u16,
            3u16, 1u16, 0x409u16, 2u16, 200u16, 12u16
        };
        header.extend_bytes(&utf16).extend_bytes(&mac).into_vec()
    }
}
