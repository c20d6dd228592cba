//! complete fonts assembled from the smaller fixtures

use font_types::{Tag, CFF_SFNT_VERSION, TT_SFNT_VERSION};

use crate::{be_buffer, bebuffer::BeBuffer, build_font, cff, cmap, glyf, kern, name, post, tables};

/// Format 4 subtable mapping 'A', 'B' and 'C' to glyphs 1, 2 and 3.
pub fn abc_cmap4() -> BeBuffer {
    be_buffer! {
        4u16,           // format
        32u16,          // length
        0u16,           // language
        4u16,           // segCountX2
        4u16,           // searchRange
        1u16,           // entrySelector
        0u16,           // rangeShift
        [67u16, 0xFFFF],  // endCode
        0u16,           // reservedPad
        [65u16, 0xFFFF],  // startCode
        [(-64i16), 1],  // idDelta
        [0u16, 0]       // idRangeOffset
    }
}

/// A TrueType font with four glyphs: an empty notdef, the triangle, the
/// transformed composite and the two component glyph from [`glyf::glyf_loca`].
///
/// Advances are 500, 600, 700 and 800 units at 1000 units per em. The font
/// also carries the `KERN0_EXP` kerning table, the `SIMPLE` post table and
/// the Windows/Macintosh family names.
pub fn glyf_font() -> Vec<u8> {
    let os2 = tables::Os2::default().build();
    let cmap4 = abc_cmap4();
    let cmap = cmap::cmap_table(&[(3, 1, cmap4.as_slice())]);
    let (glyf, loca) = glyf::glyf_loca();
    let head = tables::head(1000, false);
    let hhea = tables::hhea(800, -200, 100, 4);
    let hmtx = tables::hmtx(&[(500, 0), (600, 0), (700, 10), (800, 20)], &[]);
    let maxp = tables::maxp(4);
    let name = name::family_names();
    build_font(
        TT_SFNT_VERSION,
        &[
            (Tag::new(b"OS/2"), os2.as_slice()),
            (Tag::new(b"cmap"), &cmap),
            (Tag::new(b"glyf"), &glyf),
            (Tag::new(b"head"), head.as_slice()),
            (Tag::new(b"hhea"), hhea.as_slice()),
            (Tag::new(b"hmtx"), hmtx.as_slice()),
            (Tag::new(b"kern"), kern::KERN0_EXP),
            (Tag::new(b"loca"), &loca),
            (Tag::new(b"maxp"), maxp.as_slice()),
            (Tag::new(b"name"), &name),
            (Tag::new(b"post"), post::SIMPLE),
        ],
    )
}

/// A PostScript flavored font with the three glyphs of [`cff::simple_cff`]
/// and the same character map as [`glyf_font`].
pub fn cff_font() -> Vec<u8> {
    let cff = cff::simple_cff();
    let cmap4 = abc_cmap4();
    let cmap = cmap::cmap_table(&[(3, 1, cmap4.as_slice())]);
    let head = tables::head(1000, false);
    let hhea = tables::hhea(800, -200, 100, 3);
    let hmtx = tables::hmtx(&[(500, 0), (600, 100), (700, 0)], &[]);
    let maxp = tables::maxp(3);
    build_font(
        CFF_SFNT_VERSION,
        &[
            (Tag::new(b"CFF "), &cff),
            (Tag::new(b"cmap"), &cmap),
            (Tag::new(b"head"), head.as_slice()),
            (Tag::new(b"hhea"), hhea.as_slice()),
            (Tag::new(b"hmtx"), hmtx.as_slice()),
            (Tag::new(b"maxp"), maxp.as_slice()),
        ],
    )
}
