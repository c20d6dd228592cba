//! glyf and loca fixtures

use crate::{be_buffer, bebuffer::BeBuffer};

/// Raw 2.14 transform of the composite glyph: xx, yx, xy, yy.
pub const COMPOSITE_TRANSFORM: [i16; 4] = [22381, 8192, 5996, 14188];
/// Translation applied to the transformed component.
pub const COMPOSITE_OFFSET: (i16, i16) = (237, 258);
/// Points of the simple glyph.
pub const TRIANGLE: [(i16, i16); 3] = [(0, 0), (205, 0), (100, 300)];

/// A simple glyph with one contour: a triangle with on-curve points at
/// (0, 0), (205, 0) and (100, 300).
pub fn simple_triangle() -> BeBuffer {
    be_buffer! {
        1i16,                       // numberOfContours
        0i16, 0i16, 205i16, 300i16, // bbox
        2u16,                       // endPtsOfContours
        0u16,                       // instructionLength
        [0x31u8, 0x33, 0x03],       // flags
        [205u8, 105],               // x deltas: +205 (short, positive), -105 (short)
        300i16,                     // y delta for the last point
        0u8                         // pad
    }
}

/// A composite glyph referencing glyph 1 through a full 2x2 transform.
pub fn transformed_composite() -> BeBuffer {
    let [xx, yx, xy, yy] = COMPOSITE_TRANSFORM;
    let (dx, dy) = COMPOSITE_OFFSET;
    be_buffer! {
        (-1i16),                        // numberOfContours
        237i16, 258i16, 518i16, 568i16, // bbox
        0x0083u16,                      // words | xy values | 2x2
        1u16,                           // glyph
        dx, dy,
        xx, yx, xy, yy
    }
}

/// A composite glyph with two components: glyph 1 moved by (10, 20) and
/// glyph 1 scaled by one half.
pub fn two_components() -> BeBuffer {
    be_buffer! {
        (-1i16),
        0i16, 0i16, 215i16, 320i16,
        0x0022u16,                  // xy values | more components
        1u16,
        10i8, 20i8,
        0x000Au16,                  // xy values | scale
        1u16,
        0i8, 0i8,
        0x2000i16                   // 0.5
    }
}

/// Returns `(glyf, loca)` for four glyphs: an empty notdef, the triangle,
/// the transformed composite and the two component glyph. The loca table
/// uses the short format.
pub fn glyf_loca() -> (Vec<u8>, Vec<u8>) {
    let glyphs = [
        BeBuffer::new(),
        simple_triangle(),
        transformed_composite(),
        two_components(),
    ];
    let mut glyf = Vec::new();
    let mut loca = BeBuffer::new().push(0u16);
    for glyph in &glyphs {
        glyf.extend_from_slice(glyph);
        if glyf.len() % 2 != 0 {
            glyf.push(0);
        }
        loca = loca.push((glyf.len() / 2) as u16);
    }
    (glyf, loca.into_vec())
}
