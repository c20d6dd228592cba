//! fvar, avar and item variation store fixtures

use font_types::Tag;

use crate::{be_buffer, bebuffer::BeBuffer};

/// An fvar table with a weight axis (100, 400, 900) and a width axis
/// (50, 100, 200), plus two named instances.
pub fn fvar_wght_wdth() -> BeBuffer {
    be_buffer! {
        1u16, 0u16,     // version
        16u16,          // axesArrayOffset
        2u16,           // reserved
        2u16,           // axisCount
        20u16,          // axisSize
        2u16,           // instanceCount
        12u16,          // instanceSize: 4 + 2 * 4
        // wght
        (Tag::new(b"wght")),
        0x0064_0000u32, 0x0190_0000u32, 0x0384_0000u32,
        0u16, 256u16,
        // wdth
        (Tag::new(b"wdth")),
        0x0032_0000u32, 0x0064_0000u32, 0x00C8_0000u32,
        0u16, 257u16,
        // instance "Bold": wght 700, wdth 100
        258u16, 0u16, 0x02BC_0000u32, 0x0064_0000u32,
        // instance "Condensed Light": wght 300, wdth 75
        259u16, 0u16, 0x012C_0000u32, 0x004B_0000u32
    }
}

/// An avar table remapping the first axis: -1 => -1, -0.5 => -0.75,
/// 0 => 0, 0.5 => 0.25, 1 => 1. The second axis has an identity map.
pub fn avar_two_axes() -> BeBuffer {
    be_buffer! {
        1u16, 0u16,     // version
        0u16,           // reserved
        2u16,           // axisCount
        5u16,
        [(-16384i16), -16384],
        [(-8192i16), -12288],
        [0i16, 0],
        [8192i16, 4096],
        [16384i16, 16384],
        3u16,
        [(-16384i16), -16384],
        [0i16, 0],
        [16384i16, 16384]
    }
}

/// An item variation store with one axis and two regions:
/// region 0 peaks at 1.0, region 1 peaks at -1.0.
///
/// Data set 0 holds two delta sets with 16 bit deltas:
/// `[100, -50]` and `[10, 20]`.
pub fn item_variation_store() -> BeBuffer {
    be_buffer! {
        1u16,           // format
        12u32,          // variationRegionListOffset
        1u16,           // itemVariationDataCount
        28u32,          // itemVariationDataOffsets[0]
        // region list
        1u16,           // axisCount
        2u16,           // regionCount
        [0i16, 16384, 16384],
        [(-16384i16), -16384, 0],
        // item variation data
        2u16,           // itemCount
        2u16,           // wordDeltaCount
        2u16,           // regionIndexCount
        [0u16, 1],      // regionIndexes
        [100i16, -50],
        [10i16, 20]
    }
}

/// An item variation store with one axis and two regions that both produce
/// a scalar of 0.5 at the coordinate -0.75:
/// region 0 spans (-1, -0.5, 0) and region 1 spans (-1, -1, -0.5).
///
/// Data set 0 holds a single row of 8 bit zero deltas; it exists to carry
/// the region indices used by CFF2 blends.
pub fn two_region_store() -> BeBuffer {
    be_buffer! {
        1u16,           // format
        12u32,          // variationRegionListOffset
        1u16,           // itemVariationDataCount
        28u32,          // itemVariationDataOffsets[0]
        // region list
        1u16,           // axisCount
        2u16,           // regionCount
        [(-16384i16), -8192, 0],
        [(-16384i16), -16384, -8192],
        // item variation data
        1u16,           // itemCount
        0u16,           // wordDeltaCount
        2u16,           // regionIndexCount
        [0u16, 1],      // regionIndexes
        [0i8, 0]
    }
}
