//! Common [scalar data types][data types] used in font files
//!
//! These are the building blocks shared by the table parsers in the
//! `opentype` crate and the higher level `fontface` crate.
//!
//! [data types]: https://docs.microsoft.com/en-us/typography/opentype/spec/otff#data-types

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

mod bbox;
mod fixed;
mod glyph_id;
mod pen;
mod point;
mod raw;
mod tag;
mod uint24;

#[cfg(all(test, feature = "serde"))]
mod serde_test;

pub use bbox::BoundingBox;
pub use fixed::{F2Dot14, Fixed};
pub use glyph_id::{GlyphId, GlyphId16};
pub use pen::{Pen, PenCommand};
pub use point::Point;
pub use raw::Scalar;
pub use tag::{InvalidTag, Tag};
pub use uint24::Uint24;

/// The header tag for a font collection file.
pub const TTC_HEADER_TAG: Tag = Tag::new(b"ttcf");

/// The SFNT version for fonts containing TrueType outlines.
pub const TT_SFNT_VERSION: u32 = 0x00010000;
/// The SFNT version for fonts containing CFF outlines.
pub const CFF_SFNT_VERSION: u32 = 0x4F54544F;
/// The SFNT version for legacy Apple fonts containing TrueType outlines.
pub const TRUE_SFNT_VERSION: u32 = 0x74727565;
