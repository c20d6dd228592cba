//! Glyph lookup, metrics, outlines and variations for OpenType fonts.
//!
//! This crate sits on top of the table parsers in [`opentype`](raw) and
//! turns them into the queries a text engine needs:
//!
//! * [`Charmap`] selects the best `cmap` subtable and maps characters,
//!   including variation sequences and legacy symbol encodings.
//! * [`Axes`] normalizes user variation settings through `fvar` and `avar`.
//! * [`Metrics`] and [`GlyphMetrics`] provide font wide and per glyph
//!   metrics with variation deltas applied.
//! * [`Outlines`] draws `glyf`, `CFF2` and `CFF ` glyphs into a pen.
//! * [`Font`] bundles these for one font and [`Face`] adds a ppem and a
//!   variation location, with cached glyph extents.
//!
//! ```no_run
//! use fontface::{Face, Font};
//!
//! let data = std::fs::read("Roboto.ttf").unwrap();
//! let face = Face::new(Font::load(&data).unwrap());
//! face.set_variations([("wght", 650.0f32)]);
//! let glyph_id = face.nominal_glyph('A').unwrap();
//! let advance = face.horizontal_advance(glyph_id);
//! ```

#![forbid(unsafe_code)]

/// Expose our "raw" underlying parser crate.
pub extern crate opentype as raw;

pub mod charmap;
pub mod metrics;
pub mod outline;

mod error;
mod face;
mod font;
mod glyph_data;
mod setting;
mod size;
mod variation;

pub use charmap::{Charmap, FontPage, GlyphVariant, VariationSelectors};
pub use error::LoadError;
pub use face::{Face, GlyphExtents};
pub use font::Font;
pub use glyph_data::{Bitmap, BitmapFormat, GlyphData, GlyphImages};
pub use metrics::{Decoration, GlyphMetrics, Metrics};
pub use outline::{DrawError, OutlineFormat, Outlines};
pub use setting::Variation;
pub use size::Size;
pub use variation::{Axes, Axis, NamedInstance};

/// Type for a glyph identifier.
pub type GlyphId = opentype::types::GlyphId;

/// Type for a 4-byte tag used to identify font tables and other resources.
pub type Tag = opentype::types::Tag;

/// Type for a normalized variation coordinate.
pub type NormalizedCoord = opentype::types::F2Dot14;
