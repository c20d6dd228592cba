//! Preparing text for shaping and laying shaped text out in lines.
//!
//! Shaping itself (substitution and positioning of glyphs) is done by an
//! external engine. This crate covers the steps around it:
//!
//! * [`Segmenter`] splits an [`Input`] into runs with a single bidi level,
//!   script and face, ready to be handed to a shaper.
//! * [`Output`] is the positioned glyph run a shaper produces, with word and
//!   letter spacing adjustments.
//! * [`LineWrapper`] breaks shaped runs into [`Line`]s of a maximum width at
//!   UAX #14 break opportunities, never inside a glyph cluster.
//!
//! All lengths (sizes, advances, offsets and widths) are in 26.6 fixed point,
//! that is 1/64th of a pixel.

#![forbid(unsafe_code)]

mod input;
mod output;
mod segmenter;
mod wrapping;

pub use input::{Direction, FontFeature, Input};
pub use output::{Bounds, Glyph, Output, Range};
pub use segmenter::{Fontmap, Segmenter};
pub use wrapping::{break_options, BreakOption, Line, LineWrapper, WrapConfig};

pub use fontface;
pub use unicode_script::Script;

use std::sync::Arc;

use fontface::Face;

/// Shared handle to the face used for a run of text.
pub type FaceRef<'a> = Arc<Face<'a>>;

/// Returns true if both runs use the same face, compared by identity.
pub(crate) fn same_face(a: Option<&FaceRef>, b: Option<&FaceRef>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => Arc::ptr_eq(a, b),
        (None, None) => true,
        _ => false,
    }
}
