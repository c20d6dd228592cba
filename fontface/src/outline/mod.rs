//! Loading and drawing glyph outlines.
//!
//! Three sources of vector outlines are supported, selected in this order:
//!
//! * `glyf`: TrueType quadratic contours, with `gvar` variations applied
//!   (including interpolation of untouched points) and composite glyphs
//!   resolved recursively.
//! * `CFF2`: variable cubic charstrings.
//! * `CFF `: classic PostScript charstrings.
//!
//! Outlines are produced in font units and scaled by the requested [`Size`]
//! on their way to the [`Pen`].

mod cff;
mod glyf;

use opentype::{
    tables::postscript::Error as CffError,
    types::{BoundingBox, GlyphId, Pen},
    FontRef, ReadError, TableProvider,
};

use crate::{size::Size, NormalizedCoord};

pub(crate) use glyf::Outlines as GlyfOutlines;

/// Maximum depth of nested composite glyphs.
pub const COMPOSITE_RECURSION_LIMIT: usize = 32;

/// Errors that may occur when drawing glyphs.
#[derive(Clone, Debug, thiserror::Error)]
pub enum DrawError {
    /// The font contains no outline tables.
    #[error("no outline sources are available for the font")]
    NoSources,
    /// The requested glyph was not present in the font.
    #[error("glyph {0} was not found in the font")]
    GlyphNotFound(GlyphId),
    /// Exceeded the composite nesting limit.
    #[error("recursion limit ({COMPOSITE_RECURSION_LIMIT}) exceeded when loading component {0}")]
    RecursionLimitExceeded(GlyphId),
    /// A composite anchored a component on a point that does not exist.
    #[error("invalid anchor point index ({1}) for composite glyph {0}")]
    InvalidAnchorPoint(GlyphId, u16),
    #[error(transparent)]
    PostScript(#[from] CffError),
    #[error(transparent)]
    Read(#[from] ReadError),
}

/// The format of the outlines in a font.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum OutlineFormat {
    /// TrueType outlines from the `glyf` table.
    Glyf,
    /// PostScript outlines from the `CFF2` table.
    Cff2,
    /// PostScript outlines from the `CFF ` table.
    Cff,
}

#[derive(Clone)]
enum Kind<'a> {
    Glyf(glyf::Outlines<'a>),
    Cff(cff::Outlines<'a>),
    None,
}

/// Collection of the vector outlines of a font.
#[derive(Clone)]
pub struct Outlines<'a> {
    kind: Kind<'a>,
    units_per_em: u16,
}

impl<'a> Outlines<'a> {
    /// Creates the outline collection for the given font.
    ///
    /// Outline tables that fail to parse are skipped in favor of the next
    /// source.
    pub fn new(font: &FontRef<'a>) -> Self {
        let units_per_em = font.head().map(|head| head.units_per_em()).unwrap_or(0);
        let kind = if let Some(glyf) = glyf::Outlines::new(font) {
            Kind::Glyf(glyf)
        } else if let Some(cff) = font.cff2().ok().and_then(|cff2| {
            cff::Outlines::from_cff2(&cff2)
                .map_err(|e| log::warn!("ignoring malformed CFF2 table: {e}"))
                .ok()
        }) {
            Kind::Cff(cff)
        } else if let Some(cff) = font.cff().ok().and_then(|cff| {
            cff::Outlines::from_cff(&cff)
                .map_err(|e| log::warn!("ignoring malformed CFF table: {e}"))
                .ok()
        }) {
            Kind::Cff(cff)
        } else {
            Kind::None
        };
        Self { kind, units_per_em }
    }

    /// Returns the format of the outlines, if any are present.
    pub fn format(&self) -> Option<OutlineFormat> {
        match &self.kind {
            Kind::Glyf(_) => Some(OutlineFormat::Glyf),
            Kind::Cff(cff) if cff.is_cff2() => Some(OutlineFormat::Cff2),
            Kind::Cff(_) => Some(OutlineFormat::Cff),
            Kind::None => None,
        }
    }

    /// Returns the number of glyphs with outlines.
    pub fn glyph_count(&self) -> u32 {
        match &self.kind {
            Kind::Glyf(glyf) => glyf.glyph_count(),
            Kind::Cff(cff) => cff.glyph_count(),
            Kind::None => 0,
        }
    }

    /// Draws the outline of the given glyph at the size and location in
    /// variation space.
    pub fn draw(
        &self,
        glyph_id: GlyphId,
        size: Size,
        coords: &[NormalizedCoord],
        pen: &mut impl Pen,
    ) -> Result<(), DrawError> {
        let scale = size.linear_scale(self.units_per_em);
        let mut pen = ScalePen { inner: pen, scale };
        match &self.kind {
            Kind::Glyf(glyf) => glyf.draw(glyph_id, coords, &mut pen),
            Kind::Cff(cff) => cff.draw(glyph_id, coords, &mut pen),
            Kind::None => Err(DrawError::NoSources),
        }
    }

    /// Computes the control box of the outline of the given glyph in font
    /// units.
    ///
    /// Empty glyphs produce a zero sized box at the origin.
    pub fn control_box(
        &self,
        glyph_id: GlyphId,
        coords: &[NormalizedCoord],
    ) -> Result<BoundingBox<f32>, DrawError> {
        let mut pen = ControlBoundsPen::default();
        self.draw(glyph_id, Size::unscaled(), coords, &mut pen)?;
        Ok(pen.bounds().unwrap_or_default())
    }
}

/// Pen that forwards every command scaled by a constant factor.
struct ScalePen<'p, P> {
    inner: &'p mut P,
    scale: f32,
}

impl<P: Pen> Pen for ScalePen<'_, P> {
    fn move_to(&mut self, x: f32, y: f32) {
        self.inner.move_to(x * self.scale, y * self.scale);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.inner.line_to(x * self.scale, y * self.scale);
    }

    fn quad_to(&mut self, cx0: f32, cy0: f32, x: f32, y: f32) {
        let s = self.scale;
        self.inner.quad_to(cx0 * s, cy0 * s, x * s, y * s);
    }

    fn curve_to(&mut self, cx0: f32, cy0: f32, cx1: f32, cy1: f32, x: f32, y: f32) {
        let s = self.scale;
        self.inner
            .curve_to(cx0 * s, cy0 * s, cx1 * s, cy1 * s, x * s, y * s);
    }

    fn close(&mut self) {
        self.inner.close();
    }
}

/// Pen that accumulates the bounds of every point it receives, control
/// points included.
#[derive(Clone, Default, Debug)]
pub struct ControlBoundsPen(Option<BoundingBox<f32>>);

impl ControlBoundsPen {
    /// Returns the accumulated bounds, or `None` if nothing was drawn.
    pub fn bounds(&self) -> Option<BoundingBox<f32>> {
        self.0
    }

    fn add(&mut self, x: f32, y: f32) {
        match &mut self.0 {
            Some(bounds) => bounds.extend(x, y),
            None => self.0 = Some(BoundingBox::from_point(x, y)),
        }
    }
}

impl Pen for ControlBoundsPen {
    fn move_to(&mut self, x: f32, y: f32) {
        self.add(x, y);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.add(x, y);
    }

    fn quad_to(&mut self, cx0: f32, cy0: f32, x: f32, y: f32) {
        self.add(cx0, cy0);
        self.add(x, y);
    }

    fn curve_to(&mut self, cx0: f32, cy0: f32, cx1: f32, cy1: f32, x: f32, y: f32) {
        self.add(cx0, cy0);
        self.add(cx1, cy1);
        self.add(x, y);
    }

    fn close(&mut self) {}
}

#[cfg(test)]
mod tests {
    use font_test_data::{build_font, cff, tables};
    use opentype::{
        tables as raw_tables,
        types::{PenCommand, CFF_SFNT_VERSION},
    };
    use pretty_assertions::assert_eq;

    use super::*;

    fn cff_font() -> Vec<u8> {
        let head = tables::head(1000, false);
        let maxp = tables::maxp(3);
        let cff = cff::simple_cff();
        build_font(
            CFF_SFNT_VERSION,
            &[
                (raw_tables::cff::TAG, cff.as_slice()),
                (raw_tables::head::TAG, head.as_slice()),
                (raw_tables::maxp::TAG, maxp.as_slice()),
            ],
        )
    }

    #[test]
    fn cff_square_scaled_to_twice_the_em() {
        let data = cff_font();
        let font = FontRef::new(&data).unwrap();
        let outlines = Outlines::new(&font);
        assert_eq!(outlines.format(), Some(OutlineFormat::Cff));
        assert_eq!(outlines.glyph_count(), 3);
        let mut commands: Vec<PenCommand> = Vec::new();
        outlines
            .draw(GlyphId::new(1), Size::new(2000.0), &[], &mut commands)
            .unwrap();
        assert_eq!(
            commands,
            [
                PenCommand::MoveTo { x: 200.0, y: 200.0 },
                PenCommand::LineTo { x: 800.0, y: 200.0 },
                PenCommand::LineTo { x: 800.0, y: 800.0 },
                PenCommand::LineTo { x: 200.0, y: 800.0 },
                PenCommand::Close,
            ]
        );
    }

    #[test]
    fn control_box() {
        let data = cff_font();
        let font = FontRef::new(&data).unwrap();
        let outlines = Outlines::new(&font);
        let bounds = outlines.control_box(GlyphId::new(1), &[]).unwrap();
        assert_eq!(
            bounds,
            BoundingBox {
                x_min: 100.0,
                y_min: 100.0,
                x_max: 400.0,
                y_max: 400.0
            }
        );
        // notdef is empty
        let empty = outlines.control_box(GlyphId::NOTDEF, &[]).unwrap();
        assert_eq!(empty, BoundingBox::default());
    }

    #[test]
    fn no_outlines() {
        let head = tables::head(1000, false);
        let data = build_font(CFF_SFNT_VERSION, &[(raw_tables::head::TAG, head.as_slice())]);
        let font = FontRef::new(&data).unwrap();
        let outlines = Outlines::new(&font);
        assert_eq!(outlines.format(), None);
        let mut commands: Vec<PenCommand> = Vec::new();
        assert!(matches!(
            outlines.draw(GlyphId::new(1), Size::unscaled(), &[], &mut commands),
            Err(DrawError::NoSources)
        ));
    }
}
