//! TrueType outlines with gvar variations.

use opentype::{
    tables::{
        glyf::{Anchor, CompositeGlyphFlags, Glyf, Glyph},
        gvar::Gvar,
        hvmtx::HVmtx,
        loca::Loca,
    },
    types::{BoundingBox, GlyphId, Pen, Point},
    FontRef, TableProvider,
};

use super::{DrawError, COMPOSITE_RECURSION_LIMIT};
use crate::NormalizedCoord;

/// Number of phantom points appended to every glyph by variations: left
/// origin, advance, top origin and bottom.
const PHANTOM_POINT_COUNT: usize = 4;

/// Points of a fully resolved glyph in font units.
#[derive(Clone, Default, Debug)]
pub(crate) struct LoadedGlyph {
    pub points: Vec<Point<f32>>,
    pub on_curve: Vec<bool>,
    pub contour_ends: Vec<usize>,
    pub phantom: [Point<f32>; PHANTOM_POINT_COUNT],
}

#[derive(Clone)]
pub(crate) struct Outlines<'a> {
    loca: Loca<'a>,
    glyf: Glyf<'a>,
    gvar: Option<Gvar<'a>>,
    hmtx: Option<HVmtx<'a>>,
    vmtx: Option<HVmtx<'a>>,
    glyph_count: u32,
    /// Vertical origin and advance for fonts without vmtx.
    default_vertical: (i16, i16),
}

impl<'a> Outlines<'a> {
    pub fn new(font: &FontRef<'a>) -> Option<Self> {
        let glyf = font.glyf().ok()?;
        let loca = match font.loca(None) {
            Ok(loca) => loca,
            Err(e) => {
                log::warn!("ignoring glyf table with unreadable loca: {e}");
                return None;
            }
        };
        let glyph_count = font
            .maxp()
            .map(|maxp| maxp.num_glyphs() as u32)
            .unwrap_or(loca.len() as u32);
        let default_vertical = font
            .hhea()
            .map(|hhea| {
                let advance = hhea.ascender() as i32 - hhea.descender() as i32;
                (hhea.ascender(), advance.clamp(0, i16::MAX as i32) as i16)
            })
            .unwrap_or_default();
        Some(Self {
            loca,
            glyf,
            gvar: font.gvar().ok(),
            hmtx: font.hmtx().ok(),
            vmtx: font.vmtx().ok(),
            glyph_count,
            default_vertical,
        })
    }

    pub fn glyph_count(&self) -> u32 {
        self.glyph_count
    }

    /// Returns the bounding box stored in the glyph header.
    pub fn bounds(&self, glyph_id: GlyphId) -> Option<BoundingBox<i16>> {
        if glyph_id.to_u32() >= self.glyph_count {
            return None;
        }
        Some(match self.loca.get_glyf(glyph_id, &self.glyf).ok()? {
            Some(glyph) => glyph.bbox(),
            None => BoundingBox::default(),
        })
    }

    pub fn draw(
        &self,
        glyph_id: GlyphId,
        coords: &[NormalizedCoord],
        pen: &mut impl Pen,
    ) -> Result<(), DrawError> {
        let glyph = self.load(glyph_id, coords)?;
        let mut start = 0;
        for &end in &glyph.contour_ends {
            if end < start || end >= glyph.points.len() {
                break;
            }
            draw_contour(
                &glyph.points[start..=end],
                &glyph.on_curve[start..=end],
                pen,
            );
            start = end + 1;
        }
        Ok(())
    }

    /// Loads the points of a glyph with variations applied and components
    /// resolved.
    pub fn load(
        &self,
        glyph_id: GlyphId,
        coords: &[NormalizedCoord],
    ) -> Result<LoadedGlyph, DrawError> {
        self.load_recursive(glyph_id, coords, 0)
    }

    /// Returns the deltas of the four phantom points of the glyph at the
    /// given location.
    ///
    /// Phantom points are never inferred, so only explicit deltas count.
    pub fn phantom_deltas(
        &self,
        glyph_id: GlyphId,
        coords: &[NormalizedCoord],
    ) -> Option<[Point<f32>; PHANTOM_POINT_COUNT]> {
        let gvar = self.gvar.as_ref()?;
        if coords.is_empty() {
            return None;
        }
        let point_count = match self.loca.get_glyf(glyph_id, &self.glyf).ok()? {
            Some(Glyph::Simple(simple)) => simple.num_points(),
            Some(Glyph::Composite(composite)) => composite.components().count(),
            None => 0,
        };
        let var_data = gvar.glyph_variation_data(glyph_id).ok()??;
        let mut deltas = [Point::default(); PHANTOM_POINT_COUNT];
        for tuple in var_data.tuples() {
            let Some(scalar) = tuple.compute_scalar(coords) else {
                continue;
            };
            let scalar = scalar.to_f32();
            for delta in tuple.deltas() {
                let Some(ix) = (delta.position as usize).checked_sub(point_count) else {
                    continue;
                };
                if let Some(phantom) = deltas.get_mut(ix) {
                    phantom.x += delta.x_delta as f32 * scalar;
                    phantom.y += delta.y_delta as f32 * scalar;
                }
            }
        }
        Some(deltas)
    }

    fn phantom_points(&self, glyph_id: GlyphId, x_min: i16, y_max: i16) -> [Point<f32>; 4] {
        let (advance, lsb) = self
            .hmtx
            .as_ref()
            .map(|hmtx| {
                (
                    hmtx.advance(glyph_id).unwrap_or_default(),
                    hmtx.side_bearing(glyph_id).unwrap_or_default(),
                )
            })
            .unwrap_or_default();
        let (top, vadvance) = match &self.vmtx {
            Some(vmtx) => {
                let tsb = vmtx.side_bearing(glyph_id).unwrap_or_default();
                (
                    y_max as i32 + tsb as i32,
                    vmtx.advance(glyph_id).unwrap_or_default() as i32,
                )
            }
            None => (
                self.default_vertical.0 as i32,
                self.default_vertical.1 as i32,
            ),
        };
        let left = x_min as f32 - lsb as f32;
        [
            Point::new(left, 0.0),
            Point::new(left + advance as f32, 0.0),
            Point::new(0.0, top as f32),
            Point::new(0.0, (top - vadvance) as f32),
        ]
    }

    fn load_recursive(
        &self,
        glyph_id: GlyphId,
        coords: &[NormalizedCoord],
        depth: usize,
    ) -> Result<LoadedGlyph, DrawError> {
        if depth > COMPOSITE_RECURSION_LIMIT {
            log::warn!("composite nesting limit exceeded at glyph {glyph_id}");
            return Err(DrawError::RecursionLimitExceeded(glyph_id));
        }
        if glyph_id.to_u32() >= self.glyph_count {
            return Err(DrawError::GlyphNotFound(glyph_id));
        }
        let Some(glyph) = self.loca.get_glyf(glyph_id, &self.glyf)? else {
            let mut loaded = LoadedGlyph {
                phantom: self.phantom_points(glyph_id, 0, 0),
                ..Default::default()
            };
            // empty glyphs still carry varied metrics
            if let Some(deltas) = self.phantom_deltas(glyph_id, coords) {
                for (point, delta) in loaded.phantom.iter_mut().zip(deltas) {
                    *point += delta;
                }
            }
            return Ok(loaded);
        };
        let phantom = self.phantom_points(glyph_id, glyph.x_min(), glyph.y_max());
        match glyph {
            Glyph::Simple(simple) => {
                let curve_points = simple.points();
                let mut loaded = LoadedGlyph {
                    points: curve_points
                        .iter()
                        .map(|p| Point::new(p.x as f32, p.y as f32))
                        .collect(),
                    on_curve: curve_points.iter().map(|p| p.on_curve).collect(),
                    contour_ends: simple
                        .end_pts_of_contours()
                        .iter()
                        .map(|end| end as usize)
                        .collect(),
                    phantom,
                };
                self.apply_simple_deltas(glyph_id, coords, &mut loaded);
                Ok(loaded)
            }
            Glyph::Composite(composite) => {
                let components: Vec<_> = composite.components().collect();
                // one delta per component offset followed by the phantoms
                let mut deltas = vec![Point::default(); components.len() + PHANTOM_POINT_COUNT];
                self.accumulate_deltas(glyph_id, coords, &mut deltas, |_, _| {});
                let mut loaded = LoadedGlyph {
                    phantom,
                    ..Default::default()
                };
                for (point, delta) in loaded
                    .phantom
                    .iter_mut()
                    .zip(&deltas[components.len()..])
                {
                    *point += *delta;
                }
                for (component, delta) in components.iter().zip(&deltas) {
                    let child = self.load_recursive(component.glyph, coords, depth + 1)?;
                    let base = loaded.points.len();
                    let transform = component.transform;
                    let transformed = child.points.iter().map(|p| {
                        let (x, y) = transform.apply(p.x, p.y);
                        Point::new(x, y)
                    });
                    loaded.points.extend(transformed);
                    loaded.on_curve.extend_from_slice(&child.on_curve);
                    loaded
                        .contour_ends
                        .extend(child.contour_ends.iter().map(|end| end + base));
                    let offset = match component.anchor {
                        Anchor::Offset { x, y } => {
                            let mut offset = Point::new(x as f32, y as f32) + *delta;
                            let scaled = component
                                .flags
                                .contains(CompositeGlyphFlags::SCALED_COMPONENT_OFFSET)
                                && !component
                                    .flags
                                    .contains(CompositeGlyphFlags::UNSCALED_COMPONENT_OFFSET);
                            if scaled && !transform.is_identity() {
                                let (x, y) = transform.apply(offset.x, offset.y);
                                offset = Point::new(x, y);
                            }
                            offset
                        }
                        Anchor::Point { base: base_ix, component: component_ix } => {
                            let base_point = loaded
                                .points
                                .get(..base)
                                .and_then(|points| points.get(base_ix as usize))
                                .copied()
                                .ok_or(DrawError::InvalidAnchorPoint(glyph_id, base_ix))?;
                            let component_point = loaded
                                .points
                                .get(base + component_ix as usize)
                                .copied()
                                .ok_or(DrawError::InvalidAnchorPoint(glyph_id, component_ix))?;
                            base_point - component_point
                        }
                    };
                    for point in &mut loaded.points[base..] {
                        *point += offset;
                    }
                    if component
                        .flags
                        .contains(CompositeGlyphFlags::USE_MY_METRICS)
                    {
                        loaded.phantom = child.phantom;
                    }
                }
                Ok(loaded)
            }
        }
    }

    fn apply_simple_deltas(
        &self,
        glyph_id: GlyphId,
        coords: &[NormalizedCoord],
        glyph: &mut LoadedGlyph,
    ) {
        let point_count = glyph.points.len();
        let mut deltas = vec![Point::default(); point_count + PHANTOM_POINT_COUNT];
        let original = glyph.points.clone();
        let contour_ends = glyph.contour_ends.clone();
        self.accumulate_deltas(glyph_id, coords, &mut deltas, |tuple_deltas, touched| {
            interpolate_untouched(&original, &contour_ends, tuple_deltas, touched);
        });
        for (point, delta) in glyph.points.iter_mut().zip(&deltas) {
            *point += *delta;
        }
        for (point, delta) in glyph.phantom.iter_mut().zip(&deltas[point_count..]) {
            *point += *delta;
        }
    }

    /// Sums the scaled deltas of every active tuple into `deltas`.
    ///
    /// Tuples that only carry deltas for some points are first passed to
    /// `infer` along with a mask of the points they touch.
    fn accumulate_deltas(
        &self,
        glyph_id: GlyphId,
        coords: &[NormalizedCoord],
        deltas: &mut [Point<f32>],
        mut infer: impl FnMut(&mut [Point<f32>], &[bool]),
    ) {
        let Some(gvar) = &self.gvar else {
            return;
        };
        if coords.iter().all(|coord| *coord == NormalizedCoord::ZERO) {
            return;
        }
        let var_data = match gvar.glyph_variation_data(glyph_id) {
            Ok(Some(var_data)) => var_data,
            Ok(None) => return,
            Err(e) => {
                log::debug!("ignoring variations of glyph {glyph_id}: {e}");
                return;
            }
        };
        let mut tuple_deltas = vec![Point::default(); deltas.len()];
        let mut touched = vec![false; deltas.len()];
        for tuple in var_data.tuples() {
            let Some(scalar) = tuple.compute_scalar(coords) else {
                continue;
            };
            let scalar = scalar.to_f32();
            if tuple.has_deltas_for_all_points() {
                for (delta, tuple_delta) in deltas.iter_mut().zip(tuple.deltas()) {
                    delta.x += tuple_delta.x_delta as f32 * scalar;
                    delta.y += tuple_delta.y_delta as f32 * scalar;
                }
                continue;
            }
            tuple_deltas.fill(Point::default());
            touched.fill(false);
            for tuple_delta in tuple.deltas() {
                let ix = tuple_delta.position as usize;
                if let Some(delta) = tuple_deltas.get_mut(ix) {
                    *delta = Point::new(tuple_delta.x_delta as f32, tuple_delta.y_delta as f32);
                    touched[ix] = true;
                }
            }
            infer(&mut tuple_deltas, &touched);
            for (delta, tuple_delta) in deltas.iter_mut().zip(&tuple_deltas) {
                *delta += *tuple_delta * scalar;
            }
        }
    }
}

/// Infers deltas for the points of each contour that a tuple leaves
/// untouched, following the gvar interpolation rules.
///
/// A contour with a single touched point is shifted by its delta and a
/// contour without touched points is left alone.
fn interpolate_untouched(
    points: &[Point<f32>],
    contour_ends: &[usize],
    deltas: &mut [Point<f32>],
    touched: &[bool],
) {
    let mut start = 0;
    for &end in contour_ends {
        if end < start || end >= points.len() {
            return;
        }
        let refs: Vec<usize> = (start..=end).filter(|&ix| touched[ix]).collect();
        match refs.as_slice() {
            [] => {}
            [single] => {
                let delta = deltas[*single];
                for ix in start..=end {
                    if ix != *single {
                        deltas[ix] = delta;
                    }
                }
            }
            _ => {
                // walk each untouched run between consecutive references,
                // wrapping around the end of the contour
                for (i, &prev) in refs.iter().enumerate() {
                    let next = refs[(i + 1) % refs.len()];
                    let mut ix = if prev == end { start } else { prev + 1 };
                    while ix != next {
                        deltas[ix] = Point::new(
                            infer_coord(points[ix].x, (points[prev].x, deltas[prev].x), (points[next].x, deltas[next].x)),
                            infer_coord(points[ix].y, (points[prev].y, deltas[prev].y), (points[next].y, deltas[next].y)),
                        );
                        ix = if ix == end { start } else { ix + 1 };
                    }
                }
            }
        }
        start = end + 1;
    }
}

/// Infers the delta of one coordinate from two reference `(coord, delta)`
/// pairs.
fn infer_coord(coord: f32, ref1: (f32, f32), ref2: (f32, f32)) -> f32 {
    let (lo, hi) = if ref1.0 <= ref2.0 { (ref1, ref2) } else { (ref2, ref1) };
    if lo.0 == hi.0 {
        return if lo.1 == hi.1 { lo.1 } else { 0.0 };
    }
    if coord <= lo.0 {
        lo.1
    } else if coord >= hi.0 {
        hi.1
    } else {
        let t = (coord - lo.0) / (hi.0 - lo.0);
        lo.1 + t * (hi.1 - lo.1)
    }
}

/// Emits a single TrueType contour of quadratic segments.
///
/// Consecutive off-curve points imply an on-curve point at their midpoint.
fn draw_contour(points: &[Point<f32>], on_curve: &[bool], pen: &mut impl Pen) {
    let (Some(first), Some(last)) = (points.first(), points.last()) else {
        return;
    };
    let mid = |a: Point<f32>, b: Point<f32>| Point::new((a.x + b.x) * 0.5, (a.y + b.y) * 0.5);
    let first_on = on_curve.first().copied().unwrap_or(true);
    let last_on = on_curve.last().copied().unwrap_or(true);
    let (start, range) = if first_on {
        (*first, 1..points.len())
    } else if last_on {
        (*last, 0..points.len() - 1)
    } else {
        (mid(*first, *last), 0..points.len())
    };
    pen.move_to(start.x, start.y);
    let mut pending: Option<Point<f32>> = None;
    for ix in range {
        let point = points[ix];
        if on_curve.get(ix).copied().unwrap_or(true) {
            match pending.take() {
                Some(control) => pen.quad_to(control.x, control.y, point.x, point.y),
                None => pen.line_to(point.x, point.y),
            }
        } else {
            if let Some(control) = pending {
                let implied = mid(control, point);
                pen.quad_to(control.x, control.y, implied.x, implied.y);
            }
            pending = Some(point);
        }
    }
    if let Some(control) = pending {
        pen.quad_to(control.x, control.y, start.x, start.y);
    }
    pen.close();
}

#[cfg(test)]
mod tests {
    use font_test_data::{
        be_buffer,
        bebuffer::BeBuffer,
        build_font,
        glyf::{glyf_loca, COMPOSITE_OFFSET, COMPOSITE_TRANSFORM, TRIANGLE},
        tables,
    };
    use opentype::{
        tables as raw_tables,
        types::{F2Dot14, PenCommand, TT_SFNT_VERSION},
    };

    use super::*;

    fn font_data(extra: &[(opentype::types::Tag, &[u8])]) -> Vec<u8> {
        let (glyf, loca) = glyf_loca();
        let head = tables::head(1000, false);
        let maxp = tables::maxp(4);
        let hhea = tables::hhea(800, -200, 0, 4);
        let hmtx = tables::hmtx(&[(0, 0), (300, 0), (600, 237), (400, 0)], &[]);
        let mut entries = vec![
            (raw_tables::glyf::TAG, glyf.as_slice()),
            (raw_tables::head::TAG, head.as_slice()),
            (raw_tables::hvhea::HHEA_TAG, hhea.as_slice()),
            (raw_tables::hvmtx::HMTX_TAG, hmtx.as_slice()),
            (raw_tables::loca::TAG, loca.as_slice()),
            (raw_tables::maxp::TAG, maxp.as_slice()),
        ];
        entries.extend_from_slice(extra);
        build_font(TT_SFNT_VERSION, &entries)
    }

    fn draw(outlines: &Outlines, gid: u32, coords: &[NormalizedCoord]) -> Vec<PenCommand> {
        let mut commands = Vec::new();
        outlines
            .draw(GlyphId::new(gid), coords, &mut commands)
            .unwrap();
        commands
    }

    #[test]
    fn simple_glyph() {
        let data = font_data(&[]);
        let font = FontRef::new(&data).unwrap();
        let outlines = Outlines::new(&font).unwrap();
        assert_eq!(outlines.glyph_count(), 4);
        let [a, b, c] = TRIANGLE.map(|(x, y)| (x as f32, y as f32));
        assert_eq!(
            draw(&outlines, 1, &[]),
            [
                PenCommand::MoveTo { x: a.0, y: a.1 },
                PenCommand::LineTo { x: b.0, y: b.1 },
                PenCommand::LineTo { x: c.0, y: c.1 },
                PenCommand::Close,
            ]
        );
        assert!(draw(&outlines, 0, &[]).is_empty());
    }

    #[test]
    fn transformed_composite() {
        let data = font_data(&[]);
        let font = FontRef::new(&data).unwrap();
        let outlines = Outlines::new(&font).unwrap();
        let [xx, yx, xy, yy] = COMPOSITE_TRANSFORM.map(|v| F2Dot14::from_bits(v).to_f32());
        let (dx, dy) = (COMPOSITE_OFFSET.0 as f32, COMPOSITE_OFFSET.1 as f32);
        let expected: Vec<(f32, f32)> = TRIANGLE
            .iter()
            .map(|&(x, y)| {
                let (x, y) = (x as f32, y as f32);
                (xx * x + xy * y + dx, yx * x + yy * y + dy)
            })
            .collect();
        let commands = draw(&outlines, 2, &[]);
        assert_eq!(commands.len(), 4);
        let actual: Vec<(f32, f32)> = commands.iter().filter_map(|c| c.end_point()).collect();
        for (a, e) in actual.iter().zip(&expected) {
            assert!((a.0 - e.0).abs() < 1e-3 && (a.1 - e.1).abs() < 1e-3, "{a:?} != {e:?}");
        }
        assert!((actual[1].0 - 517.04).abs() < 0.01);
        assert!((actual[1].1 - 360.5).abs() < 0.01);
    }

    #[test]
    fn offset_and_scaled_components() {
        let data = font_data(&[]);
        let font = FontRef::new(&data).unwrap();
        let outlines = Outlines::new(&font).unwrap();
        let points: Vec<_> = draw(&outlines, 3, &[])
            .iter()
            .filter_map(|c| c.end_point())
            .collect();
        assert_eq!(
            points,
            [
                (10.0, 20.0),
                (215.0, 20.0),
                (110.0, 320.0),
                (0.0, 0.0),
                (102.5, 0.0),
                (50.0, 150.0),
            ]
        );
    }

    #[test]
    fn phantom_points_follow_metrics() {
        let data = font_data(&[]);
        let font = FontRef::new(&data).unwrap();
        let outlines = Outlines::new(&font).unwrap();
        let glyph = outlines.load(GlyphId::new(2), &[]).unwrap();
        // x_min 237 and lsb 237 put the origin at zero
        assert_eq!(glyph.phantom[0], Point::new(0.0, 0.0));
        assert_eq!(glyph.phantom[1], Point::new(600.0, 0.0));
        assert_eq!(glyph.phantom[2], Point::new(0.0, 800.0));
        assert_eq!(glyph.phantom[3], Point::new(0.0, -200.0));
    }

    #[test]
    fn missing_glyph() {
        let data = font_data(&[]);
        let font = FontRef::new(&data).unwrap();
        let outlines = Outlines::new(&font).unwrap();
        let mut commands: Vec<PenCommand> = Vec::new();
        assert!(matches!(
            outlines.draw(GlyphId::new(4), &[], &mut commands),
            Err(DrawError::GlyphNotFound(_))
        ));
    }

    /// gvar with one axis where glyph 1 moves its second point by +100 in x
    /// at the peak. The first and third points are inferred.
    fn gvar_partial() -> BeBuffer {
        let glyph_data = be_buffer! {
            1u16,               // tupleVariationCount
            10u16,              // dataOffset
            // tuple header: size, embedded peak, private points
            7u16, 0xA000u16, 16384i16,
            // private point numbers: count 1, run of 1 byte sized point 1
            1u8, 0u8, 1u8,
            // x deltas: 1 byte: 100; y deltas: 1 byte: 0
            0u8, 100u8, 0u8, 0u8
        };
        let mut glyph_data = glyph_data.into_vec();
        glyph_data.resize(glyph_data.len().next_multiple_of(2), 0);
        let len = glyph_data.len() as u16;
        be_buffer! {
            1u16, 0u16,     // version
            1u16,           // axisCount
            0u16,           // sharedTupleCount
            30u32,          // sharedTuplesOffset
            4u16,           // glyphCount
            0u16,           // flags: short offsets
            30u32,          // glyphVariationDataArrayOffset
            [0u16, 0, (len / 2), (len / 2), (len / 2)]
        }
        .extend_bytes(&glyph_data)
    }

    #[test]
    fn inferred_deltas() {
        let gvar = gvar_partial();
        let data = font_data(&[(raw_tables::gvar::TAG, gvar.as_slice())]);
        let font = FontRef::new(&data).unwrap();
        let outlines = Outlines::new(&font).unwrap();
        let points: Vec<_> = draw(&outlines, 1, &[F2Dot14::ONE])
            .iter()
            .filter_map(|c| c.end_point())
            .collect();
        // with a single touched point the whole contour shifts
        assert_eq!(points, [(100.0, 0.0), (305.0, 0.0), (200.0, 300.0)]);
        let half: Vec<_> = draw(&outlines, 1, &[F2Dot14::from_f32(0.5)])
            .iter()
            .filter_map(|c| c.end_point())
            .collect();
        assert_eq!(half, [(50.0, 0.0), (255.0, 0.0), (150.0, 300.0)]);
        // the default location is untouched
        let default: Vec<_> = draw(&outlines, 1, &[F2Dot14::ZERO])
            .iter()
            .filter_map(|c| c.end_point())
            .collect();
        assert_eq!(default, [(0.0, 0.0), (205.0, 0.0), (100.0, 300.0)]);
    }

    #[test]
    fn interpolation_between_references() {
        // a horizontal line of points where the ends move apart
        let points = [0.0, 50.0, 100.0, 150.0].map(|x| Point::new(x, 0.0));
        let mut deltas = [
            Point::new(-10.0, 0.0),
            Point::default(),
            Point::default(),
            Point::new(30.0, 0.0),
        ];
        let touched = [true, false, false, true];
        interpolate_untouched(&points, &[3], &mut deltas, &touched);
        assert!((deltas[1].x - 3.333333).abs() < 1e-4);
        assert!((deltas[2].x - 16.666666).abs() < 1e-4);
    }

    #[test]
    fn implied_on_curve_points() {
        let points = [(0.0, 0.0), (100.0, 100.0), (200.0, 0.0), (100.0, -100.0)]
            .map(|(x, y)| Point::new(x, y));
        let on_curve = [true, false, false, false];
        let mut commands: Vec<PenCommand> = Vec::new();
        draw_contour(&points, &on_curve, &mut commands);
        assert_eq!(
            commands,
            [
                PenCommand::MoveTo { x: 0.0, y: 0.0 },
                PenCommand::QuadTo { cx0: 100.0, cy0: 100.0, x: 150.0, y: 50.0 },
                PenCommand::QuadTo { cx0: 200.0, cy0: 0.0, x: 150.0, y: -50.0 },
                PenCommand::QuadTo { cx0: 100.0, cy0: -100.0, x: 0.0, y: 0.0 },
                PenCommand::Close,
            ]
        );
    }
}
