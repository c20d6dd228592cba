//! Global font and glyph specific metrics.
//!
//! Metrics come in two flavors:
//!
//! * Global metrics apply to all glyphs in a font and are used to lay out
//!   lines of text: ascent, descent, leading and the suggested placement of
//!   decorations.
//! * Glyph metrics apply to single glyphs: advances, side bearings, vertical
//!   origins and bounds.
//!
//! Both are computed for a [`Size`] and a location in normalized variation
//! space. For non-variable fonts the coordinates are ignored and an empty
//! slice may be passed.

use opentype::{
    tables::{
        hvar::Hvar,
        hvmtx::HVmtx,
        os2::selection,
        vorg::Vorg,
    },
    types::{BoundingBox, Fixed, GlyphId},
    FontRef, TableProvider,
};

use crate::{outline::GlyfOutlines, size::Size, NormalizedCoord};

/// Metrics for a text decoration.
///
/// This represents the suggested offset and thickness of an underline
/// or strikeout text decoration.
#[derive(Copy, Clone, PartialEq, Default, Debug)]
pub struct Decoration {
    /// Offset to the top of the decoration from the baseline.
    pub offset: f32,
    /// Thickness of the decoration.
    pub thickness: f32,
}

/// Metrics that apply to all glyphs in a font.
///
/// The line metrics (`ascent`, `descent` and `leading`) come from the OS/2
/// typographic values when the `USE_TYPO_METRICS` flag is set, otherwise
/// from `hhea`. When the `hhea` values are zero, the OS/2 typographic and
/// then the Windows metrics are used as a last resort.
///
/// For variable fonts, deltas are applied from the `MVAR` table.
#[derive(Copy, Clone, PartialEq, Default, Debug)]
pub struct Metrics {
    /// Number of font design units per em unit.
    pub units_per_em: u16,
    /// Number of glyphs in the font.
    pub glyph_count: u16,
    /// True if the font is not proportionally spaced.
    pub is_monospace: bool,
    /// Italic angle in counter-clockwise degrees from the vertical.
    pub italic_angle: f32,
    /// Distance from the baseline to the top of the alignment box.
    pub ascent: f32,
    /// Distance from the baseline to the bottom of the alignment box.
    pub descent: f32,
    /// Recommended additional spacing between lines.
    pub leading: f32,
    /// Distance from the baseline to the top of a typical capital.
    pub cap_height: Option<f32>,
    /// Distance from the baseline to the top of the lowercase "x".
    pub x_height: Option<f32>,
    /// Average width of all non-zero width characters in the font.
    pub average_width: Option<f32>,
    /// Maximum advance width of all characters in the font.
    pub max_width: Option<f32>,
    /// Metrics for an underline decoration.
    pub underline: Option<Decoration>,
    /// Metrics for a strikeout decoration.
    pub strikeout: Option<Decoration>,
    /// Union of minimum and maximum extents for all glyphs in the font.
    pub bounds: Option<BoundingBox<f32>>,
}

impl Metrics {
    /// Creates new metrics for the given font, size, and location in
    /// normalized variation space.
    pub fn new<'a>(font: &impl TableProvider<'a>, size: Size, coords: &[NormalizedCoord]) -> Self {
        let head = font.head();
        let mut metrics = Metrics {
            units_per_em: head.as_ref().map(|head| head.units_per_em()).unwrap_or_default(),
            ..Default::default()
        };
        let scale = size.linear_scale(metrics.units_per_em);
        if let Ok(head) = &head {
            metrics.bounds = Some(BoundingBox {
                x_min: head.x_min() as f32 * scale,
                y_min: head.y_min() as f32 * scale,
                x_max: head.x_max() as f32 * scale,
                y_max: head.y_max() as f32 * scale,
            });
        }
        if let Ok(maxp) = font.maxp() {
            metrics.glyph_count = maxp.num_glyphs();
        }
        if let Ok(post) = font.post() {
            metrics.is_monospace = post.is_fixed_pitch() != 0;
            metrics.italic_angle = post.italic_angle().to_f32();
            metrics.underline = Some(Decoration {
                offset: post.underline_position() as f32 * scale,
                thickness: post.underline_thickness() as f32 * scale,
            });
        }
        let hhea = font.hhea().ok();
        if let Some(hhea) = &hhea {
            metrics.max_width = Some(hhea.advance_max() as f32 * scale);
        }
        let os2 = font.os2().ok();
        let mut used_typo_metrics = false;
        if let Some(os2) = &os2 {
            if os2.fs_selection() & selection::USE_TYPO_METRICS != 0 {
                metrics.ascent = os2.s_typo_ascender() as f32 * scale;
                metrics.descent = os2.s_typo_descender() as f32 * scale;
                metrics.leading = os2.s_typo_line_gap() as f32 * scale;
                used_typo_metrics = true;
            }
            metrics.average_width = Some(os2.x_avg_char_width() as f32 * scale);
            metrics.cap_height = os2.s_cap_height().map(|v| v as f32 * scale);
            metrics.x_height = os2.sx_height().map(|v| v as f32 * scale);
            metrics.strikeout = Some(Decoration {
                offset: os2.y_strikeout_position() as f32 * scale,
                thickness: os2.y_strikeout_size() as f32 * scale,
            });
        }
        if !used_typo_metrics {
            if let Some(hhea) = &hhea {
                metrics.ascent = hhea.ascender() as f32 * scale;
                metrics.descent = hhea.descender() as f32 * scale;
                metrics.leading = hhea.line_gap() as f32 * scale;
            }
            if metrics.ascent == 0.0 && metrics.descent == 0.0 {
                if let Some(os2) = &os2 {
                    if os2.s_typo_ascender() != 0 || os2.s_typo_descender() != 0 {
                        metrics.ascent = os2.s_typo_ascender() as f32 * scale;
                        metrics.descent = os2.s_typo_descender() as f32 * scale;
                        metrics.leading = os2.s_typo_line_gap() as f32 * scale;
                    } else {
                        metrics.ascent = os2.us_win_ascent() as f32 * scale;
                        // win descent is positive below the baseline
                        metrics.descent = -(os2.us_win_descent() as f32 * scale);
                    }
                }
            }
        }
        if coords.is_empty() {
            return metrics;
        }
        if let Ok(mvar) = font.mvar() {
            use opentype::tables::mvar::tags::*;
            let metric_delta =
                |tag| mvar.metric_delta(tag, coords).unwrap_or_default().to_f32() * scale;
            metrics.ascent += metric_delta(HASC);
            metrics.descent += metric_delta(HDSC);
            metrics.leading += metric_delta(HLGP);
            if let Some(cap_height) = &mut metrics.cap_height {
                *cap_height += metric_delta(CPHT);
            }
            if let Some(x_height) = &mut metrics.x_height {
                *x_height += metric_delta(XHGT);
            }
            if let Some(underline) = &mut metrics.underline {
                underline.offset += metric_delta(UNDO);
                underline.thickness += metric_delta(UNDS);
            }
            if let Some(strikeout) = &mut metrics.strikeout {
                strikeout.offset += metric_delta(STRO);
                strikeout.thickness += metric_delta(STRS);
            }
        }
        metrics
    }
}

/// Glyph specific metrics.
#[derive(Clone)]
pub struct GlyphMetrics<'a> {
    glyph_count: u32,
    scale: f32,
    hmtx: Option<HVmtx<'a>>,
    vmtx: Option<HVmtx<'a>>,
    hvar: Option<Hvar<'a>>,
    vvar: Option<Hvar<'a>>,
    vorg: Option<Vorg<'a>>,
    glyf: Option<GlyfOutlines<'a>>,
    /// Ascender and line height used for fonts without vertical metrics.
    default_vertical: (i16, i32),
    coords: &'a [NormalizedCoord],
}

impl<'a> GlyphMetrics<'a> {
    /// Creates new glyph metrics from the given font, size, and location in
    /// normalized variation space.
    pub fn new(font: &FontRef<'a>, size: Size, coords: &'a [NormalizedCoord]) -> Self {
        let glyph_count = font
            .maxp()
            .map(|maxp| maxp.num_glyphs() as u32)
            .unwrap_or_default();
        let upem = font
            .head()
            .map(|head| head.units_per_em())
            .unwrap_or_default();
        let default_vertical = font
            .hhea()
            .map(|hhea| {
                (
                    hhea.ascender(),
                    hhea.ascender() as i32 - hhea.descender() as i32,
                )
            })
            .unwrap_or_default();
        Self {
            glyph_count,
            scale: size.linear_scale(upem),
            hmtx: font.hmtx().ok(),
            vmtx: font.vmtx().ok(),
            hvar: font.hvar().ok(),
            vvar: font.vvar().ok(),
            vorg: font.vorg().ok(),
            glyf: GlyfOutlines::new(font),
            default_vertical,
            coords,
        }
    }

    /// Returns the number of available glyphs in the font.
    pub fn glyph_count(&self) -> u32 {
        self.glyph_count
    }

    /// Returns the advance width for the specified glyph.
    ///
    /// Variations come from `HVAR` when present, otherwise from the phantom
    /// points in `gvar`.
    ///
    /// Returns `None` if `glyph_id >= self.glyph_count()` or the font has no
    /// horizontal metrics.
    pub fn advance_width(&self, glyph_id: GlyphId) -> Option<f32> {
        if glyph_id.to_u32() >= self.glyph_count {
            return None;
        }
        let mut advance = self.hmtx.as_ref()?.advance(glyph_id)? as i32;
        if let Some(hvar) = self.active(&self.hvar) {
            advance += truncate(hvar.advance_delta(glyph_id, self.coords).ok());
        } else if let Some(deltas) = self.phantom_deltas(glyph_id) {
            advance += (deltas[1].x - deltas[0].x) as i32;
        }
        Some(advance as f32 * self.scale)
    }

    /// Returns the left side bearing for the specified glyph.
    ///
    /// Returns `None` if `glyph_id >= self.glyph_count()` or the font has no
    /// horizontal metrics.
    pub fn left_side_bearing(&self, glyph_id: GlyphId) -> Option<f32> {
        if glyph_id.to_u32() >= self.glyph_count {
            return None;
        }
        let mut lsb = self.hmtx.as_ref()?.side_bearing(glyph_id)? as i32;
        if let Some(hvar) = self.active(&self.hvar) {
            lsb += truncate(hvar.lsb_delta(glyph_id, self.coords).and_then(Result::ok));
        } else if let Some(deltas) = self.phantom_deltas(glyph_id) {
            lsb += deltas[0].x as i32;
        }
        Some(lsb as f32 * self.scale)
    }

    /// Returns the advance height for the specified glyph.
    ///
    /// Fonts without a `vmtx` table use the distance between the `hhea`
    /// ascender and descender for every glyph.
    pub fn advance_height(&self, glyph_id: GlyphId) -> Option<f32> {
        if glyph_id.to_u32() >= self.glyph_count {
            return None;
        }
        let Some(vmtx) = &self.vmtx else {
            return Some(self.default_vertical.1 as f32 * self.scale);
        };
        let mut advance = vmtx.advance(glyph_id)? as i32;
        if let Some(vvar) = self.active(&self.vvar) {
            advance += truncate(vvar.advance_delta(glyph_id, self.coords).ok());
        } else if let Some(deltas) = self.phantom_deltas(glyph_id) {
            advance += (deltas[2].y - deltas[3].y) as i32;
        }
        Some(advance as f32 * self.scale)
    }

    /// Returns the y coordinate of the vertical origin of the glyph.
    ///
    /// This comes from `VORG` (with `VVAR` deltas) when present, otherwise
    /// from the top side bearing in `vmtx` relative to the glyph bounds, and
    /// finally from the `hhea` ascender.
    pub fn vertical_origin(&self, glyph_id: GlyphId) -> Option<f32> {
        if glyph_id.to_u32() >= self.glyph_count {
            return None;
        }
        if let Some(vorg) = &self.vorg {
            let mut origin = vorg.vertical_origin_y(glyph_id) as i32;
            if let Some(vvar) = self.active(&self.vvar) {
                origin += truncate(vvar.vorg_delta(glyph_id, self.coords).and_then(Result::ok));
            }
            return Some(origin as f32 * self.scale);
        }
        if let (Some(vmtx), Some(glyf)) = (&self.vmtx, &self.glyf) {
            let y_max = glyf.bounds(glyph_id).map(|bbox| bbox.y_max).unwrap_or_default() as i32;
            let tsb = vmtx.side_bearing(glyph_id).unwrap_or_default() as i32;
            return Some((y_max + tsb) as f32 * self.scale);
        }
        Some(self.default_vertical.0 as f32 * self.scale)
    }

    /// Returns the bounding box for the specified glyph.
    ///
    /// Variations are not reflected in the bounding box returned by this
    /// method.
    ///
    /// Returns `None` if `glyph_id >= self.glyph_count()`, the underlying font
    /// data is invalid, or the font does not contain TrueType outlines.
    pub fn bounds(&self, glyph_id: GlyphId) -> Option<BoundingBox<f32>> {
        let bbox = self.glyf.as_ref()?.bounds(glyph_id)?;
        Some(BoundingBox {
            x_min: bbox.x_min as f32 * self.scale,
            y_min: bbox.y_min as f32 * self.scale,
            x_max: bbox.x_max as f32 * self.scale,
            y_max: bbox.y_max as f32 * self.scale,
        })
    }

    fn active<'t>(&self, table: &'t Option<Hvar<'a>>) -> Option<&'t Hvar<'a>> {
        table.as_ref().filter(|_| !self.coords.is_empty())
    }

    fn phantom_deltas(&self, glyph_id: GlyphId) -> Option<[opentype::types::Point<f32>; 4]> {
        self.glyf.as_ref()?.phantom_deltas(glyph_id, self.coords)
    }
}

/// Metric deltas are truncated toward zero.
fn truncate(delta: Option<Fixed>) -> i32 {
    delta.map(|delta| delta.to_f64() as i32).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use font_test_data::{be_buffer, bebuffer::BeBuffer, build_font, tables, variations};
    use opentype::{
        tables as raw_tables,
        types::{Tag, TT_SFNT_VERSION},
    };
    use pretty_assertions::assert_eq;

    use super::*;

    fn font_data(os2: &tables::Os2, extra: &[(Tag, &[u8])]) -> Vec<u8> {
        let head = tables::head(1000, false);
        let maxp = tables::maxp(3);
        let hhea = tables::hhea(750, -250, 20, 2);
        let hmtx = tables::hmtx(&[(500, 10), (600, 20)], &[30]);
        let os2 = os2.build();
        let post = tables::post_v3(-100, 50);
        let mut entries = vec![
            (raw_tables::head::TAG, head.as_slice()),
            (raw_tables::hvhea::HHEA_TAG, hhea.as_slice()),
            (raw_tables::hvmtx::HMTX_TAG, hmtx.as_slice()),
            (raw_tables::maxp::TAG, maxp.as_slice()),
            (raw_tables::os2::TAG, os2.as_slice()),
            (raw_tables::post::TAG, post.as_slice()),
        ];
        entries.extend_from_slice(extra);
        build_font(TT_SFNT_VERSION, &entries)
    }

    #[test]
    fn global_metrics() {
        let data = font_data(&tables::Os2::default(), &[]);
        let font = FontRef::new(&data).unwrap();
        let metrics = Metrics::new(&font, Size::unscaled(), &[]);
        let expected = Metrics {
            units_per_em: 1000,
            glyph_count: 3,
            is_monospace: false,
            italic_angle: 0.0,
            ascent: 750.0,
            descent: -250.0,
            leading: 20.0,
            cap_height: Some(700.0),
            x_height: Some(500.0),
            average_width: Some(500.0),
            max_width: Some(1000.0),
            underline: Some(Decoration {
                offset: -100.0,
                thickness: 50.0,
            }),
            strikeout: Some(Decoration {
                offset: 300.0,
                thickness: 50.0,
            }),
            bounds: Some(BoundingBox {
                x_min: 0.0,
                y_min: 0.0,
                x_max: 1000.0,
                y_max: 1000.0,
            }),
        };
        assert_eq!(metrics, expected);
        let scaled = Metrics::new(&font, Size::new(2000.0), &[]);
        assert_eq!(scaled.ascent, 1500.0);
        assert_eq!(scaled.descent, -500.0);
    }

    #[test]
    fn typo_metrics_flag() {
        let os2 = tables::Os2 {
            fs_selection: selection::USE_TYPO_METRICS,
            ..Default::default()
        };
        let data = font_data(&os2, &[]);
        let font = FontRef::new(&data).unwrap();
        let metrics = Metrics::new(&font, Size::unscaled(), &[]);
        assert_eq!(
            (metrics.ascent, metrics.descent, metrics.leading),
            (800.0, -200.0, 90.0)
        );
    }

    #[test]
    fn old_os2_has_no_heights() {
        let os2 = tables::Os2 {
            version: 1,
            ..Default::default()
        };
        let data = font_data(&os2, &[]);
        let font = FontRef::new(&data).unwrap();
        let metrics = Metrics::new(&font, Size::unscaled(), &[]);
        assert_eq!(metrics.cap_height, None);
        assert_eq!(metrics.x_height, None);
    }

    /// MVAR moving the ascender by the first delta set and the descender by
    /// the second.
    fn mvar() -> BeBuffer {
        be_buffer! {
            1u16, 0u16,     // version
            0u16,           // reserved
            8u16,           // valueRecordSize
            2u16,           // valueRecordCount
            28u16,          // itemVariationStoreOffset
            (Tag::new(b"hasc")), 0u16, 0u16,
            (Tag::new(b"hdsc")), 0u16, 1u16
        }
        .extend_bytes(variations::item_variation_store().as_slice())
    }

    #[test]
    fn metrics_with_mvar() {
        let mvar = mvar();
        let data = font_data(
            &tables::Os2::default(),
            &[(raw_tables::mvar::TAG, mvar.as_slice())],
        );
        let font = FontRef::new(&data).unwrap();
        let max = Metrics::new(&font, Size::unscaled(), &[NormalizedCoord::ONE]);
        assert_eq!((max.ascent, max.descent), (850.0, -240.0));
        let min = Metrics::new(&font, Size::unscaled(), &[-NormalizedCoord::ONE]);
        assert_eq!((min.ascent, min.descent), (700.0, -230.0));
        // leading has no record
        assert_eq!(min.leading, 20.0);
    }

    #[test]
    fn glyph_metrics() {
        let data = font_data(&tables::Os2::default(), &[]);
        let font = FontRef::new(&data).unwrap();
        let glyph_metrics = GlyphMetrics::new(&font, Size::unscaled(), &[]);
        assert_eq!(glyph_metrics.glyph_count(), 3);
        let advances: Vec<_> = (0..4)
            .map(|gid| glyph_metrics.advance_width(GlyphId::new(gid)))
            .collect();
        // trailing glyphs share the last long metric
        assert_eq!(advances, [Some(500.0), Some(600.0), Some(600.0), None]);
        assert_eq!(
            glyph_metrics.left_side_bearing(GlyphId::new(2)),
            Some(30.0)
        );
        // no vertical tables
        assert_eq!(glyph_metrics.advance_height(GlyphId::new(1)), Some(1000.0));
        assert_eq!(glyph_metrics.vertical_origin(GlyphId::new(1)), Some(750.0));
        assert_eq!(glyph_metrics.bounds(GlyphId::new(1)), None);
    }

    /// HVAR without mappings: glyph ids index the first data set directly.
    fn hvar() -> BeBuffer {
        be_buffer! {
            1u16, 0u16,     // version
            20u32,          // itemVariationStoreOffset
            0u32, 0u32, 0u32
        }
        .extend_bytes(variations::item_variation_store().as_slice())
    }

    #[test]
    fn glyph_metrics_with_hvar() {
        let hvar = hvar();
        let data = font_data(
            &tables::Os2::default(),
            &[(raw_tables::hvar::HVAR_TAG, hvar.as_slice())],
        );
        let font = FontRef::new(&data).unwrap();
        let coords = [NormalizedCoord::ONE];
        let glyph_metrics = GlyphMetrics::new(&font, Size::unscaled(), &coords);
        assert_eq!(glyph_metrics.advance_width(GlyphId::new(0)), Some(600.0));
        assert_eq!(glyph_metrics.advance_width(GlyphId::new(1)), Some(610.0));
        let coords = [-NormalizedCoord::ONE];
        let glyph_metrics = GlyphMetrics::new(&font, Size::unscaled(), &coords);
        assert_eq!(glyph_metrics.advance_width(GlyphId::new(0)), Some(450.0));
        // the default location ignores HVAR
        let glyph_metrics = GlyphMetrics::new(&font, Size::unscaled(), &[]);
        assert_eq!(glyph_metrics.advance_width(GlyphId::new(0)), Some(500.0));
    }

    #[test]
    fn vertical_origin_from_vorg() {
        let vorg = be_buffer! {
            1u16, 0u16,     // version
            880i16,         // defaultVertOriginY
            1u16,           // numVertOriginYMetrics
            1u16, 900i16
        };
        let data = font_data(
            &tables::Os2::default(),
            &[(raw_tables::vorg::TAG, vorg.as_slice())],
        );
        let font = FontRef::new(&data).unwrap();
        let glyph_metrics = GlyphMetrics::new(&font, Size::new(2000.0), &[]);
        assert_eq!(glyph_metrics.vertical_origin(GlyphId::new(0)), Some(1760.0));
        assert_eq!(glyph_metrics.vertical_origin(GlyphId::new(1)), Some(1800.0));
    }
}
