//! A font paired with a size and a location in variation space.
//!
//! A [`Face`] adds mutable state to a shared [`Font`]: the device ppem used
//! to select bitmap strikes, the normalized variation coordinates and a
//! cache of glyph extents computed for those settings. The state is guarded
//! by a single reader/writer lock so a face may be queried from several
//! threads while another thread changes its settings. Every change clears
//! the cache before the lock is released, so a query observes either the
//! old settings with the old extents or the new settings with the new ones.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use opentype::types::{BoundingBox, GlyphId};

use crate::{
    charmap::GlyphVariant,
    font::Font,
    glyph_data::{Bitmap, GlyphData},
    metrics::Metrics,
    setting::Variation,
    size::Size,
    NormalizedCoord,
};

/// Ink bounds of a glyph in font units.
///
/// `y_bearing` is the distance from the baseline to the top of the glyph
/// and `height` extends downwards from there, so it is negative for any
/// glyph with ink.
#[derive(Copy, Clone, PartialEq, Default, Debug)]
pub struct GlyphExtents {
    pub x_bearing: f32,
    pub y_bearing: f32,
    pub width: f32,
    pub height: f32,
}

impl GlyphExtents {
    fn from_bounds(bounds: BoundingBox<f32>) -> Self {
        Self {
            x_bearing: bounds.x_min,
            y_bearing: bounds.y_max,
            width: bounds.x_max - bounds.x_min,
            height: bounds.y_min - bounds.y_max,
        }
    }

    fn from_bitmap(bitmap: &Bitmap, units_per_em: u16) -> Self {
        let x_scale = units_per_em as f32 / bitmap.ppem_x.max(1) as f32;
        let y_scale = units_per_em as f32 / bitmap.ppem_y.max(1) as f32;
        Self {
            x_bearing: bitmap.bearing_x as f32 * x_scale,
            y_bearing: bitmap.bearing_y as f32 * y_scale,
            width: bitmap.width as f32 * x_scale,
            height: -(bitmap.height as f32) * y_scale,
        }
    }
}

/// Settings that affect glyph extents.
#[derive(Clone, Default, Debug)]
struct Settings {
    x_ppem: u16,
    y_ppem: u16,
    coords: Vec<NormalizedCoord>,
}

/// Settings and the extents computed for them.
#[derive(Debug)]
struct State {
    settings: Settings,
    extents: Vec<Option<GlyphExtents>>,
    /// Incremented whenever the settings change.
    generation: u64,
}

impl State {
    fn cached(&self, glyph_id: GlyphId) -> Option<GlyphExtents> {
        *self.extents.get(glyph_id.to_usize())?
    }

    fn store(&mut self, glyph_id: GlyphId, extents: GlyphExtents) {
        if let Some(slot) = self.extents.get_mut(glyph_id.to_usize()) {
            *slot = Some(extents);
        }
    }

    fn update(&mut self, f: impl FnOnce(&mut Settings)) {
        f(&mut self.settings);
        self.extents.iter_mut().for_each(|slot| *slot = None);
        self.generation = self.generation.wrapping_add(1);
    }
}

impl std::fmt::Debug for Face<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.read();
        f.debug_struct("Face")
            .field("collection_index", &self.font.collection_index())
            .field("glyph_count", &self.font.glyph_count())
            .field("settings", &state.settings)
            .finish_non_exhaustive()
    }
}

/// A font at a particular ppem and variation location.
pub struct Face<'a> {
    font: Arc<Font<'a>>,
    state: RwLock<State>,
}

impl<'a> Face<'a> {
    /// Creates a face at the default location with no ppem set.
    pub fn new(font: impl Into<Arc<Font<'a>>>) -> Self {
        let font = font.into();
        let state = State {
            settings: Settings::default(),
            extents: vec![None; font.glyph_count() as usize],
            generation: 0,
        };
        Self {
            font,
            state: RwLock::new(state),
        }
    }

    /// Returns the underlying font.
    pub fn font(&self) -> &Arc<Font<'a>> {
        &self.font
    }

    fn read(&self) -> RwLockReadGuard<'_, State> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, State> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the horizontal and vertical pixels per em.
    pub fn ppem(&self) -> (u16, u16) {
        let state = self.read();
        (state.settings.x_ppem, state.settings.y_ppem)
    }

    /// Sets the pixels per em used to select bitmap strikes.
    ///
    /// Zero selects the largest strikes.
    pub fn set_ppem(&self, x_ppem: u16, y_ppem: u16) {
        self.write().update(|settings| {
            settings.x_ppem = x_ppem;
            settings.y_ppem = y_ppem;
        });
    }

    /// Returns the normalized variation coordinates, one per axis.
    pub fn coords(&self) -> Vec<NormalizedCoord> {
        self.read().settings.coords.clone()
    }

    /// Sets the normalized variation coordinates.
    ///
    /// Coordinates beyond the number of axes are dropped and missing ones
    /// default to zero.
    pub fn set_coords(&self, coords: &[NormalizedCoord]) {
        let mut coords = coords.to_vec();
        coords.resize(self.font.axes().len(), NormalizedCoord::ZERO);
        if coords.iter().all(|coord| *coord == NormalizedCoord::ZERO) {
            coords.clear();
        }
        self.write().update(|settings| settings.coords = coords);
    }

    /// Sets the variation location from user space settings.
    ///
    /// Settings for axes missing from the font are ignored.
    pub fn set_variations<I>(&self, settings: I)
    where
        I: IntoIterator,
        I::Item: Into<Variation>,
    {
        let coords = self.font.axes().location(settings);
        self.set_coords(&coords);
    }

    /// Moves to the location of the named instance at `index`.
    ///
    /// Returns false, leaving the location unchanged, if there is no such
    /// instance.
    pub fn set_named_instance(&self, index: usize) -> bool {
        let Some(instance) = self.font.axes().named_instance(index) else {
            return false;
        };
        self.set_coords(&instance.location());
        true
    }

    /// Maps a character to its nominal glyph.
    pub fn nominal_glyph(&self, ch: impl Into<u32>) -> Option<GlyphId> {
        self.font.nominal_glyph(ch)
    }

    /// Maps a character followed by a variation selector to a glyph.
    pub fn variation_glyph(&self, ch: impl Into<u32>, selector: impl Into<u32>) -> Option<GlyphId> {
        let ch = ch.into();
        match self.font.charmap().map_variant(ch, selector) {
            GlyphVariant::Found(glyph_id) => Some(glyph_id),
            GlyphVariant::UseDefault => self.font.nominal_glyph(ch),
            GlyphVariant::NotFound => None,
        }
    }

    /// Returns the global metrics in font units at the current location.
    pub fn metrics(&self) -> Metrics {
        let state = self.read();
        self.font.metrics(Size::unscaled(), &state.settings.coords)
    }

    /// Returns the advance width of the glyph in font units at the current
    /// location.
    pub fn horizontal_advance(&self, glyph_id: GlyphId) -> Option<f32> {
        let state = self.read();
        self.font
            .glyph_metrics(Size::unscaled(), &state.settings.coords)
            .advance_width(glyph_id)
    }

    /// Returns the advance height of the glyph in font units at the current
    /// location.
    pub fn vertical_advance(&self, glyph_id: GlyphId) -> Option<f32> {
        let state = self.read();
        self.font
            .glyph_metrics(Size::unscaled(), &state.settings.coords)
            .advance_height(glyph_id)
    }

    /// Returns the representation of the glyph for the current ppem and
    /// location.
    pub fn glyph_data(&self, glyph_id: GlyphId) -> Option<GlyphData<'a>> {
        let state = self.read();
        self.font
            .glyph_data(glyph_id, state.settings.y_ppem, &state.settings.coords)
    }

    /// Returns the ink extents of the glyph in font units.
    ///
    /// The sources are tried in order: `sbix` bitmaps, vector outlines
    /// (`glyf`, `CFF2`, then `CFF `) and finally `CBDT`/`EBDT` bitmaps.
    /// Results are cached until the ppem or location changes.
    pub fn glyph_extents(&self, glyph_id: GlyphId) -> Option<GlyphExtents> {
        let (extents, generation) = {
            let state = self.read();
            if let Some(extents) = state.cached(glyph_id) {
                return Some(extents);
            }
            (
                self.compute_extents(glyph_id, &state.settings)?,
                state.generation,
            )
        };
        let mut state = self.write();
        // settings changed while computing
        if state.generation == generation {
            state.store(glyph_id, extents);
        }
        Some(extents)
    }

    fn compute_extents(&self, glyph_id: GlyphId, settings: &Settings) -> Option<GlyphExtents> {
        if glyph_id.to_u32() >= self.font.glyph_count() {
            return None;
        }
        let images = self.font.images();
        let units_per_em = self.font.units_per_em();
        if let Some(bitmap) = images.sbix_bitmap(glyph_id, settings.y_ppem) {
            return Some(GlyphExtents::from_bitmap(&bitmap, units_per_em));
        }
        match self.font.outlines().control_box(glyph_id, &settings.coords) {
            Ok(bounds) => return Some(GlyphExtents::from_bounds(bounds)),
            Err(e) => log::debug!("no outline extents for glyph {glyph_id}: {e}"),
        }
        images
            .strike_bitmap(glyph_id, settings.y_ppem)
            .map(|bitmap| GlyphExtents::from_bitmap(&bitmap, units_per_em))
    }
}

#[cfg(test)]
mod tests {
    use font_test_data::{
        build_font, fonts,
        tables,
        variations::fvar_wght_wdth,
    };
    use opentype::{tables as raw_tables, types::TT_SFNT_VERSION};
    use pretty_assertions::assert_eq;

    use super::*;

    fn gid(id: u32) -> GlyphId {
        GlyphId::new(id)
    }

    const TRIANGLE: GlyphExtents = GlyphExtents {
        x_bearing: 0.0,
        y_bearing: 300.0,
        width: 205.0,
        height: -300.0,
    };

    #[test]
    fn outline_extents() {
        let data = fonts::glyf_font();
        let face = Face::new(Font::load(&data).unwrap());
        assert_eq!(face.glyph_extents(gid(1)), Some(TRIANGLE));
        assert_eq!(face.glyph_extents(gid(0)), Some(GlyphExtents::default()));
        assert_eq!(face.glyph_extents(gid(4)), None);
        assert_eq!(face.glyph_extents(gid(u32::MAX)), None);
    }

    #[test]
    fn settings_clear_the_cache() {
        let data = fonts::glyf_font();
        let face = Face::new(Font::load(&data).unwrap());
        face.glyph_extents(gid(1));
        assert_eq!(face.read().cached(gid(1)), Some(TRIANGLE));
        face.set_ppem(12, 12);
        assert_eq!(face.ppem(), (12, 12));
        assert_eq!(face.read().cached(gid(1)), None);
        face.glyph_extents(gid(1));
        face.set_coords(&[]);
        assert_eq!(face.read().cached(gid(1)), None);
        // out of range glyphs never touch the cache
        face.write().store(gid(100), TRIANGLE);
        assert_eq!(face.read().extents.len(), 4);
    }

    #[test]
    fn advances_and_metrics() {
        let data = fonts::glyf_font();
        let face = Face::new(Font::load(&data).unwrap());
        assert_eq!(face.horizontal_advance(gid(2)), Some(700.0));
        assert_eq!(face.horizontal_advance(gid(9)), None);
        assert_eq!(face.nominal_glyph('A'), Some(gid(1)));
        assert_eq!(face.variation_glyph('A', 0xFE0Fu32), None);
        let metrics = face.metrics();
        assert_eq!(metrics.units_per_em, 1000);
        assert_eq!(metrics.ascent, 800.0);
    }

    fn variable_font() -> Vec<u8> {
        let head = tables::head(1000, false);
        let maxp = tables::maxp(1);
        let cmap4 = fonts::abc_cmap4();
        let cmap = font_test_data::cmap::cmap_table(&[(3, 1, cmap4.as_slice())]);
        let fvar = fvar_wght_wdth();
        build_font(
            TT_SFNT_VERSION,
            &[
                (raw_tables::cmap::TAG, &cmap),
                (raw_tables::fvar::TAG, fvar.as_slice()),
                (raw_tables::head::TAG, head.as_slice()),
                (raw_tables::maxp::TAG, maxp.as_slice()),
            ],
        )
    }

    #[test]
    fn variation_settings() {
        let data = variable_font();
        let face = Face::new(Font::load(&data).unwrap());
        assert!(face.coords().is_empty());
        face.set_variations([("wght", 900.0f32)]);
        assert_eq!(
            face.coords(),
            [NormalizedCoord::ONE, NormalizedCoord::ZERO]
        );
        assert!(face.set_named_instance(0));
        let coords = face.coords();
        assert!((coords[0].to_f32() - 0.6).abs() < 0.001);
        assert_eq!(coords[1], NormalizedCoord::ZERO);
        assert!(!face.set_named_instance(2));
        assert_eq!(face.coords(), coords);
        // extra coordinates are dropped
        face.set_coords(&[NormalizedCoord::ONE; 3]);
        assert_eq!(face.coords().len(), 2);
        face.set_variations([("wght", 400.0f32)]);
        assert!(face.coords().is_empty());
    }

    #[test]
    fn concurrent_queries_and_updates() {
        let _ = env_logger::builder().is_test(true).try_init();
        let data = fonts::glyf_font();
        let face = Face::new(Font::load(&data).unwrap());
        std::thread::scope(|scope| {
            for _ in 0..4 {
                scope.spawn(|| {
                    for i in 0..500 {
                        let extents = face.glyph_extents(gid(1 + i % 3)).unwrap();
                        assert!(extents.width >= 0.0);
                        assert_eq!(face.glyph_extents(gid(1)), Some(TRIANGLE));
                    }
                });
            }
            scope.spawn(|| {
                for i in 0..500u16 {
                    face.set_ppem(i, i);
                    face.set_coords(&[]);
                }
            });
        });
        assert_eq!(face.ppem(), (499, 499));
    }
}
