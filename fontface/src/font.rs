//! A parsed font and its immutable lookup structures.

use opentype::{
    tables::{
        cmap, head, kern::Kern, kerx::Kerx, maxp, name::name_id, post::Post, trak::Trak,
    },
    types::{Fixed, GlyphId, Tag},
    CollectionRef, FileRef, FontRef, ReadError, TableProvider,
};

use crate::{
    charmap::Charmap,
    error::LoadError,
    glyph_data::{GlyphData, GlyphImages},
    metrics::{GlyphMetrics, Metrics},
    outline::Outlines,
    size::Size,
    variation::Axes,
    NormalizedCoord,
};

/// A font loaded from memory.
///
/// All tables borrow from the font data, which must outlive the `Font`.
/// A font is immutable; the per-size and per-location state lives in a
/// [`Face`](crate::Face), and several faces may share one font.
#[derive(Clone)]
pub struct Font<'a> {
    font: FontRef<'a>,
    units_per_em: u16,
    glyph_count: u32,
    charmap: Charmap<'a>,
    axes: Axes<'a>,
    outlines: Outlines<'a>,
    images: GlyphImages<'a>,
    post: Option<Post<'a>>,
    kern: Option<Kern<'a>>,
    kerx: Option<Kerx<'a>>,
    trak: Option<Trak<'a>>,
}

impl<'a> Font<'a> {
    /// Loads a font from the given data.
    ///
    /// For collections, the first member is loaded.
    pub fn load(data: &'a [u8]) -> Result<Self, LoadError> {
        match FileRef::new(data).map_err(LoadError::File)? {
            FileRef::Font(font) => Self::new(font),
            FileRef::Collection(collection) => Self::load_member(&collection, 0),
        }
    }

    /// Loads every font contained in the given data.
    ///
    /// A single font produces one entry. A member of a collection that fails
    /// to load does not prevent loading its siblings.
    pub fn load_collection(data: &'a [u8]) -> Vec<Result<Self, LoadError>> {
        match FileRef::new(data) {
            Err(e) => vec![Err(LoadError::File(e))],
            Ok(FileRef::Font(font)) => vec![Self::new(font)],
            Ok(FileRef::Collection(collection)) => (0..collection.len())
                .map(|index| Self::load_member(&collection, index))
                .collect(),
        }
    }

    fn load_member(collection: &CollectionRef<'a>, index: u32) -> Result<Self, LoadError> {
        let font = collection
            .get(index)
            .map_err(|source| LoadError::Member { index, source })?;
        Self::new(font)
    }

    /// Creates a font from a reference to its table directory.
    ///
    /// The `head`, `maxp` and `cmap` tables are required.
    pub fn new(font: FontRef<'a>) -> Result<Self, LoadError> {
        let index = font.ttc_index();
        let units_per_em = font
            .head()
            .map_err(|e| LoadError::table(head::TAG, index, e))?
            .units_per_em();
        let glyph_count = font
            .maxp()
            .map_err(|e| LoadError::table(maxp::TAG, index, e))?
            .num_glyphs() as u32;
        let charmap =
            Charmap::from_font(&font).map_err(|e| LoadError::table(cmap::TAG, index, e))?;
        Ok(Self {
            units_per_em,
            glyph_count,
            charmap,
            axes: Axes::new(&font),
            outlines: Outlines::new(&font),
            images: GlyphImages::new(&font),
            post: optional(opentype::tables::post::TAG, font.post()),
            kern: optional(opentype::tables::kern::TAG, font.kern()),
            kerx: optional(opentype::tables::kerx::TAG, font.kerx()),
            trak: optional(opentype::tables::trak::TAG, font.trak()),
            font,
        })
    }

    /// Returns the underlying table provider.
    pub fn font_ref(&self) -> &FontRef<'a> {
        &self.font
    }

    /// Returns the position of the font in its collection.
    pub fn collection_index(&self) -> Option<u32> {
        self.font.ttc_index()
    }

    pub fn units_per_em(&self) -> u16 {
        self.units_per_em
    }

    /// Returns the number of glyphs declared by `maxp`.
    pub fn glyph_count(&self) -> u32 {
        self.glyph_count
    }

    /// Returns the character map.
    pub fn charmap(&self) -> &Charmap<'a> {
        &self.charmap
    }

    /// Returns the variation axes.
    pub fn axes(&self) -> &Axes<'a> {
        &self.axes
    }

    /// Returns the vector outlines.
    pub fn outlines(&self) -> &Outlines<'a> {
        &self.outlines
    }

    /// Returns the bitmap and SVG glyph images.
    pub fn images(&self) -> &GlyphImages<'a> {
        &self.images
    }

    /// Maps a character to its nominal glyph.
    pub fn nominal_glyph(&self, ch: impl Into<u32>) -> Option<GlyphId> {
        self.charmap.map(ch)
    }

    /// Returns the PostScript name of the glyph from the `post` table.
    pub fn glyph_name(&self, glyph_id: GlyphId) -> Option<&'a str> {
        self.post.as_ref()?.glyph_name(glyph_id)
    }

    /// Returns the family name from the `name` table, preferring the
    /// typographic family.
    pub fn family_name(&self) -> Option<String> {
        let name = self.font.name().ok()?;
        name.find(name_id::TYPOGRAPHIC_FAMILY_NAME)
            .or_else(|| name.find(name_id::FAMILY_NAME))
    }

    /// Returns the global metrics at the size and location.
    pub fn metrics(&self, size: Size, coords: &[NormalizedCoord]) -> Metrics {
        Metrics::new(&self.font, size, coords)
    }

    /// Returns the per-glyph metrics at the size and location.
    pub fn glyph_metrics<'c>(&self, size: Size, coords: &'c [NormalizedCoord]) -> GlyphMetrics<'c>
    where
        'a: 'c,
    {
        GlyphMetrics::new(&self.font, size, coords)
    }

    /// Returns the horizontal kerning adjustment, in font units, between two
    /// glyphs.
    ///
    /// An AAT `kerx` table takes precedence over `kern`. Pairs without an
    /// entry, and fonts without either table, produce zero.
    pub fn kerning(&self, left: GlyphId, right: GlyphId) -> i32 {
        if let Some(kerx) = &self.kerx {
            return kerx
                .subtables()
                .filter_map(|subtable| {
                    subtable
                        .map_err(|e| log::debug!("skipping kerx subtable: {e}"))
                        .ok()
                })
                .filter(|subtable| {
                    subtable.is_horizontal()
                        && !subtable.is_cross_stream()
                        && !subtable.is_variable()
                })
                .filter_map(|subtable| subtable.kind().ok()?.kerning(left, right))
                .sum();
        }
        let Some(kern) = &self.kern else {
            return 0;
        };
        let mut value = 0;
        for subtable in kern.subtables() {
            let subtable = match subtable {
                Ok(subtable) => subtable,
                Err(e) => {
                    log::debug!("skipping kern subtable: {e}");
                    continue;
                }
            };
            if !subtable.is_horizontal() || subtable.is_cross_stream() || subtable.is_variable() {
                continue;
            }
            let kind = match subtable.kind() {
                Ok(kind) => kind,
                Err(e) => {
                    log::debug!("skipping kern subtable: {e}");
                    continue;
                }
            };
            if let Some(adjustment) = kind.kerning(left, right) {
                if subtable.is_override() {
                    value = adjustment as i32;
                } else {
                    value += adjustment as i32;
                }
            }
        }
        value
    }

    /// Returns the horizontal tracking adjustment, in font units, of the
    /// normal track at the given point size.
    pub fn tracking(&self, point_size: f32) -> f32 {
        self.trak
            .as_ref()
            .and_then(|trak| trak.horiz()?.ok())
            .and_then(|track| track.tracking(Fixed::ZERO, point_size))
            .unwrap_or_default()
    }

    /// Returns the representation of the glyph at the given ppem and
    /// location.
    ///
    /// Bitmaps (`sbix`, then `CBDT`/`EBDT`) are preferred, then SVG
    /// documents and finally vector outlines in font units. A `ppem` of zero
    /// selects the largest bitmap strike.
    pub fn glyph_data(
        &self,
        glyph_id: GlyphId,
        ppem: u16,
        coords: &[NormalizedCoord],
    ) -> Option<GlyphData<'a>> {
        if glyph_id.to_u32() >= self.glyph_count {
            return None;
        }
        if let Some(bitmap) = self.images.bitmap(glyph_id, ppem) {
            return Some(GlyphData::Bitmap(bitmap));
        }
        if let Some(document) = self.images.svg(glyph_id) {
            return Some(GlyphData::Svg(document));
        }
        let mut commands = Vec::new();
        self.outlines
            .draw(glyph_id, Size::unscaled(), coords, &mut commands)
            .map_err(|e| log::debug!("no outline for glyph {glyph_id}: {e}"))
            .ok()?;
        Some(GlyphData::Outline(commands))
    }
}

/// Treats a missing table as absent and logs tables that fail to parse.
fn optional<T>(tag: Tag, table: Result<T, ReadError>) -> Option<T> {
    match table {
        Ok(table) => Some(table),
        Err(ReadError::TableIsMissing(_)) => None,
        Err(e) => {
            log::warn!("ignoring malformed {tag} table: {e}");
            None
        }
    }
}
