//! Color and bitmap glyph images.
//!
//! A glyph may be represented by a vector outline, an SVG document or a
//! raster image from one of the bitmap tables (`sbix`, `CBDT`/`CBLC` or
//! `EBDT`/`EBLC`).

use opentype::{
    tables::{
        bitmap::{Bdt, BitmapContent, BitmapDataFormat, BitmapMetrics, BitmapSize, Blc},
        sbix::Sbix,
        svg::Svg,
    },
    types::{GlyphId, PenCommand, Tag},
    FontData, FontRef, TableProvider,
};

const PNG: Tag = Tag::new(b"png ");
const JPG: Tag = Tag::new(b"jpg ");
const TIFF: Tag = Tag::new(b"tiff");

/// The representation of a single glyph.
#[derive(Clone, PartialEq, Debug)]
pub enum GlyphData<'a> {
    /// Path commands in font units.
    Outline(Vec<PenCommand>),
    /// A raster image.
    Bitmap(Bitmap<'a>),
    /// An SVG document, possibly gzip compressed, containing the glyph.
    Svg(&'a [u8]),
}

/// Encoding of the pixels of a [`Bitmap`].
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum BitmapFormat {
    /// Uncompressed gray or monochrome pixels with the given bit depth.
    ///
    /// When `byte_aligned` is true each row starts on a byte boundary,
    /// otherwise rows are tightly packed.
    Mask { bit_depth: u8, byte_aligned: bool },
    Png,
    Jpg,
    Tiff,
}

/// A raster glyph image with its placement.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Bitmap<'a> {
    pub format: BitmapFormat,
    pub data: &'a [u8],
    /// Width of the image in pixels.
    pub width: u32,
    /// Height of the image in pixels.
    pub height: u32,
    /// Pixels per em of the strike containing the image.
    pub ppem_x: u16,
    pub ppem_y: u16,
    /// Horizontal distance from the origin to the left edge of the image.
    pub bearing_x: i16,
    /// Vertical distance from the baseline to the top edge of the image.
    pub bearing_y: i16,
    /// Horizontal advance in pixels, when the strike provides one.
    pub advance: Option<u16>,
}

/// Bitmap and SVG sources of a font.
#[derive(Clone)]
pub struct GlyphImages<'a> {
    sbix: Option<Sbix<'a>>,
    color: Option<(Blc<'a>, Bdt<'a>)>,
    mono: Option<(Blc<'a>, Bdt<'a>)>,
    svg: Option<Svg<'a>>,
}

impl<'a> GlyphImages<'a> {
    pub fn new(font: &FontRef<'a>) -> Self {
        let pair = |blc: Result<Blc<'a>, _>, bdt: Result<Bdt<'a>, _>| match (blc, bdt) {
            (Ok(blc), Ok(bdt)) => Some((blc, bdt)),
            _ => None,
        };
        Self {
            sbix: font.sbix().ok(),
            color: pair(font.cblc(), font.cbdt()),
            mono: pair(font.eblc(), font.ebdt()),
            svg: font.svg().ok(),
        }
    }

    /// Returns true if the font has an `sbix` table.
    pub fn has_sbix(&self) -> bool {
        self.sbix.is_some()
    }

    /// Returns true if the font has any bitmap table.
    pub fn has_bitmaps(&self) -> bool {
        self.sbix.is_some() || self.color.is_some() || self.mono.is_some()
    }

    /// Returns the image for the glyph from the `sbix` strike that best
    /// matches `ppem`.
    ///
    /// A `ppem` of zero selects the largest strike.
    pub fn sbix_bitmap(&self, glyph_id: GlyphId, ppem: u16) -> Option<Bitmap<'a>> {
        let sbix = self.sbix.as_ref()?;
        let ppem = if ppem == 0 { u16::MAX } else { ppem };
        let strike = sbix.best_strike(ppem)?;
        let mut glyph = strike.glyph_data(glyph_id).ok()??;
        if let Some(target) = glyph.dupe_glyph() {
            // duplicates are resolved once
            glyph = strike.glyph_data(target).ok()??;
        }
        let format = match glyph.graphic_type {
            PNG => BitmapFormat::Png,
            JPG => BitmapFormat::Jpg,
            TIFF => BitmapFormat::Tiff,
            other => {
                log::debug!("unsupported sbix graphic type {other} for glyph {glyph_id}");
                return None;
            }
        };
        let (width, height) = match format {
            BitmapFormat::Png => png_size(glyph.data).unwrap_or_default(),
            _ => (0, 0),
        };
        Some(Bitmap {
            format,
            data: glyph.data,
            width,
            height,
            ppem_x: strike.ppem(),
            ppem_y: strike.ppem(),
            bearing_x: glyph.origin_offset_x,
            bearing_y: glyph.origin_offset_y.saturating_add(height as i16),
            advance: None,
        })
    }

    /// Returns the image for the glyph from the `CBDT` or `EBDT` strike
    /// that best matches `ppem`, preferring color data.
    pub fn strike_bitmap(&self, glyph_id: GlyphId, ppem: u16) -> Option<Bitmap<'a>> {
        let ppem = if ppem == 0 { u8::MAX } else { ppem.min(u8::MAX as u16) as u8 };
        [&self.color, &self.mono]
            .into_iter()
            .flatten()
            .find_map(|(blc, bdt)| {
                let size = blc.best_size(ppem)?;
                strike_bitmap(blc, bdt, &size, glyph_id)
            })
    }

    /// Returns the best bitmap for the glyph at `ppem`.
    pub fn bitmap(&self, glyph_id: GlyphId, ppem: u16) -> Option<Bitmap<'a>> {
        self.sbix_bitmap(glyph_id, ppem)
            .or_else(|| self.strike_bitmap(glyph_id, ppem))
    }

    /// Returns the SVG document containing the glyph.
    pub fn svg(&self, glyph_id: GlyphId) -> Option<&'a [u8]> {
        self.svg.as_ref()?.glyph_data(glyph_id).ok()?
    }
}

fn strike_bitmap<'a>(
    blc: &Blc<'a>,
    bdt: &Bdt<'a>,
    size: &BitmapSize,
    glyph_id: GlyphId,
) -> Option<Bitmap<'a>> {
    let location = blc.location(size, glyph_id).ok()?;
    let bitmap = match bdt.data(&location) {
        Ok(bitmap) => bitmap,
        Err(e) => {
            log::debug!("ignoring bitmap for glyph {glyph_id}: {e}");
            return None;
        }
    };
    let (width, height, bearing_x, bearing_y, advance) = match bitmap.metrics {
        BitmapMetrics::Small(m) => (m.width, m.height, m.bearing_x, m.bearing_y, m.advance),
        BitmapMetrics::Big(m) => (
            m.width,
            m.height,
            m.hori_bearing_x,
            m.hori_bearing_y,
            m.hori_advance,
        ),
    };
    let (format, data) = match bitmap.content {
        BitmapContent::Data(BitmapDataFormat::Png, data) => (BitmapFormat::Png, data),
        BitmapContent::Data(format, data) => (
            BitmapFormat::Mask {
                bit_depth: location.bit_depth,
                byte_aligned: format == BitmapDataFormat::ByteAligned,
            },
            data,
        ),
        BitmapContent::Composite(_) => {
            log::debug!("composite bitmaps are not supported (glyph {glyph_id})");
            return None;
        }
    };
    Some(Bitmap {
        format,
        data,
        width: width as u32,
        height: height as u32,
        ppem_x: size.ppem_x as u16,
        ppem_y: size.ppem_y as u16,
        bearing_x: bearing_x as i16,
        bearing_y: bearing_y as i16,
        advance: Some(advance as u16),
    })
}

/// Reads the image dimensions from the IHDR chunk of a PNG file.
fn png_size(data: &[u8]) -> Option<(u32, u32)> {
    const SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];
    if data.get(..8)? != SIGNATURE || data.get(12..16)? != b"IHDR" {
        return None;
    }
    let data = FontData::new(data);
    Some((data.read_at(16).ok()?, data.read_at(20).ok()?))
}
