//! The [COLR](https://docs.microsoft.com/en-us/typography/opentype/spec/colr) table

use std::ops::Range;

use types::{F2Dot14, Fixed, GlyphId, Tag, Uint24};

use super::variations::{DeltaSetIndexMap, ItemVariationStore};
use crate::{record, FixedRecord, FontData, FontRead, ReadError, RecordArray};

/// 'COLR'
pub const TAG: Tag = Tag::new(b"COLR");

/// Unique paint identifier used for detecting cycles in the paint graph.
pub type PaintId = usize;

record! {
    /// A version 0 base glyph with its range of layers.
    pub struct BaseGlyph {
        pub glyph_id: u16,
        pub first_layer_index: u16,
        pub num_layers: u16,
    }
}

record! {
    /// A version 0 layer: an outline glyph filled with a palette color.
    pub struct Layer {
        pub glyph_id: u16,
        pub palette_index: u16,
    }
}

/// The color table.
#[derive(Clone, Debug)]
pub struct Colr<'a> {
    data: FontData<'a>,
    version: u16,
    base_glyphs: RecordArray<'a, BaseGlyph>,
    layers: RecordArray<'a, Layer>,
}

impl<'a> FontRead<'a> for Colr<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let version: u16 = cursor.read()?;
        if version > 1 {
            return Err(ReadError::InvalidFormat(version as i64));
        }
        let num_base_glyphs: u16 = cursor.read()?;
        let base_glyphs_offset: u32 = cursor.read()?;
        let layers_offset: u32 = cursor.read()?;
        let num_layers: u16 = cursor.read()?;
        if version == 1 {
            data.check_len(34)?;
        }
        Ok(Self {
            data,
            version,
            base_glyphs: v0_records(data, base_glyphs_offset, num_base_glyphs)?,
            layers: v0_records(data, layers_offset, num_layers)?,
        })
    }
}

/// Reads a version 0 record array, which is empty when its offset is null.
fn v0_records<'a, R: FixedRecord<'a>>(
    data: FontData<'a>,
    offset: u32,
    count: u16,
) -> Result<RecordArray<'a, R>, ReadError> {
    if offset == 0 {
        Ok(RecordArray::new(FontData::default()))
    } else {
        data.read_records(offset as usize, count as usize)
    }
}

impl<'a> Colr<'a> {
    pub fn version(&self) -> u16 {
        self.version
    }

    /// Returns the COLRv0 base glyph for the given glyph identifier.
    ///
    /// The return value is a range of layer indices that can be passed to
    /// [`v0_layer`](Self::v0_layer).
    pub fn v0_base_glyph(&self, glyph_id: GlyphId) -> Option<Range<usize>> {
        let glyph_id = u16::try_from(glyph_id.to_u32()).ok()?;
        let ix = self
            .base_glyphs
            .binary_search_by_key(&glyph_id, |rec| rec.glyph_id)
            .ok()?;
        let record = self.base_glyphs.get(ix)?;
        let start = record.first_layer_index as usize;
        Some(start..start + record.num_layers as usize)
    }

    /// Returns the COLRv0 layer at the given index as an outline glyph and
    /// palette color index.
    pub fn v0_layer(&self, index: usize) -> Result<(GlyphId, u16), ReadError> {
        let layer = self.layers.get(index).ok_or(ReadError::OutOfBounds)?;
        Ok((GlyphId::from(layer.glyph_id), layer.palette_index))
    }

    fn v1_offset(&self, pos: usize) -> Option<u32> {
        if self.version < 1 {
            return None;
        }
        self.data.read_at::<u32>(pos).ok().filter(|offset| *offset != 0)
    }

    fn v1_subtable(&self, pos: usize) -> Result<Option<FontData<'a>>, ReadError> {
        self.v1_offset(pos)
            .map(|offset| {
                self.data
                    .split_off(offset as usize)
                    .ok_or(ReadError::OutOfBounds)
            })
            .transpose()
    }

    /// Returns the COLRv1 root paint for the given glyph identifier.
    pub fn v1_base_glyph(&self, glyph_id: GlyphId) -> Result<Option<PaintRef<'a>>, ReadError> {
        let Ok(glyph_id) = u16::try_from(glyph_id.to_u32()) else {
            return Ok(None);
        };
        let Some(list) = self.v1_subtable(14)? else {
            return Ok(None);
        };
        let count: u32 = list.read_at(0)?;
        let records = list.slice_len(4, count as usize * 6)?;
        let (mut lo, mut hi) = (0usize, count as usize);
        while lo < hi {
            let mid = (lo + hi) / 2;
            let record_gid: u16 = records.read_at(mid * 6)?;
            match record_gid.cmp(&glyph_id) {
                std::cmp::Ordering::Less => lo = mid + 1,
                std::cmp::Ordering::Greater => hi = mid,
                std::cmp::Ordering::Equal => {
                    let offset: u32 = records.read_at(mid * 6 + 2)?;
                    return PaintRef::new(list, offset).map(Some);
                }
            }
        }
        Ok(None)
    }

    /// The number of paints in the COLRv1 layer list.
    pub fn v1_layer_count(&self) -> Result<u32, ReadError> {
        match self.v1_subtable(18)? {
            Some(list) => list.read_at(0),
            None => Ok(0),
        }
    }

    /// Returns the COLRv1 layer at the given index.
    ///
    /// Layer indices come from paint data and are only checked here, when
    /// they are used.
    pub fn v1_layer(&self, index: usize) -> Result<PaintRef<'a>, ReadError> {
        let list = self.v1_subtable(18)?.ok_or(ReadError::NullOffset)?;
        let count: u32 = list.read_at(0)?;
        if index >= count as usize {
            return Err(ReadError::OutOfBounds);
        }
        let offset: u32 = list.read_at(4 + index * 4)?;
        PaintRef::new(list, offset)
    }

    /// Returns the COLRv1 clip box for the given glyph identifier.
    pub fn v1_clip_box(&self, glyph_id: GlyphId) -> Result<Option<ClipBox>, ReadError> {
        let Ok(glyph_id) = u16::try_from(glyph_id.to_u32()) else {
            return Ok(None);
        };
        let Some(list) = self.v1_subtable(22)? else {
            return Ok(None);
        };
        let count: u32 = list.read_at(1)?;
        let clips = list.slice_len(5, count as usize * 7)?;
        let (mut lo, mut hi) = (0usize, count as usize);
        while lo < hi {
            let mid = (lo + hi) / 2;
            let start: u16 = clips.read_at(mid * 7)?;
            let end: u16 = clips.read_at(mid * 7 + 2)?;
            if glyph_id < start {
                hi = mid;
            } else if glyph_id > end {
                lo = mid + 1;
            } else {
                let offset = clips.read_at::<Uint24>(mid * 7 + 4)?.to_u32();
                let data = list
                    .split_off(offset as usize)
                    .ok_or(ReadError::OutOfBounds)?;
                return ClipBox::read(data).map(Some);
            }
        }
        Ok(None)
    }

    /// The mapping from variation indices to delta set indices.
    pub fn var_index_map(&self) -> Option<Result<DeltaSetIndexMap<'a>, ReadError>> {
        self.data.resolve_nullable(self.v1_offset(26)?)
    }

    /// The item variation store for paint deltas.
    pub fn item_variation_store(&self) -> Option<Result<ItemVariationStore<'a>, ReadError>> {
        self.data.resolve_nullable(self.v1_offset(30)?)
    }
}

/// A clip box in font units, with an optional variation index base.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ClipBox {
    pub x_min: i16,
    pub y_min: i16,
    pub x_max: i16,
    pub y_max: i16,
    pub var_index_base: Option<u32>,
}

impl ClipBox {
    fn read(data: FontData) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let format: u8 = cursor.read()?;
        if !(1..=2).contains(&format) {
            return Err(ReadError::InvalidFormat(format as i64));
        }
        Ok(Self {
            x_min: cursor.read()?,
            y_min: cursor.read()?,
            x_max: cursor.read()?,
            y_max: cursor.read()?,
            var_index_base: if format == 2 {
                Some(cursor.read()?)
            } else {
                None
            },
        })
    }
}

/// A lazily resolved reference to a paint table.
#[derive(Copy, Clone, Debug)]
pub struct PaintRef<'a> {
    data: FontData<'a>,
}

impl<'a> PaintRef<'a> {
    fn new(base: FontData<'a>, offset: u32) -> Result<Self, ReadError> {
        if offset == 0 {
            return Err(ReadError::NullOffset);
        }
        let data = base
            .split_off(offset as usize)
            .ok_or(ReadError::OutOfBounds)?;
        Ok(Self { data })
    }

    fn at_offset24(base: FontData<'a>, pos: usize) -> Result<Self, ReadError> {
        Self::new(base, base.read_at::<Uint24>(pos)?.to_u32())
    }

    /// Identifier of this paint, for cycle detection.
    ///
    /// Two references to the same table have the same identifier.
    pub fn id(&self) -> PaintId {
        self.data.as_bytes().as_ptr() as usize
    }

    /// Decodes the referenced paint table.
    pub fn resolve(&self) -> Result<Paint<'a>, ReadError> {
        Paint::read(self.data)
    }
}

/// How a color line extends beyond its first and last stops.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Extend {
    Pad,
    Repeat,
    Reflect,
    Unknown(u8),
}

/// A color stop on a gradient color line.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ColorStop {
    pub stop_offset: F2Dot14,
    pub palette_index: u16,
    pub alpha: F2Dot14,
    pub var_index_base: Option<u32>,
}

/// A list of color stops.
#[derive(Copy, Clone, Debug)]
pub struct ColorLine<'a> {
    pub extend: Extend,
    stops: FontData<'a>,
    is_var: bool,
}

impl<'a> ColorLine<'a> {
    fn read(data: FontData<'a>, is_var: bool) -> Result<Self, ReadError> {
        let extend = match data.read_at::<u8>(0)? {
            0 => Extend::Pad,
            1 => Extend::Repeat,
            2 => Extend::Reflect,
            other => Extend::Unknown(other),
        };
        let count: u16 = data.read_at(1)?;
        let stop_len = if is_var { 10 } else { 6 };
        Ok(Self {
            extend,
            stops: data.slice_len(3, count as usize * stop_len)?,
            is_var,
        })
    }

    pub fn num_stops(&self) -> usize {
        self.stops.len() / if self.is_var { 10 } else { 6 }
    }

    pub fn stops(&self) -> impl Iterator<Item = ColorStop> + 'a {
        let mut cursor = self.stops.cursor();
        let is_var = self.is_var;
        std::iter::from_fn(move || {
            Some(ColorStop {
                stop_offset: cursor.read().ok()?,
                palette_index: cursor.read().ok()?,
                alpha: cursor.read().ok()?,
                var_index_base: if is_var {
                    Some(cursor.read().ok()?)
                } else {
                    None
                },
            })
        })
    }
}

/// A 2x3 affine transformation matrix.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Affine2x3 {
    pub xx: Fixed,
    pub yx: Fixed,
    pub xy: Fixed,
    pub yy: Fixed,
    pub dx: Fixed,
    pub dy: Fixed,
}

/// Compositing and blending modes.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CompositeMode {
    Clear,
    Src,
    Dest,
    SrcOver,
    DestOver,
    SrcIn,
    DestIn,
    SrcOut,
    DestOut,
    SrcAtop,
    DestAtop,
    Xor,
    Plus,
    Screen,
    Overlay,
    Darken,
    Lighten,
    ColorDodge,
    ColorBurn,
    HardLight,
    SoftLight,
    Difference,
    Exclusion,
    Multiply,
    HslHue,
    HslSaturation,
    HslColor,
    HslLuminosity,
    Unknown(u8),
}

impl CompositeMode {
    fn from_u8(mode: u8) -> Self {
        use CompositeMode::*;
        const MODES: [CompositeMode; 28] = [
            Clear,
            Src,
            Dest,
            SrcOver,
            DestOver,
            SrcIn,
            DestIn,
            SrcOut,
            DestOut,
            SrcAtop,
            DestAtop,
            Xor,
            Plus,
            Screen,
            Overlay,
            Darken,
            Lighten,
            ColorDodge,
            ColorBurn,
            HardLight,
            SoftLight,
            Difference,
            Exclusion,
            Multiply,
            HslHue,
            HslSaturation,
            HslColor,
            HslLuminosity,
        ];
        MODES.get(mode as usize).copied().unwrap_or(Unknown(mode))
    }
}

/// A COLRv1 paint table.
///
/// Each variable format shares a variant with its static counterpart;
/// `var_index_base` is `Some` for the variable formats.
#[derive(Clone, Debug)]
pub enum Paint<'a> {
    /// Format 1: a slice of the layer list.
    ColrLayers { num_layers: u8, first_layer_index: u32 },
    /// Formats 2 and 3.
    Solid {
        palette_index: u16,
        alpha: F2Dot14,
        var_index_base: Option<u32>,
    },
    /// Formats 4 and 5.
    LinearGradient {
        color_line: ColorLine<'a>,
        p0: (i16, i16),
        p1: (i16, i16),
        p2: (i16, i16),
        var_index_base: Option<u32>,
    },
    /// Formats 6 and 7.
    RadialGradient {
        color_line: ColorLine<'a>,
        c0: (i16, i16),
        radius0: u16,
        c1: (i16, i16),
        radius1: u16,
        var_index_base: Option<u32>,
    },
    /// Formats 8 and 9.
    SweepGradient {
        color_line: ColorLine<'a>,
        center: (i16, i16),
        start_angle: F2Dot14,
        end_angle: F2Dot14,
        var_index_base: Option<u32>,
    },
    /// Format 10: fills the outline of a glyph with the child paint.
    Glyph { paint: PaintRef<'a>, glyph_id: u16 },
    /// Format 11: reuses the paint graph of another base glyph.
    ColrGlyph { glyph_id: u16 },
    /// Formats 12 and 13.
    Transform {
        paint: PaintRef<'a>,
        transform: Affine2x3,
        var_index_base: Option<u32>,
    },
    /// Formats 14 and 15.
    Translate {
        paint: PaintRef<'a>,
        dx: i16,
        dy: i16,
        var_index_base: Option<u32>,
    },
    /// Formats 16 to 23; uniform scales repeat the scale for both axes.
    Scale {
        paint: PaintRef<'a>,
        scale_x: F2Dot14,
        scale_y: F2Dot14,
        center: Option<(i16, i16)>,
        var_index_base: Option<u32>,
    },
    /// Formats 24 to 27.
    Rotate {
        paint: PaintRef<'a>,
        angle: F2Dot14,
        center: Option<(i16, i16)>,
        var_index_base: Option<u32>,
    },
    /// Formats 28 to 31.
    Skew {
        paint: PaintRef<'a>,
        x_skew_angle: F2Dot14,
        y_skew_angle: F2Dot14,
        center: Option<(i16, i16)>,
        var_index_base: Option<u32>,
    },
    /// Format 32.
    Composite {
        source: PaintRef<'a>,
        mode: CompositeMode,
        backdrop: PaintRef<'a>,
    },
}

impl<'a> FontRead<'a> for Paint<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let format: u8 = data.read_at(0)?;
        // odd formats from 3 to 31 are the variable versions
        let is_var = (3..=31).contains(&format) && format % 2 == 1;
        let mut cursor = data.cursor();
        cursor.advance_by(1);
        macro_rules! var_base {
            () => {
                if is_var {
                    Some(cursor.read::<u32>()?)
                } else {
                    None
                }
            };
        }
        let child = |cursor: &mut crate::Cursor<'a>| -> Result<PaintRef<'a>, ReadError> {
            let pos = cursor.position();
            cursor.advance_by(3);
            PaintRef::at_offset24(data, pos)
        };
        let color_line = |cursor: &mut crate::Cursor<'a>| -> Result<ColorLine<'a>, ReadError> {
            let offset = cursor.read::<Uint24>()?.to_u32() as usize;
            let line_data = data.split_off(offset).ok_or(ReadError::OutOfBounds)?;
            ColorLine::read(line_data, is_var)
        };
        let point = |cursor: &mut crate::Cursor<'a>| -> Result<(i16, i16), ReadError> {
            Ok((cursor.read()?, cursor.read()?))
        };
        Ok(match format {
            1 => Paint::ColrLayers {
                num_layers: cursor.read()?,
                first_layer_index: cursor.read()?,
            },
            2 | 3 => Paint::Solid {
                palette_index: cursor.read()?,
                alpha: cursor.read()?,
                var_index_base: var_base!(),
            },
            4 | 5 => Paint::LinearGradient {
                color_line: color_line(&mut cursor)?,
                p0: point(&mut cursor)?,
                p1: point(&mut cursor)?,
                p2: point(&mut cursor)?,
                var_index_base: var_base!(),
            },
            6 | 7 => Paint::RadialGradient {
                color_line: color_line(&mut cursor)?,
                c0: point(&mut cursor)?,
                radius0: cursor.read()?,
                c1: point(&mut cursor)?,
                radius1: cursor.read()?,
                var_index_base: var_base!(),
            },
            8 | 9 => Paint::SweepGradient {
                color_line: color_line(&mut cursor)?,
                center: point(&mut cursor)?,
                start_angle: cursor.read()?,
                end_angle: cursor.read()?,
                var_index_base: var_base!(),
            },
            10 => Paint::Glyph {
                paint: child(&mut cursor)?,
                glyph_id: cursor.read()?,
            },
            11 => Paint::ColrGlyph {
                glyph_id: cursor.read()?,
            },
            12 | 13 => {
                let paint = child(&mut cursor)?;
                let offset = cursor.read::<Uint24>()?.to_u32() as usize;
                let mut affine = data
                    .split_off(offset)
                    .ok_or(ReadError::OutOfBounds)?
                    .cursor();
                let transform = Affine2x3 {
                    xx: affine.read()?,
                    yx: affine.read()?,
                    xy: affine.read()?,
                    yy: affine.read()?,
                    dx: affine.read()?,
                    dy: affine.read()?,
                };
                let var_index_base = if is_var {
                    Some(affine.read::<u32>()?)
                } else {
                    None
                };
                Paint::Transform {
                    paint,
                    transform,
                    var_index_base,
                }
            }
            14 | 15 => Paint::Translate {
                paint: child(&mut cursor)?,
                dx: cursor.read()?,
                dy: cursor.read()?,
                var_index_base: var_base!(),
            },
            16..=23 => {
                let paint = child(&mut cursor)?;
                let uniform = format >= 20;
                let scale_x: F2Dot14 = cursor.read()?;
                let scale_y = if uniform { scale_x } else { cursor.read()? };
                let around_center = matches!(format, 18 | 19 | 22 | 23);
                let center = if around_center {
                    Some(point(&mut cursor)?)
                } else {
                    None
                };
                Paint::Scale {
                    paint,
                    scale_x,
                    scale_y,
                    center,
                    var_index_base: var_base!(),
                }
            }
            24..=27 => {
                let paint = child(&mut cursor)?;
                let angle = cursor.read()?;
                let center = if format >= 26 {
                    Some(point(&mut cursor)?)
                } else {
                    None
                };
                Paint::Rotate {
                    paint,
                    angle,
                    center,
                    var_index_base: var_base!(),
                }
            }
            28..=31 => {
                let paint = child(&mut cursor)?;
                let x_skew_angle = cursor.read()?;
                let y_skew_angle = cursor.read()?;
                let center = if format >= 30 {
                    Some(point(&mut cursor)?)
                } else {
                    None
                };
                Paint::Skew {
                    paint,
                    x_skew_angle,
                    y_skew_angle,
                    center,
                    var_index_base: var_base!(),
                }
            }
            32 => Paint::Composite {
                source: child(&mut cursor)?,
                mode: CompositeMode::from_u8(cursor.read()?),
                backdrop: child(&mut cursor)?,
            },
            _ => return Err(ReadError::InvalidFormat(format as i64)),
        })
    }
}
