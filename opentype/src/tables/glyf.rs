//! The [glyf (Glyph Data)](https://docs.microsoft.com/en-us/typography/opentype/spec/glyf) table

use types::{BoundingBox, F2Dot14, GlyphId, GlyphId16, Point, Tag};

use crate::{Array, Cursor, FontData, FontRead, ReadError};

/// 'glyf'
pub const TAG: Tag = Tag::new(b"glyf");

/// The glyph data table. Glyphs are located through [`Loca`](super::loca::Loca).
#[derive(Clone, Debug)]
pub struct Glyf<'a> {
    data: FontData<'a>,
}

impl<'a> FontRead<'a> for Glyf<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        Ok(Glyf { data })
    }
}

impl<'a> Glyf<'a> {
    pub fn offset_data(&self) -> FontData<'a> {
        self.data
    }
}

/// Flags for points of a simple glyph.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SimpleGlyphFlags(u8);

impl SimpleGlyphFlags {
    pub const ON_CURVE_POINT: Self = Self(0x01);
    pub const X_SHORT_VECTOR: Self = Self(0x02);
    pub const Y_SHORT_VECTOR: Self = Self(0x04);
    pub const REPEAT_FLAG: Self = Self(0x08);
    pub const X_IS_SAME_OR_POSITIVE_X_SHORT_VECTOR: Self = Self(0x10);
    pub const Y_IS_SAME_OR_POSITIVE_Y_SHORT_VECTOR: Self = Self(0x20);
    pub const OVERLAP_SIMPLE: Self = Self(0x40);

    pub const fn from_bits_truncate(bits: u8) -> Self {
        Self(bits & 0x7F)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

/// Flags for a component of a composite glyph.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CompositeGlyphFlags(u16);

impl CompositeGlyphFlags {
    pub const ARG_1_AND_2_ARE_WORDS: Self = Self(0x0001);
    pub const ARGS_ARE_XY_VALUES: Self = Self(0x0002);
    pub const ROUND_XY_TO_GRID: Self = Self(0x0004);
    pub const WE_HAVE_A_SCALE: Self = Self(0x0008);
    pub const MORE_COMPONENTS: Self = Self(0x0020);
    pub const WE_HAVE_AN_X_AND_Y_SCALE: Self = Self(0x0040);
    pub const WE_HAVE_A_TWO_BY_TWO: Self = Self(0x0080);
    pub const WE_HAVE_INSTRUCTIONS: Self = Self(0x0100);
    pub const USE_MY_METRICS: Self = Self(0x0200);
    pub const OVERLAP_COMPOUND: Self = Self(0x0400);
    pub const SCALED_COMPONENT_OFFSET: Self = Self(0x0800);
    pub const UNSCALED_COMPONENT_OFFSET: Self = Self(0x1000);

    pub const fn from_bits_truncate(bits: u16) -> Self {
        Self(bits & 0x1FFF)
    }

    pub const fn bits(self) -> u16 {
        self.0
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

/// A glyph outline: either a set of contours or a list of references to
/// other glyphs.
#[derive(Clone, Debug)]
pub enum Glyph<'a> {
    Simple(SimpleGlyph<'a>),
    Composite(CompositeGlyph<'a>),
}

impl<'a> FontRead<'a> for Glyph<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let number_of_contours: i16 = data.read_at(0)?;
        if number_of_contours >= 0 {
            SimpleGlyph::read(data).map(Self::Simple)
        } else {
            CompositeGlyph::read(data).map(Self::Composite)
        }
    }
}

/// Accessors for the shared glyph header.
macro_rules! field_getter {
    ($field:ident, $ty:ty) => {
        pub fn $field(&self) -> $ty {
            match self {
                Self::Simple(table) => table.header.$field(),
                Self::Composite(table) => table.header.$field(),
            }
        }
    };
}

impl Glyph<'_> {
    field_getter!(number_of_contours, i16);
    field_getter!(x_min, i16);
    field_getter!(y_min, i16);
    field_getter!(x_max, i16);
    field_getter!(y_max, i16);
    field_getter!(bbox, BoundingBox<i16>);
}

#[derive(Clone, Copy, Debug)]
struct GlyphHeader<'a> {
    data: FontData<'a>,
}

impl GlyphHeader<'_> {
    const LEN: usize = 10;

    fn number_of_contours(&self) -> i16 {
        self.data.read_at(0).unwrap_or_default()
    }

    fn x_min(&self) -> i16 {
        self.data.read_at(2).unwrap_or_default()
    }

    fn y_min(&self) -> i16 {
        self.data.read_at(4).unwrap_or_default()
    }

    fn x_max(&self) -> i16 {
        self.data.read_at(6).unwrap_or_default()
    }

    fn y_max(&self) -> i16 {
        self.data.read_at(8).unwrap_or_default()
    }

    fn bbox(&self) -> BoundingBox<i16> {
        BoundingBox {
            x_min: self.x_min(),
            y_min: self.y_min(),
            x_max: self.x_max(),
            y_max: self.y_max(),
        }
    }
}

/// A glyph made of contours.
#[derive(Clone, Debug)]
pub struct SimpleGlyph<'a> {
    header: GlyphHeader<'a>,
    end_pts_of_contours: Array<'a, u16>,
    instructions: &'a [u8],
    glyph_data: &'a [u8],
}

impl<'a> FontRead<'a> for SimpleGlyph<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        data.check_len(GlyphHeader::LEN)?;
        let header = GlyphHeader { data };
        let mut cursor = data.cursor();
        cursor.advance_by(GlyphHeader::LEN);
        let end_pts_of_contours = cursor.read_array(header.number_of_contours() as usize)?;
        let instruction_length: u16 = cursor.read()?;
        let instructions = cursor.read_bytes(instruction_length as usize)?;
        let glyph_data = cursor.remaining().unwrap_or_default().as_bytes();
        Ok(SimpleGlyph {
            header,
            end_pts_of_contours,
            instructions,
            glyph_data,
        })
    }
}

impl<'a> SimpleGlyph<'a> {
    pub fn number_of_contours(&self) -> i16 {
        self.header.number_of_contours()
    }

    pub fn bbox(&self) -> BoundingBox<i16> {
        self.header.bbox()
    }

    /// The index of the last point of each contour.
    pub fn end_pts_of_contours(&self) -> Array<'a, u16> {
        self.end_pts_of_contours
    }

    /// TrueType hinting instructions.
    pub fn instructions(&self) -> &'a [u8] {
        self.instructions
    }

    /// Returns the total number of points.
    pub fn num_points(&self) -> usize {
        self.end_pts_of_contours
            .last()
            .map(|last| last as usize + 1)
            .unwrap_or(0)
    }

    /// Reads points and flags into the provided buffers.
    ///
    /// Drops all flag bits except on-curve. The lengths of the buffers must be
    /// equal to the value returned by [num_points](Self::num_points).
    pub fn read_points_fast(
        &self,
        points: &mut [Point<i32>],
        flags: &mut [u8],
    ) -> Result<(), ReadError> {
        let n_points = self.num_points();
        if points.len() != n_points || flags.len() != n_points {
            return Err(ReadError::InvalidArrayLen);
        }
        let mut cursor = FontData::new(self.glyph_data).cursor();
        let mut i = 0;
        while i < n_points {
            let flag = SimpleGlyphFlags::from_bits_truncate(cursor.read()?);
            if flag.contains(SimpleGlyphFlags::REPEAT_FLAG) {
                let count = (cursor.read::<u8>()? as usize + 1).min(n_points - i);
                for f in &mut flags[i..i + count] {
                    *f = flag.bits();
                }
                i += count;
            } else {
                flags[i] = flag.bits();
                i += 1;
            }
        }
        let mut x = 0i32;
        for (&flag_bits, point) in flags.iter().zip(points.iter_mut()) {
            let flag = SimpleGlyphFlags::from_bits_truncate(flag_bits);
            x = x.wrapping_add(read_delta(
                &mut cursor,
                flag,
                SimpleGlyphFlags::X_SHORT_VECTOR,
                SimpleGlyphFlags::X_IS_SAME_OR_POSITIVE_X_SHORT_VECTOR,
            )?);
            point.x = x;
        }
        let mut y = 0i32;
        for (flag_bits, point) in flags.iter_mut().zip(points.iter_mut()) {
            let flag = SimpleGlyphFlags::from_bits_truncate(*flag_bits);
            y = y.wrapping_add(read_delta(
                &mut cursor,
                flag,
                SimpleGlyphFlags::Y_SHORT_VECTOR,
                SimpleGlyphFlags::Y_IS_SAME_OR_POSITIVE_Y_SHORT_VECTOR,
            )?);
            point.y = y;
            // Only keep the on-curve bit
            *flag_bits &= SimpleGlyphFlags::ON_CURVE_POINT.bits();
        }
        Ok(())
    }

    /// Returns the decoded points of the glyph.
    ///
    /// Truncated coordinate data yields an empty vector.
    pub fn points(&self) -> Vec<CurvePoint> {
        let n_points = self.num_points();
        let mut points = vec![Point::default(); n_points];
        let mut flags = vec![0u8; n_points];
        if self.read_points_fast(&mut points, &mut flags).is_err() {
            return Vec::new();
        }
        points
            .into_iter()
            .zip(flags)
            .map(|(point, flag)| CurvePoint::new(point.x as i16, point.y as i16, flag != 0))
            .collect()
    }
}

/// Reads one coordinate delta. A short delta is an unsigned byte with the
/// sign given by `same_or_positive`; otherwise that bit means "unchanged".
fn read_delta(
    cursor: &mut Cursor,
    flag: SimpleGlyphFlags,
    short: SimpleGlyphFlags,
    same_or_positive: SimpleGlyphFlags,
) -> Result<i32, ReadError> {
    Ok(
        match (flag.contains(short), flag.contains(same_or_positive)) {
            (true, true) => cursor.read::<u8>()? as i32,
            (true, false) => -(cursor.read::<u8>()? as i32),
            (false, false) => cursor.read::<i16>()? as i32,
            (false, true) => 0,
        },
    )
}

/// Point with an associated on-curve flag in a simple glyph.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CurvePoint {
    pub x: i16,
    pub y: i16,
    /// True if this is an on-curve point.
    pub on_curve: bool,
}

impl CurvePoint {
    pub fn new(x: i16, y: i16, on_curve: bool) -> Self {
        Self { x, y, on_curve }
    }

    /// Convenience method to construct an on-curve point
    pub fn on_curve(x: i16, y: i16) -> Self {
        Self::new(x, y, true)
    }

    /// Convenience method to construct an off-curve point
    pub fn off_curve(x: i16, y: i16) -> Self {
        Self::new(x, y, false)
    }
}

/// Transform for a composite component.
///
/// Points map as `x' = xx * x + xy * y` and `y' = yx * x + yy * y`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transform {
    /// X scale factor.
    pub xx: F2Dot14,
    /// YX skew factor.
    pub yx: F2Dot14,
    /// XY skew factor.
    pub xy: F2Dot14,
    /// Y scale factor.
    pub yy: F2Dot14,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            xx: F2Dot14::ONE,
            yx: F2Dot14::ZERO,
            xy: F2Dot14::ZERO,
            yy: F2Dot14::ONE,
        }
    }
}

impl Transform {
    pub fn is_identity(&self) -> bool {
        *self == Self::default()
    }

    /// Apply the matrix to a point in font units.
    pub fn apply(&self, x: f32, y: f32) -> (f32, f32) {
        let [xx, yx, xy, yy] = [self.xx, self.yx, self.xy, self.yy].map(F2Dot14::to_f32);
        (xx * x + xy * y, yx * x + yy * y)
    }
}

/// Anchor position for a composite component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    Offset { x: i16, y: i16 },
    Point { base: u16, component: u16 },
}

/// A reference to another glyph. Part of [CompositeGlyph].
#[derive(Clone, Debug)]
pub struct Component {
    /// Component flags.
    pub flags: CompositeGlyphFlags,
    /// Glyph identifier.
    pub glyph: GlyphId,
    /// Anchor for component placement.
    pub anchor: Anchor,
    /// Component transformation matrix.
    pub transform: Transform,
}

/// A glyph assembled from other glyphs.
#[derive(Clone, Debug)]
pub struct CompositeGlyph<'a> {
    header: GlyphHeader<'a>,
    component_data: &'a [u8],
}

impl<'a> FontRead<'a> for CompositeGlyph<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        data.check_len(GlyphHeader::LEN)?;
        let component_data = data
            .split_off(GlyphHeader::LEN)
            .unwrap_or_default()
            .as_bytes();
        Ok(CompositeGlyph {
            header: GlyphHeader { data },
            component_data,
        })
    }
}

impl<'a> CompositeGlyph<'a> {
    pub fn bbox(&self) -> BoundingBox<i16> {
        self.header.bbox()
    }

    /// Returns an iterator over the components of the composite glyph.
    ///
    /// Iteration stops at the first truncated component.
    pub fn components(&self) -> impl Iterator<Item = Component> + 'a + Clone {
        ComponentIter {
            cur_flags: CompositeGlyphFlags::default(),
            done: false,
            cursor: FontData::new(self.component_data).cursor(),
        }
    }

    /// Returns the TrueType interpreter instructions.
    pub fn instructions(&self) -> Option<&'a [u8]> {
        ComponentIter {
            cur_flags: CompositeGlyphFlags::default(),
            done: false,
            cursor: FontData::new(self.component_data).cursor(),
        }
        .instructions()
    }
}

#[derive(Clone)]
struct ComponentIter<'a> {
    cur_flags: CompositeGlyphFlags,
    done: bool,
    cursor: Cursor<'a>,
}

impl<'a> ComponentIter<'a> {
    fn instructions(&mut self) -> Option<&'a [u8]> {
        while self.by_ref().next().is_some() {}
        if self
            .cur_flags
            .contains(CompositeGlyphFlags::WE_HAVE_INSTRUCTIONS)
        {
            let len = self.cursor.read::<u16>().ok()? as usize;
            self.cursor.read_bytes(len).ok()
        } else {
            None
        }
    }
}

impl Iterator for ComponentIter<'_> {
    type Item = Component;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let flags = CompositeGlyphFlags::from_bits_truncate(self.cursor.read().ok()?);
        self.cur_flags = flags;
        let glyph: GlyphId16 = self.cursor.read().ok()?;
        let args_are_words = flags.contains(CompositeGlyphFlags::ARG_1_AND_2_ARE_WORDS);
        let args_are_xy_values = flags.contains(CompositeGlyphFlags::ARGS_ARE_XY_VALUES);
        let anchor = match (args_are_xy_values, args_are_words) {
            (true, true) => Anchor::Offset {
                x: self.cursor.read().ok()?,
                y: self.cursor.read().ok()?,
            },
            (true, false) => Anchor::Offset {
                x: self.cursor.read::<i8>().ok()? as _,
                y: self.cursor.read::<i8>().ok()? as _,
            },
            (false, true) => Anchor::Point {
                base: self.cursor.read().ok()?,
                component: self.cursor.read().ok()?,
            },
            (false, false) => Anchor::Point {
                base: self.cursor.read::<u8>().ok()? as _,
                component: self.cursor.read::<u8>().ok()? as _,
            },
        };
        let mut transform = Transform::default();
        if flags.contains(CompositeGlyphFlags::WE_HAVE_A_SCALE) {
            transform.xx = self.cursor.read().ok()?;
            transform.yy = transform.xx;
        } else if flags.contains(CompositeGlyphFlags::WE_HAVE_AN_X_AND_Y_SCALE) {
            transform.xx = self.cursor.read().ok()?;
            transform.yy = self.cursor.read().ok()?;
        } else if flags.contains(CompositeGlyphFlags::WE_HAVE_A_TWO_BY_TWO) {
            transform.xx = self.cursor.read().ok()?;
            transform.yx = self.cursor.read().ok()?;
            transform.xy = self.cursor.read().ok()?;
            transform.yy = self.cursor.read().ok()?;
        }
        self.done = !flags.contains(CompositeGlyphFlags::MORE_COMPONENTS);

        Some(Component {
            flags,
            glyph: glyph.into(),
            anchor,
            transform,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::loca::Loca;
    use font_test_data::glyf as test_data;

    #[test]
    fn simple_glyph_points() {
        let data = test_data::simple_triangle();
        let Glyph::Simple(glyph) = Glyph::read(FontData::new(&data)).unwrap() else {
            panic!("expected simple glyph");
        };
        assert_eq!(glyph.number_of_contours(), 1);
        assert_eq!(glyph.num_points(), 3);
        let points: Vec<_> = glyph.points().iter().map(|p| (p.x, p.y)).collect();
        assert_eq!(points, test_data::TRIANGLE);
        assert!(glyph.points().iter().all(|p| p.on_curve));
    }

    #[test]
    fn truncated_coordinates() {
        let data = test_data::simple_triangle();
        // drop the y coordinate and padding
        let glyph = SimpleGlyph::read(FontData::new(&data[..data.len() - 3])).unwrap();
        let mut points = vec![Point::default(); 3];
        let mut flags = vec![0; 3];
        assert!(glyph.read_points_fast(&mut points, &mut flags).is_err());
        assert!(glyph.points().is_empty());
        assert_eq!(
            glyph.read_points_fast(&mut points[..2], &mut flags),
            Err(ReadError::InvalidArrayLen)
        );
    }

    #[test]
    fn composite_transform() {
        let data = test_data::transformed_composite();
        let glyph = Glyph::read(FontData::new(&data)).unwrap();
        assert_eq!(glyph.number_of_contours(), -1);
        assert_eq!(glyph.x_max(), 518);
        let Glyph::Composite(glyph) = glyph else {
            panic!("expected composite glyph");
        };
        let components: Vec<_> = glyph.components().collect();
        assert_eq!(components.len(), 1);
        let component = &components[0];
        assert_eq!(component.glyph, GlyphId::new(1));
        let (dx, dy) = test_data::COMPOSITE_OFFSET;
        assert_eq!(component.anchor, Anchor::Offset { x: dx, y: dy });
        let [xx, yx, xy, yy] = test_data::COMPOSITE_TRANSFORM.map(F2Dot14::from_bits);
        assert_eq!(component.transform, Transform { xx, yx, xy, yy });
        assert_eq!(glyph.instructions(), None);
    }

    #[test]
    fn composite_scale_and_offsets() {
        let data = test_data::two_components();
        let Glyph::Composite(glyph) = Glyph::read(FontData::new(&data)).unwrap() else {
            panic!("expected composite glyph");
        };
        let components: Vec<_> = glyph.components().collect();
        assert_eq!(components.len(), 2);
        assert_eq!(components[0].anchor, Anchor::Offset { x: 10, y: 20 });
        assert!(components[0].transform.is_identity());
        assert_eq!(components[1].transform.xx, F2Dot14::from_f32(0.5));
        assert_eq!(components[1].transform.yy, F2Dot14::from_f32(0.5));
        assert_eq!(components[1].transform.apply(100.0, 300.0), (50.0, 150.0));
    }

    #[test]
    fn glyphs_through_loca() {
        let (glyf, loca) = test_data::glyf_loca();
        let glyf = Glyf::read(FontData::new(&glyf)).unwrap();
        let loca = Loca::read(FontData::new(&loca), false).unwrap();
        assert_eq!(loca.len(), 4);
        assert!(loca.get_glyf(GlyphId::new(0), &glyf).unwrap().is_none());
        assert!(matches!(
            loca.get_glyf(GlyphId::new(1), &glyf),
            Ok(Some(Glyph::Simple(_)))
        ));
        assert!(matches!(
            loca.get_glyf(GlyphId::new(3), &glyf),
            Ok(Some(Glyph::Composite(_)))
        ));
        assert_eq!(
            loca.get_glyf(GlyphId::new(4), &glyf).err(),
            Some(ReadError::OutOfBounds)
        );
    }
}
