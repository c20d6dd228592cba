//! Axes of variation in a variable font.

use opentype::{
    tables::{
        avar::Avar,
        fvar::{Fvar, InstanceRecord, VariationAxisRecord},
        variations::DeltaSetIndex,
    },
    types::{F2Dot14, Fixed, Tag},
    TableProvider,
};

use crate::{setting::Variation, NormalizedCoord};

/// Axis of variation in a variable font.
///
/// In variable fonts, an axis usually refers to a single aspect of a
/// typeface's design that can be altered by the user.
#[derive(Copy, Clone, Debug)]
pub struct Axis {
    index: usize,
    record: VariationAxisRecord,
}

impl Axis {
    /// Returns the tag that identifies the axis.
    pub fn tag(&self) -> Tag {
        self.record.axis_tag
    }

    /// Returns the index of the axis in its owning collection.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Returns the name table identifier for the name of the axis.
    pub fn name_id(&self) -> u16 {
        self.record.axis_name_id
    }

    /// Returns true if the axis should be hidden in user interfaces.
    pub fn is_hidden(&self) -> bool {
        self.record.is_hidden()
    }

    pub fn min_value(&self) -> f32 {
        self.record.min_value.to_f32()
    }

    pub fn default_value(&self) -> f32 {
        self.record.default_value.to_f32()
    }

    pub fn max_value(&self) -> f32 {
        self.record.max_value.to_f32()
    }

    /// Returns a normalized coordinate for the given user coordinate.
    ///
    /// The value will be clamped to the range specified by the minimum
    /// and maximum values. This does not apply any avar remapping.
    pub fn normalize(&self, coord: f32) -> NormalizedCoord {
        self.record
            .normalize(Fixed::from_f64(coord as f64))
            .to_f2dot14()
    }
}

/// The variation axes of a font along with the avar mapping used to
/// convert user coordinates to normalized coordinates.
#[derive(Clone, Default, Debug)]
pub struct Axes<'a> {
    fvar: Option<Fvar<'a>>,
    avar: Option<Avar<'a>>,
}

impl<'a> Axes<'a> {
    /// Creates a new axis collection from the given font.
    ///
    /// Malformed fvar or avar tables are treated as absent.
    pub fn new(font: &impl TableProvider<'a>) -> Self {
        let fvar = font.fvar().ok();
        let avar = match font.avar() {
            Ok(avar) => Some(avar),
            Err(opentype::ReadError::TableIsMissing(_)) => None,
            Err(e) => {
                log::warn!("ignoring malformed avar table: {e}");
                None
            }
        };
        Self { fvar, avar }
    }

    /// Returns the number of variation axes in the font.
    pub fn len(&self) -> usize {
        self.fvar
            .as_ref()
            .map(|fvar| fvar.axis_count() as usize)
            .unwrap_or(0)
    }

    /// Returns true if the font is not variable.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the axis at the given index.
    pub fn get(&self, index: usize) -> Option<Axis> {
        let record = self.fvar.as_ref()?.axes().get(index)?;
        Some(Axis { index, record })
    }

    /// Returns the axis with the given tag.
    pub fn get_by_tag(&self, tag: Tag) -> Option<Axis> {
        self.iter().find(|axis| axis.tag() == tag)
    }

    /// Returns an iterator over the axes in the collection.
    pub fn iter(&self) -> impl Iterator<Item = Axis> + 'a + Clone {
        let copy = self.clone();
        (0..self.len()).filter_map(move |i| copy.get(i))
    }

    /// Converts design space coordinates, one per axis in fvar order, to
    /// normalized coordinates.
    ///
    /// Missing trailing values are taken to be the axis defaults and extra
    /// values are ignored. Each value is clamped to its axis range, mapped
    /// to `[-1, 0]` or `[0, 1]` around the default and finally remapped by
    /// the avar table if present.
    pub fn normalize(&self, design_coords: &[f32]) -> Vec<NormalizedCoord> {
        let mut coords: Vec<_> = self
            .iter()
            .map(|axis| match design_coords.get(axis.index()) {
                Some(value) => axis.normalize(*value),
                None => NormalizedCoord::ZERO,
            })
            .collect();
        self.apply_avar(&mut coords);
        coords
    }

    /// Given an iterator of variation settings in user space, computes an
    /// ordered sequence of normalized coordinates.
    ///
    /// * Settings that don't match an axis are ignored.
    /// * If more than one setting for an axis is provided, the last one is
    ///   used.
    /// * Omitted settings leave the axis at its default position.
    pub fn location<I>(&self, settings: I) -> Vec<NormalizedCoord>
    where
        I: IntoIterator,
        I::Item: Into<Variation>,
    {
        let mut design: Vec<f32> = self.iter().map(|axis| axis.default_value()).collect();
        for setting in settings {
            let setting = setting.into();
            for (axis, value) in self.iter().zip(design.iter_mut()) {
                if axis.tag() == setting.tag {
                    *value = setting.value;
                }
            }
        }
        self.normalize(&design)
    }

    /// Returns the number of named instances.
    pub fn named_instance_count(&self) -> usize {
        self.fvar
            .as_ref()
            .map(|fvar| fvar.instance_count() as usize)
            .unwrap_or(0)
    }

    /// Returns the named instance at the given index.
    pub fn named_instance(&self, index: usize) -> Option<NamedInstance<'a>> {
        let record = match self.fvar.as_ref()?.instance(index) {
            Ok(record) => record,
            Err(e) => {
                log::debug!("unreadable named instance {index}: {e}");
                return None;
            }
        };
        Some(NamedInstance {
            axes: self.clone(),
            record,
        })
    }

    /// Returns an iterator over the readable named instances.
    pub fn named_instances(&self) -> impl Iterator<Item = NamedInstance<'a>> + 'a {
        let copy = self.clone();
        (0..self.named_instance_count()).filter_map(move |i| copy.named_instance(i))
    }

    fn apply_avar(&self, coords: &mut [NormalizedCoord]) {
        let Some(avar) = &self.avar else {
            return;
        };
        for (coord, segment_maps) in coords.iter_mut().zip(avar.axis_segment_maps()) {
            *coord = segment_maps.apply(coord.to_fixed()).to_f2dot14();
        }
        if avar.major_version() < 2 {
            return;
        }
        let Some(store) = avar.var_store() else {
            return;
        };
        let store = match store {
            Ok(store) => store,
            Err(e) => {
                log::warn!("ignoring malformed avar variation store: {e}");
                return;
            }
        };
        let index_map = match avar.axis_index_map().transpose() {
            Ok(map) => map,
            Err(e) => {
                log::warn!("ignoring malformed avar axis index map: {e}");
                return;
            }
        };
        // deltas are evaluated at the segment mapped location and applied
        // all at once
        let mapped: Vec<NormalizedCoord> = coords.to_vec();
        for (axis_ix, coord) in coords.iter_mut().enumerate() {
            let index = match &index_map {
                Some(map) => match map.get(axis_ix as u32) {
                    Ok(index) => index,
                    Err(_) => continue,
                },
                None => DeltaSetIndex {
                    outer: (axis_ix >> 16) as u16,
                    inner: axis_ix as u16,
                },
            };
            let delta = store.compute_delta(index, &mapped).unwrap_or_default();
            let value = (coord.to_bits() as i32 + delta).clamp(-(1 << 14), 1 << 14);
            *coord = F2Dot14::from_bits(value as i16);
        }
    }
}

/// Named instance of a variation.
///
/// A set of fixed axis positions selected by the type designer and assigned a
/// name.
#[derive(Clone, Debug)]
pub struct NamedInstance<'a> {
    axes: Axes<'a>,
    record: InstanceRecord<'a>,
}

impl<'a> NamedInstance<'a> {
    /// Returns the name table identifier for the subfamily name of the
    /// instance.
    pub fn subfamily_name_id(&self) -> u16 {
        self.record.subfamily_name_id
    }

    /// Returns the name table identifier for the PostScript name of the
    /// instance.
    pub fn postscript_name_id(&self) -> Option<u16> {
        self.record.post_script_name_id
    }

    /// Returns the user space coordinates of the instance, one per axis.
    pub fn user_coords(&self) -> impl Iterator<Item = f32> + 'a + Clone {
        self.record.coordinates.iter().map(|coord| coord.to_f32())
    }

    /// Computes the location of this instance in normalized variation space.
    pub fn location(&self) -> Vec<NormalizedCoord> {
        let design: Vec<f32> = self.user_coords().collect();
        self.axes.normalize(&design)
    }
}

#[cfg(test)]
mod tests {
    use font_test_data::{
        be_buffer,
        bebuffer::BeBuffer,
        build_font,
        variations::{avar_two_axes, fvar_wght_wdth, item_variation_store},
    };
    use opentype::{tables, FontRef};
    use pretty_assertions::assert_eq;

    use super::*;

    fn coord(value: f32) -> NormalizedCoord {
        NormalizedCoord::from_f32(value)
    }

    fn font_data(avar: Option<&[u8]>) -> Vec<u8> {
        let fvar = fvar_wght_wdth();
        let mut entries = vec![(tables::fvar::TAG, fvar.as_slice())];
        if let Some(avar) = avar {
            entries.push((tables::avar::TAG, avar));
        }
        build_font(opentype::types::TT_SFNT_VERSION, &entries)
    }

    #[test]
    fn axes() {
        let data = font_data(None);
        let font = FontRef::new(&data).unwrap();
        let axes = Axes::new(&font);
        assert_eq!(axes.len(), 2);
        let wght = axes.get_by_tag(Tag::new(b"wght")).unwrap();
        assert_eq!(wght.index(), 0);
        assert_eq!(
            (wght.min_value(), wght.default_value(), wght.max_value()),
            (100.0, 400.0, 900.0)
        );
        assert_eq!(wght.name_id(), 256);
        assert!(!wght.is_hidden());
        assert!(axes.get(2).is_none());
        assert!(axes.get_by_tag(Tag::new(b"opsz")).is_none());
    }

    #[test]
    fn normalization_boundaries() {
        let data = font_data(None);
        let font = FontRef::new(&data).unwrap();
        let axes = Axes::new(&font);
        for axis in axes.iter() {
            assert_eq!(axis.normalize(axis.default_value()), coord(0.0));
            assert_eq!(axis.normalize(axis.min_value()), coord(-1.0));
            assert_eq!(axis.normalize(axis.max_value()), coord(1.0));
            // clamped rather than extrapolated
            assert_eq!(axis.normalize(axis.min_value() - 500.0), coord(-1.0));
            assert_eq!(axis.normalize(axis.max_value() + 500.0), coord(1.0));
        }
        assert_eq!(axes.normalize(&[250.0, 150.0]), [coord(-0.5), coord(0.5)]);
        // missing values use the default
        assert_eq!(axes.normalize(&[900.0]), [coord(1.0), coord(0.0)]);
    }

    #[test]
    fn avar_segment_maps() {
        let avar = avar_two_axes();
        let data = font_data(Some(avar.as_slice()));
        let font = FontRef::new(&data).unwrap();
        let axes = Axes::new(&font);
        assert_eq!(axes.normalize(&[250.0, 75.0]), [coord(-0.75), coord(-0.5)]);
        assert_eq!(axes.normalize(&[650.0, 200.0]), [coord(0.25), coord(1.0)]);
        assert_eq!(axes.normalize(&[400.0, 100.0]), [coord(0.0), coord(0.0)]);
    }

    #[test]
    fn avar_v2_deltas() {
        // identity segment maps followed by a variation store with implicit
        // axis indices
        let avar = be_buffer! {
            2u16, 0u16, 0u16,
            2u16,           // axisCount
            0u16, 0u16,     // empty segment maps
            0u32,           // axisIndexMapOffset
            20u32           // varStoreOffset
        }
        .extend_bytes(item_variation_store().as_slice());
        let data = font_data(Some(avar.as_slice()));
        let font = FontRef::new(&data).unwrap();
        let axes = Axes::new(&font);
        let max = axes.normalize(&[900.0, 100.0]);
        assert_eq!(max, [coord(1.0), F2Dot14::from_bits(10)]);
        let half = axes.normalize(&[250.0, 100.0]);
        assert_eq!(half, [F2Dot14::from_bits(-8192 - 25), F2Dot14::from_bits(10)]);
    }

    #[test]
    fn settings_to_location() {
        let data = font_data(None);
        let font = FontRef::new(&data).unwrap();
        let axes = Axes::new(&font);
        let location = axes.location([("wght", 300.0f32), ("opsz", 12.0), ("wght", 650.0)]);
        assert_eq!(location, [coord(0.5), coord(0.0)]);
        assert_eq!(axes.location([("wdth", 50.0f32)]), [coord(0.0), coord(-1.0)]);
    }

    #[test]
    fn named_instances() {
        let data = font_data(None);
        let font = FontRef::new(&data).unwrap();
        let axes = Axes::new(&font);
        assert_eq!(axes.named_instance_count(), 2);
        let instances: Vec<_> = axes.named_instances().collect();
        assert_eq!(instances[0].subfamily_name_id(), 258);
        assert_eq!(instances[0].postscript_name_id(), None);
        assert_eq!(instances[0].user_coords().collect::<Vec<_>>(), [700.0, 100.0]);
        let bold = instances[0].location();
        assert!((bold[0].to_f32() - 0.6).abs() < 1e-3);
        assert_eq!(bold[1], coord(0.0));
        let light = instances[1].location();
        assert!((light[0].to_f32() + 1.0 / 3.0).abs() < 1e-3);
        assert_eq!(light[1], coord(-0.5));
        assert!(axes.named_instance(2).is_none());
    }

    #[test]
    fn not_variable() {
        let data = build_font(opentype::types::TT_SFNT_VERSION, &[]);
        let font = FontRef::new(&data).unwrap();
        let axes = Axes::new(&font);
        assert!(axes.is_empty());
        assert!(axes.normalize(&[400.0]).is_empty());
        assert_eq!(axes.named_instances().count(), 0);
    }
}
