//! Support for the dictionary and charstring blend operator.

use types::{F2Dot14, Fixed};

use super::Error;
use crate::tables::variations::ItemVariationStore;

/// State for processing the blend operator for DICTs and charstrings.
///
/// Region scalars depend only on the coordinates and the active store
/// index, so they are computed once whenever the index changes.
///
/// See <https://learn.microsoft.com/en-us/typography/opentype/spec/cff2charstr#45-variation-data-operators>
#[derive(Clone, Debug)]
pub struct BlendState<'a> {
    store: ItemVariationStore<'a>,
    coords: &'a [F2Dot14],
    store_index: u16,
    scalars: Vec<Fixed>,
}

impl<'a> BlendState<'a> {
    pub fn new(
        store: ItemVariationStore<'a>,
        coords: &'a [F2Dot14],
        store_index: u16,
    ) -> Result<Self, Error> {
        let mut state = Self {
            store,
            coords,
            store_index,
            scalars: Vec::new(),
        };
        state.update_scalars()?;
        Ok(state)
    }

    /// Sets the active variation store index.
    ///
    /// This should be called with the operand of the `vsindex` operator
    /// for both DICTs and charstrings.
    pub fn set_store_index(&mut self, store_index: u16) -> Result<(), Error> {
        if self.store_index != store_index {
            self.store_index = store_index;
            self.update_scalars()?;
        }
        Ok(())
    }

    /// Returns the number of variation regions for the currently active
    /// variation store index.
    pub fn region_count(&self) -> usize {
        self.scalars.len()
    }

    /// Returns the scalars for each variation region of the currently active
    /// variation store index.
    pub fn scalars(&self) -> &[Fixed] {
        &self.scalars
    }

    fn update_scalars(&mut self) -> Result<(), Error> {
        self.scalars.clear();
        let data = self
            .store
            .item_variation_data(self.store_index as usize)
            .ok_or(Error::InvalidVariationStoreIndex(self.store_index))??;
        let regions = self.store.variation_region_list()?;
        for region_ix in data.region_indexes().iter() {
            let region = regions.get(region_ix as usize)?;
            self.scalars.push(region.compute_scalar(self.coords));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FontData, FontRead};

    #[test]
    fn example_blends() {
        // args are (coords, expected_scalars)
        example_test(&[-1.0], &[0.0, 1.0]);
        example_test(&[-0.25], &[0.5, 0.0]);
        example_test(&[-0.5], &[1.0, 0.0]);
        example_test(&[-0.75], &[0.5, 0.5]);
        example_test(&[0.0], &[0.0, 0.0]);
        example_test(&[0.5], &[0.0, 0.0]);
        example_test(&[1.0], &[0.0, 0.0]);
    }

    #[test]
    fn invalid_store_index() {
        let data = font_test_data::variations::two_region_store();
        let ivs = ItemVariationStore::read(FontData::new(&data)).unwrap();
        let mut state = BlendState::new(ivs.clone(), &[], 0).unwrap();
        assert_eq!(
            state.set_store_index(3),
            Err(Error::InvalidVariationStoreIndex(3))
        );
        assert!(BlendState::new(ivs, &[], 1).is_err());
    }

    fn example_test(coords: &[f32], expected: &[f64]) {
        let data = font_test_data::variations::two_region_store();
        let ivs = ItemVariationStore::read(FontData::new(&data)).unwrap();
        let coords: Vec<_> = coords.iter().copied().map(F2Dot14::from_f32).collect();
        let blender = BlendState::new(ivs, &coords, 0).unwrap();
        let expected: Vec<_> = expected.iter().copied().map(Fixed::from_f64).collect();
        assert_eq!(blender.scalars(), &expected[..]);
    }
}
