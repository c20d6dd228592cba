//! Font size representation.

/// Font size in pixels per em units.
///
/// Providing a value `<= 0.0` requests results in font units.
#[derive(Copy, Clone, PartialEq, PartialOrd, Debug)]
pub struct Size(f32);

impl Size {
    /// Creates a new font size from the given value in pixels per em units.
    pub fn new(ppem: f32) -> Self {
        Self(ppem)
    }

    /// Creates a new font size for generating unscaled metrics or outlines in
    /// font units.
    pub fn unscaled() -> Self {
        Self(0.0)
    }

    /// Returns the raw size in pixels per em units.
    ///
    /// Results in `None` if the size is unscaled.
    pub fn ppem(self) -> Option<f32> {
        (self.0 > 0.0).then_some(self.0)
    }

    /// Computes a linear scale factor for this font size and the given units
    /// per em value.
    ///
    /// Returns 1.0 for an unscaled size or when `units_per_em` is 0.
    pub fn linear_scale(self, units_per_em: u16) -> f32 {
        if self.0 > 0.0 && units_per_em != 0 {
            self.0 / units_per_em as f32
        } else {
            1.0
        }
    }
}

impl Default for Size {
    fn default() -> Self {
        Self::unscaled()
    }
}

impl From<f32> for Size {
    fn from(value: f32) -> Self {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::Size;

    #[test]
    fn linear_scale() {
        assert_eq!(Size::new(16.0).linear_scale(1000), 0.016);
        assert_eq!(Size::new(16.0).linear_scale(0), 1.0);
        assert_eq!(Size::unscaled().linear_scale(2048), 1.0);
        assert_eq!(Size::new(-3.0).ppem(), None);
        assert_eq!(Size::new(12.0).ppem(), Some(12.0));
    }
}
