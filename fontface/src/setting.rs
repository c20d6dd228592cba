//! User supplied variation settings.

use std::str::FromStr;

use opentype::types::Tag;

/// A position on a single variation axis in user coordinates.
///
/// The `tag` selects the axis (for example `wght` or `wdth`) and `value` is
/// expressed in the same units as the axis range declared by the font.
///
/// # Example
/// ```
/// use fontface::{Tag, Variation};
///
/// let bolder: Variation = ("wght", 720.0).into();
/// assert_eq!(bolder, Variation::new(Tag::new(b"wght"), 720.0));
/// ```
#[derive(Copy, Clone, PartialEq, PartialOrd, Debug)]
pub struct Variation {
    /// Tag of the target axis.
    pub tag: Tag,
    /// Desired position on the axis.
    pub value: f32,
}

impl Variation {
    pub fn new(tag: Tag, value: f32) -> Self {
        Self { tag, value }
    }
}

impl From<&'_ Variation> for Variation {
    fn from(value: &'_ Variation) -> Self {
        *value
    }
}

impl From<(Tag, f32)> for Variation {
    fn from(s: (Tag, f32)) -> Self {
        Self::new(s.0, s.1)
    }
}

impl From<(&str, f32)> for Variation {
    fn from(s: (&str, f32)) -> Self {
        Self::new(Tag::from_str(s.0).unwrap_or_default(), s.1)
    }
}

impl From<&(&str, f32)> for Variation {
    fn from(s: &(&str, f32)) -> Self {
        (*s).into()
    }
}
