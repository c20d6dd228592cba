//! Text runs handed to the segmenter and the shaper.

use fontface::Tag;
use unicode_script::Script;

use crate::FaceRef;

/// Direction in which the glyphs of a run progress.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Direction {
    #[default]
    LeftToRight,
    RightToLeft,
    TopToBottom,
    BottomToTop,
}

impl Direction {
    pub fn is_horizontal(self) -> bool {
        matches!(self, Self::LeftToRight | Self::RightToLeft)
    }

    pub fn is_vertical(self) -> bool {
        !self.is_horizontal()
    }

    /// Returns true if glyphs progress against the reading order of the
    /// axis, from right to left or from bottom to top.
    pub fn is_backward(self) -> bool {
        matches!(self, Self::RightToLeft | Self::BottomToTop)
    }

    /// Returns the horizontal direction matching a bidi embedding level.
    pub fn from_bidi_level(level: u8) -> Self {
        if level % 2 == 1 {
            Self::RightToLeft
        } else {
            Self::LeftToRight
        }
    }
}

/// A font feature setting applied to a range of the text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FontFeature {
    pub tag: Tag,
    pub value: u32,
    /// First rune the feature applies to.
    pub start: usize,
    /// End of the range, exclusive. `usize::MAX` covers the rest of the text.
    pub end: usize,
}

impl FontFeature {
    /// Creates a feature setting that applies to the whole text.
    pub fn new(tag: impl Into<Tag>, value: u32) -> Self {
        Self {
            tag: tag.into(),
            value,
            start: 0,
            end: usize::MAX,
        }
    }
}

/// A run of text to shape.
///
/// The runes to shape are `text[run_start..run_end]`. The whole paragraph
/// stays available in `text` so that a shaper can look at the context around
/// the run, and cluster indices in the shaped [`Output`](crate::Output) refer
/// to positions in `text`.
#[derive(Clone, Debug)]
pub struct Input<'t, 'f> {
    pub text: &'t [char],
    pub run_start: usize,
    pub run_end: usize,
    pub direction: Direction,
    /// Bidi embedding level of the run. Even levels are left to right.
    pub bidi_level: u8,
    pub script: Script,
    /// Face to shape with. `None` until resolved by a
    /// [`Segmenter`](crate::Segmenter).
    pub face: Option<FaceRef<'f>>,
    /// BCP 47 language tag, empty when unknown.
    pub language: String,
    pub features: Vec<FontFeature>,
    /// Font size in 26.6 fixed point.
    pub size: i32,
}

impl<'t, 'f> Input<'t, 'f> {
    /// Creates an input covering all of `text`.
    pub fn new(text: &'t [char], size: i32) -> Self {
        Self {
            text,
            run_start: 0,
            run_end: text.len(),
            direction: Direction::LeftToRight,
            bidi_level: 0,
            script: Script::Common,
            face: None,
            language: String::new(),
            features: Vec::new(),
            size,
        }
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        if direction == Direction::RightToLeft {
            self.bidi_level = 1;
        }
        self
    }

    pub fn with_face(mut self, face: FaceRef<'f>) -> Self {
        self.face = Some(face);
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_features(mut self, features: impl IntoIterator<Item = FontFeature>) -> Self {
        self.features = features.into_iter().collect();
        self
    }

    /// Returns the runes of the run.
    pub fn runes(&self) -> &'t [char] {
        self.text.get(self.run_start..self.run_end).unwrap_or_default()
    }

    /// Returns the number of runes in the run.
    pub fn len(&self) -> usize {
        self.run_end.saturating_sub(self.run_start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns a copy of this input restricted to `start..end`, with the
    /// given resolved properties.
    pub(crate) fn fragment(
        &self,
        start: usize,
        end: usize,
        direction: Direction,
        bidi_level: u8,
        script: Script,
        face: Option<FaceRef<'f>>,
    ) -> Self {
        Self {
            text: self.text,
            run_start: start,
            run_end: end,
            direction,
            bidi_level,
            script,
            face,
            language: self.language.clone(),
            features: self.features.clone(),
            size: self.size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directions() {
        assert!(Direction::RightToLeft.is_horizontal());
        assert!(Direction::BottomToTop.is_vertical());
        assert!(Direction::BottomToTop.is_backward());
        assert!(!Direction::TopToBottom.is_backward());
        assert_eq!(Direction::from_bidi_level(3), Direction::RightToLeft);
        assert_eq!(Direction::from_bidi_level(2), Direction::LeftToRight);
    }

    #[test]
    fn runes_of_the_run() {
        let text: Vec<char> = "hello world".chars().collect();
        let mut input = Input::new(&text, 16 << 6);
        input.run_start = 6;
        assert_eq!(input.runes().iter().collect::<String>(), "world");
        assert_eq!(input.len(), 5);
        input.run_start = 20;
        assert!(input.runes().is_empty());
        assert!(input.is_empty());
    }

    #[test]
    fn features_cover_the_text() {
        let feature = FontFeature::new(Tag::new(b"liga"), 0);
        assert_eq!(feature.start, 0);
        assert_eq!(feature.end, usize::MAX);
    }
}
