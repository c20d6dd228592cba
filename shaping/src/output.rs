//! Shaped glyph runs.

use fontface::GlyphId;

use crate::{Direction, FaceRef};

/// A range of runes in the paragraph text.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Range {
    pub offset: usize,
    pub count: usize,
}

impl Range {
    pub fn new(offset: usize, count: usize) -> Self {
        Self { offset, count }
    }

    /// Returns the index just past the last rune.
    pub fn end(&self) -> usize {
        self.offset + self.count
    }

    pub fn contains(&self, rune: usize) -> bool {
        rune >= self.offset && rune < self.end()
    }
}

/// A positioned glyph.
///
/// Glyphs produced for the same runes form a cluster. The first glyph of a
/// cluster records how many glyphs and runes it spans.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Glyph {
    pub glyph_id: GlyphId,
    /// Index in the paragraph text of the first rune of the cluster.
    pub cluster_index: usize,
    /// Number of runes in the cluster.
    pub rune_count: usize,
    /// Number of glyphs in the cluster.
    pub glyph_count: usize,
    pub x_advance: i32,
    pub y_advance: i32,
    pub x_offset: i32,
    pub y_offset: i32,
    pub x_bearing: i32,
    pub y_bearing: i32,
    pub width: i32,
    /// Height of the ink box, negative when it extends downwards.
    pub height: i32,
    /// Letter spacing added before the glyph by
    /// [`Output::add_letter_spacing`].
    pub start_letter_spacing: i32,
    /// Letter spacing added after the glyph.
    pub end_letter_spacing: i32,
}

impl Glyph {
    /// Creates a glyph forming its own single rune cluster.
    pub fn new(glyph_id: GlyphId, cluster_index: usize, x_advance: i32) -> Self {
        Self {
            glyph_id,
            cluster_index,
            rune_count: 1,
            glyph_count: 1,
            x_advance,
            ..Default::default()
        }
    }

    pub(crate) fn advance(&self, vertical: bool) -> i32 {
        if vertical {
            self.y_advance
        } else {
            self.x_advance
        }
    }

    fn add_advance(&mut self, vertical: bool, delta: i32) {
        if vertical {
            self.y_advance += delta;
        } else {
            self.x_advance += delta;
        }
    }

    fn add_offset(&mut self, vertical: bool, delta: i32) {
        if vertical {
            self.y_offset += delta;
        } else {
            self.x_offset += delta;
        }
    }
}

/// Vertical extents above and below the baseline.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Bounds {
    pub ascent: i32,
    /// Distance below the baseline, usually negative.
    pub descent: i32,
    pub gap: i32,
}

impl Bounds {
    /// Returns the height of a line using these bounds.
    pub fn line_height(&self) -> i32 {
        self.ascent - self.descent + self.gap
    }
}

/// The result of shaping one [`Input`](crate::Input) run.
///
/// Glyphs are in visual order: for right to left runs the first glyph
/// displays the last cluster of the text.
#[derive(Clone, Debug, Default)]
pub struct Output<'f> {
    /// Sum of the glyph advances along the direction of the run.
    pub advance: i32,
    pub size: i32,
    pub glyphs: Vec<Glyph>,
    /// Bounds of a line set in the face, from its metrics.
    pub line_bounds: Bounds,
    /// Bounds of the ink of the glyphs.
    pub glyph_bounds: Bounds,
    pub face: Option<FaceRef<'f>>,
    /// Runes of the paragraph shaped into this run.
    pub runes: Range,
    pub direction: Direction,
    pub bidi_level: u8,
}

/// Characters treated as word separators by
/// [`Output::add_word_spacing`].
const WORD_SEPARATORS: &[char] = &[
    '\u{0020}',
    '\u{00A0}',
    '\u{1361}',
    '\u{10100}',
    '\u{10101}',
    '\u{1039F}',
    '\u{1091F}',
];

impl<'f> Output<'f> {
    /// Recomputes [`advance`](Self::advance) from the glyphs.
    pub fn recompute_advance(&mut self) {
        let vertical = self.direction.is_vertical();
        self.advance = self.glyphs.iter().map(|glyph| glyph.advance(vertical)).sum();
    }

    /// Recomputes the advance and the glyph bounds.
    pub fn recalculate(&mut self) {
        self.recompute_advance();
        if self.glyphs.is_empty() {
            self.glyph_bounds = Bounds::default();
            return;
        }
        let vertical = self.direction.is_vertical();
        let mut bounds = Bounds {
            ascent: i32::MIN,
            descent: i32::MAX,
            gap: 0,
        };
        for glyph in &self.glyphs {
            // vertical runs measure ink across the baseline, along x
            let (top, bottom) = if vertical {
                (glyph.x_bearing + glyph.width, glyph.x_bearing)
            } else {
                (glyph.y_bearing, glyph.y_bearing + glyph.height)
            };
            bounds.ascent = bounds.ascent.max(top);
            bounds.descent = bounds.descent.min(bottom);
        }
        self.glyph_bounds = bounds;
    }

    /// Adds `spacing` to the advance of each word separator.
    ///
    /// `text` is the paragraph the run was shaped from. Only separators
    /// shaped to a single glyph are adjusted.
    pub fn add_word_spacing(&mut self, text: &[char], spacing: i32) {
        let vertical = self.direction.is_vertical();
        for glyph in &mut self.glyphs {
            if glyph.rune_count != 1 || glyph.glyph_count != 1 {
                continue;
            }
            let Some(ch) = text.get(glyph.cluster_index) else {
                log::debug!("glyph cluster {} outside of the text", glyph.cluster_index);
                continue;
            };
            if WORD_SEPARATORS.contains(ch) {
                glyph.add_advance(vertical, spacing);
            }
        }
        self.recompute_advance();
    }

    /// Adds `spacing` between clusters, split between the two sides with
    /// any odd unit going after the cluster.
    ///
    /// No spacing is added before the first cluster when `is_start` is set,
    /// nor after the last one when `is_end` is set, so that the spacing does
    /// not extend past the text.
    pub fn add_letter_spacing(&mut self, spacing: i32, is_start: bool, is_end: bool) {
        let vertical = self.direction.is_vertical();
        let before = spacing / 2;
        let after = spacing - before;
        let len = self.glyphs.len();
        let mut start = 0;
        while start < len {
            let count = self.glyphs[start].glyph_count.max(1);
            let end = (start + count).min(len);
            if start > 0 || !is_start {
                let first = &mut self.glyphs[start];
                first.add_advance(vertical, before);
                first.add_offset(vertical, before);
                first.start_letter_spacing += before;
            }
            if end < len || !is_end {
                let last = &mut self.glyphs[end - 1];
                last.add_advance(vertical, after);
                last.end_letter_spacing += after;
            }
            start = end;
        }
        self.recompute_advance();
    }

    /// Returns the part of the run shaping the runes in `start..end`.
    ///
    /// Clusters are kept whole: a glyph belongs to the slice if the first
    /// rune of its cluster does.
    pub fn slice(&self, start: usize, end: usize) -> Self {
        let offset = self.runes.offset.max(start);
        let limit = self.runes.end().min(end).max(offset);
        let mut slice = Self {
            advance: 0,
            size: self.size,
            glyphs: self
                .glyphs
                .iter()
                .filter(|glyph| glyph.cluster_index >= offset && glyph.cluster_index < limit)
                .copied()
                .collect(),
            line_bounds: self.line_bounds,
            glyph_bounds: self.glyph_bounds,
            face: self.face.clone(),
            runes: Range::new(offset, limit - offset),
            direction: self.direction,
            bidi_level: self.bidi_level,
        };
        slice.recompute_advance();
        slice
    }

    /// Removes the letter spacing before the cluster starting at `rune`.
    pub(crate) fn trim_start_spacing(&mut self, rune: usize) {
        let vertical = self.direction.is_vertical();
        for glyph in &mut self.glyphs {
            if glyph.cluster_index == rune && glyph.start_letter_spacing != 0 {
                let spacing = glyph.start_letter_spacing;
                glyph.add_advance(vertical, -spacing);
                glyph.add_offset(vertical, -spacing);
                glyph.start_letter_spacing = 0;
            }
        }
        self.recompute_advance();
    }

    /// Removes the letter spacing after the last cluster of the run.
    pub(crate) fn trim_end_spacing(&mut self) {
        let vertical = self.direction.is_vertical();
        let Some(last) = self.glyphs.iter().map(|glyph| glyph.cluster_index).max() else {
            return;
        };
        for glyph in &mut self.glyphs {
            if glyph.cluster_index == last && glyph.end_letter_spacing != 0 {
                let spacing = glyph.end_letter_spacing;
                glyph.add_advance(vertical, -spacing);
                glyph.end_letter_spacing = 0;
            }
        }
        self.recompute_advance();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn run(text: &[char], advance: i32) -> Output<'static> {
        let mut output = Output {
            glyphs: (0..text.len())
                .map(|ix| Glyph::new(GlyphId::new(ix as u32 + 1), ix, advance))
                .collect(),
            runes: Range::new(0, text.len()),
            ..Default::default()
        };
        output.recalculate();
        output
    }

    fn advances(output: &Output) -> Vec<i32> {
        output.glyphs.iter().map(|glyph| glyph.x_advance).collect()
    }

    #[test]
    fn word_spacing() {
        let text: Vec<char> = "a b\u{A0}c".chars().collect();
        let mut output = run(&text, 10);
        output.add_word_spacing(&text, 5);
        assert_eq!(advances(&output), [10, 15, 10, 15, 10]);
        assert_eq!(output.advance, 60);
    }

    #[test]
    fn word_spacing_skips_ligated_separators() {
        let text: Vec<char> = "a b".chars().collect();
        let mut output = run(&text, 10);
        output.glyphs[1].rune_count = 2;
        output.glyphs.remove(2);
        output.add_word_spacing(&text, 5);
        assert_eq!(advances(&output), [10, 10]);
    }

    #[test]
    fn letter_spacing() {
        let text: Vec<char> = "abc".chars().collect();
        let mut output = run(&text, 10);
        output.add_letter_spacing(8, true, true);
        assert_eq!(advances(&output), [14, 18, 14]);
        assert_eq!(output.glyphs[0].x_offset, 0);
        assert_eq!(output.glyphs[1].x_offset, 4);
        assert_eq!(output.advance, 46);

        let mut output = run(&text, 10);
        output.add_letter_spacing(8, false, false);
        assert_eq!(advances(&output), [18, 18, 18]);
    }

    #[test]
    fn odd_letter_spacing_is_not_lost() {
        let text: Vec<char> = "abc".chars().collect();
        let mut output = run(&text, 10);
        output.add_letter_spacing(9, false, false);
        assert_eq!(advances(&output), [19, 19, 19]);
        assert_eq!(output.glyphs[1].start_letter_spacing, 4);
        assert_eq!(output.glyphs[1].end_letter_spacing, 5);

        let mut output = run(&text, 10);
        output.add_letter_spacing(9, true, true);
        assert_eq!(advances(&output), [15, 19, 14]);
        assert_eq!(output.glyphs[1].x_offset, 4);
        assert_eq!(output.advance, 48);

        output.trim_start_spacing(1);
        output.trim_end_spacing();
        assert_eq!(advances(&output), [15, 15, 14]);
    }

    #[test]
    fn letter_spacing_keeps_clusters() {
        let text: Vec<char> = "fi".chars().collect();
        let mut output = run(&text, 10);
        output.glyphs[0].glyph_count = 2;
        output.add_letter_spacing(8, false, false);
        assert_eq!(advances(&output), [14, 14]);
        assert_eq!(output.glyphs[0].start_letter_spacing, 4);
        assert_eq!(output.glyphs[1].end_letter_spacing, 4);
    }

    #[test]
    fn glyph_bounds() {
        let text: Vec<char> = "ab".chars().collect();
        let mut output = run(&text, 10);
        output.glyphs[0].y_bearing = 700;
        output.glyphs[0].height = -700;
        output.glyphs[1].y_bearing = 500;
        output.glyphs[1].height = -750;
        output.recalculate();
        assert_eq!(
            output.glyph_bounds,
            Bounds {
                ascent: 700,
                descent: -250,
                gap: 0
            }
        );
        assert_eq!(output.glyph_bounds.line_height(), 950);
    }

    #[test]
    fn slices_keep_whole_clusters() {
        let text: Vec<char> = "abcd".chars().collect();
        let mut output = run(&text, 10);
        output.glyphs[1].rune_count = 2;
        output.glyphs.remove(2);
        let slice = output.slice(2, 4);
        assert_eq!(slice.runes, Range::new(2, 2));
        assert_eq!(slice.glyphs.len(), 1);
        assert_eq!(slice.glyphs[0].cluster_index, 3);
        assert_eq!(slice.advance, 10);
        let slice = output.slice(1, 3);
        assert_eq!(slice.glyphs.len(), 1);
        assert_eq!(slice.advance, 10);
    }

    #[test]
    fn trimming_letter_spacing() {
        let text: Vec<char> = "abc".chars().collect();
        let mut output = run(&text, 10);
        output.add_letter_spacing(8, false, false);
        output.trim_start_spacing(0);
        output.trim_end_spacing();
        assert_eq!(advances(&output), [14, 18, 14]);
        assert_eq!(output.glyphs[0].x_offset, 0);
    }
}
