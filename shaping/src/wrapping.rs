//! Breaking shaped runs into lines.

use unicode_linebreak::{linebreaks, BreakOpportunity};

use crate::{Output, Range};

/// Options for [`LineWrapper`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WrapConfig {
    /// Ignore break opportunities that fall inside a glyph cluster.
    ///
    /// Without this, a ligature formed across a break opportunity may be
    /// split between lines, with all of its glyphs on the first one.
    pub cluster_safe_breaks: bool,
    /// Let whitespace at the end of a line extend past the maximum width.
    pub hang_trailing_whitespace: bool,
}

impl Default for WrapConfig {
    fn default() -> Self {
        Self {
            cluster_safe_breaks: true,
            hang_trailing_whitespace: true,
        }
    }
}

/// A position where a line may end.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BreakOption {
    /// Index of the first rune of the next line.
    pub break_at: usize,
    /// Cost of breaking here. Lower is better and [`Self::MANDATORY`] forces
    /// a break.
    pub penalty: i32,
}

impl BreakOption {
    pub const MANDATORY: i32 = i32::MIN;

    pub fn is_mandatory(&self) -> bool {
        self.penalty == Self::MANDATORY
    }
}

/// Returns the UAX #14 line break opportunities of `text`.
///
/// The end of the text is always a mandatory break.
pub fn break_options(text: &[char]) -> Vec<BreakOption> {
    let mut options = Vec::new();
    collect_break_options(text, &mut String::new(), &mut options);
    options
}

fn collect_break_options(text: &[char], buffer: &mut String, options: &mut Vec<BreakOption>) {
    buffer.clear();
    buffer.extend(text);
    options.clear();
    let mut rune = 0;
    let mut byte = 0;
    for (position, opportunity) in linebreaks(buffer.as_str()) {
        while byte < position {
            let Some(ch) = text.get(rune) else {
                break;
            };
            byte += ch.len_utf8();
            rune += 1;
        }
        let penalty = match opportunity {
            BreakOpportunity::Mandatory => BreakOption::MANDATORY,
            BreakOpportunity::Allowed => 0,
        };
        options.push(BreakOption {
            break_at: rune,
            penalty,
        });
    }
}

/// A line of shaped text.
#[derive(Clone, Debug)]
pub struct Line<'f> {
    /// The parts of the shaped runs on this line.
    ///
    /// Runs are in logical order, use [`reorder_visual`](Self::reorder_visual)
    /// to get them in display order.
    pub runs: Vec<Output<'f>>,
    /// Runes of the paragraph on this line.
    pub range: Range,
    /// Sum of the advances of the runs, including trailing whitespace.
    pub width: i32,
}

impl Line<'_> {
    /// Reorders the runs from logical to visual order, following rule L2 of
    /// the Unicode bidirectional algorithm.
    ///
    /// From the highest bidi level down to the lowest odd level, every
    /// sequence of runs at that level or higher is reversed.
    pub fn reorder_visual(&mut self) {
        let Some(highest) = self.runs.iter().map(|run| run.bidi_level).max() else {
            return;
        };
        let Some(lowest_odd) = self
            .runs
            .iter()
            .map(|run| run.bidi_level)
            .filter(|level| level % 2 == 1)
            .min()
        else {
            return;
        };
        for level in (lowest_odd..=highest).rev() {
            let mut start = 0;
            while start < self.runs.len() {
                if self.runs[start].bidi_level < level {
                    start += 1;
                    continue;
                }
                let mut end = start + 1;
                while end < self.runs.len() && self.runs[end].bidi_level >= level {
                    end += 1;
                }
                self.runs[start..end].reverse();
                start = end;
            }
        }
    }
}

/// Cluster a rune belongs to: the index of its run and the first rune of the
/// cluster.
type ClusterId = (usize, usize);

const UNSHAPED: usize = usize::MAX;

/// Breaks shaped paragraphs into lines of a maximum width.
///
/// Lines end at UAX #14 break opportunities and are filled greedily. When
/// even the first opportunity on a line overflows, the line ends there
/// anyway, so a word wider than the maximum gets a line of its own.
///
/// Buffers are kept between calls to [`wrap_paragraph`](Self::wrap_paragraph).
#[derive(Debug, Default)]
pub struct LineWrapper {
    config: WrapConfig,
    text: String,
    breaks: Vec<BreakOption>,
    clusters: Vec<ClusterId>,
    /// Advance of the cluster starting at each rune, then prefix sums.
    widths: Vec<i64>,
}

impl LineWrapper {
    pub fn new(config: WrapConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    pub fn config(&self) -> WrapConfig {
        self.config
    }

    /// Wraps the shaped `runs` of the paragraph `text` into lines no wider
    /// than `max_width`.
    ///
    /// The runs may be given in any order and should together cover the
    /// runes of `text`. The rune ranges of the returned lines are contiguous
    /// and cover the whole paragraph.
    pub fn wrap_paragraph<'f>(
        &mut self,
        text: &[char],
        runs: &[Output<'f>],
        max_width: i32,
    ) -> Vec<Line<'f>> {
        if text.is_empty() {
            return Vec::new();
        }
        let mut runs: Vec<&Output<'f>> = runs.iter().collect();
        runs.sort_by_key(|run| run.runes.offset);
        self.map_clusters(text, &runs);
        collect_break_options(text, &mut self.text, &mut self.breaks);

        let max_width = i64::from(max_width);
        let mut lines = Vec::new();
        let mut line_start = 0;
        let mut candidate = None;
        for option in &self.breaks {
            let break_at = option.break_at.min(text.len());
            if break_at <= line_start || !self.is_allowed(text.len(), break_at) {
                continue;
            }
            if self.measure(text, line_start, break_at) > max_width {
                if let Some(end) = candidate.take() {
                    lines.push(make_line(&runs, text.len(), line_start, end));
                    line_start = end;
                }
            }
            candidate = Some(break_at);
            if option.is_mandatory() {
                lines.push(make_line(&runs, text.len(), line_start, break_at));
                line_start = break_at;
                candidate = None;
            }
        }
        if line_start < text.len() {
            lines.push(make_line(&runs, text.len(), line_start, text.len()));
        }
        lines
    }

    /// Records the cluster of every rune and the advance of every cluster.
    fn map_clusters(&mut self, text: &[char], runs: &[&Output]) {
        let len = text.len();
        self.clusters.clear();
        self.clusters.resize(len, (UNSHAPED, UNSHAPED));
        self.widths.clear();
        self.widths.resize(len + 1, 0);
        for (run_ix, run) in runs.iter().enumerate() {
            let vertical = run.direction.is_vertical();
            for glyph in &run.glyphs {
                let start = glyph.cluster_index;
                if start >= len {
                    log::debug!("glyph cluster {start} outside of a paragraph of {len} runes");
                    continue;
                }
                self.widths[start + 1] += i64::from(glyph.advance(vertical));
                let end = (start + glyph.rune_count.max(1)).min(len);
                for cluster in &mut self.clusters[start..end] {
                    *cluster = (run_ix, start);
                }
            }
            // runes without glyphs join the cluster before them
            let mut previous = None;
            for rune in run.runes.offset.min(len)..run.runes.end().min(len) {
                match (self.clusters[rune], previous) {
                    ((UNSHAPED, _), Some(cluster)) => self.clusters[rune] = cluster,
                    ((UNSHAPED, _), None) => self.clusters[rune] = (run_ix, rune),
                    _ => (),
                }
                previous = Some(self.clusters[rune]);
            }
        }
        for (rune, cluster) in self.clusters.iter_mut().enumerate() {
            if cluster.0 == UNSHAPED {
                *cluster = (UNSHAPED, rune);
            }
        }
        for ix in 1..self.widths.len() {
            self.widths[ix] += self.widths[ix - 1];
        }
    }

    fn is_allowed(&self, len: usize, break_at: usize) -> bool {
        !self.config.cluster_safe_breaks
            || break_at >= len
            || self.clusters[break_at - 1] != self.clusters[break_at]
    }

    /// Returns the width of the runes in `start..end`.
    fn measure(&self, text: &[char], start: usize, end: usize) -> i64 {
        let mut end = end;
        if self.config.hang_trailing_whitespace {
            while end > start && text[end - 1].is_whitespace() {
                end -= 1;
            }
        }
        self.widths[end] - self.widths[start]
    }
}

fn make_line<'f>(runs: &[&Output<'f>], len: usize, start: usize, end: usize) -> Line<'f> {
    let mut parts: Vec<Output<'f>> = runs
        .iter()
        .filter(|run| run.runes.offset < end && run.runes.end() > start)
        .map(|run| run.slice(start, end))
        .collect();
    if start > 0 {
        if let Some(first) = parts.first_mut() {
            first.trim_start_spacing(start);
        }
    }
    if end < len {
        if let Some(last) = parts.last_mut() {
            last.trim_end_spacing();
        }
    }
    Line {
        width: parts.iter().map(|part| part.advance).sum(),
        runs: parts,
        range: Range::new(start, end - start),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Direction, Glyph};
    use fontface::GlyphId;
    use pretty_assertions::assert_eq;

    fn chars(text: &str) -> Vec<char> {
        text.chars().collect()
    }

    /// Shapes each rune of `start..end` to one glyph of the given advance.
    fn shape(start: usize, end: usize, advance: i32) -> Output<'static> {
        let mut output = Output {
            glyphs: (start..end)
                .map(|ix| Glyph::new(GlyphId::new(ix as u32), ix, advance))
                .collect(),
            runes: Range::new(start, end - start),
            ..Default::default()
        };
        output.recompute_advance();
        output
    }

    fn ranges(lines: &[Line]) -> Vec<(usize, usize)> {
        lines
            .iter()
            .map(|line| (line.range.offset, line.range.count))
            .collect()
    }

    #[test]
    fn break_opportunities() {
        let options = break_options(&chars("hello world\nfoo"));
        assert_eq!(
            options,
            [
                BreakOption {
                    break_at: 6,
                    penalty: 0
                },
                BreakOption {
                    break_at: 12,
                    penalty: BreakOption::MANDATORY
                },
                BreakOption {
                    break_at: 15,
                    penalty: BreakOption::MANDATORY
                },
            ]
        );
    }

    #[test]
    fn break_opportunities_in_runes() {
        let options = break_options(&chars("\u{E9}t\u{E9} \u{E0} Paris"));
        assert_eq!(options[0].break_at, 4);
        assert_eq!(options[1].break_at, 6);
        assert_eq!(options[2].break_at, 11);
    }

    #[test]
    fn greedy_fill() {
        let text = chars("aaa bbb ccc");
        let runs = [shape(0, 11, 10)];
        let mut wrapper = LineWrapper::default();
        let lines = wrapper.wrap_paragraph(&text, &runs, 70);
        assert_eq!(ranges(&lines), [(0, 8), (8, 3)]);
        assert_eq!(lines[0].width, 80);
        assert_eq!(lines[1].width, 30);

        let mut wrapper = LineWrapper::new(WrapConfig {
            hang_trailing_whitespace: false,
            ..Default::default()
        });
        let lines = wrapper.wrap_paragraph(&text, &runs, 70);
        assert_eq!(ranges(&lines), [(0, 4), (4, 7)]);
    }

    #[test]
    fn overlong_words_get_their_own_line() {
        let text = chars("aaaaaaaaaa bb");
        let runs = [shape(0, 13, 10)];
        let lines = LineWrapper::default().wrap_paragraph(&text, &runs, 30);
        assert_eq!(ranges(&lines), [(0, 11), (11, 2)]);
    }

    #[test]
    fn mandatory_breaks() {
        let text = chars("ab\ncd");
        let runs = [shape(0, 5, 10)];
        let lines = LineWrapper::default().wrap_paragraph(&text, &runs, 1000);
        assert_eq!(ranges(&lines), [(0, 3), (3, 2)]);
    }

    #[test]
    fn empty_paragraph() {
        let lines = LineWrapper::default().wrap_paragraph(&[], &[], 100);
        assert!(lines.is_empty());
    }

    #[test]
    fn breaks_inside_clusters_are_skipped() {
        let text = chars("ab cd");
        let mut run = shape(0, 5, 10);
        // a ligature over "b c"
        run.glyphs[1].rune_count = 3;
        run.glyphs.drain(2..4);
        run.recompute_advance();
        let runs = [run];
        let lines = LineWrapper::default().wrap_paragraph(&text, &runs, 20);
        assert_eq!(ranges(&lines), [(0, 5)]);

        let mut wrapper = LineWrapper::new(WrapConfig {
            cluster_safe_breaks: false,
            ..Default::default()
        });
        let lines = wrapper.wrap_paragraph(&text, &runs, 20);
        assert_eq!(ranges(&lines), [(0, 3), (3, 2)]);
        assert_eq!(lines[0].runs[0].glyphs.len(), 2);
        assert_eq!(lines[1].runs[0].glyphs.len(), 1);
    }

    #[test]
    fn runs_are_split_between_lines() {
        let text = chars("aa bb cc");
        let mut runs = vec![shape(3, 8, 10), shape(0, 3, 20)];
        runs[0].bidi_level = 1;
        runs[0].direction = Direction::RightToLeft;
        runs[0].glyphs.reverse();
        let lines = LineWrapper::default().wrap_paragraph(&text, &runs, 80);
        assert_eq!(ranges(&lines), [(0, 6), (6, 2)]);
        assert_eq!(lines[0].runs.len(), 2);
        assert_eq!(lines[0].runs[0].runes, Range::new(0, 3));
        assert_eq!(lines[0].runs[1].runes, Range::new(3, 3));
        let clusters: Vec<_> = lines[0].runs[1]
            .glyphs
            .iter()
            .map(|glyph| glyph.cluster_index)
            .collect();
        assert_eq!(clusters, [5, 4, 3]);
        assert_eq!(lines[0].width, 90);
        assert_eq!(lines[1].runs.len(), 1);
        assert_eq!(lines[1].width, 20);
    }

    #[test]
    fn letter_spacing_is_trimmed_at_breaks() {
        let text = chars("ab cd");
        let mut run = shape(0, 5, 10);
        run.add_letter_spacing(4, true, true);
        assert_eq!(run.advance, 66);
        let lines = LineWrapper::default().wrap_paragraph(&text, &[run], 40);
        assert_eq!(ranges(&lines), [(0, 3), (3, 2)]);
        assert_eq!(lines[0].width, 12 + 14 + 12);
        assert_eq!(lines[1].width, 12 + 12);
        assert_eq!(lines[1].runs[0].glyphs[0].x_offset, 0);
    }

    #[test]
    fn visual_order() {
        let mut line = Line {
            runs: [0, 1, 1, 2, 0]
                .into_iter()
                .enumerate()
                .map(|(ix, level)| Output {
                    runes: Range::new(ix, 1),
                    bidi_level: level,
                    ..Default::default()
                })
                .collect(),
            range: Range::new(0, 5),
            width: 0,
        };
        line.reorder_visual();
        let order: Vec<_> = line.runs.iter().map(|run| run.runes.offset).collect();
        assert_eq!(order, [0, 3, 2, 1, 4]);
    }

    #[test]
    fn left_to_right_lines_keep_their_order() {
        let mut line = Line {
            runs: [0, 2, 0]
                .into_iter()
                .enumerate()
                .map(|(ix, level)| Output {
                    runes: Range::new(ix, 1),
                    bidi_level: level,
                    ..Default::default()
                })
                .collect(),
            range: Range::new(0, 3),
            width: 0,
        };
        line.reorder_visual();
        let order: Vec<_> = line.runs.iter().map(|run| run.runes.offset).collect();
        assert_eq!(order, [0, 1, 2]);
    }
}
