//! Splitting text into runs of uniform direction, script and face.

use std::mem;

use unicode_bidi::{get_base_direction, BidiInfo, Level};
use unicode_script::{Script, UnicodeScript};

use crate::{same_face, Direction, FaceRef, Input};

/// Chooses the face used to display a character.
pub trait Fontmap<'f> {
    /// Returns the face for `ch`, or `None` if no face supports it.
    fn resolve_face(&mut self, ch: char) -> Option<FaceRef<'f>>;
}

impl<'f, F> Fontmap<'f> for F
where
    F: FnMut(char) -> Option<FaceRef<'f>>,
{
    fn resolve_face(&mut self, ch: char) -> Option<FaceRef<'f>> {
        self(ch)
    }
}

/// A fragment of the input under construction.
#[derive(Clone, Debug)]
struct Run<'f> {
    start: usize,
    end: usize,
    direction: Direction,
    level: u8,
    script: Script,
    face: Option<FaceRef<'f>>,
}

#[derive(Clone, Copy, Debug)]
struct Delimiter {
    index: usize,
    script: Script,
}

/// Splits text into runs that can each be shaped with one face, in one
/// script and direction.
///
/// A segmenter keeps its intermediate buffers between calls to
/// [`split`](Self::split), so reusing one instance avoids most allocations.
/// It needs `&mut self` and each thread should own its own instance.
#[derive(Debug, Default)]
pub struct Segmenter<'f> {
    input: Vec<Run<'f>>,
    output: Vec<Run<'f>>,
    delimiters: Vec<Delimiter>,
    text: String,
}

impl<'f> Segmenter<'f> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Splits `input` into fragments by bidi level, then by script and
    /// finally by the face `fontmap` resolves for each character.
    ///
    /// The fragments are in logical order and partition
    /// `input.run_start..input.run_end`. The language, features and size of
    /// `input` are copied to every fragment.
    pub fn split<'t>(
        &mut self,
        input: &Input<'t, 'f>,
        fontmap: &mut impl Fontmap<'f>,
    ) -> Vec<Input<'t, 'f>> {
        let start = input.run_start.min(input.text.len());
        let end = input.run_end.clamp(start, input.text.len());
        let text = &input.text[..end];
        self.input.clear();
        self.output.clear();

        self.split_by_bidi(text, start, input);
        self.swap();
        self.split_by_script(text);
        self.swap();
        self.split_by_face(text, fontmap);

        self.output
            .iter()
            .map(|run| {
                input.fragment(
                    run.start,
                    run.end,
                    run.direction,
                    run.level,
                    run.script,
                    run.face.clone(),
                )
            })
            .collect()
    }

    fn swap(&mut self) {
        mem::swap(&mut self.input, &mut self.output);
        self.output.clear();
    }

    fn split_by_bidi(&mut self, text: &[char], start: usize, input: &Input<'_, 'f>) {
        let end = text.len();
        let whole = Run {
            start,
            end,
            direction: input.direction,
            level: input.bidi_level,
            script: input.script,
            face: input.face.clone(),
        };
        if !input.direction.is_horizontal() || start == end {
            self.output.push(whole);
            return;
        }
        self.text.clear();
        self.text.extend(&text[start..end]);
        let paragraph_level = match get_base_direction(self.text.as_str()) {
            unicode_bidi::Direction::Ltr => Level::ltr(),
            unicode_bidi::Direction::Rtl => Level::rtl(),
            unicode_bidi::Direction::Mixed if input.direction == Direction::RightToLeft => {
                Level::rtl()
            }
            unicode_bidi::Direction::Mixed => Level::ltr(),
        };
        let info = BidiInfo::new(&self.text, Some(paragraph_level));
        let mut current = whole;
        for (i, (byte, _)) in self.text.char_indices().enumerate() {
            let level = info
                .levels
                .get(byte)
                .map(|level| level.number())
                .unwrap_or(paragraph_level.number());
            let rune = start + i;
            if rune == start {
                current.level = level;
                current.direction = Direction::from_bidi_level(level);
            } else if level != current.level {
                let mut next = current.clone();
                current.end = rune;
                self.output.push(current);
                next.start = rune;
                next.level = level;
                next.direction = Direction::from_bidi_level(level);
                current = next;
            }
        }
        current.end = end;
        self.output.push(current);
    }

    fn split_by_script(&mut self, text: &[char]) {
        for run in &self.input {
            let mut current = run.clone();
            current.script = Script::Common;
            self.delimiters.clear();
            for (i, &ch) in text.iter().enumerate().take(run.end).skip(run.start) {
                let mut script = ch.script();
                if is_weak_script(script) {
                    if let Some(index) = paired_delimiter(ch) {
                        if index % 2 == 0 {
                            self.delimiters.push(Delimiter {
                                index,
                                script: current.script,
                            });
                        } else {
                            let opening = self
                                .delimiters
                                .iter()
                                .rposition(|delimiter| delimiter.index == index - 1);
                            if let Some(pos) = opening {
                                script = self.delimiters[pos].script;
                            }
                            self.delimiters.truncate(opening.unwrap_or(0));
                        }
                    }
                }
                if is_weak_script(script) || script == current.script {
                    continue;
                }
                if current.script == Script::Common {
                    // the pending delimiters were opened in this run
                    for delimiter in &mut self.delimiters {
                        if delimiter.script == Script::Common {
                            delimiter.script = script;
                        }
                    }
                    current.script = script;
                } else {
                    let mut next = run.clone();
                    next.start = i;
                    next.script = script;
                    current.end = i;
                    self.output.push(mem::replace(&mut current, next));
                }
            }
            current.end = run.end;
            self.output.push(current);
        }
    }

    fn split_by_face(&mut self, text: &[char], fontmap: &mut impl Fontmap<'f>) {
        for run in &self.input {
            let mut current = run.clone();
            for (i, &ch) in text.iter().enumerate().take(run.end).skip(run.start) {
                if current.face.is_some() && ignores_face_change(ch) {
                    continue;
                }
                let face = fontmap.resolve_face(ch);
                if i == run.start {
                    current.face = face;
                } else if !same_face(face.as_ref(), current.face.as_ref()) {
                    let mut next = run.clone();
                    next.start = i;
                    next.face = face;
                    current.end = i;
                    self.output.push(mem::replace(&mut current, next));
                }
            }
            current.end = run.end;
            self.output.push(current);
        }
    }
}

/// Scripts that take on the script of the surrounding text.
fn is_weak_script(script: Script) -> bool {
    matches!(
        script,
        Script::Common | Script::Inherited | Script::Unknown
    )
}

/// Opening delimiters are at even indices, each followed by its closing
/// counterpart. Sorted by code point.
const PAIRED_DELIMITERS: &[char] = &[
    '\u{0028}', '\u{0029}', '\u{003C}', '\u{003E}', '\u{005B}', '\u{005D}', '\u{007B}', '\u{007D}',
    '\u{00AB}', '\u{00BB}', '\u{2018}', '\u{2019}', '\u{201C}', '\u{201D}', '\u{2039}', '\u{203A}',
    '\u{3008}', '\u{3009}', '\u{300A}', '\u{300B}', '\u{300C}', '\u{300D}', '\u{300E}', '\u{300F}',
    '\u{3010}', '\u{3011}', '\u{3014}', '\u{3015}', '\u{3016}', '\u{3017}', '\u{3018}', '\u{3019}',
    '\u{301A}', '\u{301B}',
];

fn paired_delimiter(ch: char) -> Option<usize> {
    PAIRED_DELIMITERS.binary_search(&ch).ok()
}

/// Default ignorable code points, from DerivedCoreProperties.txt.
const DEFAULT_IGNORABLES: &[(u32, u32)] = &[
    (0x00AD, 0x00AD),
    (0x034F, 0x034F),
    (0x061C, 0x061C),
    (0x115F, 0x1160),
    (0x17B4, 0x17B5),
    (0x180B, 0x180F),
    (0x200B, 0x200F),
    (0x202A, 0x202E),
    (0x2060, 0x206F),
    (0x3164, 0x3164),
    (0xFE00, 0xFE0F),
    (0xFEFF, 0xFEFF),
    (0xFFA0, 0xFFA0),
    (0xFFF0, 0xFFF8),
    (0x1BCA0, 0x1BCA3),
    (0x1D173, 0x1D17A),
    (0xE0000, 0xE0FFF),
];

fn is_default_ignorable(ch: char) -> bool {
    let cp = ch as u32;
    DEFAULT_IGNORABLES
        .binary_search_by(|&(start, end)| {
            if end < cp {
                std::cmp::Ordering::Less
            } else if start > cp {
                std::cmp::Ordering::Greater
            } else {
                std::cmp::Ordering::Equal
            }
        })
        .is_ok()
}

/// Returns true for characters that are displayed with the face of the
/// surrounding text: controls, separators other than the ogham space mark
/// and default ignorables.
fn ignores_face_change(ch: char) -> bool {
    let is_control = matches!(ch, '\u{0000}'..='\u{001F}' | '\u{007F}'..='\u{009F}');
    let is_separator = matches!(
        ch,
        '\u{0020}'
            | '\u{00A0}'
            | '\u{2000}'..='\u{200A}'
            | '\u{2028}'
            | '\u{2029}'
            | '\u{202F}'
            | '\u{205F}'
            | '\u{3000}'
    );
    is_control || is_separator || is_default_ignorable(ch)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(text: &str) -> Vec<char> {
        text.chars().collect()
    }

    fn no_faces(_: char) -> Option<FaceRef<'static>> {
        None
    }

    fn ranges(fragments: &[Input]) -> Vec<(usize, usize)> {
        fragments
            .iter()
            .map(|input| (input.run_start, input.run_end))
            .collect()
    }

    #[test]
    fn bidi_runs() {
        let text = chars("abc \u{5D0}\u{5D1}\u{5D2} def");
        let input = Input::new(&text, 0);
        let mut segmenter = Segmenter::new();
        let fragments = segmenter.split(&input, &mut no_faces);
        assert_eq!(ranges(&fragments), [(0, 4), (4, 7), (7, 11)]);
        let directions: Vec<_> = fragments.iter().map(|input| input.direction).collect();
        assert_eq!(
            directions,
            [
                Direction::LeftToRight,
                Direction::RightToLeft,
                Direction::LeftToRight
            ]
        );
        assert_eq!(fragments[1].script, Script::Hebrew);
    }

    #[test]
    fn vertical_text_skips_bidi() {
        let text = chars("\u{5D0}\u{5D1}");
        let input = Input::new(&text, 0).with_direction(Direction::TopToBottom);
        let fragments = Segmenter::new().split(&input, &mut no_faces);
        assert_eq!(ranges(&fragments), [(0, 2)]);
        assert_eq!(fragments[0].direction, Direction::TopToBottom);
    }

    #[test]
    fn neutral_text_uses_input_direction() {
        let text = chars("?! ");
        let input = Input::new(&text, 0).with_direction(Direction::RightToLeft);
        let fragments = Segmenter::new().split(&input, &mut no_faces);
        assert_eq!(fragments[0].bidi_level % 2, 1);
    }

    #[test]
    fn common_script_joins_neighbors() {
        let text = chars("(abc) \u{3B1}\u{3B2}");
        let input = Input::new(&text, 0);
        let fragments = Segmenter::new().split(&input, &mut no_faces);
        assert_eq!(ranges(&fragments), [(0, 6), (6, 8)]);
        assert_eq!(fragments[0].script, Script::Latin);
        assert_eq!(fragments[1].script, Script::Greek);
    }

    #[test]
    fn closing_delimiter_takes_opening_script() {
        let text = chars("\u{430}\u{431}\u{432} (xyz)");
        let input = Input::new(&text, 0);
        let fragments = Segmenter::new().split(&input, &mut no_faces);
        assert_eq!(ranges(&fragments), [(0, 5), (5, 8), (8, 9)]);
        let scripts: Vec<_> = fragments.iter().map(|input| input.script).collect();
        assert_eq!(scripts, [Script::Cyrillic, Script::Latin, Script::Cyrillic]);
    }

    #[test]
    fn unmatched_closing_delimiter_clears_stack() {
        let text = chars("a) \u{3B1}");
        let input = Input::new(&text, 0);
        let fragments = Segmenter::new().split(&input, &mut no_faces);
        assert_eq!(ranges(&fragments), [(0, 3), (3, 4)]);
    }

    #[test]
    fn sub_range_is_respected() {
        let text = chars("skip abc \u{3B1}\u{3B2} skip");
        let mut input = Input::new(&text, 0);
        input.run_start = 5;
        input.run_end = 11;
        let fragments = Segmenter::new().split(&input, &mut no_faces);
        assert_eq!(ranges(&fragments), [(5, 9), (9, 11)]);
    }

    #[test]
    fn empty_input_gives_one_empty_fragment() {
        let input = Input::new(&[], 0);
        let fragments = Segmenter::new().split(&input, &mut no_faces);
        assert_eq!(ranges(&fragments), [(0, 0)]);
    }

    #[test]
    fn delimiter_table_is_sorted() {
        assert!(PAIRED_DELIMITERS.windows(2).all(|pair| pair[0] < pair[1]));
        assert_eq!(paired_delimiter('('), Some(0));
        assert_eq!(paired_delimiter(')'), Some(1));
        assert_eq!(paired_delimiter('\u{201D}'), Some(13));
        assert_eq!(paired_delimiter('a'), None);
    }

    #[test]
    fn ignorables() {
        for ch in [' ', '\n', '\u{00A0}', '\u{200D}', '\u{FE0F}', '\u{E0001}'] {
            assert!(ignores_face_change(ch), "{ch:?}");
        }
        for ch in ['a', '\u{1680}', '\u{5D0}', '1'] {
            assert!(!ignores_face_change(ch), "{ch:?}");
        }
    }
}
