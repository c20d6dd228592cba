use std::sync::Arc;

use font_test_data::fonts;
use fontface::{Face, Font};
use rand::{rngs::StdRng, Rng, SeedableRng};
use shaping::{Direction, Input, Script, Segmenter};

fn chars(text: &str) -> Vec<char> {
    text.chars().collect()
}

#[test]
fn faces_follow_coverage() {
    let glyf_data = fonts::glyf_font();
    let cff_data = fonts::cff_font();
    let upper = Arc::new(Face::new(Font::load(&glyf_data).unwrap()));
    let lower = Arc::new(Face::new(Font::load(&cff_data).unwrap()));
    let mut fontmap = |ch: char| {
        if ch.is_uppercase() {
            Some(upper.clone())
        } else {
            Some(lower.clone())
        }
    };
    let text = chars("AB xy C");
    let input = Input::new(&text, 12 << 6).with_language("en");
    let fragments = Segmenter::new().split(&input, &mut fontmap);
    let ranges: Vec<_> = fragments
        .iter()
        .map(|input| (input.run_start, input.run_end))
        .collect();
    assert_eq!(ranges, [(0, 3), (3, 6), (6, 7)]);
    let faces: Vec<_> = fragments
        .iter()
        .map(|input| Arc::ptr_eq(input.face.as_ref().unwrap(), &upper))
        .collect();
    assert_eq!(faces, [true, false, true]);
    assert!(fragments
        .iter()
        .all(|input| input.language == "en" && input.size == 12 << 6));
    assert!(fragments.iter().all(|input| input.script == Script::Latin));
}

const ALPHABET: &[char] = &[
    'a', 'Z', ' ', '(', ')', '[', ']', '1', '.', '\n', '\u{200D}', '\u{301}', '\u{5D0}',
    '\u{5D1}', '\u{3B1}', '\u{627}', '\u{4E2D}', '\u{E0001}',
];

#[test]
fn fragments_partition_the_input() {
    let _ = env_logger::builder().is_test(true).try_init();
    let glyf_data = fonts::glyf_font();
    let cff_data = fonts::cff_font();
    let faces = [
        Arc::new(Face::new(Font::load(&glyf_data).unwrap())),
        Arc::new(Face::new(Font::load(&cff_data).unwrap())),
    ];
    let mut rng = StdRng::seed_from_u64(0x5e6);
    let mut segmenter = Segmenter::new();
    for _ in 0..500 {
        let len = rng.gen_range(0..40);
        let text: Vec<char> = (0..len)
            .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())])
            .collect();
        let mut input = Input::new(&text, 16 << 6).with_direction(match rng.gen_range(0..4) {
            0 => Direction::RightToLeft,
            1 => Direction::TopToBottom,
            _ => Direction::LeftToRight,
        });
        input.run_start = rng.gen_range(0..=len);
        input.run_end = rng.gen_range(input.run_start..=len);
        let mut fontmap = |ch: char| match ch as u32 % 3 {
            0 => None,
            1 => Some(faces[0].clone()),
            _ => Some(faces[1].clone()),
        };
        let fragments = segmenter.split(&input, &mut fontmap);

        assert!(!fragments.is_empty());
        assert_eq!(fragments[0].run_start, input.run_start, "{text:?}");
        assert_eq!(
            fragments.last().unwrap().run_end,
            input.run_end,
            "{text:?}"
        );
        for pair in fragments.windows(2) {
            assert_eq!(pair[0].run_end, pair[1].run_start, "{text:?}");
        }
        if !input.is_empty() {
            assert!(fragments.iter().all(|fragment| !fragment.is_empty()));
        }
        if input.direction == Direction::TopToBottom {
            assert!(fragments
                .iter()
                .all(|fragment| fragment.direction == Direction::TopToBottom));
        }
    }
}
