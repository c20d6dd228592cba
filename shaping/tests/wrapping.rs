use std::sync::Arc;

use font_test_data::fonts;
use fontface::{Face, Font, GlyphId};
use pretty_assertions::assert_eq;
use rand::{rngs::StdRng, Rng, SeedableRng};
use shaping::{Direction, Glyph, Input, LineWrapper, Output, Range, Segmenter};

/// Maps each rune to its nominal glyph, advancing by the glyph advance in
/// font units.
fn shape<'f>(input: &Input<'_, 'f>) -> Output<'f> {
    let face = input.face.clone().unwrap();
    let mut glyphs: Vec<_> = (input.run_start..input.run_end)
        .map(|ix| {
            let glyph_id = face.nominal_glyph(input.text[ix]).unwrap_or_default();
            let advance = face.horizontal_advance(glyph_id).unwrap_or_default();
            Glyph::new(glyph_id, ix, advance as i32)
        })
        .collect();
    if input.direction == Direction::RightToLeft {
        glyphs.reverse();
    }
    let mut output = Output {
        size: input.size,
        glyphs,
        face: input.face.clone(),
        runes: Range::new(input.run_start, input.len()),
        direction: input.direction,
        bidi_level: input.bidi_level,
        ..Default::default()
    };
    output.recalculate();
    output
}

#[test]
fn segment_shape_and_wrap() {
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
    let text: Vec<char> = "AB ab".chars().collect();
    let input = Input::new(&text, 1000 << 6);
    let runs: Vec<_> = Segmenter::new()
        .split(&input, &mut fontmap)
        .iter()
        .map(shape)
        .collect();
    assert_eq!(runs.len(), 2);
    assert_eq!(runs[0].advance, 600 + 700 + 500);
    assert_eq!(runs[1].advance, 1000);

    let lines = LineWrapper::default().wrap_paragraph(&text, &runs, 2000);
    let ranges: Vec<_> = lines.iter().map(|line| line.range).collect();
    assert_eq!(ranges, [Range::new(0, 3), Range::new(3, 2)]);
    assert_eq!(lines[0].width, 1800);
    assert_eq!(lines[1].width, 1000);
}

#[test]
fn mixed_direction_lines_are_reordered() {
    let data = fonts::glyf_font();
    let face = Arc::new(Face::new(Font::load(&data).unwrap()));
    let mut fontmap = |_: char| Some(face.clone());
    let text: Vec<char> = "ab \u{5D0}\u{5D1} \u{5D2}\u{5D3} cd".chars().collect();
    let input = Input::new(&text, 0);
    let runs: Vec<_> = Segmenter::new()
        .split(&input, &mut fontmap)
        .iter()
        .map(shape)
        .collect();
    let mut lines = LineWrapper::default().wrap_paragraph(&text, &runs, i32::MAX);
    assert_eq!(lines.len(), 1);
    let line = &mut lines[0];
    line.reorder_visual();
    let levels: Vec<_> = line.runs.iter().map(|run| run.bidi_level).collect();
    assert_eq!(levels, [0, 1, 0]);
    let clusters: Vec<_> = line.runs[1]
        .glyphs
        .iter()
        .map(|glyph| glyph.cluster_index)
        .collect();
    assert_eq!(clusters, [7, 6, 5, 4, 3]);
}

const ALPHABET: &[char] = &['a', 'b', ' ', ' ', '-', '\n', '\u{E9}', '\u{4E2D}', '\u{5D0}'];

/// Builds runs over `text` with random cluster sizes and advances.
fn random_runs(rng: &mut StdRng, len: usize) -> Vec<Output<'static>> {
    let mut runs = Vec::new();
    let mut start = 0;
    while start < len {
        let end = rng.gen_range(start + 1..=len);
        let mut glyphs = Vec::new();
        let mut cluster = start;
        while cluster < end {
            let rune_count = rng.gen_range(1..=3).min(end - cluster);
            let glyph_count = rng.gen_range(1..=2);
            for _ in 0..glyph_count {
                let mut glyph = Glyph::new(GlyphId::new(7), cluster, rng.gen_range(0..50));
                glyph.rune_count = rune_count;
                glyph.glyph_count = glyph_count;
                glyphs.push(glyph);
            }
            cluster += rune_count;
        }
        let rtl = rng.gen_bool(0.3);
        if rtl {
            glyphs.reverse();
        }
        let mut output = Output {
            glyphs,
            runes: Range::new(start, end - start),
            direction: if rtl {
                Direction::RightToLeft
            } else {
                Direction::LeftToRight
            },
            bidi_level: rtl as u8,
            ..Default::default()
        };
        output.recompute_advance();
        runs.push(output);
        start = end;
    }
    runs
}

#[test]
fn lines_account_for_every_rune() {
    let mut rng = StdRng::seed_from_u64(0x11e5);
    let mut wrapper = LineWrapper::default();
    for _ in 0..300 {
        let len = rng.gen_range(0..60);
        let text: Vec<char> = (0..len)
            .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())])
            .collect();
        let mut runs = random_runs(&mut rng, len);
        if rng.gen_bool(0.5) {
            runs.reverse();
        }
        let max_width = rng.gen_range(0..400);
        let lines = wrapper.wrap_paragraph(&text, &runs, max_width);

        if len == 0 {
            assert!(lines.is_empty());
            continue;
        }
        let mut next = 0;
        for line in &lines {
            assert_eq!(line.range.offset, next, "{text:?}");
            assert!(line.range.count > 0);
            next = line.range.end();
        }
        assert_eq!(next, len, "{text:?}");
        let counted: usize = lines.iter().map(|line| line.range.count).sum();
        assert_eq!(counted, len);

        // no line ends inside a cluster
        for line in &lines[..lines.len() - 1] {
            let boundary = line.range.end();
            for glyph in runs.iter().flat_map(|run| run.glyphs.iter()) {
                let start = glyph.cluster_index;
                assert!(
                    !(start < boundary && boundary < start + glyph.rune_count),
                    "break at {boundary} splits cluster at {start} in {text:?}"
                );
            }
        }

        // every glyph lands on exactly one line
        let shaped: usize = runs.iter().map(|run| run.glyphs.len()).sum();
        let placed: usize = lines
            .iter()
            .flat_map(|line| line.runs.iter())
            .map(|run| run.glyphs.len())
            .sum();
        assert_eq!(placed, shaped);
        for line in &lines {
            for run in &line.runs {
                assert!(run
                    .glyphs
                    .iter()
                    .all(|glyph| line.range.contains(glyph.cluster_index)));
            }
        }
    }
}
