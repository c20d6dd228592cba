use std::sync::Arc;

use font_test_data::{build_collection, fonts};
use fontface::{Face, Font, GlyphData, GlyphExtents, GlyphId, OutlineFormat, Size};
use pretty_assertions::assert_eq;

#[test]
fn faces_share_one_font() {
    let data = fonts::cff_font();
    let font = Arc::new(Font::load(&data).unwrap());
    assert_eq!(font.outlines().format(), Some(OutlineFormat::Cff));
    let small = Face::new(font.clone());
    let large = Face::new(font.clone());
    small.set_ppem(8, 8);
    large.set_ppem(96, 96);
    let square = GlyphExtents {
        x_bearing: 100.0,
        y_bearing: 400.0,
        width: 300.0,
        height: -300.0,
    };
    let glyph_id = small.nominal_glyph('A').unwrap();
    assert_eq!(small.glyph_extents(glyph_id), Some(square));
    assert_eq!(large.glyph_extents(glyph_id), Some(square));
    assert_eq!(Arc::strong_count(&font), 3);
}

#[test]
fn glyph_queries_never_fail_loudly() {
    let data = fonts::glyf_font();
    let face = Face::new(Font::load(&data).unwrap());
    for id in [4, 100, 0xFFFF, u32::MAX] {
        let glyph_id = GlyphId::new(id);
        assert_eq!(face.glyph_extents(glyph_id), None);
        assert_eq!(face.horizontal_advance(glyph_id), None);
        assert_eq!(face.glyph_data(glyph_id), None);
    }
    assert!(matches!(
        face.glyph_data(GlyphId::new(1)),
        Some(GlyphData::Outline(commands)) if commands.len() == 4
    ));
}

#[test]
fn collection_round_trip() {
    let data = build_collection(&[fonts::cff_font(), fonts::glyf_font()]);
    let fonts: Vec<_> = Font::load_collection(&data)
        .into_iter()
        .map(Result::unwrap)
        .collect();
    assert_eq!(fonts.len(), 2);
    assert_eq!(fonts[1].collection_index(), Some(1));
    assert_eq!(fonts[1].kerning(GlyphId::new(104), GlyphId::new(504)), -42);
    let metrics = fonts[0].metrics(Size::new(2000.0), &[]);
    assert_eq!(metrics.ascent, 1600.0);
    assert_eq!(metrics.descent, -400.0);
}
