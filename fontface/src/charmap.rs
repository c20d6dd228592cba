//! Mapping of characters (codepoints, not graphemes) to nominal glyph identifiers.
//!
//! A font may carry several cmap subtables for different platforms and
//! encodings. A [`Charmap`] picks the single best one according to a fixed
//! priority list and wraps it so that lookups always take Unicode input:
//!
//! 1. Microsoft Symbol (3, 0), remapped according to the legacy [`FontPage`]
//! 2. Unicode full repertoire (3, 10), (0, 4) and (0, 6)
//! 3. Unicode BMP (3, 1) and the remaining Unicode platform encodings
//! 4. Macintosh Roman (1, 0), translated through the MacRoman charset
//! 5. any other Macintosh subtable, restricted to ASCII
//! 6. the first subtable that parses
//!
//! Unicode variation sequences come from a separate format 14 subtable,
//! exposed as [`VariationSelectors`].

use std::ops::RangeInclusive;

use opentype::{
    tables::{
        cmap::{Cmap, Cmap14, Cmap14Iter, CmapIter, CmapSubtable, MapVariant},
        name::MacRomanMapping,
        os2::Os2,
    },
    types::GlyphId,
    ReadError, TableProvider,
};

const PLATFORM_UNICODE: u16 = 0;
const PLATFORM_MACINTOSH: u16 = 1;
const PLATFORM_ISO: u16 = 2;
const PLATFORM_WINDOWS: u16 = 3;

const ENCODING_MAC_ROMAN: u16 = 0;
const ENCODING_MS_SYMBOL: u16 = 0;
const ENCODING_MS_UNICODE_BMP: u16 = 1;
const ENCODING_MS_UCS_4: u16 = 10;
const ENCODING_UNICODE_2_0_FULL: u16 = 4;
const ENCODING_UNICODE_VARIATION_SEQUENCES: u16 = 5;
const ENCODING_UNICODE_FULL_REPERTOIRE: u16 = 6;

/// Legacy code page hint stored in the high byte of `fsSelection` by
/// version 0 OS/2 tables.
///
/// Symbol fonts built for these pages placed their glyphs in the private use
/// area, so lookups that miss are retried with a remapped codepoint.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Default, Debug)]
pub enum FontPage {
    #[default]
    None,
    SimplifiedArabic,
    TraditionalArabic,
}

impl FontPage {
    const SIMPLIFIED_ARABIC: u16 = 0xB200;
    const TRADITIONAL_ARABIC: u16 = 0xB300;

    /// Reads the font page from an OS/2 table.
    ///
    /// Only version 0 tables carry the hint; later versions reuse the bits.
    pub fn from_os2(os2: &Os2) -> Self {
        if os2.version() != 0 {
            return Self::None;
        }
        match os2.fs_selection() & 0xFF00 {
            Self::SIMPLIFIED_ARABIC => Self::SimplifiedArabic,
            Self::TRADITIONAL_ARABIC => Self::TraditionalArabic,
            _ => Self::None,
        }
    }

    /// Returns the private use codepoint to retry after a symbol lookup for
    /// `codepoint` missed.
    ///
    /// Plain symbol fonts duplicate U+F000..U+F0FF at U+0000..U+00FF. The
    /// Arabic pages store their glyphs at U+F000 plus the Windows-1256 byte
    /// of the character.
    fn remap_symbol(self, codepoint: u32) -> Option<u32> {
        let table = match self {
            Self::None => return (codepoint <= 0xFF).then_some(codepoint + 0xF000),
            Self::SimplifiedArabic => SIMPLIFIED_ARABIC_PUA,
            Self::TraditionalArabic => TRADITIONAL_ARABIC_PUA,
        };
        if (0x20..0x7F).contains(&codepoint) {
            return Some(codepoint + 0xF000);
        }
        let key = u16::try_from(codepoint).ok()?;
        let ix = table.binary_search_by_key(&key, |(ch, _)| *ch).ok()?;
        Some(0xF000 + table[ix].1 as u32)
    }
}

/// Upper half of the Windows-1256 code page, sorted by character.
const WINDOWS_1256_UPPER: &[(u16, u8)] = &[
    (0x00A0, 0xA0),
    (0x00A2, 0xA2),
    (0x00A3, 0xA3),
    (0x00A4, 0xA4),
    (0x00A5, 0xA5),
    (0x00A6, 0xA6),
    (0x00A7, 0xA7),
    (0x00A8, 0xA8),
    (0x00A9, 0xA9),
    (0x00AB, 0xAB),
    (0x00AC, 0xAC),
    (0x00AD, 0xAD),
    (0x00AE, 0xAE),
    (0x00AF, 0xAF),
    (0x00B0, 0xB0),
    (0x00B1, 0xB1),
    (0x00B2, 0xB2),
    (0x00B3, 0xB3),
    (0x00B4, 0xB4),
    (0x00B5, 0xB5),
    (0x00B6, 0xB6),
    (0x00B7, 0xB7),
    (0x00B8, 0xB8),
    (0x00B9, 0xB9),
    (0x00BB, 0xBB),
    (0x00BC, 0xBC),
    (0x00BD, 0xBD),
    (0x00BE, 0xBE),
    (0x00D7, 0xD7),
    (0x00E0, 0xE0),
    (0x00E2, 0xE2),
    (0x00E7, 0xE7),
    (0x00E8, 0xE8),
    (0x00E9, 0xE9),
    (0x00EA, 0xEA),
    (0x00EB, 0xEB),
    (0x00EE, 0xEE),
    (0x00EF, 0xEF),
    (0x00F4, 0xF4),
    (0x00F7, 0xF7),
    (0x00F9, 0xF9),
    (0x00FB, 0xFB),
    (0x00FC, 0xFC),
    (0x0152, 0x8C),
    (0x0153, 0x9C),
    (0x0192, 0x83),
    (0x02C6, 0x88),
    (0x060C, 0xA1),
    (0x061B, 0xBA),
    (0x061F, 0xBF),
    (0x0621, 0xC1),
    (0x0622, 0xC2),
    (0x0623, 0xC3),
    (0x0624, 0xC4),
    (0x0625, 0xC5),
    (0x0626, 0xC6),
    (0x0627, 0xC7),
    (0x0628, 0xC8),
    (0x0629, 0xC9),
    (0x062A, 0xCA),
    (0x062B, 0xCB),
    (0x062C, 0xCC),
    (0x062D, 0xCD),
    (0x062E, 0xCE),
    (0x062F, 0xCF),
    (0x0630, 0xD0),
    (0x0631, 0xD1),
    (0x0632, 0xD2),
    (0x0633, 0xD3),
    (0x0634, 0xD4),
    (0x0635, 0xD5),
    (0x0636, 0xD6),
    (0x0637, 0xD8),
    (0x0638, 0xD9),
    (0x0639, 0xDA),
    (0x063A, 0xDB),
    (0x0640, 0xDC),
    (0x0641, 0xDD),
    (0x0642, 0xDE),
    (0x0643, 0xDF),
    (0x0644, 0xE1),
    (0x0645, 0xE3),
    (0x0646, 0xE4),
    (0x0647, 0xE5),
    (0x0648, 0xE6),
    (0x0649, 0xEC),
    (0x064A, 0xED),
    (0x064B, 0xF0),
    (0x064C, 0xF1),
    (0x064D, 0xF2),
    (0x064E, 0xF3),
    (0x064F, 0xF5),
    (0x0650, 0xF6),
    (0x0651, 0xF8),
    (0x0652, 0xFA),
    (0x0679, 0x8A),
    (0x067E, 0x81),
    (0x0686, 0x8D),
    (0x0688, 0x8F),
    (0x0691, 0x9A),
    (0x0698, 0x8E),
    (0x06A9, 0x98),
    (0x06AF, 0x90),
    (0x06BA, 0x9F),
    (0x06BE, 0xAA),
    (0x06C1, 0xC0),
    (0x06D2, 0xFF),
    (0x200C, 0x9D),
    (0x200D, 0x9E),
    (0x200E, 0xFD),
    (0x200F, 0xFE),
    (0x2013, 0x96),
    (0x2014, 0x97),
    (0x2018, 0x91),
    (0x2019, 0x92),
    (0x201A, 0x82),
    (0x201C, 0x93),
    (0x201D, 0x94),
    (0x201E, 0x84),
    (0x2020, 0x86),
    (0x2021, 0x87),
    (0x2022, 0x95),
    (0x2026, 0x85),
    (0x2030, 0x89),
    (0x2039, 0x8B),
    (0x203A, 0x9B),
    (0x20AC, 0x80),
    (0x2122, 0x99),
];

// Both pages lay out their private use glyphs by Windows-1256 byte.
const SIMPLIFIED_ARABIC_PUA: &[(u16, u8)] = WINDOWS_1256_UPPER;
const TRADITIONAL_ARABIC_PUA: &[(u16, u8)] = WINDOWS_1256_UPPER;

/// How the selected subtable translates Unicode input.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
enum Decoder {
    Unicode,
    Symbol(FontPage),
    MacRoman,
    AsciiOnly,
}

/// The mapping kind of a cmap subtable.
///
/// The ordering is significant and determines the priority of subtable
/// selection (greater is better).
#[derive(Copy, Clone, PartialEq, PartialOrd, Debug)]
enum MappingKind {
    None = 0,
    MacOther = 1,
    MacRoman = 2,
    UnicodeBmp = 3,
    UnicodeFull = 4,
    Symbol = 5,
}

impl MappingKind {
    fn classify(platform_id: u16, encoding_id: u16) -> Self {
        match (platform_id, encoding_id) {
            (PLATFORM_WINDOWS, ENCODING_MS_SYMBOL) => Self::Symbol,
            (PLATFORM_WINDOWS, ENCODING_MS_UCS_4)
            | (PLATFORM_UNICODE, ENCODING_UNICODE_2_0_FULL)
            | (PLATFORM_UNICODE, ENCODING_UNICODE_FULL_REPERTOIRE) => Self::UnicodeFull,
            (PLATFORM_WINDOWS, ENCODING_MS_UNICODE_BMP) | (PLATFORM_UNICODE, _) | (PLATFORM_ISO, _) => {
                Self::UnicodeBmp
            }
            (PLATFORM_MACINTOSH, ENCODING_MAC_ROMAN) => Self::MacRoman,
            (PLATFORM_MACINTOSH, _) => Self::MacOther,
            _ => Self::None,
        }
    }

    fn decoder(self, page: FontPage) -> Decoder {
        match self {
            Self::Symbol => Decoder::Symbol(page),
            Self::MacRoman => Decoder::MacRoman,
            Self::MacOther => Decoder::AsciiOnly,
            Self::None | Self::UnicodeBmp | Self::UnicodeFull => Decoder::Unicode,
        }
    }
}

/// Result of mapping a character with a variation selector.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum GlyphVariant {
    /// The sequence is not covered by the font.
    NotFound,
    /// The selector is recognized but the nominal glyph of the character
    /// should be used.
    UseDefault,
    /// The sequence maps to this glyph.
    Found(GlyphId),
}

impl From<Option<MapVariant>> for GlyphVariant {
    fn from(value: Option<MapVariant>) -> Self {
        match value {
            None => Self::NotFound,
            Some(MapVariant::UseDefault) => Self::UseDefault,
            Some(MapVariant::Variant(gid)) => Self::Found(gid),
        }
    }
}

/// Mapping of characters to nominal glyph identifiers.
#[derive(Clone, Debug)]
pub struct Charmap<'a> {
    subtable: Option<CmapSubtable<'a>>,
    encoding: Option<(u16, u16)>,
    decoder: Decoder,
    variation_selectors: Option<VariationSelectors<'a>>,
}

impl Default for Charmap<'_> {
    fn default() -> Self {
        Self {
            subtable: None,
            encoding: None,
            decoder: Decoder::Unicode,
            variation_selectors: None,
        }
    }
}

impl<'a> Charmap<'a> {
    /// Creates a character map for the given font.
    ///
    /// The font page hint is read from the OS/2 table when present.
    pub fn from_font(font: &impl TableProvider<'a>) -> Result<Self, ReadError> {
        let page = font
            .os2()
            .map(|os2| FontPage::from_os2(&os2))
            .unwrap_or_default();
        Self::new(&font.cmap()?, page)
    }

    /// Selects the best subtable of `cmap`.
    ///
    /// Subtables that fail to parse (including the obsolete format 2) are
    /// skipped. A format 14 subtable outside of the Unicode variation
    /// sequences encoding makes the whole table invalid.
    pub fn new(cmap: &Cmap<'a>, page: FontPage) -> Result<Self, ReadError> {
        let data = cmap.offset_data();
        let mut kind = MappingKind::None;
        let mut charmap = Self::default();
        let records = cmap.encoding_records();
        let mut first_found = None;
        // Equal kinds are resolved in favor of the later record.
        for record in (0..records.len()).rev().filter_map(|ix| records.get(ix)) {
            let (platform_id, encoding_id) = (record.platform_id, record.encoding_id);
            let subtable = match record.subtable(data) {
                Ok(subtable) => subtable,
                Err(e) => {
                    log::debug!("skipping cmap subtable ({platform_id}, {encoding_id}): {e}");
                    continue;
                }
            };
            if let CmapSubtable::Format14(cmap14) = subtable {
                if (platform_id, encoding_id)
                    != (PLATFORM_UNICODE, ENCODING_UNICODE_VARIATION_SEQUENCES)
                {
                    return Err(ReadError::MalformedData(
                        "format 14 cmap subtable outside of the variation sequences encoding",
                    ));
                }
                charmap.variation_selectors = Some(VariationSelectors(cmap14));
                continue;
            }
            if (platform_id, encoding_id) == (PLATFORM_UNICODE, ENCODING_UNICODE_VARIATION_SEQUENCES)
            {
                log::debug!("ignoring format {} subtable for variation sequences", subtable.format());
                continue;
            }
            first_found = Some(((platform_id, encoding_id), subtable.clone()));
            let candidate = MappingKind::classify(platform_id, encoding_id);
            if candidate > kind {
                kind = candidate;
                charmap.decoder = candidate.decoder(page);
                charmap.encoding = Some((platform_id, encoding_id));
                charmap.subtable = Some(subtable);
            }
        }
        if charmap.subtable.is_none() {
            // reverse iteration leaves the first record here
            if let Some((record, subtable)) = first_found {
                charmap.encoding = Some(record);
                charmap.subtable = Some(subtable);
            }
        }
        Ok(charmap)
    }

    /// Returns true if a character mapping subtable was selected.
    pub fn has_map(&self) -> bool {
        self.subtable.is_some()
    }

    /// Returns true if a Microsoft Symbol subtable was selected.
    pub fn is_symbol(&self) -> bool {
        matches!(self.decoder, Decoder::Symbol(_))
    }

    /// The platform and encoding identifiers of the selected subtable.
    pub fn encoding(&self) -> Option<(u16, u16)> {
        self.encoding
    }

    /// The format of the selected subtable.
    pub fn format(&self) -> Option<u16> {
        self.subtable.as_ref().map(CmapSubtable::format)
    }

    /// Maps a character to a nominal glyph identifier.
    ///
    /// Returns `None` if a mapping does not exist.
    pub fn map(&self, ch: impl Into<u32>) -> Option<GlyphId> {
        let subtable = self.subtable.as_ref()?;
        let codepoint = ch.into();
        match self.decoder {
            Decoder::Unicode => subtable.map_codepoint(codepoint),
            Decoder::Symbol(page) => subtable.map_codepoint(codepoint).or_else(|| {
                page.remap_symbol(codepoint)
                    .and_then(|remapped| subtable.map_codepoint(remapped))
            }),
            Decoder::MacRoman => {
                let byte = char::from_u32(codepoint).and_then(|ch| MacRomanMapping.encode(ch))?;
                subtable.map_codepoint(byte)
            }
            Decoder::AsciiOnly => {
                if codepoint < 0x80 {
                    subtable.map_codepoint(codepoint)
                } else {
                    None
                }
            }
        }
    }

    /// Returns an iterator over all mappings of character to nominal glyph
    /// identifier.
    ///
    /// Characters are Unicode scalar values, except for symbol subtables
    /// which report the codes stored in the font.
    pub fn iter(&self) -> Mappings<'a> {
        Mappings {
            inner: self.subtable.as_ref().map(CmapSubtable::iter),
            decoder: self.decoder,
        }
    }

    /// Returns the sorted, non-overlapping ranges of characters that have a
    /// mapping.
    pub fn rune_ranges(&self) -> Vec<RangeInclusive<u32>> {
        let mut runes: Vec<u32> = self.iter().map(|(rune, _)| rune).collect();
        runes.sort_unstable();
        runes.dedup();
        let mut ranges: Vec<RangeInclusive<u32>> = Vec::new();
        for rune in runes {
            match ranges.last_mut() {
                Some(last) if *last.end() + 1 == rune => *last = *last.start()..=rune,
                _ => ranges.push(rune..=rune),
            }
        }
        ranges
    }

    /// Returns the variation sequence mappings, if the font has any.
    pub fn variation_selectors(&self) -> Option<&VariationSelectors<'a>> {
        self.variation_selectors.as_ref()
    }

    /// Maps a character and variation selector to a glyph.
    pub fn map_variant(&self, ch: impl Into<u32>, selector: impl Into<u32>) -> GlyphVariant {
        match &self.variation_selectors {
            Some(selectors) => selectors.map(ch, selector),
            None => GlyphVariant::NotFound,
        }
    }
}

/// Iterator over all mappings of character to nominal glyph identifier
/// in a character map.
///
/// This is created with the [`Charmap::iter`] method.
#[derive(Clone)]
pub struct Mappings<'a> {
    inner: Option<CmapIter<'a>>,
    decoder: Decoder,
}

impl Iterator for Mappings<'_> {
    type Item = (u32, GlyphId);

    fn next(&mut self) -> Option<Self::Item> {
        let inner = self.inner.as_mut()?;
        loop {
            let (code, gid) = inner.next()?;
            match self.decoder {
                Decoder::Unicode | Decoder::Symbol(_) => return Some((code, gid)),
                Decoder::MacRoman => {
                    if let Ok(byte) = u8::try_from(code) {
                        return Some((MacRomanMapping.decode(byte) as u32, gid));
                    }
                }
                Decoder::AsciiOnly => {
                    if code < 0x80 {
                        return Some((code, gid));
                    }
                }
            }
        }
    }
}

/// Unicode variation sequence mappings from a format 14 subtable.
#[derive(Clone, Debug)]
pub struct VariationSelectors<'a>(Cmap14<'a>);

impl<'a> VariationSelectors<'a> {
    /// Maps a character and variation selector to a glyph.
    pub fn map(&self, ch: impl Into<u32>, selector: impl Into<u32>) -> GlyphVariant {
        self.0.map_variant(ch, selector).into()
    }

    /// Returns the variation selectors covered by the subtable, in
    /// increasing order.
    pub fn selectors(&self) -> impl Iterator<Item = u32> + 'a {
        self.0
            .var_selectors()
            .iter()
            .map(|record| record.var_selector.to_u32())
    }

    /// Returns an iterator over all `(character, selector, variant)` triples.
    pub fn iter(&self) -> Cmap14Iter<'a> {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use font_test_data::cmap::{self as test_data, cmap_table};
    use opentype::{FontData, FontRead};
    use pretty_assertions::assert_eq;

    use super::*;

    fn select(subtables: &[(u16, u16, &[u8])]) -> Result<Charmap<'static>, ReadError> {
        let data: &'static [u8] = Vec::leak(cmap_table(subtables));
        let cmap = Cmap::read(FontData::new(data)).unwrap();
        Charmap::new(&cmap, FontPage::None)
    }

    fn gid(id: u32) -> Option<GlyphId> {
        Some(GlyphId::new(id))
    }

    /// Expands the rune ranges and keeps the characters with a mapping.
    fn mappings_by_ranges(charmap: &Charmap) -> BTreeMap<u32, GlyphId> {
        charmap
            .rune_ranges()
            .into_iter()
            .flatten()
            .filter_map(|rune| Some((rune, charmap.map(rune)?)))
            .collect()
    }

    fn mappings_by_iter(charmap: &Charmap) -> BTreeMap<u32, GlyphId> {
        charmap.iter().collect()
    }

    #[test]
    fn format4_lookup() {
        let cmap4 = test_data::cmap4_delta();
        let charmap = select(&[(3, 1, cmap4.as_slice())]).unwrap();
        assert_eq!(charmap.encoding(), Some((3, 1)));
        assert_eq!(charmap.map(10u32), gid(1));
        assert_eq!(charmap.map(20u32), gid(11));
        assert_eq!(charmap.map(0xFFFFu32), None);
        assert_eq!(charmap.map(9u32), None);
        assert_eq!(charmap.rune_ranges(), vec![10..=20]);
    }

    #[test]
    fn ranges_agree_with_iteration() {
        let subtables = [
            test_data::cmap4_delta(),
            test_data::cmap4_glyph_array(),
            test_data::repetitive_cmap4(),
            test_data::cmap6(),
            test_data::cmap10(),
            test_data::cmap12(),
            test_data::cmap13(),
        ];
        for subtable in &subtables {
            let charmap = select(&[(3, 10, subtable.as_slice())]).unwrap();
            let by_iter = mappings_by_iter(&charmap);
            assert!(!by_iter.is_empty());
            assert_eq!(mappings_by_ranges(&charmap), by_iter);
            for (rune, glyph) in &by_iter {
                assert_eq!(charmap.map(*rune), Some(*glyph));
            }
        }
    }

    #[test]
    fn random_format12_groups() {
        use font_test_data::bebuffer::BeBuffer;
        use rand::{rngs::StdRng, Rng, SeedableRng};

        let mut rng = StdRng::seed_from_u64(12);
        for _ in 0..50 {
            let mut expected = BTreeMap::new();
            let mut groups = Vec::new();
            let mut next = rng.gen_range(0..0x100u32);
            for _ in 0..rng.gen_range(1..16) {
                let start = next + rng.gen_range(0..0x800);
                let end = start + rng.gen_range(0..40);
                let start_glyph = rng.gen_range(1..1000u32);
                for (ix, rune) in (start..=end).enumerate() {
                    expected.insert(rune, GlyphId::new(start_glyph + ix as u32));
                }
                groups.push([start, end, start_glyph]);
                next = end + 1;
            }
            let mut subtable = BeBuffer::new()
                .push(12u16)
                .push(0u16)
                .push(16 + 12 * groups.len() as u32)
                .push(0u32)
                .push(groups.len() as u32);
            for group in &groups {
                subtable = subtable.extend(*group);
            }
            let charmap = select(&[(3, 10, subtable.as_slice())]).unwrap();
            assert_eq!(mappings_by_iter(&charmap), expected);
            assert_eq!(mappings_by_ranges(&charmap), expected);
            for _ in 0..200 {
                let rune = rng.gen_range(0..next + 16);
                assert_eq!(charmap.map(rune), expected.get(&rune).copied());
            }
        }
    }

    #[test]
    fn lookup_outside_iteration_misses() {
        let cmap6 = test_data::cmap6();
        let charmap = select(&[(0, 3, cmap6.as_slice())]).unwrap();
        let by_iter = mappings_by_iter(&charmap);
        for rune in 0x20..0x40 {
            assert_eq!(charmap.map(rune).is_some(), by_iter.contains_key(&rune));
        }
        assert_eq!(charmap.map(0x32u32), None);
    }

    #[test]
    fn priority_order() {
        let mac = test_data::cmap0_mac();
        let bmp = test_data::cmap4_delta();
        let full = test_data::cmap12();
        let symbol = test_data::cmap4_symbol();
        let charmap = select(&[
            (0, 3, bmp.as_slice()),
            (1, 0, mac.as_slice()),
            (3, 10, full.as_slice()),
        ])
        .unwrap();
        assert_eq!(charmap.encoding(), Some((3, 10)));
        assert_eq!(charmap.format(), Some(12));
        let charmap = select(&[
            (1, 0, mac.as_slice()),
            (3, 0, symbol.as_slice()),
            (3, 10, full.as_slice()),
        ])
        .unwrap();
        assert!(charmap.is_symbol());
        let charmap = select(&[(0, 3, bmp.as_slice()), (1, 0, mac.as_slice())]).unwrap();
        assert_eq!(charmap.encoding(), Some((0, 3)));
        let charmap = select(&[(1, 0, mac.as_slice()), (1, 1, bmp.as_slice())]).unwrap();
        assert_eq!(charmap.encoding(), Some((1, 0)));
    }

    #[test]
    fn later_record_wins_ties() {
        let first = test_data::cmap6();
        let second = test_data::cmap4_delta();
        let charmap = select(&[(0, 3, first.as_slice()), (3, 1, second.as_slice())]).unwrap();
        assert_eq!(charmap.encoding(), Some((3, 1)));
    }

    #[test]
    fn symbol_remapping() {
        let symbol = test_data::cmap4_symbol();
        let charmap = select(&[(3, 0, symbol.as_slice())]).unwrap();
        assert!(charmap.is_symbol());
        // 0xF041 => 3 + 0x21
        assert_eq!(charmap.map(0xF041u32), gid(36));
        assert_eq!(charmap.map('A'), gid(36));
        assert_eq!(charmap.map(0x141u32), None);
        // iteration reports the stored codes
        assert_eq!(charmap.iter().next(), Some((0xF020, GlyphId::new(3))));
    }

    #[test]
    fn arabic_pages_use_their_code_page() {
        let data = cmap_table(&[(3, 0, test_data::cmap4_symbol_page().as_slice())]);
        let cmap = Cmap::read(FontData::new(&data)).unwrap();
        for page in [FontPage::SimplifiedArabic, FontPage::TraditionalArabic] {
            assert_eq!(page.remap_symbol(0x0627), Some(0xF0C7));
            let charmap = Charmap::new(&cmap, page).unwrap();
            // alef, teh, yeh
            assert_eq!(charmap.map('\u{627}'), gid(0xC7));
            assert_eq!(charmap.map('\u{62A}'), gid(0xCA));
            assert_eq!(charmap.map('\u{64A}'), gid(0xED));
            assert_eq!(charmap.map('!'), gid(0x21));
            // Latin-1 letters missing from the code page
            assert_eq!(charmap.map('\u{E1}'), None);
        }
        let charmap = Charmap::new(&cmap, FontPage::None).unwrap();
        assert_eq!(charmap.map('\u{627}'), None);
        assert_eq!(charmap.map('\u{E1}'), gid(0xE1));
    }

    #[test]
    fn arabic_code_page_is_sorted() {
        for table in [SIMPLIFIED_ARABIC_PUA, TRADITIONAL_ARABIC_PUA] {
            assert!(table.windows(2).all(|pair| pair[0].0 < pair[1].0));
        }
    }

    #[test]
    fn mac_roman_translation() {
        let mac = test_data::cmap0_mac();
        let charmap = select(&[(1, 0, mac.as_slice())]).unwrap();
        assert_eq!(charmap.map('A'), gid(5));
        assert_eq!(charmap.map('\u{e9}'), gid(9));
        // the raw byte is not a Unicode mapping
        assert_eq!(charmap.map(0x8Eu32), None);
        assert_eq!(
            mappings_by_iter(&charmap),
            BTreeMap::from([(0x41, GlyphId::new(5)), (0xE9, GlyphId::new(9))])
        );
        assert_eq!(mappings_by_ranges(&charmap), mappings_by_iter(&charmap));
    }

    #[test]
    fn other_mac_encodings_are_ascii_only() {
        let mac = test_data::cmap0_mac();
        let charmap = select(&[(1, 1, mac.as_slice())]).unwrap();
        assert_eq!(charmap.map('A'), gid(5));
        assert_eq!(charmap.map(0x8Eu32), None);
        assert_eq!(charmap.iter().count(), 1);
    }

    #[test]
    fn fallback_to_first_subtable() {
        let first = test_data::cmap6();
        let second = test_data::cmap4_delta();
        let charmap = select(&[(4, 0, first.as_slice()), (7, 2, second.as_slice())]).unwrap();
        assert_eq!(charmap.encoding(), Some((4, 0)));
        assert_eq!(charmap.map(0x30u32), gid(1));
    }

    #[test]
    fn skips_unparseable_subtables() {
        let format2 = [0u8, 2, 0, 6, 0, 0];
        let bmp = test_data::cmap4_delta();
        let charmap = select(&[(3, 1, &format2[..]), (0, 3, bmp.as_slice())]).unwrap();
        assert_eq!(charmap.encoding(), Some((0, 3)));
        let charmap = select(&[(3, 1, &format2[..])]).unwrap();
        assert!(!charmap.has_map());
        assert_eq!(charmap.map('a'), None);
        assert_eq!(charmap.iter().count(), 0);
    }

    #[test]
    fn variation_sequences() {
        let bmp = test_data::cmap4_delta();
        let uvs = test_data::cmap14();
        let charmap = select(&[(0, 3, bmp.as_slice()), (0, 5, uvs.as_slice())]).unwrap();
        assert_eq!(charmap.encoding(), Some((0, 3)));
        let selectors = charmap.variation_selectors().unwrap();
        assert_eq!(selectors.selectors().collect::<Vec<_>>(), [0xFE00, 0xE0100]);
        assert_eq!(charmap.map_variant(0x2269u32, 0xFE00u32), GlyphVariant::UseDefault);
        assert_eq!(
            charmap.map_variant(0x82A6u32, 0xFE00u32),
            GlyphVariant::Found(GlyphId::new(33))
        );
        assert_eq!(
            charmap.map_variant(0x845Bu32, 0xE0100u32),
            GlyphVariant::Found(GlyphId::new(34))
        );
        assert_eq!(charmap.map_variant(0x845Bu32, 0xFE00u32), GlyphVariant::NotFound);
        assert_eq!(charmap.map_variant(0x2269u32, 0xFE01u32), GlyphVariant::NotFound);
        assert_eq!(selectors.iter().count(), 3);
    }

    #[test]
    fn misplaced_variation_sequences_are_an_error() {
        let uvs = test_data::cmap14();
        let bmp = test_data::cmap4_delta();
        assert!(matches!(
            select(&[(3, 1, bmp.as_slice()), (3, 10, uvs.as_slice())]),
            Err(ReadError::MalformedData(_))
        ));
    }

    #[test]
    fn no_variation_sequences() {
        let bmp = test_data::cmap4_delta();
        let charmap = select(&[(3, 1, bmp.as_slice())]).unwrap();
        assert!(charmap.variation_selectors().is_none());
        assert_eq!(charmap.map_variant('a', 0xFE00u32), GlyphVariant::NotFound);
    }
}
