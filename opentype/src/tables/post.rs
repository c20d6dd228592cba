//! the [post (PostScript)](https://docs.microsoft.com/en-us/typography/opentype/spec/post#header) table

use types::{Fixed, GlyphId, Tag};

use crate::{Array, FontData, FontRead, ReadError};

/// 'post'
pub const TAG: Tag = Tag::new(b"post");

const VERSION_1_0: u32 = 0x0001_0000;
const VERSION_2_0: u32 = 0x0002_0000;

/// The PostScript table.
///
/// Version 1.0 names glyphs with the standard Macintosh ordering, version
/// 2.0 maps each glyph to either a standard name or a Pascal string stored
/// in the table. Other versions carry no glyph names.
#[derive(Clone, Debug)]
pub struct Post<'a> {
    data: FontData<'a>,
    glyph_name_index: Option<Array<'a, u16>>,
    // byte offsets of the start of each custom pascal string
    string_offsets: Vec<usize>,
}

impl<'a> FontRead<'a> for Post<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        data.check_len(32)?;
        let version: u32 = data.read_at(0)?;
        let mut glyph_name_index = None;
        let mut string_offsets = Vec::new();
        if version == VERSION_2_0 {
            let mut cursor = data.cursor();
            cursor.advance_by(32);
            let num_glyphs: u16 = cursor.read()?;
            glyph_name_index = Some(cursor.read_array::<u16>(num_glyphs as usize)?);
            let mut pos = cursor.position();
            let bytes = data.as_bytes();
            while let Some(len) = bytes.get(pos) {
                let end = pos + 1 + *len as usize;
                if end > bytes.len() {
                    log::debug!("truncated glyph name string in post table");
                    break;
                }
                string_offsets.push(pos);
                pos = end;
            }
        }
        Ok(Post {
            data,
            glyph_name_index,
            string_offsets,
        })
    }
}

impl<'a> Post<'a> {
    pub fn version(&self) -> u32 {
        self.data.read_at(0).unwrap_or_default()
    }

    /// Italic angle in counter-clockwise degrees from the vertical.
    pub fn italic_angle(&self) -> Fixed {
        self.data.read_at(4).unwrap_or_default()
    }

    /// Suggested distance of the top of the underline from the baseline.
    pub fn underline_position(&self) -> i16 {
        self.data.read_at(8).unwrap_or_default()
    }

    /// Suggested values for the underline thickness.
    pub fn underline_thickness(&self) -> i16 {
        self.data.read_at(10).unwrap_or_default()
    }

    /// Set to 0 if the font is proportionally spaced.
    pub fn is_fixed_pitch(&self) -> u32 {
        self.data.read_at(12).unwrap_or_default()
    }

    /// The number of glyph names covered by this table
    pub fn num_names(&self) -> usize {
        match self.version() {
            VERSION_1_0 => DEFAULT_GLYPH_NAMES.len(),
            VERSION_2_0 => self.glyph_name_index.map(|a| a.len()).unwrap_or_default(),
            _ => 0,
        }
    }

    pub fn glyph_name(&self, glyph_id: GlyphId) -> Option<&'a str> {
        let glyph_id = glyph_id.to_u32() as usize;
        match self.version() {
            VERSION_1_0 => DEFAULT_GLYPH_NAMES.get(glyph_id).copied(),
            VERSION_2_0 => {
                let idx = self.glyph_name_index?.get(glyph_id)? as usize;
                if idx < DEFAULT_GLYPH_NAMES.len() {
                    return DEFAULT_GLYPH_NAMES.get(idx).copied();
                }
                let pos = *self.string_offsets.get(idx - DEFAULT_GLYPH_NAMES.len())?;
                let bytes = self.data.as_bytes();
                let len = *bytes.get(pos)? as usize;
                let name = bytes.get(pos + 1..pos + 1 + len)?;
                // names are required to be ascii
                std::str::from_utf8(name).ok().filter(|s| s.is_ascii())
            }
            _ => None,
        }
    }
}

/// The 258 glyph names defined for Macintosh TrueType fonts
#[rustfmt::skip]
pub static DEFAULT_GLYPH_NAMES: [&str; 258] = [
    ".notdef", ".null", "nonmarkingreturn", "space", "exclam", "quotedbl", "numbersign", "dollar",
    "percent", "ampersand", "quotesingle", "parenleft", "parenright", "asterisk", "plus", "comma",
    "hyphen", "period", "slash", "zero", "one", "two", "three", "four", "five", "six", "seven",
    "eight", "nine", "colon", "semicolon", "less", "equal", "greater", "question", "at", "A", "B",
    "C", "D", "E", "F", "G", "H", "I", "J", "K", "L", "M", "N", "O", "P", "Q", "R", "S", "T", "U",
    "V", "W", "X", "Y", "Z", "bracketleft", "backslash", "bracketright", "asciicircum",
    "underscore", "grave", "a", "b", "c", "d", "e", "f", "g", "h", "i", "j", "k", "l", "m", "n",
    "o", "p", "q", "r", "s", "t", "u", "v", "w", "x", "y", "z", "braceleft", "bar", "braceright",
    "asciitilde", "Adieresis", "Aring", "Ccedilla", "Eacute", "Ntilde", "Odieresis", "Udieresis",
    "aacute", "agrave", "acircumflex", "adieresis", "atilde", "aring", "ccedilla", "eacute",
    "egrave", "ecircumflex", "edieresis", "iacute", "igrave", "icircumflex", "idieresis", "ntilde",
    "oacute", "ograve", "ocircumflex", "odieresis", "otilde", "uacute", "ugrave", "ucircumflex",
    "udieresis", "dagger", "degree", "cent", "sterling", "section", "bullet", "paragraph",
    "germandbls", "registered", "copyright", "trademark", "acute", "dieresis", "notequal", "AE",
    "Oslash", "infinity", "plusminus", "lessequal", "greaterequal", "yen", "mu", "partialdiff",
    "summation", "product", "pi", "integral", "ordfeminine", "ordmasculine", "Omega", "ae",
    "oslash", "questiondown", "exclamdown", "logicalnot", "radical", "florin", "approxequal",
    "Delta", "guillemotleft", "guillemotright", "ellipsis", "nonbreakingspace", "Agrave", "Atilde",
    "Otilde", "OE", "oe", "endash", "emdash", "quotedblleft", "quotedblright", "quoteleft",
    "quoteright", "divide", "lozenge", "ydieresis", "Ydieresis", "fraction", "currency",
    "guilsinglleft", "guilsinglright", "fi", "fl", "daggerdbl", "periodcentered", "quotesinglbase",
    "quotedblbase", "perthousand", "Acircumflex", "Ecircumflex", "Aacute", "Edieresis", "Egrave",
    "Iacute", "Icircumflex", "Idieresis", "Igrave", "Oacute", "Ocircumflex", "apple", "Ograve",
    "Uacute", "Ucircumflex", "Ugrave", "dotlessi", "circumflex", "tilde", "macron", "breve",
    "dotaccent", "ring", "cedilla", "hungarumlaut", "ogonek", "caron", "Lslash", "lslash",
    "Scaron", "scaron", "Zcaron", "zcaron", "brokenbar", "Eth", "eth", "Yacute", "yacute", "Thorn",
    "thorn", "minus", "multiply", "onesuperior", "twosuperior", "threesuperior", "onehalf",
    "onequarter", "threequarters", "franc", "Gbreve", "gbreve", "Idotaccent", "Scedilla",
    "scedilla", "Cacute", "cacute", "Ccaron", "ccaron", "dcroat",
];

#[cfg(test)]
mod tests {
    use super::*;
    use font_test_data::post as test_data;

    #[test]
    fn test_post() {
        let table = Post::read(FontData::new(test_data::SIMPLE)).unwrap();
        assert_eq!(table.version(), VERSION_2_0);
        assert_eq!(table.underline_position(), -75);
        assert_eq!(table.num_names(), 10);
        assert_eq!(table.glyph_name(GlyphId::new(1)), Some(".notdef"));
        assert_eq!(table.glyph_name(GlyphId::new(2)), Some("space"));
        assert_eq!(table.glyph_name(GlyphId::new(7)), Some("hello"));
        assert_eq!(table.glyph_name(GlyphId::new(8)), Some("hi"));
        assert_eq!(table.glyph_name(GlyphId::new(9)), Some("hola"));
        assert_eq!(table.glyph_name(GlyphId::new(10)), None);
    }

    #[test]
    fn version_1_and_3() {
        let mut data = test_data::SIMPLE[..32].to_vec();
        data[1] = 1;
        let table = Post::read(FontData::new(&data)).unwrap();
        assert_eq!(table.glyph_name(GlyphId::new(36)), Some("A"));
        assert_eq!(table.glyph_name(GlyphId::new(300)), None);
        data[1] = 3;
        let table = Post::read(FontData::new(&data)).unwrap();
        assert_eq!(table.num_names(), 0);
        assert_eq!(table.glyph_name(GlyphId::new(3)), None);
    }
}
