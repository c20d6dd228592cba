//! Parsing for PostScript DICTs.

use std::ops::Range;

use types::Fixed;

use super::{BlendState, Error, Number, Stack};
use crate::{Cursor, FontData, ReadError};

/// PostScript DICT operator.
///
/// Only the operators needed to locate charstrings, subroutines, widths and
/// variation data are decoded individually; the rest are reported as
/// [`Operator::Other`].
///
/// See "Table 9 Top DICT Operator Entries" and "Table 23 Private DICT
/// Operators" at <https://adobe-type-tools.github.io/font-tech-notes/pdfs/5176.CFF.pdf>
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum Operator {
    FullName,
    FamilyName,
    FontBbox,
    Charset,
    CharstringsOffset,
    PrivateDictRange,
    VariationStoreOffset,
    SubrsOffset,
    DefaultWidthX,
    NominalWidthX,
    VariationStoreIndex,
    Blend,
    FontMatrix,
    Ros,
    FdArrayOffset,
    FdSelectOffset,
    /// Any other operator, with the escape flag and opcode.
    Other(bool, u8),
}

impl Operator {
    fn from_opcode(opcode: u8) -> Self {
        use Operator::*;
        match opcode {
            2 => FullName,
            3 => FamilyName,
            5 => FontBbox,
            15 => Charset,
            17 => CharstringsOffset,
            18 => PrivateDictRange,
            19 => SubrsOffset,
            20 => DefaultWidthX,
            21 => NominalWidthX,
            22 => VariationStoreIndex,
            23 => Blend,
            24 => VariationStoreOffset,
            _ => Other(false, opcode),
        }
    }

    fn from_extended_opcode(opcode: u8) -> Self {
        use Operator::*;
        match opcode {
            7 => FontMatrix,
            30 => Ros,
            36 => FdArrayOffset,
            37 => FdSelectOffset,
            _ => Other(true, opcode),
        }
    }
}

/// Either a PostScript DICT operator or a (numeric) operand.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Token {
    Operator(Operator),
    Operand(Number),
}

/// Given a byte slice containing DICT data, returns an iterator yielding
/// raw operands and operators.
pub fn tokens(dict_data: &[u8]) -> impl Iterator<Item = Result<Token, Error>> + '_ + Clone {
    let mut cursor = FontData::new(dict_data).cursor();
    std::iter::from_fn(move || {
        if cursor.is_empty() {
            None
        } else {
            Some(parse_token(&mut cursor))
        }
    })
}

fn parse_token(cursor: &mut Cursor) -> Result<Token, Error> {
    // Escape opcode for accessing extensions.
    const ESCAPE: u8 = 12;
    let b0 = cursor.read::<u8>()?;
    Ok(match b0 {
        ESCAPE => Token::Operator(Operator::from_extended_opcode(cursor.read::<u8>()?)),
        28 | 29 | 32..=254 => Token::Operand(parse_int(cursor, b0)?.into()),
        30 => Token::Operand(parse_real(cursor)?.into()),
        // 31 and 255 are reserved
        31 | 255 => return Err(Error::InvalidDictOperator(b0)),
        _ => Token::Operator(Operator::from_opcode(b0)),
    })
}

/// PostScript DICT operator with its associated operands.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Entry {
    FullName(u16),
    FamilyName(u16),
    FontBbox([Fixed; 4]),
    Charset(usize),
    CharstringsOffset(usize),
    PrivateDictRange(Range<usize>),
    VariationStoreOffset(usize),
    SubrsOffset(usize),
    DefaultWidthX(Fixed),
    NominalWidthX(Fixed),
    VariationStoreIndex(u16),
    FontMatrix([Fixed; 6]),
    Ros,
    FdArrayOffset(usize),
    FdSelectOffset(usize),
    Other(bool, u8),
}

/// Given a byte slice containing DICT data, returns an iterator yielding
/// each operator with its associated operands.
///
/// If processing a Private DICT from a CFF2 table and an item variation
/// store is present, then `blend_state` must be provided to evaluate
/// `blend` operators.
pub fn entries<'a>(
    dict_data: &'a [u8],
    mut blend_state: Option<BlendState<'a>>,
) -> impl Iterator<Item = Result<Entry, Error>> + 'a {
    let mut stack = Stack::new();
    let mut tokens = tokens(dict_data);
    std::iter::from_fn(move || loop {
        let op = match tokens.next()? {
            Ok(Token::Operand(number)) => match stack.push(number) {
                Ok(_) => continue,
                Err(e) => return Some(Err(e)),
            },
            Ok(Token::Operator(op)) => op,
            Err(e) => return Some(Err(e)),
        };
        match op {
            Operator::Blend => {
                let result = blend_state
                    .as_ref()
                    .ok_or(Error::MissingBlendState)
                    .and_then(|state| stack.apply_blend(state));
                match result {
                    Ok(_) => continue,
                    Err(e) => return Some(Err(e)),
                }
            }
            Operator::VariationStoreIndex => {
                if let Some(state) = blend_state.as_mut() {
                    let result = stack
                        .get_i32(0)
                        .and_then(|ix| state.set_store_index(ix as u16));
                    if let Err(e) = result {
                        return Some(Err(e));
                    }
                }
            }
            _ => {}
        }
        let entry = parse_entry(op, &mut stack);
        stack.clear();
        return Some(entry);
    })
}

fn parse_entry(op: Operator, stack: &mut Stack) -> Result<Entry, Error> {
    use Operator::*;
    let offset = |stack: &mut Stack| -> Result<usize, Error> {
        usize::try_from(stack.pop_i32()?).map_err(|_| Error::Read(ReadError::OutOfBounds))
    };
    Ok(match op {
        FullName => Entry::FullName(stack.pop_i32()? as u16),
        FamilyName => Entry::FamilyName(stack.pop_i32()? as u16),
        FontBbox => Entry::FontBbox(stack.get_fixed_array(0)?),
        Charset => Entry::Charset(offset(stack)?),
        CharstringsOffset => Entry::CharstringsOffset(offset(stack)?),
        PrivateDictRange => {
            let start = offset(stack)?;
            let len = offset(stack)?;
            let end = start.checked_add(len).ok_or(ReadError::OutOfBounds)?;
            Entry::PrivateDictRange(start..end)
        }
        VariationStoreOffset => Entry::VariationStoreOffset(offset(stack)?),
        SubrsOffset => Entry::SubrsOffset(offset(stack)?),
        DefaultWidthX => Entry::DefaultWidthX(stack.pop_fixed()?),
        NominalWidthX => Entry::NominalWidthX(stack.pop_fixed()?),
        VariationStoreIndex => Entry::VariationStoreIndex(stack.pop_i32()? as u16),
        FontMatrix => Entry::FontMatrix(stack.get_fixed_array(0)?),
        Ros => Entry::Ros,
        FdArrayOffset => Entry::FdArrayOffset(offset(stack)?),
        FdSelectOffset => Entry::FdSelectOffset(offset(stack)?),
        Other(escape, opcode) => Entry::Other(escape, opcode),
        // handled by the caller
        Blend => return Err(Error::InvalidDictOperator(23)),
    })
}

/// Decodes an integer operand whose first byte has already been read.
///
/// See <https://learn.microsoft.com/en-us/typography/opentype/spec/cff2#table-3-operand-encoding>
pub(crate) fn parse_int(cursor: &mut Cursor, b0: u8) -> Result<i32, Error> {
    Ok(match b0 {
        32..=246 => b0 as i32 - 139,
        247..=250 => (b0 as i32 - 247) * 256 + cursor.read::<u8>()? as i32 + 108,
        251..=254 => -(b0 as i32 - 251) * 256 - cursor.read::<u8>()? as i32 - 108,
        28 => cursor.read::<i16>()? as i32,
        29 => cursor.read::<i32>()?,
        _ => return Err(Error::InvalidNumber),
    })
}

/// Decodes a binary coded decimal real number.
///
/// Each nibble is a digit, a decimal point (0xa), an exponent marker (0xb
/// for E, 0xc for E-), a minus sign (0xe) or the terminator (0xf).
fn parse_real(cursor: &mut Cursor) -> Result<Fixed, Error> {
    let mut text = String::with_capacity(16);
    'outer: loop {
        let byte = cursor.read::<u8>()?;
        for nibble in [byte >> 4, byte & 0xF] {
            match nibble {
                0x0..=0x9 => text.push(char::from(b'0' + nibble)),
                0xA => text.push('.'),
                0xB => text.push('E'),
                0xC => text.push_str("E-"),
                0xE => text.push('-'),
                0xF => break 'outer,
                _ => return Err(Error::InvalidNumber),
            }
        }
    }
    let value: f64 = text.parse().map_err(|_| Error::InvalidNumber)?;
    let value = value.clamp(i16::MIN as f64, i16::MAX as f64);
    Ok(Fixed::from_f64(value))
}

#[cfg(test)]
mod tests {
    use font_test_data::bebuffer::BeBuffer;

    use super::*;

    #[test]
    fn integer_encodings() {
        let data = [
            139u8, // 0
            32,    // -107
            246,   // 107
            247, 0, // 108
            254, 255, // -1131
            28, 0x80, 0x00, // -32768
            29, 0x00, 0x01, 0x86, 0xA0, // 100000
        ];
        let values: Vec<_> = tokens(&data).map(|token| token.unwrap()).collect();
        let expected: Vec<Token> = [0, -107, 107, 108, -1131, -32768, 100000]
            .into_iter()
            .map(|value| Token::Operand(Number::I32(value)))
            .collect();
        assert_eq!(values, expected);
    }

    #[test]
    fn real_numbers() {
        // -2.25
        let data = [30u8, 0xE2, 0xA2, 0x5F];
        let token = tokens(&data).next().unwrap().unwrap();
        assert_eq!(token, Token::Operand(Number::Fixed(Fixed::from_f64(-2.25))));
        // 0.140541E-3
        let data = [30u8, 0x0A, 0x14, 0x05, 0x41, 0xC3, 0xFF];
        let Token::Operand(Number::Fixed(value)) = tokens(&data).next().unwrap().unwrap() else {
            panic!("expected a real number");
        };
        assert!((value.to_f64() - 0.000140541).abs() < 0.0001);
    }

    #[test]
    fn top_dict_entries() {
        let buf = BeBuffer::new()
            // 100 CharStrings
            .push(28u8)
            .push(100i16)
            .push(17u8)
            // 32 200 Private
            .push(32u8 + 139)
            .push(28u8)
            .push(200i16)
            .push(18u8)
            // 1000 FDSelect
            .push(28u8)
            .push(1000i16)
            .extend([12u8, 37]);
        let entries: Vec<_> = entries(&buf, None).map(|e| e.unwrap()).collect();
        assert_eq!(
            entries,
            &[
                Entry::CharstringsOffset(100),
                Entry::PrivateDictRange(200..232),
                Entry::FdSelectOffset(1000),
            ]
        );
    }

    #[test]
    fn blend_without_state_is_an_error() {
        // 1 2 1 blend
        let data = [140u8, 141, 140, 23];
        let mut iter = entries(&data, None);
        assert_eq!(iter.next(), Some(Err(Error::MissingBlendState)));
    }
}
