//! Sequence context and chained sequence context subtables.
//!
//! These are shared by GSUB (lookup types 5 and 6) and GPOS (lookup types
//! 7 and 8). The non-chained forms are represented as chained ones with empty
//! backtrack and lookahead sequences.

use types::GlyphId;

use super::{ClassDef, CoverageTable};
use crate::{record, Array, FontData, ReadError, RecordArray};

record! {
    /// A nested lookup to apply at a position in the input sequence.
    pub struct SequenceLookupRecord {
        pub sequence_index: u16,
        pub lookup_list_index: u16,
    }
}

/// A rule matching glyph ids (format 1) or classes (format 2).
///
/// The first input element is implied by the coverage table or the rule set
/// index, so `input` holds one element less than the matched sequence.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SequenceRule<'a> {
    pub backtrack: Array<'a, u16>,
    pub input: Array<'a, u16>,
    pub lookahead: Array<'a, u16>,
    pub lookup_records: RecordArray<'a, SequenceLookupRecord>,
}

impl<'a> SequenceRule<'a> {
    fn read(data: FontData<'a>, chained: bool) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        if chained {
            let backtrack_count: u16 = cursor.read()?;
            let backtrack = cursor.read_array(backtrack_count as usize)?;
            let input_count: u16 = cursor.read()?;
            let input = cursor.read_array(input_count.saturating_sub(1) as usize)?;
            let lookahead_count: u16 = cursor.read()?;
            let lookahead = cursor.read_array(lookahead_count as usize)?;
            let lookup_count: u16 = cursor.read()?;
            Ok(Self {
                backtrack,
                input,
                lookahead,
                lookup_records: cursor.read_records(lookup_count as usize)?,
            })
        } else {
            let input_count: u16 = cursor.read()?;
            let lookup_count: u16 = cursor.read()?;
            Ok(Self {
                backtrack: Array::empty(),
                input: cursor.read_array(input_count.saturating_sub(1) as usize)?,
                lookahead: Array::empty(),
                lookup_records: cursor.read_records(lookup_count as usize)?,
            })
        }
    }

    /// Returns true if the rule matches the given sequences, comparing with
    /// `value_of` (which maps a glyph to its id or class).
    ///
    /// `backtrack` is in logical order; the rule stores it reversed. Each
    /// sequence must have exactly the length the rule expects.
    pub fn matches(
        &self,
        backtrack: &[GlyphId],
        input: &[GlyphId],
        lookahead: &[GlyphId],
        value_of: impl Fn(GlyphId) -> u16,
    ) -> bool {
        if backtrack.len() != self.backtrack.len()
            || input.len() != self.input.len()
            || lookahead.len() != self.lookahead.len()
        {
            return false;
        }
        self.backtrack
            .iter()
            .zip(backtrack.iter().rev())
            .chain(self.input.iter().zip(input))
            .chain(self.lookahead.iter().zip(lookahead))
            .all(|(expected, glyph)| value_of(*glyph) == expected)
    }
}

/// The rules that share a first glyph or class.
#[derive(Clone, Debug)]
pub struct RuleSet<'a> {
    data: FontData<'a>,
    offsets: Array<'a, u16>,
    chained: bool,
}

impl<'a> RuleSet<'a> {
    fn read(data: FontData<'a>, chained: bool) -> Result<Self, ReadError> {
        let count: u16 = data.read_at(0)?;
        Ok(Self {
            data,
            offsets: data.read_array(2, count as usize)?,
            chained,
        })
    }

    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    pub fn get(&self, index: usize) -> Result<SequenceRule<'a>, ReadError> {
        let offset = self.offsets.get(index).ok_or(ReadError::OutOfBounds)?;
        let data = self
            .data
            .split_off(offset as usize)
            .ok_or(ReadError::OutOfBounds)?;
        SequenceRule::read(data, self.chained)
    }

    pub fn iter(&self) -> impl Iterator<Item = Result<SequenceRule<'a>, ReadError>> + '_ {
        (0..self.len()).map(|ix| self.get(ix))
    }
}

/// The rule sets of a format 1 or 2 subtable, indexed by coverage index or
/// by class. Null offsets denote an absent rule set.
#[derive(Clone, Debug)]
pub struct RuleSets<'a> {
    data: FontData<'a>,
    offsets: Array<'a, u16>,
    chained: bool,
}

impl<'a> RuleSets<'a> {
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Result<RuleSet<'a>, ReadError>> {
        let offset = self.offsets.get(index)?;
        if offset == 0 {
            return None;
        }
        Some(
            self.data
                .split_off(offset as usize)
                .ok_or(ReadError::OutOfBounds)
                .and_then(|data| RuleSet::read(data, self.chained)),
        )
    }
}

/// A contextual subtable in any of its three formats.
#[derive(Clone, Debug)]
pub enum SequenceContext<'a> {
    /// Format 1: rules over glyph ids.
    Glyphs {
        coverage: CoverageTable<'a>,
        rule_sets: RuleSets<'a>,
    },
    /// Format 2: rules over glyph classes.
    Classes {
        coverage: CoverageTable<'a>,
        backtrack_class_def: Option<ClassDef<'a>>,
        input_class_def: ClassDef<'a>,
        lookahead_class_def: Option<ClassDef<'a>>,
        rule_sets: RuleSets<'a>,
    },
    /// Format 3: a single rule where each position has a coverage table.
    Coverages {
        backtrack: Vec<CoverageTable<'a>>,
        input: Vec<CoverageTable<'a>>,
        lookahead: Vec<CoverageTable<'a>>,
        lookup_records: RecordArray<'a, SequenceLookupRecord>,
    },
}

impl<'a> SequenceContext<'a> {
    /// Reads a (non-chained) sequence context subtable.
    pub fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let format: u16 = data.read_at(0)?;
        match format {
            1 => Ok(Self::Glyphs {
                coverage: data.resolve_offset(data.read_at::<u16>(2)?)?,
                rule_sets: rule_sets(data, 4, false)?,
            }),
            2 => Ok(Self::Classes {
                coverage: data.resolve_offset(data.read_at::<u16>(2)?)?,
                backtrack_class_def: None,
                input_class_def: data.resolve_offset(data.read_at::<u16>(4)?)?,
                lookahead_class_def: None,
                rule_sets: rule_sets(data, 6, false)?,
            }),
            3 => {
                let mut cursor = data.cursor();
                cursor.advance::<u16>();
                let glyph_count: u16 = cursor.read()?;
                let lookup_count: u16 = cursor.read()?;
                let offsets: Array<u16> = cursor.read_array(glyph_count as usize)?;
                if offsets.is_empty() {
                    return Err(ReadError::MalformedData("empty input sequence"));
                }
                Ok(Self::Coverages {
                    backtrack: Vec::new(),
                    input: coverages(data, offsets)?,
                    lookahead: Vec::new(),
                    lookup_records: cursor.read_records(lookup_count as usize)?,
                })
            }
            other => Err(ReadError::InvalidFormat(other as _)),
        }
    }

    /// Reads a chained sequence context subtable.
    pub fn read_chained(data: FontData<'a>) -> Result<Self, ReadError> {
        let format: u16 = data.read_at(0)?;
        match format {
            1 => Ok(Self::Glyphs {
                coverage: data.resolve_offset(data.read_at::<u16>(2)?)?,
                rule_sets: rule_sets(data, 4, true)?,
            }),
            2 => Ok(Self::Classes {
                coverage: data.resolve_offset(data.read_at::<u16>(2)?)?,
                backtrack_class_def: data.resolve_nullable(data.read_at::<u16>(4)?).transpose()?,
                input_class_def: data.resolve_offset(data.read_at::<u16>(6)?)?,
                lookahead_class_def: data.resolve_nullable(data.read_at::<u16>(8)?).transpose()?,
                rule_sets: rule_sets(data, 10, true)?,
            }),
            3 => {
                let mut cursor = data.cursor();
                cursor.advance::<u16>();
                let backtrack_count: u16 = cursor.read()?;
                let backtrack = cursor.read_array(backtrack_count as usize)?;
                let input_count: u16 = cursor.read()?;
                let input: Array<u16> = cursor.read_array(input_count as usize)?;
                let lookahead_count: u16 = cursor.read()?;
                let lookahead = cursor.read_array(lookahead_count as usize)?;
                let lookup_count: u16 = cursor.read()?;
                if input.is_empty() {
                    return Err(ReadError::MalformedData("empty input sequence"));
                }
                Ok(Self::Coverages {
                    backtrack: coverages(data, backtrack)?,
                    input: coverages(data, input)?,
                    lookahead: coverages(data, lookahead)?,
                    lookup_records: cursor.read_records(lookup_count as usize)?,
                })
            }
            other => Err(ReadError::InvalidFormat(other as _)),
        }
    }

    /// The coverage of the first input glyph.
    pub fn coverage(&self) -> Option<&CoverageTable<'a>> {
        match self {
            Self::Glyphs { coverage, .. } | Self::Classes { coverage, .. } => Some(coverage),
            Self::Coverages { input, .. } => input.first(),
        }
    }
}

fn rule_sets<'a>(data: FontData<'a>, pos: usize, chained: bool) -> Result<RuleSets<'a>, ReadError> {
    let count: u16 = data.read_at(pos)?;
    Ok(RuleSets {
        data,
        offsets: data.read_array(pos + 2, count as usize)?,
        chained,
    })
}

fn coverages<'a>(
    data: FontData<'a>,
    offsets: Array<'a, u16>,
) -> Result<Vec<CoverageTable<'a>>, ReadError> {
    offsets
        .iter()
        .map(|offset| data.resolve_offset(offset))
        .collect()
}

#[cfg(test)]
mod tests {
    use font_test_data::{be_buffer, bebuffer::BeBuffer};

    use super::*;

    #[test]
    fn glyph_rules() {
        // coverage {10}; one rule set with the rule 10 11 12 -> lookup 3 at 1
        let buf = be_buffer! {
            1u16, 8u16, 1u16, [14u16],
            // coverage at 8
            1u16, 1u16, [10u16],
            // rule set at 14
            1u16, [4u16],
            // rule at 18
            3u16, 1u16, [11u16, 12], [1u16, 3]
        };
        let context = SequenceContext::read(FontData::new(&buf)).unwrap();
        let SequenceContext::Glyphs { coverage, rule_sets } = &context else {
            panic!("wrong format");
        };
        assert_eq!(coverage.get(GlyphId::new(10)), Some(0));
        let rule = rule_sets.get(0).unwrap().unwrap().get(0).unwrap();
        assert_eq!(rule.input.iter().collect::<Vec<_>>(), [11, 12]);
        assert!(rule.backtrack.is_empty());
        let record = rule.lookup_records.get(0).unwrap();
        assert_eq!((record.sequence_index, record.lookup_list_index), (1, 3));
        let input = [11u16, 12].map(GlyphId::from);
        assert!(rule.matches(&[], &input, &[], |g| g.to_u32() as u16));
        assert!(!rule.matches(&[], &input[..1], &[], |g| g.to_u32() as u16));
        assert!(rule_sets.get(1).is_none());
    }

    #[test]
    fn chained_class_rules() {
        let buf = be_buffer! {
            2u16, 14u16, 0u16, 20u16, 0u16, 1u16, [32u16],
            // coverage at 14
            1u16, 1u16, [5u16],
            // input class def at 20: glyphs 5..=7 are classes 1, 2, 3
            1u16, 5u16, 3u16, [1u16, 2, 3],
            // rule set at 32
            1u16, [4u16],
            // rule at 36: no backtrack, input [1 2], lookahead [3]
            0u16, 2u16, [2u16], 1u16, [3u16], 0u16
        };
        let context = SequenceContext::read_chained(FontData::new(&buf)).unwrap();
        let SequenceContext::Classes {
            input_class_def,
            backtrack_class_def,
            rule_sets,
            ..
        } = &context
        else {
            panic!("wrong format");
        };
        assert!(backtrack_class_def.is_none());
        assert_eq!(input_class_def.get(GlyphId::new(6)), 2);
        let rule = rule_sets.get(0).unwrap().unwrap().get(0).unwrap();
        assert_eq!(rule.input.iter().collect::<Vec<_>>(), [2]);
        assert_eq!(rule.lookahead.iter().collect::<Vec<_>>(), [3]);
        assert!(rule.lookup_records.is_empty());
        let class = |g: GlyphId| input_class_def.get(g);
        assert!(rule.matches(&[], &[GlyphId::new(6)], &[GlyphId::new(7)], class));
        assert!(!rule.matches(&[], &[GlyphId::new(6)], &[GlyphId::new(5)], class));
    }

    #[test]
    fn coverage_based_rule() {
        let buf = be_buffer! {
            3u16, 1u16, [20u16], 1u16, [26u16], 1u16, [26u16], 1u16, [0u16, 9],
            // coverage at 20
            1u16, 1u16, [1u16],
            // coverage at 26
            1u16, 1u16, [2u16]
        };
        let context = SequenceContext::read_chained(FontData::new(&buf)).unwrap();
        let SequenceContext::Coverages {
            backtrack,
            input,
            lookahead,
            lookup_records,
        } = &context
        else {
            panic!("wrong format");
        };
        assert_eq!(backtrack[0].get(GlyphId::new(1)), Some(0));
        assert_eq!(input[0].get(GlyphId::new(2)), Some(0));
        assert_eq!(lookahead.len(), 1);
        assert_eq!(lookup_records.get(0).unwrap().lookup_list_index, 9);
        assert_eq!(context.coverage(), Some(&input[0]));
    }
}
