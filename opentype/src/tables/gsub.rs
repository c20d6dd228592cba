//! the [GSUB] table
//!
//! [GSUB]: https://docs.microsoft.com/en-us/typography/opentype/spec/gsub

use std::ops::Deref;

use types::{GlyphId, Tag};

use super::layout::{CoverageTable, LayoutHeader, Lookup, SequenceContext};
use crate::{Array, FontData, FontRead, ReadError};

/// 'GSUB'
pub const TAG: Tag = Tag::new(b"GSUB");

const EXTENSION_TYPE: u16 = 7;

/// The glyph substitution table.
#[derive(Clone, Debug)]
pub struct Gsub<'a>(LayoutHeader<'a>);

impl<'a> FontRead<'a> for Gsub<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        LayoutHeader::read(data).map(Self)
    }
}

impl<'a> Deref for Gsub<'a> {
    type Target = LayoutHeader<'a>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<'a> Gsub<'a> {
    /// Returns the lookup at `index` in the lookup list.
    pub fn lookup(&self, index: usize) -> Result<SubstitutionLookup<'a>, ReadError> {
        self.lookup_list()?.get(index).map(SubstitutionLookup)
    }
}

/// A GSUB lookup.
#[derive(Clone, Debug)]
pub struct SubstitutionLookup<'a>(Lookup<'a>);

impl<'a> Deref for SubstitutionLookup<'a> {
    type Target = Lookup<'a>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<'a> SubstitutionLookup<'a> {
    /// Returns the subtable at `index`, following extension subtables.
    pub fn subtable(&self, index: usize) -> Result<SubstitutionSubtable<'a>, ReadError> {
        let (lookup_type, data) = self.0.subtable_data(index, EXTENSION_TYPE)?;
        SubstitutionSubtable::read(lookup_type, data)
    }

    pub fn subtables(&self) -> impl Iterator<Item = Result<SubstitutionSubtable<'a>, ReadError>> + '_ {
        (0..self.subtable_count()).map(|ix| self.subtable(ix))
    }
}

/// A typed GSUB subtable.
#[derive(Clone, Debug)]
pub enum SubstitutionSubtable<'a> {
    Single(SingleSubst<'a>),
    Multiple(GlyphSequences<'a>),
    Alternate(GlyphSequences<'a>),
    Ligature(LigatureSubst<'a>),
    Contextual(SequenceContext<'a>),
    ChainContextual(SequenceContext<'a>),
    Reverse(ReverseChainSingleSubst<'a>),
}

impl<'a> SubstitutionSubtable<'a> {
    /// Reads a subtable of the given lookup type.
    pub fn read(lookup_type: u16, data: FontData<'a>) -> Result<Self, ReadError> {
        match lookup_type {
            1 => SingleSubst::read(data).map(Self::Single),
            2 => GlyphSequences::read(data).map(Self::Multiple),
            3 => GlyphSequences::read(data).map(Self::Alternate),
            4 => LigatureSubst::read(data).map(Self::Ligature),
            5 => SequenceContext::read(data).map(Self::Contextual),
            6 => SequenceContext::read_chained(data).map(Self::ChainContextual),
            8 => ReverseChainSingleSubst::read(data).map(Self::Reverse),
            other => Err(ReadError::InvalidFormat(other as _)),
        }
    }

    /// The coverage of the glyph that triggers the subtable.
    pub fn coverage(&self) -> Option<&CoverageTable<'a>> {
        match self {
            Self::Single(SingleSubst::Format1 { coverage, .. })
            | Self::Single(SingleSubst::Format2 { coverage, .. })
            | Self::Multiple(GlyphSequences { coverage, .. })
            | Self::Alternate(GlyphSequences { coverage, .. })
            | Self::Ligature(LigatureSubst { coverage, .. })
            | Self::Reverse(ReverseChainSingleSubst { coverage, .. }) => Some(coverage),
            Self::Contextual(context) | Self::ChainContextual(context) => context.coverage(),
        }
    }
}

/// Lookup type 1: replace one glyph with another.
#[derive(Clone, Debug)]
pub enum SingleSubst<'a> {
    Format1 {
        coverage: CoverageTable<'a>,
        delta_glyph_id: i16,
    },
    Format2 {
        coverage: CoverageTable<'a>,
        substitutes: Array<'a, u16>,
    },
}

impl<'a> FontRead<'a> for SingleSubst<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let format: u16 = data.read_at(0)?;
        let coverage = data.resolve_offset(data.read_at::<u16>(2)?)?;
        match format {
            1 => Ok(Self::Format1 {
                coverage,
                delta_glyph_id: data.read_at(4)?,
            }),
            2 => {
                let count: u16 = data.read_at(4)?;
                Ok(Self::Format2 {
                    coverage,
                    substitutes: data.read_array(6, count as usize)?,
                })
            }
            other => Err(ReadError::InvalidFormat(other as _)),
        }
    }
}

impl SingleSubst<'_> {
    /// Returns the substitute for `gid`, if it is covered.
    pub fn get(&self, gid: GlyphId) -> Option<GlyphId> {
        match self {
            Self::Format1 {
                coverage,
                delta_glyph_id,
            } => {
                coverage.get(gid)?;
                // addition is modulo 65536
                let raw = (gid.to_u32() as u16).wrapping_add(*delta_glyph_id as u16);
                Some(GlyphId::from(raw))
            }
            Self::Format2 {
                coverage,
                substitutes,
            } => {
                let ix = coverage.get(gid)?;
                substitutes.get(ix as usize).map(GlyphId::from)
            }
        }
    }
}

/// Lookup types 2 and 3: a glyph sequence per covered glyph.
///
/// For multiple substitution the sequence replaces the glyph; for alternate
/// substitution it lists the alternatives to choose from.
#[derive(Clone, Debug)]
pub struct GlyphSequences<'a> {
    data: FontData<'a>,
    pub coverage: CoverageTable<'a>,
    offsets: Array<'a, u16>,
}

impl<'a> FontRead<'a> for GlyphSequences<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let format: u16 = data.read_at(0)?;
        if format != 1 {
            return Err(ReadError::InvalidFormat(format as _));
        }
        let coverage = data.resolve_offset(data.read_at::<u16>(2)?)?;
        let count: u16 = data.read_at(4)?;
        Ok(Self {
            data,
            coverage,
            offsets: data.read_array(6, count as usize)?,
        })
    }
}

impl<'a> GlyphSequences<'a> {
    /// Returns the glyph sequence for `gid`, if it is covered.
    pub fn get(&self, gid: GlyphId) -> Option<Array<'a, u16>> {
        let ix = self.coverage.get(gid)?;
        let offset = self.offsets.get(ix as usize)? as usize;
        let count: u16 = self.data.read_at(offset).ok()?;
        self.data.read_array(offset + 2, count as usize).ok()
    }
}

/// Lookup type 4: replace a glyph sequence with a ligature.
#[derive(Clone, Debug)]
pub struct LigatureSubst<'a> {
    data: FontData<'a>,
    pub coverage: CoverageTable<'a>,
    set_offsets: Array<'a, u16>,
}

impl<'a> FontRead<'a> for LigatureSubst<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let format: u16 = data.read_at(0)?;
        if format != 1 {
            return Err(ReadError::InvalidFormat(format as _));
        }
        let coverage = data.resolve_offset(data.read_at::<u16>(2)?)?;
        let count: u16 = data.read_at(4)?;
        Ok(Self {
            data,
            coverage,
            set_offsets: data.read_array(6, count as usize)?,
        })
    }
}

impl<'a> LigatureSubst<'a> {
    /// Returns the ligatures starting with `gid`, in preference order.
    pub fn ligatures(&self, gid: GlyphId) -> Option<Result<Vec<Ligature<'a>>, ReadError>> {
        let ix = self.coverage.get(gid)?;
        let offset = self.set_offsets.get(ix as usize)? as usize;
        let read_set = || -> Result<Vec<Ligature<'a>>, ReadError> {
            let set = self.data.split_off(offset).ok_or(ReadError::OutOfBounds)?;
            let count: u16 = set.read_at(0)?;
            let offsets: Array<u16> = set.read_array(2, count as usize)?;
            offsets
                .iter()
                .map(|offset| set.resolve_offset::<Ligature>(offset))
                .collect()
        };
        Some(read_set())
    }
}

/// A ligature and the components following its first glyph.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ligature<'a> {
    pub ligature_glyph: GlyphId,
    pub components: Array<'a, u16>,
}

impl<'a> FontRead<'a> for Ligature<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let ligature_glyph: u16 = data.read_at(0)?;
        let count: u16 = data.read_at(2)?;
        Ok(Self {
            ligature_glyph: ligature_glyph.into(),
            components: data.read_array(4, count.saturating_sub(1) as usize)?,
        })
    }
}

impl Ligature<'_> {
    /// Returns true if `rest` (the glyphs after the first) spell this
    /// ligature's components.
    pub fn matches(&self, rest: &[GlyphId]) -> bool {
        rest.len() == self.components.len()
            && self
                .components
                .iter()
                .zip(rest)
                .all(|(component, gid)| GlyphId::from(component) == *gid)
    }
}

/// Lookup type 8: single substitution applied in reverse, with context.
#[derive(Clone, Debug)]
pub struct ReverseChainSingleSubst<'a> {
    pub coverage: CoverageTable<'a>,
    pub backtrack: Vec<CoverageTable<'a>>,
    pub lookahead: Vec<CoverageTable<'a>>,
    pub substitutes: Array<'a, u16>,
}

impl<'a> FontRead<'a> for ReverseChainSingleSubst<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let format: u16 = cursor.read()?;
        if format != 1 {
            return Err(ReadError::InvalidFormat(format as _));
        }
        let coverage_offset: u16 = cursor.read()?;
        let backtrack_count: u16 = cursor.read()?;
        let backtrack: Array<u16> = cursor.read_array(backtrack_count as usize)?;
        let lookahead_count: u16 = cursor.read()?;
        let lookahead: Array<u16> = cursor.read_array(lookahead_count as usize)?;
        let substitute_count: u16 = cursor.read()?;
        let resolve = |offsets: Array<u16>| -> Result<Vec<CoverageTable<'a>>, ReadError> {
            offsets.iter().map(|off| data.resolve_offset(off)).collect()
        };
        Ok(Self {
            coverage: data.resolve_offset(coverage_offset)?,
            backtrack: resolve(backtrack)?,
            lookahead: resolve(lookahead)?,
            substitutes: cursor.read_array(substitute_count as usize)?,
        })
    }
}

impl ReverseChainSingleSubst<'_> {
    /// Returns the substitute for `gid` when the surrounding glyphs match.
    ///
    /// `backtrack` is in logical order, ending just before `gid`.
    pub fn get(&self, backtrack: &[GlyphId], gid: GlyphId, lookahead: &[GlyphId]) -> Option<GlyphId> {
        if backtrack.len() < self.backtrack.len() || lookahead.len() < self.lookahead.len() {
            return None;
        }
        let back_ok = self
            .backtrack
            .iter()
            .zip(backtrack.iter().rev())
            .all(|(coverage, gid)| coverage.get(*gid).is_some());
        let ahead_ok = self
            .lookahead
            .iter()
            .zip(lookahead)
            .all(|(coverage, gid)| coverage.get(*gid).is_some());
        if !(back_ok && ahead_ok) {
            return None;
        }
        let ix = self.coverage.get(gid)?;
        self.substitutes.get(ix as usize).map(GlyphId::from)
    }
}

#[cfg(test)]
mod tests {
    use font_test_data::{be_buffer, bebuffer::BeBuffer};

    use super::*;

    fn single(buf: &[u8]) -> SingleSubst {
        SingleSubst::read(FontData::new(buf)).unwrap()
    }

    #[test]
    fn single_substitution() {
        let buf = be_buffer! { 1u16, 6u16, (-2i16), 1u16, 2u16, [1u16, 5] };
        let subst = single(&buf);
        assert_eq!(subst.get(GlyphId::new(5)), Some(GlyphId::new(3)));
        assert_eq!(subst.get(GlyphId::new(4)), None);
        // deltas wrap around
        assert_eq!(subst.get(GlyphId::new(1)), Some(GlyphId::new(65535)));
        let buf = be_buffer! { 2u16, 10u16, 2u16, [20u16, 21], 1u16, 2u16, [3u16, 4] };
        let subst = single(&buf);
        assert_eq!(subst.get(GlyphId::new(4)), Some(GlyphId::new(21)));
    }

    #[test]
    fn multiple_and_alternate() {
        // glyph 7 expands to 8 9 10
        let buf = be_buffer! {
            1u16, 8u16, 1u16, [14u16],
            1u16, 1u16, [7u16],
            3u16, [8u16, 9, 10]
        };
        let multiple = SubstitutionSubtable::read(2, FontData::new(&buf)).unwrap();
        let SubstitutionSubtable::Multiple(sequences) = &multiple else {
            panic!("wrong type");
        };
        let seq: Vec<_> = sequences.get(GlyphId::new(7)).unwrap().iter().collect();
        assert_eq!(seq, [8, 9, 10]);
        assert!(sequences.get(GlyphId::new(8)).is_none());
        let alternate = SubstitutionSubtable::read(3, FontData::new(&buf)).unwrap();
        assert!(matches!(alternate, SubstitutionSubtable::Alternate(_)));
        assert_eq!(alternate.coverage().unwrap().get(GlyphId::new(7)), Some(0));
    }

    /// f + i -> fi (glyph 100), f + f + i -> ffi (glyph 101)
    fn ligatures() -> BeBuffer {
        be_buffer! {
            1u16, 8u16, 1u16, [14u16],
            // coverage {f = 10}
            1u16, 1u16, [10u16],
            // ligature set at 14
            2u16, [6u16, 14u16],
            101u16, 3u16, [10u16, 11],
            100u16, 2u16, [11u16]
        }
    }

    #[test]
    fn ligature_substitution() {
        let buf = ligatures();
        let subst = LigatureSubst::read(FontData::new(&buf)).unwrap();
        let ligs = subst.ligatures(GlyphId::new(10)).unwrap().unwrap();
        assert_eq!(ligs.len(), 2);
        let rest = [GlyphId::new(11)];
        let found = ligs.iter().find(|lig| lig.matches(&rest)).unwrap();
        assert_eq!(found.ligature_glyph, GlyphId::new(100));
        let rest = [GlyphId::new(10), GlyphId::new(11)];
        let found = ligs.iter().find(|lig| lig.matches(&rest)).unwrap();
        assert_eq!(found.ligature_glyph, GlyphId::new(101));
        assert!(subst.ligatures(GlyphId::new(11)).is_none());
    }

    #[test]
    fn reverse_chaining() {
        let buf = be_buffer! {
            1u16, 14u16, 1u16, [20u16], 0u16, 1u16, [50u16],
            // coverage at 14
            1u16, 1u16, [5u16],
            // backtrack coverage at 20
            1u16, 1u16, [4u16]
        };
        let subst = ReverseChainSingleSubst::read(FontData::new(&buf)).unwrap();
        let gid = GlyphId::new(5);
        assert_eq!(subst.get(&[GlyphId::new(4)], gid, &[]), Some(GlyphId::new(50)));
        assert_eq!(subst.get(&[GlyphId::new(3)], gid, &[]), None);
        assert_eq!(subst.get(&[], gid, &[]), None);
    }

    #[test]
    fn table_lookups() {
        let buf = be_buffer! {
            1u16, 0u16, 10u16, 12u16, 14u16,
            // empty script list at 10, empty feature list at 12
            0u16, 0u16,
            // lookup list at 14
            1u16, [4u16],
            // lookup at 18: single subst with one subtable at 26
            1u16, 0u16, 1u16, [8u16],
            1u16, 6u16, 1i16, 1u16, 1u16, [3u16]
        };
        let gsub = Gsub::read(FontData::new(&buf)).unwrap();
        assert!(gsub.script_list().unwrap().is_empty());
        assert!(!gsub.has_feature_variations());
        let lookup = gsub.lookup(0).unwrap();
        assert_eq!(lookup.lookup_type(), 1);
        let subtables: Vec<_> = lookup.subtables().collect::<Result<_, _>>().unwrap();
        let SubstitutionSubtable::Single(single) = &subtables[0] else {
            panic!("wrong type");
        };
        assert_eq!(single.get(GlyphId::new(3)), Some(GlyphId::new(4)));
        assert!(gsub.lookup(1).is_err());
    }
}
