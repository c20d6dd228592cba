//! The [morx (Extended Glyph Metamorphosis)](https://developer.apple.com/fonts/TrueType-Reference-Manual/RM06/Chap6morx.html) table.

use types::{GlyphId16, Tag};

use super::aat::{
    read_array_to_end, read_array_until, ExtendedStateTable, LookupGlyphId, NoPayload,
};
use crate::{record, Array, FontData, FontRead, ReadError, RecordArray};

/// 'morx'
pub const TAG: Tag = Tag::new(b"morx");

/// The extended glyph metamorphosis table.
#[derive(Clone, Debug)]
pub struct Morx<'a> {
    version: u16,
    n_chains: u32,
    chains_data: FontData<'a>,
}

impl<'a> FontRead<'a> for Morx<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let version: u16 = data.read_at(0)?;
        if !(2..=3).contains(&version) {
            return Err(ReadError::InvalidFormat(version as i64));
        }
        Ok(Self {
            version,
            n_chains: data.read_at(4)?,
            chains_data: data.split_off(8).unwrap_or_default(),
        })
    }
}

impl<'a> Morx<'a> {
    pub fn version(&self) -> u16 {
        self.version
    }

    pub fn n_chains(&self) -> u32 {
        self.n_chains
    }

    /// Returns an iterator over the chains of the table.
    pub fn chains(&self) -> impl Iterator<Item = Result<Chain<'a>, ReadError>> + 'a {
        let mut data = self.chains_data;
        let mut remaining = self.n_chains;
        std::iter::from_fn(move || {
            if remaining == 0 {
                return None;
            }
            remaining -= 1;
            let result = Chain::read(data);
            match &result {
                Ok(chain) => data = data.split_off(chain.data.len()).unwrap_or_default(),
                Err(_) => remaining = 0,
            }
            Some(result)
        })
    }
}

record! {
    /// Maps a feature type and setting to the subtable flags it toggles.
    pub struct Feature {
        pub feature_type: u16,
        pub feature_settings: u16,
        pub enable_flags: u32,
        pub disable_flags: u32,
    }
}

/// A chain of subtables, selected by feature flags.
#[derive(Clone, Debug)]
pub struct Chain<'a> {
    pub default_flags: u32,
    features: RecordArray<'a, Feature>,
    n_subtables: u32,
    subtables_data: FontData<'a>,
    data: FontData<'a>,
}

impl<'a> Chain<'a> {
    const HEADER_LEN: usize = 16;

    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let default_flags = cursor.read()?;
        let chain_length = cursor.read::<u32>()? as usize;
        let n_features = cursor.read::<u32>()? as usize;
        let n_subtables = cursor.read()?;
        if chain_length < Self::HEADER_LEN {
            return Err(ReadError::MalformedData("morx chain shorter than header"));
        }
        let data = data.take_up_to(chain_length).ok_or(ReadError::OutOfBounds)?;
        let features = data.read_records(Self::HEADER_LEN, n_features)?;
        let subtables_start = Self::HEADER_LEN + n_features * 12;
        Ok(Self {
            default_flags,
            features,
            n_subtables,
            subtables_data: data.split_off(subtables_start).unwrap_or_default(),
            data,
        })
    }

    pub fn features(&self) -> RecordArray<'a, Feature> {
        self.features
    }

    /// Computes the subtable flags for the given `(type, setting)`
    /// feature selections, starting from the default flags.
    pub fn flags_for(&self, selections: &[(u16, u16)]) -> u32 {
        let mut flags = self.default_flags;
        for feature in self.features.iter() {
            let selected = selections.iter().any(|&(feature_type, setting)| {
                feature.feature_type == feature_type && feature.feature_settings == setting
            });
            if selected {
                flags = (flags & feature.disable_flags) | feature.enable_flags;
            }
        }
        flags
    }

    /// Returns an iterator over the subtables of the chain.
    pub fn subtables(&self) -> impl Iterator<Item = Result<Subtable<'a>, ReadError>> + 'a {
        let mut data = self.subtables_data;
        let mut remaining = self.n_subtables;
        std::iter::from_fn(move || {
            if remaining == 0 {
                return None;
            }
            remaining -= 1;
            let result = Subtable::read(data);
            match &result {
                Ok(subtable) => data = data.split_off(subtable.length).unwrap_or_default(),
                Err(_) => remaining = 0,
            }
            Some(result)
        })
    }
}

/// A single glyph transformation in a chain.
#[derive(Clone, Debug)]
pub struct Subtable<'a> {
    length: usize,
    pub coverage: u32,
    pub sub_feature_flags: u32,
    data: FontData<'a>,
}

impl<'a> Subtable<'a> {
    const HEADER_LEN: usize = 12;

    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let length = data.read_at::<u32>(0)? as usize;
        if length < Self::HEADER_LEN {
            return Err(ReadError::MalformedData("morx subtable shorter than header"));
        }
        let body = data
            .slice(Self::HEADER_LEN..length)
            .ok_or(ReadError::OutOfBounds)?;
        Ok(Self {
            length,
            coverage: data.read_at(4)?,
            sub_feature_flags: data.read_at(8)?,
            data: body,
        })
    }

    /// The subtable body, after the header.
    pub fn data(&self) -> FontData<'a> {
        self.data
    }

    /// If true, this subtable will process glyphs in logical order (or reverse
    /// logical order, depending on the value of bit 0x80000000).
    #[inline]
    pub fn is_logical(&self) -> bool {
        self.coverage & 0x1000_0000 != 0
    }

    /// If true, this subtable will be applied to both horizontal and vertical
    /// text (i.e. the state of bit 0x80000000 is ignored).
    #[inline]
    pub fn is_all_directions(&self) -> bool {
        self.coverage & 0x2000_0000 != 0
    }

    /// If true, this subtable will process glyphs in descending order.
    /// Otherwise, it will process the glyphs in ascending order.
    #[inline]
    pub fn is_backwards(&self) -> bool {
        self.coverage & 0x4000_0000 != 0
    }

    /// If true, this subtable will only be applied to vertical text.
    /// Otherwise, this subtable will only be applied to horizontal
    /// text.
    #[inline]
    pub fn is_vertical(&self) -> bool {
        self.coverage & 0x8000_0000 != 0
    }

    /// True if any of the given chain flags enable this subtable.
    pub fn is_enabled(&self, flags: u32) -> bool {
        self.sub_feature_flags & flags != 0
    }

    /// Returns an enum representing the actual subtable data.
    pub fn kind(&self) -> Result<SubtableKind<'a>, ReadError> {
        // Format is low byte of coverage
        match self.coverage & 0xFF {
            0 => Ok(SubtableKind::Rearrangement(ExtendedStateTable::read(
                self.data,
            )?)),
            1 => Ok(SubtableKind::Contextual(ContextualSubtable::read(
                self.data,
            )?)),
            2 => Ok(SubtableKind::Ligature(LigatureSubtable::read(self.data)?)),
            // 3 is reserved
            4 => Ok(SubtableKind::NonContextual(LookupGlyphId::read(self.data)?)),
            5 => Ok(SubtableKind::Insertion(InsertionSubtable::read(self.data)?)),
            format => Err(ReadError::InvalidFormat(format as i64)),
        }
    }
}

/// The various `morx` subtable formats.
#[derive(Clone, Debug)]
pub enum SubtableKind<'a> {
    Rearrangement(ExtendedStateTable<'a, NoPayload>),
    Contextual(ContextualSubtable<'a>),
    Ligature(LigatureSubtable<'a>),
    NonContextual(LookupGlyphId<'a>),
    Insertion(InsertionSubtable<'a>),
}

/// Rearrangement verbs, stored in the low four bits of the entry flags.
pub mod rearrangement {
    pub const MARK_FIRST: u16 = 0x8000;
    pub const DONT_ADVANCE: u16 = 0x4000;
    pub const MARK_LAST: u16 = 0x2000;
    pub const VERB_MASK: u16 = 0x000F;
}

record! {
    /// Entry payload of a contextual subtable.
    pub struct ContextualEntryData {
        /// Lookup applied to the marked glyph, 0xFFFF for none.
        pub mark_index: u16,
        /// Lookup applied to the current glyph, 0xFFFF for none.
        pub current_index: u16,
    }
}

/// Contextual glyph substitution subtable.
#[derive(Clone, Debug)]
pub struct ContextualSubtable<'a> {
    pub state_table: ExtendedStateTable<'a, ContextualEntryData>,
    offsets_data: FontData<'a>,
    offsets: Array<'a, u32>,
}

impl<'a> ContextualSubtable<'a> {
    pub const SET_MARK: u16 = 0x8000;
    pub const DONT_ADVANCE: u16 = 0x4000;

    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let state_table = ExtendedStateTable::read(data)?;
        let offset = data.read_at::<u32>(ExtendedStateTable::<()>::HEADER_LEN)? as usize;
        let offsets_data = data.split_off(offset).ok_or(ReadError::OutOfBounds)?;
        Ok(Self {
            state_table,
            offsets_data,
            offsets: read_array_to_end(&offsets_data, 0)?,
        })
    }

    /// Returns the substitution lookup with the given index.
    ///
    /// Lookup offsets are relative to the start of the offset array.
    pub fn lookup(&self, index: u16) -> Result<LookupGlyphId<'a>, ReadError> {
        let offset = self
            .offsets
            .get(index as usize)
            .ok_or(ReadError::OutOfBounds)? as usize;
        LookupGlyphId::read(
            self.offsets_data
                .split_off(offset)
                .ok_or(ReadError::OutOfBounds)?,
        )
    }
}

/// A single ligature action.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LigatureAction(pub u32);

impl LigatureAction {
    /// This is the last action in the list.
    pub fn is_last(self) -> bool {
        self.0 & 0x8000_0000 != 0
    }

    /// Store the accumulated ligature glyph at the current position.
    pub fn is_store(self) -> bool {
        self.0 & 0x4000_0000 != 0
    }

    /// Sign extended 30-bit offset added to the component glyph before
    /// indexing the component table.
    pub fn offset(self) -> i32 {
        ((self.0 << 2) as i32) >> 2
    }
}

/// Ligature glyph substitution subtable.
#[derive(Clone, Debug)]
pub struct LigatureSubtable<'a> {
    /// Entry payloads are indices of the first ligature action.
    pub state_table: ExtendedStateTable<'a, u16>,
    /// Contains the set of ligature stack actions, one for each state.
    pub ligature_actions: Array<'a, u32>,
    /// Array of component indices which are summed to determine the index
    /// of the final ligature glyph.
    pub components: Array<'a, u16>,
    /// Output ligature glyphs.
    pub ligatures: Array<'a, GlyphId16>,
}

impl<'a> LigatureSubtable<'a> {
    pub const SET_COMPONENT: u16 = 0x8000;
    pub const DONT_ADVANCE: u16 = 0x4000;
    pub const PERFORM_ACTION: u16 = 0x2000;

    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let state_table = ExtendedStateTable::read(data)?;
        let mut cursor = data.cursor();
        cursor.advance_by(ExtendedStateTable::<()>::HEADER_LEN);
        // the arrays carry no lengths; each one ends where the next begins
        let offsets = [
            cursor.read::<u32>()? as usize,
            cursor.read::<u32>()? as usize,
            cursor.read::<u32>()? as usize,
        ];
        let [lig_action_offset, component_offset, ligature_offset] = offsets;
        Ok(Self {
            state_table,
            ligature_actions: read_array_until(&data, lig_action_offset, &offsets)?,
            components: read_array_until(&data, component_offset, &offsets)?,
            ligatures: read_array_until(&data, ligature_offset, &offsets)?,
        })
    }

    /// Returns the actions starting at `index`, up to and including the
    /// one flagged as last.
    pub fn actions(&self, index: u16) -> impl Iterator<Item = LigatureAction> + 'a {
        let actions = self.ligature_actions;
        let mut ix = index as usize;
        let mut done = false;
        std::iter::from_fn(move || {
            if done {
                return None;
            }
            let action = LigatureAction(actions.get(ix)?);
            ix += 1;
            done = action.is_last();
            Some(action)
        })
    }
}

record! {
    /// Entry payload of an insertion subtable.
    pub struct InsertionEntryData {
        /// First glyph to insert at the current position, 0xFFFF for none.
        pub current_insert_index: u16,
        /// First glyph to insert at the marked position, 0xFFFF for none.
        pub marked_insert_index: u16,
    }
}

/// Insertion glyph substitution subtable.
#[derive(Clone, Debug)]
pub struct InsertionSubtable<'a> {
    pub state_table: ExtendedStateTable<'a, InsertionEntryData>,
    /// Insertion glyph table. The index and count of glyphs to insert is
    /// determined by the state machine.
    pub glyphs: Array<'a, GlyphId16>,
}

impl<'a> InsertionSubtable<'a> {
    pub const SET_MARK: u16 = 0x8000;
    pub const DONT_ADVANCE: u16 = 0x4000;

    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let state_table = ExtendedStateTable::read(data)?;
        let glyphs_offset = data.read_at::<u32>(ExtendedStateTable::<()>::HEADER_LEN)?;
        Ok(Self {
            state_table,
            glyphs: read_array_to_end(&data, glyphs_offset as usize)?,
        })
    }

    /// Number of glyphs to insert at the current position.
    pub fn current_insert_count(flags: u16) -> usize {
        ((flags & 0x03E0) >> 5) as usize
    }

    /// Number of glyphs to insert at the marked position.
    pub fn marked_insert_count(flags: u16) -> usize {
        (flags & 0x001F) as usize
    }

    /// Returns the glyphs to insert for the given index and count.
    pub fn insertion(&self, index: u16, count: usize) -> Option<Vec<GlyphId16>> {
        (index as usize..index as usize + count)
            .map(|ix| self.glyphs.get(ix))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use font_test_data::{be_buffer, bebuffer::BeBuffer, morx};
    use types::GlyphId;

    use super::*;

    #[test]
    fn chain_and_subtables() {
        let data = morx::morx_table();
        let morx = Morx::read(FontData::new(&data)).unwrap();
        assert_eq!(morx.version(), 2);
        let chains: Vec<_> = morx.chains().map(|c| c.unwrap()).collect();
        assert_eq!(chains.len(), 1);
        let chain = &chains[0];
        assert_eq!(chain.default_flags, 2);
        assert_eq!(chain.features().len(), 1);
        // turning on type 1, setting 2 enables the ligature subtable
        assert_eq!(chain.flags_for(&[]), 2);
        assert_eq!(chain.flags_for(&[(1, 2)]), 3);
        let subtables: Vec<_> = chain.subtables().map(|s| s.unwrap()).collect();
        assert_eq!(subtables.len(), 2);
        assert!(!subtables[0].is_enabled(chain.flags_for(&[])));
        assert!(subtables[0].is_enabled(chain.flags_for(&[(1, 2)])));
        assert!(subtables[1].is_enabled(chain.default_flags));
        assert!(matches!(
            subtables[0].kind().unwrap(),
            SubtableKind::Ligature(_)
        ));
        let SubtableKind::NonContextual(lookup) = subtables[1].kind().unwrap() else {
            panic!("expected a noncontextual subtable");
        };
        assert_eq!(lookup.value(30).unwrap(), GlyphId16::new(31));
        assert_eq!(lookup.value(40).unwrap(), GlyphId16::new(41));
        assert!(lookup.value(35).is_err());
    }

    #[test]
    fn ligature_example() {
        let morx = Morx::read(FontData::new(morx::LIGATURE_EXAMPLE)).unwrap();
        let chain = morx.chains().next().unwrap().unwrap();
        assert_eq!(chain.default_flags, 1);
        assert!(chain.features().is_empty());
        let subtable = chain.subtables().next().unwrap().unwrap();
        assert!(subtable.is_vertical());
        assert!(subtable.is_enabled(chain.default_flags));
        let SubtableKind::Ligature(ligature) = subtable.kind().unwrap() else {
            panic!("expected a ligature subtable");
        };
        let state_table = &ligature.state_table;
        assert_eq!(state_table.n_classes, 7);
        assert_eq!(state_table.n_states(), 4);
        assert_eq!(state_table.n_entries(), 4);
        let classes: Vec<_> = (19..=29)
            .map(|gid| state_table.class(GlyphId::new(gid)))
            .collect();
        assert_eq!(classes, [1, 4, 4, 4, 5, 5, 1, 6, 6, 6, 1]);

        let actions: Vec<_> = ligature.ligature_actions.iter().collect();
        assert_eq!(actions, [0x3FFF_FFE7, 0x3FFF_FFED, 0xBFFF_FFF2]);
        let components: Vec<_> = ligature.components.iter().collect();
        assert_eq!(components, [0, 1, 2, 3, 0, 4, 0, 8, 16]);
        let ligatures: Vec<_> = ligature.ligatures.iter().map(|g| g.to_u16()).collect();
        assert_eq!(ligatures, (1000..=1007).collect::<Vec<u16>>());

        // the third glyph of a ligature runs the whole action list
        let entry = state_table.entry(3, 6).unwrap();
        assert_eq!(entry.new_state, 0);
        assert_eq!(
            entry.flags,
            LigatureSubtable::SET_COMPONENT | LigatureSubtable::PERFORM_ACTION
        );
        let actions: Vec<_> = ligature.actions(entry.payload).collect();
        let offsets: Vec<_> = actions.iter().map(|action| action.offset()).collect();
        assert_eq!(offsets, [-25, -19, -14]);
        assert!(actions.iter().all(|action| !action.is_store()));
        assert_eq!(
            actions.iter().map(|action| action.is_last()).collect::<Vec<_>>(),
            [false, false, true]
        );
    }

    #[test]
    fn insertion_subtable() {
        let body = be_buffer! {
            4u32,       // nClasses
            20u32,      // classTable
            32u32,      // stateArray
            40u32,      // entryTable
            48u32,      // insertionAction
            // class lookup, format 8 with no glyphs
            8u16, 0u16, 0u16, 0u16, 0u16, 0u16,
            [0u16, 0, 0, 0],
            // entry: newState, flags (2 glyphs at current), current, marked
            [0u16, 0x0040, 0, 0xFFFF],
            [50u16, 51]
        };
        let subtable = InsertionSubtable::read(FontData::new(&body)).unwrap();
        let entry = subtable.state_table.entry(0, 1).unwrap();
        let count = InsertionSubtable::current_insert_count(entry.flags);
        assert_eq!(count, 2);
        assert_eq!(InsertionSubtable::marked_insert_count(entry.flags), 0);
        assert_eq!(entry.payload.marked_insert_index, 0xFFFF);
        let glyphs = subtable
            .insertion(entry.payload.current_insert_index, count)
            .unwrap();
        assert_eq!(glyphs, [GlyphId16::new(50), GlyphId16::new(51)]);
        assert!(subtable.insertion(1, 2).is_none());
    }

    #[test]
    fn contextual_subtable() {
        let body = be_buffer! {
            4u32,       // nClasses
            20u32,      // classTable
            32u32,      // stateArray
            40u32,      // entryTable
            48u32,      // substitutionTable
            8u16, 0u16, 0u16, 0u16, 0u16, 0u16,
            [0u16, 0, 0, 0],
            // entry: newState, flags, markIndex, currentIndex
            [0u16, 0, 0xFFFF, 0],
            // one lookup offset, relative to the offset array
            4u32,
            // format 8 lookup mapping glyph 7 to 70
            [8u16, 7, 1, 70]
        };
        let subtable = ContextualSubtable::read(FontData::new(&body)).unwrap();
        let entry = subtable.state_table.entry(0, 0).unwrap();
        assert_eq!(entry.payload.mark_index, 0xFFFF);
        let lookup = subtable.lookup(entry.payload.current_index).unwrap();
        assert_eq!(lookup.value(7).unwrap(), GlyphId16::new(70));
        assert!(subtable.lookup(1).is_err());
    }

    #[test]
    fn bad_version() {
        let data = BeBuffer::new().extend([1u16, 0]).push(0u32);
        assert!(matches!(
            Morx::read(FontData::new(&data)),
            Err(ReadError::InvalidFormat(1))
        ));
    }
}
