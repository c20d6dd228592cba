//! The [feature name](https://developer.apple.com/fonts/TrueType-Reference-Manual/RM06/Chap6feat.html) table.

use types::Tag;

use crate::{record, FontData, FontRead, ReadError, RecordArray};

/// 'feat'
pub const TAG: Tag = Tag::new(b"feat");

/// The feature name table.
#[derive(Clone, Debug)]
pub struct Feat<'a> {
    data: FontData<'a>,
    names: RecordArray<'a, FeatureName>,
}

impl<'a> FontRead<'a> for Feat<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let version: u32 = data.read_at(0)?;
        if version >> 16 != 1 {
            return Err(ReadError::InvalidFormat(version as i64));
        }
        let count: u16 = data.read_at(4)?;
        Ok(Self {
            data,
            names: data.read_records(12, count as usize)?,
        })
    }
}

record! {
    /// Type, flags and names for an AAT feature.
    pub struct FeatureName {
        pub feature: u16,
        pub n_settings: u16,
        /// Offset from the start of the table to the setting names.
        pub setting_table_offset: u32,
        pub feature_flags: u16,
        pub name_index: u16,
    }
}

record! {
    /// The name of a single feature setting.
    pub struct SettingName {
        pub setting: u16,
        pub name_index: u16,
    }
}

impl<'a> Feat<'a> {
    /// Feature names, sorted by feature type.
    pub fn names(&self) -> RecordArray<'a, FeatureName> {
        self.names
    }

    /// Returns the name for the given feature code.
    pub fn find(&self, feature: u16) -> Option<FeatureName> {
        let ix = self
            .names
            .binary_search_by(|name| name.feature.cmp(&feature))
            .ok()?;
        self.names.get(ix)
    }

    /// Returns the setting names of the given feature.
    pub fn settings(&self, name: &FeatureName) -> Result<RecordArray<'a, SettingName>, ReadError> {
        self.data
            .read_records(name.setting_table_offset as usize, name.n_settings as usize)
    }
}

impl FeatureName {
    /// Returns true if the feature settings are mutually exclusive.
    pub fn is_exclusive(&self) -> bool {
        self.feature_flags & 0x8000 != 0
    }

    /// Returns the index of the default setting for the feature.
    pub fn default_setting_index(&self) -> u16 {
        // If bit 14 is set, the default setting index is in the low byte
        if self.feature_flags & 0x4000 != 0 {
            self.feature_flags & 0xFF
        } else {
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use font_test_data::bebuffer::BeBuffer;

    #[test]
    fn feat_example() {
        let feat_data = build_feat_example();
        let feat = Feat::read(FontData::new(&feat_data)).unwrap();
        #[rustfmt::skip]
        let expected_name_fields = [
            // (feature, n_settings, flags, name, exclusive, default_index)
            (0, 1, 0, 260, false, 0),
            (1, 1, 0, 256, false, 0),
            (3, 3, 0x8000, 262, true, 0),
            (6, 2, 0xC001, 258, true, 1),
        ];
        let name_fields = feat
            .names()
            .iter()
            .map(|name| {
                (
                    name.feature,
                    name.n_settings,
                    name.feature_flags,
                    name.name_index,
                    name.is_exclusive(),
                    name.default_setting_index(),
                )
            })
            .collect::<Vec<_>>();
        assert_eq!(name_fields, expected_name_fields);
        #[rustfmt::skip]
        let expected_setting_names: [&[(u16, u16)]; 4] = [
            &[(0, 261)],
            &[(2, 257)],
            &[(0, 268), (3, 264), (4, 265)],
            &[(0, 259), (1, 260)],
        ];
        let setting_names = feat
            .names()
            .iter()
            .map(|name| {
                feat.settings(&name)
                    .unwrap()
                    .iter()
                    .map(|setting| (setting.setting, setting.name_index))
                    .collect::<Vec<_>>()
            })
            .collect::<Vec<_>>();
        assert!(expected_setting_names.iter().eq(setting_names.iter()));
    }

    #[test]
    fn feat_find() {
        let feat_data = build_feat_example();
        let feat = Feat::read(FontData::new(&feat_data)).unwrap();
        let valid_features = [0, 1, 3, 6];
        for i in 0..10 {
            let name = feat.find(i);
            if valid_features.contains(&i) {
                assert_eq!(name.unwrap().feature, i);
            } else {
                assert!(name.is_none());
            }
        }
    }

    fn build_feat_example() -> BeBuffer {
        // Example taken from bottom of <https://developer.apple.com/fonts/TrueType-Reference-Manual/RM06/Chap6feat.html>
        BeBuffer::new()
            // header
            .push(0x00010000u32)
            .extend([4u16, 0, 0, 0])
            // feature name array
            .extend([0u16, 1])
            .push(60u32)
            .extend([0u16, 260])
            .extend([1u16, 1])
            .push(64u32)
            .extend([0u16, 256])
            .extend([3u16, 3])
            .push(68u32)
            .extend([0x8000u16, 262])
            .extend([6u16, 2])
            .push(80u32)
            .extend([0xC001u16, 258])
            // The setting name array
            .extend([0u16, 261, 2, 257, 0, 268, 3, 264, 4, 265, 0, 259, 1, 260])
    }
}
