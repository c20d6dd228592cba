//! The lookup flag type.
//!
//! The low byte holds independent flags while the high byte carries a mark
//! attachment class, so this is implemented by hand rather than as a plain
//! bit set.

use std::ops::{BitOr, BitOrAssign};

/// The [LookupFlag](https://learn.microsoft.com/en-us/typography/opentype/spec/chapter2#lookupFlag) bit enumeration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LookupFlag(u16);

impl BitOr for LookupFlag {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for LookupFlag {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0
    }
}

impl LookupFlag {
    /// Only meaningful for cursive attachment: the last glyph of a sequence
    /// is positioned on the baseline.
    pub const RIGHT_TO_LEFT: Self = LookupFlag(0x0001);
    /// If set, skips over base glyphs
    pub const IGNORE_BASE_GLYPHS: Self = LookupFlag(0x002);
    /// If set, skips over ligatures
    pub const IGNORE_LIGATURES: Self = LookupFlag(0x004);
    /// If set, skips over all combining marks
    pub const IGNORE_MARKS: Self = LookupFlag(0x008);
    /// The lookup is followed by a mark filtering set index; marks outside
    /// that set are skipped.
    pub const USE_MARK_FILTERING_SET: Self = LookupFlag(0x010);

    // union of all flags, above
    const FLAG_MASK: Self = LookupFlag(0x1F);

    pub fn empty() -> Self {
        Self(0)
    }

    /// Construct a LookupFlag from a raw value, discarding reserved bits
    pub fn from_bits_truncate(bits: u16) -> Self {
        const VALID_BITS: u16 = !0x00E0;
        Self(bits & VALID_BITS)
    }

    pub fn to_bits(self) -> u16 {
        self.0
    }

    /// Returns `true` if all of the flags in `other` are contained within `self`.
    #[inline]
    pub const fn contains(&self, other: Self) -> bool {
        // only count flag bits
        let other = other.0 & Self::FLAG_MASK.0;
        (self.0 & other) == other
    }

    /// If not zero, skips over all marks of attachment type different from specified.
    pub fn mark_attachment_class(self) -> Option<u16> {
        let val = self.0 & 0xff00;
        if val == 0 {
            None
        } else {
            Some(val >> 8)
        }
    }

    pub fn set_mark_attachment_class(&mut self, val: u16) {
        let val = (val & 0xff) << 8;
        self.0 = (self.0 & 0xff) | val;
    }
}

impl types::Scalar for LookupFlag {
    type Raw = [u8; 2];

    fn from_raw(raw: Self::Raw) -> Self {
        Self(u16::from_be_bytes(raw))
    }

    fn to_raw(self) -> Self::Raw {
        self.0.to_be_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_and_mark_class() {
        let mut flag = LookupFlag::from_bits_truncate(0x03E9);
        assert!(flag.contains(LookupFlag::RIGHT_TO_LEFT));
        assert!(flag.contains(LookupFlag::IGNORE_MARKS));
        assert!(!flag.contains(LookupFlag::IGNORE_LIGATURES));
        // reserved bits are dropped
        assert_eq!(flag.to_bits(), 0x0309);
        assert_eq!(flag.mark_attachment_class(), Some(3));
        flag.set_mark_attachment_class(0);
        assert_eq!(flag.mark_attachment_class(), None);
        flag |= LookupFlag::USE_MARK_FILTERING_SET;
        assert!(flag.contains(LookupFlag::USE_MARK_FILTERING_SET | LookupFlag::IGNORE_MARKS));
    }
}
