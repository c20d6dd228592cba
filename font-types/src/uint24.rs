/// 24-bit unsigned integer.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Uint24(u32);

impl Uint24 {
    /// The smallest value that can be represented by this integer type.
    pub const MIN: Self = Uint24(0);

    /// The largest value that can be represented by this integer type.
    pub const MAX: Self = Uint24(0xffffff);

    /// Create from a u32. Saturates on overflow.
    pub const fn new(raw: u32) -> Uint24 {
        let overflow = raw > Self::MAX.0;
        let raw = raw * !overflow as u32 + Self::MAX.0 * overflow as u32;
        Uint24(raw)
    }

    /// Returns the value as a `u32`.
    pub const fn to_u32(self) -> u32 {
        self.0
    }
}

impl crate::raw::Scalar for Uint24 {
    type Raw = [u8; 3];

    fn from_raw(raw: [u8; 3]) -> Self {
        Uint24((raw[0] as u32) << 16 | (raw[1] as u32) << 8 | raw[2] as u32)
    }

    fn to_raw(self) -> [u8; 3] {
        let [_, a, b, c] = self.0.to_be_bytes();
        [a, b, c]
    }
}

impl From<Uint24> for u32 {
    fn from(src: Uint24) -> u32 {
        src.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Scalar;

    #[test]
    fn constructor() {
        assert_eq!(Uint24::MAX, Uint24::new(0xffffff));
        assert_eq!(Uint24::MAX, Uint24::new(u32::MAX));
        assert_eq!(Uint24::read(&[1, 2, 3]), Some(Uint24::new(0x010203)));
    }
}
