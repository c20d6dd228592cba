//! types for working with raw big-endian bytes

/// A trait for font scalars.
///
/// This is an internal trait for encoding and decoding big-endian bytes.
/// The raw representation is always a byte array, which lets arrays of
/// scalars alias the font data without copying.
pub trait Scalar: Sized {
    /// The raw byte representation of this type.
    type Raw: bytemuck::Pod + AsRef<[u8]> + Copy;

    /// The raw size of this type, in bytes.
    const RAW_BYTE_LEN: usize = std::mem::size_of::<Self::Raw>();

    /// Create an instance of this type from raw big-endian bytes
    fn from_raw(raw: Self::Raw) -> Self;
    /// Encode this type as raw big-endian bytes
    fn to_raw(self) -> Self::Raw;

    /// Attempt to read a scalar from the front of a slice of bytes.
    fn read(slice: &[u8]) -> Option<Self> {
        let len = Self::RAW_BYTE_LEN;
        slice
            .get(..len)
            .and_then(|bytes| bytemuck::try_from_bytes::<Self::Raw>(bytes).ok())
            .map(|raw| Self::from_raw(*raw))
    }
}

/// An internal macro for implementing the `Scalar` trait on newtypes.
#[macro_export]
macro_rules! newtype_scalar {
    ($name:ident, $raw:ty) => {
        impl $crate::Scalar for $name {
            type Raw = $raw;
            fn to_raw(self) -> $raw {
                $crate::Scalar::to_raw(self.0)
            }

            fn from_raw(raw: $raw) -> Self {
                Self($crate::Scalar::from_raw(raw))
            }
        }
    };
}

macro_rules! int_scalar {
    ($ty:ty, $raw:ty) => {
        impl crate::raw::Scalar for $ty {
            type Raw = $raw;
            fn to_raw(self) -> $raw {
                self.to_be_bytes()
            }

            fn from_raw(raw: $raw) -> $ty {
                Self::from_be_bytes(raw)
            }
        }
    };
}

int_scalar!(u8, [u8; 1]);
int_scalar!(i8, [u8; 1]);
int_scalar!(u16, [u8; 2]);
int_scalar!(i16, [u8; 2]);
int_scalar!(u32, [u8; 4]);
int_scalar!(i32, [u8; 4]);
int_scalar!(u64, [u8; 8]);
int_scalar!(i64, [u8; 8]);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_short_slice() {
        assert_eq!(u16::read(&[1]), None);
        assert_eq!(u16::read(&[1, 2, 3]), Some(0x0102));
        assert_eq!(i16::read(&[0xFF, 0xD6]), Some(-42));
        assert_eq!(u32::RAW_BYTE_LEN, 4);
    }
}
