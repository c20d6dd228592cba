//! Zero-copy views over arrays in font data

use std::{cmp::Ordering, marker::PhantomData};

use types::Scalar;

use crate::{FontData, ReadError};

/// An array of big-endian scalars borrowed from font data.
///
/// Elements are decoded on access; the view never copies the underlying
/// bytes.
pub struct Array<'a, T> {
    data: &'a [u8],
    phantom: PhantomData<T>,
}

impl<'a, T: Scalar> Array<'a, T> {
    /// Wrap the given bytes. Trailing bytes that do not form a whole element
    /// are ignored.
    pub fn new(data: &'a [u8]) -> Self {
        let len = data.len() - data.len() % T::RAW_BYTE_LEN;
        Self {
            data: &data[..len],
            phantom: PhantomData,
        }
    }

    /// An array with no elements.
    pub fn empty() -> Self {
        Self::new(&[])
    }

    /// The number of elements in the array.
    pub fn len(&self) -> usize {
        self.data.len() / T::RAW_BYTE_LEN
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the element at `index`, if it exists.
    pub fn get(&self, index: usize) -> Option<T> {
        let start = index.checked_mul(T::RAW_BYTE_LEN)?;
        T::read(self.data.get(start..)?)
    }

    /// Returns the last element.
    pub fn last(&self) -> Option<T> {
        self.len().checked_sub(1).and_then(|ix| self.get(ix))
    }

    /// Iterate over the elements.
    pub fn iter(&self) -> impl Iterator<Item = T> + Clone + 'a
    where
        T: 'a,
    {
        self.data.chunks_exact(T::RAW_BYTE_LEN).filter_map(T::read)
    }

    /// Binary search with a comparator, like [`slice::binary_search_by`].
    pub fn binary_search_by(&self, mut f: impl FnMut(T) -> Ordering) -> Result<usize, usize> {
        let mut lo = 0;
        let mut hi = self.len();
        while lo < hi {
            let mid = (lo + hi) / 2;
            let Some(item) = self.get(mid) else {
                return Err(lo);
            };
            match f(item) {
                Ordering::Less => lo = mid + 1,
                Ordering::Greater => hi = mid,
                Ordering::Equal => return Ok(mid),
            }
        }
        Err(lo)
    }

    /// Binary search for a key extracted from each element.
    pub fn binary_search_by_key<K: Ord>(
        &self,
        key: &K,
        mut f: impl FnMut(T) -> K,
    ) -> Result<usize, usize> {
        self.binary_search_by(|item| f(item).cmp(key))
    }

    /// The raw bytes of the array.
    pub fn as_bytes(&self) -> &'a [u8] {
        self.data
    }
}

impl<'a, T: Scalar + Ord> Array<'a, T> {
    pub fn binary_search(&self, value: &T) -> Result<usize, usize> {
        self.binary_search_by(|item| item.cmp(value))
    }
}

impl<T> Clone for Array<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Array<'_, T> {}

impl<T> PartialEq for Array<'_, T> {
    fn eq(&self, other: &Self) -> bool {
        self.data == other.data
    }
}

impl<T> Eq for Array<'_, T> {}

impl<T> Default for Array<'_, T> {
    fn default() -> Self {
        Self {
            data: &[],
            phantom: PhantomData,
        }
    }
}

impl<'a, T: Scalar + std::fmt::Debug + 'a> std::fmt::Debug for Array<'a, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

/// A record with a fixed size that is decoded from a run of scalar fields.
///
/// Implementations are usually generated with the `record!` macro.
pub trait FixedRecord<'a>: Sized {
    /// The raw size of the record, in bytes.
    const RAW_BYTE_LEN: usize;

    /// Decode a record from the start of `data`.
    fn read_record(data: FontData<'a>) -> Result<Self, ReadError>;
}

/// An array of fixed size records borrowed from font data.
pub struct RecordArray<'a, R> {
    data: FontData<'a>,
    phantom: PhantomData<R>,
}

impl<'a, R: FixedRecord<'a>> RecordArray<'a, R> {
    pub fn new(data: FontData<'a>) -> Self {
        Self {
            data,
            phantom: PhantomData,
        }
    }

    pub fn len(&self) -> usize {
        if R::RAW_BYTE_LEN == 0 {
            return 0;
        }
        self.data.len() / R::RAW_BYTE_LEN
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, index: usize) -> Option<R> {
        if index >= self.len() {
            return None;
        }
        let start = index.checked_mul(R::RAW_BYTE_LEN)?;
        self.data
            .slice_len(start, R::RAW_BYTE_LEN)
            .and_then(R::read_record)
            .ok()
    }

    pub fn iter(&self) -> impl Iterator<Item = R> + Clone + 'a
    where
        R: 'a,
    {
        let copy = *self;
        (0..self.len()).filter_map(move |ix| copy.get(ix))
    }

    /// Binary search with a comparator, like [`slice::binary_search_by`].
    pub fn binary_search_by(&self, mut f: impl FnMut(&R) -> Ordering) -> Result<usize, usize> {
        let mut lo = 0;
        let mut hi = self.len();
        while lo < hi {
            let mid = (lo + hi) / 2;
            let Some(item) = self.get(mid) else {
                return Err(lo);
            };
            match f(&item) {
                Ordering::Less => lo = mid + 1,
                Ordering::Greater => hi = mid,
                Ordering::Equal => return Ok(mid),
            }
        }
        Err(lo)
    }

    /// Binary search for a key extracted from each record.
    pub fn binary_search_by_key<K: Ord>(
        &self,
        key: &K,
        mut f: impl FnMut(&R) -> K,
    ) -> Result<usize, usize> {
        self.binary_search_by(|item| f(item).cmp(key))
    }

    /// The data backing the array.
    pub fn data(&self) -> FontData<'a> {
        self.data
    }
}

impl<R> Clone for RecordArray<'_, R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R> Copy for RecordArray<'_, R> {}

impl<R> PartialEq for RecordArray<'_, R> {
    fn eq(&self, other: &Self) -> bool {
        self.data == other.data
    }
}

impl<R> Eq for RecordArray<'_, R> {}

impl<'a, R: FixedRecord<'a> + std::fmt::Debug + 'a> std::fmt::Debug for RecordArray<'a, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

/// Declare a plain record type whose fields are all scalars, together with
/// its [`FixedRecord`] implementation.
#[macro_export]
macro_rules! record {
    (
        $(#[$attr:meta])*
        $vis:vis struct $name:ident {
            $( $(#[$fattr:meta])* $fvis:vis $field:ident : $ty:ty ),* $(,)?
        }
    ) => {
        $(#[$attr])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        $vis struct $name {
            $( $(#[$fattr])* $fvis $field: $ty ),*
        }

        impl<'a> $crate::array::FixedRecord<'a> for $name {
            const RAW_BYTE_LEN: usize = 0 $( + <$ty as $crate::types::Scalar>::RAW_BYTE_LEN )*;

            fn read_record(data: $crate::FontData<'a>) -> Result<Self, $crate::ReadError> {
                let mut cursor = data.cursor();
                Ok(Self {
                    $( $field: cursor.read::<$ty>()? ),*
                })
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    record! {
        struct Pair {
            left: u16,
            right: u16,
            value: i16,
        }
    }

    #[test]
    fn scalar_array() {
        let bytes = [0, 1, 0, 3, 0, 5, 9];
        let array = Array::<u16>::new(&bytes);
        assert_eq!(array.len(), 3);
        assert_eq!(array.get(2), Some(5));
        assert_eq!(array.get(3), None);
        assert_eq!(array.binary_search(&3), Ok(1));
        assert_eq!(array.binary_search(&4), Err(2));
    }

    #[test]
    fn record_array() {
        let bytes = [0, 1, 0, 2, 0xFF, 0xFE, 0, 3, 0, 4, 0, 5];
        let records = RecordArray::<Pair>::new(FontData::new(&bytes));
        assert_eq!(Pair::RAW_BYTE_LEN, 6);
        assert_eq!(records.len(), 2);
        assert_eq!(
            records.get(0),
            Some(Pair {
                left: 1,
                right: 2,
                value: -2
            })
        );
        assert_eq!(records.binary_search_by_key(&3, |p| p.left), Ok(1));
    }
}
