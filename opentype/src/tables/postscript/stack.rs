//! Operand stack for CFF/CFF2 parsing.

use types::Fixed;

use super::{BlendState, Error};

/// Maximum size of the operand stack.
///
/// "Operators in Top DICT, Font DICTs, Private DICTs and CharStrings may be
/// preceded by up to a maximum of 513 operands."
///
/// <https://learn.microsoft.com/en-us/typography/opentype/spec/cff2#table-9-top-dict-operator-entries>
const MAX_STACK: usize = 513;

/// Either a signed 32-bit integer or a 16.16 fixed point number.
///
/// This represents the CFF "number" operand type.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub enum Number {
    I32(i32),
    Fixed(Fixed),
}

impl Number {
    fn to_fixed(self) -> Fixed {
        match self {
            Self::I32(value) => Fixed::from_i32(value),
            Self::Fixed(value) => value,
        }
    }
}

impl From<i32> for Number {
    fn from(value: i32) -> Self {
        Self::I32(value)
    }
}

impl From<Fixed> for Number {
    fn from(value: Fixed) -> Self {
        Self::Fixed(value)
    }
}

impl std::fmt::Display for Number {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::I32(value) => value.fmt(f),
            Self::Fixed(value) => value.fmt(f),
        }
    }
}

/// Operand stack for DICTs and charstrings.
///
/// Entries keep the type they were pushed with; integers are converted to
/// 16.16 on demand when an operator reads them as fixed point values.
#[derive(Clone, Debug, Default)]
pub struct Stack {
    values: Vec<Number>,
}

impl Stack {
    pub fn new() -> Self {
        Self {
            values: Vec::with_capacity(48),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if the number of elements on the stack is odd.
    ///
    /// Some charstring operators use an odd count to signal the presence of
    /// the glyph advance width at the bottom of the stack.
    pub fn len_is_odd(&self) -> bool {
        self.values.len() & 1 != 0
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn push(&mut self, number: impl Into<Number>) -> Result<(), Error> {
        if self.values.len() == MAX_STACK {
            return Err(Error::StackOverflow);
        }
        self.values.push(number.into());
        Ok(())
    }

    /// Returns the 32-bit integer at the given index on the stack.
    ///
    /// Will return an error if the value at that index was not pushed as an
    /// integer.
    pub fn get_i32(&self, index: usize) -> Result<i32, Error> {
        match self.values.get(index) {
            Some(Number::I32(value)) => Ok(*value),
            Some(Number::Fixed(_)) => Err(Error::ExpectedI32StackEntry(index)),
            None => Err(Error::InvalidStackAccess(index)),
        }
    }

    /// Returns the 16.16 fixed point value at the given index on the stack.
    pub fn get_fixed(&self, index: usize) -> Result<Fixed, Error> {
        self.values
            .get(index)
            .map(|value| value.to_fixed())
            .ok_or(Error::InvalidStackAccess(index))
    }

    /// Returns `N` consecutive values starting at `first_index` as 16.16
    /// fixed point.
    pub fn get_fixed_array<const N: usize>(&self, first_index: usize) -> Result<[Fixed; N], Error> {
        let end = first_index + N;
        let values = self
            .values
            .get(first_index..end)
            .ok_or(Error::InvalidStackAccess(end.saturating_sub(1)))?;
        let mut result = [Fixed::ZERO; N];
        for (dest, value) in result.iter_mut().zip(values) {
            *dest = value.to_fixed();
        }
        Ok(result)
    }

    pub fn pop_i32(&mut self) -> Result<i32, Error> {
        let index = self.len().checked_sub(1).ok_or(Error::StackUnderflow)?;
        let value = self.get_i32(index)?;
        self.values.pop();
        Ok(value)
    }

    pub fn pop_fixed(&mut self) -> Result<Fixed, Error> {
        self.values
            .pop()
            .map(|value| value.to_fixed())
            .ok_or(Error::StackUnderflow)
    }

    /// Returns an iterator yielding all elements on the stack as 16.16
    /// fixed point values.
    pub fn fixed_values(&self) -> impl Iterator<Item = Fixed> + '_ {
        self.values.iter().map(|value| value.to_fixed())
    }

    /// Decodes a delta encoded array in place.
    ///
    /// "The second and subsequent numbers in a delta are encoded as the
    /// difference between successive values."
    pub fn apply_delta_prefix_sum(&mut self) {
        let mut sum = Fixed::ZERO;
        for value in &mut self.values {
            sum += value.to_fixed();
            *value = Number::Fixed(sum);
        }
    }

    /// Apply the `blend` operator.
    ///
    /// The stack holds `n` default values, then `n * region_count` deltas
    /// grouped by value, then `n` itself. After blending only the adjusted
    /// default values remain.
    ///
    /// See <https://learn.microsoft.com/en-us/typography/opentype/spec/cff2charstr#syntax-for-font-variations-support-operators>
    pub fn apply_blend(&mut self, blend_state: &BlendState) -> Result<(), Error> {
        let target_value_count = self.pop_i32()?;
        let target_value_count =
            usize::try_from(target_value_count).map_err(|_| Error::StackUnderflow)?;
        let region_count = blend_state.region_count();
        let operand_count = target_value_count * (region_count + 1);
        let start = self
            .len()
            .checked_sub(operand_count)
            .ok_or(Error::StackUnderflow)?;
        let mut blended = Vec::with_capacity(target_value_count);
        {
            let (values, deltas) = self.values[start..].split_at(target_value_count);
            for (value_ix, value) in values.iter().enumerate() {
                let mut value = value.to_fixed();
                let value_deltas = &deltas[value_ix * region_count..(value_ix + 1) * region_count];
                for (delta, scalar) in value_deltas.iter().zip(blend_state.scalars()) {
                    if *scalar != Fixed::ZERO {
                        value = value.wrapping_add(delta.to_fixed() * *scalar);
                    }
                }
                blended.push(Number::Fixed(value));
            }
        }
        self.values.truncate(start);
        self.values.extend(blended);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use types::{F2Dot14, Fixed};

    use super::Stack;
    use crate::{
        tables::{postscript::BlendState, variations::ItemVariationStore},
        FontData, FontRead,
    };

    #[test]
    fn push_pop() {
        let mut stack = Stack::new();
        stack.push(20).unwrap();
        stack.push(Fixed::from_f64(42.42)).unwrap();
        assert!(!stack.len_is_odd());
        assert_eq!(stack.pop_fixed().unwrap(), Fixed::from_f64(42.42));
        assert_eq!(stack.pop_i32().unwrap(), 20);
        assert!(stack.pop_i32().is_err());
    }

    #[test]
    fn push_fixed_pop_i32() {
        let mut stack = Stack::new();
        stack.push(Fixed::from_f64(42.42)).unwrap();
        assert!(stack.pop_i32().is_err());
        // a failed integer pop leaves the value in place
        assert_eq!(stack.len(), 1);
    }

    #[test]
    fn overflow() {
        let mut stack = Stack::new();
        for i in 0..513 {
            stack.push(i).unwrap();
        }
        assert!(stack.push(1).is_err());
    }

    #[test]
    fn delta_prefix_sum() {
        let mut stack = Stack::new();
        stack.push(Fixed::from_f64(1.5)).unwrap();
        stack.push(42).unwrap();
        stack.push(Fixed::from_f64(4.25)).unwrap();
        stack.apply_delta_prefix_sum();
        let values: Vec<_> = stack.fixed_values().collect();
        let expected = &[
            Fixed::from_f64(1.5),
            Fixed::from_f64(43.5),
            Fixed::from_f64(47.75),
        ];
        assert_eq!(&values, expected);
    }

    #[test]
    fn blend() {
        let ivs_data = font_test_data::variations::two_region_store();
        let ivs = ItemVariationStore::read(FontData::new(&ivs_data)).unwrap();
        // This coordinate generates scalars [0.5, 0.5]
        let coords = &[F2Dot14::from_f32(-0.75)];
        let blend_state = BlendState::new(ivs, coords, 0).unwrap();
        let mut stack = Stack::new();
        // target values
        stack.push(10).unwrap();
        stack.push(20).unwrap();
        // deltas for 2 regions for the first value
        stack.push(4).unwrap();
        stack.push(-8).unwrap();
        // deltas for 2 regions for the second value
        stack.push(-60).unwrap();
        stack.push(2).unwrap();
        // target value count
        stack.push(2).unwrap();
        stack.apply_blend(&blend_state).unwrap();
        let result: Vec<_> = stack.fixed_values().collect();
        // 0: 10 + (4 * 0.5) + (-8 * 0.5) = 8
        // 1: 20 + (-60 * 0.5) + (2 * 0.5) = -9
        let expected = &[Fixed::from_f64(8.0), Fixed::from_f64(-9.0)];
        assert_eq!(&result, expected);
    }
}
